use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};

use crate::error::TagEditError;
use crate::logic::diff;
use crate::model::{generate_id, Id, ResourceRef, Tag, TagChoice, TagName, TagStatus, TagUpdate};

/// Next staged status of a tag when it is toggled. `None` is "no entry".
///
/// | current | next    |
/// |---------|---------|
/// | None    | Add     |
/// | Add     | None    |
/// | Present | Remove  |
/// | Remove  | Present |
pub fn next_status(current: Option<TagStatus>) -> Option<TagStatus> {
    match current {
        None => Some(TagStatus::Add),
        Some(TagStatus::Add) => None,
        Some(TagStatus::Present) => Some(TagStatus::Remove),
        Some(TagStatus::Remove) => Some(TagStatus::Present),
    }
}

/// Staged tag changes for one resource during a single editing episode.
///
/// A session is opened from a snapshot of the resource's tags and ends by
/// being consumed by [`commit`](Self::commit) or [`discard`](Self::discard).
#[derive(Debug, Clone)]
pub struct BatchEditSession {
    id: Id,
    resource: ResourceRef,
    opened_at: DateTime<Utc>,
    entries: HashMap<TagName, TagStatus>,
}

/// Serializable snapshot of a session's state
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionView {
    pub session_id: Id,
    pub resource: ResourceRef,
    pub opened_at: DateTime<Utc>,
    pub entries: BTreeMap<TagName, TagStatus>,
    pub pending: Vec<crate::model::TagOperation>,
}

impl BatchEditSession {
    /// Start a session with every baseline tag staged as `Present`
    pub fn open(resource: ResourceRef, baseline: impl IntoIterator<Item = TagName>) -> Self {
        let entries = baseline
            .into_iter()
            .map(|tag_name| (tag_name, TagStatus::Present))
            .collect();

        Self {
            id: generate_id(),
            resource,
            opened_at: Utc::now(),
            entries,
        }
    }

    pub fn id(&self) -> &Id {
        &self.id
    }

    pub fn resource(&self) -> &ResourceRef {
        &self.resource
    }

    pub fn opened_at(&self) -> DateTime<Utc> {
        self.opened_at
    }

    pub fn status(&self, tag_name: &str) -> Option<TagStatus> {
        self.entries.get(tag_name).copied()
    }

    pub fn entries(&self) -> &HashMap<TagName, TagStatus> {
        &self.entries
    }

    /// Flip one tag and return its new status.
    ///
    /// A name with no entry becomes a new `Add` entry. It must either be in
    /// `catalog` or be a valid tag name; on rejection the session is left
    /// untouched.
    pub fn toggle(
        &mut self,
        tag_name: &str,
        catalog: &[Tag],
    ) -> Result<Option<TagStatus>, TagEditError> {
        let current = self.status(tag_name);
        let next = next_status(current);

        match (current, next) {
            (None, Some(status)) => {
                let tag_name = TagName::resolve(tag_name, catalog)?;
                self.entries.insert(tag_name, status);
            }
            (Some(_), Some(status)) => {
                if let Some(entry) = self.entries.get_mut(tag_name) {
                    *entry = status;
                }
            }
            (Some(_), None) => {
                self.entries.remove(tag_name);
            }
            (None, None) => {}
        }

        Ok(next)
    }

    /// Operations a commit would produce right now
    pub fn pending(&self) -> Vec<crate::model::TagOperation> {
        diff::compile(&self.entries)
    }

    /// Tags offered by the batch editor: the resource's baseline tags first,
    /// then the rest of the catalog, then newly typed names staged for adding.
    pub fn choices(&self, catalog: &[Tag]) -> Vec<TagChoice> {
        let choice = |tag_name: &TagName| {
            let status = self.status(tag_name.as_str());
            TagChoice {
                tag_name: tag_name.clone(),
                selected: status.map(TagStatus::is_selected).unwrap_or(false),
                status,
            }
        };

        let mut baseline: Vec<&TagName> = self
            .entries
            .iter()
            .filter(|(_, status)| matches!(status, TagStatus::Present | TagStatus::Remove))
            .map(|(tag_name, _)| tag_name)
            .collect();
        baseline.sort();

        let mut choices: Vec<TagChoice> = baseline.into_iter().map(choice).collect();

        let mut offered: Vec<&TagName> = catalog
            .iter()
            .map(|tag| &tag.tag_name)
            .filter(|tag_name| {
                !matches!(
                    self.status(tag_name.as_str()),
                    Some(TagStatus::Present | TagStatus::Remove)
                )
            })
            .collect();

        let mut staged_new: Vec<&TagName> = self
            .entries
            .iter()
            .filter(|(tag_name, status)| {
                **status == TagStatus::Add
                    && !catalog.iter().any(|tag| &tag.tag_name == *tag_name)
            })
            .map(|(tag_name, _)| tag_name)
            .collect();
        staged_new.sort();
        offered.extend(staged_new);

        choices.extend(offered.into_iter().map(choice));
        choices
    }

    pub fn view(&self) -> SessionView {
        SessionView {
            session_id: self.id.clone(),
            resource: self.resource.clone(),
            opened_at: self.opened_at,
            entries: self
                .entries
                .iter()
                .map(|(tag_name, status)| (tag_name.clone(), *status))
                .collect(),
            pending: self.pending(),
        }
    }

    /// End the session, producing the minimal update against the baseline
    pub fn commit(self) -> TagUpdate {
        let operations = diff::compile(&self.entries);
        TagUpdate::new(self.resource, operations)
    }

    /// End the session without producing anything
    pub fn discard(self) {}
}
