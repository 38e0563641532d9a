use serde::{Deserialize, Serialize};
use std::borrow::Borrow;

use crate::error::TagEditError;
use crate::logic::validate::is_valid_tag_name;
use crate::model::ResourceRef;

/// Name of a tag. Tags are identified by name alone and compared case-sensitively.
///
/// Deserializing goes through [`TagName::parse`]; names read back from the
/// store are built with [`TagName::from_catalog`] instead.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TagName(String);

impl TagName {
    /// Parse a user-supplied name, rejecting anything outside `[a-z0-9_]+`
    pub fn parse(candidate: &str) -> Result<Self, TagEditError> {
        if is_valid_tag_name(candidate) {
            Ok(Self(candidate.to_string()))
        } else {
            Err(TagEditError::invalid_name(candidate))
        }
    }

    /// Wrap a name that is already known to the catalog or store.
    /// These were validated when they were created and are taken as-is.
    pub fn from_catalog(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Resolve a name picked or typed by a user. Names the catalog already
    /// knows are accepted as they are; anything new must pass [`parse`](Self::parse).
    pub fn resolve(candidate: &str, catalog: &[Tag]) -> Result<Self, TagEditError> {
        if catalog.iter().any(|tag| tag.tag_name.as_str() == candidate) {
            Ok(Self::from_catalog(candidate))
        } else {
            Self::parse(candidate)
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for TagName {
    type Error = TagEditError;

    fn try_from(candidate: String) -> Result<Self, Self::Error> {
        if is_valid_tag_name(&candidate) {
            Ok(Self(candidate))
        } else {
            Err(TagEditError::invalid_name(&candidate))
        }
    }
}

impl From<TagName> for String {
    fn from(tag_name: TagName) -> Self {
        tag_name.0
    }
}

impl Borrow<str> for TagName {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for TagName {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// A catalog entry: a known tag and how many resources currently carry it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag {
    pub tag_name: TagName,
    pub tag_count: u32,
}

impl Tag {
    pub fn new(tag_name: TagName, tag_count: u32) -> Self {
        Self {
            tag_name,
            tag_count,
        }
    }
}

/// Update method understood by the tag update interface
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UpdateMethod {
    #[serde(rename = "PUT")]
    Add,
    #[serde(rename = "DELETE")]
    Remove,
}

impl std::fmt::Display for UpdateMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            UpdateMethod::Add => write!(f, "PUT"),
            UpdateMethod::Remove => write!(f, "DELETE"),
        }
    }
}

/// A single add/remove instruction against one resource's tag set
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TagOperation {
    pub method: UpdateMethod,
    pub tag_name: TagName,
}

impl TagOperation {
    pub fn add(tag_name: TagName) -> Self {
        Self {
            method: UpdateMethod::Add,
            tag_name,
        }
    }

    pub fn remove(tag_name: TagName) -> Self {
        Self {
            method: UpdateMethod::Remove,
            tag_name,
        }
    }
}

impl std::fmt::Display for TagOperation {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{} {}", self.method, self.tag_name)
    }
}

/// Operations for one resource, handed to the update dispatcher as a unit
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagUpdate {
    pub resource: ResourceRef,
    pub operations: Vec<TagOperation>,
}

impl TagUpdate {
    pub fn new(resource: ResourceRef, operations: Vec<TagOperation>) -> Self {
        Self {
            resource,
            operations,
        }
    }

    pub fn single(resource: ResourceRef, operation: TagOperation) -> Self {
        Self::new(resource, vec![operation])
    }

    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }
}

/// Staged status of a tag inside a batch edit session.
///
/// `Present` and `Remove` only ever apply to tags that were attached when the
/// session opened; `Add` only to tags that were not. A tag that was not
/// attached and has no staged change has no status at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TagStatus {
    Present,
    Remove,
    Add,
}

impl TagStatus {
    /// Whether the tag would be attached if the session were committed now
    pub fn is_selected(self) -> bool {
        matches!(self, TagStatus::Present | TagStatus::Add)
    }
}

/// One chip in the batch editor: a tag and whether it is currently selected
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagChoice {
    pub tag_name: TagName,
    pub selected: bool,
    pub status: Option<TagStatus>,
}
