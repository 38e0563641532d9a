use itertools::Itertools;
use std::collections::HashMap;

use crate::model::{TagName, TagOperation, TagStatus};

/// Reduce a batch session's staged statuses to the operations that move the
/// resource from its baseline to the staged state.
///
/// `Present` entries are unchanged baseline tags and emit nothing; tags that
/// were never staged are not in the map at all. Output is ordered by tag name.
pub fn compile(entries: &HashMap<TagName, TagStatus>) -> Vec<TagOperation> {
    entries
        .iter()
        .filter_map(|(tag_name, status)| match status {
            TagStatus::Present => None,
            TagStatus::Remove => Some(TagOperation::remove(tag_name.clone())),
            TagStatus::Add => Some(TagOperation::add(tag_name.clone())),
        })
        .sorted_by(|a, b| a.tag_name.cmp(&b.tag_name))
        .collect()
}
