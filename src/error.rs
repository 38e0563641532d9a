use thiserror::Error;

use crate::logic::validate::INVALID_TAG_HINT;
use crate::model::ResourceRef;

/// Failures surfaced by the tag editors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TagEditError {
    #[error("Invalid tag name '{name}': {hint}", hint = INVALID_TAG_HINT)]
    InvalidTagName { name: String },

    #[error("A batch edit session is already open for {0}")]
    SessionAlreadyOpen(ResourceRef),

    #[error("No batch edit session is open for {0}")]
    NoOpenSession(ResourceRef),

    #[error("Tag update dispatcher is closed")]
    DispatcherClosed,
}

impl TagEditError {
    pub fn invalid_name(name: &str) -> Self {
        Self::InvalidTagName {
            name: name.to_string(),
        }
    }
}
