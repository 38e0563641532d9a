use crate::error::TagEditError;
use crate::model::{ResourceRef, Tag, TagName, TagOperation, TagUpdate};
use anyhow::Result;
use std::collections::BTreeSet;

/// Read access to the system-wide tag catalog
#[async_trait::async_trait]
pub trait TagCatalogStore: Send + Sync {
    /// All known tags with their usage counts, ordered by name
    async fn get_tag_catalog(&self) -> Result<Vec<Tag>>;
    /// Make tags known to the catalog without attaching them anywhere
    async fn register_tags(&self, tag_names: &[TagName]) -> Result<()>;
}

/// The authoritative per-resource tag sets
#[async_trait::async_trait]
pub trait ResourceTagStore: Send + Sync {
    /// Snapshot of the tags currently attached to a resource
    async fn get_resource_tags(&self, resource: &ResourceRef) -> Result<BTreeSet<TagName>>;
    /// Apply add/remove operations to a resource; adds of attached tags and
    /// removes of detached tags are no-ops
    async fn apply_tag_operations(
        &self,
        resource: &ResourceRef,
        operations: &[TagOperation],
    ) -> Result<()>;
}

/// Hands tag updates off for asynchronous application.
///
/// `dispatch` must not block on the store; callers never learn whether the
/// update was eventually applied.
pub trait TagUpdateDispatcher: Send + Sync {
    fn dispatch(&self, update: TagUpdate) -> Result<(), TagEditError>;
}

pub trait Store: TagCatalogStore + ResourceTagStore + Send + Sync {}
impl<T: TagCatalogStore + ResourceTagStore + Send + Sync> Store for T {}
