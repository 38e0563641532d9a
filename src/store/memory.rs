use anyhow::Result;
use parking_lot::RwLock;
use std::collections::{BTreeMap, BTreeSet, HashMap};

use crate::model::{ResourceRef, Tag, TagName, TagOperation, UpdateMethod};
use crate::store::traits::{ResourceTagStore, TagCatalogStore};

/// In-process store, used when no database is configured and in tests
#[derive(Debug, Default)]
pub struct MemoryStore {
    /// Tag name -> number of resources carrying it
    catalog: RwLock<BTreeMap<TagName, u32>>,
    resources: RwLock<HashMap<ResourceRef, BTreeSet<TagName>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store preloaded with catalog entries that are not attached anywhere
    pub fn with_catalog(tag_names: impl IntoIterator<Item = TagName>) -> Self {
        let store = Self::new();
        {
            let mut catalog = store.catalog.write();
            for tag_name in tag_names {
                catalog.entry(tag_name).or_insert(0);
            }
        }
        store
    }
}

#[async_trait::async_trait]
impl TagCatalogStore for MemoryStore {
    async fn get_tag_catalog(&self) -> Result<Vec<Tag>> {
        let catalog = self.catalog.read();
        Ok(catalog
            .iter()
            .map(|(tag_name, count)| Tag::new(tag_name.clone(), *count))
            .collect())
    }

    async fn register_tags(&self, tag_names: &[TagName]) -> Result<()> {
        let mut catalog = self.catalog.write();
        for tag_name in tag_names {
            catalog.entry(tag_name.clone()).or_insert(0);
        }
        Ok(())
    }
}

#[async_trait::async_trait]
impl ResourceTagStore for MemoryStore {
    async fn get_resource_tags(&self, resource: &ResourceRef) -> Result<BTreeSet<TagName>> {
        let resources = self.resources.read();
        Ok(resources.get(resource).cloned().unwrap_or_default())
    }

    async fn apply_tag_operations(
        &self,
        resource: &ResourceRef,
        operations: &[TagOperation],
    ) -> Result<()> {
        // Lock order: resources, then catalog
        let mut resources = self.resources.write();
        let mut catalog = self.catalog.write();
        let attached = resources.entry(resource.clone()).or_default();

        for operation in operations {
            match operation.method {
                UpdateMethod::Add => {
                    let count = catalog.entry(operation.tag_name.clone()).or_insert(0);
                    if attached.insert(operation.tag_name.clone()) {
                        *count += 1;
                    }
                }
                UpdateMethod::Remove => {
                    if attached.remove(&operation.tag_name) {
                        if let Some(count) = catalog.get_mut(&operation.tag_name) {
                            *count = count.saturating_sub(1);
                        }
                    }
                }
            }
        }

        if attached.is_empty() {
            resources.remove(resource);
        }

        Ok(())
    }
}
