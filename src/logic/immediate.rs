use log::{info, warn};
use std::sync::Arc;

use crate::error::TagEditError;
use crate::model::{ResourceRef, Tag, TagName, TagOperation, TagUpdate};
use crate::store::traits::TagUpdateDispatcher;

/// Single-gesture tag edits: each call is dispatched on its own, unstaged.
pub struct ImmediateEditor<D: ?Sized> {
    dispatcher: Arc<D>,
}

impl<D: TagUpdateDispatcher + ?Sized> ImmediateEditor<D> {
    pub fn new(dispatcher: Arc<D>) -> Self {
        Self { dispatcher }
    }

    /// Attach a tag. A name outside `catalog` that is not a valid tag name is
    /// rejected and nothing is dispatched.
    pub fn add(
        &self,
        resource: &ResourceRef,
        tag_name: &str,
        catalog: &[Tag],
    ) -> Result<TagOperation, TagEditError> {
        let tag_name = TagName::resolve(tag_name, catalog).map_err(|e| {
            warn!("Rejected tag for {}: {}", resource, e);
            e
        })?;

        self.send(resource, TagOperation::add(tag_name))
    }

    /// Detach a tag. Removal needs no name validation.
    pub fn remove(
        &self,
        resource: &ResourceRef,
        tag_name: &str,
    ) -> Result<TagOperation, TagEditError> {
        self.send(resource, TagOperation::remove(TagName::from_catalog(tag_name)))
    }

    fn send(
        &self,
        resource: &ResourceRef,
        operation: TagOperation,
    ) -> Result<TagOperation, TagEditError> {
        info!("Dispatching {} for {}", operation, resource);
        self.dispatcher
            .dispatch(TagUpdate::single(resource.clone(), operation.clone()))?;
        Ok(operation)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::dispatch::testing::RecordingDispatcher;

    fn editor() -> (ImmediateEditor<RecordingDispatcher>, Arc<RecordingDispatcher>) {
        let dispatcher = Arc::new(RecordingDispatcher::default());
        (ImmediateEditor::new(dispatcher.clone()), dispatcher)
    }

    #[test]
    fn test_add_dispatches_one_operation() {
        let (editor, dispatcher) = editor();
        let resource = ResourceRef::table("gold.orders");

        let op = editor.add(&resource, "finance", &[]).unwrap();

        assert_eq!(op, TagOperation::add(TagName::from_catalog("finance")));
        assert_eq!(dispatcher.updates(), vec![TagUpdate::single(resource, op)]);
    }

    #[test]
    fn test_invalid_add_dispatches_nothing() {
        let (editor, dispatcher) = editor();

        let result = editor.add(&ResourceRef::table("gold.orders"), "Invalid Name", &[]);

        assert_eq!(result, Err(TagEditError::invalid_name("Invalid Name")));
        assert!(dispatcher.updates().is_empty());
    }

    #[test]
    fn test_add_of_catalogued_name_skips_validation() {
        let (editor, dispatcher) = editor();
        let resource = ResourceRef::table("gold.orders");
        let catalog = vec![Tag::new(TagName::from_catalog("Legacy-Tag"), 3)];

        let op = editor.add(&resource, "Legacy-Tag", &catalog).unwrap();
        assert_eq!(op, TagOperation::add(TagName::from_catalog("Legacy-Tag")));

        assert_eq!(
            editor.add(&resource, "Other-Tag", &catalog),
            Err(TagEditError::invalid_name("Other-Tag"))
        );
        assert_eq!(dispatcher.updates(), vec![TagUpdate::single(resource, op)]);
    }

    #[test]
    fn test_remove_is_never_validated() {
        let (editor, dispatcher) = editor();
        let resource = ResourceRef::table("gold.orders");

        for name in ["anything", "Not Valid!"] {
            let op = editor.remove(&resource, name).unwrap();
            assert_eq!(op, TagOperation::remove(TagName::from_catalog(name)));
        }

        let updates = dispatcher.updates();
        assert_eq!(updates.len(), 2);
        assert!(updates.iter().all(|u| u.operations.len() == 1));
    }
}
