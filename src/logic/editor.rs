use log::{debug, info};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;

use crate::error::TagEditError;
use crate::logic::batch_session::{BatchEditSession, SessionView};
use crate::model::{ResourceRef, Tag, TagChoice, TagName, TagOperation, TagStatus};
use crate::store::traits::TagUpdateDispatcher;

/// Owns the open batch edit sessions, at most one per resource.
///
/// The lock is only held for the synchronous session work, never across a
/// store call.
pub struct BatchEditor<D: ?Sized> {
    sessions: Mutex<HashMap<ResourceRef, BatchEditSession>>,
    dispatcher: Arc<D>,
}

impl<D: TagUpdateDispatcher + ?Sized> BatchEditor<D> {
    pub fn new(dispatcher: Arc<D>) -> Self {
        Self {
            sessions: Mutex::new(HashMap::new()),
            dispatcher,
        }
    }

    pub fn is_open(&self, resource: &ResourceRef) -> bool {
        self.sessions.lock().contains_key(resource)
    }

    /// Open a session over `baseline`, the resource's current tags
    pub fn open(
        &self,
        resource: ResourceRef,
        baseline: impl IntoIterator<Item = TagName>,
    ) -> Result<SessionView, TagEditError> {
        let mut sessions = self.sessions.lock();
        if sessions.contains_key(&resource) {
            return Err(TagEditError::SessionAlreadyOpen(resource));
        }

        let session = BatchEditSession::open(resource.clone(), baseline);
        info!(
            "Opened tag session {} for {} with {} baseline tag(s)",
            session.id(),
            resource,
            session.entries().len()
        );
        let view = session.view();
        sessions.insert(resource, session);
        Ok(view)
    }

    /// Toggle one tag, returning its new status together with the operations
    /// the session would commit afterwards
    pub fn toggle(
        &self,
        resource: &ResourceRef,
        tag_name: &str,
        catalog: &[Tag],
    ) -> Result<(Option<TagStatus>, Vec<TagOperation>), TagEditError> {
        let mut sessions = self.sessions.lock();
        let session = sessions
            .get_mut(resource)
            .ok_or_else(|| TagEditError::NoOpenSession(resource.clone()))?;

        let status = session.toggle(tag_name, catalog)?;
        debug!("Toggled '{}' on {} -> {:?}", tag_name, resource, status);
        Ok((status, session.pending()))
    }

    pub fn view(&self, resource: &ResourceRef) -> Result<SessionView, TagEditError> {
        self.with_session(resource, BatchEditSession::view)
    }

    pub fn choices(
        &self,
        resource: &ResourceRef,
        catalog: &[Tag],
    ) -> Result<Vec<TagChoice>, TagEditError> {
        self.with_session(resource, |session| session.choices(catalog))
    }

    /// Close the session and dispatch its diff as a single update.
    ///
    /// The session is gone once this returns, whether or not the dispatch
    /// was accepted.
    pub fn commit(&self, resource: &ResourceRef) -> Result<Vec<TagOperation>, TagEditError> {
        let session = self.take(resource)?;
        let session_id = session.id().clone();
        let update = session.commit();
        let operations = update.operations.clone();

        info!(
            "Committing tag session {} for {}: {} operation(s)",
            session_id,
            resource,
            operations.len()
        );
        self.dispatcher.dispatch(update)?;
        Ok(operations)
    }

    /// Close the session without dispatching anything
    pub fn discard(&self, resource: &ResourceRef) -> Result<(), TagEditError> {
        let session = self.take(resource)?;
        info!("Discarded tag session {} for {}", session.id(), resource);
        session.discard();
        Ok(())
    }

    fn take(&self, resource: &ResourceRef) -> Result<BatchEditSession, TagEditError> {
        self.sessions
            .lock()
            .remove(resource)
            .ok_or_else(|| TagEditError::NoOpenSession(resource.clone()))
    }

    fn with_session<T>(
        &self,
        resource: &ResourceRef,
        f: impl FnOnce(&BatchEditSession) -> T,
    ) -> Result<T, TagEditError> {
        let sessions = self.sessions.lock();
        sessions
            .get(resource)
            .map(f)
            .ok_or_else(|| TagEditError::NoOpenSession(resource.clone()))
    }
}
