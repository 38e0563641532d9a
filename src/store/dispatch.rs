use log::{debug, error, info};
use std::sync::Arc;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

use crate::error::TagEditError;
use crate::model::TagUpdate;
use crate::store::traits::{ResourceTagStore, TagUpdateDispatcher};

/// Queues tag updates for the background [`UpdateWorker`]
#[derive(Debug, Clone)]
pub struct ChannelDispatcher {
    sender: UnboundedSender<TagUpdate>,
}

/// Drains queued tag updates into a store, one update at a time
#[derive(Debug)]
pub struct UpdateWorker {
    receiver: UnboundedReceiver<TagUpdate>,
}

/// Create a connected dispatcher/worker pair
pub fn update_channel() -> (ChannelDispatcher, UpdateWorker) {
    let (sender, receiver) = mpsc::unbounded_channel();
    (ChannelDispatcher { sender }, UpdateWorker { receiver })
}

impl TagUpdateDispatcher for ChannelDispatcher {
    fn dispatch(&self, update: TagUpdate) -> Result<(), TagEditError> {
        debug!(
            "Queueing {} tag operation(s) for {}",
            update.operations.len(),
            update.resource
        );
        self.sender
            .send(update)
            .map_err(|_| TagEditError::DispatcherClosed)
    }
}

impl UpdateWorker {
    /// Apply updates until every dispatcher has been dropped.
    /// Failed updates are logged and dropped, never retried.
    pub async fn run<S: ResourceTagStore + ?Sized>(mut self, store: Arc<S>) {
        while let Some(update) = self.receiver.recv().await {
            if update.is_empty() {
                debug!("Skipping empty tag update for {}", update.resource);
                continue;
            }

            match store
                .apply_tag_operations(&update.resource, &update.operations)
                .await
            {
                Ok(()) => info!(
                    "Applied {} tag operation(s) to {}",
                    update.operations.len(),
                    update.resource
                ),
                Err(e) => error!(
                    "Failed to apply tag operations to {}: {:#}",
                    update.resource, e
                ),
            }
        }

        debug!("Tag update channel closed, worker stopping");
    }

    /// Run the worker on the current tokio runtime
    pub fn spawn<S: ResourceTagStore + ?Sized + 'static>(
        self,
        store: Arc<S>,
    ) -> tokio::task::JoinHandle<()> {
        tokio::spawn(self.run(store))
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use parking_lot::Mutex;

    /// Dispatcher that remembers everything it was handed
    #[derive(Debug, Default)]
    pub struct RecordingDispatcher {
        updates: Mutex<Vec<TagUpdate>>,
    }

    impl RecordingDispatcher {
        pub fn updates(&self) -> Vec<TagUpdate> {
            self.updates.lock().clone()
        }
    }

    impl TagUpdateDispatcher for RecordingDispatcher {
        fn dispatch(&self, update: TagUpdate) -> Result<(), TagEditError> {
            self.updates.lock().push(update);
            Ok(())
        }
    }
}
