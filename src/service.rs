use std::sync::Arc;

use crate::logic::{BatchEditor, ImmediateEditor};
use crate::store::dispatch::{update_channel, ChannelDispatcher};
use crate::store::traits::Store;

/// Everything the HTTP layer needs: the store plus both editing modes,
/// sharing one dispatcher that feeds the background update worker.
pub struct TagService<S> {
    pub store: Arc<S>,
    pub immediate: ImmediateEditor<ChannelDispatcher>,
    pub batch: BatchEditor<ChannelDispatcher>,
}

impl<S: Store + 'static> TagService<S> {
    /// Build the service and spawn its update worker on the current runtime
    pub fn start(store: Arc<S>) -> Arc<Self> {
        let (dispatcher, worker) = update_channel();
        worker.spawn(store.clone());

        let dispatcher = Arc::new(dispatcher);
        Arc::new(Self {
            store,
            immediate: ImmediateEditor::new(dispatcher.clone()),
            batch: BatchEditor::new(dispatcher),
        })
    }
}
