pub mod api;
pub mod config;
pub mod error;
pub mod logic;
pub mod model;
pub mod service;
pub mod store;

use anyhow::Context;
use log::{info, warn};
use store::traits::TagCatalogStore;
use std::sync::Arc;
use tokio::net::TcpListener;

// Export API types
pub use api::handlers;
pub use api::routes;

pub use error::TagEditError;

// Export the editing core
pub use logic::{
    compile, is_valid_tag_name, next_status, BatchEditSession, BatchEditor, ImmediateEditor,
    SessionView,
};

// Export all model types
pub use model::*;

pub use service::TagService;

// Export store types
pub use store::{MemoryStore, PostgresStore, Store};

/// Serve the tag API for `store` on an already bound listener
pub async fn serve<S: Store + 'static>(store: Arc<S>, listener: TcpListener) -> anyhow::Result<()> {
    let service = TagService::start(store);
    let app: axum::Router = api::routes::create_router::<S>().with_state(service);

    axum::serve(listener, app).await?;

    Ok(())
}

/// Pick a store from `config`, seed its catalog and serve until shutdown
pub async fn run(config: crate::config::AppConfig) -> anyhow::Result<()> {
    let (seed, rejected) = config.seed_tags();
    for name in rejected {
        warn!("Ignoring invalid seed tag '{}'", name);
    }

    let bind_address = config.server_address();
    let listener = TcpListener::bind(&bind_address)
        .await
        .with_context(|| format!("Failed to bind {}", bind_address))?;
    info!("Tag service listening on http://{}", bind_address);

    match config.database_url() {
        Some(database_url) => {
            info!("Connecting to PostgreSQL...");
            let store = PostgresStore::new(&database_url, config.max_connections()).await?;
            store.migrate().await?;
            store.register_tags(&seed).await?;
            serve(Arc::new(store), listener).await
        }
        None => {
            info!("No database configured, using in-memory tag store");
            serve(Arc::new(MemoryStore::with_catalog(seed)), listener).await
        }
    }
}
