use axum::{
    routing::{get, post, put},
    Router,
};

use crate::api::handlers::{self, AppState};
use crate::store::traits::Store;

pub fn create_router<S: Store + 'static>() -> Router<AppState<S>> {
    Router::new()
        // Health check
        .route("/health", get(handlers::health_check))
        // Tag catalog
        .route("/tags", get(handlers::get_tag_catalog::<S>))
        // Resource tags and immediate edits
        .route(
            "/:resource_type/:key/tags",
            get(handlers::get_resource_tags::<S>),
        )
        .route(
            "/:resource_type/:key/tags/:tag_name",
            put(handlers::add_tag::<S>).delete(handlers::remove_tag::<S>),
        )
        // Batch edit sessions
        .route(
            "/:resource_type/:key/tag-session",
            post(handlers::open_tag_session::<S>)
                .get(handlers::get_tag_session::<S>)
                .delete(handlers::discard_tag_session::<S>),
        )
        .route(
            "/:resource_type/:key/tag-session/toggle",
            post(handlers::toggle_session_tag::<S>),
        )
        .route(
            "/:resource_type/:key/tag-session/commit",
            post(handlers::commit_tag_session::<S>),
        )
}
