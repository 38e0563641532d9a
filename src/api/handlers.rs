use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
    Json as RequestJson,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::error::TagEditError;
use crate::logic::{option_hint, SessionView};
use crate::model::{ResourceRef, ResourceType, Tag, TagChoice, TagName, TagOperation, TagStatus};
use crate::service::TagService;
use crate::store::traits::Store;

pub type AppState<S> = Arc<TagService<S>>;

type HandlerError = (StatusCode, Json<ErrorResponse>);

/// Simple health check endpoint
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: String,
}

pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        timestamp: chrono::Utc::now().to_rfc3339(),
    })
}

#[derive(Debug, Serialize)]
pub struct ListResponse<T> {
    pub items: Vec<T>,
    pub total: usize,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
}

impl ErrorResponse {
    pub fn new(message: &str) -> Self {
        Self {
            error: message.to_string(),
            hint: None,
        }
    }

    pub fn with_hint(message: &str, hint: &str) -> Self {
        Self {
            error: message.to_string(),
            hint: Some(hint.to_string()),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ResourceTagsResponse {
    pub resource: ResourceRef,
    pub tags: Vec<TagName>,
}

#[derive(Debug, Deserialize)]
pub struct ToggleRequest {
    pub tag_name: String,
}

#[derive(Debug, Serialize)]
pub struct ToggleResponse {
    pub tag_name: String,
    pub status: Option<TagStatus>,
    pub selected: bool,
    pub pending: Vec<TagOperation>,
}

#[derive(Debug, Serialize)]
pub struct SessionResponse {
    pub session: SessionView,
    pub choices: Vec<TagChoice>,
}

#[derive(Debug, Serialize)]
pub struct CommitResponse {
    pub resource: ResourceRef,
    pub operations: Vec<TagOperation>,
}

fn parse_resource(resource_type: &str, key: String) -> Result<ResourceRef, HandlerError> {
    let resource_type = resource_type.parse::<ResourceType>().map_err(|e| {
        (StatusCode::BAD_REQUEST, Json(ErrorResponse::new(&e)))
    })?;
    Ok(ResourceRef::new(resource_type, key))
}

fn edit_error(e: TagEditError) -> HandlerError {
    let status = match &e {
        TagEditError::InvalidTagName { name } => {
            return (
                StatusCode::BAD_REQUEST,
                Json(ErrorResponse::with_hint(&e.to_string(), option_hint(name))),
            );
        }
        TagEditError::SessionAlreadyOpen(_) => StatusCode::CONFLICT,
        TagEditError::NoOpenSession(_) => StatusCode::NOT_FOUND,
        TagEditError::DispatcherClosed => StatusCode::SERVICE_UNAVAILABLE,
    };
    (status, Json(ErrorResponse::new(&e.to_string())))
}

fn store_error(context: &str, e: anyhow::Error) -> HandlerError {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ErrorResponse::new(&format!("{}: {}", context, e))),
    )
}

async fn load_catalog<S: Store>(service: &TagService<S>) -> Result<Vec<Tag>, HandlerError> {
    service
        .store
        .get_tag_catalog()
        .await
        .map_err(|e| store_error("Failed to get tag catalog", e))
}

// ============================================================================
// CATALOG AND RESOURCE TAGS
// ============================================================================

/// GET /tags
pub async fn get_tag_catalog<S: Store>(
    State(service): State<AppState<S>>,
) -> Result<Json<ListResponse<Tag>>, HandlerError> {
    let items = load_catalog(&service).await?;

    Ok(Json(ListResponse {
        total: items.len(),
        items,
    }))
}

/// GET /{resource_type}/{key}/tags
pub async fn get_resource_tags<S: Store>(
    State(service): State<AppState<S>>,
    Path((resource_type, key)): Path<(String, String)>,
) -> Result<Json<ResourceTagsResponse>, HandlerError> {
    let resource = parse_resource(&resource_type, key)?;
    let tags = service
        .store
        .get_resource_tags(&resource)
        .await
        .map_err(|e| store_error("Failed to get resource tags", e))?;

    Ok(Json(ResourceTagsResponse {
        resource,
        tags: tags.into_iter().collect(),
    }))
}

// ============================================================================
// IMMEDIATE EDITS
// ============================================================================

/// PUT /{resource_type}/{key}/tags/{tag_name}
pub async fn add_tag<S: Store>(
    State(service): State<AppState<S>>,
    Path((resource_type, key, tag_name)): Path<(String, String, String)>,
) -> Result<(StatusCode, Json<TagOperation>), HandlerError> {
    let resource = parse_resource(&resource_type, key)?;
    let catalog = load_catalog(&service).await?;
    let operation = service
        .immediate
        .add(&resource, &tag_name, &catalog)
        .map_err(edit_error)?;

    Ok((StatusCode::ACCEPTED, Json(operation)))
}

/// DELETE /{resource_type}/{key}/tags/{tag_name}
pub async fn remove_tag<S: Store>(
    State(service): State<AppState<S>>,
    Path((resource_type, key, tag_name)): Path<(String, String, String)>,
) -> Result<(StatusCode, Json<TagOperation>), HandlerError> {
    let resource = parse_resource(&resource_type, key)?;
    let operation = service
        .immediate
        .remove(&resource, &tag_name)
        .map_err(edit_error)?;

    Ok((StatusCode::ACCEPTED, Json(operation)))
}

// ============================================================================
// BATCH EDIT SESSIONS
// ============================================================================

/// POST /{resource_type}/{key}/tag-session
/// Snapshot the resource's tags and open a batch session over them
pub async fn open_tag_session<S: Store>(
    State(service): State<AppState<S>>,
    Path((resource_type, key)): Path<(String, String)>,
) -> Result<(StatusCode, Json<SessionView>), HandlerError> {
    let resource = parse_resource(&resource_type, key)?;

    if service.batch.is_open(&resource) {
        return Err(edit_error(TagEditError::SessionAlreadyOpen(resource)));
    }

    let baseline = service
        .store
        .get_resource_tags(&resource)
        .await
        .map_err(|e| store_error("Failed to get resource tags", e))?;

    let view = service
        .batch
        .open(resource, baseline)
        .map_err(edit_error)?;

    Ok((StatusCode::CREATED, Json(view)))
}

/// GET /{resource_type}/{key}/tag-session
/// Current session state plus the chips to offer
pub async fn get_tag_session<S: Store>(
    State(service): State<AppState<S>>,
    Path((resource_type, key)): Path<(String, String)>,
) -> Result<Json<SessionResponse>, HandlerError> {
    let resource = parse_resource(&resource_type, key)?;

    // Fail fast before touching the store
    let session = service.batch.view(&resource).map_err(edit_error)?;

    let catalog = load_catalog(&service).await?;

    let choices = service
        .batch
        .choices(&resource, &catalog)
        .map_err(edit_error)?;

    Ok(Json(SessionResponse { session, choices }))
}

/// POST /{resource_type}/{key}/tag-session/toggle
pub async fn toggle_session_tag<S: Store>(
    State(service): State<AppState<S>>,
    Path((resource_type, key)): Path<(String, String)>,
    RequestJson(req): RequestJson<ToggleRequest>,
) -> Result<Json<ToggleResponse>, HandlerError> {
    let resource = parse_resource(&resource_type, key)?;
    let catalog = load_catalog(&service).await?;

    let (status, pending) = service
        .batch
        .toggle(&resource, &req.tag_name, &catalog)
        .map_err(edit_error)?;

    Ok(Json(ToggleResponse {
        tag_name: req.tag_name,
        status,
        selected: status.map(TagStatus::is_selected).unwrap_or(false),
        pending,
    }))
}

/// POST /{resource_type}/{key}/tag-session/commit
pub async fn commit_tag_session<S: Store>(
    State(service): State<AppState<S>>,
    Path((resource_type, key)): Path<(String, String)>,
) -> Result<(StatusCode, Json<CommitResponse>), HandlerError> {
    let resource = parse_resource(&resource_type, key)?;
    let operations = service.batch.commit(&resource).map_err(edit_error)?;

    Ok((
        StatusCode::ACCEPTED,
        Json(CommitResponse {
            resource,
            operations,
        }),
    ))
}

/// DELETE /{resource_type}/{key}/tag-session
pub async fn discard_tag_session<S: Store>(
    State(service): State<AppState<S>>,
    Path((resource_type, key)): Path<(String, String)>,
) -> Result<StatusCode, HandlerError> {
    let resource = parse_resource(&resource_type, key)?;
    service.batch.discard(&resource).map_err(edit_error)?;
    Ok(StatusCode::NO_CONTENT)
}
