//! The renderer sidecar's HTTP surface.

use std::sync::Arc;

use {
    axum::{
        Json, Router,
        extract::{Path, State},
        http::StatusCode,
        response::{IntoResponse, Response},
        routing::{get, post},
    },
    serde::Deserialize,
    serde_json::json,
    tracing::{error, info},
};

use crate::{
    blocks::markdown_to_blocks,
    client::{CreatePage, NotionClient},
    error::NotionError,
};

#[derive(Clone)]
pub struct ServiceState {
    pub client: NotionClient,
    pub database_id: String,
}

/// Build the sidecar router.
pub fn router(state: ServiceState) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/notion/{page_id}", get(render_page))
        .route("/publish", post(publish))
        .with_state(Arc::new(state))
}

enum ServiceError {
    Validation(&'static str),
    Upstream(NotionError),
}

impl From<NotionError> for ServiceError {
    fn from(err: NotionError) -> Self {
        Self::Upstream(err)
    }
}

impl IntoResponse for ServiceError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            Self::Validation(message) => (StatusCode::BAD_REQUEST, message.to_string()),
            Self::Upstream(err) => {
                error!(error = %err, "notion call failed");
                (StatusCode::BAD_GATEWAY, err.to_string())
            },
        };
        (status, Json(json!({ "error": message }))).into_response()
    }
}

async fn index() -> &'static str {
    "Hello World!"
}

async fn render_page(
    State(state): State<Arc<ServiceState>>,
    Path(page_id): Path<String>,
) -> Result<impl IntoResponse, ServiceError> {
    let record = state.client.render_page(&page_id).await?;
    Ok(Json(record))
}

#[derive(Debug, Deserialize)]
struct PublishRequest {
    #[serde(default)]
    title: String,
    #[serde(default)]
    content: String,
    #[serde(default)]
    question_type: Vec<String>,
    #[serde(default)]
    os_tags: Vec<String>,
    #[serde(default)]
    framework_tags: Vec<String>,
    #[serde(default)]
    language_tags: Vec<String>,
    #[serde(default)]
    tech_stack_tags: Vec<String>,
}

async fn publish(
    State(state): State<Arc<ServiceState>>,
    Json(req): Json<PublishRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    if req.title.trim().is_empty() || req.content.trim().is_empty() {
        return Err(ServiceError::Validation("Title and content are required"));
    }

    let created = state
        .client
        .create_page(&CreatePage {
            database_id: state.database_id.clone(),
            title: req.title.clone(),
            children: markdown_to_blocks(&req.content),
            question_type: req.question_type,
            os_tags: req.os_tags,
            framework_tags: req.framework_tags,
            language_tags: req.language_tags,
            tech_stack_tags: req.tech_stack_tags,
        })
        .await?;

    info!(page_id = %created.id, title = %req.title, "published notion page");
    Ok((
        StatusCode::OK,
        Json(json!({
            "message": "Notion page created successfully",
            "page_id": created.id,
            "url": created.url,
            "public_url": created.public_url,
        })),
    ))
}
