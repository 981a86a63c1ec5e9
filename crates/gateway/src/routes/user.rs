use std::sync::Arc;

use {
    axum::{
        Json, Router,
        extract::{Path, State},
        http::StatusCode,
        response::IntoResponse,
        routing::{get, post},
    },
    serde::Deserialize,
    serde_json::{Map, Value},
};

use devlog_store::Users;

use crate::{error::ApiError, state::AppState};

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/info/{user_id}", get(info))
        .route("/create", post(create))
}

async fn info(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    let user = Users(&state.baas)
        .by_id(user_id)
        .await?
        .ok_or_else(|| ApiError::not_found("User not found"))?;
    Ok(Json(user))
}

#[derive(Debug, Deserialize)]
struct CreateUserRequest {
    #[serde(default)]
    user: Option<Value>,
}

/// Insert a user from the identity payload the auth callback hands us.
/// Token claims are stripped before the row hits the BaaS.
async fn create(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreateUserRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let identity: Map<String, Value> = match req.user {
        Some(Value::Object(map)) => map,
        _ => return Err(ApiError::validation("Missing required field: user")),
    };

    let user = Users(&state.baas).create(identity).await?;
    Ok((StatusCode::CREATED, Json(user)))
}
