use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Path, State},
    response::IntoResponse,
    routing::get,
};

use devlog_store::Messages;

use crate::{error::ApiError, state::AppState};

pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/messages/{conversation_id}", get(messages))
}

/// Messages of one conversation, in exchange order.
async fn messages(
    State(state): State<Arc<AppState>>,
    Path(conversation_id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    let rows = Messages(&state.baas).by_conversation(conversation_id).await?;
    Ok(Json(rows))
}
