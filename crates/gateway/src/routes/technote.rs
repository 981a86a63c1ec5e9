//! Note import flows.
//!
//! Both create endpoints write three rows (conversation, note, messages)
//! through the BaaS. The writes are not transactional on our side, so a
//! failure after the first insert triggers compensating deletes; a
//! conversation row must never be left behind without its note.

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
    serde_json::json,
    tracing::{info, warn},
};

use {
    devlog_browser::ScrapeError,
    devlog_common::{
        ChatTranscript, ConversationSource, NewConversation, NewTechNote, QaPair, TechNote,
        interleave_messages,
    },
    devlog_config::ScrapeBackend,
    devlog_store::{Conversations, Messages, TechNotes},
};

use crate::{error::ApiError, state::AppState};

/// Title used while the AI pipeline has not produced one yet.
const PLACEHOLDER_TITLE: &str = "Preparing the notes.";

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/all/{user_id}", get(list_by_user))
        .route("/notion/{page_id}", get(notion_page))
        .route("/create/extension", post(create_from_extension))
        .route("/create/link", post(create_from_link))
}

async fn list_by_user(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    let notes = TechNotes(&state.baas).by_user(user_id).await?;
    Ok(Json(notes))
}

/// Proxy the rendered Notion page. Renderer failures degrade to a null
/// payload rather than failing the request; the note itself still exists.
async fn notion_page(
    State(state): State<Arc<AppState>>,
    Path(page_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let record = match state.notion_sidecar.render_page(&page_id).await {
        Ok(record) => Some(record),
        Err(e) => {
            warn!(%page_id, error = %e, "notion renderer unavailable");
            None
        },
    };
    Ok(Json(json!({ "notionPageData": record })))
}

#[derive(Debug, Deserialize)]
struct CreateFromExtensionRequest {
    user_id: Option<i64>,
    #[serde(default)]
    data: Option<Vec<QaPair>>,
}

/// Import a conversation captured by the browser extension.
async fn create_from_extension(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreateFromExtensionRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let (Some(user_id), Some(data)) = (req.user_id, req.data) else {
        return Err(ApiError::validation(
            "Missing required fields: user_id or data",
        ));
    };

    let conversation = NewConversation {
        user_id,
        source: ConversationSource::ChromeExtension,
        link: None,
        conversation_content: None,
    };
    let note = persist_import(&state, conversation, PLACEHOLDER_TITLE.to_string(), &data).await?;
    Ok((StatusCode::CREATED, Json(json!({ "techNoteData": note }))))
}

#[derive(Debug, Deserialize)]
struct CreateFromLinkRequest {
    user_id: Option<i64>,
    url: Option<String>,
}

/// Import a conversation from a shared link, scraping it through the
/// configured backend first.
async fn create_from_link(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreateFromLinkRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let (Some(user_id), Some(url)) = (req.user_id, req.url) else {
        return Err(ApiError::validation(
            "Missing required fields: user_id or url",
        ));
    };

    let transcript = fetch_transcript(&state, &url).await?;
    info!(
        title = %transcript.chat_room_title,
        pairs = transcript.data.len(),
        "scraped shared conversation"
    );

    let conversation = NewConversation {
        user_id,
        source: ConversationSource::DirectLink,
        link: Some(url),
        conversation_content: None,
    };
    let note = persist_import(
        &state,
        conversation,
        transcript.chat_room_title.clone(),
        &transcript.data,
    )
    .await?;
    Ok((StatusCode::CREATED, Json(json!({ "techNoteData": note }))))
}

async fn fetch_transcript(state: &AppState, url: &str) -> Result<ChatTranscript, ApiError> {
    match state.config.scrape.backend {
        ScrapeBackend::Sidecar => Ok(state.ai.process_url(url).await?),
        ScrapeBackend::Local => state.scraper.scrape(url).await.map_err(|e| match e {
            ScrapeError::InvalidUrl(url) => {
                ApiError::validation(format!("invalid share URL: {url}"))
            },
            other => ApiError::Upstream(other.to_string()),
        }),
    }
}

/// Write conversation, note, and messages; unwind on partial failure.
async fn persist_import(
    state: &AppState,
    new_conversation: NewConversation,
    title: String,
    pairs: &[QaPair],
) -> Result<TechNote, ApiError> {
    let conversations = Conversations(&state.baas);
    let conversation = conversations.create(&new_conversation).await?;

    let note = match TechNotes(&state.baas)
        .create(&NewTechNote {
            conversation_id: conversation.id,
            title,
            note_content: String::new(),
            is_completed: false,
        })
        .await
    {
        Ok(note) => note,
        Err(e) => {
            compensate_conversation(state, conversation.id).await;
            return Err(e.into());
        },
    };

    let messages = interleave_messages(conversation.id, pairs);
    if let Err(e) = Messages(&state.baas).insert(&messages).await {
        compensate_note(state, note.id).await;
        compensate_conversation(state, conversation.id).await;
        return Err(e.into());
    }

    info!(
        note_id = note.id,
        conversation_id = conversation.id,
        messages = messages.len(),
        "imported conversation"
    );
    state
        .slack
        .notify_note_created(&note.title, conversation.id)
        .await;

    Ok(note)
}

async fn compensate_conversation(state: &AppState, conversation_id: i64) {
    if let Err(e) = Conversations(&state.baas).delete(conversation_id).await {
        warn!(conversation_id, error = %e, "failed to clean up conversation after partial import");
    }
}

async fn compensate_note(state: &AppState, note_id: i64) {
    if let Err(e) = TechNotes(&state.baas).delete(note_id).await {
        warn!(note_id, error = %e, "failed to clean up tech note after partial import");
    }
}
