use reqwest::StatusCode;

#[derive(Debug, thiserror::Error)]
pub enum NotionError {
    #[error("request to Notion failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Notion returned {status}: {message}")]
    Api { status: StatusCode, message: String },

    #[error("failed to decode Notion response: {0}")]
    Decode(#[from] serde_json::Error),
}
