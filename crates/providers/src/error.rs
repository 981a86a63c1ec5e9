use reqwest::StatusCode;

#[derive(Debug, thiserror::Error)]
pub enum SidecarError {
    #[error("sidecar request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("sidecar returned {status}: {body}")]
    Api { status: StatusCode, body: String },

    #[error("failed to decode sidecar response: {0}")]
    Decode(#[from] serde_json::Error),
}
