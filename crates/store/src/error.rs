use reqwest::StatusCode;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("request to BaaS failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// Non-2xx answer from the row API. `message` carries the PostgREST
    /// error message when the body was parseable.
    #[error("BaaS returned {status}: {message}")]
    Api { status: StatusCode, message: String },

    #[error("failed to decode BaaS response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("no row returned where one was required")]
    MissingRow,
}

impl StoreError {
    /// True for errors that indicate an absent row rather than a failure.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::MissingRow)
            || matches!(self, Self::Api { status, .. } if *status == StatusCode::NOT_FOUND)
    }
}
