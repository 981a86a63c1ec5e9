//! Client for the Notion-rendering sidecar.

use {serde_json::Value, tracing::debug};

use crate::error::SidecarError;

#[derive(Clone)]
pub struct NotionSidecarClient {
    http: reqwest::Client,
    base_url: String,
}

impl NotionSidecarClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    /// Fetch the rendered record for a Notion page. The payload is passed
    /// through untouched; the renderer owns its shape.
    pub async fn render_page(&self, page_id: &str) -> Result<Value, SidecarError> {
        debug!(%page_id, "fetching rendered notion page");
        let resp = self
            .http
            .get(format!("{}/notion/{page_id}", self.base_url))
            .send()
            .await?;

        let status = resp.status();
        let body = resp.text().await?;
        if !status.is_success() {
            return Err(SidecarError::Api { status, body });
        }
        Ok(serde_json::from_str(&body)?)
    }
}
