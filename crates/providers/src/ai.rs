//! Client for the AI-processing sidecar.

use tracing::debug;

use devlog_common::ChatTranscript;

use crate::error::SidecarError;

/// Thin wrapper over the sidecar's HTTP surface. The sidecar owns every
/// LLM concern; this client only ships URLs in and transcripts out.
#[derive(Clone)]
pub struct AiClient {
    http: reqwest::Client,
    base_url: String,
}

impl AiClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    /// Scrape a shared conversation through the sidecar's headless browser.
    pub async fn process_url(&self, url: &str) -> Result<ChatTranscript, SidecarError> {
        debug!(%url, "delegating scrape to ai sidecar");
        let resp = self
            .http
            .get(format!("{}/process-url", self.base_url))
            .query(&[("url", url)])
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

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn process_url_decodes_transcript() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/process-url")
            .match_query(mockito::Matcher::UrlEncoded(
                "url".into(),
                "https://chatgpt.com/share/abc".into(),
            ))
            .with_status(200)
            .with_body(
                r#"{
                    "chatUrl": "https://chatgpt.com/share/abc",
                    "chatRoomTitle": "Async traits",
                    "data": [{"question": "how?", "answer": "like this"}]
                }"#,
            )
            .create_async()
            .await;

        let transcript = AiClient::new(server.url())
            .process_url("https://chatgpt.com/share/abc")
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(transcript.chat_room_title, "Async traits");
        assert_eq!(transcript.data[0].answer, "like this");
    }

    #[tokio::test]
    async fn sidecar_error_carries_body() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/process-url")
            .match_query(mockito::Matcher::Any)
            .with_status(500)
            .with_body("Invalid URL")
            .create_async()
            .await;

        let err = AiClient::new(server.url())
            .process_url("https://chatgpt.com/share/bad")
            .await
            .unwrap_err();
        match err {
            SidecarError::Api { status, body } => {
                assert_eq!(status.as_u16(), 500);
                assert_eq!(body, "Invalid URL");
            },
            other => panic!("unexpected error: {other}"),
        }
    }
}
