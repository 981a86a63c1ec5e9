//! Slack incoming-webhook notifications.
//!
//! Notifications are opportunistic: a failed post is logged and swallowed
//! so a Slack outage can never fail the request that triggered it.

use {
    secrecy::{ExposeSecret, Secret},
    serde_json::json,
    tracing::{debug, warn},
};

#[derive(Clone)]
pub struct SlackNotifier {
    http: reqwest::Client,
    webhook_url: Option<Secret<String>>,
}

impl SlackNotifier {
    pub fn new(webhook_url: Option<Secret<String>>) -> Self {
        Self {
            http: reqwest::Client::new(),
            webhook_url,
        }
    }

    /// A notifier that never sends anything.
    pub fn disabled() -> Self {
        Self::new(None)
    }

    pub fn is_enabled(&self) -> bool {
        self.webhook_url.is_some()
    }

    /// Post a plain-text message. Best-effort by contract.
    pub async fn notify(&self, text: &str) {
        let Some(webhook_url) = &self.webhook_url else {
            debug!("slack notifications disabled, dropping message");
            return;
        };

        let result = self
            .http
            .post(webhook_url.expose_secret())
            .json(&json!({ "text": text }))
            .send()
            .await;

        match result {
            Ok(resp) if resp.status().is_success() => {},
            Ok(resp) => warn!(status = %resp.status(), "slack webhook rejected message"),
            Err(e) => warn!(error = %e, "failed to reach slack webhook"),
        }
    }

    /// Notification for a freshly imported note.
    pub async fn notify_note_created(&self, title: &str, conversation_id: i64) {
        self.notify(&format!(
            "New tech note \"{title}\" created from conversation {conversation_id}"
        ))
        .await;
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn posts_text_payload() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/hook")
            .match_body(mockito::Matcher::Json(json!({
                "text": "New tech note \"Borrowing\" created from conversation 12"
            })))
            .with_status(200)
            .create_async()
            .await;

        let notifier = SlackNotifier::new(Some(Secret::new(format!("{}/hook", server.url()))));
        notifier.notify_note_created("Borrowing", 12).await;
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn disabled_notifier_sends_nothing() {
        // No server at all: a send attempt would error loudly in the logs,
        // but the call itself must not panic or block.
        SlackNotifier::disabled().notify("dropped").await;
    }

    #[tokio::test]
    async fn webhook_failure_is_swallowed() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/hook")
            .with_status(500)
            .create_async()
            .await;

        let notifier = SlackNotifier::new(Some(Secret::new(format!("{}/hook", server.url()))));
        notifier.notify("still fine").await;
    }
}
