//! The live browser path.

use {
    chromiumoxide::{
        Browser, BrowserConfig, Page,
        cdp::browser_protocol::{
            fetch::{
                ContinueRequestParams, EnableParams as FetchEnableParams, EventRequestPaused,
                FailRequestParams,
            },
            network::{ErrorReason, ResourceType},
        },
    },
    futures::StreamExt,
    tracing::{debug, warn},
};

use devlog_common::ChatTranscript;

use crate::extract::{pair_messages, validate_share_url};

const USER_SELECTOR: &str = r#"[data-message-author-role="user"]"#;
const ASSISTANT_SELECTOR: &str = r#"[data-message-author-role="assistant"]"#;

#[derive(Debug, thiserror::Error)]
pub enum ScrapeError {
    #[error("invalid share URL: {0}")]
    InvalidUrl(String),

    #[error("failed to launch browser: {0}")]
    Launch(String),

    #[error("browser protocol error: {0}")]
    Cdp(#[from] chromiumoxide::error::CdpError),

    #[error("shared page has no title heading")]
    MissingTitle,
}

/// Scraper for shared-conversation pages.
#[derive(Clone)]
pub struct BrowserScraper {
    allowed_prefix: String,
}

impl BrowserScraper {
    pub fn new(allowed_prefix: impl Into<String>) -> Self {
        Self {
            allowed_prefix: allowed_prefix.into(),
        }
    }

    /// Load `url` in a fresh headless browser and extract the transcript.
    pub async fn scrape(&self, url: &str) -> Result<ChatTranscript, ScrapeError> {
        validate_share_url(url, &self.allowed_prefix)?;

        let config = BrowserConfig::builder()
            .build()
            .map_err(ScrapeError::Launch)?;
        let (mut browser, mut handler) = Browser::launch(config).await?;
        let driver = tokio::spawn(async move { while handler.next().await.is_some() {} });

        let result = scrape_page(&browser, url).await;

        if let Err(e) = browser.close().await {
            warn!(error = %e, "failed to close browser");
        }
        driver.abort();

        result
    }
}

async fn scrape_page(browser: &Browser, url: &str) -> Result<ChatTranscript, ScrapeError> {
    let page = browser.new_page("about:blank").await?;
    block_static_resources(&page).await?;

    page.goto(url).await?;
    page.wait_for_navigation().await?;

    let chat_url = page.url().await?.unwrap_or_else(|| url.to_string());

    let title = page
        .find_element("h1")
        .await
        .map_err(|_| ScrapeError::MissingTitle)?
        .inner_text()
        .await?
        .ok_or(ScrapeError::MissingTitle)?;

    let user_texts = element_texts(&page, USER_SELECTOR).await?;
    let assistant_texts = element_texts(&page, ASSISTANT_SELECTOR).await?;
    debug!(
        questions = user_texts.len(),
        answers = assistant_texts.len(),
        "extracted conversation nodes"
    );

    Ok(ChatTranscript {
        chat_url,
        chat_room_title: title.trim().to_string(),
        data: pair_messages(user_texts, assistant_texts),
    })
}

/// Intercept every request and abort the static-asset classes the
/// transcript never needs.
async fn block_static_resources(page: &Page) -> Result<(), ScrapeError> {
    page.execute(FetchEnableParams::default()).await?;

    let mut paused = page.event_listener::<EventRequestPaused>().await?;
    let interceptor = page.clone();
    tokio::spawn(async move {
        while let Some(event) = paused.next().await {
            let request_id = event.request_id.clone();
            let blocked = matches!(
                event.resource_type,
                ResourceType::Image | ResourceType::Stylesheet | ResourceType::Font
            );
            let outcome = if blocked {
                interceptor
                    .execute(FailRequestParams::new(
                        request_id,
                        ErrorReason::BlockedByClient,
                    ))
                    .await
                    .map(|_| ())
            } else {
                interceptor
                    .execute(ContinueRequestParams::new(request_id))
                    .await
                    .map(|_| ())
            };
            if let Err(e) = outcome {
                // The page may already be gone; interception is best-effort.
                debug!(error = %e, "request interception command failed");
                break;
            }
        }
    });

    Ok(())
}

async fn element_texts(page: &Page, selector: &str) -> Result<Vec<String>, ScrapeError> {
    let elements = page.find_elements(selector).await.unwrap_or_default();
    let mut texts = Vec::with_capacity(elements.len());
    for element in elements {
        texts.push(element.inner_text().await?.unwrap_or_default());
    }
    Ok(texts)
}
