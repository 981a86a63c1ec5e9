use std::sync::Arc;

use anyhow::Context;

use {
    devlog_browser::BrowserScraper,
    devlog_config::Config,
    devlog_providers::{AiClient, NotionSidecarClient, SlackNotifier},
    devlog_reviews::ReviewStore,
    devlog_store::BaasClient,
};

/// Everything a handler can reach: configuration plus one client per
/// collaborator. Constructed once at startup and shared.
pub struct AppState {
    pub config: Config,
    pub baas: BaasClient,
    pub reviews: ReviewStore,
    pub ai: AiClient,
    pub notion_sidecar: NotionSidecarClient,
    pub slack: SlackNotifier,
    pub scraper: BrowserScraper,
}

impl AppState {
    pub async fn new(config: Config) -> anyhow::Result<Arc<Self>> {
        let service_key = config
            .baas
            .service_key
            .clone()
            .context("baas.service_key is not configured")?;
        let baas = BaasClient::new(config.baas.url.clone(), service_key);

        let mongo = mongodb::Client::with_uri_str(&config.mongo.url)
            .await
            .context("invalid mongo.url")?;
        let reviews = ReviewStore::new(&mongo, &config.mongo.database);

        let ai = AiClient::new(config.sidecars.ai_base());
        let notion_sidecar = NotionSidecarClient::new(config.sidecars.notion_base());
        let slack = SlackNotifier::new(config.slack.webhook_url.clone());
        let scraper = BrowserScraper::new(config.scrape.allowed_prefix.clone());

        Ok(Arc::new(Self {
            config,
            baas,
            reviews,
            ai,
            notion_sidecar,
            slack,
            scraper,
        }))
    }
}
