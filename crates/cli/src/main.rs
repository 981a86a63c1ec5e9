//! `devlog`: run the API gateway, the Notion renderer sidecar, or a
//! one-off scrape.

use {
    anyhow::Context,
    clap::{Parser, Subcommand},
    secrecy::Secret,
    tracing::info,
    tracing_subscriber::EnvFilter,
};

use {
    devlog_browser::BrowserScraper,
    devlog_config::Config,
    devlog_gateway::{AppState, build_router},
    devlog_notion::{NotionClient, service},
};

#[derive(Parser)]
#[command(name = "devlog", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run the main API gateway.
    Api,
    /// Run the Notion renderer sidecar.
    Notion,
    /// Scrape a shared conversation and print the transcript as JSON.
    Scrape {
        /// Shared conversation URL.
        url: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Best-effort: a missing .env file is not an error.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();
    let config = Config::load()?;

    match cli.command {
        Command::Api => serve_api(config).await,
        Command::Notion => serve_notion(config).await,
        Command::Scrape { url } => scrape(config, &url).await,
    }
}

async fn serve_api(config: Config) -> anyhow::Result<()> {
    let port = config.http.port;
    let state = AppState::new(config).await?;
    let router = build_router(state);

    let listener = tokio::net::TcpListener::bind(("0.0.0.0", port))
        .await
        .with_context(|| format!("failed to bind port {port}"))?;
    info!(%port, "api gateway listening");
    axum::serve(listener, router).await?;
    Ok(())
}

async fn serve_notion(config: Config) -> anyhow::Result<()> {
    let token = config
        .notion
        .token
        .clone()
        .unwrap_or_else(|| Secret::new(String::new()));
    let state = service::ServiceState {
        client: NotionClient::new(token),
        database_id: config.notion.database_id.clone(),
    };
    let router = service::router(state);

    let port = config.http.notion_port;
    let listener = tokio::net::TcpListener::bind(("0.0.0.0", port))
        .await
        .with_context(|| format!("failed to bind port {port}"))?;
    info!(%port, "notion renderer listening");
    axum::serve(listener, router).await?;
    Ok(())
}

async fn scrape(config: Config, url: &str) -> anyhow::Result<()> {
    let scraper = BrowserScraper::new(config.scrape.allowed_prefix.clone());
    let transcript = scraper.scrape(url).await?;
    println!("{}", serde_json::to_string_pretty(&transcript)?);
    Ok(())
}
