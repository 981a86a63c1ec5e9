//! Configuration for the devlog services.
//!
//! Settings come from an optional TOML file (path in `DEVLOG_CONFIG`,
//! falling back to `devlog.toml` in the working directory) with
//! environment-variable overrides applied on top. Secrets only ever enter
//! through the environment or the file; they are held behind [`secrecy`]
//! wrappers and never logged.

use std::{path::Path, str::FromStr};

use {
    secrecy::Secret,
    serde::Deserialize,
    tracing::{debug, warn},
};

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },
    #[error("failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid value for {key}: {value}")]
    Invalid { key: &'static str, value: String },
    #[error("missing required setting: {0}")]
    Missing(&'static str),
}

/// Deployment environment, used to resolve sidecar container names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RuntimeEnv {
    Dev,
    #[default]
    Prod,
}

impl FromStr for RuntimeEnv {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "dev" | "development" => Ok(Self::Dev),
            "prod" | "production" => Ok(Self::Prod),
            other => Err(other.to_string()),
        }
    }
}

/// Which implementation produces chat transcripts for link imports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScrapeBackend {
    /// Delegate to the AI sidecar's `/process-url` endpoint.
    #[default]
    Sidecar,
    /// Run the in-process headless browser.
    Local,
}

impl FromStr for ScrapeBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sidecar" => Ok(Self::Sidecar),
            "local" => Ok(Self::Local),
            other => Err(other.to_string()),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    pub port: u16,
    pub notion_port: u16,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            port: 8080,
            notion_port: 8000,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct BaasConfig {
    pub url: String,
    pub service_key: Option<Secret<String>>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct MongoConfig {
    pub url: String,
    pub database: String,
}

impl Default for MongoConfig {
    fn default() -> Self {
        Self {
            url: "mongodb://localhost:27017".to_string(),
            database: "devlog".to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct NotionConfig {
    pub token: Option<Secret<String>>,
    pub database_id: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SidecarConfig {
    pub runtime_env: RuntimeEnv,
    pub ai_port: u16,
    pub notion_port: u16,
    /// Explicit base URL overrides; when set they win over container-name
    /// resolution.
    pub ai_base_url: Option<String>,
    pub notion_base_url: Option<String>,
}

impl Default for SidecarConfig {
    fn default() -> Self {
        Self {
            runtime_env: RuntimeEnv::default(),
            ai_port: 3000,
            notion_port: 8000,
            ai_base_url: None,
            notion_base_url: None,
        }
    }
}

impl SidecarConfig {
    /// Base URL of the AI-processing sidecar.
    pub fn ai_base(&self) -> String {
        match &self.ai_base_url {
            Some(url) => url.trim_end_matches('/').to_string(),
            None => format!("http://{}:{}", self.container("ai-server"), self.ai_port),
        }
    }

    /// Base URL of the Notion-rendering sidecar.
    pub fn notion_base(&self) -> String {
        match &self.notion_base_url {
            Some(url) => url.trim_end_matches('/').to_string(),
            None => format!(
                "http://{}:{}",
                self.container("notion-server"),
                self.notion_port
            ),
        }
    }

    /// Containers on the internal network carry a `-dev` suffix in
    /// development deployments.
    fn container(&self, name: &str) -> String {
        match self.runtime_env {
            RuntimeEnv::Dev => format!("{name}-dev"),
            RuntimeEnv::Prod => name.to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SlackConfig {
    pub webhook_url: Option<Secret<String>>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ScrapeConfig {
    pub backend: ScrapeBackend,
    pub allowed_prefix: String,
}

impl Default for ScrapeConfig {
    fn default() -> Self {
        Self {
            backend: ScrapeBackend::default(),
            allowed_prefix: "https://chatgpt.com/share/".to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub http: HttpConfig,
    pub baas: BaasConfig,
    pub mongo: MongoConfig,
    pub notion: NotionConfig,
    pub sidecars: SidecarConfig,
    pub slack: SlackConfig,
    pub scrape: ScrapeConfig,
}

impl Config {
    /// Load configuration from the default file location and the process
    /// environment.
    pub fn load() -> Result<Self, ConfigError> {
        let path = std::env::var("DEVLOG_CONFIG").unwrap_or_else(|_| "devlog.toml".to_string());
        let mut config = if Path::new(&path).is_file() {
            debug!(%path, "loading config file");
            Self::from_file(&path)?
        } else {
            Self::default()
        };
        config.apply_env(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    pub fn from_file(path: &str) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_string(),
            source,
        })?;
        Ok(toml::from_str(&content)?)
    }

    /// Apply environment overrides. `get` abstracts the environment so the
    /// override logic is testable without touching process state.
    pub fn apply_env(
        &mut self,
        get: impl Fn(&str) -> Option<String>,
    ) -> Result<(), ConfigError> {
        if let Some(port) = get("DEVLOG_HTTP_PORT") {
            self.http.port = parse(&port, "DEVLOG_HTTP_PORT")?;
        }
        if let Some(port) = get("DEVLOG_NOTION_PORT") {
            self.http.notion_port = parse(&port, "DEVLOG_NOTION_PORT")?;
        }
        if let Some(url) = get("DEVLOG_BAAS_URL") {
            self.baas.url = url;
        }
        if let Some(key) = get("DEVLOG_BAAS_SERVICE_KEY") {
            self.baas.service_key = Some(Secret::new(key));
        }
        if let Some(url) = get("DEVLOG_MONGO_URL") {
            self.mongo.url = url;
        }
        if let Some(db) = get("DEVLOG_MONGO_DATABASE") {
            self.mongo.database = db;
        }
        if let Some(token) = get("DEVLOG_NOTION_TOKEN") {
            self.notion.token = Some(Secret::new(token));
        }
        if let Some(id) = get("DEVLOG_NOTION_DATABASE_ID") {
            self.notion.database_id = id;
        }
        if let Some(env) = get("DEVLOG_RUNTIME_ENV") {
            self.sidecars.runtime_env =
                env.parse().map_err(|value| ConfigError::Invalid {
                    key: "DEVLOG_RUNTIME_ENV",
                    value,
                })?;
        }
        if let Some(url) = get("DEVLOG_AI_BASE_URL") {
            self.sidecars.ai_base_url = Some(url);
        }
        if let Some(url) = get("DEVLOG_NOTION_BASE_URL") {
            self.sidecars.notion_base_url = Some(url);
        }
        if let Some(url) = get("DEVLOG_SLACK_WEBHOOK_URL") {
            self.slack.webhook_url = Some(Secret::new(url));
        }
        if let Some(backend) = get("DEVLOG_SCRAPE_BACKEND") {
            self.scrape.backend =
                backend.parse().map_err(|value| ConfigError::Invalid {
                    key: "DEVLOG_SCRAPE_BACKEND",
                    value,
                })?;
        }
        if let Some(prefix) = get("DEVLOG_SCRAPE_ALLOWED_PREFIX") {
            self.scrape.allowed_prefix = prefix;
        }
        if self.baas.url.is_empty() {
            warn!("baas.url is not configured; BaaS-backed routes will fail");
        }
        Ok(())
    }
}

fn parse<T: FromStr>(value: &str, key: &'static str) -> Result<T, ConfigError> {
    value.parse().map_err(|_| ConfigError::Invalid {
        key,
        value: value.to_string(),
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use {super::*, secrecy::ExposeSecret, std::collections::HashMap, std::io::Write};

    fn env_from(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn defaults_are_sane() {
        let config = Config::default();
        assert_eq!(config.http.port, 8080);
        assert_eq!(config.mongo.url, "mongodb://localhost:27017");
        assert_eq!(config.scrape.allowed_prefix, "https://chatgpt.com/share/");
        assert_eq!(config.scrape.backend, ScrapeBackend::Sidecar);
    }

    #[test]
    fn loads_from_toml_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
            [http]
            port = 9090

            [baas]
            url = "https://example.supabase.co"

            [sidecars]
            runtime_env = "dev"
            ai_port = 3100
            "#
        )
        .unwrap();

        let config = Config::from_file(file.path().to_str().unwrap()).unwrap();
        assert_eq!(config.http.port, 9090);
        assert_eq!(config.baas.url, "https://example.supabase.co");
        assert_eq!(config.sidecars.runtime_env, RuntimeEnv::Dev);
        assert_eq!(config.sidecars.ai_base(), "http://ai-server-dev:3100");
    }

    #[test]
    fn env_overrides_file_values() {
        let mut config = Config::default();
        let env = env_from(&[
            ("DEVLOG_HTTP_PORT", "1234"),
            ("DEVLOG_BAAS_URL", "https://baas.internal"),
            ("DEVLOG_BAAS_SERVICE_KEY", "svc-key"),
            ("DEVLOG_SCRAPE_BACKEND", "local"),
        ]);
        config.apply_env(|k| env.get(k).cloned()).unwrap();

        assert_eq!(config.http.port, 1234);
        assert_eq!(config.baas.url, "https://baas.internal");
        assert_eq!(
            config.baas.service_key.as_ref().unwrap().expose_secret(),
            "svc-key"
        );
        assert_eq!(config.scrape.backend, ScrapeBackend::Local);
    }

    #[test]
    fn invalid_port_is_rejected() {
        let mut config = Config::default();
        let env = env_from(&[("DEVLOG_HTTP_PORT", "not-a-port")]);
        let err = config.apply_env(|k| env.get(k).cloned()).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Invalid {
                key: "DEVLOG_HTTP_PORT",
                ..
            }
        ));
    }

    #[test]
    fn sidecar_resolution_prefers_explicit_override() {
        let mut sidecars = SidecarConfig {
            runtime_env: RuntimeEnv::Dev,
            ..SidecarConfig::default()
        };
        assert_eq!(sidecars.ai_base(), "http://ai-server-dev:3000");
        assert_eq!(sidecars.notion_base(), "http://notion-server-dev:8000");

        sidecars.runtime_env = RuntimeEnv::Prod;
        assert_eq!(sidecars.ai_base(), "http://ai-server:3000");

        sidecars.ai_base_url = Some("http://localhost:3000/".to_string());
        assert_eq!(sidecars.ai_base(), "http://localhost:3000");
    }

    #[test]
    fn runtime_env_parses_long_forms() {
        assert_eq!("development".parse::<RuntimeEnv>().unwrap(), RuntimeEnv::Dev);
        assert_eq!("PRODUCTION".parse::<RuntimeEnv>().unwrap(), RuntimeEnv::Prod);
        assert!("staging".parse::<RuntimeEnv>().is_err());
    }
}
