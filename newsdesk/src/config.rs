use crate::types::{AdSourceConfig, ContentApiConfig, NewsdeskError, Result, RevalidationPolicy};
use std::env;
use std::path::Path;
use tracing::debug;

pub const API_KEY_VAR: &str = "GUARDIAN_API_KEY";

/// Runtime configuration assembled from the environment.
///
/// The content API key is optional here; only the news commands need it,
/// and they ask for it through [`Config::content_api`].
#[derive(Debug, Clone)]
pub struct Config {
    pub content_api: ContentApiConfig,
    pub ad_source: AdSourceConfig,
    pub revalidation: RevalidationPolicy,
}

impl Config {
    /// Loads `.env`, then `.env.{APP_ENV}`, then reads the environment.
    pub fn load() -> Result<Self> {
        load_dotenv(Path::new("."));
        Self::from_env()
    }

    /// Reads `GUARDIAN_API_KEY` plus the optional `GUARDIAN_API_BASE_URL`,
    /// `AD_API_BASE_URL`, `NEWSDESK_TIMEOUT_SECONDS` and
    /// `NEWSDESK_USER_AGENT` overrides.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_key = lookup(API_KEY_VAR)
            .map(|key| key.trim().to_string())
            .unwrap_or_default();

        let mut content_api = ContentApiConfig::new(api_key);
        let mut ad_source = AdSourceConfig::default();

        if let Some(base_url) = lookup("GUARDIAN_API_BASE_URL") {
            content_api.base_url = base_url;
        }
        if let Some(base_url) = lookup("AD_API_BASE_URL") {
            ad_source.base_url = base_url;
        }
        if let Some(raw) = lookup("NEWSDESK_TIMEOUT_SECONDS") {
            let seconds: u64 = raw.trim().parse().map_err(|_| {
                NewsdeskError::Config(format!("NEWSDESK_TIMEOUT_SECONDS must be a whole number, got {raw:?}"))
            })?;
            content_api.timeout_seconds = seconds;
            ad_source.timeout_seconds = seconds;
        }
        if let Some(user_agent) = lookup("NEWSDESK_USER_AGENT") {
            content_api.user_agent = user_agent.clone();
            ad_source.user_agent = user_agent;
        }

        Ok(Self {
            content_api,
            ad_source,
            revalidation: RevalidationPolicy::default(),
        })
    }

    /// Content API settings, failing when no API key was configured.
    pub fn content_api(&self) -> Result<ContentApiConfig> {
        if self.content_api.api_key.is_empty() {
            return Err(NewsdeskError::Config(format!(
                "{API_KEY_VAR} environment variable is not set"
            )));
        }
        Ok(self.content_api.clone())
    }
}

/// Loads `dir/.env` and then `dir/.env.{APP_ENV}`. Missing files are
/// skipped and variables already set in the process are left alone.
fn load_dotenv(dir: &Path) {
    if dotenvy::from_path(dir.join(".env")).is_ok() {
        debug!("Loaded environment from {}", dir.join(".env").display());
    }

    let env_name = env::var("APP_ENV").unwrap_or_else(|_| "development".to_string());
    let path = dir.join(format!(".env.{}", env_name));
    if dotenvy::from_path(&path).is_ok() {
        debug!("Loaded environment from {}", path.display());
    }
}
