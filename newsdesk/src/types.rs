use std::time::Duration;

pub use interfaces::defs::{AdsResponse, PoliticalAd, QuerySpec};
pub use interfaces::guardian::{
    GuardianArticle, GuardianArticleFields, GuardianErrorResponse, GuardianList,
    GuardianListResponse, GuardianSection, GuardianSingleResponse, GuardianTag,
};

pub const GUARDIAN_API_BASE_URL: &str = "https://content.guardianapis.com";
pub const DEFAULT_AD_API_BASE_URL: &str = "http://localhost:8080";

/// Settings for the Guardian content API client.
#[derive(Debug, Clone)]
pub struct ContentApiConfig {
    pub base_url: String,
    pub api_key: String,
    pub user_agent: String,
    pub timeout_seconds: u64,
}

impl ContentApiConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            ..Self::default()
        }
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }
}

impl Default for ContentApiConfig {
    fn default() -> Self {
        Self {
            base_url: GUARDIAN_API_BASE_URL.to_string(),
            api_key: String::new(),
            user_agent: "Newsdesk/1.0".to_string(),
            timeout_seconds: 10,
        }
    }
}

/// Settings for the political ad data source.
#[derive(Debug, Clone)]
pub struct AdSourceConfig {
    pub base_url: String,
    pub user_agent: String,
    pub timeout_seconds: u64,
}

impl AdSourceConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }
}

impl Default for AdSourceConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_AD_API_BASE_URL.to_string(),
            user_agent: "Newsdesk/1.0".to_string(),
            timeout_seconds: 10,
        }
    }
}

/// Staleness bounds for cached content lookups.
#[derive(Debug, Clone, Copy)]
pub struct RevalidationPolicy {
    pub list: Duration,
    pub article: Duration,
    pub sections: Duration,
}

impl Default for RevalidationPolicy {
    fn default() -> Self {
        Self {
            list: Duration::from_secs(300),
            article: Duration::from_secs(3600),
            sections: Duration::from_secs(86_400),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum NewsdeskError {
    /// Transport failure or timeout while reaching an external API.
    #[error("network error: {0}")]
    Network(#[source] reqwest::Error),

    #[error("upstream returned {status}: {message}")]
    Upstream { status: u16, message: String },

    #[error("invalid input: {0}")]
    Validation(String),

    #[error("no content found for {id}")]
    NotFound { id: String },

    #[error("ad source {name} panicked: {message}")]
    SourcePanicked { name: String, message: String },

    #[error("configuration error: {0}")]
    Config(String),

    #[error("could not decode response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<reqwest::Error> for NewsdeskError {
    fn from(err: reqwest::Error) -> Self {
        match err.status() {
            Some(status) => NewsdeskError::Upstream {
                status: status.as_u16(),
                message: status.canonical_reason().unwrap_or("Unknown").to_string(),
            },
            None => NewsdeskError::Network(err),
        }
    }
}

impl NewsdeskError {
    pub fn is_timeout(&self) -> bool {
        matches!(self, NewsdeskError::Network(e) if e.is_timeout())
    }
}

pub type Result<T> = std::result::Result<T, NewsdeskError>;
