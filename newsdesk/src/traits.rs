use crate::news_query::NewsQuery;
use crate::types::{AdsResponse, GuardianArticle, GuardianList, GuardianSection, QuerySpec, Result};
use async_trait::async_trait;

/// Anything that can answer the ad library's queries.
#[async_trait]
pub trait AdDataSource: Send + Sync {
    /// Human-readable name for logs.
    fn source_name(&self) -> String;

    /// Fetch the ads matching `query`. Failures are returned as-is; an error
    /// must never be turned into an empty result.
    async fn fetch_ads(&self, query: &QuerySpec) -> Result<AdsResponse>;
}

/// Read access to the news content API.
#[async_trait]
pub trait ContentSource: Send + Sync {
    async fn search(&self, query: &NewsQuery) -> Result<GuardianList<GuardianArticle>>;

    async fn article(&self, id: &str) -> Result<GuardianArticle>;

    async fn sections(&self) -> Result<Vec<GuardianSection>>;
}
