use crate::filters::FilterOptions;
use crate::traits::AdDataSource;
use crate::types::{AdsResponse, PoliticalAd, QuerySpec, Result};
use async_trait::async_trait;
use std::path::Path;
use tracing::info;

/// In-process ad source over a fixed set of ads, e.g. a JSON fixture.
///
/// Queries are evaluated with the same filter semantics the library uses, by
/// reading the [`QuerySpec`] back into [`FilterOptions`].
#[derive(Debug, Clone, Default)]
pub struct StaticAdSource {
    name: String,
    ads: Vec<PoliticalAd>,
}

impl StaticAdSource {
    pub fn new(name: impl Into<String>, ads: Vec<PoliticalAd>) -> Self {
        Self { name: name.into(), ads }
    }

    /// Loads `{"ads": [...]}` from a file.
    pub async fn from_json_file(path: &Path) -> Result<Self> {
        let raw = tokio::fs::read_to_string(path).await?;
        let parsed: AdsResponse = serde_json::from_str(&raw)?;
        info!("Loaded {} ads from {}", parsed.ads.len(), path.display());
        Ok(Self::new(path.display().to_string(), parsed.ads))
    }

    pub fn len(&self) -> usize {
        self.ads.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ads.is_empty()
    }
}

#[async_trait]
impl AdDataSource for StaticAdSource {
    fn source_name(&self) -> String {
        self.name.clone()
    }

    async fn fetch_ads(&self, query: &QuerySpec) -> Result<AdsResponse> {
        let filters = FilterOptions::from_query_spec(query);
        Ok(AdsResponse {
            ads: filters.apply(self.ads.clone()),
        })
    }
}
