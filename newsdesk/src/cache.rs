use crate::news_query::NewsQuery;
use crate::traits::ContentSource;
use crate::types::{GuardianArticle, GuardianList, GuardianSection, Result, RevalidationPolicy};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tokio::time::Instant;
use tracing::debug;

#[derive(Debug, Clone)]
struct CacheEntry<T> {
    value: T,
    fetched_at: Instant,
}

impl<T: Clone> CacheEntry<T> {
    fn fresh(&self, ttl: Duration) -> Option<T> {
        (self.fetched_at.elapsed() < ttl).then(|| self.value.clone())
    }
}

type Slot<T> = Arc<RwLock<HashMap<String, CacheEntry<T>>>>;

/// Wraps a [`ContentSource`] and serves repeated lookups from memory until
/// they go stale. Lists, single articles and the section list each have
/// their own staleness bound; errors are never cached.
pub struct CachedContentClient<S> {
    inner: S,
    policy: RevalidationPolicy,
    lists: Slot<GuardianList<GuardianArticle>>,
    articles: Slot<GuardianArticle>,
    sections: Slot<Vec<GuardianSection>>,
}

impl<S: ContentSource> CachedContentClient<S> {
    pub fn new(inner: S, policy: RevalidationPolicy) -> Self {
        Self {
            inner,
            policy,
            lists: Arc::new(RwLock::new(HashMap::new())),
            articles: Arc::new(RwLock::new(HashMap::new())),
            sections: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    pub fn inner(&self) -> &S {
        &self.inner
    }

    /// Drops every cached entry.
    pub async fn clear(&self) {
        self.lists.write().await.clear();
        self.articles.write().await.clear();
        self.sections.write().await.clear();
    }
}

async fn lookup<T: Clone>(slot: &Slot<T>, key: &str, ttl: Duration) -> Option<T> {
    let cache = slot.read().await;
    cache.get(key).and_then(|entry| entry.fresh(ttl))
}

/// Inserts `value` and evicts every entry that has outlived `ttl`.
async fn store<T>(slot: &Slot<T>, key: String, value: T, ttl: Duration) {
    let mut cache = slot.write().await;
    let before = cache.len();
    cache.retain(|_, entry| entry.fetched_at.elapsed() < ttl);
    let evicted = before - cache.len();
    if evicted > 0 {
        debug!("Evicted {} stale cache entries", evicted);
    }
    cache.insert(key, CacheEntry { value, fetched_at: Instant::now() });
}

fn list_key(query: &NewsQuery) -> String {
    query
        .to_params()
        .iter()
        .map(|(k, v)| format!("{k}={v}"))
        .collect::<Vec<_>>()
        .join("&")
}

#[async_trait]
impl<S: ContentSource> ContentSource for CachedContentClient<S> {
    async fn search(&self, query: &NewsQuery) -> Result<GuardianList<GuardianArticle>> {
        let key = list_key(query);
        if let Some(hit) = lookup(&self.lists, &key, self.policy.list).await {
            debug!("List cache hit: {}", key);
            return Ok(hit);
        }
        debug!("List cache miss: {}", key);
        let fresh = self.inner.search(query).await?;
        store(&self.lists, key, fresh.clone(), self.policy.list).await;
        Ok(fresh)
    }

    async fn article(&self, id: &str) -> Result<GuardianArticle> {
        if let Some(hit) = lookup(&self.articles, id, self.policy.article).await {
            debug!("Article cache hit: {}", id);
            return Ok(hit);
        }
        let fresh = self.inner.article(id).await?;
        store(&self.articles, id.to_string(), fresh.clone(), self.policy.article).await;
        Ok(fresh)
    }

    async fn sections(&self) -> Result<Vec<GuardianSection>> {
        const KEY: &str = "sections";
        if let Some(hit) = lookup(&self.sections, KEY, self.policy.sections).await {
            debug!("Section cache hit");
            return Ok(hit);
        }
        let fresh = self.inner.sections().await?;
        store(&self.sections, KEY.to_string(), fresh.clone(), self.policy.sections).await;
        Ok(fresh)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::NewsdeskError;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Default)]
    struct CountingSource {
        searches: AtomicUsize,
        articles: AtomicUsize,
        sections: AtomicUsize,
    }

    #[async_trait]
    impl ContentSource for CountingSource {
        async fn search(&self, _query: &NewsQuery) -> Result<GuardianList<GuardianArticle>> {
            self.searches.fetch_add(1, Ordering::SeqCst);
            Ok(GuardianList {
                status: "ok".to_string(),
                user_tier: "developer".to_string(),
                total: 0,
                start_index: 0,
                page_size: 20,
                current_page: 1,
                pages: 0,
                order_by: Some("newest".to_string()),
                results: Vec::new(),
            })
        }

        async fn article(&self, id: &str) -> Result<GuardianArticle> {
            self.articles.fetch_add(1, Ordering::SeqCst);
            Err(NewsdeskError::NotFound { id: id.to_string() })
        }

        async fn sections(&self) -> Result<Vec<GuardianSection>> {
            self.sections.fetch_add(1, Ordering::SeqCst);
            Ok(Vec::new())
        }
    }

    #[tokio::test(start_paused = true)]
    async fn lists_are_revalidated_after_five_minutes() {
        let cached = CachedContentClient::new(CountingSource::default(), RevalidationPolicy::default());
        let query = NewsQuery::top_headlines(None, 20);

        cached.search(&query).await.unwrap();
        cached.search(&query).await.unwrap();
        assert_eq!(cached.inner().searches.load(Ordering::SeqCst), 1);

        tokio::time::advance(Duration::from_secs(301)).await;
        cached.search(&query).await.unwrap();
        assert_eq!(cached.inner().searches.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn different_queries_are_cached_separately() {
        let cached = CachedContentClient::new(CountingSource::default(), RevalidationPolicy::default());
        cached.search(&NewsQuery::by_section("world", 1, 20)).await.unwrap();
        cached.search(&NewsQuery::by_section("world", 2, 20)).await.unwrap();
        assert_eq!(cached.inner().searches.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn expired_lists_are_evicted_on_store() {
        let cached = CachedContentClient::new(CountingSource::default(), RevalidationPolicy::default());
        for page in 1..=5 {
            cached.search(&NewsQuery::by_section("world", page, 20)).await.unwrap();
        }
        assert_eq!(cached.lists.read().await.len(), 5);

        tokio::time::advance(Duration::from_secs(301)).await;
        cached.search(&NewsQuery::by_section("politics", 1, 20)).await.unwrap();
        assert_eq!(cached.lists.read().await.len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn sections_live_for_a_day() {
        let cached = CachedContentClient::new(CountingSource::default(), RevalidationPolicy::default());
        cached.sections().await.unwrap();
        tokio::time::advance(Duration::from_secs(3600 * 23)).await;
        cached.sections().await.unwrap();
        assert_eq!(cached.inner().sections.load(Ordering::SeqCst), 1);

        tokio::time::advance(Duration::from_secs(3600 * 2)).await;
        cached.sections().await.unwrap();
        assert_eq!(cached.inner().sections.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn failures_are_not_cached() {
        let cached = CachedContentClient::new(CountingSource::default(), RevalidationPolicy::default());
        assert!(cached.article("missing").await.is_err());
        assert!(cached.article("missing").await.is_err());
        assert_eq!(cached.inner().articles.load(Ordering::SeqCst), 2);
    }
}
