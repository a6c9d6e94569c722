//! Ad library state holder.
//!
//! Every filter change produces a new query generation. The fetch for the
//! previous generation is aborted, and a response that still arrives for an
//! older generation is dropped instead of published.

use crate::aggregator::{summarize, AdSummary};
use crate::filters::{compute_query, FilterOptions};
use crate::traits::AdDataSource;
use crate::types::{NewsdeskError, PoliticalAd, QuerySpec};
use futures::FutureExt;
use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

#[derive(Debug, Clone)]
pub enum LoadState {
    Idle,
    Loading,
    Ready {
        ads: Vec<PoliticalAd>,
        summary: AdSummary,
    },
    /// The source failed. Shared so snapshots stay cheap to clone.
    Failed(Arc<NewsdeskError>),
}

#[derive(Debug, Clone)]
pub struct LibrarySnapshot {
    pub generation: u64,
    pub query: QuerySpec,
    pub state: LoadState,
}

impl LibrarySnapshot {
    pub fn is_loading(&self) -> bool {
        matches!(self.state, LoadState::Loading)
    }

    pub fn ads(&self) -> &[PoliticalAd] {
        match &self.state {
            LoadState::Ready { ads, .. } => ads,
            _ => &[],
        }
    }

    pub fn summary(&self) -> Option<AdSummary> {
        match &self.state {
            LoadState::Ready { summary, .. } => Some(*summary),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&NewsdeskError> {
        match &self.state {
            LoadState::Failed(err) => Some(err.as_ref()),
            _ => None,
        }
    }
}

pub struct AdLibrary<S> {
    source: Arc<S>,
    filters: FilterOptions,
    generation: u64,
    in_flight: Option<JoinHandle<()>>,
    tx: Arc<watch::Sender<LibrarySnapshot>>,
}

impl<S: AdDataSource + 'static> AdLibrary<S> {
    /// Creates an idle library. Nothing is fetched until the first
    /// [`refresh`](Self::refresh) or filter change.
    pub fn new(source: S) -> Self {
        let (tx, _rx) = watch::channel(LibrarySnapshot {
            generation: 0,
            query: QuerySpec::new(),
            state: LoadState::Idle,
        });
        Self {
            source: Arc::new(source),
            filters: FilterOptions::default(),
            generation: 0,
            in_flight: None,
            tx: Arc::new(tx),
        }
    }

    pub fn filters(&self) -> &FilterOptions {
        &self.filters
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn subscribe(&self) -> watch::Receiver<LibrarySnapshot> {
        self.tx.subscribe()
    }

    pub fn snapshot(&self) -> LibrarySnapshot {
        self.tx.borrow().clone()
    }

    /// Replaces the filters and starts a fetch for them. Returns the new
    /// generation.
    pub fn set_filters(&mut self, filters: FilterOptions) -> u64 {
        self.filters = filters;
        self.refresh()
    }

    /// Edits the filters in place, e.g. `library.update(|f| f.platform = None)`.
    pub fn update<F>(&mut self, edit: F) -> u64
    where
        F: FnOnce(&mut FilterOptions),
    {
        edit(&mut self.filters);
        self.refresh()
    }

    /// Re-runs the query for the current filters under a new generation.
    pub fn refresh(&mut self) -> u64 {
        if let Some(handle) = self.in_flight.take() {
            if !handle.is_finished() {
                debug!("Aborting fetch for generation {}", self.generation);
                handle.abort();
            }
        }

        self.generation += 1;
        let generation = self.generation;
        let query = compute_query(&self.filters);
        debug!("Generation {} query: {:?}", generation, query);

        self.tx.send_replace(LibrarySnapshot {
            generation,
            query: query.clone(),
            state: LoadState::Loading,
        });

        let source = Arc::clone(&self.source);
        let tx = Arc::clone(&self.tx);
        self.in_flight = Some(tokio::spawn(async move {
            let outcome = AssertUnwindSafe(source.fetch_ads(&query)).catch_unwind().await;
            let state = match outcome.unwrap_or_else(|panic| {
                Err(NewsdeskError::SourcePanicked {
                    name: source.source_name(),
                    message: panic_message(panic.as_ref()),
                })
            }) {
                Ok(response) => {
                    info!(
                        "Fetched {} ads from {} for generation {}",
                        response.ads.len(),
                        source.source_name(),
                        generation
                    );
                    let summary = summarize(&response.ads);
                    LoadState::Ready { ads: response.ads, summary }
                }
                Err(err) => {
                    warn!("Ad fetch from {} failed: {}", source.source_name(), err);
                    LoadState::Failed(Arc::new(err))
                }
            };

            // The check runs under the channel's lock, so a newer generation
            // published concurrently always wins.
            let published = tx.send_if_modified(|current| {
                if current.generation != generation {
                    return false;
                }
                current.state = state;
                true
            });
            if !published {
                debug!("Dropping stale result for generation {}", generation);
            }
        }));

        generation
    }

    /// Waits until the current generation has finished loading and returns
    /// its snapshot.
    pub async fn settled(&self) -> LibrarySnapshot {
        let mut rx = self.tx.subscribe();
        loop {
            {
                let snapshot = rx.borrow_and_update();
                if snapshot.generation == self.generation && !snapshot.is_loading() {
                    return snapshot.clone();
                }
            }
            if rx.changed().await.is_err() {
                return rx.borrow().clone();
            }
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    payload
        .downcast_ref::<&str>()
        .map(|msg| msg.to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "unknown panic".to_string())
}

impl<S> Drop for AdLibrary<S> {
    fn drop(&mut self) {
        if let Some(handle) = self.in_flight.take() {
            handle.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filters::Platform;
    use crate::types::{AdsResponse, Result};
    use async_trait::async_trait;
    use chrono::NaiveDate;
    use std::time::Duration;

    fn ad(id: &str, platform: &str) -> PoliticalAd {
        PoliticalAd {
            id: id.to_string(),
            advertiser: "Advertiser".to_string(),
            candidate: "Candidate".to_string(),
            platform: platform.to_string(),
            format: "Image".to_string(),
            amount_spent: 100.0,
            impressions: 10,
            start_date: NaiveDate::from_ymd_opt(2024, 5, 1).unwrap(),
            end_date: NaiveDate::from_ymd_opt(2024, 5, 2).unwrap(),
        }
    }

    /// Answers Google queries slowly and everything else immediately.
    struct SlowGoogleSource;

    #[async_trait]
    impl AdDataSource for SlowGoogleSource {
        fn source_name(&self) -> String {
            "slow-google".to_string()
        }

        async fn fetch_ads(&self, query: &QuerySpec) -> Result<AdsResponse> {
            match query.get("platform") {
                Some("Google") => {
                    tokio::time::sleep(Duration::from_secs(10)).await;
                    Ok(AdsResponse { ads: vec![ad("google-1", "Google")] })
                }
                Some("Snapchat") => panic!("fixture exploded"),
                Some("X") => Err(NewsdeskError::Upstream { status: 503, message: "Service Unavailable".to_string() }),
                _ => Ok(AdsResponse { ads: vec![ad("fb-1", "Facebook"), ad("fb-2", "Facebook")] }),
            }
        }
    }

    #[tokio::test(start_paused = true)]
    async fn superseded_fetch_never_publishes() {
        let mut library = AdLibrary::new(SlowGoogleSource);
        let mut rx = library.subscribe();

        library.update(|f| f.platform = Some(Platform::Google));
        let latest = library.update(|f| f.platform = Some(Platform::Facebook));

        let snapshot = library.settled().await;
        assert_eq!(snapshot.generation, latest);
        assert_eq!(snapshot.ads().len(), 2);

        tokio::time::advance(Duration::from_secs(30)).await;
        tokio::task::yield_now().await;

        let after = rx.borrow_and_update().clone();
        assert_eq!(after.generation, latest);
        assert!(after.ads().iter().all(|ad| ad.platform == "Facebook"));
    }

    #[tokio::test]
    async fn failures_are_published_not_emptied() {
        let mut library = AdLibrary::new(SlowGoogleSource);
        library.update(|f| f.platform = Some(Platform::X));

        let snapshot = library.settled().await;
        assert!(snapshot.summary().is_none());
        assert!(matches!(
            snapshot.error(),
            Some(NewsdeskError::Upstream { status: 503, .. })
        ));
    }

    #[tokio::test]
    async fn panicking_source_settles_as_failed() {
        let mut library = AdLibrary::new(SlowGoogleSource);
        library.update(|f| f.platform = Some(Platform::Snapchat));

        let snapshot = tokio::time::timeout(Duration::from_secs(5), library.settled())
            .await
            .expect("library should settle after a panic");
        match snapshot.error() {
            Some(NewsdeskError::SourcePanicked { name, message }) => {
                assert_eq!(name, "slow-google");
                assert_eq!(message, "fixture exploded");
            }
            other => panic!("expected a panic failure, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn snapshot_carries_summary_and_query() {
        let mut library = AdLibrary::new(SlowGoogleSource);
        assert!(matches!(library.snapshot().state, LoadState::Idle));

        library.refresh();
        let snapshot = library.settled().await;
        assert!(snapshot.query.is_empty());
        let summary = snapshot.summary().unwrap();
        assert_eq!(summary.count, 2);
        assert_eq!(summary.distinct_platforms, 1);
    }
}
