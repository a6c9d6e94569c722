use async_trait::async_trait;
use chrono::NaiveDate;
use newsdesk::{
    compute_query, export_to_dir, parse_page, AdDataSource, AdLibrary, AdsResponse, FilterOptions,
    NewsdeskError, Platform, PoliticalAd, QuerySpec, Result, SortDirection, StaticAdSource,
};
use std::sync::{Arc, Mutex, Once};
use tracing::info;

static INIT: Once = Once::new();

fn init_tracing() {
    INIT.call_once(|| {
        tracing_subscriber::fmt()
            .with_max_level(tracing::Level::DEBUG)
            .try_init()
            .ok();
    });
}

fn ad(id: &str, advertiser: &str, platform: &str, amount: f64, impressions: u64) -> PoliticalAd {
    PoliticalAd {
        id: id.to_string(),
        advertiser: advertiser.to_string(),
        candidate: "Jane Doe".to_string(),
        platform: platform.to_string(),
        format: "Video".to_string(),
        amount_spent: amount,
        impressions,
        start_date: NaiveDate::from_ymd_opt(2024, 9, 1).unwrap(),
        end_date: NaiveDate::from_ymd_opt(2024, 9, 30).unwrap(),
    }
}

/// Returns a fixed answer and remembers every query it was asked.
#[derive(Clone)]
struct RecordingSource {
    ads: Vec<PoliticalAd>,
    seen: Arc<Mutex<Vec<QuerySpec>>>,
}

#[async_trait]
impl AdDataSource for RecordingSource {
    fn source_name(&self) -> String {
        "recording".to_string()
    }

    async fn fetch_ads(&self, query: &QuerySpec) -> Result<AdsResponse> {
        self.seen.lock().unwrap().push(query.clone());
        Ok(AdsResponse { ads: self.ads.clone() })
    }
}

#[tokio::test]
async fn facebook_spend_window_is_summarised() -> anyhow::Result<()> {
    init_tracing();

    let seen = Arc::new(Mutex::new(Vec::new()));
    let source = RecordingSource {
        ads: vec![
            ad("1", "Acme PAC", "Facebook", 600.0, 10_000),
            ad("2", "Acme PAC", "Facebook", 700.0, 15_000),
            ad("3", "Acme PAC", "Instagram", 800.0, 20_000),
        ],
        seen: Arc::clone(&seen),
    };

    let mut library = AdLibrary::new(source);
    library.set_filters(FilterOptions {
        platform: Some(Platform::Facebook),
        min_amount: 500.0,
        max_amount: 1000.0,
        ..FilterOptions::default()
    });
    let snapshot = library.settled().await;

    let summary = snapshot.summary().expect("fetch should succeed");
    assert_eq!(summary.count, 3);
    assert_eq!(summary.total_spent, 2100.0);
    assert_eq!(summary.total_impressions, 45_000);
    assert_eq!(summary.distinct_platforms, 2);

    let queries = seen.lock().unwrap().clone();
    assert_eq!(queries.len(), 1);
    let query = &queries[0];
    assert_eq!(query.get("platform"), Some("Facebook"));
    assert_eq!(query.get("min_amount"), Some("500"));
    assert_eq!(query.get("max_amount"), Some("1000"));
    assert_eq!(query.len(), 3);

    info!("Scenario summary: {:?}", summary);
    Ok(())
}

#[tokio::test]
async fn static_source_applies_filters_and_sort_locally() -> anyhow::Result<()> {
    init_tracing();

    let source = StaticAdSource::new(
        "fixture",
        vec![
            ad("1", "Acme PAC", "Facebook", 600.0, 10_000),
            ad("2", "Other Fund", "Facebook", 900.0, 5_000),
            ad("3", "Acme PAC", "Google", 800.0, 20_000),
            ad("4", "Acme PAC", "Facebook", 1500.0, 1_000),
        ],
    );

    let mut library = AdLibrary::new(source);
    library.set_filters(FilterOptions {
        search_query: "acme".to_string(),
        platform: Some(Platform::Facebook),
        amount_spent_sort: Some(SortDirection::Desc),
        ..FilterOptions::default()
    });
    let snapshot = library.settled().await;
    let ids: Vec<&str> = snapshot.ads().iter().map(|ad| ad.id.as_str()).collect();
    assert_eq!(ids, vec!["4", "1"]);

    library.update(|f| f.max_amount = 1000.0);
    let snapshot = library.settled().await;
    let ids: Vec<&str> = snapshot.ads().iter().map(|ad| ad.id.as_str()).collect();
    assert_eq!(ids, vec!["1"]);
    Ok(())
}

#[tokio::test]
async fn fixture_file_feeds_the_library_and_export() -> anyhow::Result<()> {
    init_tracing();

    let dir = std::env::temp_dir().join(format!("newsdesk-export-{}", std::process::id()));
    std::fs::create_dir_all(&dir)?;
    let fixture = dir.join("ads.json");
    let body = serde_json::to_string(&AdsResponse {
        ads: vec![
            ad("1", "Acme, Inc.", "Facebook", 600.0, 10_000),
            ad("2", "The \"Real\" Committee", "X", 700.0, 15_000),
        ],
    })?;
    std::fs::write(&fixture, body)?;

    let source = StaticAdSource::from_json_file(&fixture).await?;
    assert_eq!(source.len(), 2);

    let mut library = AdLibrary::new(source);
    library.refresh();
    let snapshot = library.settled().await;

    let path = export_to_dir(snapshot.ads(), &dir)?;
    assert!(path.ends_with("political-ads.csv"));
    let written = std::fs::read_to_string(&path)?;
    let mut lines = written.lines();
    assert_eq!(
        lines.next(),
        Some("ID,Advertiser,Candidate,Platform,Format,Amount Spent,Impressions,Start Date,End Date")
    );
    assert!(lines.next().unwrap_or_default().starts_with("1,\"Acme, Inc.\","));
    assert!(lines.next().unwrap_or_default().starts_with("2,\"The \"\"Real\"\" Committee\","));

    std::fs::remove_dir_all(&dir).ok();
    Ok(())
}

#[tokio::test]
async fn missing_fixture_is_an_io_error() {
    let result = StaticAdSource::from_json_file(std::path::Path::new("/definitely/not/here.json")).await;
    let err = tokio_test::assert_err!(result);
    assert!(matches!(err, NewsdeskError::Io(_)));
}

#[test]
fn default_filters_send_no_parameters() {
    assert!(compute_query(&FilterOptions::default()).is_empty());
}

#[test]
fn garbage_page_parameter_reads_as_first_page() {
    assert_eq!(parse_page(Some("abc")), 1);
}
