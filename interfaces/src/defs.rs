use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A single political ad as returned by the ad data source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PoliticalAd {
    pub id: String,
    pub advertiser: String,
    pub candidate: String,
    pub platform: String,
    pub format: String,
    pub amount_spent: f64,
    pub impressions: u64,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

/// Envelope of the ad data source: `{ "ads": [...] }`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AdsResponse {
    #[serde(default)]
    pub ads: Vec<PoliticalAd>,
}

/// Flat query-parameter map sent to the ad data source.
///
/// Keys are kept sorted so two specs built from the same filters compare and
/// serialize identically.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct QuerySpec(BTreeMap<String, String>);

impl QuerySpec {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.0.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl FromIterator<(String, String)> for QuerySpec {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ads_response_tolerates_missing_list() {
        let parsed: AdsResponse = serde_json::from_str("{}").unwrap();
        assert!(parsed.ads.is_empty());
    }

    #[test]
    fn political_ad_reads_iso_dates() {
        let json = r#"{
            "id": "ad-1",
            "advertiser": "Acme, Inc.",
            "candidate": "Jane Doe",
            "platform": "Facebook",
            "format": "Video",
            "amount_spent": 1250.5,
            "impressions": 40000,
            "start_date": "2024-09-01",
            "end_date": "2024-09-30"
        }"#;
        let ad: PoliticalAd = serde_json::from_str(json).unwrap();
        assert_eq!(ad.advertiser, "Acme, Inc.");
        assert_eq!(ad.start_date, NaiveDate::from_ymd_opt(2024, 9, 1).unwrap());
        assert_eq!(ad.impressions, 40_000);
    }

    #[test]
    fn query_spec_serializes_as_flat_sorted_map() {
        let mut spec = QuerySpec::new();
        spec.insert("platform", "Facebook");
        spec.insert("min_amount", "500");
        let json = serde_json::to_string(&spec).unwrap();
        assert_eq!(json, r#"{"min_amount":"500","platform":"Facebook"}"#);
    }
}
