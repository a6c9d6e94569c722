//! Ad library filter state and its translation into a data-source query.
//!
//! `FilterOptions` is what the library view holds and mutates. `translate`
//! turns it into the flat [`QuerySpec`] the ad data source understands,
//! leaving out every filter that sits at its unconstrained default, and
//! `FilterOptions::from_query_spec` reads such a spec back for sources that
//! evaluate the query in process.

use crate::types::{NewsdeskError, PoliticalAd, QuerySpec, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;
use tracing::{debug, warn};

pub const DEFAULT_MIN_AMOUNT: f64 = 0.0;
pub const DEFAULT_MAX_AMOUNT: f64 = 1_000_000.0;

const DATE_FORMAT: &str = "%Y-%m-%d";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdType {
    #[default]
    All,
    Candidate,
    Pac,
    SuperPac,
    Party,
    Issue,
    #[serde(other)]
    Unknown,
}

impl AdType {
    pub fn as_str(&self) -> &'static str {
        match self {
            AdType::All => "all",
            AdType::Candidate => "candidate",
            AdType::Pac => "pac",
            AdType::SuperPac => "super_pac",
            AdType::Party => "party",
            AdType::Issue => "issue",
            AdType::Unknown => "unknown",
        }
    }
}

impl FromStr for AdType {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let parsed = match s.trim().to_lowercase().replace(|c: char| c == '-' || c == ' ', "_").as_str() {
            "" | "all" => AdType::All,
            "candidate" => AdType::Candidate,
            "pac" => AdType::Pac,
            "super_pac" | "superpac" => AdType::SuperPac,
            "party" => AdType::Party,
            "issue" => AdType::Issue,
            other => {
                warn!("Unrecognised ad type {:?}, treating as unknown", other);
                AdType::Unknown
            }
        };
        Ok(parsed)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Platform {
    Facebook,
    Instagram,
    Google,
    YouTube,
    X,
    TikTok,
    Snapchat,
    #[serde(other)]
    Unknown,
}

impl Platform {
    pub fn as_str(&self) -> &'static str {
        match self {
            Platform::Facebook => "Facebook",
            Platform::Instagram => "Instagram",
            Platform::Google => "Google",
            Platform::YouTube => "YouTube",
            Platform::X => "X",
            Platform::TikTok => "TikTok",
            Platform::Snapchat => "Snapchat",
            Platform::Unknown => "Unknown",
        }
    }
}

impl FromStr for Platform {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let parsed = match s.trim().to_lowercase().as_str() {
            "facebook" | "meta" => Platform::Facebook,
            "instagram" => Platform::Instagram,
            "google" => Platform::Google,
            "youtube" => Platform::YouTube,
            "x" | "twitter" => Platform::X,
            "tiktok" => Platform::TikTok,
            "snapchat" => Platform::Snapchat,
            other => {
                warn!("Unrecognised platform {:?}, treating as unknown", other);
                Platform::Unknown
            }
        };
        Ok(parsed)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AdFormat {
    Image,
    Video,
    Text,
    Carousel,
    Audio,
    #[serde(other)]
    Unknown,
}

impl AdFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            AdFormat::Image => "Image",
            AdFormat::Video => "Video",
            AdFormat::Text => "Text",
            AdFormat::Carousel => "Carousel",
            AdFormat::Audio => "Audio",
            AdFormat::Unknown => "Unknown",
        }
    }
}

impl FromStr for AdFormat {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let parsed = match s.trim().to_lowercase().as_str() {
            "image" => AdFormat::Image,
            "video" => AdFormat::Video,
            "text" => AdFormat::Text,
            "carousel" => AdFormat::Carousel,
            "audio" => AdFormat::Audio,
            other => {
                warn!("Unrecognised ad format {:?}, treating as unknown", other);
                AdFormat::Unknown
            }
        };
        Ok(parsed)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortDirection::Asc => "asc",
            SortDirection::Desc => "desc",
        }
    }

    fn order(&self, ordering: Ordering) -> Ordering {
        match self {
            SortDirection::Asc => ordering,
            SortDirection::Desc => ordering.reverse(),
        }
    }
}

impl FromStr for SortDirection {
    type Err = NewsdeskError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "asc" | "ascending" => Ok(SortDirection::Asc),
            "desc" | "descending" => Ok(SortDirection::Desc),
            other => Err(NewsdeskError::Validation(format!("unknown sort direction {other:?}"))),
        }
    }
}

/// Inclusive date window; either side may be open.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeFrame {
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
}

impl TimeFrame {
    pub fn is_open(&self) -> bool {
        self.start.is_none() && self.end.is_none()
    }

    /// An ad qualifies when its whole run lies inside the window.
    pub fn contains_run(&self, start: NaiveDate, end: NaiveDate) -> bool {
        self.start.map_or(true, |bound| start >= bound) && self.end.map_or(true, |bound| end <= bound)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterOptions {
    pub ad_type: AdType,
    pub search_query: String,
    pub candidate_query: String,
    pub platform: Option<Platform>,
    pub format: Option<AdFormat>,
    pub time_frame: TimeFrame,
    pub amount_spent_sort: Option<SortDirection>,
    pub impressions_sort: Option<SortDirection>,
    pub min_amount: f64,
    pub max_amount: f64,
}

impl Default for FilterOptions {
    fn default() -> Self {
        Self {
            ad_type: AdType::All,
            search_query: String::new(),
            candidate_query: String::new(),
            platform: None,
            format: None,
            time_frame: TimeFrame::default(),
            amount_spent_sort: None,
            impressions_sort: None,
            min_amount: DEFAULT_MIN_AMOUNT,
            max_amount: DEFAULT_MAX_AMOUNT,
        }
    }
}

/// Spend bounds after clamping and swapping.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AmountRange {
    pub min: f64,
    pub max: f64,
    /// Set when the caller supplied `min > max` and the bounds were swapped.
    pub swapped: bool,
}

impl AmountRange {
    pub fn contains(&self, amount: f64) -> bool {
        amount >= self.min && amount <= self.max
    }
}

fn clamp_bound(value: f64, fallback: f64) -> f64 {
    if value.is_finite() {
        value.max(0.0)
    } else if value == f64::INFINITY {
        value
    } else {
        fallback
    }
}

fn format_amount(value: f64) -> String {
    format!("{value}")
}

impl FilterOptions {
    pub fn amount_range(&self) -> AmountRange {
        let min = clamp_bound(self.min_amount, DEFAULT_MIN_AMOUNT);
        let max = clamp_bound(self.max_amount, DEFAULT_MAX_AMOUNT);
        if min > max {
            AmountRange { min: max, max: min, swapped: true }
        } else {
            AmountRange { min, max, swapped: false }
        }
    }

    /// Strict check for callers that want to reject bad input instead of
    /// having it normalised.
    pub fn validate(&self) -> Result<()> {
        if self.min_amount.is_nan() || self.max_amount.is_nan() {
            return Err(NewsdeskError::Validation("spend bounds must be numbers".to_string()));
        }
        if self.min_amount < 0.0 || self.max_amount < 0.0 {
            return Err(NewsdeskError::Validation("spend bounds must not be negative".to_string()));
        }
        if self.min_amount > self.max_amount {
            return Err(NewsdeskError::Validation(format!(
                "minimum spend {} exceeds maximum spend {}",
                self.min_amount, self.max_amount
            )));
        }
        if let (Some(start), Some(end)) = (self.time_frame.start, self.time_frame.end) {
            if start > end {
                return Err(NewsdeskError::Validation(format!(
                    "time frame starts {start} after it ends {end}"
                )));
            }
        }
        Ok(())
    }

    /// Sort keys in precedence order: amount spent first, impressions as the
    /// tie-breaker.
    pub fn sort_keys(&self) -> Vec<(SortKey, SortDirection)> {
        let mut keys = Vec::with_capacity(2);
        if let Some(direction) = self.amount_spent_sort {
            keys.push((SortKey::AmountSpent, direction));
        }
        if let Some(direction) = self.impressions_sort {
            keys.push((SortKey::Impressions, direction));
        }
        keys
    }

    pub fn matches(&self, ad: &PoliticalAd) -> bool {
        let search = self.search_query.trim().to_lowercase();
        if !search.is_empty() && !ad.advertiser.to_lowercase().contains(&search) {
            return false;
        }

        let candidate = self.candidate_query.trim().to_lowercase();
        if !candidate.is_empty() && !ad.candidate.to_lowercase().contains(&candidate) {
            return false;
        }

        if let Some(platform) = self.platform.filter(|p| *p != Platform::Unknown) {
            if ad.platform != platform.as_str() {
                return false;
            }
        }

        if let Some(format) = self.format.filter(|f| *f != AdFormat::Unknown) {
            if ad.format != format.as_str() {
                return false;
            }
        }

        if !self.time_frame.contains_run(ad.start_date, ad.end_date) {
            return false;
        }

        self.amount_range().contains(ad.amount_spent)
    }

    /// Filters then sorts `ads`. Ad type is not carried on the record, so it
    /// is only honoured by sources that know it.
    pub fn apply(&self, ads: Vec<PoliticalAd>) -> Vec<PoliticalAd> {
        let mut kept: Vec<PoliticalAd> = ads.into_iter().filter(|ad| self.matches(ad)).collect();
        let keys = self.sort_keys();
        if !keys.is_empty() {
            kept.sort_by(|a, b| {
                keys.iter()
                    .map(|(key, direction)| direction.order(key.compare(a, b)))
                    .find(|ordering| *ordering != Ordering::Equal)
                    .unwrap_or(Ordering::Equal)
            });
        }
        kept
    }

    /// Reads a query back into filters. Garbled values fall back to defaults.
    pub fn from_query_spec(spec: &QuerySpec) -> Self {
        let mut filters = FilterOptions::default();

        if let Some(raw) = spec.get("ad_type") {
            filters.ad_type = raw.parse().unwrap_or(AdType::Unknown);
        }
        if let Some(raw) = spec.get("q") {
            filters.search_query = raw.to_string();
        }
        if let Some(raw) = spec.get("candidate") {
            filters.candidate_query = raw.to_string();
        }
        if let Some(raw) = spec.get("platform") {
            filters.platform = raw.parse().ok();
        }
        if let Some(raw) = spec.get("format") {
            filters.format = raw.parse().ok();
        }
        filters.time_frame.start = spec.get("start_date").and_then(parse_date);
        filters.time_frame.end = spec.get("end_date").and_then(parse_date);
        if let Some(value) = spec.get("min_amount").and_then(|raw| raw.trim().parse::<f64>().ok()) {
            filters.min_amount = value;
        }
        if let Some(value) = spec.get("max_amount").and_then(|raw| raw.trim().parse::<f64>().ok()) {
            filters.max_amount = value;
        }
        if let Some(order_by) = spec.get("order_by") {
            for part in order_by.split(',') {
                let Some((key, direction)) = part.split_once(':') else {
                    debug!("Ignoring malformed order_by segment {:?}", part);
                    continue;
                };
                let Ok(direction) = direction.parse::<SortDirection>() else {
                    continue;
                };
                match key.trim() {
                    "amount_spent" => filters.amount_spent_sort = Some(direction),
                    "impressions" => filters.impressions_sort = Some(direction),
                    other => debug!("Ignoring unknown sort key {:?}", other),
                }
            }
        }

        filters
    }
}

fn parse_date(raw: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), DATE_FORMAT).ok()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortKey {
    AmountSpent,
    Impressions,
}

impl SortKey {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortKey::AmountSpent => "amount_spent",
            SortKey::Impressions => "impressions",
        }
    }

    fn compare(&self, a: &PoliticalAd, b: &PoliticalAd) -> Ordering {
        match self {
            SortKey::AmountSpent => a.amount_spent.total_cmp(&b.amount_spent),
            SortKey::Impressions => a.impressions.cmp(&b.impressions),
        }
    }
}

impl fmt::Display for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Builds the data-source query for `filters`.
///
/// Never fails: out-of-range spend bounds are clamped to `[0, ∞)` and an
/// inverted pair is swapped. An unbounded maximum is left off the query. Filters at their default are left out, so the
/// default `FilterOptions` yields an empty spec.
pub fn translate(filters: &FilterOptions) -> QuerySpec {
    let mut spec = QuerySpec::new();

    match filters.ad_type {
        AdType::All => {}
        AdType::Unknown => debug!("Dropping unknown ad type from query"),
        ad_type => spec.insert("ad_type", ad_type.as_str()),
    }

    let search = filters.search_query.trim();
    if !search.is_empty() {
        spec.insert("q", search);
    }
    let candidate = filters.candidate_query.trim();
    if !candidate.is_empty() {
        spec.insert("candidate", candidate);
    }

    match filters.platform {
        None => {}
        Some(Platform::Unknown) => debug!("Dropping unknown platform from query"),
        Some(platform) => spec.insert("platform", platform.as_str()),
    }
    match filters.format {
        None => {}
        Some(AdFormat::Unknown) => debug!("Dropping unknown format from query"),
        Some(format) => spec.insert("format", format.as_str()),
    }

    if let Some(start) = filters.time_frame.start {
        spec.insert("start_date", start.format(DATE_FORMAT).to_string());
    }
    if let Some(end) = filters.time_frame.end {
        spec.insert("end_date", end.format(DATE_FORMAT).to_string());
    }

    let range = filters.amount_range();
    if range.swapped {
        warn!(
            "Spend bounds inverted (min {} > max {}), swapping",
            filters.min_amount, filters.max_amount
        );
    }
    if range.min != DEFAULT_MIN_AMOUNT {
        spec.insert("min_amount", format_amount(range.min));
    }
    // An infinite ceiling is no ceiling at all.
    if range.max.is_finite() && range.max != DEFAULT_MAX_AMOUNT {
        spec.insert("max_amount", format_amount(range.max));
    }

    let order_by = filters
        .sort_keys()
        .iter()
        .map(|(key, direction)| format!("{}:{}", key, direction.as_str()))
        .collect::<Vec<_>>()
        .join(",");
    if !order_by.is_empty() {
        spec.insert("order_by", order_by);
    }

    spec
}

/// The query the library should be showing for `filters`. Separate name for
/// the scheduling shim so the mapping stays testable on its own.
pub fn compute_query(filters: &FilterOptions) -> QuerySpec {
    translate(filters)
}
