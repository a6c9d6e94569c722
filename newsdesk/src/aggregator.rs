use crate::types::PoliticalAd;
use crate::utils::numbers::{format_currency, group_thousands};
use serde::Serialize;
use std::collections::HashSet;
use tracing::debug;

/// Headline numbers shown above the ad library.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct AdSummary {
    pub count: usize,
    /// Exact sum of `amount_spent`; round only when displaying.
    pub total_spent: f64,
    pub total_impressions: u64,
    pub distinct_platforms: usize,
}

impl AdSummary {
    pub fn total_spent_display(&self) -> String {
        format_currency(self.total_spent)
    }

    pub fn total_impressions_display(&self) -> String {
        group_thousands(self.total_impressions)
    }
}

/// Reduces a result set to its [`AdSummary`].
///
/// Every figure is independent of input order. Spend is added up over the
/// amounts sorted into a canonical order, so a permuted input produces a
/// bit-for-bit identical float total.
pub fn summarize(ads: &[PoliticalAd]) -> AdSummary {
    let mut amounts: Vec<f64> = ads.iter().map(|ad| ad.amount_spent).collect();
    amounts.sort_by(f64::total_cmp);
    let total_spent = amounts.iter().sum();

    let total_impressions = ads
        .iter()
        .fold(0u64, |acc, ad| acc.saturating_add(ad.impressions));

    let distinct_platforms = ads
        .iter()
        .map(|ad| ad.platform.as_str())
        .collect::<HashSet<_>>()
        .len();

    debug!(
        "Summarized {} ads across {} platforms",
        ads.len(),
        distinct_platforms
    );

    AdSummary {
        count: ads.len(),
        total_spent,
        total_impressions,
        distinct_platforms,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn ad(id: &str, platform: &str, amount: f64, impressions: u64) -> PoliticalAd {
        PoliticalAd {
            id: id.to_string(),
            advertiser: "Advertiser".to_string(),
            candidate: "Candidate".to_string(),
            platform: platform.to_string(),
            format: "Image".to_string(),
            amount_spent: amount,
            impressions,
            start_date: NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
            end_date: NaiveDate::from_ymd_opt(2024, 3, 2).unwrap(),
        }
    }

    #[test]
    fn empty_input_is_all_zeros() {
        let summary = summarize(&[]);
        assert_eq!(summary, AdSummary { count: 0, total_spent: 0.0, total_impressions: 0, distinct_platforms: 0 });
    }

    #[test]
    fn reordering_does_not_change_totals() {
        let ads = vec![
            ad("1", "Facebook", 0.1, 10),
            ad("2", "Google", 1e9, 20),
            ad("3", "Facebook", 0.2, 30),
            ad("4", "X", 1234.567, 40),
            ad("5", "Google", 0.3, 50),
        ];
        let forward = summarize(&ads);
        let mut reversed = ads.clone();
        reversed.reverse();
        let mut rotated = ads.clone();
        rotated.rotate_left(2);

        for other in [summarize(&reversed), summarize(&rotated)] {
            assert_eq!(forward.total_spent.to_bits(), other.total_spent.to_bits());
            assert_eq!(forward.total_impressions, other.total_impressions);
            assert_eq!(forward.distinct_platforms, other.distinct_platforms);
            assert_eq!(forward.count, other.count);
        }
    }

    #[test]
    fn platforms_are_case_sensitive() {
        let ads = vec![ad("1", "Facebook", 1.0, 1), ad("2", "facebook", 1.0, 1), ad("3", "Facebook", 1.0, 1)];
        assert_eq!(summarize(&ads).distinct_platforms, 2);
    }

    #[test]
    fn impressions_saturate() {
        let ads = vec![ad("1", "X", 1.0, u64::MAX), ad("2", "X", 1.0, 10)];
        assert_eq!(summarize(&ads).total_impressions, u64::MAX);
    }

    #[test]
    fn display_rounds_only_at_the_end() {
        let ads = vec![ad("1", "X", 1049.75, 1000), ad("2", "X", 1050.25, 44_000)];
        let summary = summarize(&ads);
        assert_eq!(summary.total_spent, 2100.0);
        assert_eq!(summary.total_spent_display(), "$2,100");
        assert_eq!(summary.total_impressions_display(), "45,000");
    }
}
