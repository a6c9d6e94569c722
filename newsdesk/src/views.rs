//! View models for the news pages and the ad library.
//!
//! Nothing here talks to the network; these types only reshape what the
//! clients returned into what a page (or the CLI) shows.

use crate::aggregator::AdSummary;
use crate::pagination::{PageLinks, PageNav};
use crate::types::{GuardianArticle, GuardianList, GuardianSection, NewsdeskError, PoliticalAd};
use crate::utils::dates::long_date;
use crate::utils::numbers::{format_amount, group_thousands};
use crate::utils::text::truncate;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt::Write as _;
use std::str::FromStr;
use url::form_urlencoded;

pub const DEFAULT_BYLINE: &str = "The Guardian";
pub const SIDEBAR_SECTION_LIMIT: usize = 15;

fn article_href(id: &str) -> String {
    format!("/news/{}", form_urlencoded::byte_serialize(id.as_bytes()).collect::<String>())
}

#[derive(Debug, Clone, Serialize)]
pub struct ArticleCard {
    pub id: String,
    pub href: String,
    pub web_url: String,
    pub section_name: String,
    pub pillar_name: Option<String>,
    pub headline: String,
    pub trail_text: Option<String>,
    pub thumbnail: Option<String>,
    pub byline: String,
    pub published_at: DateTime<Utc>,
    pub published: String,
}

impl From<&GuardianArticle> for ArticleCard {
    fn from(article: &GuardianArticle) -> Self {
        let fields = article.fields.clone().unwrap_or_default();
        Self {
            id: article.id.clone(),
            href: article_href(&article.id),
            web_url: article.web_url.clone(),
            section_name: article.section_name.clone(),
            pillar_name: article.pillar_name.clone(),
            headline: fields
                .headline
                .filter(|h| !h.trim().is_empty())
                .unwrap_or_else(|| article.web_title.clone()),
            trail_text: fields.trail_text.filter(|t| !t.trim().is_empty()),
            thumbnail: fields.thumbnail,
            byline: fields
                .byline
                .filter(|b| !b.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_BYLINE.to_string()),
            published_at: article.web_publication_date,
            published: long_date(&article.web_publication_date),
        }
    }
}

/// One page of a news listing.
#[derive(Debug, Clone, Serialize)]
pub struct ArticleListPage {
    pub total: u64,
    pub cards: Vec<ArticleCard>,
    pub nav: PageNav,
    pub links: PageLinks,
}

impl ArticleListPage {
    /// `current_page` is the page the reader asked for; the page count comes
    /// from the API response.
    pub fn build(
        list: &GuardianList<GuardianArticle>,
        current_page: u32,
        base_path: &str,
        params: &[(&str, &str)],
    ) -> Self {
        let nav = PageNav::new(current_page, list.pages);
        let links = nav.links(base_path, params);
        Self {
            total: list.total,
            cards: list.results.iter().map(ArticleCard::from).collect(),
            nav,
            links,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ArticleDetail {
    pub card: ArticleCard,
    pub body_html: Option<String>,
    pub body_text: Option<String>,
    pub contributors: Vec<String>,
    pub keywords: Vec<String>,
    pub word_count: Option<u32>,
}

impl From<&GuardianArticle> for ArticleDetail {
    fn from(article: &GuardianArticle) -> Self {
        let fields = article.fields.clone().unwrap_or_default();
        let tags_of = |kind: &str| {
            article
                .tags
                .iter()
                .filter(|tag| tag.kind == kind)
                .map(|tag| tag.web_title.clone())
                .collect::<Vec<_>>()
        };
        Self {
            card: ArticleCard::from(article),
            body_html: fields.body,
            body_text: fields.body_text,
            contributors: tags_of("contributor"),
            keywords: tags_of("keyword"),
            word_count: fields.wordcount.and_then(|w| w.trim().parse().ok()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SectionLink {
    pub id: Option<String>,
    pub title: String,
    pub href: String,
    pub active: bool,
}

/// "All News" followed by the first sections the API lists.
pub fn section_sidebar(sections: &[GuardianSection], current: Option<&str>) -> Vec<SectionLink> {
    let current = current.map(str::trim).filter(|c| !c.is_empty());
    let mut links = vec![SectionLink {
        id: None,
        title: "All News".to_string(),
        href: "/news".to_string(),
        active: current.is_none(),
    }];
    links.extend(sections.iter().take(SIDEBAR_SECTION_LIMIT).map(|section| {
        let query = form_urlencoded::Serializer::new(String::new())
            .append_pair("section", &section.id)
            .finish();
        SectionLink {
            id: Some(section.id.clone()),
            title: section.web_title.clone(),
            href: format!("/news?{}", query),
            active: current == Some(section.id.as_str()),
        }
    }));
    links
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ViewMode {
    #[default]
    Grid,
    Table,
}

impl FromStr for ViewMode {
    type Err = NewsdeskError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "grid" => Ok(ViewMode::Grid),
            "table" => Ok(ViewMode::Table),
            other => Err(NewsdeskError::Validation(format!(
                "unknown view mode {other:?}, expected grid or table"
            ))),
        }
    }
}

/// Grid tile for one ad.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AdCard {
    pub id: String,
    pub advertiser: String,
    pub candidate: String,
    pub platform: String,
    pub format: String,
    pub spend: String,
    pub impressions: String,
    pub run: String,
}

impl From<&PoliticalAd> for AdCard {
    fn from(ad: &PoliticalAd) -> Self {
        Self {
            id: ad.id.clone(),
            advertiser: ad.advertiser.clone(),
            candidate: ad.candidate.clone(),
            platform: ad.platform.clone(),
            format: ad.format.clone(),
            spend: format!("${}", format_amount(ad.amount_spent)),
            impressions: group_thousands(ad.impressions),
            run: format!(
                "{} – {}",
                ad.start_date.format("%b %-d, %Y"),
                ad.end_date.format("%b %-d, %Y")
            ),
        }
    }
}

pub const TABLE_COLUMNS: [&str; 8] = [
    "Advertiser",
    "Candidate",
    "Platform",
    "Format",
    "Spent",
    "Impressions",
    "Start",
    "End",
];

/// Table row for one ad, cells in [`TABLE_COLUMNS`] order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AdRow {
    pub cells: Vec<String>,
}

impl From<&PoliticalAd> for AdRow {
    fn from(ad: &PoliticalAd) -> Self {
        Self {
            cells: vec![
                ad.advertiser.clone(),
                ad.candidate.clone(),
                ad.platform.clone(),
                ad.format.clone(),
                format_amount(ad.amount_spent),
                group_thousands(ad.impressions),
                ad.start_date.to_string(),
                ad.end_date.to_string(),
            ],
        }
    }
}

fn table_line<'a>(cells: impl Iterator<Item = &'a str>, widths: &[usize]) -> String {
    cells
        .zip(widths)
        .map(|(cell, width)| format!("{:<width$}", cell, width = *width))
        .collect::<Vec<_>>()
        .join(" | ")
        .trim_end()
        .to_string()
}

pub fn render_table(ads: &[PoliticalAd]) -> String {
    let rows: Vec<AdRow> = ads.iter().map(AdRow::from).collect();
    let mut widths: Vec<usize> = TABLE_COLUMNS.iter().map(|c| c.chars().count()).collect();
    for row in &rows {
        for (width, cell) in widths.iter_mut().zip(&row.cells) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let mut out = String::new();
    let _ = writeln!(out, "{}", table_line(TABLE_COLUMNS.iter().copied(), &widths));
    let _ = writeln!(
        out,
        "{}",
        widths.iter().map(|w| "-".repeat(*w)).collect::<Vec<_>>().join("-+-")
    );
    for row in &rows {
        let _ = writeln!(out, "{}", table_line(row.cells.iter().map(String::as_str), &widths));
    }
    out
}

pub fn render_grid(ads: &[PoliticalAd]) -> String {
    let mut out = String::new();
    for card in ads.iter().map(AdCard::from) {
        let _ = writeln!(out, "[{}] {}", card.platform, truncate(&card.advertiser, 60));
        let _ = writeln!(out, "    Candidate:   {}", card.candidate);
        let _ = writeln!(out, "    Format:      {}", card.format);
        let _ = writeln!(out, "    Spent:       {}", card.spend);
        let _ = writeln!(out, "    Impressions: {}", card.impressions);
        let _ = writeln!(out, "    Running:     {}", card.run);
        out.push('\n');
    }
    out
}

pub fn render(ads: &[PoliticalAd], mode: ViewMode) -> String {
    match mode {
        ViewMode::Grid => render_grid(ads),
        ViewMode::Table => render_table(ads),
    }
}

pub fn render_summary(summary: &AdSummary) -> String {
    format!(
        "Total Ads: {}\nTotal Spent: {}\nTotal Impressions: {}\nActive Platforms: {}\n",
        summary.count,
        summary.total_spent_display(),
        summary.total_impressions_display(),
        summary.distinct_platforms
    )
}
