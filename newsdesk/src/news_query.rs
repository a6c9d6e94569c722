//! Parameter building for the Guardian `/search` and `/{id}` endpoints.

use chrono::NaiveDate;
use std::fmt;
use std::str::FromStr;

pub const DEFAULT_PAGE: u32 = 1;
pub const DEFAULT_PAGE_SIZE: u32 = 20;
pub const MAX_PAGE_SIZE: u32 = 50;
pub const DEFAULT_SHOW_FIELDS: &str = "headline,trailText,thumbnail,bodyText,byline";
pub const DEFAULT_SHOW_TAGS: &str = "contributor";

const HEADLINE_FIELDS: &str = "headline,trailText,thumbnail,bodyText,byline,firstPublicationDate";
const ARTICLE_FIELDS: &str = "headline,trailText,thumbnail,bodyText,byline,body,firstPublicationDate";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OrderBy {
    #[default]
    Newest,
    Oldest,
    Relevance,
}

impl OrderBy {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderBy::Newest => "newest",
            OrderBy::Oldest => "oldest",
            OrderBy::Relevance => "relevance",
        }
    }
}

impl fmt::Display for OrderBy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrderBy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "newest" => Ok(OrderBy::Newest),
            "oldest" => Ok(OrderBy::Oldest),
            "relevance" => Ok(OrderBy::Relevance),
            other => Err(format!("unknown order {other:?}, expected newest, oldest or relevance")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShowBlocks {
    All,
    Body,
    Main,
}

impl ShowBlocks {
    pub fn as_str(&self) -> &'static str {
        match self {
            ShowBlocks::All => "all",
            ShowBlocks::Body => "body",
            ShowBlocks::Main => "main",
        }
    }
}

/// UI state for a news listing. `None` means "not specified" and the
/// parameter is left off the request entirely.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewsQuery {
    pub q: Option<String>,
    pub section: Option<String>,
    pub tag: Option<String>,
    pub page: Option<u32>,
    pub page_size: Option<u32>,
    pub order_by: Option<OrderBy>,
    pub from_date: Option<NaiveDate>,
    pub to_date: Option<NaiveDate>,
    pub show_fields: Option<String>,
    pub show_tags: Option<String>,
    pub show_blocks: Option<ShowBlocks>,
}

impl NewsQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_query(mut self, q: impl Into<String>) -> Self {
        self.q = Some(q.into());
        self
    }

    pub fn with_section(mut self, section: impl Into<String>) -> Self {
        self.section = Some(section.into());
        self
    }

    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tag = Some(tag.into());
        self
    }

    pub fn with_page(mut self, page: u32) -> Self {
        self.page = Some(page);
        self
    }

    pub fn with_page_size(mut self, page_size: u32) -> Self {
        self.page_size = Some(page_size);
        self
    }

    pub fn with_order_by(mut self, order_by: OrderBy) -> Self {
        self.order_by = Some(order_by);
        self
    }

    pub fn with_date_range(mut self, from: Option<NaiveDate>, to: Option<NaiveDate>) -> Self {
        self.from_date = from;
        self.to_date = to;
        self
    }

    pub fn with_show_fields(mut self, fields: impl Into<String>) -> Self {
        self.show_fields = Some(fields.into());
        self
    }

    pub fn with_show_tags(mut self, tags: impl Into<String>) -> Self {
        self.show_tags = Some(tags.into());
        self
    }

    pub fn with_show_blocks(mut self, blocks: ShowBlocks) -> Self {
        self.show_blocks = Some(blocks);
        self
    }

    /// Latest articles, optionally limited to one section.
    pub fn top_headlines(section: Option<&str>, page_size: u32) -> Self {
        let query = Self::new()
            .with_page_size(page_size)
            .with_order_by(OrderBy::Newest)
            .with_show_fields(HEADLINE_FIELDS);
        match section {
            Some(section) => query.with_section(section),
            None => query,
        }
    }

    pub fn by_section(section: &str, page: u32, page_size: u32) -> Self {
        Self::new()
            .with_section(section)
            .with_page(page)
            .with_page_size(page_size)
            .with_show_fields(DEFAULT_SHOW_FIELDS)
    }

    pub fn search(q: &str, page: u32, page_size: u32) -> Self {
        Self::new()
            .with_query(q)
            .with_page(page)
            .with_page_size(page_size)
            .with_order_by(OrderBy::Relevance)
            .with_show_fields(DEFAULT_SHOW_FIELDS)
    }

    pub fn by_date_range(from: NaiveDate, to: NaiveDate, section: Option<&str>) -> Self {
        let query = Self::new()
            .with_date_range(Some(from), Some(to))
            .with_order_by(OrderBy::Newest)
            .with_show_fields(HEADLINE_FIELDS);
        match section {
            Some(section) => query.with_section(section),
            None => query,
        }
    }

    pub fn by_tag(tag: &str, page_size: u32) -> Self {
        Self::new()
            .with_tag(tag)
            .with_page_size(page_size)
            .with_show_fields(DEFAULT_SHOW_FIELDS)
            .with_show_tags("all")
    }

    pub fn effective_page(&self) -> u32 {
        self.page.unwrap_or(DEFAULT_PAGE).max(1)
    }

    pub fn effective_page_size(&self) -> u32 {
        self.page_size.unwrap_or(DEFAULT_PAGE_SIZE).clamp(1, MAX_PAGE_SIZE)
    }

    /// Wire parameters for `/search`, defaults applied. Empty or blank
    /// optional values are treated as unset.
    pub fn to_params(&self) -> Vec<(&'static str, String)> {
        let mut params = vec![
            ("show-fields", non_blank(&self.show_fields).unwrap_or(DEFAULT_SHOW_FIELDS).to_string()),
            ("show-tags", non_blank(&self.show_tags).unwrap_or(DEFAULT_SHOW_TAGS).to_string()),
            ("page-size", self.effective_page_size().to_string()),
            ("page", self.effective_page().to_string()),
            ("order-by", self.order_by.unwrap_or_default().to_string()),
        ];

        if let Some(q) = non_blank(&self.q) {
            params.push(("q", q.to_string()));
        }
        if let Some(section) = non_blank(&self.section) {
            params.push(("section", section.to_string()));
        }
        if let Some(tag) = non_blank(&self.tag) {
            params.push(("tag", tag.to_string()));
        }
        if let Some(from) = self.from_date {
            params.push(("from-date", from.format("%Y-%m-%d").to_string()));
        }
        if let Some(to) = self.to_date {
            params.push(("to-date", to.format("%Y-%m-%d").to_string()));
        }
        if let Some(blocks) = self.show_blocks {
            params.push(("show-blocks", blocks.as_str().to_string()));
        }

        params
    }
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

/// Parameters for a single-article lookup.
pub fn article_params() -> Vec<(&'static str, String)> {
    vec![
        ("show-fields", ARTICLE_FIELDS.to_string()),
        ("show-tags", "contributor,keyword".to_string()),
        ("show-blocks", ShowBlocks::All.as_str().to_string()),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lookup<'a>(params: &'a [(&'static str, String)], key: &str) -> Option<&'a str> {
        params.iter().find(|(k, _)| *k == key).map(|(_, v)| v.as_str())
    }

    #[test]
    fn empty_query_gets_documented_defaults() {
        let params = NewsQuery::new().to_params();
        assert_eq!(lookup(&params, "page"), Some("1"));
        assert_eq!(lookup(&params, "page-size"), Some("20"));
        assert_eq!(lookup(&params, "order-by"), Some("newest"));
        assert_eq!(lookup(&params, "show-fields"), Some(DEFAULT_SHOW_FIELDS));
        for key in ["q", "section", "tag", "from-date", "to-date", "show-blocks"] {
            assert!(lookup(&params, key).is_none(), "{key} should be omitted");
        }
    }

    #[test]
    fn blank_optional_values_are_omitted() {
        let params = NewsQuery::new().with_query("   ").with_section("").to_params();
        assert!(lookup(&params, "q").is_none());
        assert!(lookup(&params, "section").is_none());
    }

    #[test]
    fn page_and_size_degrade_into_range() {
        let params = NewsQuery::new().with_page(0).with_page_size(500).to_params();
        assert_eq!(lookup(&params, "page"), Some("1"));
        assert_eq!(lookup(&params, "page-size"), Some("50"));
    }

    #[test]
    fn search_orders_by_relevance() {
        let params = NewsQuery::search("election", 2, 20).to_params();
        assert_eq!(lookup(&params, "q"), Some("election"));
        assert_eq!(lookup(&params, "page"), Some("2"));
        assert_eq!(lookup(&params, "order-by"), Some("relevance"));
    }

    #[test]
    fn date_range_uses_iso_dates() {
        let from = NaiveDate::from_ymd_opt(2024, 1, 5).unwrap();
        let to = NaiveDate::from_ymd_opt(2024, 2, 1).unwrap();
        let params = NewsQuery::by_date_range(from, to, Some("politics")).to_params();
        assert_eq!(lookup(&params, "from-date"), Some("2024-01-05"));
        assert_eq!(lookup(&params, "to-date"), Some("2024-02-01"));
        assert_eq!(lookup(&params, "section"), Some("politics"));
    }

    #[test]
    fn tag_listing_requests_all_tags() {
        let params = NewsQuery::by_tag("politics/us-elections-2024", 10).to_params();
        assert_eq!(lookup(&params, "show-tags"), Some("all"));
        assert_eq!(lookup(&params, "page-size"), Some("10"));
    }

    #[test]
    fn translation_is_deterministic() {
        let query = NewsQuery::top_headlines(Some("world"), 20);
        assert_eq!(query.to_params(), query.to_params());
    }
}
