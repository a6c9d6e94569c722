pub mod types;
pub mod config;
pub mod traits;
pub mod fetcher;
pub mod cache;
pub mod news_query;
pub mod filters;
pub mod aggregator;
pub mod export;
pub mod pagination;
pub mod library;
pub mod views;
pub mod sources;
pub mod utils;

pub use types::*;
pub use config::Config;
pub use traits::{AdDataSource, ContentSource};
pub use fetcher::ContentFetcher;
pub use cache::CachedContentClient;
pub use news_query::{NewsQuery, OrderBy};
pub use filters::{compute_query, translate, AdFormat, AdType, FilterOptions, Platform, SortDirection, TimeFrame};
pub use aggregator::{summarize, AdSummary};
pub use export::{export_to_dir, export_to_string, export_to_writer};
pub use pagination::{parse_page, PageNav};
pub use library::{AdLibrary, LibrarySnapshot, LoadState};
pub use sources::{HttpAdSource, StaticAdSource};
