use anyhow::{anyhow, Context, Result};
use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use newsdesk::filters::{AdFormat, AdType, FilterOptions, Platform, SortDirection, TimeFrame};
use newsdesk::news_query::{NewsQuery, DEFAULT_PAGE_SIZE};
use newsdesk::views::{self, ArticleDetail, ArticleListPage, ViewMode};
use newsdesk::{
    export_to_dir, AdDataSource, AdLibrary, CachedContentClient, Config, ContentFetcher, ContentSource,
    HttpAdSource, StaticAdSource,
};
use std::path::PathBuf;
use tracing::{debug, info};

/// Newsdesk - Guardian news reader and political ad library
#[derive(Parser)]
#[command(name = "newsdesk")]
#[command(about = "Browse Guardian news and explore political ad spending", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Read news from the Guardian content API
    News {
        #[command(subcommand)]
        command: NewsCommand,
    },

    /// Query the political ad library
    Ads {
        #[command(subcommand)]
        command: AdsCommand,
    },
}

#[derive(Subcommand)]
enum NewsCommand {
    /// Latest headlines, with the section sidebar
    Headlines {
        #[arg(long)]
        section: Option<String>,

        #[arg(long, default_value_t = DEFAULT_PAGE_SIZE)]
        page_size: u32,
    },

    /// One page of a section
    Section {
        id: String,

        /// Page number; anything unparseable means page 1
        #[arg(long)]
        page: Option<String>,
    },

    /// Full-text search, ordered by relevance
    Search {
        query: String,

        #[arg(long)]
        page: Option<String>,
    },

    /// A single article
    Article { id: String },

    /// All sections known to the API
    Sections,
}

#[derive(Subcommand)]
enum AdsCommand {
    /// List the matching ads
    List {
        #[command(flatten)]
        filters: FilterArgs,

        /// grid or table
        #[arg(long, default_value = "grid")]
        view: String,
    },

    /// Headline figures for the matching ads
    Summary {
        #[command(flatten)]
        filters: FilterArgs,
    },

    /// Write the matching ads to political-ads.csv
    Export {
        #[command(flatten)]
        filters: FilterArgs,

        /// Directory to write into
        #[arg(long, default_value = ".")]
        out: PathBuf,
    },
}

#[derive(Args)]
struct FilterArgs {
    /// Serve ads from a local `{"ads": [...]}` file instead of the ad API
    #[arg(long)]
    fixture: Option<PathBuf>,

    #[arg(long)]
    ad_type: Option<String>,

    /// Advertiser name contains
    #[arg(long)]
    search: Option<String>,

    /// Candidate name contains
    #[arg(long)]
    candidate: Option<String>,

    #[arg(long)]
    platform: Option<String>,

    #[arg(long)]
    format: Option<String>,

    #[arg(long)]
    start_date: Option<NaiveDate>,

    #[arg(long)]
    end_date: Option<NaiveDate>,

    #[arg(long)]
    min_amount: Option<f64>,

    #[arg(long)]
    max_amount: Option<f64>,

    /// asc or desc
    #[arg(long)]
    sort_spend: Option<String>,

    /// asc or desc
    #[arg(long)]
    sort_impressions: Option<String>,
}

impl FilterArgs {
    fn to_filters(&self) -> Result<FilterOptions> {
        let mut filters = FilterOptions::default();
        if let Some(raw) = &self.ad_type {
            filters.ad_type = raw.parse::<AdType>()?;
        }
        filters.search_query = self.search.clone().unwrap_or_default();
        filters.candidate_query = self.candidate.clone().unwrap_or_default();
        filters.platform = self.platform.as_deref().map(str::parse::<Platform>).transpose()?;
        filters.format = self.format.as_deref().map(str::parse::<AdFormat>).transpose()?;
        filters.time_frame = TimeFrame {
            start: self.start_date,
            end: self.end_date,
        };
        if let Some(min) = self.min_amount {
            filters.min_amount = min;
        }
        if let Some(max) = self.max_amount {
            filters.max_amount = max;
        }
        filters.amount_spent_sort = self.sort_spend.as_deref().map(str::parse::<SortDirection>).transpose()?;
        filters.impressions_sort = self
            .sort_impressions
            .as_deref()
            .map(str::parse::<SortDirection>)
            .transpose()?;
        Ok(filters)
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::News { command } => handle_news(command).await?,
        Commands::Ads { command } => handle_ads(command).await?,
    }

    Ok(())
}

async fn handle_news(command: NewsCommand) -> Result<()> {
    let config = Config::load().context("Failed to load configuration")?;
    let fetcher = ContentFetcher::new(config.content_api()?).context("Failed to build content API client")?;
    let client = CachedContentClient::new(fetcher, config.revalidation);

    match command {
        NewsCommand::Headlines { section, page_size } => {
            let query = NewsQuery::top_headlines(section.as_deref(), page_size);
            let (sections, list) = futures::try_join!(client.sections(), client.search(&query))?;

            for link in views::section_sidebar(&sections, section.as_deref()) {
                let marker = if link.active { "*" } else { " " };
                println!("{} {}", marker, link.title);
            }
            println!();
            let page = ArticleListPage::build(&list, 1, "/news", &[("section", section.as_deref().unwrap_or(""))]);
            print_listing(&page);
        }
        NewsCommand::Section { id, page } => {
            let page = newsdesk::parse_page(page.as_deref());
            let list = client.search(&NewsQuery::by_section(&id, page, DEFAULT_PAGE_SIZE)).await?;
            print_listing(&ArticleListPage::build(&list, page, "/news", &[("section", id.as_str())]));
        }
        NewsCommand::Search { query, page } => {
            let page = newsdesk::parse_page(page.as_deref());
            let list = client.search(&NewsQuery::search(&query, page, DEFAULT_PAGE_SIZE)).await?;
            print_listing(&ArticleListPage::build(&list, page, "/news/search", &[("q", query.as_str())]));
        }
        NewsCommand::Article { id } => {
            let article = client.article(&id).await?;
            let detail = ArticleDetail::from(&article);
            println!("{}", detail.card.headline);
            println!("{} | {} | {}", detail.card.byline, detail.card.section_name, detail.card.published);
            if !detail.keywords.is_empty() {
                println!("Tags: {}", detail.keywords.join(", "));
            }
            println!();
            if let Some(body) = detail.body_text.as_deref().or(detail.card.trail_text.as_deref()) {
                println!("{}", body);
            }
            println!();
            println!("{}", detail.card.web_url);
        }
        NewsCommand::Sections => {
            for section in client.sections().await? {
                println!("{:<24} {}", section.id, section.web_title);
            }
        }
    }

    Ok(())
}

fn print_listing(page: &ArticleListPage) {
    if page.is_empty() {
        println!("No articles found.");
        return;
    }
    println!("{} articles", page.total);
    for card in &page.cards {
        println!();
        println!("{}", card.headline);
        println!("  {} | {} | {}", card.section_name, card.byline, card.published);
        if let Some(trail) = &card.trail_text {
            println!("  {}", newsdesk::utils::text::truncate(trail, 160));
        }
        println!("  {}", card.href);
    }
    if page.nav.is_paged() {
        println!();
        println!(
            "{}  {}  {}",
            page.links.previous.as_deref().unwrap_or("-"),
            page.links.indicator,
            page.links.next.as_deref().unwrap_or("-")
        );
    }
}

async fn handle_ads(command: AdsCommand) -> Result<()> {
    let fixture = match &command {
        AdsCommand::List { filters, .. } | AdsCommand::Summary { filters } | AdsCommand::Export { filters, .. } => {
            filters.fixture.clone()
        }
    };

    match fixture {
        Some(path) => {
            let source = StaticAdSource::from_json_file(&path)
                .await
                .with_context(|| format!("Failed to load ads from {}", path.display()))?;
            run_ads(source, command).await
        }
        None => {
            let config = Config::load().context("Failed to load configuration")?;
            let source = HttpAdSource::new(config.ad_source).context("Failed to build ad API client")?;
            run_ads(source, command).await
        }
    }
}

async fn run_ads<S: AdDataSource + 'static>(source: S, command: AdsCommand) -> Result<()> {
    let filter_args = match &command {
        AdsCommand::List { filters, .. } | AdsCommand::Summary { filters } | AdsCommand::Export { filters, .. } => {
            filters
        }
    };
    let filters = filter_args.to_filters()?;

    info!("Querying {}", source.source_name());
    let mut library = AdLibrary::new(source);
    library.set_filters(filters);
    let snapshot = library.settled().await;
    debug!("Settled on generation {} with query {:?}", snapshot.generation, snapshot.query);

    if let Some(err) = snapshot.error() {
        return Err(anyhow!("Failed to load ads: {}", err));
    }
    let ads = snapshot.ads();
    let summary = snapshot.summary().unwrap_or_default();

    match command {
        AdsCommand::List { view, .. } => {
            let mode: ViewMode = view.parse()?;
            if ads.is_empty() {
                println!("No ads match these filters.");
            } else {
                print!("{}", views::render(ads, mode));
            }
            println!();
            print!("{}", views::render_summary(&summary));
        }
        AdsCommand::Summary { .. } => {
            print!("{}", views::render_summary(&summary));
        }
        AdsCommand::Export { out, .. } => {
            let path = export_to_dir(ads, &out)?;
            println!("Wrote {} ads to {}", ads.len(), path.display());
        }
    }

    Ok(())
}
