use indicatif::{ProgressBar, ProgressStyle};
use sitetree_scanner::fetch::DEFAULT_TIMEOUT_SECS;
use sitetree_scanner::registry::DEFAULT_MAX_PAGES;
use sitetree_scanner::{CrawlError, Crawler, Fetch, HttpFetcher, SiteMap, TraversalOrder};
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

/// Options for configuring a crawl operation
#[derive(Debug, Clone)]
pub struct CrawlOptions {
    pub entrypoint: String,
    pub max_pages: usize,
    /// Traversal order as typed by the user (`BF` or `DF`)
    pub traversal: String,
    /// Accepted so it can be refused; the crawl never starts with a depth limit
    pub max_depth: Option<usize>,
    pub verbose: bool,
    pub timeout_secs: u64,
    pub show_progress_bars: bool,
}

impl CrawlOptions {
    pub fn new(entrypoint: impl Into<String>) -> Self {
        Self {
            entrypoint: entrypoint.into(),
            max_pages: DEFAULT_MAX_PAGES,
            traversal: TraversalOrder::default().to_string(),
            max_depth: None,
            verbose: false,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            show_progress_bars: false,
        }
    }

    /// Checks everything that can be checked without touching the network.
    pub fn validate(&self) -> Result<TraversalOrder, CrawlError> {
        if self.max_depth.is_some() {
            return Err(CrawlError::DepthLimitUnsupported);
        }
        self.traversal.parse()
    }
}

/// Callback for reporting crawl progress
pub type CrawlProgressCallback = Arc<dyn Fn(String) + Send + Sync>;

/// Execute a crawl over HTTP with the given options
pub async fn execute_crawl(
    options: CrawlOptions,
    progress_callback: Option<CrawlProgressCallback>,
) -> Result<SiteMap, CrawlError> {
    options.validate()?;
    let fetcher = HttpFetcher::with_timeout(options.timeout_secs)?;
    execute_crawl_with(options, fetcher, progress_callback).await
}

/// Same as [`execute_crawl`], driven by any fetcher.
pub async fn execute_crawl_with<F: Fetch>(
    options: CrawlOptions,
    fetcher: F,
    progress_callback: Option<CrawlProgressCallback>,
) -> Result<SiteMap, CrawlError> {
    let order = options.validate()?;

    let progress_bar = if options.show_progress_bars {
        let pb = ProgressBar::new_spinner();
        pb.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.cyan} {msg}")
                .expect("spinner template is valid"),
        );
        pb.enable_steady_tick(Duration::from_millis(100));
        pb.set_message("Starting crawl...");
        Some(pb)
    } else {
        None
    };

    let pb_clone = progress_bar.clone();
    let user_callback = progress_callback.clone();
    let internal_progress_callback: sitetree_scanner::ProgressCallback =
        Arc::new(move |count: usize, url: String| {
            if let Some(ref pb) = pb_clone {
                pb.set_message(format!("Crawling... {} pages visited ({})", count, url));
            }
            if let Some(ref callback) = user_callback {
                callback(format!("[{}] {}", count, url));
            }
        });

    debug!(
        "Crawl options: entrypoint={} max_pages={} traversal={} timeout={}s",
        options.entrypoint, options.max_pages, order, options.timeout_secs
    );

    let crawler = Crawler::with_fetcher(fetcher)
        .with_max_pages(options.max_pages)
        .with_max_depth(options.max_depth)
        .with_progress_callback(internal_progress_callback);

    let result = crawler.crawl(&options.entrypoint, order).await;

    if let Some(ref pb) = progress_bar {
        match result {
            Ok(ref map) => pb.finish_with_message(format!(
                "Crawl complete! {} pages visited",
                map.tree().node_count()
            )),
            Err(_) => pb.finish_and_clear(),
        }
    }

    result
}
