use crate::error::{CrawlError, Result};
use crate::fetch::{Fetch, HttpFetcher};
use crate::registry::{DEFAULT_MAX_PAGES, Page, PageId, PageRegistry};
use crate::tree::{NodeId, TraversalOrder, Tree};
use std::sync::Arc;
use tracing::{debug, info};

/// Called before each fetch with the number of pages visited so far
/// (including this one) and the page URL.
pub type ProgressCallback = Arc<dyn Fn(usize, String) + Send + Sync>;

/// Sequential crawl loop: one fetch in flight, and the tree is only extended
/// between two cursor steps.
pub struct Crawler<F = HttpFetcher> {
    fetcher: F,
    max_pages: usize,
    max_depth: Option<usize>,
    progress_callback: Option<ProgressCallback>,
}

impl Crawler<HttpFetcher> {
    pub fn new() -> Result<Self> {
        Ok(Self::with_fetcher(HttpFetcher::new()?))
    }
}

impl<F: Fetch> Crawler<F> {
    pub fn with_fetcher(fetcher: F) -> Self {
        Self {
            fetcher,
            max_pages: DEFAULT_MAX_PAGES,
            max_depth: None,
            progress_callback: None,
        }
    }

    pub fn with_max_pages(mut self, max_pages: usize) -> Self {
        self.max_pages = max_pages;
        self
    }

    /// Depth limiting is declared but not implemented: a crawler carrying a
    /// depth limit refuses to start.
    pub fn with_max_depth(mut self, max_depth: Option<usize>) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn with_progress_callback(mut self, callback: ProgressCallback) -> Self {
        self.progress_callback = Some(callback);
        self
    }

    pub async fn crawl(&self, entrypoint: &str, order: TraversalOrder) -> Result<SiteMap> {
        if self.max_depth.is_some() {
            return Err(CrawlError::DepthLimitUnsupported);
        }

        info!(
            "Starting {} crawl of {} (max {} pages)",
            order, entrypoint, self.max_pages
        );

        let mut registry = PageRegistry::new(self.max_pages);
        let root = registry
            .resolve(entrypoint)
            .map_err(CrawlError::EntrypointRefused)?
            .id();

        let mut tree = Tree::new(root);
        let mut cursor = tree.cursor(order);
        let mut visited = 0;

        while let Some(node) = cursor.advance(&tree) {
            let page_id = *tree.payload(node);
            let url = registry.page(page_id).url();
            visited += 1;
            debug!("Item: {} (depth {})", url, tree.depth(node));

            if let Some(ref callback) = self.progress_callback {
                callback(visited, url.clone());
            }

            let outcome = self.fetcher.fetch(&url).await;

            let mut links = Vec::new();
            for href in outcome.hrefs() {
                let linked = match registry.resolve(href) {
                    Ok(resolved) => resolved.id(),
                    Err(refusal) => {
                        debug!("    Dropping {}: {}", href, refusal);
                        continue;
                    }
                };
                if !links.contains(&linked) {
                    links.push(linked);
                }
                // first discoverer wins
                if tree.add_child(node, linked).is_some() {
                    debug!("    Adding child: {}", registry.page(linked).url());
                }
            }

            registry.record_fetch(page_id, outcome, links);
        }

        info!(
            "Crawl complete. Visited {} pages ({} registered)",
            visited,
            registry.len()
        );
        Ok(SiteMap { tree, registry })
    }
}

/// The finished crawl: the traversal tree and the registry owning its pages.
#[derive(Debug, Clone)]
pub struct SiteMap {
    tree: Tree<PageId>,
    registry: PageRegistry,
}

impl SiteMap {
    pub fn tree(&self) -> &Tree<PageId> {
        &self.tree
    }

    pub fn registry(&self) -> &PageRegistry {
        &self.registry
    }

    pub fn root_page(&self) -> PageId {
        *self.tree.payload(self.tree.root())
    }

    pub fn page(&self, id: PageId) -> &Page {
        self.registry.page(id)
    }

    pub fn node_page(&self, node: NodeId) -> &Page {
        self.registry.page(*self.tree.payload(node))
    }

    pub fn page_count(&self) -> usize {
        self.registry.len()
    }

    pub fn outline(&self) -> String {
        self.tree.outline(|id| self.registry.page(*id).url())
    }
}
