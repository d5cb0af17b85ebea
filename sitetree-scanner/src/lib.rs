pub mod crawler;
pub mod error;
pub mod fetch;
pub mod registry;
pub mod result;
pub mod tree;

pub use crawler::{Crawler, ProgressCallback, SiteMap};
pub use error::CrawlError;
pub use fetch::{Fetch, HttpFetcher};
pub use registry::{Page, PageId, PageRegistry, Refusal, Resolved};
pub use result::FetchOutcome;
pub use tree::{NodeId, TraversalCursor, TraversalOrder, Tree};
