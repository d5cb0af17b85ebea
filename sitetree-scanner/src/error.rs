use crate::registry::Refusal;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CrawlError {
    #[error("Traversal order \"{0}\" not implemented (expected BF or DF)")]
    UnsupportedTraversalOrder(String),

    #[error("The max-depth feature is not yet implemented")]
    DepthLimitUnsupported,

    #[error("Entrypoint refused: {0}")]
    EntrypointRefused(#[source] Refusal),

    #[error("HTTP client error: {0}")]
    HttpClient(#[from] reqwest::Error),
}

impl CrawlError {
    /// Configuration errors are detected before any request is sent.
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            CrawlError::UnsupportedTraversalOrder(_) | CrawlError::DepthLimitUnsupported
        )
    }
}

pub type Result<T> = std::result::Result<T, CrawlError>;
