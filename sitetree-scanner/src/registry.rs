//! Domain-locked page identity map with a page budget.
//!
//! A page is identified by its canonical path alone: path (empty becomes
//! `/`), matrix `;params` and `?query`. Scheme and fragment never take part,
//! and the host is fixed for the whole run by the first URL that resolves.

use crate::result::FetchOutcome;
use std::collections::HashMap;
use std::hash::{Hash, Hasher};
use thiserror::Error;
use tracing::{debug, warn};
use url::Url;

pub const DEFAULT_MAX_PAGES: usize = 256;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PageId(usize);

#[derive(Debug, Clone)]
pub struct Page {
    scheme: String,
    domain: String,
    path: String,
    links: Vec<PageId>,
    outcome: Option<FetchOutcome>,
}

impl Page {
    pub fn canonical_path(&self) -> &str {
        &self.path
    }

    /// Canonical URL, built from the scheme the page was first seen with.
    pub fn url(&self) -> String {
        format!("{}://{}{}", self.scheme, self.domain, self.path)
    }

    /// Same-domain pages this page links to, in discovery order.
    pub fn links(&self) -> &[PageId] {
        &self.links
    }

    pub fn outcome(&self) -> Option<&FetchOutcome> {
        self.outcome.as_ref()
    }

    pub fn is_fetched(&self) -> bool {
        self.outcome.is_some()
    }
}

impl PartialEq for Page {
    fn eq(&self, other: &Self) -> bool {
        self.path == other.path
    }
}

impl Eq for Page {}

impl Hash for Page {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.path.hash(state);
    }
}

/// Successful resolution: either a page that was already registered or a
/// page created by this call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolved {
    Existing(PageId),
    Created(PageId),
}

impl Resolved {
    pub fn id(self) -> PageId {
        match self {
            Resolved::Existing(id) | Resolved::Created(id) => id,
        }
    }

    pub fn is_new(self) -> bool {
        matches!(self, Resolved::Created(_))
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Refusal {
    #[error("{found} is outside the crawled domain {expected}")]
    DomainMismatch { expected: String, found: String },

    #[error("page budget of {max_pages} reached")]
    BudgetExceeded { max_pages: usize },

    #[error("invalid URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Normalized {
    scheme: String,
    netloc: String,
    path: String,
}

/// True when `raw` starts with `scheme://`. `host:port` and hosts such as
/// `httpbin.org` carry no scheme.
fn has_scheme(raw: &str) -> bool {
    raw.split_once("://").is_some_and(|(scheme, _)| {
        scheme.starts_with(|c: char| c.is_ascii_alphabetic())
            && scheme
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
    })
}

fn normalize(raw: &str) -> Result<Normalized, Refusal> {
    let invalid = |reason: String| Refusal::InvalidUrl {
        url: raw.to_string(),
        reason,
    };

    let trimmed = raw.trim();
    let url = if has_scheme(trimmed) {
        Url::parse(trimmed)
    } else {
        Url::parse(&format!("https://{}", trimmed))
    }
    .map_err(|e| invalid(e.to_string()))?;

    // the parser lowercases the scheme
    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(invalid(format!("unsupported scheme {}", url.scheme())));
    }
    let host = url
        .host_str()
        .ok_or_else(|| invalid("missing host".to_string()))?;

    let netloc = match url.port() {
        Some(port) => format!("{}:{}", host, port),
        None => host.to_string(),
    };

    let mut path = url.path().to_string();
    if path.is_empty() {
        path.push('/');
    }
    if let Some(query) = url.query()
        && !query.is_empty()
    {
        path.push('?');
        path.push_str(query);
    }

    Ok(Normalized {
        scheme: url.scheme().to_string(),
        netloc,
        path,
    })
}

/// One instance per crawl run.
#[derive(Debug, Clone)]
pub struct PageRegistry {
    max_pages: usize,
    domain: Option<String>,
    pages: Vec<Page>,
    index: HashMap<String, PageId>,
}

impl PageRegistry {
    pub fn new(max_pages: usize) -> Self {
        Self {
            max_pages,
            domain: None,
            pages: Vec::new(),
            index: HashMap::new(),
        }
    }

    pub fn max_pages(&self) -> usize {
        self.max_pages
    }

    /// The host (and explicit port) every page must share, once locked.
    pub fn domain(&self) -> Option<&str> {
        self.domain.as_deref()
    }

    pub fn len(&self) -> usize {
        self.pages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.pages.len() >= self.max_pages
    }

    /// Maps a raw URL onto its unique page.
    ///
    /// The budget only gates the creation of new identities: a URL whose
    /// canonical path is already registered resolves even when the registry
    /// is full.
    pub fn resolve(&mut self, raw: &str) -> Result<Resolved, Refusal> {
        let normalized = normalize(raw)?;

        match &self.domain {
            Some(domain) if *domain != normalized.netloc => {
                return Err(Refusal::DomainMismatch {
                    expected: domain.clone(),
                    found: normalized.netloc,
                });
            }
            Some(_) => {}
            None => {
                if self.is_full() {
                    return Err(Refusal::BudgetExceeded {
                        max_pages: self.max_pages,
                    });
                }
                debug!("Locking crawl to domain {}", normalized.netloc);
                self.domain = Some(normalized.netloc.clone());
            }
        }

        if let Some(&id) = self.index.get(&normalized.path) {
            return Ok(Resolved::Existing(id));
        }

        if self.is_full() {
            debug!("Refusing {}: max pages ({}) reached", raw, self.max_pages);
            return Err(Refusal::BudgetExceeded {
                max_pages: self.max_pages,
            });
        }

        let id = PageId(self.pages.len());
        self.index.insert(normalized.path.clone(), id);
        self.pages.push(Page {
            scheme: normalized.scheme,
            domain: normalized.netloc,
            path: normalized.path,
            links: Vec::new(),
            outcome: None,
        });
        Ok(Resolved::Created(id))
    }

    /// # Panics
    ///
    /// Panics if `id` was not handed out by this registry.
    pub fn page(&self, id: PageId) -> &Page {
        &self.pages[id.0]
    }

    pub fn get(&self, canonical_path: &str) -> Option<PageId> {
        self.index.get(canonical_path).copied()
    }

    pub fn pages(&self) -> impl Iterator<Item = (PageId, &Page)> {
        self.pages.iter().enumerate().map(|(i, page)| (PageId(i), page))
    }

    /// Stores the result of the page's own fetch. A page is fetched once;
    /// later recordings are ignored.
    pub fn record_fetch(&mut self, id: PageId, outcome: FetchOutcome, links: Vec<PageId>) {
        let page = &mut self.pages[id.0];
        if page.outcome.is_some() {
            warn!("Ignoring second fetch result for {}", page.url());
            return;
        }
        page.outcome = Some(outcome);
        page.links = links;
    }
}

impl Default for PageRegistry {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_PAGES)
    }
}
