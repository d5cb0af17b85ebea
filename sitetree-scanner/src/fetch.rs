//! One GET per page and a best-effort, line-oriented scan of the body.
//!
//! The scan is not an HTML parser: it looks for the first
//! `<title>...</title>` and every `href="..."` within single lines, so tags
//! split across lines may be missed.

use crate::error::Result;
use crate::result::FetchOutcome;
use regex::Regex;
use reqwest::Client;
use reqwest::header::CONTENT_TYPE;
use std::collections::HashSet;
use std::future::Future;
use std::sync::OnceLock;
use std::time::Duration;
use tracing::{debug, warn};
use url::Url;

pub const DEFAULT_TIMEOUT_SECS: u64 = 10;
const REDIRECT_LIMIT: usize = 10;

/// Fetches a single page. Implementations never fail: every problem is
/// reported through the returned [`FetchOutcome`].
pub trait Fetch {
    fn fetch(&self, url: &str) -> impl Future<Output = FetchOutcome> + Send;
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedPage {
    pub title: Option<String>,
    pub hrefs: Vec<String>,
}

fn title_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)<title>(.*?)</title>").expect("title regex is valid"))
}

fn href_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r#"(?i)href="([^"]+)""#).expect("href regex is valid"))
}

/// Scans `body` line by line; hrefs are resolved against `base` (the URL the
/// body was actually served from) and de-duplicated in first-seen order.
pub fn parse_page(body: &str, base: &Url) -> ParsedPage {
    let mut parsed = ParsedPage::default();
    let mut seen = HashSet::new();

    for line in body.lines() {
        if parsed.title.is_none()
            && let Some(caps) = title_regex().captures(line)
        {
            parsed.title = Some(caps[1].trim().to_string());
        }

        for caps in href_regex().captures_iter(line) {
            if let Some(absolute) = resolve_href(base, &caps[1])
                && seen.insert(absolute.clone())
            {
                parsed.hrefs.push(absolute);
            }
        }
    }

    parsed
}

fn resolve_href(base: &Url, href: &str) -> Option<String> {
    let href = href.trim();
    // Skip empty, javascript:, mailto:, tel: and same-page anchors
    if href.is_empty()
        || href.starts_with('#')
        || href.starts_with("javascript:")
        || href.starts_with("mailto:")
        || href.starts_with("tel:")
    {
        return None;
    }

    let mut resolved = base.join(href).ok()?;
    if resolved.scheme() != "http" && resolved.scheme() != "https" {
        return None;
    }
    resolved.set_fragment(None);
    Some(resolved.to_string())
}

fn mime_essence(content_type: &str) -> String {
    content_type
        .split(';')
        .next()
        .unwrap_or(content_type)
        .trim()
        .to_ascii_lowercase()
}

#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
    timeout_secs: u64,
}

impl HttpFetcher {
    pub fn new() -> Result<Self> {
        Self::with_timeout(DEFAULT_TIMEOUT_SECS)
    }

    pub fn with_timeout(timeout_secs: u64) -> Result<Self> {
        let client = Client::builder()
            .user_agent(concat!("sitetree/", env!("CARGO_PKG_VERSION")))
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs((timeout_secs / 2).max(1)))
            .redirect(reqwest::redirect::Policy::limited(REDIRECT_LIMIT))
            .build()?;

        Ok(Self {
            client,
            timeout_secs,
        })
    }

    fn describe_error(&self, err: &reqwest::Error) -> String {
        if err.is_timeout() {
            format!("request timed out after {}s", self.timeout_secs)
        } else if err.is_redirect() {
            format!("more than {} redirects", REDIRECT_LIMIT)
        } else {
            err.to_string()
        }
    }
}

impl Fetch for HttpFetcher {
    async fn fetch(&self, url: &str) -> FetchOutcome {
        debug!("Fetching {}", url);

        let response = match self.client.get(url).send().await {
            Ok(response) => response,
            Err(e) => {
                let reason = self.describe_error(&e);
                warn!("Request for {} failed: {}", url, reason);
                return FetchOutcome::transport(url, reason);
            }
        };

        let status = response.status();
        let effective = response.url().clone();

        if !status.is_success() {
            return FetchOutcome::HttpFailure {
                requested_url: url.to_string(),
                effective_url: effective.to_string(),
                http_code: status.as_u16(),
                reason: status.canonical_reason().unwrap_or("Unknown").to_string(),
            };
        }

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(mime_essence)
            .unwrap_or_else(|| "text/plain".to_string());

        if content_type != "text/html" {
            return FetchOutcome::NonHtml {
                requested_url: url.to_string(),
                effective_url: effective.to_string(),
                http_code: status.as_u16(),
                content_type,
            };
        }

        let body = match response.text().await {
            Ok(body) => body,
            Err(e) => {
                let reason = self.describe_error(&e);
                warn!("Reading body of {} failed: {}", url, reason);
                return FetchOutcome::transport(url, reason);
            }
        };

        let ParsedPage { title, hrefs } = parse_page(&body, &effective);
        debug!("{} links found on {}", hrefs.len(), effective);

        FetchOutcome::Html {
            requested_url: url.to_string(),
            effective_url: effective.to_string(),
            http_code: status.as_u16(),
            content_type,
            title,
            hrefs,
        }
    }
}
