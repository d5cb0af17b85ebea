/// Result of one network attempt for one page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    /// 2xx response with an HTML body.
    Html {
        requested_url: String,
        effective_url: String,
        http_code: u16,
        content_type: String,
        title: Option<String>,
        /// Absolute, de-duplicated, in first-seen order.
        hrefs: Vec<String>,
    },
    /// 2xx response with any other content type. Never yields links.
    NonHtml {
        requested_url: String,
        effective_url: String,
        http_code: u16,
        content_type: String,
    },
    /// Final status of 300 or above.
    HttpFailure {
        requested_url: String,
        effective_url: String,
        http_code: u16,
        reason: String,
    },
    /// No HTTP status was received at all.
    TransportFailure { requested_url: String, reason: String },
}

impl FetchOutcome {
    pub fn transport(requested_url: impl Into<String>, reason: impl Into<String>) -> Self {
        FetchOutcome::TransportFailure {
            requested_url: requested_url.into(),
            reason: reason.into(),
        }
    }

    pub fn requested_url(&self) -> &str {
        match self {
            FetchOutcome::Html { requested_url, .. }
            | FetchOutcome::NonHtml { requested_url, .. }
            | FetchOutcome::HttpFailure { requested_url, .. }
            | FetchOutcome::TransportFailure { requested_url, .. } => requested_url,
        }
    }

    pub fn effective_url(&self) -> Option<&str> {
        match self {
            FetchOutcome::Html { effective_url, .. }
            | FetchOutcome::NonHtml { effective_url, .. }
            | FetchOutcome::HttpFailure { effective_url, .. } => Some(effective_url),
            FetchOutcome::TransportFailure { .. } => None,
        }
    }

    /// The effective URL when the request was redirected elsewhere.
    pub fn redirected_to(&self) -> Option<&str> {
        self.effective_url()
            .filter(|effective| *effective != self.requested_url())
    }

    pub fn http_code(&self) -> Option<u16> {
        match self {
            FetchOutcome::Html { http_code, .. }
            | FetchOutcome::NonHtml { http_code, .. }
            | FetchOutcome::HttpFailure { http_code, .. } => Some(*http_code),
            FetchOutcome::TransportFailure { .. } => None,
        }
    }

    pub fn content_type(&self) -> Option<&str> {
        match self {
            FetchOutcome::Html { content_type, .. } | FetchOutcome::NonHtml { content_type, .. } => {
                Some(content_type)
            }
            _ => None,
        }
    }

    pub fn title(&self) -> Option<&str> {
        match self {
            FetchOutcome::Html { title, .. } => title.as_deref(),
            _ => None,
        }
    }

    pub fn reason(&self) -> Option<&str> {
        match self {
            FetchOutcome::HttpFailure { reason, .. } | FetchOutcome::TransportFailure { reason, .. } => {
                Some(reason)
            }
            _ => None,
        }
    }

    pub fn hrefs(&self) -> &[String] {
        match self {
            FetchOutcome::Html { hrefs, .. } => hrefs,
            _ => &[],
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, FetchOutcome::Html { .. } | FetchOutcome::NonHtml { .. })
    }
}
