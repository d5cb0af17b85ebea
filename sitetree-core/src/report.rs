// Report generation from a finished site map

use colored::Colorize;
use serde::{Deserialize, Serialize};
use sitetree_scanner::{FetchOutcome, NodeId, Page, PageId, SiteMap, TraversalOrder};
use std::collections::{HashSet, VecDeque};
use std::fs::File;
use std::io::Write;
use std::path::Path;

/// One indentation block per level of the page graph.
pub const INDENT_BLOCK: &str = "          ";

const NOT_AVAILABLE: &str = "N/A";
const DEFAULT_REASON: &str = "<No reason found.>";
const DEFAULT_TITLE: &str = "<Untitled webpage>";
const DEFAULT_URL: &str = "Unknown URL.";
const MALFORMED_RECORD: &str = "{Error: missing attributes in page record.}";

const SEPARATOR: &str =
    "━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReportFormat {
    Text,
    Json,
}

impl ReportFormat {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "text" | "txt" => Some(ReportFormat::Text),
            "json" => Some(ReportFormat::Json),
            _ => None,
        }
    }
}

/// Flat view of a fetch outcome, as printed and serialized.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutcomeRecord {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub http_code: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub requested_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub effective_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub redirected_to: Option<String>,
}

impl From<&FetchOutcome> for OutcomeRecord {
    fn from(outcome: &FetchOutcome) -> Self {
        Self {
            http_code: outcome.http_code(),
            reason: outcome.reason().map(str::to_string),
            title: outcome.title().map(str::to_string),
            requested_url: Some(outcome.requested_url().to_string()),
            effective_url: outcome.effective_url().map(str::to_string),
            content_type: outcome.content_type().map(str::to_string),
            redirected_to: outcome.redirected_to().map(str::to_string),
        }
    }
}

impl OutcomeRecord {
    fn for_page(page: &Page) -> Option<Self> {
        page.outcome().map(OutcomeRecord::from)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CrawlSummary {
    pub entrypoint: String,
    pub domain: Option<String>,
    pub max_pages: usize,
    pub pages_registered: usize,
    pub pages_fetched: usize,
    pub successful: usize,
    pub http_errors: usize,
    pub transport_errors: usize,
}

pub fn summarize(map: &SiteMap) -> CrawlSummary {
    let registry = map.registry();
    let mut summary = CrawlSummary {
        entrypoint: map.page(map.root_page()).url(),
        domain: registry.domain().map(str::to_string),
        max_pages: registry.max_pages(),
        pages_registered: registry.len(),
        ..Default::default()
    };

    for (_, page) in registry.pages() {
        let Some(outcome) = page.outcome() else {
            continue;
        };
        summary.pages_fetched += 1;
        if outcome.is_success() {
            summary.successful += 1;
        } else if outcome.http_code().is_some() {
            summary.http_errors += 1;
        } else {
            summary.transport_errors += 1;
        }
    }

    summary
}

fn status_tag(code: &str, http_code: Option<u16>, color: bool) -> String {
    let tag = format!("[{}]", code);
    if !color {
        return tag;
    }
    match http_code {
        Some(100..=199) => tag.white().to_string(),
        Some(200..=299) => tag.green().to_string(),
        Some(300..=399) => tag.cyan().to_string(),
        Some(400..=499) => tag.yellow().to_string(),
        Some(_) => tag.red().to_string(),
        None => tag.red().bold().to_string(),
    }
}

/// Renders one page block at the given indentation level, without a
/// trailing newline. `None` marks a page that was never fetched.
pub fn render_page(record: Option<&OutcomeRecord>, level: usize, color: bool) -> String {
    let indent = INDENT_BLOCK.repeat(level);
    let Some(record) = record else {
        return format!("{}{}", indent, MALFORMED_RECORD);
    };

    let reason = record.reason.as_deref().unwrap_or(DEFAULT_REASON);
    let url = record.requested_url.as_deref().unwrap_or(DEFAULT_URL);

    match record.http_code {
        None => format!(
            "{}{} {}",
            indent,
            status_tag("ERR", None, color),
            reason
        ),
        Some(code) => {
            let headline = if (200..300).contains(&code) {
                record.title.as_deref().unwrap_or(DEFAULT_TITLE)
            } else {
                reason
            };
            format!(
                "{indent}{} {}\n{indent} URL: {}",
                status_tag(&code.to_string(), Some(code), color),
                headline,
                url,
                indent = indent
            )
        }
    }
}

fn link_target(page: &Page) -> String {
    page.outcome()
        .and_then(|o| o.effective_url())
        .map(str::to_string)
        .unwrap_or_else(|| page.url())
}

/// Walks the page link graph breadth-first from the entrypoint. Each page is
/// printed once, under the first page that links to it; later links to an
/// already scheduled page become `+ Link to:` lines.
pub fn render_page_graph(map: &SiteMap, color: bool) -> String {
    let root = map.root_page();
    let mut scheduled_or_processed: HashSet<PageId> = HashSet::from([root]);
    let mut queue = VecDeque::from([(root, 0usize)]);
    let mut out = String::new();

    while let Some((id, level)) = queue.pop_front() {
        let page = map.page(id);

        let mut cross_references = Vec::new();
        for &link in page.links() {
            if scheduled_or_processed.insert(link) {
                queue.push_back((link, level + 1));
            } else {
                cross_references.push(link);
            }
        }

        out.push_str(&render_page(
            OutcomeRecord::for_page(page).as_ref(),
            level,
            color,
        ));
        out.push('\n');
        for link in cross_references {
            out.push_str(&INDENT_BLOCK.repeat(level));
            out.push_str(INDENT_BLOCK);
            out.push_str("+ Link to: ");
            out.push_str(&link_target(map.page(link)));
            out.push('\n');
        }
        out.push('\n');
    }

    out
}

pub fn generate_text_report(map: &SiteMap, color: bool) -> String {
    let summary = summarize(map);
    let mut report = String::new();

    report.push_str(SEPARATOR);
    report.push('\n');
    report.push_str(&format!("SITE MAP: {}\n", summary.entrypoint));
    report.push_str(SEPARATOR);
    report.push_str("\n\n");

    report.push_str(&format!(
        "Domain:            {}\n",
        summary.domain.as_deref().unwrap_or(NOT_AVAILABLE)
    ));
    report.push_str(&format!(
        "Pages registered:  {} / {}\n",
        summary.pages_registered, summary.max_pages
    ));
    report.push_str(&format!("Successful:        {}\n", summary.successful));
    report.push_str(&format!("HTTP errors:       {}\n", summary.http_errors));
    report.push_str(&format!("Transport errors:  {}\n", summary.transport_errors));
    report.push('\n');

    report.push_str(SEPARATOR);
    report.push_str("\n\n");
    report.push_str(&render_page_graph(map, color));

    report
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TreeNode {
    pub url: String,
    pub depth: usize,
    pub record: Option<OutcomeRecord>,
    /// Links to pages already placed elsewhere in the tree
    pub cross_references: Vec<String>,
    pub children: Vec<TreeNode>,
}

/// Builds the nested tree without recursing: nodes are assembled in reverse
/// pre-order, so every child is finished before its parent pops it.
///
/// Serializing the result still recurses once per level inside serde_json.
/// Chains a few thousand pages deep can exhaust the main thread's stack.
fn json_tree(map: &SiteMap) -> Option<TreeNode> {
    let tree = map.tree();
    let pre_order: Vec<NodeId> = tree.walk(TraversalOrder::DepthFirst).collect();
    let mut finished: Vec<TreeNode> = Vec::new();

    for &node in pre_order.iter().rev() {
        let page = map.node_page(node);
        let child_nodes = tree.children(node);
        let child_pages: Vec<PageId> = child_nodes.iter().map(|&c| *tree.payload(c)).collect();

        let cross_references = page
            .links()
            .iter()
            .filter(|link| !child_pages.contains(link))
            .map(|&link| link_target(map.page(link)))
            .collect();

        // children were pushed last-first, so popping restores their order
        let children = (0..child_nodes.len())
            .filter_map(|_| finished.pop())
            .collect();

        finished.push(TreeNode {
            url: page.url(),
            depth: tree.depth(node),
            record: OutcomeRecord::for_page(page),
            cross_references,
            children,
        });
    }

    finished.pop()
}

pub fn generate_json_report(map: &SiteMap) -> Result<String, serde_json::Error> {
    let json_report = serde_json::json!({
        "report": {
            "metadata": {
                "generator": "sitetree",
                "version": env!("CARGO_PKG_VERSION"),
                "generated_at": chrono::Utc::now().to_rfc3339(),
                "format": "json"
            },
            "summary": summarize(map),
            "tree": json_tree(map)
        }
    });

    serde_json::to_string_pretty(&json_report)
}

pub fn generate_report(
    map: &SiteMap,
    format: ReportFormat,
    color: bool,
) -> Result<String, serde_json::Error> {
    match format {
        ReportFormat::Text => Ok(generate_text_report(map, color)),
        ReportFormat::Json => generate_json_report(map),
    }
}

pub fn save_report(content: &str, path: &Path) -> std::io::Result<()> {
    let mut file = File::create(path)?;
    file.write_all(content.as_bytes())?;
    Ok(())
}
