// Tests for report generation functionality

use sitetree_core::report::{
    INDENT_BLOCK, OutcomeRecord, ReportFormat, generate_json_report, generate_report,
    generate_text_report, render_page, render_page_graph, save_report, summarize,
};
use sitetree_scanner::{Crawler, Fetch, FetchOutcome, SiteMap, TraversalOrder};
use std::collections::HashMap;
use tempfile::TempDir;

/// Answers each URL with a prepared outcome.
struct Scripted {
    outcomes: HashMap<&'static str, FetchOutcome>,
}

impl Fetch for Scripted {
    async fn fetch(&self, url: &str) -> FetchOutcome {
        self.outcomes
            .get(url)
            .cloned()
            .unwrap_or_else(|| FetchOutcome::transport(url, "unexpected request"))
    }
}

fn html(url: &str, title: Option<&str>, hrefs: &[&str]) -> FetchOutcome {
    FetchOutcome::Html {
        requested_url: url.to_string(),
        effective_url: url.to_string(),
        http_code: 200,
        content_type: "text/html".to_string(),
        title: title.map(str::to_string),
        hrefs: hrefs.iter().map(|h| h.to_string()).collect(),
    }
}

const HOME: &str = "https://example.com/";
const B: &str = "https://example.com/b";
const C: &str = "https://example.com/c";
const D: &str = "https://example.com/d";

/// HOME -> B, C; B -> C, HOME, D. C is unreachable and D answers 404.
async fn sample_map() -> SiteMap {
    let mut outcomes = HashMap::new();
    outcomes.insert(HOME, html(HOME, Some("Home"), &[B, C]));
    outcomes.insert(B, html(B, Some("Bee"), &[C, HOME, D]));
    outcomes.insert(C, FetchOutcome::transport(C, "connection refused"));
    outcomes.insert(
        D,
        FetchOutcome::HttpFailure {
            requested_url: D.to_string(),
            effective_url: D.to_string(),
            http_code: 404,
            reason: "Not Found".to_string(),
        },
    );

    Crawler::with_fetcher(Scripted { outcomes })
        .crawl(HOME, TraversalOrder::BreadthFirst)
        .await
        .unwrap()
}

// ============================================================================
// Report Format Tests
// ============================================================================

#[test]
fn test_report_format_from_str() {
    assert!(matches!(ReportFormat::from_str("text"), Some(ReportFormat::Text)));
    assert!(matches!(ReportFormat::from_str("json"), Some(ReportFormat::Json)));
}

#[test]
fn test_report_format_from_str_case_insensitive() {
    assert!(matches!(ReportFormat::from_str("TEXT"), Some(ReportFormat::Text)));
    assert!(matches!(ReportFormat::from_str("Json"), Some(ReportFormat::Json)));
}

#[test]
fn test_report_format_from_str_invalid() {
    assert!(ReportFormat::from_str("csv").is_none());
    assert!(ReportFormat::from_str("").is_none());
}

// ============================================================================
// Page Block Tests
// ============================================================================

#[test]
fn test_render_success_block() {
    let record = OutcomeRecord {
        http_code: Some(200),
        title: Some("Home".to_string()),
        requested_url: Some(HOME.to_string()),
        ..Default::default()
    };
    assert_eq!(
        render_page(Some(&record), 0, false),
        "[200] Home\n URL: https://example.com/"
    );
}

#[test]
fn test_render_block_is_indented_per_line() {
    let record = OutcomeRecord {
        http_code: Some(503),
        reason: Some("Service Unavailable".to_string()),
        requested_url: Some(B.to_string()),
        ..Default::default()
    };
    let indent = INDENT_BLOCK.repeat(2);
    assert_eq!(
        render_page(Some(&record), 2, false),
        format!("{indent}[503] Service Unavailable\n{indent} URL: {B}")
    );
}

#[test]
fn test_record_without_http_code_renders_as_transport_error() {
    let record: OutcomeRecord =
        serde_json::from_str(r#"{"reason": "dns error", "requested_url": "https://example.com/"}"#)
            .unwrap();
    assert_eq!(render_page(Some(&record), 0, false), "[ERR] dns error");
}

#[test]
fn test_render_defaults_for_missing_values() {
    let untitled = OutcomeRecord {
        http_code: Some(200),
        ..Default::default()
    };
    assert_eq!(
        render_page(Some(&untitled), 0, false),
        "[200] <Untitled webpage>\n URL: Unknown URL."
    );

    let no_reason = OutcomeRecord {
        http_code: Some(500),
        ..Default::default()
    };
    assert_eq!(
        render_page(Some(&no_reason), 0, false),
        "[500] <No reason found.>\n URL: Unknown URL."
    );

    assert_eq!(
        render_page(Some(&OutcomeRecord::default()), 0, false),
        "[ERR] <No reason found.>"
    );
}

#[test]
fn test_missing_record_renders_sentinel() {
    assert_eq!(
        render_page(None, 1, false),
        format!("{INDENT_BLOCK}{{Error: missing attributes in page record.}}")
    );
}

#[test]
fn test_colored_block_keeps_text() {
    let record = OutcomeRecord {
        http_code: Some(404),
        reason: Some("Not Found".to_string()),
        requested_url: Some(D.to_string()),
        ..Default::default()
    };
    let rendered = render_page(Some(&record), 0, true);
    assert!(rendered.contains("[404]"));
    assert!(rendered.contains("Not Found"));
    assert!(rendered.ends_with(" URL: https://example.com/d"));
}

#[test]
fn test_record_from_redirected_outcome() {
    let outcome = FetchOutcome::NonHtml {
        requested_url: "https://example.com/old.pdf".to_string(),
        effective_url: "https://example.com/new.pdf".to_string(),
        http_code: 200,
        content_type: "application/pdf".to_string(),
    };
    let record = OutcomeRecord::from(&outcome);
    assert_eq!(record.redirected_to.as_deref(), Some("https://example.com/new.pdf"));
    assert_eq!(record.content_type.as_deref(), Some("application/pdf"));
    assert_eq!(record.title, None);

    let json = serde_json::to_value(&record).unwrap();
    assert!(json.get("reason").is_none());
}

// ============================================================================
// Page Graph Tests
// ============================================================================

#[tokio::test]
async fn test_render_page_graph() {
    let map = sample_map().await;
    let i1 = INDENT_BLOCK;
    let i2 = INDENT_BLOCK.repeat(2);

    let expected = format!(
        "[200] Home\n URL: {HOME}\n\
         \n\
         {i1}[200] Bee\n{i1} URL: {B}\n\
         {i2}+ Link to: {C}\n\
         {i2}+ Link to: {HOME}\n\
         \n\
         {i1}[ERR] connection refused\n\
         \n\
         {i2}[404] Not Found\n{i2} URL: {D}\n\
         \n"
    );

    assert_eq!(render_page_graph(&map, false), expected);
}

#[tokio::test]
async fn test_entrypoint_is_never_rescheduled() {
    let map = sample_map().await;
    let rendered = render_page_graph(&map, false);

    // HOME is printed once as a block and once as a cross reference from B
    assert_eq!(rendered.matches("[200] Home").count(), 1);
    assert_eq!(rendered.matches(&format!("+ Link to: {HOME}")).count(), 1);
}

#[tokio::test]
async fn test_summary_counts() {
    let map = sample_map().await;
    let summary = summarize(&map);

    assert_eq!(summary.entrypoint, HOME);
    assert_eq!(summary.domain.as_deref(), Some("example.com"));
    assert_eq!(summary.pages_registered, 4);
    assert_eq!(summary.pages_fetched, 4);
    assert_eq!(summary.successful, 2);
    assert_eq!(summary.http_errors, 1);
    assert_eq!(summary.transport_errors, 1);
}

#[tokio::test]
async fn test_text_report_has_header_and_graph() {
    let map = sample_map().await;
    let report = generate_text_report(&map, false);

    assert!(report.contains("SITE MAP: https://example.com/"));
    assert!(report.contains("Pages registered:  4 / 256"));
    assert!(report.ends_with(&render_page_graph(&map, false)));
}

// ============================================================================
// JSON Report Tests
// ============================================================================

#[tokio::test]
async fn test_json_report_structure() {
    let map = sample_map().await;
    let json = generate_json_report(&map).unwrap();
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();

    let report = &value["report"];
    assert_eq!(report["metadata"]["generator"], "sitetree");
    assert_eq!(report["metadata"]["format"], "json");
    assert!(report["metadata"]["generated_at"].is_string());
    assert_eq!(report["summary"]["pages_registered"], 4);

    let root = &report["tree"];
    assert_eq!(root["url"], HOME);
    assert_eq!(root["depth"], 0);
    assert_eq!(root["record"]["title"], "Home");
    assert_eq!(root["cross_references"].as_array().unwrap().len(), 0);

    let children = root["children"].as_array().unwrap();
    assert_eq!(children.len(), 2);

    let b = &children[0];
    assert_eq!(b["url"], B);
    assert_eq!(b["cross_references"], serde_json::json!([C, HOME]));
    assert_eq!(b["children"][0]["record"]["http_code"], 404);

    let c = &children[1];
    assert!(c["record"].get("http_code").is_none());
    assert_eq!(c["record"]["reason"], "connection refused");
}

#[tokio::test]
async fn test_generate_report_dispatch() {
    let map = sample_map().await;
    let text = generate_report(&map, ReportFormat::Text, false).unwrap();
    assert!(text.contains("[ERR] connection refused"));

    let json = generate_report(&map, ReportFormat::Json, false).unwrap();
    assert!(json.trim_start().starts_with('{'));
}

// ============================================================================
// Save Report Tests
// ============================================================================

#[tokio::test]
async fn test_save_report() {
    let map = sample_map().await;
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("sitemap.txt");

    let report = generate_text_report(&map, false);
    save_report(&report, &path).unwrap();

    let written = std::fs::read_to_string(&path).unwrap();
    assert_eq!(written, report);
}

#[test]
fn test_save_report_to_missing_directory_fails() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("missing").join("report.json");
    assert!(save_report("{}", &path).is_err());
}
