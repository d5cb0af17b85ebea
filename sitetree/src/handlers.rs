use anyhow::Context;
use clap::ArgMatches;
use colored::Colorize;
use sitetree_core::crawl::{CrawlOptions, execute_crawl};
use sitetree_core::report::{ReportFormat, generate_report, save_report, summarize};
use sitetree_scanner::CrawlError;
use std::path::{Path, PathBuf};
use tracing::Level;

/// Exit code for failures while crawling or writing the report
pub const EXIT_RUNTIME: i32 = 1;
/// Exit code for options that are refused before any request
pub const EXIT_CONFIG: i32 = 2;

/// Install the stderr log subscriber. Safe to call more than once.
pub fn init_logging(verbose: bool) {
    let level = if verbose { Level::DEBUG } else { Level::WARN };
    let _ = tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .with_target(verbose)
        .try_init();
}

/// Build crawl options from parsed arguments
pub fn crawl_options_from_matches(matches: &ArgMatches) -> CrawlOptions {
    let entrypoint = matches
        .get_one::<String>("URL")
        .cloned()
        .unwrap_or_default();
    let mut options = CrawlOptions::new(entrypoint);

    if let Some(&max_pages) = matches.get_one::<usize>("max-pages") {
        options.max_pages = max_pages;
    }
    options.max_depth = matches.get_one::<usize>("max-depth").copied();
    if let Some(traversal) = matches.get_one::<String>("traversal") {
        options.traversal = traversal.clone();
    }
    if let Some(&timeout) = matches.get_one::<u64>("timeout") {
        options.timeout_secs = timeout;
    }
    options.verbose = matches.get_flag("verbose");
    options.show_progress_bars = !matches.get_flag("quiet");

    options
}

pub fn report_format_from_matches(matches: &ArgMatches) -> ReportFormat {
    matches
        .get_one::<String>("format")
        .and_then(|f| ReportFormat::from_str(f))
        .unwrap_or(ReportFormat::Text)
}

/// Expand a leading `~` in the report path
pub fn expand_output_path(raw: &str) -> PathBuf {
    PathBuf::from(shellexpand::tilde(raw).as_ref())
}

pub fn exit_code_for(err: &anyhow::Error) -> i32 {
    match err.downcast_ref::<CrawlError>() {
        Some(crawl_err) if crawl_err.is_configuration() => EXIT_CONFIG,
        _ => EXIT_RUNTIME,
    }
}

fn write_report(report: &str, output: Option<&Path>, quiet: bool) -> anyhow::Result<()> {
    match output {
        Some(path) => {
            save_report(report, path)
                .with_context(|| format!("Failed to write report to {}", path.display()))?;
            if !quiet {
                eprintln!(
                    "{} Report saved to {}",
                    "✓".green().bold(),
                    path.display().to_string().cyan()
                );
            }
        }
        None => print!("{}", report),
    }
    Ok(())
}

/// Run one crawl described by the parsed arguments and emit its report.
pub async fn run_crawl(matches: &ArgMatches) -> anyhow::Result<()> {
    let options = crawl_options_from_matches(matches);
    init_logging(options.verbose);

    let order = options.validate()?;
    let format = report_format_from_matches(matches);
    let output = matches
        .get_one::<String>("output")
        .map(|p| expand_output_path(p));
    let quiet = matches.get_flag("quiet");

    if !quiet {
        eprintln!(
            "{} Crawling {}",
            "→".cyan().bold(),
            options.entrypoint.bold()
        );
        eprintln!("Traversal: {}", order);
        eprintln!("Max pages: {}", options.max_pages);
        eprintln!("Timeout:   {}s\n", options.timeout_secs);
    }

    let map = execute_crawl(options, None).await?;

    if !quiet {
        let summary = summarize(&map);
        eprintln!(
            "\n{} Crawl complete! {} pages ({} ok, {} HTTP errors, {} unreachable)\n",
            "✓".green().bold(),
            summary.pages_registered,
            summary.successful,
            summary.http_errors,
            summary.transport_errors
        );
    }

    let color = output.is_none();
    let report = generate_report(&map, format, color).context("Failed to render report")?;
    write_report(&report, output.as_deref(), quiet)
}

pub async fn handle_crawl(matches: &ArgMatches) {
    if let Err(e) = run_crawl(matches).await {
        eprintln!("{} {:#}", "✗".red().bold(), e);
        std::process::exit(exit_code_for(&e));
    }
}
