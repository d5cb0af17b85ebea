use crate::CLAP_STYLING;
use clap::arg;

pub fn command_argument_builder() -> clap::Command {
    clap::Command::new("sitetree")
        .version(env!("CARGO_PKG_VERSION"))
        .bin_name("sitetree")
        .about("Crawl a single website and print it as a tree of pages")
        .styles(CLAP_STYLING)
        .arg(
            arg!(<URL>)
                .required(true)
                .help("Entrypoint of the crawl; https:// is assumed when no scheme is given"),
        )
        .arg(
            arg!(-v --"verbose")
                .required(false)
                .help("Print debug diagnostics to stderr")
                .action(clap::ArgAction::SetTrue),
        )
        .arg(
            arg!(-q --"quiet")
                .required(false)
                .help("Suppress banner, status lines and the progress spinner")
                .action(clap::ArgAction::SetTrue),
        )
        .arg(
            arg!(--"max-pages" <N>)
                .required(false)
                .help("Maximum number of distinct pages to register")
                .value_parser(clap::value_parser!(usize))
                .default_value("256"),
        )
        .arg(
            arg!(--"max-depth" <N>)
                .required(false)
                .help("Maximum crawl depth (not implemented; the crawl is refused)")
                .value_parser(clap::value_parser!(usize)),
        )
        .arg(
            arg!(--"traversal" <ORDER>)
                .required(false)
                .help("Traversal order: BF (breadth-first) or DF (depth-first)")
                .default_value("BF"),
        )
        .arg(
            arg!(--"timeout" <SECONDS>)
                .required(false)
                .help("Request timeout in seconds")
                .value_parser(clap::value_parser!(u64).range(1..))
                .default_value("10"),
        )
        .arg(
            arg!(-f --"format" <FORMAT>)
                .required(false)
                .help("Report format: text, json")
                .value_parser(["text", "json"])
                .default_value("text"),
        )
        .arg(
            arg!(-o --"output" <PATH>)
                .required(false)
                .help("Save report to file (default: display to screen)"),
        )
}
