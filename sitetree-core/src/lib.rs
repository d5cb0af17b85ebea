use colored::Colorize;

pub mod crawl;
pub mod report;

pub fn print_banner() {
    eprintln!(
        "{} {}",
        "sitetree".bright_cyan().bold(),
        env!("CARGO_PKG_VERSION").dimmed()
    );
    eprintln!("{}", "map a single website as a tree of pages".dimmed());
    eprintln!();
}
