//! SiteScope main entry point
//!
//! This is the command-line interface for the SiteScope website crawler.

use clap::Parser;
use sitescope::analysers::ResultType;
use sitescope::config::{load_config, Config};
use sitescope::document::{CrawlResult, Document, DocumentRef};
use sitescope::{CrawlObserver, Crawler};
use std::path::PathBuf;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

/// SiteScope: a concurrent website crawler and analyser
///
/// SiteScope fetches the given seed URLs, follows every reference it can
/// discover (links, scripts, stylesheets, images, media), and builds a
/// deduplicated document graph annotated with quality findings.
#[derive(Parser, Debug)]
#[command(name = "sitescope")]
#[command(version = "1.0.0")]
#[command(about = "A concurrent website crawler and analyser", long_about = None)]
struct Cli {
    /// Comma-separated seed URLs; entries without a scheme get http://
    #[arg(value_name = "SEED_URLS")]
    seed_urls: String,

    /// Path to TOML configuration file
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Override the configured worker pool size
    #[arg(long, value_name = "N")]
    max_concurrency: Option<usize>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    // Load and validate configuration
    let config = match &cli.config {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path.display());
            load_config(path)?
        }
        None => Config::default(),
    };

    let mut options = config.to_options()?;
    if let Some(max_concurrency) = cli.max_concurrency {
        options.max_concurrency = max_concurrency;
    }

    // A Ctrl-C press cancels the run; workers stop at the next await point
    let cancel = CancellationToken::new();
    let signal_token = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Interrupt received, stopping crawl");
            signal_token.cancel();
        }
    });

    let crawler = Crawler::new(options).with_observer(Box::new(ProgressObserver));
    match crawler.run(&cli.seed_urls, cancel).await {
        Ok(result) => {
            print_summary(&result);
            Ok(())
        }
        Err(e) => {
            tracing::error!("Crawl failed: {}", e);
            Err(e.into())
        }
    }
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("sitescope=info,warn"),
            1 => EnvFilter::new("sitescope=debug,info"),
            2 => EnvFilter::new("sitescope=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Logs crawl lifecycle events as they happen
struct ProgressObserver;

impl CrawlObserver for ProgressObserver {
    fn document_parsed(&self, document: &Arc<Document>) {
        match (&document.error_message, document.status) {
            (Some(error), _) => tracing::warn!("Failed {}: {}", document.url, error),
            (None, Some(status)) => tracing::info!("Crawled {} ({})", document.url, status),
            (None, None) => tracing::info!("Crawled {}", document.url),
        }
    }

    fn document_ref_added(&self, document: &Arc<Document>, reference: &DocumentRef) {
        if let Some(source) = &reference.source_url {
            tracing::debug!("Reference {} -> {}", source, document.url);
        }
    }
}

/// Prints the end-of-run summary to stdout
fn print_summary(result: &CrawlResult) {
    let failed = result
        .documents
        .iter()
        .filter(|d| d.error_message.is_some())
        .count();
    let loops = result
        .documents
        .iter()
        .filter(|d| d.redirection_loop)
        .count();
    let references: usize = result.documents.iter().map(|d| d.references().len()).sum();
    let html_errors: usize = result.documents.iter().map(|d| d.html_errors.len()).sum();

    let mut warnings = 0usize;
    let mut errors = 0usize;
    for document in &result.documents {
        for item in &document.analyser_results {
            match item.result_type {
                ResultType::Warning => warnings += 1,
                ResultType::Error => errors += 1,
                ResultType::Good | ResultType::Info => {}
            }
        }
    }

    println!("=== Crawl Summary ===\n");
    println!(
        "Seeds: {}",
        result
            .root_urls
            .iter()
            .map(url::Url::as_str)
            .collect::<Vec<_>>()
            .join(", ")
    );
    println!("Documents: {}", result.documents.len());
    println!("References: {}", references);
    println!("Fetch failures: {}", failed);
    println!("Redirect loops: {}", loops);
    println!("HTML parse errors: {}", html_errors);
    println!("Findings: {} warnings, {} errors", warnings, errors);
}
