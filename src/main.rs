//! rustpubmed - find PubMed papers with industry-affiliated authors
//!
//! ## Usage
//!
//! ```bash
//! rustpubmed "cancer immunotherapy" --email me@example.org -n 50 -f papers.csv
//! ```
//!
//! Without `--file` the CSV is printed to stdout; logs always go to stderr.

use anyhow::{Context, Result};
use clap::Parser;
use rustpubmed::models::DEFAULT_MAX_RESULTS;
use rustpubmed::pipeline::{self, Output};
use rustpubmed::{AffiliationClassifier, ClientConfig, PubMedClient, Query};
use std::path::PathBuf;
use std::time::Duration;
use tracing::Level;
use tracing_subscriber::{fmt, EnvFilter};

// ============================================================================
// CLI Definition
// ============================================================================

/// Search PubMed and list papers with at least one non-academic author
#[derive(Parser)]
#[command(name = "rustpubmed")]
#[command(version, about, long_about = None)]
struct Cli {
    /// PubMed search query (full PubMed syntax)
    query: String,

    /// Output CSV file (prints to stdout when omitted)
    #[arg(short, long)]
    file: Option<PathBuf>,

    /// Contact email sent to NCBI
    #[arg(short, long, env = "PUBMED_EMAIL")]
    email: String,

    /// Maximum number of search results
    #[arg(short = 'n', long, default_value_t = DEFAULT_MAX_RESULTS)]
    max_results: u32,

    /// NCBI API key
    #[arg(long, env = "NCBI_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    /// Company markers, comma-separated (default: Pharma,Biotech,Laboratories,Inc.,Ltd.)
    #[arg(long, value_delimiter = ',')]
    keywords: Option<Vec<String>>,

    /// Max PMIDs per efetch request (default: all in one request)
    #[arg(long)]
    batch_size: Option<usize>,

    /// Request timeout in seconds
    #[arg(long, default_value_t = 30)]
    timeout: u64,

    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,
}

// ============================================================================
// Main Entry Point
// ============================================================================

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = if cli.debug { Level::DEBUG } else { Level::INFO };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(log_level.to_string()));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    let config = ClientConfig::new(cli.email)
        .with_api_key(cli.api_key)
        .with_timeout(Duration::from_secs(cli.timeout))
        .with_fetch_batch_size(cli.batch_size);
    let client = PubMedClient::new(config).context("Invalid client configuration")?;

    let classifier = match cli.keywords {
        Some(keywords) => AffiliationClassifier::new(keywords),
        None => AffiliationClassifier::default(),
    };
    if classifier.keywords().is_empty() {
        anyhow::bail!("--keywords must contain at least one non-empty keyword");
    }

    let query = Query::new(cli.query, cli.max_results).context("Invalid query")?;
    let output = match cli.file {
        Some(path) => Output::File(path),
        None => Output::Stdout,
    };

    let summary = pipeline::run(&client, &classifier, &query, &output)
        .await
        .context("PubMed pipeline failed")?;

    if !summary.exported {
        eprintln!("No results for {:?}; nothing written.", query.term());
        return Ok(());
    }

    if let Output::File(path) = &output {
        eprintln!(
            "Saved {} of {} papers to {}",
            summary.papers.len(),
            summary.parsed,
            path.display()
        );
    }
    Ok(())
}
