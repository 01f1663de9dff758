//! # rustpubmed
//!
//! PubMed search pipeline that flags papers with industry-affiliated authors.
//!
//! ## Modules
//!
//! - [`pubmed`] - esearch/efetch client
//! - [`parser`] - efetch XML to typed records
//! - [`classifier`] - Company-keyword affiliation heuristic
//! - [`export`] - CSV output
//! - [`pipeline`] - One end-to-end run
//! - [`config`] - Endpoint and client settings
//! - [`error`] - Custom error types
//!
//! ## Usage
//!
//! ```rust,no_run
//! use rustpubmed::pipeline::find_industry_papers;
//! use rustpubmed::{AffiliationClassifier, ClientConfig, PubMedClient, Query};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let client = PubMedClient::new(ClientConfig::new("me@example.org"))?;
//!     let query = Query::new("cancer immunotherapy", 20)?;
//!     let summary =
//!         find_industry_papers(&client, &AffiliationClassifier::default(), &query).await?;
//!     println!("{} papers with industry authors", summary.papers.len());
//!     Ok(())
//! }
//! ```

pub mod classifier;
pub mod config;
pub mod error;
pub mod export;
pub mod models;
pub mod parser;
pub mod pipeline;
pub mod pubmed;

pub use classifier::AffiliationClassifier;
pub use config::ClientConfig;
pub use error::{PubmedError, Result};
pub use models::{AuthorRecord, FilteredPaper, PaperRecord, Query};
pub use pubmed::PubMedClient;
