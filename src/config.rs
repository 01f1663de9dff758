//! Client configuration for the NCBI E-utilities endpoints.

use crate::error::{PubmedError, Result};
use std::time::Duration;
use url::Url;

/// NCBI esearch endpoint
pub const ESEARCH_URL: &str = "https://eutils.ncbi.nlm.nih.gov/entrez/eutils/esearch.fcgi";

/// NCBI efetch endpoint
pub const EFETCH_URL: &str = "https://eutils.ncbi.nlm.nih.gov/entrez/eutils/efetch.fcgi";

/// Default request timeout
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Settings shared by the search and fetch calls.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Contact address sent with every request (NCBI usage policy)
    pub email: String,

    /// NCBI API key (optional, raises the upstream rate limit)
    pub api_key: Option<String>,

    /// esearch URL (overridable for mock servers)
    pub search_url: String,

    /// efetch URL (overridable for mock servers)
    pub fetch_url: String,

    /// Per-request timeout
    pub timeout: Duration,

    /// Max identifiers per efetch request; `None` sends all of them at once
    pub fetch_batch_size: Option<usize>,
}

impl ClientConfig {
    /// Configuration against the real NCBI endpoints.
    pub fn new(email: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            api_key: None,
            search_url: ESEARCH_URL.to_string(),
            fetch_url: EFETCH_URL.to_string(),
            timeout: DEFAULT_TIMEOUT,
            fetch_batch_size: None,
        }
    }

    /// Configuration with both endpoints under `base_url` (a mock server).
    pub fn for_testing(base_url: &str) -> Self {
        let base = base_url.trim_end_matches('/');
        Self {
            search_url: format!("{}/esearch.fcgi", base),
            fetch_url: format!("{}/efetch.fcgi", base),
            timeout: Duration::from_secs(5),
            ..Self::new("test@example.com")
        }
    }

    pub fn with_api_key(mut self, api_key: Option<String>) -> Self {
        self.api_key = api_key.filter(|k| !k.trim().is_empty());
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_fetch_batch_size(mut self, size: Option<usize>) -> Self {
        self.fetch_batch_size = size;
        self
    }

    /// Check the contact address, endpoint URLs and batch size.
    pub fn validate(&self) -> Result<()> {
        let email = self.email.trim();
        if email.is_empty() || !email.contains('@') {
            return Err(PubmedError::Config(format!(
                "invalid contact email: {:?}",
                self.email
            )));
        }

        for (name, value) in [("search", &self.search_url), ("fetch", &self.fetch_url)] {
            let url = Url::parse(value)
                .map_err(|e| PubmedError::Config(format!("invalid {} URL {}: {}", name, value, e)))?;
            if !matches!(url.scheme(), "http" | "https") {
                return Err(PubmedError::Config(format!(
                    "{} URL must be http(s): {}",
                    name, value
                )));
            }
        }

        if self.fetch_batch_size == Some(0) {
            return Err(PubmedError::Config(
                "fetch batch size must be positive".to_string(),
            ));
        }

        if self.timeout.is_zero() {
            return Err(PubmedError::Config("timeout must be positive".to_string()));
        }

        Ok(())
    }
}
