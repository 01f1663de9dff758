//! PubMed E-utilities client.
//!
//! Two sequential calls: `esearch` turns a query into PMIDs, then `efetch`
//! returns the XML records for those PMIDs in a single request (or in
//! chunks when `fetch_batch_size` is configured).
//!
//! API Details:
//! - esearch: `db`, `term`, `retmax`, `retmode=json`, `email`
//! - efetch:  `db`, `id` (comma-joined), `retmode=xml`, `email`
//! - `api_key` is appended to both when configured

use crate::config::ClientConfig;
use crate::error::{PubmedError, Result};
use crate::models::{PaperRecord, Query};
use crate::parser::parse_pubmed_xml;
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, info};

/// Entrez database queried by both endpoints
const DATABASE: &str = "pubmed";

/// esearch JSON envelope
#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    esearchresult: Option<SearchResult>,
}

#[derive(Debug, Deserialize)]
struct SearchResult {
    #[serde(default)]
    idlist: Vec<String>,
    #[serde(default)]
    count: Option<String>,
}

/// Client for the esearch/efetch pair
pub struct PubMedClient {
    client: Client,
    config: ClientConfig,
}

impl PubMedClient {
    /// Create a client from a validated configuration.
    pub fn new(config: ClientConfig) -> Result<Self> {
        config.validate()?;

        let client = Client::builder()
            .user_agent(format!(
                "rustpubmed/{} (mailto:{})",
                env!("CARGO_PKG_VERSION"),
                config.email
            ))
            .timeout(config.timeout)
            .build()
            .map_err(|e| PubmedError::Config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self { client, config })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    fn common_params(&self) -> Vec<(&'static str, String)> {
        let mut params = vec![
            ("db", DATABASE.to_string()),
            ("email", self.config.email.clone()),
        ];
        if let Some(key) = &self.config.api_key {
            params.push(("api_key", key.clone()));
        }
        params
    }

    /// Search PubMed and return the matching PMIDs, in upstream order.
    pub async fn search(&self, query: &Query) -> Result<Vec<String>> {
        let mut params = self.common_params();
        params.push(("term", query.term().to_string()));
        params.push(("retmax", query.max_results().to_string()));
        params.push(("retmode", "json".to_string()));

        info!(
            term = query.term(),
            max_results = query.max_results(),
            "Searching PubMed"
        );

        let response = self
            .client
            .get(&self.config.search_url)
            .query(&params)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(PubmedError::Http {
                status: status.as_u16(),
                message: format!("esearch: {}", status),
            });
        }

        let body = response.text().await?;
        let data: SearchResponse = serde_json::from_str(&body)
            .map_err(|e| PubmedError::Parse(format!("Failed to parse esearch response: {}", e)))?;

        let result = data.esearchresult;
        let total = result.as_ref().and_then(|r| r.count.clone());
        let ids = result.map(|r| r.idlist).unwrap_or_default();

        info!(returned = ids.len(), total = ?total, "esearch complete");
        Ok(ids)
    }

    /// Fetch the efetch XML for `ids` in one request.
    ///
    /// The identifiers are sent exactly as given, joined by commas. An empty
    /// slice returns an empty document without contacting the endpoint.
    pub async fn fetch_details(&self, ids: &[String]) -> Result<String> {
        if ids.is_empty() {
            return Ok(String::new());
        }

        let mut params = self.common_params();
        params.push(("id", ids.join(",")));
        params.push(("retmode", "xml".to_string()));

        debug!(count = ids.len(), "Sending efetch request");

        let response = self
            .client
            .get(&self.config.fetch_url)
            .query(&params)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(PubmedError::Http {
                status: status.as_u16(),
                message: format!("efetch: {}", status),
            });
        }

        Ok(response.text().await?)
    }

    /// Fetch and parse the records for `ids`, honouring `fetch_batch_size`.
    pub async fn fetch_records(&self, ids: &[String]) -> Result<Vec<PaperRecord>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let chunk_size = self.config.fetch_batch_size.unwrap_or(ids.len()).max(1);
        let batch_count = ids.len().div_ceil(chunk_size);
        let mut papers = Vec::with_capacity(ids.len());

        for (batch_idx, chunk) in ids.chunks(chunk_size).enumerate() {
            info!(
                batch = batch_idx + 1,
                total_batches = batch_count,
                ids = chunk.len(),
                "Fetching details"
            );
            let xml = self.fetch_details(chunk).await?;
            papers.extend(parse_pubmed_xml(&xml));
        }

        info!(requested = ids.len(), parsed = papers.len(), "Fetch complete");
        Ok(papers)
    }
}
