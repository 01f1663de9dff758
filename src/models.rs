//! Typed records flowing through the pipeline.
//!
//! Records are built right after parsing and validated in their
//! constructors, so later stages never see a paper without an identifier
//! or title, or an author without a name.

use crate::error::{PubmedError, Result};
use serde::Serialize;

/// Default number of search hits requested
pub const DEFAULT_MAX_RESULTS: u32 = 10;

/// A search term plus an upper bound on returned identifiers
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Query {
    term: String,
    max_results: u32,
}

impl Query {
    /// Build a query, rejecting a blank term or a zero bound.
    pub fn new(term: impl Into<String>, max_results: u32) -> Result<Self> {
        let term = term.into();
        let trimmed = term.trim();
        if trimmed.is_empty() {
            return Err(PubmedError::Validation("search term is empty".to_string()));
        }
        if max_results == 0 {
            return Err(PubmedError::Validation(
                "max results must be positive".to_string(),
            ));
        }
        Ok(Self {
            term: trimmed.to_string(),
            max_results,
        })
    }

    pub fn term(&self) -> &str {
        &self.term
    }

    pub fn max_results(&self) -> u32 {
        self.max_results
    }
}

/// One author of a paper
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AuthorRecord {
    pub name: String,
    /// Affiliation text, `"; "`-joined when the author lists several
    pub affiliation: String,
    /// Set by the classifier; false for freshly parsed authors
    pub is_non_academic: bool,
}

impl AuthorRecord {
    pub fn new(name: impl Into<String>, affiliation: impl Into<String>) -> Result<Self> {
        let name = name.into().trim().to_string();
        if name.is_empty() {
            return Err(PubmedError::Validation("author name is empty".to_string()));
        }
        Ok(Self {
            name,
            affiliation: affiliation.into().trim().to_string(),
            is_non_academic: false,
        })
    }
}

/// Metadata for one PubMed article
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PaperRecord {
    pub pmid: String,
    pub title: String,
    /// `YYYY-MM-DD`, `YYYY-MM`, `YYYY`, a verbatim MedlineDate, or empty
    pub publication_date: String,
    pub authors: Vec<AuthorRecord>,
}

impl PaperRecord {
    pub fn new(
        pmid: impl Into<String>,
        title: impl Into<String>,
        authors: Vec<AuthorRecord>,
    ) -> Result<Self> {
        let pmid = pmid.into().trim().to_string();
        let title = title.into().trim().to_string();
        if pmid.is_empty() {
            return Err(PubmedError::Validation("paper has no PMID".to_string()));
        }
        if title.is_empty() {
            return Err(PubmedError::Validation(format!(
                "paper {} has no title",
                pmid
            )));
        }
        Ok(Self {
            pmid,
            title,
            publication_date: String::new(),
            authors,
        })
    }

    pub fn with_publication_date(mut self, date: impl Into<String>) -> Self {
        self.publication_date = date.into();
        self
    }
}

/// A paper retained by the classifier, with its industry-side annotations
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FilteredPaper {
    pub paper: PaperRecord,
    /// Names of non-academic authors, in author order; never empty
    pub non_academic_authors: Vec<String>,
    /// Distinct affiliations of those authors, first-seen order
    pub company_affiliations: Vec<String>,
    pub corresponding_email: Option<String>,
}
