//! Academic vs. industry affiliation heuristic.
//!
//! An author counts as non-academic when their affiliation contains one of
//! the configured company markers (case-sensitive substring match). A paper
//! is kept when at least one author is non-academic.

use crate::error::{PubmedError, Result};
use crate::models::{FilteredPaper, PaperRecord};
use regex::Regex;
use tracing::{debug, info};

/// Company markers used when no custom list is given
pub const DEFAULT_KEYWORDS: &[&str] = &["Pharma", "Biotech", "Laboratories", "Inc.", "Ltd."];

/// E-mail addresses embedded in affiliation text
const EMAIL_PATTERN: &str = r"[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}";

/// Keyword-driven affiliation classifier
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AffiliationClassifier {
    keywords: Vec<String>,
}

impl AffiliationClassifier {
    /// Classifier over a custom keyword set; blank keywords are ignored.
    pub fn new<I, S>(keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let keywords = keywords
            .into_iter()
            .map(Into::into)
            .map(|k: String| k.trim().to_string())
            .filter(|k| !k.is_empty())
            .collect();
        Self { keywords }
    }

    pub fn keywords(&self) -> &[String] {
        &self.keywords
    }

    /// Add one more marker.
    pub fn with_keyword(mut self, keyword: impl Into<String>) -> Self {
        let keyword = keyword.into().trim().to_string();
        if !keyword.is_empty() && !self.keywords.contains(&keyword) {
            self.keywords.push(keyword);
        }
        self
    }

    pub fn is_non_academic(&self, affiliation: &str) -> bool {
        self.keywords.iter().any(|k| affiliation.contains(k.as_str()))
    }

    /// Flag every author and keep papers with at least one flagged author.
    pub fn classify(&self, papers: Vec<PaperRecord>) -> Result<Vec<FilteredPaper>> {
        let email_re = email_regex()?;
        let total = papers.len();
        let filtered: Vec<FilteredPaper> = papers
            .into_iter()
            .filter_map(|paper| self.annotate(paper, &email_re))
            .collect();

        info!(
            total = total,
            retained = filtered.len(),
            "Classified author affiliations"
        );
        Ok(filtered)
    }

    fn annotate(&self, mut paper: PaperRecord, email_re: &Regex) -> Option<FilteredPaper> {
        let mut non_academic_authors = Vec::new();
        let mut company_affiliations: Vec<String> = Vec::new();

        for author in &mut paper.authors {
            author.is_non_academic = self.is_non_academic(&author.affiliation);
            if author.is_non_academic {
                non_academic_authors.push(author.name.clone());
                if !company_affiliations.contains(&author.affiliation) {
                    company_affiliations.push(author.affiliation.clone());
                }
            }
        }

        if non_academic_authors.is_empty() {
            debug!(pmid = %paper.pmid, "No non-academic authors");
            return None;
        }

        let corresponding_email = paper
            .authors
            .iter()
            .find_map(|a| extract_email(email_re, &a.affiliation));

        Some(FilteredPaper {
            paper,
            non_academic_authors,
            company_affiliations,
            corresponding_email,
        })
    }
}

impl Default for AffiliationClassifier {
    fn default() -> Self {
        Self::new(DEFAULT_KEYWORDS.iter().copied())
    }
}

fn email_regex() -> Result<Regex> {
    Regex::new(EMAIL_PATTERN).map_err(|e| PubmedError::Parse(e.to_string()))
}

/// First e-mail address embedded in an affiliation string.
fn extract_email(email_re: &Regex, text: &str) -> Option<String> {
    email_re.find(text).map(|m| m.as_str().to_string())
}
