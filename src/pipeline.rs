//! Search → fetch → classify → export, run once per invocation.

use crate::classifier::AffiliationClassifier;
use crate::error::Result;
use crate::export;
use crate::models::{FilteredPaper, Query};
use crate::pubmed::PubMedClient;
use std::io::Write;
use std::path::PathBuf;
use tracing::info;

/// Where exported rows go
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Output {
    File(PathBuf),
    Stdout,
}

/// What a run produced
#[derive(Debug, Default)]
pub struct RunSummary {
    /// PMIDs returned by esearch
    pub searched: usize,
    /// Records parsed from efetch
    pub parsed: usize,
    /// Papers with at least one non-academic author
    pub papers: Vec<FilteredPaper>,
    /// False when the search came back empty and nothing was exported
    pub exported: bool,
}

/// Retrieve and classify, without exporting.
///
/// An empty search returns an empty summary without calling efetch.
pub async fn find_industry_papers(
    client: &PubMedClient,
    classifier: &AffiliationClassifier,
    query: &Query,
) -> Result<RunSummary> {
    let ids = client.search(query).await?;
    if ids.is_empty() {
        info!(term = query.term(), "No PubMed results, skipping fetch");
        return Ok(RunSummary::default());
    }

    let records = client.fetch_records(&ids).await?;
    let parsed = records.len();
    let papers = classifier.classify(records)?;

    Ok(RunSummary {
        searched: ids.len(),
        parsed,
        papers,
        exported: false,
    })
}

/// Full run: nothing is written unless every step before export succeeded.
pub async fn run(
    client: &PubMedClient,
    classifier: &AffiliationClassifier,
    query: &Query,
    output: &Output,
) -> Result<RunSummary> {
    let mut summary = find_industry_papers(client, classifier, query).await?;
    if summary.searched == 0 {
        return Ok(summary);
    }

    match output {
        Output::File(path) => export::save_csv(path, &summary.papers)?,
        Output::Stdout => {
            let stdout = std::io::stdout();
            let mut handle = stdout.lock();
            export::write_csv(&mut handle, &summary.papers)?;
            handle.flush()?;
        }
    }
    summary.exported = true;

    info!(
        searched = summary.searched,
        parsed = summary.parsed,
        retained = summary.papers.len(),
        "Pipeline complete"
    );
    Ok(summary)
}
