//! CSV export of filtered papers.

use crate::error::Result;
use crate::models::FilteredPaper;
use serde::Serialize;
use std::io::Write;
use std::path::Path;
use tempfile::NamedTempFile;
use tracing::{debug, info};

/// CSV column order for exported papers
pub const EXPORT_COLUMNS: &[&str] = &[
    "PubmedID",
    "Title",
    "Publication Date",
    "Non-academic Author(s)",
    "Company Affiliation(s)",
    "Corresponding Author Email",
];

/// Separator for multi-valued cells
pub const LIST_SEPARATOR: &str = "; ";

/// One CSV row; field order matches [`EXPORT_COLUMNS`]
#[derive(Debug, Serialize)]
struct PaperRow<'a> {
    pmid: &'a str,
    title: &'a str,
    publication_date: &'a str,
    non_academic_authors: String,
    company_affiliations: String,
    corresponding_email: &'a str,
}

impl<'a> From<&'a FilteredPaper> for PaperRow<'a> {
    fn from(item: &'a FilteredPaper) -> Self {
        Self {
            pmid: &item.paper.pmid,
            title: &item.paper.title,
            publication_date: &item.paper.publication_date,
            non_academic_authors: item.non_academic_authors.join(LIST_SEPARATOR),
            company_affiliations: item.company_affiliations.join(LIST_SEPARATOR),
            corresponding_email: item.corresponding_email.as_deref().unwrap_or(""),
        }
    }
}

/// Write papers as CSV to any writer. The header row is always written.
pub fn write_csv<W: Write>(writer: W, papers: &[FilteredPaper]) -> Result<()> {
    let mut wtr = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(writer);

    wtr.write_record(EXPORT_COLUMNS)?;
    for item in papers {
        wtr.serialize(PaperRow::from(item))?;
    }

    wtr.flush()?;
    Ok(())
}

/// Save papers to a CSV file at `path`.
///
/// Rows go to a temporary file next to `path`, which replaces `path` only
/// once everything is flushed. On failure `path` is left untouched.
pub fn save_csv(path: &Path, papers: &[FilteredPaper]) -> Result<()> {
    write_atomically(path, |tmp| write_csv(tmp, papers))?;
    info!(path = %path.display(), rows = papers.len(), "Saved CSV");
    Ok(())
}

fn write_atomically<F>(path: &Path, write: F) -> Result<()>
where
    F: FnOnce(&mut NamedTempFile) -> Result<()>,
{
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut tmp = NamedTempFile::new_in(dir)?;
    debug!(tmp = %tmp.path().display(), "Writing CSV to temporary file");
    write(&mut tmp)?;
    tmp.as_file().sync_all()?;
    tmp.persist(path).map_err(|e| e.error)?;
    Ok(())
}

/// Read back the PubmedID column of an exported file.
pub fn read_pmids(path: &Path) -> Result<Vec<String>> {
    let mut rdr = csv::ReaderBuilder::new().has_headers(true).from_path(path)?;
    let mut pmids = Vec::new();
    for record in rdr.records() {
        let record = record?;
        if let Some(pmid) = record.get(0) {
            pmids.push(pmid.to_string());
        }
    }
    Ok(pmids)
}
