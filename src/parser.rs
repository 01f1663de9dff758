//! PubMed efetch XML parsing.
//!
//! Streams a `<PubmedArticleSet>` document with `quick-xml` and builds typed
//! [`PaperRecord`]s. Extraction is best-effort: a text node that fails to
//! decode is dropped, an author without a name is dropped, an article
//! without a PMID or title is dropped, and a fatal reader error ends the
//! parse while keeping every article completed before it.

use crate::error::{OptionExt, Result};
use crate::models::{AuthorRecord, PaperRecord};
use chrono::NaiveDate;
use quick_xml::events::Event;
use quick_xml::Reader;
use tracing::{debug, info, warn};

/// Month abbreviations used by PubMed `<Month>` elements
const MONTHS: [&str; 12] = [
    "jan", "feb", "mar", "apr", "may", "jun", "jul", "aug", "sep", "oct", "nov", "dec",
];

#[derive(Debug, Default)]
struct ArticleDraft {
    pmid: Option<String>,
    title: String,
    date: DateDraft,
    authors: Vec<AuthorRecord>,
}

#[derive(Debug, Default)]
struct AuthorDraft {
    last_name: String,
    fore_name: String,
    initials: String,
    collective_name: String,
    affiliations: Vec<String>,
    affiliation: String,
}

#[derive(Debug, Default)]
struct DateDraft {
    year: String,
    month: String,
    day: String,
    medline: String,
}

impl AuthorDraft {
    fn display_name(&self) -> String {
        let last = normalize(&self.last_name);
        if last.is_empty() {
            return normalize(&self.collective_name);
        }
        let given = match normalize(&self.fore_name) {
            fore if !fore.is_empty() => fore,
            _ => normalize(&self.initials),
        };
        format!("{} {}", given, last).trim().to_string()
    }

    fn finish(self) -> Result<AuthorRecord> {
        let name = self.display_name();
        AuthorRecord::new(name, self.affiliations.join("; "))
    }
}

impl ArticleDraft {
    fn finish(self) -> Result<PaperRecord> {
        let pmid = self.pmid.ok_or_parse("article without PMID")?;
        let date = self.date.format();
        Ok(PaperRecord::new(pmid, normalize(&self.title), self.authors)?.with_publication_date(date))
    }
}

impl DateDraft {
    /// `YYYY-MM-DD`, `YYYY-MM` or `YYYY`; falls back to the raw MedlineDate.
    fn format(&self) -> String {
        let Ok(year) = self.year.trim().parse::<i32>() else {
            return normalize(&self.medline);
        };
        let Some(month) = parse_month(&self.month) else {
            return format!("{:04}", year);
        };
        match self.day.trim().parse::<u32>() {
            Ok(day) => NaiveDate::from_ymd_opt(year, month, day)
                .map(|d| d.format("%Y-%m-%d").to_string())
                .unwrap_or_else(|| format!("{:04}-{:02}", year, month)),
            Err(_) => format!("{:04}-{:02}", year, month),
        }
    }
}

/// Numeric month or English three-letter abbreviation.
fn parse_month(raw: &str) -> Option<u32> {
    let raw = raw.trim();
    if let Ok(n) = raw.parse::<u32>() {
        return (1..=12).contains(&n).then_some(n);
    }
    let prefix = raw.get(..3)?.to_ascii_lowercase();
    MONTHS
        .iter()
        .position(|m| *m == prefix)
        .map(|idx| idx as u32 + 1)
}

/// Collapse runs of whitespace into single spaces.
fn normalize(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn parent_is(stack: &[String], name: &str) -> bool {
    stack.len() >= 2 && stack[stack.len() - 2] == name
}

fn inside(stack: &[String], name: &str) -> bool {
    stack.iter().any(|el| el == name)
}

/// Route one decoded text node to the field it belongs to.
fn route_text(
    stack: &[String],
    text: &str,
    article: &mut ArticleDraft,
    author: Option<&mut AuthorDraft>,
) {
    let Some(current) = stack.last() else {
        return;
    };

    if current == "PMID" && parent_is(stack, "MedlineCitation") {
        article.pmid.get_or_insert_with(String::new).push_str(text.trim());
        return;
    }

    if inside(stack, "ArticleTitle") {
        article.title.push_str(text);
        return;
    }

    if let Some(author) = author {
        match current.as_str() {
            "LastName" => author.last_name.push_str(text),
            "ForeName" => author.fore_name.push_str(text),
            "Initials" => author.initials.push_str(text),
            "CollectiveName" => author.collective_name.push_str(text),
            _ if inside(stack, "Affiliation") => author.affiliation.push_str(text),
            _ => {}
        }
        return;
    }

    if inside(stack, "PubDate") && inside(stack, "JournalIssue") {
        let date = &mut article.date;
        match current.as_str() {
            "Year" => date.year.push_str(text),
            "Month" => date.month.push_str(text),
            "Day" => date.day.push_str(text),
            "MedlineDate" => date.medline.push_str(text),
            _ => {}
        }
    }
}

/// Parse an efetch XML document into paper records.
///
/// Never fails as a whole: problems are logged and the affected field or
/// article is skipped.
pub fn parse_pubmed_xml(xml: &str) -> Vec<PaperRecord> {
    let mut papers = Vec::new();
    let mut reader = Reader::from_str(xml);
    let mut buf = Vec::new();

    let mut stack: Vec<String> = Vec::new();
    let mut article: Option<ArticleDraft> = None;
    let mut author: Option<AuthorDraft> = None;
    let mut skipped = 0usize;

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(ref e)) => {
                let name = String::from_utf8_lossy(e.local_name().as_ref()).into_owned();
                match name.as_str() {
                    "PubmedArticle" => article = Some(ArticleDraft::default()),
                    "Author" if article.is_some() && stack.last().is_some_and(|p| p == "AuthorList") => {
                        author = Some(AuthorDraft::default());
                    }
                    _ => {}
                }
                stack.push(name);
            }
            Ok(Event::Text(ref e)) => {
                if let Some(ref mut draft) = article {
                    match e.unescape() {
                        Ok(text) => route_text(&stack, &text, draft, author.as_mut()),
                        Err(err) => debug!(
                            element = stack.last().map(String::as_str).unwrap_or(""),
                            error = %err,
                            "Skipping undecodable text"
                        ),
                    }
                }
            }
            Ok(Event::CData(ref e)) => {
                if let Some(ref mut draft) = article {
                    let text = String::from_utf8_lossy(e);
                    route_text(&stack, &text, draft, author.as_mut());
                }
            }
            Ok(Event::End(ref e)) => {
                match e.local_name().as_ref() {
                    b"Affiliation" => {
                        if let Some(ref mut a) = author {
                            let affiliation = normalize(&std::mem::take(&mut a.affiliation));
                            if !affiliation.is_empty() {
                                a.affiliations.push(affiliation);
                            }
                        }
                    }
                    b"Author" => {
                        if let (Some(a), Some(draft)) = (author.take(), article.as_mut()) {
                            match a.finish() {
                                Ok(record) => draft.authors.push(record),
                                Err(err) => debug!(error = %err, "Skipping author"),
                            }
                        }
                    }
                    b"PubmedArticle" => {
                        if let Some(draft) = article.take() {
                            match draft.finish() {
                                Ok(paper) => papers.push(paper),
                                Err(err) => {
                                    skipped += 1;
                                    warn!(error = %err, "Skipping article");
                                }
                            }
                        }
                        author = None;
                    }
                    _ => {}
                }
                stack.pop();
            }
            Ok(Event::Eof) => break,
            Err(e) => {
                warn!(
                    error = %e,
                    parsed = papers.len(),
                    "XML parse error, keeping articles parsed so far"
                );
                break;
            }
            _ => {}
        }
        buf.clear();
    }

    info!(papers = papers.len(), skipped = skipped, "Parsed efetch document");
    papers
}
