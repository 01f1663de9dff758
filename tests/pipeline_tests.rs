//! Mock-based pipeline tests using wiremock.
//!
//! Both E-utilities endpoints are served by a local mock server so the
//! search → fetch → classify → export flow runs without network access.

use std::net::TcpListener;
use std::time::Duration;

use serde_json::json;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use rustpubmed::export::read_pmids;
use rustpubmed::pipeline::{self, Output};
use rustpubmed::{AffiliationClassifier, ClientConfig, PubMedClient, PubmedError, Query, Result};

/// Client pointed at the mock server.
fn setup_client(mock_server: &MockServer) -> Result<PubMedClient> {
    PubMedClient::new(ClientConfig::for_testing(&mock_server.uri()))
}

fn search_json(ids: &[&str]) -> serde_json::Value {
    json!({
        "header": {"type": "esearch", "version": "0.3"},
        "esearchresult": {
            "count": ids.len().to_string(),
            "retmax": ids.len().to_string(),
            "retstart": "0",
            "idlist": ids
        }
    })
}

/// Minimal efetch article with one author.
fn article_xml(pmid: &str, title: &str, author: (&str, &str), affiliation: &str) -> String {
    format!(
        r#"<PubmedArticle><MedlineCitation Status="MEDLINE"><PMID Version="1">{pmid}</PMID><Article>
<Journal><JournalIssue><PubDate><Year>2024</Year><Month>Mar</Month></PubDate></JournalIssue></Journal>
<ArticleTitle>{title}</ArticleTitle>
<AuthorList><Author><LastName>{last}</LastName><ForeName>{fore}</ForeName>
<AffiliationInfo><Affiliation>{affiliation}</Affiliation></AffiliationInfo></Author></AuthorList>
</Article></MedlineCitation></PubmedArticle>"#,
        pmid = pmid,
        title = title,
        last = author.1,
        fore = author.0,
        affiliation = affiliation,
    )
}

fn article_set(articles: &[String]) -> String {
    format!(
        "<?xml version=\"1.0\" ?>\n<PubmedArticleSet>{}</PubmedArticleSet>",
        articles.concat()
    )
}

async fn mount_search(mock_server: &MockServer, ids: &[&str]) {
    Mock::given(method("GET"))
        .and(path("/esearch.fcgi"))
        .respond_with(ResponseTemplate::new(200).set_body_json(search_json(ids)))
        .mount(mock_server)
        .await;
}

// =============================================================================
// End-to-end
// =============================================================================

#[tokio::test]
async fn test_retains_only_industry_paper() -> Result<()> {
    let mock_server = MockServer::start().await;
    mount_search(&mock_server, &["111", "222"]).await;

    let xml = article_set(&[
        article_xml("111", "Industry study", ("Jane", "Doe"), "XYZ Biotech Ltd."),
        article_xml("222", "Campus study", ("John", "Roe"), "State University"),
    ]);
    Mock::given(method("GET"))
        .and(path("/efetch.fcgi"))
        .and(query_param("id", "111,222"))
        .and(query_param("retmode", "xml"))
        .respond_with(ResponseTemplate::new(200).set_body_string(xml))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = setup_client(&mock_server)?;
    let dir = tempfile::tempdir()?;
    let out = dir.path().join("papers.csv");

    let summary = pipeline::run(
        &client,
        &AffiliationClassifier::default(),
        &Query::new("gene therapy", 10)?,
        &Output::File(out.clone()),
    )
    .await?;

    assert!(summary.exported);
    assert_eq!(summary.searched, 2);
    assert_eq!(summary.parsed, 2);
    assert_eq!(summary.papers.len(), 1);
    assert_eq!(summary.papers[0].paper.pmid, "111");
    assert_eq!(summary.papers[0].non_academic_authors, vec!["Jane Doe"]);
    assert_eq!(summary.papers[0].paper.publication_date, "2024-03");

    assert_eq!(read_pmids(&out)?, vec!["111"]);
    Ok(())
}

#[tokio::test]
async fn test_empty_search_skips_fetch_and_export() -> Result<()> {
    let mock_server = MockServer::start().await;
    mount_search(&mock_server, &[]).await;

    Mock::given(method("GET"))
        .and(path("/efetch.fcgi"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&mock_server)
        .await;

    let client = setup_client(&mock_server)?;
    let dir = tempfile::tempdir()?;
    let out = dir.path().join("papers.csv");

    let summary = pipeline::run(
        &client,
        &AffiliationClassifier::default(),
        &Query::new("no such topic", 10)?,
        &Output::File(out.clone()),
    )
    .await?;

    assert!(!summary.exported);
    assert!(summary.papers.is_empty());
    assert!(!out.exists());
    Ok(())
}

#[tokio::test]
async fn test_missing_idlist_is_empty_result() -> Result<()> {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/esearch.fcgi"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"esearchresult": {"ERROR": "Invalid query"}})),
        )
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/efetch.fcgi"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&mock_server)
        .await;

    let client = setup_client(&mock_server)?;
    let summary = pipeline::find_industry_papers(
        &client,
        &AffiliationClassifier::default(),
        &Query::new("(((", 10)?,
    )
    .await?;
    assert_eq!(summary.searched, 0);
    assert!(summary.papers.is_empty());
    Ok(())
}

// =============================================================================
// Request shape
// =============================================================================

#[tokio::test]
async fn test_search_sends_expected_parameters() -> Result<()> {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/esearch.fcgi"))
        .and(query_param("db", "pubmed"))
        .and(query_param("term", "crispr AND 2023[dp]"))
        .and(query_param("retmax", "5"))
        .and(query_param("retmode", "json"))
        .and(query_param("email", "test@example.com"))
        .respond_with(ResponseTemplate::new(200).set_body_json(search_json(&["9", "3", "7"])))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = setup_client(&mock_server)?;
    let ids = client.search(&Query::new("crispr AND 2023[dp]", 5)?).await?;
    assert_eq!(ids, vec!["9", "3", "7"]);
    Ok(())
}

#[tokio::test]
async fn test_batched_fetch_splits_ids_in_order() -> Result<()> {
    let mock_server = MockServer::start().await;
    mount_search(&mock_server, &["1", "2", "3"]).await;

    Mock::given(method("GET"))
        .and(path("/efetch.fcgi"))
        .and(query_param("id", "1,2"))
        .respond_with(ResponseTemplate::new(200).set_body_string(article_set(&[
            article_xml("1", "One", ("A", "Alpha"), "Acme Pharma"),
            article_xml("2", "Two", ("B", "Beta"), "City College"),
        ])))
        .expect(1)
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/efetch.fcgi"))
        .and(query_param("id", "3"))
        .respond_with(ResponseTemplate::new(200).set_body_string(article_set(&[article_xml(
            "3",
            "Three",
            ("C", "Gamma"),
            "Bell Laboratories",
        )])))
        .expect(1)
        .mount(&mock_server)
        .await;

    let config = ClientConfig::for_testing(&mock_server.uri()).with_fetch_batch_size(Some(2));
    let client = PubMedClient::new(config)?;

    let summary = pipeline::find_industry_papers(
        &client,
        &AffiliationClassifier::default(),
        &Query::new("batched", 3)?,
    )
    .await?;

    let pmids: Vec<&str> = summary.papers.iter().map(|p| p.paper.pmid.as_str()).collect();
    assert_eq!(summary.parsed, 3);
    assert_eq!(pmids, vec!["1", "3"]);
    Ok(())
}

// =============================================================================
// Failures
// =============================================================================

#[tokio::test]
async fn test_search_http_error_is_transport() -> Result<()> {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/esearch.fcgi"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/efetch.fcgi"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&mock_server)
        .await;

    let client = setup_client(&mock_server)?;
    let err = pipeline::find_industry_papers(
        &client,
        &AffiliationClassifier::default(),
        &Query::new("anything", 10)?,
    )
    .await
    .err();

    assert!(matches!(err, Some(PubmedError::Http { status: 500, .. })));
    assert!(err.is_some_and(|e| e.is_transport()));
    Ok(())
}

#[tokio::test]
async fn test_fetch_http_error_writes_nothing() -> Result<()> {
    let mock_server = MockServer::start().await;
    mount_search(&mock_server, &["111"]).await;

    Mock::given(method("GET"))
        .and(path("/efetch.fcgi"))
        .respond_with(ResponseTemplate::new(503))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = setup_client(&mock_server)?;
    let dir = tempfile::tempdir()?;
    let out = dir.path().join("papers.csv");

    let result = pipeline::run(
        &client,
        &AffiliationClassifier::default(),
        &Query::new("anything", 10)?,
        &Output::File(out.clone()),
    )
    .await;

    assert!(matches!(result, Err(PubmedError::Http { status: 503, .. })));
    assert!(!out.exists());
    Ok(())
}

#[tokio::test]
async fn test_non_json_search_body_is_parse_error() -> Result<()> {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/esearch.fcgi"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>maintenance</html>"))
        .mount(&mock_server)
        .await;

    let client = setup_client(&mock_server)?;
    let err = client.search(&Query::new("anything", 10)?).await.err();
    assert!(matches!(err, Some(PubmedError::Parse(_))));
    Ok(())
}

#[tokio::test]
async fn test_custom_keywords_change_selection() -> Result<()> {
    let mock_server = MockServer::start().await;
    mount_search(&mock_server, &["10", "20"]).await;

    Mock::given(method("GET"))
        .and(path("/efetch.fcgi"))
        .respond_with(ResponseTemplate::new(200).set_body_string(article_set(&[
            article_xml("10", "Ten", ("Ada", "Lim"), "Globex Corporation"),
            article_xml("20", "Twenty", ("Ben", "Ong"), "Acme Pharma"),
        ])))
        .mount(&mock_server)
        .await;

    let client = setup_client(&mock_server)?;
    let classifier = AffiliationClassifier::new(["Corporation"]);
    let summary =
        pipeline::find_industry_papers(&client, &classifier, &Query::new("anything", 10)?).await?;

    assert_eq!(summary.papers.len(), 1);
    assert_eq!(summary.papers[0].paper.pmid, "10");
    assert_eq!(summary.papers[0].non_academic_authors, vec!["Ada Lim"]);
    Ok(())
}

#[tokio::test]
async fn test_unreachable_endpoint_is_network_error() -> Result<()> {
    // Bind then drop to get a local port with nothing listening on it.
    let port = TcpListener::bind("127.0.0.1:0")?.local_addr()?.port();
    let client = PubMedClient::new(ClientConfig::for_testing(&format!("http://127.0.0.1:{}", port)))?;

    let err = client.search(&Query::new("anything", 10)?).await.err();

    assert!(matches!(err, Some(PubmedError::Network(_))));
    assert!(err.is_some_and(|e| e.is_transport()));
    Ok(())
}

#[tokio::test]
async fn test_slow_fetch_times_out_and_writes_nothing() -> Result<()> {
    let mock_server = MockServer::start().await;
    mount_search(&mock_server, &["111"]).await;

    Mock::given(method("GET"))
        .and(path("/efetch.fcgi"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(article_set(&[article_xml(
                    "111",
                    "Late",
                    ("Jane", "Doe"),
                    "Acme Pharma Inc.",
                )]))
                .set_delay(Duration::from_secs(2)),
        )
        .mount(&mock_server)
        .await;

    let config =
        ClientConfig::for_testing(&mock_server.uri()).with_timeout(Duration::from_millis(200));
    let client = PubMedClient::new(config)?;
    let dir = tempfile::tempdir()?;
    let out = dir.path().join("papers.csv");

    let result = pipeline::run(
        &client,
        &AffiliationClassifier::default(),
        &Query::new("anything", 10)?,
        &Output::File(out.clone()),
    )
    .await;

    assert!(matches!(result, Err(PubmedError::Network(_))));
    assert!(result.is_err_and(|e| e.is_transport()));
    assert!(!out.exists());
    Ok(())
}
