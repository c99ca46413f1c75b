//! Integration tests for the crawler
//!
//! These tests use wiremock to create mock HTTP servers and run the full
//! crawl cycle end-to-end, from seed URL to the files in the output directory.

use site_mapper::config::Config;
use site_mapper::crawler::{crawl, CrawlReport};
use site_mapper::features::{build_feature_table, load_link_graph, write_feature_table, COLUMNS};
use site_mapper::output::{StopReason, FINAL_CSV, FINAL_JSON, INTERMEDIATE_JSON};
use site_mapper::{LinkGraph, SiteMapperError};
use std::fs;
use std::path::Path;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use tempfile::TempDir;
use url::Url;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Creates a test configuration scoped to the mock server's host
fn create_test_config(server: &MockServer, output_dir: &Path, page_limit: usize) -> Config {
    let host = Url::parse(&server.uri())
        .unwrap()
        .host_str()
        .unwrap()
        .to_string();

    let mut config = Config::default();
    config.crawler.allowed_hosts = [host].into_iter().collect();
    config.crawler.page_limit = page_limit;
    config.crawler.delay = 0.0;
    config.crawler.max_retries = 1;
    config.output.output_dir = output_dir.to_path_buf();
    config
}

fn html(body: String) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_raw(
        format!("<html><head><title>Test</title></head><body>{}</body></html>", body),
        "text/html",
    )
}

async fn mount_page(server: &MockServer, page_path: &str, body: String) {
    Mock::given(method("GET"))
        .and(path(page_path))
        .respond_with(html(body))
        .mount(server)
        .await;
}

/// A small site: the index links to two pages, an external site, a mail
/// address and a fragment of a page it already links to
async fn mount_site(server: &MockServer) {
    let base = server.uri();

    mount_page(
        server,
        "/",
        format!(
            r#"<nav><a href="{base}/page1">Page 1</a></nav>
            <main>
              <a href="/page2">  Page
                 2 </a>
              <a href="https://other.example/x">Elsewhere</a>
              <a href="mailto:someone@example.com">Mail</a>
              <a href="/page1#details">Details</a>
              <a name="anchor-only">No href</a>
            </main>"#
        ),
    )
    .await;

    mount_page(
        server,
        "/page1",
        r#"<a href="/">Home</a><a href="/page2?page=2">2</a>"#.to_string(),
    )
    .await;

    mount_page(server, "/page2", "<p>No links here</p>".to_string()).await;
}

fn page(server: &MockServer, suffix: &str) -> String {
    format!("{}{}", server.uri(), suffix)
}

async fn run_crawl(config: Config, seed: &str) -> Result<CrawlReport, SiteMapperError> {
    crawl(
        config,
        Url::parse(seed).unwrap(),
        Arc::new(AtomicBool::new(false)),
    )
    .await
}

#[tokio::test]
async fn test_full_crawl_single_site() {
    let server = MockServer::start().await;
    mount_site(&server).await;
    let output = TempDir::new().unwrap();

    let config = create_test_config(&server, output.path(), 10);
    let report = run_crawl(config, &server.uri()).await.unwrap();

    // Breadth-first crawl order
    let crawled: Vec<&str> = report.graph.iter().map(|(source, _)| source).collect();
    assert_eq!(
        crawled,
        vec![
            page(&server, "/"),
            page(&server, "/page1"),
            page(&server, "/page2"),
            page(&server, "/page2?page=2"),
        ]
    );

    // Every anchor with an href is recorded, in document order
    let index = report.graph.get(&page(&server, "/")).unwrap();
    assert_eq!(index.len(), 5);
    assert_eq!(index[1].text, "Page 2");
    assert_eq!(index[1].href, "/page2");
    assert!(index[2].is_external);
    assert!(!index[0].is_external);
    assert_eq!(index[3].absolute_url.scheme(), "mailto");

    // Default analyzers ran on every link
    for name in [
        "dom_hierarchy",
        "css_classes",
        "parent_elements",
        "analyze_archive_it_link",
    ] {
        assert!(index[0].analysis.contains_key(name), "missing {}", name);
    }

    assert_eq!(report.graph.get(&page(&server, "/page2")), Some(&[][..]));

    let stats = &report.statistics;
    assert_eq!(stats.stop_reason, StopReason::FrontierExhausted);
    assert_eq!(stats.pages_visited, 4);
    assert_eq!(stats.pages_crawled, 4);
    assert_eq!(stats.pages_failed, 0);
    assert_eq!(stats.total_outlinks, 7);
    assert_eq!(stats.external_outlinks, 2);
}

#[tokio::test]
async fn test_output_files_written() {
    let server = MockServer::start().await;
    mount_site(&server).await;
    let output = TempDir::new().unwrap();

    let config = create_test_config(&server, output.path(), 10);
    let report = run_crawl(config, &server.uri()).await.unwrap();

    assert!(output.path().join(INTERMEDIATE_JSON).exists());

    let saved: LinkGraph =
        serde_json::from_str(&fs::read_to_string(output.path().join(FINAL_JSON)).unwrap())
            .unwrap();
    assert_eq!(saved, report.graph);

    let mut reader = csv::Reader::from_path(output.path().join(FINAL_CSV)).unwrap();
    assert_eq!(
        reader.headers().unwrap(),
        vec!["source_url", "target_url", "link_text", "is_external"]
    );
    let records: Vec<csv::StringRecord> = reader.records().map(|r| r.unwrap()).collect();
    assert_eq!(records.len(), report.graph.total_outlinks());
    assert_eq!(&records[0][0], page(&server, "/"));
    assert_eq!(&records[0][1], page(&server, "/page1"));
    assert_eq!(&records[2][3], "true");

    // No temporary files left behind
    let leftovers: Vec<_> = fs::read_dir(output.path())
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .filter(|name| name.ends_with(".tmp"))
        .collect();
    assert!(leftovers.is_empty(), "{:?}", leftovers);
}

#[tokio::test]
async fn test_crawl_with_page_limit() {
    let server = MockServer::start().await;
    mount_site(&server).await;
    let output = TempDir::new().unwrap();

    let config = create_test_config(&server, output.path(), 2);
    let report = run_crawl(config, &server.uri()).await.unwrap();

    assert_eq!(report.graph.len(), 2);
    assert_eq!(report.statistics.stop_reason, StopReason::PageLimitReached);
    assert_eq!(report.statistics.pages_visited, 2);
    assert!(report.statistics.pages_pending > 0);
}

#[tokio::test]
async fn test_zero_page_limit_writes_empty_graph() {
    let server = MockServer::start().await;
    mount_site(&server).await;
    let output = TempDir::new().unwrap();

    let config = create_test_config(&server, output.path(), 0);
    let report = run_crawl(config, &server.uri()).await.unwrap();

    assert!(report.graph.is_empty());
    assert_eq!(
        fs::read_to_string(output.path().join(FINAL_JSON)).unwrap().trim(),
        "{}"
    );
    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_out_of_scope_links_not_followed() {
    let server = MockServer::start().await;
    mount_site(&server).await;
    let output = TempDir::new().unwrap();

    let mut config = create_test_config(&server, output.path(), 10);
    config.crawler.allowed_hosts = ["archive-it.org".to_string()].into_iter().collect();
    let report = run_crawl(config, &server.uri()).await.unwrap();

    // The seed is crawled regardless; none of its links are in scope
    assert_eq!(report.graph.len(), 1);
    assert_eq!(report.statistics.stop_reason, StopReason::FrontierExhausted);
}

#[tokio::test]
async fn test_failed_pages_have_no_entry() {
    let server = MockServer::start().await;
    let base = server.uri();
    mount_page(
        &server,
        "/",
        format!(
            r#"<a href="{base}/missing">Missing</a>
            <a href="/report.pdf">PDF</a>
            <a href="/moved">Moved</a>
            <a href="/ok">OK</a>"#
        ),
    )
    .await;
    mount_page(&server, "/ok", String::new()).await;

    Mock::given(method("GET"))
        .and(path("/report.pdf"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(vec![0u8; 16], "application/pdf"))
        .mount(&server)
        .await;

    // Redirect into the blocked archive mirror
    Mock::given(method("GET"))
        .and(path("/moved"))
        .respond_with(
            ResponseTemplate::new(302)
                .insert_header("location", "https://wayback.archive-it.org/1/2/index.html"),
        )
        .mount(&server)
        .await;

    let output = TempDir::new().unwrap();
    let config = create_test_config(&server, output.path(), 10);
    let report = run_crawl(config, &server.uri()).await.unwrap();

    assert_eq!(report.statistics.pages_visited, 5);
    assert_eq!(report.statistics.pages_crawled, 2);
    assert_eq!(report.statistics.pages_failed, 3);
    assert!(report.graph.contains(&page(&server, "/ok")));
    assert!(!report.graph.contains(&page(&server, "/missing")));
    assert!(!report.graph.contains(&page(&server, "/report.pdf")));
    assert!(!report.graph.contains(&page(&server, "/moved")));
}

#[tokio::test]
async fn test_invalid_seed_rejected() {
    let output = TempDir::new().unwrap();
    let mut config = Config::default();
    config.output.output_dir = output.path().to_path_buf();

    let result = run_crawl(config, "ftp://archive-it.org/pub").await;
    assert!(matches!(result, Err(SiteMapperError::InvalidSeed(_))));
}

#[tokio::test]
async fn test_interrupted_crawl_still_saves() {
    let server = MockServer::start().await;
    mount_site(&server).await;
    let output = TempDir::new().unwrap();

    let config = create_test_config(&server, output.path(), 10);
    let report = crawl(
        config,
        Url::parse(&server.uri()).unwrap(),
        Arc::new(AtomicBool::new(true)),
    )
    .await
    .unwrap();

    assert_eq!(report.statistics.stop_reason, StopReason::Interrupted);
    assert!(report.graph.is_empty());
    assert!(output.path().join(FINAL_JSON).exists());
    assert!(output.path().join(FINAL_CSV).exists());
}

#[tokio::test]
async fn test_feature_table_from_crawl_output() {
    let server = MockServer::start().await;
    mount_site(&server).await;
    let output = TempDir::new().unwrap();

    let config = create_test_config(&server, output.path(), 10);
    let report = run_crawl(config, &server.uri()).await.unwrap();

    let graph = load_link_graph(&output.path().join(FINAL_JSON)).unwrap();
    let rows = build_feature_table(&graph);
    assert_eq!(rows.len(), report.statistics.total_outlinks);

    // Page 1 sits in <nav>, so it counts as essential navigation
    assert_eq!(rows[0].url, page(&server, "/page1"));
    assert!(rows[0].in_navigation);
    assert!(rows[0].label_simple);

    // "Page 2" sits in <main>
    assert!(rows[1].in_main_content);
    assert!(!rows[1].in_navigation);

    let pagination = rows
        .iter()
        .find(|row| row.url == page(&server, "/page2?page=2"))
        .unwrap();
    assert!(pagination.has_pagination);
    assert_eq!(pagination.source_page, page(&server, "/page1"));

    for row in &rows {
        if row.label_simple {
            assert!(row.label_contextual, "{}", row.url);
        }
    }

    let csv_path = output.path().join("features.csv");
    write_feature_table(&csv_path, &rows).unwrap();
    let mut reader = csv::Reader::from_path(&csv_path).unwrap();
    assert_eq!(reader.headers().unwrap().len(), COLUMNS.len());
    assert_eq!(reader.records().count(), rows.len());
}
