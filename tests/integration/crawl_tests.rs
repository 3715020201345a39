//! Integration tests for the crawler
//!
//! These tests use wiremock to create mock HTTP servers and drive the
//! HTTP fetcher through the coordinator end-to-end.

use std::sync::Arc;
use tempfile::TempDir;
use tiered_crawler::config::Config;
use tiered_crawler::crawler::{
    crawl_all, Coordinator, CrawlRequest, CrawlStatus, CustomerTier, HttpFetcher,
};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Creates a test configuration whose cache lives in `cache_dir`
fn create_test_config(cache_dir: &TempDir) -> Config {
    let mut config = Config::default();
    config.cache.directory = cache_dir.path().display().to_string();
    config.crawler.request_timeout_secs = 5;
    config.user_agent.crawler_name = "TestBot".to_string();
    config
}

fn html(body: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_raw(
        format!("<html><head><title>Test</title></head><body>{}</body></html>", body),
        "text/html",
    )
}

#[tokio::test]
async fn test_duplicate_links_are_reported_once() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();
    let cache_dir = TempDir::new().unwrap();

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html(r#"<a href="/b">B</a> <a href="/b">B again</a>"#))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/b"))
        .respond_with(html("<p>Leaf</p>"))
        .expect(1)
        .mount(&mock_server)
        .await;

    let seed = format!("{}/", base_url);
    let report = crawl_all(
        create_test_config(&cache_dir),
        vec![CrawlRequest::new(seed.as_str(), CustomerTier::Standard)],
    )
    .await
    .expect("Crawl should succeed");

    let outcome = &report.outcomes[0];
    assert_eq!(outcome.status, CrawlStatus::Completed);
    assert_eq!(outcome.links, vec![format!("{}/b", base_url)]);
}

#[tokio::test]
async fn test_second_request_within_ttl_is_not_fetched() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();
    let cache_dir = TempDir::new().unwrap();

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html(r#"<a href="/about">About</a>"#))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/about"))
        .respond_with(html("<p>About us</p>"))
        .expect(1)
        .mount(&mock_server)
        .await;

    let config = create_test_config(&cache_dir);
    let fetcher = Arc::new(HttpFetcher::from_config(&config).unwrap());
    let coordinator = Coordinator::spawn(config, fetcher).unwrap();

    let seed = format!("{}/", base_url);
    let first = coordinator
        .submit(seed.as_str(), CustomerTier::Standard)
        .await
        .unwrap();
    let second = coordinator
        .submit(seed.as_str(), CustomerTier::Priority)
        .await
        .unwrap();

    assert_eq!(first.status, CrawlStatus::Completed);
    assert_eq!(second.status, CrawlStatus::Cached);
    assert_eq!(second.links, first.links);

    // The record survives the coordinator
    let restarted = Coordinator::spawn(
        create_test_config(&cache_dir),
        Arc::new(HttpFetcher::from_config(&create_test_config(&cache_dir)).unwrap()),
    )
    .unwrap();
    let third = restarted
        .submit(seed.as_str(), CustomerTier::Standard)
        .await
        .unwrap();
    assert_eq!(third.status, CrawlStatus::Cached);

    let stats = coordinator.shutdown().await.unwrap();
    assert_eq!(stats.requests, 2);
    assert_eq!(stats.cache_hits, 1);
}

#[tokio::test]
async fn test_unreachable_seed_exhausts_standard_retries() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();
    let cache_dir = TempDir::new().unwrap();

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(500))
        .expect(3)
        .mount(&mock_server)
        .await;

    let seed = format!("{}/", base_url);
    let report = crawl_all(
        create_test_config(&cache_dir),
        vec![CrawlRequest::new(seed.as_str(), CustomerTier::Standard)],
    )
    .await
    .unwrap();

    let outcome = &report.outcomes[0];
    assert_eq!(outcome.status, CrawlStatus::SeedUnreachable);
    assert!(outcome.links.is_empty());
    assert_eq!(report.stats.seed_failures, 1);
}

#[tokio::test]
async fn test_priority_seed_gets_larger_retry_budget() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();
    let cache_dir = TempDir::new().unwrap();

    Mock::given(method("GET"))
        .and(path("/flaky"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(4)
        .expect(4)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/flaky"))
        .respond_with(html("<p>Finally</p>"))
        .expect(1)
        .mount(&mock_server)
        .await;

    let seed = format!("{}/flaky", base_url);
    let report = crawl_all(
        create_test_config(&cache_dir),
        vec![CrawlRequest::new(seed.as_str(), CustomerTier::Priority)],
    )
    .await
    .unwrap();

    assert_eq!(report.outcomes[0].status, CrawlStatus::Completed);
}

#[tokio::test]
async fn test_breadth_first_within_node_budget() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();
    let cache_dir = TempDir::new().unwrap();

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html(
            r#"<a href="page1">Page 1</a> <a href="/page2">Page 2</a>"#,
        ))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/page1"))
        .respond_with(html(r#"<a href="/deep">Deep</a>"#))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/page2"))
        .respond_with(html("<p>Two</p>"))
        .expect(1)
        .mount(&mock_server)
        .await;

    // Past the node budget
    Mock::given(method("GET"))
        .and(path("/deep"))
        .respond_with(html("<p>Deep</p>"))
        .expect(0)
        .mount(&mock_server)
        .await;

    let mut config = create_test_config(&cache_dir);
    config.crawler.max_nodes = 3;

    let seed = format!("{}/", base_url);
    let report = crawl_all(
        config,
        vec![CrawlRequest::new(seed.as_str(), CustomerTier::Standard)],
    )
    .await
    .unwrap();

    assert_eq!(
        report.outcomes[0].links,
        vec![
            format!("{}/page1", base_url),
            format!("{}/page2", base_url),
            format!("{}/deep", base_url),
        ]
    );
}

#[tokio::test]
async fn test_non_html_pages_are_not_parsed() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();
    let cache_dir = TempDir::new().unwrap();

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html(
            r#"<a href="/report.pdf">Report</a> <a href="mailto:team@example.com">Mail</a>"#,
        ))
        .mount(&mock_server)
        .await;

    // Looks like HTML but is served as a PDF
    Mock::given(method("GET"))
        .and(path("/report.pdf"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(
            r#"<html><body><a href="/hidden">Hidden</a></body></html>"#,
            "application/pdf",
        ))
        .expect(1)
        .mount(&mock_server)
        .await;

    let seed = format!("{}/", base_url);
    let report = crawl_all(
        create_test_config(&cache_dir),
        vec![CrawlRequest::new(seed.as_str(), CustomerTier::Standard)],
    )
    .await
    .unwrap();

    let outcome = &report.outcomes[0];
    assert_eq!(outcome.status, CrawlStatus::Completed);
    assert_eq!(outcome.links, vec![format!("{}/report.pdf", base_url)]);
}

#[tokio::test]
async fn test_links_resolve_against_redirect_target() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();
    let cache_dir = TempDir::new().unwrap();

    Mock::given(method("GET"))
        .and(path("/old"))
        .respond_with(
            ResponseTemplate::new(301).insert_header("location", format!("{}/new/", base_url).as_str()),
        )
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/new/"))
        .respond_with(html(r#"<a href="child">Child</a>"#))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/new/child"))
        .respond_with(html("<p>Child</p>"))
        .expect(1)
        .mount(&mock_server)
        .await;

    let seed = format!("{}/old", base_url);
    let report = crawl_all(
        create_test_config(&cache_dir),
        vec![CrawlRequest::new(seed.as_str(), CustomerTier::Standard)],
    )
    .await
    .unwrap();

    assert_eq!(
        report.outcomes[0].links,
        vec![format!("{}/new/child", base_url)]
    );
}

#[tokio::test]
async fn test_invalid_seed_makes_no_requests() {
    let cache_dir = TempDir::new().unwrap();

    let report = crawl_all(
        create_test_config(&cache_dir),
        vec![CrawlRequest::new("ftp://files.example.com/", CustomerTier::Priority)],
    )
    .await
    .unwrap();

    assert_eq!(report.outcomes[0].status, CrawlStatus::InvalidSeed);
    assert!(report.outcomes[0].links.is_empty());
}
