//! Integration tests for the crawler
//!
//! These tests use wiremock to create mock HTTP servers and test
//! the full crawl cycle end-to-end.

use attuario::config::{Config, CrawlerConfig};
use attuario::output::write_reports;
use attuario::{AttuarioError, CrawlResult, Crawler, EvaluationPipeline};
use std::collections::HashSet;
use std::time::Duration;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Creates a crawler configuration suited to a local mock server
fn create_test_config(base_url: &str, max_workers: usize) -> CrawlerConfig {
    CrawlerConfig {
        max_pages: 50,
        max_depth: 3,
        delay_seconds: 0.0,
        timeout: 5.0,
        max_workers,
        retry_base_delay: 0.01,
        max_attempts: 2,
        ..CrawlerConfig::for_base_url(base_url)
    }
}

async fn mount_page(server: &MockServer, route: &str, body: &str) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(body)
                .insert_header("content-type", "text/html"),
        )
        .mount(server)
        .await;
}

async fn mount_robots(server: &MockServer, body: &str) {
    Mock::given(method("GET"))
        .and(path("/robots.txt"))
        .respond_with(ResponseTemplate::new(200).set_body_string(body))
        .mount(server)
        .await;
}

async fn collect(crawler: &Crawler, seeds: Option<Vec<String>>) -> Vec<CrawlResult> {
    let mut scheduler = crawler.crawl(seeds);
    let mut results = Vec::new();
    while let Some(result) = scheduler.next().await {
        results.push(result);
    }
    results
}

#[tokio::test]
async fn test_crawl_without_robots_follows_links() {
    let server = MockServer::start().await;
    mount_page(
        &server,
        "/",
        r#"<html><body>
            <a href="/one">One</a>
            <a href="/two">Two</a>
            <a href="/three">Three</a>
        </body></html>"#,
    )
    .await;
    for route in ["/one", "/two", "/three"] {
        mount_page(&server, route, "<html><body>leaf</body></html>").await;
    }

    let crawler = Crawler::new(create_test_config(&server.uri(), 1))
        .await
        .unwrap();
    assert!(!crawler.robots().is_available());

    let results = collect(&crawler, None).await;
    assert_eq!(results.len(), 4);
    assert_eq!(results[0].url, format!("{}/", server.uri()));
    assert!(results.iter().all(|r| r.is_success()));
    assert!(results[1..]
        .iter()
        .all(|r| r.referer.as_deref() == Some(results[0].url.as_str())));
}

#[tokio::test]
async fn test_http_error_is_not_retried() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/broken"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&server)
        .await;

    let crawler = Crawler::new(create_test_config(&server.uri(), 1))
        .await
        .unwrap();
    let results = collect(&crawler, Some(vec![format!("{}/broken", server.uri())])).await;

    assert_eq!(results.len(), 1);
    assert_eq!(results[0].status_code, Some(500));
    assert!(results[0].html.is_empty());
    assert!(results[0].error.is_some());
}

#[tokio::test]
async fn test_link_cycle_visits_each_page_once() {
    let server = MockServer::start().await;
    mount_page(&server, "/a", r#"<a href="/b">B</a>"#).await;
    mount_page(&server, "/b", r#"<a href="/a">A</a><a href="/a/#top">A again</a>"#).await;

    let mut config = create_test_config(&server.uri(), 1);
    config.max_depth = 5;
    config.max_pages = 10;
    let crawler = Crawler::new(config).await.unwrap();
    let results = collect(&crawler, Some(vec![format!("{}/a", server.uri())])).await;

    let urls: Vec<&str> = results.iter().map(|r| r.url.as_str()).collect();
    assert_eq!(
        urls,
        vec![
            format!("{}/a", server.uri()).as_str(),
            format!("{}/b", server.uri()).as_str()
        ]
    );
}

#[tokio::test]
async fn test_max_depth_zero_fetches_only_seeds() {
    let server = MockServer::start().await;
    mount_page(&server, "/", r#"<a href="/child">Child</a>"#).await;
    Mock::given(method("GET"))
        .and(path("/child"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let mut config = create_test_config(&server.uri(), 1);
    config.max_depth = 0;
    let crawler = Crawler::new(config).await.unwrap();
    let results = collect(&crawler, None).await;

    assert_eq!(results.len(), 1);
    assert_eq!(results[0].url, format!("{}/", server.uri()));
}

#[tokio::test]
async fn test_max_depth_zero_with_several_seeds() {
    let server = MockServer::start().await;
    for route in ["/a", "/b", "/c"] {
        mount_page(&server, route, r#"<a href="/child">Child</a>"#).await;
    }
    Mock::given(method("GET"))
        .and(path("/child"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let seeds: Vec<String> = ["/a", "/b", "/c"]
        .iter()
        .map(|route| format!("{}{}", server.uri(), route))
        .collect();

    for workers in [1, 4] {
        let mut config = create_test_config(&server.uri(), workers);
        config.max_depth = 0;
        let crawler = Crawler::new(config).await.unwrap();
        let results = collect(&crawler, Some(seeds.clone())).await;

        assert_eq!(results.len(), seeds.len(), "workers={}", workers);
        let urls: HashSet<&str> = results.iter().map(|r| r.url.as_str()).collect();
        let expected: HashSet<&str> = seeds.iter().map(String::as_str).collect();
        assert_eq!(urls, expected);
    }
}

#[tokio::test]
async fn test_disallowed_urls_are_never_fetched() {
    let server = MockServer::start().await;
    mount_robots(&server, "User-agent: *\nDisallow: /private\n").await;
    mount_page(
        &server,
        "/",
        r#"<a href="/public">Public</a><a href="/private/report">Private</a>"#,
    )
    .await;
    mount_page(&server, "/public", "<p>public</p>").await;
    Mock::given(method("GET"))
        .and(path("/private/report"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    for workers in [1, 4] {
        let crawler = Crawler::new(create_test_config(&server.uri(), workers))
            .await
            .unwrap();
        assert!(crawler.robots().is_available());

        let results = collect(&crawler, None).await;
        assert_eq!(results.len(), 2, "workers={}", workers);
        assert!(results.iter().all(|r| !r.url.contains("/private")));
    }
}

#[tokio::test]
async fn test_max_pages_bounds_results() {
    let server = MockServer::start().await;
    let links: String = (0..10)
        .map(|i| format!(r#"<a href="/page{}">{}</a>"#, i, i))
        .collect();
    mount_page(&server, "/", &links).await;
    for i in 0..10 {
        mount_page(&server, &format!("/page{}", i), "<p>leaf</p>").await;
    }

    for workers in [1, 4] {
        let mut config = create_test_config(&server.uri(), workers);
        config.max_pages = 3;
        let crawler = Crawler::new(config).await.unwrap();
        let results = collect(&crawler, None).await;
        assert_eq!(results.len(), 3, "workers={}", workers);
    }
}

#[tokio::test]
async fn test_parallel_crawl_has_no_duplicates() {
    let server = MockServer::start().await;
    let links: String = (0..8)
        .map(|i| format!(r#"<a href="/page{}">{}</a><a href="/">home</a>"#, i, i))
        .collect();
    mount_page(&server, "/", &links).await;
    for i in 0..8 {
        mount_page(&server, &format!("/page{}", i), &links).await;
    }

    let crawler = Crawler::new(create_test_config(&server.uri(), 4))
        .await
        .unwrap();
    let results = collect(&crawler, None).await;

    let unique: HashSet<&str> = results.iter().map(|r| r.url.as_str()).collect();
    assert_eq!(results.len(), 9);
    assert_eq!(unique.len(), results.len());
}

#[tokio::test]
async fn test_invalid_base_url_is_rejected() {
    let result = Crawler::new(CrawlerConfig::for_base_url("not a url")).await;
    assert!(matches!(result, Err(AttuarioError::InvalidBaseUrl { .. })));
}

#[tokio::test]
async fn test_robots_crawl_delay_raises_effective_delay() {
    let server = MockServer::start().await;
    mount_robots(&server, "User-agent: *\nCrawl-delay: 1.5\n").await;

    let crawler = Crawler::new(create_test_config(&server.uri(), 1))
        .await
        .unwrap();
    assert_eq!(crawler.robots().crawl_delay(), Some(1.5));
    assert_eq!(crawler.effective_delay(), Duration::from_millis(1500));
}

#[tokio::test]
async fn test_pipeline_writes_reports() {
    let server = MockServer::start().await;
    mount_page(
        &server,
        "/",
        r#"<html><head><title>Riserve</title>
            <meta property="article:modified_time" content="2024-01-01"></head>
            <body><article>
                <p>La riserva matematica al 31/12 vale 1.250,50 euro secondo IVASS.</p>
                <table><tr><td>BEL = 100</td></tr></table>
                <a href="/missing">Missing</a>
            </article></body></html>"#,
    )
    .await;

    let mut config = Config::default();
    config.crawler = create_test_config(&server.uri(), 1);
    config.cache.enabled = false;

    let pipeline = EvaluationPipeline::new(&config).await.unwrap();
    let results = pipeline.run(None).await.unwrap();
    pipeline.close();

    // /missing answers 404 and is skipped
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].page.title, "Riserve");
    assert!(results[0].metrics.has_table);

    let dir = tempfile::tempdir().unwrap();
    let summary = write_reports(&results, dir.path()).unwrap();
    assert_eq!(summary.count, 1);
    assert_eq!(summary.average, results[0].score.composite);

    for name in ["report.csv", "report.json", "summary.json"] {
        assert!(dir.path().join(name).exists(), "{} missing", name);
    }
    let json = std::fs::read_to_string(dir.path().join("report.json")).unwrap();
    let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert_eq!(parsed.as_array().map(Vec::len), Some(1));
}
