//! Integration tests for the crawler
//!
//! These tests use wiremock to create mock HTTP servers and tempfile store
//! directories to run full crawls end-to-end.

use async_trait::async_trait;
use sitegrab::config::{Config, UserAgentConfig};
use sitegrab::crawler::{HttpRenderer, PageRenderer, RenderedPage};
use sitegrab::storage::{JsonPageStore, PageStore};
use sitegrab::{Coordinator, CrawlState, FetchResult};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Creates a test configuration writing to `store_dir` with no polite delay
fn create_test_config(store_dir: &TempDir) -> Config {
    let mut config = Config::default();
    config.crawler.worker_count = 4;
    config.crawler.per_request_delay = 0;
    config.crawler.per_page_timeout = 5_000;
    config.user_agent.crawler_name = "TestBot".to_string();
    config.output.store_dir = store_dir.path().display().to_string();
    config
}

fn html(body: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_raw(body.to_string(), "text/html")
}

async fn mount_page(server: &MockServer, route: &str, body: &str) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(html(body))
        .mount(server)
        .await;
}

async fn stored_records(dir: &TempDir) -> Vec<sitegrab::PageRecord> {
    JsonPageStore::new(dir.path())
        .read_site("127.0.0.1")
        .await
        .expect("store should be readable")
}

#[tokio::test]
async fn test_crawl_stays_on_site() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    mount_page(
        &server,
        "/",
        r#"<html><head><title>Home</title></head><body>
            <p>Welcome home</p>
            <a href="/a">Page A</a>
            <a href="https://other.test/">Elsewhere</a>
        </body></html>"#,
    )
    .await;
    mount_page(
        &server,
        "/a",
        r#"<html><head><title>A</title></head>
            <body><p>Page A text</p><a href="/">Home</a></body></html>"#,
    )
    .await;

    let coordinator = Coordinator::new(create_test_config(&dir)).unwrap();
    let summary = coordinator
        .crawl(vec![format!("{}/", server.uri())])
        .await
        .unwrap();

    assert_eq!(summary.pages_stored, 2);
    assert_eq!(summary.fetch_failures, 0);
    assert!(!summary.cancelled);

    let records = stored_records(&dir).await;
    assert_eq!(records.len(), 2);

    let home = records
        .iter()
        .find(|r| r.url == format!("{}/", server.uri()))
        .expect("home page should be stored under its seed URL");
    assert_eq!(home.title, "Home");
    assert!(home.content.contains("Welcome home"));

    let a = records
        .iter()
        .find(|r| r.url == format!("{}/a", server.uri()))
        .expect("page A should be stored");
    assert_eq!(a.title, "A");
    assert!(a.content.contains("Page A text"));

    assert_eq!(
        JsonPageStore::new(dir.path()).list_sites().await.unwrap(),
        vec!["127.0.0.1".to_string()]
    );
}

#[tokio::test]
async fn test_failed_seed_completes_without_records() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let coordinator = Coordinator::new(create_test_config(&dir)).unwrap();
    let handle = coordinator.submit(vec![server.uri()]).unwrap();
    let states = handle.state_receiver();
    let summary = handle.wait().await.unwrap();

    assert_eq!(summary.pages_stored, 0);
    assert_eq!(summary.fetch_failures, 1);
    assert_eq!(*states.borrow(), CrawlState::Done);
    assert!(stored_records(&dir).await.is_empty());
}

#[tokio::test]
async fn test_shared_link_fetched_once() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    mount_page(&server, "/", r#"<a href="/x">X</a><a href="/y">Y</a>"#).await;
    mount_page(
        &server,
        "/x",
        r#"<p>X</p><a href="/shared">Shared</a><a href="/y">Y</a>"#,
    )
    .await;
    mount_page(
        &server,
        "/y",
        r#"<p>Y</p><a href="/shared">Shared</a><a href="/x">X</a>"#,
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/shared"))
        .respond_with(html("<p>Shared content</p>"))
        .expect(1)
        .mount(&server)
        .await;

    let coordinator = Coordinator::new(create_test_config(&dir)).unwrap();
    let summary = coordinator.crawl(vec![server.uri()]).await.unwrap();

    assert_eq!(summary.pages_stored, 4);

    let shared_url = format!("{}/shared", server.uri());
    let shared = stored_records(&dir)
        .await
        .into_iter()
        .filter(|r| r.url == shared_url)
        .count();
    assert_eq!(shared, 1);
}

#[tokio::test]
async fn test_directory_page_keeps_trailing_slash() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    mount_page(&server, "/", r#"<p>Root</p><a href="/docs/">Docs</a>"#).await;
    mount_page(
        &server,
        "/docs/",
        r#"<title>Docs</title><p>Docs index</p><a href="intro">Intro</a>"#,
    )
    .await;
    mount_page(&server, "/docs/intro", "<p>Introduction</p>").await;

    let coordinator = Coordinator::new(create_test_config(&dir)).unwrap();
    let summary = coordinator.crawl(vec![server.uri()]).await.unwrap();

    assert_eq!(summary.pages_stored, 3);
    assert_eq!(summary.fetch_failures, 0);

    let records = stored_records(&dir).await;
    let docs = records
        .iter()
        .find(|r| r.url == format!("{}/docs/", server.uri()))
        .expect("directory page should be stored under its discovered URL");
    assert_eq!(docs.title, "Docs");
    assert!(records
        .iter()
        .any(|r| r.url == format!("{}/docs/intro", server.uri())));
}

#[tokio::test]
async fn test_slash_variants_fetched_once() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    mount_page(
        &server,
        "/",
        r#"<a href="/guide">Guide</a><a href="/guide/">Guide again</a>"#,
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/guide"))
        .respond_with(html("<p>Guide</p>"))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/guide/"))
        .respond_with(html("<p>Guide</p>"))
        .expect(0)
        .mount(&server)
        .await;

    let mut config = create_test_config(&dir);
    config.crawler.worker_count = 1;
    let coordinator = Coordinator::new(config).unwrap();
    let summary = coordinator.crawl(vec![server.uri()]).await.unwrap();

    assert_eq!(summary.pages_stored, 2);
    assert_eq!(summary.already_visited, 1);
}

#[tokio::test]
async fn test_dedupe_skips_identical_content() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    mount_page(
        &server,
        "/",
        r#"<p>Index</p><a href="/one">One</a><a href="/two">Two</a>"#,
    )
    .await;
    mount_page(&server, "/one", "<p>Mirrored article</p>").await;
    mount_page(&server, "/two", "<p>Mirrored article</p>").await;

    let mut config = create_test_config(&dir);
    config.output.dedupe_content = true;

    let summary = Coordinator::new(config)
        .unwrap()
        .crawl(vec![server.uri()])
        .await
        .unwrap();

    assert_eq!(summary.pages_stored, 2);
    assert_eq!(summary.duplicates_skipped, 1);
    assert_eq!(stored_records(&dir).await.len(), 2);
}

#[tokio::test]
async fn test_cancel_stops_run() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    Mock::given(method("GET"))
        .respond_with(html("<p>Slow</p>").set_delay(Duration::from_secs(3)))
        .mount(&server)
        .await;

    let coordinator = Coordinator::new(create_test_config(&dir)).unwrap();
    let handle = coordinator.submit(vec![server.uri()]).unwrap();

    tokio::time::sleep(Duration::from_millis(200)).await;
    assert_eq!(handle.state(), CrawlState::Running);

    let started = Instant::now();
    handle.cancel();
    let summary = handle.wait().await.unwrap();

    assert!(summary.cancelled);
    assert_eq!(summary.pages_stored, 0);
    assert!(started.elapsed() < Duration::from_secs(2));
    assert!(stored_records(&dir).await.is_empty());
}

#[tokio::test]
async fn test_run_deadline_cancels() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    Mock::given(method("GET"))
        .respond_with(html("<p>Slow</p>").set_delay(Duration::from_secs(4)))
        .mount(&server)
        .await;

    let mut config = create_test_config(&dir);
    config.crawler.run_deadline = 1;

    let summary = Coordinator::new(config)
        .unwrap()
        .crawl(vec![server.uri()])
        .await
        .unwrap();

    assert!(summary.cancelled);
    assert_eq!(summary.pages_stored, 0);
}

#[tokio::test]
async fn test_polite_delay_is_applied() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    mount_page(&server, "/", r#"<a href="/a">A</a>"#).await;
    mount_page(&server, "/a", r#"<a href="/b">B</a>"#).await;
    mount_page(&server, "/b", "<p>End</p>").await;

    let mut config = create_test_config(&dir);
    config.crawler.worker_count = 1;
    config.crawler.per_request_delay = 200;

    let started = Instant::now();
    let summary = Coordinator::new(config)
        .unwrap()
        .crawl(vec![server.uri()])
        .await
        .unwrap();

    assert_eq!(summary.pages_stored, 3);
    assert!(started.elapsed() >= Duration::from_millis(600));
}

/// Delegates to HTTP but panics on `/boom`
struct PanickingRenderer {
    inner: HttpRenderer,
}

#[async_trait]
impl PageRenderer for PanickingRenderer {
    async fn render(&self, url: &str) -> FetchResult<RenderedPage> {
        if url.ends_with("/boom") {
            panic!("renderer failure on {}", url);
        }
        self.inner.render(url).await
    }
}

#[tokio::test]
async fn test_worker_panic_is_isolated() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    mount_page(
        &server,
        "/",
        r#"<a href="/boom">Boom</a><a href="/fine">Fine</a>"#,
    )
    .await;
    mount_page(&server, "/fine", r#"<p>Fine</p><a href="/later">Later</a>"#).await;
    mount_page(&server, "/later", "<p>Later</p>").await;

    let config = create_test_config(&dir);
    let renderer = PanickingRenderer {
        inner: HttpRenderer::new(&UserAgentConfig::default(), Duration::from_secs(5)).unwrap(),
    };
    let store: Arc<dyn PageStore> = Arc::new(JsonPageStore::new(dir.path()));
    let coordinator = Coordinator::with_components(config, Arc::new(renderer), store);

    let summary = coordinator.crawl(vec![server.uri()]).await.unwrap();

    assert_eq!(summary.worker_panics, 1);
    assert_eq!(summary.pages_stored, 3);
}

#[tokio::test]
async fn test_concurrent_runs_share_store_safely() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    mount_page(
        &server,
        "/",
        r#"<a href="/1">1</a><a href="/2">2</a><a href="/3">3</a>"#,
    )
    .await;
    for page in ["/1", "/2", "/3"] {
        mount_page(&server, page, &format!("<p>Page {}</p>", page)).await;
    }

    let coordinator = Coordinator::new(create_test_config(&dir)).unwrap();
    let first = coordinator.submit(vec![server.uri()]).unwrap();
    let second = coordinator.submit(vec![server.uri()]).unwrap();

    let a = first.wait().await.unwrap();
    let b = second.wait().await.unwrap();

    assert_eq!(a.pages_stored, 4);
    assert_eq!(b.pages_stored, 4);
    assert_eq!(stored_records(&dir).await.len(), 8);
}
