//! Page fetching and rendering
//!
//! This module loads pages for the crawler:
//! - `PageRenderer`, the seam the scheduler fetches through
//! - `HttpRenderer`, a plain `reqwest` GET with status and content-type checks
//! - `BrowserRenderer` (feature `browser`), headless Chromium that executes
//!   client-side script and blocks images, stylesheets, fonts and scripts
//!
//! Every failure becomes a `FetchError` carrying the URL; the scheduler skips
//! the URL and keeps crawling.

use crate::config::{Config, RendererKind, UserAgentConfig};
use crate::{FetchError, FetchErrorKind, FetchResult, SiteGrabError};
use async_trait::async_trait;
use reqwest::Client;
use std::sync::Arc;
use std::time::Duration;

/// A page as loaded by a renderer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedPage {
    /// The URL that was requested
    pub url: String,
    /// The URL after redirects; links resolve against this
    pub final_url: String,
    /// Full HTML of the document
    pub html: String,
    /// Title reported by the renderer, if any
    pub title: Option<String>,
}

/// Loads a page and returns its HTML
///
/// Implementations must finish or fail within their configured per-page
/// timeout.
#[async_trait]
pub trait PageRenderer: Send + Sync {
    async fn render(&self, url: &str) -> FetchResult<RenderedPage>;
}

/// Builds the renderer selected by the configuration
pub fn build_renderer(config: &Config) -> Result<Arc<dyn PageRenderer>, SiteGrabError> {
    let timeout = config.crawler.page_timeout();
    match config.crawler.renderer {
        RendererKind::Http => Ok(Arc::new(HttpRenderer::new(&config.user_agent, timeout)?)),
        #[cfg(feature = "browser")]
        RendererKind::Browser => Ok(Arc::new(BrowserRenderer::new(&config.user_agent, timeout))),
        #[cfg(not(feature = "browser"))]
        RendererKind::Browser => Err(crate::ConfigError::Validation(
            "renderer = \"browser\" requires building with the `browser` feature".to_string(),
        )
        .into()),
    }
}

/// Builds an HTTP client with the crawler's user agent
///
/// # Example
///
/// ```
/// use sitegrab::config::UserAgentConfig;
/// use sitegrab::crawler::build_http_client;
/// use std::time::Duration;
///
/// let client = build_http_client(&UserAgentConfig::default(), Duration::from_secs(30)).unwrap();
/// ```
pub fn build_http_client(
    config: &UserAgentConfig,
    timeout: Duration,
) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(config.header_value())
        .timeout(timeout)
        .connect_timeout(timeout.min(Duration::from_secs(10)))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Renders pages with a single HTTP GET
///
/// Script is not executed and subresources are never requested.
#[derive(Debug, Clone)]
pub struct HttpRenderer {
    client: Client,
    timeout: Duration,
}

impl HttpRenderer {
    pub fn new(user_agent: &UserAgentConfig, timeout: Duration) -> Result<Self, SiteGrabError> {
        let client = build_http_client(user_agent, timeout).map_err(|e| {
            SiteGrabError::Fetch(FetchError::new(
                "",
                FetchErrorKind::Network(format!("failed to build HTTP client: {}", e)),
            ))
        })?;
        Ok(Self { client, timeout })
    }

    /// Wraps an existing client
    pub fn with_client(client: Client, timeout: Duration) -> Self {
        Self { client, timeout }
    }

    async fn fetch(&self, url: &str) -> FetchResult<RenderedPage> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| FetchError::new(url, classify_reqwest_error(&e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::new(url, FetchErrorKind::Status(status.as_u16())));
        }

        if let Some(content_type) = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
        {
            if !is_textual(content_type) {
                return Err(FetchError::new(
                    url,
                    FetchErrorKind::ContentMismatch(content_type.to_string()),
                ));
            }
        }

        let final_url = response.url().to_string();
        let html = response
            .text()
            .await
            .map_err(|e| FetchError::new(url, classify_reqwest_error(&e)))?;

        Ok(RenderedPage {
            url: url.to_string(),
            final_url,
            html,
            title: None,
        })
    }
}

#[async_trait]
impl PageRenderer for HttpRenderer {
    async fn render(&self, url: &str) -> FetchResult<RenderedPage> {
        match tokio::time::timeout(self.timeout, self.fetch(url)).await {
            Ok(result) => result,
            Err(_) => Err(FetchError::new(url, FetchErrorKind::RenderTimeout)),
        }
    }
}

fn classify_reqwest_error(e: &reqwest::Error) -> FetchErrorKind {
    if e.is_timeout() {
        FetchErrorKind::RenderTimeout
    } else if e.is_redirect() {
        FetchErrorKind::Navigation(e.to_string())
    } else {
        FetchErrorKind::Network(e.to_string())
    }
}

/// True for HTML and other text documents
fn is_textual(content_type: &str) -> bool {
    let mime = content_type
        .split(';')
        .next()
        .unwrap_or("")
        .trim()
        .to_ascii_lowercase();
    mime.is_empty() || mime.starts_with("text/") || mime.contains("html")
}

#[cfg(feature = "browser")]
pub use browser::BrowserRenderer;

#[cfg(feature = "browser")]
mod browser {
    use super::{PageRenderer, RenderedPage};
    use crate::config::UserAgentConfig;
    use crate::{FetchError, FetchErrorKind, FetchResult};
    use async_trait::async_trait;
    use chromiumoxide::cdp::browser_protocol::network::{EnableParams, SetBlockedUrLsParams};
    use chromiumoxide::{Browser, BrowserConfig, Page};
    use futures::StreamExt;
    use std::time::Duration;
    use tokio::sync::OnceCell;

    const BLOCKED_RESOURCES: &[&str] = &[
        "*.jpg", "*.jpeg", "*.png", "*.gif", "*.svg", "*.css", "*.js", "*.woff", "*.woff2",
    ];

    /// Renders pages in headless Chromium
    ///
    /// The browser is launched on the first render and shared by all workers;
    /// each render opens its own tab.
    pub struct BrowserRenderer {
        user_agent: String,
        timeout: Duration,
        browser: OnceCell<Browser>,
    }

    impl BrowserRenderer {
        pub fn new(user_agent: &UserAgentConfig, timeout: Duration) -> Self {
            Self {
                user_agent: user_agent.header_value(),
                timeout,
                browser: OnceCell::new(),
            }
        }

        async fn browser(&self, url: &str) -> FetchResult<&Browser> {
            self.browser
                .get_or_try_init(|| async {
                    tracing::info!("Launching headless browser");
                    let config = BrowserConfig::builder()
                        .arg("--no-sandbox")
                        .arg("--disable-gpu")
                        .arg("--disable-dev-shm-usage")
                        .arg(format!("--user-agent={}", self.user_agent))
                        .request_timeout(self.timeout)
                        .build()
                        .map_err(|e| {
                            FetchError::new(url, FetchErrorKind::BrowserUnavailable(e))
                        })?;

                    let (browser, mut handler) = Browser::launch(config).await.map_err(|e| {
                        FetchError::new(url, FetchErrorKind::BrowserUnavailable(e.to_string()))
                    })?;

                    tokio::spawn(async move {
                        while let Some(event) = handler.next().await {
                            if event.is_err() {
                                break;
                            }
                        }
                    });

                    Ok(browser)
                })
                .await
        }

        async fn load(&self, page: &Page, url: &str) -> FetchResult<RenderedPage> {
            let navigation = |e: chromiumoxide::error::CdpError| {
                FetchError::new(url, FetchErrorKind::Navigation(e.to_string()))
            };

            page.execute(EnableParams::default()).await.map_err(navigation)?;
            page.execute(SetBlockedUrLsParams::new(
                BLOCKED_RESOURCES.iter().map(|p| p.to_string()).collect::<Vec<_>>(),
            ))
            .await
            .map_err(navigation)?;

            page.goto(url).await.map_err(navigation)?;
            page.find_element("body").await.map_err(navigation)?;

            let title = page.get_title().await.map_err(navigation)?;
            let html = page.content().await.map_err(navigation)?;
            let final_url = page
                .url()
                .await
                .map_err(navigation)?
                .unwrap_or_else(|| url.to_string());

            Ok(RenderedPage {
                url: url.to_string(),
                final_url,
                html,
                title: title.filter(|t| !t.trim().is_empty()),
            })
        }
    }

    #[async_trait]
    impl PageRenderer for BrowserRenderer {
        async fn render(&self, url: &str) -> FetchResult<RenderedPage> {
            let browser = self.browser(url).await?;
            let page = browser.new_page("about:blank").await.map_err(|e| {
                FetchError::new(url, FetchErrorKind::BrowserUnavailable(e.to_string()))
            })?;

            let result = match tokio::time::timeout(self.timeout, self.load(&page, url)).await {
                Ok(result) => result,
                Err(_) => Err(FetchError::new(url, FetchErrorKind::RenderTimeout)),
            };

            if let Err(e) = page.close().await {
                tracing::debug!("Failed to close tab for {}: {}", url, e);
            }

            result
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn renderer(timeout: Duration) -> HttpRenderer {
        HttpRenderer::new(&UserAgentConfig::default(), timeout).unwrap()
    }

    #[test]
    fn test_is_textual() {
        assert!(is_textual("text/html"));
        assert!(is_textual("text/html; charset=utf-8"));
        assert!(is_textual("application/xhtml+xml"));
        assert!(is_textual("text/plain"));
        assert!(!is_textual("application/pdf"));
        assert!(!is_textual("image/png"));
    }

    #[test]
    fn test_build_renderer_http() {
        assert!(build_renderer(&Config::default()).is_ok());
    }

    #[cfg(not(feature = "browser"))]
    #[test]
    fn test_build_renderer_browser_without_feature() {
        let mut config = Config::default();
        config.crawler.renderer = RendererKind::Browser;
        assert!(matches!(
            build_renderer(&config),
            Err(SiteGrabError::Config(_))
        ));
    }

    #[tokio::test]
    async fn test_render_success() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/page"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_raw("<title>Hi</title><p>Body</p>", "text/html"),
            )
            .mount(&server)
            .await;

        let url = format!("{}/page", server.uri());
        let page = renderer(Duration::from_secs(5)).render(&url).await.unwrap();
        assert_eq!(page.url, url);
        assert_eq!(page.final_url, url);
        assert!(page.html.contains("<p>Body</p>"));
    }

    #[tokio::test]
    async fn test_render_sends_user_agent() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(wiremock::matchers::header(
                "user-agent",
                UserAgentConfig::default().header_value().as_str(),
            ))
            .respond_with(ResponseTemplate::new(200).set_body_raw("<p>ok</p>", "text/html"))
            .expect(1)
            .mount(&server)
            .await;

        renderer(Duration::from_secs(5))
            .render(&format!("{}/", server.uri()))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_render_error_status() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let err = renderer(Duration::from_secs(5))
            .render(&server.uri())
            .await
            .unwrap_err();
        assert!(matches!(err.kind, FetchErrorKind::Status(500)));
        assert_eq!(err.url, server.uri());
    }

    #[tokio::test]
    async fn test_render_content_mismatch() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(200).set_body_raw(vec![0u8, 1, 2], "application/pdf"),
            )
            .mount(&server)
            .await;

        let err = renderer(Duration::from_secs(5))
            .render(&server.uri())
            .await
            .unwrap_err();
        assert!(matches!(
            err.kind,
            FetchErrorKind::ContentMismatch(ref ct) if ct == "application/pdf"
        ));
    }

    #[tokio::test]
    async fn test_render_timeout() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_raw("<p>slow</p>", "text/html")
                    .set_delay(Duration::from_secs(2)),
            )
            .mount(&server)
            .await;

        let err = renderer(Duration::from_millis(200))
            .render(&server.uri())
            .await
            .unwrap_err();
        assert!(matches!(err.kind, FetchErrorKind::RenderTimeout));
    }

    #[tokio::test]
    async fn test_render_network_error() {
        let err = renderer(Duration::from_secs(2))
            .render("http://127.0.0.1:1/")
            .await
            .unwrap_err();
        assert!(matches!(err.kind, FetchErrorKind::Network(_)));
    }
}
