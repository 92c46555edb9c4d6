//! External content extraction: one remote HTML page in, a short clean list
//! of headline/link pairs out.
//!
//! This is the only place in the crate that touches page markup, so all of
//! the structural fragility lives behind a single call:
//! [`NewsExtractor::extract`]. The caller describes the page with an
//! [`ExtractionRequest`] (where it lives, how many items are wanted, and a
//! CSS selector naming which elements count as headline nodes) and receives
//! either an ordered list of [`HeadlineItem`]s or a typed [`ExtractError`].
//!
//! # Result contract
//!
//! - A successful result holds at most `max_items` items, in document order.
//! - Every item has a non-empty trimmed title and an absolute link. Nodes
//!   missing either are skipped, never emitted half-filled and never
//!   escalated into call failures, so page-structure drift degrades the
//!   list instead of breaking the call.
//! - An empty list is a success, not an error: the selector may simply have
//!   matched nothing that day. Transport and parse failures stay distinct
//!   so callers can tell the cases apart.
//!
//! # Parser recovery boundary
//!
//! Parsing uses html5ever (via [`scraper`]), which error-corrects arbitrary
//! non-empty input the way browsers do. Truncated or otherwise mangled
//! markup still produces a document and is not a
//! [`ExtractError::ParseFailed`]; the one unrecoverable case, and the only
//! source of that variant, is an empty or whitespace-only response body.
//!
//! # Concurrency and cancellation
//!
//! The extractor keeps no state between calls: each call parses into a
//! fresh document, and concurrent calls are fully independent. The shared
//! `reqwest` connection pool is safe for concurrent reuse and returns
//! connections on every exit path. Dropping the future returned by
//! [`NewsExtractor::extract`] aborts the in-flight request; nothing keeps
//! running in the background.

use crate::config::FetchConfig;
use crate::utils::truncate_for_log;
use once_cell::sync::Lazy;
use reqwest::StatusCode;
use scraper::{Html, Selector};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, instrument, trace, warn};
use url::Url;

/// Selector for the link element expected inside each headline node.
static LINK_SELECTOR: Lazy<Selector> = Lazy::new(|| Selector::parse("a[href]").unwrap());

/// A rejected [`ExtractionRequest`] argument.
#[derive(Debug, Error)]
pub enum RequestError {
    /// The source URL did not parse as an absolute URL.
    #[error("`{0}` is not a valid absolute URL")]
    InvalidSourceUrl(String),
    /// The selector did not parse as a CSS selector.
    #[error("`{0}` is not a valid CSS selector")]
    InvalidSelector(String),
}

/// A failed extraction call.
///
/// Per-node problems (missing link, empty title) never surface here; those
/// nodes are skipped. These variants are call-level only.
#[derive(Debug, Error)]
pub enum ExtractError {
    /// The page could not be retrieved: connection failure, timeout, or a
    /// non-success HTTP status.
    #[error("failed to fetch {url}")]
    FetchFailed {
        url: Url,
        /// The HTTP status, when the transport got far enough to see one.
        status: Option<StatusCode>,
        #[source]
        source: Option<reqwest::Error>,
    },
    /// The response body could not be interpreted as HTML. See the module
    /// docs for where html5ever draws this line.
    #[error("response from {url} could not be parsed as HTML")]
    ParseFailed { url: Url },
}

/// One extracted headline: a non-empty title and an absolute link.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct HeadlineItem {
    /// Concatenated, whitespace-normalized text of the headline node.
    pub title: String,
    /// Absolute link target, resolved against the source page URL.
    pub link: Url,
}

/// Which page to read and what counts as a headline node on it.
///
/// Validated at construction: the source URL must be absolute and the
/// selector must compile, so [`NewsExtractor::extract`] is left with only
/// the transport and parse ways to fail. Immutable once built.
#[derive(Debug, Clone)]
pub struct ExtractionRequest {
    source_url: Url,
    max_items: usize,
    selector: Selector,
    selector_text: String,
}

impl ExtractionRequest {
    /// Validate and build a request.
    pub fn new(source_url: &str, max_items: usize, selector: &str) -> Result<Self, RequestError> {
        let parsed_url = Url::parse(source_url)
            .map_err(|_| RequestError::InvalidSourceUrl(source_url.to_string()))?;
        let compiled = Selector::parse(selector)
            .map_err(|_| RequestError::InvalidSelector(selector.to_string()))?;
        Ok(Self {
            source_url: parsed_url,
            max_items,
            selector: compiled,
            selector_text: selector.to_string(),
        })
    }

    pub fn source_url(&self) -> &Url {
        &self.source_url
    }

    pub fn max_items(&self) -> usize {
        self.max_items
    }

    /// The selector as originally written, for logging.
    pub fn selector_text(&self) -> &str {
        &self.selector_text
    }
}

/// The extraction component.
///
/// Cheap to clone (the inner client is a handle to a shared connection
/// pool) and stateless between calls.
#[derive(Debug, Clone)]
pub struct NewsExtractor {
    client: reqwest::Client,
}

impl NewsExtractor {
    /// Build an extractor with the given outbound options.
    pub fn new(config: &FetchConfig) -> Result<Self, reqwest::Error> {
        Ok(Self {
            client: config.build_client()?,
        })
    }

    /// Fetch the request's source page once and extract up to
    /// `max_items` headline items from it.
    ///
    /// Exactly one GET is issued per call, with redirects followed as part
    /// of that one fetch and no retries. A `max_items` of zero returns an
    /// empty success without touching the network.
    ///
    /// The link for each matched node is taken from its first descendant
    /// `a[href]`, so the selector should name the headline container, not
    /// the anchor itself.
    #[instrument(
        level = "info",
        skip_all,
        fields(url = %request.source_url(), selector = request.selector_text(), max_items = request.max_items())
    )]
    pub async fn extract(
        &self,
        request: &ExtractionRequest,
    ) -> Result<Vec<HeadlineItem>, ExtractError> {
        if request.max_items() == 0 {
            debug!("Zero items requested; skipping fetch");
            return Ok(Vec::new());
        }

        let url = request.source_url().clone();
        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|e| ExtractError::FetchFailed {
                url: url.clone(),
                status: e.status(),
                source: Some(e),
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(ExtractError::FetchFailed {
                url,
                status: Some(status),
                source: None,
            });
        }

        let body = response
            .text()
            .await
            .map_err(|e| ExtractError::FetchFailed {
                url: url.clone(),
                status: Some(status),
                source: Some(e),
            })?;
        debug!(
            bytes = body.len(),
            preview = %truncate_for_log(&body, 120),
            "Fetched news page"
        );

        extract_from_html(&body, request)
    }
}

/// Extract headline items from an already-fetched document.
///
/// This is the parse/select/collect half of [`NewsExtractor::extract`],
/// kept free of I/O so fixture documents can exercise the extraction rules
/// directly.
pub fn extract_from_html(
    html: &str,
    request: &ExtractionRequest,
) -> Result<Vec<HeadlineItem>, ExtractError> {
    if html.trim().is_empty() {
        return Err(ExtractError::ParseFailed {
            url: request.source_url().clone(),
        });
    }

    let document = Html::parse_document(html);
    let mut items = Vec::new();

    // Truncation happens before per-node filtering: a skipped node is not
    // replaced by a later match, so fewer than max_items can come back.
    for node in document.select(&request.selector).take(request.max_items) {
        let title = node
            .text()
            .map(str::trim)
            .filter(|fragment| !fragment.is_empty())
            .collect::<Vec<_>>()
            .join(" ");
        if title.is_empty() {
            trace!("Skipping headline node with empty title");
            continue;
        }

        let Some(href) = node
            .select(&LINK_SELECTOR)
            .next()
            .and_then(|link| link.value().attr("href"))
        else {
            trace!(%title, "Skipping headline node without a link");
            continue;
        };

        match request.source_url().join(href) {
            Ok(link) => items.push(HeadlineItem { title, link }),
            Err(_) => {
                warn!(%href, "Skipping headline node with unresolvable href");
            }
        }
    }

    debug!(count = items.len(), "Extracted headline items");
    Ok(items)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{Duration, Instant};
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    /// Seven headline nodes in document order; the second and fifth carry
    /// no link element.
    const FIXTURE_PAGE: &str = r#"<html><body>
        <h3 class="story"><a href="/news/alpha">Alpha rally extends</a></h3>
        <h3 class="story">Orphaned headline one</h3>
        <h3 class="story"><a href="/news/beta">Beta earnings beat</a></h3>
        <h3 class="story"><a href="https://elsewhere.example.org/gamma">Gamma goes global</a></h3>
        <h3 class="story">Orphaned headline two</h3>
        <h3 class="story"><a href="/news/delta">  Delta dips on outlook  </a></h3>
        <h3 class="story"><a href="/news/epsilon">Epsilon IPO prices</a></h3>
    </body></html>"#;

    fn request(max_items: usize) -> ExtractionRequest {
        ExtractionRequest::new("https://markets.example.com/front", max_items, "h3.story")
            .unwrap()
    }

    /// Serve a canned response on a local port; one task per connection.
    async fn serve_fixture(status_line: &'static str, body: &'static str) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            loop {
                let Ok((mut socket, _)) = listener.accept().await else {
                    return;
                };
                tokio::spawn(async move {
                    let mut buf = [0u8; 4096];
                    let mut seen = Vec::new();
                    loop {
                        match socket.read(&mut buf).await {
                            Ok(0) => break,
                            Ok(n) => {
                                seen.extend_from_slice(&buf[..n]);
                                if seen.windows(4).any(|w| w == b"\r\n\r\n") {
                                    break;
                                }
                            }
                            Err(_) => return,
                        }
                    }
                    let response = format!(
                        "HTTP/1.1 {status_line}\r\nContent-Type: text/html\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                        body.len()
                    );
                    let _ = socket.write_all(response.as_bytes()).await;
                    let _ = socket.shutdown().await;
                });
            }
        });
        format!("http://{addr}/front")
    }

    /// Accept connections and hold them open without ever answering.
    async fn serve_stalled() -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let mut held = Vec::new();
            loop {
                let Ok((socket, _)) = listener.accept().await else {
                    return;
                };
                held.push(socket);
            }
        });
        format!("http://{addr}/front")
    }

    #[test]
    fn test_rejects_relative_source_url() {
        let err = ExtractionRequest::new("news/front", 5, "h3.story").unwrap_err();
        assert!(matches!(err, RequestError::InvalidSourceUrl(_)));
    }

    #[test]
    fn test_rejects_invalid_selector() {
        let err =
            ExtractionRequest::new("https://markets.example.com", 5, "h3..[").unwrap_err();
        assert!(matches!(err, RequestError::InvalidSelector(_)));
    }

    #[test]
    fn test_accepts_escaped_class_selector() {
        // Atomic-CSS class names need the parenthesis escapes.
        let request =
            ExtractionRequest::new("https://finance.yahoo.com/markets", 5, r"h3.Mb\(5px\)")
                .unwrap();
        assert_eq!(request.selector_text(), r"h3.Mb\(5px\)");
    }

    #[test]
    fn test_skipped_nodes_are_not_replaced() {
        // Of the first five nodes, two have no link; they are dropped and
        // NOT backfilled from the remaining matches.
        let items = extract_from_html(FIXTURE_PAGE, &request(5)).unwrap();
        let titles: Vec<&str> = items.iter().map(|item| item.title.as_str()).collect();
        assert_eq!(
            titles,
            vec!["Alpha rally extends", "Beta earnings beat", "Gamma goes global"]
        );
    }

    #[test]
    fn test_links_resolve_against_source_url() {
        let items = extract_from_html(FIXTURE_PAGE, &request(5)).unwrap();
        assert_eq!(
            items[0].link.as_str(),
            "https://markets.example.com/news/alpha"
        );
        // Absolute hrefs pass through untouched.
        assert_eq!(items[2].link.as_str(), "https://elsewhere.example.org/gamma");
    }

    #[test]
    fn test_result_is_bounded_and_ordered() {
        let items = extract_from_html(FIXTURE_PAGE, &request(100)).unwrap();
        assert_eq!(items.len(), 5);
        assert_eq!(items[3].title, "Delta dips on outlook");
        assert_eq!(items[4].title, "Epsilon IPO prices");

        let two = extract_from_html(FIXTURE_PAGE, &request(2)).unwrap();
        assert_eq!(two.len(), 1, "only the first of the first two nodes has a link");
        assert_eq!(two[0].title, "Alpha rally extends");
    }

    #[test]
    fn test_extraction_is_idempotent() {
        let first = extract_from_html(FIXTURE_PAGE, &request(5)).unwrap();
        let second = extract_from_html(FIXTURE_PAGE, &request(5)).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_nested_markup_titles_are_normalized() {
        let page = r#"<html><body>
            <h3 class="story"><a href="/n">Fed <em>lifts</em>
                rates</a></h3>
        </body></html>"#;
        let items = extract_from_html(page, &request(5)).unwrap();
        assert_eq!(items[0].title, "Fed lifts rates");
    }

    #[test]
    fn test_no_matches_is_an_empty_success() {
        let page = "<html><body><p>No headlines here.</p></body></html>";
        let items = extract_from_html(page, &request(5)).unwrap();
        assert!(items.is_empty());
    }

    #[test]
    fn test_empty_body_is_parse_failed() {
        for body in ["", "   \n\t  "] {
            let err = extract_from_html(body, &request(5)).unwrap_err();
            assert!(matches!(err, ExtractError::ParseFailed { .. }));
        }
    }

    #[test]
    fn test_truncated_markup_still_extracts() {
        // html5ever error-corrects; a body cut mid-element still yields
        // whatever was complete before the cut.
        let page = r#"<html><body><h3 class="story"><a href="/cut">Cut off mid"#;
        let items = extract_from_html(page, &request(5)).unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].title, "Cut off mid");
    }

    #[tokio::test]
    async fn test_fetches_and_extracts_end_to_end() {
        let url = serve_fixture("200 OK", FIXTURE_PAGE).await;
        let extractor = NewsExtractor::new(&FetchConfig::default()).unwrap();
        let request = ExtractionRequest::new(&url, 5, "h3.story").unwrap();

        let items = extractor.extract(&request).await.unwrap();
        assert_eq!(items.len(), 3);
        assert_eq!(items[0].title, "Alpha rally extends");
        assert!(items.iter().all(|item| item.link.host().is_some()));
    }

    #[tokio::test]
    async fn test_non_success_status_is_fetch_failed() {
        let url = serve_fixture("404 Not Found", "not here").await;
        let extractor = NewsExtractor::new(&FetchConfig::default()).unwrap();
        let request = ExtractionRequest::new(&url, 5, "h3.story").unwrap();

        match extractor.extract(&request).await.unwrap_err() {
            ExtractError::FetchFailed { status, .. } => {
                assert_eq!(status.map(|s| s.as_u16()), Some(404));
            }
            other => panic!("expected FetchFailed, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_refused_connection_is_fetch_failed_without_status() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let extractor = NewsExtractor::new(&FetchConfig::default()).unwrap();
        let request =
            ExtractionRequest::new(&format!("http://{addr}/front"), 5, "h3.story").unwrap();

        match extractor.extract(&request).await.unwrap_err() {
            ExtractError::FetchFailed { status, .. } => assert!(status.is_none()),
            other => panic!("expected FetchFailed, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_stalled_server_fails_within_the_timeout() {
        let url = serve_stalled().await;
        let config = FetchConfig {
            timeout: Duration::from_millis(300),
            ..FetchConfig::default()
        };
        let extractor = NewsExtractor::new(&config).unwrap();
        let request = ExtractionRequest::new(&url, 5, "h3.story").unwrap();

        let started = Instant::now();
        let err = extractor.extract(&request).await.unwrap_err();
        assert!(matches!(err, ExtractError::FetchFailed { .. }));
        assert!(
            started.elapsed() < Duration::from_secs(5),
            "stalled fetch was not bounded by the timeout"
        );
    }

    #[tokio::test]
    async fn test_zero_max_items_skips_the_network() {
        // Nothing listens here; a real fetch would error.
        let extractor = NewsExtractor::new(&FetchConfig::default()).unwrap();
        let request = ExtractionRequest::new("http://127.0.0.1:9/front", 0, "h3.story").unwrap();

        let items = extractor.extract(&request).await.unwrap();
        assert!(items.is_empty());
    }

    #[tokio::test]
    async fn test_concurrent_extractions_are_independent() {
        const PAGE_A: &str =
            r#"<html><body><h3 class="story"><a href="/a">Feed A story</a></h3></body></html>"#;
        const PAGE_B: &str =
            r#"<html><body><h3 class="story"><a href="/b">Feed B story</a></h3></body></html>"#;
        let url_a = serve_fixture("200 OK", PAGE_A).await;
        let url_b = serve_fixture("200 OK", PAGE_B).await;

        let extractor = NewsExtractor::new(&FetchConfig::default()).unwrap();
        let request_a = ExtractionRequest::new(&url_a, 5, "h3.story").unwrap();
        let request_b = ExtractionRequest::new(&url_b, 5, "h3.story").unwrap();

        let (a, b) = futures::future::join(
            extractor.extract(&request_a),
            extractor.extract(&request_b),
        )
        .await;
        assert_eq!(a.unwrap()[0].title, "Feed A story");
        assert_eq!(b.unwrap()[0].title, "Feed B story");
    }

    #[tokio::test]
    async fn test_dropping_the_future_cancels_the_fetch() {
        let url = serve_stalled().await;
        let extractor = NewsExtractor::new(&FetchConfig::default()).unwrap();
        let request = ExtractionRequest::new(&url, 5, "h3.story").unwrap();

        let started = Instant::now();
        tokio::select! {
            _ = extractor.extract(&request) => panic!("stalled extract should not complete"),
            _ = tokio::time::sleep(Duration::from_millis(50)) => {}
        }
        // The losing branch is dropped right here; nothing waits out the
        // full ten second default timeout.
        assert!(started.elapsed() < Duration::from_secs(2));
    }
}
