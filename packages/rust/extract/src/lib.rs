//! Fetch an XML document over HTTP and extract one value with XPath.
//!
//! [`XmlFetchExtractor::execute`] runs a linear pipeline, each stage with a
//! single classified failure exit:
//!
//! validate variable name and XPath → build URL → fetch → decode → parse → bind namespace →
//! evaluate XPath → extract value
//!
//! The extractor never writes the result variable itself; it returns the
//! value and the caller stores it. The only write it performs is the
//! normalized request URL under [`DEBUG_URL_KEY`], made as soon as the URL is
//! known and regardless of what happens afterwards.

pub mod charset;
pub mod request_url;
pub mod xpath;

use reqwest::Client;
use tracing::{debug, info, instrument, warn};
use url::Url;

use xmlfetch_shared::{
    DEBUG_URL_KEY, FetchResult, RequestConfig, Result, VariableStore, XmlFetchError,
};

// ---------------------------------------------------------------------------
// XmlFetchExtractor
// ---------------------------------------------------------------------------

/// Stateless request-and-extract operation.
///
/// Holds only an HTTP client, so one extractor can serve any number of
/// concurrent invocations. No timeout is configured: wrap the returned
/// future if latency must be bounded.
#[derive(Debug, Clone)]
pub struct XmlFetchExtractor {
    client: Client,
}

impl XmlFetchExtractor {
    /// Create an extractor with a default HTTP client.
    pub fn new() -> Result<Self> {
        let client = Client::builder()
            .build()
            .map_err(|e| XmlFetchError::RequestFailed(format!("failed to build HTTP client: {e}")))?;
        Ok(Self { client })
    }

    /// Create an extractor around an existing client (shared connection pool).
    pub fn with_client(client: Client) -> Self {
        Self { client }
    }

    /// Run one extraction.
    ///
    /// `diagnostics` receives the normalized URL under [`DEBUG_URL_KEY`].
    /// Every failure comes back as a classified [`XmlFetchError`]; no
    /// variable other than the debug URL is touched.
    #[instrument(skip_all, fields(variable = %config.variable_name))]
    pub async fn execute(
        &self,
        config: &RequestConfig,
        diagnostics: &mut dyn VariableStore,
    ) -> FetchResult {
        if config.variable_name.trim().is_empty() {
            warn!("rejecting blank variable name");
            return Err(XmlFetchError::InvalidVariableName {
                name: config.variable_name.clone(),
            });
        }
        if config.xpath.trim().is_empty() {
            warn!("rejecting blank XPath expression");
            return Err(XmlFetchError::XPathEvaluationFailed(
                "empty XPath expression".into(),
            ));
        }

        let url = request_url::build(&config.address, &config.query).inspect_err(|e| {
            warn!(error = %e, "request URL rejected");
        })?;
        diagnostics.set(DEBUG_URL_KEY, Some(url.to_string()));
        debug!(%url, "request URL built");

        let body = self.fetch(&url).await.inspect_err(|e| {
            warn!(error = %e, "request failed");
        })?;

        let value = xpath::extract(&body, config.prefix(), &config.xpath).inspect_err(|e| {
            warn!(error = %e, xpath = %config.xpath, "extraction failed");
        })?;

        info!(
            %url,
            matched = value.is_some(),
            "value extracted"
        );

        Ok(value)
    }

    /// GET `url` and return the full body, decoded to text.
    async fn fetch(&self, url: &Url) -> Result<String> {
        info!(%url, "fetching XML document");

        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|e| XmlFetchError::RequestFailed(format!("{url}: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(XmlFetchError::RequestFailed(format!("{url}: HTTP {status}")));
        }

        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_owned);
        let body = response
            .bytes()
            .await
            .map_err(|e| XmlFetchError::RequestFailed(format!("{url}: failed to read body: {e}")))?;

        charset::decode(&body, content_type.as_deref())
            .map_err(|e| XmlFetchError::RequestFailed(format!("{url}: {}", e.detail())))
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    /// Diagnostic sink that records every write.
    #[derive(Default)]
    struct RecordingStore {
        values: HashMap<String, Option<String>>,
        writes: usize,
    }

    impl VariableStore for RecordingStore {
        fn get(&self, key: &str) -> Option<String> {
            self.values.get(key).cloned().flatten()
        }

        fn set(&mut self, key: &str, value: Option<String>) {
            self.writes += 1;
            self.values.insert(key.to_string(), value);
        }
    }

    fn load_fixture(name: &str) -> String {
        let path = format!("../../../fixtures/xml/{name}");
        std::fs::read_to_string(&path).unwrap_or_else(|_| panic!("missing fixture: {path}"))
    }

    async fn serve_xml(route: &str, body: String) -> wiremock::MockServer {
        let server = wiremock::MockServer::start().await;
        wiremock::Mock::given(wiremock::matchers::method("GET"))
            .and(wiremock::matchers::path(route))
            .respond_with(
                wiremock::ResponseTemplate::new(200)
                    .set_body_raw(body.into_bytes(), "application/xml"),
            )
            .mount(&server)
            .await;
        server
    }

    #[tokio::test]
    async fn blank_variable_name_skips_network() {
        let server = wiremock::MockServer::start().await;
        wiremock::Mock::given(wiremock::matchers::any())
            .respond_with(wiremock::ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let extractor = XmlFetchExtractor::new().unwrap();
        for name in ["", " ", "\t\n"] {
            let mut store = RecordingStore::default();
            let config = RequestConfig::new(server.uri(), "v", name);
            let err = extractor.execute(&config, &mut store).await.unwrap_err();
            assert!(matches!(err, XmlFetchError::InvalidVariableName { .. }));
            assert_eq!(store.writes, 0);
        }

        server.verify().await;
    }

    #[tokio::test]
    async fn invalid_url_is_classified() {
        let extractor = XmlFetchExtractor::new().unwrap();
        let mut store = RecordingStore::default();
        let config = RequestConfig::new("not a url", "v", "out").with_query("a=1");

        let err = extractor.execute(&config, &mut store).await.unwrap_err();
        match err {
            XmlFetchError::InvalidUrl { url, .. } => assert_eq!(url, "not a url?a=1"),
            other => panic!("expected InvalidUrl, got {other:?}"),
        }
        assert_eq!(store.get(DEBUG_URL_KEY), None);
    }

    #[tokio::test]
    async fn extracts_namespaced_element() {
        let server = serve_xml("/quote", load_fixture("namespaced.xml")).await;
        let extractor = XmlFetchExtractor::new().unwrap();
        let mut store = RecordingStore::default();
        let config = RequestConfig::new(format!("{}/quote?", server.uri()), "n:v", "price")
            .with_query("?symbol=ACME")
            .with_namespace_prefix("n");

        let value = extractor.execute(&config, &mut store).await.unwrap();
        assert_eq!(value.as_deref(), Some("42"));
        assert_eq!(
            store.get(DEBUG_URL_KEY),
            Some(format!("{}/quote?symbol=ACME", server.uri()))
        );
        // Only the debug URL; the result variable is the caller's job.
        assert_eq!(store.writes, 1);
        assert_eq!(store.get("price"), None);
    }

    #[tokio::test]
    async fn missing_attribute_is_success_without_value() {
        let server = serve_xml("/quote", load_fixture("namespaced.xml")).await;
        let extractor = XmlFetchExtractor::new().unwrap();
        let mut store = RecordingStore::default();
        let config = RequestConfig::new(format!("{}/quote", server.uri()), "n:v/@missing", "out")
            .with_namespace_prefix("n");

        let value = extractor.execute(&config, &mut store).await.unwrap();
        assert_eq!(value, None);
    }

    #[tokio::test]
    async fn comment_match_is_unsupported() {
        let server = serve_xml("/feed", load_fixture("catalog.xml")).await;
        let extractor = XmlFetchExtractor::new().unwrap();
        let mut store = RecordingStore::default();
        let config = RequestConfig::new(format!("{}/feed", server.uri()), "comment()", "out");

        let err = extractor.execute(&config, &mut store).await.unwrap_err();
        assert!(matches!(err, XmlFetchError::UnsupportedNodeKind { .. }));
    }

    #[tokio::test]
    async fn invalid_xpath_is_classified() {
        let server = serve_xml("/feed", load_fixture("catalog.xml")).await;
        let extractor = XmlFetchExtractor::new().unwrap();
        let mut store = RecordingStore::default();
        let config = RequestConfig::new(format!("{}/feed", server.uri()), "book[@id=", "out");

        let err = extractor.execute(&config, &mut store).await.unwrap_err();
        assert!(matches!(err, XmlFetchError::XPathEvaluationFailed(_)));
    }

    #[tokio::test]
    async fn attribute_and_element_from_fixture() {
        let server = serve_xml("/feed", load_fixture("catalog.xml")).await;
        let extractor = XmlFetchExtractor::new().unwrap();
        let mut store = RecordingStore::default();
        let address = format!("{}/feed", server.uri());

        let config = RequestConfig::new(&address, "book[2]/@id", "out");
        let value = extractor.execute(&config, &mut store).await.unwrap();
        assert_eq!(value.as_deref(), Some("bk102"));

        let config = RequestConfig::new(&address, "book[@id='bk101']/title", "out");
        let value = extractor.execute(&config, &mut store).await.unwrap();
        assert_eq!(value.as_deref(), Some("XML Developer's Guide"));
    }

    #[tokio::test]
    async fn http_error_status_is_request_failure() {
        let server = wiremock::MockServer::start().await;
        wiremock::Mock::given(wiremock::matchers::method("GET"))
            .respond_with(wiremock::ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let extractor = XmlFetchExtractor::new().unwrap();
        let mut store = RecordingStore::default();
        let config = RequestConfig::new(server.uri(), "v", "out");

        let err = extractor.execute(&config, &mut store).await.unwrap_err();
        match err {
            XmlFetchError::RequestFailed(msg) => assert!(msg.contains("503")),
            other => panic!("expected RequestFailed, got {other:?}"),
        }
        // The URL was valid, so the diagnostic write still happened.
        assert!(store.get(DEBUG_URL_KEY).is_some());
    }

    #[tokio::test]
    async fn malformed_body_is_request_failure() {
        let server = serve_xml("/", "<root><open></root>".to_string()).await;
        let extractor = XmlFetchExtractor::new().unwrap();
        let mut store = RecordingStore::default();
        let config = RequestConfig::new(server.uri(), "open", "out");

        let err = extractor.execute(&config, &mut store).await.unwrap_err();
        assert!(matches!(err, XmlFetchError::RequestFailed(_)));
    }

    #[tokio::test]
    async fn unreachable_host_records_url_and_fails() {
        // Bind then drop a listener so the port refuses connections.
        let uri = {
            let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
            format!("http://{}", listener.local_addr().unwrap())
        };

        let extractor = XmlFetchExtractor::new().unwrap();
        let mut store = RecordingStore::default();
        let config = RequestConfig::new(format!("{uri}/data"), "v", "out").with_query("x=1");

        let err = extractor.execute(&config, &mut store).await.unwrap_err();
        match err {
            XmlFetchError::RequestFailed(msg) => assert!(!msg.is_empty()),
            other => panic!("expected RequestFailed, got {other:?}"),
        }
        assert_eq!(store.get(DEBUG_URL_KEY), Some(format!("{uri}/data?x=1")));
        assert_eq!(store.get("out"), None);
        assert_eq!(store.writes, 1);
    }

    #[tokio::test]
    async fn blank_xpath_skips_network() {
        let server = wiremock::MockServer::start().await;
        wiremock::Mock::given(wiremock::matchers::any())
            .respond_with(wiremock::ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let extractor = XmlFetchExtractor::new().unwrap();
        for xpath in ["", "   ", "\n\t"] {
            let mut store = RecordingStore::default();
            let config = RequestConfig::new(server.uri(), xpath, "out");
            match extractor.execute(&config, &mut store).await.unwrap_err() {
                XmlFetchError::XPathEvaluationFailed(msg) => {
                    assert_eq!(msg, "empty XPath expression")
                }
                other => panic!("expected XPathEvaluationFailed, got {other:?}"),
            }
            assert_eq!(store.writes, 0);
        }

        server.verify().await;
    }

    #[tokio::test]
    async fn debug_url_matches_requested_url() {
        let server = wiremock::MockServer::start().await;
        wiremock::Mock::given(wiremock::matchers::any())
            .respond_with(
                wiremock::ResponseTemplate::new(200)
                    .set_body_raw(load_fixture("namespaced.xml").into_bytes(), "application/xml"),
            )
            .mount(&server)
            .await;

        let address = format!("{}/a b?", server.uri().replacen("http://", "HTTP://", 1));
        let extractor = XmlFetchExtractor::new().unwrap();
        let mut store = RecordingStore::default();
        let config = RequestConfig::new(address, "n:v", "out")
            .with_query("?x=1 2")
            .with_namespace_prefix("n");

        let value = extractor.execute(&config, &mut store).await.unwrap();
        assert_eq!(value.as_deref(), Some("42"));

        let expected = format!("{}/a%20b?x=1%202", server.uri());
        assert_eq!(store.get(DEBUG_URL_KEY), Some(expected.clone()));

        let requests = server.received_requests().await.unwrap();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].url.as_str(), expected);
    }

    #[tokio::test]
    async fn declared_latin1_body_is_decoded() {
        let server = wiremock::MockServer::start().await;
        let body = b"<?xml version=\"1.0\" encoding=\"ISO-8859-1\"?><root><v>caf\xE9</v></root>";
        wiremock::Mock::given(wiremock::matchers::method("GET"))
            .respond_with(wiremock::ResponseTemplate::new(200).set_body_raw(body.to_vec(), "text/xml"))
            .mount(&server)
            .await;

        let extractor = XmlFetchExtractor::new().unwrap();
        let mut store = RecordingStore::default();
        let config = RequestConfig::new(server.uri(), "v", "out");

        let value = extractor.execute(&config, &mut store).await.unwrap();
        assert_eq!(value.as_deref(), Some("café"));
    }

    #[tokio::test]
    async fn unknown_declared_encoding_is_request_failure() {
        let server = wiremock::MockServer::start().await;
        let body = b"<?xml version=\"1.0\" encoding=\"x-no-such\"?><root><v>1</v></root>";
        wiremock::Mock::given(wiremock::matchers::method("GET"))
            .respond_with(wiremock::ResponseTemplate::new(200).set_body_raw(body.to_vec(), "text/xml"))
            .mount(&server)
            .await;

        let extractor = XmlFetchExtractor::new().unwrap();
        let mut store = RecordingStore::default();
        let config = RequestConfig::new(server.uri(), "v", "out");

        match extractor.execute(&config, &mut store).await.unwrap_err() {
            XmlFetchError::RequestFailed(msg) => assert!(msg.contains("x-no-such")),
            other => panic!("expected RequestFailed, got {other:?}"),
        }
        assert!(store.get(DEBUG_URL_KEY).is_some());
    }
}
