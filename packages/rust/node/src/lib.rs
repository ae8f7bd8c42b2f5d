//! Host integration for the XML fetch node.
//!
//! This crate sits between a workflow host and the extractor:
//! - [`params`] — the node's five named parameters and their keys
//! - [`descriptor`] — metadata the host registers the node with
//! - [`MemoryStore`] — in-process variable store
//! - [`messages`] — message identifiers and rendering for failures
//! - [`XmlFetchNode`] — runs one extraction and writes the result variable

pub mod descriptor;
pub mod messages;
pub mod params;
mod store;

use tracing::{info, instrument, warn};

use xmlfetch_extract::XmlFetchExtractor;
use xmlfetch_shared::{FetchResult, RequestConfig, Result, VariableStore};

pub use descriptor::{NodeDescriptor, ParameterDescriptor};
pub use messages::{MESSAGE_GROUP, MessageCatalog, message_id};
pub use params::NodeParameters;
pub use store::MemoryStore;

/// The XML fetch node: one extraction per [`run`](Self::run).
#[derive(Debug, Clone)]
pub struct XmlFetchNode {
    extractor: XmlFetchExtractor,
}

impl XmlFetchNode {
    /// Create a node with its own HTTP client.
    pub fn new() -> Result<Self> {
        Ok(Self {
            extractor: XmlFetchExtractor::new()?,
        })
    }

    /// Create a node around an existing extractor.
    pub fn with_extractor(extractor: XmlFetchExtractor) -> Self {
        Self { extractor }
    }

    /// Metadata for host registration.
    pub fn descriptor() -> NodeDescriptor {
        descriptor::descriptor()
    }

    /// Run the node and store the outcome in `variables`.
    ///
    /// The debug URL is written once the URL is valid. The result variable
    /// is written only on success, as `None` when nothing matched.
    #[instrument(skip_all, fields(variable = %params.variable_name))]
    pub async fn run(
        &self,
        params: NodeParameters,
        variables: &mut dyn VariableStore,
    ) -> FetchResult {
        let config = RequestConfig::from(params);

        match self.extractor.execute(&config, variables).await {
            Ok(value) => {
                info!(
                    variable = %config.variable_name,
                    is_null = value.is_none(),
                    "storing extracted value"
                );
                variables.set(&config.variable_name, value.clone());
                Ok(value)
            }
            Err(e) => {
                warn!(kind = %e.kind(), error = %e, "node run failed");
                Err(e)
            }
        }
    }

    /// Run the node with parameters read from a host parameter bag.
    pub async fn run_from_bag(
        &self,
        bag: &dyn VariableStore,
        variables: &mut dyn VariableStore,
    ) -> FetchResult {
        self.run(NodeParameters::from_bag(bag), variables).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use xmlfetch_shared::{DEBUG_URL_KEY, XmlFetchError};

    const DOCUMENT: &str = r#"<root xmlns="urn:ns"><v>42</v><w/></root>"#;

    async fn xml_server() -> wiremock::MockServer {
        let server = wiremock::MockServer::start().await;
        wiremock::Mock::given(wiremock::matchers::method("GET"))
            .and(wiremock::matchers::path("/svc"))
            .respond_with(wiremock::ResponseTemplate::new(200).set_body_string(DOCUMENT))
            .mount(&server)
            .await;
        server
    }

    fn params(address: String, xpath: &str, variable: &str) -> NodeParameters {
        NodeParameters {
            address,
            query: String::new(),
            namespace_prefix: "n".into(),
            xpath: xpath.into(),
            variable_name: variable.into(),
        }
    }

    #[tokio::test]
    async fn run_stores_value_and_debug_url() {
        let server = xml_server().await;
        let node = XmlFetchNode::new().unwrap();
        let mut vars = MemoryStore::new();

        let mut p = params(format!("{}/svc", server.uri()), "n:v", "answer");
        p.query = "?lang=en".into();
        let value = node.run(p, &mut vars).await.unwrap();

        assert_eq!(value.as_deref(), Some("42"));
        assert_eq!(vars.get("answer").as_deref(), Some("42"));
        assert_eq!(
            vars.get(DEBUG_URL_KEY),
            Some(format!("{}/svc?lang=en", server.uri()))
        );
    }

    #[tokio::test]
    async fn no_match_stores_null() {
        let server = xml_server().await;
        let node = XmlFetchNode::new().unwrap();
        let mut vars = MemoryStore::new();

        node.run(params(format!("{}/svc", server.uri()), "n:v/@attr", "answer"), &mut vars)
            .await
            .unwrap();

        assert!(vars.contains("answer"));
        assert_eq!(vars.get("answer"), None);
    }

    #[tokio::test]
    async fn empty_element_stores_empty_string() {
        let server = xml_server().await;
        let node = XmlFetchNode::new().unwrap();
        let mut vars = MemoryStore::new();

        node.run(params(format!("{}/svc", server.uri()), "n:w", "answer"), &mut vars)
            .await
            .unwrap();

        assert_eq!(vars.get("answer").as_deref(), Some(""));
    }

    #[tokio::test]
    async fn failure_leaves_result_variable_untouched() {
        let server = xml_server().await;
        let node = XmlFetchNode::new().unwrap();
        let mut vars = MemoryStore::new();
        vars.set("answer", Some("previous".into()));

        let err = node
            .run(params(format!("{}/svc", server.uri()), "n:v[", "answer"), &mut vars)
            .await
            .unwrap_err();

        assert!(matches!(err, XmlFetchError::XPathEvaluationFailed(_)));
        assert_eq!(vars.get("answer").as_deref(), Some("previous"));
        assert!(vars.contains(DEBUG_URL_KEY));
    }

    #[tokio::test]
    async fn blank_variable_writes_nothing() {
        let node = XmlFetchNode::new().unwrap();
        let mut vars = MemoryStore::new();

        let err = node
            .run(params("http://127.0.0.1:9/svc".into(), "n:v", "  "), &mut vars)
            .await
            .unwrap_err();

        assert!(matches!(err, XmlFetchError::InvalidVariableName { .. }));
        assert!(vars.is_empty());
    }

    #[tokio::test]
    async fn run_from_bag_reads_host_parameters() {
        let server = xml_server().await;
        let node = XmlFetchNode::new().unwrap();

        let mut bag = MemoryStore::new();
        params(format!("{}/svc", server.uri()), "n:v", "answer").store_into(&mut bag);

        let mut vars = MemoryStore::new();
        let value = node.run_from_bag(&bag, &mut vars).await.unwrap();
        assert_eq!(value.as_deref(), Some("42"));
        assert_eq!(vars.get("answer").as_deref(), Some("42"));
    }
}
