//! Core domain types for an XmlFetch invocation.

use serde::{Deserialize, Serialize};

use crate::error::XmlFetchError;

/// Tag identifying this node type to the host; scopes the debug variable.
pub const NODE_TYPE_TAG: &str = "XML_FETCH";

/// Diagnostic variable that receives the normalized request URL.
pub const DEBUG_URL_KEY: &str = "DEBUG_XML_FETCH_URL";

// ---------------------------------------------------------------------------
// RequestConfig
// ---------------------------------------------------------------------------

/// Everything one extraction needs, built fresh for every call.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestConfig {
    /// Base URL of the web service. A trailing `?` is ignored.
    pub address: String,
    /// Raw query string, possibly empty. A leading `?` is ignored.
    #[serde(default)]
    pub query: String,
    /// Prefix bound to the root element's namespace, if non-blank.
    #[serde(default)]
    pub namespace_prefix: String,
    /// XPath expression evaluated against the root element.
    pub xpath: String,
    /// Workflow variable that receives the extracted value.
    pub variable_name: String,
}

impl RequestConfig {
    /// Create a config with no query and no namespace prefix.
    pub fn new(
        address: impl Into<String>,
        xpath: impl Into<String>,
        variable_name: impl Into<String>,
    ) -> Self {
        Self {
            address: address.into(),
            xpath: xpath.into(),
            variable_name: variable_name.into(),
            ..Self::default()
        }
    }

    /// Set the query string merged onto the address.
    pub fn with_query(mut self, query: impl Into<String>) -> Self {
        self.query = query.into();
        self
    }

    /// Set the prefix bound to the document's default namespace.
    pub fn with_namespace_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.namespace_prefix = prefix.into();
        self
    }

    /// The namespace prefix, or `None` when blank.
    pub fn prefix(&self) -> Option<&str> {
        let prefix = self.namespace_prefix.trim();
        (!prefix.is_empty()).then_some(prefix)
    }
}

// ---------------------------------------------------------------------------
// Results
// ---------------------------------------------------------------------------

/// Value extracted from the response; `None` when nothing matched.
pub type ExtractedValue = Option<String>;

/// Outcome of one extraction: a value or a classified failure.
pub type FetchResult = std::result::Result<ExtractedValue, XmlFetchError>;

// ---------------------------------------------------------------------------
// VariableStore
// ---------------------------------------------------------------------------

/// Host-owned key/value storage for workflow variables.
///
/// The extractor only writes diagnostics through it; the node layer also
/// writes the extracted value. A `None` value is the host's null.
pub trait VariableStore: Send {
    /// Current value of `key`, if set and non-null.
    fn get(&self, key: &str) -> Option<String>;
    /// Set `key` to `value`, replacing any previous value.
    fn set(&mut self, key: &str, value: Option<String>);
}
