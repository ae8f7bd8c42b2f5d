//! Node parameters as stored by the host.

use serde::{Deserialize, Serialize};

use xmlfetch_shared::{RequestConfig, Result, VariableStore, XmlFetchError};

/// Parameter key of the service address.
pub const ADDRESS: &str = "Address";
/// Parameter key of the query string (a host formula).
pub const QUERY: &str = "Query";
/// Parameter key of the namespace prefix.
pub const NAMESPACE_PREFIX: &str = "NamespacePrefix";
/// Parameter key of the XPath expression.
pub const XPATH: &str = "XPath";
/// Parameter key of the destination variable.
pub const VARIABLE_NAME: &str = "VariableName";

/// The five named string parameters of the node.
///
/// Field names match the host's parameter keys so a parameter file can be
/// written by hand:
///
/// ```toml
/// Address = "https://api.example.com/quote"
/// Query = "symbol=ACME"
/// NamespacePrefix = "q"
/// XPath = "q:price"
/// VariableName = "price"
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct NodeParameters {
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub query: String,
    #[serde(default)]
    pub namespace_prefix: String,
    #[serde(default, rename = "XPath")]
    pub xpath: String,
    #[serde(default)]
    pub variable_name: String,
}

impl NodeParameters {
    /// Read the parameters out of a host parameter bag. Missing keys are blank.
    pub fn from_bag(bag: &dyn VariableStore) -> Self {
        let read = |key| bag.get(key).unwrap_or_default();
        Self {
            address: read(ADDRESS),
            query: read(QUERY),
            namespace_prefix: read(NAMESPACE_PREFIX),
            xpath: read(XPATH),
            variable_name: read(VARIABLE_NAME),
        }
    }

    /// Write the parameters into a host parameter bag.
    pub fn store_into(&self, bag: &mut dyn VariableStore) {
        bag.set(ADDRESS, Some(self.address.clone()));
        bag.set(QUERY, Some(self.query.clone()));
        bag.set(NAMESPACE_PREFIX, Some(self.namespace_prefix.clone()));
        bag.set(XPATH, Some(self.xpath.clone()));
        bag.set(VARIABLE_NAME, Some(self.variable_name.clone()));
    }

    /// Parse a TOML parameter file.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content)
            .map_err(|e| XmlFetchError::config(format!("invalid node parameters: {e}")))
    }

    /// Fill a blank namespace prefix from a configured default.
    pub fn with_default_prefix(mut self, prefix: &str) -> Self {
        if self.namespace_prefix.trim().is_empty() {
            self.namespace_prefix = prefix.to_string();
        }
        self
    }
}

impl From<NodeParameters> for RequestConfig {
    fn from(params: NodeParameters) -> Self {
        Self {
            address: params.address,
            query: params.query,
            namespace_prefix: params.namespace_prefix,
            xpath: params.xpath,
            variable_name: params.variable_name,
        }
    }
}
