//! Node metadata handed to a host for registration.

use serde::Serialize;

use xmlfetch_shared::NODE_TYPE_TAG;

use crate::params;

/// Describes one node parameter to the host's editor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParameterDescriptor {
    /// Key the value is stored under.
    pub key: &'static str,
    /// Human-readable label.
    pub label: &'static str,
    /// Whether the node refuses to run with this parameter blank.
    pub required: bool,
    /// Whether the host evaluates the value as a formula before the run.
    pub formula: bool,
}

/// Static description of the node type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NodeDescriptor {
    pub type_tag: &'static str,
    pub name: &'static str,
    pub category: &'static str,
    pub description: &'static str,
    pub parameters: Vec<ParameterDescriptor>,
}

impl NodeDescriptor {
    /// Descriptor of a parameter by key.
    pub fn parameter(&self, key: &str) -> Option<&ParameterDescriptor> {
        self.parameters.iter().find(|p| p.key == key)
    }
}

/// Descriptor of the XML fetch node.
pub fn descriptor() -> NodeDescriptor {
    NodeDescriptor {
        type_tag: NODE_TYPE_TAG,
        name: "Get value from web service",
        category: "Web",
        description: "Requests an XML document over HTTP and stores the value selected by an \
                      XPath expression in a variable.",
        parameters: vec![
            ParameterDescriptor {
                key: params::ADDRESS,
                label: "Address",
                required: true,
                formula: false,
            },
            ParameterDescriptor {
                key: params::QUERY,
                label: "Query",
                required: false,
                formula: true,
            },
            ParameterDescriptor {
                key: params::NAMESPACE_PREFIX,
                label: "Namespace prefix",
                required: false,
                formula: false,
            },
            ParameterDescriptor {
                key: params::XPATH,
                label: "XPath",
                required: true,
                formula: false,
            },
            ParameterDescriptor {
                key: params::VARIABLE_NAME,
                label: "Variable",
                required: true,
                formula: false,
            },
        ],
    }
}
