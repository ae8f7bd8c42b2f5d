//! User-facing failure messages.
//!
//! The extractor only reports an [`ErrorKind`] and raw diagnostic text. This
//! module turns them into display strings: every kind has a message
//! identifier in the [`MESSAGE_GROUP`] group, and a template in which `{0}`
//! is replaced by the diagnostic text.

use std::collections::BTreeMap;

use xmlfetch_shared::{ErrorKind, XmlFetchError};

/// Message group of this node.
pub const MESSAGE_GROUP: &str = "XmlFetchNode";

/// Identifier of the message for `kind`, e.g. `XmlFetchNode.InvalidUrl`.
pub fn message_id(kind: ErrorKind) -> String {
    format!("{MESSAGE_GROUP}.{kind}")
}

fn default_template(kind: ErrorKind) -> &'static str {
    match kind {
        ErrorKind::InvalidVariableName => "The variable name '{0}' is not valid.",
        ErrorKind::InvalidUrl => "The address '{0}' is not a valid URL.",
        ErrorKind::RequestFailed => "The web service request failed: {0}",
        ErrorKind::XPathEvaluationFailed => "The XPath expression could not be evaluated: {0}",
        ErrorKind::UnsupportedNodeKind => {
            "The XPath expression selected a {0} node; only elements and attributes are supported."
        }
        ErrorKind::Config => "Configuration error: {0}",
        ErrorKind::Io => "File error: {0}",
    }
}

/// Resolves message identifiers to templates.
#[derive(Debug, Clone, Default)]
pub struct MessageCatalog {
    overrides: BTreeMap<String, String>,
}

impl MessageCatalog {
    /// Catalog with the built-in English templates only.
    pub fn new() -> Self {
        Self::default()
    }

    /// Catalog whose entries replace the built-in templates by identifier.
    pub fn with_overrides(overrides: BTreeMap<String, String>) -> Self {
        Self { overrides }
    }

    /// Template for `kind`.
    pub fn template(&self, kind: ErrorKind) -> &str {
        self.overrides
            .get(&message_id(kind))
            .map(String::as_str)
            .unwrap_or_else(|| default_template(kind))
    }

    /// Display string for `err`.
    pub fn render(&self, err: &XmlFetchError) -> String {
        self.template(err.kind()).replace("{0}", &err.detail())
    }
}
