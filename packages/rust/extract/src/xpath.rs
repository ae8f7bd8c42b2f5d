//! XML parsing and XPath extraction.
//!
//! The expression is evaluated with the document's root element as context
//! node. Node-set results yield their first node in document order:
//! - attribute → its value
//! - element → concatenated text of all descendant text nodes
//! - anything else → [`XmlFetchError::UnsupportedNodeKind`]
//!
//! A non-blank namespace prefix is bound to the root element's namespace so
//! that `prefix:name` steps match elements in the default namespace.

use sxd_document::parser;
use sxd_xpath::nodeset::Node;
use sxd_xpath::{Context, Factory, Value};
use tracing::debug;

use xmlfetch_shared::{ExtractedValue, Result, XmlFetchError};

/// Parse `body` as XML and extract the value selected by `expression`.
pub fn extract(body: &str, prefix: Option<&str>, expression: &str) -> Result<ExtractedValue> {
    let package = parser::parse(body)
        .map_err(|e| XmlFetchError::RequestFailed(format!("malformed XML response: {e}")))?;
    let document = package.as_document();

    let root = document
        .root()
        .children()
        .into_iter()
        .find_map(|child| child.element())
        .ok_or_else(|| XmlFetchError::RequestFailed("XML response has no root element".into()))?;

    let mut context = Context::new();
    if let Some(prefix) = prefix {
        let namespace_uri = root.name().namespace_uri().unwrap_or("");
        debug!(prefix, namespace_uri, "binding namespace prefix");
        context.set_namespace(prefix, namespace_uri);
    }

    let xpath = Factory::new()
        .build(expression)
        .map_err(|e| XmlFetchError::XPathEvaluationFailed(format!("{expression}: {e}")))?
        .ok_or_else(|| XmlFetchError::XPathEvaluationFailed("empty XPath expression".into()))?;

    let value = xpath
        .evaluate(&context, root)
        .map_err(|e| XmlFetchError::XPathEvaluationFailed(format!("{expression}: {e}")))?;

    let nodes = match value {
        Value::Nodeset(nodes) => nodes,
        _ => {
            return Err(XmlFetchError::XPathEvaluationFailed(format!(
                "{expression}: expression must evaluate to a node-set"
            )));
        }
    };

    match nodes.document_order_first() {
        None => Ok(None),
        Some(node) => node_value(node).map(Some),
    }
}

/// String value of a matched node, restricted to attributes and elements.
fn node_value(node: Node<'_>) -> Result<String> {
    match node {
        Node::Attribute(attribute) => Ok(attribute.value().to_string()),
        Node::Element(_) => Ok(node.string_value()),
        other => Err(XmlFetchError::UnsupportedNodeKind {
            kind: kind_name(other).to_string(),
        }),
    }
}

fn kind_name(node: Node<'_>) -> &'static str {
    match node {
        Node::Root(_) => "document",
        Node::Element(_) => "element",
        Node::Attribute(_) => "attribute",
        Node::Text(_) => "text",
        Node::Comment(_) => "comment",
        Node::Namespace(_) => "namespace",
        Node::ProcessingInstruction(_) => "processing-instruction",
    }
}
