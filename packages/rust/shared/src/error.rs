//! Error types for XmlFetch.
//!
//! Library crates use [`XmlFetchError`] via `thiserror`.
//! The CLI wraps this with `color-eyre` for rich diagnostics.

use std::fmt;
use std::path::PathBuf;

/// Top-level error type for all XmlFetch operations.
///
/// The first five variants are the classified outcomes of a single
/// extraction; every one of them is terminal for that invocation.
#[derive(Debug, thiserror::Error)]
pub enum XmlFetchError {
    /// Destination variable name is blank.
    #[error("invalid variable name: {name:?}")]
    InvalidVariableName { name: String },

    /// Address and query do not combine into a valid absolute URI.
    #[error("invalid URL {url:?}: {reason}")]
    InvalidUrl { url: String, reason: String },

    /// Transport error, non-success status, or a body that is not XML.
    #[error("request failed: {0}")]
    RequestFailed(String),

    /// XPath expression is invalid or its evaluation failed.
    #[error("XPath evaluation failed: {0}")]
    XPathEvaluationFailed(String),

    /// The matched node is neither an attribute nor an element.
    #[error("unsupported node kind: {kind}")]
    UnsupportedNodeKind { kind: String },

    /// Configuration loading or validation error.
    #[error("config error: {message}")]
    Config { message: String },

    /// Filesystem I/O error.
    #[error("I/O error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Convenience alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, XmlFetchError>;

/// Discriminant of [`XmlFetchError`], used to look up user-facing messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    InvalidVariableName,
    InvalidUrl,
    RequestFailed,
    XPathEvaluationFailed,
    UnsupportedNodeKind,
    Config,
    Io,
}

impl ErrorKind {
    /// Stable name of the kind, also the message identifier suffix.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::InvalidVariableName => "InvalidVariableName",
            Self::InvalidUrl => "InvalidUrl",
            Self::RequestFailed => "RequestFailed",
            Self::XPathEvaluationFailed => "XPathEvaluationFailed",
            Self::UnsupportedNodeKind => "UnsupportedNodeKind",
            Self::Config => "Config",
            Self::Io => "Io",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl XmlFetchError {
    /// Create a config error from any displayable message.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }

    /// Create a URL error carrying the attempted URL.
    pub fn invalid_url(url: impl Into<String>, reason: impl fmt::Display) -> Self {
        Self::InvalidUrl {
            url: url.into(),
            reason: reason.to_string(),
        }
    }

    /// Wrap a `std::io::Error` with a path for context.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// The classified kind of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidVariableName { .. } => ErrorKind::InvalidVariableName,
            Self::InvalidUrl { .. } => ErrorKind::InvalidUrl,
            Self::RequestFailed(_) => ErrorKind::RequestFailed,
            Self::XPathEvaluationFailed(_) => ErrorKind::XPathEvaluationFailed,
            Self::UnsupportedNodeKind { .. } => ErrorKind::UnsupportedNodeKind,
            Self::Config { .. } => ErrorKind::Config,
            Self::Io { .. } => ErrorKind::Io,
        }
    }

    /// Raw diagnostic text without the kind prefix, for message templates.
    pub fn detail(&self) -> String {
        match self {
            Self::InvalidVariableName { name } => name.clone(),
            Self::InvalidUrl { url, .. } => url.clone(),
            Self::RequestFailed(msg) | Self::XPathEvaluationFailed(msg) => msg.clone(),
            Self::UnsupportedNodeKind { kind } => kind.clone(),
            Self::Config { message } => message.clone(),
            Self::Io { path, source } => format!("{}: {source}", path.display()),
        }
    }
}
