//! Shared types, error model, and configuration for XmlFetch.
//!
//! This crate is the foundation depended on by all other XmlFetch crates.
//! It provides:
//! - [`XmlFetchError`] — the unified error type and its [`ErrorKind`]
//! - Domain types ([`RequestConfig`], [`FetchResult`], [`VariableStore`])
//! - Configuration ([`AppConfig`], config loading)

pub mod config;
pub mod error;
pub mod types;

// Re-export public API at crate root for ergonomic imports.
pub use config::{
    AppConfig, DefaultsConfig, config_dir, config_file_path, init_config, load_config,
    load_config_from,
};
pub use error::{ErrorKind, Result, XmlFetchError};
pub use types::{
    DEBUG_URL_KEY, ExtractedValue, FetchResult, NODE_TYPE_TAG, RequestConfig, VariableStore,
};
