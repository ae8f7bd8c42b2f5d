//! Effective request URL construction.
//!
//! The address and the query arrive as separate host parameters; they are
//! merged with exactly one `?` between them and then parsed as an absolute
//! URI.

use url::Url;

use xmlfetch_shared::{Result, XmlFetchError};

/// Merge `address` and `query` into the URL string that will be parsed.
///
/// Trailing `?` on the address and leading `?` on the query are dropped, so
/// `("http://x/a?", "?b=1")` and `("http://x/a", "b=1")` agree.
pub fn merge_query(address: &str, query: &str) -> String {
    let address = address.trim().trim_end_matches('?');
    let query = query.trim().trim_start_matches('?');

    if query.is_empty() {
        address.to_string()
    } else {
        format!("{address}?{query}")
    }
}

/// Build and validate the absolute URL for a request.
pub fn build(address: &str, query: &str) -> Result<Url> {
    let candidate = merge_query(address, query);

    let url = Url::parse(&candidate).map_err(|e| XmlFetchError::invalid_url(&candidate, e))?;

    // Rejects `mailto:`-style URIs that parse but cannot be fetched.
    if url.cannot_be_a_base() || !url.has_host() {
        return Err(XmlFetchError::invalid_url(
            &candidate,
            "not an absolute hierarchical URI",
        ));
    }

    Ok(url)
}
