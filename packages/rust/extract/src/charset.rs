//! Character decoding of response bodies.
//!
//! The encoding comes from the byte-order mark, then the `charset` parameter
//! of the `Content-Type` header, then the `encoding` pseudo-attribute of the
//! XML declaration. Without any of them the body is read as UTF-8.

use encoding_rs::{Encoding, UTF_8};

use xmlfetch_shared::{Result, XmlFetchError};

/// How far into the body the XML declaration is looked for.
const DECLARATION_WINDOW: usize = 1024;

/// Decode a response body to text.
///
/// An unknown encoding label or bytes that are invalid in the chosen
/// encoding fail as [`XmlFetchError::RequestFailed`].
pub fn decode(body: &[u8], content_type: Option<&str>) -> Result<String> {
    let (encoding, bom_len) = match Encoding::for_bom(body) {
        Some(found) => found,
        None => (sniff(body, content_type)?, 0),
    };

    let (text, had_errors) = encoding.decode_without_bom_handling(&body[bom_len..]);
    if had_errors {
        return Err(XmlFetchError::RequestFailed(format!(
            "body is not valid {}",
            encoding.name()
        )));
    }
    Ok(text.into_owned())
}

fn sniff(body: &[u8], content_type: Option<&str>) -> Result<&'static Encoding> {
    if let Some(label) = content_type.and_then(header_charset) {
        return lookup(label);
    }
    match declared_encoding(body) {
        // The declaration was readable as ASCII, so UTF-16 labels mean UTF-8.
        Some(label) => lookup(label).map(Encoding::output_encoding),
        None => Ok(UTF_8),
    }
}

fn lookup(label: &str) -> Result<&'static Encoding> {
    Encoding::for_label(label.as_bytes()).ok_or_else(|| {
        XmlFetchError::RequestFailed(format!("unknown character encoding {label:?}"))
    })
}

/// `charset` parameter of a `Content-Type` value.
fn header_charset(content_type: &str) -> Option<&str> {
    content_type
        .split(';')
        .skip(1)
        .find_map(|param| {
            let (name, value) = param.split_once('=')?;
            name.trim()
                .eq_ignore_ascii_case("charset")
                .then(|| value.trim().trim_matches('"'))
        })
        .filter(|label| !label.is_empty())
}

/// `encoding` pseudo-attribute of a leading `<?xml ...?>` declaration.
fn declared_encoding(body: &[u8]) -> Option<&str> {
    let head = &body[..body.len().min(DECLARATION_WINDOW)];
    if !head.starts_with(b"<?xml") {
        return None;
    }
    let end = head.windows(2).position(|w| w == b"?>")?;
    let declaration = std::str::from_utf8(&head[..end]).ok()?;

    let after = &declaration[declaration.find("encoding")? + "encoding".len()..];
    let value = after.trim_start().strip_prefix('=')?.trim_start();
    let quote = value.chars().next().filter(|c| *c == '"' || *c == '\'')?;
    let value = &value[1..];
    Some(&value[..value.find(quote)?])
}
