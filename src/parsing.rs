//! Query string helpers for HTTP servers without a router.
//!
//! The axum server extracts `?code=` with its own `Query` extractor. The
//! ESP32 server only sees the raw URI, so it uses these functions instead.
//! Everything here is `no_std` and allocation-free.
//!
//! # Example
//!
//! ```rust
//! use rs_sentinel::parsing::{query_param, query_path};
//!
//! let uri = "/alarm?code=43%2021&x=1";
//! assert_eq!(query_path(uri), "/alarm");
//! assert_eq!(query_param(uri, "code").unwrap().as_deref(), Some("43 21"));
//! assert_eq!(query_param(uri, "missing").unwrap(), None);
//! ```

use heapless::{String, Vec};

/// Longest decoded parameter value accepted.
pub const MAX_QUERY_VALUE: usize = 64;

/// A decoded query parameter value.
pub type QueryValue = String<MAX_QUERY_VALUE>;

/// Why a parameter value could not be decoded.
#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
pub enum QueryError {
    /// The decoded value exceeds [`MAX_QUERY_VALUE`] bytes.
    #[error("query value longer than {} bytes", MAX_QUERY_VALUE)]
    TooLong,
    /// The decoded bytes are not UTF-8.
    #[error("query value is not valid UTF-8")]
    InvalidUtf8,
}

/// The path part of `uri`, without query or fragment.
pub fn query_path(uri: &str) -> &str {
    let end = uri.find(|c: char| c == '?' || c == '#').unwrap_or(uri.len());
    &uri[..end]
}

/// The query part of `uri`, without `?` or fragment. Empty if absent.
pub fn query_string(uri: &str) -> &str {
    let Some(start) = uri.find('?') else {
        return "";
    };
    let rest = &uri[start + 1..];
    let end = rest.find('#').unwrap_or(rest.len());
    &rest[..end]
}

/// The undecoded value of the first `key` parameter in `uri`.
///
/// A key with no `=` yields an empty value.
pub fn raw_query_param<'a>(uri: &'a str, key: &str) -> Option<&'a str> {
    query_string(uri)
        .split('&')
        .filter(|pair| !pair.is_empty())
        .find_map(|pair| {
            let (k, v) = pair.split_once('=').unwrap_or((pair, ""));
            (k == key).then_some(v)
        })
}

/// Decode `application/x-www-form-urlencoded` text.
///
/// `+` becomes a space and `%XX` becomes the byte it names. A `%` not
/// followed by two hex digits is kept as-is.
pub fn percent_decode(raw: &str) -> Result<QueryValue, QueryError> {
    let bytes = raw.as_bytes();
    let mut out: Vec<u8, MAX_QUERY_VALUE> = Vec::new();
    let mut i = 0;

    while i < bytes.len() {
        let byte = match bytes[i] {
            b'+' => b' ',
            b'%' => match (bytes.get(i + 1), bytes.get(i + 2)) {
                (Some(&hi), Some(&lo)) => match (hex_digit(hi), hex_digit(lo)) {
                    (Some(hi), Some(lo)) => {
                        i += 2;
                        hi << 4 | lo
                    }
                    _ => b'%',
                },
                _ => b'%',
            },
            other => other,
        };
        out.push(byte).map_err(|_| QueryError::TooLong)?;
        i += 1;
    }

    String::from_utf8(out).map_err(|_| QueryError::InvalidUtf8)
}

/// The decoded value of the first `key` parameter in `uri`.
///
/// `Ok(None)` if the key is absent.
pub fn query_param(uri: &str, key: &str) -> Result<Option<QueryValue>, QueryError> {
    raw_query_param(uri, key).map(percent_decode).transpose()
}

fn hex_digit(b: u8) -> Option<u8> {
    match b {
        b'0'..=b'9' => Some(b - b'0'),
        b'a'..=b'f' => Some(b - b'a' + 10),
        b'A'..=b'F' => Some(b - b'A' + 10),
        _ => None,
    }
}
