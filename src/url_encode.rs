//! Percent-encoding of channel names, group names, user IDs, and auth
//! tokens into request paths and query strings.
//!
//! This is the "URL-format" collaborator transaction dispatch calls into
//! (§4.3 step 4): every operation module writes a path and query string
//! through the helpers here rather than hand-rolling escaping.

use percent_encoding::{utf8_percent_encode, AsciiSet, CONTROLS};
use std::fmt::Write as _;

/// Characters that must be escaped in a path segment: the RFC 3986
/// reserved set plus the handful of characters the service's own channel
/// naming rejects outright (comma separates channels in a list, so a
/// channel literally named "," is the one thing that can never appear raw).
const PATH_SEGMENT: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'/')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'`')
    .add(b'{')
    .add(b'}')
    .add(b'[')
    .add(b']')
    .add(b'\\')
    .add(b'^')
    .add(b'|')
    .add(b'+')
    .add(b'&')
    .add(b'=');

/// Percent-encode a single path segment (a channel name, group name, user
/// ID, or auth token). Commas are left unescaped so that callers can pass a
/// pre-joined comma-separated list through unchanged.
pub fn encode_segment(raw: &str) -> String {
    utf8_percent_encode(raw, PATH_SEGMENT).to_string()
}

/// Percent-encode a query parameter value.
pub fn encode_param(raw: &str) -> String {
    utf8_percent_encode(raw, PATH_SEGMENT).to_string()
}

/// Append `&name=value` (URL-encoded) to `out` if `value` is `Some` and
/// non-empty. Mirrors `APPEND_URL_PARAM_M` from the original URL builder.
pub fn append_param(out: &mut String, name: &str, value: Option<&str>) {
    if let Some(v) = value {
        if !v.is_empty() {
            let _ = write!(out, "&{}={}", name, encode_param(v));
        }
    }
}

/// Like [`append_param`] but for values the caller has already encoded (or
/// knows are encoding-safe, e.g. an integer rendered with `itoa`-free
/// `to_string`).
pub fn append_param_raw(out: &mut String, name: &str, value: Option<&str>) {
    if let Some(v) = value {
        if !v.is_empty() {
            let _ = write!(out, "&{}={}", name, v);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encodes_reserved_characters() {
        assert_eq!(encode_segment("a b"), "a%20b");
        assert_eq!(encode_segment("a,b"), "a,b");
        assert_eq!(encode_segment("a/b"), "a%2Fb");
    }

    #[test]
    fn append_param_skips_empty_and_none() {
        let mut s = String::new();
        append_param(&mut s, "auth", None);
        append_param(&mut s, "auth", Some(""));
        append_param(&mut s, "auth", Some("tok en"));
        assert_eq!(s, "&auth=tok%20en");
    }
}
