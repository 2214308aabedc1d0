//! Normalized HTTP response record.
//!
//! This struct represents a **fully buffered** reply as handed back by the
//! dispatch layer. It contains the numeric status, the status line, the
//! response headers in the requested representation, the body (or the
//! saved-to-file sentinel), and the profile the response was issued from.
//!
//! ## Notes
//! - With the default headers format, `headers` keeps the runtime's
//!   `http::HeaderMap`, which is **case-insensitive** for header names.
//!   `headers_format: "binary"` coerces everything to text pairs instead.
//! - `status_line` is composed from the protocol version, status code and
//!   canonical reason phrase, and may name the reason `"Unknown"` for
//!   non-standard codes.

use crate::errors::FetchError;
use crate::profile;
use http::HeaderMap;
use std::path::PathBuf;

/// Response headers in the representation the caller asked for.
#[derive(Debug, Clone)]
pub enum Headers {
    /// The runtime's header map, passed through unchanged.
    Runtime(HeaderMap),
    /// Everything coerced to text pairs.
    Text(Vec<(String, String)>),
}

impl Headers {
    /// Case-insensitive single-header lookup, whatever the representation.
    pub fn get(&self, name: &str) -> Option<String> {
        match self {
            Headers::Runtime(map) => map
                .get(name)
                .map(|v| String::from_utf8_lossy(v.as_bytes()).into_owned()),
            Headers::Text(pairs) => pairs
                .iter()
                .find(|(n, _)| n.eq_ignore_ascii_case(name))
                .map(|(_, v)| v.clone()),
        }
    }

    pub fn is_empty(&self) -> bool {
        match self {
            Headers::Runtime(map) => map.is_empty(),
            Headers::Text(pairs) => pairs.is_empty(),
        }
    }
}

/// Response body, or the marker that it went to disk instead.
#[derive(Debug, Clone, PartialEq)]
pub enum Body {
    Text(String),
    Binary(Vec<u8>),
    /// The body was streamed to this file (`stream` request option).
    SavedToFile(PathBuf),
}

impl Body {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Body::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn is_saved_to_file(&self) -> bool {
        matches!(self, Body::SavedToFile(_))
    }
}

#[derive(Debug, Clone)]
pub struct Response {
    /// Numeric HTTP status code (e.g., `200`, `404`).
    pub status: u16,
    /// Status line, e.g. `"HTTP/1.1 200 OK"`. Empty when `full_result` was
    /// disabled.
    pub status_line: String,
    /// Response headers. Empty when `full_result` was disabled.
    pub headers: Headers,
    pub body: Body,
    /// Profile the response was issued from; `None` for the shared default.
    pub profile: Option<String>,
}

impl Response {
    /// Close the connection profile this response was issued from.
    ///
    /// Responses from the default profile carry no profile name, so closing
    /// them is a no-op.
    pub fn close(&self) -> Result<(), FetchError> {
        profile::close(self.profile.as_deref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::header::HeaderValue;

    #[test]
    fn header_lookup_is_case_insensitive_in_both_representations() {
        let mut map = HeaderMap::new();
        map.insert("x-foo", HeaderValue::from_static("bar"));
        let runtime = Headers::Runtime(map);
        assert_eq!(runtime.get("X-Foo").as_deref(), Some("bar"));

        let text = Headers::Text(vec![("X-Foo".into(), "bar".into())]);
        assert_eq!(text.get("x-foo").as_deref(), Some("bar"));
        assert_eq!(text.get("x-baz"), None);
    }

    #[test]
    fn closing_a_default_profile_response_is_a_noop() {
        let resp = Response {
            status: 200,
            status_line: "HTTP/1.1 200 OK".into(),
            headers: Headers::Text(vec![]),
            body: Body::Text("ok".into()),
            profile: None,
        };
        resp.close().unwrap();
    }
}
