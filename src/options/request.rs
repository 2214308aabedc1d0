//! Request-level options: per-call behavior flags (synchronous vs spawned
//! dispatch, streaming target, body format, result verbosity).

use crate::errors::FetchError;
use crate::options::{expect_bool, expect_str};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::PathBuf;

/// Keys claimed by the request bucket.
pub(crate) const KEYS: &[&str] = &[
    "sync",
    "stream",
    "body_format",
    "full_result",
    "headers_as_is",
    "socket_opts",
    "receiver",
    "ipv6_host_with_brackets",
];

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RequestOptions {
    /// Wait for the reply (`true`, the default), or spawn the dispatch and
    /// hand back a pending-request handle.
    pub sync: bool,
    /// Stream a 200 response body to this file instead of buffering it.
    pub stream: Option<PathBuf>,
    /// Representation of the response body.
    pub body_format: BodyFormat,
    /// When `false`, the reply carries status and body only.
    pub full_result: bool,
    /// Skip this layer's own normalization of caller-supplied header
    /// names/values (whitespace trimming).
    pub headers_as_is: bool,
    /// Retained opaquely; the runtime exposes no per-request socket hook.
    pub socket_opts: Option<Value>,
    /// Retained opaquely; async replies come through the returned handle.
    pub receiver: Option<Value>,
    /// Retained opaquely; IPv6 bracket handling belongs to the URL layer.
    pub ipv6_host_with_brackets: bool,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum BodyFormat {
    #[default]
    Text,
    Binary,
}

impl Default for RequestOptions {
    fn default() -> Self {
        Self {
            sync: true,
            stream: None,
            body_format: BodyFormat::default(),
            full_result: true,
            headers_as_is: false,
            socket_opts: None,
            receiver: None,
            ipv6_host_with_brackets: false,
        }
    }
}

impl RequestOptions {
    pub(crate) fn set(&mut self, key: &str, value: &Value) -> Result<(), FetchError> {
        match key {
            "sync" => self.sync = expect_bool(key, value)?,
            "stream" => self.stream = Some(PathBuf::from(expect_str(key, value)?)),
            "body_format" => {
                self.body_format = match value.as_str() {
                    Some("text") => BodyFormat::Text,
                    Some("binary") => BodyFormat::Binary,
                    _ => {
                        return Err(FetchError::invalid(key, "expected \"text\" or \"binary\""))
                    }
                };
            }
            "full_result" => self.full_result = expect_bool(key, value)?,
            "headers_as_is" => self.headers_as_is = expect_bool(key, value)?,
            "socket_opts" => self.socket_opts = Some(value.clone()),
            "receiver" => self.receiver = Some(value.clone()),
            "ipv6_host_with_brackets" => {
                self.ipv6_host_with_brackets = expect_bool(key, value)?
            }
            other => return Err(FetchError::invalid(other, "not a request option")),
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn defaults_are_synchronous_full_text() {
        let r = RequestOptions::default();
        assert!(r.sync);
        assert!(r.full_result);
        assert_eq!(r.body_format, BodyFormat::Text);
        assert!(r.stream.is_none());
    }

    #[test]
    fn stream_takes_a_path() {
        let mut r = RequestOptions::default();
        r.set("stream", &json!("/tmp/download.bin")).unwrap();
        assert_eq!(r.stream, Some(PathBuf::from("/tmp/download.bin")));

        let err = r.set("stream", &json!(1)).unwrap_err();
        assert!(matches!(err, FetchError::InvalidOption { ref key, .. } if key == "stream"));
    }

    #[test]
    fn body_format_is_text_or_binary() {
        let mut r = RequestOptions::default();
        r.set("body_format", &json!("binary")).unwrap();
        assert_eq!(r.body_format, BodyFormat::Binary);

        let err = r.set("body_format", &json!("utf16")).unwrap_err();
        assert!(matches!(err, FetchError::InvalidOption { ref key, .. } if key == "body_format"));
    }

    #[test]
    fn opaque_options_are_retained() {
        let mut r = RequestOptions::default();
        r.set("socket_opts", &json!({"nodelay": true})).unwrap();
        r.set("receiver", &json!("inbox")).unwrap();
        r.set("ipv6_host_with_brackets", &json!(true)).unwrap();
        assert!(r.socket_opts.is_some());
        assert!(r.receiver.is_some());
        assert!(r.ipv6_host_with_brackets);
    }
}
