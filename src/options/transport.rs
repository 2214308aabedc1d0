//! Transport-level options: low-level connection parameters handed to the
//! runtime's client builder (timeouts, TLS, proxy credentials, protocol
//! version).

use crate::errors::FetchError;
use crate::options::{expect_bool, expect_ms};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;

/// Keys claimed by the transport bucket.
pub(crate) const KEYS: &[&str] = &[
    "timeout",
    "connect_timeout",
    "autoredirect",
    "ssl",
    "proxy_auth",
    "version",
    "relaxed",
];

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TransportOptions {
    /// Overall request timeout.
    pub timeout: Option<Duration>,
    /// Connection-establishment timeout.
    pub connect_timeout: Option<Duration>,
    /// Follow redirects automatically. The runtime's default applies when unset.
    pub autoredirect: Option<bool>,
    /// `ssl: {verify: bool}`. `false` disables certificate verification.
    pub tls_verify: Option<bool>,
    /// Basic credentials for the profile proxy.
    pub proxy_auth: Option<(String, String)>,
    /// Preferred protocol version.
    pub version: Option<HttpVersion>,
    /// Relaxed header parsing. Recognized and retained; the runtime has no
    /// switch for it.
    pub relaxed: Option<bool>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HttpVersion {
    Http10,
    Http11,
    Http2,
}

impl TransportOptions {
    pub(crate) fn set(&mut self, key: &str, value: &Value) -> Result<(), FetchError> {
        match key {
            "timeout" => self.timeout = Some(expect_ms(key, value)?),
            "connect_timeout" => self.connect_timeout = Some(expect_ms(key, value)?),
            "autoredirect" => self.autoredirect = Some(expect_bool(key, value)?),
            "ssl" => {
                let map = value
                    .as_object()
                    .ok_or_else(|| FetchError::invalid(key, "expected a map of TLS settings"))?;
                for (k, v) in map {
                    match k.as_str() {
                        "verify" => self.tls_verify = Some(expect_bool("ssl.verify", v)?),
                        other => {
                            return Err(FetchError::invalid(
                                key,
                                format!("unknown TLS setting `{other}`"),
                            ))
                        }
                    }
                }
            }
            "proxy_auth" => {
                let pair = value
                    .as_array()
                    .filter(|a| a.len() == 2)
                    .and_then(|a| Some((a[0].as_str()?, a[1].as_str()?)))
                    .ok_or_else(|| FetchError::invalid(key, "expected a [user, password] pair"))?;
                self.proxy_auth = Some((pair.0.to_string(), pair.1.to_string()));
            }
            "version" => {
                self.version = Some(match value.as_str() {
                    Some("HTTP/1.0") => HttpVersion::Http10,
                    Some("HTTP/1.1") => HttpVersion::Http11,
                    Some("HTTP/2") | Some("HTTP/2.0") => HttpVersion::Http2,
                    _ => {
                        return Err(FetchError::invalid(
                            key,
                            "expected \"HTTP/1.0\", \"HTTP/1.1\" or \"HTTP/2\"",
                        ))
                    }
                });
            }
            "relaxed" => self.relaxed = Some(expect_bool(key, value)?),
            other => return Err(FetchError::invalid(other, "not a transport option")),
        }
        Ok(())
    }

    pub(crate) fn is_default(&self) -> bool {
        *self == Self::default()
    }
}
