//! Connection-profile options: settings applied to a named profile's client
//! before dispatch (proxy, pool limits, cookies, local binding, verbosity).

use crate::errors::FetchError;
use crate::options::{expect_bool, expect_ms, expect_str, expect_u64};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::net::IpAddr;
use std::path::PathBuf;
use std::time::Duration;

/// Keys claimed by the profile bucket.
pub(crate) const KEYS: &[&str] = &[
    "proxy",
    "max_sessions",
    "keep_alive_timeout",
    "max_pipeline_length",
    "pipeline_timeout",
    "cookies",
    "ip_family",
    "ip",
    "port",
    "verbose",
    "unix_socket",
];

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProfileOptions {
    /// Proxy URL for every request through the profile.
    pub proxy: Option<String>,
    /// Maximum idle connections kept per host.
    pub max_sessions: Option<usize>,
    /// How long idle connections are kept alive.
    pub keep_alive_timeout: Option<Duration>,
    /// Retained; the runtime does not pipeline.
    pub max_pipeline_length: Option<u64>,
    /// Retained; the runtime does not pipeline.
    pub pipeline_timeout: Option<Duration>,
    /// Enable the profile's cookie store.
    pub cookies: Option<bool>,
    /// Retained; address family selection is the resolver's business.
    pub ip_family: Option<IpFamily>,
    /// Local address to bind outgoing connections to.
    pub ip: Option<IpAddr>,
    /// Retained; the runtime picks ephemeral local ports.
    pub port: Option<u16>,
    /// Log every dispatch through the profile at debug level.
    pub verbose: Option<bool>,
    /// Retained; the runtime speaks TCP only.
    pub unix_socket: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum IpFamily {
    Inet,
    Inet6,
}

impl ProfileOptions {
    pub(crate) fn set(&mut self, key: &str, value: &Value) -> Result<(), FetchError> {
        match key {
            "proxy" => self.proxy = Some(expect_str(key, value)?),
            "max_sessions" => {
                let n = expect_u64(key, value)?;
                self.max_sessions = Some(
                    usize::try_from(n)
                        .map_err(|_| FetchError::invalid(key, "value out of range"))?,
                );
            }
            "keep_alive_timeout" => self.keep_alive_timeout = Some(expect_ms(key, value)?),
            "max_pipeline_length" => self.max_pipeline_length = Some(expect_u64(key, value)?),
            "pipeline_timeout" => self.pipeline_timeout = Some(expect_ms(key, value)?),
            "cookies" => self.cookies = Some(expect_bool(key, value)?),
            "ip_family" => {
                self.ip_family = Some(match value.as_str() {
                    Some("inet") => IpFamily::Inet,
                    Some("inet6") => IpFamily::Inet6,
                    _ => return Err(FetchError::invalid(key, "expected \"inet\" or \"inet6\"")),
                });
            }
            "ip" => {
                let addr = expect_str(key, value)?;
                self.ip = Some(
                    addr.parse::<IpAddr>()
                        .map_err(|e| FetchError::invalid(key, e.to_string()))?,
                );
            }
            "port" => {
                let port = expect_u64(key, value)?;
                self.port = Some(
                    u16::try_from(port)
                        .map_err(|_| FetchError::invalid(key, "port out of range"))?,
                );
            }
            "verbose" => self.verbose = Some(expect_bool(key, value)?),
            "unix_socket" => self.unix_socket = Some(PathBuf::from(expect_str(key, value)?)),
            other => return Err(FetchError::invalid(other, "not a profile option")),
        }
        Ok(())
    }

    pub(crate) fn is_default(&self) -> bool {
        *self == Self::default()
    }
}
