//! Dynamic option surface and classification.
//!
//! Callers hand every entry point a flat, ordered list of named options
//! ([`Opts`]). Classification partitions that list into four buckets by key
//! membership against fixed allow-lists: builder-level options (headers,
//! query params, body, ...), transport options, request options, and
//! connection-profile options. Each bucket parses into a struct of named
//! optional fields, validated here, before any network activity. Whatever is
//! left over after classification fails the whole call with
//! [`FetchError::UnknownOptions`] naming the offending keys.

pub mod profile;
pub mod request;
pub mod transport;

pub use profile::{IpFamily, ProfileOptions};
pub use request::{BodyFormat, RequestOptions};
pub use transport::{HttpVersion, TransportOptions};

use crate::errors::FetchError;
use serde_json::Value;
use std::time::Duration;

/// Ordered list of named options as supplied by the caller.
///
/// Values are [`serde_json::Value`], so option lists are usually written with
/// the `json!` macro:
///
/// ```
/// use serde_json::json;
/// let opts: fetchkit::Opts = vec![
///     ("timeout".into(), json!(5000)),
///     ("headers".into(), json!({"Accept": "application/json"})),
/// ];
/// ```
pub type Opts = Vec<(String, Value)>;

/// How response headers are represented on the [`Response`](crate::Response).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum HeadersFormat {
    /// Pass through whatever representation the runtime returned.
    #[default]
    Runtime,
    /// Coerce all header names and values to text pairs.
    Binary,
}

/// Builder-level options, consumed by the request builder itself.
#[derive(Debug, Default)]
pub(crate) struct BuilderOpts {
    pub headers: Option<Value>,
    pub query_params: Option<Value>,
    pub body: Option<Value>,
    pub params: Option<Value>,
    pub headers_format: HeadersFormat,
    pub profile: Option<String>,
    pub debug: bool,
}

#[derive(Debug, Default)]
pub(crate) struct Classified {
    pub builder: BuilderOpts,
    pub transport: TransportOptions,
    pub request: RequestOptions,
    pub profile: ProfileOptions,
}

/// Partition a flat option list into the four buckets.
///
/// Keys are claimed in this order: builder-level keys, then the transport,
/// request, and profile allow-lists. Anything unclaimed is an error naming
/// every leftover key.
pub(crate) fn classify(opts: Opts) -> Result<Classified, FetchError> {
    let mut out = Classified::default();
    let mut unknown = Vec::new();

    for (key, value) in opts {
        match key.as_str() {
            "headers" => out.builder.headers = Some(value),
            "query_params" => out.builder.query_params = Some(value),
            "body" => out.builder.body = Some(value),
            "params" => out.builder.params = Some(value),
            "headers_format" => out.builder.headers_format = parse_headers_format(&value)?,
            "profile" => out.builder.profile = Some(expect_str("profile", &value)?),
            "debug" => out.builder.debug = expect_bool("debug", &value)?,
            k if transport::KEYS.contains(&k) => out.transport.set(k, &value)?,
            k if request::KEYS.contains(&k) => out.request.set(k, &value)?,
            k if profile::KEYS.contains(&k) => out.profile.set(k, &value)?,
            _ => unknown.push(key),
        }
    }

    if !unknown.is_empty() {
        return Err(FetchError::UnknownOptions(unknown));
    }
    Ok(out)
}

fn parse_headers_format(value: &Value) -> Result<HeadersFormat, FetchError> {
    match value.as_str() {
        Some("binary") => Ok(HeadersFormat::Binary),
        Some("default") => Ok(HeadersFormat::Runtime),
        _ => Err(FetchError::invalid(
            "headers_format",
            "expected \"binary\" or \"default\"",
        )),
    }
}

// ---------- Value helpers ----------

pub(crate) fn expect_bool(key: &str, value: &Value) -> Result<bool, FetchError> {
    value
        .as_bool()
        .ok_or_else(|| FetchError::invalid(key, "expected a boolean"))
}

pub(crate) fn expect_u64(key: &str, value: &Value) -> Result<u64, FetchError> {
    value
        .as_u64()
        .ok_or_else(|| FetchError::invalid(key, "expected a non-negative integer"))
}

pub(crate) fn expect_str(key: &str, value: &Value) -> Result<String, FetchError> {
    value
        .as_str()
        .map(str::to_string)
        .ok_or_else(|| FetchError::invalid(key, "expected a string"))
}

/// Integer milliseconds, as the runtime's timeout options take them.
pub(crate) fn expect_ms(key: &str, value: &Value) -> Result<Duration, FetchError> {
    Ok(Duration::from_millis(expect_u64(key, value)?))
}

pub(crate) fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// A mapping or an ordered list of `[name, value]` pairs, as text pairs in
/// input order. Mapping iteration order is insertion order (serde_json's
/// `preserve_order` feature), so both shapes keep caller order.
pub(crate) fn expect_pairs(key: &str, value: &Value) -> Result<Vec<(String, String)>, FetchError> {
    match value {
        Value::Object(map) => map
            .iter()
            .map(|(k, v)| {
                scalar_to_string(v)
                    .map(|s| (k.clone(), s))
                    .ok_or_else(|| FetchError::invalid(key, format!("value for `{k}` is not a scalar")))
            })
            .collect(),
        Value::Array(items) => items
            .iter()
            .map(|item| match item.as_array() {
                Some(pair) if pair.len() == 2 => {
                    let name = scalar_to_string(&pair[0])
                        .ok_or_else(|| FetchError::invalid(key, "pair name is not a scalar"))?;
                    let val = scalar_to_string(&pair[1])
                        .ok_or_else(|| FetchError::invalid(key, "pair value is not a scalar"))?;
                    Ok((name, val))
                }
                _ => Err(FetchError::invalid(key, "expected [name, value] pairs")),
            })
            .collect(),
        _ => Err(FetchError::invalid(key, "expected a map or a list of pairs")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn unknown_options_name_every_leftover_key() {
        let err = classify(vec![
            ("timeout".into(), json!(1000)),
            ("foo".into(), json!(1)),
            ("bar".into(), json!("x")),
        ])
        .unwrap_err();

        match err {
            FetchError::UnknownOptions(keys) => {
                assert_eq!(keys, vec!["foo".to_string(), "bar".to_string()]);
            }
            other => panic!("expected UnknownOptions, got {other:?}"),
        }
    }

    #[test]
    fn keys_partition_into_their_buckets() {
        let c = classify(vec![
            ("timeout".into(), json!(5000)),
            ("sync".into(), json!(false)),
            ("proxy".into(), json!("http://proxy.local:3128")),
            ("profile".into(), json!("scraper")),
            ("debug".into(), json!(true)),
        ])
        .unwrap();

        assert_eq!(c.transport.timeout, Some(Duration::from_secs(5)));
        assert!(!c.request.sync);
        assert_eq!(c.profile.proxy.as_deref(), Some("http://proxy.local:3128"));
        assert_eq!(c.builder.profile.as_deref(), Some("scraper"));
        assert!(c.builder.debug);
    }

    #[test]
    fn debug_must_be_a_boolean() {
        let err = classify(vec![("debug".into(), json!("yes"))]).unwrap_err();
        assert!(matches!(err, FetchError::InvalidOption { ref key, .. } if key == "debug"));
    }

    #[test]
    fn headers_format_accepts_binary_and_default_only() {
        let c = classify(vec![("headers_format".into(), json!("binary"))]).unwrap();
        assert_eq!(c.builder.headers_format, HeadersFormat::Binary);

        let c = classify(vec![("headers_format".into(), json!("default"))]).unwrap();
        assert_eq!(c.builder.headers_format, HeadersFormat::Runtime);

        let err = classify(vec![("headers_format".into(), json!("latin1"))]).unwrap_err();
        assert!(matches!(err, FetchError::InvalidOption { ref key, .. } if key == "headers_format"));
    }

    #[test]
    fn typed_option_structs_round_trip_through_serde() {
        let classified = classify(vec![
            ("timeout".into(), json!(250)),
            ("version".into(), json!("HTTP/2")),
            ("max_sessions".into(), json!(4)),
        ])
        .unwrap();

        let encoded = serde_json::to_string(&classified.transport).unwrap();
        let decoded: TransportOptions = serde_json::from_str(&encoded).unwrap();
        assert_eq!(decoded, classified.transport);

        let encoded = serde_json::to_string(&classified.profile).unwrap();
        let decoded: ProfileOptions = serde_json::from_str(&encoded).unwrap();
        assert_eq!(decoded, classified.profile);

        // partial maps fall back to the documented defaults
        let partial: RequestOptions = serde_json::from_value(json!({"sync": false})).unwrap();
        assert!(!partial.sync);
        assert!(partial.full_result);
        assert_eq!(partial.body_format, BodyFormat::Text);
    }

    #[test]
    fn pairs_accept_maps_and_pair_lists_in_order() {
        let from_map = expect_pairs("query_params", &json!({"a": 1, "b": 2})).unwrap();
        assert_eq!(from_map, vec![("a".into(), "1".into()), ("b".into(), "2".into())]);

        let from_list = expect_pairs("query_params", &json!([["b", 2], ["a", 1]])).unwrap();
        assert_eq!(from_list, vec![("b".into(), "2".into()), ("a".into(), "1".into())]);

        let err = expect_pairs("query_params", &json!("a=1")).unwrap_err();
        assert!(matches!(err, FetchError::InvalidOption { .. }));
    }
}
