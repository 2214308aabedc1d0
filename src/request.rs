//! Request builder: turns `(method, url, options)` into a normalized
//! [`RequestSpec`] or fails before any network activity.

use crate::errors::FetchError;
use crate::options::{self, HeadersFormat, Opts, ProfileOptions, RequestOptions, TransportOptions};
use http::Method;
use url::Url;

/// Normalized request description, ready for dispatch.
#[derive(Debug)]
pub struct RequestSpec {
    pub method: Method,
    /// Target URL, query-string augmented when `query_params` was given.
    pub url: Url,
    /// Ordered request headers, minus any `Content-Type` entry.
    pub headers: Vec<(String, String)>,
    /// Content type pulled out of the header set (or implied by `params`).
    pub content_type: Option<String>,
    /// Raw body bytes. Populated from exactly one of the explicit `body`
    /// option or the form-encoded `params` option.
    pub body: Option<Vec<u8>>,
    pub transport: TransportOptions,
    pub request: RequestOptions,
    /// Named connection profile, or the shared default when `None`.
    pub profile: Option<String>,
    pub profile_options: ProfileOptions,
    pub headers_format: HeadersFormat,
    pub debug: bool,
}

/// Build a [`RequestSpec`] from a flat option list.
///
/// Fails on an unparsable URL, an unrecognized option key, or a recognized
/// key with a bad value. See the module docs on [`crate::options`] for the
/// buckets.
pub fn build(method: Method, url: &str, opts: Opts) -> Result<RequestSpec, FetchError> {
    let mut url = Url::parse(url)?;
    let classified = options::classify(opts)?;

    if let Some(qp) = &classified.builder.query_params {
        let pairs = options::expect_pairs("query_params", qp)?;
        let mut query = url.query_pairs_mut();
        for (name, value) in &pairs {
            query.append_pair(name, value);
        }
    }

    let mut headers = Vec::new();
    let mut content_type = None;
    if let Some(h) = &classified.builder.headers {
        for (name, value) in options::expect_pairs("headers", h)? {
            let (name, value) = if classified.request.headers_as_is {
                (name, value)
            } else {
                (name.trim().to_string(), value.trim().to_string())
            };
            if name.eq_ignore_ascii_case("content-type") {
                content_type = Some(value);
            } else {
                headers.push((name, value));
            }
        }
    }

    // Explicit body wins over encoded params.
    let body = if let Some(b) = &classified.builder.body {
        Some(options::expect_str("body", b)?.into_bytes())
    } else if let Some(p) = &classified.builder.params {
        let pairs = options::expect_pairs("params", p)?;
        let mut encoded = url::form_urlencoded::Serializer::new(String::new());
        for (name, value) in &pairs {
            encoded.append_pair(name, value);
        }
        if content_type.is_none() {
            content_type = Some("application/x-www-form-urlencoded".to_string());
        }
        Some(encoded.finish().into_bytes())
    } else {
        None
    };

    Ok(RequestSpec {
        method,
        url,
        headers,
        content_type,
        body,
        transport: classified.transport,
        request: classified.request,
        profile: classified.builder.profile,
        profile_options: classified.profile,
        headers_format: classified.builder.headers_format,
        debug: classified.builder.debug,
    })
}
