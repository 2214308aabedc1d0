//! Dispatch: resolve the profile, apply options, send through the runtime,
//! and normalize the reply.

use crate::errors::FetchError;
use crate::options::{BodyFormat, HeadersFormat, Opts};
use crate::profile::{self, Profile};
use crate::request::{build, RequestSpec};
use crate::response::{Body, Headers, Response};
use futures::TryStreamExt;
use http::header::{HeaderName, HeaderValue, CONTENT_TYPE};
use http::{Method, StatusCode};
use std::sync::Arc;
use uuid::Uuid;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct RequestId(Uuid);

impl RequestId {
    fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

/// Outcome of an entry point: either a finished [`Response`], or a handle to
/// a dispatch that was spawned because `sync: false` was requested.
#[derive(Debug)]
pub enum Reply {
    Completed(Response),
    Pending(PendingRequest),
}

impl Reply {
    /// The response, awaiting the spawned dispatch first if there is one.
    pub async fn resolve(self) -> Result<Response, FetchError> {
        match self {
            Reply::Completed(resp) => Ok(resp),
            Reply::Pending(pending) => pending.wait().await,
        }
    }
}

/// Handle to a dispatch running on the runtime (`sync: false`).
#[derive(Debug)]
pub struct PendingRequest {
    id: RequestId,
    profile: Option<String>,
    handle: tokio::task::JoinHandle<Result<Response, FetchError>>,
}

impl PendingRequest {
    pub fn id(&self) -> RequestId {
        self.id
    }

    /// Profile the request was issued on, `None` for the default.
    pub fn profile(&self) -> Option<&str> {
        self.profile.as_deref()
    }

    pub async fn wait(self) -> Result<Response, FetchError> {
        self.handle
            .await
            .map_err(|e| FetchError::Internal(format!("dispatch task failed: {e}")))?
    }
}

/// Issue a request with an arbitrary method.
pub async fn request(method: Method, url: &str, opts: Opts) -> Result<Reply, FetchError> {
    let spec = build(method, url, opts)?;

    if spec.debug {
        log::debug!(target: "fetchkit::wire", "built request: {spec:#?}");
    }

    let prof = match &spec.profile {
        Some(name) => profile::manager().ensure_started(name)?,
        None => profile::manager().default_profile()?,
    };
    prof.apply(&spec.profile_options, &spec.transport)?;

    if spec.request.sync {
        dispatch(prof, spec).await.map(Reply::Completed)
    } else {
        let id = RequestId::new();
        let profile_name = spec.profile.clone();
        let handle = tokio::spawn(dispatch(prof, spec));
        Ok(Reply::Pending(PendingRequest {
            id,
            profile: profile_name,
            handle,
        }))
    }
}

pub async fn get(url: &str, opts: Opts) -> Result<Reply, FetchError> {
    request(Method::GET, url, opts).await
}

pub async fn head(url: &str, opts: Opts) -> Result<Reply, FetchError> {
    request(Method::HEAD, url, opts).await
}

pub async fn post(url: &str, opts: Opts) -> Result<Reply, FetchError> {
    request(Method::POST, url, opts).await
}

pub async fn put(url: &str, opts: Opts) -> Result<Reply, FetchError> {
    request(Method::PUT, url, opts).await
}

pub async fn delete(url: &str, opts: Opts) -> Result<Reply, FetchError> {
    request(Method::DELETE, url, opts).await
}

pub async fn options(url: &str, opts: Opts) -> Result<Reply, FetchError> {
    request(Method::OPTIONS, url, opts).await
}

pub async fn patch(url: &str, opts: Opts) -> Result<Reply, FetchError> {
    request(Method::PATCH, url, opts).await
}

pub async fn trace(url: &str, opts: Opts) -> Result<Reply, FetchError> {
    request(Method::TRACE, url, opts).await
}

async fn dispatch(prof: Arc<Profile>, spec: RequestSpec) -> Result<Response, FetchError> {
    let client = prof.client();

    if prof.verbose() || spec.debug {
        log::debug!(target: "fetchkit::wire", "{} {} via profile `{}`", spec.method, spec.url, prof.name());
    }

    let mut rb = client.request(spec.method.clone(), spec.url.clone());
    for (name, value) in &spec.headers {
        let name = HeaderName::from_bytes(name.as_bytes())
            .map_err(|e| FetchError::invalid("headers", format!("bad header name `{name}`: {e}")))?;
        let value = HeaderValue::from_str(value)
            .map_err(|e| FetchError::invalid("headers", format!("bad value for `{name}`: {e}")))?;
        rb = rb.header(name, value);
    }
    if let Some(ct) = &spec.content_type {
        let value = HeaderValue::from_str(ct)
            .map_err(|e| FetchError::invalid("headers", format!("bad content type: {e}")))?;
        rb = rb.header(CONTENT_TYPE, value);
    }
    if let Some(body) = spec.body.clone() {
        rb = rb.body(body);
    }
    if let Some(timeout) = spec.transport.timeout {
        rb = rb.timeout(timeout);
    }

    let resp = rb.send().await?;

    let status = resp.status().as_u16();
    let reason = resp.status().canonical_reason().unwrap_or("Unknown");
    let status_line = format!("{:?} {} {}", resp.version(), status, reason);
    let header_map = resp.headers().clone();

    let body = read_body(resp, &spec).await?;

    if spec.debug {
        log::debug!(target: "fetchkit::wire", "reply: {status_line}; headers: {header_map:?}; body: {body:?}");
    }

    let (status_line, headers) = if spec.request.full_result {
        let headers = match spec.headers_format {
            HeadersFormat::Binary => Headers::Text(text_pairs(&header_map)),
            HeadersFormat::Runtime => Headers::Runtime(header_map),
        };
        (status_line, headers)
    } else {
        (String::new(), Headers::Text(Vec::new()))
    };

    Ok(Response {
        status,
        status_line,
        headers,
        body,
        profile: spec.profile.clone(),
    })
}

async fn read_body(resp: reqwest::Response, spec: &RequestSpec) -> Result<Body, FetchError> {
    // Only a 200 body is streamed to disk; anything else comes back inline.
    if let Some(path) = &spec.request.stream {
        if resp.status() == StatusCode::OK {
            let stream = resp.bytes_stream().map_err(std::io::Error::other);
            let mut reader = tokio_util::io::StreamReader::new(Box::pin(stream));
            let mut file = tokio::fs::File::create(path)
                .await
                .map_err(FetchError::Stream)?;
            tokio::io::copy(&mut reader, &mut file)
                .await
                .map_err(FetchError::Stream)?;
            return Ok(Body::SavedToFile(path.clone()));
        }
    }

    let bytes = resp.bytes().await?;
    Ok(match spec.request.body_format {
        BodyFormat::Binary => Body::Binary(bytes.to_vec()),
        BodyFormat::Text => Body::Text(String::from_utf8_lossy(&bytes).into_owned()),
    })
}

fn text_pairs(headers: &http::HeaderMap) -> Vec<(String, String)> {
    headers
        .iter()
        .map(|(name, value)| {
            (
                name.as_str().to_string(),
                String::from_utf8_lossy(value.as_bytes()).into_owned(),
            )
        })
        .collect()
}
