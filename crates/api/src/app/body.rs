//! Bounded JSON request-body reading.
//!
//! An empty body is reported as `None`, which is distinct from `{}`: callers
//! that need an object treat `None` the same as "not an object".

use std::time::Duration;

use axum::{
    async_trait,
    body::Body,
    extract::{FromRequest, Request},
    http::{HeaderMap, header},
};
use http_body_util::BodyExt;
use serde_json::Value;

use crate::app::errors::ApiError;

pub const DEFAULT_MAX_BODY_BYTES: usize = 1_000_000;
pub const DEFAULT_READ_TIMEOUT: Duration = Duration::from_secs(10);

/// Ceilings applied to every request body.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct BodyLimits {
    pub max_bytes: usize,
    pub read_timeout: Duration,
}

impl Default for BodyLimits {
    fn default() -> Self {
        Self {
            max_bytes: DEFAULT_MAX_BODY_BYTES,
            read_timeout: DEFAULT_READ_TIMEOUT,
        }
    }
}

/// Read and parse a request body as JSON.
///
/// Fails with 413 as soon as the declared or accumulated size passes
/// `max_bytes`, with 408 if the whole read takes longer than `read_timeout`,
/// and with 400 when a non-empty body is not JSON.
pub async fn read_json_body(
    body: Body,
    content_length: Option<u64>,
    limits: BodyLimits,
) -> Result<Option<Value>, ApiError> {
    if content_length.is_some_and(|len| len > limits.max_bytes as u64) {
        return Err(ApiError::payload_too_large());
    }

    let raw = tokio::time::timeout(limits.read_timeout, collect_limited(body, limits.max_bytes))
        .await
        .map_err(|_| ApiError::request_timeout())??;

    if raw.is_empty() {
        return Ok(None);
    }

    serde_json::from_slice(&raw).map(Some).map_err(|e| {
        tracing::debug!(error = %e, "request body is not valid JSON");
        ApiError::bad_request("Invalid JSON")
    })
}

async fn collect_limited(mut body: Body, max_bytes: usize) -> Result<Vec<u8>, ApiError> {
    let mut buf = Vec::new();
    while let Some(frame) = body.frame().await {
        let frame = frame.map_err(ApiError::internal)?;
        // Trailers carry no payload.
        if let Ok(data) = frame.into_data() {
            if buf.len() + data.len() > max_bytes {
                return Err(ApiError::payload_too_large());
            }
            buf.extend_from_slice(&data);
        }
    }
    Ok(buf)
}

fn content_length(headers: &HeaderMap) -> Option<u64> {
    headers
        .get(header::CONTENT_LENGTH)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.trim().parse().ok())
}

/// Extractor: the request body as optional JSON, bounded by the
/// [`BodyLimits`] found in request extensions (defaults otherwise).
#[derive(Debug, Clone, PartialEq)]
pub struct JsonBody(pub Option<Value>);

#[async_trait]
impl<S> FromRequest<S> for JsonBody
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, _state: &S) -> Result<Self, Self::Rejection> {
        let limits = req
            .extensions()
            .get::<BodyLimits>()
            .copied()
            .unwrap_or_default();
        let declared = content_length(req.headers());
        read_json_body(req.into_body(), declared, limits)
            .await
            .map(JsonBody)
    }
}
