//! Buffered responses and the API error envelope.

use bytes::Bytes;
use reqwest::header::HeaderMap;
use reqwest::{Method, StatusCode};
use serde::Deserialize;
use url::Url;

/// A fully buffered HTTP response, kept alongside every outcome that
/// reached the server so callers can inspect status and headers.
#[derive(Debug, Clone)]
pub struct RawResponse {
    pub status: StatusCode,
    /// Method of the request that produced this response.
    pub method: Method,
    /// Final URL, after any redirects.
    pub url: Url,
    pub headers: HeaderMap,
    pub body: Bytes,
}

impl RawResponse {
    /// True when the body holds nothing but whitespace.
    pub fn is_empty(&self) -> bool {
        self.body.iter().all(u8::is_ascii_whitespace)
    }
}

/// A decoded value together with the response it came from.
#[derive(Debug, Clone)]
pub struct Response<T> {
    pub value: T,
    pub raw: RawResponse,
}

impl<T> Response<T> {
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Response<U> {
        Response {
            value: f(self.value),
            raw: self.raw,
        }
    }

    pub fn into_inner(self) -> T {
        self.value
    }

    pub fn status(&self) -> StatusCode {
        self.raw.status
    }
}

/// Wire shape of the body Nucleus returns with non-2xx statuses.
#[derive(Debug, Default, Deserialize)]
pub(crate) struct Envelope {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub code: i64,
    #[serde(default)]
    pub message: String,
}

/// An error reported by the API: a non-2xx status with a decodable envelope.
#[derive(Debug, Clone, thiserror::Error)]
#[error(
    "{} {} {}: {} {} - {}",
    .response.status.as_u16(),
    .response.method,
    .response.url,
    .success,
    .code,
    .message
)]
pub struct ErrorResponse {
    pub response: RawResponse,
    pub success: bool,
    pub code: i64,
    pub message: String,
}

impl ErrorResponse {
    pub(crate) fn new(response: RawResponse, envelope: Envelope) -> Self {
        Self {
            response,
            success: envelope.success,
            code: envelope.code,
            message: envelope.message,
        }
    }

    pub fn status(&self) -> StatusCode {
        self.response.status
    }
}
