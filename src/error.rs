//! Error type shared by the whole client.

use crate::context::Cancellation;
use crate::response::{ErrorResponse, RawResponse};

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The client is misconfigured (bad base URL, missing key, ...).
    #[error("configuration error: {0}")]
    Config(String),

    /// The request body could not be serialized.
    #[error("failed to encode request body")]
    Encode(#[source] serde_json::Error),

    /// The relative path could not be resolved against the base URL.
    #[error("failed to resolve request URL: {0}")]
    Url(#[from] url::ParseError),

    /// An identifier cannot be used as a URL path segment.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Connection, DNS, TLS or other transport failure.
    #[error("HTTP transport error")]
    Transport(#[source] reqwest::Error),

    /// The request's [`Context`](crate::Context) ended first. `response` is
    /// set when status and headers had already arrived.
    #[error("{reason}")]
    Context {
        reason: Cancellation,
        response: Option<Box<RawResponse>>,
    },

    /// The response arrived but its body could not be read.
    #[error("failed to read response body")]
    Body {
        #[source]
        source: reqwest::Error,
        response: Box<RawResponse>,
    },

    /// The response body did not match the expected shape.
    #[error("failed to decode response body")]
    Decode {
        #[source]
        source: serde_json::Error,
        response: Box<RawResponse>,
    },

    /// The API answered with a non-2xx status.
    #[error(transparent)]
    Api(Box<ErrorResponse>),
}

impl Error {
    /// The response that came with this error, if the request reached the
    /// server.
    pub fn response(&self) -> Option<&RawResponse> {
        match self {
            Self::Body { response, .. } | Self::Decode { response, .. } => Some(response),
            Self::Context { response, .. } => response.as_deref(),
            Self::Api(err) => Some(&err.response),
            _ => None,
        }
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Context { .. })
    }
}

impl From<Cancellation> for Error {
    fn from(reason: Cancellation) -> Self {
        Self::Context {
            reason,
            response: None,
        }
    }
}
