use crate::error::{Error, Result};
use crate::transport::basic::BasicClient;
use crate::transport::client::HttpClient;
use async_trait::async_trait;
use reqwest::Request;
use reqwest::header::{HeaderName, HeaderValue};
use std::fmt;

/// Header carrying the Nucleus API key.
pub const API_KEY_HEADER: HeaderName = HeaderName::from_static("x-apikey");

/// An [`HttpClient`] wrapper that authenticates every request with the
/// `x-apikey` header.
///
/// The request handed to the inner transport is a new value with its own
/// header map; the caller's request is never modified. The key is stored as
/// a sensitive header value so it does not show up in `Debug` output.
pub struct ApiKey<C = BasicClient> {
    inner: C,
    key: HeaderValue,
}

impl ApiKey<BasicClient> {
    /// Wraps a fresh [`BasicClient`].
    pub fn new(key: &str) -> Result<Self> {
        Self::with_transport(BasicClient::new(), key)
    }
}

impl<C> ApiKey<C> {
    /// Wraps `inner`, which performs the actual network I/O.
    pub fn with_transport(inner: C, key: &str) -> Result<Self> {
        if key.is_empty() {
            return Err(Error::Config("API key must not be empty".to_string()));
        }
        let mut key = HeaderValue::from_str(key)
            .map_err(|_| Error::Config("API key is not a valid header value".to_string()))?;
        key.set_sensitive(true);
        Ok(Self { inner, key })
    }

    /// Returns a copy of `req` carrying the API key header.
    ///
    /// Method, URL, version, timeout and a freshly cloned header map are
    /// copied over. A buffered body is copied too; a streaming body cannot
    /// be, and is left off the copy.
    pub fn authorize(&self, req: &Request) -> Request {
        let mut authed = Request::new(req.method().clone(), req.url().clone());
        *authed.version_mut() = req.version();
        *authed.timeout_mut() = req.timeout().copied();

        let headers = authed.headers_mut();
        headers.reserve(req.headers().len() + 1);
        for (name, value) in req.headers() {
            headers.append(name.clone(), value.clone());
        }
        headers.append(API_KEY_HEADER, self.key.clone());

        if let Some(bytes) = req.body().and_then(|body| body.as_bytes()) {
            *authed.body_mut() = Some(bytes.to_vec().into());
        }
        authed
    }
}

impl<C: fmt::Debug> fmt::Debug for ApiKey<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiKey")
            .field("inner", &self.inner)
            .field("key", &"<redacted>")
            .finish()
    }
}

#[async_trait]
impl<C: HttpClient> HttpClient for ApiKey<C> {
    async fn execute(&self, mut req: reqwest::Request) -> reqwest::Result<reqwest::Response> {
        // We own `req`, so its body can move across instead of being copied.
        let body = req.body_mut().take();
        let mut authed = self.authorize(&req);
        *authed.body_mut() = body;
        self.inner.execute(authed).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::Method;
    use reqwest::header::ACCEPT;

    fn sample_request() -> Request {
        let mut req = Request::new(
            Method::POST,
            "https://acme.nucleussec.com/nucleus/api/projects".parse().unwrap(),
        );
        req.headers_mut()
            .insert(ACCEPT, HeaderValue::from_static("application/json"));
        *req.body_mut() = Some(br#"{"a":1}"#.to_vec().into());
        req
    }

    #[test]
    fn test_authorize_adds_api_key_header() {
        let auth = ApiKey::new("s3cret").unwrap();
        let authed = auth.authorize(&sample_request());

        assert_eq!(authed.headers()[API_KEY_HEADER], "s3cret");
        assert_eq!(authed.headers()[ACCEPT], "application/json");
        assert_eq!(authed.method(), Method::POST);
        assert_eq!(
            authed.url().as_str(),
            "https://acme.nucleussec.com/nucleus/api/projects"
        );
        assert_eq!(
            authed.body().and_then(|b| b.as_bytes()),
            Some(br#"{"a":1}"#.as_slice())
        );
    }

    #[test]
    fn test_authorize_leaves_original_untouched() {
        let auth = ApiKey::new("s3cret").unwrap();
        let original = sample_request();
        let headers_before = original.headers().clone();

        let _ = auth.authorize(&original);

        assert_eq!(original.headers(), &headers_before);
        assert!(original.headers().get(API_KEY_HEADER).is_none());
        assert!(original.body().is_some());
    }

    #[test]
    fn test_api_key_is_sensitive_and_redacted() {
        let auth = ApiKey::new("s3cret").unwrap();
        let authed = auth.authorize(&sample_request());

        assert!(authed.headers()[API_KEY_HEADER].is_sensitive());
        assert!(!format!("{auth:?}").contains("s3cret"));
    }

    #[test]
    fn test_empty_key_rejected() {
        let err = ApiKey::new("").unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_key_with_newline_rejected() {
        let err = ApiKey::new("abc\ndef").unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }
}
