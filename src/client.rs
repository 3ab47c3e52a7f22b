//! The Nucleus API client: request construction and dispatch.

use reqwest::header::{ACCEPT, CONTENT_TYPE, HeaderValue, USER_AGENT};
use reqwest::{Method, Request};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};
use url::Url;

use crate::config::Config;
use crate::context::Context;
use crate::error::{Error, Result};
use crate::response::{Envelope, ErrorResponse, RawResponse, Response};
use crate::services::{Logs, Projects};
use crate::transport::{ApiKey, BasicClient, HttpClient};

pub const DEFAULT_USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

const APPLICATION_JSON: &str = "application/json";

/// Returns the API base URL for an organisation.
pub fn default_base_url(organisation: &str) -> Result<Url> {
    Ok(Url::parse(&format!(
        "https://{organisation}.nucleussec.com/nucleus/api/"
    ))?)
}

/// Client for the Nucleus Security API.
///
/// Read-only once built; share it across tasks behind an `Arc` (or by
/// reference) when the transport is `Send + Sync`.
#[derive(Debug, Clone)]
pub struct Client<C = ApiKey<BasicClient>> {
    transport: C,
    base_url: Url,
    user_agent: Option<HeaderValue>,
}

impl Client<ApiKey<BasicClient>> {
    /// Builds an authenticated client from a [`Config`].
    pub fn from_config(config: &Config) -> Result<Self> {
        let basic = BasicClient::with_timeouts(config.timeout, config.connect_timeout)?;
        let transport = ApiKey::with_transport(basic, &config.api_key)?;
        let base_url = match &config.base_url {
            Some(url) => url.clone(),
            None => default_base_url(&config.organisation)?,
        };
        let mut client = Self::with_base_url(transport, base_url);
        client.set_user_agent(&config.user_agent)?;
        Ok(client)
    }
}

impl<C: HttpClient> Client<C> {
    /// A client for `https://{organisation}.nucleussec.com/nucleus/api/`.
    ///
    /// `transport` is usually an [`ApiKey`]; any [`HttpClient`] works.
    pub fn new(organisation: &str, transport: C) -> Result<Self> {
        Ok(Self::with_base_url(transport, default_base_url(organisation)?))
    }

    /// A client for an arbitrary base URL. The path must end in `/`; this is
    /// checked when each request is built.
    pub fn with_base_url(transport: C, base_url: Url) -> Self {
        Self {
            transport,
            base_url,
            user_agent: Some(HeaderValue::from_static(DEFAULT_USER_AGENT)),
        }
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub fn transport(&self) -> &C {
        &self.transport
    }

    /// Sets the `User-Agent` header value. An empty string omits the header.
    pub fn set_user_agent(&mut self, user_agent: &str) -> Result<()> {
        self.user_agent = if user_agent.is_empty() {
            None
        } else {
            Some(
                HeaderValue::from_str(user_agent)
                    .map_err(|_| Error::Config(format!("invalid user agent {user_agent:?}")))?,
            )
        };
        Ok(())
    }

    pub fn projects(&self) -> Projects<'_, C> {
        Projects::new(self)
    }

    pub fn logs(&self) -> Logs<'_, C> {
        Logs::new(self)
    }

    /// Builds a bodiless request for `path`, relative to the base URL.
    pub fn request(&self, method: Method, path: &str) -> Result<Request> {
        self.build_request(method, path, None)
    }

    /// Builds a request for `path` with `body` encoded as JSON.
    pub fn request_with_body<B>(&self, method: Method, path: &str, body: &B) -> Result<Request>
    where
        B: Serialize + ?Sized,
    {
        let body = serde_json::to_vec(body).map_err(Error::Encode)?;
        self.build_request(method, path, Some(body))
    }

    fn build_request(&self, method: Method, path: &str, body: Option<Vec<u8>>) -> Result<Request> {
        if !self.base_url.path().ends_with('/') {
            return Err(Error::Config(format!(
                "base URL must have a trailing slash, but {} does not",
                self.base_url
            )));
        }
        let url = self.base_url.join(path)?;

        let mut req = Request::new(method, url);
        let headers = req.headers_mut();
        if body.is_some() {
            headers.insert(CONTENT_TYPE, HeaderValue::from_static(APPLICATION_JSON));
        }
        headers.insert(ACCEPT, HeaderValue::from_static(APPLICATION_JSON));
        if let Some(user_agent) = &self.user_agent {
            headers.insert(USER_AGENT, user_agent.clone());
        }
        *req.body_mut() = body.map(Into::into);
        Ok(req)
    }

    /// Sends `req` and decodes a 2xx body into `T`.
    ///
    /// An empty or `null` 2xx body yields `value: None`. Non-2xx statuses
    /// become [`Error::Api`].
    pub async fn execute<T>(&self, ctx: &Context, req: Request) -> Result<Response<Option<T>>>
    where
        T: DeserializeOwned,
    {
        let raw = self.execute_raw(ctx, req).await?;
        if raw.is_empty() {
            return Ok(Response { value: None, raw });
        }
        match serde_json::from_slice::<Option<T>>(&raw.body) {
            Ok(value) => Ok(Response { value, raw }),
            Err(source) => Err(Error::Decode {
                source,
                response: Box::new(raw),
            }),
        }
    }

    /// Sends `req` and buffers the response without decoding a 2xx body.
    ///
    /// If `ctx` ends before the exchange completes, its reason is returned,
    /// also when the transport failed at the same time. Once the status line
    /// has arrived that error carries the response, with an empty body.
    #[tracing::instrument(skip_all, fields(method = %req.method(), url = %req.url()))]
    pub async fn execute_raw(&self, ctx: &Context, req: Request) -> Result<RawResponse> {
        if let Some(reason) = ctx.err() {
            return Err(reason.into());
        }
        let method = req.method().clone();
        let started = std::time::Instant::now();

        let resp = tokio::select! {
            biased;
            reason = ctx.done() => return Err(reason.into()),
            result = self.transport.execute(req) => match result {
                Ok(resp) => resp,
                Err(err) => return Err(ctx.err().map_or(Error::Transport(err), Error::from)),
            },
        };

        let status = resp.status();
        let mut raw = RawResponse {
            status,
            method,
            url: resp.url().clone(),
            headers: resp.headers().clone(),
            body: bytes::Bytes::new(),
        };
        let body = tokio::select! {
            biased;
            reason = ctx.done() => Err(reason),
            body = resp.bytes() => Ok(body),
        };

        match body {
            Ok(Ok(body)) => raw.body = body,
            Ok(Err(source)) => {
                let response = Box::new(raw);
                return Err(match ctx.err() {
                    Some(reason) => Error::Context {
                        reason,
                        response: Some(response),
                    },
                    None => Error::Body { source, response },
                });
            }
            Err(reason) => {
                return Err(Error::Context {
                    reason,
                    response: Some(Box::new(raw)),
                });
            }
        }
        debug!(
            status = status.as_u16(),
            bytes = raw.body.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Response received"
        );

        if status.is_success() {
            return Ok(raw);
        }

        let envelope = if raw.is_empty() {
            Envelope::default()
        } else {
            match serde_json::from_slice(&raw.body) {
                Ok(envelope) => envelope,
                Err(source) => {
                    warn!(status = status.as_u16(), error = %source, "Undecodable error body");
                    return Err(Error::Decode {
                        source,
                        response: Box::new(raw),
                    });
                }
            }
        };
        let err = ErrorResponse::new(raw, envelope);
        warn!(status = status.as_u16(), code = err.code, message = %err.message, "API error");
        Err(Error::Api(Box::new(err)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::BasicClient;

    fn client(base: &str) -> Client<BasicClient> {
        Client::with_base_url(BasicClient::new(), base.parse().unwrap())
    }

    #[test]
    fn test_default_base_url_interpolates_organisation() {
        let url = default_base_url("acme").unwrap();
        assert_eq!(url.as_str(), "https://acme.nucleussec.com/nucleus/api/");
    }

    #[test]
    fn test_request_resolves_relative_path() {
        let c = client("https://acme.nucleussec.com/nucleus/api/");
        let req = c.request(Method::GET, "projects/7/assets").unwrap();
        assert_eq!(
            req.url().as_str(),
            "https://acme.nucleussec.com/nucleus/api/projects/7/assets"
        );
        assert!(req.body().is_none());
        assert!(req.headers().get(CONTENT_TYPE).is_none());
    }

    #[test]
    fn test_request_keeps_prebuilt_query() {
        let c = client("https://acme.nucleussec.com/nucleus/api/");
        let req = c.request(Method::GET, "logs?start=0&limit=5").unwrap();
        assert_eq!(req.url().path(), "/nucleus/api/logs");
        assert_eq!(req.url().query(), Some("start=0&limit=5"));
    }

    #[test]
    fn test_request_sets_standard_headers() {
        let c = client("https://acme.nucleussec.com/nucleus/api/");
        let req = c.request(Method::GET, "projects").unwrap();
        assert_eq!(req.headers()[ACCEPT], "application/json");
        assert_eq!(req.headers()[USER_AGENT], DEFAULT_USER_AGENT);
    }

    #[test]
    fn test_empty_user_agent_omits_header() {
        let mut c = client("https://acme.nucleussec.com/nucleus/api/");
        c.set_user_agent("").unwrap();
        let req = c.request(Method::GET, "projects").unwrap();
        assert!(req.headers().get(USER_AGENT).is_none());
    }

    #[test]
    fn test_from_config_applies_overrides() {
        let mut config = Config::new("acme", "secret-key-123");
        config.base_url = Some("http://localhost:8080/nucleus/api/".parse().unwrap());
        config.user_agent = "reporter/2".to_string();

        let c = Client::from_config(&config).unwrap();
        assert_eq!(c.base_url().as_str(), "http://localhost:8080/nucleus/api/");
        assert!(!format!("{:?}", c.transport()).contains("secret-key-123"));

        let req = c.request(Method::GET, "projects").unwrap();
        assert_eq!(req.headers()[USER_AGENT], "reporter/2");
    }

    #[test]
    fn test_base_url_without_trailing_slash_rejected() {
        let c = client("https://acme.nucleussec.com/nucleus/api");
        let err = c.request(Method::GET, "projects").unwrap_err();
        assert!(matches!(err, Error::Config(msg) if msg.contains("trailing slash")));
    }

    #[test]
    fn test_body_is_json_without_html_escaping() {
        #[derive(Serialize)]
        struct Query<'a> {
            filter: &'a str,
        }

        let c = client("https://acme.nucleussec.com/nucleus/api/");
        let req = c
            .request_with_body(Method::PUT, "projects/1/assets/2", &Query { filter: "a<b && c>d" })
            .unwrap();

        assert_eq!(req.headers()[CONTENT_TYPE], "application/json");
        let body = req.body().and_then(|b| b.as_bytes()).unwrap();
        assert_eq!(body, br#"{"filter":"a<b && c>d"}"#);
    }

    #[test]
    fn test_unserializable_body_is_encode_error() {
        use std::collections::HashMap;

        // JSON object keys must be strings.
        let mut body = HashMap::new();
        body.insert((1, 2), "x");

        let c = client("https://acme.nucleussec.com/nucleus/api/");
        let err = c
            .request_with_body(Method::PUT, "projects/1", &body)
            .unwrap_err();
        assert!(matches!(err, Error::Encode(_)));
    }
}
