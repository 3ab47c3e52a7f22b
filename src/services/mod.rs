//! Typed accessors for the Nucleus API resources.
//!
//! Each accessor builds one request with [`Client::request`], dispatches it
//! with [`Client::execute`] and decodes the result. An empty or `null` 2xx
//! body yields the record type's default. Identifiers are percent-encoded
//! into a single path segment.

pub mod assessments;
pub mod assets;
pub mod connectors;
pub mod logs;
pub mod projects;

pub use assessments::{
    Assessment, AssessmentActivity, AssessmentContact, AssessmentData, AssessmentVuln,
};
pub use assets::{
    ApiStatus, Asset, AssetGroup, AssetUpdate, AssetVuln, Compliance, DataSensitivity, Finding,
    ListAssetsRequest,
};
pub use connectors::Connector;
pub use logs::{Log, LogRequest, Logs};
pub use projects::{Project, Projects};

use reqwest::Request;
use serde::de::DeserializeOwned;
use url::form_urlencoded;

use crate::client::Client;
use crate::context::Context;
use crate::error::{Error, Result};
use crate::response::Response;
use crate::transport::HttpClient;

async fn fetch<T, C>(client: &Client<C>, ctx: &Context, req: Request) -> Result<Response<T>>
where
    T: DeserializeOwned + Default,
    C: HttpClient,
{
    Ok(client
        .execute(ctx, req)
        .await?
        .map(Option::unwrap_or_default))
}

/// Percent-encodes an identifier so it stays a single path segment.
///
/// Empty and dot-only identifiers are rejected since URL resolution would
/// drop them or climb out of the resource.
fn segment(id: &str) -> Result<String> {
    if matches!(id, "" | "." | "..") {
        return Err(Error::InvalidArgument(format!(
            "{id:?} is not a usable resource identifier"
        )));
    }
    Ok(form_urlencoded::byte_serialize(id.as_bytes())
        .collect::<String>()
        .replace('+', "%20"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_segment_keeps_plain_ids() {
        assert_eq!(segment("12345").unwrap(), "12345");
        assert_eq!(segment("web-01.corp_a").unwrap(), "web-01.corp_a");
    }

    #[test]
    fn test_segment_escapes_reserved_characters() {
        assert_eq!(segment("a/b?c#d").unwrap(), "a%2Fb%3Fc%23d");
        assert_eq!(segment("a b+c").unwrap(), "a%20b%2Bc");
        assert_eq!(segment("100%").unwrap(), "100%25");
    }

    #[test]
    fn test_segment_rejects_dot_and_empty_ids() {
        for id in ["", ".", ".."] {
            assert!(matches!(segment(id), Err(Error::InvalidArgument(_))), "{id:?}");
        }
    }
}
