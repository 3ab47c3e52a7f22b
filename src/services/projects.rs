use reqwest::Method;
use serde::{Deserialize, Serialize};

use super::{fetch, segment};
use crate::client::Client;
use crate::context::Context;
use crate::error::Result;
use crate::response::Response;
use crate::transport::HttpClient;
use crate::util::null_as_default;

/// Project metadata.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Project {
    /// The API returns the ID as a string.
    #[serde(rename = "project_id")]
    pub id: String,
    #[serde(rename = "project_name")]
    pub name: String,
    #[serde(rename = "project_description")]
    pub description: String,
    pub tracking_method: String,
    #[serde(rename = "project_groups", deserialize_with = "null_as_default")]
    pub groups: Vec<String>,
    #[serde(rename = "project_org")]
    pub org: String,
}

/// Project endpoints, borrowed from a [`Client`].
///
/// Asset, assessment and connector calls are scoped to a project and live
/// here as well.
#[derive(Debug)]
pub struct Projects<'a, C> {
    pub(super) client: &'a Client<C>,
}

impl<'a, C: HttpClient> Projects<'a, C> {
    pub(crate) fn new(client: &'a Client<C>) -> Self {
        Self { client }
    }

    /// Lists every project visible to the API key.
    pub async fn list(&self, ctx: &Context) -> Result<Response<Vec<Project>>> {
        let req = self.client.request(Method::GET, "projects")?;
        fetch(self.client, ctx, req).await
    }

    pub async fn get(&self, ctx: &Context, project_id: &str) -> Result<Response<Project>> {
        let project_id = segment(project_id)?;
        let req = self
            .client
            .request(Method::GET, &format!("projects/{project_id}"))?;
        fetch(self.client, ctx, req).await
    }
}
