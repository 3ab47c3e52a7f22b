use reqwest::Method;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::{Projects, fetch, segment};
use crate::context::Context;
use crate::error::Result;
use crate::response::Response;
use crate::transport::HttpClient;
use crate::util::null_as_default;

/// A scanner or ticketing connector configured on a project.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Connector {
    #[serde(rename = "connector_id")]
    pub id: String,
    #[serde(rename = "connector_type")]
    pub kind: String,
    #[serde(rename = "connector_name")]
    pub name: String,
    #[serde(rename = "connector_description")]
    pub description: String,
    /// Connector-specific settings; their keys vary by connector type.
    #[serde(rename = "connector_fields", deserialize_with = "null_as_default")]
    pub fields: Vec<Map<String, Value>>,
}

impl<C: HttpClient> Projects<'_, C> {
    pub async fn list_connectors(
        &self,
        ctx: &Context,
        project_id: &str,
    ) -> Result<Response<Vec<Connector>>> {
        let project_id = segment(project_id)?;
        let req = self
            .client
            .request(Method::GET, &format!("projects/{project_id}/connectors"))?;
        fetch(self.client, ctx, req).await
    }
}
