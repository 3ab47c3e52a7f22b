use reqwest::Method;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use url::form_urlencoded;

use super::{Projects, fetch, segment};
use crate::context::Context;
use crate::error::Result;
use crate::response::Response;
use crate::transport::HttpClient;
use crate::util::{EmptyStrAsMap, EmptyStrAsVec, null_as_default};

/// Data sensitivity of an asset, sent on the wire as a numeric string.
///
/// Values outside the documented set are kept verbatim in `Other`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum DataSensitivity {
    Low,
    Moderate,
    High,
    Critical,
    Other(String),
}

impl Default for DataSensitivity {
    fn default() -> Self {
        Self::Other(String::new())
    }
}

impl From<String> for DataSensitivity {
    fn from(value: String) -> Self {
        match value.as_str() {
            "2" => Self::Low,
            "5" => Self::Moderate,
            "7" => Self::High,
            "10" => Self::Critical,
            _ => Self::Other(value),
        }
    }
}

impl From<DataSensitivity> for String {
    fn from(value: DataSensitivity) -> Self {
        match value {
            DataSensitivity::Low => "2".to_string(),
            DataSensitivity::Moderate => "5".to_string(),
            DataSensitivity::High => "7".to_string(),
            DataSensitivity::Critical => "10".to_string(),
            DataSensitivity::Other(s) => s,
        }
    }
}

/// Whether an asset is in compliance scope, sent as `"5"` (no) or `"10"` (yes).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Compliance {
    No,
    Yes,
    Other(String),
}

impl Default for Compliance {
    fn default() -> Self {
        Self::Other(String::new())
    }
}

impl From<String> for Compliance {
    fn from(value: String) -> Self {
        match value.as_str() {
            "5" => Self::No,
            "10" => Self::Yes,
            _ => Self::Other(value),
        }
    }
}

impl From<Compliance> for String {
    fn from(value: Compliance) -> Self {
        match value {
            Compliance::No => "5".to_string(),
            Compliance::Yes => "10".to_string(),
            Compliance::Other(s) => s,
        }
    }
}

/// Full description of one asset, as returned by the single-asset endpoint.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Asset {
    #[serde(rename = "asset_id")]
    pub id: String,
    #[serde(rename = "asset_name")]
    pub name: String,
    #[serde(rename = "asset_type")]
    pub kind: String,
    pub active: bool,
    /// `asset_groups` comes back as `""` when the asset has no groups.
    #[serde(rename = "asset_groups")]
    pub groups: EmptyStrAsVec,
    #[serde(rename = "asset_users", deserialize_with = "null_as_default")]
    pub users: Vec<String>,
    #[serde(rename = "asset_location")]
    pub location: String,
    #[serde(rename = "asset_notes")]
    pub notes: String,
    #[serde(rename = "asset_criticality")]
    pub criticality: String,
    #[serde(rename = "asset_criticality_score")]
    pub criticality_score: String,
    #[serde(rename = "asset_data_sensitivity_score")]
    pub data_sensitivity_score: DataSensitivity,
    #[serde(rename = "asset_complianced_score")]
    pub compliance_score: Compliance,
    #[serde(rename = "asset_inactive_date")]
    pub inactive_date: String,
    #[serde(rename = "asset_info", deserialize_with = "null_as_default")]
    pub info: Map<String, Value>,
    #[serde(rename = "asset_match_name")]
    pub match_name: String,
    #[serde(rename = "asset_match_name_link")]
    pub match_name_link: String,
    /// Decommission flag, kept as the string the API sends.
    #[serde(rename = "decommed")]
    pub decommissioned: String,
    pub ip_address: String,
    pub mac_address: String,
    pub domain_name: String,
    pub url: String,
    pub operating_system_name: String,
    pub operating_system_version: String,
    pub parent_host_id: String,
    pub image_id: String,
    pub image_distro: String,
    pub image_repo: String,
    pub image_tag: String,
}

/// Asset summary with finding counts, as returned by the asset listing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AssetVuln {
    #[serde(rename = "asset_id")]
    pub id: String,
    #[serde(rename = "asset_name")]
    pub name: String,
    #[serde(rename = "asset_type")]
    pub kind: String,
    pub active: bool,
    #[serde(rename = "asset_groups", deserialize_with = "null_as_default")]
    pub groups: Vec<String>,
    /// `asset_info` comes back as `""` when the asset has no extra info.
    #[serde(rename = "asset_info")]
    pub info: EmptyStrAsMap,
    #[serde(rename = "asset_public")]
    pub public: String,
    #[serde(rename = "asset_criticality")]
    pub criticality: String,
    #[serde(rename = "asset_criticality_score")]
    pub criticality_score: String,
    #[serde(rename = "asset_data_sensitivity_score")]
    pub data_sensitivity_score: DataSensitivity,
    #[serde(rename = "asset_complianced_score")]
    pub compliance_score: Compliance,
    #[serde(rename = "asset_inactive_date")]
    pub inactive_date: String,
    pub ip_address: String,
    pub mac_address: String,
    pub operating_system_name: String,
    pub scan_date: String,
    pub scan_date_timestamp: i64,
    pub finding_count_critical: String,
    pub finding_count_high: String,
    pub finding_count_medium: String,
    pub finding_count_low: String,
    pub finding_count_informational: String,
    pub finding_count_pass: String,
    pub finding_count_fail: String,
    pub finding_vulnerability_score: String,
    pub image_id: String,
    pub image_distro: String,
    pub image_repo: String,
    pub image_tag: String,
}

/// Filters for [`Projects::list_assets`]. Zero and empty fields are not sent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListAssetsRequest {
    pub start: i64,
    pub limit: i64,
    pub ip_address: String,
    pub asset_name: String,
    /// Matches either the asset name or its IP address.
    pub asset_name_or_ip: String,
    pub asset_groups: Vec<String>,
    pub inactive_assets: bool,
}

impl ListAssetsRequest {
    fn query(&self) -> String {
        let mut q = form_urlencoded::Serializer::new(String::new());
        if self.start > 0 {
            q.append_pair("start", &self.start.to_string());
        }
        if self.limit > 0 {
            q.append_pair("limit", &self.limit.to_string());
        }
        if !self.ip_address.is_empty() {
            q.append_pair("ip_address", &self.ip_address);
        }
        if !self.asset_name.is_empty() {
            q.append_pair("asset_name", &self.asset_name);
        }
        if !self.asset_name_or_ip.is_empty() {
            q.append_pair("asset_name_ip", &self.asset_name_or_ip);
        }
        for group in &self.asset_groups {
            q.append_pair("asset_groups", group);
        }
        if self.inactive_assets {
            q.append_pair("inactive_assets", "true");
        }
        q.finish()
    }
}

/// Fields to change on an asset. `None` fields are left as they are.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AssetUpdate {
    #[serde(rename = "asset_name", skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(rename = "asset_groups", skip_serializing_if = "Option::is_none")]
    pub groups: Option<Vec<String>>,
    #[serde(rename = "asset_users", skip_serializing_if = "Option::is_none")]
    pub users: Option<Vec<String>>,
    #[serde(rename = "asset_location", skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(rename = "asset_notes", skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(rename = "asset_criticality", skip_serializing_if = "Option::is_none")]
    pub criticality: Option<String>,
    #[serde(
        rename = "asset_data_sensitivity_score",
        skip_serializing_if = "Option::is_none"
    )]
    pub data_sensitivity_score: Option<DataSensitivity>,
    #[serde(
        rename = "asset_complianced_score",
        skip_serializing_if = "Option::is_none"
    )]
    pub compliance_score: Option<Compliance>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ip_address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mac_address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub domain_name: Option<String>,
    #[serde(rename = "decommed", skip_serializing_if = "Option::is_none")]
    pub decommissioned: Option<String>,
}

/// Acknowledgement returned by write endpoints.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiStatus {
    pub success: bool,
    pub message: String,
}

/// A finding recorded against an asset.
///
/// Fields not modelled here are kept in `extra`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Finding {
    #[serde(rename = "finding_name")]
    pub name: String,
    #[serde(rename = "finding_severity")]
    pub severity: String,
    #[serde(rename = "finding_type")]
    pub kind: String,
    #[serde(rename = "finding_description")]
    pub description: String,
    #[serde(rename = "finding_recommendation")]
    pub recommendation: String,
    #[serde(rename = "finding_output")]
    pub output: String,
    #[serde(rename = "finding_result")]
    pub result: String,
    #[serde(rename = "finding_path")]
    pub path: String,
    #[serde(rename = "finding_status")]
    pub status: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A named asset group of a project.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AssetGroup {
    #[serde(rename = "asset_group")]
    pub name: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl<C: HttpClient> Projects<'_, C> {
    /// Lists a project's assets, filtered by `request`.
    pub async fn list_assets(
        &self,
        ctx: &Context,
        project_id: &str,
        request: &ListAssetsRequest,
    ) -> Result<Response<Vec<AssetVuln>>> {
        let project_id = segment(project_id)?;
        let query = request.query();
        let path = if query.is_empty() {
            format!("projects/{project_id}/assets")
        } else {
            format!("projects/{project_id}/assets?{query}")
        };
        let req = self.client.request(Method::GET, &path)?;
        fetch(self.client, ctx, req).await
    }

    pub async fn get_asset(
        &self,
        ctx: &Context,
        project_id: &str,
        asset_id: &str,
    ) -> Result<Response<Asset>> {
        let project_id = segment(project_id)?;
        let asset_id = segment(asset_id)?;
        let req = self
            .client
            .request(Method::GET, &format!("projects/{project_id}/assets/{asset_id}"))?;
        fetch(self.client, ctx, req).await
    }

    pub async fn update_asset(
        &self,
        ctx: &Context,
        project_id: &str,
        asset_id: &str,
        update: &AssetUpdate,
    ) -> Result<Response<ApiStatus>> {
        let project_id = segment(project_id)?;
        let asset_id = segment(asset_id)?;
        let req = self.client.request_with_body(
            Method::PUT,
            &format!("projects/{project_id}/assets/{asset_id}"),
            update,
        )?;
        fetch(self.client, ctx, req).await
    }

    pub async fn list_asset_findings(
        &self,
        ctx: &Context,
        project_id: &str,
        asset_id: &str,
    ) -> Result<Response<Vec<Finding>>> {
        let project_id = segment(project_id)?;
        let asset_id = segment(asset_id)?;
        let req = self.client.request(
            Method::GET,
            &format!("projects/{project_id}/assets/{asset_id}/findings"),
        )?;
        fetch(self.client, ctx, req).await
    }

    pub async fn list_asset_groups(
        &self,
        ctx: &Context,
        project_id: &str,
    ) -> Result<Response<Vec<AssetGroup>>> {
        let project_id = segment(project_id)?;
        let req = self
            .client
            .request(Method::GET, &format!("projects/{project_id}/assets/groups"))?;
        fetch(self.client, ctx, req).await
    }
}
