use reqwest::Method;
use serde::{Deserialize, Serialize};

use super::{Projects, fetch, segment};
use crate::context::Context;
use crate::error::Result;
use crate::response::Response;
use crate::transport::HttpClient;
use crate::util::null_as_default;

/// Contact details of an assessor.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AssessmentContact {
    #[serde(rename = "contact_email")]
    pub email: String,
    #[serde(rename = "contact_name")]
    pub name: String,
    #[serde(rename = "contact_role")]
    pub role: String,
    #[serde(rename = "contact_phone")]
    pub phone: String,
    #[serde(rename = "contact_title")]
    pub title: String,
}

/// Vulnerability counts of an assessment.
///
/// `t*` fields are totals and `u*` fields unresolved counts, per severity:
/// critical, high, medium, low, informational.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AssessmentVuln {
    #[serde(rename = "tC")]
    pub total_critical: i64,
    #[serde(rename = "uC")]
    pub unresolved_critical: i64,
    #[serde(rename = "tH")]
    pub total_high: i64,
    #[serde(rename = "uH")]
    pub unresolved_high: i64,
    #[serde(rename = "tM")]
    pub total_medium: i64,
    #[serde(rename = "uM")]
    pub unresolved_medium: i64,
    #[serde(rename = "tL")]
    pub total_low: i64,
    #[serde(rename = "uL")]
    pub unresolved_low: i64,
    #[serde(rename = "tI")]
    pub total_informational: i64,
    #[serde(rename = "uI")]
    pub unresolved_informational: i64,
    #[serde(rename = "tE")]
    pub total_exploitable: i64,
    #[serde(rename = "uE")]
    pub unresolved_exploitable: i64,
}

/// An action a user took on an assessment.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AssessmentActivity {
    pub action: String,
    /// Unix timestamp.
    pub date: i64,
    pub user: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AssessmentData {
    #[serde(rename = "assessment_contacts", deserialize_with = "null_as_default")]
    pub contacts: Vec<AssessmentContact>,
    #[serde(rename = "assessment_start")]
    pub start: String,
    #[serde(rename = "assessment_end")]
    pub end: String,
    #[serde(rename = "assessment_type")]
    pub kind: String,
    #[serde(rename = "assessment_status")]
    pub status: String,
    #[serde(rename = "assessment_provider")]
    pub provider: String,
    #[serde(rename = "assessment_provider_name")]
    pub provider_name: String,
    #[serde(rename = "assessment_environment")]
    pub environment: String,
    #[serde(rename = "assessment_scope")]
    pub scope: String,
    #[serde(rename = "assessment_report_intro")]
    pub report_intro: String,
    #[serde(rename = "assessment_report_overview")]
    pub report_overview: String,
    #[serde(rename = "assessment_report_limitations")]
    pub report_limitations: String,
    pub vulns: AssessmentVuln,
    #[serde(rename = "assessment_activity", deserialize_with = "null_as_default")]
    pub activity: Vec<AssessmentActivity>,
}

/// An assessment conducted against a project.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Assessment {
    #[serde(rename = "assessment_name")]
    pub name: String,
    pub project_id: String,
    pub parent_project_id: String,
    #[serde(rename = "assessment_data")]
    pub data: AssessmentData,
}

impl<C: HttpClient> Projects<'_, C> {
    /// Lists the assessments of a project.
    pub async fn list_assessments(
        &self,
        ctx: &Context,
        project_id: &str,
    ) -> Result<Response<Vec<Assessment>>> {
        let project_id = segment(project_id)?;
        let req = self
            .client
            .request(Method::GET, &format!("projects/{project_id}/assessments"))?;
        fetch(self.client, ctx, req).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_assessment_decodes_nested_data() {
        let a: Assessment = serde_json::from_str(
            r#"{
                "assessment_name": "Q1 pentest",
                "project_id": "4",
                "assessment_data": {
                    "assessment_status": "complete",
                    "assessment_contacts": [{"contact_name": "Ada", "contact_email": "ada@example.com"}],
                    "vulns": {"tC": 2, "uC": 1, "tL": 9},
                    "assessment_activity": [{"action": "created", "date": 1600000000, "user": "ada"}]
                }
            }"#,
        )
        .unwrap();

        assert_eq!(a.name, "Q1 pentest");
        assert_eq!(a.data.status, "complete");
        assert_eq!(a.data.contacts[0].name, "Ada");
        assert_eq!(a.data.vulns.total_critical, 2);
        assert_eq!(a.data.vulns.unresolved_critical, 1);
        assert_eq!(a.data.vulns.total_low, 9);
        assert_eq!(a.data.activity[0].date, 1_600_000_000);
    }
}
