use chrono::{DateTime, Utc};
use reqwest::Method;
use serde::{Deserialize, Serialize};
use url::form_urlencoded;

use super::fetch;
use crate::client::Client;
use crate::context::Context;
use crate::error::Result;
use crate::response::Response;
use crate::transport::HttpClient;

/// An audit log entry.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Log {
    pub details: String,
    pub datetime: String,
}

/// Window of audit events to fetch.
///
/// `after` takes precedence; `since` (unix seconds) is only sent when
/// `after` is empty.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LogRequest {
    pub start: i64,
    pub limit: i64,
    pub after: String,
    pub since: i64,
}

impl LogRequest {
    /// Sets `since` from a timestamp.
    pub fn since_time(mut self, since: DateTime<Utc>) -> Self {
        self.since = since.timestamp();
        self
    }

    fn query(&self) -> String {
        let mut q = form_urlencoded::Serializer::new(String::new());
        q.append_pair("start", &self.start.to_string());
        q.append_pair("limit", &self.limit.to_string());
        if self.after.is_empty() {
            q.append_pair("since", &self.since.to_string());
        } else {
            q.append_pair("after", &self.after);
        }
        q.finish()
    }
}

/// Audit log endpoints, borrowed from a [`Client`].
#[derive(Debug)]
pub struct Logs<'a, C> {
    client: &'a Client<C>,
}

impl<'a, C: HttpClient> Logs<'a, C> {
    pub(crate) fn new(client: &'a Client<C>) -> Self {
        Self { client }
    }

    /// Returns the audit events selected by `request`.
    pub async fn audit_logs(
        &self,
        ctx: &Context,
        request: &LogRequest,
    ) -> Result<Response<Vec<Log>>> {
        let req = self
            .client
            .request(Method::GET, &format!("logs?{}", request.query()))?;
        fetch(self.client, ctx, req).await
    }
}
