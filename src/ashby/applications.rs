use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio_util::sync::CancellationToken;

use crate::ashby::client::{call_as, Caller, Params};
use crate::ashby::error::ApiError;
use crate::ashby::paginate::{fetch_page, paginate, CURSOR_PARAM};
use crate::ashby::types::{Expand, Record};

pub const LIST_OPERATION: &str = "application.list";
pub const INFO_OPERATION: &str = "application.info";

/// Status filter used when none is given
pub const DEFAULT_STATUS: &str = "Active";

/// Filters for listing applications
#[derive(Debug, Clone, Default)]
pub struct ListApplicationsOpts {
    pub job_id: Option<String>,
    /// Active, Hired, Archived or Rejected
    pub status: Option<String>,
    /// Total cap across pages; 0 fetches everything
    pub limit: usize,
    /// Resume from a prior page. When set, exactly one page is fetched.
    pub cursor: Option<String>,
    /// Unix epoch milliseconds
    pub created_after: Option<i64>,
    /// Unix epoch milliseconds
    pub updated_after: Option<i64>,
}

impl ListApplicationsOpts {
    fn to_params(&self) -> Params {
        let mut params = Params::new();
        if let Some(job_id) = self.job_id.as_deref().filter(|s| !s.is_empty()) {
            params.insert("jobId".to_string(), job_id.into());
        }
        if let Some(status) = self.status.as_deref().filter(|s| !s.is_empty()) {
            params.insert("status".to_string(), status.into());
        }
        if let Some(ts) = self.created_after.filter(|ts| *ts > 0) {
            params.insert("createdAfter".to_string(), ts.into());
        }
        if let Some(ts) = self.updated_after.filter(|ts| *ts > 0) {
            params.insert("updatedAfter".to_string(), ts.into());
        }
        params
    }
}

/// Applications plus cursor metadata. The cursor is only populated for
/// single-page (cursor pass-through) requests.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListApplicationsResult {
    pub applications: Vec<Record>,
    pub total: usize,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub next_cursor: String,
    pub more_data_available: bool,
}

/// List applications matching `opts`.
///
/// With a cursor, one page is fetched and its cursor handed back so the
/// caller can continue. Without one, all pages are walked up to `opts.limit`.
pub async fn list_applications(
    caller: &dyn Caller,
    opts: &ListApplicationsOpts,
    cancel: &CancellationToken,
) -> Result<ListApplicationsResult, ApiError> {
    let mut params = opts.to_params();

    if let Some(cursor) = opts.cursor.as_deref().filter(|c| !c.is_empty()) {
        params.insert(CURSOR_PARAM.to_string(), cursor.into());
        let page = fetch_page::<Record>(caller, LIST_OPERATION, &params, cancel).await?;
        return Ok(ListApplicationsResult {
            total: page.items.len(),
            applications: page.items,
            next_cursor: page.next_cursor,
            more_data_available: page.more_data_available,
        });
    }

    let applications: Vec<Record> =
        paginate(caller, LIST_OPERATION, &params, opts.limit, cancel).await?;
    Ok(ListApplicationsResult {
        total: applications.len(),
        applications,
        next_cursor: String::new(),
        more_data_available: false,
    })
}

#[derive(Debug, Deserialize)]
struct InfoResponse {
    #[serde(default)]
    results: Option<Record>,
}

/// Fetch one application, inlining the requested related data
pub async fn get_application(
    caller: &dyn Caller,
    application_id: &str,
    expand: &[Expand],
    cancel: &CancellationToken,
) -> Result<Record, ApiError> {
    let mut params = Params::new();
    params.insert("applicationId".to_string(), application_id.into());
    if !expand.is_empty() {
        let selectors: Vec<Value> = expand.iter().map(|e| Value::from(e.as_str())).collect();
        params.insert("expand".to_string(), Value::Array(selectors));
    }

    let response: InfoResponse = tokio::select! {
        biased;
        _ = cancel.cancelled() => return Err(ApiError::Cancelled),
        result = call_as(caller, INFO_OPERATION, &params) => result?,
    };

    Ok(response.results.unwrap_or_default())
}
