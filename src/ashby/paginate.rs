use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

use crate::ashby::client::{decode, Caller, Params};
use crate::ashby::error::ApiError;

/// Largest page the Ashby API serves
pub const DEFAULT_PAGE_SIZE: usize = 100;

/// Pause between successive page requests to stay under the rate limit
pub const PAGE_DELAY: Duration = Duration::from_millis(200);

pub const PAGE_SIZE_PARAM: &str = "per_page";
pub const CURSOR_PARAM: &str = "cursor";

/// Envelope returned by list endpoints
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", bound(deserialize = "T: DeserializeOwned"))]
struct PaginatedResponse<T> {
    #[serde(default)]
    results: Option<Vec<T>>,
    #[serde(default)]
    more_data_available: bool,
    #[serde(default)]
    next_cursor: Option<String>,
}

/// One fetched page plus the cursor metadata needed to continue.
#[derive(Debug, Clone, PartialEq)]
pub struct PageResult<T> {
    /// Items in server order
    pub items: Vec<T>,
    /// Cursor for the next page; empty when there is none
    pub next_cursor: String,
    pub more_data_available: bool,
}

impl<T> PageResult<T> {
    /// Whether a follow-up fetch could return more items.
    /// An empty cursor wins over the flag.
    pub fn has_next(&self) -> bool {
        self.more_data_available && !self.next_cursor.is_empty()
    }
}

/// Fetch exactly one page from a list operation. Never loops.
///
/// Callers that expose the cursor to their own users (pass-through
/// pagination) use this directly.
pub async fn fetch_page<T: DeserializeOwned>(
    caller: &dyn Caller,
    operation: &str,
    params: &Params,
    cancel: &CancellationToken,
) -> Result<PageResult<T>, ApiError> {
    let value = tokio::select! {
        biased;
        _ = cancel.cancelled() => return Err(ApiError::Cancelled),
        result = caller.call(operation, params) => result?,
    };

    let response: PaginatedResponse<T> = decode(operation, value)?;
    Ok(PageResult {
        items: response.results.unwrap_or_default(),
        next_cursor: response.next_cursor.unwrap_or_default(),
        more_data_available: response.more_data_available,
    })
}

/// Fetch pages of `operation` until the source runs dry or `limit` items
/// are gathered. A `limit` of zero means no cap.
///
/// Each request carries the caller's `params` plus a page size (never more
/// than what is left to reach `limit`) and the previous page's cursor.
/// Requests are spaced by `PAGE_DELAY`. Any failure aborts the whole walk;
/// items gathered so far are dropped, including on cancellation.
pub async fn paginate<T: DeserializeOwned>(
    caller: &dyn Caller,
    operation: &str,
    params: &Params,
    limit: usize,
    cancel: &CancellationToken,
) -> Result<Vec<T>, ApiError> {
    let mut all: Vec<T> = Vec::new();
    let mut cursor = String::new();
    let mut page = 0;

    loop {
        page += 1;

        let page_size = if limit > 0 {
            DEFAULT_PAGE_SIZE.min(limit.saturating_sub(all.len()))
        } else {
            DEFAULT_PAGE_SIZE
        };

        let mut page_params = params.clone();
        page_params.insert(PAGE_SIZE_PARAM.to_string(), page_size.into());
        if !cursor.is_empty() {
            page_params.insert(CURSOR_PARAM.to_string(), cursor.clone().into());
        }

        let result = fetch_page::<T>(caller, operation, &page_params, cancel)
            .await
            .map_err(|err| match err {
                ApiError::Cancelled => ApiError::Cancelled,
                other => ApiError::Page {
                    operation: operation.to_string(),
                    page,
                    source: Box::new(other),
                },
            })?;

        tracing::debug!(
            operation,
            page,
            items = result.items.len(),
            more = result.more_data_available,
            "fetched page"
        );

        let has_next = result.has_next();
        all.extend(result.items);

        if !has_next {
            break;
        }
        if limit > 0 && all.len() >= limit {
            break;
        }

        cursor = result.next_cursor;

        tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(ApiError::Cancelled),
            _ = tokio::time::sleep(PAGE_DELAY) => {}
        }
    }

    // The source may ignore the requested page size
    if limit > 0 && all.len() > limit {
        all.truncate(limit);
    }

    Ok(all)
}
