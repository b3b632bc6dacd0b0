//! In-memory `Caller` for unit tests.

use async_trait::async_trait;
use serde_json::{json, Value};
use std::sync::Mutex;

use crate::ashby::client::{Caller, Params};
use crate::ashby::error::ApiError;

type Handler = Box<dyn Fn(&str, &Params) -> Result<Value, ApiError> + Send + Sync>;

/// Answers every call with a closure and records what was asked.
pub struct FakeCaller {
    handler: Handler,
    calls: Mutex<Vec<(String, Params)>>,
}

impl FakeCaller {
    pub fn new<F>(handler: F) -> Self
    where
        F: Fn(&str, &Params) -> Result<Value, ApiError> + Send + Sync + 'static,
    {
        Self {
            handler: Box::new(handler),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Serve `page_sizes.len()` pages of `{"id": "app-N"}` records, chained
    /// by cursors `c1`, `c2`, ... The last page reports no more data.
    pub fn paged(page_sizes: Vec<usize>) -> Self {
        Self::new(move |_op, params| {
            let index = params
                .get("cursor")
                .and_then(Value::as_str)
                .and_then(|c| c.trim_start_matches('c').parse::<usize>().ok())
                .unwrap_or(0);
            let offset: usize = page_sizes[..index].iter().sum();
            let last = index + 1 == page_sizes.len();
            let ids = (offset..offset + page_sizes[index]).collect::<Vec<_>>();
            let cursor = if last { String::new() } else { format!("c{}", index + 1) };
            Ok(page_json(&ids, !last, &cursor))
        })
    }

    pub fn calls(&self) -> Vec<(String, Params)> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

#[async_trait]
impl Caller for FakeCaller {
    async fn call(&self, operation: &str, params: &Params) -> Result<Value, ApiError> {
        self.calls
            .lock()
            .unwrap()
            .push((operation.to_string(), params.clone()));
        (self.handler)(operation, params)
    }
}

/// A list-endpoint envelope holding `{"id": "app-N"}` records
pub fn page_json(ids: &[usize], more: bool, cursor: &str) -> Value {
    let results: Vec<Value> = ids.iter().map(|i| json!({ "id": format!("app-{}", i) })).collect();
    json!({
        "success": true,
        "results": results,
        "moreDataAvailable": more,
        "nextCursor": cursor,
    })
}
