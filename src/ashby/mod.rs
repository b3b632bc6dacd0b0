pub mod applications;
pub mod client;
pub mod error;
pub mod paginate;
pub mod types;

#[cfg(test)]
pub(crate) mod fake;

pub use applications::{get_application, list_applications, ListApplicationsOpts, ListApplicationsResult};
pub use client::{call_as, create_client, Caller, HttpCaller, Params};
pub use error::ApiError;
pub use paginate::{fetch_page, paginate, PageResult};
pub use types::{Expand, Record};
