use anyhow::Context;
use async_trait::async_trait;
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{Map, Value};
use std::time::Duration;

use crate::ashby::error::ApiError;
use crate::config::ApiConfig;

/// Ashby API root
pub const DEFAULT_BASE_URL: &str = "https://api.ashbyhq.com";

/// Per-request timeout applied by `HttpCaller`
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Request body for a remote operation. Key order is preserved.
pub type Params = Map<String, Value>;

/// Calls a named remote operation and returns the decoded JSON response.
///
/// Implementations must surface transport, HTTP status and `success: false`
/// failures as `ApiError`. Tests substitute an in-memory fake.
#[async_trait]
pub trait Caller: Send + Sync {
    async fn call(&self, operation: &str, params: &Params) -> Result<Value, ApiError>;
}

/// Decode a response value into a typed target, tagging failures with the operation.
pub fn decode<T: DeserializeOwned>(operation: &str, value: Value) -> Result<T, ApiError> {
    serde_json::from_value(value).map_err(|source| ApiError::Decode {
        operation: operation.to_string(),
        source,
    })
}

/// Call `operation` and decode the response into `T`
pub async fn call_as<T: DeserializeOwned>(
    caller: &dyn Caller,
    operation: &str,
    params: &Params,
) -> Result<T, ApiError> {
    let value = caller.call(operation, params).await?;
    decode(operation, value)
}

/// Fields every Ashby response carries, read before the full decode
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Envelope {
    #[serde(default)]
    success: bool,
    #[serde(default)]
    error_info: Option<ErrorInfo>,
    #[serde(default)]
    errors: Option<Vec<String>>,
}

#[derive(Debug, Deserialize)]
struct ErrorInfo {
    #[serde(default)]
    message: String,
}

impl Envelope {
    fn error_message(self) -> String {
        if let Some(info) = self.error_info {
            return info.message;
        }
        self.errors
            .and_then(|errors| errors.into_iter().next())
            .unwrap_or_else(|| "unknown error".to_string())
    }
}

/// `Caller` backed by the Ashby REST API: JSON POST bodies with Basic auth
pub struct HttpCaller {
    base_url: String,
    api_key: String,
    http: reqwest::Client,
}

impl HttpCaller {
    pub fn new(api_key: &str, base_url: &str, timeout: Duration) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            http,
        })
    }
}

#[async_trait]
impl Caller for HttpCaller {
    async fn call(&self, operation: &str, params: &Params) -> Result<Value, ApiError> {
        let transport = |source| ApiError::Transport {
            operation: operation.to_string(),
            source,
        };

        let response = self
            .http
            .post(format!("{}/{}", self.base_url, operation))
            .basic_auth(&self.api_key, None::<&str>)
            .json(params)
            .send()
            .await
            .map_err(transport)?;

        let status = response.status();
        let body = response.bytes().await.map_err(transport)?;
        tracing::debug!(operation, status = status.as_u16(), bytes = body.len(), "ashby response");

        // HTTP-level errors take precedence over the JSON envelope
        if status == StatusCode::UNAUTHORIZED {
            return Err(ApiError::Unauthorized {
                operation: operation.to_string(),
            });
        }
        if status == StatusCode::FORBIDDEN {
            return Err(ApiError::Forbidden {
                operation: operation.to_string(),
            });
        }
        if !status.is_success() {
            return Err(ApiError::Status {
                operation: operation.to_string(),
                status: status.as_u16(),
                body: String::from_utf8_lossy(&body).into_owned(),
            });
        }

        let value: Value = serde_json::from_slice(&body).map_err(|source| ApiError::Decode {
            operation: operation.to_string(),
            source,
        })?;

        let envelope = Envelope::deserialize(&value).map_err(|source| ApiError::Decode {
            operation: operation.to_string(),
            source,
        })?;
        if !envelope.success {
            return Err(ApiError::Api {
                operation: operation.to_string(),
                message: envelope.error_message(),
            });
        }

        Ok(value)
    }
}

/// Create an authenticated Ashby caller from the API section of the config
pub fn create_client(api_key: &str, config: &ApiConfig) -> anyhow::Result<HttpCaller> {
    let timeout = config.timeout_duration()?;
    HttpCaller::new(api_key, config.base_url(), timeout)
        .context("Failed to create Ashby client")
}
