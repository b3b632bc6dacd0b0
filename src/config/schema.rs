use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::ashby::client::{DEFAULT_BASE_URL, DEFAULT_TIMEOUT};
use crate::screening::Tier;

#[derive(Debug, Default, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub api: ApiConfig,
    pub screening: ScreeningConfig,
}

#[derive(Debug, Default, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct ApiConfig {
    /// Override the API root, e.g. for a proxy
    pub base_url: Option<String>,
    /// Per-request timeout as a human-readable duration ("30s", "2m")
    pub timeout: Option<String>,
}

impl ApiConfig {
    pub fn base_url(&self) -> &str {
        self.base_url
            .as_deref()
            .map(|url| url.trim_end_matches('/'))
            .filter(|url| !url.is_empty())
            .unwrap_or(DEFAULT_BASE_URL)
    }

    pub fn timeout_duration(&self) -> Result<Duration> {
        match self.timeout.as_deref() {
            Some(raw) => humantime::parse_duration(raw)
                .with_context(|| format!("Invalid api.timeout '{}'", raw)),
            None => Ok(DEFAULT_TIMEOUT),
        }
    }
}

/// Defaults for the `screen` command. CLI flags take precedence.
#[derive(Debug, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct ScreeningConfig {
    pub status: Option<String>,
    pub min_tier: Option<Tier>,
    pub enrich: bool,
    pub enrich_concurrency: usize,
}

impl Default for ScreeningConfig {
    fn default() -> Self {
        Self {
            status: None,
            min_tier: None,
            enrich: false,
            enrich_concurrency: 1,
        }
    }
}
