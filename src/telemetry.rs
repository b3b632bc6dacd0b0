use thiserror::Error;
use tracing_subscriber::filter::ParseError;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Error)]
pub enum TelemetryError {
    #[error("invalid log filter '{value}'")]
    EnvFilter {
        value: String,
        #[source]
        source: ParseError,
    },

    #[error("logging setup failed: {0}")]
    Subscriber(#[source] Box<dyn std::error::Error + Send + Sync>),
}

/// Default filter when RUST_LOG is unset
pub fn default_level(verbose: bool) -> &'static str {
    if verbose {
        "debug"
    } else {
        "info"
    }
}

/// Install a compact stderr subscriber. RUST_LOG overrides the level.
/// Stdout stays clean for table and JSON output.
pub fn init(verbose: bool) -> Result<(), TelemetryError> {
    let level = default_level(verbose);
    let env_filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(level).map_err(|source| TelemetryError::EnvFilter {
            value: level.to_string(),
            source,
        })?,
    };

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .try_init()
        .map_err(TelemetryError::Subscriber)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_level() {
        assert_eq!(default_level(false), "info");
        assert_eq!(default_level(true), "debug");
    }

    #[test]
    fn test_bad_filter_error_keeps_source() {
        use std::error::Error as _;

        let source = EnvFilter::try_new("ashby_screen=loud").unwrap_err();
        let err = TelemetryError::EnvFilter {
            value: "ashby_screen=loud".to_string(),
            source,
        };
        assert_eq!(err.to_string(), "invalid log filter 'ashby_screen=loud'");
        assert!(err.source().is_some());
    }

    #[test]
    fn test_default_levels_parse() {
        assert!(EnvFilter::try_new(default_level(false)).is_ok());
        assert!(EnvFilter::try_new(default_level(true)).is_ok());
    }
}
