use thiserror::Error;
use tracing_subscriber::filter::ParseError;
use tracing_subscriber::EnvFilter;

/// Environment variable holding a tracing filter directive.
pub const LOG_ENV: &str = "SAJU_MATCH_LOG";

const DEFAULT_LEVEL: &str = "warn";

#[derive(Debug, Error)]
pub enum TelemetryError {
    #[error("invalid log level/filter '{value}': unable to build EnvFilter")]
    EnvFilter {
        value: String,
        #[source]
        source: ParseError,
    },
    #[error("telemetry error: {0}")]
    Subscriber(Box<dyn std::error::Error + Send + Sync>),
}

/// Pick the filter directive: `--verbose`, then the environment value, then
/// the configured level, then `warn`. An unset or empty environment value
/// falls through; an invalid one is an error.
fn build_filter(
    env_value: Option<&str>,
    level: Option<&str>,
    verbose: bool,
) -> Result<EnvFilter, TelemetryError> {
    if verbose {
        return parse_filter("debug");
    }
    match env_value.map(str::trim).filter(|v| !v.is_empty()) {
        Some(value) => parse_filter(value),
        None => parse_filter(level.unwrap_or(DEFAULT_LEVEL)),
    }
}

fn parse_filter(value: &str) -> Result<EnvFilter, TelemetryError> {
    EnvFilter::try_new(value).map_err(|source| TelemetryError::EnvFilter {
        value: value.to_string(),
        source,
    })
}

/// Install the global subscriber. Logs go to stderr; stdout carries results.
pub fn init(level: Option<&str>, verbose: bool) -> Result<(), TelemetryError> {
    let env_value = std::env::var(LOG_ENV).ok();
    let env_filter = build_filter(env_value.as_deref(), level, verbose)?;

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .try_init()
        .map_err(TelemetryError::Subscriber)
}
