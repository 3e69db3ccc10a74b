//! Tracing subscriber setup for hosts embedding the gate.

use tower_http::classify::{ServerErrorsAsFailures, SharedClassifier};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{EnvFilter, fmt};

use tenantgate_core::config::LoggingConfig;
use tenantgate_core::error::AppError;
use tenantgate_core::result::AppResult;

/// Installs the global subscriber. `RUST_LOG` overrides the configured
/// level; `format = "json"` selects structured output, anything else is
/// pretty-printed.
pub fn init_logging(config: &LoggingConfig) -> AppResult<()> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level));

    let result = match config.format.as_str() {
        "json" => fmt()
            .json()
            .with_env_filter(filter)
            .with_target(true)
            .with_thread_ids(true)
            .try_init(),
        _ => fmt()
            .pretty()
            .with_env_filter(filter)
            .with_target(true)
            .try_init(),
    };

    result.map_err(|e| AppError::configuration(format!("Failed to install subscriber: {e}")))
}

/// HTTP span layer for the router.
pub fn http_trace_layer() -> TraceLayer<SharedClassifier<ServerErrorsAsFailures>> {
    TraceLayer::new_for_http()
}
