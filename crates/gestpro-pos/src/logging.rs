//! Tracing subscriber setup for the terminal and the admin binary.

use tracing_subscriber::EnvFilter;

/// Used when neither `RUST_LOG` nor the config sets a filter.
pub const DEFAULT_LOG_FILTER: &str = "info,gestpro=debug,sqlx=warn";

/// Initializes the global tracing subscriber.
///
/// ## Log Levels
/// - `RUST_LOG=debug` - Show debug messages
/// - `RUST_LOG=gestpro_db=trace` - Trace the database layer only
/// - Otherwise `config_filter`, falling back to [`DEFAULT_LOG_FILTER`]
///
/// Safe to call twice; the second call is a no-op.
pub fn init_tracing(config_filter: Option<&str>) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        config_filter
            .and_then(|f| EnvFilter::try_new(f).ok())
            .unwrap_or_else(|| EnvFilter::new(DEFAULT_LOG_FILTER))
    });

    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}
