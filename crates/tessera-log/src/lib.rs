//! Structured logging for the Tessera tools.
//!
//! Thin setup layer over the `tracing` ecosystem: console output with
//! uptime timestamps and module targets, filterable via `RUST_LOG`.

use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Default filter when neither `RUST_LOG` nor a caller override is set.
pub const DEFAULT_FILTER: &str = "info";

/// Initialize the tracing subscriber.
///
/// `filter` overrides the default level spec; `RUST_LOG` wins over both.
/// Call once at startup; a second call panics inside `tracing`.
pub fn init_logging(filter: Option<&str>) {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(filter.unwrap_or(DEFAULT_FILTER)));

    let console_layer = fmt::layer()
        .with_target(true)
        .with_level(true)
        .with_timer(fmt::time::uptime());

    tracing_subscriber::registry()
        .with(env_filter)
        .with(console_layer)
        .init();
}

/// An `EnvFilter` with the default filter string, for tests and tools that
/// build their own subscriber.
pub fn default_env_filter() -> EnvFilter {
    EnvFilter::new(DEFAULT_FILTER)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_filter_parses() {
        let filter = default_env_filter();
        assert!(format!("{}", filter).contains("info"));
    }

    #[test]
    fn test_env_filter_accepts_per_target_levels() {
        let specs = ["info", "debug,tessera_atlas=trace", "warn,tessera_settings=debug"];
        for spec in &specs {
            assert!(EnvFilter::try_new(spec).is_ok(), "failed to parse {spec}");
        }
    }
}
