//! Logging setup for hosts.
//!
//! The library itself only emits `log` and `tracing` events; installing a
//! subscriber is the host's call, made once at startup. `init_logging`
//! bridges `log` records into `tracing` and installs a fmt subscriber
//! honoring `RUST_LOG`.

use crate::error::JobtrailError;

/// Installs the global tracing subscriber. `default_filter` applies when
/// `RUST_LOG` is unset (e.g. `"info"` or `"jobtrail=debug"`).
///
/// Fails if a global subscriber is already installed.
pub fn init_logging(default_filter: &str) -> Result<(), JobtrailError> {
    tracing_log::LogTracer::init().map_err(|e| JobtrailError::Internal {
        message: format!("log bridge already installed: {}", e),
    })?;

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_filter));

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .finish();

    tracing::subscriber::set_global_default(subscriber).map_err(|e| JobtrailError::Internal {
        message: format!("subscriber already installed: {}", e),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    #[serial]
    fn test_init_logging_is_single_shot() {
        // First call wins; a second install must fail instead of silently
        // replacing the subscriber.
        let first = init_logging("info");
        let second = init_logging("info");
        assert!(first.is_ok() || second.is_err());
        assert!(second.is_err());
    }
}
