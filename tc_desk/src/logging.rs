//! Structured logging configuration.
//!
//! Log lines go to stderr so command output on stdout stays machine-readable.
//! Records from the `log` facade used by `team_chess` are captured as well.

use std::time::Duration;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Filter used when `RUST_LOG` is not set
pub const DEFAULT_FILTER: &str = "info,sqlx=warn";

/// Initialize structured logging
///
/// Log levels are configurable via the `RUST_LOG` env var.
///
/// # Example
///
/// ```no_run
/// use tc_desk::logging;
///
/// logging::init();
/// tracing::info!("Desk starting");
/// ```
pub fn init() {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true);

    // A second init in the same process (tests) keeps the first subscriber
    let _ = tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .try_init();
}

/// Log how long a command took
///
/// # Arguments
///
/// * `command` - Command name
/// * `elapsed` - Wall time of the command
/// * `ok` - Whether the command succeeded
pub fn log_command(command: &str, elapsed: Duration, ok: bool) {
    let duration_ms = elapsed.as_millis() as u64;
    if !ok {
        tracing::warn!(command = command, duration_ms = duration_ms, "Command failed");
    } else if duration_ms > 1000 {
        tracing::warn!(
            command = command,
            duration_ms = duration_ms,
            "PERFORMANCE: Slow command"
        );
    } else {
        tracing::debug!(command = command, duration_ms = duration_ms, "Command finished");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_twice_does_not_panic() {
        init();
        init();
    }

    #[test]
    fn test_log_command() {
        log_command("standings", Duration::from_millis(12), true);
        log_command("schedule", Duration::from_secs(2), true);
        log_command("record", Duration::from_millis(3), false);
    }
}
