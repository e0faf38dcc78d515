use std::time::Duration;

use dulynoted_domain::DulyNotedError;
use tracing::{info, warn};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

/// Environment variable that switches log output to JSON lines
pub const LOG_JSON_ENV: &str = "DULYNOTED_LOG_JSON";

/// Install the global subscriber.
///
/// `RUST_LOG` wins over `default_level`. Logs go to stderr so command output
/// on stdout stays machine readable.
pub fn init_tracing(default_level: &str, json: bool) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let json = json || std::env::var(LOG_JSON_ENV).is_ok_and(|v| !v.is_empty() && v != "0");

    let result = if json {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json().with_target(true).with_writer(std::io::stderr))
            .try_init()
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
            .try_init()
    };
    // A subscriber installed by an embedding host takes precedence
    let _ = result;
}

/// Log the outcome of a command execution with structured fields.
///
/// `command` must be a stable identifier without user data.
#[inline]
pub fn log_command_execution(command: &str, elapsed: Duration, error: Option<&DulyNotedError>) {
    let duration_ms = u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX);

    match error {
        None => info!(command, duration_ms, "command_execution_success"),
        Some(err) if err.is_cancellation() => {
            info!(command, duration_ms, "command_execution_cancelled");
        }
        Some(err) => {
            warn!(command, duration_ms, error_type = error_label(err), "command_execution_failure");
        }
    }
}

/// Convert a `DulyNotedError` into a stable label suitable for logging.
#[inline]
#[must_use]
pub fn error_label(error: &DulyNotedError) -> &'static str {
    match error {
        DulyNotedError::Configuration(_) => "configuration",
        DulyNotedError::AuthorizationCancelled => "cancelled",
        DulyNotedError::NoRedirect => "no_redirect",
        DulyNotedError::OAuth { .. } => "oauth",
        DulyNotedError::MalformedCallback(_) => "malformed_callback",
        DulyNotedError::StateMismatch => "state_mismatch",
        DulyNotedError::TokenExchangeFailed { .. } => "token_exchange",
        DulyNotedError::TokenRefreshFailed { .. } => "token_refresh",
        DulyNotedError::NotAuthenticated(_) => "not_authenticated",
        DulyNotedError::Storage(_) => "storage",
        DulyNotedError::Network(_) => "network",
        DulyNotedError::Api { .. } => "api",
        DulyNotedError::InvalidInput(_) => "invalid_input",
        DulyNotedError::Internal(_) => "internal",
    }
}
