//! Logging setup for the emoji chat binaries.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Library crates whose logs follow the binary's default level.
const LIBRARY_TARGETS: &[&str] = &["emoji_chat_client", "emoji_chat_shared"];

/// Build the default filter directive used when `RUST_LOG` is not set.
///
/// Cargo binary names may contain `-`, tracing targets use `_`.
fn default_directive(binary_name: &str, default_log_level: &str) -> String {
    LIBRARY_TARGETS
        .iter()
        .copied()
        .chain(std::iter::once(binary_name))
        .map(|target| format!("{}={}", target.replace('-', "_"), default_log_level))
        .collect::<Vec<_>>()
        .join(",")
}

/// Initialize the tracing subscriber with the specified default log level.
///
/// The log level can be overridden using the `RUST_LOG` environment variable.
///
/// # Arguments
///
/// * `binary_name` - The name of the binary (e.g., "emoji-chat")
/// * `default_log_level` - The default log level (e.g., "debug", "info", "warn", "error")
///
/// # Examples
///
/// ```no_run
/// use emoji_chat_shared::logger::setup_logger;
///
/// setup_logger("emoji-chat", "info");
/// ```
pub fn setup_logger(binary_name: &str, default_log_level: &str) {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_directive(binary_name, default_log_level).into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}
