use crate::logging::LogFormat;

/// Default log filter expression used by the binaries.
pub const DEFAULT_LOG_FILTER: &str = "info";

/// Interval between two initialisation attempts, in milliseconds.
pub const DEFAULT_INIT_POLL_INTERVAL_MS: u64 = 100;

/// Initialisation attempts made before the host gives up.
pub const DEFAULT_INIT_POLL_MAX_ATTEMPTS: u32 = 100;

/// Default log filter expression used by the binaries.
#[must_use]
pub const fn default_log_filter() -> &'static str {
    DEFAULT_LOG_FILTER
}

/// Owned log filter value used where allocation is required (e.g. serde).
#[must_use]
pub fn default_log_filter_string() -> String {
    DEFAULT_LOG_FILTER.to_owned()
}

/// Default logging format for the binaries.
#[must_use]
pub const fn default_log_format() -> LogFormat {
    LogFormat::Json
}

/// Default interval between initialisation attempts.
#[must_use]
pub const fn default_init_poll_interval_ms() -> u64 {
    DEFAULT_INIT_POLL_INTERVAL_MS
}

/// Default number of initialisation attempts.
#[must_use]
pub const fn default_init_poll_max_attempts() -> u32 {
    DEFAULT_INIT_POLL_MAX_ATTEMPTS
}
