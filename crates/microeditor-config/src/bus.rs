//! Settings consumed by each envelope bus instance.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use crate::defaults::{default_init_poll_interval_ms, default_init_poll_max_attempts};

/// What a bus does with a request it has no handler for.
#[derive(
    Debug, Clone, Copy, Default, Deserialize, Serialize, PartialEq, Eq, EnumString, Display,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum UnhandledRequestPolicy {
    /// Answer with an `unhandled_request` error return so the caller fails
    /// fast.
    #[default]
    RespondWithError,
    /// Drop the request; the caller waits for its own timeout.
    Drop,
}

/// Per-bus settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BusConfig {
    /// Deadline applied to requests without an explicit timeout. `None`
    /// waits until the return arrives or the bus is disposed.
    pub request_timeout_ms: Option<u64>,
    /// Handling of requests without a registered handler.
    pub unhandled_requests: UnhandledRequestPolicy,
    /// Interval between initialisation attempts made by the host.
    pub init_poll_interval_ms: u64,
    /// Initialisation attempts made before the host gives up.
    pub init_poll_max_attempts: u32,
}

impl Default for BusConfig {
    fn default() -> Self {
        Self {
            request_timeout_ms: None,
            unhandled_requests: UnhandledRequestPolicy::default(),
            init_poll_interval_ms: default_init_poll_interval_ms(),
            init_poll_max_attempts: default_init_poll_max_attempts(),
        }
    }
}

impl BusConfig {
    /// Default request deadline as a [`Duration`].
    #[must_use]
    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_ms.map(Duration::from_millis)
    }

    /// Interval between initialisation attempts as a [`Duration`].
    #[must_use]
    pub const fn init_poll_interval(&self) -> Duration {
        Duration::from_millis(self.init_poll_interval_ms)
    }

    /// Sets the default request deadline.
    #[must_use]
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout_ms = Some(u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX));
        self
    }

    /// Sets the unhandled request policy.
    #[must_use]
    pub const fn with_unhandled_requests(mut self, policy: UnhandledRequestPolicy) -> Self {
        self.unhandled_requests = policy;
        self
    }
}
