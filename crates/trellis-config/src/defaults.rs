//! Default values for client configuration.

/// Seconds to wait for a correlated reply before the transport gives up.
pub(crate) const TIMEOUT_SECS: u64 = 30;

/// Default tracing filter expression.
pub(crate) const LOG_FILTER: &str = "info";
