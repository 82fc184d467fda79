//! The aggregated client configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use trellis_value::EditOperation;

use crate::defaults;
use crate::policy::{BadDataPolicy, Datastore, ErrorOption, LogFormat, TestOption};

/// Per-session client configuration.
///
/// Every field has a protocol-sensible default, so `ClientConfig::default()`
/// is a working interactive configuration. Serde derives let a front end
/// deserialise a layered source on top.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct ClientConfig {
    default_target: Datastore,
    test_option: TestOption,
    error_option: ErrorOption,
    default_operation: EditOperation,
    timeout_secs: u64,
    fill_optional_nodes: bool,
    bad_data_policy: BadDataPolicy,
    log_filter: String,
    log_format: LogFormat,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            default_target: Datastore::default(),
            test_option: TestOption::default(),
            error_option: ErrorOption::default(),
            default_operation: EditOperation::default(),
            timeout_secs: defaults::TIMEOUT_SECS,
            fill_optional_nodes: false,
            bad_data_policy: BadDataPolicy::default(),
            log_filter: defaults::LOG_FILTER.into(),
            log_format: LogFormat::default(),
        }
    }
}

impl ClientConfig {
    /// The datastore edits target when none is named explicitly.
    #[must_use]
    pub const fn default_target(&self) -> Datastore {
        self.default_target
    }

    /// The edit validation policy.
    #[must_use]
    pub const fn test_option(&self) -> TestOption {
        self.test_option
    }

    /// The edit error-recovery policy.
    #[must_use]
    pub const fn error_option(&self) -> ErrorOption {
        self.error_option
    }

    /// The edit operation applied to nodes without their own tag.
    #[must_use]
    pub const fn default_operation(&self) -> EditOperation {
        self.default_operation
    }

    /// How long to wait for a correlated reply.
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Whether fills prompt for optional nodes too.
    #[must_use]
    pub const fn fill_optional_nodes(&self) -> bool {
        self.fill_optional_nodes
    }

    /// The response to schema-invalid values.
    #[must_use]
    pub const fn bad_data_policy(&self) -> BadDataPolicy {
        self.bad_data_policy
    }

    /// The tracing filter expression.
    #[must_use]
    pub fn log_filter(&self) -> &str {
        &self.log_filter
    }

    /// The telemetry output format.
    #[must_use]
    pub const fn log_format(&self) -> LogFormat {
        self.log_format
    }

    /// Sets the default datastore target.
    pub fn set_default_target(&mut self, target: Datastore) {
        self.default_target = target;
    }

    /// Sets the edit validation policy.
    pub fn set_test_option(&mut self, option: TestOption) {
        self.test_option = option;
    }

    /// Sets the edit error-recovery policy.
    pub fn set_error_option(&mut self, option: ErrorOption) {
        self.error_option = option;
    }

    /// Sets the default edit operation.
    pub fn set_default_operation(&mut self, operation: EditOperation) {
        self.default_operation = operation;
    }

    /// Sets the reply timeout.
    pub fn set_timeout(&mut self, timeout: Duration) {
        self.timeout_secs = timeout.as_secs();
    }

    /// Sets whether fills prompt for optional nodes.
    pub fn set_fill_optional_nodes(&mut self, fill: bool) {
        self.fill_optional_nodes = fill;
    }

    /// Sets the bad-data policy.
    pub fn set_bad_data_policy(&mut self, policy: BadDataPolicy) {
        self.bad_data_policy = policy;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_protocol_sensible() {
        let config = ClientConfig::default();
        assert_eq!(config.default_target(), Datastore::Running);
        assert_eq!(config.test_option(), TestOption::TestThenSet);
        assert_eq!(config.error_option(), ErrorOption::StopOnError);
        assert_eq!(config.default_operation(), EditOperation::Merge);
        assert_eq!(config.timeout(), Duration::from_secs(30));
        assert!(!config.fill_optional_nodes());
        assert_eq!(config.bad_data_policy(), BadDataPolicy::AskUser);
    }

    #[test]
    fn deserialises_partial_sources() {
        let config: ClientConfig =
            serde_json::from_str(r#"{"default-target":"candidate","timeout-secs":5}"#)
                .expect("partial config parses");
        assert_eq!(config.default_target(), Datastore::Candidate);
        assert_eq!(config.timeout(), Duration::from_secs(5));
        assert_eq!(config.bad_data_policy(), BadDataPolicy::AskUser);
    }
}
