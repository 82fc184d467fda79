//! Protocol and client policy enums.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Response to a value that fails schema validation.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum BadDataPolicy {
    /// Accept the value silently.
    Ignore,
    /// Accept the value and log a warning.
    Warn,
    /// Re-prompt, offering accept-anyway, retry, or cancel/skip.
    #[default]
    AskUser,
    /// Reject immediately.
    Error,
}

/// Edit-request validation policy advertised to the peer.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum TestOption {
    /// Validate, then apply (the protocol default).
    #[default]
    TestThenSet,
    /// Apply without a separate validation pass.
    Set,
    /// Validate only; never apply.
    TestOnly,
}

/// Edit-request error recovery policy advertised to the peer.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum ErrorOption {
    /// Abort on the first error (the protocol default).
    #[default]
    StopOnError,
    /// Keep applying after errors.
    ContinueOnError,
    /// Roll the datastore back on any error.
    RollbackOnError,
}

/// A configuration datastore on the peer.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum Datastore {
    /// The active configuration.
    #[default]
    Running,
    /// The staging configuration.
    Candidate,
    /// The boot configuration.
    Startup,
}

/// Log output format for the telemetry subscriber.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum LogFormat {
    /// Human-readable single-line output.
    #[default]
    Compact,
    /// Structured JSON lines.
    Json,
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use super::*;

    #[test]
    fn policies_round_trip_as_strings() {
        assert_eq!(BadDataPolicy::AskUser.to_string(), "ask-user");
        assert_eq!(
            BadDataPolicy::from_str("ask-user").ok(),
            Some(BadDataPolicy::AskUser)
        );
        assert_eq!(TestOption::TestThenSet.to_string(), "test-then-set");
        assert_eq!(
            ErrorOption::from_str("rollback-on-error").ok(),
            Some(ErrorOption::RollbackOnError)
        );
        assert_eq!(Datastore::from_str("candidate").ok(), Some(Datastore::Candidate));
        assert!(Datastore::from_str("flash").is_err());
    }
}
