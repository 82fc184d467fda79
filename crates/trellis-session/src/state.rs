//! The per-session connection state.

use serde::{Deserialize, Serialize};
use strum::Display;

/// Connection state of one session.
///
/// The state cell is the single synchronisation point between the
/// synchronous engine thread and the transport's asynchronous reply
/// delivery; the machine itself guarantees at most one request is ever
/// outstanding.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, Display)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum SessionState {
    /// No connection.
    #[default]
    Idle,
    /// A connection attempt is in flight.
    Connecting,
    /// Connected with no request outstanding.
    ConnIdle,
    /// One request outstanding, awaiting its correlated reply.
    ReplyWait,
    /// The operator gave up on the outstanding reply.
    CancelWait,
    /// A close-session request was acknowledged; teardown in progress.
    CloseWait,
    /// Terminal: the session is finished.
    Shutdown,
}

impl SessionState {
    /// Whether a new request may be issued right now.
    #[must_use]
    pub const fn can_send(self) -> bool {
        matches!(self, Self::ConnIdle)
    }

    /// Whether a request is outstanding (sends are rejected as busy).
    #[must_use]
    pub const fn is_busy(self) -> bool {
        matches!(self, Self::ReplyWait | Self::CancelWait)
    }

    /// Whether the session holds a live connection.
    #[must_use]
    pub const fn is_connected(self) -> bool {
        matches!(
            self,
            Self::ConnIdle | Self::ReplyWait | Self::CancelWait | Self::CloseWait
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_conn_idle_can_send() {
        assert!(SessionState::ConnIdle.can_send());
        assert!(!SessionState::Idle.can_send());
        assert!(!SessionState::ReplyWait.can_send());
        assert!(!SessionState::Shutdown.can_send());
    }

    #[test]
    fn busy_states_cover_both_wait_modes() {
        assert!(SessionState::ReplyWait.is_busy());
        assert!(SessionState::CancelWait.is_busy());
        assert!(!SessionState::ConnIdle.is_busy());
    }
}
