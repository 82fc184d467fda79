//! Error types for the session layer.

use thiserror::Error;

use crate::state::SessionState;
use crate::transport::TransportError;

/// Errors surfaced by session operations.
///
/// A busy rejection is not an error — [`crate::SendDisposition`] reports
/// it in-band so callers are forced to handle it separately from real
/// failures.
#[derive(Debug, Error)]
pub enum SessionError {
    /// The session holds no usable connection for this operation.
    #[error("session is not connected (state: {state})")]
    NotConnected {
        /// The state the session was in.
        state: SessionState,
    },

    /// The operation is not legal in the current state.
    #[error("cannot {operation} while {state}")]
    InvalidTransition {
        /// The attempted operation.
        operation: String,
        /// The state that refused it.
        state: SessionState,
    },

    /// The session has shut down and accepts nothing further.
    #[error("session has shut down")]
    Shutdown,

    /// The transport failed.
    #[error(transparent)]
    Transport(#[from] TransportError),
}

impl SessionError {
    /// Creates a not-connected error.
    #[must_use]
    pub const fn not_connected(state: SessionState) -> Self {
        Self::NotConnected { state }
    }

    /// Creates an invalid-transition error.
    pub fn invalid_transition(operation: impl Into<String>, state: SessionState) -> Self {
        Self::InvalidTransition {
            operation: operation.into(),
            state,
        }
    }
}
