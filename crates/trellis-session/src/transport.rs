//! The transport seam.
//!
//! The session layer never touches bytes: establishing a connection,
//! framing a request body, and tearing the link down are the transport's
//! business. Replies come back asynchronously through
//! [`crate::Session::handle_reply`], carrying the id issued at send time.

use std::io;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[cfg(test)]
use mockall::automock;

use trellis_engine::{PeerCapabilities, RequestBody};

/// Correlation id for one outstanding request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RequestId(pub u64);

/// Errors surfaced by a transport implementation.
#[derive(Debug, Error)]
pub enum TransportError {
    /// The underlying stream failed.
    #[error("transport IO failure: {0}")]
    Io(#[from] io::Error),

    /// The transport refused the request before sending it.
    #[error("transport rejected the request: {0}")]
    Rejected(String),

    /// The peer closed the connection.
    #[error("connection closed by peer")]
    Closed,
}

/// A protocol transport carrying request bodies to one peer.
#[cfg_attr(test, automock)]
pub trait Transport {
    /// Establishes the connection, returning the peer's advertised
    /// capabilities from the hello exchange.
    ///
    /// # Errors
    ///
    /// Returns a [`TransportError`] when session establishment fails.
    fn establish(&mut self) -> Result<PeerCapabilities, TransportError>;

    /// Encodes and sends one request body under the given id.
    ///
    /// # Errors
    ///
    /// Returns a [`TransportError`] when the request could not be handed
    /// to the peer; the session then stays in its prior state.
    fn send(&mut self, id: RequestId, body: &RequestBody) -> Result<(), TransportError>;

    /// Tears the connection down.
    ///
    /// # Errors
    ///
    /// Returns a [`TransportError`] when teardown fails; the session
    /// treats this as advisory and finishes regardless.
    fn close(&mut self) -> Result<(), TransportError>;
}
