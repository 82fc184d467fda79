//! Session layer for the Trellis request engine.
//!
//! One [`Session`] owns one connection's request/reply lifecycle: it
//! gates sends through the state machine (never more than one request
//! outstanding), correlates asynchronous replies by id, and tracks the
//! peer's advertised capabilities. The transport itself — socket bytes,
//! framing, authentication — lives behind the [`Transport`] seam.

mod error;
mod reply;
mod session;
mod state;
pub mod telemetry;
mod transport;

pub use error::SessionError;
pub use reply::{Reply, ReplyOutcome};
pub use session::{SendDisposition, Session};
pub use state::SessionState;
pub use transport::{RequestId, Transport, TransportError};
