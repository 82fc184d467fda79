//! The session: one connection's request/reply lifecycle.

use tracing::{debug, info, warn};

use trellis_config::ClientConfig;
use trellis_engine::{PeerCapabilities, RequestBody};

use crate::error::SessionError;
use crate::reply::Reply;
use crate::state::SessionState;
use crate::transport::{RequestId, Transport};

const SESSION_TARGET: &str = "trellis::session";

/// Result of attempting to send a request.
#[derive(Debug, PartialEq, Eq)]
pub enum SendDisposition {
    /// The request went out under this id.
    Sent(RequestId),
    /// A request is already outstanding; nothing was sent and the
    /// session was not touched.
    RejectedBusy,
}

/// The id and nature of the one outstanding request.
#[derive(Debug, Clone, Copy)]
struct Outstanding {
    id: RequestId,
    is_close: bool,
}

/// One protocol session over a transport.
///
/// The session enforces the single-outstanding-request discipline: a
/// send is only accepted in `ConnIdle`, and the state moves back from
/// `ReplyWait` when the transport delivers the correlated reply. All
/// value trees and configuration here are exclusively owned by this
/// session.
#[derive(Debug)]
pub struct Session<T> {
    state: SessionState,
    config: ClientConfig,
    capabilities: PeerCapabilities,
    transport: T,
    next_id: u64,
    outstanding: Option<Outstanding>,
}

impl<T: Transport> Session<T> {
    /// Creates a disconnected session.
    #[must_use]
    pub fn new(config: ClientConfig, transport: T) -> Self {
        Self {
            state: SessionState::Idle,
            config,
            capabilities: PeerCapabilities::none(),
            transport,
            next_id: 1,
            outstanding: None,
        }
    }

    /// The current connection state.
    #[must_use]
    pub const fn state(&self) -> SessionState {
        self.state
    }

    /// The session configuration.
    #[must_use]
    pub const fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Mutable access to the session configuration.
    pub fn config_mut(&mut self) -> &mut ClientConfig {
        &mut self.config
    }

    /// The peer's advertised capabilities (empty until connected).
    #[must_use]
    pub const fn capabilities(&self) -> &PeerCapabilities {
        &self.capabilities
    }

    /// Attempts to establish the connection.
    ///
    /// Legal from `Idle` (fresh connect) and `ConnIdle` (reconnect). On
    /// failure the session returns to `Idle`.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::InvalidTransition`] from other states and
    /// [`SessionError::Transport`] when establishment fails.
    pub fn connect(&mut self) -> Result<(), SessionError> {
        match self.state {
            SessionState::Idle | SessionState::ConnIdle => {}
            SessionState::Shutdown => return Err(SessionError::Shutdown),
            state => return Err(SessionError::invalid_transition("connect", state)),
        }
        self.state = SessionState::Connecting;
        match self.transport.establish() {
            Ok(capabilities) => {
                info!(target: SESSION_TARGET, "session established");
                self.capabilities = capabilities;
                self.state = SessionState::ConnIdle;
                Ok(())
            }
            Err(error) => {
                warn!(target: SESSION_TARGET, %error, "session establishment failed");
                self.state = SessionState::Idle;
                Err(error.into())
            }
        }
    }

    /// Attempts to send an assembled request body.
    ///
    /// While a request is outstanding the send is rejected as busy and
    /// the session is left exactly as it was — callers check the
    /// disposition before building another request. A transport failure
    /// keeps the session in its prior state; the body is consumed and
    /// dropped on every non-sent path, never left attached to the
    /// session.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::NotConnected`] outside a connected state
    /// and [`SessionError::Transport`] when the transport refuses the
    /// request.
    pub fn try_send(&mut self, body: RequestBody) -> Result<SendDisposition, SessionError> {
        if self.state.is_busy() {
            debug!(target: SESSION_TARGET, state = %self.state, "send rejected while busy");
            return Ok(SendDisposition::RejectedBusy);
        }
        if self.state == SessionState::Shutdown {
            return Err(SessionError::Shutdown);
        }
        if !self.state.can_send() {
            return Err(SessionError::not_connected(self.state));
        }
        let id = RequestId(self.next_id);
        self.transport.send(id, &body)?;
        self.next_id += 1;
        self.outstanding = Some(Outstanding {
            id,
            is_close: body.is_close_session(),
        });
        self.state = SessionState::ReplyWait;
        debug!(target: SESSION_TARGET, id = id.0, operation = %body.verb(), "request sent");
        Ok(SendDisposition::Sent(id))
    }

    /// Delivers one reply from the transport's receive path.
    ///
    /// A reply correlated with the outstanding request moves the session
    /// back to `ConnIdle` (or on to `CloseWait` when the request was a
    /// close-session) and is returned to the caller. Anything else —
    /// unknown id, no request outstanding, a late reply after a cancel —
    /// is logged and discarded without a state change beyond leaving
    /// `CancelWait`.
    pub fn handle_reply(&mut self, reply: Reply) -> Option<Reply> {
        match self.state {
            SessionState::ReplyWait => {
                let Some(outstanding) = self.outstanding else {
                    warn!(target: SESSION_TARGET, id = reply.id.0, "reply with nothing outstanding");
                    return None;
                };
                if outstanding.id != reply.id {
                    warn!(
                        target: SESSION_TARGET,
                        expected = outstanding.id.0,
                        got = reply.id.0,
                        "uncorrelated reply ignored"
                    );
                    return None;
                }
                self.outstanding = None;
                self.state = if outstanding.is_close {
                    SessionState::CloseWait
                } else {
                    SessionState::ConnIdle
                };
                debug!(target: SESSION_TARGET, id = reply.id.0, state = %self.state, "reply correlated");
                Some(reply)
            }
            SessionState::CancelWait => {
                // The operator stopped waiting; the late reply is dropped.
                debug!(target: SESSION_TARGET, id = reply.id.0, "late reply after cancel");
                self.outstanding = None;
                self.state = SessionState::ConnIdle;
                None
            }
            state => {
                warn!(target: SESSION_TARGET, id = reply.id.0, %state, "unexpected reply ignored");
                None
            }
        }
    }

    /// Stops waiting for the outstanding reply.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::InvalidTransition`] unless a reply is
    /// currently awaited.
    pub fn cancel_outstanding(&mut self) -> Result<(), SessionError> {
        if self.state != SessionState::ReplyWait {
            return Err(SessionError::invalid_transition("cancel", self.state));
        }
        self.state = SessionState::CancelWait;
        Ok(())
    }

    /// Completes teardown after a close-session reply.
    ///
    /// Transport close failures are advisory; the session reaches `Idle`
    /// regardless.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::InvalidTransition`] outside `CloseWait`.
    pub fn complete_close(&mut self) -> Result<(), SessionError> {
        if self.state != SessionState::CloseWait {
            return Err(SessionError::invalid_transition("close", self.state));
        }
        if let Err(error) = self.transport.close() {
            warn!(target: SESSION_TARGET, %error, "transport teardown failed");
        }
        self.capabilities = PeerCapabilities::none();
        self.state = SessionState::Idle;
        info!(target: SESSION_TARGET, "session closed");
        Ok(())
    }

    /// Shuts the session down for good.
    ///
    /// Terminal: every later operation fails with
    /// [`SessionError::Shutdown`]. A live connection is closed
    /// best-effort first.
    pub fn shutdown(&mut self) {
        if self.state.is_connected() {
            if let Err(error) = self.transport.close() {
                warn!(target: SESSION_TARGET, %error, "transport teardown failed");
            }
        }
        self.outstanding = None;
        self.state = SessionState::Shutdown;
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use trellis_engine::assemble_close_request;
    use trellis_schema::{LeafType, SchemaBuilder};
    use trellis_value::{EditOperation, ValueNode};

    use crate::transport::{MockTransport, TransportError};

    use super::*;

    fn edit_body() -> RequestBody {
        let mut builder = SchemaBuilder::new();
        let x = builder.leaf(None, "x", LeafType::Int32);
        let schema = builder.build().expect("schema builds");
        let content = ValueNode::with_value(&schema, x, "5").expect("leaf");
        trellis_engine::assemble_edit_request(
            &schema,
            &ClientConfig::default(),
            None,
            trellis_engine::EditContent::Content(content),
            trellis_engine::EditOptions::new(EditOperation::Merge),
        )
        .expect("assembly succeeds")
        .into_done()
        .expect("not canceled")
    }

    fn connected_session() -> Session<MockTransport> {
        let mut transport = MockTransport::new();
        transport
            .expect_establish()
            .times(1)
            .returning(|| Ok(PeerCapabilities::none()));
        transport.expect_send().returning(|_, _| Ok(()));
        transport.expect_close().returning(|| Ok(()));
        let mut session = Session::new(ClientConfig::default(), transport);
        session.connect().expect("connects");
        session
    }

    #[rstest]
    fn connect_failure_returns_to_idle() {
        let mut transport = MockTransport::new();
        transport
            .expect_establish()
            .times(1)
            .returning(|| Err(TransportError::Closed));
        let mut session = Session::new(ClientConfig::default(), transport);
        let error = session.connect().expect_err("establishment fails");
        assert!(matches!(error, SessionError::Transport(_)));
        assert_eq!(session.state(), SessionState::Idle);
    }

    #[rstest]
    fn send_while_busy_is_rejected_without_mutation() {
        let mut session = connected_session();
        let first = session.try_send(edit_body()).expect("first send");
        let SendDisposition::Sent(id) = first else {
            panic!("first send goes out");
        };
        assert_eq!(session.state(), SessionState::ReplyWait);

        let second = session.try_send(edit_body()).expect("busy is not an error");
        assert_eq!(second, SendDisposition::RejectedBusy);
        assert_eq!(session.state(), SessionState::ReplyWait, "state untouched");

        // The original request is still the outstanding one.
        assert!(session.handle_reply(Reply::ok(id)).is_some());
        assert_eq!(session.state(), SessionState::ConnIdle);
    }

    #[rstest]
    fn send_failure_restores_the_prior_state() {
        let mut transport = MockTransport::new();
        transport
            .expect_establish()
            .returning(|| Ok(PeerCapabilities::none()));
        transport
            .expect_send()
            .times(1)
            .returning(|_, _| Err(TransportError::Closed));
        let mut session = Session::new(ClientConfig::default(), transport);
        session.connect().expect("connects");

        let error = session.try_send(edit_body()).expect_err("send fails");
        assert!(matches!(error, SessionError::Transport(_)));
        assert_eq!(session.state(), SessionState::ConnIdle, "prior state restored");
        assert!(session.outstanding.is_none(), "no request left attached");
    }

    #[rstest]
    fn sends_require_a_connection() {
        let transport = MockTransport::new();
        let mut session = Session::new(ClientConfig::default(), transport);
        let error = session.try_send(edit_body()).expect_err("not connected");
        assert!(matches!(error, SessionError::NotConnected { .. }));
    }

    #[rstest]
    fn uncorrelated_replies_are_ignored() {
        let mut session = connected_session();
        let SendDisposition::Sent(id) = session.try_send(edit_body()).expect("send") else {
            panic!("send goes out");
        };

        assert!(session.handle_reply(Reply::ok(RequestId(999))).is_none());
        assert_eq!(session.state(), SessionState::ReplyWait, "still waiting");

        assert!(session.handle_reply(Reply::ok(id)).is_some());
        assert_eq!(session.state(), SessionState::ConnIdle);
    }

    #[rstest]
    fn close_session_requests_move_through_close_wait() {
        let mut session = connected_session();
        let SendDisposition::Sent(id) =
            session.try_send(assemble_close_request()).expect("send")
        else {
            panic!("send goes out");
        };

        assert!(session.handle_reply(Reply::ok(id)).is_some());
        assert_eq!(session.state(), SessionState::CloseWait);

        session.complete_close().expect("teardown completes");
        assert_eq!(session.state(), SessionState::Idle);
    }

    #[rstest]
    fn canceled_waits_swallow_the_late_reply() {
        let mut session = connected_session();
        let SendDisposition::Sent(id) = session.try_send(edit_body()).expect("send") else {
            panic!("send goes out");
        };
        session.cancel_outstanding().expect("cancel while waiting");
        assert_eq!(session.state(), SessionState::CancelWait);

        assert!(session.handle_reply(Reply::ok(id)).is_none(), "late reply dropped");
        assert_eq!(session.state(), SessionState::ConnIdle);
    }

    #[rstest]
    fn shutdown_is_terminal() {
        let mut session = connected_session();
        session.shutdown();
        assert_eq!(session.state(), SessionState::Shutdown);
        assert!(matches!(
            session.try_send(edit_body()),
            Err(SessionError::Shutdown)
        ));
        assert!(matches!(session.connect(), Err(SessionError::Shutdown)));
    }
}
