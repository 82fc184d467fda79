//! Correlated replies from the peer.

use serde::{Deserialize, Serialize};
use serde_json::Value as Json;

use crate::transport::RequestId;

/// Outcome of one protocol request, as reported by the peer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "kebab-case")]
pub enum ReplyOutcome {
    /// The request succeeded; reads carry their data payload.
    Ok {
        /// Decoded response data, when the operation returns any.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        data: Option<Json>,
    },
    /// The peer reported an error.
    RpcError {
        /// The protocol error tag.
        tag: String,
        /// Human-readable message, when supplied.
        message: String,
    },
}

/// One reply delivered by the transport.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reply {
    /// The id of the request this reply answers.
    pub id: RequestId,
    /// What the peer reported.
    pub outcome: ReplyOutcome,
}

impl Reply {
    /// A success reply with no data.
    #[must_use]
    pub const fn ok(id: RequestId) -> Self {
        Self {
            id,
            outcome: ReplyOutcome::Ok { data: None },
        }
    }

    /// An error reply.
    pub fn rpc_error(id: RequestId, tag: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            id,
            outcome: ReplyOutcome::RpcError {
                tag: tag.into(),
                message: message.into(),
            },
        }
    }
}
