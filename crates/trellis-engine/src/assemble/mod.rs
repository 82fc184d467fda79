//! Request assembly.
//!
//! The assemblers wrap a completed value subtree into a protocol request
//! body, attaching the metadata the edit/read semantics demand. Both are
//! consuming contracts: content ownership transfers in, and every failure
//! path drops whatever was built so far — callers never receive, or keep,
//! a half-owned tree.

mod edit;
mod read;

pub use edit::{assemble_edit_request, EditContent, EditOptions};
pub use read::{assemble_read_request, ReadFilter, ReadOptions};

use crate::request::{RequestBody, RequestPayload, RequestVerb};

pub(crate) const ASSEMBLE_TARGET: &str = "trellis::assemble";

/// Builds the close-session request.
///
/// Carries no payload; sending it moves the session towards `CloseWait`
/// when the correlated reply arrives.
#[must_use]
pub fn assemble_close_request() -> RequestBody {
    RequestBody {
        verb: RequestVerb::CloseSession,
        target: None,
        source: None,
        default_operation: None,
        test_option: None,
        error_option: None,
        with_defaults: false,
        payload: RequestPayload::Empty,
    }
}
