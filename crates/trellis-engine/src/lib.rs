//! The Trellis request-assembly engine.
//!
//! Given a schema, partial input, and session policy, this crate builds
//! well-formed management-protocol request bodies:
//!
//! - [`ValueFiller`] recursively populates a value tree from its schema
//!   template, prompting interactively for missing mandatory data;
//! - [`TargetResolver`] turns a path expression into a fully-populated
//!   ancestor chain plus the target node within it;
//! - the content builders construct the minimal containing structure for
//!   a bare content node bottom-up;
//! - [`assemble_edit_request`] and [`assemble_read_request`] wrap a
//!   completed subtree into an edit or read payload with per-node
//!   operation, insert, and filter attributes.
//!
//! Interactive input arrives through the [`PromptSource`] seam; the
//! tokenizer, variable store, transport, and schema compiler are external
//! collaborators behind their own seams.

mod assemble;
mod capability;
mod content;
mod errors;
mod fill;
mod outcome;
mod policy;
mod prompt;
mod request;
mod resolve;
mod vars;

pub use assemble::{
    assemble_close_request, assemble_edit_request, assemble_read_request, EditContent,
    EditOptions, ReadFilter, ReadOptions,
};
pub use capability::{Capability, PeerCapabilities};
pub use content::{add_config_from_content, add_filter_from_content, ContainedContent};
pub use errors::EngineError;
pub use fill::ValueFiller;
pub use outcome::{Assembly, FillOutcome};
pub use policy::FillPolicy;
pub use prompt::{PromptLine, PromptSource, ScriptedPrompt};
pub use request::{RequestBody, RequestPayload, RequestVerb};
pub use resolve::{ResolvedTarget, Resolution, TargetResolver};
pub use vars::{NoVariables, VariableScope, VariableStore};
