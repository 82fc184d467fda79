//! The variable-binding seam.
//!
//! Named user variables are owned by the (out-of-scope) scripting layer.
//! The filler only ever asks whether a variable supplies a value for the
//! node it is about to prompt for; a hit is treated as pre-supplied input
//! and the interactive prompt is bypassed.

use trellis_value::ValueNode;

/// Lookup scope for a variable reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VariableScope {
    /// Session-local bindings.
    Local,
    /// Bindings shared across sessions of one run.
    Global,
}

/// Read-only access to the variable-binding store.
pub trait VariableStore {
    /// Resolves a variable by name, local scope first.
    fn lookup(&self, name: &str, scope: VariableScope) -> Option<&ValueNode>;
}

/// The empty store: every lookup misses.
///
/// This is the default wiring when no scripting layer is attached.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoVariables;

impl VariableStore for NoVariables {
    fn lookup(&self, _name: &str, _scope: VariableScope) -> Option<&ValueNode> {
        None
    }
}
