//! Error types for the request engine.
//!
//! `Skipped` and `Canceled` are not errors — they live in
//! [`crate::FillOutcome`] so the compiler keeps explicit omission and user
//! abort apart from hard failures. Every variant here names the offending
//! node or path step so the front end can render a one-line diagnostic.

use std::io;

use thiserror::Error;

/// Errors surfaced by filling, resolution, and assembly.
#[derive(Debug, Error)]
pub enum EngineError {
    /// A mandatory node could not be filled: no default, no old value, no
    /// usable input.
    #[error("missing parameter '{node}'")]
    MissingParameter {
        /// The unfillable node.
        node: String,
    },

    /// A path step matched more than one schema candidate.
    #[error("path step '{step}' is ambiguous")]
    AmbiguousTarget {
        /// The ambiguous step name.
        step: String,
    },

    /// A path step matched nothing in the schema.
    #[error("path step '{step}' does not name a schema node")]
    UnknownTarget {
        /// The unmatched step name.
        step: String,
    },

    /// A path expression could not be parsed.
    #[error("malformed path '{expr}': {reason}")]
    PathSyntax {
        /// The offending expression.
        expr: String,
        /// Why parsing failed.
        reason: String,
    },

    /// A leaf value failed schema validation and the bad-data policy
    /// rejects it.
    #[error("invalid value for '{node}': {source}")]
    InvalidValue {
        /// The destination node.
        node: String,
        /// The underlying validation failure.
        #[source]
        source: trellis_schema::SchemaError,
    },

    /// The requested operation makes no sense on the resolved target.
    #[error("unsupported operation '{operation}': {reason}")]
    UnsupportedOperation {
        /// The rejected operation.
        operation: String,
        /// Why it was rejected.
        reason: String,
    },

    /// The peer lacks a protocol capability the request needs.
    #[error("peer does not support {capability}")]
    CapabilityUnsupported {
        /// The missing capability.
        capability: String,
    },

    /// A value-tree primitive rejected a mutation.
    #[error(transparent)]
    Value(#[from] trellis_value::ValueError),

    /// The prompt source failed to deliver a line.
    #[error("prompt source failed: {0}")]
    Prompt(#[from] io::Error),
}

impl EngineError {
    /// Creates a missing-parameter error.
    pub fn missing_parameter(node: impl Into<String>) -> Self {
        Self::MissingParameter { node: node.into() }
    }

    /// Creates an ambiguous-target error.
    pub fn ambiguous_target(step: impl Into<String>) -> Self {
        Self::AmbiguousTarget { step: step.into() }
    }

    /// Creates an unknown-target error.
    pub fn unknown_target(step: impl Into<String>) -> Self {
        Self::UnknownTarget { step: step.into() }
    }

    /// Creates a path-syntax error.
    pub fn path_syntax(expr: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::PathSyntax {
            expr: expr.into(),
            reason: reason.into(),
        }
    }

    /// Creates an unsupported-operation error.
    pub fn unsupported_operation(operation: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::UnsupportedOperation {
            operation: operation.into(),
            reason: reason.into(),
        }
    }

    /// Creates a capability-unsupported error.
    pub fn capability_unsupported(capability: impl Into<String>) -> Self {
        Self::CapabilityUnsupported {
            capability: capability.into(),
        }
    }

    /// Whether the error reflects operator input rather than an
    /// infrastructure failure.
    #[must_use]
    pub const fn is_user_error(&self) -> bool {
        !matches!(self, Self::Prompt(_))
    }
}
