//! Error types for schema construction and validation.

use thiserror::Error;

/// Errors surfaced while building or querying a schema.
#[derive(Debug, Error)]
pub enum SchemaError {
    /// A textual value does not conform to its leaf type.
    #[error("invalid value '{value}': {reason}")]
    InvalidValue {
        /// The rejected text.
        value: String,
        /// Why it was rejected.
        reason: String,
    },

    /// A builder operation referenced a child that does not exist.
    #[error("node '{parent}' has no child named '{child}'")]
    UnknownChild {
        /// The parent node name.
        parent: String,
        /// The missing child name.
        child: String,
    },

    /// A node was given a child its kind cannot carry.
    #[error("node '{name}' of kind {kind} cannot contain children")]
    ChildlessKind {
        /// The offending node name.
        name: String,
        /// Its kind, rendered for diagnostics.
        kind: String,
    },

    /// A list key refers to a node that is not a leaf child of the list.
    #[error("key '{key}' of list '{list}' is not a leaf child")]
    BadKey {
        /// The list name.
        list: String,
        /// The offending key name.
        key: String,
    },

    /// A choice contains a child that is not a case.
    #[error("choice '{choice}' contains non-case child '{child}'")]
    NonCaseChild {
        /// The choice name.
        choice: String,
        /// The offending child name.
        child: String,
    },

    /// A choice default names a case that does not exist.
    #[error("choice '{choice}' defaults to unknown case '{case}'")]
    UnknownDefaultCase {
        /// The choice name.
        choice: String,
        /// The missing case name.
        case: String,
    },
}

impl SchemaError {
    /// Creates an invalid-value error.
    pub fn invalid_value(value: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidValue {
            value: value.into(),
            reason: reason.into(),
        }
    }

    /// Creates an unknown-child error.
    pub fn unknown_child(parent: impl Into<String>, child: impl Into<String>) -> Self {
        Self::UnknownChild {
            parent: parent.into(),
            child: child.into(),
        }
    }
}
