//! Error types for value-tree manipulation.

use thiserror::Error;

/// Errors surfaced by value-tree primitives.
#[derive(Debug, Error)]
pub enum ValueError {
    /// A second instance of a single-instance child was added.
    #[error("node '{parent}' already has a child named '{child}'")]
    DuplicateChild {
        /// The parent node name.
        parent: String,
        /// The duplicated child name.
        child: String,
    },

    /// A child was attached under a scalar node.
    #[error("node '{name}' is a scalar and cannot hold children")]
    ScalarParent {
        /// The offending node name.
        name: String,
    },

    /// A scalar value was written to an interior node.
    #[error("node '{name}' is not a scalar and takes no value")]
    NotScalar {
        /// The offending node name.
        name: String,
    },

    /// A child index was out of range.
    #[error("node '{parent}' has no child at index {index}")]
    NoSuchIndex {
        /// The parent node name.
        parent: String,
        /// The out-of-range index.
        index: usize,
    },

    /// A value failed leaf-type validation.
    #[error("node '{name}': {source}")]
    Invalid {
        /// The node the value was destined for.
        name: String,
        /// The underlying validation failure.
        #[source]
        source: trellis_schema::SchemaError,
    },
}

impl ValueError {
    /// Creates a duplicate-child error.
    pub fn duplicate_child(parent: impl Into<String>, child: impl Into<String>) -> Self {
        Self::DuplicateChild {
            parent: parent.into(),
            child: child.into(),
        }
    }

    /// Creates a scalar-parent error.
    pub fn scalar_parent(name: impl Into<String>) -> Self {
        Self::ScalarParent { name: name.into() }
    }

    /// Creates a not-scalar error.
    pub fn not_scalar(name: impl Into<String>) -> Self {
        Self::NotScalar { name: name.into() }
    }
}
