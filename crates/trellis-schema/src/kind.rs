//! Schema node kinds.

use serde::{Deserialize, Serialize};

/// The kind of a schema node.
///
/// `Choice` and `Case` structure the schema but are never represented on
/// the wire; `Operation`, `OperationIo`, and `Notification` only appear at
/// the top of RPC and notification definitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum NodeKind {
    /// A single typed scalar.
    Leaf,
    /// A repeatable typed scalar.
    LeafList,
    /// A keyed, repeatable interior node.
    List,
    /// A singleton interior node.
    Container,
    /// Exactly one of several named alternatives.
    Choice,
    /// One alternative within a `Choice`.
    Case,
    /// An opaque subtree accepted verbatim.
    AnyXml,
    /// An RPC operation definition.
    Operation,
    /// The input or output block of an operation.
    OperationIo,
    /// A notification definition.
    Notification,
}

impl NodeKind {
    /// Returns true for kinds that carry a scalar payload instead of
    /// children.
    #[must_use]
    pub const fn is_leafy(self) -> bool {
        matches!(self, Self::Leaf | Self::LeafList | Self::AnyXml)
    }

    /// Returns true for kinds that may repeat under one parent.
    #[must_use]
    pub const fn is_multi_instance(self) -> bool {
        matches!(self, Self::List | Self::LeafList)
    }

    /// Returns true for kinds that appear in wire payloads.
    ///
    /// `Choice` and `Case` exist only in the schema; their resolved
    /// children are spliced directly into the surrounding structure.
    #[must_use]
    pub const fn on_wire(self) -> bool {
        !matches!(self, Self::Choice | Self::Case)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn leafy_kinds_have_no_children() {
        assert!(NodeKind::Leaf.is_leafy());
        assert!(NodeKind::LeafList.is_leafy());
        assert!(NodeKind::AnyXml.is_leafy());
        assert!(!NodeKind::Container.is_leafy());
        assert!(!NodeKind::Choice.is_leafy());
    }

    #[test]
    fn choice_and_case_never_hit_the_wire() {
        assert!(!NodeKind::Choice.on_wire());
        assert!(!NodeKind::Case.on_wire());
        assert!(NodeKind::List.on_wire());
        assert!(NodeKind::Leaf.on_wire());
    }
}
