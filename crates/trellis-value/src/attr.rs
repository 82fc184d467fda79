//! Protocol metadata attributes attached to value nodes.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Per-node write semantics for an edit request.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum EditOperation {
    /// Merge the node into existing data (the protocol default).
    #[default]
    Merge,
    /// Replace the node and everything beneath it.
    Replace,
    /// Create the node; error if it already exists.
    Create,
    /// Delete the node; error if it does not exist.
    Delete,
    /// Remove the node; silently succeed if absent.
    Remove,
}

/// Position of a new user-ordered list or leaf-list entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum InsertOrder {
    /// Insert as the first entry.
    First,
    /// Insert as the last entry.
    Last,
    /// Insert immediately before the anchor entry.
    Before,
    /// Insert immediately after the anchor entry.
    After,
}

impl InsertOrder {
    /// Whether this order needs an anchor identifying the reference entry.
    #[must_use]
    pub const fn needs_anchor(self) -> bool {
        matches!(self, Self::Before | Self::After)
    }
}

/// An insert-order attribute together with its optional anchor.
///
/// The anchor is the key predicate (for lists) or value (for leaf-lists)
/// identifying the entry to insert relative to; it is mandatory exactly
/// when the order is `Before` or `After`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InsertSpec {
    /// Where the entry goes.
    pub order: InsertOrder,
    /// The reference entry, when the order is relative.
    pub anchor: Option<String>,
}

/// The shape of a read-request filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum FilterType {
    /// Structural filter: the payload is a value subtree.
    Subtree,
    /// Expression filter: the payload is a select string.
    Xpath,
}

/// One protocol metadata attribute on a value node.
///
/// Attributes are kept apart from child data; at most one attribute of
/// each variant is meaningful per node and setters replace rather than
/// accumulate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", tag = "attribute", content = "value")]
pub enum Attribute {
    /// Edit-operation tag for a write request.
    EditOperation(EditOperation),
    /// Insert-order tag for user-ordered entries.
    Insert(InsertSpec),
    /// Filter-type tag on a read filter root.
    FilterType(FilterType),
    /// XPath select string on a read filter root.
    Select(String),
}

impl Attribute {
    pub(crate) fn same_variant(&self, other: &Self) -> bool {
        matches!(
            (self, other),
            (Self::EditOperation(_), Self::EditOperation(_))
                | (Self::Insert(_), Self::Insert(_))
                | (Self::FilterType(_), Self::FilterType(_))
                | (Self::Select(_), Self::Select(_))
        )
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use super::*;

    #[test]
    fn edit_operations_round_trip_as_strings() {
        assert_eq!(EditOperation::Merge.to_string(), "merge");
        assert_eq!(EditOperation::from_str("replace").ok(), Some(EditOperation::Replace));
        assert!(EditOperation::from_str("upsert").is_err());
    }

    #[test]
    fn relative_orders_need_anchors() {
        assert!(InsertOrder::Before.needs_anchor());
        assert!(InsertOrder::After.needs_anchor());
        assert!(!InsertOrder::First.needs_anchor());
        assert!(!InsertOrder::Last.needs_anchor());
    }
}
