//! Value-tree primitives for the Trellis request engine.
//!
//! A [`ValueNode`] is one instance node in a request-in-progress tree,
//! built against a [`trellis_schema::ObjectTemplate`]. Nodes own their
//! children outright; there are no parent pointers. Ancestor context is
//! always an explicit path of child indices, which keeps ownership plain
//! and makes "where to attach next" an explicit input rather than ambient
//! state.
//!
//! Protocol metadata (edit-operation, insert-order, filter-type) lives in
//! a per-node attribute list, logically separate from child data, so the
//! assemblers can tag nodes without disturbing tree structure.

mod attr;
mod error;
mod node;

pub use attr::{Attribute, EditOperation, FilterType, InsertOrder, InsertSpec};
pub use error::ValueError;
pub use node::ValueNode;
