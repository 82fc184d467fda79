//! Schema object templates for the Trellis request engine.
//!
//! This crate models the read-only schema graph an interactive management
//! client works against: a tree of typed object definitions describing the
//! configuration and operational data a peer accepts. Templates are owned by
//! a [`SchemaRegistry`] arena and referenced everywhere else by
//! [`TemplateId`], so value trees never hold owning pointers into the
//! schema.
//!
//! The schema loader/compiler that produces templates from source schema
//! files is a separate subsystem; [`SchemaBuilder`] provides the
//! programmatic construction surface it targets, which is also what tests
//! use to assemble fixture schemas.

mod builder;
mod error;
mod kind;
mod leaf_type;
mod registry;
mod template;

pub use builder::SchemaBuilder;
pub use error::SchemaError;
pub use kind::NodeKind;
pub use leaf_type::LeafType;
pub use registry::{SchemaRegistry, TemplateId};
pub use template::{ObjectTemplate, Status};
