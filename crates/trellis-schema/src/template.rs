//! The object template: one immutable schema node.

use serde::{Deserialize, Serialize};

use crate::kind::NodeKind;
use crate::leaf_type::LeafType;
use crate::registry::TemplateId;

/// Definition lifecycle status of a schema node.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Status {
    /// Current definition, fully supported.
    #[default]
    Current,
    /// Still accepted but discouraged.
    Deprecated,
    /// No longer usable; treated as absent by the engine.
    Obsolete,
}

/// One schema node: kind, constraints, and relationships.
///
/// Templates are created through [`crate::SchemaBuilder`] and owned by the
/// [`crate::SchemaRegistry`]; the id-based relationship fields are only
/// meaningful within the registry that minted them.
#[derive(Debug, Clone)]
pub struct ObjectTemplate {
    pub(crate) name: String,
    pub(crate) prefix: Option<String>,
    pub(crate) kind: NodeKind,
    pub(crate) mandatory: bool,
    pub(crate) config: bool,
    pub(crate) key: bool,
    pub(crate) abstract_node: bool,
    pub(crate) status: Status,
    pub(crate) default: Option<String>,
    pub(crate) leaf_type: Option<LeafType>,
    pub(crate) description: Option<String>,
    pub(crate) parent: Option<TemplateId>,
    pub(crate) children: Vec<TemplateId>,
    pub(crate) keys: Vec<TemplateId>,
    pub(crate) unique_groups: Vec<Vec<TemplateId>>,
}

impl ObjectTemplate {
    /// The node's local name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The namespace prefix, when the node is prefix-qualified.
    #[must_use]
    pub fn prefix(&self) -> Option<&str> {
        self.prefix.as_deref()
    }

    /// The node kind.
    #[must_use]
    pub const fn kind(&self) -> NodeKind {
        self.kind
    }

    /// Whether a value for this node must be supplied.
    #[must_use]
    pub const fn is_mandatory(&self) -> bool {
        self.mandatory
    }

    /// Whether this node is configuration (writable) data.
    #[must_use]
    pub const fn is_config(&self) -> bool {
        self.config
    }

    /// Whether this leaf is a key of its parent list.
    #[must_use]
    pub const fn is_key(&self) -> bool {
        self.key
    }

    /// Whether this node is abstract (never instantiated directly).
    #[must_use]
    pub const fn is_abstract(&self) -> bool {
        self.abstract_node
    }

    /// The node's definition status.
    #[must_use]
    pub const fn status(&self) -> Status {
        self.status
    }

    /// The schema default value, when one is declared.
    ///
    /// For a `Choice` node this is the name of the default case.
    #[must_use]
    pub fn default_value(&self) -> Option<&str> {
        self.default.as_deref()
    }

    /// The leaf type, for leaf and leaf-list nodes.
    #[must_use]
    pub fn leaf_type(&self) -> Option<&LeafType> {
        self.leaf_type.as_ref()
    }

    /// The node description, used by interactive help.
    #[must_use]
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// The parent template, `None` at a schema root.
    #[must_use]
    pub const fn parent(&self) -> Option<TemplateId> {
        self.parent
    }

    /// Ordered child templates.
    #[must_use]
    pub fn children(&self) -> &[TemplateId] {
        &self.children
    }

    /// Ordered key leaves, for `List` nodes.
    #[must_use]
    pub fn keys(&self) -> &[TemplateId] {
        &self.keys
    }

    /// Unique-constraint groups, for `List` nodes.
    #[must_use]
    pub fn unique_groups(&self) -> &[Vec<TemplateId>] {
        &self.unique_groups
    }

    /// The name with its prefix, as written in path expressions.
    #[must_use]
    pub fn qualified_name(&self) -> String {
        match &self.prefix {
            Some(prefix) => format!("{prefix}:{}", self.name),
            None => self.name.clone(),
        }
    }
}
