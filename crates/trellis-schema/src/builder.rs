//! Programmatic schema construction.
//!
//! The builder is the construction surface the (out-of-scope) schema
//! compiler targets, and the way tests assemble fixture schemas. Nodes are
//! created parent-first; list keys and unique groups are declared by name
//! and resolved when the registry is built, so declaration order inside a
//! list does not matter.

use crate::error::SchemaError;
use crate::kind::NodeKind;
use crate::leaf_type::LeafType;
use crate::registry::{SchemaRegistry, TemplateId};
use crate::template::{ObjectTemplate, Status};

/// Incremental builder for a [`SchemaRegistry`].
#[derive(Debug, Default)]
pub struct SchemaBuilder {
    nodes: Vec<ObjectTemplate>,
    roots: Vec<TemplateId>,
    pending_keys: Vec<(TemplateId, Vec<String>)>,
    pending_uniques: Vec<(TemplateId, Vec<String>)>,
}

impl SchemaBuilder {
    /// Creates an empty builder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a container node.
    pub fn container(
        &mut self,
        parent: impl Into<Option<TemplateId>>,
        name: impl Into<String>,
    ) -> TemplateId {
        self.push(parent.into(), name.into(), NodeKind::Container, None)
    }

    /// Adds a list node, declaring its key leaves by name.
    ///
    /// The named keys must exist as leaf children of the list by the time
    /// [`Self::build`] runs.
    pub fn list(
        &mut self,
        parent: impl Into<Option<TemplateId>>,
        name: impl Into<String>,
        keys: &[&str],
    ) -> TemplateId {
        let id = self.push(parent.into(), name.into(), NodeKind::List, None);
        if !keys.is_empty() {
            self.pending_keys
                .push((id, keys.iter().map(|k| (*k).into()).collect()));
        }
        id
    }

    /// Adds a leaf node.
    pub fn leaf(
        &mut self,
        parent: impl Into<Option<TemplateId>>,
        name: impl Into<String>,
        leaf_type: LeafType,
    ) -> TemplateId {
        self.push(parent.into(), name.into(), NodeKind::Leaf, Some(leaf_type))
    }

    /// Adds a leaf-list node.
    pub fn leaf_list(
        &mut self,
        parent: impl Into<Option<TemplateId>>,
        name: impl Into<String>,
        leaf_type: LeafType,
    ) -> TemplateId {
        self.push(parent.into(), name.into(), NodeKind::LeafList, Some(leaf_type))
    }

    /// Adds a choice node.
    pub fn choice(
        &mut self,
        parent: impl Into<Option<TemplateId>>,
        name: impl Into<String>,
    ) -> TemplateId {
        self.push(parent.into(), name.into(), NodeKind::Choice, None)
    }

    /// Adds a case node under a choice.
    pub fn case(&mut self, choice: TemplateId, name: impl Into<String>) -> TemplateId {
        self.push(Some(choice), name.into(), NodeKind::Case, None)
    }

    /// Adds an anyxml node.
    pub fn anyxml(
        &mut self,
        parent: impl Into<Option<TemplateId>>,
        name: impl Into<String>,
    ) -> TemplateId {
        self.push(parent.into(), name.into(), NodeKind::AnyXml, None)
    }

    /// Adds an operation (RPC) definition.
    pub fn operation(&mut self, name: impl Into<String>) -> TemplateId {
        self.push(None, name.into(), NodeKind::Operation, None)
    }

    /// Adds the input or output block of an operation.
    pub fn operation_io(&mut self, operation: TemplateId, name: impl Into<String>) -> TemplateId {
        self.push(Some(operation), name.into(), NodeKind::OperationIo, None)
    }

    /// Adds a notification definition.
    pub fn notification(
        &mut self,
        parent: impl Into<Option<TemplateId>>,
        name: impl Into<String>,
    ) -> TemplateId {
        self.push(parent.into(), name.into(), NodeKind::Notification, None)
    }

    /// Marks a node mandatory.
    pub fn set_mandatory(&mut self, id: TemplateId) {
        self.nodes[id.0].mandatory = true;
    }

    /// Sets whether a node is configuration data (default true).
    pub fn set_config(&mut self, id: TemplateId, config: bool) {
        self.nodes[id.0].config = config;
    }

    /// Sets a namespace prefix on a node.
    pub fn set_prefix(&mut self, id: TemplateId, prefix: impl Into<String>) {
        self.nodes[id.0].prefix = Some(prefix.into());
    }

    /// Marks a node abstract.
    pub fn set_abstract(&mut self, id: TemplateId) {
        self.nodes[id.0].abstract_node = true;
    }

    /// Sets a node's definition status.
    pub fn set_status(&mut self, id: TemplateId, status: Status) {
        self.nodes[id.0].status = status;
    }

    /// Declares a default value; for a choice this names the default case.
    pub fn set_default(&mut self, id: TemplateId, value: impl Into<String>) {
        self.nodes[id.0].default = Some(value.into());
    }

    /// Attaches a description, surfaced through interactive help.
    pub fn set_description(&mut self, id: TemplateId, text: impl Into<String>) {
        self.nodes[id.0].description = Some(text.into());
    }

    /// Declares a unique-constraint group on a list, by leaf name.
    pub fn unique(&mut self, list: TemplateId, leaves: &[&str]) {
        self.pending_uniques
            .push((list, leaves.iter().map(|l| (*l).into()).collect()));
    }

    /// Finalises the registry, resolving key and unique declarations.
    ///
    /// # Errors
    ///
    /// Returns a [`SchemaError`] when a leafy node was given children, a
    /// choice carries a non-case child, a declared key is not a leaf child
    /// of its list, or a choice default names a missing case.
    pub fn build(mut self) -> Result<SchemaRegistry, SchemaError> {
        self.validate_structure()?;
        self.resolve_keys()?;
        self.resolve_uniques()?;
        self.validate_choice_defaults()?;
        Ok(SchemaRegistry {
            nodes: self.nodes,
            roots: self.roots,
        })
    }

    fn push(
        &mut self,
        parent: Option<TemplateId>,
        name: String,
        kind: NodeKind,
        leaf_type: Option<LeafType>,
    ) -> TemplateId {
        let id = TemplateId(self.nodes.len());
        self.nodes.push(ObjectTemplate {
            name,
            prefix: None,
            kind,
            mandatory: false,
            config: true,
            key: false,
            abstract_node: false,
            status: Status::Current,
            default: None,
            leaf_type,
            description: None,
            parent,
            children: Vec::new(),
            keys: Vec::new(),
            unique_groups: Vec::new(),
        });
        match parent {
            Some(parent) => self.nodes[parent.0].children.push(id),
            None => self.roots.push(id),
        }
        id
    }

    fn validate_structure(&self) -> Result<(), SchemaError> {
        for node in &self.nodes {
            if node.kind.is_leafy() && !node.children.is_empty() {
                return Err(SchemaError::ChildlessKind {
                    name: node.name.clone(),
                    kind: format!("{:?}", node.kind),
                });
            }
            if node.kind == NodeKind::Choice {
                for child in &node.children {
                    let child_node = &self.nodes[child.0];
                    if child_node.kind != NodeKind::Case {
                        return Err(SchemaError::NonCaseChild {
                            choice: node.name.clone(),
                            child: child_node.name.clone(),
                        });
                    }
                }
            }
        }
        Ok(())
    }

    fn resolve_keys(&mut self) -> Result<(), SchemaError> {
        let pending = std::mem::take(&mut self.pending_keys);
        for (list, names) in pending {
            let mut resolved = Vec::with_capacity(names.len());
            for name in &names {
                let id = self.leaf_child(list, name).ok_or_else(|| SchemaError::BadKey {
                    list: self.nodes[list.0].name.clone(),
                    key: name.clone(),
                })?;
                self.nodes[id.0].key = true;
                resolved.push(id);
            }
            self.nodes[list.0].keys = resolved;
        }
        Ok(())
    }

    fn resolve_uniques(&mut self) -> Result<(), SchemaError> {
        let pending = std::mem::take(&mut self.pending_uniques);
        for (list, names) in pending {
            let mut group = Vec::with_capacity(names.len());
            for name in &names {
                let id = self.leaf_child(list, name).ok_or_else(|| SchemaError::BadKey {
                    list: self.nodes[list.0].name.clone(),
                    key: name.clone(),
                })?;
                group.push(id);
            }
            self.nodes[list.0].unique_groups.push(group);
        }
        Ok(())
    }

    fn validate_choice_defaults(&self) -> Result<(), SchemaError> {
        for node in &self.nodes {
            if node.kind != NodeKind::Choice {
                continue;
            }
            let Some(default) = &node.default else {
                continue;
            };
            let found = node
                .children
                .iter()
                .any(|child| self.nodes[child.0].name == *default);
            if !found {
                return Err(SchemaError::UnknownDefaultCase {
                    choice: node.name.clone(),
                    case: default.clone(),
                });
            }
        }
        Ok(())
    }

    fn leaf_child(&self, parent: TemplateId, name: &str) -> Option<TemplateId> {
        self.nodes[parent.0]
            .children
            .iter()
            .copied()
            .find(|id| self.nodes[id.0].name == name && self.nodes[id.0].kind == NodeKind::Leaf)
    }
}
