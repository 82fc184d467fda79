//! The schema registry: an arena owning every object template.

use serde::{Deserialize, Serialize};

use crate::kind::NodeKind;
use crate::template::{ObjectTemplate, Status};

/// Non-owning handle to a template within its [`SchemaRegistry`].
///
/// Ids are minted by the registry and are only meaningful against the
/// registry that produced them; value trees record these instead of
/// pointers so schema ownership stays with the registry alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TemplateId(pub(crate) usize);

/// Read-only schema graph for one session.
///
/// The registry outlives every value tree built against it. All navigation
/// is id-based; templates never leak owning references.
#[derive(Debug, Clone)]
pub struct SchemaRegistry {
    pub(crate) nodes: Vec<ObjectTemplate>,
    pub(crate) roots: Vec<TemplateId>,
}

impl SchemaRegistry {
    /// Returns the template behind an id.
    ///
    /// # Panics
    ///
    /// Panics if `id` was minted by a different registry.
    #[must_use]
    pub fn template(&self, id: TemplateId) -> &ObjectTemplate {
        &self.nodes[id.0]
    }

    /// The top-level templates of the data model, in schema order.
    #[must_use]
    pub fn roots(&self) -> &[TemplateId] {
        &self.roots
    }

    /// Ordered children of a node.
    #[must_use]
    pub fn children(&self, id: TemplateId) -> &[TemplateId] {
        self.template(id).children()
    }

    /// The parent of a node, `None` at a root.
    #[must_use]
    pub fn parent(&self, id: TemplateId) -> Option<TemplateId> {
        self.template(id).parent()
    }

    /// Finds a direct child by name, preferring an exact qualified match.
    ///
    /// An unprefixed lookup that matches more than one prefixed child is
    /// ambiguous and returns all candidates via [`Self::children_named`];
    /// this accessor returns a child only when it is unique.
    #[must_use]
    pub fn find_child(&self, parent: TemplateId, name: &str) -> Option<TemplateId> {
        let mut matches = self.children_named(parent, name);
        let first = matches.next()?;
        if matches.next().is_some() {
            return None;
        }
        Some(first)
    }

    /// Iterates every direct child whose local or qualified name matches.
    pub fn children_named<'a>(
        &'a self,
        parent: TemplateId,
        name: &'a str,
    ) -> impl Iterator<Item = TemplateId> + 'a {
        self.children(parent)
            .iter()
            .copied()
            .filter(move |id| self.name_matches(*id, name))
    }

    /// Finds a top-level template by name, when unique.
    #[must_use]
    pub fn find_root(&self, name: &str) -> Option<TemplateId> {
        let mut matches = self.roots_named(name);
        let first = matches.next()?;
        if matches.next().is_some() {
            return None;
        }
        Some(first)
    }

    /// Iterates every root whose local or qualified name matches.
    pub fn roots_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = TemplateId> + 'a {
        self.roots
            .iter()
            .copied()
            .filter(move |id| self.name_matches(*id, name))
    }

    /// Ordered key leaves of a list node; empty for other kinds.
    #[must_use]
    pub fn keys(&self, id: TemplateId) -> &[TemplateId] {
        self.template(id).keys()
    }

    /// Unique-constraint groups of a list node; empty for other kinds.
    #[must_use]
    pub fn unique_groups(&self, id: TemplateId) -> &[Vec<TemplateId>] {
        self.template(id).unique_groups()
    }

    /// Whether a node is usable at all under the current data model.
    ///
    /// Abstract and obsolete nodes are never instantiated; when
    /// `require_config` is set, state-only nodes are excluded too.
    #[must_use]
    pub fn is_enabled(&self, id: TemplateId, require_config: bool) -> bool {
        let template = self.template(id);
        if template.is_abstract() || template.status() == Status::Obsolete {
            return false;
        }
        !require_config || template.is_config()
    }

    /// The default case of a choice, when the schema declares one.
    #[must_use]
    pub fn default_case(&self, choice: TemplateId) -> Option<TemplateId> {
        let template = self.template(choice);
        if template.kind() != NodeKind::Choice {
            return None;
        }
        let name = template.default_value()?;
        self.children_named(choice, name).next()
    }

    /// Walks from a node to its schema root, returning the chain
    /// root-first (the node itself is the last element).
    #[must_use]
    pub fn ancestry(&self, id: TemplateId) -> Vec<TemplateId> {
        let mut chain = vec![id];
        let mut cursor = id;
        while let Some(parent) = self.parent(cursor) {
            chain.push(parent);
            cursor = parent;
        }
        chain.reverse();
        chain
    }

    fn name_matches(&self, id: TemplateId, name: &str) -> bool {
        let template = self.template(id);
        template.name() == name || template.qualified_name() == name
    }
}

#[cfg(test)]
mod tests {
    use crate::builder::SchemaBuilder;
    use crate::leaf_type::LeafType;

    #[test]
    fn find_child_resolves_unique_names() {
        let mut builder = SchemaBuilder::new();
        let top = builder.container(None, "top");
        let leaf = builder.leaf(top, "name", LeafType::String);
        let schema = builder.build().expect("schema builds");

        assert_eq!(schema.find_child(top, "name"), Some(leaf));
        assert_eq!(schema.find_child(top, "missing"), None);
    }

    #[test]
    fn find_child_refuses_ambiguous_names() {
        let mut builder = SchemaBuilder::new();
        let top = builder.container(None, "top");
        let a = builder.leaf(top, "addr", LeafType::String);
        builder.set_prefix(a, "v4");
        let b = builder.leaf(top, "addr", LeafType::String);
        builder.set_prefix(b, "v6");
        let schema = builder.build().expect("schema builds");

        assert_eq!(schema.find_child(top, "addr"), None);
        assert_eq!(schema.children_named(top, "addr").count(), 2);
        assert_eq!(schema.find_child(top, "v4:addr"), Some(a));
    }

    #[test]
    fn ancestry_runs_root_first() {
        let mut builder = SchemaBuilder::new();
        let top = builder.container(None, "top");
        let list = builder.list(top, "entry", &[]);
        let leaf = builder.leaf(list, "value", LeafType::String);
        let schema = builder.build().expect("schema builds");

        assert_eq!(schema.ancestry(leaf), vec![top, list, leaf]);
        assert_eq!(schema.ancestry(top), vec![top]);
    }
}
