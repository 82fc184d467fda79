//! The value node: one instance node in a request-in-progress tree.

use serde_json::{Map, Value as Json};

use trellis_schema::{NodeKind, SchemaRegistry, TemplateId};

use crate::attr::{Attribute, EditOperation, FilterType, InsertSpec};
use crate::error::ValueError;

/// Payload of a value node: a scalar for leaf kinds, children otherwise.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Payload {
    Scalar(Option<String>),
    Children(Vec<ValueNode>),
}

/// One instance node, built against an object template.
///
/// A node owns its children and is itself exclusively owned by its parent
/// (or by the caller before attachment). Dropping a node releases its
/// whole subtree; failed construction paths therefore cannot leak, and a
/// subtree can never be owned by two parents.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValueNode {
    template: TemplateId,
    name: String,
    kind: NodeKind,
    payload: Payload,
    case: Option<TemplateId>,
    metadata: Vec<Attribute>,
}

impl ValueNode {
    /// Allocates an empty node from its schema template.
    #[must_use]
    pub fn from_template(schema: &SchemaRegistry, template: TemplateId) -> Self {
        let node = schema.template(template);
        let payload = if node.kind().is_leafy() {
            Payload::Scalar(None)
        } else {
            Payload::Children(Vec::new())
        };
        Self {
            template,
            name: node.qualified_name(),
            kind: node.kind(),
            payload,
            case: None,
            metadata: Vec::new(),
        }
    }

    /// Allocates a scalar node holding a validated value.
    ///
    /// # Errors
    ///
    /// Returns [`ValueError::NotScalar`] for interior templates and
    /// [`ValueError::Invalid`] when the text fails leaf-type validation.
    pub fn with_value(
        schema: &SchemaRegistry,
        template: TemplateId,
        text: impl Into<String>,
    ) -> Result<Self, ValueError> {
        let text = text.into();
        let definition = schema.template(template);
        if let Some(leaf_type) = definition.leaf_type() {
            leaf_type.validate(&text).map_err(|source| ValueError::Invalid {
                name: definition.qualified_name(),
                source,
            })?;
        }
        Ok(Self::with_raw_value(schema, template, text))
    }

    /// Allocates a scalar node holding an unvalidated value.
    ///
    /// This is the accept-anyway path used when the bad-data policy lets
    /// the operator force a value the schema rejects.
    #[must_use]
    pub fn with_raw_value(
        schema: &SchemaRegistry,
        template: TemplateId,
        text: impl Into<String>,
    ) -> Self {
        let mut node = Self::from_template(schema, template);
        node.payload = Payload::Scalar(Some(text.into()));
        node
    }

    /// The template this node was built from.
    #[must_use]
    pub const fn template(&self) -> TemplateId {
        self.template
    }

    /// The node's qualified name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The node kind, snapshotted from the template.
    #[must_use]
    pub const fn kind(&self) -> NodeKind {
        self.kind
    }

    /// The scalar value, when present.
    #[must_use]
    pub fn value(&self) -> Option<&str> {
        match &self.payload {
            Payload::Scalar(value) => value.as_deref(),
            Payload::Children(_) => None,
        }
    }

    /// Overwrites the scalar value.
    ///
    /// # Errors
    ///
    /// Returns [`ValueError::NotScalar`] when the node is interior.
    pub fn set_value(&mut self, text: impl Into<String>) -> Result<(), ValueError> {
        match &mut self.payload {
            Payload::Scalar(value) => {
                *value = Some(text.into());
                Ok(())
            }
            Payload::Children(_) => Err(ValueError::not_scalar(&self.name)),
        }
    }

    /// Whether the node carries a scalar payload.
    #[must_use]
    pub const fn is_scalar(&self) -> bool {
        matches!(self.payload, Payload::Scalar(_))
    }

    /// Ordered children; empty for scalar nodes.
    #[must_use]
    pub fn children(&self) -> &[ValueNode] {
        match &self.payload {
            Payload::Children(children) => children,
            Payload::Scalar(_) => &[],
        }
    }

    /// Whether the node has no children and no value.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        match &self.payload {
            Payload::Scalar(value) => value.is_none(),
            Payload::Children(children) => children.is_empty(),
        }
    }

    /// Appends a child, enforcing the single-instance invariant.
    ///
    /// Lists and leaf-lists may repeat under one parent; every other kind
    /// is limited to one instance per name. Returns the child's index.
    ///
    /// # Errors
    ///
    /// Returns [`ValueError::ScalarParent`] when this node is a scalar and
    /// [`ValueError::DuplicateChild`] when the invariant would break.
    pub fn add_child(&mut self, child: ValueNode) -> Result<usize, ValueError> {
        self.check_addable(&child)?;
        match &mut self.payload {
            Payload::Children(children) => {
                children.push(child);
                Ok(children.len() - 1)
            }
            Payload::Scalar(_) => Err(ValueError::scalar_parent(&self.name)),
        }
    }

    /// Inserts a child after the given index, or first when `None`.
    ///
    /// # Errors
    ///
    /// As [`Self::add_child`], plus [`ValueError::NoSuchIndex`] when the
    /// anchor index is out of range.
    pub fn insert_child_after(
        &mut self,
        after: Option<usize>,
        child: ValueNode,
    ) -> Result<usize, ValueError> {
        self.check_addable(&child)?;
        let name = self.name.clone();
        match &mut self.payload {
            Payload::Children(children) => {
                let at = match after {
                    Some(index) if index < children.len() => index + 1,
                    Some(index) => {
                        return Err(ValueError::NoSuchIndex {
                            parent: name,
                            index,
                        })
                    }
                    None => 0,
                };
                children.insert(at, child);
                Ok(at)
            }
            Payload::Scalar(_) => Err(ValueError::scalar_parent(&name)),
        }
    }

    /// Detaches and returns the child at an index.
    ///
    /// # Errors
    ///
    /// Returns [`ValueError::NoSuchIndex`] when out of range.
    pub fn remove_child(&mut self, index: usize) -> Result<ValueNode, ValueError> {
        let name = self.name.clone();
        match &mut self.payload {
            Payload::Children(children) if index < children.len() => Ok(children.remove(index)),
            _ => Err(ValueError::NoSuchIndex {
                parent: name,
                index,
            }),
        }
    }

    /// Moves every child of `other` into this node, preserving order.
    ///
    /// Used when a resolved choice/case placeholder is dissolved into its
    /// grandparent. Stops at the first invariant violation, leaving the
    /// remaining children with `other`.
    ///
    /// # Errors
    ///
    /// As [`Self::add_child`].
    pub fn move_children_from(&mut self, other: &mut ValueNode) -> Result<(), ValueError> {
        while !other.children().is_empty() {
            let child = other.remove_child(0)?;
            self.add_child(child)?;
        }
        Ok(())
    }

    /// Finds the first child with a matching name.
    #[must_use]
    pub fn find_child(&self, name: &str) -> Option<&ValueNode> {
        self.children().iter().find(|child| child.name_matches(name))
    }

    /// Mutable variant of [`Self::find_child`].
    pub fn find_child_mut(&mut self, name: &str) -> Option<&mut ValueNode> {
        match &mut self.payload {
            Payload::Children(children) => {
                children.iter_mut().find(|child| child.name_matches(name))
            }
            Payload::Scalar(_) => None,
        }
    }

    /// Index of the first child with a matching name.
    #[must_use]
    pub fn child_index(&self, name: &str) -> Option<usize> {
        self.children().iter().position(|child| child.name_matches(name))
    }

    /// Finds the first child built from a given template.
    #[must_use]
    pub fn find_child_by_template(&self, template: TemplateId) -> Option<&ValueNode> {
        self.children().iter().find(|child| child.template == template)
    }

    /// Iterates every child with a matching name, in order.
    ///
    /// This is the sibling walk leaf-list and list handling relies on.
    pub fn children_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a ValueNode> + 'a {
        self.children().iter().filter(move |child| child.name_matches(name))
    }

    /// Borrows the child at an index.
    #[must_use]
    pub fn child_at(&self, index: usize) -> Option<&ValueNode> {
        self.children().get(index)
    }

    /// Mutable variant of [`Self::child_at`].
    pub fn child_at_mut(&mut self, index: usize) -> Option<&mut ValueNode> {
        match &mut self.payload {
            Payload::Children(children) => children.get_mut(index),
            Payload::Scalar(_) => None,
        }
    }

    /// Follows a path of child indices from this node.
    #[must_use]
    pub fn node_at_path(&self, path: &[usize]) -> Option<&ValueNode> {
        let mut cursor = self;
        for index in path {
            cursor = cursor.child_at(*index)?;
        }
        Some(cursor)
    }

    /// Mutable variant of [`Self::node_at_path`].
    pub fn node_at_path_mut(&mut self, path: &[usize]) -> Option<&mut ValueNode> {
        let mut cursor = self;
        for index in path {
            cursor = cursor.child_at_mut(*index)?;
        }
        Some(cursor)
    }

    /// Marks every child built from `template` as belonging to `case`.
    ///
    /// Used after a case fill so resumed fills can recognise which
    /// alternative was committed without re-offering the choice.
    pub fn mark_case(&mut self, template: TemplateId, case: TemplateId) {
        if let Payload::Children(children) = &mut self.payload {
            for child in children {
                if child.template == template {
                    child.case = Some(case);
                }
            }
        }
    }

    /// Drops every child at or past `baseline`, in declaration order.
    ///
    /// This is the cancel-unwind primitive: a top-level fill notes the
    /// child count before it starts and truncates back to it when the
    /// operator aborts, so nothing allocated during the call survives.
    pub fn truncate_children(&mut self, baseline: usize) {
        if let Payload::Children(children) = &mut self.payload {
            children.truncate(baseline);
        }
    }

    /// The case selected for this node when its parent is a choice.
    #[must_use]
    pub const fn case(&self) -> Option<TemplateId> {
        self.case
    }

    /// Records which case this node was created under.
    pub fn set_case(&mut self, case: TemplateId) {
        self.case = Some(case);
    }

    /// The protocol metadata attributes on this node.
    #[must_use]
    pub fn metadata(&self) -> &[Attribute] {
        &self.metadata
    }

    /// Sets an attribute, replacing any existing one of the same variant.
    pub fn set_attribute(&mut self, attribute: Attribute) {
        if let Some(existing) = self
            .metadata
            .iter_mut()
            .find(|candidate| candidate.same_variant(&attribute))
        {
            *existing = attribute;
        } else {
            self.metadata.push(attribute);
        }
    }

    /// The edit-operation attribute, when present.
    #[must_use]
    pub fn edit_operation(&self) -> Option<EditOperation> {
        self.metadata.iter().find_map(|attribute| match attribute {
            Attribute::EditOperation(op) => Some(*op),
            _ => None,
        })
    }

    /// The insert attribute, when present.
    #[must_use]
    pub fn insert_spec(&self) -> Option<&InsertSpec> {
        self.metadata.iter().find_map(|attribute| match attribute {
            Attribute::Insert(spec) => Some(spec),
            _ => None,
        })
    }

    /// The filter-type attribute, when present.
    #[must_use]
    pub fn filter_type(&self) -> Option<FilterType> {
        self.metadata.iter().find_map(|attribute| match attribute {
            Attribute::FilterType(filter) => Some(*filter),
            _ => None,
        })
    }

    /// The select-string attribute, when present.
    #[must_use]
    pub fn select(&self) -> Option<&str> {
        self.metadata.iter().find_map(|attribute| match attribute {
            Attribute::Select(expr) => Some(expr.as_str()),
            _ => None,
        })
    }

    /// Counts this node and every descendant.
    #[must_use]
    pub fn descendant_count(&self) -> usize {
        1 + self
            .children()
            .iter()
            .map(ValueNode::descendant_count)
            .sum::<usize>()
    }

    /// Reorders children into the schema's canonical order, recursively.
    ///
    /// Same-template siblings (list/leaf-list entries) keep their relative
    /// order; the sort is stable.
    pub fn canonical_reorder(&mut self, schema: &SchemaRegistry) {
        let order: Vec<TemplateId> = schema.children(self.template).to_vec();
        if let Payload::Children(children) = &mut self.payload {
            children.sort_by_key(|child| {
                order
                    .iter()
                    .position(|id| *id == child.template)
                    .unwrap_or(usize::MAX)
            });
            for child in children {
                child.canonical_reorder(schema);
            }
        }
    }

    /// Renders the subtree as JSON for diagnostics and logging.
    #[must_use]
    pub fn to_json(&self) -> Json {
        let mut object = Map::new();
        object.insert("name".into(), Json::String(self.name.clone()));
        match &self.payload {
            Payload::Scalar(Some(value)) => {
                object.insert("value".into(), Json::String(value.clone()));
            }
            Payload::Scalar(None) => {}
            Payload::Children(children) => {
                if !children.is_empty() {
                    object.insert(
                        "children".into(),
                        Json::Array(children.iter().map(ValueNode::to_json).collect()),
                    );
                }
            }
        }
        if !self.metadata.is_empty() {
            if let Ok(attrs) = serde_json::to_value(&self.metadata) {
                object.insert("attributes".into(), attrs);
            }
        }
        Json::Object(object)
    }

    fn name_matches(&self, name: &str) -> bool {
        self.name == name || self.name.rsplit(':').next() == Some(name)
    }

    fn check_addable(&self, child: &ValueNode) -> Result<(), ValueError> {
        if child.kind.is_multi_instance() {
            return Ok(());
        }
        if self.find_child_by_template(child.template).is_some() {
            return Err(ValueError::duplicate_child(&self.name, &child.name));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use trellis_schema::{LeafType, SchemaBuilder};

    use super::*;
    use crate::attr::InsertOrder;

    fn entry_schema() -> (SchemaRegistry, TemplateId, TemplateId, TemplateId, TemplateId) {
        let mut builder = SchemaBuilder::new();
        let top = builder.container(None, "top");
        let entry = builder.list(top, "entry", &["id"]);
        let id = builder.leaf(entry, "id", LeafType::Uint32);
        let value = builder.leaf(entry, "value", LeafType::String);
        let schema = builder.build().expect("schema builds");
        (schema, top, entry, id, value)
    }

    #[test]
    fn single_instance_children_cannot_repeat() {
        let (schema, top, _, _, _) = entry_schema();
        let inner = schema.find_child(top, "entry").expect("entry exists");
        let mut builder = SchemaBuilder::new();
        let holder = builder.container(None, "holder");
        let only = builder.container(holder, "only");
        let schema2 = builder.build().expect("schema builds");

        let mut parent = ValueNode::from_template(&schema2, holder);
        parent
            .add_child(ValueNode::from_template(&schema2, only))
            .expect("first instance");
        let error = parent
            .add_child(ValueNode::from_template(&schema2, only))
            .expect_err("second instance rejected");
        assert!(matches!(error, ValueError::DuplicateChild { .. }));

        // Lists repeat freely.
        let mut top_node = ValueNode::from_template(&schema, top);
        top_node
            .add_child(ValueNode::from_template(&schema, inner))
            .expect("first entry");
        top_node
            .add_child(ValueNode::from_template(&schema, inner))
            .expect("second entry");
        assert_eq!(top_node.children().len(), 2);
    }

    #[test]
    fn scalars_reject_children_and_interiors_reject_values() {
        let (schema, top, _, id, _) = entry_schema();
        let mut leaf = ValueNode::from_template(&schema, id);
        let error = leaf
            .add_child(ValueNode::from_template(&schema, top))
            .expect_err("leaf has no children");
        assert!(matches!(error, ValueError::ScalarParent { .. }));

        let mut container = ValueNode::from_template(&schema, top);
        let error = container.set_value("x").expect_err("container has no value");
        assert!(matches!(error, ValueError::NotScalar { .. }));
    }

    #[test]
    fn with_value_validates_against_the_leaf_type() {
        let (schema, _, _, id, _) = entry_schema();
        assert!(ValueNode::with_value(&schema, id, "42").is_ok());
        let error = ValueNode::with_value(&schema, id, "nope").expect_err("uint32 rejects text");
        assert!(matches!(error, ValueError::Invalid { .. }));

        // The accept-anyway path stores the text regardless.
        let forced = ValueNode::with_raw_value(&schema, id, "nope");
        assert_eq!(forced.value(), Some("nope"));
    }

    #[test]
    fn attributes_replace_per_variant() {
        let (schema, _, entry, _, _) = entry_schema();
        let mut node = ValueNode::from_template(&schema, entry);
        node.set_attribute(Attribute::EditOperation(EditOperation::Create));
        node.set_attribute(Attribute::EditOperation(EditOperation::Merge));
        node.set_attribute(Attribute::Insert(InsertSpec {
            order: InsertOrder::First,
            anchor: None,
        }));

        assert_eq!(node.edit_operation(), Some(EditOperation::Merge));
        assert_eq!(node.metadata().len(), 2);
    }

    #[test]
    fn canonical_reorder_restores_schema_order() {
        let (schema, _, entry, id, value) = entry_schema();
        let mut node = ValueNode::from_template(&schema, entry);
        node.add_child(ValueNode::with_value(&schema, value, "v").expect("value"))
            .expect("add value");
        node.add_child(ValueNode::with_value(&schema, id, "1").expect("id"))
            .expect("add id");
        assert_eq!(node.children()[0].name(), "value");

        node.canonical_reorder(&schema);
        assert_eq!(node.children()[0].name(), "id");
        assert_eq!(node.children()[1].name(), "value");
    }

    #[test]
    fn index_paths_navigate_the_tree() {
        let (schema, top, entry, id, _) = entry_schema();
        let mut root = ValueNode::from_template(&schema, top);
        let mut item = ValueNode::from_template(&schema, entry);
        item.add_child(ValueNode::with_value(&schema, id, "7").expect("id"))
            .expect("add id");
        root.add_child(item).expect("add entry");

        let leaf = root.node_at_path(&[0, 0]).expect("path resolves");
        assert_eq!(leaf.name(), "id");
        assert_eq!(leaf.value(), Some("7"));
        assert!(root.node_at_path(&[1]).is_none());
    }

    #[test]
    fn insert_after_places_entries_relative_to_an_anchor() {
        let (schema, top, entry, _, _) = entry_schema();
        let mut root = ValueNode::from_template(&schema, top);
        root.add_child(ValueNode::from_template(&schema, entry))
            .expect("first entry");
        root.add_child(ValueNode::from_template(&schema, entry))
            .expect("second entry");

        // After index 0 lands between the two; None lands first.
        root.insert_child_after(Some(0), ValueNode::from_template(&schema, entry))
            .expect("insert mid");
        root.insert_child_after(None, ValueNode::from_template(&schema, entry))
            .expect("insert front");
        assert_eq!(root.children().len(), 4);

        let error = root
            .insert_child_after(Some(9), ValueNode::from_template(&schema, entry))
            .expect_err("anchor out of range");
        assert!(matches!(error, ValueError::NoSuchIndex { .. }));
    }

    #[test]
    fn moving_children_preserves_order_and_invariants() {
        let (schema, _, entry, id, value) = entry_schema();
        let mut source = ValueNode::from_template(&schema, entry);
        source
            .add_child(ValueNode::with_value(&schema, id, "1").expect("id"))
            .expect("add id");
        source
            .add_child(ValueNode::with_value(&schema, value, "x").expect("value"))
            .expect("add value");

        let mut target = ValueNode::from_template(&schema, entry);
        target.move_children_from(&mut source).expect("move succeeds");

        assert!(source.children().is_empty());
        assert_eq!(target.children().len(), 2);
        assert_eq!(target.children()[0].name(), "id");
        assert_eq!(target.children()[1].name(), "value");

        // A second move collides with the single-instance invariant.
        let mut other = ValueNode::from_template(&schema, entry);
        other
            .add_child(ValueNode::with_value(&schema, id, "2").expect("id"))
            .expect("add id");
        let error = target
            .move_children_from(&mut other)
            .expect_err("duplicate id rejected");
        assert!(matches!(error, ValueError::DuplicateChild { .. }));
    }

    #[test]
    fn descendant_count_covers_the_subtree() {
        let (schema, top, entry, id, value) = entry_schema();
        let mut root = ValueNode::from_template(&schema, top);
        let mut item = ValueNode::from_template(&schema, entry);
        item.add_child(ValueNode::with_value(&schema, id, "7").expect("id"))
            .expect("add id");
        item.add_child(ValueNode::with_value(&schema, value, "x").expect("value"))
            .expect("add value");
        root.add_child(item).expect("add entry");
        assert_eq!(root.descendant_count(), 4);
    }
}
