//! Bottom-up content builders.
//!
//! When no ancestor chain was resolved up front, a bare content node is
//! wrapped in the minimal containing structure from the schema root down.
//! Choice and case ancestors are dissolved: their resolved child splices
//! directly into the grandparent, since the wire payload has no node for
//! either. The insertion point is threaded explicitly as an index path —
//! never ambient state — so each step's effect on "where to attach next"
//! is visible in the data flow.

use trellis_schema::{NodeKind, SchemaRegistry, TemplateId};
use trellis_value::ValueNode;

use crate::errors::EngineError;
use crate::fill::ValueFiller;
use crate::outcome::Assembly;

/// A content node wrapped in its minimal containing chain.
#[derive(Debug)]
pub struct ContainedContent {
    /// The top-level node of the built chain.
    pub root: ValueNode,
    /// Index path from `root` to the original content node.
    pub content_path: Vec<usize>,
}

/// Builds the containing chain for edit content.
///
/// Every ancestor must be configuration data. When a filler is supplied
/// (`do_fill` mode), missing list keys along the chain are requested
/// interactively; without one they are left absent.
///
/// # Errors
///
/// Returns [`EngineError::UnsupportedOperation`] when an ancestor is not
/// configuration data, plus any fill or value-tree failure.
pub fn add_config_from_content(
    schema: &SchemaRegistry,
    filler: Option<&mut ValueFiller<'_>>,
    content: ValueNode,
) -> Result<Assembly<ContainedContent>, EngineError> {
    build_chain(schema, filler, content, true)
}

/// Builds the containing chain for a read filter.
///
/// Filters tolerate partial keys, so this is normally called without a
/// filler; state (non-config) ancestors are permitted.
///
/// # Errors
///
/// As [`add_config_from_content`], minus the config restriction.
pub fn add_filter_from_content(
    schema: &SchemaRegistry,
    filler: Option<&mut ValueFiller<'_>>,
    content: ValueNode,
) -> Result<Assembly<ContainedContent>, EngineError> {
    build_chain(schema, filler, content, false)
}

fn build_chain(
    schema: &SchemaRegistry,
    mut filler: Option<&mut ValueFiller<'_>>,
    mut content: ValueNode,
    require_config: bool,
) -> Result<Assembly<ContainedContent>, EngineError> {
    let ancestry = schema.ancestry(content.template());
    let Some((_, ancestors)) = ancestry.split_last() else {
        return Err(EngineError::unknown_target(content.name().to_owned()));
    };

    if require_config {
        for ancestor in &ancestry {
            let definition = schema.template(*ancestor);
            if definition.kind().on_wire() && !definition.is_config() {
                return Err(EngineError::unsupported_operation(
                    "edit",
                    format!("'{}' is not configuration data", definition.qualified_name()),
                ));
            }
        }
    }

    let mut root: Option<ValueNode> = None;
    let mut path: Vec<usize> = Vec::new();
    let mut pending_case: Option<TemplateId> = None;

    for ancestor in ancestors {
        let definition = schema.template(*ancestor);
        match definition.kind() {
            // Dissolved: the wire has no node for a choice or case.
            NodeKind::Choice => {
                pending_case = None;
                continue;
            }
            NodeKind::Case => {
                pending_case = Some(*ancestor);
                continue;
            }
            _ => {}
        }
        let mut node = ValueNode::from_template(schema, *ancestor);
        if let Some(case) = pending_case.take() {
            node.set_case(case);
        }
        attach(&mut root, &mut path, node)?;

        if definition.kind() == NodeKind::List {
            if let Some(filler) = filler.as_deref_mut() {
                let Some(entry) = root
                    .as_mut()
                    .and_then(|tree| tree.node_at_path_mut(&path))
                else {
                    continue;
                };
                for key in schema.keys(*ancestor) {
                    if entry.find_child_by_template(*key).is_some() {
                        continue;
                    }
                    if filler.fill_child(entry, *key, None)?.is_canceled() {
                        return Ok(Assembly::Canceled);
                    }
                }
            }
        }
    }

    if let Some(case) = pending_case.take() {
        content.set_case(case);
    }
    attach(&mut root, &mut path, content)?;

    let root = root.ok_or_else(|| {
        EngineError::unsupported_operation("assemble", "content chain is empty")
    })?;
    Ok(Assembly::Done(ContainedContent {
        root,
        content_path: path,
    }))
}

/// Attaches a node at the current insertion point, advancing the path.
fn attach(
    root: &mut Option<ValueNode>,
    path: &mut Vec<usize>,
    node: ValueNode,
) -> Result<(), EngineError> {
    if let Some(tree) = root.as_mut() {
        let parent = tree
            .node_at_path_mut(path)
            .ok_or_else(|| EngineError::unsupported_operation("assemble", "broken chain"))?;
        let index = parent.add_child(node)?;
        path.push(index);
    } else {
        *root = Some(node);
        path.clear();
    }
    Ok(())
}
