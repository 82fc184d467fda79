//! Edit-request assembly.

use tracing::debug;

use trellis_config::{ClientConfig, Datastore, ErrorOption, TestOption};
use trellis_schema::{NodeKind, SchemaRegistry};
use trellis_value::{Attribute, EditOperation, InsertSpec, ValueNode};

use crate::content::add_config_from_content;
use crate::errors::EngineError;
use crate::fill::ValueFiller;
use crate::outcome::Assembly;
use crate::request::{RequestBody, RequestPayload, RequestVerb};
use crate::resolve::ResolvedTarget;

use super::ASSEMBLE_TARGET;

/// The content handed to the edit assembler.
#[derive(Debug)]
pub enum EditContent {
    /// A resolver-built ancestor chain with the target inside it.
    Resolved(ResolvedTarget),
    /// A bare content node; the minimal containing chain is built here.
    Content(ValueNode),
}

/// Options governing one edit assembly.
#[derive(Debug)]
pub struct EditOptions {
    /// The edit operation to tag the content with.
    pub operation: EditOperation,
    /// Insert-order metadata for user-ordered entries.
    pub insert: Option<InsertSpec>,
    /// Target datastore override; the session default applies otherwise.
    pub target: Option<Datastore>,
    /// Reorder the payload into canonical schema order before send.
    pub canonical_order: bool,
}

impl EditOptions {
    /// Options for a plain edit with the given operation.
    #[must_use]
    pub const fn new(operation: EditOperation) -> Self {
        Self {
            operation,
            insert: None,
            target: None,
            canonical_order: false,
        }
    }

    /// Adds insert-order metadata.
    #[must_use]
    pub fn with_insert(mut self, insert: InsertSpec) -> Self {
        self.insert = Some(insert);
        self
    }

    /// Overrides the target datastore.
    #[must_use]
    pub const fn with_target(mut self, target: Datastore) -> Self {
        self.target = Some(target);
        self
    }

    /// Requests canonical ordering, for strict peers.
    #[must_use]
    pub const fn with_canonical_order(mut self) -> Self {
        self.canonical_order = true;
        self
    }
}

/// Assembles an edit request body.
///
/// The content subtree is consumed: on success its ownership transfers
/// into the returned body, on any failure it is dropped here. Every
/// content list entry must carry its full key set; insert order
/// `before`/`after` requires an anchor.
///
/// # Errors
///
/// Returns [`EngineError::MissingParameter`] for an absent insert anchor
/// or list key, and [`EngineError::UnsupportedOperation`] when the target
/// is a choice/case, is not configuration data, or insert metadata is
/// applied to a non-list node.
pub fn assemble_edit_request(
    schema: &SchemaRegistry,
    config: &ClientConfig,
    filler: Option<&mut ValueFiller<'_>>,
    content: EditContent,
    options: EditOptions,
) -> Result<Assembly<RequestBody>, EngineError> {
    if let Some(spec) = &options.insert {
        if spec.order.needs_anchor() && spec.anchor.is_none() {
            // The content tree is consumed and dropped right here.
            return Err(EngineError::missing_parameter("insert anchor"));
        }
        if !spec.order.needs_anchor() && spec.anchor.is_some() {
            return Err(EngineError::unsupported_operation(
                "insert",
                "an anchor is only meaningful with 'before' or 'after'",
            ));
        }
    }

    let (mut root, content_path) = match content {
        EditContent::Resolved(resolved) => {
            let Some(path) = resolved.value_path else {
                return Err(EngineError::unsupported_operation(
                    "edit",
                    "a choice or case is never itself an editable node",
                ));
            };
            (resolved.root, path)
        }
        EditContent::Content(node) => match add_config_from_content(schema, filler, node)? {
            Assembly::Done(contained) => (contained.root, contained.content_path),
            Assembly::Canceled => return Ok(Assembly::Canceled),
        },
    };

    verify_list_keys(schema, &root)?;

    {
        let content_node = root
            .node_at_path_mut(&content_path)
            .ok_or_else(|| EngineError::unsupported_operation("edit", "broken content chain"))?;

        if let Some(spec) = options.insert {
            if !content_node.kind().is_multi_instance() {
                return Err(EngineError::unsupported_operation(
                    "insert",
                    format!("'{}' is not a user-ordered entry", content_node.name()),
                ));
            }
            content_node.set_attribute(Attribute::Insert(spec));
        }
    }

    tag_edit_operation(&mut root, &content_path, options.operation);

    if options.canonical_order {
        root.canonical_reorder(schema);
    }

    debug!(
        target: ASSEMBLE_TARGET,
        operation = %options.operation,
        nodes = root.descendant_count(),
        "assembled edit request"
    );

    Ok(Assembly::Done(RequestBody {
        verb: RequestVerb::EditConfig,
        target: Some(options.target.unwrap_or_else(|| config.default_target())),
        source: None,
        default_operation: non_default(config.default_operation(), EditOperation::default()),
        test_option: non_default(config.test_option(), TestOption::default()),
        error_option: non_default(config.error_option(), ErrorOption::default()),
        with_defaults: false,
        payload: RequestPayload::Config(root),
    }))
}

/// Tags the content with its edit operation.
///
/// A top-level container is structural only: the attribute lands on its
/// real children instead of the wrapper itself. Everything else is
/// tagged directly. (Choice and case never appear in a value tree, so
/// their delegation is implicit.)
fn tag_edit_operation(root: &mut ValueNode, content_path: &[usize], operation: EditOperation) {
    let Some(node) = root.node_at_path_mut(content_path) else {
        return;
    };
    let is_top_level_container = content_path.is_empty() && node.kind() == NodeKind::Container;
    if is_top_level_container {
        for index in 0..node.children().len() {
            if let Some(child) = node.child_at_mut(index) {
                child.set_attribute(Attribute::EditOperation(operation));
            }
        }
        return;
    }
    node.set_attribute(Attribute::EditOperation(operation));
}

/// Checks that every list entry in the payload carries all of its keys.
fn verify_list_keys(schema: &SchemaRegistry, node: &ValueNode) -> Result<(), EngineError> {
    if node.kind() == NodeKind::List {
        for key in schema.keys(node.template()) {
            let present = node
                .find_child_by_template(*key)
                .and_then(ValueNode::value)
                .is_some_and(|value| !value.is_empty());
            if !present {
                return Err(EngineError::missing_parameter(
                    schema.template(*key).qualified_name(),
                ));
            }
        }
    }
    for child in node.children() {
        verify_list_keys(schema, child)?;
    }
    Ok(())
}

fn non_default<T: PartialEq>(value: T, default: T) -> Option<T> {
    (value != default).then_some(value)
}
