//! Recursive value-tree filling.
//!
//! The filler populates a value tree to satisfy its schema template,
//! prompting only for nodes the governing policy requires. Recursion is
//! construct-or-destroy: every frame either hands a fully-formed node to
//! its parent or drops everything it allocated, so an abort at any depth
//! unwinds without leaks by ordinary ownership.

mod choice;
mod leaf;

use tracing::debug;

use trellis_schema::{NodeKind, SchemaRegistry, TemplateId};
use trellis_value::ValueNode;

use crate::errors::EngineError;
use crate::outcome::FillOutcome;
use crate::policy::FillPolicy;
use crate::prompt::PromptSource;
use crate::vars::{NoVariables, VariableStore};

pub(crate) const FILL_TARGET: &str = "trellis::fill";

static NO_VARIABLES: NoVariables = NoVariables;

/// Interactive filler for one top-level operation.
///
/// The filler borrows the schema, the prompt seam, and (optionally) the
/// variable store for the duration of one fill; policy is fixed at
/// construction and threaded through every recursive call.
pub struct ValueFiller<'a> {
    schema: &'a SchemaRegistry,
    prompt: &'a mut dyn PromptSource,
    vars: &'a dyn VariableStore,
    policy: FillPolicy,
}

impl<'a> ValueFiller<'a> {
    /// Creates a filler with no variable bindings attached.
    pub fn new(
        schema: &'a SchemaRegistry,
        prompt: &'a mut dyn PromptSource,
        policy: FillPolicy,
    ) -> Self {
        Self {
            schema,
            prompt,
            vars: &NO_VARIABLES,
            policy,
        }
    }

    /// Creates a filler that consults a variable store before prompting.
    pub fn with_variables(
        schema: &'a SchemaRegistry,
        prompt: &'a mut dyn PromptSource,
        policy: FillPolicy,
        vars: &'a dyn VariableStore,
    ) -> Self {
        Self {
            schema,
            prompt,
            vars,
            policy,
        }
    }

    /// The policy governing this fill.
    #[must_use]
    pub const fn policy(&self) -> &FillPolicy {
        &self.policy
    }

    /// Fills an existing node in place: its value when it is an unset
    /// scalar, otherwise its missing children in schema order.
    ///
    /// This is the top-level entry. A fully-populated tree produces zero
    /// prompts and returns `Filled` unchanged. On cancellation (or a hard
    /// error) every node attached during this call is dropped before
    /// returning, so the input tree is exactly as the caller left it.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::MissingParameter`] when a required node is
    /// skipped, plus any prompt or value-tree failure.
    pub fn fill_tree(
        &mut self,
        node: &mut ValueNode,
        old: Option<&ValueNode>,
    ) -> Result<FillOutcome, EngineError> {
        let schema = self.schema;
        if node.is_scalar() {
            if node.value().is_some() {
                return Ok(FillOutcome::Filled);
            }
            return self.fill_scalar_in_place(node, old);
        }
        let baseline = node.children().len();
        for child in schema.children(node.template()) {
            match self.fill_child(node, *child, old) {
                Ok(FillOutcome::Canceled) => {
                    node.truncate_children(baseline);
                    return Ok(FillOutcome::Canceled);
                }
                Ok(_) => {}
                Err(error) => {
                    node.truncate_children(baseline);
                    return Err(error);
                }
            }
        }
        Ok(FillOutcome::Filled)
    }

    /// Fills one child of `parent`, dispatching on the template kind.
    ///
    /// `old` is the previously-received counterpart of `parent`; child
    /// lookups against it supply continuity defaults. A `Skipped` return
    /// is success-with-omission and is absorbed by interior frames;
    /// `Canceled` propagates unchanged.
    ///
    /// # Errors
    ///
    /// As [`Self::fill_tree`].
    pub fn fill_child(
        &mut self,
        parent: &mut ValueNode,
        template: TemplateId,
        old: Option<&ValueNode>,
    ) -> Result<FillOutcome, EngineError> {
        let schema = self.schema;
        if !schema.is_enabled(template, self.policy.require_config) {
            return Ok(FillOutcome::Skipped);
        }
        let definition = schema.template(template);
        debug!(
            target: FILL_TARGET,
            node = %definition.qualified_name(),
            kind = ?definition.kind(),
            "filling node"
        );
        match definition.kind() {
            NodeKind::Leaf | NodeKind::AnyXml => self.fill_leaf(parent, template, old),
            NodeKind::LeafList => self.fill_leaf_list(parent, template, old),
            NodeKind::Choice => self.fill_choice(parent, template, old),
            NodeKind::Case => self.fill_case(parent, template, old),
            NodeKind::List => self.fill_list(parent, template, old),
            NodeKind::Container
            | NodeKind::Operation
            | NodeKind::OperationIo
            | NodeKind::Notification => self.fill_container(parent, template, old),
        }
    }

    /// Fills a container-like node: allocate, recurse, attach.
    ///
    /// An existing instance stops the walk (the caller already filled
    /// it). A new node is only attached when something inside it was
    /// populated or the container itself is mandatory; empty optional
    /// shells are dropped.
    fn fill_container(
        &mut self,
        parent: &mut ValueNode,
        template: TemplateId,
        old: Option<&ValueNode>,
    ) -> Result<FillOutcome, EngineError> {
        if parent.find_child_by_template(template).is_some() {
            return Ok(FillOutcome::Filled);
        }
        if self.policy.is_delete {
            // Keys are direct list children; containers hold none.
            return Ok(FillOutcome::Skipped);
        }
        let schema = self.schema;
        let definition = schema.template(template);
        let old_child = old.and_then(|node| node.find_child(definition.name()));
        let mut node = ValueNode::from_template(schema, template);
        for child in schema.children(template) {
            if self
                .fill_child(&mut node, *child, old_child)?
                .is_canceled()
            {
                return Ok(FillOutcome::Canceled);
            }
        }
        if node.is_empty() && !definition.is_mandatory() {
            return Ok(FillOutcome::Skipped);
        }
        parent.add_child(node)?;
        Ok(FillOutcome::Filled)
    }

    /// Fills a list by repeatedly building fresh entries.
    ///
    /// Entries are not matched by identity, so no old-value source is
    /// threaded into them. After each complete entry the operator decides
    /// whether to add another.
    fn fill_list(
        &mut self,
        parent: &mut ValueNode,
        template: TemplateId,
        _old: Option<&ValueNode>,
    ) -> Result<FillOutcome, EngineError> {
        if parent.find_child_by_template(template).is_some() {
            return Ok(FillOutcome::Filled);
        }
        let schema = self.schema;
        let definition = schema.template(template);
        if !self.policy.should_fill(definition) {
            return Ok(FillOutcome::Skipped);
        }
        loop {
            let mut entry = ValueNode::from_template(schema, template);
            for child in schema.children(template) {
                if self.fill_child(&mut entry, *child, None)?.is_canceled() {
                    return Ok(FillOutcome::Canceled);
                }
            }
            if entry.is_empty() {
                // Nothing was supplied for this entry; treat as a decline.
                return Ok(FillOutcome::Skipped);
            }
            parent.add_child(entry)?;
            match self.ask_more(definition.qualified_name().as_str())? {
                MoreEntries::Yes => {}
                MoreEntries::No => return Ok(FillOutcome::Filled),
                MoreEntries::Cancel => return Ok(FillOutcome::Canceled),
            }
        }
    }

    /// Maps a skip on a required node to the missing-parameter error.
    ///
    /// Deletes exempt non-key nodes from the requirement; everything the
    /// policy considers required refuses the skip sentinel.
    fn skip_or_missing(&self, template: TemplateId) -> Result<FillOutcome, EngineError> {
        let definition = self.schema.template(template);
        if definition.is_mandatory() || definition.is_key() {
            return Err(EngineError::missing_parameter(definition.qualified_name()));
        }
        Ok(FillOutcome::Skipped)
    }
}

/// Operator's answer to the "more entries?" confirmation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum MoreEntries {
    Yes,
    No,
    Cancel,
}
