//! Leaf, leaf-list, and anyxml filling: prompting, validation, and the
//! bad-data policy.

use tracing::warn;

use trellis_config::BadDataPolicy;
use trellis_schema::{LeafType, NodeKind, ObjectTemplate, TemplateId};
use trellis_value::ValueNode;

use crate::errors::EngineError;
use crate::outcome::FillOutcome;
use crate::prompt::PromptLine;
use crate::vars::VariableScope;

use super::{MoreEntries, ValueFiller, FILL_TARGET};

/// Result of obtaining one scalar value from the operator.
enum Obtained {
    /// A value was produced; validation (or an explicit accept-anyway)
    /// has already happened.
    Text(String),
    /// The operator skipped or canceled instead.
    Outcome(FillOutcome),
}

impl ValueFiller<'_> {
    /// Fills a leaf or anyxml child of `parent`.
    pub(super) fn fill_leaf(
        &mut self,
        parent: &mut ValueNode,
        template: TemplateId,
        old: Option<&ValueNode>,
    ) -> Result<FillOutcome, EngineError> {
        let schema = self.schema;
        let definition = schema.template(template);
        if parent.find_child_by_template(template).is_some() {
            return Ok(FillOutcome::Filled);
        }
        let old_value = old
            .and_then(|node| node.find_child(definition.name()))
            .and_then(|node| node.value().map(ToOwned::to_owned));
        if !self.policy.should_fill(definition) {
            // Continuity: an optional node keeps its previous value even
            // when it is not re-prompted.
            if let Some(value) = old_value {
                parent.add_child(ValueNode::with_raw_value(schema, template, value))?;
            }
            return Ok(FillOutcome::Skipped);
        }
        if let Some(text) = self.bound_variable(definition) {
            parent.add_child(ValueNode::with_raw_value(schema, template, text))?;
            return Ok(FillOutcome::Filled);
        }
        if matches!(definition.leaf_type(), Some(LeafType::Empty)) {
            return self.fill_empty_leaf(parent, template, old_value.is_some());
        }
        let offer = old_value.or_else(|| definition.default_value().map(ToOwned::to_owned));
        match self.obtain_value(template, offer.as_deref())? {
            Obtained::Text(text) => {
                parent.add_child(ValueNode::with_raw_value(schema, template, text))?;
                Ok(FillOutcome::Filled)
            }
            Obtained::Outcome(FillOutcome::Skipped) => self.skip_or_missing(template),
            Obtained::Outcome(outcome) => Ok(outcome),
        }
    }

    /// Fills a leaf-list child of `parent`, one value at a time.
    pub(super) fn fill_leaf_list(
        &mut self,
        parent: &mut ValueNode,
        template: TemplateId,
        old: Option<&ValueNode>,
    ) -> Result<FillOutcome, EngineError> {
        let schema = self.schema;
        let definition = schema.template(template);
        if parent.find_child_by_template(template).is_some() {
            return Ok(FillOutcome::Filled);
        }
        let old_values: Vec<String> = old
            .map(|node| {
                node.children_named(definition.name())
                    .filter_map(|entry| entry.value().map(ToOwned::to_owned))
                    .collect()
            })
            .unwrap_or_default();
        if !self.policy.should_fill(definition) {
            for value in old_values {
                parent.add_child(ValueNode::with_raw_value(schema, template, value))?;
            }
            return Ok(FillOutcome::Skipped);
        }
        let mut added = 0_usize;
        loop {
            let offer = old_values
                .get(added)
                .cloned()
                .or_else(|| definition.default_value().map(ToOwned::to_owned));
            match self.obtain_value(template, offer.as_deref())? {
                Obtained::Text(text) => {
                    parent.add_child(ValueNode::with_raw_value(schema, template, text))?;
                    added += 1;
                }
                Obtained::Outcome(FillOutcome::Canceled) => return Ok(FillOutcome::Canceled),
                Obtained::Outcome(_) => {
                    if added == 0 {
                        return self.skip_or_missing(template);
                    }
                    return Ok(FillOutcome::Filled);
                }
            }
            match self.ask_more(definition.qualified_name().as_str())? {
                MoreEntries::Yes => {}
                MoreEntries::No => return Ok(FillOutcome::Filled),
                MoreEntries::Cancel => return Ok(FillOutcome::Canceled),
            }
        }
    }

    /// Fills an unset scalar node in place (the top-level-target case).
    pub(super) fn fill_scalar_in_place(
        &mut self,
        node: &mut ValueNode,
        old: Option<&ValueNode>,
    ) -> Result<FillOutcome, EngineError> {
        let template = node.template();
        let schema = self.schema;
        let definition = schema.template(template);
        if matches!(definition.leaf_type(), Some(LeafType::Empty)) {
            node.set_value("")?;
            return Ok(FillOutcome::Filled);
        }
        let offer = old
            .and_then(|previous| previous.value().map(ToOwned::to_owned))
            .or_else(|| definition.default_value().map(ToOwned::to_owned));
        match self.obtain_value(template, offer.as_deref())? {
            Obtained::Text(text) => {
                node.set_value(text)?;
                Ok(FillOutcome::Filled)
            }
            Obtained::Outcome(FillOutcome::Skipped) => self.skip_or_missing(template),
            Obtained::Outcome(outcome) => Ok(outcome),
        }
    }

    /// Yes/no prompt for an empty (presence-only) leaf.
    fn fill_empty_leaf(
        &mut self,
        parent: &mut ValueNode,
        template: TemplateId,
        had_old: bool,
    ) -> Result<FillOutcome, EngineError> {
        let schema = self.schema;
        let definition = schema.template(template);
        let default_yes = had_old;
        let hint = if default_yes { "[y]" } else { "[n]" };
        let base = format!("set '{}'? (y/n) {hint}: ", definition.qualified_name());
        let mut prompt = base.clone();
        loop {
            match self.prompt.read_line(&prompt)? {
                PromptLine::Text(text) => {
                    let answer = text.trim().to_ascii_lowercase();
                    let yes = match answer.as_str() {
                        "" => default_yes,
                        "y" | "yes" => true,
                        _ => false,
                    };
                    if yes {
                        parent.add_child(ValueNode::with_raw_value(schema, template, ""))?;
                        return Ok(FillOutcome::Filled);
                    }
                    if definition.is_mandatory() {
                        return Err(EngineError::missing_parameter(definition.qualified_name()));
                    }
                    return Ok(FillOutcome::Skipped);
                }
                PromptLine::HelpBrief => {
                    prompt = format!("{}\n{base}", help_text(definition, false));
                }
                PromptLine::HelpFull => {
                    prompt = format!("{}\n{base}", help_text(definition, true));
                }
                PromptLine::Cancel => return Ok(FillOutcome::Canceled),
                PromptLine::Skip => return self.skip_or_missing(template),
            }
        }
    }

    /// Reads and validates one scalar value, applying the bad-data
    /// policy until a value is produced or the operator bails out.
    fn obtain_value(
        &mut self,
        template: TemplateId,
        offer: Option<&str>,
    ) -> Result<Obtained, EngineError> {
        loop {
            let text = match self.read_value(template, offer)? {
                Obtained::Text(text) => text,
                outcome @ Obtained::Outcome(_) => return Ok(outcome),
            };
            match self.vet_value(template, text)? {
                Vetting::Accept(text) => return Ok(Obtained::Text(text)),
                Vetting::Retry => {}
                Vetting::Outcome(outcome) => return Ok(Obtained::Outcome(outcome)),
            }
        }
    }

    /// One prompt round: renders the prompt, classifies the reply, and
    /// substitutes the offer for an empty line.
    fn read_value(
        &mut self,
        template: TemplateId,
        offer: Option<&str>,
    ) -> Result<Obtained, EngineError> {
        let schema = self.schema;
        let definition = schema.template(template);
        let base = render_value_prompt(definition, offer);
        let mut prompt = base.clone();
        loop {
            match self.prompt.read_line(&prompt)? {
                PromptLine::Text(text) => {
                    let trimmed = text.trim();
                    if trimmed.is_empty() {
                        match offer {
                            Some(value) => return Ok(Obtained::Text(value.to_owned())),
                            // No offer to fall back on; ask again.
                            None => continue,
                        }
                    }
                    return Ok(Obtained::Text(trimmed.to_owned()));
                }
                PromptLine::HelpBrief => {
                    prompt = format!("{}\n{base}", help_text(definition, false));
                }
                PromptLine::HelpFull => {
                    prompt = format!("{}\n{base}", help_text(definition, true));
                }
                PromptLine::Cancel => return Ok(Obtained::Outcome(FillOutcome::Canceled)),
                PromptLine::Skip => return Ok(Obtained::Outcome(FillOutcome::Skipped)),
            }
        }
    }

    /// Applies leaf-type validation and the bad-data policy to a
    /// candidate value.
    fn vet_value(&mut self, template: TemplateId, text: String) -> Result<Vetting, EngineError> {
        let schema = self.schema;
        let definition = schema.template(template);
        let Some(leaf_type) = definition.leaf_type() else {
            return Ok(Vetting::Accept(text));
        };
        let Err(source) = leaf_type.validate(&text) else {
            return Ok(Vetting::Accept(text));
        };
        match self.policy.bad_data {
            BadDataPolicy::Ignore => Ok(Vetting::Accept(text)),
            BadDataPolicy::Warn => {
                warn!(
                    target: FILL_TARGET,
                    node = %definition.qualified_name(),
                    value = %text,
                    %source,
                    "accepting schema-invalid value"
                );
                Ok(Vetting::Accept(text))
            }
            BadDataPolicy::Error => Err(EngineError::InvalidValue {
                node: definition.qualified_name(),
                source,
            }),
            BadDataPolicy::AskUser => self.ask_bad_value(definition, text, &source.to_string()),
        }
    }

    /// Accept-anyway/retry prompt for a schema-invalid value.
    fn ask_bad_value(
        &mut self,
        definition: &ObjectTemplate,
        text: String,
        reason: &str,
    ) -> Result<Vetting, EngineError> {
        let base = format!(
            "value '{text}' is invalid for '{}' ({reason}); accept anyway? (a = accept, r = retry) [r]: ",
            definition.qualified_name()
        );
        let mut prompt = base.clone();
        loop {
            match self.prompt.read_line(&prompt)? {
                PromptLine::Text(answer) => {
                    return match answer.trim().to_ascii_lowercase().as_str() {
                        "a" | "accept" => Ok(Vetting::Accept(text)),
                        _ => Ok(Vetting::Retry),
                    };
                }
                PromptLine::HelpBrief => {
                    prompt = format!("{}\n{base}", help_text(definition, false));
                }
                PromptLine::HelpFull => {
                    prompt = format!("{}\n{base}", help_text(definition, true));
                }
                PromptLine::Cancel => return Ok(Vetting::Outcome(FillOutcome::Canceled)),
                PromptLine::Skip => return Ok(Vetting::Outcome(FillOutcome::Skipped)),
            }
        }
    }

    /// "More entries?" confirmation shared by list and leaf-list fills.
    pub(super) fn ask_more(&mut self, name: &str) -> Result<MoreEntries, EngineError> {
        let prompt = format!("add another '{name}' entry? (y/n) [n]: ");
        match self.prompt.read_line(&prompt)? {
            PromptLine::Text(answer) => {
                match answer.trim().to_ascii_lowercase().as_str() {
                    "y" | "yes" => Ok(MoreEntries::Yes),
                    _ => Ok(MoreEntries::No),
                }
            }
            PromptLine::HelpBrief | PromptLine::HelpFull | PromptLine::Skip => {
                Ok(MoreEntries::No)
            }
            PromptLine::Cancel => Ok(MoreEntries::Cancel),
        }
    }

    /// Resolves a pre-supplied variable binding for a node, if any.
    fn bound_variable(&self, definition: &ObjectTemplate) -> Option<String> {
        let bound = self.vars.lookup(definition.name(), VariableScope::Local)?;
        bound.value().map(ToOwned::to_owned)
    }
}

/// Decision after vetting a candidate value.
enum Vetting {
    Accept(String),
    Retry,
    Outcome(FillOutcome),
}

fn render_value_prompt(definition: &ObjectTemplate, offer: Option<&str>) -> String {
    let kind = match definition.kind() {
        NodeKind::LeafList => "leaf-list",
        NodeKind::AnyXml => "anyxml",
        _ => "leaf",
    };
    let type_desc = definition
        .leaf_type()
        .map_or_else(|| "anyxml".to_owned(), LeafType::describe);
    match offer {
        Some(value) => format!(
            "{kind} '{}' ({type_desc}) [{value}]: ",
            definition.qualified_name()
        ),
        None => format!("{kind} '{}' ({type_desc}): ", definition.qualified_name()),
    }
}

pub(super) fn help_text(definition: &ObjectTemplate, full: bool) -> String {
    let description = definition.description().unwrap_or("(no description)");
    if full {
        let type_desc = definition
            .leaf_type()
            .map_or_else(|| format!("{:?}", definition.kind()), LeafType::describe);
        format!("{}: {description} ({type_desc})", definition.qualified_name())
    } else {
        format!("{}: {description}", definition.qualified_name())
    }
}
