//! Choice and case filling.
//!
//! A choice never appears on the wire: the selected case's children are
//! attached directly to the choice's parent, each stamped with the case
//! id so a later fill can recognise which alternative was committed and
//! resume it instead of re-offering the menu.

use trellis_schema::{LeafType, NodeKind, TemplateId};
use trellis_value::ValueNode;

use crate::errors::EngineError;
use crate::outcome::FillOutcome;
use crate::prompt::PromptLine;

use super::leaf::help_text;
use super::ValueFiller;

impl ValueFiller<'_> {
    /// Fills a choice child of `parent`.
    ///
    /// A partially-committed case is resumed without a menu. Otherwise
    /// the enabled cases decide: none is a no-op, one is selected
    /// automatically, several are offered as a numbered menu.
    pub(super) fn fill_choice(
        &mut self,
        parent: &mut ValueNode,
        choice: TemplateId,
        old: Option<&ValueNode>,
    ) -> Result<FillOutcome, EngineError> {
        let schema = self.schema;
        if let Some(case) = self.committed_case(parent, choice) {
            return self.fill_case_children(parent, case, old);
        }
        if self.policy.is_delete {
            return Ok(FillOutcome::Skipped);
        }
        let enabled: Vec<TemplateId> = schema
            .children(choice)
            .iter()
            .copied()
            .filter(|case| schema.is_enabled(*case, self.policy.require_config))
            .collect();
        match enabled.as_slice() {
            [] => Ok(FillOutcome::Filled),
            [only] => self.fill_case(parent, *only, old),
            _ => self.offer_case_menu(parent, choice, &enabled, old),
        }
    }

    /// Fills one case: the flag-only shortcut, or the general child walk.
    pub(super) fn fill_case(
        &mut self,
        parent: &mut ValueNode,
        case: TemplateId,
        old: Option<&ValueNode>,
    ) -> Result<FillOutcome, EngineError> {
        let schema = self.schema;
        let definition = schema.template(case);
        if !schema.is_enabled(case, self.policy.require_config) {
            return Err(EngineError::unsupported_operation(
                "fill",
                format!("case '{}' is not configurable", definition.qualified_name()),
            ));
        }
        // Flag-only case: selecting it from the menu already answered the
        // yes/no question an empty leaf would ask.
        if let [only] = schema.children(case) {
            if matches!(schema.template(*only).leaf_type(), Some(LeafType::Empty)) {
                let mut node = ValueNode::with_raw_value(schema, *only, "");
                node.set_case(case);
                parent.add_child(node)?;
                return Ok(FillOutcome::Filled);
            }
        }
        self.fill_case_children(parent, case, old)
    }

    /// Walks a case's children, stamping created nodes with the case id.
    fn fill_case_children(
        &mut self,
        parent: &mut ValueNode,
        case: TemplateId,
        old: Option<&ValueNode>,
    ) -> Result<FillOutcome, EngineError> {
        let schema = self.schema;
        for child in schema.children(case) {
            if self.fill_child(parent, *child, old)?.is_canceled() {
                return Ok(FillOutcome::Canceled);
            }
            parent.mark_case(*child, case);
        }
        Ok(FillOutcome::Filled)
    }

    /// Finds the case already partially committed under `parent`, if any.
    ///
    /// Detection is by template containment: the first case with any of
    /// its descendant data nodes present in the parent wins, so a resumed
    /// fill completes that case instead of re-offering the selection.
    fn committed_case(&self, parent: &ValueNode, choice: TemplateId) -> Option<TemplateId> {
        self.schema
            .children(choice)
            .iter()
            .copied()
            .find(|case| self.case_touched(parent, *case))
    }

    fn case_touched(&self, parent: &ValueNode, case: TemplateId) -> bool {
        let schema = self.schema;
        schema.children(case).iter().any(|child| {
            if schema.template(*child).kind() == NodeKind::Choice {
                schema
                    .children(*child)
                    .iter()
                    .any(|nested| self.case_touched(parent, *nested))
            } else {
                parent.find_child_by_template(*child).is_some()
            }
        })
    }

    /// Numbered case menu with default-case and sentinel handling.
    fn offer_case_menu(
        &mut self,
        parent: &mut ValueNode,
        choice: TemplateId,
        enabled: &[TemplateId],
        old: Option<&ValueNode>,
    ) -> Result<FillOutcome, EngineError> {
        let schema = self.schema;
        let definition = schema.template(choice);
        let default_case = schema
            .default_case(choice)
            .filter(|case| enabled.contains(case));
        let base = render_case_menu(self, definition.qualified_name().as_str(), enabled, default_case);
        let mut prompt = base.clone();
        loop {
            match self.prompt.read_line(&prompt)? {
                PromptLine::Text(text) => {
                    let trimmed = text.trim();
                    if trimmed.is_empty() {
                        if let Some(case) = default_case {
                            return self.fill_case(parent, case, old);
                        }
                        prompt = format!("a case number is required\n{base}");
                        continue;
                    }
                    match trimmed.parse::<usize>() {
                        Ok(index) if (1..=enabled.len()).contains(&index) => {
                            return self.fill_case(parent, enabled[index - 1], old);
                        }
                        _ => {
                            prompt = format!(
                                "enter a number between 1 and {}\n{base}",
                                enabled.len()
                            );
                        }
                    }
                }
                PromptLine::HelpBrief => {
                    prompt = format!("{}\n{base}", help_text(definition, false));
                }
                PromptLine::HelpFull => {
                    prompt = format!("{}\n{base}", case_help(self, enabled));
                }
                PromptLine::Cancel => return Ok(FillOutcome::Canceled),
                PromptLine::Skip => return self.skip_or_missing(choice),
            }
        }
    }
}

fn render_case_menu(
    filler: &ValueFiller<'_>,
    choice_name: &str,
    cases: &[TemplateId],
    default_case: Option<TemplateId>,
) -> String {
    let schema = filler.schema;
    let mut lines = Vec::with_capacity(cases.len() + 1);
    for (index, case) in cases.iter().enumerate() {
        let case_def = schema.template(*case);
        let children: Vec<&str> = schema
            .children(*case)
            .iter()
            .map(|child| schema.template(*child).name())
            .collect();
        lines.push(format!(
            "  {}: {} ({})",
            index + 1,
            case_def.qualified_name(),
            children.join(", ")
        ));
    }
    let default_note = default_case
        .map(|case| format!(" [{}]", schema.template(case).name()))
        .unwrap_or_default();
    lines.push(format!("select case for choice '{choice_name}'{default_note}: "));
    lines.join("\n")
}

fn case_help(filler: &ValueFiller<'_>, cases: &[TemplateId]) -> String {
    let schema = filler.schema;
    cases
        .iter()
        .map(|case| help_text(schema.template(*case), true))
        .collect::<Vec<_>>()
        .join("\n")
}
