//! Instance-path resolution.
//!
//! A target expression (`/interfaces/interface[name='eth0']/mtu`, or the
//! dotted form `interfaces.interface.mtu`) resolves into the target
//! schema object plus an ancestor value tree rooted at the document root,
//! with every intermediate node allocated top-down and list keys
//! populated from the path predicates. Choice and case steps move the
//! schema cursor but allocate nothing: the wire has no node for them.

use tracing::debug;

use trellis_schema::{NodeKind, SchemaRegistry, TemplateId};
use trellis_value::ValueNode;

use crate::errors::EngineError;
use crate::fill::ValueFiller;
use crate::outcome::FillOutcome;

const RESOLVE_TARGET: &str = "trellis::resolve";

/// Result of resolving a target expression.
#[derive(Debug)]
pub enum Resolution {
    /// The expression named the document root: no node is selected.
    ///
    /// This is a sentinel, not an error; callers reject operations that
    /// make no sense on the root (an edit, for instance) and allow it for
    /// others.
    DocumentRoot,
    /// The expression resolved to a node below the root.
    Target(ResolvedTarget),
}

/// A resolved target: schema object plus populated ancestor chain.
#[derive(Debug)]
pub struct ResolvedTarget {
    /// The top-level ancestor node (may itself be the target).
    pub root: ValueNode,
    /// The target schema object.
    pub target: TemplateId,
    /// Index path from `root` to the target's value node; `None` when the
    /// target is a choice or case, which has no wire node (the path then
    /// leads to the nearest real ancestor).
    pub value_path: Option<Vec<usize>>,
}

impl ResolvedTarget {
    /// Borrows the target's value node, when it has one.
    #[must_use]
    pub fn target_node(&self) -> Option<&ValueNode> {
        self.value_path
            .as_deref()
            .and_then(|path| self.root.node_at_path(path))
    }

    /// Mutable variant of [`Self::target_node`].
    pub fn target_node_mut(&mut self) -> Option<&mut ValueNode> {
        self.value_path
            .as_deref()
            .and_then(|path| self.root.node_at_path_mut(path))
    }
}

/// One parsed path step: a name plus optional key predicates.
#[derive(Debug, PartialEq, Eq)]
struct PathStep {
    name: String,
    predicates: Vec<(String, String)>,
}

/// A matched schema candidate for one step.
struct StepHit {
    template: TemplateId,
    case: Option<TemplateId>,
}

/// Resolver for instance-path target expressions.
#[derive(Debug, Clone, Copy)]
pub struct TargetResolver<'a> {
    schema: &'a SchemaRegistry,
}

impl<'a> TargetResolver<'a> {
    /// Creates a resolver over a schema.
    #[must_use]
    pub const fn new(schema: &'a SchemaRegistry) -> Self {
        Self { schema }
    }

    /// Resolves a target expression.
    ///
    /// `require_config` restricts navigation to configuration nodes, as
    /// an edit operation demands.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::PathSyntax`] for malformed expressions,
    /// [`EngineError::UnknownTarget`] / [`EngineError::AmbiguousTarget`]
    /// for steps matching zero or several schema nodes, and
    /// [`EngineError::InvalidValue`] when a key predicate fails its leaf
    /// type.
    pub fn resolve(&self, expr: &str, require_config: bool) -> Result<Resolution, EngineError> {
        let steps = parse_path(expr)?;
        if steps.is_empty() {
            return Ok(Resolution::DocumentRoot);
        }
        let schema = self.schema;
        let mut root: Option<ValueNode> = None;
        let mut value_path: Vec<usize> = Vec::new();
        let mut cursor: Option<TemplateId> = None;
        let mut cursor_has_node = false;

        for step in &steps {
            let hit = match cursor {
                None => self.root_step(&step.name, require_config)?,
                Some(parent) => self.child_step(parent, &step.name, require_config)?,
            };
            let definition = schema.template(hit.template);
            if !definition.kind().on_wire() {
                if !step.predicates.is_empty() {
                    return Err(EngineError::path_syntax(
                        expr,
                        format!("step '{}' cannot carry key predicates", step.name),
                    ));
                }
                cursor = Some(hit.template);
                cursor_has_node = false;
                continue;
            }

            let mut node = ValueNode::from_template(schema, hit.template);
            if let Some(case) = hit.case {
                node.set_case(case);
            }
            self.apply_predicates(&mut node, hit.template, step, expr)?;

            if let Some(tree) = root.as_mut() {
                let parent = tree
                    .node_at_path_mut(&value_path)
                    .ok_or_else(|| EngineError::unknown_target(&step.name))?;
                let index = parent.add_child(node)?;
                value_path.push(index);
            } else {
                root = Some(node);
                value_path.clear();
            }
            cursor = Some(hit.template);
            cursor_has_node = true;
        }

        let target = cursor.ok_or_else(|| EngineError::path_syntax(expr, "no steps"))?;
        let root = root.ok_or_else(|| {
            EngineError::unsupported_operation(
                "resolve",
                "target has no wire representation",
            )
        })?;
        debug!(
            target: RESOLVE_TARGET,
            expr,
            node = %schema.template(target).qualified_name(),
            "resolved target"
        );
        Ok(Resolution::Target(ResolvedTarget {
            root,
            target,
            value_path: cursor_has_node.then_some(value_path),
        }))
    }

    /// Completes missing list keys along a resolved ancestor chain.
    ///
    /// Walks from the target up to the root and, for every list node
    /// whose key leaves are not yet present, fills just those keys
    /// through the filler — provided its policy completes keys at all
    /// (optional-fill or a write operation). This guarantees content
    /// hung below the chain can be located unambiguously.
    ///
    /// # Errors
    ///
    /// Propagates fill errors; a cancel is returned as
    /// [`FillOutcome::Canceled`].
    pub fn complete_path_content(
        &self,
        filler: &mut ValueFiller<'_>,
        resolved: &mut ResolvedTarget,
    ) -> Result<FillOutcome, EngineError> {
        let schema = self.schema;
        if !filler.policy().complete_keys() {
            return Ok(FillOutcome::Filled);
        }
        let path = resolved.value_path.clone().unwrap_or_default();
        for depth in (0..=path.len()).rev() {
            let Some(node) = resolved.root.node_at_path_mut(&path[..depth]) else {
                continue;
            };
            if node.kind() != NodeKind::List {
                continue;
            }
            for key in schema.keys(node.template()).to_vec() {
                if node.find_child_by_template(key).is_some() {
                    continue;
                }
                if filler.fill_child(node, key, None)?.is_canceled() {
                    return Ok(FillOutcome::Canceled);
                }
            }
        }
        Ok(FillOutcome::Filled)
    }

    /// Re-derives the path expression for a resolved chain.
    ///
    /// The result is equivalent to the resolved input: same ancestor
    /// names, same key predicates in schema key order.
    #[must_use]
    pub fn instance_path(&self, root: &ValueNode, value_path: &[usize]) -> String {
        let schema = self.schema;
        let mut out = String::new();
        let mut cursor = root;
        let mut depth = 0_usize;
        loop {
            out.push('/');
            out.push_str(cursor.name());
            if cursor.kind() == NodeKind::List {
                for key in schema.keys(cursor.template()) {
                    if let Some(leaf) = cursor.find_child_by_template(*key) {
                        if let Some(value) = leaf.value() {
                            out.push_str(&format!("[{}='{}']", leaf.name(), value));
                        }
                    }
                }
            }
            if depth == value_path.len() {
                break;
            }
            match cursor.child_at(value_path[depth]) {
                Some(child) => cursor = child,
                None => break,
            }
            depth += 1;
        }
        out
    }

    fn root_step(&self, name: &str, require_config: bool) -> Result<StepHit, EngineError> {
        let schema = self.schema;
        let candidates: Vec<TemplateId> = schema
            .roots_named(name)
            .filter(|id| schema.is_enabled(*id, require_config))
            .collect();
        Self::single_hit(name, &candidates).map(|template| StepHit {
            template,
            case: None,
        })
    }

    fn child_step(
        &self,
        parent: TemplateId,
        name: &str,
        require_config: bool,
    ) -> Result<StepHit, EngineError> {
        let schema = self.schema;
        let direct: Vec<TemplateId> = schema
            .children_named(parent, name)
            .filter(|id| schema.is_enabled(*id, require_config))
            .collect();
        if !direct.is_empty() {
            return Self::single_hit(name, &direct).map(|template| StepHit {
                template,
                case: None,
            });
        }
        // No direct child: look through choices transparently, since data
        // paths normally omit choice and case names.
        let mut hits = Vec::new();
        self.collect_through_choices(parent, name, require_config, None, &mut hits);
        match hits.as_slice() {
            [] => Err(EngineError::unknown_target(name)),
            [only] => Ok(StepHit {
                template: only.template,
                case: only.case,
            }),
            _ => Err(EngineError::ambiguous_target(name)),
        }
    }

    fn collect_through_choices(
        &self,
        parent: TemplateId,
        name: &str,
        require_config: bool,
        via_case: Option<TemplateId>,
        hits: &mut Vec<StepHit>,
    ) {
        let schema = self.schema;
        for child in schema.children(parent) {
            let definition = schema.template(*child);
            match definition.kind() {
                NodeKind::Choice => {
                    self.collect_through_choices(*child, name, require_config, via_case, hits);
                }
                NodeKind::Case => {
                    self.collect_through_choices(*child, name, require_config, Some(*child), hits);
                }
                _ => {
                    let matches =
                        definition.name() == name || definition.qualified_name() == name;
                    if matches && schema.is_enabled(*child, require_config) {
                        hits.push(StepHit {
                            template: *child,
                            case: via_case,
                        });
                    }
                }
            }
        }
    }

    fn apply_predicates(
        &self,
        node: &mut ValueNode,
        template: TemplateId,
        step: &PathStep,
        expr: &str,
    ) -> Result<(), EngineError> {
        if step.predicates.is_empty() {
            return Ok(());
        }
        let schema = self.schema;
        if schema.template(template).kind() != NodeKind::List {
            return Err(EngineError::path_syntax(
                expr,
                format!("step '{}' is not a list and takes no predicates", step.name),
            ));
        }
        for (key_name, key_value) in &step.predicates {
            let key = schema
                .keys(template)
                .iter()
                .copied()
                .find(|id| {
                    let definition = schema.template(*id);
                    definition.name() == key_name || &definition.qualified_name() == key_name
                })
                .ok_or_else(|| {
                    EngineError::path_syntax(
                        expr,
                        format!("'{key_name}' is not a key of '{}'", step.name),
                    )
                })?;
            let leaf = ValueNode::with_value(schema, key, key_value.clone()).map_err(
                |error| match error {
                    trellis_value::ValueError::Invalid { name, source } => {
                        EngineError::InvalidValue { node: name, source }
                    }
                    other => EngineError::Value(other),
                },
            )?;
            node.add_child(leaf)?;
        }
        Ok(())
    }

    fn single_hit(name: &str, candidates: &[TemplateId]) -> Result<TemplateId, EngineError> {
        match candidates {
            [] => Err(EngineError::unknown_target(name)),
            [only] => Ok(*only),
            _ => Err(EngineError::ambiguous_target(name)),
        }
    }
}

/// Parses a path expression into steps.
///
/// Accepts slash- or dot-separated forms; separators inside bracket
/// predicates and quoted strings do not split.
fn parse_path(expr: &str) -> Result<Vec<PathStep>, EngineError> {
    let trimmed = expr.trim();
    if trimmed.is_empty() || trimmed == "/" {
        return Ok(Vec::new());
    }
    let separator = if trimmed.contains('/') { '/' } else { '.' };
    let body = trimmed.strip_prefix('/').unwrap_or(trimmed);

    let mut segments = Vec::new();
    let mut current = String::new();
    let mut in_brackets = false;
    let mut quote: Option<char> = None;
    for ch in body.chars() {
        match quote {
            Some(open) => {
                current.push(ch);
                if ch == open {
                    quote = None;
                }
            }
            None => match ch {
                '\'' | '"' if in_brackets => {
                    current.push(ch);
                    quote = Some(ch);
                }
                '[' => {
                    in_brackets = true;
                    current.push(ch);
                }
                ']' => {
                    in_brackets = false;
                    current.push(ch);
                }
                _ if ch == separator && !in_brackets => {
                    segments.push(std::mem::take(&mut current));
                }
                _ => current.push(ch),
            },
        }
    }
    if quote.is_some() || in_brackets {
        return Err(EngineError::path_syntax(expr, "unterminated predicate"));
    }
    segments.push(current);

    segments
        .into_iter()
        .map(|segment| parse_segment(&segment, expr))
        .collect()
}

fn parse_segment(raw: &str, expr: &str) -> Result<PathStep, EngineError> {
    let raw = raw.trim();
    let bracket = raw.find('[').unwrap_or(raw.len());
    let name = raw[..bracket].trim();
    if name.is_empty() {
        return Err(EngineError::path_syntax(expr, "empty path step"));
    }
    let mut predicates = Vec::new();
    let mut rest = &raw[bracket..];
    while !rest.is_empty() {
        let Some(stripped) = rest.strip_prefix('[') else {
            return Err(EngineError::path_syntax(expr, "expected '['"));
        };
        let close = stripped
            .find(']')
            .ok_or_else(|| EngineError::path_syntax(expr, "unterminated predicate"))?;
        let inner = &stripped[..close];
        let (key, value) = inner
            .split_once('=')
            .ok_or_else(|| EngineError::path_syntax(expr, "predicate lacks '='"))?;
        let key = key.trim();
        let value = value.trim();
        let unquoted = value
            .strip_prefix('\'')
            .and_then(|v| v.strip_suffix('\''))
            .or_else(|| value.strip_prefix('"').and_then(|v| v.strip_suffix('"')))
            .ok_or_else(|| EngineError::path_syntax(expr, "predicate value must be quoted"))?;
        if key.is_empty() {
            return Err(EngineError::path_syntax(expr, "predicate key is empty"));
        }
        predicates.push((key.to_owned(), unquoted.to_owned()));
        rest = &stripped[close + 1..];
    }
    Ok(PathStep {
        name: name.to_owned(),
        predicates,
    })
}
