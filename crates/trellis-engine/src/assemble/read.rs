//! Read-request assembly.

use tracing::{debug, warn};

use trellis_config::{BadDataPolicy, ClientConfig, Datastore};
use trellis_schema::SchemaRegistry;
use trellis_value::{Attribute, FilterType, ValueNode};

use crate::capability::{Capability, PeerCapabilities};
use crate::content::add_filter_from_content;
use crate::errors::EngineError;
use crate::outcome::Assembly;
use crate::prompt::{PromptLine, PromptSource};
use crate::request::{RequestBody, RequestPayload, RequestVerb};
use crate::resolve::ResolvedTarget;

use super::ASSEMBLE_TARGET;

/// The filter shape of a read request.
///
/// A read uses exactly one of a structural subtree or a select string —
/// the variants make carrying both unrepresentable.
#[derive(Debug)]
pub enum ReadFilter {
    /// A resolver-built ancestor chain used as a subtree filter.
    Resolved(ResolvedTarget),
    /// A bare content node; the containing chain is built here with
    /// partial keys tolerated.
    Content(ValueNode),
    /// An expression filter (requires the xpath capability).
    Select(String),
    /// No filter: read everything.
    All,
}

/// Options governing one read assembly.
#[derive(Debug, Default)]
pub struct ReadOptions {
    /// Read from a named datastore (`get-config`) instead of the
    /// combined view (`get`).
    pub source: Option<Datastore>,
    /// Request default-value reporting (requires the with-defaults
    /// capability).
    pub with_defaults: bool,
}

impl ReadOptions {
    /// Options for a `get-config` read of the given datastore.
    #[must_use]
    pub const fn from_datastore(source: Datastore) -> Self {
        Self {
            source: Some(source),
            with_defaults: false,
        }
    }

    /// Requests default-value reporting.
    #[must_use]
    pub const fn with_defaults(mut self) -> Self {
        self.with_defaults = true;
        self
    }
}

/// Assembles a read request body.
///
/// Capability gaps between the requested options and what the peer
/// advertises are routed through the bad-data policy: ignore and warn
/// proceed, error rejects, ask-user consults the prompt seam (falling
/// back to reject when no prompt is wired in).
///
/// # Errors
///
/// Returns [`EngineError::CapabilityUnsupported`] when the policy rejects
/// a gap, plus any chain-building failure.
pub fn assemble_read_request(
    schema: &SchemaRegistry,
    config: &ClientConfig,
    capabilities: &PeerCapabilities,
    mut prompt: Option<&mut dyn PromptSource>,
    filter: ReadFilter,
    options: ReadOptions,
) -> Result<Assembly<RequestBody>, EngineError> {
    if matches!(filter, ReadFilter::Select(_)) && !capabilities.supports(Capability::XpathFilter) {
        if let Proceed::No = capability_gap(config, prompt.as_deref_mut(), Capability::XpathFilter)?
        {
            return Ok(Assembly::Canceled);
        }
    }
    if options.with_defaults && !capabilities.supports(Capability::WithDefaults) {
        if let Proceed::No =
            capability_gap(config, prompt.as_deref_mut(), Capability::WithDefaults)?
        {
            return Ok(Assembly::Canceled);
        }
    }
    if let Some(gap) = source_capability(options.source) {
        if !capabilities.supports(gap) {
            if let Proceed::No = capability_gap(config, prompt.as_deref_mut(), gap)? {
                return Ok(Assembly::Canceled);
            }
        }
    }

    let payload = match filter {
        ReadFilter::Resolved(resolved) => subtree_payload(resolved.root),
        ReadFilter::Content(content) => {
            match add_filter_from_content(schema, None, content)? {
                Assembly::Done(contained) => subtree_payload(contained.root),
                Assembly::Canceled => return Ok(Assembly::Canceled),
            }
        }
        ReadFilter::Select(select) => RequestPayload::XpathFilter(select),
        ReadFilter::All => RequestPayload::Empty,
    };

    let verb = if options.source.is_some() {
        RequestVerb::GetConfig
    } else {
        RequestVerb::Get
    };
    debug!(target: ASSEMBLE_TARGET, operation = %verb, "assembled read request");

    Ok(Assembly::Done(RequestBody {
        verb,
        target: None,
        source: options.source,
        default_operation: None,
        test_option: None,
        error_option: None,
        with_defaults: options.with_defaults,
        payload,
    }))
}

fn subtree_payload(mut root: ValueNode) -> RequestPayload {
    root.set_attribute(Attribute::FilterType(FilterType::Subtree));
    RequestPayload::SubtreeFilter(root)
}

const fn source_capability(source: Option<Datastore>) -> Option<Capability> {
    match source {
        Some(Datastore::Candidate) => Some(Capability::Candidate),
        Some(Datastore::Startup) => Some(Capability::Startup),
        Some(Datastore::Running) | None => None,
    }
}

/// Whether to proceed past a capability gap.
enum Proceed {
    Yes,
    No,
}

fn capability_gap<'p>(
    config: &ClientConfig,
    prompt: Option<&mut (dyn PromptSource + 'p)>,
    capability: Capability,
) -> Result<Proceed, EngineError> {
    match config.bad_data_policy() {
        BadDataPolicy::Ignore => Ok(Proceed::Yes),
        BadDataPolicy::Warn => {
            warn!(
                target: ASSEMBLE_TARGET,
                %capability,
                "peer does not advertise a required capability; sending anyway"
            );
            Ok(Proceed::Yes)
        }
        BadDataPolicy::Error => Err(EngineError::capability_unsupported(capability.to_string())),
        BadDataPolicy::AskUser => {
            let Some(prompt) = prompt else {
                return Err(EngineError::capability_unsupported(capability.to_string()));
            };
            let text = format!(
                "peer does not advertise '{capability}'; send anyway? (y/n) [n]: "
            );
            match prompt.read_line(&text)? {
                PromptLine::Text(answer) => {
                    match answer.trim().to_ascii_lowercase().as_str() {
                        "y" | "yes" => Ok(Proceed::Yes),
                        _ => Ok(Proceed::No),
                    }
                }
                PromptLine::Cancel | PromptLine::Skip => Ok(Proceed::No),
                PromptLine::HelpBrief | PromptLine::HelpFull => Ok(Proceed::No),
            }
        }
    }
}
