//! Fill policy threaded through every engine call.

use trellis_config::BadDataPolicy;
use trellis_schema::ObjectTemplate;

/// The policy parameters governing one top-level fill or assembly.
#[derive(Debug, Clone, Copy)]
pub struct FillPolicy {
    /// Prompt for optional nodes too.
    pub fill_optional: bool,
    /// The operation writes configuration data.
    pub is_write: bool,
    /// The operation deletes data; only keys are ever filled.
    pub is_delete: bool,
    /// Restrict schema navigation to configuration nodes.
    pub require_config: bool,
    /// Response to schema-invalid leaf values.
    pub bad_data: BadDataPolicy,
}

impl FillPolicy {
    /// Policy for building edit content.
    #[must_use]
    pub const fn write() -> Self {
        Self {
            fill_optional: false,
            is_write: true,
            is_delete: false,
            require_config: true,
            bad_data: BadDataPolicy::AskUser,
        }
    }

    /// Policy for building read filters.
    #[must_use]
    pub const fn read() -> Self {
        Self {
            fill_optional: false,
            is_write: false,
            is_delete: false,
            require_config: false,
            bad_data: BadDataPolicy::AskUser,
        }
    }

    /// Policy for building delete requests: key leaves only.
    #[must_use]
    pub const fn delete() -> Self {
        Self {
            fill_optional: false,
            is_write: true,
            is_delete: true,
            require_config: true,
            bad_data: BadDataPolicy::AskUser,
        }
    }

    /// Returns the policy with optional-node prompting set.
    #[must_use]
    pub const fn with_fill_optional(mut self, fill: bool) -> Self {
        self.fill_optional = fill;
        self
    }

    /// Returns the policy with the given bad-data response.
    #[must_use]
    pub const fn with_bad_data(mut self, policy: BadDataPolicy) -> Self {
        self.bad_data = policy;
        self
    }

    /// Whether a fill should populate this node at all.
    ///
    /// Deletes touch only key leaves. Otherwise mandatory and key nodes
    /// are always filled; optional nodes only when the policy asks for
    /// them and the operation writes (read filters never prompt for
    /// optional content).
    #[must_use]
    pub fn should_fill(&self, template: &ObjectTemplate) -> bool {
        if self.is_delete {
            return template.is_key();
        }
        if template.is_mandatory() || template.is_key() {
            return true;
        }
        self.fill_optional && self.is_write
    }

    /// Whether ancestor list keys should be completed interactively.
    #[must_use]
    pub const fn complete_keys(&self) -> bool {
        self.fill_optional || self.is_write
    }
}
