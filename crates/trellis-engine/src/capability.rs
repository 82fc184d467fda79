//! Peer protocol capabilities.
//!
//! The session layer learns what the peer advertises at connect time and
//! hands the set to the assemblers, which route any gap between requested
//! options and advertised support through the bad-data policy.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// A protocol capability the peer may advertise.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum Capability {
    /// Expression-based read filters.
    XpathFilter,
    /// Default-value reporting on reads.
    WithDefaults,
    /// The candidate configuration datastore.
    Candidate,
    /// The startup configuration datastore.
    Startup,
    /// Validate-only edit handling.
    Validate,
    /// Rollback-on-error edit recovery.
    RollbackOnError,
}

/// The set of capabilities a peer advertised.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PeerCapabilities {
    advertised: HashSet<Capability>,
}

impl PeerCapabilities {
    /// An empty set: the peer advertised nothing beyond the base protocol.
    #[must_use]
    pub fn none() -> Self {
        Self::default()
    }

    /// Builds a set from advertised capabilities.
    #[must_use]
    pub fn advertising(capabilities: impl IntoIterator<Item = Capability>) -> Self {
        Self {
            advertised: capabilities.into_iter().collect(),
        }
    }

    /// Records a capability learned from the peer's hello exchange.
    pub fn advertise(&mut self, capability: Capability) {
        self.advertised.insert(capability);
    }

    /// Whether the peer supports a capability.
    #[must_use]
    pub fn supports(&self, capability: Capability) -> bool {
        self.advertised.contains(&capability)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_set_supports_nothing() {
        let caps = PeerCapabilities::none();
        assert!(!caps.supports(Capability::XpathFilter));
    }

    #[test]
    fn advertised_capabilities_are_supported() {
        let caps =
            PeerCapabilities::advertising([Capability::XpathFilter, Capability::Candidate]);
        assert!(caps.supports(Capability::XpathFilter));
        assert!(caps.supports(Capability::Candidate));
        assert!(!caps.supports(Capability::WithDefaults));
    }
}
