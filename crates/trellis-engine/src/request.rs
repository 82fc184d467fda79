//! The assembled request body handed to the session layer.

use serde_json::{json, Map, Value as Json};
use strum::Display;

use trellis_config::{Datastore, ErrorOption, TestOption};
use trellis_value::{EditOperation, ValueNode};

/// The protocol operation a request performs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "kebab-case")]
pub enum RequestVerb {
    /// Write configuration data.
    EditConfig,
    /// Read configuration and state data.
    Get,
    /// Read configuration data from a named datastore.
    GetConfig,
    /// Tear the session down.
    CloseSession,
}

/// The payload of a request body.
///
/// A read carries exactly one of a structural filter or a select string;
/// the variants make carrying both unrepresentable.
#[derive(Debug)]
pub enum RequestPayload {
    /// Edit content beneath a config container.
    Config(ValueNode),
    /// Structural read filter.
    SubtreeFilter(ValueNode),
    /// Expression read filter.
    XpathFilter(String),
    /// No payload (close-session, unfiltered read).
    Empty,
}

/// A fully-assembled protocol request.
///
/// Ownership of the content subtree transfers in at assembly and out to
/// the transport encoder at send time; an abandoned body releases its
/// tree on drop.
#[derive(Debug)]
pub struct RequestBody {
    pub(crate) verb: RequestVerb,
    pub(crate) target: Option<Datastore>,
    pub(crate) source: Option<Datastore>,
    pub(crate) default_operation: Option<EditOperation>,
    pub(crate) test_option: Option<TestOption>,
    pub(crate) error_option: Option<ErrorOption>,
    pub(crate) with_defaults: bool,
    pub(crate) payload: RequestPayload,
}

impl RequestBody {
    /// The operation verb.
    #[must_use]
    pub const fn verb(&self) -> RequestVerb {
        self.verb
    }

    /// The edit target datastore, for writes.
    #[must_use]
    pub const fn target(&self) -> Option<Datastore> {
        self.target
    }

    /// The read source datastore, when named.
    #[must_use]
    pub const fn source(&self) -> Option<Datastore> {
        self.source
    }

    /// The default-operation attribute, when it differs from the
    /// protocol default.
    #[must_use]
    pub const fn default_operation(&self) -> Option<EditOperation> {
        self.default_operation
    }

    /// The test-option attribute, when non-default.
    #[must_use]
    pub const fn test_option(&self) -> Option<TestOption> {
        self.test_option
    }

    /// The error-option attribute, when non-default.
    #[must_use]
    pub const fn error_option(&self) -> Option<ErrorOption> {
        self.error_option
    }

    /// Whether default-value reporting was requested.
    #[must_use]
    pub const fn with_defaults(&self) -> bool {
        self.with_defaults
    }

    /// The request payload.
    #[must_use]
    pub const fn payload(&self) -> &RequestPayload {
        &self.payload
    }

    /// Whether this request tears the session down.
    #[must_use]
    pub const fn is_close_session(&self) -> bool {
        matches!(self.verb, RequestVerb::CloseSession)
    }

    /// Renders the body as JSON for diagnostics and logging.
    #[must_use]
    pub fn to_json(&self) -> Json {
        let mut object = Map::new();
        object.insert("operation".into(), json!(self.verb.to_string()));
        if let Some(target) = self.target {
            object.insert("target".into(), json!(target.to_string()));
        }
        if let Some(source) = self.source {
            object.insert("source".into(), json!(source.to_string()));
        }
        if let Some(op) = self.default_operation {
            object.insert("default-operation".into(), json!(op.to_string()));
        }
        if let Some(test) = self.test_option {
            object.insert("test-option".into(), json!(test.to_string()));
        }
        if let Some(error) = self.error_option {
            object.insert("error-option".into(), json!(error.to_string()));
        }
        if self.with_defaults {
            object.insert("with-defaults".into(), json!(true));
        }
        match &self.payload {
            RequestPayload::Config(root) => {
                object.insert("config".into(), root.to_json());
            }
            RequestPayload::SubtreeFilter(root) => {
                object.insert("filter-type".into(), json!("subtree"));
                object.insert("filter".into(), root.to_json());
            }
            RequestPayload::XpathFilter(select) => {
                object.insert("filter-type".into(), json!("xpath"));
                object.insert("select".into(), json!(select));
            }
            RequestPayload::Empty => {}
        }
        Json::Object(object)
    }
}
