//! Leaf value typing and validation.

use serde::{Deserialize, Serialize};

use crate::error::SchemaError;

/// The value type of a leaf or leaf-list node.
///
/// This is the subset of typing the request engine needs to validate user
/// input before it is committed into a value tree. Richer constraints
/// (ranges, patterns, unions) belong to the schema compiler and are applied
/// server-side.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", tag = "base", content = "detail")]
pub enum LeafType {
    /// Free-form UTF-8 text.
    String,
    /// Signed 32-bit integer.
    Int32,
    /// Unsigned 32-bit integer.
    Uint32,
    /// `true` or `false`.
    Boolean,
    /// Presence-only leaf; carries no value.
    Empty,
    /// One of a closed set of named values.
    Enumeration(Vec<String>),
    /// A reference to a named identity, optionally prefix-qualified.
    IdentityRef,
}

impl LeafType {
    /// Validates a textual value against this type.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError::InvalidValue`] describing why the text does
    /// not conform.
    pub fn validate(&self, text: &str) -> Result<(), SchemaError> {
        match self {
            Self::String => Ok(()),
            Self::Int32 => text
                .parse::<i32>()
                .map(|_| ())
                .map_err(|_| SchemaError::invalid_value(text, "not a 32-bit signed integer")),
            Self::Uint32 => text
                .parse::<u32>()
                .map(|_| ())
                .map_err(|_| SchemaError::invalid_value(text, "not a 32-bit unsigned integer")),
            Self::Boolean => match text {
                "true" | "false" => Ok(()),
                _ => Err(SchemaError::invalid_value(text, "expected 'true' or 'false'")),
            },
            Self::Empty => {
                if text.is_empty() {
                    Ok(())
                } else {
                    Err(SchemaError::invalid_value(text, "empty leaf takes no value"))
                }
            }
            Self::Enumeration(names) => {
                if names.iter().any(|name| name == text) {
                    Ok(())
                } else {
                    Err(SchemaError::invalid_value(
                        text,
                        format!("not one of: {}", names.join(", ")),
                    ))
                }
            }
            Self::IdentityRef => {
                let local = text.rsplit(':').next().unwrap_or_default();
                if local.is_empty() {
                    Err(SchemaError::invalid_value(text, "identity name is empty"))
                } else {
                    Ok(())
                }
            }
        }
    }

    /// Returns a short human-readable description of this type, used by
    /// interactive help.
    #[must_use]
    pub fn describe(&self) -> String {
        match self {
            Self::String => "string".into(),
            Self::Int32 => "int32".into(),
            Self::Uint32 => "uint32".into(),
            Self::Boolean => "boolean (true/false)".into(),
            Self::Empty => "empty (presence only)".into(),
            Self::Enumeration(names) => format!("enumeration {{ {} }}", names.join(" | ")),
            Self::IdentityRef => "identityref".into(),
        }
    }
}
