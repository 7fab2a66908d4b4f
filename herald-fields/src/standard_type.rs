//! Standard types: the value-shape categories a field can declare

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::FieldError;

/// The category describing a field's basic value shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StandardType {
    #[serde(rename = "standard.bool")]
    Bool,
    #[serde(rename = "standard.text")]
    Text,
    #[serde(rename = "standard.text.list")]
    TextList,
    #[serde(rename = "standard.text.map")]
    TextMap,
    #[serde(rename = "standard.phid")]
    Phid,
    #[serde(rename = "standard.phid.list")]
    PhidList,
    #[serde(rename = "standard.phid.bool")]
    PhidBool,
    #[serde(rename = "standard.phid.nullable")]
    PhidNullable,
}

impl StandardType {
    pub const ALL: [StandardType; 8] = [
        StandardType::Bool,
        StandardType::Text,
        StandardType::TextList,
        StandardType::TextMap,
        StandardType::Phid,
        StandardType::PhidList,
        StandardType::PhidBool,
        StandardType::PhidNullable,
    ];

    /// Stable tag, e.g. `standard.phid.list`.
    pub fn id(self) -> &'static str {
        match self {
            StandardType::Bool => "standard.bool",
            StandardType::Text => "standard.text",
            StandardType::TextList => "standard.text.list",
            StandardType::TextMap => "standard.text.map",
            StandardType::Phid => "standard.phid",
            StandardType::PhidList => "standard.phid.list",
            StandardType::PhidBool => "standard.phid.bool",
            StandardType::PhidNullable => "standard.phid.nullable",
        }
    }

    /// Parse a tag declared by `field`, attaching its identity on failure.
    pub fn parse_for(field: &str, tag: &str) -> Result<Self, FieldError> {
        tag.parse::<StandardType>().map_err(|e| e.for_field(field))
    }
}

impl fmt::Display for StandardType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.id())
    }
}

impl std::str::FromStr for StandardType {
    type Err = FieldError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        StandardType::ALL
            .iter()
            .copied()
            .find(|t| t.id() == s)
            .ok_or_else(|| FieldError::UnknownStandardType {
                field: String::new(),
                standard_type: s.to_string(),
            })
    }
}
