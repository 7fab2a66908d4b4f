//! Value shapes, lookup sources, and extracted field values.
//!
//! A `ValueShape` describes what a condition's input looks like in a rule
//! editor. A `FieldValue` is what a field reads off a subject object at
//! evaluation time.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Opaque reference to an external provider of selectable values.
///
/// The engine passes it through to `ValueShape::TokenizedReference` and never
/// looks inside.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LookupSource {
    pub name: String,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub parameters: BTreeMap<String, String>,
}

impl LookupSource {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            parameters: BTreeMap::new(),
        }
    }

    /// Add a parameter forwarded to the provider.
    pub fn with_parameter(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.parameters.insert(key.into(), value.into());
        self
    }
}

/// The structural form a condition's value must take.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum ValueShape {
    /// No value is collected or stored.
    Empty,
    /// Arbitrary string or structured text.
    #[serde(rename = "text")]
    FreeText,
    /// One or more identifiers picked from a lookup source.
    #[serde(rename = "tokenizer")]
    TokenizedReference { lookup_source: LookupSource },
}

impl ValueShape {
    /// Stable key of the shape's editor control.
    pub fn key(&self) -> &'static str {
        match self {
            ValueShape::Empty => "empty",
            ValueShape::FreeText => "text",
            ValueShape::TokenizedReference { .. } => "tokenizer",
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, ValueShape::Empty)
    }

    pub fn lookup_source(&self) -> Option<&LookupSource> {
        match self {
            ValueShape::TokenizedReference { lookup_source } => Some(lookup_source),
            _ => None,
        }
    }
}

/// A value read off a subject object by `HeraldField::extract_value`.
///
/// Tagged by kind so references stay distinct from text of the same form.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "kind", content = "value", rename_all = "kebab-case")]
pub enum FieldValue {
    Null,
    Bool(bool),
    Text(String),
    TextList(Vec<String>),
    TextMap(BTreeMap<String, String>),
    Phid(String),
    PhidList(Vec<String>),
}

impl FieldValue {
    pub fn is_null(&self) -> bool {
        matches!(self, FieldValue::Null)
    }

    /// Identifiers carried by this value, if it holds references.
    pub fn phids(&self) -> &[String] {
        match self {
            FieldValue::Phid(phid) => std::slice::from_ref(phid),
            FieldValue::PhidList(phids) => phids,
            _ => &[],
        }
    }
}

impl From<bool> for FieldValue {
    fn from(value: bool) -> Self {
        FieldValue::Bool(value)
    }
}

impl From<Option<String>> for FieldValue {
    fn from(value: Option<String>) -> Self {
        value.map_or(FieldValue::Null, FieldValue::Phid)
    }
}
