//! Comparison operators a rule can apply to a field value
//!
//! # Example
//!
//! ```
//! use herald_fields::Condition;
//!
//! assert_eq!(Condition::NotExists.to_string(), "!exists");
//!
//! let parsed: Condition = "isany".parse().unwrap();
//! assert_eq!(parsed, Condition::IsAny);
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;

/// A condition identifier. Opaque, with no payload.
///
/// The serialized form is the stable id stored alongside rules, so the
/// strings below must never change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Condition {
    #[serde(rename = "true")]
    IsTrue,
    #[serde(rename = "false")]
    IsFalse,
    #[serde(rename = "contains")]
    Contains,
    #[serde(rename = "!contains")]
    NotContains,
    #[serde(rename = "is")]
    Is,
    #[serde(rename = "!is")]
    IsNot,
    #[serde(rename = "regexp")]
    Regexp,
    #[serde(rename = "regexp-pair")]
    RegexpPair,
    #[serde(rename = "isany")]
    IsAny,
    #[serde(rename = "!isany")]
    IsNotAny,
    #[serde(rename = "all")]
    IncludeAll,
    #[serde(rename = "any")]
    IncludeAny,
    #[serde(rename = "none")]
    IncludeNone,
    #[serde(rename = "exists")]
    Exists,
    #[serde(rename = "!exists")]
    NotExists,
}

impl Condition {
    /// Every condition, in vocabulary order.
    pub const ALL: [Condition; 15] = [
        Condition::IsTrue,
        Condition::IsFalse,
        Condition::Contains,
        Condition::NotContains,
        Condition::Is,
        Condition::IsNot,
        Condition::Regexp,
        Condition::RegexpPair,
        Condition::IsAny,
        Condition::IsNotAny,
        Condition::IncludeAll,
        Condition::IncludeAny,
        Condition::IncludeNone,
        Condition::Exists,
        Condition::NotExists,
    ];

    /// Stable identifier used in stored rules.
    pub fn id(self) -> &'static str {
        match self {
            Condition::IsTrue => "true",
            Condition::IsFalse => "false",
            Condition::Contains => "contains",
            Condition::NotContains => "!contains",
            Condition::Is => "is",
            Condition::IsNot => "!is",
            Condition::Regexp => "regexp",
            Condition::RegexpPair => "regexp-pair",
            Condition::IsAny => "isany",
            Condition::IsNotAny => "!isany",
            Condition::IncludeAll => "all",
            Condition::IncludeAny => "any",
            Condition::IncludeNone => "none",
            Condition::Exists => "exists",
            Condition::NotExists => "!exists",
        }
    }

    /// Human-readable label for rule editors.
    pub fn label(self) -> &'static str {
        match self {
            Condition::IsTrue => "is true",
            Condition::IsFalse => "is false",
            Condition::Contains => "contains",
            Condition::NotContains => "does not contain",
            Condition::Is => "is",
            Condition::IsNot => "is not",
            Condition::Regexp => "matches regexp",
            Condition::RegexpPair => "matches regexp pair",
            Condition::IsAny => "is any of",
            Condition::IsNotAny => "is not any of",
            Condition::IncludeAll => "include all of",
            Condition::IncludeAny => "include any of",
            Condition::IncludeNone => "do not include",
            Condition::Exists => "exists",
            Condition::NotExists => "does not exist",
        }
    }

    /// Exists / NotExists test presence only and never carry a value.
    pub fn is_existence_test(self) -> bool {
        matches!(self, Condition::Exists | Condition::NotExists)
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.id())
    }
}

impl std::str::FromStr for Condition {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Condition::ALL
            .iter()
            .copied()
            .find(|c| c.id() == s)
            .ok_or_else(|| format!("Invalid condition: {}", s))
    }
}
