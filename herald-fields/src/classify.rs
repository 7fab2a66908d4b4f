//! Classification engine: standard type → legal conditions → value shape.
//!
//! Both mappings are pure. The only non-obvious rule is the existence
//! override: for the reference types (`Phid`, `PhidNullable`, `PhidList`),
//! `Exists` and `NotExists` collapse to `ValueShape::Empty` while every other
//! condition of the same type takes a tokenized reference.

use crate::condition::Condition;
use crate::error::Result;
use crate::standard_type::StandardType;
use crate::value::{LookupSource, ValueShape};

const BOOL_CONDITIONS: &[Condition] = &[Condition::IsTrue, Condition::IsFalse];

const TEXT_CONDITIONS: &[Condition] = &[
    Condition::Contains,
    Condition::NotContains,
    Condition::Is,
    Condition::IsNot,
    Condition::Regexp,
];

const TEXT_LIST_CONDITIONS: &[Condition] = &[Condition::Contains, Condition::Regexp];

const TEXT_MAP_CONDITIONS: &[Condition] =
    &[Condition::Contains, Condition::Regexp, Condition::RegexpPair];

const PHID_CONDITIONS: &[Condition] = &[Condition::IsAny, Condition::IsNotAny];

const PHID_LIST_CONDITIONS: &[Condition] = &[
    Condition::IncludeAll,
    Condition::IncludeAny,
    Condition::IncludeNone,
    Condition::Exists,
    Condition::NotExists,
];

const PHID_BOOL_CONDITIONS: &[Condition] = &[Condition::Exists, Condition::NotExists];

const PHID_NULLABLE_CONDITIONS: &[Condition] = &[
    Condition::IsAny,
    Condition::IsNotAny,
    Condition::Exists,
    Condition::NotExists,
];

/// The conditions a field of `standard_type` accepts, in editor order.
pub fn conditions_for(standard_type: StandardType) -> &'static [Condition] {
    match standard_type {
        StandardType::Bool => BOOL_CONDITIONS,
        StandardType::Text => TEXT_CONDITIONS,
        StandardType::TextList => TEXT_LIST_CONDITIONS,
        StandardType::TextMap => TEXT_MAP_CONDITIONS,
        StandardType::Phid => PHID_CONDITIONS,
        StandardType::PhidList => PHID_LIST_CONDITIONS,
        StandardType::PhidBool => PHID_BOOL_CONDITIONS,
        StandardType::PhidNullable => PHID_NULLABLE_CONDITIONS,
    }
}

/// The value shape for `condition` on a field of `standard_type`.
///
/// `lookup` is only invoked when the result is a tokenized reference, so
/// fields without a lookup source can still be classified for every other
/// shape.
pub fn value_shape_for<F>(
    standard_type: StandardType,
    condition: Condition,
    lookup: F,
) -> Result<ValueShape>
where
    F: FnOnce() -> Result<LookupSource>,
{
    match standard_type {
        StandardType::Bool | StandardType::PhidBool => Ok(ValueShape::Empty),
        StandardType::Text | StandardType::TextList | StandardType::TextMap => {
            Ok(ValueShape::FreeText)
        }
        StandardType::Phid | StandardType::PhidNullable | StandardType::PhidList => {
            if condition.is_existence_test() {
                Ok(ValueShape::Empty)
            } else {
                Ok(ValueShape::TokenizedReference {
                    lookup_source: lookup()?,
                })
            }
        }
    }
}

/// `conditions_for` on a raw standard type tag.
pub fn conditions_for_tag(field: &str, tag: &str) -> Result<&'static [Condition]> {
    Ok(conditions_for(StandardType::parse_for(field, tag)?))
}

/// `value_shape_for` on a raw standard type tag.
pub fn value_shape_for_tag<F>(
    field: &str,
    tag: &str,
    condition: Condition,
    lookup: F,
) -> Result<ValueShape>
where
    F: FnOnce() -> Result<LookupSource>,
{
    value_shape_for(StandardType::parse_for(field, tag)?, condition, lookup)
}
