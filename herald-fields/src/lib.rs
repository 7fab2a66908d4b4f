//! Field classification and condition-compatibility engine for Herald rules
//!
//! `herald-fields` decides, for every inspectable field, which conditions a
//! rule may apply to it and what shape of value each condition takes. It knows
//! nothing about how rules are stored or executed; adapters register fields
//! and the rule engine consumes them.
//!
//! # Architecture
//!
//! - **Closed vocabularies**: `Condition` and `StandardType` with stable ids
//! - **Pure classification**: `classify` maps type → conditions → value shape
//! - **Stateless fields**: `HeraldField` singletons take their context per call
//! - **Checked registry**: `FieldRegistry` enforces unique, bounded constants
//!   and is built once per process
//! - **Rendering**: stored values → display strings and editor maps, with
//!   label resolution delegated to a `HandleResolver`

pub mod builtin;
pub mod catalog;
pub mod classify;
pub mod condition;
pub mod error;
pub mod field;
pub mod registry;
pub mod render;
pub mod standard_type;
pub mod value;

pub use builtin::{custom_field_constant, CustomField, CustomFieldFamily};
pub use catalog::{ConditionSpec, FieldSpec};
pub use classify::{conditions_for, conditions_for_tag, value_shape_for, value_shape_for_tag};
pub use condition::Condition;
pub use error::{FieldError, Result};
pub use field::{CustomFieldSpec, EvalContext, FieldMap, HeraldField, HeraldObject};
pub use registry::{FieldRegistry, FieldRegistryBuilder, FIELD_CONSTANT_BYTE_LIMIT};
pub use render::{
    editor_value, phid_type, render_condition_value, HandleResolver, IdentifierNamespace,
    PhidNamespace, RenderContext,
};
pub use standard_type::StandardType;
pub use value::{FieldValue, LookupSource, ValueShape};
