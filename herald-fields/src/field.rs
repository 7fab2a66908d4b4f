//! The contract every Herald field implements.
//!
//! Field definitions are process-wide singletons shared across concurrent
//! evaluations, so they carry no per-evaluation state. The subject object and
//! the `EvalContext` are passed to each call instead.

use std::sync::Arc;

use indexmap::IndexMap;
use serde_json::Value;

use crate::classify::{conditions_for, value_shape_for};
use crate::condition::Condition;
use crate::error::{FieldError, Result};
use crate::render::{self, RenderContext};
use crate::standard_type::StandardType;
use crate::value::{FieldValue, LookupSource, ValueShape};

/// Fields keyed by constant, in registration order.
pub type FieldMap = IndexMap<String, Arc<dyn HeraldField>>;

/// A custom field an object declares. Expanded by the custom field family.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CustomFieldSpec {
    pub key: String,
    pub name: String,
    /// Raw standard type tag, e.g. `standard.text`.
    pub standard_type: String,
    pub lookup_source: Option<LookupSource>,
}

/// A subject object a rule is evaluated against.
///
/// Capabilities default to "unsupported"; adapters override the ones their
/// object domain provides.
pub trait HeraldObject: Send + Sync {
    fn phid(&self) -> &str;

    /// `None` when the object cannot have subscribers.
    fn subscriber_phids(&self) -> Option<&[String]> {
        None
    }

    /// `None` when the object cannot be tagged with projects.
    fn project_phids(&self) -> Option<&[String]> {
        None
    }

    fn supports_spaces(&self) -> bool {
        false
    }

    fn space_phid(&self) -> Option<&str> {
        None
    }

    fn custom_fields(&self) -> &[CustomFieldSpec] {
        &[]
    }

    fn custom_field_value(&self, _key: &str) -> Option<FieldValue> {
        None
    }
}

/// Per-evaluation context, threaded explicitly through `extract_value`.
#[derive(Debug, Clone, Copy, Default)]
pub struct EvalContext<'a> {
    /// the object is being created by this edit
    pub is_new_object: bool,
    /// where the edit came from (web, email, conduit, ...)
    pub content_source: Option<&'a str>,
    /// user performing the edit
    pub acting_user: Option<&'a str>,
}

impl<'a> EvalContext<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_new_object(mut self, is_new_object: bool) -> Self {
        self.is_new_object = is_new_object;
        self
    }

    pub fn with_content_source(mut self, source: Option<&'a str>) -> Self {
        self.content_source = source;
        self
    }

    pub fn with_acting_user(mut self, user: Option<&'a str>) -> Self {
        self.acting_user = user;
        self
    }
}

/// Upcast helper so default methods can hand out `Arc<dyn HeraldField>`.
pub trait AsHeraldField {
    fn into_field(self: Arc<Self>) -> Arc<dyn HeraldField>;
}

impl<T: HeraldField + 'static> AsHeraldField for T {
    fn into_field(self: Arc<Self>) -> Arc<dyn HeraldField> {
        self
    }
}

/// A named, inspectable field that rules can test.
pub trait HeraldField: AsHeraldField + Send + Sync {
    /// Human-readable label.
    fn name(&self) -> &str;

    /// Unique machine identifier, at most `FIELD_CONSTANT_BYTE_LIMIT` bytes.
    fn constant(&self) -> &str;

    fn standard_type(&self) -> Result<StandardType> {
        Err(FieldError::not_implemented(self.constant(), "standard_type"))
    }

    fn lookup_source(&self) -> Result<LookupSource> {
        Err(FieldError::not_implemented(self.constant(), "lookup_source"))
    }

    /// Can this field apply to `object`?
    fn supports_object(&self, object: &dyn HeraldObject) -> bool;

    /// Read the field's current value off `object`.
    fn extract_value(&self, object: &dyn HeraldObject, ctx: &EvalContext<'_>) -> Result<FieldValue>;

    /// The concrete fields this definition contributes for `object`.
    ///
    /// Families that expand into several sub-fields override this and must
    /// give each sub-field a distinct constant.
    fn fields_for_object(self: Arc<Self>, _object: &dyn HeraldObject) -> Result<FieldMap> {
        let mut map = FieldMap::new();
        map.insert(self.constant().to_string(), self.into_field());
        Ok(map)
    }

    fn conditions(&self) -> Result<&'static [Condition]> {
        Ok(conditions_for(self.standard_type()?))
    }

    fn value_shape(&self, condition: Condition) -> Result<ValueShape> {
        value_shape_for(self.standard_type()?, condition, || self.lookup_source())
    }

    fn render_condition_value(
        &self,
        condition: Condition,
        value: &Value,
        ctx: &RenderContext<'_>,
    ) -> Result<String> {
        render::render_condition_value(self, condition, value, ctx)
    }
}

impl std::fmt::Debug for dyn HeraldField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HeraldField")
            .field("constant", &self.constant())
            .field("name", &self.name())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Ticket;

    impl HeraldObject for Ticket {
        fn phid(&self) -> &str {
            "PHID-TASK-1"
        }
    }

    struct OwnerField;

    impl HeraldField for OwnerField {
        fn name(&self) -> &str {
            "Owner"
        }

        fn constant(&self) -> &str {
            "test.owner"
        }

        fn standard_type(&self) -> Result<StandardType> {
            Ok(StandardType::PhidNullable)
        }

        fn lookup_source(&self) -> Result<LookupSource> {
            Ok(LookupSource::new("users"))
        }

        fn supports_object(&self, _object: &dyn HeraldObject) -> bool {
            true
        }

        fn extract_value(
            &self,
            _object: &dyn HeraldObject,
            ctx: &EvalContext<'_>,
        ) -> Result<FieldValue> {
            Ok(ctx.acting_user.map(str::to_string).into())
        }
    }

    struct UntypedField;

    impl HeraldField for UntypedField {
        fn name(&self) -> &str {
            "Untyped"
        }

        fn constant(&self) -> &str {
            "test.untyped"
        }

        fn supports_object(&self, _object: &dyn HeraldObject) -> bool {
            false
        }

        fn extract_value(
            &self,
            _object: &dyn HeraldObject,
            _ctx: &EvalContext<'_>,
        ) -> Result<FieldValue> {
            Ok(FieldValue::Null)
        }
    }

    #[test]
    fn derived_operations_use_standard_type() {
        let field = OwnerField;
        assert_eq!(
            field.conditions().unwrap(),
            &[
                Condition::IsAny,
                Condition::IsNotAny,
                Condition::Exists,
                Condition::NotExists
            ]
        );
        assert_eq!(
            field.value_shape(Condition::IsAny).unwrap().lookup_source(),
            Some(&LookupSource::new("users"))
        );
        assert!(field.value_shape(Condition::Exists).unwrap().is_empty());
    }

    #[test]
    fn missing_standard_type_is_not_implemented() {
        let field = UntypedField;
        let err = field.conditions().unwrap_err();
        assert!(matches!(
            err,
            FieldError::NotImplemented { ref field, method: "standard_type" } if field == "test.untyped"
        ));
        assert!(field.value_shape(Condition::Is).unwrap_err().is_not_implemented());
        assert!(field.lookup_source().unwrap_err().is_not_implemented());
    }

    #[test]
    fn default_fields_for_object_is_self() {
        let field: Arc<dyn HeraldField> = Arc::new(OwnerField);
        let map = Arc::clone(&field).fields_for_object(&Ticket).unwrap();
        assert_eq!(map.len(), 1);
        assert!(Arc::ptr_eq(&map["test.owner"], &field));
    }

    #[test]
    fn context_is_explicit_per_call() {
        let field = OwnerField;
        let alice = EvalContext::new().with_acting_user(Some("PHID-USER-alice"));
        let nobody = EvalContext::new();

        assert_eq!(
            field.extract_value(&Ticket, &alice).unwrap(),
            FieldValue::Phid("PHID-USER-alice".into())
        );
        assert_eq!(field.extract_value(&Ticket, &nobody).unwrap(), FieldValue::Null);
    }
}
