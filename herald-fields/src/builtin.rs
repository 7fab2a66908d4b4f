//! Built-in fields that apply across object domains.

use std::sync::Arc;

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use sha2::{Digest, Sha256};

use crate::condition::Condition;
use crate::error::{FieldError, Result};
use crate::field::{CustomFieldSpec, EvalContext, FieldMap, HeraldField, HeraldObject};
use crate::standard_type::StandardType;
use crate::value::{FieldValue, LookupSource};

/// Every built-in field, in registration order.
pub(crate) static BUILTIN_FIELDS: &[fn() -> Arc<dyn HeraldField>] = &[
    builtin::<NewObjectField>,
    builtin::<ActingUserField>,
    builtin::<SubscribersField>,
    builtin::<ProjectsField>,
    builtin::<SpaceField>,
    builtin::<ContentSourceField>,
    builtin::<CustomFieldFamily>,
];

fn builtin<F: HeraldField + Default + 'static>() -> Arc<dyn HeraldField> {
    Arc::new(F::default())
}

/// True when the edit creates the object.
#[derive(Debug, Default)]
pub struct NewObjectField;

impl HeraldField for NewObjectField {
    fn name(&self) -> &str {
        "Is newly created"
    }

    fn constant(&self) -> &str {
        "herald.new-object"
    }

    fn standard_type(&self) -> Result<StandardType> {
        Ok(StandardType::Bool)
    }

    fn supports_object(&self, _object: &dyn HeraldObject) -> bool {
        true
    }

    fn extract_value(&self, _object: &dyn HeraldObject, ctx: &EvalContext<'_>) -> Result<FieldValue> {
        Ok(ctx.is_new_object.into())
    }
}

/// The user whose edit triggered evaluation.
#[derive(Debug, Default)]
pub struct ActingUserField;

impl HeraldField for ActingUserField {
    fn name(&self) -> &str {
        "Acting user"
    }

    fn constant(&self) -> &str {
        "herald.acting-user"
    }

    fn standard_type(&self) -> Result<StandardType> {
        Ok(StandardType::Phid)
    }

    fn lookup_source(&self) -> Result<LookupSource> {
        Ok(LookupSource::new("users"))
    }

    fn supports_object(&self, _object: &dyn HeraldObject) -> bool {
        true
    }

    fn extract_value(&self, _object: &dyn HeraldObject, ctx: &EvalContext<'_>) -> Result<FieldValue> {
        Ok(ctx.acting_user.map(str::to_string).into())
    }
}

#[derive(Debug, Default)]
pub struct SubscribersField;

impl HeraldField for SubscribersField {
    fn name(&self) -> &str {
        "Subscribers"
    }

    fn constant(&self) -> &str {
        "cc"
    }

    fn standard_type(&self) -> Result<StandardType> {
        Ok(StandardType::PhidList)
    }

    fn lookup_source(&self) -> Result<LookupSource> {
        Ok(LookupSource::new("users").with_parameter("include", "projects"))
    }

    fn supports_object(&self, object: &dyn HeraldObject) -> bool {
        object.subscriber_phids().is_some()
    }

    fn extract_value(&self, object: &dyn HeraldObject, _ctx: &EvalContext<'_>) -> Result<FieldValue> {
        Ok(FieldValue::PhidList(
            object.subscriber_phids().unwrap_or_default().to_vec(),
        ))
    }
}

#[derive(Debug, Default)]
pub struct ProjectsField;

impl HeraldField for ProjectsField {
    fn name(&self) -> &str {
        "Project tags"
    }

    fn constant(&self) -> &str {
        "projects"
    }

    fn standard_type(&self) -> Result<StandardType> {
        Ok(StandardType::PhidList)
    }

    fn lookup_source(&self) -> Result<LookupSource> {
        Ok(LookupSource::new("projects"))
    }

    fn supports_object(&self, object: &dyn HeraldObject) -> bool {
        object.project_phids().is_some()
    }

    fn extract_value(&self, object: &dyn HeraldObject, _ctx: &EvalContext<'_>) -> Result<FieldValue> {
        Ok(FieldValue::PhidList(
            object.project_phids().unwrap_or_default().to_vec(),
        ))
    }
}

#[derive(Debug, Default)]
pub struct SpaceField;

impl HeraldField for SpaceField {
    fn name(&self) -> &str {
        "Space"
    }

    fn constant(&self) -> &str {
        "space"
    }

    fn standard_type(&self) -> Result<StandardType> {
        Ok(StandardType::PhidNullable)
    }

    fn lookup_source(&self) -> Result<LookupSource> {
        Ok(LookupSource::new("spaces"))
    }

    fn supports_object(&self, object: &dyn HeraldObject) -> bool {
        object.supports_spaces()
    }

    fn extract_value(&self, object: &dyn HeraldObject, _ctx: &EvalContext<'_>) -> Result<FieldValue> {
        Ok(object.space_phid().map(str::to_string).into())
    }
}

/// Where the edit came from. Predates standard types, so it declares its
/// conditions directly and renders through the legacy path.
#[derive(Debug, Default)]
pub struct ContentSourceField;

impl HeraldField for ContentSourceField {
    fn name(&self) -> &str {
        "Content source"
    }

    fn constant(&self) -> &str {
        "contentsource"
    }

    fn conditions(&self) -> Result<&'static [Condition]> {
        Ok(&[Condition::Is, Condition::IsNot])
    }

    fn supports_object(&self, _object: &dyn HeraldObject) -> bool {
        true
    }

    fn extract_value(&self, _object: &dyn HeraldObject, ctx: &EvalContext<'_>) -> Result<FieldValue> {
        Ok(ctx
            .content_source
            .map_or(FieldValue::Null, |source| FieldValue::Text(source.to_string())))
    }
}

const CUSTOM_FIELD_PREFIX: &str = "herald.custom/";

/// Constant for the custom field `key`: a short digest keeps arbitrary keys
/// inside the byte limit.
pub fn custom_field_constant(key: &str) -> String {
    let digest = URL_SAFE_NO_PAD.encode(Sha256::digest(key.as_bytes()));
    format!("{}{}", CUSTOM_FIELD_PREFIX, &digest[..12])
}

/// Expands into one field per custom field the object declares.
#[derive(Debug, Default)]
pub struct CustomFieldFamily;

impl HeraldField for CustomFieldFamily {
    fn name(&self) -> &str {
        "Custom fields"
    }

    fn constant(&self) -> &str {
        "herald.custom"
    }

    fn supports_object(&self, object: &dyn HeraldObject) -> bool {
        !object.custom_fields().is_empty()
    }

    fn extract_value(&self, _object: &dyn HeraldObject, _ctx: &EvalContext<'_>) -> Result<FieldValue> {
        Err(FieldError::not_implemented(self.constant(), "extract_value"))
    }

    fn fields_for_object(self: Arc<Self>, object: &dyn HeraldObject) -> Result<FieldMap> {
        let mut map = FieldMap::new();
        for spec in object.custom_fields() {
            let field = CustomField::from_spec(spec)?;
            if let Some(existing) = map.get(&field.constant) {
                return Err(FieldError::DuplicateFieldConstant {
                    constant: field.constant,
                    existing: existing.name().to_string(),
                    duplicate: field.name,
                });
            }
            map.insert(field.constant.clone(), Arc::new(field) as Arc<dyn HeraldField>);
        }
        Ok(map)
    }
}

/// A single expanded custom field.
#[derive(Debug)]
pub struct CustomField {
    constant: String,
    key: String,
    name: String,
    standard_type: StandardType,
    lookup_source: Option<LookupSource>,
}

impl CustomField {
    pub fn from_spec(spec: &CustomFieldSpec) -> Result<Self> {
        let constant = custom_field_constant(&spec.key);
        let standard_type = StandardType::parse_for(&constant, &spec.standard_type)?;
        Ok(Self {
            constant,
            key: spec.key.clone(),
            name: spec.name.clone(),
            standard_type,
            lookup_source: spec.lookup_source.clone(),
        })
    }

    pub fn key(&self) -> &str {
        &self.key
    }
}

impl HeraldField for CustomField {
    fn name(&self) -> &str {
        &self.name
    }

    fn constant(&self) -> &str {
        &self.constant
    }

    fn standard_type(&self) -> Result<StandardType> {
        Ok(self.standard_type)
    }

    fn lookup_source(&self) -> Result<LookupSource> {
        self.lookup_source
            .clone()
            .ok_or_else(|| FieldError::not_implemented(&self.constant, "lookup_source"))
    }

    fn supports_object(&self, object: &dyn HeraldObject) -> bool {
        object.custom_fields().iter().any(|spec| spec.key == self.key)
    }

    fn extract_value(&self, object: &dyn HeraldObject, _ctx: &EvalContext<'_>) -> Result<FieldValue> {
        Ok(object.custom_field_value(&self.key).unwrap_or(FieldValue::Null))
    }
}
