//! Serializable snapshot of the registry for rule editors.

use serde::{Deserialize, Serialize};

use crate::condition::Condition;
use crate::error::Result;
use crate::field::HeraldField;
use crate::registry::FieldRegistry;
use crate::standard_type::StandardType;
use crate::value::ValueShape;

/// One condition a field accepts and the value it expects.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ConditionSpec {
    pub condition: Condition,
    pub label: String,
    /// `None` for legacy fields, which render without a shape.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<ValueShape>,
}

/// Editor-facing description of a single field.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FieldSpec {
    pub constant: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub standard_type: Option<StandardType>,
    #[serde(default)]
    pub conditions: Vec<ConditionSpec>,
}

impl FieldSpec {
    pub fn from_field(field: &dyn HeraldField) -> Result<Self> {
        let standard_type = match field.standard_type() {
            Ok(standard_type) => Some(standard_type),
            Err(e) if e.is_not_implemented() => None,
            Err(e) => return Err(e),
        };

        let conditions: &[Condition] = match field.conditions() {
            Ok(conditions) => conditions,
            Err(e) if e.is_not_implemented() => &[],
            Err(e) => return Err(e),
        };

        let conditions = conditions
            .iter()
            .map(|&condition| -> Result<ConditionSpec> {
                let value = match standard_type {
                    Some(_) => Some(field.value_shape(condition)?),
                    None => None,
                };
                Ok(ConditionSpec {
                    condition,
                    label: condition.label().to_string(),
                    value,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            constant: field.constant().to_string(),
            name: field.name().to_string(),
            standard_type,
            conditions,
        })
    }
}

impl FieldRegistry {
    /// Describe every registered field.
    pub fn catalog(&self) -> Result<Vec<FieldSpec>> {
        self.all_fields()
            .values()
            .map(|field| FieldSpec::from_field(field.as_ref()))
            .collect()
    }

    /// The catalog as YAML.
    pub fn catalog_yaml(&self) -> Result<String> {
        Ok(serde_yaml_ng::to_string(&self.catalog()?)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builtin::{ContentSourceField, CustomFieldFamily, SpaceField};
    use crate::value::LookupSource;

    #[test]
    fn typed_field_spec_carries_shapes() {
        let spec = FieldSpec::from_field(&SpaceField).unwrap();
        assert_eq!(spec.constant, "space");
        assert_eq!(spec.standard_type, Some(StandardType::PhidNullable));
        assert_eq!(spec.conditions.len(), 4);
        assert_eq!(
            spec.conditions[0].value,
            Some(ValueShape::TokenizedReference {
                lookup_source: LookupSource::new("spaces")
            })
        );
        assert_eq!(spec.conditions[2].condition, Condition::Exists);
        assert_eq!(spec.conditions[2].value, Some(ValueShape::Empty));
    }

    #[test]
    fn legacy_field_spec_has_no_shapes() {
        let spec = FieldSpec::from_field(&ContentSourceField).unwrap();
        assert_eq!(spec.standard_type, None);
        assert_eq!(spec.conditions.len(), 2);
        assert!(spec.conditions.iter().all(|c| c.value.is_none()));
    }

    #[test]
    fn family_without_conditions_is_listed_empty() {
        let spec = FieldSpec::from_field(&CustomFieldFamily).unwrap();
        assert!(spec.conditions.is_empty());
    }

    #[test]
    fn catalog_yaml_uses_stable_ids() {
        let registry = FieldRegistry::builder()
            .register(SpaceField)
            .build()
            .unwrap();
        let yaml = registry.catalog_yaml().unwrap();
        assert!(yaml.contains("constant: space"));
        assert!(yaml.contains("standard.phid.nullable"));
        assert!(yaml.contains("'!exists'") || yaml.contains("\"!exists\""));
        assert!(yaml.contains("kind: tokenizer"));
    }
}
