//! FieldRegistry: the process-wide index of field definitions by constant.
//!
//! Fields are registered from an explicit list (the built-in table plus
//! whatever a host adds through the builder). Constants are validated and
//! checked for uniqueness once, at build time; a registry that fails either
//! check is never exposed.

use std::sync::Arc;

use once_cell::sync::OnceCell;
use tracing::debug;

use crate::builtin::BUILTIN_FIELDS;
use crate::error::{FieldError, Result};
use crate::field::{FieldMap, HeraldField, HeraldObject};

/// Maximum length of a field constant, in bytes.
pub const FIELD_CONSTANT_BYTE_LIMIT: usize = 64;

static GLOBAL_REGISTRY: OnceCell<FieldRegistry> = OnceCell::new();

/// Check a constant against the registration rules.
pub fn validate_constant(field: &dyn HeraldField) -> Result<()> {
    let constant = field.constant();
    let reason = if constant.is_empty() {
        "field constants must not be empty".to_string()
    } else if constant.len() > FIELD_CONSTANT_BYTE_LIMIT {
        format!(
            "field constants must be no more than {} bytes in length, got {}",
            FIELD_CONSTANT_BYTE_LIMIT,
            constant.len()
        )
    } else {
        return Ok(());
    };

    Err(FieldError::InvalidFieldConstant {
        field: field.name().to_string(),
        constant: constant.to_string(),
        reason,
    })
}

/// Insert `field` under its constant, refusing collisions.
fn insert_unique(map: &mut FieldMap, field: Arc<dyn HeraldField>) -> Result<()> {
    validate_constant(field.as_ref())?;
    let constant = field.constant().to_string();
    if let Some(existing) = map.get(&constant) {
        return Err(FieldError::DuplicateFieldConstant {
            constant,
            existing: existing.name().to_string(),
            duplicate: field.name().to_string(),
        });
    }
    map.insert(constant, field);
    Ok(())
}

/// Builder for `FieldRegistry`. Created by `FieldRegistry::builder()`.
#[derive(Default)]
pub struct FieldRegistryBuilder {
    fields: Vec<Arc<dyn HeraldField>>,
}

impl FieldRegistryBuilder {
    /// Register one field definition.
    pub fn register<F: HeraldField + 'static>(self, field: F) -> Self {
        self.register_arc(Arc::new(field))
    }

    pub fn register_arc(mut self, field: Arc<dyn HeraldField>) -> Self {
        self.fields.push(field);
        self
    }

    /// Register every built-in field.
    pub fn with_builtins(mut self) -> Self {
        self.fields.extend(BUILTIN_FIELDS.iter().map(|make| make()));
        self
    }

    /// Validate every constant and build the index.
    pub fn build(self) -> Result<FieldRegistry> {
        let mut fields = FieldMap::with_capacity(self.fields.len());
        for field in self.fields {
            insert_unique(&mut fields, field)?;
        }

        debug!(fields = fields.len(), "field registry built");
        Ok(FieldRegistry { fields })
    }
}

/// Immutable index of field definitions keyed by constant.
pub struct FieldRegistry {
    fields: FieldMap,
}

impl FieldRegistry {
    pub fn builder() -> FieldRegistryBuilder {
        FieldRegistryBuilder::default()
    }

    /// The process-wide registry, built from the built-in fields on first use
    /// unless a host installed its own.
    pub fn global() -> Result<&'static Self> {
        GLOBAL_REGISTRY.get_or_try_init(|| Self::builder().with_builtins().build())
    }

    /// Build `builder` and make it the process-wide registry.
    ///
    /// Must run before the first `global()` call.
    pub fn install(builder: FieldRegistryBuilder) -> Result<&'static Self> {
        let mut installed = false;
        let registry = GLOBAL_REGISTRY.get_or_try_init(|| {
            installed = true;
            builder.build()
        })?;
        if installed {
            Ok(registry)
        } else {
            Err(FieldError::RegistryAlreadyInitialized)
        }
    }

    pub fn all_fields(&self) -> &FieldMap {
        &self.fields
    }

    pub fn get(&self, constant: &str) -> Option<&Arc<dyn HeraldField>> {
        self.fields.get(constant)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Every concrete field applicable to `object`, with families expanded.
    ///
    /// Expanded constants obey the same rules as registered ones.
    pub fn fields_for_object(&self, object: &dyn HeraldObject) -> Result<FieldMap> {
        let mut map = FieldMap::new();
        for field in self.fields.values() {
            if !field.supports_object(object) {
                continue;
            }
            for (_, expanded) in Arc::clone(field).fields_for_object(object)? {
                insert_unique(&mut map, expanded)?;
            }
        }

        debug!(object = object.phid(), fields = map.len(), "expanded fields for object");
        Ok(map)
    }
}

impl std::fmt::Debug for FieldRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FieldRegistry")
            .field("fields", &self.fields.keys().collect::<Vec<_>>())
            .finish()
    }
}
