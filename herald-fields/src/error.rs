//! Error types for the field registry and classification engine

use thiserror::Error;

/// Result type for field operations
pub type Result<T> = std::result::Result<T, FieldError>;

/// Errors raised while defining, classifying, or registering fields.
///
/// Every variant except `Yaml` is a definition-time defect. Callers propagate
/// these with `?`; they are never downgraded to warnings.
#[derive(Debug, Error)]
pub enum FieldError {
    /// A standard type tag outside the closed set reached the engine
    #[error("{}", unknown_standard_type_message(.field, .standard_type))]
    UnknownStandardType {
        field: String,
        standard_type: String,
    },

    /// A field omitted an override that a derived operation needed
    #[error("herald field \"{field}\" does not implement {method}()")]
    NotImplemented { field: String, method: &'static str },

    /// Constant is empty or exceeds the byte limit
    #[error("herald field \"{field}\" has an invalid constant \"{constant}\": {reason}")]
    InvalidFieldConstant {
        field: String,
        constant: String,
        reason: String,
    },

    /// Two fields share a constant
    #[error("fields \"{existing}\" and \"{duplicate}\" share the same constant \"{constant}\"")]
    DuplicateFieldConstant {
        constant: String,
        existing: String,
        duplicate: String,
    },

    /// `FieldRegistry::install` was called after the global registry was built
    #[error("the global field registry is already initialized")]
    RegistryAlreadyInitialized,

    /// YAML serialization error
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml_ng::Error),
}

impl FieldError {
    pub(crate) fn not_implemented(field: &str, method: &'static str) -> Self {
        FieldError::NotImplemented {
            field: field.to_string(),
            method,
        }
    }

    /// Attach the identity of the field that triggered an unknown type.
    pub fn for_field(self, field: &str) -> Self {
        match self {
            FieldError::UnknownStandardType { standard_type, .. } => {
                FieldError::UnknownStandardType {
                    field: field.to_string(),
                    standard_type,
                }
            }
            other => other,
        }
    }

    /// Whether this error is a definition defect rather than an I/O failure.
    pub fn is_fatal(&self) -> bool {
        !matches!(self, FieldError::Yaml(_))
    }

    /// True for the `NotImplemented` variant.
    pub fn is_not_implemented(&self) -> bool {
        matches!(self, FieldError::NotImplemented { .. })
    }
}

fn unknown_standard_type_message(field: &str, standard_type: &str) -> String {
    if field.is_empty() {
        format!("unknown standard type \"{standard_type}\"")
    } else {
        format!("herald field \"{field}\" has unknown standard type \"{standard_type}\"")
    }
}
