//! Rendering stored condition values for display and for editing.
//!
//! Identifier → label resolution belongs to an external collaborator
//! (`HandleResolver`). The engine only decides when to ask for it.

use std::collections::HashMap;

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::{Map, Value};
use tracing::{trace, warn};

use crate::condition::Condition;
use crate::error::Result;
use crate::field::HeraldField;
use crate::value::ValueShape;

/// Delimiter between rendered list elements.
pub const LIST_DELIMITER: &str = ", ";

static PHID_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^PHID-([^-]{4})-").expect("PHID pattern is valid"));

/// Resolves opaque identifiers to display labels for one viewer.
pub trait HandleResolver: Send + Sync {
    /// Label for `id`. Unknown objects still get a placeholder label.
    fn resolve_label(&self, id: &str) -> String;

    /// Batch form; implementations backed by storage should override it.
    fn resolve_labels(&self, ids: &[&str]) -> HashMap<String, String> {
        ids.iter()
            .map(|id| (id.to_string(), self.resolve_label(id)))
            .collect()
    }
}

/// Decides which strings are references the resolver understands.
pub trait IdentifierNamespace: Send + Sync {
    fn is_known_reference(&self, value: &str) -> bool;
}

/// The four-character type of a PHID, e.g. `USER` for `PHID-USER-abc`.
pub fn phid_type(value: &str) -> Option<&str> {
    PHID_PATTERN
        .captures(value)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

/// `IdentifierNamespace` recognizing `PHID-XXXX-...` strings.
///
/// With an allow-list only those PHID types count as references.
#[derive(Debug, Clone, Default)]
pub struct PhidNamespace {
    types: Option<Vec<String>>,
}

impl PhidNamespace {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_types<I, S>(types: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            types: Some(types.into_iter().map(Into::into).collect()),
        }
    }
}

impl IdentifierNamespace for PhidNamespace {
    fn is_known_reference(&self, value: &str) -> bool {
        match (phid_type(value), &self.types) {
            (None, _) => false,
            (Some(_), None) => true,
            (Some(kind), Some(types)) => types.iter().any(|t| t == kind),
        }
    }
}

static DEFAULT_NAMESPACE: PhidNamespace = PhidNamespace { types: None };

/// Collaborators used while rendering, bound to one viewer by the caller.
#[derive(Clone, Copy)]
pub struct RenderContext<'a> {
    pub resolver: &'a dyn HandleResolver,
    pub namespace: &'a dyn IdentifierNamespace,
}

impl<'a> RenderContext<'a> {
    /// Context using `PhidNamespace` for reference detection.
    pub fn new(resolver: &'a dyn HandleResolver) -> Self {
        Self {
            resolver,
            namespace: &DEFAULT_NAMESPACE,
        }
    }

    pub fn with_namespace(mut self, namespace: &'a dyn IdentifierNamespace) -> Self {
        self.namespace = namespace;
        self
    }
}

/// Render `value` as stored for `condition` on `field`.
///
/// Fields without a standard type fall back to guessing which list elements
/// are references. That path exists for legacy fields only.
pub fn render_condition_value<F>(
    field: &F,
    condition: Condition,
    value: &Value,
    ctx: &RenderContext<'_>,
) -> Result<String>
where
    F: HeraldField + ?Sized,
{
    match field.value_shape(condition) {
        Ok(shape) => Ok(render_shape(&shape, value, ctx)),
        Err(e)
            if e.is_not_implemented()
                && field
                    .standard_type()
                    .is_err_and(|st| st.is_not_implemented()) =>
        {
            trace!(field = field.constant(), %condition, "rendering legacy condition value");
            Ok(render_legacy(value, ctx))
        }
        Err(e) => Err(e),
    }
}

fn render_shape(shape: &ValueShape, value: &Value, ctx: &RenderContext<'_>) -> String {
    match shape {
        ValueShape::Empty => String::new(),
        ValueShape::FreeText => plain_text(value),
        ValueShape::TokenizedReference { .. } => match value {
            Value::Null => String::new(),
            Value::String(_) => render_list(std::slice::from_ref(value), ctx, |_| true),
            Value::Array(items) => {
                for item in items.iter().filter(|item| !item.is_string()) {
                    warn!(value = %item, "non-identifier element in tokenized condition value");
                }
                render_list(items, ctx, |_| true)
            }
            other => {
                warn!(value = %other, "tokenized condition value is not a list");
                plain_text(other)
            }
        },
    }
}

fn render_legacy(value: &Value, ctx: &RenderContext<'_>) -> String {
    let Value::Array(items) = value else {
        return plain_text(value);
    };
    render_list(items, ctx, |s| ctx.namespace.is_known_reference(s))
}

/// Join `items`, replacing strings accepted by `is_reference` with labels
/// resolved in one batch. Everything else renders as plain text.
fn render_list(
    items: &[Value],
    ctx: &RenderContext<'_>,
    is_reference: impl Fn(&str) -> bool,
) -> String {
    let ids: Vec<&str> = items
        .iter()
        .filter_map(Value::as_str)
        .filter(|s| is_reference(s))
        .collect();
    let labels = if ids.is_empty() {
        HashMap::new()
    } else {
        ctx.resolver.resolve_labels(&ids)
    };

    items
        .iter()
        .map(|item| match item {
            Value::String(s) if is_reference(s) => label_for(&labels, s, ctx.resolver),
            other => plain_text(other),
        })
        .collect::<Vec<_>>()
        .join(LIST_DELIMITER)
}

/// Label from a batch result, asking for `id` alone if the batch missed it.
fn label_for(labels: &HashMap<String, String>, id: &str, resolver: &dyn HandleResolver) -> String {
    labels
        .get(id)
        .cloned()
        .unwrap_or_else(|| resolver.resolve_label(id))
}

fn plain_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Turn a stored list of identifiers into `{identifier: label}` for an editor.
///
/// Anything other than a list passes through unchanged.
pub fn editor_value(raw: &Value, resolver: &dyn HandleResolver) -> Value {
    let Value::Array(items) = raw else {
        return raw.clone();
    };

    let mut ids = Vec::with_capacity(items.len());
    for item in items {
        match item.as_str() {
            Some(id) => ids.push(id),
            None => warn!(value = %item, "skipping non-identifier editor value"),
        }
    }

    let labels = resolver.resolve_labels(&ids);
    let map: Map<String, Value> = ids
        .into_iter()
        .map(|id| (id.to_string(), Value::String(label_for(&labels, id, resolver))))
        .collect();
    Value::Object(map)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FieldError;
    use crate::field::{EvalContext, HeraldObject};
    use crate::standard_type::StandardType;
    use crate::value::{FieldValue, LookupSource};
    use serde_json::json;

    struct Directory;

    impl HandleResolver for Directory {
        fn resolve_label(&self, id: &str) -> String {
            match id {
                "PHID-USER-1" => "Alice".into(),
                "PHID-USER-2" => "Bob".into(),
                other => format!("Unknown Object ({other})"),
            }
        }
    }

    struct TypedField(StandardType);

    impl HeraldField for TypedField {
        fn name(&self) -> &str {
            "Typed"
        }

        fn constant(&self) -> &str {
            "test.typed"
        }

        fn standard_type(&self) -> Result<StandardType> {
            Ok(self.0)
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
            _ctx: &EvalContext<'_>,
        ) -> Result<FieldValue> {
            Ok(FieldValue::Null)
        }
    }

    struct LegacyField;

    impl HeraldField for LegacyField {
        fn name(&self) -> &str {
            "Legacy"
        }

        fn constant(&self) -> &str {
            "test.legacy"
        }

        fn supports_object(&self, _object: &dyn HeraldObject) -> bool {
            true
        }

        fn extract_value(
            &self,
            _object: &dyn HeraldObject,
            _ctx: &EvalContext<'_>,
        ) -> Result<FieldValue> {
            Ok(FieldValue::Null)
        }
    }

    struct BrokenField;

    impl HeraldField for BrokenField {
        fn name(&self) -> &str {
            "Broken"
        }

        fn constant(&self) -> &str {
            "test.broken"
        }

        fn standard_type(&self) -> Result<StandardType> {
            StandardType::parse_for(self.constant(), "standard.nope")
        }

        fn supports_object(&self, _object: &dyn HeraldObject) -> bool {
            true
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
    fn text_value_renders_unchanged() {
        let ctx = RenderContext::new(&Directory);
        let rendered = TypedField(StandardType::Text)
            .render_condition_value(Condition::Is, &json!("needs-review"), &ctx)
            .unwrap();
        assert_eq!(rendered, "needs-review");
    }

    #[test]
    fn empty_shape_renders_nothing() {
        let ctx = RenderContext::new(&Directory);
        let rendered = TypedField(StandardType::PhidList)
            .render_condition_value(Condition::Exists, &json!(["PHID-USER-1"]), &ctx)
            .unwrap();
        assert_eq!(rendered, "");
    }

    #[test]
    fn tokenizer_resolves_every_identifier() {
        let ctx = RenderContext::new(&Directory);
        let rendered = TypedField(StandardType::PhidList)
            .render_condition_value(
                Condition::IncludeAny,
                &json!(["PHID-USER-2", "PHID-USER-1"]),
                &ctx,
            )
            .unwrap();
        assert_eq!(rendered, "Bob, Alice");
    }

    #[test]
    fn tokenizer_keeps_non_identifier_elements() {
        let ctx = RenderContext::new(&Directory);
        let rendered = TypedField(StandardType::PhidList)
            .render_condition_value(Condition::IncludeAny, &json!(["PHID-USER-1", 42]), &ctx)
            .unwrap();
        assert_eq!(rendered, "Alice, 42");
    }

    #[test]
    fn tokenizer_renders_non_list_values_as_text() {
        let ctx = RenderContext::new(&Directory);
        let field = TypedField(StandardType::PhidList);

        let editor = editor_value(&json!(["PHID-USER-1"]), &Directory);
        let rendered = field
            .render_condition_value(Condition::IncludeAny, &editor, &ctx)
            .unwrap();
        assert_eq!(rendered, r#"{"PHID-USER-1":"Alice"}"#);

        let rendered = field
            .render_condition_value(Condition::IncludeAny, &json!(17), &ctx)
            .unwrap();
        assert_eq!(rendered, "17");

        let rendered = field
            .render_condition_value(Condition::IncludeAny, &json!(null), &ctx)
            .unwrap();
        assert_eq!(rendered, "");
    }

    #[test]
    fn legacy_fallback_resolves_only_known_references() {
        let ctx = RenderContext::new(&Directory);
        let rendered = LegacyField
            .render_condition_value(Condition::Is, &json!(["PHID-USER-1", "plain-tag"]), &ctx)
            .unwrap();
        assert_eq!(rendered, "Alice, plain-tag");
    }

    #[test]
    fn legacy_fallback_passes_scalars_through() {
        let ctx = RenderContext::new(&Directory);
        let rendered = LegacyField
            .render_condition_value(Condition::Is, &json!("PHID-USER-1"), &ctx)
            .unwrap();
        assert_eq!(rendered, "PHID-USER-1");
    }

    #[test]
    fn legacy_fallback_respects_namespace_allow_list() {
        let projects_only = PhidNamespace::with_types(["PROJ"]);
        let ctx = RenderContext::new(&Directory).with_namespace(&projects_only);
        let rendered = LegacyField
            .render_condition_value(Condition::Is, &json!(["PHID-USER-1", 3]), &ctx)
            .unwrap();
        assert_eq!(rendered, "PHID-USER-1, 3");
    }

    #[test]
    fn missing_lookup_source_is_not_treated_as_legacy() {
        struct NoSource;

        impl HeraldField for NoSource {
            fn name(&self) -> &str {
                "No source"
            }

            fn constant(&self) -> &str {
                "test.no-source"
            }

            fn standard_type(&self) -> Result<StandardType> {
                Ok(StandardType::Phid)
            }

            fn supports_object(&self, _object: &dyn HeraldObject) -> bool {
                true
            }

            fn extract_value(
                &self,
                _object: &dyn HeraldObject,
                _ctx: &EvalContext<'_>,
            ) -> Result<FieldValue> {
                Ok(FieldValue::Null)
            }
        }

        let ctx = RenderContext::new(&Directory);
        let err = NoSource
            .render_condition_value(Condition::IsAny, &json!(["PHID-USER-1"]), &ctx)
            .unwrap_err();
        assert!(matches!(
            err,
            FieldError::NotImplemented { method: "lookup_source", .. }
        ));
    }

    #[test]
    fn classification_errors_propagate() {
        let ctx = RenderContext::new(&Directory);
        let err = BrokenField
            .render_condition_value(Condition::Is, &json!("x"), &ctx)
            .unwrap_err();
        assert!(matches!(err, FieldError::UnknownStandardType { .. }));
    }

    #[test]
    fn editor_value_maps_identifiers_to_labels() {
        let value = editor_value(&json!(["PHID-USER-1", "PHID-USER-2"]), &Directory);
        assert_eq!(value, json!({"PHID-USER-1": "Alice", "PHID-USER-2": "Bob"}));
    }

    #[test]
    fn editor_value_passes_scalars_through() {
        assert_eq!(editor_value(&json!("regexp"), &Directory), json!("regexp"));
        assert_eq!(editor_value(&json!(null), &Directory), json!(null));
    }

    #[test]
    fn phid_detection() {
        assert_eq!(phid_type("PHID-USER-abcdef"), Some("USER"));
        assert_eq!(phid_type("PHID-US-abc"), None);
        assert_eq!(phid_type("plain-tag"), None);
        assert!(PhidNamespace::new().is_known_reference("PHID-PROJ-1"));
        assert!(!PhidNamespace::new().is_known_reference("phid-proj-1"));
    }
}
