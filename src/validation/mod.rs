//! Schema validation for request bodies.
//!
//! Validation is deliberately minimal: a schema only lists field names and
//! whether each one is required. No type, range or format checks happen here
//! (an email is any value under the `email` key). The store is the final
//! arbiter of types. [`ValidationMode::Strict`] is an opt-in tightening that
//! also rejects unknown fields and `null` required values.

use serde_json::Value;
use std::collections::HashMap;

use crate::types::Record;

/// One declared field of an entity schema
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    pub name: &'static str,
    pub required: bool,
}

impl FieldSpec {
    pub const fn required(name: &'static str) -> Self {
        Self { name, required: true }
    }

    pub const fn optional(name: &'static str) -> Self {
        Self { name, required: false }
    }
}

/// Static field set of an entity
#[derive(Debug, Clone, Copy)]
pub struct Schema {
    pub entity: &'static str,
    pub fields: &'static [FieldSpec],
}

impl Schema {
    pub fn contains(&self, field: &str) -> bool {
        self.fields.iter().any(|spec| spec.name == field)
    }

    pub fn required_fields(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.fields.iter().filter(|spec| spec.required).map(|spec| spec.name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ValidationMode {
    #[default]
    Lenient,
    Strict,
}

/// True iff `candidate` is an object and every required field is present.
/// Extra fields are allowed; they are dropped later by [`extract_valid_fields`].
pub fn validate(candidate: &Value, schema: &Schema) -> bool {
    match candidate.as_object() {
        Some(object) => schema.required_fields().all(|field| object.contains_key(field)),
        None => false,
    }
}

/// Project `candidate` onto exactly the fields declared in `schema`.
/// This is the only sanitisation applied before a value is persisted.
pub fn extract_valid_fields(candidate: &Value, schema: &Schema) -> Record {
    let mut record = Record::new();
    if let Some(object) = candidate.as_object() {
        for spec in schema.fields {
            if let Some(value) = object.get(spec.name) {
                record.insert(spec.name.to_string(), value.clone());
            }
        }
    }
    record
}

/// Field-level problems found by [`validate_strict`]
pub type FieldErrors = HashMap<String, String>;

/// Strict check: required fields must be present and non-null, and no field
/// outside the schema may appear.
pub fn validate_strict(candidate: &Value, schema: &Schema) -> Result<(), FieldErrors> {
    let Some(object) = candidate.as_object() else {
        let mut errors = FieldErrors::new();
        errors.insert("$".to_string(), "Expected a JSON object".to_string());
        return Err(errors);
    };

    let mut errors = FieldErrors::new();
    for field in schema.required_fields() {
        match object.get(field) {
            None => {
                errors.insert(field.to_string(), "This field is required".to_string());
            }
            Some(Value::Null) => {
                errors.insert(field.to_string(), "This field may not be null".to_string());
            }
            Some(_) => {}
        }
    }
    for key in object.keys() {
        if !schema.contains(key) {
            errors.insert(key.clone(), "Unknown field".to_string());
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Run the configured mode. Lenient mode reports no field detail.
pub fn check(candidate: &Value, schema: &Schema, mode: ValidationMode) -> Result<(), Option<FieldErrors>> {
    match mode {
        ValidationMode::Lenient if validate(candidate, schema) => Ok(()),
        ValidationMode::Lenient => Err(None),
        ValidationMode::Strict => validate_strict(candidate, schema).map_err(Some),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const WIDGET: Schema = Schema {
        entity: "widget",
        fields: &[
            FieldSpec::required("name"),
            FieldSpec::required("owner_id"),
            FieldSpec::optional("note"),
        ],
    };

    #[test]
    fn accepts_when_required_present() {
        assert!(validate(&json!({ "name": "a", "owner_id": 1 }), &WIDGET));
        assert!(validate(&json!({ "name": "a", "owner_id": 1, "note": "x", "extra": true }), &WIDGET));
    }

    #[test]
    fn rejects_missing_required_or_non_object() {
        assert!(!validate(&json!({ "name": "a" }), &WIDGET));
        assert!(!validate(&json!([1, 2]), &WIDGET));
        assert!(!validate(&json!("name"), &WIDGET));
    }

    #[test]
    fn null_counts_as_present_in_lenient_mode() {
        assert!(validate(&json!({ "name": null, "owner_id": 1 }), &WIDGET));
        assert!(check(&json!({ "name": null, "owner_id": 1 }), &WIDGET, ValidationMode::Lenient).is_ok());
    }

    #[test]
    fn extraction_drops_unknown_fields() {
        let record = extract_valid_fields(
            &json!({ "name": "a", "owner_id": 1, "id": 99, "admin": true }),
            &WIDGET,
        );
        assert_eq!(record.len(), 2);
        assert!(!record.contains_key("id"));
        assert!(!record.contains_key("admin"));
        assert_eq!(record["name"], json!("a"));
    }

    #[test]
    fn extraction_keeps_present_optional_fields_only() {
        let record = extract_valid_fields(&json!({ "name": "a", "note": "n" }), &WIDGET);
        assert_eq!(record.get("note"), Some(&json!("n")));
        assert!(!record.contains_key("owner_id"));
    }

    #[test]
    fn strict_mode_reports_each_problem() {
        let errors = validate_strict(&json!({ "name": null, "bogus": 1 }), &WIDGET).unwrap_err();
        assert_eq!(errors.len(), 3);
        assert!(errors.contains_key("name"));
        assert!(errors.contains_key("owner_id"));
        assert!(errors.contains_key("bogus"));
    }

    #[test]
    fn strict_mode_accepts_clean_body() {
        assert!(check(&json!({ "name": "a", "owner_id": 2 }), &WIDGET, ValidationMode::Strict).is_ok());
    }
}
