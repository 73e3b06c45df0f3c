// SPDX-FileCopyrightText: 2026 Callsight Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The insight output contract.
//!
//! [`response_schema`] is derived from [`Insight`] and is what the reasoning
//! service is asked to honor: a closed, lowercase sentiment enum.
//! [`validation_schema`] relaxes it for the local check: the sentiment is
//! accepted in any casing and left to `Sentiment::from_str`, and the text
//! fields must be non-empty.

use callsight_core::{CallsightError, Insight};
use schemars::generate::SchemaSettings;
use serde_json::{Value, json};

/// JSON Schema declared to the reasoning service.
///
/// Subschemas are inlined because Gemini's dialect has no `$ref`.
pub fn response_schema() -> Value {
    SchemaSettings::draft2020_12()
        .with(|settings| settings.inline_subschemas = true)
        .into_generator()
        .into_root_schema_for::<Insight>()
        .to_value()
}

/// JSON Schema every reply must satisfy before deserialization.
pub fn validation_schema() -> Value {
    let mut schema = response_schema();
    if let Some(properties) = schema.get_mut("properties").and_then(Value::as_object_mut) {
        properties.insert("sentiment".into(), json!({"type": "string", "minLength": 1}));
        for field in ["customer_intent", "summary"] {
            if let Some(property) = properties.get_mut(field).and_then(Value::as_object_mut) {
                property.insert("minLength".into(), json!(1));
            }
        }
    }
    schema
}

/// Compiles [`validation_schema`].
pub fn insight_validator() -> Result<jsonschema::Validator, CallsightError> {
    jsonschema::validator_for(&validation_schema())
        .map_err(|e| CallsightError::Internal(format!("insight schema does not compile: {e}")))
}
