// SPDX-FileCopyrightText: 2026 Callsight Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! JSON Schema to Gemini `responseSchema` translation.
//!
//! Gemini accepts an OpenAPI 3.0 subset: upper-case type names, `enum` on
//! strings, `properties`/`required` on objects, `items` on arrays. Keywords
//! outside that subset (`$schema`, `additionalProperties`, `title`, ...) are
//! dropped. Object property order is pinned through `propertyOrdering`,
//! following the `required` list first, so the model emits fields in a
//! stable order.

use serde_json::{Map, Value};

/// Translate a JSON Schema document into Gemini's schema dialect.
pub fn to_gemini_schema(schema: &Value) -> Value {
    let Some(object) = schema.as_object() else {
        return schema.clone();
    };

    let mut out = Map::new();

    if let Some(ty) = object.get("type") {
        match ty {
            Value::String(name) => {
                out.insert("type".into(), Value::String(name.to_ascii_uppercase()));
            }
            // `["string", "null"]` becomes a nullable STRING.
            Value::Array(names) => {
                let mut nullable = false;
                for name in names.iter().filter_map(Value::as_str) {
                    if name == "null" {
                        nullable = true;
                    } else {
                        out.insert("type".into(), Value::String(name.to_ascii_uppercase()));
                    }
                }
                if nullable {
                    out.insert("nullable".into(), Value::Bool(true));
                }
            }
            _ => {}
        }
    }

    for key in ["description", "format", "nullable", "required", "minItems", "maxItems"] {
        if let Some(value) = object.get(key) {
            out.insert(key.into(), value.clone());
        }
    }

    if let Some(values) = object.get("enum") {
        out.insert("enum".into(), values.clone());
        if !out.contains_key("format") {
            out.insert("format".into(), Value::String("enum".into()));
        }
    }

    if let Some(Value::Object(properties)) = object.get("properties") {
        let translated: Map<String, Value> = properties
            .iter()
            .map(|(name, sub)| (name.clone(), to_gemini_schema(sub)))
            .collect();
        let required: Vec<&str> = object
            .get("required")
            .and_then(Value::as_array)
            .map(|names| names.iter().filter_map(Value::as_str).collect())
            .unwrap_or_default();
        let ordering: Vec<Value> = required
            .iter()
            .copied()
            .filter(|name| properties.contains_key(*name))
            .chain(
                properties
                    .keys()
                    .map(String::as_str)
                    .filter(|name| !required.contains(name)),
            )
            .map(|name| Value::String(name.to_string()))
            .collect();
        out.insert("properties".into(), Value::Object(translated));
        out.insert("propertyOrdering".into(), Value::Array(ordering));
    }

    if let Some(items) = object.get("items") {
        out.insert("items".into(), to_gemini_schema(items));
    }

    Value::Object(out)
}
