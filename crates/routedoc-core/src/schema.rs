//! JSON Schema to legacy document schema conversion.
//!
//! The legacy (Swagger 2.0) dialect only understands a subset of JSON Schema.
//! [`convert_schema`] strips the keywords it cannot represent, recursing into
//! the places where nested schemas live: object `properties`, object-valued
//! `additionalProperties` and array `items`.

use serde_json::{json, Map, Value};

use crate::types::Parameter;

/// Keywords removed from every converted schema node.
pub const UNSUPPORTED_KEYWORDS: [&str; 9] = [
    // Object specific
    "patternProperties",
    "dependencies",
    // Array specific
    "additionalItems",
    // Generic
    "$schema",
    "anyOf",
    "oneOf",
    "not",
    "definitions",
    "id",
];

/// Converts a JSON Schema into a legacy document schema.
///
/// Returns a new value; the input is never modified. Non-object inputs (for
/// instance boolean schemas) are returned unchanged.
#[must_use]
pub fn convert_schema(schema: &Value) -> Value {
    let Value::Object(node) = schema else {
        return schema.clone();
    };

    let mut converted = node.clone();

    match node.get("type").and_then(Value::as_str) {
        Some("object") => {
            if let Some(Value::Object(properties)) = node.get("properties") {
                // Keys here are property names, not keywords, so they are kept.
                let properties: Map<String, Value> = properties
                    .iter()
                    .map(|(name, property)| (name.clone(), convert_schema(property)))
                    .collect();
                converted.insert("properties".into(), Value::Object(properties));
            }
            if let Some(additional @ Value::Object(_)) = node.get("additionalProperties") {
                converted.insert("additionalProperties".into(), convert_schema(additional));
            }
        }
        Some("array") => match node.get("items") {
            Some(Value::Array(items)) => {
                let items = items.iter().map(convert_schema).collect();
                converted.insert("items".into(), Value::Array(items));
            }
            Some(items @ Value::Object(_)) => {
                converted.insert("items".into(), convert_schema(items));
            }
            _ => {}
        },
        _ => {}
    }

    for keyword in UNSUPPORTED_KEYWORDS {
        converted.remove(keyword);
    }

    Value::Object(converted)
}

/// Renders route parameters for the legacy document.
///
/// Parameters with a schema carry the converted schema plus the original one
/// under `x-schema`. Schema-less parameters are declared as strings.
#[must_use]
pub fn convert_parameters(parameters: &[Parameter]) -> Vec<Value> {
    parameters.iter().map(convert_parameter).collect()
}

fn convert_parameter(parameter: &Parameter) -> Value {
    let mut rendered = Map::new();
    rendered.insert("name".into(), json!(parameter.name));
    rendered.insert("in".into(), json!(parameter.location));
    if parameter.required {
        rendered.insert("required".into(), json!(true));
    }
    if let Some(description) = &parameter.description {
        rendered.insert("description".into(), json!(description));
    }
    match &parameter.schema {
        Some(schema) => {
            rendered.insert("schema".into(), convert_schema(schema));
            rendered.insert("x-schema".into(), schema.clone());
        }
        None => {
            rendered.insert("type".into(), json!("string"));
        }
    }
    Value::Object(rendered)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strips_generic_unsupported_keywords() {
        let schema = json!({
            "$schema": "http://json-schema.org/draft-04/schema#",
            "anyOf": [],
            "oneOf": [],
            "not": {},
            "definitions": {},
            "id": "id"
        });
        assert_eq!(convert_schema(&schema), json!({}));
    }

    #[test]
    fn test_array_with_array_items() {
        let schema = json!({ "type": "array", "items": [{ "id": "id", "type": "string" }] });
        assert_eq!(
            convert_schema(&schema),
            json!({ "type": "array", "items": [{ "type": "string" }] })
        );
    }

    #[test]
    fn test_array_with_object_items_and_additional_items() {
        let schema = json!({
            "type": "array",
            "items": { "id": "id", "type": "string" },
            "additionalItems": {}
        });
        assert_eq!(
            convert_schema(&schema),
            json!({ "type": "array", "items": { "type": "string" } })
        );
    }

    #[test]
    fn test_object_with_schema_additional_properties() {
        let schema = json!({
            "type": "object",
            "properties": {},
            "additionalProperties": { "id": "id", "type": "string" },
            "patternProperties": {},
            "dependencies": {}
        });
        assert_eq!(
            convert_schema(&schema),
            json!({
                "type": "object",
                "properties": {},
                "additionalProperties": { "type": "string" }
            })
        );
    }

    #[test]
    fn test_boolean_additional_properties_is_kept() {
        let schema = json!({ "type": "object", "additionalProperties": false });
        assert_eq!(convert_schema(&schema), schema);
    }

    #[test]
    fn test_converts_recursively() {
        let schema = json!({
            "$schema": "http://json-schema.org/draft-04/schema#",
            "id": "id",
            "type": "object",
            "properties": {
                "arrayWithArrayItems": {
                    "type": "array",
                    "items": [{ "id": "id", "type": "string" }]
                },
                "arrayWithUnsupportedKeywords": {
                    "type": "array",
                    "items": { "id": "id", "type": "string" },
                    "additionalItems": {}
                },
                "objectWithObjectAdditionalProperties": {
                    "type": "object",
                    "properties": {},
                    "additionalProperties": { "id": "id", "type": "string" }
                },
                "objectWithUnsupportedKeywords": {
                    "type": "object",
                    "properties": {},
                    "patternProperties": {},
                    "dependencies": {}
                }
            }
        });
        assert_eq!(
            convert_schema(&schema),
            json!({
                "type": "object",
                "properties": {
                    "arrayWithArrayItems": { "type": "array", "items": [{ "type": "string" }] },
                    "arrayWithUnsupportedKeywords": { "type": "array", "items": { "type": "string" } },
                    "objectWithObjectAdditionalProperties": {
                        "type": "object",
                        "properties": {},
                        "additionalProperties": { "type": "string" }
                    },
                    "objectWithUnsupportedKeywords": { "type": "object", "properties": {} }
                }
            })
        );
    }

    #[test]
    fn test_properties_named_like_keywords_are_kept() {
        let schema = json!({
            "type": "object",
            "properties": {
                "patternProperties": { "type": "string", "id": "inner" },
                "not": { "type": "boolean" }
            }
        });
        assert_eq!(
            convert_schema(&schema),
            json!({
                "type": "object",
                "properties": {
                    "patternProperties": { "type": "string" },
                    "not": { "type": "boolean" }
                }
            })
        );
    }

    #[test]
    fn test_input_is_not_mutated() {
        let schema = json!({
            "type": "object",
            "id": "root",
            "properties": {
                "nested": { "type": "array", "items": { "id": "x", "type": "string" } }
            },
            "additionalProperties": { "oneOf": [], "type": "string" }
        });
        let before = schema.clone();
        let _ = convert_schema(&schema);
        assert_eq!(schema, before);
    }

    #[test]
    fn test_schema_less_parameters_become_strings() {
        let params = vec![Parameter::query("q")];
        assert_eq!(
            convert_parameters(&params),
            vec![json!({ "name": "q", "in": "query", "type": "string" })]
        );
    }

    #[test]
    fn test_parameter_keeps_original_schema() {
        let original = json!({ "id": "id", "type": "string" });
        let params = vec![Parameter::header("x-token").required().schema(original.clone())];
        let rendered = convert_parameters(&params);
        assert_eq!(rendered[0]["schema"], json!({ "type": "string" }));
        assert_eq!(rendered[0]["x-schema"], original);
        assert_eq!(rendered[0]["required"], json!(true));
    }
}
