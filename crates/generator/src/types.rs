//! OpenAPI 2.0 document model
//!
//! Only the subset of the swagger schema the generator emits. Maps are
//! `BTreeMap` so serialization order is deterministic.

use std::collections::BTreeMap;

use serde::Serialize;

/// Swagger document root
#[derive(Debug, Clone, Serialize)]
pub struct SwaggerDocument {
    /// Always "2.0"
    pub swagger: String,

    pub info: Info,

    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub consumes: Vec<String>,

    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub produces: Vec<String>,

    pub paths: BTreeMap<String, PathItem>,

    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub definitions: BTreeMap<String, Schema>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Info {
    pub title: String,
    pub version: String,
}

/// Operations keyed by HTTP method for one path
#[derive(Debug, Clone, Default, Serialize)]
pub struct PathItem {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub get: Option<Operation>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub put: Option<Operation>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub post: Option<Operation>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub delete: Option<Operation>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub patch: Option<Operation>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Operation {
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,

    #[serde(rename = "operationId")]
    pub operation_id: String,

    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub parameters: Vec<Parameter>,

    pub responses: BTreeMap<String, Response>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct Parameter {
    pub name: String,

    #[serde(rename = "in")]
    pub location: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub required: Option<bool>,

    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub param_type: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub items: Option<Box<Schema>>,

    #[serde(rename = "collectionFormat", skip_serializing_if = "Option::is_none")]
    pub collection_format: Option<String>,

    /// Set for body parameters only
    #[serde(skip_serializing_if = "Option::is_none")]
    pub schema: Option<Schema>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Response {
    pub description: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub schema: Option<Schema>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct Schema {
    #[serde(rename = "$ref", skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,

    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub schema_type: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,

    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub properties: BTreeMap<String, Schema>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub items: Option<Box<Schema>>,

    #[serde(
        rename = "additionalProperties",
        skip_serializing_if = "Option::is_none"
    )]
    pub additional_properties: Option<Box<Schema>>,

    #[serde(rename = "enum", skip_serializing_if = "Vec::is_empty")]
    pub enum_values: Vec<String>,
}

impl Schema {
    pub fn reference(name: &str) -> Self {
        Schema {
            reference: Some(format!("#/definitions/{name}")),
            ..Default::default()
        }
    }

    pub fn simple(schema_type: &str) -> Self {
        Schema {
            schema_type: Some(schema_type.to_string()),
            ..Default::default()
        }
    }

    pub fn formatted(schema_type: &str, format: &str) -> Self {
        Schema {
            schema_type: Some(schema_type.to_string()),
            format: Some(format.to_string()),
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schema_serializes_swagger_field_names() {
        let schema = Schema {
            reference: Some("#/definitions/Book".to_string()),
            ..Default::default()
        };
        let json = serde_json::to_value(&schema).unwrap();
        assert_eq!(json["$ref"], "#/definitions/Book");

        let array = Schema {
            schema_type: Some("array".to_string()),
            items: Some(Box::new(Schema::simple("string"))),
            ..Default::default()
        };
        let json = serde_json::to_value(&array).unwrap();
        assert_eq!(json["type"], "array");
        assert_eq!(json["items"]["type"], "string");
    }

    #[test]
    fn test_empty_path_item_serializes_to_empty_object() {
        let json = serde_json::to_string(&PathItem::default()).unwrap();
        assert_eq!(json, "{}");
    }
}
