//! Message and field schema conversion
//!
//! Walks message descriptors reachable from the generated operations and
//! fills the document's `definitions` map. Well-known wrapper types collapse
//! to their JSON representation instead of getting a definition entry.

use std::collections::BTreeMap;

use prost_reflect::{EnumDescriptor, FieldDescriptor, Kind, MessageDescriptor};
use swagger_gen_common::Result;
use swagger_gen_registry::Registry;

use crate::types::Schema;

/// Schema referencing `message`, registering its definition (and those of
/// every message it reaches) as a side effect.
pub(crate) fn reference_schema(
    registry: &Registry,
    definitions: &mut BTreeMap<String, Schema>,
    message: &MessageDescriptor,
) -> Result<Schema> {
    if let Some(schema) = well_known_schema(message) {
        return Ok(schema);
    }
    let name = definition_name(registry, message);
    ensure_definition(registry, definitions, message)?;
    Ok(Schema::reference(&name))
}

fn ensure_definition(
    registry: &Registry,
    definitions: &mut BTreeMap<String, Schema>,
    message: &MessageDescriptor,
) -> Result<()> {
    let name = definition_name(registry, message);
    if definitions.contains_key(&name) {
        return Ok(());
    }
    // placeholder first, so recursive messages terminate
    definitions.insert(name.clone(), Schema::default());
    let schema = message_schema(registry, definitions, message)?;
    definitions.insert(name, schema);
    Ok(())
}

/// Object schema for one message, properties keyed per the JSON-name policy.
pub(crate) fn message_schema(
    registry: &Registry,
    definitions: &mut BTreeMap<String, Schema>,
    message: &MessageDescriptor,
) -> Result<Schema> {
    let mut properties = BTreeMap::new();
    for field in message.fields() {
        let key = if registry.use_json_names_for_fields() {
            field.json_name().to_string()
        } else {
            field.name().to_string()
        };
        properties.insert(key, field_schema(registry, definitions, &field)?);
    }
    Ok(Schema {
        schema_type: Some("object".to_string()),
        properties,
        ..Default::default()
    })
}

/// Schema for one field, handling repeated and map cardinality.
pub(crate) fn field_schema(
    registry: &Registry,
    definitions: &mut BTreeMap<String, Schema>,
    field: &FieldDescriptor,
) -> Result<Schema> {
    if field.is_map() {
        let Kind::Message(entry) = field.kind() else {
            return Ok(Schema::simple("object"));
        };
        let value = kind_schema(registry, definitions, &entry.map_entry_value_field().kind())?;
        return Ok(Schema {
            schema_type: Some("object".to_string()),
            additional_properties: Some(Box::new(value)),
            ..Default::default()
        });
    }

    let element = kind_schema(registry, definitions, &field.kind())?;
    if field.is_list() {
        Ok(Schema {
            schema_type: Some("array".to_string()),
            items: Some(Box::new(element)),
            ..Default::default()
        })
    } else {
        Ok(element)
    }
}

pub(crate) fn kind_schema(
    registry: &Registry,
    definitions: &mut BTreeMap<String, Schema>,
    kind: &Kind,
) -> Result<Schema> {
    let schema = match kind {
        Kind::Double => Schema::formatted("number", "double"),
        Kind::Float => Schema::formatted("number", "float"),
        Kind::Int32 | Kind::Sint32 | Kind::Sfixed32 => Schema::formatted("integer", "int32"),
        Kind::Uint32 | Kind::Fixed32 => Schema::formatted("integer", "int64"),
        Kind::Int64 | Kind::Sint64 | Kind::Sfixed64 => Schema::formatted("string", "int64"),
        Kind::Uint64 | Kind::Fixed64 => Schema::formatted("string", "uint64"),
        Kind::Bool => Schema::simple("boolean"),
        Kind::String => Schema::simple("string"),
        Kind::Bytes => Schema::formatted("string", "byte"),
        Kind::Enum(desc) => enum_schema(desc),
        Kind::Message(desc) => reference_schema(registry, definitions, desc)?,
    };
    Ok(schema)
}

fn enum_schema(desc: &EnumDescriptor) -> Schema {
    Schema {
        schema_type: Some("string".to_string()),
        enum_values: desc.values().map(|v| v.name().to_string()).collect(),
        ..Default::default()
    }
}

pub(crate) fn definition_name(registry: &Registry, message: &MessageDescriptor) -> String {
    if registry.use_fqn_for_swagger_name() {
        message.full_name().to_string()
    } else {
        message.name().to_string()
    }
}

/// JSON shapes for google.protobuf well-known types.
fn well_known_schema(message: &MessageDescriptor) -> Option<Schema> {
    let schema = match message.full_name() {
        "google.protobuf.Timestamp" => Schema::formatted("string", "date-time"),
        "google.protobuf.Duration" => Schema::simple("string"),
        "google.protobuf.StringValue" => Schema::simple("string"),
        "google.protobuf.BytesValue" => Schema::formatted("string", "byte"),
        "google.protobuf.BoolValue" => Schema::simple("boolean"),
        "google.protobuf.DoubleValue" => Schema::formatted("number", "double"),
        "google.protobuf.FloatValue" => Schema::formatted("number", "float"),
        "google.protobuf.Int32Value" => Schema::formatted("integer", "int32"),
        "google.protobuf.UInt32Value" => Schema::formatted("integer", "int64"),
        "google.protobuf.Int64Value" => Schema::formatted("string", "int64"),
        "google.protobuf.UInt64Value" => Schema::formatted("string", "uint64"),
        "google.protobuf.Empty" | "google.protobuf.Struct" => Schema::simple("object"),
        "google.protobuf.Value" => Schema::default(),
        "google.protobuf.ListValue" => Schema {
            schema_type: Some("array".to_string()),
            items: Some(Box::new(Schema::default())),
            ..Default::default()
        },
        _ => return None,
    };
    Some(schema)
}
