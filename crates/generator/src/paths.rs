//! Path and operation construction
//!
//! Each RPC method gets exactly one HTTP binding, resolved in priority
//! order: the YAML API-configuration rule for its selector, then the
//! `google.api.http` method option, then the default
//! `POST /{package.Service}/{Method}` binding with a `*` body.

use std::collections::BTreeMap;

use prost_reflect::{FieldDescriptor, Kind, MethodDescriptor, ServiceDescriptor, Value};
use swagger_gen_common::{PluginError, Result};
use swagger_gen_registry::{HttpMethod, HttpRule, Registry};

use crate::schema;
use crate::types::{Operation, Parameter, PathItem, Response, Schema};

pub(crate) fn build_paths(
    registry: &Registry,
    file: &prost_reflect::FileDescriptor,
    definitions: &mut BTreeMap<String, Schema>,
) -> Result<BTreeMap<String, PathItem>> {
    let mut paths: BTreeMap<String, PathItem> = BTreeMap::new();
    for service in file.services() {
        for method in service.methods() {
            let rule = resolve_rule(registry, &method)?;
            let (path, operation) = build_operation(registry, &service, &method, &rule, definitions)?;
            let item = paths.entry(path.clone()).or_default();
            let slot = match rule.method {
                HttpMethod::Get => &mut item.get,
                HttpMethod::Put => &mut item.put,
                HttpMethod::Post => &mut item.post,
                HttpMethod::Delete => &mut item.delete,
                HttpMethod::Patch => &mut item.patch,
            };
            if slot.is_some() {
                return Err(PluginError::Generation(format!(
                    "duplicate HTTP binding {} {} for {}",
                    rule.method.as_str(),
                    path,
                    method.full_name()
                )));
            }
            *slot = Some(operation);
        }
    }
    Ok(paths)
}

fn resolve_rule(registry: &Registry, method: &MethodDescriptor) -> Result<HttpRule> {
    if let Some(rule) = registry.api_http_rule(method.full_name()) {
        return Ok(rule.clone());
    }
    if let Some(rule) = annotation_rule(registry, method) {
        return Ok(rule);
    }
    Ok(HttpRule {
        method: HttpMethod::Post,
        path: format!(
            "/{}/{}",
            method.parent_service().full_name(),
            method.name()
        ),
        body: Some("*".to_string()),
    })
}

/// HTTP rule from the method's `google.api.http` option, when the request's
/// descriptor set carries the annotation extension.
fn annotation_rule(registry: &Registry, method: &MethodDescriptor) -> Option<HttpRule> {
    let ext = registry.pool().get_extension_by_name("google.api.http")?;
    let options = method.options();
    if !options.has_extension(&ext) {
        return None;
    }
    let value = options.get_extension(&ext);
    let rule = value.as_message()?;

    let bindings = [
        ("get", HttpMethod::Get),
        ("put", HttpMethod::Put),
        ("post", HttpMethod::Post),
        ("delete", HttpMethod::Delete),
        ("patch", HttpMethod::Patch),
    ];
    for (field, http_method) in bindings {
        if !rule.has_field_by_name(field) {
            continue;
        }
        let path = rule
            .get_field_by_name(field)
            .as_deref()
            .and_then(Value::as_str)
            .map(str::to_string)?;
        let body = rule
            .get_field_by_name("body")
            .as_deref()
            .and_then(Value::as_str)
            .filter(|b| !b.is_empty())
            .map(str::to_string);
        return Some(HttpRule {
            method: http_method,
            path,
            body,
        });
    }
    None
}

fn build_operation(
    registry: &Registry,
    service: &ServiceDescriptor,
    method: &MethodDescriptor,
    rule: &HttpRule,
    definitions: &mut BTreeMap<String, Schema>,
) -> Result<(String, Operation)> {
    let input = method.input();
    let output = method.output();

    let (path, path_vars) = parse_template(&rule.path).map_err(|e| {
        PluginError::Generation(format!("bad path template for {}: {e}", method.full_name()))
    })?;

    let mut parameters = Vec::new();
    for var in &path_vars {
        parameters.push(path_parameter(registry, &input, var));
    }

    if let Some(body) = &rule.body {
        if rule.method == HttpMethod::Delete && !registry.allow_delete_body() {
            return Err(PluginError::Generation(format!(
                "{} must not have a body (set allow_delete_body to permit it)",
                method.full_name()
            )));
        }
        let body_schema = if body == "*" {
            schema::reference_schema(registry, definitions, &input)?
        } else {
            let field = input.get_field_by_name(body).ok_or_else(|| {
                PluginError::Generation(format!(
                    "body field {body} not found in {}",
                    input.full_name()
                ))
            })?;
            if field.is_list() && !registry.allow_repeated_fields_in_body() {
                return Err(PluginError::Generation(format!(
                    "repeated field {body} in body of {} (set allow_repeated_fields_in_body to permit it)",
                    method.full_name()
                )));
            }
            schema::field_schema(registry, definitions, &field)?
        };
        parameters.push(Parameter {
            name: "body".to_string(),
            location: "body".to_string(),
            required: Some(true),
            schema: Some(body_schema),
            ..Default::default()
        });
    } else {
        // without a body mapping, leaf input fields become query parameters;
        // path templates always address fields by their proto name
        for field in input.fields() {
            if path_vars.iter().any(|var| var == field.name()) {
                continue;
            }
            let name = field_key(registry, &field);
            if let Some(param) = query_parameter(registry, &field, name) {
                parameters.push(param);
            }
        }
    }

    let response_schema = {
        let base = schema::reference_schema(registry, definitions, &output)?;
        if registry.wrap_resp_code() {
            wrap_response(base)
        } else {
            base
        }
    };
    let mut responses = BTreeMap::new();
    responses.insert(
        "200".to_string(),
        Response {
            description: "A successful response.".to_string(),
            schema: Some(response_schema),
        },
    );

    let operation = Operation {
        tags: vec![operation_tag(registry, service)],
        operation_id: format!("{}_{}", service.name(), method.name()),
        parameters,
        responses,
    };
    Ok((path, operation))
}

fn operation_tag(registry: &Registry, service: &ServiceDescriptor) -> String {
    let package = service.parent_file().package_name().to_string();
    if registry.include_package_in_tags() && !package.is_empty() {
        format!("{}.{}", package, service.name())
    } else {
        service.name().to_string()
    }
}

/// `{code, message, data}` envelope around a success schema.
fn wrap_response(data: Schema) -> Schema {
    let mut properties = BTreeMap::new();
    properties.insert("code".to_string(), Schema::formatted("integer", "int32"));
    properties.insert("message".to_string(), Schema::simple("string"));
    properties.insert("data".to_string(), data);
    Schema {
        schema_type: Some("object".to_string()),
        properties,
        ..Default::default()
    }
}

fn field_key(registry: &Registry, field: &FieldDescriptor) -> String {
    if registry.use_json_names_for_fields() {
        field.json_name().to_string()
    } else {
        field.name().to_string()
    }
}

fn path_parameter(
    registry: &Registry,
    input: &prost_reflect::MessageDescriptor,
    var: &str,
) -> Parameter {
    let mut parameter = Parameter {
        name: var.to_string(),
        location: "path".to_string(),
        required: Some(true),
        param_type: Some("string".to_string()),
        ..Default::default()
    };
    // nested variables like book.name fall back to plain strings
    if let Some(field) = input.get_field_by_name(var) {
        if let Some((param_type, format)) = primitive_param_type(&field.kind()) {
            if field.is_list() {
                parameter.param_type = Some("array".to_string());
                parameter.items = Some(Box::new(match format {
                    Some(f) => Schema::formatted(param_type, f),
                    None => Schema::simple(param_type),
                }));
                parameter.collection_format = Some(
                    registry
                        .path_param_separator()
                        .collection_format()
                        .to_string(),
                );
            } else {
                parameter.param_type = Some(param_type.to_string());
                parameter.format = format.map(str::to_string);
            }
        }
    }
    parameter
}

fn query_parameter(
    registry: &Registry,
    field: &FieldDescriptor,
    name: String,
) -> Option<Parameter> {
    // message- and map-typed fields are not addressable as query parameters
    if field.is_map() {
        return None;
    }
    let (param_type, format) = primitive_param_type(&field.kind())?;
    let mut parameter = Parameter {
        name,
        location: "query".to_string(),
        param_type: Some(param_type.to_string()),
        format: format.map(str::to_string),
        ..Default::default()
    };
    if field.is_list() {
        parameter.param_type = Some("array".to_string());
        parameter.format = None;
        parameter.items = Some(Box::new(match format {
            Some(f) => Schema::formatted(param_type, f),
            None => Schema::simple(param_type),
        }));
        parameter.collection_format = Some(
            registry
                .path_param_separator()
                .collection_format()
                .to_string(),
        );
    }
    Some(parameter)
}

fn primitive_param_type(kind: &Kind) -> Option<(&'static str, Option<&'static str>)> {
    let mapped = match kind {
        Kind::Double => ("number", Some("double")),
        Kind::Float => ("number", Some("float")),
        Kind::Int32 | Kind::Sint32 | Kind::Sfixed32 => ("integer", Some("int32")),
        Kind::Uint32 | Kind::Fixed32 => ("integer", Some("int64")),
        Kind::Int64 | Kind::Sint64 | Kind::Sfixed64 => ("string", Some("int64")),
        Kind::Uint64 | Kind::Fixed64 => ("string", Some("uint64")),
        Kind::Bool => ("boolean", None),
        Kind::String => ("string", None),
        Kind::Bytes => ("string", Some("byte")),
        Kind::Enum(_) => ("string", None),
        Kind::Message(_) => return None,
    };
    Some(mapped)
}

/// Split a path template into its normalized form and variable names.
///
/// `/v1/{name=books/*}/pages/{page}` becomes `/v1/{name}/pages/{page}` with
/// variables `["name", "page"]`.
fn parse_template(template: &str) -> std::result::Result<(String, Vec<String>), String> {
    let mut normalized = String::with_capacity(template.len());
    let mut vars = Vec::new();
    let mut chars = template.chars();
    while let Some(c) = chars.next() {
        if c != '{' {
            normalized.push(c);
            continue;
        }
        let mut var = String::new();
        loop {
            match chars.next() {
                Some('}') => break,
                Some(c) => var.push(c),
                None => return Err(format!("unterminated variable in {template}")),
            }
        }
        let name = var.split('=').next().unwrap_or("").trim();
        if name.is_empty() {
            return Err(format!("empty variable name in {template}"));
        }
        normalized.push('{');
        normalized.push_str(name);
        normalized.push('}');
        vars.push(name.to_string());
    }
    Ok((normalized, vars))
}
