//! Integration tests for swagger document generation

use std::io::Write;

use prost_types::compiler::CodeGeneratorRequest;
use prost_types::field_descriptor_proto::{Label, Type};
use prost_types::{
    DescriptorProto, FieldDescriptorProto, FileDescriptorProto, MethodDescriptorProto,
    ServiceDescriptorProto,
};
use swagger_gen_generator::SwaggerGenerator;
use swagger_gen_registry::{DescriptorSource, Registry};

fn string_field(name: &str, number: i32) -> FieldDescriptorProto {
    FieldDescriptorProto {
        name: Some(name.to_string()),
        number: Some(number),
        label: Some(Label::Optional as i32),
        r#type: Some(Type::String as i32),
        ..Default::default()
    }
}

fn library_file() -> FileDescriptorProto {
    let get_book_request = DescriptorProto {
        name: Some("GetBookRequest".to_string()),
        field: vec![
            string_field("name", 1),
            FieldDescriptorProto {
                name: Some("page_size".to_string()),
                number: Some(2),
                label: Some(Label::Optional as i32),
                r#type: Some(Type::Int32 as i32),
                ..Default::default()
            },
        ],
        ..Default::default()
    };
    let book = DescriptorProto {
        name: Some("Book".to_string()),
        field: vec![
            string_field("name", 1),
            FieldDescriptorProto {
                name: Some("tags".to_string()),
                number: Some(2),
                label: Some(Label::Repeated as i32),
                r#type: Some(Type::String as i32),
                ..Default::default()
            },
        ],
        ..Default::default()
    };

    FileDescriptorProto {
        name: Some("acme/library.proto".to_string()),
        package: Some("acme.library".to_string()),
        message_type: vec![get_book_request, book],
        service: vec![ServiceDescriptorProto {
            name: Some("LibraryService".to_string()),
            method: vec![MethodDescriptorProto {
                name: Some("GetBook".to_string()),
                input_type: Some(".acme.library.GetBookRequest".to_string()),
                output_type: Some(".acme.library.Book".to_string()),
                ..Default::default()
            }],
            ..Default::default()
        }],
        ..Default::default()
    }
}

fn shelf_file() -> FileDescriptorProto {
    FileDescriptorProto {
        name: Some("acme/shelf.proto".to_string()),
        package: Some("acme.shelf".to_string()),
        message_type: vec![DescriptorProto {
            name: Some("Shelf".to_string()),
            field: vec![string_field("name", 1)],
            ..Default::default()
        }],
        service: vec![ServiceDescriptorProto {
            name: Some("ShelfService".to_string()),
            method: vec![MethodDescriptorProto {
                name: Some("GetShelf".to_string()),
                input_type: Some(".acme.shelf.Shelf".to_string()),
                output_type: Some(".acme.shelf.Shelf".to_string()),
                ..Default::default()
            }],
            ..Default::default()
        }],
        ..Default::default()
    }
}

fn loaded_registry(files: Vec<FileDescriptorProto>) -> Registry {
    let request = CodeGeneratorRequest {
        proto_file: files,
        ..Default::default()
    };
    let mut registry = Registry::new();
    registry.load(&request).unwrap();
    registry
}

fn generate_json(registry: &Registry, target: &str) -> serde_json::Value {
    let file = registry.lookup_file(target).unwrap();
    let generator = SwaggerGenerator::new(registry);
    let out = generator.generate(&[file]).unwrap();
    assert_eq!(out.len(), 1);
    serde_json::from_str(&out[0].content).unwrap()
}

#[test]
fn test_default_binding_is_post_with_body() {
    let registry = loaded_registry(vec![library_file()]);
    let doc = generate_json(&registry, "acme/library.proto");

    assert_eq!(doc["swagger"], "2.0");
    assert_eq!(doc["info"]["title"], "acme/library.proto");

    let op = &doc["paths"]["/acme.library.LibraryService/GetBook"]["post"];
    assert_eq!(op["operationId"], "LibraryService_GetBook");
    assert_eq!(op["tags"][0], "LibraryService");

    let body = &op["parameters"][0];
    assert_eq!(body["in"], "body");
    assert_eq!(body["schema"]["$ref"], "#/definitions/GetBookRequest");

    assert_eq!(
        op["responses"]["200"]["schema"]["$ref"],
        "#/definitions/Book"
    );
    assert_eq!(
        doc["definitions"]["Book"]["properties"]["tags"]["type"],
        "array"
    );
}

#[test]
fn test_output_per_target_preserves_order_and_names() {
    let registry = loaded_registry(vec![library_file(), shelf_file()]);
    let targets = vec![
        registry.lookup_file("acme/library.proto").unwrap(),
        registry.lookup_file("acme/shelf.proto").unwrap(),
    ];
    let out = SwaggerGenerator::new(&registry).generate(&targets).unwrap();

    assert_eq!(out.len(), 2);
    assert_eq!(out[0].name, "acme/library.swagger.json");
    assert_eq!(out[1].name, "acme/shelf.swagger.json");
}

#[test]
fn test_merge_mode_folds_targets_into_one_file() {
    let mut registry = Registry::new();
    registry.set_allow_merge(true);
    registry.set_merge_file_name("apidocs");
    let request = CodeGeneratorRequest {
        proto_file: vec![library_file(), shelf_file()],
        ..Default::default()
    };
    registry.load(&request).unwrap();

    let targets = vec![
        registry.lookup_file("acme/library.proto").unwrap(),
        registry.lookup_file("acme/shelf.proto").unwrap(),
    ];
    let out = SwaggerGenerator::new(&registry).generate(&targets).unwrap();

    assert_eq!(out.len(), 1);
    assert_eq!(out[0].name, "apidocs.swagger.json");
    let doc: serde_json::Value = serde_json::from_str(&out[0].content).unwrap();
    assert_eq!(doc["info"]["title"], "apidocs");
    assert!(doc["paths"]
        .get("/acme.library.LibraryService/GetBook")
        .is_some());
    assert!(doc["paths"]
        .get("/acme.shelf.ShelfService/GetShelf")
        .is_some());
}

#[test]
fn test_include_package_in_tags() {
    let mut registry = loaded_registry(vec![library_file()]);
    registry.set_include_package_in_tags(true);
    let doc = generate_json(&registry, "acme/library.proto");
    let op = &doc["paths"]["/acme.library.LibraryService/GetBook"]["post"];
    assert_eq!(op["tags"][0], "acme.library.LibraryService");
}

#[test]
fn test_fqn_for_swagger_name() {
    let mut registry = loaded_registry(vec![library_file()]);
    registry.set_use_fqn_for_swagger_name(true);
    let doc = generate_json(&registry, "acme/library.proto");
    assert!(doc["definitions"].get("acme.library.Book").is_some());
    assert!(doc["definitions"].get("Book").is_none());
}

#[test]
fn test_json_names_for_fields() {
    let mut registry = loaded_registry(vec![library_file()]);
    registry.set_use_json_names_for_fields(true);
    let doc = generate_json(&registry, "acme/library.proto");
    let props = &doc["definitions"]["GetBookRequest"]["properties"];
    assert!(props.get("pageSize").is_some());
    assert!(props.get("page_size").is_none());
}

#[test]
fn test_wrap_code_envelopes_the_response() {
    let mut registry = loaded_registry(vec![library_file()]);
    registry.set_wrap_resp_code(true);
    let doc = generate_json(&registry, "acme/library.proto");
    let schema = &doc["paths"]["/acme.library.LibraryService/GetBook"]["post"]["responses"]["200"]
        ["schema"];
    assert_eq!(schema["properties"]["code"]["type"], "integer");
    assert_eq!(schema["properties"]["message"]["type"], "string");
    assert_eq!(schema["properties"]["data"]["$ref"], "#/definitions/Book");
}

fn write_api_config(contents: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file
}

#[test]
fn test_api_configuration_rule_overrides_default_binding() {
    let mut registry = loaded_registry(vec![library_file()]);
    let config = write_api_config(
        r#"
http:
  rules:
    - selector: acme.library.LibraryService.GetBook
      get: /v1/books/{name}
"#,
    );
    registry
        .load_grpc_api_service_from_yaml(config.path().to_str().unwrap())
        .unwrap();

    let doc = generate_json(&registry, "acme/library.proto");
    let op = &doc["paths"]["/v1/books/{name}"]["get"];
    assert_eq!(op["operationId"], "LibraryService_GetBook");

    let params = op["parameters"].as_array().unwrap();
    assert_eq!(params[0]["name"], "name");
    assert_eq!(params[0]["in"], "path");
    assert_eq!(params[0]["required"], true);
    // remaining input field surfaces as a query parameter
    assert_eq!(params[1]["name"], "page_size");
    assert_eq!(params[1]["in"], "query");
    assert_eq!(params[1]["format"], "int32");
}

#[test]
fn test_delete_with_body_requires_allow_delete_body() {
    let mut registry = loaded_registry(vec![library_file()]);
    let config = write_api_config(
        r#"
http:
  rules:
    - selector: acme.library.LibraryService.GetBook
      delete: /v1/books/{name}
      body: "*"
"#,
    );
    registry
        .load_grpc_api_service_from_yaml(config.path().to_str().unwrap())
        .unwrap();

    let file = registry.lookup_file("acme/library.proto").unwrap();
    let err = SwaggerGenerator::new(&registry)
        .generate(&[file.clone()])
        .unwrap_err();
    assert!(err.to_string().contains("must not have a body"));

    registry.set_allow_delete_body(true);
    assert!(SwaggerGenerator::new(&registry).generate(&[file]).is_ok());
}

#[test]
fn test_repeated_body_field_requires_allow_repeated_fields_in_body() {
    // bind the repeated `tags` field of Book as the request body
    let mut file = library_file();
    file.service[0].method[0].input_type = Some(".acme.library.Book".to_string());
    let mut registry = Registry::new();
    registry
        .load(&CodeGeneratorRequest {
            proto_file: vec![file],
            ..Default::default()
        })
        .unwrap();
    let config = write_api_config(
        r#"
http:
  rules:
    - selector: acme.library.LibraryService.GetBook
      post: /v1/books
      body: tags
"#,
    );
    registry
        .load_grpc_api_service_from_yaml(config.path().to_str().unwrap())
        .unwrap();

    let target = registry.lookup_file("acme/library.proto").unwrap();
    let err = SwaggerGenerator::new(&registry)
        .generate(&[target.clone()])
        .unwrap_err();
    assert!(err.to_string().contains("repeated field tags"));

    registry.set_allow_repeated_fields_in_body(true);
    assert!(SwaggerGenerator::new(&registry).generate(&[target]).is_ok());
}
