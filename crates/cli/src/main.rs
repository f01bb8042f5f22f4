//! protoc-gen-swagger
//!
//! protoc plugin that generates OpenAPI 2.0 documents from gRPC service
//! definitions and optionally publishes them to a YApi instance.
//!
//! The pipeline is strictly sequential: decode the request, resolve
//! parameters, configure the registry, generate documents, encode the
//! response, then best-effort publish. Recoverable failures become an error
//! inside a valid response envelope; only an unreadable request or an
//! unwritable response kills the process.

mod codec;
mod driver;
mod params;
mod publish;

use anyhow::{Context, Result};
use clap::Parser;
use prost_types::compiler::CodeGeneratorRequest;
use swagger_gen_common::Config;
use swagger_gen_generator::SwaggerGenerator;
use swagger_gen_registry::{DescriptorSource, Registry};
use tracing_subscriber::EnvFilter;

const VERSION: &str = env!("CARGO_PKG_VERSION");

// Stamped by the release pipeline; plain builds report unknown.
const COMMIT: &str = match option_env!("SWAGGER_GEN_COMMIT") {
    Some(commit) => commit,
    None => "unknown",
};
const BUILD_DATE: &str = match option_env!("SWAGGER_GEN_BUILD_DATE") {
    Some(date) => date,
    None => "unknown",
};

#[derive(Parser, Debug)]
#[command(
    name = "protoc-gen-swagger",
    disable_version_flag = true,
    about = "Generate OpenAPI 2.0 documents from gRPC service definitions"
)]
struct Flags {
    /// Where to load the code generator request from; `-` means stdin
    #[arg(long, default_value = "-")]
    file: String,

    /// Prefix to be added to go package paths for imported proto files
    #[arg(long = "import_prefix", default_value = "")]
    import_prefix: String,

    /// Unless set, HTTP DELETE methods may not have a body
    #[arg(long = "allow_delete_body")]
    allow_delete_body: bool,

    /// Path to gRPC API Configuration in YAML format
    #[arg(long = "grpc_api_configuration", default_value = "")]
    grpc_api_configuration: String,

    /// If set, generate one swagger file out of multiple protos
    #[arg(long = "allow_merge")]
    allow_merge: bool,

    /// If set, save the raw request to req.bin for debugging
    #[arg(long = "allow_save")]
    allow_save: bool,

    /// YApi host to publish generated documents to
    #[arg(long = "yapi_url", default_value = "")]
    yapi_url: String,

    /// URL schema for the YApi host (http or https)
    #[arg(long = "yapi_schema", default_value = "")]
    yapi_schema: String,

    /// YApi project token
    #[arg(long = "yapi_token", default_value = "")]
    yapi_token: String,

    /// YApi merge strategy: normal (add), good (reconcile) or merge (overwrite)
    #[arg(long = "yapi_merge", default_value = "")]
    yapi_merge: String,

    /// If set, wrap each success response schema in a {code, message, data} object
    #[arg(long = "wrap_code")]
    wrap_code: bool,

    /// Target swagger file name prefix after merge
    #[arg(long = "merge_file_name", default_value = "apidocs")]
    merge_file_name: String,

    /// Use Field.json_name instead of Field.name in generated definitions
    #[arg(long = "json_names_for_fields")]
    json_names_for_fields: bool,

    /// How repeated fields should be split: csv, pipes, ssv or tsv
    #[arg(long = "repeated_path_param_separator", default_value = "csv")]
    repeated_path_param_separator: String,

    /// Allow repeated fields in the body of a google.api.http binding
    #[arg(long = "allow_repeated_fields_in_body")]
    allow_repeated_fields_in_body: bool,

    /// Prepend the proto package to the service name in operation tags
    #[arg(long = "include_package_in_tags")]
    include_package_in_tags: bool,

    /// Use fully-qualified proto names for swagger definition names
    #[arg(long = "fqn_for_swagger_name")]
    fqn_for_swagger_name: bool,

    /// Print the current version and exit
    #[arg(long)]
    version: bool,
}

impl Flags {
    /// Baseline configuration before parameter-string overrides.
    ///
    /// A bad yapi_merge or separator flag is deferred to the same resolution
    /// and configuration steps that validate parameter-string values, so it
    /// surfaces as a structured error response instead of a flag error.
    fn to_config(&self) -> swagger_gen_common::Result<Config> {
        let mut config = Config {
            file: self.file.clone(),
            import_prefix: self.import_prefix.clone(),
            allow_delete_body: self.allow_delete_body,
            grpc_api_configuration: self.grpc_api_configuration.clone(),
            allow_merge: self.allow_merge,
            allow_save: self.allow_save,
            yapi_url: self.yapi_url.clone(),
            yapi_schema: self.yapi_schema.clone(),
            yapi_token: self.yapi_token.clone(),
            wrap_code: self.wrap_code,
            merge_file_name: self.merge_file_name.clone(),
            json_names_for_fields: self.json_names_for_fields,
            repeated_path_param_separator: self.repeated_path_param_separator.clone(),
            allow_repeated_fields_in_body: self.allow_repeated_fields_in_body,
            include_package_in_tags: self.include_package_in_tags,
            fqn_for_swagger_name: self.fqn_for_swagger_name,
            ..Default::default()
        };
        config.set("yapi_merge", &self.yapi_merge)?;
        Ok(config)
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let flags = Flags::parse();
    if flags.version {
        println!("Version {VERSION}, commit {COMMIT}, built at {BUILD_DATE}");
        return Ok(());
    }

    let raw = codec::read_request_bytes(&flags.file)?;
    let request = codec::decode_request(&raw)?;
    tracing::debug!(
        targets = request.file_to_generate.len(),
        files = request.proto_file.len(),
        "decoded code generator request"
    );

    run(&request, &raw, &flags)
}

fn run(request: &CodeGeneratorRequest, raw: &[u8], flags: &Flags) -> Result<()> {
    let base = match flags.to_config() {
        Ok(base) => base,
        Err(e) => return codec::emit_error(&e.to_string()),
    };

    let (config, pkg_map) = match params::resolve(request.parameter.as_deref(), &base) {
        Ok(resolved) => resolved,
        Err(e) => {
            tracing::error!(error = %e, parameter = ?request.parameter, "failed to resolve plugin parameters");
            return codec::emit_error(&e.to_string());
        }
    };

    if config.allow_save {
        save_request_dump(raw);
    }

    let mut registry = Registry::new();
    if let Err(e) = configure_registry(&mut registry, &config, &pkg_map) {
        tracing::error!(error = %e, "failed to configure registry");
        return codec::emit_error(&e.to_string());
    }
    if let Err(e) = registry.load(request) {
        tracing::error!(error = %e, "failed to load descriptors");
        return codec::emit_error(&e.to_string());
    }

    // an unresolvable generation target means the envelope itself is
    // inconsistent; there is no useful error response for that
    let mut targets = Vec::with_capacity(request.file_to_generate.len());
    for path in &request.file_to_generate {
        let file = registry
            .lookup_file(path)
            .with_context(|| format!("unknown generation target {path}"))?;
        targets.push(file);
    }

    let generator = SwaggerGenerator::new(&registry);
    match driver::run_generation(&generator, &targets) {
        Ok(files) => {
            codec::emit_files(&files)?;
            publish::publish_all(&config, &files);
            Ok(())
        }
        Err(e) => {
            tracing::error!(error = %e, "generation failed");
            codec::emit_error(&e.to_string())
        }
    }
}

/// Apply every resolved setting onto the registry.
///
/// The separator setter and the YAML loader are the only fallible steps;
/// either failure aborts the invocation with an error response.
fn configure_registry(
    registry: &mut Registry,
    config: &Config,
    pkg_map: &[(String, String)],
) -> swagger_gen_common::Result<()> {
    registry.set_prefix(&config.import_prefix);
    registry.set_allow_delete_body(config.allow_delete_body);
    registry.set_allow_merge(config.allow_merge);
    registry.set_merge_file_name(&config.merge_file_name);
    registry.set_use_json_names_for_fields(config.json_names_for_fields);
    registry.set_allow_repeated_fields_in_body(config.allow_repeated_fields_in_body);
    registry.set_include_package_in_tags(config.include_package_in_tags);
    registry.set_use_fqn_for_swagger_name(config.fqn_for_swagger_name);
    registry.set_wrap_resp_code(config.wrap_code);
    registry.set_repeated_path_param_separator(&config.repeated_path_param_separator)?;
    for (file, pkg) in pkg_map {
        registry.add_pkg_map(file, pkg);
    }
    if !config.grpc_api_configuration.is_empty() {
        registry.load_grpc_api_service_from_yaml(&config.grpc_api_configuration)?;
    }
    Ok(())
}

/// Debug side channel; failures are logged, never fatal.
fn save_request_dump(raw: &[u8]) {
    match std::fs::write("req.bin", raw) {
        Ok(()) => tracing::info!(bytes = raw.len(), "saved request dump to req.bin"),
        Err(e) => tracing::warn!(error = %e, "failed to save request dump"),
    }
}
