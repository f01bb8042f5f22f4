//! Descriptor registry for protoc-gen-swagger
//!
//! The registry owns the reflective descriptor pool built from a decoded
//! `CodeGeneratorRequest` and every setting the generator consults while
//! building documents. Settings are applied through dedicated setters by the
//! orchestrator after parameter resolution; the only setter that can fail is
//! the repeated-path-parameter separator.

mod apiconfig;

use std::collections::HashMap;

use prost_reflect::{DescriptorPool, FileDescriptor};
use prost_types::compiler::CodeGeneratorRequest;
use prost_types::FileDescriptorSet;
use swagger_gen_common::{PathParamSeparator, PluginError, Result};

pub use apiconfig::{HttpMethod, HttpRule};

/// Capability surface the plugin driver needs from a descriptor registry.
pub trait DescriptorSource {
    /// Build the descriptor pool from a decoded request envelope.
    fn load(&mut self, request: &CodeGeneratorRequest) -> Result<()>;

    /// Resolve one generation target path to its file descriptor.
    fn lookup_file(&self, path: &str) -> Result<FileDescriptor>;
}

/// Registry of file descriptors plus the resolved generation settings.
pub struct Registry {
    pool: DescriptorPool,
    import_prefix: String,
    pkg_map: HashMap<String, String>,
    allow_delete_body: bool,
    allow_merge: bool,
    merge_file_name: String,
    use_json_names_for_fields: bool,
    allow_repeated_fields_in_body: bool,
    include_package_in_tags: bool,
    use_fqn_for_swagger_name: bool,
    wrap_resp_code: bool,
    path_param_separator: PathParamSeparator,
    api_config_rules: HashMap<String, HttpRule>,
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

impl Registry {
    pub fn new() -> Self {
        Self {
            pool: DescriptorPool::new(),
            import_prefix: String::new(),
            pkg_map: HashMap::new(),
            allow_delete_body: false,
            allow_merge: false,
            merge_file_name: "apidocs".to_string(),
            use_json_names_for_fields: false,
            allow_repeated_fields_in_body: false,
            include_package_in_tags: false,
            use_fqn_for_swagger_name: false,
            wrap_resp_code: false,
            path_param_separator: PathParamSeparator::default(),
            api_config_rules: HashMap::new(),
        }
    }

    /// The reflective descriptor pool for all files in the request.
    pub fn pool(&self) -> &DescriptorPool {
        &self.pool
    }

    pub fn set_prefix(&mut self, prefix: &str) {
        self.import_prefix = prefix.to_string();
    }

    pub fn import_prefix(&self) -> &str {
        &self.import_prefix
    }

    /// Record a go-package override for one proto import path.
    pub fn add_pkg_map(&mut self, file: &str, pkg: &str) {
        self.pkg_map.insert(file.to_string(), pkg.to_string());
    }

    pub fn pkg_map(&self) -> &HashMap<String, String> {
        &self.pkg_map
    }

    pub fn set_allow_delete_body(&mut self, allow: bool) {
        self.allow_delete_body = allow;
    }

    pub fn allow_delete_body(&self) -> bool {
        self.allow_delete_body
    }

    pub fn set_allow_merge(&mut self, allow: bool) {
        self.allow_merge = allow;
    }

    pub fn allow_merge(&self) -> bool {
        self.allow_merge
    }

    pub fn set_merge_file_name(&mut self, name: &str) {
        self.merge_file_name = name.to_string();
    }

    pub fn merge_file_name(&self) -> &str {
        &self.merge_file_name
    }

    pub fn set_use_json_names_for_fields(&mut self, use_json_names: bool) {
        self.use_json_names_for_fields = use_json_names;
    }

    pub fn use_json_names_for_fields(&self) -> bool {
        self.use_json_names_for_fields
    }

    pub fn set_allow_repeated_fields_in_body(&mut self, allow: bool) {
        self.allow_repeated_fields_in_body = allow;
    }

    pub fn allow_repeated_fields_in_body(&self) -> bool {
        self.allow_repeated_fields_in_body
    }

    pub fn set_include_package_in_tags(&mut self, include: bool) {
        self.include_package_in_tags = include;
    }

    pub fn include_package_in_tags(&self) -> bool {
        self.include_package_in_tags
    }

    pub fn set_use_fqn_for_swagger_name(&mut self, use_fqn: bool) {
        self.use_fqn_for_swagger_name = use_fqn;
    }

    pub fn use_fqn_for_swagger_name(&self) -> bool {
        self.use_fqn_for_swagger_name
    }

    pub fn set_wrap_resp_code(&mut self, wrap: bool) {
        self.wrap_resp_code = wrap;
    }

    pub fn wrap_resp_code(&self) -> bool {
        self.wrap_resp_code
    }

    /// Parse and apply the repeated-path-parameter separator token.
    ///
    /// Unknown tokens are a configuration error; the orchestrator surfaces
    /// them as an error response instead of continuing with the default.
    pub fn set_repeated_path_param_separator(&mut self, separator: &str) -> Result<()> {
        self.path_param_separator = separator.parse()?;
        Ok(())
    }

    pub fn path_param_separator(&self) -> PathParamSeparator {
        self.path_param_separator
    }

    /// Load a gRPC API Configuration from a YAML file and index its HTTP
    /// rules by fully-qualified method selector.
    pub fn load_grpc_api_service_from_yaml(&mut self, path: &str) -> Result<()> {
        self.api_config_rules = apiconfig::load_from_yaml(path)?;
        Ok(())
    }

    /// The HTTP rule configured for a method selector, if any.
    pub fn api_http_rule(&self, selector: &str) -> Option<&HttpRule> {
        self.api_config_rules.get(selector)
    }
}

impl DescriptorSource for Registry {
    fn load(&mut self, request: &CodeGeneratorRequest) -> Result<()> {
        let set = FileDescriptorSet {
            file: request.proto_file.clone(),
        };
        self.pool = DescriptorPool::from_file_descriptor_set(set)
            .map_err(|e| PluginError::Parse(format!("failed to build descriptor pool: {e}")))?;
        Ok(())
    }

    fn lookup_file(&self, path: &str) -> Result<FileDescriptor> {
        self.pool
            .get_file_by_name(path)
            .ok_or_else(|| PluginError::Parse(format!("no such file: {path}")))
    }
}
