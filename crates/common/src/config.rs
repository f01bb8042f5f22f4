//! Plugin configuration
//!
//! All settings the plugin understands, defaulted from CLI flags and then
//! overridden by the request's parameter string. The struct is resolved once
//! per invocation and never mutated after generation starts.

use std::fmt;
use std::str::FromStr;

use crate::{PluginError, Result};

/// Merge strategy forwarded to the YApi import endpoint.
///
/// The remote service interprets the strategy; the plugin only validates the
/// token and forwards it verbatim.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergeStrategy {
    /// Add new entries without overwriting existing ones
    Normal,
    /// Heuristic reconciling merge
    Good,
    /// Full overwrite
    Merge,
}

impl MergeStrategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            MergeStrategy::Normal => "normal",
            MergeStrategy::Good => "good",
            MergeStrategy::Merge => "merge",
        }
    }
}

impl FromStr for MergeStrategy {
    type Err = PluginError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "normal" => Ok(MergeStrategy::Normal),
            "good" => Ok(MergeStrategy::Good),
            "merge" => Ok(MergeStrategy::Merge),
            other => Err(PluginError::Parse(format!(
                "unknown yapi merge strategy: {other}"
            ))),
        }
    }
}

impl fmt::Display for MergeStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How repeated fields are joined when rendered as a single path or query
/// parameter. Maps onto the swagger `collectionFormat` values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PathParamSeparator {
    #[default]
    Csv,
    Pipes,
    Ssv,
    Tsv,
}

impl PathParamSeparator {
    pub fn collection_format(&self) -> &'static str {
        match self {
            PathParamSeparator::Csv => "csv",
            PathParamSeparator::Pipes => "pipes",
            PathParamSeparator::Ssv => "ssv",
            PathParamSeparator::Tsv => "tsv",
        }
    }
}

impl FromStr for PathParamSeparator {
    type Err = PluginError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "csv" => Ok(PathParamSeparator::Csv),
            "pipes" => Ok(PathParamSeparator::Pipes),
            "ssv" => Ok(PathParamSeparator::Ssv),
            "tsv" => Ok(PathParamSeparator::Tsv),
            other => Err(PluginError::Config(format!(
                "unknown repeated path parameter separator: {other}"
            ))),
        }
    }
}

/// The full set of plugin settings.
///
/// `repeated_path_param_separator` is carried in its raw string form; the
/// registry's setter is the single place that parses and rejects it, so a bad
/// separator surfaces as a configuration error response rather than a flag
/// parse failure.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Where to load the code generator request from; `-` means stdin
    pub file: String,
    /// Prefix added to go package paths of imported proto files
    pub import_prefix: String,
    /// Allow HTTP DELETE methods to carry a body
    pub allow_delete_body: bool,
    /// Path to a gRPC API Configuration in YAML format
    pub grpc_api_configuration: String,
    /// Generate one swagger file out of multiple protos
    pub allow_merge: bool,
    /// Save the raw request to req.bin for debugging
    pub allow_save: bool,
    pub yapi_url: String,
    pub yapi_schema: String,
    pub yapi_token: String,
    pub yapi_merge: Option<MergeStrategy>,
    /// Wrap each success response schema in a `{code, message, data}` object
    pub wrap_code: bool,
    /// Target swagger file name prefix after merge
    pub merge_file_name: String,
    /// Use the field's JSON name instead of the proto name in definitions
    pub json_names_for_fields: bool,
    pub repeated_path_param_separator: String,
    /// Allow repeated fields in `body` of an HTTP rule
    pub allow_repeated_fields_in_body: bool,
    /// Prepend the proto package to the service name in operation tags
    pub include_package_in_tags: bool,
    /// Use fully-qualified proto names for swagger definition names
    pub fqn_for_swagger_name: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            file: "-".to_string(),
            import_prefix: String::new(),
            allow_delete_body: false,
            grpc_api_configuration: String::new(),
            allow_merge: false,
            allow_save: false,
            yapi_url: String::new(),
            yapi_schema: String::new(),
            yapi_token: String::new(),
            yapi_merge: None,
            wrap_code: false,
            merge_file_name: "apidocs".to_string(),
            json_names_for_fields: false,
            repeated_path_param_separator: "csv".to_string(),
            allow_repeated_fields_in_body: false,
            include_package_in_tags: false,
            fqn_for_swagger_name: false,
        }
    }
}

impl Config {
    /// Set a configuration key by name.
    ///
    /// This is the single mutation point used by the parameter resolver. An
    /// empty value assigns the key's zero value, which is distinct from not
    /// setting the key at all. Unknown names and unparsable values are parse
    /// errors.
    pub fn set(&mut self, name: &str, value: &str) -> Result<()> {
        match name {
            "file" => self.file = value.to_string(),
            "import_prefix" => self.import_prefix = value.to_string(),
            "allow_delete_body" => self.allow_delete_body = parse_bool(name, value)?,
            "grpc_api_configuration" => self.grpc_api_configuration = value.to_string(),
            "allow_merge" => self.allow_merge = parse_bool(name, value)?,
            "allow_save" => self.allow_save = parse_bool(name, value)?,
            "yapi_url" => self.yapi_url = value.to_string(),
            "yapi_schema" => self.yapi_schema = value.to_string(),
            "yapi_token" => self.yapi_token = value.to_string(),
            "yapi_merge" => {
                self.yapi_merge = if value.is_empty() {
                    None
                } else {
                    Some(value.parse()?)
                }
            }
            "wrap_code" => self.wrap_code = parse_bool(name, value)?,
            "merge_file_name" => self.merge_file_name = value.to_string(),
            "json_names_for_fields" => self.json_names_for_fields = parse_bool(name, value)?,
            "repeated_path_param_separator" => {
                self.repeated_path_param_separator = value.to_string()
            }
            "allow_repeated_fields_in_body" => {
                self.allow_repeated_fields_in_body = parse_bool(name, value)?
            }
            "include_package_in_tags" => self.include_package_in_tags = parse_bool(name, value)?,
            "fqn_for_swagger_name" => self.fqn_for_swagger_name = parse_bool(name, value)?,
            other => {
                return Err(PluginError::Parse(format!(
                    "unknown configuration key: {other}"
                )))
            }
        }
        Ok(())
    }

    /// True when every setting needed for a YApi upload is present.
    pub fn yapi_configured(&self) -> bool {
        !self.yapi_url.is_empty()
            && !self.yapi_schema.is_empty()
            && !self.yapi_token.is_empty()
            && self.yapi_merge.is_some()
    }
}

/// Boolean settings accept `true`, `false`, or the empty string (zero value).
fn parse_bool(name: &str, value: &str) -> Result<bool> {
    match value {
        "" | "false" => Ok(false),
        "true" => Ok(true),
        other => Err(PluginError::Parse(format!(
            "invalid boolean value for {name}: {other}"
        ))),
    }
}
