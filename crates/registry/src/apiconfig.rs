//! gRPC API Configuration loading
//!
//! Parses the YAML service-configuration format (`google.api.Service` with an
//! `http.rules` section) and turns each rule into the internal `HttpRule`
//! representation the generator consumes. Rules are matched to methods by
//! fully-qualified selector, e.g. `acme.library.LibraryService.GetBook`.

use std::collections::HashMap;
use std::fs;

use serde::Deserialize;
use swagger_gen_common::{PluginError, Result};

/// HTTP methods an API-configuration rule can bind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Put,
    Post,
    Delete,
    Patch,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "get",
            HttpMethod::Put => "put",
            HttpMethod::Post => "post",
            HttpMethod::Delete => "delete",
            HttpMethod::Patch => "patch",
        }
    }
}

/// One resolved HTTP binding for an RPC method.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRule {
    pub method: HttpMethod,
    pub path: String,
    /// Request field mapped to the request body; `*` maps the whole message
    pub body: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ServiceConfig {
    #[serde(default)]
    http: Option<HttpConfig>,
}

#[derive(Debug, Deserialize)]
struct HttpConfig {
    #[serde(default)]
    rules: Vec<RuleConfig>,
}

#[derive(Debug, Deserialize)]
struct RuleConfig {
    selector: String,
    #[serde(default)]
    get: Option<String>,
    #[serde(default)]
    put: Option<String>,
    #[serde(default)]
    post: Option<String>,
    #[serde(default)]
    delete: Option<String>,
    #[serde(default)]
    patch: Option<String>,
    #[serde(default)]
    body: Option<String>,
}

/// Load HTTP rules from a YAML gRPC API Configuration file.
pub(crate) fn load_from_yaml(path: &str) -> Result<HashMap<String, HttpRule>> {
    let raw = fs::read_to_string(path).map_err(|e| {
        PluginError::Config(format!("failed to read gRPC API configuration {path}: {e}"))
    })?;
    let config: ServiceConfig = serde_yaml::from_str(&raw).map_err(|e| {
        PluginError::Config(format!(
            "failed to parse gRPC API configuration {path}: {e}"
        ))
    })?;

    let mut rules = HashMap::new();
    let Some(http) = config.http else {
        return Ok(rules);
    };
    for rule in http.rules {
        if rule.selector.is_empty() {
            return Err(PluginError::Config(format!(
                "http rule without selector in {path}"
            )));
        }
        let bindings = [
            (HttpMethod::Get, &rule.get),
            (HttpMethod::Put, &rule.put),
            (HttpMethod::Post, &rule.post),
            (HttpMethod::Delete, &rule.delete),
            (HttpMethod::Patch, &rule.patch),
        ];
        let mut bound = bindings
            .iter()
            .filter_map(|(method, pattern)| pattern.as_ref().map(|p| (*method, p.clone())));
        let Some((method, pattern)) = bound.next() else {
            return Err(PluginError::Config(format!(
                "http rule for {} binds no method pattern",
                rule.selector
            )));
        };
        if bound.next().is_some() {
            return Err(PluginError::Config(format!(
                "http rule for {} binds more than one method pattern",
                rule.selector
            )));
        }
        let body = rule.body.filter(|b| !b.is_empty());
        rules.insert(
            rule.selector.clone(),
            HttpRule {
                method,
                path: pattern,
                body,
            },
        );
    }
    Ok(rules)
}
