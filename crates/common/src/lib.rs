//! Common types and utilities for protoc-gen-swagger
//!
//! This crate contains the shared error type, the plugin configuration
//! struct, and the generated-file pair used across the registry, generator,
//! and CLI components.

use thiserror::Error;

mod config;

pub use config::{Config, MergeStrategy, PathParamSeparator};

/// Errors that can occur while processing a code generator request
#[derive(Error, Debug)]
pub enum PluginError {
    #[error("parameter parse error: {0}")]
    Parse(String),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("generation error: {0}")]
    Generation(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type for plugin operations
pub type Result<T> = std::result::Result<T, PluginError>;

/// One generated output file: a logical output name plus the serialized
/// document content, exactly as it will appear in the response envelope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedFile {
    pub name: String,
    pub content: String,
}

impl GeneratedFile {
    pub fn new(name: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            content: content.into(),
        }
    }
}
