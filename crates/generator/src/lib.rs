//! OpenAPI 2.0 document generation
//!
//! Transforms resolved file descriptors into swagger documents: one document
//! per generation target, or a single merged document when the registry is
//! configured with `allow_merge`.

mod paths;
mod schema;
pub mod types;

use std::collections::BTreeMap;

use prost_reflect::FileDescriptor;
use swagger_gen_common::{GeneratedFile, Result};
use swagger_gen_registry::Registry;

use types::{Info, SwaggerDocument};

/// Swagger document generator
///
/// Borrows the configured registry for the duration of one invocation; the
/// registry must be fully configured and loaded before `generate` runs.
pub struct SwaggerGenerator<'a> {
    registry: &'a Registry,
}

impl<'a> SwaggerGenerator<'a> {
    pub fn new(registry: &'a Registry) -> Self {
        Self { registry }
    }

    /// Generate output files for the ordered list of targets.
    ///
    /// Target order is preserved in the output. Any error aborts the whole
    /// call with no partial results.
    pub fn generate(&self, targets: &[FileDescriptor]) -> Result<Vec<GeneratedFile>> {
        let mut documents = Vec::with_capacity(targets.len());
        for target in targets {
            documents.push((target.name().to_string(), self.build_document(target)?));
        }

        if self.registry.allow_merge() {
            let merged = merge_documents(self.registry.merge_file_name(), documents);
            let name = format!("{}.swagger.json", self.registry.merge_file_name());
            return Ok(vec![GeneratedFile::new(name, serialize(&merged)?)]);
        }

        documents
            .into_iter()
            .map(|(target, document)| {
                Ok(GeneratedFile::new(output_name(&target), serialize(&document)?))
            })
            .collect()
    }

    fn build_document(&self, file: &FileDescriptor) -> Result<SwaggerDocument> {
        let mut definitions = BTreeMap::new();
        let paths = paths::build_paths(self.registry, file, &mut definitions)?;
        Ok(SwaggerDocument {
            swagger: "2.0".to_string(),
            info: Info {
                title: file.name().to_string(),
                version: "version not set".to_string(),
            },
            consumes: vec!["application/json".to_string()],
            produces: vec!["application/json".to_string()],
            paths,
            definitions,
        })
    }
}

/// Fold per-target documents into one; the first document wins on path and
/// definition collisions.
fn merge_documents(title: &str, documents: Vec<(String, SwaggerDocument)>) -> SwaggerDocument {
    let mut merged = SwaggerDocument {
        swagger: "2.0".to_string(),
        info: Info {
            title: title.to_string(),
            version: "version not set".to_string(),
        },
        consumes: vec!["application/json".to_string()],
        produces: vec!["application/json".to_string()],
        paths: BTreeMap::new(),
        definitions: BTreeMap::new(),
    };
    for (_, document) in documents {
        for (path, item) in document.paths {
            merged.paths.entry(path).or_insert(item);
        }
        for (name, schema) in document.definitions {
            merged.definitions.entry(name).or_insert(schema);
        }
    }
    merged
}

/// `a/b/c.proto` becomes `a/b/c.swagger.json`.
fn output_name(target: &str) -> String {
    let stem = target.strip_suffix(".proto").unwrap_or(target);
    format!("{stem}.swagger.json")
}

fn serialize(document: &SwaggerDocument) -> Result<String> {
    let mut content = serde_json::to_string_pretty(document)?;
    content.push('\n');
    Ok(content)
}
