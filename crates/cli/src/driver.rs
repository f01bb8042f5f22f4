//! Generation driver
//!
//! The document generator is an external collaborator behind a one-method
//! trait: ordered targets in, ordered files or a single error out. The
//! driver invokes it exactly once per request and accepts no partial
//! results.

use prost_reflect::FileDescriptor;
use swagger_gen_common::{GeneratedFile, Result};
use swagger_gen_generator::SwaggerGenerator;

#[cfg_attr(test, mockall::automock)]
pub trait DocumentGenerator {
    fn generate(&self, targets: &[FileDescriptor]) -> Result<Vec<GeneratedFile>>;
}

impl DocumentGenerator for SwaggerGenerator<'_> {
    fn generate(&self, targets: &[FileDescriptor]) -> Result<Vec<GeneratedFile>> {
        SwaggerGenerator::generate(self, targets)
    }
}

pub fn run_generation<G: DocumentGenerator>(
    generator: &G,
    targets: &[FileDescriptor],
) -> Result<Vec<GeneratedFile>> {
    generator.generate(targets)
}
