//! Request and response envelope codec
//!
//! The request arrives binary-encoded on stdin (or in a named file); the
//! response leaves binary-encoded on stdout, exactly once per invocation.
//! Failures in here have no error-response channel, so they are fatal to the
//! process.

use std::fs;
use std::io::{self, Read, Write};

use anyhow::{Context, Result};
use prost::Message;
use prost_types::compiler::{code_generator_response, CodeGeneratorRequest, CodeGeneratorResponse};
use swagger_gen_common::GeneratedFile;

/// Read the raw request bytes from stdin, or from `source` when it names a
/// file other than `-`.
pub fn read_request_bytes(source: &str) -> Result<Vec<u8>> {
    if source == "-" {
        let mut buf = Vec::new();
        io::stdin()
            .read_to_end(&mut buf)
            .context("failed to read code generator request from stdin")?;
        Ok(buf)
    } else {
        fs::read(source).with_context(|| format!("failed to read code generator request from {source}"))
    }
}

pub fn decode_request(bytes: &[u8]) -> Result<CodeGeneratorRequest> {
    CodeGeneratorRequest::decode(bytes).context("malformed code generator request")
}

/// Encode a success response carrying the generated files verbatim and in
/// order.
pub fn emit_files(files: &[GeneratedFile]) -> Result<()> {
    let response = CodeGeneratorResponse {
        file: files
            .iter()
            .map(|f| code_generator_response::File {
                name: Some(f.name.clone()),
                content: Some(f.content.clone()),
                ..Default::default()
            })
            .collect(),
        ..Default::default()
    };
    emit_response(&response)
}

/// Encode an error response; the process still exits cleanly so the
/// toolchain can read the structured error.
pub fn emit_error(message: &str) -> Result<()> {
    let response = CodeGeneratorResponse {
        error: Some(message.to_string()),
        ..Default::default()
    };
    emit_response(&response)
}

fn emit_response(response: &CodeGeneratorResponse) -> Result<()> {
    let mut buf = Vec::with_capacity(response.encoded_len());
    response
        .encode(&mut buf)
        .context("failed to encode code generator response")?;
    io::stdout()
        .write_all(&buf)
        .context("failed to write code generator response to stdout")?;
    Ok(())
}
