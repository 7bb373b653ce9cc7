// src/types/resume.rs
use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde_json::{Map, Value};

use crate::core::sanitizer::sanitize;

/// A resume file as uploaded by the user
#[derive(Debug, Clone)]
pub struct ResumeUpload {
    pub filename: String,
    pub bytes: Vec<u8>,
}

impl ResumeUpload {
    pub fn new(filename: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            filename: filename.into(),
            bytes,
        }
    }

    pub fn encode_base64(&self) -> String {
        STANDARD.encode(&self.bytes)
    }

    pub fn size(&self) -> usize {
        self.bytes.len()
    }
}

/// Rendered template output. Only the raw HTML is stored; the display copy is
/// derived from it on demand.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedOutput {
    raw: String,
}

impl RenderedOutput {
    pub fn new(raw: String) -> Self {
        Self { raw }
    }

    pub fn raw(&self) -> &str {
        &self.raw
    }

    pub fn sanitized(&self) -> String {
        sanitize(&self.raw)
    }
}

/// Result of one successful pass through the processing pipeline
#[derive(Debug, Clone)]
pub struct ProcessingOutcome {
    pub data: Map<String, Value>,
    pub output: RenderedOutput,
}

impl ProcessingOutcome {
    /// Split into (extracted data, raw HTML, sanitized HTML)
    pub fn into_parts(self) -> (Map<String, Value>, String, String) {
        let sanitized = self.output.sanitized();
        (self.data, self.output.raw, sanitized)
    }
}
