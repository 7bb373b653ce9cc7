// src/types/response.rs
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// JSON body sent to the processing endpoint
#[derive(Debug, Serialize)]
pub struct ResumeSubmission<'a> {
    pub resume_filename: &'a str,
    pub resume_base64_encoded: &'a str,
}

/// Envelope returned by the processing endpoint; only `data` is read
#[derive(Debug, Deserialize)]
pub struct ProcessingResponse {
    #[serde(default)]
    pub data: Option<Value>,
}

/// Status and body of a completed HTTP exchange, before validation
#[derive(Debug, Clone)]
pub struct RawResponse {
    pub status: u16,
    pub body: String,
}
