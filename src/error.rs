// src/error.rs
//! Error kinds surfaced by the formatting pipeline

use std::path::PathBuf;
use thiserror::Error;

pub type FormatterResult<T> = std::result::Result<T, FormatterError>;

#[derive(Debug, Error)]
pub enum FormatterError {
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid archive: {0}")]
    Archive(String),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("API error {status}: {body}")]
    Api { status: u16, body: String },

    #[error("Invalid API response: {0}")]
    InvalidResponse(String),

    #[error("Template syntax error: {0}")]
    TemplateSyntax(String),

    #[error("Missing configuration: {0}")]
    MissingConfiguration(&'static str),

    #[error("Invalid template name: {0:?}")]
    InvalidTemplateName(String),

    #[error("Template not found: {0}")]
    TemplateNotFound(String),

    #[error("Session not found: {0}")]
    SessionNotFound(String),

    #[error("Missing input: {0}")]
    MissingInput(&'static str),

    #[error("Invalid upload: {0}")]
    InvalidUpload(&'static str),
}

impl FormatterError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Stable machine-readable code used in API error bodies
    pub fn code(&self) -> &'static str {
        match self {
            Self::Io { .. } => "IO_ERROR",
            Self::Archive(_) => "ARCHIVE_ERROR",
            Self::Network(_) => "NETWORK_ERROR",
            Self::Api { .. } => "API_ERROR",
            Self::InvalidResponse(_) => "INVALID_RESPONSE",
            Self::TemplateSyntax(_) => "TEMPLATE_SYNTAX_ERROR",
            Self::MissingConfiguration(_) => "MISSING_CONFIGURATION",
            Self::InvalidTemplateName(_) => "INVALID_TEMPLATE_NAME",
            Self::TemplateNotFound(_) => "TEMPLATE_NOT_FOUND",
            Self::SessionNotFound(_) => "SESSION_NOT_FOUND",
            Self::MissingInput(_) => "MISSING_INPUT",
            Self::InvalidUpload(_) => "INVALID_UPLOAD",
        }
    }

    /// Hints shown to the user alongside the error
    pub fn suggestions(&self) -> Vec<String> {
        let hints: &[&str] = match self {
            Self::Io { .. } => &["Check the templates directory exists and is writable"],
            Self::Archive(_) => &["Make sure the upload is a valid ZIP file"],
            Self::Network(_) => &[
                "Check if your API endpoint is running",
                "Verify the URL format (include https://)",
            ],
            Self::Api { .. } => &["Ensure the API key is correct", "Check the endpoint logs"],
            Self::InvalidResponse(_) => &["Ensure the API returns JSON with a top-level data field"],
            Self::TemplateSyntax(_) => &[
                "Check Jinja2 template syntax",
                "Test with a simple template first",
            ],
            Self::MissingConfiguration(_) => &["Set PROMPTFLOW_ENDPOINT in the environment or .env"],
            Self::InvalidTemplateName(_) => &["Use a plain file name such as resume.html"],
            Self::TemplateNotFound(_) => &["List available templates with GET /api/templates"],
            Self::SessionNotFound(_) => &["Create a new session with POST /api/sessions"],
            Self::MissingInput(_) => &["Select a template and upload a resume before processing"],
            Self::InvalidUpload(_) => &["Upload the resume as a PDF file"],
        };
        hints.iter().map(|s| s.to_string()).collect()
    }
}
