// src/types/artifact.rs
//! Downloadable files produced from a processing run

use serde_json::{Map, Value};
use std::str::FromStr;

use crate::core::FsOps;
use crate::types::resume::{ProcessingOutcome, ResumeUpload};

const DEFAULT_STEM: &str = "resume";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArtifactKind {
    Html,
    Json,
    Base64,
}

impl ArtifactKind {
    pub const ALL: [ArtifactKind; 3] = [ArtifactKind::Html, ArtifactKind::Json, ArtifactKind::Base64];

    pub fn as_str(self) -> &'static str {
        match self {
            ArtifactKind::Html => "html",
            ArtifactKind::Json => "json",
            ArtifactKind::Base64 => "base64",
        }
    }

    fn suffix(self) -> &'static str {
        match self {
            ArtifactKind::Html => "_formatted.html",
            ArtifactKind::Json => "_data.json",
            ArtifactKind::Base64 => "_base64.txt",
        }
    }

    pub fn mime(self) -> &'static str {
        match self {
            ArtifactKind::Html => "text/html",
            ArtifactKind::Json => "application/json",
            ArtifactKind::Base64 => "text/plain",
        }
    }
}

impl FromStr for ArtifactKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "html" => Ok(ArtifactKind::Html),
            "json" => Ok(ArtifactKind::Json),
            "base64" => Ok(ArtifactKind::Base64),
            other => Err(format!("Unknown artifact kind: {}", other)),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Artifact {
    pub kind: ArtifactKind,
    pub file_name: String,
    pub content: String,
}

impl Artifact {
    pub fn html(source_name: &str, raw_html: &str) -> Self {
        Self::named(ArtifactKind::Html, source_name, raw_html.to_string())
    }

    pub fn json(source_name: &str, data: &Map<String, Value>) -> serde_json::Result<Self> {
        let content = serde_json::to_string_pretty(data)?;
        Ok(Self::named(ArtifactKind::Json, source_name, content))
    }

    pub fn base64(upload: &ResumeUpload) -> Self {
        Self::named(ArtifactKind::Base64, &upload.filename, upload.encode_base64())
    }

    /// Build one artifact of the given kind
    pub fn build(
        kind: ArtifactKind,
        upload: &ResumeUpload,
        outcome: &ProcessingOutcome,
    ) -> serde_json::Result<Self> {
        match kind {
            ArtifactKind::Html => Ok(Self::html(&upload.filename, outcome.output.raw())),
            ArtifactKind::Json => Self::json(&upload.filename, &outcome.data),
            ArtifactKind::Base64 => Ok(Self::base64(upload)),
        }
    }

    pub fn mime(&self) -> &'static str {
        self.kind.mime()
    }

    fn named(kind: ArtifactKind, source_name: &str, content: String) -> Self {
        let stem = FsOps::file_stem_or(source_name, DEFAULT_STEM);
        Self {
            kind,
            file_name: format!("{}{}", stem, kind.suffix()),
            content,
        }
    }
}
