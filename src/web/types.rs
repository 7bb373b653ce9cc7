// src/web/types.rs
use rocket::form::FromForm;
use rocket::fs::TempFile;
use rocket::http::{ContentType, Status};
use rocket::request::FromParam;
use rocket::response::{self, Responder};
use rocket::serde::json::Json;
use rocket::serde::{Deserialize, Serialize};
use rocket::{Request, Response};
use tracing::{error, warn};

use crate::config::AppConfig;
use crate::core::template_store::TemplateFailure;
use crate::core::{ResumeProcessor, TemplateStore};
use crate::error::{FormatterError, FormatterResult};
use crate::session::SessionStore;
use crate::types::{Artifact, ArtifactKind};

/// Shared server state handed to every handler
pub struct AppState {
    pub config: AppConfig,
    pub store: TemplateStore,
    pub sessions: SessionStore,
    processor: Option<ResumeProcessor>,
}

impl AppState {
    pub fn new(config: AppConfig) -> FormatterResult<Self> {
        let processor = match ResumeProcessor::new(&config.service, config.render) {
            Ok(processor) => Some(processor),
            Err(FormatterError::MissingConfiguration(what)) => {
                warn!("{} not configured, processing disabled", what);
                None
            }
            Err(e) => return Err(e),
        };

        Ok(Self {
            store: TemplateStore::new(config.paths.templates_path.clone()),
            sessions: SessionStore::with_limits(config.sessions),
            processor,
            config,
        })
    }

    pub fn processor(&self) -> FormatterResult<&ResumeProcessor> {
        self.processor
            .as_ref()
            .ok_or(FormatterError::MissingConfiguration("API endpoint"))
    }
}

// ===== Requests =====

#[derive(Deserialize)]
#[serde(crate = "rocket::serde")]
pub struct SaveTemplateRequest {
    pub name: String,
    pub content: String,
}

#[derive(Deserialize)]
#[serde(crate = "rocket::serde")]
pub struct SelectTemplateRequest {
    pub name: Option<String>,
    pub content: Option<String>,
}

#[derive(FromForm)]
pub struct ResumeUploadForm<'f> {
    pub resume: TempFile<'f>,
    pub filename: Option<String>,
}

#[derive(FromForm)]
pub struct ArchiveUploadForm<'f> {
    pub archive: TempFile<'f>,
}

// ===== Responses =====

#[derive(Serialize)]
#[serde(crate = "rocket::serde", rename_all = "lowercase")]
pub enum ResponseType {
    Data,
    Action,
    Error,
}

#[derive(Serialize)]
#[serde(crate = "rocket::serde")]
pub struct DataResponse<T> {
    #[serde(rename = "type")]
    pub response_type: ResponseType,
    pub success: bool,
    pub message: String,
    pub data: T,
}

impl<T> DataResponse<T> {
    pub fn success(message: impl Into<String>, data: T) -> Self {
        Self {
            response_type: ResponseType::Data,
            success: true,
            message: message.into(),
            data,
        }
    }
}

#[derive(Serialize)]
#[serde(crate = "rocket::serde")]
pub struct ActionResponse {
    #[serde(rename = "type")]
    pub response_type: ResponseType,
    pub success: bool,
    pub message: String,
    pub action: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_actions: Option<Vec<String>>,
}

impl ActionResponse {
    pub fn success(message: impl Into<String>, action: impl Into<String>) -> Self {
        Self {
            response_type: ResponseType::Action,
            success: true,
            message: message.into(),
            action: action.into(),
            next_actions: None,
        }
    }

    pub fn with_next_actions(mut self, next_actions: Vec<String>) -> Self {
        self.next_actions = Some(next_actions);
        self
    }
}

#[derive(Serialize)]
#[serde(crate = "rocket::serde")]
pub struct StandardErrorResponse {
    #[serde(rename = "type")]
    pub response_type: ResponseType,
    pub success: bool,
    pub error: String,
    pub error_code: String,
    pub suggestions: Vec<String>,
}

impl StandardErrorResponse {
    pub fn new(error: String, error_code: String, suggestions: Vec<String>) -> Self {
        Self {
            response_type: ResponseType::Error,
            success: false,
            error,
            error_code,
            suggestions,
        }
    }
}

#[derive(Serialize)]
#[serde(crate = "rocket::serde")]
pub struct HealthInfo {
    pub status: &'static str,
    pub endpoint_configured: bool,
    pub templates_dir: String,
    pub active_sessions: usize,
}

#[derive(Serialize)]
#[serde(crate = "rocket::serde")]
pub struct TemplateList {
    pub templates: Vec<String>,
    pub failures: Vec<TemplateFailure>,
}

#[derive(Serialize)]
#[serde(crate = "rocket::serde")]
pub struct TemplateContent {
    pub name: String,
    pub content: String,
}

#[derive(Serialize)]
#[serde(crate = "rocket::serde")]
pub struct ImportResult {
    pub templates: Vec<String>,
    pub failures: Vec<TemplateFailure>,
    pub saved: usize,
}

#[derive(Serialize)]
#[serde(crate = "rocket::serde")]
pub struct ProcessResult {
    pub resume_filename: String,
    pub data: serde_json::Value,
    pub html: String,
    pub downloads: Vec<String>,
}

/// Any pipeline error, rendered as a JSON body with a matching status
#[derive(Debug)]
pub struct ApiError(pub FormatterError);

pub type ApiResult<T> = Result<T, ApiError>;

impl From<FormatterError> for ApiError {
    fn from(e: FormatterError) -> Self {
        Self(e)
    }
}

impl ApiError {
    pub fn status(&self) -> Status {
        match &self.0 {
            FormatterError::Io { .. } => Status::InternalServerError,
            FormatterError::Archive(_) => Status::BadRequest,
            FormatterError::Network(e) if e.is_timeout() => Status::GatewayTimeout,
            FormatterError::Network(_) => Status::BadGateway,
            FormatterError::Api { .. } => Status::BadGateway,
            FormatterError::InvalidResponse(_) => Status::BadGateway,
            FormatterError::TemplateSyntax(_) => Status::UnprocessableEntity,
            FormatterError::MissingConfiguration(_) => Status::ServiceUnavailable,
            FormatterError::InvalidTemplateName(_) => Status::BadRequest,
            FormatterError::TemplateNotFound(_) => Status::NotFound,
            FormatterError::SessionNotFound(_) => Status::NotFound,
            FormatterError::MissingInput(_) => Status::BadRequest,
            FormatterError::InvalidUpload(_) => Status::BadRequest,
        }
    }
}

impl<'r> Responder<'r, 'static> for ApiError {
    fn respond_to(self, request: &'r Request<'_>) -> response::Result<'static> {
        let status = self.status();
        if status.code >= 500 {
            error!("{} {} failed: {}", request.method(), request.uri(), self.0);
        } else {
            warn!("{} {} rejected: {}", request.method(), request.uri(), self.0);
        }

        let body = StandardErrorResponse::new(
            self.0.to_string(),
            self.0.code().to_string(),
            self.0.suggestions(),
        );
        (status, Json(body)).respond_to(request)
    }
}

impl<'a> FromParam<'a> for ArtifactKind {
    type Error = String;

    fn from_param(param: &'a str) -> Result<Self, Self::Error> {
        param.parse()
    }
}

/// A download served as an attachment
pub struct ArtifactResponse(pub Artifact);

impl<'r> Responder<'r, 'static> for ArtifactResponse {
    fn respond_to(self, _: &'r Request<'_>) -> response::Result<'static> {
        let artifact = self.0;
        let content_type = match artifact.kind {
            ArtifactKind::Html => ContentType::HTML,
            ArtifactKind::Json => ContentType::JSON,
            ArtifactKind::Base64 => ContentType::Plain,
        };
        let body = artifact.content.into_bytes();

        Response::build()
            .header(content_type)
            .raw_header(
                "Content-Disposition",
                format!("attachment; filename=\"{}\"", artifact.file_name),
            )
            .sized_body(body.len(), std::io::Cursor::new(body))
            .ok()
    }
}
