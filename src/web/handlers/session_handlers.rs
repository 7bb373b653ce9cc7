// src/web/handlers/session_handlers.rs
//! Session lifecycle: template selection, resume upload, processing, downloads

use rocket::form::Form;
use rocket::serde::json::Json;
use rocket::State;
use serde_json::Value;
use tracing::{info, info_span, Instrument};

use crate::core::TemplateStore;
use crate::error::FormatterError;
use crate::session::SessionSummary;
use crate::types::{Artifact, ArtifactKind, ResumeUpload};
use crate::web::types::{
    ActionResponse, ApiResult, AppState, ArtifactResponse, DataResponse, ProcessResult,
    ResumeUploadForm, SelectTemplateRequest,
};

use super::helpers::{read_upload, resume_filename};

pub async fn create_session_handler(state: &State<AppState>) -> Json<DataResponse<SessionSummary>> {
    let summary = state.sessions.create();
    Json(DataResponse::success("Session created", summary))
}

pub async fn get_session_handler(
    id: &str,
    state: &State<AppState>,
) -> ApiResult<Json<DataResponse<SessionSummary>>> {
    let summary = state.sessions.with_session(id, |s| s.summary())?;
    Ok(Json(DataResponse::success("Session loaded", summary)))
}

/// Select a stored template by name, or set template content directly
pub async fn select_template_handler(
    id: &str,
    request: Json<SelectTemplateRequest>,
    state: &State<AppState>,
) -> ApiResult<Json<DataResponse<SessionSummary>>> {
    let request = request.into_inner();

    let summary = match (request.name, request.content) {
        (Some(name), _) => {
            let file_name = TemplateStore::normalize_name(&name)?;
            let content = state.store.load(&file_name).await?;
            state.sessions.with_session(id, |s| {
                s.select_template(file_name, content);
                s.summary()
            })?
        }
        (None, Some(content)) => state.sessions.with_session(id, |s| {
            s.set_template_content(content);
            s.summary()
        })?,
        (None, None) => {
            return Err(FormatterError::MissingInput("template name or content is required").into())
        }
    };

    Ok(Json(DataResponse::success("Template selected", summary)))
}

pub async fn upload_resume_handler(
    id: &str,
    mut upload: Form<ResumeUploadForm<'_>>,
    state: &State<AppState>,
) -> ApiResult<Json<DataResponse<SessionSummary>>> {
    let filename = resume_filename(upload.filename.as_deref(), &upload.resume)?;

    let bytes = read_upload(&mut upload.resume, "resume_upload").await?;
    if bytes.is_empty() {
        return Err(FormatterError::MissingInput("uploaded resume is empty").into());
    }

    info!("Session {} uploaded {} ({} bytes)", id, filename, bytes.len());
    let resume = ResumeUpload::new(filename, bytes);
    let summary = state.sessions.with_session(id, |s| {
        s.attach_upload(resume);
        s.summary()
    })?;

    Ok(Json(DataResponse::success("Resume uploaded", summary)))
}

/// Run the full pipeline for the session's upload and template
pub async fn process_handler(
    id: &str,
    state: &State<AppState>,
) -> ApiResult<Json<DataResponse<ProcessResult>>> {
    let processor = state.processor()?;
    let (upload, template) = state.sessions.with_session(id, |s| s.prepare_run())??;

    info!("Session {} processing {} with {}", id, upload.filename, processor.endpoint());
    let span = info_span!("resume_processing", session = %id, resume = %upload.filename);
    let outcome = processor.process(&upload, &template).instrument(span).await?;

    let result = ProcessResult {
        resume_filename: upload.filename.clone(),
        data: Value::Object(outcome.data.clone()),
        html: outcome.output.sanitized(),
        downloads: ArtifactKind::ALL
            .iter()
            .map(|kind| format!("/api/sessions/{}/downloads/{}", id, kind.as_str()))
            .collect(),
    };

    state
        .sessions
        .with_session(id, |s| s.record_result(upload, outcome))?;
    info!("Session {} processing complete", id);

    Ok(Json(DataResponse::success("Processing complete", result)))
}

pub async fn download_handler(
    id: &str,
    kind: ArtifactKind,
    state: &State<AppState>,
) -> ApiResult<ArtifactResponse> {
    let run = state
        .sessions
        .with_session(id, |s| s.last_run().cloned())?
        .ok_or(FormatterError::MissingInput("no processed resume in this session"))?;

    let artifact = Artifact::build(kind, &run.upload, &run.outcome)
        .map_err(|e| FormatterError::InvalidResponse(e.to_string()))?;

    Ok(ArtifactResponse(artifact))
}

pub async fn delete_session_handler(
    id: &str,
    state: &State<AppState>,
) -> ApiResult<Json<ActionResponse>> {
    state.sessions.remove(id)?;
    Ok(Json(ActionResponse::success("Session cleared", "deleted")))
}
