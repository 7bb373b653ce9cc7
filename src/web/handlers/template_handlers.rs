// src/web/handlers/template_handlers.rs
//! Template listing, saving and archive import

use rocket::form::Form;
use rocket::serde::json::Json;
use rocket::State;
use tracing::info;

use crate::core::TemplateStore;
use crate::error::FormatterError;
use crate::web::types::{
    ActionResponse, ApiResult, AppState, ArchiveUploadForm, DataResponse, ImportResult,
    SaveTemplateRequest, TemplateContent, TemplateList,
};

use super::helpers::read_upload;

pub async fn list_templates_handler(
    state: &State<AppState>,
) -> ApiResult<Json<DataResponse<TemplateList>>> {
    let batch = state.store.load_all().await?;
    let list = TemplateList {
        templates: batch.templates.into_keys().collect(),
        failures: batch.failures,
    };

    Ok(Json(DataResponse::success(
        format!("{} templates available", list.templates.len()),
        list,
    )))
}

pub async fn get_template_handler(
    name: &str,
    state: &State<AppState>,
) -> ApiResult<Json<DataResponse<TemplateContent>>> {
    let file_name = TemplateStore::normalize_name(name)?;
    let content = state.store.load(&file_name).await?;

    Ok(Json(DataResponse::success(
        "Template loaded",
        TemplateContent {
            name: file_name,
            content,
        },
    )))
}

pub async fn save_template_handler(
    request: Json<SaveTemplateRequest>,
    state: &State<AppState>,
) -> ApiResult<Json<ActionResponse>> {
    if request.content.is_empty() {
        return Err(FormatterError::MissingInput("template content is empty").into());
    }

    let path = state.store.save(&request.name, &request.content).await?;
    info!("Template saved via API: {}", path.display());

    Ok(Json(
        ActionResponse::success(format!("Template saved: {}", path.display()), "saved")
            .with_next_actions(vec!["Select the template in a session".to_string()]),
    ))
}

/// Extract templates from an uploaded ZIP; persist them only when `save` is set
pub async fn import_templates_handler(
    mut upload: Form<ArchiveUploadForm<'_>>,
    save: Option<bool>,
    state: &State<AppState>,
) -> ApiResult<Json<DataResponse<ImportResult>>> {
    let bytes = read_upload(&mut upload.archive, "template_archive").await?;
    let batch = TemplateStore::extract_from_archive(&bytes);

    if batch.templates.is_empty() && !batch.failures.is_empty() {
        let reasons: Vec<_> = batch.failures.iter().map(|f| f.error.as_str()).collect();
        return Err(FormatterError::Archive(reasons.join("; ")).into());
    }

    let mut failures = batch.failures;
    let saved = if save.unwrap_or(false) {
        let summary = state.store.save_all(&batch.templates).await;
        failures.extend(summary.failures);
        summary.saved.len()
    } else {
        0
    };

    let templates: Vec<String> = batch.templates.into_keys().collect();
    let message = if saved > 0 {
        format!("Saved {} templates", saved)
    } else {
        format!("Found {} templates", templates.len())
    };

    Ok(Json(DataResponse::success(
        message,
        ImportResult {
            templates,
            failures,
            saved,
        },
    )))
}
