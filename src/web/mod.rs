// src/web/mod.rs

pub mod handlers;
pub mod types;

pub use types::*;

use anyhow::Result;
use rocket::data::{Limits, ToByteUnit};
use rocket::fairing::{Fairing, Info, Kind};
use rocket::form::Form;
use rocket::http::{Header, Status};
use rocket::serde::json::Json;
use rocket::{catchers, delete, get, options, post, put, routes, Build, Request, Response, Rocket, State};
use std::net::IpAddr;
use tracing::info;

use crate::config::AppConfig;
use crate::core::FsOps;
use crate::session::SessionSummary;
use crate::types::ArtifactKind;

// CORS Fairing
pub struct Cors;

#[rocket::async_trait]
impl Fairing for Cors {
    fn info(&self) -> Info {
        Info {
            name: "Add CORS headers to responses",
            kind: Kind::Response,
        }
    }

    async fn on_response<'r>(&self, _request: &'r Request<'_>, response: &mut Response<'r>) {
        response.set_header(Header::new("Access-Control-Allow-Origin", "*"));
        response.set_header(Header::new(
            "Access-Control-Allow-Methods",
            "POST, GET, PUT, DELETE, OPTIONS",
        ));
        response.set_header(Header::new("Access-Control-Allow-Headers", "*"));
    }
}

#[get("/health")]
pub async fn health(state: &State<AppState>) -> Json<DataResponse<HealthInfo>> {
    handlers::health_handler(state).await
}

#[get("/templates")]
pub async fn list_templates(state: &State<AppState>) -> ApiResult<Json<DataResponse<TemplateList>>> {
    handlers::list_templates_handler(state).await
}

#[get("/templates/<name>")]
pub async fn get_template(
    name: &str,
    state: &State<AppState>,
) -> ApiResult<Json<DataResponse<TemplateContent>>> {
    handlers::get_template_handler(name, state).await
}

#[post("/templates", data = "<request>")]
pub async fn save_template(
    request: Json<SaveTemplateRequest>,
    state: &State<AppState>,
) -> ApiResult<Json<ActionResponse>> {
    handlers::save_template_handler(request, state).await
}

#[post("/templates/import?<save>", data = "<upload>")]
pub async fn import_templates(
    upload: Form<ArchiveUploadForm<'_>>,
    save: Option<bool>,
    state: &State<AppState>,
) -> ApiResult<Json<DataResponse<ImportResult>>> {
    handlers::import_templates_handler(upload, save, state).await
}

#[post("/sessions")]
pub async fn create_session(state: &State<AppState>) -> Json<DataResponse<SessionSummary>> {
    handlers::create_session_handler(state).await
}

#[get("/sessions/<id>")]
pub async fn get_session(
    id: &str,
    state: &State<AppState>,
) -> ApiResult<Json<DataResponse<SessionSummary>>> {
    handlers::get_session_handler(id, state).await
}

#[put("/sessions/<id>/template", data = "<request>")]
pub async fn select_template(
    id: &str,
    request: Json<SelectTemplateRequest>,
    state: &State<AppState>,
) -> ApiResult<Json<DataResponse<SessionSummary>>> {
    handlers::select_template_handler(id, request, state).await
}

#[post("/sessions/<id>/resume", data = "<upload>")]
pub async fn upload_resume(
    id: &str,
    upload: Form<ResumeUploadForm<'_>>,
    state: &State<AppState>,
) -> ApiResult<Json<DataResponse<SessionSummary>>> {
    handlers::upload_resume_handler(id, upload, state).await
}

#[post("/sessions/<id>/process")]
pub async fn process_resume(
    id: &str,
    state: &State<AppState>,
) -> ApiResult<Json<DataResponse<ProcessResult>>> {
    handlers::process_handler(id, state).await
}

#[get("/sessions/<id>/downloads/<kind>")]
pub async fn download(
    id: &str,
    kind: ArtifactKind,
    state: &State<AppState>,
) -> ApiResult<ArtifactResponse> {
    handlers::download_handler(id, kind, state).await
}

#[delete("/sessions/<id>")]
pub async fn delete_session(id: &str, state: &State<AppState>) -> ApiResult<Json<ActionResponse>> {
    handlers::delete_session_handler(id, state).await
}

#[options("/<_..>")]
pub async fn options() -> Status {
    Status::Ok
}

// Error catchers
fn catcher_response(error: &str, code: &str, suggestions: &[&str]) -> Json<StandardErrorResponse> {
    Json(StandardErrorResponse::new(
        error.to_string(),
        code.to_string(),
        suggestions.iter().map(|s| s.to_string()).collect(),
    ))
}

#[rocket::catch(400)]
pub fn bad_request() -> Json<StandardErrorResponse> {
    catcher_response(
        "Invalid request format",
        "BAD_REQUEST",
        &["Check your request JSON format", "Verify all required fields are present"],
    )
}

#[rocket::catch(404)]
pub fn not_found() -> Json<StandardErrorResponse> {
    catcher_response("Resource not found", "NOT_FOUND", &["Check the request path"])
}

#[rocket::catch(413)]
pub fn payload_too_large() -> Json<StandardErrorResponse> {
    catcher_response(
        "Upload exceeds the size limit",
        "PAYLOAD_TOO_LARGE",
        &["Upload a file smaller than 20 MiB"],
    )
}

#[rocket::catch(422)]
pub fn unprocessable() -> Json<StandardErrorResponse> {
    catcher_response(
        "Request could not be understood",
        "UNPROCESSABLE",
        &["Verify field names and types", "Download kinds are html, json and base64"],
    )
}

#[rocket::catch(500)]
pub fn internal_error() -> Json<StandardErrorResponse> {
    catcher_response(
        "Internal server error",
        "INTERNAL_ERROR",
        &["Try again in a few moments"],
    )
}

/// Assemble the API without launching it
pub fn build_rocket(state: AppState, address: IpAddr, port: u16) -> Rocket<Build> {
    let limits = Limits::default()
        .limit("file", 20.mebibytes())
        .limit("data-form", 25.mebibytes())
        .limit("json", 5.mebibytes());

    let figment = rocket::Config::figment()
        .merge(("address", address))
        .merge(("port", port))
        .merge(("limits", limits));

    rocket::custom(figment)
        .attach(Cors)
        .manage(state)
        .register(
            "/api",
            catchers![
                bad_request,
                not_found,
                payload_too_large,
                unprocessable,
                internal_error
            ],
        )
        .mount(
            "/api",
            routes![
                health,
                list_templates,
                get_template,
                save_template,
                import_templates,
                create_session,
                get_session,
                select_template,
                upload_resume,
                process_resume,
                download,
                delete_session,
                options,
            ],
        )
}

pub async fn start_web_server(config: AppConfig, address: IpAddr, port: u16) -> Result<()> {
    FsOps::ensure_dir_exists(&config.paths.templates_path).await?;

    info!("Starting resume formatter API server");
    info!("Environment: {}", config.environment);
    info!("Templates: {}", config.paths.templates_path.display());
    match &config.service.endpoint {
        Some(endpoint) => info!("Processing endpoint: {}", endpoint),
        None => info!("Processing endpoint not configured"),
    }
    info!("Server: http://{}:{}", address, port);

    let state = AppState::new(config)?;
    build_rocket(state, address, port)
        .launch()
        .await
        .map_err(|e| anyhow::anyhow!("Server failed: {}", e))?;

    Ok(())
}
