// src/web/handlers/system_handlers.rs
use rocket::serde::json::Json;
use rocket::State;
use tracing::info;

use crate::web::types::{AppState, DataResponse, HealthInfo};

pub async fn health_handler(state: &State<AppState>) -> Json<DataResponse<HealthInfo>> {
    info!("Health check");
    Json(DataResponse::success(
        "OK",
        HealthInfo {
            status: "ok",
            endpoint_configured: state.config.endpoint_configured(),
            templates_dir: state.store.dir().display().to_string(),
            active_sessions: state.sessions.len(),
        },
    ))
}
