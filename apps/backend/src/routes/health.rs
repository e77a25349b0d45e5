use actix_web::{web, HttpResponse};
use serde::Serialize;

use crate::domain::state::Phase;
use crate::error::AppError;
use crate::state::app_state::AppState;
use crate::ws::coordinator::GetObserverView;

pub async fn root() -> Result<HttpResponse, AppError> {
    Ok(HttpResponse::Ok().body("Hello from Spyster!"))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct HealthResponse {
    status: &'static str,
    app_version: &'static str,
    phase: Phase,
    participants: usize,
    location_packs: usize,
}

async fn health(app_state: web::Data<AppState>) -> Result<HttpResponse, AppError> {
    // A coordinator that cannot answer surfaces as 503.
    let view = app_state.coordinator.send(GetObserverView).await?;

    Ok(HttpResponse::Ok().json(HealthResponse {
        status: "ok",
        app_version: env!("CARGO_PKG_VERSION"),
        phase: view.phase,
        participants: view.participants.len(),
        location_packs: app_state.catalog.packs().count(),
    }))
}

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.route("", web::get().to(health));
}
