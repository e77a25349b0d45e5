use actix_web::{web, HttpResponse};
use serde::Serialize;

use crate::domain::content::LocationSummary;
use crate::error::AppError;
use crate::errors::ErrorCode;
use crate::state::app_state::AppState;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct PackSummary<'a> {
    id: &'a str,
    name: &'a str,
    location_count: usize,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct PackDetail<'a> {
    id: &'a str,
    name: &'a str,
    locations: Vec<LocationSummary>,
}

async fn list_packs(app_state: web::Data<AppState>) -> Result<HttpResponse, AppError> {
    let packs: Vec<PackSummary<'_>> = app_state
        .catalog
        .packs()
        .map(|p| PackSummary {
            id: &p.id,
            name: &p.name,
            location_count: p.locations.len(),
        })
        .collect();
    Ok(HttpResponse::Ok().json(packs))
}

/// Location names only; role lists stay server-side.
async fn get_pack(
    path: web::Path<String>,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let id = path.into_inner();
    let pack = app_state.catalog.pack(&id).ok_or_else(|| {
        AppError::not_found(
            ErrorCode::ConfigInvalidPack,
            format!("No location pack named '{id}'"),
        )
    })?;
    Ok(HttpResponse::Ok().json(PackDetail {
        id: &pack.id,
        name: &pack.name,
        locations: pack.summaries(),
    }))
}

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.route("", web::get().to(list_packs))
        .route("/{id}", web::get().to(get_pack));
}
