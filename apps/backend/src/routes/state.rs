use actix_web::{web, HttpResponse};

use crate::error::AppError;
use crate::state::app_state::AppState;
use crate::ws::coordinator::GetObserverView;

/// The public projection: what a spectator screen shows. Never carries a
/// role, vote or bet.
async fn observer_state(app_state: web::Data<AppState>) -> Result<HttpResponse, AppError> {
    let view = app_state.coordinator.send(GetObserverView).await?;
    Ok(HttpResponse::Ok().json(view))
}

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.route("", web::get().to(observer_state));
}
