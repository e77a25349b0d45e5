use actix_web::web;

pub mod health;
pub mod packs;
pub mod realtime;
pub mod state;

/// Register every route. `main.rs` and the test servers share this so the
/// same paths are exercised everywhere.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/", web::get().to(health::root));

    // Health check: /health
    cfg.service(web::scope("/health").configure(health::configure_routes));

    // Public projection: /api/state
    cfg.service(web::scope("/api/state").configure(state::configure_routes));

    // Location packs: /api/packs/**
    cfg.service(web::scope("/api/packs").configure(packs::configure_routes));

    // Game socket: /ws
    cfg.service(web::scope("/ws").configure(realtime::configure_routes));
}
