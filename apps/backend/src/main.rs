use actix_web::{web, App, HttpServer};
use spyster_backend::config::server::ServerConfig;
use spyster_backend::infra::state::build_state;
use spyster_backend::middleware::cors::cors_middleware;
use spyster_backend::middleware::request_trace::RequestTrace;
use spyster_backend::middleware::structured_logger::StructuredLogger;
use spyster_backend::routes;

mod telemetry;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    telemetry::init_tracing();

    let config = match ServerConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!(error = %e, "Invalid configuration");
            std::process::exit(1);
        }
    };

    let app_state = match build_state().with_server_config(&config).build() {
        Ok(state) => state,
        Err(e) => {
            tracing::error!(error = %e, "Failed to build application state");
            std::process::exit(1);
        }
    };

    tracing::info!(
        host = %config.host,
        port = config.port,
        packs = app_state.catalog.packs().count(),
        role_repeat = ?config.settings.role_repeat,
        "Starting Spyster backend"
    );

    let data = web::Data::new(app_state);

    HttpServer::new(move || {
        App::new()
            .wrap(cors_middleware())
            .wrap(StructuredLogger)
            .wrap(RequestTrace)
            .app_data(data.clone())
            .configure(routes::configure)
    })
    .bind((config.host.as_str(), config.port))?
    .run()
    .await
}
