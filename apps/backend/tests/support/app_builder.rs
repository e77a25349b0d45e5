use actix_http::Request;
use actix_web::body::BoxBody;
use actix_web::dev::{Service, ServiceResponse};
use actix_web::{test, web, App, Error};
use spyster_backend::middleware::request_trace::RequestTrace;
use spyster_backend::middleware::structured_logger::StructuredLogger;
use spyster_backend::routes;
use spyster_backend::state::app_state::AppState;

/// Build a test service with the production routes and middleware stack.
///
/// CORS is left out; it only matters to browsers.
pub async fn create_test_app(
    state: AppState,
) -> impl Service<Request, Response = ServiceResponse<BoxBody>, Error = Error> {
    let data = web::Data::new(state);

    test::init_service(
        App::new()
            .wrap(StructuredLogger)
            .wrap(RequestTrace)
            .app_data(data)
            .configure(routes::configure),
    )
    .await
}
