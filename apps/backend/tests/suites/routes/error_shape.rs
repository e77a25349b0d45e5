use actix_web::http::StatusCode;
use actix_web::{test, web, App, HttpResponse};
use backend_test_support::problem_details::assert_problem_details_from_parts;
use spyster_backend::errors::domain::{ConflictKind, NotFoundKind, PhaseKind};
use spyster_backend::{AppError, DomainError};

async fn phase_error() -> Result<HttpResponse, AppError> {
    Err(DomainError::phase(PhaseKind::Mismatch, "Voting is not open").into())
}

async fn expired_session() -> Result<HttpResponse, AppError> {
    Err(DomainError::not_found(NotFoundKind::Session, "Session expired, please join again").into())
}

async fn short_table() -> Result<HttpResponse, AppError> {
    Err(DomainError::conflict(ConflictKind::NotEnoughPlayers, "Need at least 4 players").into())
}

async fn internal() -> Result<HttpResponse, AppError> {
    Err(AppError::internal("boom"))
}

async fn call(uri: &str) -> (StatusCode, actix_web::web::Bytes) {
    let app = test::init_service(
        App::new()
            .route("/phase", web::get().to(phase_error))
            .route("/expired", web::get().to(expired_session))
            .route("/short", web::get().to(short_table))
            .route("/internal", web::get().to(internal)),
    )
    .await;
    let resp = test::call_service(&app, test::TestRequest::get().uri(uri).to_request()).await;
    let status = resp.status();
    let content_type = resp
        .headers()
        .get("content-type")
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string();
    assert!(content_type.starts_with("application/problem+json"));
    (status, test::read_body(resp).await)
}

#[actix_web::test]
async fn domain_errors_map_to_problem_details() {
    let (status, body) = call("/phase").await;
    assert_problem_details_from_parts(
        status,
        &body,
        "INVALID_PHASE",
        StatusCode::CONFLICT,
        Some("Voting is not open"),
    );

    let (status, body) = call("/expired").await;
    assert_problem_details_from_parts(
        status,
        &body,
        "SESSION_EXPIRED",
        StatusCode::GONE,
        Some("join again"),
    );

    let (status, body) = call("/short").await;
    assert_problem_details_from_parts(
        status,
        &body,
        "NOT_ENOUGH_PLAYERS",
        StatusCode::UNPROCESSABLE_ENTITY,
        None,
    );
}

#[actix_web::test]
async fn internal_errors_use_the_generic_code() {
    let (status, body) = call("/internal").await;
    assert_problem_details_from_parts(
        status,
        &body,
        "INTERNAL",
        StatusCode::INTERNAL_SERVER_ERROR,
        Some("boom"),
    );
}
