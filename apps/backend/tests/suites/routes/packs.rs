use std::io::Write;

use actix_web::http::StatusCode;
use actix_web::test;
use backend_test_support::problem_details::assert_problem_details_from_parts;
use serde_json::Value;
use spyster_backend::infra::state::build_state;

use crate::common::mentions;
use crate::support::{create_test_app, fast_settings, test_state};

#[actix_web::test]
async fn lists_the_builtin_pack() -> Result<(), Box<dyn std::error::Error>> {
    let app = create_test_app(test_state()?).await;

    let req = test::TestRequest::get().uri("/api/packs").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let packs: Value = test::read_body_json(resp).await;
    let classic = packs
        .as_array()
        .and_then(|all| all.iter().find(|p| p["id"] == "classic"))
        .ok_or("classic pack listed")?;
    assert!(classic["locationCount"].as_u64().is_some_and(|n| n > 0));
    assert!(classic["name"].is_string());
    Ok(())
}

#[actix_web::test]
async fn pack_detail_hides_role_lists() -> Result<(), Box<dyn std::error::Error>> {
    let app = create_test_app(test_state()?).await;

    let req = test::TestRequest::get().uri("/api/packs/classic").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let pack: Value = test::read_body_json(resp).await;
    let locations = pack["locations"].as_array().ok_or("locations array")?;
    assert!(!locations.is_empty());
    for location in locations {
        assert!(location["id"].is_string());
        assert!(location["name"].is_string());
    }
    assert!(!mentions(&pack, "roles"));
    assert!(!mentions(&pack, "hint"));
    Ok(())
}

#[actix_web::test]
async fn unknown_pack_is_a_problem_details_404() -> Result<(), Box<dyn std::error::Error>> {
    let app = create_test_app(test_state()?).await;

    let req = test::TestRequest::get().uri("/api/packs/missing").to_request();
    let resp = test::call_service(&app, req).await;
    let status = resp.status();
    let body = test::read_body(resp).await;
    assert_problem_details_from_parts(
        status,
        &body,
        "CONFIG_INVALID_PACK",
        StatusCode::NOT_FOUND,
        Some("missing"),
    );
    Ok(())
}

#[actix_web::test]
async fn packs_from_the_content_dir_are_served() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempfile::tempdir()?;
    let mut file = std::fs::File::create(dir.path().join("harbor.json"))?;
    write!(
        file,
        r#"{{"name":"Harbor","locations":[{{"name":"Dock","roles":[{{"name":"Crane Operator"}}]}}]}}"#
    )?;

    let state = build_state()
        .with_settings(fast_settings())
        .with_content_dir(dir.path())
        .build()?;
    let app = create_test_app(state).await;

    let req = test::TestRequest::get().uri("/api/packs/harbor").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let pack: Value = test::read_body_json(resp).await;
    assert_eq!(pack["name"], "Harbor");
    assert_eq!(pack["locations"][0]["name"], "Dock");
    Ok(())
}
