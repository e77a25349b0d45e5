use actix_web::http::StatusCode;
use actix_web::test;
use serde_json::Value;

use crate::support::{create_test_app, test_state};

#[actix_web::test]
async fn public_state_is_the_observer_view() -> Result<(), Box<dyn std::error::Error>> {
    let app = create_test_app(test_state()?).await;

    let req = test::TestRequest::get().uri("/api/state").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let view: Value = test::read_body_json(resp).await;
    assert_eq!(view["phase"], "LOBBY");
    assert!(view.get("me").is_none());
    assert!(view.get("role").is_none());
    assert!(view.get("type").is_none());
    assert_eq!(view["config"]["locationPack"], "classic");
    assert_eq!(view["lobby"]["minPlayers"], 4);
    assert_eq!(view["lobby"]["hostPresent"], false);
    Ok(())
}

#[actix_web::test]
async fn unknown_paths_are_404() -> Result<(), Box<dyn std::error::Error>> {
    let app = create_test_app(test_state()?).await;

    let req = test::TestRequest::get().uri("/api/nope").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    Ok(())
}
