use std::time::Duration;

use serde_json::json;

use crate::support::test_state;
use crate::support::websocket::{start_test_server, ws_url, SHUTDOWN_TIMEOUT_SECS};
use crate::support::websocket_client::WebSocketClient;

#[actix_web::test]
async fn fresh_socket_receives_observer_state() -> Result<(), Box<dyn std::error::Error>> {
    let (server, addr, join) = start_test_server(test_state()?).await?;

    let mut client = WebSocketClient::connect_retry(&ws_url(addr), Duration::from_secs(2)).await?;
    let first = client.recv_type("state").await?;
    assert_eq!(first["phase"], "LOBBY");
    assert_eq!(first["roundNumber"], 0);
    assert!(first.get("me").is_none());
    assert!(first.get("role").is_none());
    assert_eq!(first["lobby"]["canStart"], false);

    client.close().await?;
    server.stop(true).await;
    join.await??;
    Ok(())
}

#[actix_web::test]
async fn join_sends_welcome_then_a_personal_state() -> Result<(), Box<dyn std::error::Error>> {
    let (server, addr, join) = start_test_server(test_state()?).await?;

    let mut client = WebSocketClient::connect_observer(&ws_url(addr)).await?;
    let welcome = client.join("Alice", true).await?;
    assert_eq!(welcome["isHost"], true);
    assert!(welcome["credential"].as_str().is_some_and(|c| !c.is_empty()));

    let state = client.recv_type("state").await?;
    assert_eq!(state["me"]["id"], welcome["participantId"]);
    assert_eq!(state["me"]["displayName"], "Alice");
    assert_eq!(state["me"]["isHost"], true);
    assert_eq!(state["participants"].as_array().map(Vec::len), Some(1));

    server.stop(true).await;
    join.await??;
    Ok(())
}

#[actix_web::test]
async fn malformed_frames_get_an_error_and_the_socket_stays_open(
) -> Result<(), Box<dyn std::error::Error>> {
    let (server, addr, join) = start_test_server(test_state()?).await?;

    let mut client = WebSocketClient::connect_observer(&ws_url(addr)).await?;
    client.send("{not json").await?;
    let err = client.recv_error().await?;
    assert_eq!(err["code"], "INVALID_MESSAGE");
    assert!(err["humanMessage"].as_str().is_some());

    client.send_json(&json!({ "type": "teleport" })).await?;
    assert_eq!(client.recv_error().await?["code"], "INVALID_MESSAGE");

    // Still usable afterwards.
    let welcome = client.join("Bob", false).await?;
    assert_eq!(welcome["isHost"], false);

    server.stop(true).await;
    join.await??;
    Ok(())
}

#[actix_web::test]
async fn lobby_rejections_carry_stable_codes() -> Result<(), Box<dyn std::error::Error>> {
    let (server, addr, join) = start_test_server(test_state()?).await?;
    let url = ws_url(addr);

    let mut host = WebSocketClient::connect_observer(&url).await?;
    host.join("Host", true).await?;

    let mut other = WebSocketClient::connect_observer(&url).await?;

    // Acting before joining.
    other.send_json(&json!({ "type": "callVote" })).await?;
    assert_eq!(other.recv_error().await?["code"], "NOT_IN_GAME");

    other
        .send_json(&json!({ "type": "join", "displayName": "host" }))
        .await?;
    assert_eq!(other.recv_error().await?["code"], "NAME_TAKEN");

    other
        .send_json(&json!({ "type": "join", "displayName": "Second", "isHost": true }))
        .await?;
    assert_eq!(other.recv_error().await?["code"], "NOT_HOST");

    other.join("Second", false).await?;
    other
        .send_json(&json!({ "type": "vote", "targetId": "nobody", "confidence": 1 }))
        .await?;
    assert_eq!(other.recv_error().await?["code"], "INVALID_PHASE");

    other.admin("startGame").await?;
    assert_eq!(other.recv_error().await?["code"], "NOT_HOST");

    host.admin("startGame").await?;
    assert_eq!(host.recv_error().await?["code"], "NOT_ENOUGH_PLAYERS");

    server.stop(true).await;
    join.await??;
    Ok(())
}

#[actix_web::test]
async fn host_can_reconfigure_in_the_lobby() -> Result<(), Box<dyn std::error::Error>> {
    let (server, addr, join) = start_test_server(test_state()?).await?;

    let mut host = WebSocketClient::connect_observer(&ws_url(addr)).await?;
    host.join("Host", true).await?;
    host.send_json(&json!({
        "type": "admin",
        "action": "configure",
        "params": { "numRounds": 3, "roundDurationMinutes": 5 }
    }))
    .await?;
    let state = host
        .recv_until(|f| f["type"] == "state" && f["config"]["numRounds"] == 3)
        .await?;
    assert_eq!(state["config"]["roundDurationMinutes"], 5);
    assert_eq!(state["totalRounds"], 3);

    host.send_json(&json!({
        "type": "admin",
        "action": "configure",
        "params": { "numRounds": 0 }
    }))
    .await?;
    assert_eq!(host.recv_error().await?["code"], "CONFIG_INVALID_ROUNDS");

    server.stop(true).await;
    join.await??;
    Ok(())
}

#[actix_web::test]
async fn stopping_with_an_open_socket_is_bounded() -> Result<(), Box<dyn std::error::Error>> {
    let (server, addr, join) = start_test_server(test_state()?).await?;

    let mut client = WebSocketClient::connect_observer(&ws_url(addr)).await?;
    client.join("Lingerer", true).await?;

    let limit = Duration::from_secs(SHUTDOWN_TIMEOUT_SECS + 4);
    tokio::time::timeout(limit, server.stop(true))
        .await
        .map_err(|_| "server shutdown waited on the open socket")?;
    tokio::time::timeout(limit, join)
        .await
        .map_err(|_| "server task did not finish")???;
    drop(client);
    Ok(())
}
