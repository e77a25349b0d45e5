use backend_test_support::unique_helpers::unique_name;
use serde_json::json;

use crate::support::game_table::{holder_seat, GameTable};
use crate::support::test_state;
use crate::support::websocket::{start_test_server, ws_url};
use crate::support::websocket_client::WebSocketClient;

#[actix_web::test]
async fn credential_resumes_the_same_participant() -> Result<(), Box<dyn std::error::Error>> {
    let (server, addr, join) = start_test_server(test_state()?).await?;
    let url = ws_url(addr);

    let mut first = WebSocketClient::connect_observer(&url).await?;
    let welcome = first.join(&unique_name("dana"), true).await?;
    let credential = welcome["credential"].as_str().ok_or("credential")?.to_string();
    first.close().await?;

    let mut second = WebSocketClient::connect_observer(&url).await?;
    second
        .send_json(&json!({ "type": "join", "credential": credential }))
        .await?;
    let resumed = second.recv_type("welcome").await?;
    assert_eq!(resumed["participantId"], welcome["participantId"]);
    assert_eq!(resumed["isHost"], true);

    let state = second
        .recv_until(|f| f["type"] == "state" && f["me"]["id"] == welcome["participantId"])
        .await?;
    assert_eq!(state["participants"].as_array().map(Vec::len), Some(1));

    server.stop(true).await;
    join.await??;
    Ok(())
}

#[actix_web::test]
async fn unknown_credential_is_rejected() -> Result<(), Box<dyn std::error::Error>> {
    let (server, addr, join) = start_test_server(test_state()?).await?;

    let mut client = WebSocketClient::connect_observer(&ws_url(addr)).await?;
    client
        .send_json(&json!({ "type": "join", "credential": "not-a-real-credential" }))
        .await?;
    let err = client.recv_error().await?;
    assert_eq!(err["code"], "SESSION_EXPIRED");

    server.stop(true).await;
    join.await??;
    Ok(())
}

#[actix_web::test]
async fn resuming_mid_round_restores_the_private_view() -> Result<(), Box<dyn std::error::Error>> {
    let (server, addr, join) = start_test_server(test_state()?).await?;
    let mut table = GameTable::seat(addr, 4).await?;
    let cards = table.start().await?;
    let holder = holder_seat(&cards).ok_or("expected exactly one holder card")?;
    let seat = (holder + 1) % cards.len();
    table.all_reach("QUESTIONING").await?;

    let credential = table.seats[seat].credential.clone();
    table.seats[seat].client.close().await?;

    let mut back = WebSocketClient::connect_observer(&table.url).await?;
    back.send_json(&json!({ "type": "join", "credential": credential }))
        .await?;
    back.recv_type("welcome").await?;
    let state = back
        .recv_until(|f| f["type"] == "state" && f.get("me").is_some())
        .await?;
    assert_eq!(state["phase"], "QUESTIONING");
    assert_eq!(state["role"], cards[seat]["card"]);

    server.stop(true).await;
    join.await??;
    Ok(())
}

#[actix_web::test]
async fn host_disconnect_pauses_until_they_return() -> Result<(), Box<dyn std::error::Error>> {
    let (server, addr, join) = start_test_server(test_state()?).await?;
    let mut table = GameTable::seat(addr, 4).await?;
    table.start().await?;
    table.all_reach("QUESTIONING").await?;

    let credential = table.seats[0].credential.clone();
    table.seats[0].client.close().await?;

    let paused = table.seats[1].client.recv_phase("PAUSED").await?;
    assert_eq!(paused["pausedPhase"], "QUESTIONING");
    assert_eq!(paused["pauseReason"], "hostDisconnected");

    let mut host = WebSocketClient::connect_observer(&table.url).await?;
    host.send_json(&json!({ "type": "join", "credential": credential }))
        .await?;
    host.recv_type("welcome").await?;
    table.seats[1].client.recv_phase("QUESTIONING").await?;

    server.stop(true).await;
    join.await??;
    Ok(())
}
