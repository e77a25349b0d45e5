use std::time::{Duration, Instant};

use actix::prelude::*;
use actix_web::{web, Error, HttpRequest, HttpResponse};
use actix_web_actors::ws;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::errors::ErrorCode;
use crate::state::app_state::AppState;
use crate::ws::coordinator::{Connect, Disconnect, Inbound, SessionCoordinator};
use crate::ws::protocol::{ClientMsg, ServerMsg};

const HEARTBEAT_INTERVAL: Duration = Duration::from_secs(10);
const CLIENT_TIMEOUT: Duration = Duration::from_secs(30);

/// Frames the coordinator pushes to one connection.
#[derive(Message, Clone)]
#[rtype(result = "()")]
pub enum Outbound {
    Deliver(ServerMsg),
    /// Send a final error frame, then close the socket.
    Close { code: ErrorCode, message: String },
}

pub async fn upgrade(
    req: HttpRequest,
    stream: web::Payload,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, Error> {
    let session = WsSession::new(Uuid::new_v4(), app_state.coordinator.clone());
    ws::start(session, &req, stream)
}

/// One websocket connection. Owns no game state; every intent is forwarded
/// to the [`SessionCoordinator`].
pub struct WsSession {
    conn_id: Uuid,
    coordinator: Addr<SessionCoordinator>,
    last_heartbeat: Instant,
    heartbeat_handle: Option<SpawnHandle>,
}

impl WsSession {
    fn new(conn_id: Uuid, coordinator: Addr<SessionCoordinator>) -> Self {
        Self {
            conn_id,
            coordinator,
            last_heartbeat: Instant::now(),
            heartbeat_handle: None,
        }
    }

    fn send_json(ctx: &mut ws::WebsocketContext<Self>, msg: &ServerMsg) {
        match serde_json::to_string(msg) {
            Ok(payload) => ctx.text(payload),
            Err(err) => warn!(error = %err, "[WS SESSION] failed to serialize outbound message"),
        }
    }

    fn start_heartbeat(&mut self, ctx: &mut ws::WebsocketContext<Self>) {
        let handle = ctx.run_interval(HEARTBEAT_INTERVAL, |actor, ctx| {
            if Instant::now().duration_since(actor.last_heartbeat) > CLIENT_TIMEOUT {
                warn!(conn_id = %actor.conn_id, "[WS SESSION] heartbeat timed out");
                ctx.close(Some(ws::CloseReason::from(ws::CloseCode::Normal)));
                ctx.stop();
                return;
            }
            ctx.ping(b"keepalive");
        });
        self.heartbeat_handle = Some(handle);
    }

    fn handle_text(&mut self, text: &str, ctx: &mut ws::WebsocketContext<Self>) {
        let msg = match serde_json::from_str::<ClientMsg>(text) {
            Ok(msg) => msg,
            Err(err) => {
                debug!(conn_id = %self.conn_id, error = %err, "[WS SESSION] malformed frame");
                Self::send_json(
                    ctx,
                    &ServerMsg::error(ErrorCode::InvalidMessage, "Malformed or unknown message"),
                );
                return;
            }
        };
        self.coordinator.do_send(Inbound {
            conn_id: self.conn_id,
            msg,
        });
    }
}

impl Actor for WsSession {
    type Context = ws::WebsocketContext<Self>;

    fn started(&mut self, ctx: &mut Self::Context) {
        info!(conn_id = %self.conn_id, "[WS SESSION] started");
        self.coordinator.do_send(Connect {
            conn_id: self.conn_id,
            recipient: ctx.address().recipient(),
        });
        self.start_heartbeat(ctx);
    }

    fn stopped(&mut self, _ctx: &mut Self::Context) {
        self.coordinator.do_send(Disconnect {
            conn_id: self.conn_id,
        });
        info!(conn_id = %self.conn_id, "[WS SESSION] stopped");
    }
}

impl StreamHandler<Result<ws::Message, ws::ProtocolError>> for WsSession {
    fn handle(&mut self, msg: Result<ws::Message, ws::ProtocolError>, ctx: &mut Self::Context) {
        match msg {
            Ok(ws::Message::Ping(payload)) => {
                self.last_heartbeat = Instant::now();
                ctx.pong(&payload);
            }
            Ok(ws::Message::Pong(_)) => {
                self.last_heartbeat = Instant::now();
            }
            Ok(ws::Message::Text(text)) => {
                self.last_heartbeat = Instant::now();
                self.handle_text(&text, ctx);
            }
            Ok(ws::Message::Binary(_)) => {
                self.last_heartbeat = Instant::now();
                Self::send_json(
                    ctx,
                    &ServerMsg::error(ErrorCode::InvalidMessage, "Binary frames are not supported"),
                );
            }
            Ok(ws::Message::Close(reason)) => {
                ctx.close(reason);
                ctx.stop();
            }
            Ok(ws::Message::Continuation(_)) | Ok(ws::Message::Nop) => {
                self.last_heartbeat = Instant::now();
            }
            Err(err) => {
                warn!(conn_id = %self.conn_id, error = %err, "[WS SESSION] protocol error");
                ctx.close(Some(ws::CloseReason::from(ws::CloseCode::Error)));
                ctx.stop();
            }
        }
    }
}

impl Handler<Outbound> for WsSession {
    type Result = ();

    fn handle(&mut self, msg: Outbound, ctx: &mut Self::Context) -> Self::Result {
        match msg {
            Outbound::Deliver(msg) => Self::send_json(ctx, &msg),
            Outbound::Close { code, message } => {
                Self::send_json(ctx, &ServerMsg::error(code, message));
                if let Some(handle) = self.heartbeat_handle.take() {
                    ctx.cancel_future(handle);
                }
                ctx.close(Some(ws::CloseReason {
                    code: ws::CloseCode::Policy,
                    description: Some(code.as_str().to_string()),
                }));
                ctx.stop();
            }
        }
    }
}
