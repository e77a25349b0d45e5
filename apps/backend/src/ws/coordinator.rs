//! The session coordinator: the one actor that owns the game.
//!
//! Every intent, connection event and timer firing arrives here as an actix
//! message and is applied to the [`GameFlow`] one at a time. After each
//! mutation the coordinator drains the engine's effects and sends every
//! connection its own projection of the new state.

use std::collections::HashMap;
use std::time::Instant;

use actix::prelude::*;
use rand_chacha::ChaCha20Rng;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::domain::player_view::{PlayerView, Viewer};
use crate::domain::timers::{TimerHandle, TimerName};
use crate::errors::DomainError;
use crate::services::game_flow::{Effect, GameFlow};
use crate::ws::protocol::{ClientMsg, ServerMsg};
use crate::ws::session::Outbound;

#[derive(Message)]
#[rtype(result = "()")]
pub struct Connect {
    pub conn_id: Uuid,
    pub recipient: Recipient<Outbound>,
}

#[derive(Message)]
#[rtype(result = "()")]
pub struct Disconnect {
    pub conn_id: Uuid,
}

#[derive(Message)]
#[rtype(result = "()")]
pub struct Inbound {
    pub conn_id: Uuid,
    pub msg: ClientMsg,
}

/// Public projection, as an observer with no identity sees it.
#[derive(Message)]
#[rtype(result = "PlayerView")]
pub struct GetObserverView;

/// Hand a frame to a connection actor without waiting on it. A full mailbox
/// still queues the frame; a closed one drops it.
fn deliver(conn_id: Uuid, recipient: &Recipient<Outbound>, msg: Outbound) {
    match recipient.try_send(msg) {
        Ok(()) => {}
        Err(SendError::Full(msg)) => recipient.do_send(msg),
        Err(SendError::Closed(_)) => {
            debug!(conn_id = %conn_id, "Dropped frame for closed connection");
        }
    }
}

pub struct SessionCoordinator {
    flow: GameFlow<ChaCha20Rng>,
    connections: HashMap<Uuid, Recipient<Outbound>>,
    timers: HashMap<TimerName, (u64, SpawnHandle)>,
}

impl SessionCoordinator {
    pub fn new(flow: GameFlow<ChaCha20Rng>) -> Self {
        Self {
            flow,
            connections: HashMap::new(),
            timers: HashMap::new(),
        }
    }

    fn send(&self, conn_id: Uuid, msg: ServerMsg) {
        if let Some(recipient) = self.connections.get(&conn_id) {
            deliver(conn_id, recipient, Outbound::Deliver(msg));
        }
    }

    /// Each connection gets its own projection. A closed or slow socket only
    /// drops its own frame.
    fn broadcast(&self) {
        let now = Instant::now();
        for (conn_id, recipient) in &self.connections {
            let view = self.flow.view_for_connection(*conn_id, now);
            deliver(*conn_id, recipient, Outbound::Deliver(ServerMsg::State(view)));
        }
    }

    fn apply_effects(&mut self, ctx: &mut Context<Self>) {
        for effect in self.flow.drain_effects() {
            match effect {
                Effect::ScheduleTimer(handle) => self.schedule(handle, ctx),
                Effect::CancelTimer(name) => {
                    if let Some((_, spawn)) = self.timers.remove(&name) {
                        ctx.cancel_future(spawn);
                    }
                }
                Effect::SendRoleAssignment {
                    participant,
                    round,
                    card,
                } => {
                    if let Some(conn_id) = self.flow.connection_of(&participant) {
                        self.send(conn_id, ServerMsg::RoleAssignment { round, card });
                    }
                }
                Effect::CloseConnection {
                    connection,
                    code,
                    message,
                } => {
                    if let Some(recipient) = self.connections.remove(&connection) {
                        recipient.do_send(Outbound::Close { code, message });
                    }
                }
            }
        }
    }

    fn schedule(&mut self, handle: TimerHandle, ctx: &mut Context<Self>) {
        if let Some((_, previous)) = self.timers.remove(&handle.name) {
            ctx.cancel_future(previous);
        }
        let name = handle.name.clone();
        let generation = handle.generation;
        let spawn = ctx.run_later(handle.delay, move |actor, ctx| {
            if actor
                .timers
                .get(&name)
                .is_some_and(|(armed, _)| *armed == generation)
            {
                actor.timers.remove(&name);
            }
            let changed = actor.flow.on_timer(&name, generation, Instant::now());
            actor.apply_effects(ctx);
            if changed {
                actor.broadcast();
            }
        });
        self.timers.insert(handle.name, (generation, spawn));
    }

    /// Apply the result of an intent: answer errors privately, otherwise
    /// flush effects and fan out the new state.
    fn settle(&mut self, conn_id: Uuid, result: Result<(), DomainError>, ctx: &mut Context<Self>) {
        match result {
            Ok(()) => {
                self.apply_effects(ctx);
                self.broadcast();
            }
            Err(err) => {
                debug!(conn_id = %conn_id, code = %err.code(), "Intent rejected");
                self.apply_effects(ctx);
                self.send(conn_id, ServerMsg::from(&err));
            }
        }
    }

    fn dispatch(&mut self, conn_id: Uuid, msg: ClientMsg, ctx: &mut Context<Self>) {
        let now = Instant::now();
        let result = match msg {
            ClientMsg::Join { .. } => {
                let Some(request) = msg.join_request() else {
                    return;
                };
                match self.flow.join(conn_id, request, now) {
                    Ok(outcome) => {
                        self.send(
                            conn_id,
                            ServerMsg::Welcome {
                                participant_id: outcome.participant_id,
                                credential: outcome.credential,
                                is_host: outcome.is_host,
                            },
                        );
                        Ok(())
                    }
                    Err(err) => {
                        // An expired resume may still have removed someone.
                        self.apply_effects(ctx);
                        self.broadcast();
                        Err(err)
                    }
                }
            }
            ClientMsg::Vote {
                target_id,
                confidence,
            } => self.flow.vote(conn_id, &target_id, confidence, now),
            ClientMsg::LocationGuess { location_id } => {
                self.flow.guess_location(conn_id, &location_id, now)
            }
            ClientMsg::CallVote {} => self.flow.call_vote(conn_id, now),
            ClientMsg::Admin { action, params } => action
                .into_command(params)
                .and_then(|command| self.flow.admin(conn_id, command, now)),
            ClientMsg::Heartbeat {} => {
                self.flow.heartbeat(conn_id, now);
                return;
            }
        };
        self.settle(conn_id, result, ctx);
    }
}

impl Actor for SessionCoordinator {
    type Context = Context<Self>;

    fn started(&mut self, _ctx: &mut Self::Context) {
        info!(
            pack = %self.flow.session().config.location_pack,
            "Session coordinator started"
        );
    }

    fn stopped(&mut self, _ctx: &mut Self::Context) {
        info!("Session coordinator stopped");
    }
}

impl Handler<Connect> for SessionCoordinator {
    type Result = ();

    fn handle(&mut self, msg: Connect, _ctx: &mut Self::Context) -> Self::Result {
        self.connections.insert(msg.conn_id, msg.recipient);
        debug!(conn_id = %msg.conn_id, connections = self.connections.len(), "Connection registered");
        let view = self.flow.view_for(Viewer::Observer, Instant::now());
        self.send(msg.conn_id, ServerMsg::State(view));
    }
}

impl Handler<Disconnect> for SessionCoordinator {
    type Result = ();

    fn handle(&mut self, msg: Disconnect, ctx: &mut Self::Context) -> Self::Result {
        self.connections.remove(&msg.conn_id);
        if self.flow.connection_lost(msg.conn_id, Instant::now()) {
            self.apply_effects(ctx);
            self.broadcast();
        } else {
            debug!(conn_id = %msg.conn_id, "Observer connection closed");
        }
    }
}

impl Handler<Inbound> for SessionCoordinator {
    type Result = ();

    fn handle(&mut self, msg: Inbound, ctx: &mut Self::Context) -> Self::Result {
        if !self.connections.contains_key(&msg.conn_id) {
            warn!(conn_id = %msg.conn_id, "Intent from an unregistered connection");
            return;
        }
        self.dispatch(msg.conn_id, msg.msg, ctx);
    }
}

impl Handler<GetObserverView> for SessionCoordinator {
    type Result = MessageResult<GetObserverView>;

    fn handle(&mut self, _msg: GetObserverView, _ctx: &mut Self::Context) -> Self::Result {
        MessageResult(self.flow.view_for(Viewer::Observer, Instant::now()))
    }
}
