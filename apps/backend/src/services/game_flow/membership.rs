//! Joining, resuming, and the disconnect sub-protocol.

use std::time::Instant;

use rand::{CryptoRng, Rng};
use tracing::{debug, info, warn};

use super::{Effect, GameFlow, TimerAction};
use crate::domain::participants::{validate_display_name, ConnectionId, Credential, ParticipantId};
use crate::domain::state::{PauseReason, Phase};
use crate::domain::timers::TimerName;
use crate::errors::domain::{ConflictKind, DomainError, NotFoundKind, ValidationKind};
use crate::errors::ErrorCode;

/// A `join` intent: either a fresh admission or a credential resume.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct JoinRequest {
    pub display_name: Option<String>,
    pub is_host: bool,
    pub credential: Option<String>,
}

/// Acknowledgement sent only to the joining connection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JoinOutcome {
    pub participant_id: ParticipantId,
    pub credential: String,
    pub is_host: bool,
    pub resumed: bool,
}

impl<R: Rng + CryptoRng> GameFlow<R> {
    pub fn join(
        &mut self,
        connection: ConnectionId,
        request: JoinRequest,
        now: Instant,
    ) -> Result<JoinOutcome, DomainError> {
        if self.participant_for_connection(connection).is_some() {
            return Err(DomainError::validation(
                ValidationKind::Message,
                "This connection has already joined",
            ));
        }
        match request.credential {
            Some(credential) => self.resume_participant(connection, &credential, now),
            None => self.admit(connection, request.display_name, request.is_host, now),
        }
    }

    fn admit(
        &mut self,
        connection: ConnectionId,
        display_name: Option<String>,
        is_host: bool,
        now: Instant,
    ) -> Result<JoinOutcome, DomainError> {
        if self.session.effective_phase() != Phase::Lobby {
            return Err(DomainError::conflict(
                ConflictKind::GameAlreadyStarted,
                "The game has already started",
            ));
        }
        let name = validate_display_name(display_name.as_deref().unwrap_or_default())?;
        let credential = Credential::generate(&mut self.rng);
        let participant =
            self.session
                .participants
                .admit(name, is_host, connection, credential, now)?;

        let outcome = JoinOutcome {
            participant_id: participant.id.clone(),
            credential: participant.credential.expose().to_string(),
            is_host: participant.is_host,
            resumed: false,
        };
        info!(
            participant = %outcome.participant_id,
            is_host,
            count = self.session.participants.len(),
            "Participant joined"
        );
        Ok(outcome)
    }

    fn resume_participant(
        &mut self,
        connection: ConnectionId,
        presented: &str,
        now: Instant,
    ) -> Result<JoinOutcome, DomainError> {
        let expired = || {
            DomainError::not_found(NotFoundKind::Session, "Session expired, please join again")
        };
        let Some(found) = self.session.participants.by_credential(presented) else {
            return Err(expired());
        };
        let id = found.id.clone();
        let window = self.settings.timings.reconnect_window;
        if found
            .disconnected_at
            .is_some_and(|at| now.saturating_duration_since(at) >= window)
        {
            info!(participant = %id, "Resume attempted after the reconnection window");
            self.remove_participant(&id, None, now);
            return Err(expired());
        }

        let Some(participant) = self.session.participants.get_mut(&id) else {
            return Err(expired());
        };
        let previous = participant.connection.replace(connection);
        participant.connected = true;
        participant.connection_lost_at = None;
        participant.last_heartbeat = now;
        let is_host = participant.is_host;
        let credential = participant.credential.expose().to_string();

        if let Some(old) = previous.filter(|old| *old != connection) {
            self.effects.push(Effect::CloseConnection {
                connection: old,
                code: ErrorCode::SessionExpired,
                message: "Session resumed on another connection".into(),
            });
        }
        self.cancel(TimerName::DisconnectGrace(id.clone()));

        let host_pause = self
            .session
            .pause
            .as_ref()
            .is_some_and(|p| p.reason == PauseReason::HostDisconnected);
        if is_host && host_pause {
            self.resume(now);
        }
        if self.session.phase == Phase::Roles {
            self.send_role_card(&id);
        }
        info!(participant = %id, "Participant resumed");
        Ok(JoinOutcome {
            participant_id: id,
            credential,
            is_host,
            resumed: true,
        })
    }

    /// The socket behind `connection` went away. Returns `true` if it
    /// belonged to a participant.
    pub fn connection_lost(&mut self, connection: ConnectionId, now: Instant) -> bool {
        let Some(id) = self.participant_for_connection(connection) else {
            return false;
        };
        let Some(participant) = self.session.participants.get_mut(&id) else {
            return false;
        };
        participant.connection = None;
        participant.connection_lost_at = Some(now);
        let is_host = participant.is_host;

        let grace = self.settings.timings.disconnect_grace;
        self.arm(
            TimerName::DisconnectGrace(id.clone()),
            grace,
            TimerAction::GraceExpired {
                participant: id.clone(),
            },
            now,
        );
        info!(participant = %id, grace_secs = grace.as_secs(), "Connection lost");

        if is_host {
            self.pause(PauseReason::HostDisconnected);
        }
        true
    }

    pub fn heartbeat(&mut self, connection: ConnectionId, now: Instant) -> bool {
        let Some(id) = self.participant_for_connection(connection) else {
            return false;
        };
        match self.session.participants.get_mut(&id) {
            Some(p) => {
                p.last_heartbeat = now;
                true
            }
            None => false,
        }
    }

    /// Grace ran out without a reconnect: mark the participant disconnected
    /// and start the absolute reconnection window from the first disconnect.
    pub(super) fn grace_expired(&mut self, id: &ParticipantId, now: Instant) {
        let window = self.settings.timings.reconnect_window;
        let Some(participant) = self.session.participants.get_mut(id) else {
            return;
        };
        if participant.connection.is_some() {
            debug!(participant = %id, "Reconnected before grace expired");
            return;
        }
        participant.connected = false;
        let lost_at = participant.connection_lost_at.unwrap_or(now);
        let disconnected_at = *participant.disconnected_at.get_or_insert(lost_at);

        let window_name = TimerName::ReconnectWindow(id.clone());
        if !self.timers.is_armed(&window_name) {
            let remaining = window.saturating_sub(now.saturating_duration_since(disconnected_at));
            if remaining.is_zero() {
                self.remove_participant(id, None, now);
                return;
            }
            self.arm(
                window_name,
                remaining,
                TimerAction::ReconnectWindowClosed {
                    participant: id.clone(),
                },
                now,
            );
        }
        warn!(participant = %id, "Participant disconnected");
        self.check_voting_complete(now);
    }

    /// Permanently drop a participant and repair whatever the game needs.
    pub(super) fn remove_participant(
        &mut self,
        id: &ParticipantId,
        close: Option<(ErrorCode, String)>,
        now: Instant,
    ) {
        let Some(removed) = self.session.participants.remove(id) else {
            return;
        };
        self.cancel_participant_timers(id);
        if let (Some(connection), Some((code, message))) = (removed.connection, close) {
            self.effects.push(Effect::CloseConnection {
                connection,
                code,
                message,
            });
        }
        self.session.remove_from_turn_order(id);
        info!(
            participant = %id,
            remaining = self.session.participants.len(),
            "Participant removed"
        );

        let phase = self.session.effective_phase();
        if removed.is_host && phase != Phase::End {
            info!("Host left the game");
            self.end_game(now);
        } else if self.session.is_hidden_role_holder(id) && phase.is_secret() {
            self.abandon_round(id.clone(), removed.display_name, now);
        } else if phase == Phase::Vote {
            self.check_voting_complete(now);
        }
    }
}
