//! Game flow engine - the phase state machine.
//!
//! [`GameFlow`] owns the session, the timer registry and the random source.
//! Every intent is a method taking the current instant; nothing here
//! blocks, sleeps, or performs I/O. Work that must happen outside the
//! engine (scheduling timers, private messages, closing sockets) is queued
//! as [`Effect`]s for the caller to drain after each call.

mod membership;
mod orchestration;
mod player_actions;
mod round_lifecycle;

#[cfg(test)]
mod tests_player_actions;

use std::sync::Arc;
use std::time::{Duration, Instant};

use rand::{CryptoRng, Rng};

use crate::config::game::{ConfigPatch, EngineSettings, GameConfig};
use crate::domain::content::ContentCatalog;
use crate::domain::participants::{ConnectionId, ParticipantId};
use crate::domain::player_view::{project, role_card, PlayerView, RoleCard, TimerView, Viewer};
use crate::domain::state::GameSession;
use crate::domain::timers::{TimerHandle, TimerName, TimerRegistry};
use crate::errors::domain::{DomainError, ForbiddenKind};
use crate::errors::ErrorCode;

pub use membership::{JoinOutcome, JoinRequest};

/// What a timer does when it fires, with the context captured at arm time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TimerAction {
    EndRoleDisplay { round: u32 },
    EndQuestioning { round: u32 },
    CloseVoting { round: u32 },
    EndReveal { round: u32 },
    AdvanceRound { round: u32 },
    GraceExpired { participant: ParticipantId },
    ReconnectWindowClosed { participant: ParticipantId },
}

/// Side effects requested by the engine.
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    ScheduleTimer(TimerHandle),
    CancelTimer(TimerName),
    SendRoleAssignment {
        participant: ParticipantId,
        round: u32,
        card: RoleCard,
    },
    CloseConnection {
        connection: ConnectionId,
        code: ErrorCode,
        message: String,
    },
}

/// Host-only commands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AdminCommand {
    StartGame,
    PauseGame,
    ResumeGame,
    EndGame,
    KickParticipant(ParticipantId),
    AdvanceTurn,
    Configure(ConfigPatch),
}

pub struct GameFlow<R> {
    session: GameSession,
    timers: TimerRegistry<TimerAction>,
    settings: EngineSettings,
    catalog: Arc<ContentCatalog>,
    rng: R,
    effects: Vec<Effect>,
}

impl<R: Rng + CryptoRng> GameFlow<R> {
    pub fn new(
        config: GameConfig,
        settings: EngineSettings,
        catalog: Arc<ContentCatalog>,
        rng: R,
    ) -> Result<Self, DomainError> {
        config.validate(&catalog)?;
        Ok(Self {
            session: GameSession::new(config),
            timers: TimerRegistry::new(),
            settings,
            catalog,
            rng,
            effects: Vec::new(),
        })
    }

    pub fn session(&self) -> &GameSession {
        &self.session
    }

    pub fn settings(&self) -> &EngineSettings {
        &self.settings
    }

    pub fn catalog(&self) -> &ContentCatalog {
        &self.catalog
    }

    /// Take every effect queued since the last drain, in order.
    pub fn drain_effects(&mut self) -> Vec<Effect> {
        std::mem::take(&mut self.effects)
    }

    pub fn participant_for_connection(&self, connection: ConnectionId) -> Option<ParticipantId> {
        self.session
            .participants
            .by_connection(connection)
            .map(|p| p.id.clone())
    }

    pub fn connection_of(&self, id: &ParticipantId) -> Option<ConnectionId> {
        self.session.participants.get(id).and_then(|p| p.connection)
    }

    /// Projected view for one viewer at `now`.
    pub fn view_for(&self, viewer: Viewer<'_>, now: Instant) -> PlayerView {
        project(&self.session, self.phase_clock(now), viewer)
    }

    /// View for whoever is on `connection`; observers get the public view.
    pub fn view_for_connection(&self, connection: ConnectionId, now: Instant) -> PlayerView {
        match self.participant_for_connection(connection) {
            Some(id) => self.view_for(Viewer::Participant(&id), now),
            None => self.view_for(Viewer::Observer, now),
        }
    }

    fn phase_clock(&self, now: Instant) -> Option<TimerView> {
        TimerName::PHASE.iter().find_map(|name| {
            let remaining = self.timers.remaining(name, now)?;
            let total = self.timers.total(name)?;
            Some(TimerView {
                name: name.to_string(),
                remaining_seconds: remaining.as_millis().div_ceil(1000) as u64,
                total_seconds: total.as_secs(),
            })
        })
    }

    fn arm(&mut self, name: TimerName, delay: Duration, action: TimerAction, now: Instant) {
        let handle = self.timers.arm(name, delay, action, now);
        self.effects.push(Effect::ScheduleTimer(handle));
    }

    fn cancel(&mut self, name: TimerName) {
        if self.timers.cancel(&name) {
            self.effects.push(Effect::CancelTimer(name));
        }
    }

    fn cancel_phase_timers(&mut self) {
        for name in TimerName::PHASE {
            self.cancel(name);
        }
    }

    fn cancel_participant_timers(&mut self, id: &ParticipantId) {
        self.cancel(TimerName::DisconnectGrace(id.clone()));
        self.cancel(TimerName::ReconnectWindow(id.clone()));
    }

    fn require_participant(&self, connection: ConnectionId) -> Result<ParticipantId, DomainError> {
        self.participant_for_connection(connection).ok_or_else(|| {
            DomainError::forbidden(ForbiddenKind::NotInGame, "Join the game first")
        })
    }

    fn require_host(&self, connection: ConnectionId) -> Result<ParticipantId, DomainError> {
        let id = self.require_participant(connection)?;
        match self.session.participants.get(&id) {
            Some(p) if p.is_host => Ok(id),
            _ => Err(DomainError::forbidden(
                ForbiddenKind::NotHost,
                "Only the host can do that",
            )),
        }
    }

    fn send_role_card(&mut self, id: &ParticipantId) {
        let Some(card) = role_card(&self.session, id) else {
            return;
        };
        self.effects.push(Effect::SendRoleAssignment {
            participant: id.clone(),
            round: self.session.round_number,
            card,
        });
    }

    fn send_role_cards_to_all(&mut self) {
        let reachable: Vec<ParticipantId> = self
            .session
            .participants
            .iter()
            .filter(|p| p.connection.is_some())
            .map(|p| p.id.clone())
            .collect();
        for id in reachable {
            self.send_role_card(&id);
        }
    }
}
