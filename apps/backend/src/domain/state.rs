use std::collections::BTreeMap;

use serde::Serialize;

use crate::config::game::GameConfig;
use crate::domain::content::{Location, LocationSummary};
use crate::domain::participants::{ParticipantId, ParticipantRegistry};
use crate::domain::scoring::{Ballot, LocationGuess, OutcomeTag, RoundScore};

/// Overall game progression phases.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Phase {
    /// Waiting for players; host may configure and start.
    Lobby,
    /// Roles dealt, cards on screen.
    Roles,
    /// Players question each other in turn.
    Questioning,
    /// Ballots and bets are being collected.
    Vote,
    /// Outcome shown before scores.
    Reveal,
    /// Round scores shown.
    Scoring,
    /// Frozen; see [`PauseState`].
    Paused,
    /// Game over.
    End,
}

impl Phase {
    /// Phases during which a hidden-role holder must be set.
    pub fn has_hidden_role_holder(self) -> bool {
        matches!(
            self,
            Phase::Roles | Phase::Questioning | Phase::Vote | Phase::Reveal
        )
    }

    /// Phases that keep the round's secrets hidden.
    pub fn is_secret(self) -> bool {
        matches!(self, Phase::Roles | Phase::Questioning | Phase::Vote)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum PauseReason {
    HostDisconnected,
    HostRequested,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PauseState {
    /// Phase to return to on resume.
    pub prior: Phase,
    pub reason: PauseReason,
}

/// Archived result of the most recent reveal.
#[derive(Debug, Clone)]
pub struct RoundResult {
    pub round: u32,
    pub location: Location,
    pub holder: ParticipantId,
    /// Kept separately so a departed holder can still be named.
    pub holder_name: String,
    pub ballots: Vec<(ParticipantId, Ballot)>,
    pub location_guess: Option<LocationGuess>,
    pub score: RoundScore,
}

/// One line of the per-game archive, kept for every revealed round.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoundSummary {
    pub round: u32,
    pub holder: ParticipantId,
    pub holder_name: String,
    pub location_id: String,
    pub convicted: Option<ParticipantId>,
    pub outcome: OutcomeTag,
    pub deltas: BTreeMap<ParticipantId, i32>,
}

impl RoundSummary {
    pub fn from_result(result: &RoundResult) -> Self {
        Self {
            round: result.round,
            holder: result.holder.clone(),
            holder_name: result.holder_name.clone(),
            location_id: result.location.id.clone(),
            convicted: result.score.convicted.clone(),
            outcome: result.score.outcome,
            deltas: result.score.deltas.clone(),
        }
    }

    pub fn holder_caught(&self) -> bool {
        self.outcome == OutcomeTag::HolderCaught
    }
}

/// Entire session container, sufficient for pure domain operations.
#[derive(Debug, Clone)]
pub struct GameSession {
    pub phase: Phase,
    /// Set only while `phase == Paused`.
    pub pause: Option<PauseState>,
    /// 1-based; 0 before the first round.
    pub round_number: u32,
    pub config: GameConfig,
    pub participants: ParticipantRegistry,
    pub current_location: Option<Location>,
    /// Locations of the active pack, shown to the holder.
    pub possible_locations: Vec<LocationSummary>,
    pub hidden_role_holder: Option<ParticipantId>,
    pub turn_order: Vec<ParticipantId>,
    pub current_questioner_index: usize,
    pub vote_caller: Option<ParticipantId>,
    pub location_guess: Option<LocationGuess>,
    pub last_round: Option<RoundResult>,
    /// Every revealed round, oldest first.
    pub round_history: Vec<RoundSummary>,
}

impl GameSession {
    pub fn new(config: GameConfig) -> Self {
        Self {
            phase: Phase::Lobby,
            pause: None,
            round_number: 0,
            config,
            participants: ParticipantRegistry::new(),
            current_location: None,
            possible_locations: Vec::new(),
            hidden_role_holder: None,
            turn_order: Vec::new(),
            current_questioner_index: 0,
            vote_caller: None,
            location_guess: None,
            last_round: None,
            round_history: Vec::new(),
        }
    }

    /// The phase that governs rules and visibility: the paused-from phase
    /// while paused, otherwise the current one.
    pub fn effective_phase(&self) -> Phase {
        match (&self.phase, &self.pause) {
            (Phase::Paused, Some(pause)) => pause.prior,
            (phase, _) => *phase,
        }
    }

    pub fn is_paused(&self) -> bool {
        self.phase == Phase::Paused
    }

    /// Rounds in which the vote convicted the hidden-role holder.
    pub fn holders_caught(&self) -> usize {
        self.round_history.iter().filter(|r| r.holder_caught()).count()
    }

    pub fn configured_round_count(&self) -> u32 {
        self.config.num_rounds
    }

    pub fn round_duration_seconds(&self) -> u64 {
        self.config.round_duration().as_secs()
    }

    pub fn is_hidden_role_holder(&self, id: &ParticipantId) -> bool {
        self.hidden_role_holder.as_ref() == Some(id)
    }

    /// `hidden_role_holder` is set exactly in the phases that need one.
    pub fn holder_invariant_holds(&self) -> bool {
        self.hidden_role_holder.is_some() == self.effective_phase().has_hidden_role_holder()
    }

    pub fn questioner(&self) -> Option<&ParticipantId> {
        self.turn_order.get(self.current_questioner_index)
    }

    /// Next connected participant after the questioner, wrapping around.
    pub fn answerer(&self) -> Option<&ParticipantId> {
        let n = self.turn_order.len();
        (1..n)
            .map(|step| &self.turn_order[(self.current_questioner_index + step) % n])
            .find(|id| self.participants.get(id).is_some_and(|p| p.connected))
    }

    /// Move the questioner to the next connected participant.
    pub fn advance_questioner(&mut self) {
        let n = self.turn_order.len();
        if n == 0 {
            return;
        }
        for step in 1..=n {
            let idx = (self.current_questioner_index + step) % n;
            let connected = self
                .participants
                .get(&self.turn_order[idx])
                .is_some_and(|p| p.connected);
            if connected {
                self.current_questioner_index = idx;
                return;
            }
        }
    }

    /// Drop a departed participant from the speaking order, keeping the
    /// current questioner where possible.
    pub fn remove_from_turn_order(&mut self, id: &ParticipantId) {
        let Some(pos) = self.turn_order.iter().position(|p| p == id) else {
            return;
        };
        self.turn_order.remove(pos);
        if pos < self.current_questioner_index {
            self.current_questioner_index -= 1;
        }
        if self.current_questioner_index >= self.turn_order.len() {
            self.current_questioner_index = 0;
        }
    }
}
