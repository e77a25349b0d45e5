//! Phase entry, round setup, reveal and game end.

use std::sync::Arc;
use std::time::Instant;

use rand::{CryptoRng, Rng};
use tracing::{debug, info, warn};

use super::{GameFlow, TimerAction};
use crate::config::game::MIN_PLAYERS;
use crate::domain::participants::ParticipantId;
use crate::domain::roles::{assign_roles, shuffled_turn_order};
use crate::domain::scoring::{
    apply_deltas, holder_departed, score_location_guess, score_votes, Ballot, RoundScore,
};
use crate::domain::state::{Phase, RoundResult, RoundSummary};
use crate::domain::timers::TimerName;
use crate::errors::domain::{ConflictKind, DomainError, PhaseKind, ValidationKind};

impl<R: Rng + CryptoRng> GameFlow<R> {
    pub(super) fn start_game(&mut self, now: Instant) -> Result<(), DomainError> {
        if self.session.effective_phase() != Phase::Lobby {
            return Err(DomainError::conflict(
                ConflictKind::GameAlreadyStarted,
                "The game has already started",
            ));
        }
        if self.session.is_paused() {
            return Err(DomainError::phase(
                PhaseKind::Mismatch,
                "Resume the game before starting",
            ));
        }
        let connected = self.session.participants.connected_count();
        if connected < MIN_PLAYERS {
            return Err(DomainError::conflict(
                ConflictKind::NotEnoughPlayers,
                format!("Need at least {MIN_PLAYERS} connected players (have {connected})"),
            ));
        }

        self.deal_round(1, now)?;
        info!(
            participants = connected,
            rounds = self.session.configured_round_count(),
            "Game started"
        );
        Ok(())
    }

    /// Deal a fresh round and enter ROLES. Nothing is mutated if dealing fails.
    fn deal_round(&mut self, round: u32, now: Instant) -> Result<(), DomainError> {
        let catalog = Arc::clone(&self.catalog);
        let Some(pack) = catalog.pack(&self.session.config.location_pack) else {
            return Err(DomainError::validation(
                ValidationKind::LocationPack,
                format!("Unknown location pack '{}'", self.session.config.location_pack),
            ));
        };
        let ids = self.session.participants.connected_ids();
        let dealt = assign_roles(&ids, pack, self.settings.role_repeat, &mut self.rng)?;

        self.session.participants.clear_round_state();
        for (id, role) in dealt.roles {
            if let Some(p) = self.session.participants.get_mut(&id) {
                p.role = Some(role);
            }
        }
        self.session.round_number = round;
        self.session.hidden_role_holder = Some(dealt.holder);
        self.session.current_location = Some(dealt.location);
        self.session.possible_locations = pack.summaries();
        self.session.turn_order.clear();
        self.session.current_questioner_index = 0;
        self.session.vote_caller = None;
        self.session.location_guess = None;

        debug!(round, participants = ids.len(), "Roles dealt");
        self.enter_phase(Phase::Roles, now);
        Ok(())
    }

    /// Switch to `phase` and arm its clock. While paused, only the phase to
    /// resume into changes.
    pub(super) fn enter_phase(&mut self, phase: Phase, now: Instant) {
        self.cancel_phase_timers();
        if let Some(pause) = self.session.pause.as_mut() {
            pause.prior = phase;
            return;
        }
        self.session.phase = phase;
        self.arm_phase_timer(phase, now);
        if phase == Phase::Roles {
            self.send_role_cards_to_all();
        }
    }

    pub(super) fn arm_phase_timer(&mut self, phase: Phase, now: Instant) {
        let round = self.session.round_number;
        let timings = &self.settings.timings;
        let (name, delay, action) = match phase {
            Phase::Roles => (
                TimerName::RoleDisplay,
                timings.role_display,
                TimerAction::EndRoleDisplay { round },
            ),
            Phase::Questioning => (
                TimerName::Round,
                self.session.config.round_duration(),
                TimerAction::EndQuestioning { round },
            ),
            Phase::Vote => (
                TimerName::Vote,
                timings.vote,
                TimerAction::CloseVoting { round },
            ),
            Phase::Reveal => (
                TimerName::RevealDelay,
                timings.reveal_delay,
                TimerAction::EndReveal { round },
            ),
            Phase::Scoring => (
                TimerName::ScoringDisplay,
                timings.scoring_display,
                TimerAction::AdvanceRound { round },
            ),
            Phase::Lobby | Phase::Paused | Phase::End => return,
        };
        self.arm(name, delay, action, now);
    }

    pub(super) fn begin_questioning(&mut self, now: Instant) {
        let ids = self.session.participants.connected_ids();
        self.session.turn_order = shuffled_turn_order(&ids, &mut self.rng);
        self.session.current_questioner_index = 0;
        self.enter_phase(Phase::Questioning, now);
    }

    pub(super) fn open_voting(&mut self, caller: Option<ParticipantId>, now: Instant) {
        self.session.vote_caller = caller;
        self.enter_phase(Phase::Vote, now);
    }

    /// Close the vote once every connected participant has acted.
    pub(super) fn check_voting_complete(&mut self, now: Instant) {
        if self.session.phase != Phase::Vote {
            return;
        }
        let everyone_acted = self
            .session
            .participants
            .iter()
            .filter(|p| p.connected)
            .all(|p| p.has_acted);
        if everyone_acted {
            debug!(round = self.session.round_number, "All connected participants acted");
            self.close_voting(now);
        }
    }

    /// Resolve the round: abstain for anyone who did not act, score, reveal.
    pub(super) fn close_voting(&mut self, now: Instant) {
        let Some(holder) = self.session.hidden_role_holder.clone() else {
            warn!(round = self.session.round_number, "Closing a vote without a hidden role holder");
            return;
        };

        let guess = self.session.location_guess.clone();
        for p in self.session.participants.iter_mut() {
            if p.ballot.is_none() && !(guess.is_some() && p.id == holder) {
                p.ballot = Some(Ballot::Abstain);
            }
        }
        let ballots: Vec<(ParticipantId, Ballot)> = self
            .session
            .participants
            .iter()
            .filter_map(|p| p.ballot.clone().map(|b| (p.id.clone(), b)))
            .collect();
        let roster = self.session.participants.ids();

        let score = match &guess {
            Some(guess) => score_location_guess(&roster, &holder, guess, &self.settings.scoring),
            None => score_votes(&roster, &ballots, &holder, &self.settings.scoring),
        };
        let holder_name = self
            .session
            .participants
            .get(&holder)
            .map(|p| p.display_name.clone())
            .unwrap_or_else(|| holder.to_string());

        self.finish_round(holder, holder_name, ballots, score, now);
    }

    /// The holder left for good mid-round; reveal without scoring.
    pub(super) fn abandon_round(&mut self, holder: ParticipantId, holder_name: String, now: Instant) {
        let ballots: Vec<(ParticipantId, Ballot)> = self
            .session
            .participants
            .iter()
            .filter_map(|p| p.ballot.clone().map(|b| (p.id.clone(), b)))
            .collect();
        let score = holder_departed(&self.session.participants.ids());
        self.finish_round(holder, holder_name, ballots, score, now);
    }

    fn finish_round(
        &mut self,
        holder: ParticipantId,
        holder_name: String,
        ballots: Vec<(ParticipantId, Ballot)>,
        score: RoundScore,
        now: Instant,
    ) {
        let Some(location) = self.session.current_location.clone() else {
            warn!(round = self.session.round_number, "Finishing a round without a location");
            return;
        };

        apply_deltas(&mut self.session.participants, &score);
        info!(
            round = self.session.round_number,
            outcome = ?score.outcome,
            convicted = ?score.convicted,
            "Round revealed"
        );

        let result = RoundResult {
            round: self.session.round_number,
            location,
            holder,
            holder_name,
            ballots,
            location_guess: self.session.location_guess.clone(),
            score,
        };
        self.session
            .round_history
            .push(RoundSummary::from_result(&result));
        self.session.last_round = Some(result);
        self.enter_phase(Phase::Reveal, now);
    }

    pub(super) fn end_reveal(&mut self, now: Instant) {
        self.session.hidden_role_holder = None;
        self.enter_phase(Phase::Scoring, now);
    }

    pub(super) fn advance_round(&mut self, now: Instant) {
        let round = self.session.round_number;
        if round >= self.session.configured_round_count() {
            info!(round, "All rounds played");
            self.end_game(now);
            return;
        }
        let connected = self.session.participants.connected_count();
        if connected < MIN_PLAYERS {
            info!(round, connected, "Too few players to continue");
            self.end_game(now);
            return;
        }

        if let Err(err) = self.deal_round(round + 1, now) {
            warn!(round = round + 1, error = %err, "Could not deal the next round");
            self.end_game(now);
        }
    }

    pub(super) fn end_game(&mut self, _now: Instant) {
        for name in self.timers.cancel_all() {
            self.effects.push(super::Effect::CancelTimer(name));
        }
        self.session.phase = Phase::End;
        self.session.pause = None;
        self.session.hidden_role_holder = None;
        self.session.current_location = None;
        self.session.turn_order.clear();
        info!(
            rounds_played = self.session.round_number,
            spies_caught = self.session.holders_caught(),
            "Game ended"
        );
    }
}
