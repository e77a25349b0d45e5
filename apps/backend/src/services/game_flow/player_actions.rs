//! Participant intents during a round: votes, location guesses, calling a vote.

use std::time::Instant;

use rand::{CryptoRng, Rng};
use tracing::{debug, info};

use super::GameFlow;
use crate::domain::participants::{ConnectionId, ParticipantId, ABSTAIN};
use crate::domain::scoring::{Ballot, Confidence, LocationGuess};
use crate::domain::state::Phase;
use crate::errors::domain::{ConflictKind, DomainError, ForbiddenKind, PhaseKind, ValidationKind};

impl<R: Rng + CryptoRng> GameFlow<R> {
    fn require_voting_open(&self) -> Result<(), DomainError> {
        match self.session.phase {
            Phase::Vote => Ok(()),
            Phase::Reveal | Phase::Scoring => Err(DomainError::phase(
                PhaseKind::VoteClosed,
                "Voting has closed for this round",
            )),
            _ => Err(DomainError::phase(
                PhaseKind::Mismatch,
                "Voting is not open",
            )),
        }
    }

    fn require_not_acted(&self, id: &ParticipantId) -> Result<(), DomainError> {
        match self.session.participants.get(id) {
            Some(p) if p.has_acted => Err(DomainError::conflict(
                ConflictKind::AlreadyVoted,
                "You have already acted this round",
            )),
            Some(_) => Ok(()),
            None => Err(DomainError::forbidden(
                ForbiddenKind::NotInGame,
                "Join the game first",
            )),
        }
    }

    /// Cast a ballot. `target` is a participant id or `"abstain"`; the first
    /// accepted ballot is final. A vote for someone must carry a confidence;
    /// an abstention ignores it.
    pub fn vote(
        &mut self,
        connection: ConnectionId,
        target: &str,
        confidence: Option<u8>,
        now: Instant,
    ) -> Result<(), DomainError> {
        let voter = self.require_participant(connection)?;
        self.require_voting_open()?;
        self.require_not_acted(&voter)?;

        let ballot = if target.trim().eq_ignore_ascii_case(ABSTAIN) {
            Ballot::Abstain
        } else {
            let target = ParticipantId::from_display_name(target.trim());
            if target == voter {
                return Err(DomainError::validation(
                    ValidationKind::Target,
                    "You cannot vote for yourself",
                ));
            }
            if self.session.participants.get(&target).is_none() {
                return Err(DomainError::validation(
                    ValidationKind::Target,
                    "No such participant",
                ));
            }
            let Some(confidence) = confidence else {
                return Err(DomainError::validation(
                    ValidationKind::Message,
                    format!(
                        "A vote needs a confidence between {} and {}",
                        Confidence::MIN,
                        Confidence::MAX
                    ),
                ));
            };
            let confidence = Confidence::new(confidence)?;
            Ballot::Vote { target, confidence }
        };

        if let Some(p) = self.session.participants.get_mut(&voter) {
            p.ballot = Some(ballot);
            p.has_acted = true;
        }
        debug!(round = self.session.round_number, voter = %voter, "Ballot recorded");
        self.check_voting_complete(now);
        Ok(())
    }

    /// The hidden-role holder names the location instead of voting. Ends the
    /// round immediately either way.
    pub fn guess_location(
        &mut self,
        connection: ConnectionId,
        location_id: &str,
        now: Instant,
    ) -> Result<(), DomainError> {
        let guesser = self.require_participant(connection)?;
        self.require_voting_open()?;
        if !self.session.is_hidden_role_holder(&guesser) {
            return Err(DomainError::forbidden(
                ForbiddenKind::NotHiddenRoleHolder,
                "Only the spy can guess the location",
            ));
        }
        self.require_not_acted(&guesser)?;
        if !self
            .session
            .possible_locations
            .iter()
            .any(|l| l.id == location_id)
        {
            return Err(DomainError::validation(
                ValidationKind::Location,
                format!("Unknown location '{location_id}'"),
            ));
        }

        let correct = self
            .session
            .current_location
            .as_ref()
            .is_some_and(|l| l.id == location_id);
        self.session.location_guess = Some(LocationGuess {
            location_id: location_id.to_string(),
            correct,
        });
        if let Some(p) = self.session.participants.get_mut(&guesser) {
            p.has_acted = true;
        }
        info!(round = self.session.round_number, "Location guessed");
        self.close_voting(now);
        Ok(())
    }

    /// Any participant may cut questioning short.
    pub fn call_vote(&mut self, connection: ConnectionId, now: Instant) -> Result<(), DomainError> {
        let caller = self.require_participant(connection)?;
        if self.session.phase != Phase::Questioning {
            return Err(DomainError::phase(
                PhaseKind::Mismatch,
                "A vote can only be called during questioning",
            ));
        }
        info!(round = self.session.round_number, caller = %caller, "Vote called");
        self.open_voting(Some(caller), now);
        Ok(())
    }
}
