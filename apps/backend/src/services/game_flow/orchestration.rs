//! Timer dispatch and host commands.

use std::time::Instant;

use rand::{CryptoRng, Rng};
use tracing::{debug, info};

use super::{AdminCommand, GameFlow, TimerAction};
use crate::domain::participants::ConnectionId;
use crate::domain::state::{PauseReason, PauseState, Phase};
use crate::domain::timers::TimerName;
use crate::errors::domain::{
    ConflictKind, DomainError, NotFoundKind, PhaseKind, ValidationKind,
};
use crate::errors::ErrorCode;

impl<R: Rng + CryptoRng> GameFlow<R> {
    /// A scheduled timer elapsed. Returns `true` when the session changed.
    ///
    /// Timers that were cancelled or re-armed since scheduling, or whose
    /// round or phase has moved on, are ignored.
    pub fn on_timer(&mut self, name: &TimerName, generation: u64, now: Instant) -> bool {
        let Some(action) = self.timers.fire(name, generation) else {
            debug!(timer = %name, generation, "Stale timer ignored");
            return false;
        };
        let round = self.session.round_number;
        let phase = self.session.phase;
        match action {
            TimerAction::EndRoleDisplay { round: r } if r == round && phase == Phase::Roles => {
                self.begin_questioning(now);
            }
            TimerAction::EndQuestioning { round: r }
                if r == round && phase == Phase::Questioning =>
            {
                info!(round, "Questioning time is up");
                self.open_voting(None, now);
            }
            TimerAction::CloseVoting { round: r } if r == round && phase == Phase::Vote => {
                info!(round, "Vote timer expired");
                self.close_voting(now);
            }
            TimerAction::EndReveal { round: r } if r == round && phase == Phase::Reveal => {
                self.end_reveal(now);
            }
            TimerAction::AdvanceRound { round: r } if r == round && phase == Phase::Scoring => {
                self.advance_round(now);
            }
            TimerAction::GraceExpired { participant } => {
                self.grace_expired(&participant, now);
            }
            TimerAction::ReconnectWindowClosed { participant } => {
                info!(participant = %participant, "Reconnection window closed");
                self.remove_participant(&participant, None, now);
            }
            other => {
                debug!(timer = %name, action = ?other, round, phase = ?phase, "Timer no longer applies");
                return false;
            }
        }
        true
    }

    /// Run a host-only command from `connection`.
    pub fn admin(
        &mut self,
        connection: ConnectionId,
        command: AdminCommand,
        now: Instant,
    ) -> Result<(), DomainError> {
        let host = self.require_host(connection)?;
        debug!(host = %host, command = ?command, "Admin command");

        match command {
            AdminCommand::StartGame => self.start_game(now),
            AdminCommand::PauseGame => {
                if self.pause(PauseReason::HostRequested) {
                    Ok(())
                } else {
                    Err(DomainError::phase(
                        PhaseKind::Mismatch,
                        "The game cannot be paused now",
                    ))
                }
            }
            AdminCommand::ResumeGame => {
                if self.resume(now) {
                    Ok(())
                } else {
                    Err(DomainError::phase(PhaseKind::Mismatch, "The game is not paused"))
                }
            }
            AdminCommand::EndGame => {
                if self.session.phase == Phase::End {
                    return Err(DomainError::phase(
                        PhaseKind::Mismatch,
                        "The game has already ended",
                    ));
                }
                self.end_game(now);
                Ok(())
            }
            AdminCommand::KickParticipant(target) => {
                if target == host {
                    return Err(DomainError::validation(
                        ValidationKind::Target,
                        "The host cannot remove themselves",
                    ));
                }
                if self.session.participants.get(&target).is_none() {
                    return Err(DomainError::not_found(
                        NotFoundKind::Participant,
                        format!("No participant '{target}'"),
                    ));
                }
                self.remove_participant(
                    &target,
                    Some((ErrorCode::SessionExpired, "You were removed by the host".into())),
                    now,
                );
                Ok(())
            }
            AdminCommand::AdvanceTurn => {
                if self.session.phase != Phase::Questioning {
                    return Err(DomainError::phase(
                        PhaseKind::Mismatch,
                        "Turns only advance during questioning",
                    ));
                }
                self.session.advance_questioner();
                Ok(())
            }
            AdminCommand::Configure(patch) => {
                if self.session.effective_phase() != Phase::Lobby {
                    return Err(DomainError::conflict(
                        ConflictKind::GameAlreadyStarted,
                        "Settings are locked once the game starts",
                    ));
                }
                self.session.config = self.session.config.patched(patch, &self.catalog)?;
                info!(config = ?self.session.config, "Game configured");
                Ok(())
            }
        }
    }

    /// Freeze the current phase. Returns `false` if there is nothing to pause.
    pub(super) fn pause(&mut self, reason: PauseReason) -> bool {
        let phase = self.session.phase;
        if matches!(phase, Phase::End | Phase::Paused) {
            return false;
        }
        self.cancel_phase_timers();
        self.session.pause = Some(PauseState {
            prior: phase,
            reason,
        });
        self.session.phase = Phase::Paused;
        info!(prior = ?phase, reason = ?reason, "Game paused");
        true
    }

    /// Return to the paused-from phase with a fresh phase clock.
    pub(super) fn resume(&mut self, now: Instant) -> bool {
        if self.session.phase != Phase::Paused {
            return false;
        }
        let Some(pause) = self.session.pause.take() else {
            return false;
        };
        self.session.phase = pause.prior;
        self.arm_phase_timer(pause.prior, now);
        info!(phase = ?pause.prior, "Game resumed");
        match pause.prior {
            Phase::Roles => self.send_role_cards_to_all(),
            Phase::Vote => self.check_voting_complete(now),
            _ => {}
        }
        true
    }
}
