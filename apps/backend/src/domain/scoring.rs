//! Round scoring: ballots and the true assignment in, point deltas out.
//!
//! Everything here is pure. Deltas are computed against the pre-round
//! totals and applied as one batch by [`apply_deltas`].

use std::collections::BTreeMap;

use serde::Serialize;

use crate::config::game::ScoringRules;
use crate::domain::participants::{ParticipantId, ParticipantRegistry};
use crate::errors::domain::{DomainError, ValidationKind};

/// Bet attached to a vote, 1 to 3.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct Confidence(u8);

impl Confidence {
    pub const MIN: u8 = 1;
    pub const MAX: u8 = 3;

    pub fn new(value: u8) -> Result<Self, DomainError> {
        if (Self::MIN..=Self::MAX).contains(&value) {
            Ok(Self(value))
        } else {
            Err(DomainError::validation(
                ValidationKind::Message,
                format!("Confidence must be between {} and {}", Self::MIN, Self::MAX),
            ))
        }
    }

    pub fn get(self) -> u8 {
        self.0
    }

    fn points(self) -> i32 {
        i32::from(self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Ballot {
    Vote {
        target: ParticipantId,
        confidence: Confidence,
    },
    Abstain,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OutcomeTag {
    HolderCaught,
    InnocentConvicted,
    NoConviction,
    LocationGuessCorrect,
    LocationGuessWrong,
    HolderDeparted,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocationGuess {
    pub location_id: String,
    pub correct: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoundScore {
    /// One entry per participant in the round, zero included.
    pub deltas: BTreeMap<ParticipantId, i32>,
    /// Votes received, abstentions excluded.
    pub tally: BTreeMap<ParticipantId, u32>,
    pub convicted: Option<ParticipantId>,
    pub outcome: OutcomeTag,
}

fn zeroed(roster: &[ParticipantId]) -> BTreeMap<ParticipantId, i32> {
    roster.iter().map(|id| (id.clone(), 0)).collect()
}

/// Count votes per target. A strict single maximum convicts; any tie at the
/// top, or no votes at all, convicts nobody.
pub fn tally_votes(
    ballots: &[(ParticipantId, Ballot)],
) -> (BTreeMap<ParticipantId, u32>, Option<ParticipantId>) {
    let mut tally: BTreeMap<ParticipantId, u32> = BTreeMap::new();
    for (_, ballot) in ballots {
        if let Ballot::Vote { target, .. } = ballot {
            *tally.entry(target.clone()).or_default() += 1;
        }
    }

    let Some(top) = tally.values().copied().max() else {
        return (tally, None);
    };
    let mut leaders = tally.iter().filter(|(_, &n)| n == top);
    let convicted = match (leaders.next(), leaders.next()) {
        (Some((id, _)), None) => Some(id.clone()),
        _ => None,
    };
    (tally, convicted)
}

/// Resolve a round that ended by vote.
pub fn score_votes(
    roster: &[ParticipantId],
    ballots: &[(ParticipantId, Ballot)],
    holder: &ParticipantId,
    rules: &ScoringRules,
) -> RoundScore {
    let mut deltas = zeroed(roster);
    let (tally, convicted) = tally_votes(ballots);

    let Some(convicted_id) = convicted.clone() else {
        for (voter, _) in ballots {
            deltas.entry(voter.clone()).or_insert(0);
        }
        return RoundScore {
            deltas,
            tally,
            convicted: None,
            outcome: OutcomeTag::NoConviction,
        };
    };

    let holder_caught = &convicted_id == holder;
    for (voter, ballot) in ballots {
        let entry = deltas.entry(voter.clone()).or_insert(0);
        let Ballot::Vote { target, confidence } = ballot else {
            continue;
        };
        if holder_caught && target == holder {
            *entry += rules.correct_vote_multiplier * confidence.points();
        } else {
            *entry -= rules.wrong_vote_multiplier * confidence.points();
        }

        if voter == holder
            && target == &convicted_id
            && confidence.get() == rules.double_agent_confidence
        {
            *entry += rules.double_agent_bonus;
        }
    }

    RoundScore {
        deltas,
        tally,
        convicted,
        outcome: if holder_caught {
            OutcomeTag::HolderCaught
        } else {
            OutcomeTag::InnocentConvicted
        },
    }
}

/// Resolve a round that ended with the holder guessing the location.
/// Only the holder's score moves.
pub fn score_location_guess(
    roster: &[ParticipantId],
    holder: &ParticipantId,
    guess: &LocationGuess,
    rules: &ScoringRules,
) -> RoundScore {
    let mut deltas = zeroed(roster);
    let (delta, outcome) = if guess.correct {
        (rules.spy_guess_correct_points, OutcomeTag::LocationGuessCorrect)
    } else {
        (-rules.spy_guess_wrong_penalty, OutcomeTag::LocationGuessWrong)
    };
    deltas.insert(holder.clone(), delta);
    RoundScore {
        deltas,
        tally: BTreeMap::new(),
        convicted: None,
        outcome,
    }
}

/// Round abandoned because the holder left for good.
pub fn holder_departed(roster: &[ParticipantId]) -> RoundScore {
    RoundScore {
        deltas: zeroed(roster),
        tally: BTreeMap::new(),
        convicted: None,
        outcome: OutcomeTag::HolderDeparted,
    }
}

/// Add every delta to the matching participant's running total.
pub fn apply_deltas(registry: &mut ParticipantRegistry, score: &RoundScore) {
    for (id, delta) in &score.deltas {
        if let Some(p) = registry.get_mut(id) {
            p.score += delta;
        }
    }
}
