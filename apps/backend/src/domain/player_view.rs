//! Per-viewer projection of the session.
//!
//! [`project`] is the only way state leaves the engine. It decides what a
//! given viewer may see from the viewer's identity and the visibility of
//! the current phase:
//!
//! - Nobody sees another participant's role name or credential.
//! - Before the reveal nobody sees anyone else's vote or bet.
//! - The hidden-role holder gets the list of possible locations; everyone
//!   else gets the location, their own role and its hint.
//! - An observer (no identity) never gets role, vote, or bet fields.
//!
//! Participant views always serialize the same top-level keys, with `null`
//! for anything not visible, so the holder's payload cannot be told apart
//! from anyone else's by shape.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::config::game::{GameConfig, MAX_PLAYERS, MIN_PLAYERS};
use crate::domain::content::LocationSummary;
use crate::domain::participants::{Participant, ParticipantId};
use crate::domain::scoring::{Ballot, OutcomeTag};
use crate::domain::state::{GameSession, PauseReason, Phase, RoundResult, RoundSummary};

/// Who is asking.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Viewer<'a> {
    Observer,
    Participant(&'a ParticipantId),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Visibility {
    Lobby,
    /// Roles dealt, nothing revealed.
    Secret,
    /// Ballots, location and holder are public.
    Revealed,
    Final,
}

impl Visibility {
    fn of(phase: Phase) -> Self {
        match phase {
            Phase::Lobby | Phase::Paused => Visibility::Lobby,
            Phase::Roles | Phase::Questioning | Phase::Vote => Visibility::Secret,
            Phase::Reveal | Phase::Scoring => Visibility::Revealed,
            Phase::End => Visibility::Final,
        }
    }
}

/// Phase clock as reported to clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TimerView {
    pub name: String,
    pub remaining_seconds: u64,
    pub total_seconds: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ParticipantSummary {
    pub id: ParticipantId,
    pub display_name: String,
    pub connected: bool,
    pub is_host: bool,
    pub score: i32,
    pub has_acted: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BallotView {
    pub voter: ParticipantId,
    /// `None` for an abstention.
    pub target: Option<ParticipantId>,
    pub confidence: Option<u8>,
}

impl BallotView {
    fn new(voter: &ParticipantId, ballot: &Ballot) -> Self {
        match ballot {
            Ballot::Vote { target, confidence } => Self {
                voter: voter.clone(),
                target: Some(target.clone()),
                confidence: Some(confidence.get()),
            },
            Ballot::Abstain => Self {
                voter: voter.clone(),
                target: None,
                confidence: None,
            },
        }
    }
}

/// The viewer's own private state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SelfView {
    pub id: ParticipantId,
    pub display_name: String,
    pub is_host: bool,
    pub score: i32,
    pub has_acted: bool,
    pub vote: Option<BallotView>,
}

/// Secret card dealt at the start of a round.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum RoleCard {
    HiddenRoleHolder {
        possible_locations: Vec<LocationSummary>,
    },
    Civilian {
        location: LocationSummary,
        role_name: String,
        hint: String,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TurnView {
    pub questioner: Option<ParticipantId>,
    pub answerer: Option<ParticipantId>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VotingView {
    pub submitted: usize,
    pub eligible: usize,
    pub caller: Option<ParticipantId>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeltaView {
    pub participant_id: ParticipantId,
    pub delta: i32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TallyEntry {
    pub participant_id: ParticipantId,
    pub votes: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LocationGuessView {
    pub location_id: String,
    pub correct: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RevealView {
    pub round: u32,
    pub location: LocationSummary,
    pub hidden_role_holder: ParticipantId,
    pub hidden_role_holder_name: String,
    pub convicted: Option<ParticipantId>,
    pub outcome: OutcomeTag,
    pub location_guess: Option<LocationGuessView>,
    pub deltas: Vec<DeltaView>,
    /// Participants only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ballots: Option<Vec<BallotView>>,
    /// Participants only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tally: Option<Vec<TallyEntry>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Standing {
    pub rank: usize,
    pub participant_id: ParticipantId,
    pub display_name: String,
    pub score: i32,
    pub round_delta: i32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WinnerView {
    pub participant_ids: Vec<ParticipantId>,
    pub score: i32,
    pub tie: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RoundSummaryView {
    pub round: u32,
    pub hidden_role_holder: ParticipantId,
    pub hidden_role_holder_name: String,
    pub location_id: String,
    pub convicted: Option<ParticipantId>,
    pub outcome: OutcomeTag,
    pub deltas: Vec<DeltaView>,
}

impl From<&RoundSummary> for RoundSummaryView {
    fn from(summary: &RoundSummary) -> Self {
        Self {
            round: summary.round,
            hidden_role_holder: summary.holder.clone(),
            hidden_role_holder_name: summary.holder_name.clone(),
            location_id: summary.location_id.clone(),
            convicted: summary.convicted.clone(),
            outcome: summary.outcome,
            deltas: summary
                .deltas
                .iter()
                .map(|(id, delta)| DeltaView {
                    participant_id: id.clone(),
                    delta: *delta,
                })
                .collect(),
        }
    }
}

/// End-screen statistics with the per-round archive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GameStatsView {
    pub total_rounds: u32,
    pub spies_caught: usize,
    pub rounds: Vec<RoundSummaryView>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LobbyView {
    pub min_players: usize,
    pub max_players: usize,
    pub connected: usize,
    pub host_present: bool,
    pub can_start: bool,
}

/// Fields that exist only in a participant's view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PrivateView {
    pub me: SelfView,
    pub role: Option<RoleCard>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerView {
    pub phase: Phase,
    pub paused_phase: Option<Phase>,
    pub pause_reason: Option<PauseReason>,
    pub round_number: u32,
    pub total_rounds: u32,
    pub config: GameConfig,
    pub participants: Vec<ParticipantSummary>,
    pub timer: Option<TimerView>,
    pub turn: Option<TurnView>,
    pub voting: Option<VotingView>,
    pub reveal: Option<RevealView>,
    pub standings: Option<Vec<Standing>>,
    pub winner: Option<WinnerView>,
    pub game_stats: Option<GameStatsView>,
    pub lobby: Option<LobbyView>,
    #[serde(flatten)]
    pub private: Option<PrivateView>,
}

/// Card for one participant in the current round, if they have one.
pub fn role_card(session: &GameSession, id: &ParticipantId) -> Option<RoleCard> {
    if session.is_hidden_role_holder(id) {
        return Some(RoleCard::HiddenRoleHolder {
            possible_locations: session.possible_locations.clone(),
        });
    }
    let location = session.current_location.as_ref()?;
    let role = session.participants.get(id)?.role.as_ref()?;
    Some(RoleCard::Civilian {
        location: LocationSummary::from(location),
        role_name: role.name.clone(),
        hint: role.hint.clone(),
    })
}

fn summarize(p: &Participant) -> ParticipantSummary {
    ParticipantSummary {
        id: p.id.clone(),
        display_name: p.display_name.clone(),
        connected: p.connected,
        is_host: p.is_host,
        score: p.score,
        has_acted: p.has_acted,
    }
}

fn reveal_view(result: &RoundResult, viewer: Viewer<'_>) -> RevealView {
    let participant = matches!(viewer, Viewer::Participant(_));
    RevealView {
        round: result.round,
        location: LocationSummary::from(&result.location),
        hidden_role_holder: result.holder.clone(),
        hidden_role_holder_name: result.holder_name.clone(),
        convicted: result.score.convicted.clone(),
        outcome: result.score.outcome,
        location_guess: result.location_guess.as_ref().map(|g| LocationGuessView {
            location_id: g.location_id.clone(),
            correct: g.correct,
        }),
        deltas: result
            .score
            .deltas
            .iter()
            .map(|(id, delta)| DeltaView {
                participant_id: id.clone(),
                delta: *delta,
            })
            .collect(),
        ballots: participant.then(|| {
            result
                .ballots
                .iter()
                .map(|(voter, ballot)| BallotView::new(voter, ballot))
                .collect()
        }),
        tally: participant.then(|| {
            result
                .score
                .tally
                .iter()
                .map(|(id, votes)| TallyEntry {
                    participant_id: id.clone(),
                    votes: *votes,
                })
                .collect()
        }),
    }
}

/// Scores high to low; equal scores share a rank.
fn standings(session: &GameSession) -> Vec<Standing> {
    let round_deltas: BTreeMap<&ParticipantId, i32> = session
        .last_round
        .as_ref()
        .map(|r| r.score.deltas.iter().map(|(id, d)| (id, *d)).collect())
        .unwrap_or_default();

    let mut ordered: Vec<&Participant> = session.participants.iter().collect();
    ordered.sort_by(|a, b| b.score.cmp(&a.score).then_with(|| a.id.cmp(&b.id)));

    let mut out: Vec<Standing> = Vec::with_capacity(ordered.len());
    for (i, p) in ordered.iter().enumerate() {
        let rank = match out.last() {
            Some(prev) if prev.score == p.score => prev.rank,
            _ => i + 1,
        };
        out.push(Standing {
            rank,
            participant_id: p.id.clone(),
            display_name: p.display_name.clone(),
            score: p.score,
            round_delta: round_deltas.get(&p.id).copied().unwrap_or(0),
        });
    }
    out
}

fn game_stats(session: &GameSession) -> GameStatsView {
    GameStatsView {
        total_rounds: session.round_number,
        spies_caught: session.holders_caught(),
        rounds: session.round_history.iter().map(RoundSummaryView::from).collect(),
    }
}

fn winner(session: &GameSession) -> Option<WinnerView> {
    let top = session.participants.iter().map(|p| p.score).max()?;
    let participant_ids: Vec<ParticipantId> = session
        .participants
        .iter()
        .filter(|p| p.score == top)
        .map(|p| p.id.clone())
        .collect();
    Some(WinnerView {
        tie: participant_ids.len() > 1,
        participant_ids,
        score: top,
    })
}

/// Build the view `viewer` is allowed to see. `timer` is the active phase
/// clock, supplied by the caller that owns the timer registry.
pub fn project(session: &GameSession, timer: Option<TimerView>, viewer: Viewer<'_>) -> PlayerView {
    let effective = session.effective_phase();
    let visibility = Visibility::of(effective);
    let paused = session.is_paused();

    let me = match viewer {
        Viewer::Participant(id) => session.participants.get(id),
        Viewer::Observer => None,
    };

    let private = me.map(|p| PrivateView {
        me: SelfView {
            id: p.id.clone(),
            display_name: p.display_name.clone(),
            is_host: p.is_host,
            score: p.score,
            has_acted: p.has_acted,
            vote: p.ballot.as_ref().map(|b| BallotView::new(&p.id, b)),
        },
        role: match visibility {
            Visibility::Secret => role_card(session, &p.id),
            _ => None,
        },
    });
    // An unknown participant id degrades to the observer view.
    let viewer = if me.is_some() { viewer } else { Viewer::Observer };

    let turn = (effective == Phase::Questioning).then(|| TurnView {
        questioner: session.questioner().cloned(),
        answerer: session.answerer().cloned(),
    });

    let voting = (effective == Phase::Vote).then(|| VotingView {
        submitted: session.participants.iter().filter(|p| p.has_acted).count(),
        eligible: session.participants.connected_count(),
        caller: session.vote_caller.clone(),
    });

    let reveal = match visibility {
        Visibility::Revealed => session.last_round.as_ref().map(|r| reveal_view(r, viewer)),
        _ => None,
    };

    let show_standings = matches!(effective, Phase::Scoring | Phase::End);

    let lobby = (effective == Phase::Lobby).then(|| {
        let connected = session.participants.connected_count();
        let host_present = session.participants.host().is_some_and(|h| h.connected);
        LobbyView {
            min_players: MIN_PLAYERS,
            max_players: MAX_PLAYERS,
            connected,
            host_present,
            can_start: !paused && host_present && (MIN_PLAYERS..=MAX_PLAYERS).contains(&connected),
        }
    });

    PlayerView {
        phase: session.phase,
        paused_phase: session.pause.as_ref().map(|p| p.prior),
        pause_reason: session.pause.as_ref().map(|p| p.reason),
        round_number: session.round_number,
        total_rounds: session.configured_round_count(),
        config: session.config.clone(),
        participants: session.participants.iter().map(summarize).collect(),
        timer: if paused { None } else { timer },
        turn,
        voting,
        reveal,
        standings: show_standings.then(|| standings(session)),
        winner: if effective == Phase::End {
            winner(session)
        } else {
            None
        },
        game_stats: (effective == Phase::End).then(|| game_stats(session)),
        lobby,
        private,
    }
}
