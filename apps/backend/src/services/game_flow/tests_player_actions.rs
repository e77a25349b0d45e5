use uuid::Uuid;

use super::test_harness::Table;
use crate::domain::participants::ParticipantId;
use crate::domain::player_view::Viewer;
use crate::domain::scoring::{Ballot, OutcomeTag};
use crate::domain::state::Phase;
use crate::errors::ErrorCode;

fn vote(table: &mut Table, voter: &ParticipantId, target: &ParticipantId, confidence: u8) {
    let conn = table.conn_of(voter);
    table
        .flow
        .vote(conn, target.as_str(), Some(confidence), table.now)
        .expect("vote accepted");
    table.pump();
}

#[test]
fn voting_outside_the_vote_phase_is_rejected() {
    let mut table = Table::new(4);
    let target = table.ids[1].clone();
    let err = table
        .flow
        .vote(table.conns[2], target.as_str(), Some(1), table.now)
        .unwrap_err();
    assert_eq!(err.code(), ErrorCode::InvalidPhase);

    table.start_questioning();
    let err = table
        .flow
        .vote(table.conns[2], target.as_str(), Some(1), table.now)
        .unwrap_err();
    assert_eq!(err.code(), ErrorCode::InvalidPhase);
}

#[test]
fn voting_after_the_timer_is_vote_expired() {
    let mut table = Table::new(4);
    table.start_voting();
    table.advance_secs(60);
    assert_eq!(table.phase(), Phase::Reveal);

    let target = table.ids[1].clone();
    let err = table
        .flow
        .vote(table.conns[2], target.as_str(), Some(1), table.now)
        .unwrap_err();
    assert_eq!(err.code(), ErrorCode::VoteExpired);
}

#[test]
fn the_first_ballot_is_final() {
    let mut table = Table::new(4);
    table.start_voting();
    let (a, b, c) = (table.ids[1].clone(), table.ids[2].clone(), table.ids[3].clone());
    vote(&mut table, &a, &b, 2);

    let err = table
        .flow
        .vote(table.conn_of(&a), c.as_str(), Some(3), table.now)
        .unwrap_err();
    assert_eq!(err.code(), ErrorCode::AlreadyVoted);
    let ballot = table.flow.session.participants.get(&a).unwrap().ballot.clone();
    assert!(matches!(ballot, Some(Ballot::Vote { target, .. }) if target == b));
}

#[test]
fn bad_targets_and_bets_are_rejected() {
    let mut table = Table::new(4);
    table.start_voting();
    let me = table.ids[1].clone();
    let conn = table.conns[1];

    let err = table.flow.vote(conn, me.as_str(), Some(1), table.now).unwrap_err();
    assert_eq!(err.code(), ErrorCode::InvalidTarget);

    let err = table.flow.vote(conn, "nobody", Some(1), table.now).unwrap_err();
    assert_eq!(err.code(), ErrorCode::InvalidTarget);

    let other = table.ids[2].clone();
    let err = table.flow.vote(conn, other.as_str(), Some(4), table.now).unwrap_err();
    assert_eq!(err.code(), ErrorCode::InvalidMessage);

    assert!(!table.flow.session.participants.get(&me).unwrap().has_acted);
}

#[test]
fn a_vote_without_a_bet_is_rejected_but_abstaining_needs_none() {
    let mut table = Table::new(4);
    table.start_voting();
    let me = table.ids[1].clone();
    let conn = table.conns[1];
    let other = table.ids[2].clone();

    let err = table.flow.vote(conn, other.as_str(), None, table.now).unwrap_err();
    assert_eq!(err.code(), ErrorCode::InvalidMessage);
    let err = table.flow.vote(conn, other.as_str(), Some(0), table.now).unwrap_err();
    assert_eq!(err.code(), ErrorCode::InvalidMessage);

    let voter = table.flow.session.participants.get(&me).unwrap();
    assert!(!voter.has_acted);
    assert!(voter.ballot.is_none());

    table.flow.vote(conn, "abstain", None, table.now).unwrap();
    table.pump();
    let voter = table.flow.session.participants.get(&me).unwrap();
    assert_eq!(voter.ballot, Some(Ballot::Abstain));
}

#[test]
fn strangers_cannot_act() {
    let mut table = Table::new(4);
    table.start_questioning();
    let err = table.flow.call_vote(Uuid::new_v4(), table.now).unwrap_err();
    assert_eq!(err.code(), ErrorCode::NotInGame);
}

#[test]
fn call_vote_only_during_questioning() {
    let mut table = Table::new(4);
    let err = table.flow.call_vote(table.conns[1], table.now).unwrap_err();
    assert_eq!(err.code(), ErrorCode::InvalidPhase);

    table.start_voting();
    assert_eq!(table.flow.session.vote_caller, Some(table.ids[1].clone()));
    let err = table.flow.call_vote(table.conns[2], table.now).unwrap_err();
    assert_eq!(err.code(), ErrorCode::InvalidPhase);
}

#[test]
fn everyone_acting_closes_the_vote_early() {
    let mut table = Table::new(4);
    table.start_voting();
    let holder = table.holder();
    let civ = table.civilians();

    vote(&mut table, &civ[0], &holder, 3);
    vote(&mut table, &civ[1], &holder, 2);
    let conn = table.conn_of(&civ[2]);
    table.flow.vote(conn, "Abstain", None, table.now).unwrap();
    table.pump();
    assert_eq!(table.phase(), Phase::Vote);
    vote(&mut table, &holder, &civ[0], 1);

    assert_eq!(table.phase(), Phase::Reveal);
    let result = table.flow.session.last_round.clone().unwrap();
    assert_eq!(result.score.outcome, OutcomeTag::HolderCaught);
    assert_eq!(result.score.convicted, Some(holder.clone()));
    assert_eq!(table.score_of(&civ[0]), 6);
    assert_eq!(table.score_of(&civ[1]), 4);
    assert_eq!(table.score_of(&civ[2]), 0);
    assert_eq!(table.score_of(&holder), -1);
}

#[test]
fn non_voters_abstain_when_the_timer_runs_out() {
    let mut table = Table::new(4);
    table.start_voting();
    let holder = table.holder();
    let civ = table.civilians();
    vote(&mut table, &civ[0], &holder, 1);

    table.advance_secs(60);
    let result = table.flow.session.last_round.clone().unwrap();
    let abstained = result
        .ballots
        .iter()
        .filter(|(_, b)| *b == Ballot::Abstain)
        .count();
    assert_eq!(abstained, 3);
    // A lone vote is still a strict plurality.
    assert_eq!(result.score.outcome, OutcomeTag::HolderCaught);
    assert_eq!(table.score_of(&civ[0]), 2);
}

#[test]
fn a_tie_convicts_nobody_and_moves_no_points() {
    let mut table = Table::new(4);
    table.start_voting();
    let holder = table.holder();
    let civ = table.civilians();

    vote(&mut table, &holder, &civ[0], 1);
    vote(&mut table, &civ[0], &holder, 1);
    vote(&mut table, &civ[1], &civ[2], 1);
    vote(&mut table, &civ[2], &civ[1], 1);

    let result = table.flow.session.last_round.clone().unwrap();
    assert_eq!(result.score.outcome, OutcomeTag::NoConviction);
    assert!(table.ids.iter().all(|id| table.score_of(id) == 0));
}

#[test]
fn framing_an_innocent_at_full_confidence_pays_the_double_agent_bonus() {
    let mut table = Table::new(4);
    table.start_voting();
    let holder = table.holder();
    let civ = table.civilians();

    vote(&mut table, &holder, &civ[0], 3);
    vote(&mut table, &civ[1], &civ[0], 2);
    vote(&mut table, &civ[2], &civ[0], 1);
    vote(&mut table, &civ[0], &holder, 1);

    let result = table.flow.session.last_round.clone().unwrap();
    assert_eq!(result.score.outcome, OutcomeTag::InnocentConvicted);
    assert_eq!(table.score_of(&holder), 7);
    assert_eq!(table.score_of(&civ[0]), -1);
    assert_eq!(table.score_of(&civ[1]), -2);
    assert_eq!(table.score_of(&civ[2]), -1);
}

#[test]
fn only_the_holder_may_guess_the_location() {
    let mut table = Table::new(4);
    table.start_voting();
    let civ = table.civilians();
    let loc = table.flow.session.possible_locations[0].id.clone();

    let err = table
        .flow
        .guess_location(table.conn_of(&civ[0]), &loc, table.now)
        .unwrap_err();
    assert_eq!(err.code(), ErrorCode::NotHiddenRoleHolder);
}

#[test]
fn guessing_is_a_vote_phase_action() {
    let mut table = Table::new(4);
    table.start_questioning();
    let holder = table.holder();
    let loc = table.flow.session.possible_locations[0].id.clone();
    let err = table
        .flow
        .guess_location(table.conn_of(&holder), &loc, table.now)
        .unwrap_err();
    assert_eq!(err.code(), ErrorCode::InvalidPhase);
}

#[test]
fn unknown_location_is_rejected() {
    let mut table = Table::new(4);
    table.start_voting();
    let holder = table.holder();
    let err = table
        .flow
        .guess_location(table.conn_of(&holder), "atlantis", table.now)
        .unwrap_err();
    assert_eq!(err.code(), ErrorCode::InvalidLocation);
    assert_eq!(table.phase(), Phase::Vote);
}

#[test]
fn correct_guess_ends_the_round_in_the_holders_favour() {
    let mut table = Table::new(4);
    table.start_voting();
    let holder = table.holder();
    let civ = table.civilians();
    vote(&mut table, &civ[0], &holder, 3);

    let location = table.flow.session.current_location.clone().unwrap();
    table
        .flow
        .guess_location(table.conn_of(&holder), &location.id, table.now)
        .unwrap();
    table.pump();

    assert_eq!(table.phase(), Phase::Reveal);
    let result = table.flow.session.last_round.clone().unwrap();
    assert_eq!(result.score.outcome, OutcomeTag::LocationGuessCorrect);
    assert!(result.location_guess.unwrap().correct);
    assert_eq!(table.score_of(&holder), 10);
    assert_eq!(table.score_of(&civ[0]), 0);
}

#[test]
fn wrong_guess_costs_the_holder() {
    let mut table = Table::new(4);
    table.start_voting();
    let holder = table.holder();
    let actual = table.flow.session.current_location.clone().unwrap().id;
    let wrong = table
        .flow
        .session
        .possible_locations
        .iter()
        .find(|l| l.id != actual)
        .unwrap()
        .id
        .clone();

    table
        .flow
        .guess_location(table.conn_of(&holder), &wrong, table.now)
        .unwrap();
    table.pump();

    let result = table.flow.session.last_round.clone().unwrap();
    assert_eq!(result.score.outcome, OutcomeTag::LocationGuessWrong);
    assert_eq!(table.score_of(&holder), -5);
}

#[test]
fn holder_who_voted_cannot_also_guess() {
    let mut table = Table::new(5);
    table.start_voting();
    let holder = table.holder();
    let civ = table.civilians();
    vote(&mut table, &holder, &civ[0], 1);

    let loc = table.flow.session.possible_locations[0].id.clone();
    let err = table
        .flow
        .guess_location(table.conn_of(&holder), &loc, table.now)
        .unwrap_err();
    assert_eq!(err.code(), ErrorCode::AlreadyVoted);
}

#[test]
fn disconnected_players_do_not_hold_up_the_vote() {
    let mut table = Table::new(5);
    table.start_voting();
    let holder = table.holder();
    let civ = table.civilians();
    let away = civ[3].clone();
    let away_index = table.index_of(&away);

    for voter in [&holder, &civ[0], &civ[1], &civ[2]] {
        let target = if *voter == civ[0] { &civ[1] } else { &civ[0] };
        vote(&mut table, voter, target, 1);
    }
    table.drop_connection(away_index);
    assert_eq!(table.phase(), Phase::Vote);

    table.advance_secs(30);
    assert_eq!(table.phase(), Phase::Reveal);
}

#[test]
fn reveal_shows_ballots_to_participants_but_not_observers() {
    let mut table = Table::new(4);
    table.start_voting();
    let holder = table.holder();
    for civ in table.civilians() {
        vote(&mut table, &civ, &holder, 2);
    }
    let conn = table.conn_of(&holder);
    table.flow.vote(conn, "abstain", None, table.now).unwrap();
    table.pump();

    let me = table.ids[1].clone();
    let mine = table.flow.view_for(Viewer::Participant(&me), table.now);
    let reveal = mine.reveal.unwrap();
    assert!(reveal.ballots.is_some());

    let public = table.flow.view_for(Viewer::Observer, table.now);
    let reveal = public.reveal.unwrap();
    assert!(reveal.ballots.is_none());
    assert!(reveal.tally.is_none());
    assert!(public.private.is_none());
}
