// Unit tests for error mapping - pure domain logic without HTTP plumbing
use crate::errors::domain::{
    ConflictKind, DomainError, ForbiddenKind, InfraErrorKind, NotFoundKind, PhaseKind,
    ValidationKind,
};
use crate::{AppError, ErrorCode};

#[test]
fn maps_validation_to_400() {
    let de = DomainError::validation(ValidationKind::DisplayName, "too long");
    assert_eq!(de.code(), ErrorCode::NameInvalid);
    let app: AppError = de.into();
    assert_eq!(app.code(), ErrorCode::NameInvalid);
    assert_eq!(app.status().as_u16(), 400);
}

#[test]
fn maps_config_validation_codes() {
    let cases = [
        (ValidationKind::RoundDuration, "CONFIG_INVALID_DURATION"),
        (ValidationKind::RoundCount, "CONFIG_INVALID_ROUNDS"),
        (ValidationKind::LocationPack, "CONFIG_INVALID_PACK"),
        (ValidationKind::Location, "INVALID_LOCATION"),
        (ValidationKind::Target, "INVALID_TARGET"),
        (ValidationKind::Message, "INVALID_MESSAGE"),
    ];
    for (kind, expected) in cases {
        assert_eq!(DomainError::validation(kind, "x").code().as_str(), expected);
    }
}

#[test]
fn maps_conflicts() {
    let taken: AppError = DomainError::conflict(ConflictKind::NameTaken, "taken").into();
    assert_eq!(taken.code().as_str(), "NAME_TAKEN");
    assert_eq!(taken.status().as_u16(), 409);

    let voted: AppError = DomainError::conflict(ConflictKind::AlreadyVoted, "again").into();
    assert_eq!(voted.code().as_str(), "ALREADY_VOTED");

    let short: AppError =
        DomainError::conflict(ConflictKind::NotEnoughPlayers, "need four").into();
    assert_eq!(short.code().as_str(), "NOT_ENOUGH_PLAYERS");
    assert_eq!(short.status().as_u16(), 422);
}

#[test]
fn maps_phase_errors() {
    let closed = DomainError::phase(PhaseKind::VoteClosed, "closed");
    assert_eq!(closed.code(), ErrorCode::VoteExpired);
    let wrong = DomainError::phase(PhaseKind::Mismatch, "lobby");
    assert_eq!(wrong.code(), ErrorCode::InvalidPhase);
    let app: AppError = wrong.into();
    assert_eq!(app.status().as_u16(), 409);
}

#[test]
fn maps_forbidden_and_not_found() {
    let host = DomainError::forbidden(ForbiddenKind::NotHost, "host only");
    assert_eq!(host.code(), ErrorCode::NotHost);
    let spy = DomainError::forbidden(ForbiddenKind::NotHiddenRoleHolder, "no");
    assert_eq!(spy.code(), ErrorCode::NotHiddenRoleHolder);

    let expired: AppError = DomainError::not_found(NotFoundKind::Session, "gone").into();
    assert_eq!(expired.code().as_str(), "SESSION_EXPIRED");
    assert_eq!(expired.status().as_u16(), 410);

    let missing: AppError =
        DomainError::not_found(NotFoundKind::Participant, "nobody").into();
    assert_eq!(missing.code().as_str(), "PLAYER_NOT_FOUND");
    assert_eq!(missing.status().as_u16(), 404);
}

#[test]
fn maps_infra() {
    let roles = DomainError::infra(InfraErrorKind::RoleAssignment, "empty pack");
    assert_eq!(roles.code(), ErrorCode::RoleAssignmentFailed);
    let app: AppError = roles.into();
    assert!(matches!(app, AppError::Internal { .. }));
    assert_eq!(app.status().as_u16(), 500);
}

#[test]
fn human_message_is_the_detail() {
    let de = DomainError::phase(PhaseKind::Mismatch, "Voting has not started");
    assert_eq!(de.human_message(), "Voting has not started");
    assert!(de.to_string().contains("Voting has not started"));
}
