//! Domain-level error type used by the game engine.
//!
//! This error type is transport-agnostic. The websocket layer turns it into
//! an `error` frame via [`DomainError::code`] and
//! [`DomainError::human_message`]; HTTP handlers convert it into
//! `crate::error::AppError` through the provided `From` implementation.

use std::error::Error;
use std::fmt::{Display, Formatter, Result as FmtResult};

use crate::errors::ErrorCode;

/// Input that is malformed or outside allowed values.
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ValidationKind {
    DisplayName,
    Message,
    Target,
    Location,
    RoundDuration,
    RoundCount,
    LocationPack,
}

/// Conflicts with state other participants created.
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ConflictKind {
    NameTaken,
    GameFull,
    GameAlreadyStarted,
    NotEnoughPlayers,
    AlreadyVoted,
}

/// Actions the sender is not entitled to perform.
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ForbiddenKind {
    NotHost,
    NotHiddenRoleHolder,
    NotInGame,
}

/// Actions that arrive in the wrong phase.
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum PhaseKind {
    /// Generic phase mismatch
    Mismatch,
    /// Vote or guess after voting closed for the round
    VoteClosed,
}

/// Domain-level lookups that came back empty.
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum NotFoundKind {
    /// Credential unknown or its reconnection window has passed
    Session,
    Participant,
}

/// Failures that are not the client's fault.
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum InfraErrorKind {
    RoleAssignment,
    Other(String),
}

/// Central domain error type
#[derive(Debug, Clone, PartialEq)]
pub enum DomainError {
    Validation(ValidationKind, String),
    Conflict(ConflictKind, String),
    Forbidden(ForbiddenKind, String),
    Phase(PhaseKind, String),
    NotFound(NotFoundKind, String),
    Infra(InfraErrorKind, String),
}

impl Display for DomainError {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            DomainError::Validation(kind, d) => write!(f, "validation {kind:?}: {d}"),
            DomainError::Conflict(kind, d) => write!(f, "conflict {kind:?}: {d}"),
            DomainError::Forbidden(kind, d) => write!(f, "forbidden {kind:?}: {d}"),
            DomainError::Phase(kind, d) => write!(f, "phase {kind:?}: {d}"),
            DomainError::NotFound(kind, d) => write!(f, "not found {kind:?}: {d}"),
            DomainError::Infra(kind, d) => write!(f, "infra {kind:?}: {d}"),
        }
    }
}

impl Error for DomainError {}

impl DomainError {
    pub fn validation(kind: ValidationKind, detail: impl Into<String>) -> Self {
        Self::Validation(kind, detail.into())
    }
    pub fn conflict(kind: ConflictKind, detail: impl Into<String>) -> Self {
        Self::Conflict(kind, detail.into())
    }
    pub fn forbidden(kind: ForbiddenKind, detail: impl Into<String>) -> Self {
        Self::Forbidden(kind, detail.into())
    }
    pub fn phase(kind: PhaseKind, detail: impl Into<String>) -> Self {
        Self::Phase(kind, detail.into())
    }
    pub fn not_found(kind: NotFoundKind, detail: impl Into<String>) -> Self {
        Self::NotFound(kind, detail.into())
    }
    pub fn infra(kind: InfraErrorKind, detail: impl Into<String>) -> Self {
        Self::Infra(kind, detail.into())
    }

    /// Wire code sent to the client.
    pub fn code(&self) -> ErrorCode {
        match self {
            DomainError::Validation(kind, _) => match kind {
                ValidationKind::DisplayName => ErrorCode::NameInvalid,
                ValidationKind::Message => ErrorCode::InvalidMessage,
                ValidationKind::Target => ErrorCode::InvalidTarget,
                ValidationKind::Location => ErrorCode::InvalidLocation,
                ValidationKind::RoundDuration => ErrorCode::ConfigInvalidDuration,
                ValidationKind::RoundCount => ErrorCode::ConfigInvalidRounds,
                ValidationKind::LocationPack => ErrorCode::ConfigInvalidPack,
            },
            DomainError::Conflict(kind, _) => match kind {
                ConflictKind::NameTaken => ErrorCode::NameTaken,
                ConflictKind::GameFull => ErrorCode::GameFull,
                ConflictKind::GameAlreadyStarted => ErrorCode::GameAlreadyStarted,
                ConflictKind::NotEnoughPlayers => ErrorCode::NotEnoughPlayers,
                ConflictKind::AlreadyVoted => ErrorCode::AlreadyVoted,
            },
            DomainError::Forbidden(kind, _) => match kind {
                ForbiddenKind::NotHost => ErrorCode::NotHost,
                ForbiddenKind::NotHiddenRoleHolder => ErrorCode::NotHiddenRoleHolder,
                ForbiddenKind::NotInGame => ErrorCode::NotInGame,
            },
            DomainError::Phase(kind, _) => match kind {
                PhaseKind::Mismatch => ErrorCode::InvalidPhase,
                PhaseKind::VoteClosed => ErrorCode::VoteExpired,
            },
            DomainError::NotFound(kind, _) => match kind {
                NotFoundKind::Session => ErrorCode::SessionExpired,
                NotFoundKind::Participant => ErrorCode::PlayerNotFound,
            },
            DomainError::Infra(kind, _) => match kind {
                InfraErrorKind::RoleAssignment => ErrorCode::RoleAssignmentFailed,
                InfraErrorKind::Other(_) => ErrorCode::Internal,
            },
        }
    }

    /// Player-facing explanation.
    pub fn human_message(&self) -> &str {
        match self {
            DomainError::Validation(_, d)
            | DomainError::Conflict(_, d)
            | DomainError::Forbidden(_, d)
            | DomainError::Phase(_, d)
            | DomainError::NotFound(_, d)
            | DomainError::Infra(_, d) => d,
        }
    }
}
