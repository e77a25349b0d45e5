//! Error codes for the Spyster backend.
//!
//! Every rejection the engine sends to a client, and every problem-details
//! body the HTTP surface returns, carries one of these codes. Add new codes
//! here; never pass ad-hoc strings as error codes.
//!
//! All error codes are SCREAMING_SNAKE_CASE and map 1:1 to the strings that
//! appear on the wire.

use core::fmt;

use serde::{Serialize, Serializer};

/// Centralized error codes for the Spyster backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    // Joining
    /// Display name already used by another participant
    NameTaken,
    /// Display name empty, too long, or otherwise unusable
    NameInvalid,
    /// Participant limit reached
    GameFull,
    /// Game can no longer be joined or started
    GameAlreadyStarted,
    /// Unknown or expired reconnection credential
    SessionExpired,

    // Phase and turn rules
    /// Too few connected participants to start
    NotEnoughPlayers,
    /// Action not legal in the current phase
    InvalidPhase,
    /// Participant already voted or guessed this round
    AlreadyVoted,
    /// Voting for this round has already closed
    VoteExpired,

    // Authority
    /// Host-only action from a non-host, or a second host claim
    NotHost,
    /// Location guess from someone other than the hidden-role holder
    NotHiddenRoleHolder,
    /// Game action from a connection that has not joined
    NotInGame,

    // Request validation
    /// Location id not in the active pack
    InvalidLocation,
    /// Vote target unknown or not allowed
    InvalidTarget,
    /// Malformed frame or missing field
    InvalidMessage,
    /// Kick target does not exist
    PlayerNotFound,

    // Configuration
    /// Round duration outside the allowed range
    ConfigInvalidDuration,
    /// Round count outside the allowed range
    ConfigInvalidRounds,
    /// Unknown or unusable location pack
    ConfigInvalidPack,

    // System
    /// Roles could not be dealt from the active pack
    RoleAssignmentFailed,
    /// Coordinator unavailable or other server fault
    Internal,
}

impl ErrorCode {
    /// Returns the canonical SCREAMING_SNAKE_CASE string for this error code.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::NameTaken => "NAME_TAKEN",
            Self::NameInvalid => "NAME_INVALID",
            Self::GameFull => "GAME_FULL",
            Self::GameAlreadyStarted => "GAME_ALREADY_STARTED",
            Self::SessionExpired => "SESSION_EXPIRED",

            Self::NotEnoughPlayers => "NOT_ENOUGH_PLAYERS",
            Self::InvalidPhase => "INVALID_PHASE",
            Self::AlreadyVoted => "ALREADY_VOTED",
            Self::VoteExpired => "VOTE_EXPIRED",

            Self::NotHost => "NOT_HOST",
            Self::NotHiddenRoleHolder => "NOT_HIDDEN_ROLE_HOLDER",
            Self::NotInGame => "NOT_IN_GAME",

            Self::InvalidLocation => "INVALID_LOCATION",
            Self::InvalidTarget => "INVALID_TARGET",
            Self::InvalidMessage => "INVALID_MESSAGE",
            Self::PlayerNotFound => "PLAYER_NOT_FOUND",

            Self::ConfigInvalidDuration => "CONFIG_INVALID_DURATION",
            Self::ConfigInvalidRounds => "CONFIG_INVALID_ROUNDS",
            Self::ConfigInvalidPack => "CONFIG_INVALID_PACK",

            Self::RoleAssignmentFailed => "ROLE_ASSIGNMENT_FAILED",
            Self::Internal => "INTERNAL",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl Serialize for ErrorCode {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}
