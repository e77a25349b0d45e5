//! Game configuration and engine tunables.
//!
//! [`GameConfig`] is what the host may change in the lobby. [`EngineSettings`]
//! is fixed for the life of the process and carries the phase timings,
//! scoring constants and role repetition policy.

use std::str::FromStr;
use std::time::Duration;

use serde::Serialize;

use crate::domain::content::ContentCatalog;
use crate::errors::domain::{DomainError, ValidationKind};

pub const MIN_PLAYERS: usize = 4;
pub const MAX_PLAYERS: usize = 10;

pub const MIN_ROUND_MINUTES: u32 = 1;
pub const MAX_ROUND_MINUTES: u32 = 30;
pub const DEFAULT_ROUND_MINUTES: u32 = 7;

pub const MIN_ROUNDS: u32 = 1;
pub const MAX_ROUNDS: u32 = 20;
pub const DEFAULT_ROUNDS: u32 = 5;

pub const DEFAULT_LOCATION_PACK: &str = "classic";

/// Host-adjustable settings, editable only in the lobby.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GameConfig {
    pub round_duration_minutes: u32,
    pub num_rounds: u32,
    pub location_pack: String,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            round_duration_minutes: DEFAULT_ROUND_MINUTES,
            num_rounds: DEFAULT_ROUNDS,
            location_pack: DEFAULT_LOCATION_PACK.to_string(),
        }
    }
}

/// Partial update sent with the `configure` admin action.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigPatch {
    pub round_duration_minutes: Option<u32>,
    pub num_rounds: Option<u32>,
    pub location_pack: Option<String>,
}

impl GameConfig {
    pub fn round_duration(&self) -> Duration {
        Duration::from_secs(u64::from(self.round_duration_minutes) * 60)
    }

    pub fn validate(&self, catalog: &ContentCatalog) -> Result<(), DomainError> {
        if !(MIN_ROUND_MINUTES..=MAX_ROUND_MINUTES).contains(&self.round_duration_minutes) {
            return Err(DomainError::validation(
                ValidationKind::RoundDuration,
                format!(
                    "Round duration must be between {MIN_ROUND_MINUTES} and {MAX_ROUND_MINUTES} minutes"
                ),
            ));
        }
        if !(MIN_ROUNDS..=MAX_ROUNDS).contains(&self.num_rounds) {
            return Err(DomainError::validation(
                ValidationKind::RoundCount,
                format!("Number of rounds must be between {MIN_ROUNDS} and {MAX_ROUNDS}"),
            ));
        }
        if catalog.pack(&self.location_pack).is_none() {
            return Err(DomainError::validation(
                ValidationKind::LocationPack,
                format!("Unknown location pack '{}'", self.location_pack),
            ));
        }
        Ok(())
    }

    /// Apply a patch, returning the merged config only if all of it is valid.
    pub fn patched(
        &self,
        patch: ConfigPatch,
        catalog: &ContentCatalog,
    ) -> Result<GameConfig, DomainError> {
        let merged = GameConfig {
            round_duration_minutes: patch
                .round_duration_minutes
                .unwrap_or(self.round_duration_minutes),
            num_rounds: patch.num_rounds.unwrap_or(self.num_rounds),
            location_pack: patch
                .location_pack
                .unwrap_or_else(|| self.location_pack.clone()),
        };
        merged.validate(catalog)?;
        Ok(merged)
    }
}

/// Fixed phase and connection timings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhaseTimings {
    pub role_display: Duration,
    pub vote: Duration,
    pub reveal_delay: Duration,
    pub scoring_display: Duration,
    pub disconnect_grace: Duration,
    pub reconnect_window: Duration,
}

impl Default for PhaseTimings {
    fn default() -> Self {
        Self {
            role_display: Duration::from_secs(5),
            vote: Duration::from_secs(60),
            reveal_delay: Duration::from_secs(3),
            scoring_display: Duration::from_secs(10),
            disconnect_grace: Duration::from_secs(30),
            reconnect_window: Duration::from_secs(300),
        }
    }
}

/// Point values used by the scoring engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScoringRules {
    /// Points per confidence level for naming the convicted holder.
    pub correct_vote_multiplier: i32,
    /// Points lost per confidence level for any other vote.
    pub wrong_vote_multiplier: i32,
    /// Bonus for the holder framing an innocent at full confidence.
    pub double_agent_bonus: i32,
    /// Confidence level the double agent bonus requires.
    pub double_agent_confidence: u8,
    pub spy_guess_correct_points: i32,
    pub spy_guess_wrong_penalty: i32,
}

impl Default for ScoringRules {
    fn default() -> Self {
        Self {
            correct_vote_multiplier: 2,
            wrong_vote_multiplier: 1,
            double_agent_bonus: 10,
            double_agent_confidence: 3,
            spy_guess_correct_points: 10,
            spy_guess_wrong_penalty: 5,
        }
    }
}

/// How roles are handed out when participants outnumber a location's roles.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RoleRepeatPolicy {
    /// Shuffle the role list once and deal it round-robin.
    #[default]
    Cycle,
    /// Every non-holder draws independently, with replacement.
    Independent,
}

impl FromStr for RoleRepeatPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "cycle" => Ok(Self::Cycle),
            "independent" => Ok(Self::Independent),
            other => Err(format!("unknown role repeat policy '{other}'")),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EngineSettings {
    pub timings: PhaseTimings,
    pub scoring: ScoringRules,
    pub role_repeat: RoleRepeatPolicy,
}
