//! Domain layer: pure game logic types and helpers.

pub mod content;
pub mod participants;
pub mod player_view;
pub mod roles;
pub mod scoring;
pub mod state;
pub mod timers;

#[cfg(test)]
mod test_state_helpers;

// Re-exports for ergonomics
pub use content::{ContentCatalog, Location, LocationPack, LocationSummary, RoleDef};
pub use participants::{ConnectionId, Credential, Participant, ParticipantId, ParticipantRegistry};
pub use player_view::{project, PlayerView, RoleCard, Viewer};
pub use scoring::{Ballot, Confidence, OutcomeTag, RoundScore};
pub use state::{GameSession, PauseReason, Phase};
pub use timers::{TimerHandle, TimerName, TimerRegistry};
