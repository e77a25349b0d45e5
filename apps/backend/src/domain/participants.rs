//! Participant registry: who is in the session, how to reach them, and
//! their per-round state.

use std::fmt;
use std::time::Instant;

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use rand::{CryptoRng, Rng};
use serde::Serialize;
use unicode_normalization::UnicodeNormalization;
use uuid::Uuid;

use crate::config::game::MAX_PLAYERS;
use crate::domain::content::RoleDef;
use crate::domain::scoring::Ballot;
use crate::errors::domain::{ConflictKind, DomainError, ForbiddenKind, ValidationKind};

pub const MAX_NAME_CHARS: usize = 20;
pub const ABSTAIN: &str = "abstain";

/// Identifies one websocket connection.
pub type ConnectionId = Uuid;

/// Stable participant id, derived from the display name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct ParticipantId(String);

impl ParticipantId {
    /// NFC-normalized, lowercased display name. Two names that differ only
    /// by case or composition collide.
    pub fn from_display_name(name: &str) -> Self {
        Self(name.nfc().collect::<String>().to_lowercase())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ParticipantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Opaque bearer token used to resume a participant.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential(String);

impl Credential {
    /// 32 random bytes, URL-safe base64 without padding.
    pub fn generate<R: Rng + CryptoRng + ?Sized>(rng: &mut R) -> Self {
        let mut bytes = [0u8; 32];
        rng.fill(&mut bytes);
        Self(URL_SAFE_NO_PAD.encode(bytes))
    }

    pub fn expose(&self) -> &str {
        &self.0
    }

    fn matches(&self, presented: &str) -> bool {
        let ours = self.0.as_bytes();
        let theirs = presented.as_bytes();
        ours.len() == theirs.len()
            && ours
                .iter()
                .zip(theirs)
                .fold(0u8, |acc, (a, b)| acc | (a ^ b))
                == 0
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Credential(..)")
    }
}

#[derive(Debug, Clone)]
pub struct Participant {
    pub id: ParticipantId,
    pub display_name: String,
    pub credential: Credential,
    /// Live connection, if any.
    pub connection: Option<ConnectionId>,
    /// False only after the disconnect grace period has run out.
    pub connected: bool,
    /// When the current connection dropped; cleared on reconnect.
    pub connection_lost_at: Option<Instant>,
    /// Start of the reconnection window; survives reconnect cycles within a round.
    pub disconnected_at: Option<Instant>,
    pub is_host: bool,
    pub role: Option<RoleDef>,
    pub ballot: Option<Ballot>,
    pub has_acted: bool,
    pub score: i32,
    pub joined_at: Instant,
    pub last_heartbeat: Instant,
}

impl Participant {
    pub fn clear_round_state(&mut self) {
        self.role = None;
        self.ballot = None;
        self.has_acted = false;
    }
}

/// Trim and check a requested display name.
pub fn validate_display_name(raw: &str) -> Result<String, DomainError> {
    let name = raw.trim();
    let len = name.chars().count();
    if len == 0 || len > MAX_NAME_CHARS {
        return Err(DomainError::validation(
            ValidationKind::DisplayName,
            format!("Name must be 1-{MAX_NAME_CHARS} characters"),
        ));
    }
    if name.chars().any(char::is_control) {
        return Err(DomainError::validation(
            ValidationKind::DisplayName,
            "Name contains invalid characters",
        ));
    }
    if ParticipantId::from_display_name(name).as_str() == ABSTAIN {
        return Err(DomainError::validation(
            ValidationKind::DisplayName,
            "That name is reserved",
        ));
    }
    Ok(name.to_string())
}

/// Participants in join order.
#[derive(Debug, Clone, Default)]
pub struct ParticipantRegistry {
    participants: Vec<Participant>,
}

impl ParticipantRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Admit a new participant. The name must already be validated.
    pub fn admit(
        &mut self,
        display_name: String,
        is_host: bool,
        connection: ConnectionId,
        credential: Credential,
        now: Instant,
    ) -> Result<&Participant, DomainError> {
        if self.participants.len() >= MAX_PLAYERS {
            return Err(DomainError::conflict(
                ConflictKind::GameFull,
                format!("Game is full ({MAX_PLAYERS} players max)"),
            ));
        }
        let id = ParticipantId::from_display_name(&display_name);
        if self.get(&id).is_some() {
            return Err(DomainError::conflict(
                ConflictKind::NameTaken,
                "That name is already taken",
            ));
        }
        if is_host && self.host().is_some() {
            return Err(DomainError::forbidden(
                ForbiddenKind::NotHost,
                "This game already has a host",
            ));
        }

        self.participants.push(Participant {
            id,
            display_name,
            credential,
            connection: Some(connection),
            connected: true,
            connection_lost_at: None,
            disconnected_at: None,
            is_host,
            role: None,
            ballot: None,
            has_acted: false,
            score: 0,
            joined_at: now,
            last_heartbeat: now,
        });
        let last = self.participants.len() - 1;
        Ok(&self.participants[last])
    }

    pub fn remove(&mut self, id: &ParticipantId) -> Option<Participant> {
        let idx = self.participants.iter().position(|p| &p.id == id)?;
        Some(self.participants.remove(idx))
    }

    pub fn get(&self, id: &ParticipantId) -> Option<&Participant> {
        self.participants.iter().find(|p| &p.id == id)
    }

    pub fn get_mut(&mut self, id: &ParticipantId) -> Option<&mut Participant> {
        self.participants.iter_mut().find(|p| &p.id == id)
    }

    pub fn by_credential(&self, presented: &str) -> Option<&Participant> {
        self.participants
            .iter()
            .find(|p| p.credential.matches(presented))
    }

    pub fn by_connection(&self, connection: ConnectionId) -> Option<&Participant> {
        self.participants
            .iter()
            .find(|p| p.connection == Some(connection))
    }

    pub fn host(&self) -> Option<&Participant> {
        self.participants.iter().find(|p| p.is_host)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Participant> {
        self.participants.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Participant> {
        self.participants.iter_mut()
    }

    pub fn ids(&self) -> Vec<ParticipantId> {
        self.participants.iter().map(|p| p.id.clone()).collect()
    }

    pub fn connected_ids(&self) -> Vec<ParticipantId> {
        self.participants
            .iter()
            .filter(|p| p.connected)
            .map(|p| p.id.clone())
            .collect()
    }

    pub fn connected_count(&self) -> usize {
        self.participants.iter().filter(|p| p.connected).count()
    }

    pub fn len(&self) -> usize {
        self.participants.len()
    }

    pub fn is_empty(&self) -> bool {
        self.participants.is_empty()
    }

    pub fn clear_round_state(&mut self) {
        for p in &mut self.participants {
            p.clear_round_state();
        }
    }
}
