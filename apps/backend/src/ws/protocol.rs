//! Websocket wire format: JSON text frames with a `type` discriminator.

use serde::{Deserialize, Serialize};

use crate::config::game::ConfigPatch;
use crate::domain::participants::ParticipantId;
use crate::domain::player_view::{PlayerView, RoleCard};
use crate::errors::domain::{DomainError, ValidationKind};
use crate::errors::ErrorCode;
use crate::services::game_flow::{AdminCommand, JoinRequest};

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum ClientMsg {
    Join {
        display_name: Option<String>,
        #[serde(default)]
        is_host: bool,
        credential: Option<String>,
    },
    Vote {
        target_id: String,
        confidence: Option<u8>,
    },
    LocationGuess {
        location_id: String,
    },
    CallVote {},
    Admin {
        action: AdminAction,
        #[serde(default)]
        params: AdminParams,
    },
    Heartbeat {},
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum AdminAction {
    StartGame,
    PauseGame,
    ResumeGame,
    EndGame,
    KickParticipant,
    AdvanceTurn,
    Configure,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminParams {
    pub participant_id: Option<String>,
    pub round_duration_minutes: Option<u32>,
    pub num_rounds: Option<u32>,
    pub location_pack: Option<String>,
}

impl AdminAction {
    pub fn into_command(self, params: AdminParams) -> Result<AdminCommand, DomainError> {
        Ok(match self {
            AdminAction::StartGame => AdminCommand::StartGame,
            AdminAction::PauseGame => AdminCommand::PauseGame,
            AdminAction::ResumeGame => AdminCommand::ResumeGame,
            AdminAction::EndGame => AdminCommand::EndGame,
            AdminAction::AdvanceTurn => AdminCommand::AdvanceTurn,
            AdminAction::KickParticipant => {
                let raw = params.participant_id.ok_or_else(|| {
                    DomainError::validation(
                        ValidationKind::Message,
                        "kickParticipant needs params.participantId",
                    )
                })?;
                AdminCommand::KickParticipant(ParticipantId::from_display_name(raw.trim()))
            }
            AdminAction::Configure => AdminCommand::Configure(ConfigPatch {
                round_duration_minutes: params.round_duration_minutes,
                num_rounds: params.num_rounds,
                location_pack: params.location_pack,
            }),
        })
    }
}

impl ClientMsg {
    /// Convert a `join` frame; `None` for every other frame.
    pub fn join_request(&self) -> Option<JoinRequest> {
        match self {
            ClientMsg::Join {
                display_name,
                is_host,
                credential,
            } => Some(JoinRequest {
                display_name: display_name.clone(),
                is_host: *is_host,
                credential: credential.clone(),
            }),
            _ => None,
        }
    }
}

#[allow(clippy::large_enum_variant)]
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum ServerMsg {
    Welcome {
        participant_id: ParticipantId,
        credential: String,
        is_host: bool,
    },
    State(PlayerView),
    RoleAssignment {
        round: u32,
        card: RoleCard,
    },
    Error {
        code: ErrorCode,
        human_message: String,
    },
}

impl ServerMsg {
    pub fn error(code: ErrorCode, human_message: impl Into<String>) -> Self {
        ServerMsg::Error {
            code,
            human_message: human_message.into(),
        }
    }
}

impl From<&DomainError> for ServerMsg {
    fn from(err: &DomainError) -> Self {
        ServerMsg::error(err.code(), err.human_message())
    }
}
