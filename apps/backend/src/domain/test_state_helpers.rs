//! Builders for sessions in a given phase, for projector and domain tests.

use std::time::Instant;

use rand::SeedableRng;
use rand_chacha::ChaCha20Rng;
use uuid::Uuid;

use crate::config::game::{GameConfig, RoleRepeatPolicy};
use crate::domain::content::ContentCatalog;
use crate::domain::participants::{Credential, ParticipantId};
use crate::domain::roles::{assign_roles, shuffled_turn_order};
use crate::domain::state::{GameSession, Phase};

pub fn lobby_session(players: usize, seed: u64) -> GameSession {
    let mut rng = ChaCha20Rng::seed_from_u64(seed);
    let mut session = GameSession::new(GameConfig::default());
    let now = Instant::now();
    for i in 0..players {
        session
            .participants
            .admit(
                format!("Player{i}"),
                i == 0,
                Uuid::new_v4(),
                Credential::generate(&mut rng),
                now,
            )
            .expect("admit test participant");
    }
    session
}

/// Session with roles dealt from the classic pack, sitting in `phase`.
pub fn dealt_session(players: usize, seed: u64, phase: Phase) -> GameSession {
    let mut rng = ChaCha20Rng::seed_from_u64(seed.wrapping_add(1));
    let mut session = lobby_session(players, seed);
    let catalog = ContentCatalog::builtin().expect("builtin pack");
    let pack = catalog.pack("classic").expect("classic pack");

    let ids = session.participants.connected_ids();
    let dealt = assign_roles(&ids, pack, RoleRepeatPolicy::Cycle, &mut rng).expect("deal");
    for (id, role) in &dealt.roles {
        if let Some(p) = session.participants.get_mut(id) {
            p.role = Some(role.clone());
        }
    }
    session.round_number = 1;
    session.hidden_role_holder = Some(dealt.holder);
    session.current_location = Some(dealt.location);
    session.possible_locations = pack.summaries();
    session.turn_order = shuffled_turn_order(&ids, &mut rng);
    session.phase = phase;
    session
}

pub fn holder_of(session: &GameSession) -> ParticipantId {
    session
        .hidden_role_holder
        .clone()
        .expect("session has a hidden role holder")
}
