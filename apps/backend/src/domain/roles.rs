//! Dealing the hidden role, the location, and everyone else's role.

use rand::seq::{IndexedRandom, SliceRandom};
use rand::{CryptoRng, Rng};

use crate::config::game::RoleRepeatPolicy;
use crate::domain::content::{Location, LocationPack, RoleDef};
use crate::domain::participants::ParticipantId;
use crate::errors::domain::{DomainError, InfraErrorKind};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoleAssignment {
    pub holder: ParticipantId,
    pub location: Location,
    /// Role for every participant except the holder.
    pub roles: Vec<(ParticipantId, RoleDef)>,
}

/// Pick the holder and the location uniformly, then deal roles to the rest
/// according to `policy`.
pub fn assign_roles<R: Rng + CryptoRng + ?Sized>(
    participants: &[ParticipantId],
    pack: &LocationPack,
    policy: RoleRepeatPolicy,
    rng: &mut R,
) -> Result<RoleAssignment, DomainError> {
    let holder = participants.choose(rng).cloned().ok_or_else(|| {
        DomainError::infra(InfraErrorKind::RoleAssignment, "No participants to assign")
    })?;
    let location = pack.locations.choose(rng).cloned().ok_or_else(|| {
        DomainError::infra(
            InfraErrorKind::RoleAssignment,
            format!("Location pack '{}' is empty", pack.id),
        )
    })?;
    if location.roles.is_empty() {
        return Err(DomainError::infra(
            InfraErrorKind::RoleAssignment,
            format!("Location '{}' has no roles", location.id),
        ));
    }

    let others: Vec<&ParticipantId> = participants.iter().filter(|p| **p != holder).collect();
    let roles = match policy {
        RoleRepeatPolicy::Cycle => {
            let mut deck = location.roles.clone();
            deck.shuffle(rng);
            others
                .into_iter()
                .enumerate()
                .map(|(i, id)| (id.clone(), deck[i % deck.len()].clone()))
                .collect()
        }
        RoleRepeatPolicy::Independent => others
            .into_iter()
            .map(|id| {
                let idx = rng.random_range(0..location.roles.len());
                (id.clone(), location.roles[idx].clone())
            })
            .collect(),
    };

    Ok(RoleAssignment {
        holder,
        location,
        roles,
    })
}

/// Random speaking order for the questioning phase.
pub fn shuffled_turn_order<R: Rng + CryptoRng + ?Sized>(
    participants: &[ParticipantId],
    rng: &mut R,
) -> Vec<ParticipantId> {
    let mut order = participants.to_vec();
    order.shuffle(rng);
    order
}
