//! Named, single-fire, cancelable timers.
//!
//! The registry does not sleep. Arming a timer yields a [`TimerHandle`]
//! that the owner schedules however it likes; when the delay elapses the
//! owner hands `(name, generation)` back to [`TimerRegistry::fire`]. Only the
//! generation currently armed under that name produces an action, so a
//! timer that was superseded, canceled, or already fired is ignored.

use std::collections::HashMap;
use std::fmt;
use std::time::{Duration, Instant};

use crate::domain::participants::ParticipantId;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TimerName {
    RoleDisplay,
    Round,
    Vote,
    RevealDelay,
    ScoringDisplay,
    DisconnectGrace(ParticipantId),
    ReconnectWindow(ParticipantId),
}

impl TimerName {
    /// Timers tied to the phase clock, as opposed to a participant.
    pub const PHASE: [TimerName; 5] = [
        TimerName::RoleDisplay,
        TimerName::Round,
        TimerName::Vote,
        TimerName::RevealDelay,
        TimerName::ScoringDisplay,
    ];

    pub fn is_phase_timer(&self) -> bool {
        !matches!(
            self,
            TimerName::DisconnectGrace(_) | TimerName::ReconnectWindow(_)
        )
    }
}

impl fmt::Display for TimerName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TimerName::RoleDisplay => f.write_str("role_display"),
            TimerName::Round => f.write_str("round"),
            TimerName::Vote => f.write_str("vote"),
            TimerName::RevealDelay => f.write_str("reveal"),
            TimerName::ScoringDisplay => f.write_str("scoring"),
            TimerName::DisconnectGrace(id) => write!(f, "disconnect:{id}"),
            TimerName::ReconnectWindow(id) => write!(f, "reconnect:{id}"),
        }
    }
}

/// Everything the scheduler needs to deliver a firing back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimerHandle {
    pub name: TimerName,
    pub generation: u64,
    pub delay: Duration,
}

#[derive(Debug, Clone)]
struct Armed<A> {
    generation: u64,
    action: A,
    armed_at: Instant,
    delay: Duration,
}

#[derive(Debug, Clone)]
pub struct TimerRegistry<A> {
    armed: HashMap<TimerName, Armed<A>>,
    next_generation: u64,
}

impl<A> Default for TimerRegistry<A> {
    fn default() -> Self {
        Self {
            armed: HashMap::new(),
            next_generation: 1,
        }
    }
}

impl<A> TimerRegistry<A> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Arm `name`, superseding whatever was armed under it.
    pub fn arm(&mut self, name: TimerName, delay: Duration, action: A, now: Instant) -> TimerHandle {
        let generation = self.next_generation;
        self.next_generation += 1;
        self.armed.insert(
            name.clone(),
            Armed {
                generation,
                action,
                armed_at: now,
                delay,
            },
        );
        TimerHandle {
            name,
            generation,
            delay,
        }
    }

    /// Returns whether something was armed. Calling it again is harmless.
    pub fn cancel(&mut self, name: &TimerName) -> bool {
        self.armed.remove(name).is_some()
    }

    /// Cancel everything, returning the names that were armed.
    pub fn cancel_all(&mut self) -> Vec<TimerName> {
        self.armed.drain().map(|(name, _)| name).collect()
    }

    /// Claim the action for a firing. Stale generations get `None`.
    pub fn fire(&mut self, name: &TimerName, generation: u64) -> Option<A> {
        match self.armed.get(name) {
            Some(armed) if armed.generation == generation => {
                self.armed.remove(name).map(|armed| armed.action)
            }
            _ => None,
        }
    }

    pub fn is_armed(&self, name: &TimerName) -> bool {
        self.armed.contains_key(name)
    }

    pub fn remaining(&self, name: &TimerName, now: Instant) -> Option<Duration> {
        self.armed.get(name).map(|armed| {
            let elapsed = now.saturating_duration_since(armed.armed_at);
            armed.delay.saturating_sub(elapsed)
        })
    }

    pub fn total(&self, name: &TimerName) -> Option<Duration> {
        self.armed.get(name).map(|armed| armed.delay)
    }

    pub fn len(&self) -> usize {
        self.armed.len()
    }

    pub fn is_empty(&self) -> bool {
        self.armed.is_empty()
    }
}
