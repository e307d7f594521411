//! Faction disposition states
//!
//! The coarse-grained per-faction FSM. Each faction is in exactly one of
//! these states; transitions are driven by triggers through the archetype's
//! transition table.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FactionBehaviorState {
    Patrolling,
    Pursuing,
    Attacking,
    Retreating,
    Ambushing,
    Enforcing,
}

impl std::fmt::Display for FactionBehaviorState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            FactionBehaviorState::Patrolling => "patrolling",
            FactionBehaviorState::Pursuing => "pursuing",
            FactionBehaviorState::Attacking => "attacking",
            FactionBehaviorState::Retreating => "retreating",
            FactionBehaviorState::Ambushing => "ambushing",
            FactionBehaviorState::Enforcing => "enforcing",
        };
        write!(f, "{name}")
    }
}
