//! Faction archetypes and their transition tables
//!
//! Three archetypes from the sprawl: the always-hostile Space Rats, the
//! provocation-gated Lost Nova ambushers, and the Equator Horizon
//! enforcers who move only when another fleet grows too strong.

use serde::{Deserialize, Serialize};

use crate::factions::state::FactionBehaviorState;
use crate::factions::transition::TransitionTable;
use crate::factions::trigger::Trigger;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FactionArchetype {
    SpaceRats,
    LostNova,
    EquatorHorizon,
}

impl FactionArchetype {
    pub const ALL: [FactionArchetype; 3] = [
        FactionArchetype::SpaceRats,
        FactionArchetype::LostNova,
        FactionArchetype::EquatorHorizon,
    ];

    /// Every archetype starts out patrolling its own territory
    pub fn initial_state(&self) -> FactionBehaviorState {
        FactionBehaviorState::Patrolling
    }

    /// The immutable transition table for this archetype
    pub fn transition_table(&self) -> TransitionTable {
        use FactionBehaviorState::*;
        use Trigger::*;

        match self {
            FactionArchetype::SpaceRats => TransitionTable::new()
                .with(Patrolling, DetectTarget, Pursuing)
                .with(Pursuing, EngageRange, Attacking)
                .with(Pursuing, TargetLost, Patrolling)
                .with(Attacking, HeavyDamage, Retreating)
                .with(Attacking, TargetDestroyed, Patrolling)
                .with(Retreating, SafeDistance, Patrolling)
                .with(Retreating, Reinforced, Attacking),

            FactionArchetype::LostNova => TransitionTable::new()
                .with(Patrolling, AmbushOpportunity, Ambushing)
                .with(Patrolling, Provoked, Pursuing)
                .with(Ambushing, EngageRange, Attacking)
                .with(Ambushing, NoTargets, Patrolling)
                .with(Pursuing, EngageRange, Attacking)
                .with(Pursuing, TargetLost, Patrolling)
                .with(Attacking, HeavyDamage, Retreating)
                .with(Attacking, TargetDestroyed, Patrolling)
                .with(Retreating, SafeDistance, Patrolling),

            FactionArchetype::EquatorHorizon => TransitionTable::new()
                .with(Patrolling, PowerThresholdExceeded, Enforcing)
                .with(Enforcing, DetectTarget, Attacking)
                .with(Enforcing, BalanceRestored, Patrolling)
                .with(Attacking, HeavyDamage, Retreating)
                .with(Attacking, TargetDestroyed, Enforcing)
                .with(Retreating, SafeDistance, Patrolling),
        }
    }
}

impl std::fmt::Display for FactionArchetype {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            FactionArchetype::SpaceRats => "space-rats",
            FactionArchetype::LostNova => "lost-nova",
            FactionArchetype::EquatorHorizon => "equator-horizon",
        };
        write!(f, "{name}")
    }
}

impl std::str::FromStr for FactionArchetype {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "space-rats" => Ok(FactionArchetype::SpaceRats),
            "lost-nova" => Ok(FactionArchetype::LostNova),
            "equator-horizon" => Ok(FactionArchetype::EquatorHorizon),
            other => Err(format!("unknown faction archetype: {other}")),
        }
    }
}
