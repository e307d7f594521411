//! Faction-level tactical fields
//!
//! Recomputed every tick as pure functions of the new disposition state and
//! the snapshot. Nothing here mutates the faction; the scheduler assigns
//! the returned plan and emits a change notification if it differs.

use serde::{Deserialize, Serialize};

use crate::core::types::{clamp_unit, Vec2};
use crate::factions::config::ArchetypeConfig;
use crate::factions::state::FactionBehaviorState;
use crate::world::snapshot::WorldSnapshot;

/// How a faction's ships fight while in a given disposition
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CombatTactics {
    Balanced,
    Aggressive,
    Defensive,
    Stealth,
    Enforcement,
}

/// Fleet formation carried into each ship's behavior context
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Formation {
    Line,
    Wedge,
    Scatter,
    Orbit,
}

/// The faction-level tactical fields recomputed each tick
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TacticalPlan {
    pub combat: CombatTactics,
    pub formation: Formation,
    /// Weight given to resource gathering over combat, in [0, 1]
    pub gathering_priority: f32,
    /// Unit vector the faction expands toward
    pub expansion_direction: Vec2,
}

impl TacticalPlan {
    /// Plan for a state without snapshot information (initialization)
    pub fn for_state(state: FactionBehaviorState, config: &ArchetypeConfig) -> Self {
        let (combat, formation, base_gathering) = state_profile(state);
        Self {
            combat,
            formation,
            gathering_priority: gathering(base_gathering, config),
            expansion_direction: Vec2::new(1.0, 0.0),
        }
    }

    /// Full recompute from the new state and this tick's snapshot
    pub fn derive(
        state: FactionBehaviorState,
        config: &ArchetypeConfig,
        snapshot: &WorldSnapshot,
        own: crate::core::types::FactionId,
        center: Vec2,
    ) -> Self {
        let (combat, formation, base_gathering) = state_profile(state);
        Self {
            combat,
            formation,
            gathering_priority: gathering(base_gathering, config),
            expansion_direction: expansion_direction(snapshot, own, center),
        }
    }
}

fn state_profile(state: FactionBehaviorState) -> (CombatTactics, Formation, f32) {
    match state {
        FactionBehaviorState::Patrolling => (CombatTactics::Balanced, Formation::Orbit, 0.6),
        FactionBehaviorState::Pursuing => (CombatTactics::Aggressive, Formation::Line, 0.3),
        FactionBehaviorState::Attacking => (CombatTactics::Aggressive, Formation::Wedge, 0.2),
        FactionBehaviorState::Retreating => (CombatTactics::Defensive, Formation::Scatter, 0.8),
        FactionBehaviorState::Ambushing => (CombatTactics::Stealth, Formation::Scatter, 0.4),
        FactionBehaviorState::Enforcing => (CombatTactics::Enforcement, Formation::Line, 0.5),
    }
}

fn gathering(base: f32, config: &ArchetypeConfig) -> f32 {
    clamp_unit(base + 0.2 * (config.trading - 0.5))
}

/// Expand away from the strongest foreign fleet; +x when alone
fn expansion_direction(
    snapshot: &WorldSnapshot,
    own: crate::core::types::FactionId,
    center: Vec2,
) -> Vec2 {
    let strongest = snapshot
        .territories()
        .iter()
        .filter(|t| t.faction != own)
        .max_by(|a, b| {
            let sa = snapshot.fleet_strength(a.faction);
            let sb = snapshot.fleet_strength(b.faction);
            sa.partial_cmp(&sb).unwrap_or(std::cmp::Ordering::Equal)
        });

    match strongest {
        Some(t) => {
            let away = center - t.center;
            if away.length() > 0.0001 {
                away.normalize()
            } else {
                Vec2::new(1.0, 0.0)
            }
        }
        None => Vec2::new(1.0, 0.0),
    }
}
