//! Behavior tree node definitions
//!
//! Conditions and actions are closed enums: every predicate and effect the
//! engine knows is a variant here, matched exhaustively by the evaluator.
//! No runtime shape checks, no registered callbacks.

use serde::{Deserialize, Serialize};

use crate::core::types::NodeId;
use crate::factions::state::FactionBehaviorState;
use crate::factions::tactics::Formation;
use crate::ships::EffectTag;

/// Special abilities a ship can trigger from an action node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AbilityKind {
    ShieldBoost,
    Cloak,
    Overdrive,
}

impl AbilityKind {
    /// Stable name used as the cooldown-map key and in action telemetry
    pub fn name(&self) -> &'static str {
        match self {
            AbilityKind::ShieldBoost => "shield-boost",
            AbilityKind::Cloak => "cloak",
            AbilityKind::Overdrive => "overdrive",
        }
    }

    pub fn cooldown_ticks(&self) -> u64 {
        match self {
            AbilityKind::ShieldBoost => 12,
            AbilityKind::Cloak => 20,
            AbilityKind::Overdrive => 15,
        }
    }

    /// The status tag this ability leaves on the ship while it is in effect
    pub fn effect_tag(&self) -> EffectTag {
        match self {
            AbilityKind::ShieldBoost => EffectTag::ShieldBoosted,
            AbilityKind::Cloak => EffectTag::Cloaked,
            AbilityKind::Overdrive => EffectTag::Overdriven,
        }
    }
}

/// Pure predicates over the behavior context
///
/// Conditions never mutate the context and never emit commands.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum ConditionKind {
    /// The agent has a live engagement target among observed enemies
    HasTarget,
    /// The engagement target sits within the agent's weapon range
    TargetInWeaponRange,
    HealthBelow(f32),
    HealthAbove(f32),
    ThreatAbove(f32),
    ThreatBelow(f32),
    EnemiesNearby,
    AlliesOutnumberEnemies,
    CooldownReady(AbilityKind),
    FormationIs(Formation),
    StateIs(FactionBehaviorState),
    StealthCapable,
}

/// Effects an action node can carry out
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum ActionKind {
    /// Open fire on the engagement target
    Engage,
    /// Close distance toward the engagement target
    Pursue,
    /// Disengage away from the nearest enemy, toward home territory
    FallBack,
    /// Return to the territory center and hold formation
    Regroup,
    ActivateAbility(AbilityKind),
}

impl ActionKind {
    pub fn name(&self) -> &'static str {
        match self {
            ActionKind::Engage => "engage",
            ActionKind::Pursue => "pursue",
            ActionKind::FallBack => "fall-back",
            ActionKind::Regroup => "regroup",
            ActionKind::ActivateAbility(ability) => ability.name(),
        }
    }
}

/// Node kind plus composite structure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum BehaviorNodeKind {
    /// Succeeds only if every child succeeds, in order; short-circuits on failure
    Sequence(Vec<NodeId>),
    /// Succeeds on the first child that succeeds; short-circuits on success
    Selector(Vec<NodeId>),
    Condition(ConditionKind),
    Action(ActionKind),
}

/// One registered node of a behavior tree
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BehaviorNode {
    pub id: NodeId,
    pub name: &'static str,
    pub kind: BehaviorNodeKind,
}
