//! Trigger derivation from world observations
//!
//! Triggers are symbolic tokens produced fresh each tick from the snapshot;
//! they never persist across ticks. A faction may produce zero, one, or
//! several triggers in the same tick. All of them are computed from the
//! same snapshot before any transition applies, so derivation never sees
//! partial results of this tick's own state changes.

use serde::{Deserialize, Serialize};

use crate::core::config::EngineConfig;
use crate::core::error::Result;
use crate::factions::config::{ArchetypeConfig, SpecialRule};
use crate::factions::faction::Faction;
use crate::factions::state::FactionBehaviorState;
use crate::world::snapshot::{TerritoryObservation, WorldSnapshot};
use crate::world::spatial::SpatialQuery;

/// Symbolic event consumed by the state machine within the same tick
///
/// Declaration order is load-bearing: when two triggers share a priority,
/// the one declared first is applied first. Changing this order changes
/// transition outcomes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Trigger {
    HeavyDamage,
    PowerThresholdExceeded,
    BalanceRestored,
    Provoked,
    AmbushOpportunity,
    EngageRange,
    DetectTarget,
    TargetDestroyed,
    TargetLost,
    Reinforced,
    SafeDistance,
    NoTargets,
}

impl Trigger {
    /// Application priority; lower values apply first
    ///
    /// Damage reactions outrank archetype escalation, which outranks
    /// engagement, which outranks disengagement. Ties fall back to
    /// declaration order via the derived `Ord`.
    pub fn priority(&self) -> u8 {
        match self {
            Trigger::HeavyDamage => 0,
            Trigger::PowerThresholdExceeded | Trigger::BalanceRestored => 1,
            Trigger::Provoked | Trigger::AmbushOpportunity => 2,
            Trigger::EngageRange | Trigger::DetectTarget => 3,
            Trigger::TargetDestroyed | Trigger::TargetLost => 4,
            Trigger::Reinforced => 5,
            Trigger::SafeDistance | Trigger::NoTargets => 6,
        }
    }
}

/// Sort triggers into their declared deterministic application order
pub fn sort_triggers(triggers: &mut [Trigger]) {
    triggers.sort_by_key(|t| (t.priority(), *t));
}

/// Ambush gate: enough stealth-capable ships and a quiet territory
pub fn is_ambush_opportunity(
    stealth_capable_ships: usize,
    territory_threat: f32,
    engine: &EngineConfig,
) -> bool {
    stealth_capable_ships >= engine.ambush_min_stealth_ships
        && territory_threat < engine.ambush_max_threat
}

/// Derive this tick's triggers for one faction from the shared snapshot
///
/// Spatial reads happen here and nowhere else in the faction's control
/// path before mutation, so a failing collaborator aborts the faction's
/// tick before any state has changed.
pub fn evaluate_triggers(
    faction: &Faction,
    territory: &TerritoryObservation,
    snapshot: &WorldSnapshot,
    spatial: &dyn SpatialQuery,
    config: &ArchetypeConfig,
    engine: &EngineConfig,
) -> Result<Vec<Trigger>> {
    let mut triggers = Vec::new();

    let threats = spatial.threats_in_territory(territory)?;
    let hostiles: Vec<_> = threats
        .iter()
        .filter(|t| faction.is_hostile_toward(t.faction, config))
        .collect();

    if territory.threat >= engine.heavy_damage_threat {
        triggers.push(Trigger::HeavyDamage);
    }

    // An ambusher lying in wait sees an empty sky on purpose: while the
    // ambush gate holds, the opportunity replaces NoTargets rather than
    // co-firing with it and cancelling the transition in the same tick.
    let ambush = config.special_rule == SpecialRule::RequiresProvocation && {
        let stealth_ships = snapshot
            .ships_of(faction.id)
            .filter(|s| s.stealth_capable)
            .count();
        is_ambush_opportunity(stealth_ships, territory.threat, engine)
    };

    if hostiles.is_empty() {
        if !ambush {
            triggers.push(Trigger::NoTargets);
        }
    } else {
        triggers.push(Trigger::DetectTarget);
        if hostiles
            .iter()
            .any(|t| t.distance <= config.preferred_range)
        {
            triggers.push(Trigger::EngageRange);
        }
    }

    // SafeDistance looks beyond the territory: a retreat is over only once
    // no hostile sits within the widened radius.
    let wide_radius = territory.radius * engine.safe_distance_factor;
    let nearby = spatial.units_in_range(territory.center, wide_radius)?;
    let any_hostile_near = nearby
        .iter()
        .any(|s| faction.is_hostile_toward(s.faction, config));
    if !any_hostile_near {
        triggers.push(Trigger::SafeDistance);
    }

    // Contact-loss triggers compare against the previous tick's observation.
    if faction.last_hostile_count() > 0 && hostiles.is_empty() {
        match faction.state {
            FactionBehaviorState::Attacking => triggers.push(Trigger::TargetDestroyed),
            FactionBehaviorState::Pursuing => triggers.push(Trigger::TargetLost),
            _ => {}
        }
    }

    if faction.state == FactionBehaviorState::Retreating {
        let allies = snapshot.ships_of(faction.id).count();
        if allies >= engine.reinforcement_min_allies {
            triggers.push(Trigger::Reinforced);
        }
    }

    match config.special_rule {
        SpecialRule::AlwaysHostile => {}
        SpecialRule::RequiresProvocation => {
            if faction
                .relationships()
                .any(|(_, value)| value <= engine.provocation_threshold)
            {
                triggers.push(Trigger::Provoked);
            }
            if ambush {
                triggers.push(Trigger::AmbushOpportunity);
            }
        }
        SpecialRule::PowerThreshold => {
            let own = snapshot.fleet_strength(faction.id);
            let excessive = snapshot
                .territories()
                .iter()
                .filter(|t| t.faction != faction.id)
                .any(|t| snapshot.fleet_strength(t.faction) > config.power_threshold * own);
            if excessive {
                triggers.push(Trigger::PowerThresholdExceeded);
            } else if faction.state == FactionBehaviorState::Enforcing {
                triggers.push(Trigger::BalanceRestored);
            }
        }
    }

    sort_triggers(&mut triggers);
    Ok(triggers)
}
