//! Per-agent, per-tick evaluation context
//!
//! Built fresh every tick from the shared snapshot and the faction's
//! current state. Nothing survives the tick except the cooldown map, which
//! the owning ship persists: the scheduler moves it in before evaluation
//! and moves it back after.

use ahash::AHashSet;

use crate::core::config::EngineConfig;
use crate::core::error::Result;
use crate::core::types::{clamp_unit, FactionId, ShipId, Tick, Vec2};
use crate::factions::config::ArchetypeConfig;
use crate::factions::faction::Faction;
use crate::factions::state::FactionBehaviorState;
use crate::factions::tactics::Formation;
use crate::ships::{CooldownMap, EffectTag, Ship};
use crate::world::snapshot::ShipObservation;
use crate::world::spatial::SpatialQuery;

/// The evaluating ship, as of snapshot capture
#[derive(Debug, Clone)]
pub struct AgentSnapshot {
    pub id: ShipId,
    pub faction: FactionId,
    pub position: Vec2,
    pub health_fraction: f32,
    pub weapon_range: f32,
    pub stealth_capable: bool,
    pub target: Option<ShipId>,
}

/// Everything a behavior tree may read while deciding for one ship
#[derive(Debug)]
pub struct BehaviorContext {
    pub agent: AgentSnapshot,
    pub state: FactionBehaviorState,
    pub fleet_strength: f32,
    /// Normalized hostile pressure around the agent, min(1, hostiles / 10)
    pub threat_level: f32,
    pub enemies: Vec<ShipObservation>,
    pub allies: Vec<ShipObservation>,
    pub formation: Formation,
    pub territory_center: Vec2,
    pub preferred_range: f32,
    pub now: Tick,
    /// Owned for the duration of evaluation; returned to the ship after
    pub cooldowns: CooldownMap,
    /// Effect tags carried alongside the cooldowns; ability actions add
    /// theirs here and the scheduler writes the set back to the ship
    pub tags: AHashSet<EffectTag>,
}

impl BehaviorContext {
    /// The agent's engagement target: its current target if still observed,
    /// otherwise the nearest enemy
    pub fn engagement_target(&self) -> Option<&ShipObservation> {
        if let Some(target) = self.agent.target {
            if let Some(observed) = self.enemies.iter().find(|e| e.id == target) {
                return Some(observed);
            }
        }
        self.nearest_enemy()
    }

    pub fn nearest_enemy(&self) -> Option<&ShipObservation> {
        self.enemies.iter().min_by(|a, b| {
            let da = a.position.distance(&self.agent.position);
            let db = b.position.distance(&self.agent.position);
            da.partial_cmp(&db).unwrap_or(std::cmp::Ordering::Equal)
        })
    }
}

/// Build the context for one ship from the shared snapshot view
///
/// Neighbors come from the spatial collaborator using the faction's
/// territory radius. Construction reads the world but mutates nothing.
pub fn build_context(
    ship: &Ship,
    faction: &Faction,
    spatial: &dyn SpatialQuery,
    config: &ArchetypeConfig,
    engine: &EngineConfig,
    now: Tick,
    cooldowns: CooldownMap,
) -> Result<BehaviorContext> {
    let nearby = spatial.units_in_range(ship.position, faction.territory.radius)?;

    let mut enemies = Vec::new();
    let mut allies = Vec::new();
    for observed in nearby {
        if observed.id == ship.id {
            continue;
        }
        if observed.faction == faction.id {
            allies.push(observed);
        } else if faction.is_hostile_toward(observed.faction, config) {
            enemies.push(observed);
        }
    }

    let threat_level = clamp_unit(enemies.len() as f32 / engine.threat_divisor);

    Ok(BehaviorContext {
        agent: AgentSnapshot {
            id: ship.id,
            faction: ship.faction,
            position: ship.position,
            health_fraction: ship.health_fraction(),
            weapon_range: ship.weapon_range(),
            stealth_capable: ship.stealth_capable,
            target: ship.target,
        },
        state: faction.state,
        fleet_strength: faction.fleet_strength,
        threat_level,
        enemies,
        allies,
        formation: faction.tactics.formation,
        territory_center: faction.territory.center,
        preferred_range: config.preferred_range,
        now,
        cooldowns,
        tags: ship.tags.clone(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn obs(faction: u32, x: f32) -> ShipObservation {
        ShipObservation {
            id: ShipId::new(),
            faction: FactionId(faction),
            position: Vec2::new(x, 0.0),
            stealth_capable: false,
            strength: 10.0,
            active: true,
        }
    }

    fn context_with_enemies(enemies: Vec<ShipObservation>) -> BehaviorContext {
        BehaviorContext {
            agent: AgentSnapshot {
                id: ShipId::new(),
                faction: FactionId(1),
                position: Vec2::default(),
                health_fraction: 1.0,
                weapon_range: 100.0,
                stealth_capable: false,
                target: None,
            },
            state: FactionBehaviorState::Patrolling,
            fleet_strength: 100.0,
            threat_level: 0.0,
            enemies,
            allies: vec![],
            formation: Formation::Orbit,
            territory_center: Vec2::default(),
            preferred_range: 150.0,
            now: 0,
            cooldowns: CooldownMap::new(),
            tags: AHashSet::new(),
        }
    }

    #[test]
    fn test_nearest_enemy_picks_closest() {
        let near = obs(2, 10.0);
        let near_id = near.id;
        let ctx = context_with_enemies(vec![obs(2, 50.0), near, obs(2, 30.0)]);
        assert_eq!(ctx.nearest_enemy().unwrap().id, near_id);
    }

    #[test]
    fn test_engagement_target_prefers_current_target() {
        let far = obs(2, 90.0);
        let far_id = far.id;
        let mut ctx = context_with_enemies(vec![obs(2, 10.0), far]);
        ctx.agent.target = Some(far_id);
        assert_eq!(ctx.engagement_target().unwrap().id, far_id);
    }

    #[test]
    fn test_engagement_target_falls_back_when_target_gone() {
        let near = obs(2, 10.0);
        let near_id = near.id;
        let mut ctx = context_with_enemies(vec![near]);
        ctx.agent.target = Some(ShipId::new());
        assert_eq!(ctx.engagement_target().unwrap().id, near_id);
    }

    #[test]
    fn test_no_enemies_no_target() {
        let ctx = context_with_enemies(vec![]);
        assert!(ctx.engagement_target().is_none());
    }
}
