//! Faction spawn policy
//!
//! The engine never inserts ships into the world directly; it decides that
//! a spawn should happen, emits a request event, and hands the built ship
//! to the scheduler. The population cap is checked against the total count
//! including ships already requested this tick, so a faction can never
//! overshoot its ceiling inside a single tick.

use rand::Rng;

use ahash::AHashSet;

use crate::core::config::EngineConfig;
use crate::core::types::{ShipId, Tick, Vec2};
use crate::factions::archetype::FactionArchetype;
use crate::factions::config::ArchetypeConfig;
use crate::factions::faction::Faction;
use crate::factions::state::FactionBehaviorState;
use crate::ships::{CombatStats, CooldownMap, Ship, ShipStatus, Weapon};

/// Decide whether the faction requests a new ship this tick
///
/// Gate order matters: the population cap is absolute and is checked
/// before the interval, the archetype gate, and the probability draw.
/// The draw consumes the rng only when every prior gate passes.
pub fn should_spawn_ship(
    faction: &Faction,
    total_ships: usize,
    now: Tick,
    config: &ArchetypeConfig,
    rng: &mut impl Rng,
) -> bool {
    if total_ships >= faction.spawn.max_ships {
        return false;
    }
    if now.saturating_sub(faction.spawn.last_spawn_tick) < faction.spawn.interval_ticks {
        return false;
    }

    let archetype_gate = match faction.archetype {
        FactionArchetype::SpaceRats => true,
        // Phantoms rebuild only while their territory is quiet
        FactionArchetype::LostNova => faction.territory.threat < 0.5,
        // Enforcers mobilize reinforcements only during an enforcement action
        FactionArchetype::EquatorHorizon => faction.state == FactionBehaviorState::Enforcing,
    };
    if !archetype_gate {
        return false;
    }

    rng.gen::<f32>() < config.spawn_probability
}

/// A point on the territory rim, pulled in by the boundary offset
pub fn spawn_position(faction: &Faction, engine: &EngineConfig, rng: &mut impl Rng) -> Vec2 {
    let angle = rng.gen::<f32>() * std::f32::consts::TAU;
    let radius = (faction.territory.radius - engine.spawn_boundary_offset).max(0.0);
    Vec2::new(
        faction.territory.center.x + angle.cos() * radius,
        faction.territory.center.y + angle.sin() * radius,
    )
}

/// Build a new ship of the faction's standard hull at `position`
///
/// `serial` is the faction's running hull number, used only for the name.
pub fn build_ship(faction: &Faction, serial: usize, position: Vec2) -> Ship {
    let (class, stats, weapon, ability_value, stealth_capable) = match faction.archetype {
        FactionArchetype::SpaceRats => (
            "Raider",
            CombatStats {
                health: 80.0,
                max_health: 80.0,
                shield: 20.0,
                max_shield: 20.0,
                armor: 10.0,
                speed: 14.0,
                turn_rate: 2.0,
                accuracy: 0.7,
                evasion: 0.25,
                crit_chance: 0.15,
                crit_damage: 1.5,
                shield_penetration: 0.0,
                armor_penetration: 0.1,
            },
            Weapon {
                name: "Scrap Cannon".to_string(),
                damage: 12.0,
                range: 110.0,
            },
            0.0,
            false,
        ),
        FactionArchetype::LostNova => (
            "Phantom",
            CombatStats {
                health: 60.0,
                max_health: 60.0,
                shield: 40.0,
                max_shield: 40.0,
                armor: 5.0,
                speed: 12.0,
                turn_rate: 2.5,
                accuracy: 0.8,
                evasion: 0.4,
                crit_chance: 0.2,
                crit_damage: 1.8,
                shield_penetration: 0.2,
                armor_penetration: 0.0,
            },
            Weapon {
                name: "Phase Lance".to_string(),
                damage: 16.0,
                range: 130.0,
            },
            15.0,
            true,
        ),
        FactionArchetype::EquatorHorizon => (
            "Enforcer",
            CombatStats {
                health: 140.0,
                max_health: 140.0,
                shield: 80.0,
                max_shield: 80.0,
                armor: 30.0,
                speed: 8.0,
                turn_rate: 1.0,
                accuracy: 0.85,
                evasion: 0.1,
                crit_chance: 0.05,
                crit_damage: 1.3,
                shield_penetration: 0.1,
                armor_penetration: 0.2,
            },
            Weapon {
                name: "Suppression Beam".to_string(),
                damage: 20.0,
                range: 190.0,
            },
            20.0,
            false,
        ),
    };

    Ship {
        id: ShipId::new(),
        name: format!("{} {} {}", faction.name, class, serial),
        faction: faction.id,
        position,
        velocity: Vec2::default(),
        stats,
        weapons: vec![weapon],
        ability_value,
        stealth_capable,
        target: None,
        status: ShipStatus::Active,
        tags: AHashSet::new(),
        cooldowns: CooldownMap::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::FactionId;
    use crate::factions::config::ConfigRegistry;
    use crate::factions::faction::Territory;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn faction_of(archetype: FactionArchetype) -> Faction {
        let configs = ConfigRegistry::standard();
        let config = configs.for_archetype(archetype).unwrap();
        Faction::new(
            FactionId(1),
            "Test",
            archetype,
            Territory {
                center: Vec2::default(),
                radius: 300.0,
                resources: 0.5,
                threat: 0.0,
            },
            config,
        )
    }

    #[test]
    fn test_cap_blocks_spawn_even_when_all_other_gates_pass() {
        let configs = ConfigRegistry::standard();
        let config = configs.for_archetype(FactionArchetype::SpaceRats).unwrap();
        let faction = faction_of(FactionArchetype::SpaceRats);
        let mut rng = ChaCha8Rng::seed_from_u64(1);

        let at_cap = faction.spawn.max_ships;
        for _ in 0..50 {
            assert!(!should_spawn_ship(&faction, at_cap, 1_000, config, &mut rng));
        }
    }

    #[test]
    fn test_interval_blocks_spawn() {
        let configs = ConfigRegistry::standard();
        let config = configs.for_archetype(FactionArchetype::SpaceRats).unwrap();
        let mut faction = faction_of(FactionArchetype::SpaceRats);
        faction.spawn.last_spawn_tick = 100;
        let mut rng = ChaCha8Rng::seed_from_u64(1);

        let too_soon = 100 + faction.spawn.interval_ticks - 1;
        assert!(!should_spawn_ship(&faction, 0, too_soon, config, &mut rng));
    }

    #[test]
    fn test_lost_nova_needs_quiet_territory() {
        let configs = ConfigRegistry::standard();
        let config = configs.for_archetype(FactionArchetype::LostNova).unwrap();
        let mut faction = faction_of(FactionArchetype::LostNova);
        let mut rng = ChaCha8Rng::seed_from_u64(1);

        faction.territory.threat = 0.6;
        assert!(!should_spawn_ship(&faction, 0, 1_000, config, &mut rng));
        faction.territory.threat = 0.2;
        assert!(should_spawn_ship(&faction, 0, 1_000, config, &mut rng));
    }

    #[test]
    fn test_equator_horizon_spawns_only_while_enforcing() {
        let configs = ConfigRegistry::standard();
        let config = configs
            .for_archetype(FactionArchetype::EquatorHorizon)
            .unwrap();
        let mut faction = faction_of(FactionArchetype::EquatorHorizon);
        let mut rng = ChaCha8Rng::seed_from_u64(1);

        assert!(!should_spawn_ship(&faction, 0, 1_000, config, &mut rng));
        faction.state = FactionBehaviorState::Enforcing;
        assert!(should_spawn_ship(&faction, 0, 1_000, config, &mut rng));
    }

    #[test]
    fn test_spawn_position_respects_boundary_offset() {
        let faction = faction_of(FactionArchetype::SpaceRats);
        let engine = EngineConfig::default();
        let mut rng = ChaCha8Rng::seed_from_u64(7);

        for _ in 0..20 {
            let pos = spawn_position(&faction, &engine, &mut rng);
            let dist = pos.distance(&faction.territory.center);
            assert!(dist <= faction.territory.radius - engine.spawn_boundary_offset + 1e-3);
        }
    }

    #[test]
    fn test_built_ship_matches_archetype() {
        let faction = faction_of(FactionArchetype::LostNova);
        let ship = build_ship(&faction, 3, Vec2::new(10.0, 0.0));
        assert!(ship.stealth_capable);
        assert_eq!(ship.faction, faction.id);
        assert!(ship.is_active());
        assert!(ship.strength() > 0.0);
    }
}
