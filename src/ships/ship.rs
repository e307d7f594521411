//! Ship data model: combat stats, loadout, status flags, and cooldowns
//!
//! Ships are the individual agents of the simulation. The decision engine
//! never mutates a ship mid-tick beyond its own cooldown map; movement and
//! damage are applied by external systems between ticks, from the commands
//! the engine emits.

use ahash::AHashSet;
use serde::{Deserialize, Serialize};

use crate::core::types::{FactionId, ShipId, Tick, Vec2};

/// Base combat statistics for a ship
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CombatStats {
    pub health: f32,
    pub max_health: f32,
    pub shield: f32,
    pub max_shield: f32,
    pub armor: f32,
    pub speed: f32,
    pub turn_rate: f32,
    pub accuracy: f32,
    pub evasion: f32,
    pub crit_chance: f32,
    pub crit_damage: f32,
    pub shield_penetration: f32,
    pub armor_penetration: f32,
}

impl CombatStats {
    /// Base stat contribution to fleet strength (before loadout and health scaling)
    pub fn base_value(&self) -> f32 {
        self.max_health + self.max_shield + self.armor
    }
}

/// A mounted weapon
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Weapon {
    pub name: String,
    pub damage: f32,
    pub range: f32,
}

/// Primary lifecycle status of a ship
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ShipStatus {
    Active,
    Disabled,
    Destroyed,
}

/// Secondary effect tags, one per ability
///
/// The engine applies a tag when the matching ability action fires;
/// external systems read them and clear them as the effects wear off.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EffectTag {
    Cloaked,
    ShieldBoosted,
    Overdriven,
}

/// Per-ship cooldown bookkeeping: action name -> expiry tick
///
/// Expiry is lazy: entries past their tick are treated as cleared on
/// lookup. `prune` removes them for memory hygiene; the scheduler calls
/// it once per tick.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CooldownMap {
    entries: ahash::AHashMap<String, Tick>,
}

impl CooldownMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// True if the named action is off cooldown at `now`
    pub fn ready(&self, action: &str, now: Tick) -> bool {
        match self.entries.get(action) {
            Some(&expiry) => now >= expiry,
            None => true,
        }
    }

    /// Start a cooldown expiring at `expiry`
    pub fn set(&mut self, action: &str, expiry: Tick) {
        self.entries.insert(action.to_string(), expiry);
    }

    /// Drop entries that expired at or before `now`
    pub fn prune(&mut self, now: Tick) {
        self.entries.retain(|_, &mut expiry| expiry > now);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// An individual simulated unit belonging to a faction
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ship {
    pub id: ShipId,
    pub name: String,
    pub faction: FactionId,
    pub position: Vec2,
    pub velocity: Vec2,
    pub stats: CombatStats,
    pub weapons: Vec<Weapon>,
    /// Strength contribution of special abilities (cloak, overdrive, ...)
    pub ability_value: f32,
    pub stealth_capable: bool,
    /// Current engagement target, if any (weak reference by id)
    pub target: Option<ShipId>,
    pub status: ShipStatus,
    pub tags: AHashSet<EffectTag>,
    pub cooldowns: CooldownMap,
}

impl Ship {
    pub fn is_active(&self) -> bool {
        self.status == ShipStatus::Active
    }

    /// Current health as a fraction of maximum, clamped to [0, 1]
    pub fn health_fraction(&self) -> f32 {
        if self.stats.max_health <= 0.0 {
            return 0.0;
        }
        (self.stats.health / self.stats.max_health).clamp(0.0, 1.0)
    }

    /// Strength of this ship: base stats plus expected weapon output plus
    /// ability value, scaled by current health fraction
    pub fn strength(&self) -> f32 {
        let weapon_output: f32 = self
            .weapons
            .iter()
            .map(|w| w.damage * self.stats.accuracy)
            .sum();
        (self.stats.base_value() + weapon_output + self.ability_value) * self.health_fraction()
    }

    /// Longest weapon range, or zero for an unarmed ship
    pub fn weapon_range(&self) -> f32 {
        self.weapons.iter().map(|w| w.range).fold(0.0, f32::max)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_ship() -> Ship {
        Ship {
            id: ShipId::new(),
            name: "Rust Bucket".to_string(),
            faction: FactionId(1),
            position: Vec2::default(),
            velocity: Vec2::default(),
            stats: CombatStats {
                health: 100.0,
                max_health: 100.0,
                shield: 50.0,
                max_shield: 50.0,
                armor: 20.0,
                speed: 10.0,
                turn_rate: 1.0,
                accuracy: 0.8,
                evasion: 0.2,
                crit_chance: 0.1,
                crit_damage: 1.5,
                shield_penetration: 0.0,
                armor_penetration: 0.0,
            },
            weapons: vec![Weapon {
                name: "Autocannon".to_string(),
                damage: 10.0,
                range: 100.0,
            }],
            ability_value: 5.0,
            stealth_capable: false,
            target: None,
            status: ShipStatus::Active,
            tags: AHashSet::new(),
            cooldowns: CooldownMap::new(),
        }
    }

    #[test]
    fn test_strength_scales_with_health() {
        let mut ship = test_ship();
        let full = ship.strength();
        ship.stats.health = 50.0;
        let half = ship.strength();
        assert!((half - full / 2.0).abs() < 1e-3);
    }

    #[test]
    fn test_strength_includes_weapon_output() {
        let mut ship = test_ship();
        let armed = ship.strength();
        ship.weapons.clear();
        let unarmed = ship.strength();
        // 10 damage * 0.8 accuracy = 8.0 expected output
        assert!((armed - unarmed - 8.0).abs() < 1e-3);
    }

    #[test]
    fn test_cooldown_lazy_expiry() {
        let mut cds = CooldownMap::new();
        cds.set("volley", 10);
        assert!(!cds.ready("volley", 5));
        assert!(cds.ready("volley", 10));
        // Expired entries linger until pruned
        assert_eq!(cds.len(), 1);
        cds.prune(10);
        assert!(cds.is_empty());
    }

    #[test]
    fn test_cooldown_unknown_action_is_ready() {
        let cds = CooldownMap::new();
        assert!(cds.ready("anything", 0));
    }

    #[test]
    fn test_health_fraction_clamped() {
        let mut ship = test_ship();
        ship.stats.health = -20.0;
        assert_eq!(ship.health_fraction(), 0.0);
        ship.stats.health = 250.0;
        assert_eq!(ship.health_fraction(), 1.0);
    }
}
