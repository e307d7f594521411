pub mod ship;

pub use ship::{CombatStats, CooldownMap, EffectTag, Ship, ShipStatus, Weapon};
