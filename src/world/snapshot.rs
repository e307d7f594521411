//! Immutable world snapshot taken at tick start
//!
//! The whole tick observes one consistent view: the snapshot is captured
//! once, before any faction runs, and is never mutated by the engine.
//! Side effects are emitted as commands for external systems to apply
//! before the next capture.

use serde::{Deserialize, Serialize};

use crate::core::types::{FactionId, ShipId, Tick, Vec2};
use crate::ships::Ship;

/// Lightweight per-ship view carried by the snapshot
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShipObservation {
    pub id: ShipId,
    pub faction: FactionId,
    pub position: Vec2,
    pub stealth_capable: bool,
    pub strength: f32,
    pub active: bool,
}

impl ShipObservation {
    pub fn observe(ship: &Ship) -> Self {
        Self {
            id: ship.id,
            faction: ship.faction,
            position: ship.position,
            stealth_capable: ship.stealth_capable,
            strength: ship.strength(),
            active: ship.is_active(),
        }
    }
}

/// Per-faction territory view carried by the snapshot
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TerritoryObservation {
    pub faction: FactionId,
    pub center: Vec2,
    pub radius: f32,
    pub resources: f32,
    pub threat: f32,
}

/// One consistent view of the world for a single tick
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorldSnapshot {
    pub tick: Tick,
    ships: Vec<ShipObservation>,
    territories: Vec<TerritoryObservation>,
}

impl WorldSnapshot {
    pub fn capture(
        tick: Tick,
        ships: &[Ship],
        territories: impl IntoIterator<Item = TerritoryObservation>,
    ) -> Self {
        Self {
            tick,
            ships: ships.iter().map(ShipObservation::observe).collect(),
            territories: territories.into_iter().collect(),
        }
    }

    pub fn ships(&self) -> &[ShipObservation] {
        &self.ships
    }

    pub fn active_ships(&self) -> impl Iterator<Item = &ShipObservation> {
        self.ships.iter().filter(|s| s.active)
    }

    pub fn ships_of(&self, faction: FactionId) -> impl Iterator<Item = &ShipObservation> {
        self.active_ships().filter(move |s| s.faction == faction)
    }

    /// Total strength of a faction's active ships, as observed at capture
    pub fn fleet_strength(&self, faction: FactionId) -> f32 {
        self.ships_of(faction).map(|s| s.strength).sum()
    }

    pub fn territory(&self, faction: FactionId) -> Option<&TerritoryObservation> {
        self.territories.iter().find(|t| t.faction == faction)
    }

    pub fn territories(&self) -> &[TerritoryObservation] {
        &self.territories
    }
}
