//! Faction data model: disposition, territory, relationships, spawn policy

use std::collections::VecDeque;

use ahash::AHashMap;
use serde::{Deserialize, Serialize};

use crate::core::types::{clamp_relationship, clamp_unit, FactionId, Tick, Vec2};
use crate::factions::archetype::FactionArchetype;
use crate::factions::config::{ArchetypeConfig, SpecialRule};
use crate::factions::state::FactionBehaviorState;
use crate::factions::tactics::TacticalPlan;
use crate::world::snapshot::TerritoryObservation;

/// A faction's home region: spatial extent plus resource and threat levels
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Territory {
    pub center: Vec2,
    pub radius: f32,
    /// Normalized resource stock in [0, 1]
    pub resources: f32,
    /// Normalized hostile pressure in [0, 1]
    pub threat: f32,
}

/// When and how many ships a faction may request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpawnPolicy {
    pub max_ships: usize,
    pub interval_ticks: Tick,
    pub last_spawn_tick: Tick,
}

/// A named group of agents with shared disposition, territory, and tactics
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Faction {
    pub id: FactionId,
    pub name: String,
    pub archetype: FactionArchetype,
    pub state: FactionBehaviorState,
    /// Prior states, oldest first, capped by the driver
    history: VecDeque<FactionBehaviorState>,
    relationships: AHashMap<FactionId, f32>,
    pub territory: Territory,
    pub tactics: TacticalPlan,
    pub spawn: SpawnPolicy,
    /// Fleet strength as of the last completed tick
    pub fleet_strength: f32,
    /// Hostile count observed last tick, for contact-loss triggers
    last_hostile_count: u32,
    pub active: bool,
}

impl Faction {
    pub fn new(
        id: FactionId,
        name: impl Into<String>,
        archetype: FactionArchetype,
        territory: Territory,
        config: &ArchetypeConfig,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            archetype,
            state: archetype.initial_state(),
            history: VecDeque::new(),
            relationships: AHashMap::new(),
            territory,
            tactics: TacticalPlan::for_state(archetype.initial_state(), config),
            spawn: SpawnPolicy {
                max_ships: config.max_ships,
                interval_ticks: config.spawn_interval_ticks,
                last_spawn_tick: 0,
            },
            fleet_strength: 0.0,
            last_hostile_count: 0,
            active: true,
        }
    }

    /// Record the state being left, dropping the oldest entry past `cap`
    pub fn record_history(&mut self, state: FactionBehaviorState, cap: usize) {
        if self.history.len() >= cap {
            self.history.pop_front();
        }
        self.history.push_back(state);
    }

    /// Prior states, oldest first
    pub fn history(&self) -> impl Iterator<Item = FactionBehaviorState> + '_ {
        self.history.iter().copied()
    }

    pub fn history_len(&self) -> usize {
        self.history.len()
    }

    /// Current relationship toward another faction, neutral if unknown
    pub fn relationship(&self, other: FactionId) -> f32 {
        self.relationships.get(&other).copied().unwrap_or(0.0)
    }

    pub fn relationships(&self) -> impl Iterator<Item = (FactionId, f32)> + '_ {
        self.relationships.iter().map(|(&id, &v)| (id, v))
    }

    /// Shift a relationship by `delta`, clamped to [-1, 1]; returns (old, new)
    pub fn adjust_relationship(&mut self, other: FactionId, delta: f32) -> (f32, f32) {
        let old = self.relationship(other);
        let new = clamp_relationship(old + delta);
        self.relationships.insert(other, new);
        (old, new)
    }

    /// Overwrite a relationship, clamped to [-1, 1]; returns (old, new)
    pub fn set_relationship(&mut self, other: FactionId, value: f32) -> (f32, f32) {
        let old = self.relationship(other);
        let new = clamp_relationship(value);
        self.relationships.insert(other, new);
        (old, new)
    }

    /// Update the territory resource stock, clamped to [0, 1]; returns (old, new)
    pub fn set_resources(&mut self, value: f32) -> (f32, f32) {
        let old = self.territory.resources;
        let new = clamp_unit(value);
        self.territory.resources = new;
        (old, new)
    }

    /// Update the territory threat level, clamped to [0, 1]; returns (old, new)
    pub fn set_threat(&mut self, threat: f32) -> (f32, f32) {
        let old = self.territory.threat;
        let new = clamp_unit(threat);
        self.territory.threat = new;
        (old, new)
    }

    pub fn last_hostile_count(&self) -> u32 {
        self.last_hostile_count
    }

    pub fn set_last_hostile_count(&mut self, count: u32) {
        self.last_hostile_count = count;
    }

    /// Is `other` hostile from this faction's point of view?
    pub fn is_hostile_toward(&self, other: FactionId, config: &ArchetypeConfig) -> bool {
        if other == self.id {
            return false;
        }
        match config.special_rule {
            SpecialRule::AlwaysHostile => true,
            _ => self.relationship(other) < 0.0,
        }
    }

    pub fn territory_observation(&self) -> TerritoryObservation {
        TerritoryObservation {
            faction: self.id,
            center: self.territory.center,
            radius: self.territory.radius,
            resources: self.territory.resources,
            threat: self.territory.threat,
        }
    }
}
