//! Engine notifications
//!
//! Fire-and-forget events for telemetry, UI, and other subsystems. Ordering
//! is guaranteed within a faction's tick but not across factions.

use serde::{Deserialize, Serialize};

use crate::core::types::{FactionId, NodeId, ShipId, Tick};
use crate::factions::state::FactionBehaviorState;
use crate::factions::tactics::CombatTactics;

/// One notification emitted during a tick
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum EngineEvent {
    /// A behavior action node began executing its effect
    BehaviorActionStarted {
        ship: ShipId,
        action: String,
    },
    /// A behavior node finished evaluating
    BehaviorNodeExecuted {
        node: NodeId,
        ship: ShipId,
        success: bool,
    },
    /// The faction FSM adopted a new state
    FactionBehaviorChanged {
        faction: FactionId,
        old: FactionBehaviorState,
        new: FactionBehaviorState,
    },
    FleetStrengthUpdated {
        faction: FactionId,
        old: f32,
        new: f32,
    },
    TerritoryThreatChanged {
        faction: FactionId,
        old: f32,
        new: f32,
    },
    RelationshipChanged {
        faction: FactionId,
        toward: FactionId,
        old: f32,
        new: f32,
    },
    ResourcesUpdated {
        faction: FactionId,
        old: f32,
        new: f32,
    },
    CombatTacticsChanged {
        faction: FactionId,
        old: CombatTactics,
        new: CombatTactics,
    },
    /// The faction's spawn policy requested a new ship
    ShipSpawnRequested {
        faction: FactionId,
        ship: ShipId,
    },
    /// The faction's tick was skipped (collaborator unavailable)
    FactionTickSkipped {
        faction: FactionId,
    },
}

/// Accumulated event history across ticks, for inspection and summaries
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EventLog {
    entries: Vec<(Tick, EngineEvent)>,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, tick: Tick, events: impl IntoIterator<Item = EngineEvent>) {
        self.entries.extend(events.into_iter().map(|e| (tick, e)));
    }

    /// Record a single event
    pub fn push(&mut self, tick: Tick, event: EngineEvent) {
        self.entries.push((tick, event));
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn events_for_tick(&self, tick: Tick) -> impl Iterator<Item = &EngineEvent> {
        self.entries
            .iter()
            .filter(move |(t, _)| *t == tick)
            .map(|(_, e)| e)
    }

    pub fn events_for_faction(&self, faction: FactionId) -> impl Iterator<Item = &EngineEvent> {
        self.entries
            .iter()
            .map(|(_, e)| e)
            .filter(move |e| e.faction() == Some(faction))
    }
}

impl EngineEvent {
    /// The faction this event concerns, if any
    pub fn faction(&self) -> Option<FactionId> {
        match self {
            EngineEvent::BehaviorActionStarted { .. }
            | EngineEvent::BehaviorNodeExecuted { .. } => None,
            EngineEvent::FactionBehaviorChanged { faction, .. }
            | EngineEvent::FleetStrengthUpdated { faction, .. }
            | EngineEvent::TerritoryThreatChanged { faction, .. }
            | EngineEvent::RelationshipChanged { faction, .. }
            | EngineEvent::ResourcesUpdated { faction, .. }
            | EngineEvent::CombatTacticsChanged { faction, .. }
            | EngineEvent::ShipSpawnRequested { faction, .. }
            | EngineEvent::FactionTickSkipped { faction } => Some(*faction),
        }
    }
}
