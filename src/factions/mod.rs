//! Faction-level decision making: the per-faction state machine and its inputs

pub mod archetype;
pub mod config;
pub mod faction;
pub mod state;
pub mod tactics;
pub mod transition;
pub mod trigger;

pub use archetype::FactionArchetype;
pub use config::{ArchetypeConfig, ConfigRegistry, SpecialRule};
pub use faction::{Faction, SpawnPolicy, Territory};
pub use state::FactionBehaviorState;
pub use tactics::{CombatTactics, Formation, TacticalPlan};
pub use transition::{advance, TransitionTable};
pub use trigger::{evaluate_triggers, is_ambush_opportunity, Trigger};
