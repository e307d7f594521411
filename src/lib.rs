//! Galaxy Sprawl - Faction Decision Engine
//!
//! Per-faction finite state machines decide strategic posture; per-ship
//! behavior trees turn that posture into tactical commands. The engine is
//! a pure decision layer: it observes a consistent snapshot each tick and
//! emits commands and events for external systems to apply.

pub mod behavior;
pub mod core;
pub mod events;
pub mod factions;
pub mod ships;
pub mod simulation;
pub mod world;
