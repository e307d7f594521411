//! Tick scheduler: orchestrates one decision cycle across all factions
//!
//! Each tick runs two phases per faction. Phase one is read-only: trigger
//! derivation and per-ship context building, both against the snapshot
//! captured at tick start. Phase two mutates: the FSM advances, tactics
//! and strength are refreshed, behavior trees run, and the spawn policy
//! is consulted. Any phase-one failure skips the faction for the whole
//! tick, so a faction is never left half-updated.
//!
//! Factions are processed in ascending id order and ships in insertion
//! order, so identical inputs and seed produce identical command streams.
//!
//! Uses rayon for context building and tree evaluation on large fleets.

use std::sync::Arc;

use ahash::AHashSet;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;
use serde::Serialize;

use crate::behavior::context::{build_context, BehaviorContext};
use crate::behavior::evaluate::evaluate;
use crate::behavior::tree::{BehaviorTree, BehaviorTreeRegistry};
use crate::core::config::EngineConfig;
use crate::core::error::{EngineError, Result};
use crate::core::types::{FactionId, ShipId, Tick};
use crate::events::{EngineEvent, EventLog};
use crate::factions::archetype::FactionArchetype;
use crate::factions::config::ConfigRegistry;
use crate::factions::faction::Faction;
use crate::factions::state::FactionBehaviorState;
use crate::factions::tactics::{CombatTactics, TacticalPlan};
use crate::factions::transition::{advance, TransitionTable};
use crate::factions::trigger::evaluate_triggers;
use crate::ships::Ship;
use crate::simulation::spawn::{build_ship, should_spawn_ship, spawn_position};
use crate::world::services::{Command, CommandQueue};
use crate::world::snapshot::WorldSnapshot;
use crate::world::spatial::{GridSpatialIndex, SpatialQuery};

/// Cell size for the per-tick spatial index, in world units
const SPATIAL_CELL_SIZE: f32 = 50.0;

/// Everything one tick produced, in emission order
#[derive(Debug)]
pub struct TickReport {
    pub tick: Tick,
    pub events: Vec<EngineEvent>,
    pub commands: Vec<Command>,
    /// Factions whose tick was skipped because a collaborator failed
    pub skipped: Vec<FactionId>,
}

/// Read-only per-faction view for the telemetry stream
#[derive(Debug, Clone, Serialize)]
pub struct FactionTelemetry {
    pub id: FactionId,
    pub name: String,
    pub archetype: FactionArchetype,
    pub state: FactionBehaviorState,
    pub combat: CombatTactics,
    pub fleet_strength: f32,
    pub threat: f32,
    pub ship_count: usize,
}

/// Point-in-time view of the whole engine, cheap enough for a faster
/// cadence than the tick itself
#[derive(Debug, Clone, Serialize)]
pub struct TelemetryFrame {
    pub tick: Tick,
    pub ship_count: usize,
    pub events_recorded: usize,
    pub factions: Vec<FactionTelemetry>,
}

/// Phase-one output for one faction: all fallible reads, no mutation yet
struct FactionInputs {
    triggers: Vec<crate::factions::trigger::Trigger>,
    hostile_count: usize,
    contexts: Vec<(usize, BehaviorContext)>,
    tree: Arc<BehaviorTree>,
}

/// Owns the world's decision state and drives it tick by tick
pub struct Scheduler {
    config: EngineConfig,
    configs: ConfigRegistry,
    trees: BehaviorTreeRegistry,
    tables: ahash::AHashMap<FactionArchetype, TransitionTable>,
    factions: Vec<Faction>,
    ships: Vec<Ship>,
    current_tick: Tick,
    rng: ChaCha8Rng,
    log: EventLog,
    queue: CommandQueue,
}

impl Scheduler {
    pub fn new(
        config: EngineConfig,
        configs: ConfigRegistry,
        trees: BehaviorTreeRegistry,
        seed: u64,
    ) -> Result<Self> {
        config.validate().map_err(EngineError::InvalidEngineConfig)?;
        configs.validate()?;

        let tables = FactionArchetype::ALL
            .into_iter()
            .map(|a| (a, a.transition_table()))
            .collect();

        Ok(Self {
            config,
            configs,
            trees,
            tables,
            factions: Vec::new(),
            ships: Vec::new(),
            current_tick: 0,
            rng: ChaCha8Rng::seed_from_u64(seed),
            log: EventLog::new(),
            queue: CommandQueue::new(),
        })
    }

    /// Default config, standard archetype tuning, standard trees
    pub fn standard(seed: u64) -> Result<Self> {
        let configs = ConfigRegistry::standard();
        let trees = BehaviorTreeRegistry::standard(&configs)?;
        Self::new(EngineConfig::default(), configs, trees, seed)
    }

    /// Register a faction; its archetype must have a config and a tree
    pub fn add_faction(&mut self, faction: Faction) -> Result<()> {
        self.configs.for_archetype(faction.archetype)?;
        self.trees.tree_for(faction.archetype)?;
        self.factions.push(faction);
        Ok(())
    }

    pub fn add_ship(&mut self, ship: Ship) {
        self.ships.push(ship);
    }

    pub fn current_tick(&self) -> Tick {
        self.current_tick
    }

    pub fn faction(&self, id: FactionId) -> Option<&Faction> {
        self.factions.iter().find(|f| f.id == id)
    }

    pub fn factions(&self) -> &[Faction] {
        &self.factions
    }

    pub fn ships(&self) -> &[Ship] {
        &self.ships
    }

    pub fn ship(&self, id: ShipId) -> Option<&Ship> {
        self.ships.iter().find(|s| s.id == id)
    }

    /// Mutable access for the external combat layer, which applies
    /// movement and damage between ticks
    pub fn ships_mut(&mut self) -> &mut [Ship] {
        &mut self.ships
    }

    pub fn event_log(&self) -> &EventLog {
        &self.log
    }

    /// Hand the accumulated commands to the external combat layer
    pub fn drain_commands(&mut self) -> Vec<Command> {
        self.queue.drain()
    }

    /// Shift one faction's relationship toward another, clamped to [-1, 1]
    ///
    /// External systems (diplomacy, combat outcomes) apply relationship
    /// changes through here so the notification lands in the event log.
    /// Returns `None` for an unknown faction.
    pub fn adjust_relationship(
        &mut self,
        faction: FactionId,
        toward: FactionId,
        delta: f32,
    ) -> Option<(f32, f32)> {
        let tick = self.current_tick;
        let entry = self.factions.iter_mut().find(|f| f.id == faction)?;
        let (old, new) = entry.adjust_relationship(toward, delta);
        if (new - old).abs() > f32::EPSILON {
            self.log.push(
                tick,
                EngineEvent::RelationshipChanged { faction, toward, old, new },
            );
        }
        Some((old, new))
    }

    /// Overwrite one faction's relationship toward another, clamped to [-1, 1]
    pub fn set_relationship(
        &mut self,
        faction: FactionId,
        toward: FactionId,
        value: f32,
    ) -> Option<(f32, f32)> {
        let tick = self.current_tick;
        let entry = self.factions.iter_mut().find(|f| f.id == faction)?;
        let (old, new) = entry.set_relationship(toward, value);
        if (new - old).abs() > f32::EPSILON {
            self.log.push(
                tick,
                EngineEvent::RelationshipChanged { faction, toward, old, new },
            );
        }
        Some((old, new))
    }

    /// Overwrite a faction's territory resource stock, clamped to [0, 1]
    pub fn set_resources(&mut self, faction: FactionId, value: f32) -> Option<(f32, f32)> {
        let tick = self.current_tick;
        let entry = self.factions.iter_mut().find(|f| f.id == faction)?;
        let (old, new) = entry.set_resources(value);
        if (new - old).abs() > f32::EPSILON {
            self.log
                .push(tick, EngineEvent::ResourcesUpdated { faction, old, new });
        }
        Some((old, new))
    }

    /// Advance one tick using the snapshot-backed grid index
    pub fn tick(&mut self) -> TickReport {
        self.current_tick += 1;
        let now = self.current_tick;
        let snapshot = self.capture_snapshot(now);
        let spatial = GridSpatialIndex::build(&snapshot, SPATIAL_CELL_SIZE);
        self.run_tick(now, &snapshot, &spatial)
    }

    /// Advance one tick against an injected spatial collaborator
    pub fn tick_with(&mut self, spatial: &dyn SpatialQuery) -> TickReport {
        self.current_tick += 1;
        let now = self.current_tick;
        let snapshot = self.capture_snapshot(now);
        self.run_tick(now, &snapshot, spatial)
    }

    /// Run `ticks` cycles back to back, returning every report
    pub fn run(&mut self, ticks: u64) -> Vec<TickReport> {
        (0..ticks).map(|_| self.tick()).collect()
    }

    /// Read-only frame for the telemetry cadence; never mutates state
    pub fn telemetry(&self) -> TelemetryFrame {
        TelemetryFrame {
            tick: self.current_tick,
            ship_count: self.ships.iter().filter(|s| s.is_active()).count(),
            events_recorded: self.log.len(),
            factions: self
                .factions
                .iter()
                .map(|f| FactionTelemetry {
                    id: f.id,
                    name: f.name.clone(),
                    archetype: f.archetype,
                    state: f.state,
                    combat: f.tactics.combat,
                    fleet_strength: f.fleet_strength,
                    threat: f.territory.threat,
                    ship_count: self
                        .ships
                        .iter()
                        .filter(|s| s.faction == f.id && s.is_active())
                        .count(),
                })
                .collect(),
        }
    }

    fn capture_snapshot(&self, now: Tick) -> WorldSnapshot {
        WorldSnapshot::capture(
            now,
            &self.ships,
            self.factions
                .iter()
                .filter(|f| f.active)
                .map(|f| f.territory_observation()),
        )
    }

    fn run_tick(
        &mut self,
        now: Tick,
        snapshot: &WorldSnapshot,
        spatial: &dyn SpatialQuery,
    ) -> TickReport {
        let mut events = Vec::new();
        let mut commands = Vec::new();
        let mut skipped = Vec::new();
        let mut pending: Vec<Ship> = Vec::new();

        let active_ids: AHashSet<ShipId> = snapshot.active_ships().map(|s| s.id).collect();

        let mut order: Vec<usize> = (0..self.factions.len())
            .filter(|&i| self.factions[i].active)
            .collect();
        order.sort_by_key(|&i| self.factions[i].id.0);

        for fi in order {
            // Phase one: fallible reads. Nothing below mutates until these
            // all succeed, so a failure leaves the faction untouched.
            let inputs = match self.gather_inputs(fi, now, snapshot, spatial) {
                Ok(inputs) => inputs,
                Err(err) => {
                    let faction = &self.factions[fi];
                    tracing::warn!(
                        faction = %faction.name,
                        error = %err,
                        "skipping faction tick"
                    );
                    events.push(EngineEvent::FactionTickSkipped { faction: faction.id });
                    skipped.push(faction.id);
                    continue;
                }
            };

            // Phase two: mutation
            let archetype = self.factions[fi].archetype;
            let Ok(config) = self.configs.for_archetype(archetype) else {
                continue;
            };
            let Some(table) = self.tables.get(&archetype) else {
                continue;
            };

            let faction = &mut self.factions[fi];
            let old_state = faction.state;
            let new_state = advance(faction, table, &inputs.triggers, self.config.history_cap);
            if new_state != old_state {
                events.push(EngineEvent::FactionBehaviorChanged {
                    faction: faction.id,
                    old: old_state,
                    new: new_state,
                });
            }

            let (old_threat, new_threat) =
                faction.set_threat(inputs.hostile_count as f32 / self.config.threat_divisor);
            if (new_threat - old_threat).abs() > f32::EPSILON {
                events.push(EngineEvent::TerritoryThreatChanged {
                    faction: faction.id,
                    old: old_threat,
                    new: new_threat,
                });
            }
            faction.set_last_hostile_count(inputs.hostile_count as u32);

            let new_strength = snapshot.fleet_strength(faction.id);
            if (new_strength - faction.fleet_strength).abs() > f32::EPSILON {
                events.push(EngineEvent::FleetStrengthUpdated {
                    faction: faction.id,
                    old: faction.fleet_strength,
                    new: new_strength,
                });
            }
            faction.fleet_strength = new_strength;

            let plan = TacticalPlan::derive(
                new_state,
                config,
                snapshot,
                faction.id,
                faction.territory.center,
            );
            if plan.combat != faction.tactics.combat {
                events.push(EngineEvent::CombatTacticsChanged {
                    faction: faction.id,
                    old: faction.tactics.combat,
                    new: plan.combat,
                });
            }
            faction.tactics = plan;

            // Contexts were built against the pre-transition state; trees
            // must see this tick's decisions.
            let state = faction.state;
            let formation = faction.tactics.formation;
            let tree = inputs.tree;
            let contexts = inputs.contexts;

            let parallel = contexts.len() >= self.config.parallel_threshold;
            let results: Vec<(usize, Vec<Command>, Vec<EngineEvent>, BehaviorContext)> = if parallel
            {
                contexts
                    .into_par_iter()
                    .map(|(si, mut ctx)| {
                        ctx.state = state;
                        ctx.formation = formation;
                        let mut cmds = Vec::new();
                        let mut evs = Vec::new();
                        evaluate(&tree, &mut ctx, &mut cmds, &mut evs);
                        (si, cmds, evs, ctx)
                    })
                    .collect()
            } else {
                contexts
                    .into_iter()
                    .map(|(si, mut ctx)| {
                        ctx.state = state;
                        ctx.formation = formation;
                        let mut cmds = Vec::new();
                        let mut evs = Vec::new();
                        evaluate(&tree, &mut ctx, &mut cmds, &mut evs);
                        (si, cmds, evs, ctx)
                    })
                    .collect()
            };

            for (si, cmds, evs, ctx) in results {
                let ship = &mut self.ships[si];
                if let Some(target) = ship.target {
                    if !active_ids.contains(&target) {
                        ship.target = None;
                    }
                }
                for cmd in &cmds {
                    if let Command::Engage { target, .. } = cmd {
                        ship.target = Some(*target);
                    }
                }
                ship.cooldowns = ctx.cooldowns;
                ship.cooldowns.prune(now);
                ship.tags = ctx.tags;
                commands.extend(cmds);
                events.extend(evs);
            }

            // Spawn decision, counted against ships already requested this
            // tick so the cap holds within a single cycle.
            let faction = &mut self.factions[fi];
            let total = snapshot.ships_of(faction.id).count()
                + pending.iter().filter(|s| s.faction == faction.id).count();
            if should_spawn_ship(faction, total, now, config, &mut self.rng) {
                let position = spawn_position(faction, &self.config, &mut self.rng);
                let ship = build_ship(faction, total + 1, position);
                faction.spawn.last_spawn_tick = now;
                tracing::debug!(
                    faction = %faction.name,
                    ship = %ship.name,
                    "spawn requested"
                );
                events.push(EngineEvent::ShipSpawnRequested {
                    faction: faction.id,
                    ship: ship.id,
                });
                pending.push(ship);
            }
        }

        self.ships.extend(pending);
        self.log.record(now, events.iter().cloned());
        self.queue.extend(commands.iter().cloned());

        TickReport {
            tick: now,
            events,
            commands,
            skipped,
        }
    }

    fn gather_inputs(
        &self,
        fi: usize,
        now: Tick,
        snapshot: &WorldSnapshot,
        spatial: &dyn SpatialQuery,
    ) -> Result<FactionInputs> {
        let faction = &self.factions[fi];
        let config = self.configs.for_archetype(faction.archetype)?;
        let tree = Arc::clone(self.trees.tree_for(faction.archetype)?);

        let territory = faction.territory_observation();
        let triggers = evaluate_triggers(
            faction,
            &territory,
            snapshot,
            spatial,
            config,
            &self.config,
        )?;

        // Hostile pressure from the snapshot itself, for the threat update
        let hostile_count = snapshot
            .active_ships()
            .filter(|s| {
                s.faction != faction.id
                    && faction.is_hostile_toward(s.faction, config)
                    && s.position.distance(&territory.center) <= territory.radius
            })
            .count();

        let ship_indices: Vec<usize> = self
            .ships
            .iter()
            .enumerate()
            .filter(|(_, s)| s.faction == faction.id && s.is_active())
            .map(|(i, _)| i)
            .collect();

        let contexts: Result<Vec<(usize, BehaviorContext)>> =
            if ship_indices.len() >= self.config.parallel_threshold {
                ship_indices
                    .par_iter()
                    .map(|&si| {
                        let ship = &self.ships[si];
                        build_context(
                            ship,
                            faction,
                            spatial,
                            config,
                            &self.config,
                            now,
                            ship.cooldowns.clone(),
                        )
                        .map(|ctx| (si, ctx))
                    })
                    .collect()
            } else {
                ship_indices
                    .iter()
                    .map(|&si| {
                        let ship = &self.ships[si];
                        build_context(
                            ship,
                            faction,
                            spatial,
                            config,
                            &self.config,
                            now,
                            ship.cooldowns.clone(),
                        )
                        .map(|ctx| (si, ctx))
                    })
                    .collect()
            };

        Ok(FactionInputs {
            triggers,
            hostile_count,
            contexts: contexts?,
            tree,
        })
    }
}
