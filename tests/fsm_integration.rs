//! End-to-end coverage of the faction state machine: the full Space Rats
//! raid cycle driven through the scheduler, plus property checks on the
//! driver itself.

use proptest::prelude::*;

use galaxy_sprawl::core::types::{FactionId, ShipId, Vec2};
use galaxy_sprawl::factions::archetype::FactionArchetype;
use galaxy_sprawl::factions::config::ConfigRegistry;
use galaxy_sprawl::factions::faction::{Faction, Territory};
use galaxy_sprawl::factions::state::FactionBehaviorState;
use galaxy_sprawl::factions::transition::{advance, TransitionTable};
use galaxy_sprawl::factions::trigger::Trigger;
use galaxy_sprawl::ships::{CombatStats, CooldownMap, Ship, ShipStatus, Weapon};
use galaxy_sprawl::simulation::Scheduler;

fn make_faction(id: u32, archetype: FactionArchetype, center: Vec2) -> Faction {
    let configs = ConfigRegistry::standard();
    let config = configs.for_archetype(archetype).unwrap();
    Faction::new(
        FactionId(id),
        format!("F{id}"),
        archetype,
        Territory {
            center,
            radius: 300.0,
            resources: 0.5,
            threat: 0.0,
        },
        config,
    )
}

fn make_ship(faction: u32, position: Vec2) -> Ship {
    Ship {
        id: ShipId::new(),
        name: "hull".to_string(),
        faction: FactionId(faction),
        position,
        velocity: Vec2::default(),
        stats: CombatStats {
            health: 100.0,
            max_health: 100.0,
            shield: 20.0,
            max_shield: 20.0,
            armor: 10.0,
            speed: 10.0,
            turn_rate: 1.0,
            accuracy: 0.8,
            evasion: 0.1,
            crit_chance: 0.0,
            crit_damage: 1.0,
            shield_penetration: 0.0,
            armor_penetration: 0.0,
        },
        weapons: vec![Weapon {
            name: "Cannon".to_string(),
            damage: 10.0,
            range: 120.0,
        }],
        ability_value: 0.0,
        stealth_capable: false,
        target: None,
        status: ShipStatus::Active,
        tags: ahash::AHashSet::new(),
        cooldowns: CooldownMap::new(),
    }
}

/// The full raid cycle through the scheduler: contact pulls a patrolling
/// faction into pursuit, range escalates to attack, sustained pressure
/// forces a retreat, and a cleared sky brings it home. The history must
/// read back the whole journey in order.
#[test]
fn space_rats_walk_the_full_raid_cycle() {
    let mut scheduler = Scheduler::standard(11).unwrap();
    let rats = make_faction(1, FactionArchetype::SpaceRats, Vec2::default());
    let rats_id = rats.id;
    scheduler.add_faction(rats).unwrap();
    scheduler
        .add_faction(make_faction(2, FactionArchetype::LostNova, Vec2::new(2_000.0, 0.0)))
        .unwrap();

    scheduler.add_ship(make_ship(1, Vec2::new(-50.0, 0.0)));
    // Eight intruders inside the rats' territory and preferred range:
    // enough to saturate threat past the heavy-damage threshold.
    for i in 0..8 {
        scheduler.add_ship(make_ship(2, Vec2::new(100.0, 10.0 * i as f32)));
    }

    // Tick 1: contact. Threat was still zero at capture, so only the
    // engagement triggers fire.
    scheduler.tick();
    let state = scheduler.faction(rats_id).unwrap().state;
    assert_eq!(state, FactionBehaviorState::Pursuing);

    // Tick 2: range closes the deal.
    scheduler.tick();
    assert_eq!(
        scheduler.faction(rats_id).unwrap().state,
        FactionBehaviorState::Attacking
    );

    // Tick 3: threat is now saturated from last tick's update, so
    // HeavyDamage outranks everything else.
    scheduler.tick();
    assert_eq!(
        scheduler.faction(rats_id).unwrap().state,
        FactionBehaviorState::Retreating
    );

    // Clear the sky; SafeDistance brings the raiders home.
    for ship in scheduler.ships_mut() {
        if ship.faction == FactionId(2) {
            ship.status = ShipStatus::Destroyed;
        }
    }
    scheduler.tick();
    assert_eq!(
        scheduler.faction(rats_id).unwrap().state,
        FactionBehaviorState::Patrolling
    );

    let history: Vec<_> = scheduler.faction(rats_id).unwrap().history().collect();
    assert_eq!(
        history,
        vec![
            FactionBehaviorState::Patrolling,
            FactionBehaviorState::Pursuing,
            FactionBehaviorState::Attacking,
            FactionBehaviorState::Retreating,
        ]
    );
}

/// Reinforcements turn a retreat back into an attack.
#[test]
fn retreating_faction_counterattacks_when_reinforced() {
    let mut faction = make_faction(1, FactionArchetype::SpaceRats, Vec2::default());
    faction.state = FactionBehaviorState::Retreating;

    let table = FactionArchetype::SpaceRats.transition_table();
    let state = advance(&mut faction, &table, &[Trigger::Reinforced], 32);
    assert_eq!(state, FactionBehaviorState::Attacking);
}

/// A skipped lookup leaves both state and history untouched, whatever the
/// trigger and whatever the current state.
#[test]
fn unmapped_triggers_are_always_noops() {
    let all_states = [
        FactionBehaviorState::Patrolling,
        FactionBehaviorState::Pursuing,
        FactionBehaviorState::Attacking,
        FactionBehaviorState::Retreating,
        FactionBehaviorState::Ambushing,
        FactionBehaviorState::Enforcing,
    ];
    let empty = TransitionTable::new();

    for state in all_states {
        let mut faction = make_faction(1, FactionArchetype::SpaceRats, Vec2::default());
        faction.state = state;
        let after = advance(
            &mut faction,
            &empty,
            &[Trigger::HeavyDamage, Trigger::DetectTarget, Trigger::NoTargets],
            32,
        );
        assert_eq!(after, state);
        assert_eq!(faction.history_len(), 0);
    }
}

fn arb_trigger() -> impl Strategy<Value = Trigger> {
    prop::sample::select(vec![
        Trigger::HeavyDamage,
        Trigger::PowerThresholdExceeded,
        Trigger::BalanceRestored,
        Trigger::Provoked,
        Trigger::AmbushOpportunity,
        Trigger::EngageRange,
        Trigger::DetectTarget,
        Trigger::TargetDestroyed,
        Trigger::TargetLost,
        Trigger::Reinforced,
        Trigger::SafeDistance,
        Trigger::NoTargets,
    ])
}

proptest! {
    /// However long the trigger stream, history never exceeds the cap and
    /// always holds the states actually departed, oldest first.
    #[test]
    fn history_stays_bounded_under_arbitrary_triggers(
        batches in prop::collection::vec(prop::collection::vec(arb_trigger(), 0..4), 0..200),
        cap in 1_usize..16,
    ) {
        let mut faction = make_faction(1, FactionArchetype::SpaceRats, Vec2::default());
        let table = FactionArchetype::SpaceRats.transition_table();

        for batch in &batches {
            advance(&mut faction, &table, batch, cap);
            prop_assert!(faction.history_len() <= cap);
        }
    }

    /// The driver is a pure function of (state, triggers): replaying the
    /// same stream from the same start always lands in the same state.
    #[test]
    fn advance_is_deterministic(
        batches in prop::collection::vec(prop::collection::vec(arb_trigger(), 0..4), 0..50),
    ) {
        let table = FactionArchetype::LostNova.transition_table();
        let run = || {
            let mut faction = make_faction(1, FactionArchetype::LostNova, Vec2::default());
            for batch in &batches {
                advance(&mut faction, &table, batch, 32);
            }
            faction.state
        };
        prop_assert_eq!(run(), run());
    }
}
