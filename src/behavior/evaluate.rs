//! Behavior tree evaluation
//!
//! Synchronous, depth-first, single-threaded per agent, with no suspension
//! points. Composites short-circuit per their semantics; every evaluated
//! node emits a node-executed notification. Actions can fail: an effect
//! whose precondition does not hold at invocation time returns false, and
//! that failure propagates through the composites.

use crate::behavior::context::BehaviorContext;
use crate::behavior::node::{ActionKind, BehaviorNodeKind, ConditionKind};
use crate::behavior::tree::BehaviorTree;
use crate::core::types::NodeId;
use crate::events::EngineEvent;
use crate::world::services::Command;

/// Walk the tree against the context; returns the root's result
pub fn evaluate(
    tree: &BehaviorTree,
    ctx: &mut BehaviorContext,
    commands: &mut Vec<Command>,
    events: &mut Vec<EngineEvent>,
) -> bool {
    eval_node(tree, tree.root(), ctx, commands, events)
}

fn eval_node(
    tree: &BehaviorTree,
    id: NodeId,
    ctx: &mut BehaviorContext,
    commands: &mut Vec<Command>,
    events: &mut Vec<EngineEvent>,
) -> bool {
    // Structure is validated at registration; a dangling id here would be
    // a registry bug, treated as a failing node rather than a panic.
    let Some(node) = tree.node(id) else {
        tracing::debug!(?id, "behavior node missing, treating as failure");
        return false;
    };

    let success = match &node.kind {
        BehaviorNodeKind::Sequence(children) => {
            let mut all = true;
            for &child in children {
                if !eval_node(tree, child, ctx, commands, events) {
                    all = false;
                    break;
                }
            }
            all
        }
        BehaviorNodeKind::Selector(children) => {
            let mut any = false;
            for &child in children {
                if eval_node(tree, child, ctx, commands, events) {
                    any = true;
                    break;
                }
            }
            any
        }
        BehaviorNodeKind::Condition(kind) => eval_condition(kind, ctx),
        BehaviorNodeKind::Action(kind) => run_action(*kind, ctx, commands, events),
    };

    events.push(EngineEvent::BehaviorNodeExecuted {
        node: id,
        ship: ctx.agent.id,
        success,
    });

    success
}

/// Conditions are pure: no context mutation, no commands, no side effects
fn eval_condition(kind: &ConditionKind, ctx: &BehaviorContext) -> bool {
    match kind {
        ConditionKind::HasTarget => ctx
            .agent
            .target
            .map(|t| ctx.enemies.iter().any(|e| e.id == t))
            .unwrap_or(false),
        ConditionKind::TargetInWeaponRange => ctx
            .engagement_target()
            .map(|t| t.position.distance(&ctx.agent.position) <= ctx.agent.weapon_range)
            .unwrap_or(false),
        ConditionKind::HealthBelow(threshold) => ctx.agent.health_fraction < *threshold,
        ConditionKind::HealthAbove(threshold) => ctx.agent.health_fraction > *threshold,
        ConditionKind::ThreatAbove(threshold) => ctx.threat_level > *threshold,
        ConditionKind::ThreatBelow(threshold) => ctx.threat_level < *threshold,
        ConditionKind::EnemiesNearby => !ctx.enemies.is_empty(),
        ConditionKind::AlliesOutnumberEnemies => ctx.allies.len() > ctx.enemies.len(),
        ConditionKind::CooldownReady(ability) => ctx.cooldowns.ready(ability.name(), ctx.now),
        ConditionKind::FormationIs(formation) => ctx.formation == *formation,
        ConditionKind::StateIs(state) => ctx.state == *state,
        ConditionKind::StealthCapable => ctx.agent.stealth_capable,
    }
}

/// Carry out an action's effect; false when its precondition fails
fn run_action(
    kind: ActionKind,
    ctx: &mut BehaviorContext,
    commands: &mut Vec<Command>,
    events: &mut Vec<EngineEvent>,
) -> bool {
    match kind {
        ActionKind::Engage => {
            let Some(target) = ctx.engagement_target() else {
                return false;
            };
            let target_id = target.id;
            events.push(EngineEvent::BehaviorActionStarted {
                ship: ctx.agent.id,
                action: kind.name().to_string(),
            });
            commands.push(Command::Engage {
                ship: ctx.agent.id,
                target: target_id,
            });
            true
        }
        ActionKind::Pursue => {
            let Some(target) = ctx.engagement_target() else {
                return false;
            };
            let destination = target.position;
            events.push(EngineEvent::BehaviorActionStarted {
                ship: ctx.agent.id,
                action: kind.name().to_string(),
            });
            commands.push(Command::MoveTo {
                ship: ctx.agent.id,
                destination,
            });
            true
        }
        ActionKind::FallBack => {
            // Away from the nearest enemy when one is visible, otherwise
            // straight home.
            let destination = match ctx.nearest_enemy() {
                Some(enemy) => {
                    let away = (ctx.agent.position - enemy.position).normalize();
                    ctx.agent.position + away * ctx.preferred_range
                }
                None => ctx.territory_center,
            };
            events.push(EngineEvent::BehaviorActionStarted {
                ship: ctx.agent.id,
                action: kind.name().to_string(),
            });
            commands.push(Command::MoveTo {
                ship: ctx.agent.id,
                destination,
            });
            true
        }
        ActionKind::Regroup => {
            events.push(EngineEvent::BehaviorActionStarted {
                ship: ctx.agent.id,
                action: kind.name().to_string(),
            });
            commands.push(Command::MoveTo {
                ship: ctx.agent.id,
                destination: ctx.territory_center,
            });
            true
        }
        ActionKind::ActivateAbility(ability) => {
            if !ctx.cooldowns.ready(ability.name(), ctx.now) {
                return false;
            }
            ctx.cooldowns
                .set(ability.name(), ctx.now + ability.cooldown_ticks());
            ctx.tags.insert(ability.effect_tag());
            events.push(EngineEvent::BehaviorActionStarted {
                ship: ctx.agent.id,
                action: kind.name().to_string(),
            });
            true
        }
    }
}
