//! Behavior tree assembly, validation, and the per-archetype registry
//!
//! Trees are immutable once registered and shared read-only across every
//! ship of an archetype. Registration rejects trees where a node is
//! reachable from itself or a composite references an unknown node.

use std::sync::Arc;

use ahash::AHashMap;

use crate::core::error::{EngineError, Result};
use crate::core::types::NodeId;
use crate::behavior::node::{
    AbilityKind, ActionKind, BehaviorNode, BehaviorNodeKind, ConditionKind,
};
use crate::factions::archetype::FactionArchetype;
use crate::factions::config::{ArchetypeConfig, ConfigRegistry};
use crate::factions::state::FactionBehaviorState;

/// An immutable, validated behavior tree
#[derive(Debug, Clone)]
pub struct BehaviorTree {
    nodes: Vec<BehaviorNode>,
    root: NodeId,
}

impl BehaviorTree {
    /// Assemble a tree from raw parts, validating structure
    pub fn from_parts(nodes: Vec<BehaviorNode>, root: NodeId) -> Result<Self> {
        let tree = Self { nodes, root };
        tree.validate()?;
        Ok(tree)
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn node(&self, id: NodeId) -> Option<&BehaviorNode> {
        self.nodes.get(id.index())
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Reject unknown child references and cycles
    ///
    /// Iterative DFS with a three-color marking: a gray node seen again is
    /// on the current path, i.e. reachable from itself.
    fn validate(&self) -> Result<()> {
        if self.node(self.root).is_none() {
            return Err(EngineError::UnknownNode(self.root));
        }

        #[derive(Clone, Copy, PartialEq)]
        enum Mark {
            White,
            Gray,
            Black,
        }

        let mut marks = vec![Mark::White; self.nodes.len()];
        let mut stack: Vec<(NodeId, bool)> = vec![(self.root, false)];

        while let Some((id, children_done)) = stack.pop() {
            let idx = id.index();
            if children_done {
                marks[idx] = Mark::Black;
                continue;
            }
            match marks[idx] {
                Mark::Gray => return Err(EngineError::CyclicBehaviorTree(id)),
                Mark::Black => continue,
                Mark::White => {}
            }
            marks[idx] = Mark::Gray;
            stack.push((id, true));

            let node = self.node(id).ok_or(EngineError::UnknownNode(id))?;
            if let BehaviorNodeKind::Sequence(children) | BehaviorNodeKind::Selector(children) =
                &node.kind
            {
                for &child in children {
                    if self.node(child).is_none() {
                        return Err(EngineError::UnknownNode(child));
                    }
                    match marks[child.index()] {
                        Mark::Gray => return Err(EngineError::CyclicBehaviorTree(child)),
                        Mark::Black => {}
                        Mark::White => stack.push((child, false)),
                    }
                }
            }
        }

        Ok(())
    }
}

/// Incremental tree builder; children must exist before their parent
#[derive(Debug, Default)]
pub struct TreeBuilder {
    nodes: Vec<BehaviorNode>,
}

impl TreeBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    fn push(&mut self, name: &'static str, kind: BehaviorNodeKind) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(BehaviorNode { id, name, kind });
        id
    }

    pub fn condition(&mut self, name: &'static str, kind: ConditionKind) -> NodeId {
        self.push(name, BehaviorNodeKind::Condition(kind))
    }

    pub fn action(&mut self, name: &'static str, kind: ActionKind) -> NodeId {
        self.push(name, BehaviorNodeKind::Action(kind))
    }

    pub fn sequence(&mut self, name: &'static str, children: Vec<NodeId>) -> NodeId {
        self.push(name, BehaviorNodeKind::Sequence(children))
    }

    pub fn selector(&mut self, name: &'static str, children: Vec<NodeId>) -> NodeId {
        self.push(name, BehaviorNodeKind::Selector(children))
    }

    pub fn build(self, root: NodeId) -> Result<BehaviorTree> {
        BehaviorTree::from_parts(self.nodes, root)
    }
}

/// Immutable per-archetype tree registry
#[derive(Debug, Clone, Default)]
pub struct BehaviorTreeRegistry {
    trees: AHashMap<FactionArchetype, Arc<BehaviorTree>>,
}

impl BehaviorTreeRegistry {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn register(&mut self, archetype: FactionArchetype, tree: BehaviorTree) {
        self.trees.insert(archetype, Arc::new(tree));
    }

    /// Tree for an archetype; missing entries are a fatal startup error
    pub fn tree_for(&self, archetype: FactionArchetype) -> Result<&Arc<BehaviorTree>> {
        self.trees
            .get(&archetype)
            .ok_or(EngineError::MissingBehaviorTree(archetype))
    }

    /// The standard trees for the three sprawl archetypes
    pub fn standard(configs: &ConfigRegistry) -> Result<Self> {
        let mut registry = Self::empty();
        for archetype in FactionArchetype::ALL {
            let config = configs.for_archetype(archetype)?;
            let tree = match archetype {
                FactionArchetype::SpaceRats => raider_tree(config)?,
                FactionArchetype::LostNova => phantom_tree(config)?,
                FactionArchetype::EquatorHorizon => enforcer_tree(config)?,
            };
            registry.register(archetype, tree);
        }
        Ok(registry)
    }
}

/// Space Rats: break off when hurt, otherwise strike or close in
fn raider_tree(config: &ArchetypeConfig) -> Result<BehaviorTree> {
    let mut b = TreeBuilder::new();

    let hurt = b.condition("hurt", ConditionKind::HealthBelow(config.retreat_threshold));
    let fall_back = b.action("fall-back", ActionKind::FallBack);
    let break_off = b.sequence("break-off", vec![hurt, fall_back]);

    let enemies = b.condition("enemies-nearby", ConditionKind::EnemiesNearby);
    let in_range = b.condition("in-range", ConditionKind::TargetInWeaponRange);
    let engage = b.action("engage", ActionKind::Engage);
    let strike = b.sequence("strike", vec![enemies, in_range, engage]);

    let enemies2 = b.condition("enemies-nearby", ConditionKind::EnemiesNearby);
    let pursue = b.action("pursue", ActionKind::Pursue);
    let close_in = b.sequence("close-in", vec![enemies2, pursue]);

    let regroup = b.action("regroup", ActionKind::Regroup);

    let root = b.selector("space-rats", vec![break_off, strike, close_in, regroup]);
    b.build(root)
}

/// Lost Nova: cloak and vanish when hurt, strike hardest from ambush
fn phantom_tree(config: &ArchetypeConfig) -> Result<BehaviorTree> {
    let mut b = TreeBuilder::new();

    let hurt = b.condition("hurt", ConditionKind::HealthBelow(config.retreat_threshold));
    let cloak_ready = b.condition("cloak-ready", ConditionKind::CooldownReady(AbilityKind::Cloak));
    let cloak = b.action("cloak", ActionKind::ActivateAbility(AbilityKind::Cloak));
    let fall_back = b.action("fall-back", ActionKind::FallBack);
    let vanish = b.sequence("vanish", vec![hurt, cloak_ready, cloak, fall_back]);

    let hurt2 = b.condition("hurt", ConditionKind::HealthBelow(config.retreat_threshold));
    let bolt_back = b.action("fall-back", ActionKind::FallBack);
    let bolt = b.sequence("bolt", vec![hurt2, bolt_back]);

    let ambushing = b.condition(
        "ambushing",
        ConditionKind::StateIs(FactionBehaviorState::Ambushing),
    );
    let enemies = b.condition("enemies-nearby", ConditionKind::EnemiesNearby);
    let engage = b.action("engage", ActionKind::Engage);
    let spring = b.sequence("spring-ambush", vec![ambushing, enemies, engage]);

    let enemies2 = b.condition("enemies-nearby", ConditionKind::EnemiesNearby);
    let in_range = b.condition("in-range", ConditionKind::TargetInWeaponRange);
    let engage2 = b.action("engage", ActionKind::Engage);
    let strike = b.sequence("strike", vec![enemies2, in_range, engage2]);

    let regroup = b.action("regroup", ActionKind::Regroup);

    let root = b.selector("lost-nova", vec![vanish, bolt, spring, strike, regroup]);
    b.build(root)
}

/// Equator Horizon: shield up under fire, pursue while enforcing
fn enforcer_tree(config: &ArchetypeConfig) -> Result<BehaviorTree> {
    let mut b = TreeBuilder::new();

    let hurt = b.condition("hurt", ConditionKind::HealthBelow(config.retreat_threshold));
    let shield_ready = b.condition(
        "shield-ready",
        ConditionKind::CooldownReady(AbilityKind::ShieldBoost),
    );
    let shield = b.action("shield-boost", ActionKind::ActivateAbility(AbilityKind::ShieldBoost));
    let shield_up = b.sequence("shield-up", vec![hurt, shield_ready, shield]);

    let enforcing = b.condition(
        "enforcing",
        ConditionKind::StateIs(FactionBehaviorState::Enforcing),
    );
    let enemies = b.condition("enemies-nearby", ConditionKind::EnemiesNearby);
    let pursue = b.action("pursue", ActionKind::Pursue);
    let enforce = b.sequence("enforce", vec![enforcing, enemies, pursue]);

    let enemies2 = b.condition("enemies-nearby", ConditionKind::EnemiesNearby);
    let in_range = b.condition("in-range", ConditionKind::TargetInWeaponRange);
    let engage = b.action("engage", ActionKind::Engage);
    let strike = b.sequence("strike", vec![enemies2, in_range, engage]);

    let regroup = b.action("regroup", ActionKind::Regroup);

    let root = b.selector("equator-horizon", vec![shield_up, enforce, strike, regroup]);
    b.build(root)
}
