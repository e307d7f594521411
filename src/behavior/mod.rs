//! Per-ship decision making
//!
//! Each faction archetype carries one immutable behavior tree shared by all
//! of its ships. Trees are validated acyclic structures of sequences,
//! selectors, conditions, and actions; evaluation is synchronous and
//! deterministic given a context.

pub mod context;
pub mod evaluate;
pub mod node;
pub mod tree;

pub use context::{build_context, AgentSnapshot, BehaviorContext};
pub use evaluate::evaluate;
pub use node::{AbilityKind, ActionKind, BehaviorNode, BehaviorNodeKind, ConditionKind};
pub use tree::{BehaviorTree, BehaviorTreeRegistry, TreeBuilder};
