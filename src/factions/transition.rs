//! Transition table and the state machine driver
//!
//! Tables are immutable per archetype. A lookup miss is a safe no-op, not
//! an error: trigger sets are computed independently of the current state
//! and routinely contain events irrelevant to it.

use ahash::AHashMap;

use crate::factions::faction::Faction;
use crate::factions::state::FactionBehaviorState;
use crate::factions::trigger::{sort_triggers, Trigger};

/// Immutable (state, trigger) -> state mapping for one archetype
#[derive(Debug, Clone, Default)]
pub struct TransitionTable {
    entries: AHashMap<(FactionBehaviorState, Trigger), FactionBehaviorState>,
}

impl TransitionTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(
        mut self,
        from: FactionBehaviorState,
        on: Trigger,
        to: FactionBehaviorState,
    ) -> Self {
        self.entries.insert((from, on), to);
        self
    }

    /// Next state for (state, trigger), or None for an unmapped pair
    pub fn next(&self, state: FactionBehaviorState, trigger: Trigger) -> Option<FactionBehaviorState> {
        self.entries.get(&(state, trigger)).copied()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Apply this tick's triggers to the faction's evolving state
///
/// Triggers are applied in their declared priority order, each against the
/// state produced by the previous one. Every applied transition records the
/// departed state in the faction's bounded history. Unmapped pairs leave
/// the state unchanged. No side effects beyond state and history.
pub fn advance(
    faction: &mut Faction,
    table: &TransitionTable,
    triggers: &[Trigger],
    history_cap: usize,
) -> FactionBehaviorState {
    let mut ordered = triggers.to_vec();
    sort_triggers(&mut ordered);

    for trigger in ordered {
        match table.next(faction.state, trigger) {
            Some(next) if next != faction.state => {
                tracing::debug!(
                    faction = %faction.name,
                    from = %faction.state,
                    to = %next,
                    ?trigger,
                    "faction transition"
                );
                faction.record_history(faction.state, history_cap);
                faction.state = next;
            }
            Some(_) => {}
            None => {
                tracing::trace!(
                    faction = %faction.name,
                    state = %faction.state,
                    ?trigger,
                    "unmapped trigger ignored"
                );
            }
        }
    }

    faction.state
}
