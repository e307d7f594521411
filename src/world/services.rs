//! Combat command boundary
//!
//! The engine never applies movement or damage itself. Tactical decisions
//! become `Command` values queued into a single ordered sink; the external
//! combat layer applies them before the next snapshot is captured.

use serde::{Deserialize, Serialize};

use crate::core::types::{ShipId, Vec2};

/// A tactical order emitted by behavior tree evaluation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Command {
    Engage { ship: ShipId, target: ShipId },
    MoveTo { ship: ShipId, destination: Vec2 },
}

impl Command {
    pub fn ship(&self) -> ShipId {
        match self {
            Command::Engage { ship, .. } => *ship,
            Command::MoveTo { ship, .. } => *ship,
        }
    }
}

/// Single ordered sink for commands issued during a tick
///
/// Commands are appended per faction in faction declaration order, so two
/// factions targeting the same ship never interleave within a tick.
#[derive(Debug, Default)]
pub struct CommandQueue {
    commands: Vec<Command>,
}

impl CommandQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, command: Command) {
        self.commands.push(command);
    }

    pub fn extend(&mut self, commands: impl IntoIterator<Item = Command>) {
        self.commands.extend(commands);
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    pub fn drain(&mut self) -> Vec<Command> {
        std::mem::take(&mut self.commands)
    }

    pub fn commands(&self) -> &[Command] {
        &self.commands
    }
}
