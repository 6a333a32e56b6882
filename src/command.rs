//! Operator intents.
//!
//! The input layer turns clicks and key presses into [`Command`]s and pushes them onto a
//! [`CommandQueue`]; the engine drains the queue between ticks, so a command never lands in the
//! middle of a step.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use crate::disaster::DisasterOutcome;
use crate::faction::Faction;
use crate::population::AgentId;
use crate::terrain::Cell;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Command {
    Spawn { faction: Faction, x: i32, y: i32 },
    PlaceFood { x: i32, y: i32 },
    Meteor { x: i32, y: i32 },
    Lightning { x: i32, y: i32 },
    SetPaused { paused: bool },
    TogglePause,
    SetParameter { name: String, value: f64 },
}

impl Command {
    /// Target cell of map-directed commands.
    pub fn cell(&self) -> Option<Cell> {
        match self {
            Command::Spawn { x, y, .. }
            | Command::PlaceFood { x, y }
            | Command::Meteor { x, y }
            | Command::Lightning { x, y } => Some(Cell::new(*x, *y)),
            Command::SetPaused { .. } | Command::TogglePause | Command::SetParameter { .. } => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum CommandOutcome {
    Spawned(AgentId),
    FoodPlaced,
    Disaster(DisasterOutcome),
    Paused(bool),
    ParameterChanged { name: String, value: f64 },
    /// The command targeted a cell agents cannot stand on and was dropped.
    Ignored,
}

#[derive(Debug, Clone, Default)]
pub struct CommandQueue {
    pending: VecDeque<Command>,
}

impl CommandQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, command: Command) {
        self.pending.push_back(command);
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    pub fn drain(&mut self) -> impl Iterator<Item = Command> + '_ {
        self.pending.drain(..)
    }
}
