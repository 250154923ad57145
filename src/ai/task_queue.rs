//! Mandatory build tasks drained before the conditional ladder runs

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use crate::core::error::AiError;

/// A mandatory build action
///
/// The discriminants are the persisted codes and must never be reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum TaskKind {
    BuildVillageRoads = 1,
    BuildVillageCentralSquare = 2,
    BuildLumberjack = 3,
}

impl TaskKind {
    pub fn code(self) -> u8 {
        self as u8
    }

    pub fn name(&self) -> &'static str {
        match self {
            TaskKind::BuildVillageRoads => "village roads",
            TaskKind::BuildVillageCentralSquare => "village main square",
            TaskKind::BuildLumberjack => "lumberjack",
        }
    }
}

impl TryFrom<u8> for TaskKind {
    type Error = AiError;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        match code {
            1 => Ok(TaskKind::BuildVillageRoads),
            2 => Ok(TaskKind::BuildVillageCentralSquare),
            3 => Ok(TaskKind::BuildLumberjack),
            other => Err(AiError::UnknownTaskKind(other)),
        }
    }
}

/// FIFO of pending tasks; a kind may appear more than once
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BuildTaskQueue {
    tasks: VecDeque<TaskKind>,
}

impl BuildTaskQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Startup backlog of a freshly founded settlement
    pub fn seeded() -> Self {
        let mut queue = Self::new();
        queue.push(TaskKind::BuildVillageRoads);
        queue.push(TaskKind::BuildLumberjack);
        queue.push(TaskKind::BuildLumberjack);
        queue.push(TaskKind::BuildVillageCentralSquare);
        queue
    }

    pub fn push(&mut self, task: TaskKind) {
        self.tasks.push_back(task);
    }

    pub fn pop_front(&mut self) -> Option<TaskKind> {
        self.tasks.pop_front()
    }

    pub fn front(&self) -> Option<TaskKind> {
        self.tasks.front().copied()
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = TaskKind> + '_ {
        self.tasks.iter().copied()
    }

    /// Persisted form, in queue order
    pub fn to_codes(&self) -> Vec<u8> {
        self.tasks.iter().map(|t| t.code()).collect()
    }

    /// Restore from persisted codes, rejecting unknown ones
    pub fn from_codes(codes: &[u8]) -> Result<Self, AiError> {
        let tasks = codes
            .iter()
            .map(|&code| TaskKind::try_from(code))
            .collect::<Result<VecDeque<_>, _>>()?;
        Ok(Self { tasks })
    }
}

impl FromIterator<TaskKind> for BuildTaskQueue {
    fn from_iter<I: IntoIterator<Item = TaskKind>>(iter: I) -> Self {
        Self {
            tasks: iter.into_iter().collect(),
        }
    }
}
