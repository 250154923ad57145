//! Construction - placing new buildings into a settlement
//!
//! Construction is instantaneous: if the plot is free and the settlement
//! stockpile holds the materials, they are consumed and the building is
//! spawned in the same call.

use serde::{Deserialize, Serialize};

use crate::city::blueprint::Blueprint;
use crate::core::types::Coord;
use crate::simulation::settlement::Settlement;

/// Outcome of one build attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BuildResult {
    /// Building placed
    Ok,
    /// Plot is usable but the stockpile lacks materials
    NeedResources,
    /// Anything else: no plot left, plot taken, no blueprint
    Failed,
}

impl BuildResult {
    /// Whether the caller should keep trying on later ticks
    pub fn keeps_active(&self) -> bool {
        matches!(self, BuildResult::Ok | BuildResult::NeedResources)
    }
}

/// Where a builder wants the building to go
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlacementHint {
    pub plot: Coord,
}

impl PlacementHint {
    pub fn at(plot: Coord) -> Self {
        Self { plot }
    }
}

/// A command able to place one structure type
pub trait BuildCommand {
    fn attempt_build(&self, settlement: &mut Settlement, hint: PlacementHint) -> BuildResult;
}

impl BuildCommand for Blueprint {
    fn attempt_build(&self, settlement: &mut Settlement, hint: PlacementHint) -> BuildResult {
        if settlement.is_occupied(hint.plot) {
            return BuildResult::Failed;
        }
        if !settlement.stockpile.consume_materials(&self.cost) {
            return BuildResult::NeedResources;
        }
        settlement.spawn_building(self, hint.plot);
        BuildResult::Ok
    }
}
