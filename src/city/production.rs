//! Production system - advances building production each tick
//!
//! Every process of every building advances one tick at a time. On cycle
//! completion:
//! - Consumes input resources from the settlement stockpile
//! - Adds output resources to the process's own output buffer
//! - Records an output sample in the production history
//!
//! Goods only reach the settlement stockpile through `collect_goods`, which
//! is limited by the number of storage buildings. A process whose buffer is
//! full stalls until it is emptied.

use std::collections::{BTreeMap, VecDeque};

use serde::{Deserialize, Serialize};

use crate::city::building::{Building, BuildingRole};
use crate::city::resource::ResourceType;
use crate::city::stockpile::Stockpile;
use crate::core::types::BuildingId;

/// Inputs and outputs of one production cycle
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductionLine {
    pub id: String,
    /// Resources taken from the settlement per cycle
    pub consumed: Vec<(ResourceType, u32)>,
    /// Resources put into the output buffer per cycle
    pub produced: Vec<(ResourceType, u32)>,
    /// Cycle length in ticks
    pub cycle_ticks: u32,
}

impl ProductionLine {
    pub fn new(
        id: impl Into<String>,
        consumed: Vec<(ResourceType, u32)>,
        produced: Vec<(ResourceType, u32)>,
        cycle_ticks: u32,
    ) -> Self {
        Self {
            id: id.into(),
            consumed,
            produced,
            cycle_ticks: cycle_ticks.max(1),
        }
    }

    pub fn produces(&self, resource: ResourceType) -> bool {
        self.produced.iter().any(|(r, _)| *r == resource)
    }

    /// Output of the resource per tick when running continuously
    pub fn production_rate(&self, resource: ResourceType) -> f32 {
        Self::rate(&self.produced, resource, self.cycle_ticks)
    }

    /// Input of the resource per tick when running continuously
    pub fn consumption_rate(&self, resource: ResourceType) -> f32 {
        Self::rate(&self.consumed, resource, self.cycle_ticks)
    }

    fn rate(amounts: &[(ResourceType, u32)], resource: ResourceType, cycle_ticks: u32) -> f32 {
        amounts
            .iter()
            .filter(|(r, _)| *r == resource)
            .map(|(_, amount)| *amount as f32 / cycle_ticks as f32)
            .sum()
    }
}

/// Bounded per-tick output samples for each produced resource
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProductionHistory {
    window: usize,
    samples: BTreeMap<ResourceType, VecDeque<f32>>,
}

impl ProductionHistory {
    /// History tracking the given resources, keeping at most `window` samples each
    pub fn new(resources: impl IntoIterator<Item = ResourceType>, window: usize) -> Self {
        Self {
            window: window.max(1),
            samples: resources.into_iter().map(|r| (r, VecDeque::new())).collect(),
        }
    }

    /// Record one tick's output; untracked resources are ignored
    pub fn record(&mut self, resource: ResourceType, amount: f32) {
        if let Some(samples) = self.samples.get_mut(&resource) {
            if samples.len() == self.window {
                samples.pop_front();
            }
            samples.push_back(amount);
        }
    }

    pub fn length(&self, resource: ResourceType) -> Option<usize> {
        self.samples.get(&resource).map(VecDeque::len)
    }

    /// Mean output per tick, zero without samples
    pub fn average(&self, resource: ResourceType) -> f32 {
        match self.samples.get(&resource) {
            Some(samples) if !samples.is_empty() => {
                samples.iter().sum::<f32>() / samples.len() as f32
            }
            _ => 0.0,
        }
    }
}

/// One concurrent production process of a building
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Production {
    pub line: ProductionLine,
    /// Ticks accumulated towards the current cycle
    pub progress: u32,
    paused: bool,
    /// Output buffer, emptied by collectors
    pub buffer: Stockpile,
    pub history: ProductionHistory,
}

impl Production {
    pub fn new(line: ProductionLine, buffer_size: u32, history_window: usize) -> Self {
        let outputs: Vec<ResourceType> = line.produced.iter().map(|(r, _)| *r).collect();
        Self {
            buffer: Stockpile::with_capacity(&outputs, buffer_size),
            history: ProductionHistory::new(outputs, history_window),
            line,
            progress: 0,
            paused: false,
        }
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    /// Flip between paused and running
    pub fn toggle_active(&mut self) {
        self.paused = !self.paused;
    }

    pub fn free_space_for(&self, resource: ResourceType) -> u32 {
        self.buffer.free_space(resource)
    }

    /// True when no produced resource has any buffer space left
    pub fn outputs_full(&self) -> bool {
        self.line
            .produced
            .iter()
            .all(|(r, _)| self.free_space_for(*r) == 0)
    }

    /// Advance by one tick, returns true if a cycle completed
    fn step(&mut self, stockpile: &mut Stockpile) -> bool {
        if self.paused {
            self.record_idle();
            return false;
        }

        let has_room = self
            .line
            .produced
            .iter()
            .all(|(r, amount)| self.buffer.free_space(*r) >= *amount);
        if !has_room {
            self.record_idle();
            return false;
        }

        self.progress = (self.progress + 1).min(self.line.cycle_ticks);
        if self.progress < self.line.cycle_ticks {
            self.record_idle();
            return false;
        }

        // Residents consume whatever is there and never wait for inputs
        if self.line.produced.is_empty() {
            for (res, amount) in &self.line.consumed {
                stockpile.remove(*res, *amount);
            }
            self.progress = 0;
            return true;
        }

        if !stockpile.consume_materials(&self.line.consumed) {
            self.record_idle();
            return false;
        }

        for (res, amount) in &self.line.produced {
            self.buffer.add(*res, *amount);
            self.history.record(*res, *amount as f32);
        }
        self.progress = 0;
        true
    }

    fn record_idle(&mut self) {
        for (res, _) in &self.line.produced {
            self.history.record(*res, 0.0);
        }
    }
}

/// Result of a single production cycle completion
#[derive(Debug, Clone, PartialEq)]
pub struct ProductionResult {
    pub building: BuildingId,
    pub line_id: String,
}

/// Process production for all buildings of a settlement
pub fn tick_production(
    buildings: &mut [Building],
    stockpile: &mut Stockpile,
) -> Vec<ProductionResult> {
    let mut results = Vec::new();

    for building in buildings.iter_mut() {
        for production in building.productions.iter_mut() {
            if production.step(stockpile) {
                results.push(ProductionResult {
                    building: building.id,
                    line_id: production.line.id.clone(),
                });
            }
        }
    }

    results
}

/// Move goods from production buffers into the stockpile
///
/// Only the first `collector_slots` production buildings (in spawn order)
/// are served. Returns the number of goods moved.
pub fn collect_goods(
    buildings: &mut [Building],
    stockpile: &mut Stockpile,
    collector_slots: usize,
) -> u32 {
    let mut moved = 0;

    for building in buildings
        .iter_mut()
        .filter(|b| b.role == BuildingRole::Production)
        .take(collector_slots)
    {
        for production in building.productions.iter_mut() {
            for (res, _) in &production.line.produced {
                let waiting = production.buffer.get(*res);
                let added = stockpile.add(*res, waiting);
                production.buffer.remove(*res, added);
                moved += added;
            }
        }
    }

    moved
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::city::building::BuildingType;
    use crate::core::types::{Coord, SettlementId};

    fn building(index: u32, building_type: BuildingType, line: ProductionLine, buffer: u32) -> Building {
        Building::new(
            BuildingId { settlement: SettlementId(1), index },
            building_type,
            Coord::new(index as i32, 0),
            vec![Production::new(line, buffer, 64)],
        )
    }

    fn lumberjack(index: u32) -> Building {
        let line = ProductionLine::new("chop", vec![], vec![(ResourceType::Boards, 1)], 4);
        building(index, BuildingType::Lumberjack, line, 2)
    }

    #[test]
    fn test_tick_production_completes_cycle() {
        let mut buildings = vec![lumberjack(0)];
        let mut stockpile = Stockpile::with_capacity(&ResourceType::ALL, 100);

        let mut cycles = 0;
        for _ in 0..4 {
            cycles += tick_production(&mut buildings, &mut stockpile).len();
        }

        assert_eq!(cycles, 1);
        assert_eq!(buildings[0].productions[0].buffer.get(ResourceType::Boards), 1);
        // Goods stay in the buffer until collected
        assert_eq!(stockpile.get(ResourceType::Boards), 0);
        assert_eq!(buildings[0].history_length(ResourceType::Boards), Some(4));
        assert!((buildings[0].absolute_production_level(ResourceType::Boards) - 0.25).abs() < 1e-6);
    }

    #[test]
    fn test_full_buffer_stalls_production() {
        let mut buildings = vec![lumberjack(0)];
        let mut stockpile = Stockpile::with_capacity(&ResourceType::ALL, 100);

        // Buffer of 2 fills after two cycles
        for _ in 0..20 {
            tick_production(&mut buildings, &mut stockpile);
        }

        let production = &buildings[0].productions[0];
        assert_eq!(production.buffer.get(ResourceType::Boards), 2);
        assert!(production.outputs_full());
    }

    #[test]
    fn test_paused_production_records_idle_samples() {
        let mut buildings = vec![lumberjack(0)];
        buildings[0].productions[0].toggle_active();
        let mut stockpile = Stockpile::with_capacity(&ResourceType::ALL, 100);

        for _ in 0..8 {
            assert!(tick_production(&mut buildings, &mut stockpile).is_empty());
        }

        assert_eq!(buildings[0].history_length(ResourceType::Boards), Some(8));
        assert_eq!(buildings[0].absolute_production_level(ResourceType::Boards), 0.0);
    }

    #[test]
    fn test_production_requires_inputs() {
        let line = ProductionLine::new(
            "bricks",
            vec![(ResourceType::Clay, 2)],
            vec![(ResourceType::Bricks, 1)],
            2,
        );
        let mut buildings = vec![building(0, BuildingType::Brickyard, line, 4)];
        let mut stockpile = Stockpile::with_capacity(&ResourceType::ALL, 100);

        for _ in 0..6 {
            tick_production(&mut buildings, &mut stockpile);
        }
        assert_eq!(buildings[0].productions[0].buffer.get(ResourceType::Bricks), 0);

        // Waiting process completes as soon as clay arrives
        stockpile.add(ResourceType::Clay, 2);
        let results = tick_production(&mut buildings, &mut stockpile);
        assert_eq!(results.len(), 1);
        assert_eq!(stockpile.get(ResourceType::Clay), 0);
        assert_eq!(buildings[0].productions[0].buffer.get(ResourceType::Bricks), 1);
    }

    #[test]
    fn test_residents_consume_from_stockpile() {
        let line = ProductionLine::new("eat", vec![(ResourceType::Food, 1)], vec![], 3);
        let mut buildings = vec![building(0, BuildingType::Tent, line, 0)];
        let mut stockpile = Stockpile::with_capacity(&ResourceType::ALL, 100);
        stockpile.add(ResourceType::Food, 5);

        for _ in 0..9 {
            tick_production(&mut buildings, &mut stockpile);
        }

        assert_eq!(stockpile.get(ResourceType::Food), 2);
    }

    #[test]
    fn test_collect_goods_limited_by_slots() {
        let mut buildings = vec![lumberjack(0), lumberjack(1)];
        for b in buildings.iter_mut() {
            b.productions[0].buffer.add(ResourceType::Boards, 2);
        }
        let mut stockpile = Stockpile::with_capacity(&ResourceType::ALL, 100);

        let moved = collect_goods(&mut buildings, &mut stockpile, 1);

        assert_eq!(moved, 2);
        assert_eq!(stockpile.get(ResourceType::Boards), 2);
        assert_eq!(buildings[0].productions[0].buffer.get(ResourceType::Boards), 0);
        assert_eq!(buildings[1].productions[0].buffer.get(ResourceType::Boards), 2);
    }

    #[test]
    fn test_history_window_is_bounded() {
        let mut history = ProductionHistory::new([ResourceType::Food], 3);
        for amount in [1.0, 2.0, 3.0, 4.0] {
            history.record(ResourceType::Food, amount);
        }
        assert_eq!(history.length(ResourceType::Food), Some(3));
        assert!((history.average(ResourceType::Food) - 3.0).abs() < 1e-6);
        assert_eq!(history.length(ResourceType::Clay), None);
    }
}
