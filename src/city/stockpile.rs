//! Stockpile - resource storage with per-resource limits
//!
//! Used both for the settlement inventory and for the output buffer of each
//! production process.

use ahash::AHashMap;
use serde::{Deserialize, Serialize};

use crate::city::resource::ResourceType;

/// A stockpile holding resources
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Stockpile {
    /// Resources stored: type -> (current, capacity)
    resources: AHashMap<ResourceType, (u32, u32)>,
}

impl Stockpile {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stockpile with the same capacity for every listed resource
    pub fn with_capacity(resources: &[ResourceType], capacity: u32) -> Self {
        let mut stockpile = Self::new();
        for res in resources {
            stockpile.set_capacity(*res, capacity);
        }
        stockpile
    }

    /// Set capacity for a resource type; stored amounts above it are kept
    pub fn set_capacity(&mut self, resource: ResourceType, capacity: u32) {
        let entry = self.resources.entry(resource).or_insert((0, 0));
        entry.1 = capacity;
    }

    /// Get current amount of a resource
    pub fn get(&self, resource: ResourceType) -> u32 {
        self.resources.get(&resource).map(|(c, _)| *c).unwrap_or(0)
    }

    /// Get capacity for a resource
    pub fn capacity(&self, resource: ResourceType) -> u32 {
        self.resources.get(&resource).map(|(_, cap)| *cap).unwrap_or(0)
    }

    /// Room left before the resource hits its capacity
    pub fn free_space(&self, resource: ResourceType) -> u32 {
        self.capacity(resource).saturating_sub(self.get(resource))
    }

    /// Try to add resources, returns amount actually added
    pub fn add(&mut self, resource: ResourceType, amount: u32) -> u32 {
        let entry = self.resources.entry(resource).or_insert((0, 0));
        let space = entry.1.saturating_sub(entry.0);
        let added = amount.min(space);
        entry.0 += added;
        added
    }

    /// Try to remove resources, returns amount actually removed
    pub fn remove(&mut self, resource: ResourceType, amount: u32) -> u32 {
        if let Some(entry) = self.resources.get_mut(&resource) {
            let removed = amount.min(entry.0);
            entry.0 -= removed;
            removed
        } else {
            0
        }
    }

    /// Check if stockpile has enough of all required materials
    pub fn has_materials(&self, requirements: &[(ResourceType, u32)]) -> bool {
        requirements.iter().all(|(res, amount)| self.get(*res) >= *amount)
    }

    /// Consume materials for construction, returns true if successful
    pub fn consume_materials(&mut self, requirements: &[(ResourceType, u32)]) -> bool {
        if !self.has_materials(requirements) {
            return false;
        }
        for (res, amount) in requirements {
            self.remove(*res, *amount);
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stockpile_add_remove() {
        let mut stockpile = Stockpile::new();
        stockpile.set_capacity(ResourceType::Boards, 50);

        assert_eq!(stockpile.add(ResourceType::Boards, 30), 30);
        assert_eq!(stockpile.get(ResourceType::Boards), 30);

        // Can't exceed capacity
        assert_eq!(stockpile.add(ResourceType::Boards, 30), 20);
        assert_eq!(stockpile.get(ResourceType::Boards), 50);
        assert_eq!(stockpile.free_space(ResourceType::Boards), 0);

        assert_eq!(stockpile.remove(ResourceType::Boards, 20), 20);
        assert_eq!(stockpile.get(ResourceType::Boards), 30);
    }

    #[test]
    fn test_stockpile_without_capacity_rejects_goods() {
        let mut stockpile = Stockpile::new();
        assert_eq!(stockpile.add(ResourceType::Clay, 5), 0);
        assert_eq!(stockpile.free_space(ResourceType::Clay), 0);
    }

    #[test]
    fn test_stockpile_has_materials() {
        let mut stockpile = Stockpile::with_capacity(&ResourceType::ALL, 100);
        stockpile.add(ResourceType::Boards, 50);
        stockpile.add(ResourceType::Tools, 30);

        let requirements = vec![(ResourceType::Boards, 20), (ResourceType::Tools, 10)];
        assert!(stockpile.has_materials(&requirements));

        let too_much = vec![(ResourceType::Boards, 100)];
        assert!(!stockpile.has_materials(&too_much));
    }

    #[test]
    fn test_stockpile_consume_materials() {
        let mut stockpile = Stockpile::with_capacity(&ResourceType::ALL, 100);
        stockpile.add(ResourceType::Boards, 50);
        stockpile.add(ResourceType::Tools, 30);

        let requirements = vec![(ResourceType::Boards, 20), (ResourceType::Tools, 10)];

        assert!(stockpile.consume_materials(&requirements));
        assert_eq!(stockpile.get(ResourceType::Boards), 30);
        assert_eq!(stockpile.get(ResourceType::Tools), 20);

        // Failed consumption leaves everything untouched
        assert!(!stockpile.consume_materials(&[(ResourceType::Bricks, 1)]));
        assert_eq!(stockpile.get(ResourceType::Boards), 30);
    }
}
