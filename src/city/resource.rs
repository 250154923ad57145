//! Resource types traded and produced by settlements

use serde::{Deserialize, Serialize};
use std::fmt;

/// Type of resource held in stockpiles and production buffers
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ResourceType {
    Food,
    Boards,
    Tools,
    Clay,
    Bricks,
}

impl ResourceType {
    pub const ALL: [ResourceType; 5] = [
        ResourceType::Food,
        ResourceType::Boards,
        ResourceType::Tools,
        ResourceType::Clay,
        ResourceType::Bricks,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            ResourceType::Food => "food",
            ResourceType::Boards => "boards",
            ResourceType::Tools => "tools",
            ResourceType::Clay => "clay",
            ResourceType::Bricks => "bricks",
        }
    }

    /// Parse a lowercase resource name as used in catalog files
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL
            .iter()
            .copied()
            .find(|r| r.name() == name.to_lowercase())
    }
}

impl fmt::Display for ResourceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
