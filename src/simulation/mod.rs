//! Simulation layer - world state, the tick driver, and save games

pub mod economy;
pub mod save;
pub mod scenario;
pub mod session;
pub mod settlement;
pub mod world;

pub use economy::EconomyCommands;
pub use save::{SaveGame, SaveHeader, SAVE_VERSION};
pub use scenario::{generate_island, Scenario};
pub use session::Session;
pub use settlement::Settlement;
pub use world::{LandAllocation, World};
