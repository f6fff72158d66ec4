//! ECS Components для herding арены
//!
//! Организация по доменам:
//! - herder: агент (Herder) и его entry points
//! - level: container context (Level, DefaultLevel, initialize_herder)
//! - world: то, что herder читает (Prey, SafeZone, Obstacle)

pub mod herder;
pub mod level;
pub mod world;


// Re-exports для удобного импорта
pub use herder::*;
pub use level::*;
pub use world::*;
