// src/sim/mod.rs
// Simulation core: schedule generation, sentiment resolution, the engine and
// result summarization

pub mod engine;
pub mod schedule;
pub mod sentiment;
pub mod summary;
pub mod types;

// Re-export main types and functions
pub use engine::{run_simulation, EXTREME_GREED_STOP};
pub use schedule::generate_schedule;
pub use sentiment::{resolve, ResolvedSentiment};
pub use types::*;
