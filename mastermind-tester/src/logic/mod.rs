pub mod policy;
pub mod reports;
pub mod seeds;
pub mod simulation;

pub use policy::{GameplayStrategy, parse_strategies};
pub use reports::summarize;
pub use seeds::{iteration_seed, resolve_seed_inputs};
pub use simulation::{RunRecord, SimulationConfig, SimulationSession};
