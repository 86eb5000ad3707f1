//! Bacteria domain
//!
//! - components: BacteriumId, BacteriumEntry, BacteriumState, TickStatus
//! - registry: BacteriumRegistry (spawn / tick / enforce_boundaries / teardown)
//! - snapshot: read-only view для render layer
//! - velocity: Box–Muller sampling стартовой скорости
//! - systems: Bevy-обвязка (Simulation resource, команды, FixedUpdate chain)

pub mod components;
pub mod registry;
pub mod snapshot;
pub mod systems;
pub mod velocity;

pub use components::{chamber_contains, BacteriumEntry, BacteriumId, BacteriumState, Lifecycle, TickStatus};
pub use registry::BacteriumRegistry;
pub use snapshot::Snapshot;
pub use systems::{
    advance_growth, apply_simulation_commands, enforce_chamber_boundaries, BacteriaEvicted,
    Simulation, SimulationCommand,
};
pub use velocity::{sample_gaussian_velocity, sample_standard_normal_pair};
