//! Simulation engine, cage pools and run configuration.
//!
//! The most commonly used types are re-exported here so consumers can import
//! them from `drivecage_sim::simulation`:
//!
//! - `Simulation`: the time-stepped engine for one repetition.
//! - `SimulationBuilder`: fluent builder for `Simulation` with validation.
//! - `Cage`: the population, nursery and staging pools.
//! - `Configuration`: everything a batch of repetitions needs, loadable
//!   from YAML or JSON.

pub mod builder;
pub mod configs;
pub mod engine;
pub mod parameters;
pub mod population;
pub mod releases;
pub mod repetitions;

pub use builder::SimulationBuilder;
pub use configs::{Configuration, ExecutionConfig, LateReleaseConfig, ReleaseConfig};
pub use engine::{RunSummary, Simulation};
pub use parameters::{
    ByOrigin, EggsFilter, HomingRates, IntersexRates, ParameterSet, PupalMortality, SexSpecific,
};
pub use population::Cage;
pub use releases::{DriveWindow, LateRelease, LateTrigger, DRIVE_WINDOW};
pub use repetitions::{
    repetition_seeds, run_repetition, run_repetitions, write_results, RepetitionResult,
};
