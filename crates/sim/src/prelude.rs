//! Commonly used imports for convenience.
//!
//! # Example
//!
//! ```
//! use drivecage_sim::prelude::*;
//!
//! let genotype: Genotype = "DWAW".parse().unwrap();
//! assert!(genotype.carries_drive() && genotype.carries_antidote());
//! ```

pub use crate::base::{Dist, Genotype, Locus1Allele, Locus2Allele, Sex, Stage};
pub use crate::errors::{ConfigError, SimulationError};
pub use crate::genome::{NucleaseOrigin, Organism};
pub use crate::simulation::{
    run_repetitions, Cage, Configuration, LateTrigger, ParameterSet, ReleaseConfig, Simulation,
    SimulationBuilder,
};
pub use crate::storage::{MemoryRecorder, ReportRow, ReportSink, TsvRecorder};
