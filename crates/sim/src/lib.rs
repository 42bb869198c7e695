//! # Simulation Crate
//!
//! The `drivecage_sim` crate provides an individual-based, time-stepped
//! simulation of a caged insect population exposed to a homing gene drive
//! and an optional anti-drive (antidote) construct. It includes modules for
//! genotypes and trait distributions, organisms and their life cycle,
//! inheritance and mating, the release schedule and the cage engine, and
//! the tab-separated report format.

pub mod base;
pub mod errors;
pub mod evolution;
pub mod genome;
pub mod prelude;
pub mod simulation;
pub mod storage;

pub use base::{Genotype, Sex, Stage};
