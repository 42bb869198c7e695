//! Shared default values for the command line.
//! Simulation defaults live in `drivecage_sim`; these only cover the front end.

pub const CONFIG_PATH: &str = "drivecage.yaml";

pub const REPETITIONS: usize = 100;
pub const END_TIME: f64 = 365.0;

pub const LOG_LEVEL: &str = "warn";

pub const PROGRESS_TEMPLATE: &str =
    "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} repetitions ({eta})";
