//! Individuals and their life cycle.

mod organism;

pub use organism::{NucleaseOrigin, Organism};
