//! Evolution module providing inheritance, genotype modifiers and mating.
//!
//! This module implements the reproductive processes of the cage:
//! - **Inheritance**: gamete formation with drive homing, antidote blocking
//!   and resistance emergence
//! - **Modifiers**: genotype-keyed multiplier tables
//! - **Mating**: random pairing of eligible adults and egg production

pub mod inheritance;
pub mod mating;
pub mod modifiers;

pub use inheritance::{form_gamete1, form_gamete2};
pub use mating::{mate, mate_all};
pub use modifiers::GenotypeTable;
