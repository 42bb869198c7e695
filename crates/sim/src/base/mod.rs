//! Base types for the two-locus genetics.
//!
//! This module provides alleles, sorted allele pairs and genotype codes, the
//! parametric distributions used for trait sampling, and the arena that owns
//! every organism of a run.

mod allele;
mod arena;
mod distributions;
mod genotype;

pub use allele::{Allele, Locus1Allele, Locus2Allele, Sex, Stage};
pub use arena::{OrganismArena, OrganismId};
pub use distributions::{Dist, MixtureComponent};
pub use genotype::{all_genotypes, AllelePair, Genotype, GENOTYPE_COUNT};
