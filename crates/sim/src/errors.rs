use thiserror::Error;

use crate::base::Sex;

/// Error returned when a genotype code or allele character cannot be parsed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GenotypeError {
    /// A character is not a legal allele at the given locus.
    #[error("invalid allele '{allele}' at locus {locus}")]
    InvalidAllele { locus: u8, allele: char },

    /// A full genotype code must be exactly four characters.
    #[error("invalid genotype code '{0}' (expected four characters, e.g. 'DWAW')")]
    InvalidCode(String),
}

/// Inheritance tracking produced an individual with no defined sampling branch.
///
/// This is a programming-level invariant violation: a drive carrier must have
/// received the nuclease from at least one parent.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error(
    "drive carrier {genotype} has no nuclease origin \
     (nucl_from_father={from_father}, nucl_from_mother={from_mother})"
)]
pub struct InheritanceError {
    pub genotype: String,
    pub from_father: bool,
    pub from_mother: bool,
}

/// Errors raised while pairing individuals.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MatingError {
    /// Both partners have the same sex.
    #[error("cannot mate two individuals of sex {0}")]
    SameSex(Sex),

    /// A handle did not resolve to a live individual.
    #[error("individual #{0} is not in the arena")]
    MissingIndividual(u32),

    #[error(transparent)]
    Inheritance(#[from] InheritanceError),
}

/// Errors found while loading or validating a configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Parallel per-introduction lists have different lengths.
    #[error(
        "release lists must have the same length \
         (wild_type={wild_type}, drive={drive}, antidote={antidote})"
    )]
    MismatchedCohorts {
        wild_type: usize,
        drive: usize,
        antidote: usize,
    },

    /// A distribution was given parameters it cannot sample from.
    #[error("invalid distribution for {name}: {reason}")]
    InvalidDistribution { name: String, reason: String },

    /// A probability lies outside [0, 1].
    #[error("invalid probability for {name}: {value} (must be between 0.0 and 1.0)")]
    InvalidProbability { name: String, value: f64 },

    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    #[error(transparent)]
    Genotype(#[from] GenotypeError),

    #[error(transparent)]
    Inheritance(#[from] InheritanceError),
}

/// Errors raised while writing report rows.
#[derive(Debug, Error)]
pub enum ReportError {
    #[error("failed to write report: {0}")]
    Io(#[from] std::io::Error),
}

/// Top-level error for a simulation run.
#[derive(Debug, Error)]
pub enum SimulationError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Inheritance(#[from] InheritanceError),

    #[error(transparent)]
    Mating(#[from] MatingError),

    #[error(transparent)]
    Report(#[from] ReportError),
}
