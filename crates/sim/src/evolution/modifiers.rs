//! Genotype-keyed modifier tables.
//!
//! A table maps `(sex, genotype)` to a multiplier. Lookups are pure and fall
//! back to a caller-supplied default (1.0 for every modifier the engine
//! uses) when the genotype is absent. In configuration files a table is
//! written per sex, keyed by genotype code:
//!
//! ```yaml
//! female:
//!   DWAW: 0.82
//!   DWWW: 0.45
//! male:
//!   WWAA: 0.1
//! ```

use crate::base::{Genotype, Sex};
use crate::errors::ConfigError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Multipliers keyed by sex and full genotype.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenotypeTable {
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub female: BTreeMap<Genotype, f64>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub male: BTreeMap<Genotype, f64>,
}

impl GenotypeTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    pub fn with(mut self, sex: Sex, genotype: Genotype, value: f64) -> Self {
        self.insert(sex, genotype, value);
        self
    }

    pub fn insert(&mut self, sex: Sex, genotype: Genotype, value: f64) {
        self.by_sex_mut(sex).insert(genotype, value);
    }

    #[inline]
    pub fn get(&self, sex: Sex, genotype: &Genotype) -> Option<f64> {
        self.by_sex(sex).get(genotype).copied()
    }

    /// Table value, or `default` when the genotype has no entry.
    #[inline]
    pub fn get_or(&self, sex: Sex, genotype: &Genotype, default: f64) -> f64 {
        self.get(sex, genotype).unwrap_or(default)
    }

    pub fn is_empty(&self) -> bool {
        self.female.is_empty() && self.male.is_empty()
    }

    /// Reject negative or non-finite multipliers.
    pub fn validate(&self, name: &str) -> Result<(), ConfigError> {
        for (sex, table) in [(Sex::Female, &self.female), (Sex::Male, &self.male)] {
            for (genotype, value) in table {
                if !value.is_finite() || *value < 0.0 {
                    return Err(ConfigError::InvalidParameter(format!(
                        "{name}.{sex}.{genotype} must be a non-negative number, got {value}"
                    )));
                }
            }
        }
        Ok(())
    }

    /// Like [`validate`](Self::validate), and every value must also be a probability.
    pub fn validate_probabilities(&self, name: &str) -> Result<(), ConfigError> {
        for (sex, table) in [(Sex::Female, &self.female), (Sex::Male, &self.male)] {
            for (genotype, value) in table {
                if !(0.0..=1.0).contains(value) {
                    return Err(ConfigError::InvalidProbability {
                        name: format!("{name}.{sex}.{genotype}"),
                        value: *value,
                    });
                }
            }
        }
        Ok(())
    }

    fn by_sex(&self, sex: Sex) -> &BTreeMap<Genotype, f64> {
        match sex {
            Sex::Female => &self.female,
            Sex::Male => &self.male,
        }
    }

    fn by_sex_mut(&mut self, sex: Sex) -> &mut BTreeMap<Genotype, f64> {
        match sex {
            Sex::Female => &mut self.female,
            Sex::Male => &mut self.male,
        }
    }
}
