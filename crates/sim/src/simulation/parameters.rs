//! Simulation parameters.
//!
//! A [`ParameterSet`] is built once (defaults, a configuration file, or the
//! builder), validated, and then only ever borrowed. Every organism
//! constructor and every mating call reads from the same immutable value.

use crate::base::{Dist, Sex};
use crate::errors::ConfigError;
use crate::evolution::GenotypeTable;
use crate::genome::NucleaseOrigin;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// A value with one entry per sex.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SexSpecific<T> {
    pub female: T,
    pub male: T,
}

impl<T> SexSpecific<T> {
    pub fn new(female: T, male: T) -> Self {
        Self { female, male }
    }

    #[inline]
    pub fn get(&self, sex: Sex) -> &T {
        match sex {
            Sex::Female => &self.female,
            Sex::Male => &self.male,
        }
    }
}

impl<T: Clone> SexSpecific<T> {
    /// The same value for both sexes.
    pub fn both(value: T) -> Self {
        Self {
            female: value.clone(),
            male: value,
        }
    }
}

/// Distributions for each nuclease-inheritance branch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ByOrigin<T> {
    pub wild_type: T,
    pub from_father: T,
    pub from_mother: T,
    pub both: T,
}

impl<T> ByOrigin<T> {
    #[inline]
    pub fn get(&self, origin: NucleaseOrigin) -> &T {
        match origin {
            NucleaseOrigin::WildType => &self.wild_type,
            NucleaseOrigin::Father => &self.from_father,
            NucleaseOrigin::Mother => &self.from_mother,
            NucleaseOrigin::Both => &self.both,
        }
    }

    fn iter(&self) -> impl Iterator<Item = (&'static str, &T)> {
        [
            ("wild_type", &self.wild_type),
            ("from_father", &self.from_father),
            ("from_mother", &self.from_mother),
            ("both", &self.both),
        ]
        .into_iter()
    }
}

/// Homing efficiency of a drive heterozygote, by where its nuclease came from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HomingRates {
    pub from_father: Dist,
    pub from_mother: Dist,
    pub both: Dist,
}

impl HomingRates {
    /// Homing distribution for a drive carrier. Wild-type carriers never home.
    pub fn get(&self, origin: NucleaseOrigin) -> Option<&Dist> {
        match origin {
            NucleaseOrigin::WildType => None,
            NucleaseOrigin::Father => Some(&self.from_father),
            NucleaseOrigin::Mother => Some(&self.from_mother),
            NucleaseOrigin::Both => Some(&self.both),
        }
    }
}

impl Default for HomingRates {
    fn default() -> Self {
        Self {
            from_father: Dist::normal(0.9867, 0.0163),
            from_mother: Dist::normal(0.9667, 0.0408),
            both: Dist::constant(1.0),
        }
    }
}

/// Intersex probability distributions for drive-carrying females.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IntersexRates {
    pub from_father: Dist,
    pub from_mother: Dist,
}

impl Default for IntersexRates {
    fn default() -> Self {
        Self {
            from_father: Dist::normal(0.0353, 0.0124),
            from_mother: Dist::normal(0.0096, 0.0066),
        }
    }
}

/// Pupal mortality tables.
///
/// Females have no table of their own for the "both parents" branch: they
/// use `male.both`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PupalMortality {
    pub male: ByOrigin<Dist>,
    pub female_wild_type: Dist,
    pub female_from_father: Dist,
    pub female_from_mother: Dist,
}

impl PupalMortality {
    pub fn get(&self, sex: Sex, origin: NucleaseOrigin) -> &Dist {
        match (sex, origin) {
            (Sex::Male, _) | (Sex::Female, NucleaseOrigin::Both) => self.male.get(origin),
            (Sex::Female, NucleaseOrigin::WildType) => &self.female_wild_type,
            (Sex::Female, NucleaseOrigin::Father) => &self.female_from_father,
            (Sex::Female, NucleaseOrigin::Mother) => &self.female_from_mother,
        }
    }
}

impl Default for PupalMortality {
    fn default() -> Self {
        Self {
            male: ByOrigin {
                wild_type: Dist::normal(0.1837, 0.0627),
                from_father: Dist::normal(0.0692, 0.0233),
                from_mother: Dist::normal(0.0783, 0.0167),
                both: Dist::normal(0.0796, 0.0182),
            },
            female_wild_type: Dist::normal(0.0918, 0.0161),
            female_from_father: Dist::normal(0.0676, 0.0223),
            female_from_mother: Dist::normal(0.0503, 0.0121),
        }
    }
}

/// Trims each egg harvest to a normally distributed size.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EggsFilter {
    pub mean: f64,
    pub std: f64,
}

impl Default for EggsFilter {
    fn default() -> Self {
        Self {
            mean: 1750.0,
            std: 150.0,
        }
    }
}

impl EggsFilter {
    pub fn dist(&self) -> Dist {
        Dist::normal(self.mean, self.std)
    }
}

/// Every rate, distribution and table the engine reads.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParameterSet {
    /// Number of pupae promoted from the nursery on each release day.
    pub release: usize,
    /// Promotion size overrides keyed by absolute day.
    pub special_releases: BTreeMap<u32, usize>,
    /// Egg-count multiplier for antidote homozygotes.
    pub hom_antidrive_effect: f64,
    /// Egg-count multiplier for antidote heterozygotes.
    pub het_antidrive_effect: f64,
    pub mating_probability: SexSpecific<f64>,
    pub multiple_mating: SexSpecific<bool>,
    pub egg_deposition_probability: f64,
    /// Adult lifespan after maturation.
    pub survival: SexSpecific<Dist>,
    pub time_to_hatch: Dist,
    pub time_to_pupa: Dist,
    pub time_to_maturation: Dist,
    /// Length of one tick, in days.
    pub time_step: f64,
    /// Days of the week (0 = Monday) on which the cage is fed and harvested.
    pub release_days: BTreeSet<u8>,
    /// Simulation length, in days.
    pub end_time: f64,
    pub homing: SexSpecific<HomingRates>,
    /// Probability that an antidote blocks homing.
    pub anti_drive_efficiency: SexSpecific<f64>,
    /// Probability that a failed homing event produces a resistance allele.
    pub resistance_efficiency: SexSpecific<f64>,
    pub eggs: ByOrigin<Dist>,
    pub hatching: ByOrigin<Dist>,
    pub larval_mortality: ByOrigin<Dist>,
    pub pupal_mortality: PupalMortality,
    pub intersex: IntersexRates,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub eggs_filter: Option<EggsFilter>,
    /// Promote nursery adults on release days without pupae.
    pub use_adults_if_needed: bool,
    /// Drop every non-promoted pupa from the nursery after a promotion.
    pub discard_unreleased_pupae: bool,
    pub mating_mod: GenotypeTable,
    pub egg_mod: GenotypeTable,
    pub hatching_mod: GenotypeTable,
    pub deposition_mod: GenotypeTable,
    pub anti_drive_efficiency_mod: GenotypeTable,
    /// Probability that an antidote heterozygote transmits the antidote.
    pub antidote_inheritance: GenotypeTable,
}

impl Default for ParameterSet {
    fn default() -> Self {
        Self {
            release: 400,
            special_releases: BTreeMap::new(),
            hom_antidrive_effect: 0.15,
            het_antidrive_effect: 0.3,
            mating_probability: SexSpecific::new(0.6, 1.0),
            multiple_mating: SexSpecific::new(false, true),
            egg_deposition_probability: 0.5,
            survival: SexSpecific::both(Dist::weibull_min(
                2.2472084592310644,
                6.213064151445494,
                0.7275226197070571,
            )),
            time_to_hatch: Dist::uniform(1.8, 2.2),
            time_to_pupa: Dist::uniform(9.0, 10.0),
            time_to_maturation: Dist::uniform(10.0, 12.0),
            time_step: 0.1,
            release_days: BTreeSet::from([1, 4]),
            end_time: 365.0,
            homing: SexSpecific::both(HomingRates::default()),
            anti_drive_efficiency: SexSpecific::both(1.0),
            resistance_efficiency: SexSpecific::both(0.4685),
            eggs: ByOrigin {
                wild_type: Dist::normal(137.4, 34.5),
                from_father: Dist::normal(59.67, 50.6),
                from_mother: Dist::normal(118.96, 34.5),
                both: Dist::normal(59.67, 50.6),
            },
            hatching: ByOrigin {
                wild_type: Dist::normal(0.8667, 0.0046),
                from_father: Dist::normal(0.8725, 0.0159),
                from_mother: Dist::normal(0.5313, 0.0168),
                both: Dist::normal(0.5094, 0.0553),
            },
            larval_mortality: ByOrigin {
                wild_type: Dist::normal(0.0825, 0.0214),
                from_father: Dist::normal(0.0671, 0.0146),
                from_mother: Dist::normal(0.1019, 0.0168),
                both: Dist::normal(0.0949, 0.0214),
            },
            pupal_mortality: PupalMortality::default(),
            intersex: IntersexRates::default(),
            eggs_filter: None,
            use_adults_if_needed: false,
            discard_unreleased_pupae: false,
            mating_mod: GenotypeTable::default(),
            egg_mod: GenotypeTable::default(),
            hatching_mod: GenotypeTable::default(),
            deposition_mod: GenotypeTable::default(),
            anti_drive_efficiency_mod: GenotypeTable::default(),
            antidote_inheritance: GenotypeTable::default(),
        }
    }
}

fn check_probability(name: &str, value: f64) -> Result<(), ConfigError> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(ConfigError::InvalidProbability {
            name: name.to_string(),
            value,
        })
    }
}

impl ParameterSet {
    /// Check every value before a run starts.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.time_step > 0.0 && self.time_step.is_finite()) {
            return Err(ConfigError::InvalidParameter(format!(
                "time_step must be positive, got {}",
                self.time_step
            )));
        }
        if !(self.end_time > 0.0 && self.end_time.is_finite()) {
            return Err(ConfigError::InvalidParameter(format!(
                "end_time must be positive, got {}",
                self.end_time
            )));
        }
        if let Some(day) = self.release_days.iter().find(|&&d| d > 6) {
            return Err(ConfigError::InvalidParameter(format!(
                "release day {day} is outside 0..=6"
            )));
        }
        for (name, value) in [
            ("hom_antidrive_effect", self.hom_antidrive_effect),
            ("het_antidrive_effect", self.het_antidrive_effect),
        ] {
            if !(value >= 0.0 && value.is_finite()) {
                return Err(ConfigError::InvalidParameter(format!(
                    "{name} must be non-negative, got {value}"
                )));
            }
        }

        check_probability("egg_deposition_probability", self.egg_deposition_probability)?;
        for sex in [Sex::Female, Sex::Male] {
            check_probability(
                &format!("mating_probability.{sex}"),
                *self.mating_probability.get(sex),
            )?;
            check_probability(
                &format!("anti_drive_efficiency.{sex}"),
                *self.anti_drive_efficiency.get(sex),
            )?;
            check_probability(
                &format!("resistance_efficiency.{sex}"),
                *self.resistance_efficiency.get(sex),
            )?;
            self.survival
                .get(sex)
                .validate(&format!("survival.{sex}"))?;
            let homing = self.homing.get(sex);
            homing.from_father.validate(&format!("homing.{sex}.from_father"))?;
            homing.from_mother.validate(&format!("homing.{sex}.from_mother"))?;
            homing.both.validate(&format!("homing.{sex}.both"))?;
        }

        self.time_to_hatch.validate("time_to_hatch")?;
        self.time_to_pupa.validate("time_to_pupa")?;
        self.time_to_maturation.validate("time_to_maturation")?;
        for (table_name, table) in [
            ("eggs", &self.eggs),
            ("hatching", &self.hatching),
            ("larval_mortality", &self.larval_mortality),
            ("pupal_mortality.male", &self.pupal_mortality.male),
        ] {
            for (branch, dist) in table.iter() {
                dist.validate(&format!("{table_name}.{branch}"))?;
            }
        }
        self.pupal_mortality
            .female_wild_type
            .validate("pupal_mortality.female_wild_type")?;
        self.pupal_mortality
            .female_from_father
            .validate("pupal_mortality.female_from_father")?;
        self.pupal_mortality
            .female_from_mother
            .validate("pupal_mortality.female_from_mother")?;
        self.intersex.from_father.validate("intersex.from_father")?;
        self.intersex.from_mother.validate("intersex.from_mother")?;

        if let Some(filter) = &self.eggs_filter {
            filter.dist().validate("eggs_filter")?;
        }

        self.mating_mod.validate("mating_mod")?;
        self.egg_mod.validate("egg_mod")?;
        self.hatching_mod.validate("hatching_mod")?;
        self.deposition_mod.validate("deposition_mod")?;
        self.anti_drive_efficiency_mod
            .validate("anti_drive_efficiency_mod")?;
        self.antidote_inheritance
            .validate_probabilities("antidote_inheritance")?;
        Ok(())
    }

    /// Promotion size for a release day at `day`.
    pub fn release_size(&self, day: Option<u32>) -> usize {
        day.and_then(|d| self.special_releases.get(&d).copied())
            .unwrap_or(self.release)
    }
}
