//! Initial cohorts and late releases.
//!
//! Initial cohorts are released one per feeding cycle: the first at time 0,
//! the rest on successive release days. A late release re-releases clones of
//! a template cohort on every release day once its trigger has fired.

use crate::base::{AllelePair, Genotype, Locus1Allele, Locus2Allele, Sex};
use crate::errors::ConfigError;
use crate::genome::Organism;
use crate::simulation::configs::{LateReleaseConfig, ReleaseConfig};
use crate::simulation::ParameterSet;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// Number of consecutive reported samples a drive-frequency trigger needs.
pub const DRIVE_WINDOW: usize = 7;

/// When a late release starts.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum LateTrigger {
    /// From the first release day at or after `time`.
    StartTime { time: f64 },
    /// Once the last seven reported drive-carrier frequencies all exceed
    /// `threshold`. Stays armed afterwards.
    DriveFrequency { threshold: f64 },
}

impl Default for LateTrigger {
    fn default() -> Self {
        LateTrigger::StartTime { time: 30.0 }
    }
}

/// Rolling window of the most recent reported drive-carrier frequencies.
#[derive(Debug, Clone, Default)]
pub struct DriveWindow {
    samples: VecDeque<f64>,
}

impl DriveWindow {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a sample; a missing frequency is stored as NaN.
    pub fn push(&mut self, frequency: Option<f64>) {
        if self.samples.len() == DRIVE_WINDOW {
            self.samples.pop_front();
        }
        self.samples.push_back(frequency.unwrap_or(f64::NAN));
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// True only with a full window whose every sample exceeds `threshold`.
    pub fn all_above(&self, threshold: f64) -> bool {
        self.samples.len() == DRIVE_WINDOW && self.samples.iter().all(|&f| f > threshold)
    }
}

/// A late release: template cohort, trigger and repeat cap.
#[derive(Debug, Clone)]
pub struct LateRelease {
    cohort: Vec<Organism>,
    trigger: LateTrigger,
    /// Maximum number of releases, `-1` for unlimited.
    max_repeats: i64,
    counter: i64,
    armed: bool,
}

impl LateRelease {
    pub fn new(cohort: Vec<Organism>, trigger: LateTrigger, max_repeats: i64) -> Self {
        Self {
            cohort,
            trigger,
            max_repeats,
            counter: 0,
            armed: false,
        }
    }

    pub fn trigger(&self) -> LateTrigger {
        self.trigger
    }

    pub fn cohort(&self) -> &[Organism] {
        &self.cohort
    }

    /// Number of release days on which the trigger has fired.
    pub fn counter(&self) -> i64 {
        self.counter
    }

    fn is_triggered(&mut self, time: f64, window: &DriveWindow) -> bool {
        match self.trigger {
            LateTrigger::StartTime { time: start } => time >= start,
            LateTrigger::DriveFrequency { threshold } => {
                if !self.armed && window.all_above(threshold) {
                    self.armed = true;
                }
                self.armed
            }
        }
    }

    /// Evaluate the trigger on a release day and return the clones to release.
    ///
    /// The counter advances on every triggered release day, including days
    /// past the repeat cap, which release nothing.
    pub fn fire(&mut self, time: f64, window: &DriveWindow) -> Option<Vec<Organism>> {
        if !self.is_triggered(time, window) {
            return None;
        }
        self.counter += 1;
        if self.max_repeats == -1 || self.counter <= self.max_repeats {
            Some(self.cohort.clone())
        } else {
            None
        }
    }
}

fn adult<R: Rng + ?Sized>(
    params: &ParameterSet,
    sex: Sex,
    locus1: (Locus1Allele, Locus1Allele),
    locus2: (Locus2Allele, Locus2Allele),
    nucl_from_father: bool,
    rng: &mut R,
) -> Result<Organism, ConfigError> {
    let genotype = Genotype::new(
        AllelePair::new(locus1.0, locus1.1),
        AllelePair::new(locus2.0, locus2.1),
    );
    Ok(Organism::adult(params, sex, genotype, nucl_from_father, false, rng)?)
}

fn antidote_male<R: Rng + ?Sized>(
    params: &ParameterSet,
    homozygous: bool,
    rng: &mut R,
) -> Result<Organism, ConfigError> {
    let second = if homozygous {
        Locus2Allele::Antidote
    } else {
        Locus2Allele::WildType
    };
    adult(
        params,
        Sex::Male,
        (Locus1Allele::WildType, Locus1Allele::WildType),
        (Locus2Allele::Antidote, second),
        false,
        rng,
    )
}

fn wild_type<R: Rng + ?Sized>(
    params: &ParameterSet,
    sex: Sex,
    rng: &mut R,
) -> Result<Organism, ConfigError> {
    adult(
        params,
        sex,
        (Locus1Allele::WildType, Locus1Allele::WildType),
        (Locus2Allele::WildType, Locus2Allele::WildType),
        false,
        rng,
    )
}

impl ReleaseConfig {
    /// Check that the per-introduction lists line up.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.wild_type.len() != self.drive.len() || self.drive.len() != self.antidote.len() {
            return Err(ConfigError::MismatchedCohorts {
                wild_type: self.wild_type.len(),
                drive: self.drive.len(),
                antidote: self.antidote.len(),
            });
        }
        if let Some(late) = &self.late {
            late.validate()?;
        }
        Ok(())
    }

    /// Build the initial cohorts, one per introduction.
    ///
    /// Each cohort holds its heterozygous drive males (nuclease from the
    /// father), then antidote males, then wild-type adults alternating
    /// female and male (`wild_type / 2` of each).
    pub fn build_cohorts<R: Rng + ?Sized>(
        &self,
        params: &ParameterSet,
        rng: &mut R,
    ) -> Result<Vec<Vec<Organism>>, ConfigError> {
        self.validate()?;
        let mut cohorts = Vec::with_capacity(self.wild_type.len());
        for ((&wild, &drive), &anti) in self
            .wild_type
            .iter()
            .zip(self.drive.iter())
            .zip(self.antidote.iter())
        {
            let mut cohort = Vec::with_capacity(wild + drive + anti);
            for _ in 0..drive {
                cohort.push(adult(
                    params,
                    Sex::Male,
                    (Locus1Allele::WildType, Locus1Allele::Drive),
                    (Locus2Allele::WildType, Locus2Allele::WildType),
                    true,
                    rng,
                )?);
            }
            for _ in 0..anti {
                cohort.push(antidote_male(params, self.hom_antidote, rng)?);
            }
            for _ in 0..wild / 2 {
                cohort.push(wild_type(params, Sex::Female, rng)?);
                cohort.push(wild_type(params, Sex::Male, rng)?);
            }
            cohorts.push(cohort);
        }
        Ok(cohorts)
    }

    /// Build the late-release template, if one is configured.
    pub fn build_late<R: Rng + ?Sized>(
        &self,
        params: &ParameterSet,
        rng: &mut R,
    ) -> Result<Option<LateRelease>, ConfigError> {
        let Some(late) = &self.late else {
            return Ok(None);
        };
        late.validate()?;
        let mut cohort = Vec::with_capacity(late.antidote + late.wild_type);
        for _ in 0..late.antidote {
            cohort.push(antidote_male(params, self.hom_antidote, rng)?);
        }
        for _ in 0..late.wild_type {
            cohort.push(wild_type(params, Sex::Male, rng)?);
        }
        Ok(Some(LateRelease::new(cohort, late.trigger, late.max_repeats)))
    }
}

impl LateReleaseConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_repeats < -1 {
            return Err(ConfigError::InvalidParameter(format!(
                "late.max_repeats must be -1 (unlimited) or non-negative, got {}",
                self.max_repeats
            )));
        }
        match self.trigger {
            LateTrigger::StartTime { time } if !time.is_finite() => Err(
                ConfigError::InvalidParameter(format!("late start time must be finite, got {time}")),
            ),
            LateTrigger::DriveFrequency { threshold } if !(0.0..=1.0).contains(&threshold) => {
                Err(ConfigError::InvalidProbability {
                    name: "late.trigger.threshold".to_string(),
                    value: threshold,
                })
            }
            _ => Ok(()),
        }
    }
}
