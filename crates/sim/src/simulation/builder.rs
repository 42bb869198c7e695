//! Builder pattern for creating simulations.
//!
//! Provides a fluent API for configuring a run: the parameters it borrows,
//! the released individuals, the report schedule and the RNG.

use crate::errors::ConfigError;
use crate::genome::Organism;
use crate::simulation::releases::LateRelease;
use crate::simulation::{ParameterSet, ReleaseConfig, Simulation};
use crate::storage::RecordingStrategy;
use rand::SeedableRng;
use rand_xoshiro::Xoshiro256PlusPlus;

/// Builder for constructing [`Simulation`] instances.
///
/// # Examples
///
/// ```
/// use drivecage_sim::simulation::{ParameterSet, ReleaseConfig, SimulationBuilder};
///
/// let params = ParameterSet {
///     end_time: 14.0,
///     ..Default::default()
/// };
/// let sim = SimulationBuilder::new(&params)
///     .releases(&ReleaseConfig::default())
///     .report_times([7.0, 14.0])
///     .seed(42)
///     .build()
///     .unwrap();
/// assert_eq!(sim.remaining_cohorts(), 1);
/// ```
#[derive(Debug, Clone)]
pub struct SimulationBuilder<'p> {
    params: &'p ParameterSet,
    releases: Option<ReleaseConfig>,
    cohorts: Vec<Vec<Organism>>,
    late: Option<LateRelease>,
    recording: RecordingStrategy,
    round: usize,
    seed: Option<u64>,
    rng: Option<Xoshiro256PlusPlus>,
}

impl<'p> SimulationBuilder<'p> {
    pub fn new(params: &'p ParameterSet) -> Self {
        Self {
            params,
            releases: None,
            cohorts: Vec::new(),
            late: None,
            recording: RecordingStrategy::Daily,
            round: 0,
            seed: None,
            rng: None,
        }
    }

    /// Release configuration; its cohorts are drawn from the run's RNG at build time.
    pub fn releases(mut self, config: &ReleaseConfig) -> Self {
        self.releases = Some(config.clone());
        self
    }

    /// Append a ready-made cohort after those of the release configuration.
    pub fn cohort(mut self, cohort: Vec<Organism>) -> Self {
        self.cohorts.push(cohort);
        self
    }

    pub fn cohorts<I: IntoIterator<Item = Vec<Organism>>>(mut self, cohorts: I) -> Self {
        self.cohorts.extend(cohorts);
        self
    }

    /// Ready-made late release; replaces the one of the release configuration.
    pub fn late_release(mut self, late: LateRelease) -> Self {
        self.late = Some(late);
        self
    }

    /// Report only at the given times instead of every whole day.
    pub fn report_times<I: IntoIterator<Item = f64>>(mut self, times: I) -> Self {
        self.recording = RecordingStrategy::at_times(times);
        self
    }

    pub fn recording(mut self, recording: RecordingStrategy) -> Self {
        self.recording = recording;
        self
    }

    /// Repetition index written to every report row.
    pub fn round(mut self, round: usize) -> Self {
        self.round = round;
        self
    }

    /// Set the random seed (default: random).
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Use an already seeded generator; takes precedence over [`seed`](Self::seed).
    pub fn rng(mut self, rng: Xoshiro256PlusPlus) -> Self {
        self.rng = Some(rng);
        self
    }

    /// Validate the parameters, build the released individuals and create the simulation.
    pub fn build(self) -> Result<Simulation<'p>, ConfigError> {
        let params = self.params;
        params.validate()?;

        let mut rng = match (self.rng, self.seed) {
            (Some(rng), _) => rng,
            (None, Some(seed)) => Xoshiro256PlusPlus::seed_from_u64(seed),
            (None, None) => Xoshiro256PlusPlus::from_rng(&mut rand::rng()),
        };

        let mut cohorts = Vec::new();
        let mut late = self.late;
        if let Some(releases) = &self.releases {
            cohorts = releases.build_cohorts(params, &mut rng)?;
            if late.is_none() {
                late = releases.build_late(params, &mut rng)?;
            }
        }
        cohorts.extend(self.cohorts);
        if cohorts.is_empty() {
            return Err(ConfigError::InvalidParameter(
                "at least one release cohort is required".to_string(),
            ));
        }

        Ok(Simulation::new(
            params,
            cohorts,
            late,
            self.recording,
            self.round,
            rng,
        ))
    }
}
