//! Time-stepped cage simulation.
//!
//! One tick of `time_step` days:
//!
//! 1. advance the clock (rounded to one decimal); the initial cohort is
//!    flagged as released at time 0
//! 2. age every organism in the population, nursery and staging pools and
//!    remove the dead
//! 3. snapshot the nursery larvae and pupae
//! 4. on a release day (whole day whose weekday is in `release_days`):
//!    merge staging into the nursery, absorb the next initial cohort, run
//!    the late release, mate the population, filter and stage the eggs,
//!    then promote pupae from the nursery into the population
//! 5. on a reporting tick, record the drive frequency and emit a row
//!
//! The run stops when the population is empty or `end_time` is reached.

use crate::base::{OrganismId, Stage};
use crate::errors::SimulationError;
use crate::evolution::mate_all;
use crate::genome::Organism;
use crate::simulation::releases::{DriveWindow, LateRelease};
use crate::simulation::{Cage, ParameterSet};
use crate::storage::{PoolStats, RecordingStrategy, ReportRow, ReportSink};
use rand::seq::SliceRandom;
use rand_xoshiro::Xoshiro256PlusPlus;
use std::collections::VecDeque;
use tracing::{debug, info, trace};

/// Outcome of a finished run.
#[derive(Debug, Clone, PartialEq)]
pub struct RunSummary {
    pub round: usize,
    pub final_time: f64,
    pub final_population: usize,
    pub rows: usize,
    /// Release days on which the late-release trigger had fired.
    pub late_release_days: i64,
}

fn round1(t: f64) -> f64 {
    (t * 10.0).round() / 10.0
}

/// Main simulation engine.
///
/// Borrows its parameters for its whole life; owns the cage, the queued
/// cohorts and the RNG. Build one with
/// [`SimulationBuilder`](crate::simulation::SimulationBuilder).
#[derive(Debug)]
pub struct Simulation<'p> {
    params: &'p ParameterSet,
    cage: Cage,
    /// Initial cohorts not yet released.
    cohorts: VecDeque<Vec<Organism>>,
    late: Option<LateRelease>,
    window: DriveWindow,
    recording: RecordingStrategy,
    /// Eggs of the most recent mating cycle, as reported.
    latest_eggs: Vec<Organism>,
    total_time: f64,
    round: usize,
    rows: usize,
    rng: Xoshiro256PlusPlus,
}

impl<'p> Simulation<'p> {
    /// Create a simulation. The first cohort enters the population at once.
    pub(crate) fn new(
        params: &'p ParameterSet,
        cohorts: Vec<Vec<Organism>>,
        late: Option<LateRelease>,
        recording: RecordingStrategy,
        round: usize,
        rng: Xoshiro256PlusPlus,
    ) -> Self {
        let mut cohorts: VecDeque<Vec<Organism>> = cohorts.into();
        let mut cage = Cage::new();
        if let Some(first) = cohorts.pop_front() {
            cage.release(first);
        }
        Self {
            params,
            cage,
            cohorts,
            late,
            window: DriveWindow::new(),
            recording,
            latest_eggs: Vec::new(),
            total_time: -params.time_step,
            round,
            rows: 0,
            rng,
        }
    }

    pub fn params(&self) -> &ParameterSet {
        self.params
    }

    pub fn cage(&self) -> &Cage {
        &self.cage
    }

    /// Current time in days.
    pub fn time(&self) -> f64 {
        self.total_time
    }

    pub fn round(&self) -> usize {
        self.round
    }

    pub fn remaining_cohorts(&self) -> usize {
        self.cohorts.len()
    }

    pub fn late_release(&self) -> Option<&LateRelease> {
        self.late.as_ref()
    }

    pub fn drive_window(&self) -> &DriveWindow {
        &self.window
    }

    pub fn latest_eggs(&self) -> &[Organism] {
        &self.latest_eggs
    }

    /// Whether the run has ended.
    pub fn is_finished(&self) -> bool {
        self.cage.is_extinct() || self.total_time >= self.params.end_time
    }

    /// Advance one tick. Returns the report row if this tick is reported.
    pub fn step(&mut self) -> Result<Option<ReportRow>, SimulationError> {
        let dt = self.params.time_step;
        self.total_time = round1(self.total_time + dt);
        let t = self.total_time;
        let mut initial_release = t == 0.0;

        let dead = self.cage.age(dt);
        if dead > 0 {
            trace!(time = t, dead, "purged");
        }

        let reporting = self.recording.should_record(t);
        let mut output = self.cage.nursery_at(Stage::Larva);
        let pupae = self.cage.nursery_at(Stage::Pupa);
        output.extend_from_slice(&pupae);
        let output_stats = if reporting {
            Some(self.cage.stats(&output))
        } else {
            None
        };

        let day = t.rem_euclid(7.0);
        if day.fract() == 0.0 && self.params.release_days.contains(&(day as u8)) {
            if self.release_day(t, pupae)? {
                initial_release = true;
            }
        }

        if let Some(output) = output_stats {
            let row = ReportRow {
                round: self.round,
                time: t,
                initial_release,
                population: self.cage.stats(self.cage.population()),
                eggs: PoolStats::from_organisms(&self.latest_eggs),
                output,
            };
            self.window.push(row.population.drive_frequency());
            self.rows += 1;
            return Ok(Some(row));
        }
        Ok(None)
    }

    /// Feeding, mating and harvest. Returns true if an initial cohort was absorbed.
    fn release_day(&mut self, t: f64, pupae: Vec<OrganismId>) -> Result<bool, SimulationError> {
        let params = self.params;
        self.cage.merge_staging();
        self.latest_eggs.clear();

        let mut absorbed = false;
        if t > 1.0 {
            if let Some(cohort) = self.cohorts.pop_front() {
                let n = self.cage.release(cohort);
                debug!(time = t, released = n, remaining = self.cohorts.len(), "initial cohort");
                absorbed = true;
            }
        }

        if let Some(late) = self.late.as_mut() {
            if let Some(clones) = late.fire(t, &self.window) {
                let n = self.cage.release(clones);
                debug!(time = t, released = n, repeat = late.counter(), "late release");
            }
        }

        let (population, arena) = self.cage.population_and_arena();
        let mut eggs = mate_all(arena, population, params, &mut self.rng)?;

        if let Some(filter) = &params.eggs_filter {
            eggs.shuffle(&mut self.rng);
            let keep = filter.dist().sample(&mut self.rng).trunc().max(0.0) as usize;
            eggs.truncate(keep);
        }
        debug!(time = t, eggs = eggs.len(), "mating cycle");

        self.latest_eggs = eggs.clone();
        self.cage.stage_eggs(eggs);

        let mut candidates = pupae;
        if candidates.is_empty() && params.use_adults_if_needed {
            candidates = self.cage.nursery_at(Stage::Adult);
        }
        if !candidates.is_empty() {
            candidates.shuffle(&mut self.rng);
            let size = params
                .release_size(Some(t as u32))
                .min(candidates.len());
            let (promoted, rest) = candidates.split_at(size);
            self.cage.promote(promoted);
            if params.discard_unreleased_pupae {
                self.cage.discard(rest);
            }
            debug!(time = t, promoted = promoted.len(), left = rest.len(), "promotion");
        }
        Ok(absorbed)
    }

    /// Run to completion, sending every reported row to `sink`.
    pub fn run<S: ReportSink + ?Sized>(&mut self, sink: &mut S) -> Result<RunSummary, SimulationError> {
        info!(
            round = self.round,
            population = self.cage.population().len(),
            cohorts = self.cohorts.len() + 1,
            end_time = self.params.end_time,
            "run start"
        );
        while !self.is_finished() {
            if let Some(row) = self.step()? {
                sink.record(&row)?;
            }
        }
        sink.flush()?;
        let summary = RunSummary {
            round: self.round,
            final_time: self.total_time,
            final_population: self.cage.population().len(),
            rows: self.rows,
            late_release_days: self.late.as_ref().map_or(0, LateRelease::counter),
        };
        info!(
            round = summary.round,
            time = summary.final_time,
            population = summary.final_population,
            rows = summary.rows,
            "run end"
        );
        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::base::{Dist, Genotype, Sex};
    use crate::simulation::releases::LateTrigger;
    use crate::simulation::{EggsFilter, ReleaseConfig, SexSpecific, SimulationBuilder};
    use std::collections::BTreeSet;
    use crate::storage::MemoryRecorder;
    use rand::SeedableRng;

    fn small_config() -> ReleaseConfig {
        ReleaseConfig {
            wild_type: vec![40],
            drive: vec![0],
            antidote: vec![0],
            hom_antidote: false,
            late: None,
        }
    }

    fn short_params(end_time: f64) -> ParameterSet {
        ParameterSet {
            end_time,
            release: 20,
            survival: SexSpecific::both(Dist::constant(30.0)),
            ..Default::default()
        }
    }

    #[test]
    fn test_clock_starts_at_zero_and_flags_release() {
        let params = short_params(3.0);
        let mut sim = SimulationBuilder::new(&params)
            .releases(&small_config())
            .seed(1)
            .build()
            .unwrap();
        assert!(sim.time() < 0.0);
        let row = sim.step().unwrap().unwrap();
        assert_eq!(row.time, 0.0);
        assert!(row.initial_release);
        assert_eq!(row.population.size, 40);

        // 0.1 is not a whole day
        assert!(sim.step().unwrap().is_none());
        assert_eq!(sim.time(), 0.1);
    }

    #[test]
    fn test_daily_rows_until_end_time() {
        let params = short_params(10.0);
        let mut sim = SimulationBuilder::new(&params)
            .releases(&small_config())
            .seed(2)
            .build()
            .unwrap();
        let mut sink = MemoryRecorder::new();
        let summary = sim.run(&mut sink).unwrap();

        let times: Vec<f64> = sink.rows().iter().map(|r| r.time).collect();
        assert_eq!(times, (0..=10).map(f64::from).collect::<Vec<_>>());
        assert_eq!(summary.rows, 11);
        assert_eq!(summary.final_time, 10.0);
        assert!(sink.rows()[1..].iter().all(|r| !r.initial_release));
    }

    #[test]
    fn test_eggs_reported_after_release_day() {
        let mut params = short_params(6.0);
        params.mating_probability = SexSpecific::both(1.0);
        params.egg_deposition_probability = 1.0;
        let mut sim = SimulationBuilder::new(&params)
            .releases(&small_config())
            .seed(3)
            .build()
            .unwrap();
        let mut sink = MemoryRecorder::new();
        sim.run(&mut sink).unwrap();

        let rows = sink.rows();
        assert_eq!(rows[0].eggs.size, 0);
        // Day 1 is a release day: mating produces the latest eggs, which stay
        // visible until the next release day.
        assert!(rows[1].eggs.size > 0);
        assert_eq!(rows[2].eggs.size, rows[1].eggs.size);
        // They sit in staging, not in the nursery, until day 4.
        assert_eq!(rows[3].output.size, 0);
        assert!(!sim.cage().nursery().is_empty());
    }

    #[test]
    fn test_extinct_population_stops_run() {
        let mut params = short_params(50.0);
        params.survival = SexSpecific::both(Dist::constant(0.5));
        let mut sim = SimulationBuilder::new(&params)
            .releases(&small_config())
            .seed(4)
            .build()
            .unwrap();
        let mut sink = MemoryRecorder::new();
        let summary = sim.run(&mut sink).unwrap();
        assert_eq!(summary.final_population, 0);
        assert!(summary.final_time < 1.0);
        assert_eq!(sink.rows().len(), 1);
    }

    #[test]
    fn test_promotion_respects_release_cap_and_special_days() {
        let mut params = short_params(1.0);
        params.release = 3;
        params.special_releases.insert(1, 5);
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(9);
        let adults: Vec<Organism> = (0..2)
            .map(|_| {
                Organism::adult(&params, Sex::Male, Genotype::wild_type(), false, false, &mut rng)
                    .unwrap()
            })
            .collect();
        let mut sim = Simulation::new(&params, vec![adults], None, RecordingStrategy::Daily, 0, rng);

        // Plant eight developing pupae in the nursery.
        let mut pupa_params = params.clone();
        pupa_params.time_to_hatch = Dist::constant(0.0);
        pupa_params.time_to_pupa = Dist::constant(0.0);
        pupa_params.time_to_maturation = Dist::constant(100.0);
        pupa_params.hatching.wild_type = Dist::constant(1.0);
        pupa_params.larval_mortality.wild_type = Dist::constant(0.0);
        pupa_params.pupal_mortality.male.wild_type = Dist::constant(0.0);
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(10);
        let eggs: Vec<Organism> = (0..8)
            .map(|_| {
                let mut egg = Organism::new(
                    &pupa_params,
                    Sex::Male,
                    Genotype::wild_type(),
                    false,
                    false,
                    1.0,
                    &mut rng,
                )
                .unwrap();
                egg.change_age(0.0);
                egg.change_age(0.0);
                egg
            })
            .collect();
        assert!(eggs.iter().all(|e| e.stage() == Stage::Pupa));
        sim.cage.stage_eggs(eggs);
        sim.cage.merge_staging();

        let mut sink = MemoryRecorder::new();
        sim.run(&mut sink).unwrap();
        // Day 1 overrides the cap of 3 with 5.
        assert_eq!(sim.cage().population().len(), 2 + 5);
        assert_eq!(sim.cage().nursery_at(Stage::Pupa).len(), 3);
        let day1 = &sink.rows()[1];
        assert_eq!(day1.output.size, 8);
        assert_eq!(day1.population.size, 7);
    }

    #[test]
    fn test_discard_unreleased_pupae() {
        let mut params = short_params(1.0);
        params.release = 2;
        params.discard_unreleased_pupae = true;
        params.time_to_hatch = Dist::constant(0.0);
        params.time_to_pupa = Dist::constant(0.0);
        params.time_to_maturation = Dist::constant(100.0);
        params.hatching.wild_type = Dist::constant(1.0);
        params.larval_mortality.wild_type = Dist::constant(0.0);
        params.pupal_mortality.male.wild_type = Dist::constant(0.0);
        params.pupal_mortality.female_wild_type = Dist::constant(0.0);

        let mut rng = Xoshiro256PlusPlus::seed_from_u64(12);
        let adult = Organism::adult(&params, Sex::Female, Genotype::wild_type(), false, false, &mut rng)
            .unwrap();
        let mut sim = Simulation::new(&params, vec![vec![adult]], None, RecordingStrategy::Daily, 0, rng);
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(13);
        let eggs: Vec<Organism> = (0..6)
            .map(|_| {
                Organism::new(&params, Sex::Male, Genotype::wild_type(), false, false, 1.0, &mut rng)
                    .unwrap()
            })
            .collect();
        sim.cage.stage_eggs(eggs);
        sim.cage.merge_staging();

        sim.run(&mut MemoryRecorder::new()).unwrap();
        assert_eq!(sim.cage().population().len(), 3);
        assert!(sim.cage().nursery_at(Stage::Pupa).is_empty());
    }

    #[test]
    fn test_late_release_from_start_time() {
        let params = short_params(9.0);
        let mut config = small_config();
        config.late = Some(crate::simulation::LateReleaseConfig {
            trigger: LateTrigger::StartTime { time: 3.0 },
            max_repeats: 1,
            antidote: 10,
            wild_type: 0,
        });
        let mut sim = SimulationBuilder::new(&params)
            .releases(&config)
            .seed(5)
            .build()
            .unwrap();
        let mut sink = MemoryRecorder::new();
        let summary = sim.run(&mut sink).unwrap();

        // Day 4 releases, day 8 fires again past the cap and releases nothing.
        assert_eq!(summary.late_release_days, 2);
        let anti: Vec<usize> = sink.rows().iter().map(|r| r.population.anti).collect();
        assert_eq!(anti[3], 0);
        assert_eq!(anti[4], 10);
        assert!(anti[8] <= 10);
    }

    /// Eggs kept after the day-1 mating cycle: 20 pairs of 50 eggs each.
    fn eggs_after_first_cycle(filter: Option<EggsFilter>) -> usize {
        let mut params = short_params(1.0);
        params.mating_probability = SexSpecific::both(1.0);
        params.egg_deposition_probability = 1.0;
        params.eggs.wild_type = Dist::constant(50.0);
        params.eggs_filter = filter;
        let mut sim = SimulationBuilder::new(&params)
            .releases(&small_config())
            .seed(6)
            .build()
            .unwrap();
        let mut sink = MemoryRecorder::new();
        sim.run(&mut sink).unwrap();
        assert_eq!(sink.rows()[1].eggs.size, sim.latest_eggs().len());
        assert_eq!(sim.cage().staging().len(), sim.latest_eggs().len());
        sim.latest_eggs().len()
    }

    #[test]
    fn test_eggs_filter_truncates_clutch() {
        assert_eq!(eggs_after_first_cycle(None), 1000);
        let exact = |mean| Some(EggsFilter { mean, std: 0.0 });
        assert_eq!(eggs_after_first_cycle(exact(30.9)), 30);
        assert_eq!(eggs_after_first_cycle(exact(-5.0)), 0);
        assert_eq!(eggs_after_first_cycle(exact(1e6)), 1000);
    }

    fn adults_left_in_nursery(use_adults_if_needed: bool) -> (usize, usize) {
        let mut params = short_params(1.0);
        params.release = 3;
        params.use_adults_if_needed = use_adults_if_needed;
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(18);
        let mut males = |n: usize| -> Vec<Organism> {
            (0..n)
                .map(|_| {
                    Organism::adult(&params, Sex::Male, Genotype::wild_type(), false, false, &mut rng)
                        .unwrap()
                })
                .collect()
        };
        let cohort = males(2);
        let reared = males(5);
        let mut sim = Simulation::new(&params, vec![cohort], None, RecordingStrategy::Daily, 0, rng);
        sim.cage.stage_eggs(reared);
        sim.cage.merge_staging();

        sim.run(&mut MemoryRecorder::new()).unwrap();
        (
            sim.cage().population().len(),
            sim.cage().nursery_at(Stage::Adult).len(),
        )
    }

    #[test]
    fn test_nursery_adults_promoted_only_when_allowed() {
        assert_eq!(adults_left_in_nursery(false), (2, 5));
        assert_eq!(adults_left_in_nursery(true), (2 + 3, 2));
    }

    #[test]
    fn test_drive_frequency_trigger_needs_seven_reports() {
        let mut params = short_params(8.0);
        params.release_days = BTreeSet::from([0, 1, 2, 3, 4, 5, 6]);
        params.mating_probability = SexSpecific::both(0.0);
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(19);

        let mut cohort = Vec::new();
        for _ in 0..10 {
            let drive: Genotype = "DWWW".parse().unwrap();
            cohort.push(Organism::adult(&params, Sex::Male, drive, true, false, &mut rng).unwrap());
            cohort.push(
                Organism::adult(&params, Sex::Female, Genotype::wild_type(), false, false, &mut rng)
                    .unwrap(),
            );
        }
        let antidote: Genotype = "WWAW".parse().unwrap();
        let late_cohort: Vec<Organism> = (0..5)
            .map(|_| Organism::adult(&params, Sex::Male, antidote, false, false, &mut rng).unwrap())
            .collect();

        let mut sim = SimulationBuilder::new(&params)
            .cohort(cohort)
            .late_release(LateRelease::new(
                late_cohort,
                LateTrigger::DriveFrequency { threshold: 0.1 },
                -1,
            ))
            .rng(rng)
            .build()
            .unwrap();
        let mut sink = MemoryRecorder::new();
        let summary = sim.run(&mut sink).unwrap();

        let rows = sink.rows();
        assert_eq!(rows.len(), 9);
        assert!(rows.iter().all(|r| r.population.drive_frequency() > Some(0.1)));
        // Days 0 to 6 are release days with fewer than seven samples.
        assert!(rows[..7].iter().all(|r| r.population.anti == 0));
        assert_eq!(rows[7].population.anti, 5);
        // Armed for good.
        assert_eq!(rows[8].population.anti, 10);
        assert_eq!(summary.late_release_days, 2);
        assert_eq!(sim.drive_window().len(), 7);
    }
}
