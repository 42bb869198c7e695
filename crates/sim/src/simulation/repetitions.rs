//! Independent repetitions of one configuration.
//!
//! Every repetition gets its own seed, drawn in order from a master
//! generator, and builds its own cohorts with it. Repetitions run in
//! parallel; results come back in repetition order, so a seeded batch gives
//! the same output whatever the thread count.

use crate::errors::SimulationError;
use crate::simulation::{Configuration, RunSummary, SimulationBuilder};
use crate::storage::{MemoryRecorder, ReportRow, ReportSink};
use rand::{Rng, SeedableRng};
use rand_xoshiro::Xoshiro256PlusPlus;
use rayon::prelude::*;
use tracing::info;

/// Rows and summary of one repetition.
#[derive(Debug, Clone)]
pub struct RepetitionResult {
    pub round: usize,
    pub seed: u64,
    pub rows: Vec<ReportRow>,
    pub summary: RunSummary,
}

/// Per-repetition seeds for a batch.
pub fn repetition_seeds(master: Option<u64>, repetitions: usize) -> Vec<u64> {
    let mut rng = match master {
        Some(seed) => Xoshiro256PlusPlus::seed_from_u64(seed),
        None => Xoshiro256PlusPlus::from_rng(&mut rand::rng()),
    };
    (0..repetitions).map(|_| rng.random()).collect()
}

/// Run one repetition with its own seed.
pub fn run_repetition(
    config: &Configuration,
    round: usize,
    seed: u64,
) -> Result<RepetitionResult, SimulationError> {
    let mut builder = SimulationBuilder::new(&config.parameters)
        .releases(&config.releases)
        .round(round)
        .seed(seed);
    if let Some(times) = &config.execution.report_times {
        builder = builder.report_times(times.iter().copied());
    }
    let mut sim = builder.build()?;
    let mut sink = MemoryRecorder::new();
    let summary = sim.run(&mut sink)?;
    Ok(RepetitionResult {
        round,
        seed,
        rows: sink.into_rows(),
        summary,
    })
}

/// Run every repetition of `config` in parallel.
///
/// `progress` is called once per finished repetition, from worker threads.
pub fn run_repetitions<F>(
    config: &Configuration,
    progress: F,
) -> Result<Vec<RepetitionResult>, SimulationError>
where
    F: Fn(&RepetitionResult) + Sync,
{
    config.validate()?;
    let seeds = repetition_seeds(config.execution.seed, config.execution.repetitions);
    info!(
        repetitions = seeds.len(),
        threads = rayon::current_num_threads(),
        "starting repetitions"
    );

    seeds
        .par_iter()
        .enumerate()
        .map(|(round, &seed)| {
            let result = run_repetition(config, round, seed)?;
            progress(&result);
            Ok(result)
        })
        .collect()
}

/// Send all rows to `sink`, repetition by repetition.
pub fn write_results<S: ReportSink + ?Sized>(
    results: &[RepetitionResult],
    sink: &mut S,
) -> Result<usize, SimulationError> {
    let mut written = 0;
    for row in results.iter().flat_map(|r| r.rows.iter()) {
        sink.record(row)?;
        written += 1;
    }
    sink.flush()?;
    Ok(written)
}
