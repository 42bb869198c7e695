//! Data types used by the report sinks.

use crate::base::{all_genotypes, Genotype, Sex, GENOTYPE_COUNT};
use crate::genome::Organism;
use std::collections::BTreeSet;

/// Which ticks produce a report row.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum RecordingStrategy {
    /// Every whole day.
    #[default]
    Daily,
    /// Only the listed times, compared at two decimals.
    Specific(BTreeSet<i64>),
}

impl RecordingStrategy {
    /// Report at the given times (in days).
    pub fn at_times<I: IntoIterator<Item = f64>>(times: I) -> Self {
        Self::Specific(times.into_iter().map(centi_days).collect())
    }

    /// Check if time `t` should be reported.
    pub fn should_record(&self, t: f64) -> bool {
        match self {
            Self::Daily => t.fract() == 0.0,
            Self::Specific(times) => times.contains(&centi_days(t)),
        }
    }
}

/// Time rounded to two decimals, as an integer count of hundredths.
fn centi_days(t: f64) -> i64 {
    (t * 100.0).round() as i64
}

/// Counts over one pool of organisms.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PoolStats {
    pub size: usize,
    pub females: usize,
    pub wild_type: usize,
    pub transgenes: usize,
    pub drives: usize,
    pub anti: usize,
    pub resistance: usize,
    /// Females that will both mate and lay.
    pub fertile_females: usize,
    /// Counts indexed like [`all_genotypes`].
    pub genotypes: [usize; GENOTYPE_COUNT],
}

impl Default for PoolStats {
    fn default() -> Self {
        Self {
            size: 0,
            females: 0,
            wild_type: 0,
            transgenes: 0,
            drives: 0,
            anti: 0,
            resistance: 0,
            fertile_females: 0,
            genotypes: [0; GENOTYPE_COUNT],
        }
    }
}

impl PoolStats {
    pub fn from_organisms<'a, I>(organisms: I) -> Self
    where
        I: IntoIterator<Item = &'a Organism>,
    {
        let order = all_genotypes();
        let mut stats = Self::default();
        for organism in organisms {
            let genotype = organism.genotype();
            stats.size += 1;
            if organism.sex() == Sex::Female {
                stats.females += 1;
                if organism.mating() && organism.deposing_eggs() {
                    stats.fertile_females += 1;
                }
            }
            if genotype.is_wild_type() {
                stats.wild_type += 1;
            } else {
                stats.transgenes += 1;
            }
            stats.drives += usize::from(genotype.carries_drive());
            stats.anti += usize::from(genotype.carries_antidote());
            stats.resistance += usize::from(genotype.carries_resistance());
            if let Ok(index) = order.binary_search(genotype) {
                stats.genotypes[index] += 1;
            }
        }
        stats
    }

    /// `count / size`, or `None` for an empty pool.
    #[inline]
    pub fn frequency(&self, count: usize) -> Option<f64> {
        (self.size > 0).then(|| count as f64 / self.size as f64)
    }

    pub fn drive_frequency(&self) -> Option<f64> {
        self.frequency(self.drives)
    }

    /// Fraction of females that mate and lay, `None` without females.
    pub fn fitness(&self) -> Option<f64> {
        (self.females > 0).then(|| self.fertile_females as f64 / self.females as f64)
    }

    pub fn genotype_count(&self, genotype: &Genotype) -> usize {
        all_genotypes()
            .binary_search(genotype)
            .map(|i| self.genotypes[i])
            .unwrap_or(0)
    }
}

/// One row of the time series.
#[derive(Debug, Clone, PartialEq)]
pub struct ReportRow {
    /// Repetition index.
    pub round: usize,
    pub time: f64,
    /// An initial cohort entered the cage on this tick.
    pub initial_release: bool,
    pub population: PoolStats,
    /// Eggs from the most recent mating cycle.
    pub eggs: PoolStats,
    /// Larvae and pupae in the nursery.
    pub output: PoolStats,
}
