//! The cage and its pools.
//!
//! Every organism of a run lives in one arena. The cage keeps three ordered
//! lists of handles into it: the adult `population`, the `nursery` of
//! developing eggs, larvae and pupae, and `staging`, the eggs collected on
//! the last release day that enter the nursery on the next one. A handle is
//! in exactly one list at a time.

use crate::base::{OrganismArena, OrganismId, Stage};
use crate::genome::Organism;
use crate::storage::PoolStats;
use std::collections::HashSet;

#[derive(Debug, Default, Clone)]
pub struct Cage {
    arena: OrganismArena,
    population: Vec<OrganismId>,
    nursery: Vec<OrganismId>,
    staging: Vec<OrganismId>,
}

/// Age every member of `pool` and free the ones that die. Returns the number freed.
fn age_pool(arena: &mut OrganismArena, pool: &mut Vec<OrganismId>, dt: f64) -> usize {
    let before = pool.len();
    pool.retain(|&id| {
        let alive = match arena.get_mut(id) {
            Some(organism) => {
                organism.change_age(dt);
                organism.is_alive()
            }
            None => false,
        };
        if !alive {
            arena.free(id);
        }
        alive
    });
    before - pool.len()
}

impl Cage {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn arena(&self) -> &OrganismArena {
        &self.arena
    }

    #[inline]
    pub fn arena_mut(&mut self) -> &mut OrganismArena {
        &mut self.arena
    }

    #[inline]
    pub fn population(&self) -> &[OrganismId] {
        &self.population
    }

    #[inline]
    pub fn nursery(&self) -> &[OrganismId] {
        &self.nursery
    }

    #[inline]
    pub fn staging(&self) -> &[OrganismId] {
        &self.staging
    }

    /// Split borrow used by the mating cycle.
    pub fn population_and_arena(&mut self) -> (&[OrganismId], &mut OrganismArena) {
        (&self.population, &mut self.arena)
    }

    /// Release organisms into the adult population.
    pub fn release<I: IntoIterator<Item = Organism>>(&mut self, organisms: I) -> usize {
        let before = self.population.len();
        for organism in organisms {
            let id = self.arena.alloc(organism);
            self.population.push(id);
        }
        self.population.len() - before
    }

    /// Store freshly laid eggs in the staging pool.
    pub fn stage_eggs<I: IntoIterator<Item = Organism>>(&mut self, eggs: I) {
        for egg in eggs {
            let id = self.arena.alloc(egg);
            self.staging.push(id);
        }
    }

    /// Move the staging pool into the nursery.
    pub fn merge_staging(&mut self) {
        self.nursery.append(&mut self.staging);
    }

    /// Age all three pools by `dt` and free the dead. Returns the number freed.
    pub fn age(&mut self, dt: f64) -> usize {
        age_pool(&mut self.arena, &mut self.population, dt)
            + age_pool(&mut self.arena, &mut self.nursery, dt)
            + age_pool(&mut self.arena, &mut self.staging, dt)
    }

    /// Nursery members at `stage`, in nursery order.
    pub fn nursery_at(&self, stage: Stage) -> Vec<OrganismId> {
        self.nursery
            .iter()
            .copied()
            .filter(|&id| self.arena.get(id).is_some_and(|o| o.stage() == stage))
            .collect()
    }

    /// Move nursery members into the population.
    pub fn promote(&mut self, ids: &[OrganismId]) {
        let moving: HashSet<OrganismId> = ids.iter().copied().collect();
        self.nursery.retain(|id| !moving.contains(id));
        self.population.extend(ids.iter().copied());
    }

    /// Remove nursery members from the cage entirely.
    pub fn discard(&mut self, ids: &[OrganismId]) {
        let dropping: HashSet<OrganismId> = ids.iter().copied().collect();
        self.nursery.retain(|id| !dropping.contains(id));
        for &id in ids {
            self.arena.free(id);
        }
    }

    pub fn organisms<'a>(&'a self, ids: &'a [OrganismId]) -> impl Iterator<Item = &'a Organism> + 'a {
        ids.iter().filter_map(|&id| self.arena.get(id))
    }

    pub fn stats(&self, ids: &[OrganismId]) -> PoolStats {
        PoolStats::from_organisms(self.organisms(ids))
    }

    pub fn is_extinct(&self) -> bool {
        self.population.is_empty()
    }
}
