use crate::base::{Genotype, Locus1Allele, Locus2Allele, Sex, Stage};
use crate::errors::InheritanceError;
use crate::evolution::inheritance;
use crate::simulation::ParameterSet;
use rand::Rng;

/// Which parent(s) passed the drive's nuclease to an individual.
///
/// Selects the sampling branch for egg count, hatching, larval and pupal
/// mortality, intersex and homing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NucleaseOrigin {
    /// No drive allele; the inheritance flags are ignored.
    WildType,
    Father,
    Mother,
    Both,
}

impl NucleaseOrigin {
    /// Resolve the branch for a genotype and its inheritance flags.
    ///
    /// # Errors
    /// A drive carrier with neither flag set has no branch.
    pub fn resolve(
        genotype: &Genotype,
        from_father: bool,
        from_mother: bool,
    ) -> Result<Self, InheritanceError> {
        if !genotype.carries_drive() {
            return Ok(Self::WildType);
        }
        match (from_father, from_mother) {
            (true, true) => Ok(Self::Both),
            (true, false) => Ok(Self::Father),
            (false, true) => Ok(Self::Mother),
            (false, false) => Err(InheritanceError {
                genotype: genotype.code(),
                from_father,
                from_mother,
            }),
        }
    }
}

/// One insect: its genotype, life-cycle state and every trait sampled at birth.
///
/// All stochastic traits are drawn once, in [`Organism::new`], so that
/// ageing is deterministic afterwards. Clones keep every sampled value.
#[derive(Debug, Clone, PartialEq)]
pub struct Organism {
    sex: Sex,
    genotype: Genotype,
    nucl_from_father: bool,
    nucl_from_mother: bool,
    origin: NucleaseOrigin,

    age: f64,
    stage: Stage,
    time_to_hatch: f64,
    time_to_pupa: f64,
    time_to_maturation: f64,
    death: f64,

    mated: bool,
    intersex: bool,
    mating: bool,
    deposing_eggs: bool,
    eggs: u32,
    hatching: bool,
    larva_survives: bool,
    pupa_survives: bool,
}

impl Organism {
    /// Create a new egg.
    ///
    /// `hatching_mod` is the combined hatching modifier of the parents (1.0
    /// for individuals that did not come from a mating). Draws happen in a
    /// fixed order: development timers, lifespan, intersex, mating,
    /// deposition, egg count, hatching, larval survival, pupal survival.
    pub fn new<R: Rng + ?Sized>(
        params: &ParameterSet,
        sex: Sex,
        genotype: Genotype,
        nucl_from_father: bool,
        nucl_from_mother: bool,
        hatching_mod: f64,
        rng: &mut R,
    ) -> Result<Self, InheritanceError> {
        let origin = NucleaseOrigin::resolve(&genotype, nucl_from_father, nucl_from_mother)?;

        let time_to_hatch = params.time_to_hatch.sample(rng);
        let time_to_pupa = params.time_to_pupa.sample(rng);
        let time_to_maturation = params.time_to_maturation.sample(rng);
        let death = params.survival.get(sex).sample(rng);

        let mut organism = Self {
            sex,
            genotype,
            nucl_from_father,
            nucl_from_mother,
            origin,
            age: 0.0,
            stage: Stage::Egg,
            time_to_hatch,
            time_to_pupa,
            time_to_maturation,
            death,
            mated: false,
            intersex: false,
            mating: false,
            deposing_eggs: false,
            eggs: 0,
            hatching: false,
            larva_survives: false,
            pupa_survives: false,
        };

        organism.intersex = organism.roll_intersex(params, rng);
        organism.mating = organism.roll_mating(params, rng);
        organism.deposing_eggs = organism.roll_deposition(params, rng);
        organism.eggs = organism.sample_eggs(params, rng);

        let hatching = params.hatching.get(origin).sample(rng);
        organism.hatching = rng.random::<f64>() < hatching * hatching_mod;

        let larval = params.larval_mortality.get(origin).sample(rng);
        organism.larva_survives = !(rng.random::<f64>() < larval);

        let pupal = params.pupal_mortality.get(sex, origin).sample(rng);
        organism.pupa_survives = !(rng.random::<f64>() < pupal);

        Ok(organism)
    }

    /// Create an individual released directly into the cage as an adult.
    pub fn adult<R: Rng + ?Sized>(
        params: &ParameterSet,
        sex: Sex,
        genotype: Genotype,
        nucl_from_father: bool,
        nucl_from_mother: bool,
        rng: &mut R,
    ) -> Result<Self, InheritanceError> {
        let mut organism = Self::new(
            params,
            sex,
            genotype,
            nucl_from_father,
            nucl_from_mother,
            1.0,
            rng,
        )?;
        organism.stage = Stage::Adult;
        Ok(organism)
    }

    fn roll_intersex<R: Rng + ?Sized>(&self, params: &ParameterSet, rng: &mut R) -> bool {
        let p = match (self.origin, self.sex) {
            (NucleaseOrigin::Father, Sex::Female) => params.intersex.from_father.sample(rng),
            (NucleaseOrigin::Mother, Sex::Female) => params.intersex.from_mother.sample(rng),
            _ => 0.0,
        };
        rng.random::<f64>() <= p
    }

    fn roll_mating<R: Rng + ?Sized>(&self, params: &ParameterSet, rng: &mut R) -> bool {
        if self.intersex {
            return false;
        }
        if self.sex == Sex::Female && !self.genotype.is_functional() {
            return false;
        }
        let p = params.mating_probability.get(self.sex) * self.mating_mod(params);
        rng.random::<f64>() < p
    }

    fn roll_deposition<R: Rng + ?Sized>(&self, params: &ParameterSet, rng: &mut R) -> bool {
        match self.sex {
            Sex::Male => false,
            Sex::Female => rng.random::<f64>() <= params.egg_deposition_probability,
        }
    }

    fn sample_eggs<R: Rng + ?Sized>(&self, params: &ParameterSet, rng: &mut R) -> u32 {
        let mut eggs = if self.sex == Sex::Female && self.genotype.is_functional() {
            params.eggs.get(self.origin).sample(rng).trunc().max(0.0)
        } else {
            0.0
        };
        if self.genotype.carries_antidote() {
            let effect = if self.genotype.locus2.is_homozygous() {
                params.hom_antidrive_effect
            } else {
                params.het_antidrive_effect
            };
            eggs = (eggs * effect).round_ties_even();
        }
        eggs as u32
    }

    /// Advance the individual's age and move it to the next stage when due.
    ///
    /// At most one stage transition happens per call. Reaching adulthood
    /// resets the age so that lifespan counts from maturation.
    pub fn change_age(&mut self, dt: f64) {
        self.age += dt;
        match self.stage {
            Stage::Egg if self.hatching && self.age >= self.time_to_hatch => {
                self.stage = Stage::Larva;
            }
            Stage::Larva if self.larva_survives && self.age >= self.time_to_pupa => {
                self.stage = Stage::Pupa;
            }
            Stage::Pupa if self.pupa_survives && self.age >= self.time_to_maturation => {
                self.age = 0.0;
                self.stage = Stage::Adult;
            }
            _ => {}
        }
    }

    pub fn is_alive(&self) -> bool {
        match self.stage {
            Stage::Adult => self.age <= self.death,
            Stage::Egg => self.hatching,
            Stage::Larva => self.larva_survives,
            Stage::Pupa => self.pupa_survives,
        }
    }

    /// Whether the individual can still reach the next stages.
    pub fn will_develop(&self) -> bool {
        match self.stage {
            Stage::Egg => self.hatching,
            Stage::Larva => self.larva_survives,
            _ => true,
        }
    }

    /// Locus 1 allele transmitted to one gamete (homing, antidote block, resistance).
    pub fn form_gamete1<R: Rng + ?Sized>(&self, params: &ParameterSet, rng: &mut R) -> Locus1Allele {
        inheritance::form_gamete1(self, params, rng)
    }

    /// Locus 2 allele transmitted to one gamete.
    pub fn form_gamete2<R: Rng + ?Sized>(&self, params: &ParameterSet, rng: &mut R) -> Locus2Allele {
        inheritance::form_gamete2(self, params, rng)
    }

    #[inline]
    pub fn mating_mod(&self, params: &ParameterSet) -> f64 {
        params.mating_mod.get_or(self.sex, &self.genotype, 1.0)
    }

    #[inline]
    pub fn egg_mod(&self, params: &ParameterSet) -> f64 {
        params.egg_mod.get_or(self.sex, &self.genotype, 1.0)
    }

    #[inline]
    pub fn hatching_mod(&self, params: &ParameterSet) -> f64 {
        params.hatching_mod.get_or(self.sex, &self.genotype, 1.0)
    }

    #[inline]
    pub fn deposition_mod(&self, params: &ParameterSet) -> f64 {
        params.deposition_mod.get_or(self.sex, &self.genotype, 1.0)
    }

    #[inline]
    pub fn sex(&self) -> Sex {
        self.sex
    }

    #[inline]
    pub fn genotype(&self) -> &Genotype {
        &self.genotype
    }

    #[inline]
    pub fn nucl_from_father(&self) -> bool {
        self.nucl_from_father
    }

    #[inline]
    pub fn nucl_from_mother(&self) -> bool {
        self.nucl_from_mother
    }

    #[inline]
    pub fn origin(&self) -> NucleaseOrigin {
        self.origin
    }

    #[inline]
    pub fn stage(&self) -> Stage {
        self.stage
    }

    #[inline]
    pub fn age(&self) -> f64 {
        self.age
    }

    /// Adult lifespan, in days after maturation.
    #[inline]
    pub fn death(&self) -> f64 {
        self.death
    }

    #[inline]
    pub fn time_to_hatch(&self) -> f64 {
        self.time_to_hatch
    }

    #[inline]
    pub fn time_to_pupa(&self) -> f64 {
        self.time_to_pupa
    }

    #[inline]
    pub fn time_to_maturation(&self) -> f64 {
        self.time_to_maturation
    }

    #[inline]
    pub fn is_intersex(&self) -> bool {
        self.intersex
    }

    /// Eligible to mate at all.
    #[inline]
    pub fn mating(&self) -> bool {
        self.mating
    }

    #[inline]
    pub fn deposing_eggs(&self) -> bool {
        self.deposing_eggs
    }

    /// Eggs laid per successful mating, before genotype modifiers.
    #[inline]
    pub fn eggs(&self) -> u32 {
        self.eggs
    }

    #[inline]
    pub fn hatching(&self) -> bool {
        self.hatching
    }

    #[inline]
    pub fn larva_survives(&self) -> bool {
        self.larva_survives
    }

    #[inline]
    pub fn pupa_survives(&self) -> bool {
        self.pupa_survives
    }

    #[inline]
    pub fn mated(&self) -> bool {
        self.mated
    }

    #[inline]
    pub fn set_mated(&mut self) {
        self.mated = true;
    }
}
