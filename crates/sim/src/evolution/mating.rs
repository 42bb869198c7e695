//! Pairing of adults and production of egg cohorts.

use crate::base::{AllelePair, Genotype, OrganismArena, OrganismId, Sex, Stage};
use crate::errors::MatingError;
use crate::genome::Organism;
use crate::simulation::ParameterSet;
use rand::seq::SliceRandom;
use rand::Rng;
use tracing::trace;

/// Mate one male with one female and return their eggs.
///
/// Both partners are marked as mated when their sex may not mate again.
/// No eggs are produced, and nothing is drawn, when either partner is not
/// eligible to mate or the female does not lay. Otherwise the female lays
/// with probability equal to the product of both deposition modifiers, and
/// the clutch has `round(f.eggs x egg_mod)` eggs.
///
/// # Errors
/// Returns [`MatingError::SameSex`] if both have the same sex, or an
/// inheritance error if an egg cannot be constructed.
pub fn mate<R: Rng + ?Sized>(
    male: &mut Organism,
    female: &mut Organism,
    params: &ParameterSet,
    rng: &mut R,
) -> Result<Vec<Organism>, MatingError> {
    if male.sex() == female.sex() {
        return Err(MatingError::SameSex(male.sex()));
    }
    let (male, female) = if male.sex() == Sex::Male {
        (male, female)
    } else {
        (female, male)
    };

    if !params.multiple_mating.female {
        female.set_mated();
    }
    if !params.multiple_mating.male {
        male.set_mated();
    }

    let deposition_mod = female.deposition_mod(params) * male.deposition_mod(params);
    let egg_mod = female.egg_mod(params) * male.egg_mod(params);
    let hatching_mod = female.hatching_mod(params) * male.hatching_mod(params);

    if !female.mating() || !male.mating() || !female.deposing_eggs() {
        return Ok(Vec::new());
    }
    if !(rng.random::<f64>() < deposition_mod) {
        return Ok(Vec::new());
    }

    let count = (f64::from(female.eggs()) * egg_mod).round_ties_even().max(0.0) as usize;
    let nucl_from_mother = female.genotype().carries_drive();
    let nucl_from_father = male.genotype().carries_drive();

    let mut eggs = Vec::with_capacity(count);
    for _ in 0..count {
        let fg1 = female.form_gamete1(params, rng);
        let mg1 = male.form_gamete1(params, rng);
        let fg2 = female.form_gamete2(params, rng);
        let mg2 = male.form_gamete2(params, rng);
        let sex = if rng.random::<f64>() < 0.5 {
            Sex::Male
        } else {
            Sex::Female
        };
        let genotype = Genotype::new(AllelePair::new(fg1, mg1), AllelePair::new(fg2, mg2));
        eggs.push(Organism::new(
            params,
            sex,
            genotype,
            nucl_from_father,
            nucl_from_mother,
            hatching_mod,
            rng,
        )?);
    }
    Ok(eggs)
}

fn is_eligible(organism: &Organism, sex: Sex, multiple_mating: bool) -> bool {
    organism.sex() == sex
        && organism.stage() == Stage::Adult
        && organism.mating()
        && (multiple_mating || !organism.mated())
        && (sex == Sex::Male || organism.genotype().is_functional())
}

/// Randomly pair every eligible adult in `population` and collect the eggs.
///
/// Eligible males and females are gathered in pool order, shuffled (males
/// first), and paired by position. Surplus individuals of the more common
/// sex stay unpaired. Egg cohorts are concatenated in pair order.
pub fn mate_all<R: Rng + ?Sized>(
    arena: &mut OrganismArena,
    population: &[OrganismId],
    params: &ParameterSet,
    rng: &mut R,
) -> Result<Vec<Organism>, MatingError> {
    let mut males = Vec::new();
    let mut females = Vec::new();
    for &id in population {
        let organism = arena
            .get(id)
            .ok_or(MatingError::MissingIndividual(id.index()))?;
        if is_eligible(organism, Sex::Male, params.multiple_mating.male) {
            males.push(id);
        } else if is_eligible(organism, Sex::Female, params.multiple_mating.female) {
            females.push(id);
        }
    }
    males.shuffle(rng);
    females.shuffle(rng);

    let mut eggs = Vec::new();
    for (&m, &f) in males.iter().zip(females.iter()) {
        let (male, female) = arena
            .pair_mut(m, f)
            .ok_or(MatingError::MissingIndividual(m.index()))?;
        eggs.extend(mate(male, female, params, rng)?);
    }
    trace!(
        males = males.len(),
        females = females.len(),
        eggs = eggs.len(),
        "mating cycle"
    );
    Ok(eggs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::base::Dist;
    use crate::evolution::GenotypeTable;
    use crate::simulation::SexSpecific;
    use rand::SeedableRng;
    use rand_xoshiro::Xoshiro256PlusPlus;

    fn gt(code: &str) -> Genotype {
        code.parse().unwrap()
    }

    /// Every female mates, lays and has exactly `eggs` eggs.
    fn fertile_params(eggs: f64) -> ParameterSet {
        let mut params = ParameterSet::default();
        params.mating_probability = SexSpecific::both(1.0);
        params.egg_deposition_probability = 1.0;
        params.eggs.wild_type = Dist::constant(eggs);
        params.eggs.from_father = Dist::constant(eggs);
        params.eggs.from_mother = Dist::constant(eggs);
        params
    }

    fn adult(params: &ParameterSet, sex: Sex, code: &str, rng: &mut Xoshiro256PlusPlus) -> Organism {
        let carries = gt(code).carries_drive();
        Organism::adult(params, sex, gt(code), carries, false, rng).unwrap()
    }

    #[test]
    fn test_same_sex_is_error() {
        let params = ParameterSet::default();
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(1);
        let mut a = adult(&params, Sex::Female, "WWWW", &mut rng);
        let mut b = adult(&params, Sex::Female, "WWWW", &mut rng);
        assert!(matches!(
            mate(&mut a, &mut b, &params, &mut rng),
            Err(MatingError::SameSex(Sex::Female))
        ));
    }

    #[test]
    fn test_egg_count_uses_combined_modifier() {
        let mut params = fertile_params(100.0);
        params.egg_mod = GenotypeTable::new()
            .with(Sex::Female, gt("WWWW"), 0.5)
            .with(Sex::Male, gt("WWAW"), 0.25);
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(5);
        let mut female = adult(&params, Sex::Female, "WWWW", &mut rng);
        let mut male = adult(&params, Sex::Male, "WWAW", &mut rng);
        assert_eq!(female.eggs(), 100);

        let eggs = mate(&mut male, &mut female, &params, &mut rng).unwrap();
        // round(100 * 0.5 * 0.25) = round(12.5) = 12
        assert_eq!(eggs.len(), 12);
        assert!(eggs.iter().all(|e| e.stage() == Stage::Egg));
    }

    #[test]
    fn test_partner_order_does_not_matter() {
        let params = fertile_params(10.0);
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(5);
        let mut female = adult(&params, Sex::Female, "WWWW", &mut rng);
        let mut male = adult(&params, Sex::Male, "WWWW", &mut rng);
        let eggs = mate(&mut female, &mut male, &params, &mut rng).unwrap();
        assert_eq!(eggs.len(), 10);
    }

    #[test]
    fn test_mated_flags_follow_multiple_mating() {
        let params = fertile_params(10.0);
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(8);
        let mut female = adult(&params, Sex::Female, "WWWW", &mut rng);
        let mut male = adult(&params, Sex::Male, "WWWW", &mut rng);
        mate(&mut male, &mut female, &params, &mut rng).unwrap();
        assert!(female.mated());
        assert!(!male.mated());
    }

    #[test]
    fn test_no_eggs_when_female_does_not_lay() {
        let mut params = fertile_params(10.0);
        params.egg_deposition_probability = 0.0;
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(4);
        let mut female = adult(&params, Sex::Female, "WWWW", &mut rng);
        let mut male = adult(&params, Sex::Male, "WWWW", &mut rng);
        assert!(!female.deposing_eggs());
        assert!(mate(&mut male, &mut female, &params, &mut rng).unwrap().is_empty());
        assert!(female.mated());
    }

    #[test]
    fn test_zero_deposition_modifier_blocks_laying() {
        let mut params = fertile_params(10.0);
        params.deposition_mod = GenotypeTable::new().with(Sex::Female, gt("WWWW"), 0.0);
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(14);
        let mut female = adult(&params, Sex::Female, "WWWW", &mut rng);
        let mut male = adult(&params, Sex::Male, "WWWW", &mut rng);
        assert!(female.deposing_eggs());
        assert!(mate(&mut male, &mut female, &params, &mut rng).unwrap().is_empty());
        assert!(female.mated());
    }

    #[test]
    fn test_deposition_modifiers_of_both_partners_multiply() {
        let mut params = fertile_params(1.0);
        params.deposition_mod = GenotypeTable::new()
            .with(Sex::Female, gt("WWWW"), 0.5)
            .with(Sex::Male, gt("WWWW"), 0.5);
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(15);
        let laid = (0..4000)
            .filter(|_| {
                let mut female = adult(&params, Sex::Female, "WWWW", &mut rng);
                let mut male = adult(&params, Sex::Male, "WWWW", &mut rng);
                !mate(&mut male, &mut female, &params, &mut rng).unwrap().is_empty()
            })
            .count();
        // 0.5 x 0.5
        assert!((850..1150).contains(&laid), "{laid}");
    }

    #[test]
    fn test_mating_modifier_scales_eligibility() {
        let mut params = fertile_params(5.0);
        params.mating_mod = GenotypeTable::new()
            .with(Sex::Male, gt("WWWW"), 0.0)
            .with(Sex::Female, gt("WWWW"), 0.5);
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(16);

        let males: Vec<Organism> = (0..200)
            .map(|_| adult(&params, Sex::Male, "WWWW", &mut rng))
            .collect();
        assert!(males.iter().all(|m| !m.mating()));

        let willing = (0..4000)
            .filter(|_| adult(&params, Sex::Female, "WWWW", &mut rng).mating())
            .count();
        assert!((1800..2200).contains(&willing), "{willing}");

        // Unwilling males never pair.
        let mut arena = OrganismArena::new();
        let mut population: Vec<OrganismId> = males.into_iter().map(|m| arena.alloc(m)).collect();
        for _ in 0..50 {
            population.push(arena.alloc(adult(&params, Sex::Female, "WWWW", &mut rng)));
        }
        assert!(mate_all(&mut arena, &population, &params, &mut rng)
            .unwrap()
            .is_empty());
    }

    #[test]
    fn test_parent_hatching_modifier_reaches_offspring() {
        let mut params = fertile_params(2000.0);
        params.hatching.wild_type = Dist::constant(1.0);
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(17);

        let mut female = adult(&params, Sex::Female, "WWWW", &mut rng);
        let mut male = adult(&params, Sex::Male, "WWWW", &mut rng);
        let eggs = mate(&mut male, &mut female, &params, &mut rng).unwrap();
        assert!(eggs.iter().all(Organism::hatching));

        params.hatching_mod = GenotypeTable::new().with(Sex::Female, gt("WWWW"), 0.0);
        let mut female = adult(&params, Sex::Female, "WWWW", &mut rng);
        let mut male = adult(&params, Sex::Male, "WWWW", &mut rng);
        let eggs = mate(&mut male, &mut female, &params, &mut rng).unwrap();
        assert_eq!(eggs.len(), 2000);
        assert!(eggs.iter().all(|e| !e.hatching() && !e.will_develop()));

        params.hatching_mod = GenotypeTable::new().with(Sex::Male, gt("WWWW"), 0.5);
        let mut female = adult(&params, Sex::Female, "WWWW", &mut rng);
        let mut male = adult(&params, Sex::Male, "WWWW", &mut rng);
        let eggs = mate(&mut male, &mut female, &params, &mut rng).unwrap();
        let hatching = eggs.iter().filter(|e| e.hatching()).count();
        assert!((850..1150).contains(&hatching), "{hatching}");
    }

    #[test]
    fn test_offspring_inherit_nuclease_flags() {
        let mut params = fertile_params(200.0);
        params.hatching.from_father = Dist::constant(1.0);
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(21);
        let mut female = adult(&params, Sex::Female, "WWWW", &mut rng);
        let mut male = adult(&params, Sex::Male, "DWWW", &mut rng);

        let eggs = mate(&mut male, &mut female, &params, &mut rng).unwrap();
        assert_eq!(eggs.len(), 200);
        for egg in &eggs {
            assert!(egg.nucl_from_father());
            assert!(!egg.nucl_from_mother());
            assert!(egg.genotype().locus1.contains(crate::base::Locus1Allele::WildType));
        }
        // Homing from the father is about 0.99, so almost every egg carries D.
        let drives = eggs.iter().filter(|e| e.genotype().carries_drive()).count();
        assert!(drives > 180, "{drives}");
    }

    #[test]
    fn test_offspring_sex_ratio_is_balanced() {
        let params = fertile_params(4000.0);
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(12);
        let mut female = adult(&params, Sex::Female, "WWWW", &mut rng);
        let mut male = adult(&params, Sex::Male, "WWWW", &mut rng);
        let eggs = mate(&mut male, &mut female, &params, &mut rng).unwrap();
        let males = eggs.iter().filter(|e| e.sex() == Sex::Male).count();
        assert!((1850..2150).contains(&males), "{males}");
    }

    #[test]
    fn test_mate_all_pairs_up_to_shorter_list() {
        let params = fertile_params(5.0);
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(30);
        let mut arena = OrganismArena::new();
        let mut population = Vec::new();
        for _ in 0..3 {
            population.push(arena.alloc(adult(&params, Sex::Female, "WWWW", &mut rng)));
        }
        for _ in 0..5 {
            population.push(arena.alloc(adult(&params, Sex::Male, "WWWW", &mut rng)));
        }

        let eggs = mate_all(&mut arena, &population, &params, &mut rng).unwrap();
        assert_eq!(eggs.len(), 15);
        let mated_females = population
            .iter()
            .filter_map(|&id| arena.get(id))
            .filter(|o| o.sex() == Sex::Female && o.mated())
            .count();
        assert_eq!(mated_females, 3);

        // Females may only mate once.
        let eggs = mate_all(&mut arena, &population, &params, &mut rng).unwrap();
        assert!(eggs.is_empty());
    }

    #[test]
    fn test_mate_all_ignores_juveniles() {
        let params = fertile_params(5.0);
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(31);
        let mut arena = OrganismArena::new();
        let female = Organism::new(&params, Sex::Female, gt("WWWW"), false, false, 1.0, &mut rng)
            .unwrap();
        let population = vec![
            arena.alloc(female),
            arena.alloc(adult(&params, Sex::Male, "WWWW", &mut rng)),
        ];
        let eggs = mate_all(&mut arena, &population, &params, &mut rng).unwrap();
        assert!(eggs.is_empty());
    }
}
