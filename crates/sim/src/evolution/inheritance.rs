//! Gamete formation at the two loci.
//!
//! # Locus 1
//!
//! A drive heterozygote transmits the drive with super-Mendelian
//! probability. An antidote at locus 2 may block the nuclease first; when
//! homing fails the cut site may be repaired into a resistance allele.
//! Draw order for a drive heterozygote carrying the antidote:
//!
//! 1. block roll (`u <= efficiency x table modifier`) -> non-drive allele
//! 2. homing probability sampled for the nuclease origin, then `u <= p` -> drive
//! 3. resistance roll (`u < resistance_efficiency`) -> resistance
//! 4. Mendelian coin over both alleles
//!
//! # Locus 2
//!
//! An antidote heterozygote transmits the antidote with the probability
//! found in the `antidote_inheritance` table for its sex and genotype,
//! always when the table has no entry. Heterozygotes without the antidote
//! are Mendelian.

use crate::base::{Locus1Allele, Locus2Allele};
use crate::genome::Organism;
use crate::simulation::ParameterSet;
use rand::Rng;

/// Locus 1 allele passed on by `parent`.
pub fn form_gamete1<R: Rng + ?Sized>(
    parent: &Organism,
    params: &ParameterSet,
    rng: &mut R,
) -> Locus1Allele {
    let genotype = parent.genotype();
    let locus = genotype.locus1;
    if locus.is_homozygous() {
        return locus.first();
    }
    if !genotype.carries_drive() {
        return locus.mendelian(rng);
    }

    let sex = parent.sex();
    if genotype.carries_antidote() {
        let block = params.anti_drive_efficiency.get(sex)
            * params.anti_drive_efficiency_mod.get_or(sex, genotype, 1.0);
        if rng.random::<f64>() <= block {
            if let Some(allele) = locus.other_than(Locus1Allele::Drive) {
                return allele;
            }
        }
    }

    if let Some(homing) = params.homing.get(sex).get(parent.origin()) {
        let p = homing.sample(rng);
        if rng.random::<f64>() <= p {
            return Locus1Allele::Drive;
        }
    }

    if rng.random::<f64>() < *params.resistance_efficiency.get(sex) {
        return Locus1Allele::Resistance;
    }
    locus.mendelian(rng)
}

/// Locus 2 allele passed on by `parent`.
pub fn form_gamete2<R: Rng + ?Sized>(
    parent: &Organism,
    params: &ParameterSet,
    rng: &mut R,
) -> Locus2Allele {
    let genotype = parent.genotype();
    let locus = genotype.locus2;
    if locus.is_homozygous() {
        return locus.first();
    }
    if !locus.contains(Locus2Allele::Antidote) {
        return locus.mendelian(rng);
    }
    let p = params
        .antidote_inheritance
        .get_or(parent.sex(), genotype, 1.0);
    if rng.random::<f64>() < p {
        return Locus2Allele::Antidote;
    }
    locus
        .other_than(Locus2Allele::Antidote)
        .unwrap_or(Locus2Allele::Antidote)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::base::{Dist, Genotype, Sex};
    use crate::evolution::GenotypeTable;
    use crate::simulation::SexSpecific;
    use rand::SeedableRng;
    use rand_xoshiro::Xoshiro256PlusPlus;

    fn gt(code: &str) -> Genotype {
        code.parse().unwrap()
    }

    fn parent(params: &ParameterSet, sex: Sex, code: &str, father: bool, mother: bool) -> Organism {
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(11);
        Organism::adult(params, sex, gt(code), father, mother, &mut rng).unwrap()
    }

    fn count<F: FnMut(&mut Xoshiro256PlusPlus) -> bool>(n: usize, mut f: F) -> usize {
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(99);
        (0..n).filter(|_| f(&mut rng)).count()
    }

    #[test]
    fn test_homozygous_parents_transmit_their_allele() {
        let params = ParameterSet::default();
        let dd = parent(&params, Sex::Male, "DDAA", true, true);
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(1);
        for _ in 0..50 {
            assert_eq!(dd.form_gamete1(&params, &mut rng), Locus1Allele::Drive);
            assert_eq!(dd.form_gamete2(&params, &mut rng), Locus2Allele::Antidote);
        }
    }

    #[test]
    fn test_wild_type_heterozygote_is_mendelian() {
        let params = ParameterSet::default();
        let rw = parent(&params, Sex::Female, "RWWW", false, false);
        let resistance = count(4000, |rng| {
            rw.form_gamete1(&params, rng) == Locus1Allele::Resistance
        });
        assert!((1800..2200).contains(&resistance), "{resistance}");
    }

    #[test]
    fn test_homing_with_certainty_always_transmits_drive() {
        let params = ParameterSet::default();
        let both = parent(&params, Sex::Male, "DWWW", true, true);
        let drives = count(1000, |rng| both.form_gamete1(&params, rng) == Locus1Allele::Drive);
        assert_eq!(drives, 1000);
    }

    #[test]
    fn test_full_antidote_block_never_transmits_drive() {
        let params = ParameterSet::default();
        let blocked = parent(&params, Sex::Male, "DWAW", true, false);
        let drives = count(1000, |rng| {
            blocked.form_gamete1(&params, rng) == Locus1Allele::Drive
        });
        assert_eq!(drives, 0);
    }

    #[test]
    fn test_block_modifier_scales_efficiency() {
        let mut params = ParameterSet::default();
        params.anti_drive_efficiency_mod =
            GenotypeTable::new().with(Sex::Male, gt("DWAW"), 0.0);
        let unblocked = parent(&params, Sex::Male, "DWAW", true, true);
        let drives = count(500, |rng| {
            unblocked.form_gamete1(&params, rng) == Locus1Allele::Drive
        });
        assert_eq!(drives, 500);
    }

    #[test]
    fn test_failed_homing_yields_resistance_or_mendelian() {
        let mut params = ParameterSet::default();
        params.homing = SexSpecific::both(crate::simulation::HomingRates {
            from_father: Dist::constant(-1.0),
            from_mother: Dist::constant(-1.0),
            both: Dist::constant(-1.0),
        });
        params.resistance_efficiency = SexSpecific::both(0.5);
        let het = parent(&params, Sex::Female, "DWWW", false, true);

        let mut counts = [0usize; 3];
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(3);
        for _ in 0..8000 {
            match het.form_gamete1(&params, &mut rng) {
                Locus1Allele::Resistance => counts[0] += 1,
                Locus1Allele::Drive => counts[1] += 1,
                Locus1Allele::WildType => counts[2] += 1,
            }
        }
        // resistance 1/2, drive and wild-type 1/4 each
        assert!((3700..4300).contains(&counts[0]), "{counts:?}");
        assert!((1750..2250).contains(&counts[1]), "{counts:?}");
        assert!((1750..2250).contains(&counts[2]), "{counts:?}");
    }

    #[test]
    fn test_antidote_always_inherited_without_table_entry() {
        let params = ParameterSet::default();
        assert!(params.antidote_inheritance.is_empty());
        let het = parent(&params, Sex::Male, "WWAW", false, false);
        let antidotes = count(4000, |rng| {
            het.form_gamete2(&params, rng) == Locus2Allele::Antidote
        });
        assert_eq!(antidotes, 4000);
    }

    #[test]
    fn test_antidote_inheritance_table() {
        let mut params = ParameterSet::default();
        params.antidote_inheritance = GenotypeTable::new().with(Sex::Female, gt("WWAW"), 0.5);
        let biased = parent(&params, Sex::Female, "WWAW", false, false);
        let other_sex = parent(&params, Sex::Male, "WWAW", false, false);

        let antidotes = count(4000, |rng| {
            biased.form_gamete2(&params, rng) == Locus2Allele::Antidote
        });
        assert!((1800..2200).contains(&antidotes), "{antidotes}");

        // The female entry does not apply to males.
        let antidotes = count(500, |rng| {
            other_sex.form_gamete2(&params, rng) == Locus2Allele::Antidote
        });
        assert_eq!(antidotes, 500);
    }

    #[test]
    fn test_zero_antidote_inheritance_transmits_wild_type() {
        let mut params = ParameterSet::default();
        params.antidote_inheritance = GenotypeTable::new().with(Sex::Male, gt("DWAW"), 0.0);
        let het = parent(&params, Sex::Male, "DWAW", false, false);
        let wild = count(500, |rng| {
            het.form_gamete2(&params, rng) == Locus2Allele::WildType
        });
        assert_eq!(wild, 500);
    }
}
