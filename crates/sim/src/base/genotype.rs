//! Two-locus genotypes and their four-character codes.
//!
//! A locus is stored as a sorted pair of alleles, so `{W, D}` and `{D, W}`
//! are the same value and a homozygote is simply a pair of equal alleles.
//! The code of a genotype is locus 1 followed by locus 2, each pair written
//! in alphabetical order: `DWAW` is a drive heterozygote carrying one
//! antidote copy.

use super::allele::{Allele, Locus1Allele, Locus2Allele};
use crate::errors::GenotypeError;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Number of distinct two-locus genotypes (6 at locus 1 times 3 at locus 2).
pub const GENOTYPE_COUNT: usize = 18;

/// The two allele slots of a diploid locus, kept in sorted order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AllelePair<A: Allele> {
    first: A,
    second: A,
}

impl<A: Allele> AllelePair<A> {
    /// Create a pair from two alleles in any order.
    pub fn new(a: A, b: A) -> Self {
        if a <= b {
            Self { first: a, second: b }
        } else {
            Self { first: b, second: a }
        }
    }

    /// Create a homozygous pair.
    pub fn homozygous(allele: A) -> Self {
        Self {
            first: allele,
            second: allele,
        }
    }

    #[inline]
    pub fn first(&self) -> A {
        self.first
    }

    #[inline]
    pub fn second(&self) -> A {
        self.second
    }

    #[inline]
    pub fn is_homozygous(&self) -> bool {
        self.first == self.second
    }

    #[inline]
    pub fn contains(&self, allele: A) -> bool {
        self.first == allele || self.second == allele
    }

    /// For a heterozygote, the allele that is not `allele`.
    pub fn other_than(&self, allele: A) -> Option<A> {
        if self.first == allele && self.second != allele {
            Some(self.second)
        } else if self.second == allele && self.first != allele {
            Some(self.first)
        } else {
            None
        }
    }

    /// Fair Mendelian draw: the alphabetically first allele when `u < 0.5`.
    pub fn mendelian<R: Rng + ?Sized>(&self, rng: &mut R) -> A {
        if rng.random::<f64>() < 0.5 {
            self.first
        } else {
            self.second
        }
    }

    fn parse(locus: &str) -> Result<Self, GenotypeError> {
        let mut chars = locus.chars();
        let (Some(a), Some(b), None) = (chars.next(), chars.next(), chars.next()) else {
            return Err(GenotypeError::InvalidCode(locus.to_string()));
        };
        let parse_one = |c: char| {
            A::from_symbol(c).ok_or(GenotypeError::InvalidAllele {
                locus: A::LOCUS,
                allele: c,
            })
        };
        Ok(Self::new(parse_one(a)?, parse_one(b)?))
    }

    /// Every distinct pair, in code order.
    fn all() -> Vec<Self> {
        let mut pairs = Vec::new();
        for (i, &a) in A::ALL.iter().enumerate() {
            for &b in &A::ALL[i..] {
                pairs.push(Self::new(a, b));
            }
        }
        pairs
    }
}

impl<A: Allele> fmt::Display for AllelePair<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.first.symbol(), self.second.symbol())
    }
}

/// Full genotype at both loci.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Genotype {
    pub locus1: AllelePair<Locus1Allele>,
    pub locus2: AllelePair<Locus2Allele>,
}

impl Genotype {
    pub fn new(locus1: AllelePair<Locus1Allele>, locus2: AllelePair<Locus2Allele>) -> Self {
        Self { locus1, locus2 }
    }

    /// `WWWW`.
    pub fn wild_type() -> Self {
        Self::new(
            AllelePair::homozygous(Locus1Allele::WildType),
            AllelePair::homozygous(Locus2Allele::WildType),
        )
    }

    /// Both loci homozygous wild-type.
    pub fn is_wild_type(&self) -> bool {
        *self == Self::wild_type()
    }

    /// Any non wild-type allele at either locus.
    pub fn has_transgene(&self) -> bool {
        !self.is_wild_type()
    }

    #[inline]
    pub fn carries_drive(&self) -> bool {
        self.locus1.contains(Locus1Allele::Drive)
    }

    #[inline]
    pub fn carries_resistance(&self) -> bool {
        self.locus1.contains(Locus1Allele::Resistance)
    }

    #[inline]
    pub fn carries_antidote(&self) -> bool {
        self.locus2.contains(Locus2Allele::Antidote)
    }

    /// Locus 1 keeps at least one wild-type copy. DD, DR and RR are sterile.
    #[inline]
    pub fn is_functional(&self) -> bool {
        self.locus1.contains(Locus1Allele::WildType)
    }

    /// The four-character code, e.g. `DWAW`.
    pub fn code(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Genotype {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.locus1, self.locus2)
    }
}

impl FromStr for Genotype {
    type Err = GenotypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.chars().count() != 4 || !s.is_ascii() {
            return Err(GenotypeError::InvalidCode(s.to_string()));
        }
        Ok(Self::new(AllelePair::parse(&s[..2])?, AllelePair::parse(&s[2..])?))
    }
}

impl TryFrom<String> for Genotype {
    type Error = GenotypeError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Genotype> for String {
    fn from(genotype: Genotype) -> Self {
        genotype.code()
    }
}

/// All genotypes in code order (`DDAA`, `DDAW`, ..., `WWWW`).
pub fn all_genotypes() -> Vec<Genotype> {
    let locus2 = AllelePair::<Locus2Allele>::all();
    AllelePair::<Locus1Allele>::all()
        .into_iter()
        .flat_map(|l1| locus2.iter().map(move |&l2| Genotype::new(l1, l2)))
        .collect()
}
