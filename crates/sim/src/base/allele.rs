use serde::{Deserialize, Serialize};
use std::fmt;

/// Sex of an individual.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sex {
    Female,
    Male,
}

impl Sex {
    /// The single-letter code used in reports (`f` / `m`).
    pub fn code(self) -> char {
        match self {
            Sex::Female => 'f',
            Sex::Male => 'm',
        }
    }
}

impl fmt::Display for Sex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Developmental stage. The derived ordering is the developmental order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Stage {
    Egg,
    Larva,
    Pupa,
    Adult,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Egg => "egg",
            Stage::Larva => "larva",
            Stage::Pupa => "pupa",
            Stage::Adult => "adult",
        };
        f.write_str(name)
    }
}

/// An allele at one of the two modelled loci.
///
/// The `Ord` implementation must follow the alphabetical order of the
/// symbols so that genotype codes sort the same way as their letters.
pub trait Allele: Copy + Eq + Ord + fmt::Debug + 'static {
    /// Locus number used in error messages.
    const LOCUS: u8;
    /// Every allele of this locus, in symbol order.
    const ALL: &'static [Self];

    fn symbol(self) -> char;

    fn from_symbol(symbol: char) -> Option<Self> {
        Self::ALL.iter().copied().find(|a| a.symbol() == symbol)
    }
}

/// Locus 1 (the drive target).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Locus1Allele {
    Drive,
    Resistance,
    WildType,
}

impl Allele for Locus1Allele {
    const LOCUS: u8 = 1;
    const ALL: &'static [Self] = &[Self::Drive, Self::Resistance, Self::WildType];

    fn symbol(self) -> char {
        match self {
            Self::Drive => 'D',
            Self::Resistance => 'R',
            Self::WildType => 'W',
        }
    }
}

/// Locus 2 (presence or absence of the antidote).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Locus2Allele {
    Antidote,
    WildType,
}

impl Allele for Locus2Allele {
    const LOCUS: u8 = 2;
    const ALL: &'static [Self] = &[Self::Antidote, Self::WildType];

    fn symbol(self) -> char {
        match self {
            Self::Antidote => 'A',
            Self::WildType => 'W',
        }
    }
}
