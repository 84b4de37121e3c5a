use anyhow::Error;
use hashbrown::HashMap;
use serde::{
    Deserialize,
    Serialize,
};
use serde_string_enum::{
    DeserializeLabeledStringEnum,
    SerializeLabeledStringEnum,
};

use crate::Stat;

/// A stat that can be boosted by stages.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    SerializeLabeledStringEnum,
    DeserializeLabeledStringEnum,
)]
pub enum Boost {
    #[string = "atk"]
    #[alias = "Attack"]
    Atk,
    #[string = "def"]
    #[alias = "Defense"]
    Def,
    #[string = "spa"]
    #[alias = "spatk"]
    SpAtk,
    #[string = "spd"]
    #[alias = "spdef"]
    SpDef,
    #[string = "spe"]
    #[alias = "Speed"]
    Spe,
    #[string = "acc"]
    #[alias = "Accuracy"]
    Accuracy,
    #[string = "eva"]
    #[alias = "Evasion"]
    Evasion,
}

impl Boost {
    /// All boosts, in table order.
    pub const ALL: [Boost; 7] = [
        Boost::Atk,
        Boost::Def,
        Boost::SpAtk,
        Boost::SpDef,
        Boost::Spe,
        Boost::Accuracy,
        Boost::Evasion,
    ];

    /// Name used in battle logs.
    pub fn log_name(&self) -> &'static str {
        match self {
            Self::Atk => "atk",
            Self::Def => "def",
            Self::SpAtk => "spa",
            Self::SpDef => "spd",
            Self::Spe => "spe",
            Self::Accuracy => "accuracy",
            Self::Evasion => "evasion",
        }
    }
}

impl TryFrom<Stat> for Boost {
    type Error = Error;
    fn try_from(value: Stat) -> Result<Self, Self::Error> {
        match value {
            Stat::HP => Err(Error::msg("HP cannot be boosted")),
            Stat::Atk => Ok(Self::Atk),
            Stat::Def => Ok(Self::Def),
            Stat::SpAtk => Ok(Self::SpAtk),
            Stat::SpDef => Ok(Self::SpDef),
            Stat::Spe => Ok(Self::Spe),
        }
    }
}

/// A sparse table of boosts, as written in data.
pub type PartialBoostTable = HashMap<Boost, i8>;

/// A full table of boost stages.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoostTable {
    #[serde(default)]
    pub atk: i8,
    #[serde(default)]
    pub def: i8,
    #[serde(default)]
    pub spa: i8,
    #[serde(default)]
    pub spd: i8,
    #[serde(default)]
    pub spe: i8,
    #[serde(default)]
    pub acc: i8,
    #[serde(default)]
    pub eva: i8,
}

impl BoostTable {
    /// Lowest stage a boost can reach.
    pub const MIN: i8 = -6;
    /// Highest stage a boost can reach.
    pub const MAX: i8 = 6;

    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the value for the given boost.
    pub fn get(&self, boost: Boost) -> i8 {
        match boost {
            Boost::Atk => self.atk,
            Boost::Def => self.def,
            Boost::SpAtk => self.spa,
            Boost::SpDef => self.spd,
            Boost::Spe => self.spe,
            Boost::Accuracy => self.acc,
            Boost::Evasion => self.eva,
        }
    }

    fn get_mut(&mut self, boost: Boost) -> &mut i8 {
        match boost {
            Boost::Atk => &mut self.atk,
            Boost::Def => &mut self.def,
            Boost::SpAtk => &mut self.spa,
            Boost::SpDef => &mut self.spd,
            Boost::Spe => &mut self.spe,
            Boost::Accuracy => &mut self.acc,
            Boost::Evasion => &mut self.eva,
        }
    }

    /// Sets the value for the given boost.
    pub fn set(&mut self, boost: Boost, value: i8) {
        *self.get_mut(boost) = value;
    }

    /// Iterates over every boost and its value.
    pub fn entries(&self) -> impl Iterator<Item = (Boost, i8)> + '_ {
        Boost::ALL.into_iter().map(|boost| (boost, self.get(boost)))
    }

    /// Iterates over every boost with a nonzero value.
    pub fn non_zero_entries(&self) -> impl Iterator<Item = (Boost, i8)> + '_ {
        self.entries().filter(|(_, value)| *value != 0)
    }

    /// Applies `delta` to the stage, clamping to [-6, 6].
    ///
    /// Returns the change that actually took effect, which may be 0.
    pub fn apply_clamped(&mut self, boost: Boost, delta: i8) -> i8 {
        let current = self.get(boost);
        let next = current.saturating_add(delta).clamp(Self::MIN, Self::MAX);
        self.set(boost, next);
        next - current
    }
}

impl From<&PartialBoostTable> for BoostTable {
    fn from(value: &PartialBoostTable) -> Self {
        let mut table = Self::default();
        for (boost, stage) in value {
            table.set(*boost, *stage);
        }
        table
    }
}

impl FromIterator<(Boost, i8)> for BoostTable {
    fn from_iter<T: IntoIterator<Item = (Boost, i8)>>(iter: T) -> Self {
        let mut table = Self::default();
        for (boost, value) in iter {
            table.set(boost, value);
        }
        table
    }
}
