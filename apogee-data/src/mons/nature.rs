use serde_string_enum::{
    DeserializeLabeledStringEnum,
    SerializeLabeledStringEnum,
};

use crate::Stat;

/// The nature of a Mon, which raises one stat by 10% and lowers another by 10%.
#[derive(
    Debug,
    Default,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    SerializeLabeledStringEnum,
    DeserializeLabeledStringEnum,
)]
pub enum Nature {
    #[string = "Hardy"]
    #[default]
    Hardy,
    #[string = "Lonely"]
    Lonely,
    #[string = "Brave"]
    Brave,
    #[string = "Adamant"]
    Adamant,
    #[string = "Naughty"]
    Naughty,
    #[string = "Bold"]
    Bold,
    #[string = "Docile"]
    Docile,
    #[string = "Relaxed"]
    Relaxed,
    #[string = "Impish"]
    Impish,
    #[string = "Lax"]
    Lax,
    #[string = "Timid"]
    Timid,
    #[string = "Hasty"]
    Hasty,
    #[string = "Serious"]
    Serious,
    #[string = "Jolly"]
    Jolly,
    #[string = "Naive"]
    Naive,
    #[string = "Modest"]
    Modest,
    #[string = "Mild"]
    Mild,
    #[string = "Quiet"]
    Quiet,
    #[string = "Bashful"]
    Bashful,
    #[string = "Rash"]
    Rash,
    #[string = "Calm"]
    Calm,
    #[string = "Gentle"]
    Gentle,
    #[string = "Sassy"]
    Sassy,
    #[string = "Careful"]
    Careful,
    #[string = "Quirky"]
    Quirky,
}

impl Nature {
    const STATS: [Stat; 5] = [Stat::Atk, Stat::Def, Stat::Spe, Stat::SpAtk, Stat::SpDef];

    fn index(&self) -> usize {
        *self as usize
    }

    /// The stat raised by this nature.
    ///
    /// Neutral natures raise and lower the same stat, so they report no change.
    pub fn boosts(&self) -> Option<Stat> {
        let (up, down) = (self.index() / 5, self.index() % 5);
        (up != down).then(|| Self::STATS[up])
    }

    /// The stat lowered by this nature.
    pub fn drops(&self) -> Option<Stat> {
        let (up, down) = (self.index() / 5, self.index() % 5);
        (up != down).then(|| Self::STATS[down])
    }
}
