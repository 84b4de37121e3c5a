use ahash::HashSet;
use serde::{
    Deserialize,
    Serialize,
};
use serde_string_enum::{
    DeserializeLabeledStringEnum,
    SerializeLabeledStringEnum,
};

/// Item flags, which categorize items.
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
pub enum ItemFlag {
    /// A berry, consumed when triggered.
    #[string = "Berry"]
    Berry,
    /// Locks the holder into the first move it uses.
    #[string = "ChoiceLocking"]
    ChoiceLocking,
    /// Consumed when triggered.
    #[string = "SingleUse"]
    SingleUse,
}

/// Data about an item.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemData {
    /// Name of the item.
    pub name: String,
    /// Short description.
    #[serde(default)]
    pub description: String,
    /// Item flags.
    #[serde(default)]
    pub flags: HashSet<ItemFlag>,
}

impl ItemData {
    /// Does the item have the given flag?
    pub fn has_flag(&self, flag: ItemFlag) -> bool {
        self.flags.contains(&flag)
    }
}
