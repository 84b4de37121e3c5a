use apogee_data::Id;
use indexmap::IndexMap;
use serde::{
    Deserialize,
    Serialize,
};

use crate::{
    battle::PlayerData,
    effect::EffectState,
};

/// Data about a single side of a battle.
///
/// A battle always takes place between two sides. Players on the same side are allies, while
/// players on opposite sides are foes.
///
/// Effects can be applied to an entire side of the battle, which impacts all Mons on that side.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SideData {
    /// Side name.
    pub name: String,
    /// Players participating on the side.
    pub players: Vec<PlayerData>,
}

/// A single side of a battle.
///
/// See [`SideData`] for details.
#[derive(Debug, Clone)]
pub struct Side {
    pub name: String,
    pub index: usize,
    /// The player on this side.
    pub player: usize,
    /// Conditions applied to the side, in the order they were applied.
    pub conditions: IndexMap<Id, EffectState>,
}

impl Side {
    pub fn new(name: String, index: usize, player: usize) -> Self {
        Self {
            name,
            index,
            player,
            conditions: IndexMap::new(),
        }
    }

    /// The index of the opposing side.
    pub fn foe_index(&self) -> usize {
        foe_side_index(self.index)
    }

    pub fn has_condition(&self, condition: &str) -> bool {
        self.conditions.contains_key(&Id::from(condition))
    }
}

/// The index of the side opposing the given side.
pub fn foe_side_index(side: usize) -> usize {
    1 - side.min(1)
}
