use apogee_data::Id;

use crate::{
    battle::MonHandle,
    effect::EffectHandle,
};

/// State attached to each applied effect.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct EffectState {
    /// Turns remaining. Decremented at the end of each turn, and the effect ends at zero.
    pub duration: Option<u8>,
    /// Turns the effect has been active.
    pub turns: u32,
    /// General-purpose counter, for effects that count something.
    pub counter: u32,
    /// The Mon that applied the effect.
    pub source: Option<MonHandle>,
    /// The effect that applied the effect.
    pub source_effect: Option<EffectHandle>,
    /// The side of the source Mon.
    pub source_side: Option<usize>,
    /// A volatile condition on another Mon that must end when this effect ends.
    pub linked: Option<(MonHandle, Id)>,
    /// An arbitrary stored ID, such as the move a Mon is locked into.
    pub stored: Option<Id>,
}

impl EffectState {
    pub fn new(
        source: Option<MonHandle>,
        source_side: Option<usize>,
        source_effect: Option<EffectHandle>,
    ) -> Self {
        Self {
            source,
            source_side,
            source_effect,
            ..Default::default()
        }
    }
}
