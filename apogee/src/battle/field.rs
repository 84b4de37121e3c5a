use apogee_data::Id;
use indexmap::IndexMap;

use crate::effect::EffectState;

/// The battle field, which holds effects that apply to every Mon.
#[derive(Debug, Default, Clone)]
pub struct Field {
    pub weather: Option<Id>,
    pub weather_state: EffectState,
    pub terrain: Option<Id>,
    pub terrain_state: EffectState,
    /// Field conditions other than weather and terrain, in the order they were applied.
    pub pseudo_weathers: IndexMap<Id, EffectState>,
}

impl Field {
    pub fn has_weather(&self, weather: &str) -> bool {
        self.weather.as_ref().is_some_and(|id| id == &weather)
    }

    pub fn has_terrain(&self, terrain: &str) -> bool {
        self.terrain.as_ref().is_some_and(|id| id == &terrain)
    }

    pub fn has_pseudo_weather(&self, pseudo_weather: &str) -> bool {
        self.pseudo_weathers
            .contains_key(&Id::from(pseudo_weather))
    }
}
