use std::sync::Arc;

use anyhow::Result;
use apogee_data::{
    AbilityData,
    ConditionData,
    DataStore,
    Id,
    ItemData,
    MoveData,
    SpeciesData,
    TypeChart,
};

use crate::{
    dex::{
        ResourceDex,
        ResourceLookup,
    },
    effect::EffectLibrary,
    error::WrapResultError,
};

macro_rules! resource_lookup {
    ($name:ident, $data:ty, $kind:literal, $method:ident) => {
        #[doc = concat!("Lookup for ", $kind, " data.")]
        pub struct $name;

        impl ResourceLookup for $name {
            type Data = $data;
            const KIND: &'static str = $kind;

            fn lookup(data: &dyn DataStore, id: &Id) -> Result<Option<Self::Data>> {
                data.$method(id)
            }
        }
    };
}

resource_lookup!(AbilityLookup, AbilityData, "ability", get_ability);
resource_lookup!(ConditionLookup, ConditionData, "condition", get_condition);
resource_lookup!(ItemLookup, ItemData, "item", get_item);
resource_lookup!(MoveLookup, MoveData, "move", get_move);
resource_lookup!(SpeciesLookup, SpeciesData, "species", get_species);

pub type AbilityDex<'d> = ResourceDex<'d, AbilityLookup>;
pub type ConditionDex<'d> = ResourceDex<'d, ConditionLookup>;
pub type ItemDex<'d> = ResourceDex<'d, ItemLookup>;
pub type MoveDex<'d> = ResourceDex<'d, MoveLookup>;
pub type SpeciesDex<'d> = ResourceDex<'d, SpeciesLookup>;

/// All static data available to a battle, plus the behavior bound to it.
#[derive(Clone)]
pub struct Dex<'d> {
    data: &'d dyn DataStore,
    pub abilities: AbilityDex<'d>,
    pub conditions: ConditionDex<'d>,
    pub items: ItemDex<'d>,
    pub moves: MoveDex<'d>,
    pub species: SpeciesDex<'d>,
    pub type_chart: TypeChart,
    pub library: Arc<EffectLibrary>,
}

impl<'d> Dex<'d> {
    pub fn new(data: &'d dyn DataStore, library: Arc<EffectLibrary>) -> Result<Self> {
        let type_chart = data
            .get_type_chart()
            .wrap_error_with_message("failed to read type chart")?;
        Ok(Self {
            data,
            abilities: AbilityDex::new(data),
            conditions: ConditionDex::new(data),
            items: ItemDex::new(data),
            moves: MoveDex::new(data),
            species: SpeciesDex::new(data),
            type_chart,
            library,
        })
    }

    /// The underlying data store.
    pub fn data(&self) -> &'d dyn DataStore {
        self.data
    }
}
