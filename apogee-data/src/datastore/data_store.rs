use anyhow::Result;

use crate::{
    AbilityData,
    ConditionData,
    Id,
    ItemData,
    MoveData,
    SpeciesData,
    TypeChart,
};

/// Read-only tables of all static battle data.
///
/// A battle receives one of these at construction and never mutates it, so a single store can back
/// many battles at once.
pub trait DataStore: Send + Sync {
    /// Gets all move IDs that pass the given filter.
    fn all_move_ids(&self, filter: &dyn Fn(&MoveData) -> bool) -> Result<Vec<Id>>;
    /// Gets the type chart.
    fn get_type_chart(&self) -> Result<TypeChart>;
    /// Translates an alias to its canonical ID, if the alias exists.
    fn translate_alias(&self, id: &Id) -> Result<Option<Id>>;
    /// Gets an ability by ID.
    fn get_ability(&self, id: &Id) -> Result<Option<AbilityData>>;
    /// Gets a condition by ID.
    fn get_condition(&self, id: &Id) -> Result<Option<ConditionData>>;
    /// Gets an item by ID.
    fn get_item(&self, id: &Id) -> Result<Option<ItemData>>;
    /// Gets a move by ID.
    fn get_move(&self, id: &Id) -> Result<Option<MoveData>>;
    /// Gets a species by ID.
    fn get_species(&self, id: &Id) -> Result<Option<SpeciesData>>;
}
