use serde::{
    Deserialize,
    Serialize,
};

use crate::{
    StatTable,
    Type,
};

/// Data about a species.
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpeciesData {
    /// Name of the species.
    pub name: String,
    /// Primary type.
    pub primary_type: Type,
    /// Secondary type, if any.
    pub secondary_type: Option<Type>,
    /// Base stats.
    pub base_stats: StatTable,
    /// Abilities the species can have.
    #[serde(default)]
    pub abilities: Vec<String>,
    /// Weight in hectograms.
    #[serde(default)]
    pub weight: u32,
}

impl SpeciesData {
    /// The species' types, in order.
    pub fn types(&self) -> Vec<Type> {
        let mut types = vec![self.primary_type];
        if let Some(secondary) = self.secondary_type {
            if secondary != self.primary_type {
                types.push(secondary);
            }
        }
        types
    }
}
