mod boost;
mod nature;
mod species_data;
mod stat;
mod r#type;

pub use boost::{
    Boost,
    BoostTable,
    PartialBoostTable,
};
pub use nature::Nature;
pub use species_data::SpeciesData;
pub use stat::{
    PartialStatTable,
    Stat,
    StatTable,
};
pub use r#type::{
    Type,
    TypeChart,
    TypeEffectiveness,
    TypeTable,
};
