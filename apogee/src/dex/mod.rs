mod common;
mod dex;

pub use common::{
    ResourceDex,
    ResourceLookup,
};
pub use dex::{
    AbilityDex,
    ConditionDex,
    Dex,
    ItemDex,
    MoveDex,
    SpeciesDex,
};
