extern crate alloc;

pub mod battle;
pub mod common;
pub mod dex;
pub mod effect;
pub mod error;
pub mod log;
pub mod teams;

pub use battle::*;
pub use dex::Dex;
pub use effect::{
    BattleEvent,
    EffectHandle,
    EffectLibrary,
    EventScope,
    Value,
};
pub use teams::*;

pub use apogee_choice as choice;
pub use apogee_data as data;
pub use apogee_prng as prng;
