mod callbacks;
mod effect;
mod effect_state;
mod event;
pub mod library;
mod value;

pub use callbacks::{
    EffectLibrary,
    EventCallback,
    EventCallbackFn,
    EventHandlers,
};
pub use effect::{
    AppliedEffectLocation,
    EffectHandle,
};
pub use effect_state::EffectState;
pub use event::{
    BattleEvent,
    EventScope,
};
pub use value::Value;
