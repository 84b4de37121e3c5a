mod accuracy;
mod move_data;
mod move_flag;
mod move_target;

pub use accuracy::Accuracy;
pub use move_data::{
    HitEffect,
    MoveCategory,
    MoveData,
    SecondaryEffectData,
};
pub use move_flag::MoveFlag;
pub use move_target::MoveTarget;
