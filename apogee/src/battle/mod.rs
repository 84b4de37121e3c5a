mod action;
mod active_move;
mod battle;
mod battle_options;
mod battle_type;
mod calculations;
mod context;
mod core_battle;
pub mod core_battle_actions;
pub mod core_battle_effects;
pub mod core_battle_logs;
mod field;
mod mon;
mod player;
mod queue;
mod request;
mod side;
mod speed_order;

pub use action::{
    Action,
    MonAction,
    MoveAction,
    SwitchAction,
    TeamAction,
};
pub use active_move::ActiveMove;
pub use battle::{
    Battle,
    IntoChoices,
};
pub use battle_options::{
    CoreBattleEngineOptions,
    CoreBattleEngineRandomizeBaseDamage,
    CoreBattleEngineSpeedSortTieResolution,
    CoreBattleOptions,
    FormatData,
};
pub use battle_type::BattleType;
pub use calculations::{
    accuracy_with_stage,
    apply_nature_to_stats,
    base_damage,
    boosted_stat,
    calculate_mon_stats,
    crit_chance_denominator,
};
pub use context::{
    Context,
    EventContext,
    EventTarget,
};
pub use core_battle::CoreBattle;
pub use field::Field;
pub use mon::{
    Mon,
    MonHandle,
    MoveSlot,
};
pub use player::{
    Player,
    PlayerData,
    PlayerState,
};
pub use queue::BattleQueue;
pub use request::{
    MonMoveRequest,
    Request,
    RequestState,
};
pub use side::{
    Side,
    SideData,
    foe_side_index,
};
pub use speed_order::{
    SpeedOrderable,
    compare_priority,
    sort_with_random_ties,
    speed_sort,
};
