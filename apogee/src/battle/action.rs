use apogee_data::Id;

use crate::battle::{
    MonHandle,
    SpeedOrderable,
};

/// An action tied to a single Mon.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonAction {
    pub mon: MonHandle,
    pub player: usize,
    pub speed: u32,
}

/// A team order selected during team preview.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TeamAction {
    pub player: usize,
    /// Team indices, in the order they should be placed.
    ///
    /// Mons left out keep their relative order after the selected Mons.
    pub order: Vec<usize>,
}

/// A switch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SwitchAction {
    pub player: usize,
    /// The Mon switching in.
    pub mon: MonHandle,
    /// The active position being switched into.
    pub position: usize,
    /// Replaces a fainted or forced-out Mon, rather than being chosen for the turn.
    pub instant: bool,
    pub speed: u32,
}

/// A move.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MoveAction {
    pub id: Id,
    pub mon: MonHandle,
    pub player: usize,
    pub target: Option<isize>,
    pub priority: i32,
    pub speed: u32,
    /// The Mon Terastallizes this turn. Handled by its own action.
    pub tera: bool,
}

/// An action in the battle queue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// Starts the battle, switching in leads.
    Start,
    Team(TeamAction),
    Switch(SwitchAction),
    Terastallize(MonAction),
    Move(MoveAction),
    /// End-of-turn effects.
    Residual,
}

impl Action {
    /// The player that owns the action.
    pub fn player(&self) -> Option<usize> {
        match self {
            Self::Start | Self::Residual => None,
            Self::Team(action) => Some(action.player),
            Self::Switch(action) => Some(action.player),
            Self::Terastallize(action) => Some(action.player),
            Self::Move(action) => Some(action.player),
        }
    }

    /// Sets the speed used to order the action.
    pub fn set_speed(&mut self, speed: u32) {
        match self {
            Self::Switch(action) => action.speed = speed,
            Self::Terastallize(action) => action.speed = speed,
            Self::Move(action) => action.speed = speed,
            Self::Start | Self::Team(_) | Self::Residual => (),
        }
    }
}

impl SpeedOrderable for Action {
    fn order(&self) -> u32 {
        match self {
            Self::Team(_) => 1,
            Self::Start => 2,
            Self::Switch(action) if action.instant => 3,
            Self::Switch(_) => 100,
            Self::Terastallize(_) => 105,
            Self::Move(_) => 200,
            Self::Residual => 300,
        }
    }

    fn priority(&self) -> i32 {
        match self {
            Self::Move(action) => action.priority,
            _ => 0,
        }
    }

    fn sub_priority(&self) -> i32 {
        0
    }

    fn speed(&self) -> u32 {
        match self {
            Self::Switch(action) => action.speed,
            Self::Terastallize(action) => action.speed,
            Self::Move(action) => action.speed,
            Self::Start | Self::Team(_) | Self::Residual => 0,
        }
    }
}
