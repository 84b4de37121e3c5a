use apogee_data::Type;
use serde::{
    Deserialize,
    Serialize,
};

use crate::battle::MoveSlot;

/// What the battle is waiting on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum RequestState {
    /// The battle has not started, or is between phases.
    Pending,
    /// Both players must submit a choice.
    RequestingBoth,
    /// Only one player must submit a choice.
    RequestingPlayer(String),
    /// The battle ended with a winning side.
    Win(usize),
    /// The battle ended with no winner.
    Tie,
}

/// Request data for a single active Mon.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MonMoveRequest {
    pub team_position: usize,
    pub moves: Vec<MoveSlot>,
    pub trapped: bool,
    pub can_terastallize: bool,
    pub tera_type: Type,
}

/// A request for a player's choice.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type")]
pub enum Request {
    /// Select a team order.
    TeamPreview { max_team_size: usize },
    /// Select an action for each active position. Empty positions have no entry.
    Turn { active: Vec<Option<MonMoveRequest>> },
    /// Switch in a Mon at each listed position.
    Switch { needs_switch: Vec<usize> },
}
