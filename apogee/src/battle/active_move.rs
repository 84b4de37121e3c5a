use apogee_data::{
    Id,
    MoveData,
    Type,
};

use crate::battle::MonHandle;

/// A move being used, with state for a single execution.
///
/// Copied from the static move data so that handlers can change it without affecting any other
/// use of the move.
#[derive(Debug, Clone)]
pub struct ActiveMove {
    pub id: Id,
    pub data: MoveData,
    pub user: MonHandle,
    pub targets: Vec<MonHandle>,
    /// Priority of the move after modifiers.
    pub priority: i32,
    /// The move hit more than one target.
    pub spread: bool,
    /// The current hit is a critical hit.
    pub crit: bool,
    /// Type effectiveness exponent of the current hit.
    pub type_modifier: i8,
    /// Damage dealt across all targets.
    pub total_damage: u32,
}

impl ActiveMove {
    pub fn new(id: Id, data: MoveData, user: MonHandle) -> Self {
        let priority = data.priority as i32;
        Self {
            id,
            data,
            user,
            targets: Vec::new(),
            priority,
            spread: false,
            crit: false,
            type_modifier: 0,
            total_damage: 0,
        }
    }

    /// The type of the move, which is [`Type::None`] for typeless moves.
    pub fn move_type(&self) -> Type {
        if self.data.typeless {
            Type::None
        } else {
            self.data.primary_type
        }
    }
}
