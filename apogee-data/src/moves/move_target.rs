use serde_string_enum::{
    DeserializeLabeledStringEnum,
    SerializeLabeledStringEnum,
};

/// The acceptable target(s) of a move.
///
/// "Adjacent" means reachable. In doubles, every active Mon is adjacent to every other.
#[derive(
    Debug,
    Default,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    SerializeLabeledStringEnum,
    DeserializeLabeledStringEnum,
)]
pub enum MoveTarget {
    /// An adjacent ally.
    #[string = "AdjacentAlly"]
    AdjacentAlly,
    /// The user or its ally.
    #[string = "AdjacentAllyOrUser"]
    AdjacentAllyOrUser,
    /// An adjacent foe.
    #[string = "AdjacentFoe"]
    AdjacentFoe,
    /// All active Mons.
    #[string = "All"]
    All,
    /// All adjacent Mons, including allies.
    #[string = "AllAdjacent"]
    AllAdjacent,
    /// All adjacent foes.
    #[string = "AllAdjacentFoes"]
    AllAdjacentFoes,
    /// All active Mons on the user's side.
    #[string = "Allies"]
    Allies,
    /// The user's side.
    #[string = "AllySide"]
    AllySide,
    /// Any other active Mon.
    #[string = "Any"]
    Any,
    /// The field.
    #[string = "Field"]
    Field,
    /// The foe's side.
    #[string = "FoeSide"]
    FoeSide,
    /// One adjacent Mon of the user's choice.
    #[string = "Normal"]
    #[default]
    Normal,
    /// A random adjacent foe.
    #[string = "RandomNormal"]
    RandomNormal,
    /// The user.
    #[string = "User"]
    User,
}

impl MoveTarget {
    /// Can the user pick the target?
    pub fn choosable(&self) -> bool {
        matches!(
            self,
            Self::Normal
                | Self::Any
                | Self::AdjacentAlly
                | Self::AdjacentAllyOrUser
                | Self::AdjacentFoe
        )
    }

    /// Does the move hit multiple Mons at once?
    pub fn is_spread(&self) -> bool {
        matches!(self, Self::AllAdjacent | Self::AllAdjacentFoes)
    }

    /// Does the move affect Mons, as opposed to a side or the field?
    pub fn affects_mons_directly(&self) -> bool {
        !matches!(self, Self::AllySide | Self::FoeSide | Self::Field)
    }

    /// Can the move target an ally?
    pub fn can_target_ally(&self) -> bool {
        matches!(
            self,
            Self::AdjacentAlly | Self::AdjacentAllyOrUser | Self::Any | Self::Normal
        )
    }

    /// Can the move target a foe?
    pub fn can_target_foe(&self) -> bool {
        matches!(
            self,
            Self::AdjacentFoe | Self::Any | Self::Normal | Self::RandomNormal
        )
    }
}

#[cfg(test)]
mod move_target_test {
    use crate::{
        MoveTarget,
        test_util::test_string_deserialization,
    };

    #[test]
    fn deserializes_targets() {
        test_string_deserialization("Normal", MoveTarget::Normal);
        test_string_deserialization("allAdjacentFoes", MoveTarget::AllAdjacentFoes);
        test_string_deserialization("FoeSide", MoveTarget::FoeSide);
    }

    #[test]
    fn classifies_targets() {
        assert!(MoveTarget::Normal.choosable());
        assert!(!MoveTarget::AllAdjacentFoes.choosable());
        assert!(MoveTarget::AllAdjacentFoes.is_spread());
        assert!(!MoveTarget::FoeSide.affects_mons_directly());
        assert!(MoveTarget::User.affects_mons_directly());
        assert!(!MoveTarget::AdjacentFoe.can_target_ally());
    }
}
