use serde_string_enum::{
    DeserializeLabeledStringEnum,
    SerializeLabeledStringEnum,
};

/// The type of a battle.
#[derive(
    Debug, Default, Clone, Copy, PartialEq, Eq, SerializeLabeledStringEnum, DeserializeLabeledStringEnum,
)]
pub enum BattleType {
    /// One Mon from each side battles at a time.
    #[string = "Singles"]
    #[default]
    Singles,
    /// Two Mons from each side battle at a time.
    #[string = "Doubles"]
    Doubles,
}

impl BattleType {
    /// The number of active Mons per player.
    pub fn active_per_player(&self) -> usize {
        match self {
            Self::Singles => 1,
            Self::Doubles => 2,
        }
    }
}

#[cfg(test)]
mod battle_type_test {
    use crate::battle::BattleType;

    #[test]
    fn serializes_to_label() {
        assert_eq!(
            serde_json::to_string(&BattleType::Doubles).unwrap(),
            r#""Doubles""#
        );
        assert_eq!(
            serde_json::from_str::<BattleType>(r#""singles""#).unwrap(),
            BattleType::Singles
        );
        assert_eq!(BattleType::Doubles.active_per_player(), 2);
    }
}
