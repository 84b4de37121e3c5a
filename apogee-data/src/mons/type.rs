use std::fmt;

use ahash::HashMap;
use serde::{
    Deserialize,
    Serialize,
    de::Visitor,
};
use serde_string_enum::{
    DeserializeLabeledStringEnum,
    SerializeLabeledStringEnum,
};

/// The type of a species or move, which determines weaknesses and resistances.
#[derive(
    Debug,
    Default,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    SerializeLabeledStringEnum,
    DeserializeLabeledStringEnum,
)]
pub enum Type {
    #[string = "Normal"]
    #[default]
    Normal,
    #[string = "Fighting"]
    Fighting,
    #[string = "Flying"]
    Flying,
    #[string = "Poison"]
    Poison,
    #[string = "Ground"]
    Ground,
    #[string = "Rock"]
    Rock,
    #[string = "Bug"]
    Bug,
    #[string = "Ghost"]
    Ghost,
    #[string = "Steel"]
    Steel,
    #[string = "Fire"]
    Fire,
    #[string = "Water"]
    Water,
    #[string = "Grass"]
    Grass,
    #[string = "Electric"]
    Electric,
    #[string = "Psychic"]
    Psychic,
    #[string = "Ice"]
    Ice,
    #[string = "Dragon"]
    Dragon,
    #[string = "Dark"]
    Dark,
    #[string = "Fairy"]
    Fairy,
    /// Typeless, used by Struggle.
    #[string = "None"]
    None,
}

/// Effectiveness of one type against another.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum TypeEffectiveness {
    /// No effect.
    None,
    /// Not very effective.
    Weak,
    /// Normal effectiveness.
    #[default]
    Normal,
    /// Super effective.
    Strong,
}

impl TypeEffectiveness {
    /// The power-of-two exponent applied to damage.
    ///
    /// Immunity has no exponent, since it zeroes out damage entirely.
    pub fn exponent(&self) -> Option<i8> {
        match self {
            Self::None => None,
            Self::Weak => Some(-1),
            Self::Normal => Some(0),
            Self::Strong => Some(1),
        }
    }
}

impl From<f64> for TypeEffectiveness {
    fn from(value: f64) -> Self {
        if value < f64::EPSILON {
            Self::None
        } else if value < 0.5 + f64::EPSILON {
            Self::Weak
        } else if value < 1f64 + f64::EPSILON {
            Self::Normal
        } else {
            Self::Strong
        }
    }
}

impl Serialize for TypeEffectiveness {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        match self {
            Self::None => serializer.serialize_u8(0),
            Self::Weak => serializer.serialize_f64(0.5),
            Self::Normal => serializer.serialize_u8(1),
            Self::Strong => serializer.serialize_u8(2),
        }
    }
}

struct TypeEffectivenessVisitor;

impl<'de> Visitor<'de> for TypeEffectivenessVisitor {
    type Value = TypeEffectiveness;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter.write_str("one of the following values: 0, 0.5, 1, 2")
    }

    fn visit_i64<E>(self, v: i64) -> Result<Self::Value, E>
    where
        E: serde::de::Error,
    {
        Ok(Self::Value::from(v as f64))
    }

    fn visit_u64<E>(self, v: u64) -> Result<Self::Value, E>
    where
        E: serde::de::Error,
    {
        Ok(Self::Value::from(v as f64))
    }

    fn visit_f64<E>(self, v: f64) -> Result<Self::Value, E>
    where
        E: serde::de::Error,
    {
        Ok(Self::Value::from(v))
    }
}

impl<'de> Deserialize<'de> for TypeEffectiveness {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        deserializer.deserialize_any(TypeEffectivenessVisitor)
    }
}

/// Effectiveness of attacking types (outer key) against defending types (inner key).
pub type TypeTable = HashMap<Type, HashMap<Type, TypeEffectiveness>>;

/// The full type chart.
///
/// Missing entries are normal effectiveness.
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct TypeChart {
    pub types: TypeTable,
}

impl TypeChart {
    pub fn new() -> Self {
        Self::default()
    }

    /// Effectiveness of an attacking type against a single defending type.
    pub fn effectiveness(&self, attack: Type, defense: Type) -> TypeEffectiveness {
        self.types
            .get(&attack)
            .and_then(|row| row.get(&defense))
            .copied()
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod type_test {
    use crate::{
        Type,
        TypeChart,
        TypeEffectiveness,
        test_util::{
            test_deserialization,
            test_string_deserialization,
        },
    };

    #[test]
    fn deserializes_case_insensitive() {
        test_string_deserialization("fire", Type::Fire);
        test_string_deserialization("Dragon", Type::Dragon);
        test_string_deserialization("none", Type::None);
    }

    #[test]
    fn deserializes_effectiveness() {
        test_deserialization("0", TypeEffectiveness::None);
        test_deserialization("0.5", TypeEffectiveness::Weak);
        test_deserialization("1", TypeEffectiveness::Normal);
        test_deserialization("2", TypeEffectiveness::Strong);
    }

    #[test]
    fn looks_up_chart_with_default() {
        let chart = serde_json::from_str::<TypeChart>(
            r#"{
                "types": {
                    "Electric": { "Ground": 0, "Water": 2, "Grass": 0.5 }
                }
            }"#,
        )
        .unwrap();
        assert_eq!(
            chart.effectiveness(Type::Electric, Type::Ground),
            TypeEffectiveness::None
        );
        assert_eq!(
            chart.effectiveness(Type::Electric, Type::Water),
            TypeEffectiveness::Strong
        );
        assert_eq!(
            chart.effectiveness(Type::Electric, Type::Fire),
            TypeEffectiveness::Normal
        );
        assert_eq!(
            chart.effectiveness(Type::Fire, Type::Grass),
            TypeEffectiveness::Normal
        );
    }
}
