use std::{
    fmt,
    fmt::Display,
};

use anyhow::Result;
use apogee_data::{
    ConditionType,
    Id,
};

use crate::{
    battle::MonHandle,
    dex::Dex,
};

/// A handle to an effect, which is anything in a battle that can respond to events.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum EffectHandle {
    Ability(Id),
    Condition(Id),
    Item(Id),
    Move(Id),
}

impl EffectHandle {
    pub fn id(&self) -> &Id {
        match self {
            Self::Ability(id) | Self::Condition(id) | Self::Item(id) | Self::Move(id) => id,
        }
    }

    pub fn is_move(&self) -> bool {
        matches!(self, Self::Move(_))
    }

    pub fn is_condition(&self, id: &str) -> bool {
        matches!(self, Self::Condition(condition) if condition == &id)
    }

    /// The display name of the effect.
    pub fn name(&self, dex: &Dex) -> Result<String> {
        match self {
            Self::Ability(id) => Ok(dex.abilities.get_by_id(id)?.name.clone()),
            Self::Condition(id) => Ok(dex.conditions.get_by_id(id)?.name.clone()),
            Self::Item(id) => Ok(dex.items.get_by_id(id)?.name.clone()),
            Self::Move(id) => Ok(dex.moves.get_by_id(id)?.name.clone()),
        }
    }

    /// The name of the effect qualified by its type, as it appears in `from` log properties.
    pub fn full_name(&self, dex: &Dex) -> Result<String> {
        let name = self.name(dex)?;
        let prefix = match self {
            Self::Ability(_) => "ability",
            Self::Item(_) => "item",
            Self::Move(_) => "move",
            Self::Condition(id) => match dex.conditions.get_by_id(id)?.condition_type {
                ConditionType::Status => "status",
                ConditionType::Weather => "weather",
                _ => "condition",
            },
        };
        Ok(format!("{prefix}:{name}"))
    }
}

impl Display for EffectHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ability(id) => write!(f, "ability:{id}"),
            Self::Condition(id) => write!(f, "condition:{id}"),
            Self::Item(id) => write!(f, "item:{id}"),
            Self::Move(id) => write!(f, "move:{id}"),
        }
    }
}

/// The location of an applied effect, which is an effect that is active in a battle.
///
/// Used to find the effect's state and to check that the effect is still applied.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum AppliedEffectLocation {
    MonAbility(MonHandle),
    MonItem(MonHandle),
    MonStatus(MonHandle),
    MonVolatile(MonHandle, Id),
    SideCondition(usize, Id),
    Weather,
    Terrain,
    PseudoWeather(Id),
    /// The move currently being used.
    ActiveMove,
}

impl AppliedEffectLocation {
    /// The Mon the effect is attached to, if any.
    pub fn mon_handle(&self) -> Option<MonHandle> {
        match self {
            Self::MonAbility(mon)
            | Self::MonItem(mon)
            | Self::MonStatus(mon)
            | Self::MonVolatile(mon, _) => Some(*mon),
            _ => None,
        }
    }

    /// The side the effect is attached to, if any.
    pub fn side_index(&self) -> Option<usize> {
        match self {
            Self::SideCondition(side, _) => Some(*side),
            _ => None,
        }
    }

    /// Default sub-order for effects at this location, used to order handlers that tie on
    /// priority.
    pub fn default_sub_order(&self) -> u32 {
        match self {
            Self::ActiveMove => 0,
            Self::MonStatus(_) | Self::MonVolatile(_, _) => 2,
            Self::SideCondition(_, _) | Self::Terrain | Self::PseudoWeather(_) => 2,
            Self::Weather => 5,
            Self::MonAbility(_) => 7,
            Self::MonItem(_) => 8,
        }
    }
}

#[cfg(test)]
mod effect_test {
    use std::sync::Arc;

    use apogee_data::{
        Id,
        LocalDataStore,
    };
    use pretty_assertions::assert_eq;

    use crate::{
        dex::Dex,
        effect::{
            EffectHandle,
            EffectLibrary,
        },
    };

    #[test]
    fn qualifies_names_by_type() {
        let data = LocalDataStore::new(concat!(env!("CARGO_MANIFEST_DIR"), "/../data")).unwrap();
        let dex = Dex::new(&data, Arc::new(EffectLibrary::new())).unwrap();
        assert_eq!(
            EffectHandle::Item(Id::from("lifeorb"))
                .full_name(&dex)
                .unwrap(),
            "item:Life Orb"
        );
        assert_eq!(
            EffectHandle::Condition(Id::from("brn"))
                .full_name(&dex)
                .unwrap(),
            "status:Burn"
        );
        assert_eq!(
            EffectHandle::Condition(Id::from("sandstorm"))
                .full_name(&dex)
                .unwrap(),
            "weather:Sandstorm"
        );
        assert_eq!(
            EffectHandle::Condition(Id::from("confusion"))
                .full_name(&dex)
                .unwrap(),
            "condition:Confusion"
        );
        assert_eq!(
            EffectHandle::Ability(Id::from("No Guard"))
                .full_name(&dex)
                .unwrap(),
            "ability:No Guard"
        );
    }
}
