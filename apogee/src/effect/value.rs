use apogee_data::{
    Boost,
    BoostTable,
    Fraction,
    Type,
};

use crate::{
    battle::MonHandle,
    effect::EffectHandle,
};

/// The value relayed through the handlers of an event.
///
/// Each handler receives the current value and may return a replacement. [`Value::Undefined`]
/// means the handler has no opinion.
#[derive(Debug, Default, Clone, PartialEq)]
pub enum Value {
    #[default]
    Undefined,
    Boolean(bool),
    Integer(i64),
    Fraction(Fraction),
    Boosts(BoostTable),
    /// A single stat change.
    Boost(Boost, i8),
    Types(Vec<Type>),
    Type(Type),
    Mon(MonHandle),
    Effect(EffectHandle),
}

impl Value {
    pub fn is_undefined(&self) -> bool {
        matches!(self, Self::Undefined)
    }

    /// Is the value an explicit `false`?
    pub fn is_false(&self) -> bool {
        matches!(self, Self::Boolean(false))
    }

    pub fn boolean(&self) -> Option<bool> {
        match self {
            Self::Boolean(value) => Some(*value),
            _ => None,
        }
    }

    pub fn integer(&self) -> Option<i64> {
        match self {
            Self::Integer(value) => Some(*value),
            _ => None,
        }
    }

    pub fn boosts(&self) -> Option<&BoostTable> {
        match self {
            Self::Boosts(boosts) => Some(boosts),
            _ => None,
        }
    }

    pub fn mon_type(&self) -> Option<Type> {
        match self {
            Self::Type(value) => Some(*value),
            _ => None,
        }
    }

    pub fn effect(&self) -> Option<&EffectHandle> {
        match self {
            Self::Effect(effect) => Some(effect),
            _ => None,
        }
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Self::Boolean(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl From<u32> for Value {
    fn from(value: u32) -> Self {
        Self::Integer(value as i64)
    }
}

impl From<BoostTable> for Value {
    fn from(value: BoostTable) -> Self {
        Self::Boosts(value)
    }
}

impl From<EffectHandle> for Value {
    fn from(value: EffectHandle) -> Self {
        Self::Effect(value)
    }
}
