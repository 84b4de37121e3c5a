//! Built-in behavior for the effects in the bundled data.
//!
//! Effects are keyed by ID. Any effect without an entry here is inert, which keeps data-only
//! effects (most moves, for instance) free of boilerplate.

mod abilities;
mod conditions;
mod field;
mod items;
mod moves;
mod side_conditions;

use anyhow::Result;
use apogee_data::{
    Id,
    Type,
};

use crate::{
    battle::{
        EventContext,
        MonHandle,
    },
    effect::{
        EffectHandle,
        EffectLibrary,
        Value,
    },
};

/// Registers every built-in effect.
pub fn register_all(library: &mut EffectLibrary) {
    conditions::register(library);
    field::register(library);
    side_conditions::register(library);
    abilities::register(library);
    items::register(library);
    moves::register(library);
}

fn ability(name: &str) -> EffectHandle {
    EffectHandle::Ability(Id::from(name))
}

fn condition(name: &str) -> EffectHandle {
    EffectHandle::Condition(Id::from(name))
}

fn item(name: &str) -> EffectHandle {
    EffectHandle::Item(Id::from(name))
}

fn mov(name: &str) -> EffectHandle {
    EffectHandle::Move(Id::from(name))
}

/// Residual handler for timed effects that only need a place in the end-of-turn order.
fn timed(_: &mut EventContext, _: Value) -> Result<Value> {
    Ok(Value::Undefined)
}

/// `1 / denominator` of the Mon's max HP, never less than 1.
fn max_hp_fraction(context: &EventContext, mon: MonHandle, denominator: u32) -> Result<u32> {
    Ok((context.mon(mon)?.max_hp as u32 / denominator).max(1))
}

/// The type of the move being used, if a move is being used.
fn active_move_type(context: &EventContext) -> Option<Type> {
    context
        .active_move()
        .ok()
        .map(|active_move| active_move.move_type())
}
