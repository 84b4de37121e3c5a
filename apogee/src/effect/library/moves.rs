use anyhow::Result;
use apogee_data::Id;

use crate::{
    battle::{
        EventContext,
        core_battle_actions,
    },
    effect::{
        BattleEvent,
        EffectLibrary,
        EventHandlers,
        Value,
        library::mov,
    },
};

pub fn register(library: &mut EffectLibrary) {
    library.register(
        mov("protect"),
        EventHandlers::new()
            .on(BattleEvent::PrepareHit, stalling_move_prepare_hit)
            .on(BattleEvent::AfterMove, stalling_move_after_move),
    );
    library.register(
        mov("fakeout"),
        EventHandlers::new().on(BattleEvent::PrepareHit, fake_out),
    );
    library.register(
        mov("facade"),
        EventHandlers::new().on(BattleEvent::BasePower, facade),
    );
    library.register(
        mov("grassyglide"),
        EventHandlers::new().on(BattleEvent::ModifyPriority, grassy_glide),
    );
}

/// Each consecutive success triples the odds against the next one.
fn stalling_move_prepare_hit(context: &mut EventContext, _: Value) -> Result<Value> {
    let mon = context.holder()?;
    let counter = match context
        .mon(mon)?
        .volatiles
        .get(&Id::from("stall"))
        .map(|state| state.counter)
    {
        Some(counter) => counter,
        None => return Ok(Value::Undefined),
    };
    if context.chance(1, 3u64.pow(counter.min(6))) {
        return Ok(Value::Undefined);
    }
    core_battle_actions::remove_volatile(context.context(), mon, &Id::from("stall"))?;
    Ok(Value::Boolean(false))
}

fn stalling_move_after_move(context: &mut EventContext, _: Value) -> Result<Value> {
    let mon = context.holder()?;
    if !context.mon(mon)?.has_volatile("protect") {
        return Ok(Value::Undefined);
    }
    let effect = context.effect.clone();
    core_battle_actions::add_volatile(
        context.context(),
        mon,
        &Id::from("stall"),
        Some(mon),
        Some(&effect),
    )?;
    Ok(Value::Undefined)
}

/// Only works on the holder's first action after entering the field.
fn fake_out(context: &mut EventContext, _: Value) -> Result<Value> {
    let mon = context.holder()?;
    if context.mon(mon)?.active_move_actions > 1 {
        return Ok(Value::Boolean(false));
    }
    Ok(Value::Undefined)
}

fn facade(context: &mut EventContext, _: Value) -> Result<Value> {
    let mon = context.holder()?;
    if context.mon(mon)?.status.is_some() {
        context.chain_modify(2, 1)?;
    }
    Ok(Value::Undefined)
}

fn grassy_glide(context: &mut EventContext, value: Value) -> Result<Value> {
    let mon = context.holder()?;
    let boosted = context.battle().field.has_terrain("grassyterrain")
        && context.mon(mon)?.is_grounded();
    match value.integer() {
        Some(priority) if boosted => Ok(Value::Integer(priority + 1)),
        _ => Ok(Value::Undefined),
    }
}
