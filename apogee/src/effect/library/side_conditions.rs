use anyhow::Result;
use apogee_data::MoveCategory;

use crate::{
    battle::{
        BattleType,
        EventContext,
    },
    effect::{
        BattleEvent,
        EffectLibrary,
        EventCallback,
        EventHandlers,
        EventScope,
        Value,
        library::{
            condition,
            timed,
        },
    },
};

pub fn register(library: &mut EffectLibrary) {
    library.register(
        condition("reflect"),
        EventHandlers::new()
            .on_scope(BattleEvent::ModifyDamage, EventScope::Foe, reflect)
            .with(
                BattleEvent::Residual,
                EventScope::Target,
                EventCallback::new(timed).with_order(26).with_sub_order(1),
            ),
    );
    library.register(
        condition("lightscreen"),
        EventHandlers::new()
            .on_scope(BattleEvent::ModifyDamage, EventScope::Foe, light_screen)
            .with(
                BattleEvent::Residual,
                EventScope::Target,
                EventCallback::new(timed).with_order(26).with_sub_order(2),
            ),
    );
    library.register(
        condition("tailwind"),
        EventHandlers::new()
            .on(BattleEvent::ModifySpe, tailwind_speed)
            .with(
                BattleEvent::Residual,
                EventScope::Target,
                EventCallback::new(timed).with_order(26).with_sub_order(5),
            ),
    );
}

/// Screens weaken non-critical hits of one category against the side they protect.
fn screen(context: &mut EventContext, category: MoveCategory) -> Result<()> {
    let defender = match context.source {
        Some(defender) => defender,
        None => return Ok(()),
    };
    if context.mon(defender)?.side != context.holder_side()? {
        return Ok(());
    }
    let active_move = context.active_move()?;
    if active_move.crit || active_move.data.category != category {
        return Ok(());
    }
    match context.battle().format.battle_type {
        BattleType::Singles => context.chain_modify(1, 2),
        BattleType::Doubles => context.chain_modify(2732, 4096),
    }
}

fn reflect(context: &mut EventContext, _: Value) -> Result<Value> {
    screen(context, MoveCategory::Physical)?;
    Ok(Value::Undefined)
}

fn light_screen(context: &mut EventContext, _: Value) -> Result<Value> {
    screen(context, MoveCategory::Special)?;
    Ok(Value::Undefined)
}

fn tailwind_speed(context: &mut EventContext, _: Value) -> Result<Value> {
    context.chain_modify(2, 1)?;
    Ok(Value::Undefined)
}
