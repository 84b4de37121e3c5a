use anyhow::Result;
use apogee_data::{
    Id,
    Type,
};

use crate::{
    battle::{
        EventContext,
        core_battle_actions,
        core_battle_logs,
    },
    effect::{
        BattleEvent,
        EffectHandle,
        EffectLibrary,
        EventCallback,
        EventHandlers,
        EventScope,
        Value,
        library::{
            active_move_type,
            condition,
            max_hp_fraction,
            timed,
        },
    },
    log_event,
};

pub fn register(library: &mut EffectLibrary) {
    library.register(
        condition("raindance"),
        EventHandlers::new()
            .on(BattleEvent::WeatherModifyDamage, rain_modify_damage)
            .with(
                BattleEvent::Residual,
                EventScope::Target,
                EventCallback::new(weather_residual).with_order(1),
            ),
    );
    library.register(
        condition("sunnyday"),
        EventHandlers::new()
            .on(BattleEvent::WeatherModifyDamage, sun_modify_damage)
            .with(
                BattleEvent::Residual,
                EventScope::Target,
                EventCallback::new(weather_residual).with_order(1),
            ),
    );
    library.register(
        condition("sandstorm"),
        EventHandlers::new()
            .on(BattleEvent::ModifySpD, sandstorm_modify_spd)
            .with(
                BattleEvent::Residual,
                EventScope::Target,
                EventCallback::new(sandstorm_residual).with_order(1),
            ),
    );

    library.register(
        condition("electricterrain"),
        EventHandlers::new()
            .on(BattleEvent::SetStatus, electric_terrain_set_status)
            .on(BattleEvent::BasePower, electric_terrain_base_power)
            .with(
                BattleEvent::Residual,
                EventScope::Target,
                EventCallback::new(timed).with_order(27).with_sub_order(7),
            ),
    );
    library.register(
        condition("grassyterrain"),
        EventHandlers::new()
            .on(BattleEvent::BasePower, grassy_terrain_base_power)
            .with(
                BattleEvent::Residual,
                EventScope::Target,
                EventCallback::new(grassy_terrain_residual)
                    .with_order(5)
                    .with_sub_order(2),
            ),
    );
    library.register(
        condition("psychicterrain"),
        EventHandlers::new()
            .on(BattleEvent::BasePower, psychic_terrain_base_power)
            .on(BattleEvent::TryHit, psychic_terrain_try_hit)
            .with(
                BattleEvent::Residual,
                EventScope::Target,
                EventCallback::new(timed).with_order(27).with_sub_order(7),
            ),
    );

    library.register(
        condition("trickroom"),
        EventHandlers::new()
            .on(BattleEvent::Restart, trick_room_restart)
            .with(
                BattleEvent::Residual,
                EventScope::Target,
                EventCallback::new(timed).with_order(27).with_sub_order(1),
            ),
    );
}

fn weather_modify_damage(context: &mut EventContext, boosted: Type, weakened: Type) -> Result<()> {
    match active_move_type(context) {
        Some(typ) if typ == boosted => context.chain_modify(3, 2),
        Some(typ) if typ == weakened => context.chain_modify(1, 2),
        _ => Ok(()),
    }
}

fn rain_modify_damage(context: &mut EventContext, _: Value) -> Result<Value> {
    weather_modify_damage(context, Type::Water, Type::Fire)?;
    Ok(Value::Undefined)
}

fn sun_modify_damage(context: &mut EventContext, _: Value) -> Result<Value> {
    weather_modify_damage(context, Type::Fire, Type::Water)?;
    Ok(Value::Undefined)
}

fn weather_residual(context: &mut EventContext, _: Value) -> Result<Value> {
    let name = context.effect.name(context.dex())?;
    let event = log_event!("weather", ("weather", name), "residual");
    context.context().battle_mut().log.push(event);
    Ok(Value::Undefined)
}

fn sandstorm_modify_spd(context: &mut EventContext, _: Value) -> Result<Value> {
    let target = context.target_mon()?;
    if context.mon(target)?.has_type(Type::Rock) {
        context.chain_modify(3, 2)?;
    }
    Ok(Value::Undefined)
}

fn sandstorm_residual(context: &mut EventContext, value: Value) -> Result<Value> {
    weather_residual(context, value)?;
    let effect = context.effect.clone();
    for mon in context.battle().active_mons() {
        let mon_data = context.mon(mon)?;
        if mon_data.hp == 0
            || [Type::Rock, Type::Ground, Type::Steel]
                .into_iter()
                .any(|typ| mon_data.has_type(typ))
        {
            continue;
        }
        let amount = max_hp_fraction(context, mon, 16)?;
        core_battle_actions::damage(context.context(), mon, amount, None, Some(&effect))?;
    }
    Ok(Value::Undefined)
}

/// Terrain boosts apply to moves from grounded users.
fn terrain_base_power(context: &mut EventContext, boosted: Type) -> Result<()> {
    let user = context.target_mon()?;
    if active_move_type(context) == Some(boosted) && context.mon(user)?.is_grounded() {
        context.chain_modify(5325, 4096)?;
    }
    Ok(())
}

/// Grounded Mons cannot fall asleep.
fn electric_terrain_set_status(context: &mut EventContext, value: Value) -> Result<Value> {
    let target = context.target_mon()?;
    if !context.mon(target)?.is_grounded() {
        return Ok(Value::Undefined);
    }
    let sleep = matches!(value.effect(), Some(EffectHandle::Condition(id)) if id == &"slp");
    if !sleep {
        return Ok(Value::Undefined);
    }
    let effect = context.effect.clone();
    core_battle_logs::activate(context.context(), target, &effect)?;
    Ok(Value::Boolean(false))
}

fn electric_terrain_base_power(context: &mut EventContext, _: Value) -> Result<Value> {
    terrain_base_power(context, Type::Electric)?;
    Ok(Value::Undefined)
}

fn grassy_terrain_base_power(context: &mut EventContext, _: Value) -> Result<Value> {
    terrain_base_power(context, Type::Grass)?;
    let weakened = context
        .active_move()
        .is_ok_and(|active_move| active_move.id == "earthquake");
    if let Some(defender) = context.source {
        if weakened && context.mon(defender)?.is_grounded() {
            context.chain_modify(1, 2)?;
        }
    }
    Ok(Value::Undefined)
}

fn grassy_terrain_residual(context: &mut EventContext, _: Value) -> Result<Value> {
    let effect = context.effect.clone();
    for mon in context.battle().active_mons() {
        let mon_data = context.mon(mon)?;
        if mon_data.hp == 0 || !mon_data.is_grounded() {
            continue;
        }
        let amount = max_hp_fraction(context, mon, 16)?;
        core_battle_actions::heal(context.context(), mon, amount, Some(&effect))?;
    }
    Ok(Value::Undefined)
}

fn psychic_terrain_base_power(context: &mut EventContext, _: Value) -> Result<Value> {
    terrain_base_power(context, Type::Psychic)?;
    Ok(Value::Undefined)
}

/// Grounded Mons are protected from priority moves used by their foes.
fn psychic_terrain_try_hit(context: &mut EventContext, _: Value) -> Result<Value> {
    let target = context.target_mon()?;
    let source = match context.source {
        Some(source) => source,
        None => return Ok(Value::Undefined),
    };
    if context.active_move()?.priority <= 0
        || context.mon(source)?.side == context.mon(target)?.side
        || !context.mon(target)?.is_grounded()
    {
        return Ok(Value::Undefined);
    }
    let effect = context.effect.clone();
    core_battle_logs::activate(context.context(), target, &effect)?;
    Ok(Value::Boolean(false))
}

/// Using Trick Room again ends it.
fn trick_room_restart(context: &mut EventContext, _: Value) -> Result<Value> {
    core_battle_actions::remove_pseudo_weather(context.context(), &Id::from("trickroom"))?;
    Ok(Value::Undefined)
}
