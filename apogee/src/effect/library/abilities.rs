use anyhow::Result;
use apogee_data::{
    Boost,
    BoostTable,
    Id,
    MoveCategory,
    MoveFlag,
    Type,
};

use crate::{
    battle::{
        EventContext,
        core_battle_actions,
        core_battle_logs,
        foe_side_index,
    },
    effect::{
        BattleEvent,
        EffectHandle,
        EffectLibrary,
        EventHandlers,
        EventScope,
        Value,
        library::{
            ability,
            active_move_type,
            condition,
        },
    },
};

pub fn register(library: &mut EffectLibrary) {
    library.register(
        ability("intimidate"),
        EventHandlers::new().on(BattleEvent::SwitchIn, intimidate),
    );
    library.register(
        ability("levitate"),
        EventHandlers::new().on(BattleEvent::Immunity, levitate),
    );
    library.register(
        ability("technician"),
        EventHandlers::new().on(BattleEvent::BasePower, technician),
    );
    library.register(
        ability("adaptability"),
        EventHandlers::new().on(BattleEvent::ModifyStab, adaptability),
    );

    library.register(
        ability("drizzle"),
        EventHandlers::new().on(BattleEvent::SwitchIn, drizzle),
    );
    library.register(
        ability("drought"),
        EventHandlers::new().on(BattleEvent::SwitchIn, drought),
    );
    library.register(
        ability("sandstream"),
        EventHandlers::new().on(BattleEvent::SwitchIn, sand_stream),
    );
    library.register(
        ability("grassysurge"),
        EventHandlers::new().on(BattleEvent::SwitchIn, grassy_surge),
    );
    library.register(
        ability("swiftswim"),
        EventHandlers::new().on(BattleEvent::ModifySpe, swift_swim),
    );
    library.register(
        ability("chlorophyll"),
        EventHandlers::new().on(BattleEvent::ModifySpe, chlorophyll),
    );

    library.register(
        ability("mirrorarmor"),
        EventHandlers::new().on(BattleEvent::TryBoost, mirror_armor),
    );
    library.register(
        ability("clearbody"),
        EventHandlers::new().on(BattleEvent::TryBoost, clear_body),
    );
    library.register(
        ability("defiant"),
        EventHandlers::new().on(BattleEvent::AfterEachBoost, defiant),
    );
    library.register(
        ability("competitive"),
        EventHandlers::new().on(BattleEvent::AfterEachBoost, competitive),
    );

    library.register(
        ability("guts"),
        EventHandlers::new().on(BattleEvent::ModifyAtk, guts),
    );
    library.register(
        ability("noguard"),
        EventHandlers::new()
            .on(BattleEvent::AccuracyExempt, no_guard)
            .on_scope(BattleEvent::AccuracyExempt, EventScope::Source, no_guard),
    );
    library.register(
        ability("static"),
        EventHandlers::new().on(BattleEvent::DamagingHit, static_paralysis),
    );
    library.register(
        ability("blaze"),
        EventHandlers::new()
            .on(BattleEvent::ModifyAtk, blaze)
            .on(BattleEvent::ModifySpA, blaze),
    );
    library.register(
        ability("torrent"),
        EventHandlers::new()
            .on(BattleEvent::ModifyAtk, torrent)
            .on(BattleEvent::ModifySpA, torrent),
    );
    library.register(
        ability("overgrow"),
        EventHandlers::new()
            .on(BattleEvent::ModifyAtk, overgrow)
            .on(BattleEvent::ModifySpA, overgrow),
    );
    library.register(
        ability("prankster"),
        EventHandlers::new().on(BattleEvent::ModifyPriority, prankster),
    );
    library.register(
        ability("innerfocus"),
        EventHandlers::new().on(BattleEvent::TryAddVolatile, inner_focus),
    );
    library.register(
        ability("multiscale"),
        EventHandlers::new().on_scope(BattleEvent::ModifyDamage, EventScope::Source, multiscale),
    );
}

fn intimidate(context: &mut EventContext, _: Value) -> Result<Value> {
    let mon = context.holder()?;
    let effect = context.effect.clone();
    core_battle_logs::activate(context.context(), mon, &effect)?;
    let foe_side = foe_side_index(context.mon(mon)?.side);
    let foes = context
        .battle()
        .active_mons()
        .into_iter()
        .filter(|foe| {
            context
                .mon(*foe)
                .is_ok_and(|foe| foe.side == foe_side && foe.hp > 0)
        })
        .collect::<Vec<_>>();
    for foe in foes {
        core_battle_actions::boost(
            context.context(),
            foe,
            BoostTable::from_iter([(Boost::Atk, -1)]),
            Some(mon),
            Some(&effect),
        )?;
    }
    Ok(Value::Undefined)
}

fn levitate(_: &mut EventContext, value: Value) -> Result<Value> {
    if value.mon_type() == Some(Type::Ground) {
        return Ok(Value::Boolean(false));
    }
    Ok(Value::Undefined)
}

fn technician(context: &mut EventContext, value: Value) -> Result<Value> {
    if value.integer().is_some_and(|base_power| base_power <= 60) {
        context.chain_modify(3, 2)?;
    }
    Ok(Value::Undefined)
}

fn adaptability(_: &mut EventContext, value: Value) -> Result<Value> {
    match value.integer() {
        Some(6144) => Ok(Value::Integer(8192)),
        Some(8192) => Ok(Value::Integer(9216)),
        _ => Ok(Value::Undefined),
    }
}

fn start_weather(context: &mut EventContext, weather: &str) -> Result<Value> {
    let mon = context.holder()?;
    let effect = context.effect.clone();
    core_battle_actions::set_weather(
        context.context(),
        &Id::from(weather),
        Some(mon),
        Some(&effect),
    )?;
    Ok(Value::Undefined)
}

fn drizzle(context: &mut EventContext, _: Value) -> Result<Value> {
    start_weather(context, "raindance")
}

fn drought(context: &mut EventContext, _: Value) -> Result<Value> {
    start_weather(context, "sunnyday")
}

fn sand_stream(context: &mut EventContext, _: Value) -> Result<Value> {
    start_weather(context, "sandstorm")
}

fn grassy_surge(context: &mut EventContext, _: Value) -> Result<Value> {
    let mon = context.holder()?;
    let effect = context.effect.clone();
    core_battle_actions::set_terrain(
        context.context(),
        &Id::from("grassyterrain"),
        Some(mon),
        Some(&effect),
    )?;
    Ok(Value::Undefined)
}

fn swift_swim(context: &mut EventContext, _: Value) -> Result<Value> {
    if context.battle().field.has_weather("raindance") {
        context.chain_modify(2, 1)?;
    }
    Ok(Value::Undefined)
}

fn chlorophyll(context: &mut EventContext, _: Value) -> Result<Value> {
    if context.battle().field.has_weather("sunnyday") {
        context.chain_modify(2, 1)?;
    }
    Ok(Value::Undefined)
}

/// Splits stat drops applied by another Mon out of the table.
fn drops_from_foe(
    context: &EventContext,
    value: &Value,
) -> Result<Option<(BoostTable, BoostTable)>> {
    let mon = context.holder()?;
    let boosts = match value.boosts() {
        Some(boosts) => boosts,
        None => return Ok(None),
    };
    match context.source {
        Some(source) if source != mon => (),
        _ => return Ok(None),
    }
    let drops = boosts
        .non_zero_entries()
        .filter(|(_, stage)| *stage < 0)
        .collect::<BoostTable>();
    if drops.non_zero_entries().next().is_none() {
        return Ok(None);
    }
    let kept = boosts
        .non_zero_entries()
        .filter(|(_, stage)| *stage > 0)
        .collect::<BoostTable>();
    Ok(Some((kept, drops)))
}

/// Bounces stat drops back at the Mon that caused them.
fn mirror_armor(context: &mut EventContext, value: Value) -> Result<Value> {
    if context.source_effect.as_ref() == Some(&context.effect) {
        return Ok(Value::Undefined);
    }
    let (kept, drops) = match drops_from_foe(context, &value)? {
        Some(split) => split,
        None => return Ok(Value::Undefined),
    };
    let mon = context.holder()?;
    let effect = context.effect.clone();
    core_battle_logs::activate(context.context(), mon, &effect)?;
    if let Some(source) = context.source {
        if context.mon(source)?.is_active_and_alive() {
            core_battle_actions::boost(
                context.context(),
                source,
                drops,
                Some(mon),
                Some(&effect),
            )?;
        }
    }
    Ok(Value::Boosts(kept))
}

fn clear_body(context: &mut EventContext, value: Value) -> Result<Value> {
    let (kept, _) = match drops_from_foe(context, &value)? {
        Some(split) => split,
        None => return Ok(Value::Undefined),
    };
    // Secondary drops are blocked silently.
    let from_status_move = context
        .active_move()
        .is_ok_and(|active_move| active_move.data.category == MoveCategory::Status);
    if from_status_move || !context.source_effect.as_ref().is_some_and(EffectHandle::is_move) {
        let mon = context.holder()?;
        let effect = context.effect.clone();
        core_battle_logs::activate(context.context(), mon, &effect)?;
    }
    Ok(Value::Boosts(kept))
}

/// Raises a stat sharply when a foe lowers any stat.
fn boost_on_foe_drop(context: &mut EventContext, value: Value, raised: Boost) -> Result<Value> {
    match value {
        Value::Boost(_, applied) if applied < 0 => (),
        _ => return Ok(Value::Undefined),
    }
    let mon = context.holder()?;
    let foe_source = match context.source {
        Some(source) => context.mon(source)?.side != context.mon(mon)?.side,
        None => false,
    };
    if !foe_source {
        return Ok(Value::Undefined);
    }
    let effect = context.effect.clone();
    core_battle_actions::boost(
        context.context(),
        mon,
        BoostTable::from_iter([(raised, 2)]),
        Some(mon),
        Some(&effect),
    )?;
    Ok(Value::Undefined)
}

fn defiant(context: &mut EventContext, value: Value) -> Result<Value> {
    boost_on_foe_drop(context, value, Boost::Atk)
}

fn competitive(context: &mut EventContext, value: Value) -> Result<Value> {
    boost_on_foe_drop(context, value, Boost::SpAtk)
}

fn guts(context: &mut EventContext, _: Value) -> Result<Value> {
    let mon = context.holder()?;
    if context.mon(mon)?.status.is_some() {
        context.chain_modify(3, 2)?;
    }
    Ok(Value::Undefined)
}

fn no_guard(_: &mut EventContext, _: Value) -> Result<Value> {
    Ok(Value::Boolean(true))
}

fn static_paralysis(context: &mut EventContext, _: Value) -> Result<Value> {
    let mon = context.holder()?;
    let source = match context.source {
        Some(source) if source != mon => source,
        _ => return Ok(Value::Undefined),
    };
    if !context.active_move()?.data.has_flag(MoveFlag::Contact)
        || context.mon(source)?.hp == 0
        || !context.chance(3, 10)
    {
        return Ok(Value::Undefined);
    }
    let effect = context.effect.clone();
    core_battle_actions::set_status(
        context.context(),
        source,
        &Id::from("par"),
        Some(mon),
        Some(&effect),
    )?;
    Ok(Value::Undefined)
}

/// Boosts moves of one type while the holder is at a third of its HP or less.
fn pinch_boost(context: &mut EventContext, boosted: Type) -> Result<Value> {
    let mon = context.holder()?;
    let mon_data = context.mon(mon)?;
    let in_pinch = mon_data.hp as u32 * 3 <= mon_data.max_hp as u32;
    if in_pinch && active_move_type(context) == Some(boosted) {
        context.chain_modify(3, 2)?;
    }
    Ok(Value::Undefined)
}

fn blaze(context: &mut EventContext, _: Value) -> Result<Value> {
    pinch_boost(context, Type::Fire)
}

fn torrent(context: &mut EventContext, _: Value) -> Result<Value> {
    pinch_boost(context, Type::Water)
}

fn overgrow(context: &mut EventContext, _: Value) -> Result<Value> {
    pinch_boost(context, Type::Grass)
}

fn prankster(context: &mut EventContext, value: Value) -> Result<Value> {
    let status_move = context
        .active_move()
        .is_ok_and(|active_move| active_move.data.category == MoveCategory::Status);
    match value.integer() {
        Some(priority) if status_move => Ok(Value::Integer(priority + 1)),
        _ => Ok(Value::Undefined),
    }
}

fn inner_focus(_: &mut EventContext, value: Value) -> Result<Value> {
    if value.effect() == Some(&condition("flinch")) {
        return Ok(Value::Boolean(false));
    }
    Ok(Value::Undefined)
}

/// Halves damage taken at full HP.
fn multiscale(context: &mut EventContext, _: Value) -> Result<Value> {
    let mon = context.holder()?;
    let mon_data = context.mon(mon)?;
    if mon_data.hp == mon_data.max_hp {
        context.chain_modify(1, 2)?;
    }
    Ok(Value::Undefined)
}
