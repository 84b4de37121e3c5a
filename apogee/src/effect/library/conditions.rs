use anyhow::Result;
use apogee_data::{
    Id,
    MoveFlag,
    Stat,
    Type,
};

use crate::{
    battle::{
        EventContext,
        base_damage,
        core_battle_actions,
        core_battle_logs,
    },
    effect::{
        AppliedEffectLocation,
        BattleEvent,
        EffectLibrary,
        EventCallback,
        EventHandlers,
        EventScope,
        Value,
        library::{
            active_move_type,
            condition,
            max_hp_fraction,
        },
    },
    log_event,
};

pub fn register(library: &mut EffectLibrary) {
    library.register(
        condition("brn"),
        EventHandlers::new().with(
            BattleEvent::Residual,
            EventScope::Target,
            EventCallback::new(burn_residual).with_order(10),
        ),
    );
    library.register(
        condition("par"),
        EventHandlers::new()
            .on(BattleEvent::ModifySpe, paralysis_speed)
            .on(BattleEvent::BeforeMove, paralysis_before_move),
    );
    library.register(
        condition("psn"),
        EventHandlers::new().with(
            BattleEvent::Residual,
            EventScope::Target,
            EventCallback::new(poison_residual).with_order(9),
        ),
    );
    library.register(
        condition("tox"),
        EventHandlers::new()
            .with(
                BattleEvent::Residual,
                EventScope::Target,
                EventCallback::new(toxic_residual).with_order(9),
            )
            .on(BattleEvent::SwitchIn, reset_counter),
    );
    library.register(
        condition("slp"),
        EventHandlers::new()
            .on(BattleEvent::Start, sleep_start)
            .on(BattleEvent::BeforeMove, sleep_before_move),
    );
    library.register(
        condition("frz"),
        EventHandlers::new()
            .on(BattleEvent::BeforeMove, freeze_before_move)
            .on(BattleEvent::DamagingHit, freeze_damaging_hit),
    );

    library.register(
        condition("confusion"),
        EventHandlers::new()
            .on(BattleEvent::Start, confusion_start)
            .on(BattleEvent::BeforeMove, confusion_before_move),
    );
    library.register(
        condition("flinch"),
        EventHandlers::new().on(BattleEvent::BeforeMove, cant_move),
    );
    library.register(
        condition("protect"),
        EventHandlers::new()
            .on(BattleEvent::Start, protect_start)
            .on(BattleEvent::TryHit, protect_try_hit),
    );
    library.register(
        condition("stall"),
        EventHandlers::new()
            .on(BattleEvent::Start, stall_start)
            .on(BattleEvent::Restart, stall_restart),
    );
    library.register(
        condition("partiallytrapped"),
        EventHandlers::new()
            .on(BattleEvent::Duration, partially_trapped_duration)
            .on(BattleEvent::Start, partially_trapped_start)
            .on(BattleEvent::TrapMon, trapped)
            .with(
                BattleEvent::Residual,
                EventScope::Target,
                EventCallback::new(partially_trapped_residual).with_order(13),
            ),
    );
    library.register(
        condition("choicelock"),
        EventHandlers::new()
            .on(BattleEvent::Start, choice_lock_start)
            .on(BattleEvent::DisableMove, choice_lock_disable_move),
    );
}

fn residual_damage(context: &mut EventContext, denominator: u32) -> Result<Value> {
    let mon = context.holder()?;
    let amount = max_hp_fraction(context, mon, denominator)?;
    let effect = context.effect.clone();
    core_battle_actions::damage(context.context(), mon, amount, None, Some(&effect))?;
    Ok(Value::Undefined)
}

/// Logs that the holder cannot move, and stops the move.
fn cant_move(context: &mut EventContext, _: Value) -> Result<Value> {
    let mon = context.holder()?;
    let effect = context.effect.clone();
    core_battle_logs::cant(context.context(), mon, &effect)?;
    Ok(Value::Boolean(false))
}

fn trapped(_: &mut EventContext, _: Value) -> Result<Value> {
    Ok(Value::Boolean(true))
}

fn reset_counter(context: &mut EventContext, _: Value) -> Result<Value> {
    context.effect_state_mut()?.counter = 0;
    Ok(Value::Undefined)
}

fn burn_residual(context: &mut EventContext, _: Value) -> Result<Value> {
    residual_damage(context, 16)
}

fn paralysis_speed(context: &mut EventContext, _: Value) -> Result<Value> {
    context.chain_modify(1, 2)?;
    Ok(Value::Undefined)
}

fn paralysis_before_move(context: &mut EventContext, value: Value) -> Result<Value> {
    if context.chance(1, 4) {
        return cant_move(context, value);
    }
    Ok(Value::Undefined)
}

fn poison_residual(context: &mut EventContext, _: Value) -> Result<Value> {
    residual_damage(context, 8)
}

fn toxic_residual(context: &mut EventContext, _: Value) -> Result<Value> {
    let mon = context.holder()?;
    let state = context.effect_state_mut()?;
    state.counter = (state.counter + 1).min(15);
    let counter = state.counter;
    let amount = max_hp_fraction(context, mon, 16)? * counter;
    let effect = context.effect.clone();
    core_battle_actions::damage(context.context(), mon, amount, None, Some(&effect))?;
    Ok(Value::Undefined)
}

fn sleep_start(context: &mut EventContext, _: Value) -> Result<Value> {
    let turns = context.range(2, 5) as u32;
    context.effect_state_mut()?.counter = turns;
    Ok(Value::Undefined)
}

fn sleep_before_move(context: &mut EventContext, value: Value) -> Result<Value> {
    let mon = context.holder()?;
    let state = context.effect_state_mut()?;
    state.counter = state.counter.saturating_sub(1);
    if state.counter == 0 {
        core_battle_actions::cure_status(context.context(), mon)?;
        return Ok(Value::Undefined);
    }
    cant_move(context, value)
}

fn freeze_before_move(context: &mut EventContext, value: Value) -> Result<Value> {
    if context.chance(1, 5) {
        let mon = context.holder()?;
        core_battle_actions::cure_status(context.context(), mon)?;
        return Ok(Value::Undefined);
    }
    cant_move(context, value)
}

/// Fire moves thaw the target.
fn freeze_damaging_hit(context: &mut EventContext, _: Value) -> Result<Value> {
    if active_move_type(context) == Some(Type::Fire) {
        let mon = context.holder()?;
        core_battle_actions::cure_status(context.context(), mon)?;
    }
    Ok(Value::Undefined)
}

fn confusion_start(context: &mut EventContext, _: Value) -> Result<Value> {
    let turns = context.range(2, 6) as u32;
    context.effect_state_mut()?.counter = turns;
    Ok(Value::Undefined)
}

fn confusion_before_move(context: &mut EventContext, _: Value) -> Result<Value> {
    let mon = context.holder()?;
    let state = context.effect_state_mut()?;
    state.counter = state.counter.saturating_sub(1);
    if state.counter == 0 {
        core_battle_actions::remove_volatile(context.context(), mon, &Id::from("confusion"))?;
        return Ok(Value::Undefined);
    }

    let effect = context.effect.clone();
    core_battle_logs::activate(context.context(), mon, &effect)?;
    if !context.chance(1, 3) {
        return Ok(Value::Undefined);
    }

    // Hits itself with a typeless 40 base power physical attack.
    let mon_data = context.mon(mon)?;
    let damage = base_damage(
        mon_data.level,
        40,
        mon_data.boosted_stat(Stat::Atk),
        mon_data.boosted_stat(Stat::Def),
    );
    let damage = context
        .context()
        .battle_mut()
        .randomize_base_damage(damage)
        .max(1);
    core_battle_actions::damage(context.context(), mon, damage, None, Some(&effect))?;
    Ok(Value::Boolean(false))
}

fn protect_start(context: &mut EventContext, _: Value) -> Result<Value> {
    let mon = context.holder()?;
    let name = context.effect.name(context.dex())?;
    let event = log_event!(
        "singleturn",
        (
            "mon",
            core_battle_logs::mon_identity(context.battle(), mon)?
        ),
        ("move", name),
    );
    context.context().battle_mut().log.push(event);
    Ok(Value::Undefined)
}

fn protect_try_hit(context: &mut EventContext, _: Value) -> Result<Value> {
    let mon = context.holder()?;
    if context.source == Some(mon) {
        return Ok(Value::Undefined);
    }
    if !context.active_move()?.data.has_flag(MoveFlag::Protect) {
        return Ok(Value::Undefined);
    }
    let effect = context.effect.clone();
    core_battle_logs::activate(context.context(), mon, &effect)?;
    Ok(Value::Boolean(false))
}

fn stall_start(context: &mut EventContext, _: Value) -> Result<Value> {
    context.effect_state_mut()?.counter = 1;
    Ok(Value::Undefined)
}

/// Consecutive stalling moves grow less likely to succeed.
fn stall_restart(context: &mut EventContext, _: Value) -> Result<Value> {
    let duration = context.dex().conditions.get_by_id(context.effect.id())?.duration;
    let state = context.effect_state_mut()?;
    state.counter += 1;
    state.duration = duration;
    Ok(Value::Undefined)
}

fn partially_trapped_duration(context: &mut EventContext, _: Value) -> Result<Value> {
    Ok(Value::Integer(context.range(4, 6) as i64))
}

/// Locks the trapping Mon to its target, so that the trap ends if either leaves.
fn partially_trapped_start(context: &mut EventContext, _: Value) -> Result<Value> {
    let target = context.holder()?;
    let source = match context.source {
        Some(source) if source != target => source,
        _ => return Ok(Value::Undefined),
    };
    if !context.mon(source)?.is_active_and_alive() {
        return Ok(Value::Undefined);
    }
    let lock = Id::from("partialtrappinglock");
    let effect = context.effect.clone();
    if !core_battle_actions::add_volatile(
        context.context(),
        source,
        &lock,
        Some(target),
        Some(&effect),
    )? {
        return Ok(Value::Undefined);
    }
    context.effect_state_mut()?.linked = Some((source, lock.clone()));
    context
        .context()
        .battle_mut()
        .effect_state_mut(&AppliedEffectLocation::MonVolatile(source, lock))?
        .linked = Some((target, effect.id().clone()));
    Ok(Value::Undefined)
}

fn partially_trapped_residual(context: &mut EventContext, _: Value) -> Result<Value> {
    residual_damage(context, 8)
}

fn choice_lock_start(context: &mut EventContext, _: Value) -> Result<Value> {
    let locked = match context.active_move() {
        Ok(active_move) => active_move.id.clone(),
        Err(_) => return Ok(Value::Boolean(false)),
    };
    context.effect_state_mut()?.stored = Some(locked);
    Ok(Value::Undefined)
}

/// Disables every move but the locked one, for as long as a choice item is held.
fn choice_lock_disable_move(context: &mut EventContext, _: Value) -> Result<Value> {
    let mon = context.holder()?;
    let locked = context.effect_state()?.stored.clone();
    let mon_data = context.mon(mon)?;
    let holds_choice_item = ["choiceband", "choicescarf", "choicespecs"]
        .into_iter()
        .any(|item| mon_data.has_item(item));
    let locked = match locked {
        Some(locked) if holds_choice_item && mon_data.move_slot(&locked).is_some() => locked,
        _ => {
            core_battle_actions::remove_volatile(
                context.context(),
                mon,
                &Id::from("choicelock"),
            )?;
            return Ok(Value::Undefined);
        }
    };
    for slot in &mut context.mon_mut(mon)?.move_slots {
        if slot.id != locked {
            slot.disabled = true;
        }
    }
    Ok(Value::Undefined)
}
