use anyhow::Result;
use apogee_data::{
    Id,
    MoveCategory,
};

use crate::{
    battle::{
        EventContext,
        MonHandle,
        core_battle_actions,
        core_battle_logs,
    },
    effect::{
        BattleEvent,
        EffectLibrary,
        EffectState,
        EventCallback,
        EventHandlers,
        EventScope,
        Value,
        library::{
            item,
            max_hp_fraction,
        },
    },
    log_event,
};

pub fn register(library: &mut EffectLibrary) {
    library.register(
        item("lifeorb"),
        EventHandlers::new()
            .on(BattleEvent::ModifyDamage, life_orb_damage)
            .on(BattleEvent::AfterMove, life_orb_recoil),
    );
    library.register(
        item("expertbelt"),
        EventHandlers::new().on(BattleEvent::ModifyDamage, expert_belt),
    );
    library.register(
        item("choiceband"),
        EventHandlers::new()
            .on(BattleEvent::ModifyAtk, choice_boost)
            .on(BattleEvent::AfterMove, choice_lock),
    );
    library.register(
        item("choicespecs"),
        EventHandlers::new()
            .on(BattleEvent::ModifySpA, choice_boost)
            .on(BattleEvent::AfterMove, choice_lock),
    );
    library.register(
        item("choicescarf"),
        EventHandlers::new()
            .on(BattleEvent::ModifySpe, choice_boost)
            .on(BattleEvent::AfterMove, choice_lock),
    );
    library.register(
        item("leftovers"),
        EventHandlers::new().with(
            BattleEvent::Residual,
            EventScope::Target,
            EventCallback::new(leftovers).with_order(5).with_sub_order(4),
        ),
    );
    library.register(
        item("sitrusberry"),
        EventHandlers::new().on(BattleEvent::Update, sitrus_berry),
    );
    library.register(
        item("assaultvest"),
        EventHandlers::new()
            .on(BattleEvent::ModifySpD, assault_vest_spd)
            .on(BattleEvent::DisableMove, assault_vest_disable_move),
    );
    library.register(
        item("focussash"),
        EventHandlers::new().on(BattleEvent::Damage, focus_sash),
    );
}

/// Removes the holder's item for good, logging how it was used up.
fn consume_item(context: &mut EventContext, mon: MonHandle, how: Option<&str>) -> Result<()> {
    let name = context.effect.name(context.dex())?;
    let mon_data = context.mon_mut(mon)?;
    mon_data.item = None;
    mon_data.item_state = EffectState::default();
    let mut event = log_event!(
        "enditem",
        (
            "mon",
            core_battle_logs::mon_identity(context.battle(), mon)?
        ),
        ("item", name),
    );
    if let Some(how) = how {
        event.add_flag(how);
    }
    context.context().battle_mut().log.push(event);
    Ok(())
}

fn life_orb_damage(context: &mut EventContext, _: Value) -> Result<Value> {
    context.chain_modify(5324, 4096)?;
    Ok(Value::Undefined)
}

fn life_orb_recoil(context: &mut EventContext, _: Value) -> Result<Value> {
    let mon = context.holder()?;
    if context.active_move()?.total_damage == 0 || context.mon(mon)?.hp == 0 {
        return Ok(Value::Undefined);
    }
    let amount = max_hp_fraction(context, mon, 10)?;
    let effect = context.effect.clone();
    core_battle_actions::damage(context.context(), mon, amount, None, Some(&effect))?;
    Ok(Value::Undefined)
}

fn expert_belt(context: &mut EventContext, _: Value) -> Result<Value> {
    if context.active_move()?.type_modifier > 0 {
        context.chain_modify(4915, 4096)?;
    }
    Ok(Value::Undefined)
}

fn choice_boost(context: &mut EventContext, _: Value) -> Result<Value> {
    context.chain_modify(3, 2)?;
    Ok(Value::Undefined)
}

/// Locks the holder into the move it just used.
fn choice_lock(context: &mut EventContext, _: Value) -> Result<Value> {
    let mon = context.holder()?;
    if context.active_move()?.id == "struggle" || context.mon(mon)?.hp == 0 {
        return Ok(Value::Undefined);
    }
    let effect = context.effect.clone();
    core_battle_actions::add_volatile(
        context.context(),
        mon,
        &Id::from("choicelock"),
        Some(mon),
        Some(&effect),
    )?;
    Ok(Value::Undefined)
}

fn leftovers(context: &mut EventContext, _: Value) -> Result<Value> {
    let mon = context.holder()?;
    let amount = max_hp_fraction(context, mon, 16)?;
    let effect = context.effect.clone();
    core_battle_actions::heal(context.context(), mon, amount, Some(&effect))?;
    Ok(Value::Undefined)
}

/// Eaten at half HP or less to restore a quarter of max HP.
fn sitrus_berry(context: &mut EventContext, _: Value) -> Result<Value> {
    let mon = context.holder()?;
    let mon_data = context.mon(mon)?;
    if mon_data.hp == 0 || mon_data.hp as u32 * 2 > mon_data.max_hp as u32 {
        return Ok(Value::Undefined);
    }
    let amount = max_hp_fraction(context, mon, 4)?;
    let effect = context.effect.clone();
    consume_item(context, mon, Some("eat"))?;
    core_battle_actions::heal(context.context(), mon, amount, Some(&effect))?;
    Ok(Value::Undefined)
}

fn assault_vest_spd(context: &mut EventContext, _: Value) -> Result<Value> {
    context.chain_modify(3, 2)?;
    Ok(Value::Undefined)
}

/// Status moves cannot be selected.
fn assault_vest_disable_move(context: &mut EventContext, _: Value) -> Result<Value> {
    let mon = context.holder()?;
    let mut status_moves = Vec::new();
    for slot in &context.mon(mon)?.move_slots {
        if context.dex().moves.get_by_id(&slot.id)?.category == MoveCategory::Status {
            status_moves.push(slot.id.clone());
        }
    }
    let mon_data = context.mon_mut(mon)?;
    for id in status_moves {
        if let Some(slot) = mon_data.move_slot_mut(&id) {
            slot.disabled = true;
        }
    }
    Ok(Value::Undefined)
}

/// Survives a hit from full HP that would otherwise knock the holder out.
fn focus_sash(context: &mut EventContext, value: Value) -> Result<Value> {
    let mon = context.holder()?;
    let from_move = context
        .source_effect
        .as_ref()
        .is_some_and(|effect| effect.is_move());
    let mon_data = context.mon(mon)?;
    let hp = mon_data.hp as i64;
    let lethal = value.integer().is_some_and(|amount| amount >= hp);
    if !from_move || mon_data.hp != mon_data.max_hp || hp <= 1 || !lethal {
        return Ok(Value::Undefined);
    }
    consume_item(context, mon, None)?;
    Ok(Value::Integer(hp - 1))
}
