use anyhow::Result;
use apogee_data::{
    Accuracy,
    Boost,
    BoostTable,
    HitEffect,
    Id,
    MoveCategory,
    MoveFlag,
    MoveTarget,
    Stat,
    Type,
    TypeEffectiveness,
};
use apogee_prng::rand_util;

use crate::{
    battle::{
        ActiveMove,
        Context,
        EventTarget,
        MonHandle,
        Player,
        accuracy_with_stage,
        base_damage,
        boosted_stat,
        core_battle_effects,
        core_battle_logs,
        crit_chance_denominator,
        foe_side_index,
    },
    common::modify,
    effect::{
        AppliedEffectLocation,
        BattleEvent,
        EffectHandle,
        EffectState,
        Value,
    },
    error::{
        WrapOptionError,
        invariant_violation_error,
    },
    log_event,
};

/// Switches a Mon into an active position, switching out whatever was there.
pub fn switch_in(
    context: &mut Context,
    player: usize,
    position: usize,
    mon: MonHandle,
    run_events: bool,
) -> Result<()> {
    if let Some(previous) = context.player(player)?.active_mon(position) {
        if previous != mon {
            if run_events && context.mon(previous)?.hp > 0 {
                core_battle_effects::run_event(
                    context,
                    BattleEvent::SwitchOut,
                    EventTarget::Mon(previous),
                    None,
                    None,
                    Value::Undefined,
                )?;
            }
            clear_volatiles(context, previous)?;
            context.mon_mut(previous)?.clear_field_state();
        }
    }

    context.player_mut(player)?.active[position] = Some(mon);
    let mon_data = context.mon_mut(mon)?;
    mon_data.active = true;
    mon_data.active_position = Some(position);
    mon_data.active_turns = 0;
    mon_data.speed = mon_data.boosted_stat(Stat::Spe);
    core_battle_logs::switch(context, mon)?;

    if run_events {
        core_battle_effects::run_event(
            context,
            BattleEvent::SwitchIn,
            EventTarget::Mon(mon),
            None,
            None,
            Value::Undefined,
        )?;
    }
    Ok(())
}

/// Terastallizes a Mon into its Tera type.
pub fn terastallize(context: &mut Context, mon: MonHandle) -> Result<()> {
    let mon_data = context.mon_mut(mon)?;
    let tera_type = mon_data.tera_type;
    mon_data.terastallized = Some(tera_type);
    mon_data.types = vec![tera_type];
    let player = mon_data.player;
    context.player_mut(player)?.can_terastallize = false;
    let event = log_event!(
        "tera",
        ("mon", core_battle_logs::mon_identity(context.battle(), mon)?),
        ("type", tera_type),
    );
    context.battle_mut().log.push(event);
    Ok(())
}

/// Marks a Mon to switch out before the turn continues, if it has anything to switch to.
pub fn force_switch(context: &mut Context, mon: MonHandle) -> Result<bool> {
    let player = context.mon(mon)?.player;
    if Player::switchable_mons(context.battle(), context.player(player)?).is_empty() {
        return Ok(false);
    }
    context.mon_mut(mon)?.force_switch = true;
    Ok(true)
}

/// Uses a move.
///
/// The move becomes the battle's active move for the duration of its use. `priority` is the
/// priority the move was ordered with, if it differs from the move's own.
pub fn do_move(
    context: &mut Context,
    user: MonHandle,
    id: &Id,
    target: Option<isize>,
    priority: Option<i32>,
) -> Result<()> {
    let data = context.dex().moves.get_by_id(id)?;
    let mut active_move = ActiveMove::new(id.clone(), data.as_ref().clone(), user);
    if let Some(priority) = priority {
        active_move.priority = priority;
    }
    let previous = context.battle_mut().active_move.replace(active_move);
    let result = use_active_move(context, user, target);
    context.battle_mut().active_move = previous;
    result
}

fn use_active_move(context: &mut Context, user: MonHandle, target: Option<isize>) -> Result<()> {
    let id = context.active_move()?.id.clone();
    let move_effect = EffectHandle::Move(id.clone());

    if core_battle_effects::run_event(
        context,
        BattleEvent::BeforeMove,
        EventTarget::Mon(user),
        None,
        Some(&move_effect),
        Value::Undefined,
    )?
    .is_false()
    {
        return Ok(());
    }

    let mon = context.mon_mut(user)?;
    if id != "struggle" {
        if let Some(slot) = mon.move_slot_mut(&id) {
            slot.pp = slot.pp.saturating_sub(1);
        }
    }
    mon.last_move = Some(id.clone());
    mon.active_move_actions += 1;

    let targets = resolve_targets(context, user, target)?;
    context.active_move_mut()?.targets = targets.clone();
    let data = context.active_move()?.data.clone();

    if data.target.affects_mons_directly() {
        if targets.is_empty() {
            core_battle_logs::use_move_without_target(context, user, &data.name)?;
            core_battle_logs::fail(context, user)?;
            return Ok(());
        }
        let logged_target = match targets.as_slice() {
            [target] if !data.target.is_spread() => Some(*target),
            _ => None,
        };
        core_battle_logs::use_move(context, user, &data.name, logged_target)?;
    } else {
        core_battle_logs::use_move(context, user, &data.name, None)?;
    }

    if core_battle_effects::run_event(
        context,
        BattleEvent::PrepareHit,
        EventTarget::Mon(user),
        None,
        Some(&move_effect),
        Value::Undefined,
    )?
    .is_false()
    {
        core_battle_logs::fail(context, user)?;
        return Ok(());
    }
    context.active_move_mut()?.spread = targets.len() > 1;

    let mut hit_any = false;
    if data.target.affects_mons_directly() {
        for target in targets {
            if context.mon(target)?.hp == 0 {
                continue;
            }
            hit_any |= hit_target(context, user, target)?;
        }
    } else {
        let side = match data.target {
            MoveTarget::FoeSide => foe_side_index(context.mon(user)?.side),
            _ => context.mon(user)?.side,
        };
        let applied = match &data.hit_effect {
            Some(hit_effect) => {
                apply_hit_effect(context, user, None, side, hit_effect, &move_effect)?
            }
            None => false,
        };
        if !applied {
            core_battle_logs::fail(context, user)?;
        }
        hit_any = applied;
    }

    if hit_any {
        let total_damage = context.active_move()?.total_damage;
        if let Some(recoil) = data.recoil_percent {
            if total_damage > 0 {
                let amount = rounded_fraction(total_damage, recoil.numerator(), recoil.denominator())
                    .max(1);
                damage_from(context, user, amount, "recoil")?;
            }
        }
        if let Some(user_effect) = &data.user_effect {
            let side = context.mon(user)?.side;
            let applied =
                apply_hit_effect(context, user, Some(user), side, user_effect, &move_effect)?;
            if !applied && data.category == MoveCategory::Status && data.hit_effect.is_none() {
                core_battle_logs::fail(context, user)?;
            }
        }
        if data.struggle_recoil {
            let max_hp = context.mon(user)?.max_hp as u32;
            let amount = rounded_fraction(max_hp, 1, 4).max(1);
            damage_from(context, user, amount, "recoil")?;
        }
    }

    core_battle_effects::run_event(
        context,
        BattleEvent::AfterMove,
        EventTarget::Mon(user),
        None,
        Some(&move_effect),
        Value::Undefined,
    )?;

    if data.user_switch && hit_any && context.mon(user)?.hp > 0 {
        force_switch(context, user)?;
    }
    Ok(())
}

fn rounded_fraction(value: u32, numerator: u32, denominator: u32) -> u32 {
    let denominator = denominator.max(1) as u64;
    ((value as u64 * numerator as u64 + denominator / 2) / denominator) as u32
}

/// Hits a single target with the active move. Returns whether the move connected.
fn hit_target(context: &mut Context, user: MonHandle, target: MonHandle) -> Result<bool> {
    let data = context.active_move()?.data.clone();
    let move_effect = EffectHandle::Move(context.active_move()?.id.clone());

    if core_battle_effects::run_event(
        context,
        BattleEvent::TryHit,
        EventTarget::Mon(target),
        Some(user),
        Some(&move_effect),
        Value::Undefined,
    )?
    .is_false()
    {
        return Ok(false);
    }

    if !check_immunity(context, user, target)? {
        core_battle_logs::immune(context, target)?;
        return Ok(false);
    }

    if !check_accuracy(context, user, target)? {
        core_battle_logs::miss(context, user, target)?;
        return Ok(false);
    }

    if data.category != MoveCategory::Status {
        let damage = match calculate_damage(context, user, target)? {
            Some(damage) => damage,
            None => {
                core_battle_logs::fail(context, user)?;
                return Ok(false);
            }
        };
        let active_move = context.active_move()?;
        let (crit, type_modifier) = (active_move.crit, active_move.type_modifier);
        if crit {
            core_battle_logs::crit(context, target)?;
        }
        core_battle_logs::effectiveness(context, target, type_modifier)?;
        let dealt = self::damage(context, target, damage, Some(user), Some(&move_effect))?;
        context.active_move_mut()?.total_damage += dealt;

        if let Some(drain) = data.drain_percent {
            let amount = rounded_fraction(dealt, drain.numerator(), drain.denominator());
            if amount >= 1 {
                heal_from(context, user, amount, "drain")?;
            }
        }

        core_battle_effects::run_event(
            context,
            BattleEvent::DamagingHit,
            EventTarget::Mon(target),
            Some(user),
            Some(&move_effect),
            Value::Integer(dealt as i64),
        )?;
    }

    if let Some(hit_effect) = &data.hit_effect {
        let side = context.mon(target)?.side;
        let applied =
            apply_hit_effect(context, user, Some(target), side, hit_effect, &move_effect)?;
        if !applied && data.category == MoveCategory::Status {
            core_battle_logs::fail(context, target)?;
        }
    }

    for secondary in &data.secondary_effects {
        if context.mon(target)?.hp == 0 {
            break;
        }
        let hits = match secondary.chance {
            Some(chance) => context.chance(chance.numerator() as u64, chance.denominator() as u64),
            None => true,
        };
        if !hits {
            continue;
        }
        if let Some(effect) = &secondary.target {
            let side = context.mon(target)?.side;
            apply_hit_effect(context, user, Some(target), side, effect, &move_effect)?;
        }
        if let Some(effect) = &secondary.user {
            let side = context.mon(user)?.side;
            apply_hit_effect(context, user, Some(user), side, effect, &move_effect)?;
        }
    }

    Ok(true)
}

/// Resolves the Mons a move hits, retargeting when the chosen target is gone.
pub fn resolve_targets(
    context: &mut Context,
    user: MonHandle,
    target: Option<isize>,
) -> Result<Vec<MonHandle>> {
    let move_target = context.active_move()?.data.target;
    let battle = context.battle();
    let user_data = battle.mon(user)?;
    let side = user_data.side;
    let position = user_data.active_position.unwrap_or_default();
    let active = battle.active_mons();
    let foes = active
        .iter()
        .copied()
        .filter(|mon| battle.mon(*mon).is_ok_and(|mon| mon.side != side))
        .collect::<Vec<_>>();
    let allies = active
        .iter()
        .copied()
        .filter(|mon| *mon != user && battle.mon(*mon).is_ok_and(|mon| mon.side == side))
        .collect::<Vec<_>>();
    let at_position = |side: usize, position: usize| {
        battle
            .player(side)
            .ok()
            .and_then(|player| player.active_mon(position))
            .filter(|mon| active.contains(mon))
    };
    let chosen = target.and_then(|target| {
        let index = target.unsigned_abs().checked_sub(1)?;
        if target > 0 {
            at_position(foe_side_index(side), index)
        } else if index == position {
            Some(user)
        } else {
            at_position(side, index)
        }
    });

    let targets = match move_target {
        MoveTarget::User => vec![user],
        MoveTarget::AdjacentAllyOrUser => vec![chosen.unwrap_or(user)],
        MoveTarget::AdjacentAlly => chosen
            .filter(|mon| *mon != user)
            .or_else(|| allies.first().copied())
            .into_iter()
            .collect(),
        MoveTarget::Normal | MoveTarget::Any | MoveTarget::AdjacentFoe => {
            match chosen.filter(|mon| *mon != user) {
                Some(chosen) => vec![chosen],
                None => random_target(context, &foes),
            }
        }
        MoveTarget::RandomNormal => random_target(context, &foes),
        MoveTarget::AllAdjacentFoes => foes,
        MoveTarget::AllAdjacent => allies.into_iter().chain(foes).collect(),
        MoveTarget::Allies => [user].into_iter().chain(allies).collect(),
        MoveTarget::All => active,
        MoveTarget::AllySide | MoveTarget::FoeSide | MoveTarget::Field => Vec::new(),
    };
    Ok(targets)
}

fn random_target(context: &mut Context, candidates: &[MonHandle]) -> Vec<MonHandle> {
    rand_util::sample_slice(context.battle_mut().prng.as_mut(), candidates)
        .copied()
        .into_iter()
        .collect()
}

/// Checks if the target is affected by the active move at all.
pub fn check_immunity(context: &mut Context, user: MonHandle, target: MonHandle) -> Result<bool> {
    let active_move = context.active_move()?;
    let move_type = active_move.move_type();
    let move_effect = EffectHandle::Move(active_move.id.clone());
    let data = &active_move.data;
    let target_data = context.mon(target)?;

    if data.has_flag(MoveFlag::Powder) && target_data.has_type(Type::Grass) {
        return Ok(false);
    }
    if data.category != MoveCategory::Status && !data.typeless && !data.ignore_immunity {
        let type_chart = &context.dex().type_chart;
        if target_data
            .types
            .iter()
            .any(|typ| type_chart.effectiveness(move_type, *typ) == TypeEffectiveness::None)
        {
            return Ok(false);
        }
    }

    Ok(!core_battle_effects::run_event(
        context,
        BattleEvent::Immunity,
        EventTarget::Mon(target),
        Some(user),
        Some(&move_effect),
        Value::Type(move_type),
    )?
    .is_false())
}

/// Rolls whether the active move hits the target.
pub fn check_accuracy(context: &mut Context, user: MonHandle, target: MonHandle) -> Result<bool> {
    let active_move = context.active_move()?;
    let accuracy = match active_move.data.accuracy {
        Accuracy::Exempt => return Ok(true),
        Accuracy::Chance(accuracy) => accuracy,
    };
    let move_effect = EffectHandle::Move(active_move.id.clone());

    if core_battle_effects::run_event_for_priority(
        context,
        BattleEvent::AccuracyExempt,
        EventTarget::Mon(target),
        Some(user),
        Some(&move_effect),
    )?
    .boolean()
        == Some(true)
    {
        return Ok(true);
    }

    let stage = context.mon(user)?.boosts.acc as i32 - context.mon(target)?.boosts.eva as i32;
    let stage = stage.clamp(BoostTable::MIN as i32, BoostTable::MAX as i32) as i8;
    let accuracy = accuracy_with_stage(accuracy as u32, stage);
    let modified = core_battle_effects::run_event(
        context,
        BattleEvent::ModifyAccuracy,
        EventTarget::Mon(target),
        Some(user),
        Some(&move_effect),
        Value::Integer(accuracy as i64),
    )?;
    if modified.is_false() {
        return Ok(false);
    }
    let accuracy = integer_or(modified, accuracy) as u64;
    Ok(context.chance(accuracy, 100))
}

fn integer_or(value: Value, default: u32) -> u32 {
    value
        .integer()
        .map(|value| u32::try_from(value.max(0)).unwrap_or(u32::MAX))
        .unwrap_or(default)
}

/// Calculates the damage the active move deals to the target.
///
/// Returns [`None`] if the move deals no damage at all.
pub fn calculate_damage(
    context: &mut Context,
    user: MonHandle,
    target: MonHandle,
) -> Result<Option<u32>> {
    let active_move = context.active_move()?;
    let data = active_move.data.clone();
    let move_type = active_move.move_type();
    let move_effect = EffectHandle::Move(active_move.id.clone());

    if data.level_damage {
        return Ok(Some(context.mon(user)?.level as u32));
    }
    if let Some(damage) = data.damage {
        return Ok(Some(damage as u32));
    }

    if data.base_power == 0 {
        return Ok(None);
    }

    let crit_ratio = core_battle_effects::run_event(
        context,
        BattleEvent::ModifyCritRatio,
        EventTarget::Mon(user),
        Some(target),
        Some(&move_effect),
        Value::Integer(data.crit_ratio as i64),
    )?
    .integer()
    .unwrap_or(data.crit_ratio as i64);
    let crit = data.will_crit
        || crit_chance_denominator(crit_ratio)
            .is_some_and(|denominator| context.chance(1, denominator));
    context.active_move_mut()?.crit = crit;

    let base_power = core_battle_effects::run_event(
        context,
        BattleEvent::BasePower,
        EventTarget::Mon(user),
        Some(target),
        Some(&move_effect),
        Value::Integer(data.base_power as i64),
    )?;
    if base_power.is_false() {
        return Ok(None);
    }
    let base_power = integer_or(base_power, data.base_power);
    if base_power == 0 {
        return Ok(None);
    }

    let (attack_stat, defense_stat, attack_event, defense_event) = match data.category {
        MoveCategory::Special => (
            Stat::SpAtk,
            Stat::SpDef,
            BattleEvent::ModifySpA,
            BattleEvent::ModifySpD,
        ),
        _ => (
            Stat::Atk,
            Stat::Def,
            BattleEvent::ModifyAtk,
            BattleEvent::ModifyDef,
        ),
    };

    let user_data = context.mon(user)?;
    let level = user_data.level;
    let mut attack_boost = user_data.boosts.get(Boost::try_from(attack_stat)?);
    if crit && attack_boost < 0 {
        attack_boost = 0;
    }
    let attack = boosted_stat(user_data.stats.get(attack_stat) as u32, attack_boost);
    let attack = integer_or(
        core_battle_effects::run_event(
            context,
            attack_event,
            EventTarget::Mon(user),
            Some(target),
            Some(&move_effect),
            Value::Integer(attack as i64),
        )?,
        attack,
    );

    let target_data = context.mon(target)?;
    let mut defense_boost = target_data.boosts.get(Boost::try_from(defense_stat)?);
    if crit && defense_boost > 0 {
        defense_boost = 0;
    }
    let defense = boosted_stat(target_data.stats.get(defense_stat) as u32, defense_boost);
    let defense = integer_or(
        core_battle_effects::run_event(
            context,
            defense_event,
            EventTarget::Mon(target),
            Some(user),
            Some(&move_effect),
            Value::Integer(defense as i64),
        )?,
        defense,
    );

    let mut damage = base_damage(level, base_power, attack, defense);

    if context.active_move()?.spread {
        damage = modify(damage, 3072);
    }

    damage = integer_or(
        core_battle_effects::run_event(
            context,
            BattleEvent::WeatherModifyDamage,
            EventTarget::Mon(user),
            Some(target),
            Some(&move_effect),
            Value::Integer(damage as i64),
        )?,
        damage,
    );

    if crit {
        damage = damage * 3 / 2;
    }

    damage = context.battle_mut().randomize_base_damage(damage);

    if move_type != Type::None {
        let user_data = context.mon(user)?;
        let mut stab = 4096;
        if user_data.has_type(move_type) || user_data.original_types.contains(&move_type) {
            stab = 6144;
        }
        if user_data.terastallized == Some(move_type)
            && user_data.original_types.contains(&move_type)
        {
            stab = 8192;
        }
        let stab = integer_or(
            core_battle_effects::run_event(
                context,
                BattleEvent::ModifyStab,
                EventTarget::Mon(user),
                Some(target),
                Some(&move_effect),
                Value::Integer(stab as i64),
            )?,
            stab,
        );
        if stab != 4096 {
            damage = modify(damage, stab);
        }
    }

    let type_modifier = if move_type == Type::None {
        0
    } else {
        let type_chart = &context.dex().type_chart;
        context
            .mon(target)?
            .types
            .iter()
            .filter_map(|typ| type_chart.effectiveness(move_type, *typ).exponent())
            .sum::<i8>()
    };
    context.active_move_mut()?.type_modifier = type_modifier;
    if type_modifier > 0 {
        damage <<= type_modifier as u32;
    } else if type_modifier < 0 {
        damage >>= type_modifier.unsigned_abs() as u32;
    }

    let user_data = context.mon(user)?;
    if data.category == MoveCategory::Physical
        && user_data.status.as_ref().is_some_and(|status| status == &"brn")
        && !user_data.has_ability("guts")
        && context.active_move()?.id != "facade"
    {
        damage = modify(damage, 2048);
    }

    damage = integer_or(
        core_battle_effects::run_event(
            context,
            BattleEvent::ModifyDamage,
            EventTarget::Mon(user),
            Some(target),
            Some(&move_effect),
            Value::Integer(damage as i64),
        )?,
        damage,
    );

    // Damage is truncated to 16 bits like the cartridge games.
    Ok(Some((damage & 0xFFFF).max(1)))
}

/// Deals damage to a Mon. Returns the damage actually dealt.
pub fn damage(
    context: &mut Context,
    target: MonHandle,
    amount: u32,
    source: Option<MonHandle>,
    effect: Option<&EffectHandle>,
) -> Result<u32> {
    if context.mon(target)?.hp == 0 || amount == 0 {
        return Ok(0);
    }
    let amount = core_battle_effects::run_event(
        context,
        BattleEvent::Damage,
        EventTarget::Mon(target),
        source,
        effect,
        Value::Integer(amount as i64),
    )?;
    if amount.is_false() {
        return Ok(0);
    }
    let amount = integer_or(amount, 0);
    let dealt = apply_damage(context, target, amount)?;
    core_battle_logs::damage(context, target, effect)?;
    after_damage(context, target)?;
    Ok(dealt)
}

/// Deals damage from a named source, such as recoil, without running damage handlers.
pub fn damage_from(context: &mut Context, target: MonHandle, amount: u32, from: &str) -> Result<u32> {
    if context.mon(target)?.hp == 0 || amount == 0 {
        return Ok(0);
    }
    let dealt = apply_damage(context, target, amount)?;
    core_battle_logs::damage_from(context, target, from)?;
    after_damage(context, target)?;
    Ok(dealt)
}

fn apply_damage(context: &mut Context, target: MonHandle, amount: u32) -> Result<u32> {
    let mon = context.mon_mut(target)?;
    let dealt = amount.min(mon.hp as u32);
    mon.hp -= dealt as u16;
    Ok(dealt)
}

fn after_damage(context: &mut Context, target: MonHandle) -> Result<()> {
    if context.mon(target)?.hp == 0 {
        context.battle_mut().faint_queue.push_back(target);
    } else {
        core_battle_effects::run_event(
            context,
            BattleEvent::Update,
            EventTarget::Mon(target),
            None,
            None,
            Value::Undefined,
        )?;
    }
    Ok(())
}

/// Heals a Mon. Returns the HP actually restored.
pub fn heal(
    context: &mut Context,
    target: MonHandle,
    amount: u32,
    effect: Option<&EffectHandle>,
) -> Result<u32> {
    let healed = apply_heal(context, target, amount)?;
    if healed > 0 {
        core_battle_logs::heal(context, target, effect)?;
    }
    Ok(healed)
}

/// Heals a Mon from a named source, such as drain.
pub fn heal_from(context: &mut Context, target: MonHandle, amount: u32, from: &str) -> Result<u32> {
    let healed = apply_heal(context, target, amount)?;
    if healed > 0 {
        core_battle_logs::heal_from(context, target, from)?;
    }
    Ok(healed)
}

fn apply_heal(context: &mut Context, target: MonHandle, amount: u32) -> Result<u32> {
    let mon = context.mon_mut(target)?;
    if mon.hp == 0 || mon.hp >= mon.max_hp {
        return Ok(0);
    }
    let healed = amount.min((mon.max_hp - mon.hp) as u32);
    mon.hp += healed as u16;
    Ok(healed)
}

/// Applies stat stage changes to a Mon.
///
/// Every requested change is logged and reported to handlers with the change that actually took
/// effect, even when clamping reduced it to nothing. Returns whether any stage changed.
pub fn boost(
    context: &mut Context,
    target: MonHandle,
    boosts: BoostTable,
    source: Option<MonHandle>,
    effect: Option<&EffectHandle>,
) -> Result<bool> {
    if context.mon(target)?.hp == 0 {
        return Ok(false);
    }
    let boosts = match core_battle_effects::run_event(
        context,
        BattleEvent::TryBoost,
        EventTarget::Mon(target),
        source,
        effect,
        Value::Boosts(boosts),
    )? {
        Value::Boosts(boosts) => boosts,
        value if value.is_false() => return Ok(false),
        _ => boosts,
    };

    let mut changed = false;
    for (boost, delta) in boosts.non_zero_entries().collect::<Vec<_>>() {
        let applied = context.mon_mut(target)?.boosts.apply_clamped(boost, delta);
        let event = log_event!(
            if delta > 0 { "boost" } else { "unboost" },
            ("mon", core_battle_logs::mon_identity(context.battle(), target)?),
            ("stat", boost.log_name()),
            ("by", applied.unsigned_abs()),
        );
        let event = core_battle_logs::with_source(context, event, effect)?;
        context.battle_mut().log.push(event);
        core_battle_effects::run_event(
            context,
            BattleEvent::AfterEachBoost,
            EventTarget::Mon(target),
            source,
            effect,
            Value::Boost(boost, applied),
        )?;
        changed |= applied != 0;
    }
    Ok(changed)
}

fn status_immune(status: &Id, types: &[Type]) -> bool {
    let immune_types: &[Type] = match status.as_str() {
        "brn" => &[Type::Fire],
        "par" => &[Type::Electric],
        "psn" | "tox" => &[Type::Poison, Type::Steel],
        "frz" => &[Type::Ice],
        _ => &[],
    };
    types.iter().any(|typ| immune_types.contains(typ))
}

fn new_effect_state(
    context: &Context,
    source: Option<MonHandle>,
    effect: Option<&EffectHandle>,
    duration: Option<u8>,
) -> EffectState {
    let source_side = source.and_then(|source| context.mon(source).ok().map(|mon| mon.side));
    let mut state = EffectState::new(source, source_side, effect.cloned());
    state.duration = duration;
    state
}

/// Runs the hooks for a newly applied condition.
///
/// Returns `false` if the condition refused to start.
fn start_condition(
    context: &mut Context,
    condition: &EffectHandle,
    location: AppliedEffectLocation,
    target: EventTarget,
    source: Option<MonHandle>,
    effect: Option<&EffectHandle>,
) -> Result<bool> {
    if let Some(duration) = core_battle_effects::run_single_event(
        context,
        BattleEvent::Duration,
        condition,
        location.clone(),
        target,
        source,
        effect,
        Value::Undefined,
    )?
    .integer()
    {
        context.battle_mut().effect_state_mut(&location)?.duration =
            Some(u8::try_from(duration.max(0)).unwrap_or(u8::MAX));
    }
    Ok(!core_battle_effects::run_single_event(
        context,
        BattleEvent::Start,
        condition,
        location,
        target,
        source,
        effect,
        Value::Undefined,
    )?
    .is_false())
}

fn check_fainted_target(context: &Context, target: MonHandle, condition: &Id) -> Result<bool> {
    let affects_fainted = context.dex().conditions.get_by_id(condition)?.affects_fainted;
    let mon = context.mon(target)?;
    if mon.fainted && !affects_fainted {
        return Err(invariant_violation_error(format!(
            "{condition} cannot be applied to fainted mon {}",
            mon.name
        )));
    }
    Ok(mon.hp > 0 || affects_fainted)
}

/// Sets the status of a Mon. A Mon can only have one status at a time.
pub fn set_status(
    context: &mut Context,
    target: MonHandle,
    status: &Id,
    source: Option<MonHandle>,
    effect: Option<&EffectHandle>,
) -> Result<bool> {
    if !check_fainted_target(context, target, status)? {
        return Ok(false);
    }
    let mon = context.mon(target)?;
    if mon.status.is_some() || status_immune(status, &mon.types) {
        return Ok(false);
    }
    let condition = EffectHandle::Condition(status.clone());
    if core_battle_effects::run_event(
        context,
        BattleEvent::SetStatus,
        EventTarget::Mon(target),
        source,
        effect,
        Value::Effect(condition.clone()),
    )?
    .is_false()
    {
        return Ok(false);
    }

    let duration = context.dex().conditions.get_by_id(status)?.duration;
    let state = new_effect_state(context, source, effect, duration);
    let mon = context.mon_mut(target)?;
    mon.status = Some(status.clone());
    mon.status_state = state;
    if !start_condition(
        context,
        &condition,
        AppliedEffectLocation::MonStatus(target),
        EventTarget::Mon(target),
        source,
        effect,
    )? {
        let mon = context.mon_mut(target)?;
        mon.status = None;
        mon.status_state = EffectState::default();
        return Ok(false);
    }

    let event = log_event!(
        "status",
        ("mon", core_battle_logs::mon_identity(context.battle(), target)?),
        ("status", condition.name(context.dex())?),
    );
    let event = core_battle_logs::with_source(context, event, effect)?;
    context.battle_mut().log.push(event);
    Ok(true)
}

/// Cures the status of a Mon.
pub fn cure_status(context: &mut Context, target: MonHandle) -> Result<bool> {
    let status = match context.mon(target)?.status.clone() {
        Some(status) => status,
        None => return Ok(false),
    };
    let condition = EffectHandle::Condition(status);
    core_battle_effects::run_single_event(
        context,
        BattleEvent::End,
        &condition,
        AppliedEffectLocation::MonStatus(target),
        EventTarget::Mon(target),
        None,
        None,
        Value::Undefined,
    )?;
    let event = log_event!(
        "curestatus",
        ("mon", core_battle_logs::mon_identity(context.battle(), target)?),
        ("status", condition.name(context.dex())?),
    );
    context.battle_mut().log.push(event);
    let mon = context.mon_mut(target)?;
    mon.status = None;
    mon.status_state = EffectState::default();
    Ok(true)
}

/// Adds a volatile condition to a Mon.
///
/// Re-adding an existing volatile restarts it, if the condition supports restarting.
pub fn add_volatile(
    context: &mut Context,
    target: MonHandle,
    volatile: &Id,
    source: Option<MonHandle>,
    effect: Option<&EffectHandle>,
) -> Result<bool> {
    if !check_fainted_target(context, target, volatile)? {
        return Ok(false);
    }
    let condition = EffectHandle::Condition(volatile.clone());
    let location = AppliedEffectLocation::MonVolatile(target, volatile.clone());
    if context.mon(target)?.volatiles.contains_key(volatile) {
        if !core_battle_effects::has_single_handler(context, &condition, BattleEvent::Restart) {
            return Ok(false);
        }
        return Ok(!core_battle_effects::run_single_event(
            context,
            BattleEvent::Restart,
            &condition,
            location,
            EventTarget::Mon(target),
            source,
            effect,
            Value::Undefined,
        )?
        .is_false());
    }

    if core_battle_effects::run_event(
        context,
        BattleEvent::TryAddVolatile,
        EventTarget::Mon(target),
        source,
        effect,
        Value::Effect(condition.clone()),
    )?
    .is_false()
    {
        return Ok(false);
    }

    let data = context.dex().conditions.get_by_id(volatile)?;
    let state = new_effect_state(context, source, effect, data.duration);
    context
        .mon_mut(target)?
        .volatiles
        .insert(volatile.clone(), state);
    if !start_condition(
        context,
        &condition,
        location,
        EventTarget::Mon(target),
        source,
        effect,
    )? {
        context.mon_mut(target)?.volatiles.shift_remove(volatile);
        return Ok(false);
    }

    if !data.silent {
        let event = log_event!(
            "start",
            ("mon", core_battle_logs::mon_identity(context.battle(), target)?),
            ("condition", data.name.as_str()),
        );
        let event = core_battle_logs::with_source(context, event, effect)?;
        context.battle_mut().log.push(event);
    }
    Ok(true)
}

/// Removes a volatile condition from a Mon, along with any linked volatile on its partner.
pub fn remove_volatile(context: &mut Context, target: MonHandle, volatile: &Id) -> Result<bool> {
    if !context.mon(target)?.volatiles.contains_key(volatile) {
        return Ok(false);
    }
    let condition = EffectHandle::Condition(volatile.clone());
    core_battle_effects::run_single_event(
        context,
        BattleEvent::End,
        &condition,
        AppliedEffectLocation::MonVolatile(target, volatile.clone()),
        EventTarget::Mon(target),
        None,
        None,
        Value::Undefined,
    )?;
    let state = context
        .mon_mut(target)?
        .volatiles
        .shift_remove(volatile)
        .wrap_expectation_with_format(format_args!("{volatile} disappeared while ending"))?;

    let data = context.dex().conditions.get_by_id(volatile)?;
    if !data.silent {
        let event = log_event!(
            "end",
            ("mon", core_battle_logs::mon_identity(context.battle(), target)?),
            ("condition", data.name.as_str()),
        );
        context.battle_mut().log.push(event);
    }
    if let Some((partner, partner_volatile)) = state.linked {
        remove_volatile(context, partner, &partner_volatile)?;
    }
    Ok(true)
}

/// Removes every volatile from a Mon without running their end handlers.
///
/// Linked volatiles on other Mons are still removed normally.
pub fn clear_volatiles(context: &mut Context, target: MonHandle) -> Result<()> {
    let volatiles = std::mem::take(&mut context.mon_mut(target)?.volatiles);
    for (_, state) in volatiles {
        if let Some((partner, partner_volatile)) = state.linked {
            remove_volatile(context, partner, &partner_volatile)?;
        }
    }
    Ok(())
}

/// Adds a condition to a side.
pub fn add_side_condition(
    context: &mut Context,
    side: usize,
    condition: &Id,
    source: Option<MonHandle>,
    effect: Option<&EffectHandle>,
) -> Result<bool> {
    let handle = EffectHandle::Condition(condition.clone());
    let location = AppliedEffectLocation::SideCondition(side, condition.clone());
    if context.side(side)?.conditions.contains_key(condition) {
        if !core_battle_effects::has_single_handler(context, &handle, BattleEvent::Restart) {
            return Ok(false);
        }
        return Ok(!core_battle_effects::run_single_event(
            context,
            BattleEvent::Restart,
            &handle,
            location,
            EventTarget::Side(side),
            source,
            effect,
            Value::Undefined,
        )?
        .is_false());
    }

    let data = context.dex().conditions.get_by_id(condition)?;
    let state = new_effect_state(context, source, effect, data.duration);
    context
        .side_mut(side)?
        .conditions
        .insert(condition.clone(), state);
    if !start_condition(
        context,
        &handle,
        location,
        EventTarget::Side(side),
        source,
        effect,
    )? {
        context.side_mut(side)?.conditions.shift_remove(condition);
        return Ok(false);
    }

    let event = log_event!(
        "sidestart",
        ("side", side),
        ("condition", data.name.as_str())
    );
    let event = core_battle_logs::with_source(context, event, effect)?;
    context.battle_mut().log.push(event);
    Ok(true)
}

/// Removes a condition from a side.
pub fn remove_side_condition(context: &mut Context, side: usize, condition: &Id) -> Result<bool> {
    if !context.side(side)?.conditions.contains_key(condition) {
        return Ok(false);
    }
    core_battle_effects::run_single_event(
        context,
        BattleEvent::End,
        &EffectHandle::Condition(condition.clone()),
        AppliedEffectLocation::SideCondition(side, condition.clone()),
        EventTarget::Side(side),
        None,
        None,
        Value::Undefined,
    )?;
    context.side_mut(side)?.conditions.shift_remove(condition);
    let name = context.dex().conditions.get_by_id(condition)?.name.clone();
    let event = log_event!("sideend", ("side", side), ("condition", name));
    context.battle_mut().log.push(event);
    Ok(true)
}

/// Sets the weather, replacing any existing weather.
pub fn set_weather(
    context: &mut Context,
    weather: &Id,
    source: Option<MonHandle>,
    effect: Option<&EffectHandle>,
) -> Result<bool> {
    if context.battle().field.weather.as_ref() == Some(weather) {
        return Ok(false);
    }
    clear_weather(context)?;

    let data = context.dex().conditions.get_by_id(weather)?;
    let state = new_effect_state(context, source, effect, data.duration);
    let field = &mut context.battle_mut().field;
    field.weather = Some(weather.clone());
    field.weather_state = state;
    if !start_condition(
        context,
        &EffectHandle::Condition(weather.clone()),
        AppliedEffectLocation::Weather,
        EventTarget::Field,
        source,
        effect,
    )? {
        let field = &mut context.battle_mut().field;
        field.weather = None;
        field.weather_state = EffectState::default();
        return Ok(false);
    }

    let event = log_event!("weather", ("weather", data.name.as_str()));
    let event = core_battle_logs::with_source(context, event, effect)?;
    context.battle_mut().log.push(event);
    Ok(true)
}

/// Clears the weather.
pub fn clear_weather(context: &mut Context) -> Result<bool> {
    let weather = match context.battle().field.weather.clone() {
        Some(weather) => weather,
        None => return Ok(false),
    };
    core_battle_effects::run_single_event(
        context,
        BattleEvent::End,
        &EffectHandle::Condition(weather),
        AppliedEffectLocation::Weather,
        EventTarget::Field,
        None,
        None,
        Value::Undefined,
    )?;
    let field = &mut context.battle_mut().field;
    field.weather = None;
    field.weather_state = EffectState::default();
    context.battle_mut().log.push(log_event!("clearweather"));
    Ok(true)
}

/// Sets the terrain, replacing any existing terrain.
pub fn set_terrain(
    context: &mut Context,
    terrain: &Id,
    source: Option<MonHandle>,
    effect: Option<&EffectHandle>,
) -> Result<bool> {
    if context.battle().field.terrain.as_ref() == Some(terrain) {
        return Ok(false);
    }
    clear_terrain(context)?;

    let data = context.dex().conditions.get_by_id(terrain)?;
    let state = new_effect_state(context, source, effect, data.duration);
    let field = &mut context.battle_mut().field;
    field.terrain = Some(terrain.clone());
    field.terrain_state = state;
    if !start_condition(
        context,
        &EffectHandle::Condition(terrain.clone()),
        AppliedEffectLocation::Terrain,
        EventTarget::Field,
        source,
        effect,
    )? {
        let field = &mut context.battle_mut().field;
        field.terrain = None;
        field.terrain_state = EffectState::default();
        return Ok(false);
    }

    let event = log_event!("fieldstart", ("what", data.name.as_str()));
    let event = core_battle_logs::with_source(context, event, effect)?;
    context.battle_mut().log.push(event);
    Ok(true)
}

/// Clears the terrain.
pub fn clear_terrain(context: &mut Context) -> Result<bool> {
    let terrain = match context.battle().field.terrain.clone() {
        Some(terrain) => terrain,
        None => return Ok(false),
    };
    core_battle_effects::run_single_event(
        context,
        BattleEvent::End,
        &EffectHandle::Condition(terrain.clone()),
        AppliedEffectLocation::Terrain,
        EventTarget::Field,
        None,
        None,
        Value::Undefined,
    )?;
    let field = &mut context.battle_mut().field;
    field.terrain = None;
    field.terrain_state = EffectState::default();
    let name = context.dex().conditions.get_by_id(&terrain)?.name.clone();
    context
        .battle_mut()
        .log
        .push(log_event!("fieldend", ("what", name)));
    Ok(true)
}

/// Adds a pseudo-weather to the field.
pub fn add_pseudo_weather(
    context: &mut Context,
    pseudo_weather: &Id,
    source: Option<MonHandle>,
    effect: Option<&EffectHandle>,
) -> Result<bool> {
    let handle = EffectHandle::Condition(pseudo_weather.clone());
    let location = AppliedEffectLocation::PseudoWeather(pseudo_weather.clone());
    if context
        .battle()
        .field
        .pseudo_weathers
        .contains_key(pseudo_weather)
    {
        if !core_battle_effects::has_single_handler(context, &handle, BattleEvent::Restart) {
            return Ok(false);
        }
        return Ok(!core_battle_effects::run_single_event(
            context,
            BattleEvent::Restart,
            &handle,
            location,
            EventTarget::Field,
            source,
            effect,
            Value::Undefined,
        )?
        .is_false());
    }

    let data = context.dex().conditions.get_by_id(pseudo_weather)?;
    let state = new_effect_state(context, source, effect, data.duration);
    context
        .battle_mut()
        .field
        .pseudo_weathers
        .insert(pseudo_weather.clone(), state);
    if !start_condition(
        context,
        &handle,
        location,
        EventTarget::Field,
        source,
        effect,
    )? {
        context
            .battle_mut()
            .field
            .pseudo_weathers
            .shift_remove(pseudo_weather);
        return Ok(false);
    }

    let event = log_event!("fieldstart", ("what", data.name.as_str()));
    let event = core_battle_logs::with_source(context, event, effect)?;
    context.battle_mut().log.push(event);
    Ok(true)
}

/// Removes a pseudo-weather from the field.
pub fn remove_pseudo_weather(context: &mut Context, pseudo_weather: &Id) -> Result<bool> {
    if !context
        .battle()
        .field
        .pseudo_weathers
        .contains_key(pseudo_weather)
    {
        return Ok(false);
    }
    core_battle_effects::run_single_event(
        context,
        BattleEvent::End,
        &EffectHandle::Condition(pseudo_weather.clone()),
        AppliedEffectLocation::PseudoWeather(pseudo_weather.clone()),
        EventTarget::Field,
        None,
        None,
        Value::Undefined,
    )?;
    context
        .battle_mut()
        .field
        .pseudo_weathers
        .shift_remove(pseudo_weather);
    let name = context
        .dex()
        .conditions
        .get_by_id(pseudo_weather)?
        .name
        .clone();
    context
        .battle_mut()
        .log
        .push(log_event!("fieldend", ("what", name)));
    Ok(true)
}

/// Applies the declarative effect of a move hit.
///
/// Effects on a Mon need a target. Side effects apply to the given side. Returns whether anything
/// changed.
pub fn apply_hit_effect(
    context: &mut Context,
    user: MonHandle,
    target: Option<MonHandle>,
    side: usize,
    hit_effect: &HitEffect,
    effect: &EffectHandle,
) -> Result<bool> {
    let mut applied = false;
    if let Some(target) = target {
        if let Some(boosts) = hit_effect.boosts {
            applied |= boost(context, target, boosts, Some(user), Some(effect))?;
        }
        if let Some(heal_percent) = hit_effect.heal_percent {
            let max_hp = context.mon(target)?.max_hp as u32;
            let amount =
                rounded_fraction(max_hp, heal_percent.numerator(), heal_percent.denominator());
            applied |= heal(context, target, amount, Some(effect))? > 0;
        }
        if let Some(status) = &hit_effect.status {
            applied |= set_status(context, target, &Id::from(status), Some(user), Some(effect))?;
        }
        if let Some(volatile) = &hit_effect.volatile_status {
            applied |=
                add_volatile(context, target, &Id::from(volatile), Some(user), Some(effect))?;
        }
    }
    if let Some(condition) = &hit_effect.side_condition {
        applied |=
            add_side_condition(context, side, &Id::from(condition), Some(user), Some(effect))?;
    }
    if let Some(weather) = &hit_effect.weather {
        applied |= set_weather(context, &Id::from(weather), Some(user), Some(effect))?;
    }
    if let Some(terrain) = &hit_effect.terrain {
        applied |= set_terrain(context, &Id::from(terrain), Some(user), Some(effect))?;
    }
    if let Some(pseudo_weather) = &hit_effect.pseudo_weather {
        applied |=
            add_pseudo_weather(context, &Id::from(pseudo_weather), Some(user), Some(effect))?;
    }
    Ok(applied)
}
