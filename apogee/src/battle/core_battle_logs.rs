use anyhow::Result;

use crate::{
    battle::{
        Context,
        CoreBattle,
        MonHandle,
    },
    effect::EffectHandle,
    log::{
        Event,
        EventLoggable,
    },
    log_event,
};

/// How a Mon appears in the log: `Name,player-id,position`, or `Name,player-id` off the field.
pub fn mon_identity(battle: &CoreBattle, mon: MonHandle) -> Result<String> {
    let mon = battle.mon(mon)?;
    let player = battle.player(mon.player)?;
    Ok(match mon.active_position {
        Some(position) => format!("{},{},{}", mon.name, player.id, position + 1),
        None => format!("{},{}", mon.name, player.id),
    })
}

/// A Mon's health, as a ceiling percentage unless actual health is revealed.
pub fn mon_health(battle: &CoreBattle, mon: MonHandle) -> Result<String> {
    let mon = battle.mon(mon)?;
    if mon.hp == 0 {
        return Ok("0".to_owned());
    }
    if battle.engine_options.reveal_actual_health {
        Ok(format!("{}/{}", mon.hp, mon.max_hp))
    } else {
        let percent = (mon.hp as u32 * 100).div_ceil(mon.max_hp.max(1) as u32);
        Ok(format!("{percent}/100"))
    }
}

/// Adds the source of an effect to a log entry, when it did not come from a move.
struct EffectSource(Option<String>);

impl EffectSource {
    fn new(battle: &CoreBattle, effect: Option<&EffectHandle>) -> Result<Self> {
        match effect {
            Some(effect) if !effect.is_move() => Ok(Self(Some(effect.full_name(&battle.dex)?))),
            _ => Ok(Self(None)),
        }
    }
}

impl EventLoggable for EffectSource {
    fn log(&self, event: &mut Event) {
        if let Some(from) = &self.0 {
            event.set("from", from.as_str());
        }
    }
}

pub fn switch(context: &mut Context, mon: MonHandle) -> Result<()> {
    let battle = context.battle();
    let mon_data = battle.mon(mon)?;
    let player = battle.player(mon_data.player)?;
    let event = log_event!(
        "switch",
        ("player", player.id.as_str()),
        ("position", mon_data.active_position.unwrap_or_default() + 1),
        ("name", mon_data.name.as_str()),
        ("health", mon_health(battle, mon)?),
        ("species", mon_data.species_name.as_str()),
        ("level", mon_data.level),
    );
    context.battle_mut().log.push(event);
    Ok(())
}

pub fn use_move(
    context: &mut Context,
    user: MonHandle,
    name: &str,
    target: Option<MonHandle>,
) -> Result<()> {
    let mut event = log_event!(
        "move",
        ("mon", mon_identity(context.battle(), user)?),
        ("name", name)
    );
    if let Some(target) = target {
        event.set("target", mon_identity(context.battle(), target)?);
    }
    context.battle_mut().log.push(event);
    Ok(())
}

/// Logs a move that found nothing to target.
pub fn use_move_without_target(context: &mut Context, user: MonHandle, name: &str) -> Result<()> {
    let event = log_event!(
        "move",
        ("mon", mon_identity(context.battle(), user)?),
        ("name", name),
        "notarget"
    );
    context.battle_mut().log.push(event);
    Ok(())
}

fn mon_event(context: &mut Context, title: &str, mon: MonHandle) -> Result<()> {
    let event = log_event!(title, ("mon", mon_identity(context.battle(), mon)?));
    context.battle_mut().log.push(event);
    Ok(())
}

pub fn fail(context: &mut Context, mon: MonHandle) -> Result<()> {
    mon_event(context, "fail", mon)
}

pub fn immune(context: &mut Context, mon: MonHandle) -> Result<()> {
    mon_event(context, "immune", mon)
}

pub fn crit(context: &mut Context, target: MonHandle) -> Result<()> {
    mon_event(context, "crit", target)
}

pub fn faint(context: &mut Context, mon: MonHandle) -> Result<()> {
    mon_event(context, "faint", mon)
}

pub fn miss(context: &mut Context, user: MonHandle, target: MonHandle) -> Result<()> {
    let event = log_event!(
        "miss",
        ("mon", mon_identity(context.battle(), user)?),
        ("target", mon_identity(context.battle(), target)?)
    );
    context.battle_mut().log.push(event);
    Ok(())
}

/// Logs type effectiveness, which is silent for neutral hits.
pub fn effectiveness(context: &mut Context, target: MonHandle, type_modifier: i8) -> Result<()> {
    match type_modifier {
        0 => Ok(()),
        modifier if modifier > 0 => mon_event(context, "supereffective", target),
        _ => mon_event(context, "resisted", target),
    }
}

/// Logs a Mon failing to move because of an effect.
pub fn cant(context: &mut Context, mon: MonHandle, reason: &EffectHandle) -> Result<()> {
    let event = log_event!(
        "cant",
        ("mon", mon_identity(context.battle(), mon)?),
        ("reason", reason.full_name(context.dex())?)
    );
    context.battle_mut().log.push(event);
    Ok(())
}

/// Logs an effect announcing itself on a Mon.
pub fn activate(context: &mut Context, mon: MonHandle, effect: &EffectHandle) -> Result<()> {
    let event = log_event!(
        "activate",
        ("mon", mon_identity(context.battle(), mon)?),
        (
            match effect {
                EffectHandle::Ability(_) => "ability",
                EffectHandle::Item(_) => "item",
                EffectHandle::Move(_) => "move",
                EffectHandle::Condition(_) => "condition",
            },
            effect.name(context.dex())?
        )
    );
    context.battle_mut().log.push(event);
    Ok(())
}

pub fn damage(
    context: &mut Context,
    mon: MonHandle,
    effect: Option<&EffectHandle>,
) -> Result<()> {
    let battle = context.battle();
    let event = log_event!(
        "damage",
        ("mon", mon_identity(battle, mon)?),
        ("health", mon_health(battle, mon)?),
        EffectSource::new(battle, effect)?,
    );
    context.battle_mut().log.push(event);
    Ok(())
}

/// Logs damage with an explicit source, such as recoil.
pub fn damage_from(context: &mut Context, mon: MonHandle, from: &str) -> Result<()> {
    let battle = context.battle();
    let event = log_event!(
        "damage",
        ("mon", mon_identity(battle, mon)?),
        ("health", mon_health(battle, mon)?),
        ("from", from),
    );
    context.battle_mut().log.push(event);
    Ok(())
}

pub fn heal(context: &mut Context, mon: MonHandle, effect: Option<&EffectHandle>) -> Result<()> {
    let battle = context.battle();
    let event = log_event!(
        "heal",
        ("mon", mon_identity(battle, mon)?),
        ("health", mon_health(battle, mon)?),
        EffectSource::new(battle, effect)?,
    );
    context.battle_mut().log.push(event);
    Ok(())
}

pub fn heal_from(context: &mut Context, mon: MonHandle, from: &str) -> Result<()> {
    let battle = context.battle();
    let event = log_event!(
        "heal",
        ("mon", mon_identity(battle, mon)?),
        ("health", mon_health(battle, mon)?),
        ("from", from),
    );
    context.battle_mut().log.push(event);
    Ok(())
}

/// Adds the effect source to an arbitrary log entry.
pub fn with_source(
    context: &Context,
    mut event: Event,
    effect: Option<&EffectHandle>,
) -> Result<Event> {
    event.extend(&EffectSource::new(context.battle(), effect)?);
    Ok(event)
}
