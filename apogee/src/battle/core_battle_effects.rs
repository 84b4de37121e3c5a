use anyhow::Result;

use crate::{
    battle::{
        Context,
        CoreBattle,
        EventContext,
        EventTarget,
        MonHandle,
        SpeedOrderable,
        core_battle_actions,
        foe_side_index,
    },
    common::{
        MODIFIER_BASE,
        modify,
    },
    effect::{
        AppliedEffectLocation,
        BattleEvent,
        EffectHandle,
        EventCallback,
        EventScope,
        Value,
    },
    error::{
        WrapResultError,
        invariant_violation_error,
    },
};

/// Events can trigger other events, but only this deep.
const MAX_EVENT_DEPTH: u8 = 8;

/// A handler found for an event, along with where its effect lives.
#[derive(Debug, Clone)]
struct CallbackHandle {
    effect: EffectHandle,
    location: AppliedEffectLocation,
    callback: EventCallback,
    speed: u32,
}

impl SpeedOrderable for CallbackHandle {
    fn order(&self) -> u32 {
        self.callback.order
    }

    fn priority(&self) -> i32 {
        self.callback.priority
    }

    fn sub_priority(&self) -> i32 {
        let sub_order = self
            .callback
            .sub_order
            .unwrap_or_else(|| self.location.default_sub_order());
        -(sub_order as i32)
    }

    fn speed(&self) -> u32 {
        self.speed
    }
}

/// How the results of handlers combine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DispatchMode {
    /// Every handler runs. A `false` vetoes the event.
    Run,
    /// The first handler with an opinion decides.
    Priority,
}

/// Every effect applied to a Mon.
pub fn mon_effects(
    battle: &CoreBattle,
    mon: MonHandle,
) -> Result<Vec<(EffectHandle, AppliedEffectLocation)>> {
    let mon_data = battle.mon(mon)?;
    let mut effects = Vec::new();
    if let Some(status) = &mon_data.status {
        effects.push((
            EffectHandle::Condition(status.clone()),
            AppliedEffectLocation::MonStatus(mon),
        ));
    }
    for volatile in mon_data.volatiles.keys() {
        effects.push((
            EffectHandle::Condition(volatile.clone()),
            AppliedEffectLocation::MonVolatile(mon, volatile.clone()),
        ));
    }
    effects.push((
        EffectHandle::Ability(mon_data.ability.clone()),
        AppliedEffectLocation::MonAbility(mon),
    ));
    if let Some(item) = &mon_data.item {
        effects.push((
            EffectHandle::Item(item.clone()),
            AppliedEffectLocation::MonItem(mon),
        ));
    }
    Ok(effects)
}

/// Every condition applied to a side.
pub fn side_effects(
    battle: &CoreBattle,
    side: usize,
) -> Result<Vec<(EffectHandle, AppliedEffectLocation)>> {
    Ok(battle
        .side(side)?
        .conditions
        .keys()
        .map(|condition| {
            (
                EffectHandle::Condition(condition.clone()),
                AppliedEffectLocation::SideCondition(side, condition.clone()),
            )
        })
        .collect())
}

/// Every condition applied to the field.
pub fn field_effects(battle: &CoreBattle) -> Vec<(EffectHandle, AppliedEffectLocation)> {
    let mut effects = Vec::new();
    if let Some(weather) = &battle.field.weather {
        effects.push((
            EffectHandle::Condition(weather.clone()),
            AppliedEffectLocation::Weather,
        ));
    }
    if let Some(terrain) = &battle.field.terrain {
        effects.push((
            EffectHandle::Condition(terrain.clone()),
            AppliedEffectLocation::Terrain,
        ));
    }
    for pseudo_weather in battle.field.pseudo_weathers.keys() {
        effects.push((
            EffectHandle::Condition(pseudo_weather.clone()),
            AppliedEffectLocation::PseudoWeather(pseudo_weather.clone()),
        ));
    }
    effects
}

fn holder_speed(battle: &CoreBattle, location: &AppliedEffectLocation) -> u32 {
    match location {
        AppliedEffectLocation::ActiveMove => battle
            .active_move
            .as_ref()
            .and_then(|active_move| battle.mon(active_move.user).ok())
            .map(|mon| mon.speed)
            .unwrap_or_default(),
        location => location
            .mon_handle()
            .and_then(|mon| battle.mon(mon).ok())
            .map(|mon| mon.speed)
            .unwrap_or_default(),
    }
}

fn add_handles<I>(
    battle: &CoreBattle,
    handles: &mut Vec<CallbackHandle>,
    effects: I,
    event: BattleEvent,
    scope: EventScope,
) where
    I: IntoIterator<Item = (EffectHandle, AppliedEffectLocation)>,
{
    for (effect, location) in effects {
        if let Some(callback) = battle.dex.library.callback(&effect, event, scope) {
            let speed = holder_speed(battle, &location);
            handles.push(CallbackHandle {
                effect,
                location,
                callback,
                speed,
            });
        }
    }
}

fn collect_handles(
    context: &mut Context,
    event: BattleEvent,
    target: EventTarget,
    source: Option<MonHandle>,
    source_effect: Option<&EffectHandle>,
) -> Result<Vec<CallbackHandle>> {
    let battle = context.battle();
    let mut handles = Vec::new();
    match target {
        EventTarget::Mon(target) => {
            let target_side = battle.mon(target)?.side;
            add_handles(
                battle,
                &mut handles,
                mon_effects(battle, target)?,
                event,
                EventScope::Target,
            );
            for mon in battle.active_mons() {
                let effects = mon_effects(battle, mon)?;
                let scope = if battle.mon(mon)?.side == target_side {
                    EventScope::Ally
                } else {
                    EventScope::Foe
                };
                add_handles(battle, &mut handles, effects.clone(), event, scope);
                add_handles(battle, &mut handles, effects, event, EventScope::Any);
            }
            add_handles(
                battle,
                &mut handles,
                side_effects(battle, target_side)?,
                event,
                EventScope::Target,
            );
            add_handles(
                battle,
                &mut handles,
                side_effects(battle, foe_side_index(target_side))?,
                event,
                EventScope::Foe,
            );
        }
        EventTarget::Side(side) => {
            add_handles(
                battle,
                &mut handles,
                side_effects(battle, side)?,
                event,
                EventScope::Target,
            );
        }
        EventTarget::Field => (),
    }
    add_handles(
        battle,
        &mut handles,
        field_effects(battle),
        event,
        EventScope::Target,
    );
    if let Some(source) = source {
        add_handles(
            battle,
            &mut handles,
            mon_effects(battle, source)?,
            event,
            EventScope::Source,
        );
    }
    if let Some(EffectHandle::Move(id)) = source_effect {
        if battle
            .active_move
            .as_ref()
            .is_some_and(|active_move| &active_move.id == id)
        {
            add_handles(
                battle,
                &mut handles,
                [(
                    EffectHandle::Move(id.clone()),
                    AppliedEffectLocation::ActiveMove,
                )],
                event,
                EventScope::Target,
            );
        }
    }

    context.battle_mut().speed_sort(&mut handles);
    Ok(handles)
}

fn enter_event(context: &mut Context, event: BattleEvent) -> Result<()> {
    let battle = context.battle_mut();
    if battle.event_depth >= MAX_EVENT_DEPTH {
        return Err(invariant_violation_error(format!(
            "{event} exceeded the maximum event depth"
        )));
    }
    battle.event_depth += 1;
    battle.event_modifiers.push(MODIFIER_BASE);
    Ok(())
}

fn exit_event(context: &mut Context) -> u32 {
    let battle = context.battle_mut();
    battle.event_depth = battle.event_depth.saturating_sub(1);
    battle.event_modifiers.pop().unwrap_or(MODIFIER_BASE)
}

fn apply_modifier(relay: Value, modifier: u32) -> Value {
    match relay {
        Value::Integer(value) if modifier != MODIFIER_BASE && value >= 0 => {
            let value = u32::try_from(value).unwrap_or(u32::MAX);
            Value::Integer(modify(value, modifier) as i64)
        }
        relay => relay,
    }
}

fn invoke(
    context: &mut Context,
    event: BattleEvent,
    handle: &CallbackHandle,
    target: EventTarget,
    source: Option<MonHandle>,
    source_effect: Option<&EffectHandle>,
    relay: Value,
) -> Result<Value> {
    let mut event_context = EventContext::new(
        Context::new(context.battle_mut()),
        event,
        handle.effect.clone(),
        handle.location.clone(),
        target,
        source,
        source_effect.cloned(),
    );
    (handle.callback.func)(&mut event_context, relay).wrap_error_with_format(format_args!(
        "{} failed to handle {event}",
        handle.effect
    ))
}

fn dispatch(
    context: &mut Context,
    event: BattleEvent,
    handles: Vec<CallbackHandle>,
    target: EventTarget,
    source: Option<MonHandle>,
    source_effect: Option<&EffectHandle>,
    mut relay: Value,
    mode: DispatchMode,
) -> Result<Value> {
    for handle in handles {
        if !context
            .battle()
            .is_effect_applied(&handle.location, &handle.effect)
        {
            continue;
        }
        let result = invoke(
            context,
            event,
            &handle,
            target,
            source,
            source_effect,
            relay.clone(),
        )?;
        match mode {
            DispatchMode::Run => {
                if result.is_false() {
                    log::debug!("{} vetoed {event}", handle.effect);
                    return Ok(result);
                }
                if !result.is_undefined() {
                    relay = result;
                }
            }
            DispatchMode::Priority => {
                if !result.is_undefined() {
                    return Ok(result);
                }
            }
        }
    }
    match mode {
        DispatchMode::Run => Ok(relay),
        DispatchMode::Priority => Ok(Value::Undefined),
    }
}

fn run_event_internal(
    context: &mut Context,
    event: BattleEvent,
    target: EventTarget,
    source: Option<MonHandle>,
    source_effect: Option<&EffectHandle>,
    relay: Value,
    mode: DispatchMode,
) -> Result<Value> {
    let handles = collect_handles(context, event, target, source, source_effect)?;
    if handles.is_empty() {
        return Ok(match mode {
            DispatchMode::Run => relay,
            DispatchMode::Priority => Value::Undefined,
        });
    }
    enter_event(context, event)?;
    let result = dispatch(
        context,
        event,
        handles,
        target,
        source,
        source_effect,
        relay,
        mode,
    );
    let modifier = exit_event(context);
    let result = result?;
    match mode {
        DispatchMode::Run => Ok(apply_modifier(result, modifier)),
        DispatchMode::Priority => Ok(result),
    }
}

/// Runs an event through every effect touching the target.
///
/// Each handler sees the value returned by the previous one. A `false` from any handler vetoes the
/// event and is returned immediately. Integer results are scaled by every modifier chained during
/// the event.
pub fn run_event(
    context: &mut Context,
    event: BattleEvent,
    target: EventTarget,
    source: Option<MonHandle>,
    source_effect: Option<&EffectHandle>,
    relay: Value,
) -> Result<Value> {
    run_event_internal(
        context,
        event,
        target,
        source,
        source_effect,
        relay,
        DispatchMode::Run,
    )
}

/// Runs an event until the first handler that has an opinion.
///
/// Returns [`Value::Undefined`] if no handler had one.
pub fn run_event_for_priority(
    context: &mut Context,
    event: BattleEvent,
    target: EventTarget,
    source: Option<MonHandle>,
    source_effect: Option<&EffectHandle>,
) -> Result<Value> {
    run_event_internal(
        context,
        event,
        target,
        source,
        source_effect,
        Value::Undefined,
        DispatchMode::Priority,
    )
}

/// Does the effect define a handler for the event on itself?
pub fn has_single_handler(context: &Context, effect: &EffectHandle, event: BattleEvent) -> bool {
    context
        .dex()
        .library
        .callback(effect, event, EventScope::Target)
        .is_some()
}

/// Runs the handler of a single effect, such as when it starts or ends.
///
/// Returns [`Value::Undefined`] when the effect does not handle the event.
pub fn run_single_event(
    context: &mut Context,
    event: BattleEvent,
    effect: &EffectHandle,
    location: AppliedEffectLocation,
    target: EventTarget,
    source: Option<MonHandle>,
    source_effect: Option<&EffectHandle>,
    relay: Value,
) -> Result<Value> {
    let callback = match context
        .dex()
        .library
        .callback(effect, event, EventScope::Target)
    {
        Some(callback) => callback,
        None => return Ok(Value::Undefined),
    };
    let handle = CallbackHandle {
        effect: effect.clone(),
        location,
        callback,
        speed: 0,
    };
    enter_event(context, event)?;
    let result = invoke(
        context,
        event,
        &handle,
        target,
        source,
        source_effect,
        relay,
    );
    let modifier = exit_event(context);
    Ok(apply_modifier(result?, modifier))
}

/// An effect waiting for its end-of-turn update.
#[derive(Debug, Clone)]
struct ResidualEntry {
    effect: EffectHandle,
    location: AppliedEffectLocation,
    target: EventTarget,
    callback: Option<EventCallback>,
    speed: u32,
}

impl SpeedOrderable for ResidualEntry {
    fn order(&self) -> u32 {
        self.callback
            .map(|callback| callback.order)
            .unwrap_or(u32::MAX)
    }

    fn priority(&self) -> i32 {
        self.callback
            .map(|callback| callback.priority)
            .unwrap_or_default()
    }

    fn sub_priority(&self) -> i32 {
        let sub_order = self
            .callback
            .and_then(|callback| callback.sub_order)
            .unwrap_or_else(|| self.location.default_sub_order());
        -(sub_order as i32)
    }

    fn speed(&self) -> u32 {
        self.speed
    }
}

fn collect_residuals(context: &mut Context) -> Result<Vec<ResidualEntry>> {
    let battle = context.battle();
    let mut candidates = Vec::new();
    for (effect, location) in field_effects(battle) {
        candidates.push((effect, location, EventTarget::Field));
    }
    for side in 0..battle.sides.len() {
        for (effect, location) in side_effects(battle, side)? {
            candidates.push((effect, location, EventTarget::Side(side)));
        }
    }
    for mon in battle.active_mons() {
        for (effect, location) in mon_effects(battle, mon)? {
            candidates.push((effect, location, EventTarget::Mon(mon)));
        }
    }

    let mut entries = Vec::new();
    for (effect, location, target) in candidates {
        let callback =
            battle
                .dex
                .library
                .callback(&effect, BattleEvent::Residual, EventScope::Target);
        let has_duration = battle
            .effect_state(&location)
            .is_ok_and(|state| state.duration.is_some());
        if callback.is_none() && !has_duration {
            continue;
        }
        let speed = holder_speed(battle, &location);
        entries.push(ResidualEntry {
            effect,
            location,
            target,
            callback,
            speed,
        });
    }
    context.battle_mut().speed_sort(&mut entries);
    Ok(entries)
}

/// Runs the end-of-turn update of every applied effect.
///
/// Durations tick down first. An effect whose duration runs out ends without running its residual
/// handler.
pub fn run_residual(context: &mut Context) -> Result<()> {
    for entry in collect_residuals(context)? {
        if !context
            .battle()
            .is_effect_applied(&entry.location, &entry.effect)
        {
            continue;
        }
        if let Some(mon) = entry.location.mon_handle() {
            let mon = context.mon(mon)?;
            if mon.fainted || mon.hp == 0 {
                continue;
            }
        }

        let state = context.battle_mut().effect_state_mut(&entry.location)?;
        state.turns += 1;
        if let Some(duration) = state.duration {
            let duration = duration.saturating_sub(1);
            state.duration = Some(duration);
            if duration == 0 {
                remove_effect(context, &entry.effect, &entry.location)?;
                continue;
            }
        }

        run_single_event(
            context,
            BattleEvent::Residual,
            &entry.effect,
            entry.location.clone(),
            entry.target,
            None,
            None,
            Value::Undefined,
        )?;
        context.battle_mut().faint_messages()?;
        if context.battle().ended {
            break;
        }
    }
    Ok(())
}

/// Removes an applied effect, running its end handler.
pub fn remove_effect(
    context: &mut Context,
    effect: &EffectHandle,
    location: &AppliedEffectLocation,
) -> Result<bool> {
    match location {
        AppliedEffectLocation::MonStatus(mon) => core_battle_actions::cure_status(context, *mon),
        AppliedEffectLocation::MonVolatile(mon, id) => {
            core_battle_actions::remove_volatile(context, *mon, id)
        }
        AppliedEffectLocation::SideCondition(side, id) => {
            core_battle_actions::remove_side_condition(context, *side, id)
        }
        AppliedEffectLocation::Weather => core_battle_actions::clear_weather(context),
        AppliedEffectLocation::Terrain => core_battle_actions::clear_terrain(context),
        AppliedEffectLocation::PseudoWeather(id) => {
            core_battle_actions::remove_pseudo_weather(context, id)
        }
        AppliedEffectLocation::MonAbility(_)
        | AppliedEffectLocation::MonItem(_)
        | AppliedEffectLocation::ActiveMove => Err(invariant_violation_error(format!(
            "{effect} cannot be removed"
        ))),
    }
}

