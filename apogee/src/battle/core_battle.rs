use std::{
    collections::VecDeque,
    time::{
        SystemTime,
        UNIX_EPOCH,
    },
};

use anyhow::Result;
use apogee_choice::Choice;
use apogee_data::{
    DataStore,
    Stat,
};
use apogee_prng::{
    PseudoRandomNumberGenerator,
    rand_util,
};

use crate::{
    battle::{
        Action,
        ActiveMove,
        BattleQueue,
        Context,
        CoreBattleEngineOptions,
        CoreBattleEngineRandomizeBaseDamage,
        CoreBattleOptions,
        EventTarget,
        Field,
        FormatData,
        Mon,
        MonHandle,
        MonMoveRequest,
        Player,
        PlayerState,
        Request,
        RequestState,
        Side,
        SpeedOrderable,
        core_battle_actions,
        core_battle_effects,
        core_battle_logs,
        speed_sort,
    },
    common::trunc,
    dex::Dex,
    effect::{
        AppliedEffectLocation,
        BattleEvent,
        EffectHandle,
        EffectState,
        Value,
    },
    error::{
        WrapOptionError,
        WrapResultError,
        choice_error,
        general_error,
        invariant_violation_error,
    },
    log::EventLog,
    log_event,
    teams::TeamValidator,
};

/// A Mon waiting to run its switch-in handlers.
struct SwitchInEntry {
    mon: MonHandle,
    speed: u32,
}

impl SpeedOrderable for SwitchInEntry {
    fn order(&self) -> u32 {
        0
    }

    fn priority(&self) -> i32 {
        0
    }

    fn sub_priority(&self) -> i32 {
        0
    }

    fn speed(&self) -> u32 {
        self.speed
    }
}

/// The core implementation of a battle.
///
/// All battle state lives here and is owned directly. Battle logic runs through a [`Context`],
/// which borrows the whole battle and looks objects up by handle.
pub struct CoreBattle<'d> {
    pub dex: Dex<'d>,
    pub engine_options: CoreBattleEngineOptions,
    pub format: FormatData,
    pub prng: Box<dyn PseudoRandomNumberGenerator>,
    pub log: EventLog,

    pub sides: Vec<Side>,
    pub players: Vec<Player>,
    pub mons: Vec<Mon>,
    pub field: Field,
    pub queue: BattleQueue,

    pub turn: u64,
    pub started: bool,
    pub ended: bool,
    pub winner: Option<usize>,

    /// The move currently being used.
    pub active_move: Option<ActiveMove>,
    /// One modifier frame per running event.
    pub event_modifiers: Vec<u32>,
    pub event_depth: u8,
    /// Mons that reached zero HP, waiting for their faint to be processed.
    pub faint_queue: VecDeque<MonHandle>,
}

impl Clone for CoreBattle<'_> {
    fn clone(&self) -> Self {
        Self {
            dex: self.dex.clone(),
            engine_options: self.engine_options.clone(),
            format: self.format.clone(),
            prng: self.prng.box_clone(),
            log: self.log.clone(),
            sides: self.sides.clone(),
            players: self.players.clone(),
            mons: self.mons.clone(),
            field: self.field.clone(),
            queue: self.queue.clone(),
            turn: self.turn,
            started: self.started,
            ended: self.ended,
            winner: self.winner,
            active_move: self.active_move.clone(),
            event_modifiers: self.event_modifiers.clone(),
            event_depth: self.event_depth,
            faint_queue: self.faint_queue.clone(),
        }
    }
}

impl<'d> CoreBattle<'d> {
    /// Creates a new battle from options.
    pub fn from_options(
        options: CoreBattleOptions,
        data: &'d dyn DataStore,
        engine_options: CoreBattleEngineOptions,
    ) -> Result<Self> {
        options.validate()?;
        let dex = Dex::new(data, engine_options.effect_library.clone())?;
        let active_per_player = options.format.battle_type.active_per_player();

        let mut sides = Vec::with_capacity(2);
        let mut players = Vec::with_capacity(2);
        let mut mons = Vec::new();
        {
            let validator = TeamValidator::new(&dex);
            for (index, side_data) in [&options.side_1, &options.side_2].into_iter().enumerate() {
                let player_data = side_data
                    .players
                    .first()
                    .wrap_expectation_with_format(format_args!("{} has no players", side_data.name))?;
                validator
                    .validate_team(&player_data.team)
                    .wrap_error_with_format(format_args!(
                        "player {} has an invalid team",
                        player_data.id
                    ))?;

                let mut player = Player::new(player_data, index, active_per_player);
                for (team_position, mon_data) in player_data.team.members.iter().enumerate() {
                    let handle = MonHandle(mons.len());
                    mons.push(Mon::new(
                        mon_data,
                        &dex,
                        handle,
                        index,
                        index,
                        team_position,
                    )?);
                    player.mons.push(handle);
                }
                players.push(player);
                sides.push(Side::new(side_data.name.clone(), index, index));
            }
        }

        let prng = (engine_options.rng_factory)(options.seed);
        Ok(Self {
            dex,
            engine_options,
            format: options.format,
            prng,
            log: EventLog::new(),
            sides,
            players,
            mons,
            field: Field::default(),
            queue: BattleQueue::new(),
            turn: 0,
            started: false,
            ended: false,
            winner: None,
            active_move: None,
            event_modifiers: Vec::new(),
            event_depth: 0,
            faint_queue: VecDeque::new(),
        })
    }

    pub fn mon(&self, mon: MonHandle) -> Result<&Mon> {
        self.mons
            .get(mon.0)
            .wrap_not_found_error_with_format(format_args!("mon {mon}"))
    }

    pub fn mon_mut(&mut self, mon: MonHandle) -> Result<&mut Mon> {
        self.mons
            .get_mut(mon.0)
            .wrap_not_found_error_with_format(format_args!("mon {mon}"))
    }

    pub fn player(&self, player: usize) -> Result<&Player> {
        self.players
            .get(player)
            .wrap_not_found_error_with_format(format_args!("player {player}"))
    }

    pub fn player_mut(&mut self, player: usize) -> Result<&mut Player> {
        self.players
            .get_mut(player)
            .wrap_not_found_error_with_format(format_args!("player {player}"))
    }

    pub fn side(&self, side: usize) -> Result<&Side> {
        self.sides
            .get(side)
            .wrap_not_found_error_with_format(format_args!("side {side}"))
    }

    pub fn side_mut(&mut self, side: usize) -> Result<&mut Side> {
        self.sides
            .get_mut(side)
            .wrap_not_found_error_with_format(format_args!("side {side}"))
    }

    /// Looks up a player index by ID.
    pub fn player_by_id(&self, id: &str) -> Result<usize> {
        self.players
            .iter()
            .position(|player| player.id == id)
            .wrap_not_found_error_with_format(format_args!("player {id}"))
    }

    /// Every active Mon that has not fainted, by side and then position.
    pub fn active_mons(&self) -> Vec<MonHandle> {
        self.players
            .iter()
            .flat_map(|player| player.active.iter().flatten().copied())
            .filter(|mon| self.mon(*mon).is_ok_and(|mon| mon.hp > 0 && !mon.fainted))
            .collect()
    }

    /// Sorts items by speed order, resolving ties as configured.
    pub fn speed_sort<T>(&mut self, items: &mut [T])
    where
        for<'a> &'a T: SpeedOrderable,
    {
        speed_sort(
            items,
            self.prng.as_mut(),
            self.engine_options.speed_sort_tie_resolution,
        );
    }

    /// Applies the random factor of the damage calculation.
    pub fn randomize_base_damage(&mut self, base_damage: u32) -> u32 {
        let roll = match self.engine_options.randomize_base_damage {
            CoreBattleEngineRandomizeBaseDamage::Randomize => {
                rand_util::range(self.prng.as_mut(), 0, 16) as u32
            }
            CoreBattleEngineRandomizeBaseDamage::Max => 0,
            CoreBattleEngineRandomizeBaseDamage::Min => 15,
        };
        base_damage * (100 - roll) / 100
    }

    /// Is the effect still applied at the location?
    ///
    /// Handlers collected for an event may be removed by an earlier handler of the same event.
    pub fn is_effect_applied(
        &self,
        location: &AppliedEffectLocation,
        effect: &EffectHandle,
    ) -> bool {
        let id = effect.id();
        match location {
            AppliedEffectLocation::MonAbility(mon) => {
                self.mon(*mon).is_ok_and(|mon| &mon.ability == id)
            }
            AppliedEffectLocation::MonItem(mon) => self
                .mon(*mon)
                .is_ok_and(|mon| mon.item.as_ref() == Some(id)),
            AppliedEffectLocation::MonStatus(mon) => self
                .mon(*mon)
                .is_ok_and(|mon| mon.status.as_ref() == Some(id)),
            AppliedEffectLocation::MonVolatile(mon, volatile) => self
                .mon(*mon)
                .is_ok_and(|mon| mon.volatiles.contains_key(volatile)),
            AppliedEffectLocation::SideCondition(side, condition) => self
                .side(*side)
                .is_ok_and(|side| side.conditions.contains_key(condition)),
            AppliedEffectLocation::Weather => self.field.weather.as_ref() == Some(id),
            AppliedEffectLocation::Terrain => self.field.terrain.as_ref() == Some(id),
            AppliedEffectLocation::PseudoWeather(pseudo_weather) => {
                self.field.pseudo_weathers.contains_key(pseudo_weather)
            }
            AppliedEffectLocation::ActiveMove => self
                .active_move
                .as_ref()
                .is_some_and(|active_move| &active_move.id == id),
        }
    }

    /// The state of an applied effect.
    pub fn effect_state(&self, location: &AppliedEffectLocation) -> Result<&EffectState> {
        match location {
            AppliedEffectLocation::MonAbility(mon) => Ok(&self.mon(*mon)?.ability_state),
            AppliedEffectLocation::MonItem(mon) => Ok(&self.mon(*mon)?.item_state),
            AppliedEffectLocation::MonStatus(mon) => Ok(&self.mon(*mon)?.status_state),
            AppliedEffectLocation::MonVolatile(mon, volatile) => self
                .mon(*mon)?
                .volatiles
                .get(volatile)
                .wrap_not_found_error_with_format(format_args!("volatile {volatile}")),
            AppliedEffectLocation::SideCondition(side, condition) => self
                .side(*side)?
                .conditions
                .get(condition)
                .wrap_not_found_error_with_format(format_args!("side condition {condition}")),
            AppliedEffectLocation::Weather => Ok(&self.field.weather_state),
            AppliedEffectLocation::Terrain => Ok(&self.field.terrain_state),
            AppliedEffectLocation::PseudoWeather(pseudo_weather) => self
                .field
                .pseudo_weathers
                .get(pseudo_weather)
                .wrap_not_found_error_with_format(format_args!("pseudo-weather {pseudo_weather}")),
            AppliedEffectLocation::ActiveMove => {
                Err(general_error("the active move has no effect state"))
            }
        }
    }

    pub fn effect_state_mut(
        &mut self,
        location: &AppliedEffectLocation,
    ) -> Result<&mut EffectState> {
        match location {
            AppliedEffectLocation::MonAbility(mon) => Ok(&mut self.mon_mut(*mon)?.ability_state),
            AppliedEffectLocation::MonItem(mon) => Ok(&mut self.mon_mut(*mon)?.item_state),
            AppliedEffectLocation::MonStatus(mon) => Ok(&mut self.mon_mut(*mon)?.status_state),
            AppliedEffectLocation::MonVolatile(mon, volatile) => self
                .mon_mut(*mon)?
                .volatiles
                .get_mut(volatile)
                .wrap_not_found_error_with_format(format_args!("volatile {volatile}")),
            AppliedEffectLocation::SideCondition(side, condition) => self
                .side_mut(*side)?
                .conditions
                .get_mut(condition)
                .wrap_not_found_error_with_format(format_args!("side condition {condition}")),
            AppliedEffectLocation::Weather => Ok(&mut self.field.weather_state),
            AppliedEffectLocation::Terrain => Ok(&mut self.field.terrain_state),
            AppliedEffectLocation::PseudoWeather(pseudo_weather) => self
                .field
                .pseudo_weathers
                .get_mut(pseudo_weather)
                .wrap_not_found_error_with_format(format_args!("pseudo-weather {pseudo_weather}")),
            AppliedEffectLocation::ActiveMove => {
                Err(general_error("the active move has no effect state"))
            }
        }
    }

    /// Starts the battle.
    pub fn start(&mut self) -> Result<()> {
        if self.started {
            return Err(general_error("battle already started"));
        }
        self.started = true;
        let mut context = Context::new(self);
        Self::start_internal(&mut context)
    }

    fn start_internal(context: &mut Context) -> Result<()> {
        let battle = context.battle();
        let mut events = vec![log_event!(
            "info",
            ("battletype", battle.format.battle_type)
        )];
        events.extend(
            battle
                .sides
                .iter()
                .map(|side| log_event!("side", ("id", side.index), ("name", side.name.as_str()))),
        );
        events.extend(battle.players.iter().map(|player| {
            log_event!(
                "player",
                ("id", player.id.as_str()),
                ("name", player.name.as_str()),
                ("side", player.side),
            )
        }));
        events.extend(battle.players.iter().map(|player| {
            log_event!(
                "teamsize",
                ("player", player.id.as_str()),
                ("size", player.mons.len()),
            )
        }));
        context.battle_mut().log.push_extend(events);

        if context.battle().format.team_preview {
            let mut events = vec![log_event!("teampreviewstart")];
            let battle = context.battle();
            for player in &battle.players {
                for mon in &player.mons {
                    let mon = battle.mon(*mon)?;
                    events.push(log_event!(
                        "mon",
                        ("player", player.id.as_str()),
                        ("name", mon.name.as_str()),
                        ("species", mon.species_name.as_str()),
                        ("level", mon.level),
                    ));
                }
            }
            events.push(log_event!("teampreview"));
            let battle = context.battle_mut();
            battle.log.push_extend(events);
            for player in &mut battle.players {
                player.state = PlayerState::TeamPreviewSelect;
            }
            log::debug!("battle waiting on team preview");
            return Ok(());
        }

        context.battle_mut().queue.push(Action::Start);
        Self::run_queue(context)
    }

    /// Submits a choice for a player.
    ///
    /// The choice is validated against the player's current request. Once no player has anything
    /// left to choose, the turn runs until the next request.
    pub fn set_player_choice(&mut self, player_id: &str, choices: Vec<Choice>) -> Result<()> {
        if !self.started {
            return Err(general_error("battle has not started"));
        }
        if self.ended {
            return Err(choice_error("the battle is over"));
        }
        let player = self.player_by_id(player_id)?;
        let actions = Player::validate_choices(self, player, &choices)?;
        let player_data = self.player_mut(player)?;
        player_data.pending = actions;
        player_data.state = player_data.state.locked();
        log::debug!("{player_id} locked in {} choice(s)", choices.len());

        if self.players.iter().any(|player| player.state.is_selecting()) {
            return Ok(());
        }
        let mut context = Context::new(self);
        Self::commit_choices(&mut context)?;
        Self::run_queue(&mut context)
    }

    fn commit_choices(context: &mut Context) -> Result<()> {
        Self::update_speed(context)?;
        let mut sort = false;
        let mut new_turn = false;
        for player in 0..context.battle().players.len() {
            let player_data = context.player_mut(player)?;
            let state = player_data.state;
            let actions = std::mem::take(&mut player_data.pending);
            player_data.state = PlayerState::Idle;
            // A turn ends with residuals even if every player passed.
            new_turn |= state == PlayerState::MoveSwitchLocked;
            for mut action in actions {
                match state {
                    PlayerState::TeamPreviewLocked => {
                        context.battle_mut().queue.push(action);
                        sort = true;
                    }
                    PlayerState::MoveSwitchLocked => {
                        Self::prepare_action(context, &mut action)?;
                        context.battle_mut().queue.push(action);
                        sort = true;
                    }
                    PlayerState::FaintedLocked => {
                        Self::prepare_action(context, &mut action)?;
                        context.battle_mut().queue.push(action);
                        sort = true;
                    }
                    PlayerState::ForceSwitchLocked => {
                        Self::prepare_action(context, &mut action)?;
                        context.battle_mut().queue.push_front(action);
                    }
                    state => {
                        return Err(invariant_violation_error(format!(
                            "player {player} committed actions in state {state}"
                        )));
                    }
                }
            }
            if state == PlayerState::TeamPreviewLocked {
                // Both players lock team preview at once, so the start only needs queuing once.
                if !context
                    .battle()
                    .queue
                    .iter()
                    .any(|action| *action == Action::Start)
                {
                    context.battle_mut().queue.push(Action::Start);
                }
            }
        }
        // Players waiting on a mid-turn switch stay locked, but their turn is already queued.
        if new_turn
            && !context
                .battle()
                .queue
                .iter()
                .any(|action| *action == Action::Residual)
        {
            context.battle_mut().queue.push(Action::Residual);
        }
        if sort {
            let battle = context.battle_mut();
            let tie_resolution = battle.engine_options.speed_sort_tie_resolution;
            battle.queue.sort(battle.prng.as_mut(), tie_resolution);
        }
        Ok(())
    }

    /// Computes the speed and priority used to order an action.
    fn prepare_action(context: &mut Context, action: &mut Action) -> Result<()> {
        match action {
            Action::Move(move_action) => {
                let data = context.dex().moves.get_by_id(&move_action.id)?;
                let priority = data.priority as i64;
                let previous = context.battle_mut().active_move.replace(ActiveMove::new(
                    move_action.id.clone(),
                    data.as_ref().clone(),
                    move_action.mon,
                ));
                let priority = core_battle_effects::run_event(
                    context,
                    BattleEvent::ModifyPriority,
                    EventTarget::Mon(move_action.mon),
                    None,
                    Some(&EffectHandle::Move(move_action.id.clone())),
                    Value::Integer(priority),
                );
                context.battle_mut().active_move = previous;
                move_action.priority = priority?.integer().unwrap_or(data.priority as i64) as i32;
                move_action.speed = context.mon(move_action.mon)?.speed;
            }
            Action::Terastallize(mon_action) => {
                mon_action.speed = context.mon(mon_action.mon)?.speed;
            }
            Action::Switch(switch_action) => {
                let outgoing = context
                    .player(switch_action.player)?
                    .active_mon(switch_action.position);
                let speed = match outgoing {
                    Some(mon) => context.mon(mon)?.speed,
                    None => context.mon(switch_action.mon)?.speed,
                };
                switch_action.speed = speed;
            }
            Action::Start | Action::Team(_) | Action::Residual => (),
        }
        Ok(())
    }

    /// Runs actions until the queue empties, the battle ends, or a player must choose something.
    fn run_queue(context: &mut Context) -> Result<()> {
        loop {
            if context.battle().ended {
                return Ok(());
            }
            let action = match context.battle_mut().queue.pop_front() {
                Some(action) => action,
                None => break,
            };
            Self::run_action(context, action)?;
            Self::faint_messages_internal(context)?;
            if context.battle().ended {
                context.battle_mut().queue.clear();
                return Ok(());
            }
            if Self::check_force_switch(context)? {
                return Ok(());
            }
        }
        Self::end_of_queue(context)
    }

    /// Requests a mid-turn switch from the player whose Mon must switch out.
    fn check_force_switch(context: &mut Context) -> Result<bool> {
        let battle = context.battle();
        let forced = battle
            .players
            .iter()
            .filter(|player| {
                player.active.iter().flatten().any(|mon| {
                    battle
                        .mon(*mon)
                        .is_ok_and(|mon| mon.force_switch && mon.hp > 0)
                })
            })
            .map(|player| player.index)
            .collect::<Vec<_>>();
        match forced.as_slice() {
            [] => Ok(false),
            [player] => {
                let player = *player;
                let battle = context.battle_mut();
                for index in 0..battle.players.len() {
                    let state = if index == player {
                        PlayerState::ForceSwitchSelect
                    } else if battle.queue.has_action_for_player(index) {
                        PlayerState::MoveSwitchLocked
                    } else {
                        PlayerState::Idle
                    };
                    battle.players[index].state = state;
                }
                log::debug!("player {player} must switch mid-turn");
                Ok(true)
            }
            _ => Err(invariant_violation_error(
                "more than one player cannot be forced to switch at once",
            )),
        }
    }

    fn end_of_queue(context: &mut Context) -> Result<()> {
        let mut needs_replacement = Vec::new();
        let battle = context.battle();
        for player in &battle.players {
            let fainted = Player::positions_needing_switch(player, |mon| {
                battle.mon(mon).is_ok_and(|mon| mon.fainted)
            });
            if !fainted.is_empty() && !Player::switchable_mons(battle, player).is_empty() {
                needs_replacement.push(player.index);
            }
        }
        if needs_replacement.is_empty() {
            return Self::next_turn(context);
        }
        for player in &mut context.battle_mut().players {
            player.state = if needs_replacement.contains(&player.index) {
                PlayerState::FaintedSelect
            } else {
                PlayerState::Idle
            };
        }
        log::debug!("waiting on replacements for fainted mons");
        Ok(())
    }

    fn next_turn(context: &mut Context) -> Result<()> {
        let battle = context.battle_mut();
        battle.turn += 1;
        if battle.turn > battle.engine_options.turn_limit {
            battle.log.push(log_event!("turnlimit"));
            return Self::win(context, None);
        }

        for mon in context.battle().active_mons() {
            let mon_data = context.mon_mut(mon)?;
            mon_data.active_turns += 1;
            for slot in &mut mon_data.move_slots {
                slot.disabled = false;
            }
            core_battle_effects::run_event(
                context,
                BattleEvent::DisableMove,
                EventTarget::Mon(mon),
                None,
                None,
                Value::Undefined,
            )?;
            let trapped = core_battle_effects::run_event_for_priority(
                context,
                BattleEvent::TrapMon,
                EventTarget::Mon(mon),
                None,
                None,
            )?
            .boolean()
                == Some(true);
            context.mon_mut(mon)?.trapped = trapped;
        }
        Self::update_speed(context)?;

        let battle = context.battle_mut();
        battle.log.push(log_event!("turn", ("turn", battle.turn)));
        if battle.engine_options.log_time {
            let now = SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .map(|duration| duration.as_millis())
                .unwrap_or_default();
            battle.log.push(log_event!("time", ("value", now)));
        }
        for player in &mut battle.players {
            player.state = PlayerState::MoveSwitchSelect;
        }
        log::debug!("turn {} started", battle.turn);
        Ok(())
    }

    /// Updates the cached action speed of every active Mon.
    fn update_speed(context: &mut Context) -> Result<()> {
        let trick_room = context.battle().field.has_pseudo_weather("trickroom");
        for mon in context.battle().active_mons() {
            let speed = context.mon(mon)?.boosted_stat(Stat::Spe);
            let speed = core_battle_effects::run_event(
                context,
                BattleEvent::ModifySpe,
                EventTarget::Mon(mon),
                None,
                None,
                Value::Integer(speed as i64),
            )?
            .integer()
            .map(|speed| u32::try_from(speed.max(0)).unwrap_or(u32::MAX))
            .unwrap_or(speed);
            let speed = if trick_room {
                trunc(10000u32.saturating_sub(speed), 13)
            } else {
                speed
            };
            context.mon_mut(mon)?.speed = speed;
        }
        Ok(())
    }

    fn run_action(context: &mut Context, action: Action) -> Result<()> {
        match action {
            Action::Start => {
                context.battle_mut().log.push(log_event!("start"));
                let active_per_player = context.battle().format.battle_type.active_per_player();
                for player in 0..context.battle().players.len() {
                    let leads = context
                        .player(player)?
                        .mons
                        .iter()
                        .take(active_per_player)
                        .copied()
                        .collect::<Vec<_>>();
                    for (position, mon) in leads.into_iter().enumerate() {
                        core_battle_actions::switch_in(context, player, position, mon, false)?;
                    }
                }
                Self::update_speed(context)?;
                let mut entries = context
                    .battle()
                    .active_mons()
                    .into_iter()
                    .map(|mon| {
                        Ok(SwitchInEntry {
                            mon,
                            speed: context.mon(mon)?.speed,
                        })
                    })
                    .collect::<Result<Vec<_>>>()?;
                context.battle_mut().speed_sort(&mut entries);
                for entry in entries {
                    if context.mon(entry.mon)?.hp == 0 {
                        continue;
                    }
                    core_battle_effects::run_event(
                        context,
                        BattleEvent::SwitchIn,
                        EventTarget::Mon(entry.mon),
                        None,
                        None,
                        Value::Undefined,
                    )?;
                    if context.battle().ended {
                        break;
                    }
                }
            }
            Action::Team(action) => {
                let player = context.player_mut(action.player)?;
                let mut order = action
                    .order
                    .iter()
                    .filter_map(|index| player.mons.get(*index).copied())
                    .collect::<Vec<_>>();
                order.extend(
                    player
                        .mons
                        .iter()
                        .enumerate()
                        .filter(|(index, _)| !action.order.contains(index))
                        .map(|(_, mon)| *mon),
                );
                player.mons = order.clone();
                for (team_position, mon) in order.into_iter().enumerate() {
                    context.mon_mut(mon)?.team_position = team_position;
                }
            }
            Action::Switch(action) => {
                let mon = context.mon(action.mon)?;
                if mon.active || mon.fainted {
                    log::debug!("skipping switch for {}, which cannot switch in", mon.name);
                    return Ok(());
                }
                core_battle_actions::switch_in(
                    context,
                    action.player,
                    action.position,
                    action.mon,
                    true,
                )?;
            }
            Action::Terastallize(action) => {
                if context.mon(action.mon)?.is_active_and_alive() {
                    core_battle_actions::terastallize(context, action.mon)?;
                }
            }
            Action::Move(action) => {
                let mon = context.mon(action.mon)?;
                if !mon.is_active_and_alive() || mon.fainted {
                    return Ok(());
                }
                core_battle_actions::do_move(
                    context,
                    action.mon,
                    &action.id,
                    action.target,
                    Some(action.priority),
                )?;
            }
            Action::Residual => {
                core_battle_effects::run_residual(context)?;
                if !context.battle().ended {
                    context.battle_mut().log.push(log_event!("residual"));
                }
            }
        }
        Ok(())
    }

    /// Processes every Mon that reached zero HP, then checks if the battle is over.
    pub fn faint_messages(&mut self) -> Result<()> {
        let mut context = Context::new(self);
        Self::faint_messages_internal(&mut context)
    }

    fn faint_messages_internal(context: &mut Context) -> Result<()> {
        while let Some(mon) = context.battle_mut().faint_queue.pop_front() {
            if context.mon(mon)?.fainted {
                continue;
            }
            core_battle_logs::faint(context, mon)?;
            core_battle_actions::clear_volatiles(context, mon)?;
            let mon_data = context.mon_mut(mon)?;
            mon_data.fainted = true;
            mon_data.hp = 0;
            mon_data.status = None;
            mon_data.status_state = EffectState::default();
            mon_data.boosts = Default::default();
            mon_data.force_switch = false;
            mon_data.trapped = false;
        }
        Self::check_win(context)
    }

    fn check_win(context: &mut Context) -> Result<()> {
        if context.battle().ended {
            return Ok(());
        }
        let battle = context.battle();
        let mons_left = battle
            .players
            .iter()
            .map(|player| {
                player
                    .mons
                    .iter()
                    .any(|mon| battle.mon(*mon).is_ok_and(|mon| mon.hp > 0))
            })
            .collect::<Vec<_>>();
        match mons_left.as_slice() {
            [true, false] => Self::win(context, Some(0)),
            [false, true] => Self::win(context, Some(1)),
            [false, false] => Self::win(context, None),
            _ => Ok(()),
        }
    }

    fn win(context: &mut Context, side: Option<usize>) -> Result<()> {
        let battle = context.battle_mut();
        match side {
            Some(side) => battle.log.push(log_event!("win", ("side", side))),
            None => battle.log.push(log_event!("tie")),
        }
        battle.ended = true;
        battle.winner = side;
        battle.queue.clear();
        for player in &mut battle.players {
            player.state = PlayerState::Idle;
            player.pending.clear();
        }
        log::debug!("battle ended on turn {}", battle.turn);
        Ok(())
    }

    /// What the battle is waiting on.
    pub fn request_state(&self) -> RequestState {
        if self.ended {
            return match self.winner {
                Some(side) => RequestState::Win(side),
                None => RequestState::Tie,
            };
        }
        let selecting = self
            .players
            .iter()
            .filter(|player| player.state.is_selecting())
            .collect::<Vec<_>>();
        match selecting.as_slice() {
            [] => RequestState::Pending,
            [player] => RequestState::RequestingPlayer(player.id.clone()),
            _ => RequestState::RequestingBoth,
        }
    }

    /// The request a player must answer, if any.
    pub fn request_for_player(&self, player_id: &str) -> Result<Option<Request>> {
        let player = self.player(self.player_by_id(player_id)?)?;
        match player.state {
            PlayerState::TeamPreviewSelect => Ok(Some(Request::TeamPreview {
                max_team_size: player.mons.len(),
            })),
            PlayerState::MoveSwitchSelect => {
                let mut active = Vec::with_capacity(player.active.len());
                for mon in &player.active {
                    let request = match mon {
                        Some(mon) if self.mon(*mon)?.is_active_and_alive() => {
                            let mon = self.mon(*mon)?;
                            Some(MonMoveRequest {
                                team_position: mon.team_position,
                                moves: mon.move_slots.clone(),
                                trapped: mon.trapped,
                                can_terastallize: player.can_terastallize
                                    && mon.can_terastallize(),
                                tera_type: mon.tera_type,
                            })
                        }
                        _ => None,
                    };
                    active.push(request);
                }
                Ok(Some(Request::Turn { active }))
            }
            PlayerState::FaintedSelect => Ok(Some(Request::Switch {
                needs_switch: Player::positions_needing_switch(player, |mon| {
                    self.mon(mon).is_ok_and(|mon| mon.fainted)
                }),
            })),
            PlayerState::ForceSwitchSelect => Ok(Some(Request::Switch {
                needs_switch: Player::positions_needing_switch(player, |mon| {
                    self.mon(mon).is_ok_and(|mon| mon.force_switch)
                }),
            })),
            _ => Ok(None),
        }
    }

    /// Every choice a player could currently submit.
    pub fn available_choices(&self, player_id: &str) -> Result<Vec<Vec<Choice>>> {
        Player::available_choices(self, self.player_by_id(player_id)?)
    }
}

#[cfg(test)]
mod core_battle_test {
    use apogee_data::LocalDataStore;
    use pretty_assertions::assert_eq;

    use crate::battle::{
        CoreBattle,
        CoreBattleEngineOptions,
        CoreBattleEngineRandomizeBaseDamage,
        CoreBattleOptions,
        PlayerState,
        RequestState,
    };

    fn options(team_preview: bool) -> CoreBattleOptions {
        serde_json::from_str(&format!(
            r#"{{
                "seed": 0,
                "format": {{ "battle_type": "Singles", "team_preview": {team_preview} }},
                "side_1": {{
                    "name": "Side 1",
                    "players": [{{
                        "id": "player-1",
                        "name": "Player 1",
                        "team": {{ "members": [
                            {{ "name": "Pikachu", "species": "Pikachu", "ability": "Static", "moves": ["Thunderbolt"] }},
                            {{ "name": "Eevee", "species": "Eevee", "ability": "Adaptability", "moves": ["Tackle"] }}
                        ] }}
                    }}]
                }},
                "side_2": {{
                    "name": "Side 2",
                    "players": [{{
                        "id": "player-2",
                        "name": "Player 2",
                        "team": {{ "members": [
                            {{ "name": "Machamp", "species": "Machamp", "ability": "Guts", "moves": ["Tackle"] }}
                        ] }}
                    }}]
                }}
            }}"#
        ))
        .unwrap()
    }

    #[test]
    fn starts_with_leads_and_requests_turn() {
        let data = LocalDataStore::new(concat!(env!("CARGO_MANIFEST_DIR"), "/../data")).unwrap();
        let mut battle =
            CoreBattle::from_options(options(false), &data, CoreBattleEngineOptions::default())
                .unwrap();
        battle.start().unwrap();
        assert_eq!(battle.turn, 1);
        assert_eq!(battle.request_state(), RequestState::RequestingBoth);
        assert!(
            battle
                .players
                .iter()
                .all(|player| player.state == PlayerState::MoveSwitchSelect)
        );
        assert_eq!(battle.active_mons().len(), 2);
        assert!(battle.log.logs().any(|log| log == "start"));
        assert!(battle.log.logs().any(|log| log == "turn|turn:1"));
    }

    #[test]
    fn waits_for_team_preview() {
        let data = LocalDataStore::new(concat!(env!("CARGO_MANIFEST_DIR"), "/../data")).unwrap();
        let mut battle =
            CoreBattle::from_options(options(true), &data, CoreBattleEngineOptions::default())
                .unwrap();
        battle.start().unwrap();
        assert_eq!(battle.turn, 0);
        assert!(battle.active_mons().is_empty());
        assert_eq!(battle.request_state(), RequestState::RequestingBoth);
        assert!(battle.start().is_err());
    }

    #[test]
    fn fixes_random_damage_factor() {
        let data = LocalDataStore::new(concat!(env!("CARGO_MANIFEST_DIR"), "/../data")).unwrap();
        let mut battle = CoreBattle::from_options(
            options(false),
            &data,
            CoreBattleEngineOptions {
                randomize_base_damage: CoreBattleEngineRandomizeBaseDamage::Min,
                ..Default::default()
            },
        )
        .unwrap();
        assert_eq!(battle.randomize_base_damage(100), 85);
        battle.engine_options.randomize_base_damage = CoreBattleEngineRandomizeBaseDamage::Max;
        assert_eq!(battle.randomize_base_damage(100), 100);
    }
}
