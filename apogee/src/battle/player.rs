use ahash::HashSet;
use anyhow::Result;
use apogee_choice::{
    Choice,
    MoveChoice,
    SwitchChoice,
    TeamSelectionChoice,
};
use apogee_data::{
    Id,
    MoveTarget,
};
use serde::{
    Deserialize,
    Serialize,
};
use serde_string_enum::{
    DeserializeLabeledStringEnum,
    SerializeLabeledStringEnum,
};

use crate::{
    battle::{
        Action,
        CoreBattle,
        MonAction,
        MonHandle,
        MoveAction,
        SwitchAction,
        TeamAction,
    },
    error::choice_error,
    teams::TeamData,
};

/// Data for a single player of a battle.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerData {
    /// Unique identifier, used to submit choices.
    pub id: String,
    /// Player's name.
    pub name: String,
    /// Player's team.
    #[serde(default)]
    pub team: TeamData,
}

/// The state of a player, which determines which choices it may submit.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, SerializeLabeledStringEnum, DeserializeLabeledStringEnum,
)]
pub enum PlayerState {
    #[string = "TeamPreviewSelect"]
    TeamPreviewSelect,
    #[string = "TeamPreviewLocked"]
    TeamPreviewLocked,
    #[string = "MoveSwitchSelect"]
    MoveSwitchSelect,
    #[string = "MoveSwitchLocked"]
    MoveSwitchLocked,
    #[string = "FaintedSelect"]
    FaintedSelect,
    #[string = "FaintedLocked"]
    FaintedLocked,
    #[string = "ForceSwitchSelect"]
    ForceSwitchSelect,
    #[string = "ForceSwitchLocked"]
    ForceSwitchLocked,
    /// Waiting on the other player, or the battle is over.
    #[string = "Idle"]
    Idle,
}

impl PlayerState {
    /// Is the player expected to submit a choice?
    pub fn is_selecting(&self) -> bool {
        matches!(
            self,
            Self::TeamPreviewSelect
                | Self::MoveSwitchSelect
                | Self::FaintedSelect
                | Self::ForceSwitchSelect
        )
    }

    /// The state after a choice is accepted.
    pub fn locked(&self) -> Self {
        match self {
            Self::TeamPreviewSelect => Self::TeamPreviewLocked,
            Self::MoveSwitchSelect => Self::MoveSwitchLocked,
            Self::FaintedSelect => Self::FaintedLocked,
            Self::ForceSwitchSelect => Self::ForceSwitchLocked,
            state => *state,
        }
    }
}

/// A single player of a battle.
///
/// Each side has exactly one player, so a player shares its index with its side.
#[derive(Debug, Clone)]
pub struct Player {
    pub id: String,
    pub name: String,
    pub side: usize,
    pub index: usize,
    pub state: PlayerState,
    /// Mons in team order.
    pub mons: Vec<MonHandle>,
    /// Active positions, which may be empty when no replacement exists.
    pub active: Vec<Option<MonHandle>>,
    /// Actions accepted for the current request, waiting for the other player.
    pub pending: Vec<Action>,
    pub can_terastallize: bool,
}

impl Player {
    pub fn new(data: &PlayerData, index: usize, active_per_player: usize) -> Self {
        Self {
            id: data.id.clone(),
            name: data.name.clone(),
            side: index,
            index,
            state: PlayerState::Idle,
            mons: Vec::new(),
            active: vec![None; active_per_player],
            pending: Vec::new(),
            can_terastallize: true,
        }
    }

    /// The active Mon at the given position.
    pub fn active_mon(&self, position: usize) -> Option<MonHandle> {
        self.active.get(position).copied().flatten()
    }

    /// The position of the Mon, if it is active.
    pub fn position_of(&self, mon: MonHandle) -> Option<usize> {
        self.active.iter().position(|active| *active == Some(mon))
    }

    fn team_mon(&self, index: usize) -> Result<MonHandle> {
        self.mons
            .get(index)
            .copied()
            .ok_or_else(|| choice_error(format!("you do not have a mon in slot {index}")))
    }

    /// Validates the choices against the player's state, producing the actions they resolve to.
    ///
    /// Never mutates the battle, so a rejected choice leaves everything untouched.
    pub fn validate_choices(
        battle: &CoreBattle,
        player: usize,
        choices: &[Choice],
    ) -> Result<Vec<Action>> {
        let state = battle.player(player)?.state;
        match state {
            PlayerState::TeamPreviewSelect => Self::validate_team_choice(battle, player, choices),
            PlayerState::MoveSwitchSelect => {
                Self::validate_move_switch_choices(battle, player, choices)
            }
            PlayerState::FaintedSelect => {
                Self::validate_switch_only_choices(battle, player, choices, |mon| {
                    battle.mon(mon).is_ok_and(|mon| mon.fainted)
                })
            }
            PlayerState::ForceSwitchSelect => {
                Self::validate_switch_only_choices(battle, player, choices, |mon| {
                    battle.mon(mon).is_ok_and(|mon| mon.force_switch)
                })
            }
            PlayerState::Idle => Err(choice_error("you have no active request")),
            _ => Err(choice_error("you already made your choice")),
        }
    }

    fn validate_team_choice(
        battle: &CoreBattle,
        player: usize,
        choices: &[Choice],
    ) -> Result<Vec<Action>> {
        let player = battle.player(player)?;
        let [Choice::Team(TeamSelectionChoice { mons })] = choices else {
            return Err(choice_error("you must select your team order"));
        };
        let mut seen = HashSet::default();
        for index in mons {
            player.team_mon(*index)?;
            if !seen.insert(*index) {
                return Err(choice_error(format!(
                    "the mon in slot {index} can only be selected once"
                )));
            }
        }
        Ok(vec![Action::Team(TeamAction {
            player: player.index,
            order: mons.clone(),
        })])
    }

    fn validate_move_switch_choices(
        battle: &CoreBattle,
        player: usize,
        choices: &[Choice],
    ) -> Result<Vec<Action>> {
        let player = battle.player(player)?;
        Self::check_choice_count(player, choices)?;

        let mut actions = Vec::with_capacity(choices.len());
        let mut switching_in = HashSet::default();
        let mut terastallizing = false;
        for (position, choice) in choices.iter().enumerate() {
            let mon = match player.active_mon(position) {
                Some(mon) if !battle.mon(mon)?.fainted => mon,
                _ => {
                    if !matches!(choice, Choice::Pass) {
                        return Err(choice_error(format!(
                            "you must pass for the empty position {}",
                            position + 1
                        )));
                    }
                    continue;
                }
            };
            match choice {
                Choice::Pass => {
                    if !battle.engine_options.allow_pass {
                        return Err(choice_error("you cannot pass for an active mon"));
                    }
                }
                Choice::Team(_) => return Err(choice_error("you are not in a team preview phase")),
                Choice::Switch(SwitchChoice { mon: index }) => {
                    let mon_data = battle.mon(mon)?;
                    if mon_data.trapped {
                        return Err(choice_error(format!("{} is trapped", mon_data.name)));
                    }
                    let incoming = Self::validate_switch_target(battle, player, *index)?;
                    if !switching_in.insert(incoming) {
                        return Err(choice_error(format!(
                            "the mon in slot {index} can only switch in once"
                        )));
                    }
                    actions.push(Action::Switch(SwitchAction {
                        player: player.index,
                        mon: incoming,
                        position,
                        instant: false,
                        speed: 0,
                    }));
                }
                Choice::Move(choice) => {
                    let action = Self::validate_move_choice(battle, player, mon, position, choice)?;
                    if choice.tera {
                        if terastallizing
                            || !player.can_terastallize
                            || !battle.mon(mon)?.can_terastallize()
                        {
                            return Err(choice_error(
                                "you can only terastallize once per battle",
                            ));
                        }
                        terastallizing = true;
                        actions.push(Action::Terastallize(MonAction {
                            mon,
                            player: player.index,
                            speed: 0,
                        }));
                    }
                    actions.push(Action::Move(action));
                }
                Choice::Struggle => {
                    let mon_data = battle.mon(mon)?;
                    if mon_data.has_usable_move() {
                        return Err(choice_error(format!(
                            "{} cannot struggle while it has usable moves",
                            mon_data.name
                        )));
                    }
                    actions.push(Action::Move(MoveAction {
                        id: Id::from("struggle"),
                        mon,
                        player: player.index,
                        target: None,
                        priority: 0,
                        speed: 0,
                        tera: false,
                    }));
                }
            }
        }
        Ok(actions)
    }

    fn validate_move_choice(
        battle: &CoreBattle,
        player: &Player,
        mon: MonHandle,
        position: usize,
        choice: &MoveChoice,
    ) -> Result<MoveAction> {
        let mon_data = battle.mon(mon)?;
        let slot = mon_data.move_slots.get(choice.slot).ok_or_else(|| {
            choice_error(format!(
                "{} does not have a move in slot {}",
                mon_data.name, choice.slot
            ))
        })?;
        if slot.disabled {
            return Err(choice_error(format!("{} is disabled", slot.name)));
        }
        if slot.pp == 0 {
            return Err(choice_error(format!("{} has no PP left", slot.name)));
        }
        let move_data = battle.dex.moves.get_by_id(&slot.id)?;
        let active_per_player = battle.format.battle_type.active_per_player();
        match choice.target {
            None => {
                if move_data.target.choosable() && active_per_player > 1 {
                    return Err(choice_error(format!("{} requires a target", slot.name)));
                }
            }
            Some(target) => {
                if !Self::valid_target(move_data.target, target, position, active_per_player) {
                    return Err(choice_error(format!("invalid target for {}", slot.name)));
                }
            }
        }
        Ok(MoveAction {
            id: slot.id.clone(),
            mon,
            player: player.index,
            target: choice.target,
            priority: 0,
            speed: 0,
            tera: choice.tera,
        })
    }

    /// Checks a target position for a move.
    ///
    /// Positive targets are foe positions. Negative targets are ally positions, including the
    /// user's own. Both count from 1.
    pub fn valid_target(
        move_target: MoveTarget,
        target: isize,
        position: usize,
        active_per_player: usize,
    ) -> bool {
        if !move_target.choosable() || target == 0 {
            return false;
        }
        let index = target.unsigned_abs() - 1;
        if index >= active_per_player {
            return false;
        }
        if target > 0 {
            move_target.can_target_foe()
        } else if index == position {
            move_target == MoveTarget::AdjacentAllyOrUser
        } else {
            move_target.can_target_ally()
        }
    }

    fn validate_switch_target(
        battle: &CoreBattle,
        player: &Player,
        index: usize,
    ) -> Result<MonHandle> {
        let incoming = player.team_mon(index)?;
        let incoming_data = battle.mon(incoming)?;
        if incoming_data.active {
            return Err(choice_error("you cannot switch to an active mon"));
        }
        if incoming_data.fainted {
            return Err(choice_error("you cannot switch to a fainted mon"));
        }
        Ok(incoming)
    }

    fn check_choice_count(player: &Player, choices: &[Choice]) -> Result<()> {
        if choices.len() > player.active.len() {
            return Err(choice_error("you sent more choices than active mons"));
        }
        if choices.len() < player.active.len() {
            return Err(choice_error("incomplete choice: missing actions for mons"));
        }
        Ok(())
    }

    /// Mons on the bench that could switch in.
    pub fn switchable_mons(battle: &CoreBattle, player: &Player) -> Vec<(usize, MonHandle)> {
        player
            .mons
            .iter()
            .enumerate()
            .filter(|(_, mon)| {
                battle
                    .mon(**mon)
                    .is_ok_and(|mon| !mon.active && !mon.fainted)
            })
            .map(|(i, mon)| (i, *mon))
            .collect()
    }

    /// Positions that must be filled by a switch, according to the predicate on the active Mon.
    pub fn positions_needing_switch<F>(player: &Player, needs: F) -> Vec<usize>
    where
        F: Fn(MonHandle) -> bool,
    {
        player
            .active
            .iter()
            .enumerate()
            .filter(|(_, mon)| mon.is_some_and(|mon| needs(mon)))
            .map(|(position, _)| position)
            .collect()
    }

    fn validate_switch_only_choices<F>(
        battle: &CoreBattle,
        player: usize,
        choices: &[Choice],
        needs: F,
    ) -> Result<Vec<Action>>
    where
        F: Fn(MonHandle) -> bool,
    {
        let player = battle.player(player)?;
        Self::check_choice_count(player, choices)?;
        let positions = Self::positions_needing_switch(player, &needs);
        let bench = Self::switchable_mons(battle, player).len();
        let required = positions.len().min(bench);

        let mut actions = Vec::new();
        let mut switching_in = HashSet::default();
        for (position, choice) in choices.iter().enumerate() {
            match choice {
                Choice::Pass => (),
                Choice::Switch(SwitchChoice { mon: index }) => {
                    if !positions.contains(&position) {
                        return Err(choice_error(format!(
                            "the mon in position {} does not need to switch",
                            position + 1
                        )));
                    }
                    let incoming = Self::validate_switch_target(battle, player, *index)?;
                    if !switching_in.insert(incoming) {
                        return Err(choice_error(format!(
                            "the mon in slot {index} can only switch in once"
                        )));
                    }
                    actions.push(Action::Switch(SwitchAction {
                        player: player.index,
                        mon: incoming,
                        position,
                        instant: true,
                        speed: 0,
                    }));
                }
                _ => return Err(choice_error("you must switch in a mon")),
            }
        }
        if actions.len() < required {
            return Err(choice_error(format!(
                "you must switch in {required} mon{}",
                if required == 1 { "" } else { "s" }
            )));
        }
        Ok(actions)
    }

    /// Every choice the player could submit for each position.
    ///
    /// Team preview returns a single list.
    pub fn available_choices(battle: &CoreBattle, player: usize) -> Result<Vec<Vec<Choice>>> {
        let player = battle.player(player)?;
        let switches = Self::switchable_mons(battle, player)
            .into_iter()
            .map(|(index, _)| Choice::Switch(SwitchChoice { mon: index }))
            .collect::<Vec<_>>();
        match player.state {
            PlayerState::TeamPreviewSelect => Ok(vec![
                (0..player.mons.len())
                    .map(|i| Choice::Team(TeamSelectionChoice { mons: vec![i] }))
                    .collect(),
            ]),
            PlayerState::MoveSwitchSelect => {
                let active_per_player = player.active.len();
                let mut available = Vec::with_capacity(active_per_player);
                for position in 0..active_per_player {
                    let mon = match player.active_mon(position) {
                        Some(mon) if !battle.mon(mon)?.fainted => battle.mon(mon)?,
                        _ => {
                            available.push(vec![Choice::Pass]);
                            continue;
                        }
                    };
                    let mut choices = Vec::new();
                    let can_tera = player.can_terastallize && mon.can_terastallize();
                    for (slot, move_slot) in mon.move_slots.iter().enumerate() {
                        if !move_slot.usable() {
                            continue;
                        }
                        let move_target = battle.dex.moves.get_by_id(&move_slot.id)?.target;
                        let targets = if move_target.choosable() && active_per_player > 1 {
                            (1..=active_per_player as isize)
                                .chain((1..=active_per_player as isize).map(|i| -i))
                                .filter(|target| {
                                    Self::valid_target(
                                        move_target,
                                        *target,
                                        position,
                                        active_per_player,
                                    )
                                })
                                .map(Some)
                                .collect::<Vec<_>>()
                        } else {
                            vec![None]
                        };
                        for tera in [false, true] {
                            if tera && !can_tera {
                                continue;
                            }
                            choices.extend(targets.iter().map(|target| {
                                Choice::Move(MoveChoice {
                                    slot,
                                    target: *target,
                                    tera,
                                })
                            }));
                        }
                    }
                    if !mon.has_usable_move() {
                        choices.push(Choice::Struggle);
                    }
                    if !mon.trapped {
                        choices.extend(switches.iter().cloned());
                    }
                    if battle.engine_options.allow_pass {
                        choices.push(Choice::Pass);
                    }
                    available.push(choices);
                }
                Ok(available)
            }
            PlayerState::FaintedSelect | PlayerState::ForceSwitchSelect => {
                let fainted = player.state == PlayerState::FaintedSelect;
                let positions = Self::positions_needing_switch(player, |mon| {
                    battle
                        .mon(mon)
                        .is_ok_and(|mon| if fainted { mon.fainted } else { mon.force_switch })
                });
                Ok((0..player.active.len())
                    .map(|position| {
                        if positions.contains(&position) && !switches.is_empty() {
                            switches.clone()
                        } else {
                            vec![Choice::Pass]
                        }
                    })
                    .collect())
            }
            _ => Ok(Vec::new()),
        }
    }
}

#[cfg(test)]
mod player_test {
    use apogee_data::MoveTarget;

    use crate::battle::{
        Player,
        PlayerState,
    };

    #[test]
    fn locks_selecting_states() {
        assert_eq!(
            PlayerState::MoveSwitchSelect.locked(),
            PlayerState::MoveSwitchLocked
        );
        assert_eq!(
            PlayerState::ForceSwitchSelect.locked(),
            PlayerState::ForceSwitchLocked
        );
        assert_eq!(PlayerState::Idle.locked(), PlayerState::Idle);
        assert!(PlayerState::FaintedSelect.is_selecting());
        assert!(!PlayerState::FaintedLocked.is_selecting());
    }

    #[test]
    fn validates_target_positions() {
        assert!(Player::valid_target(MoveTarget::Normal, 1, 0, 2));
        assert!(Player::valid_target(MoveTarget::Normal, 2, 0, 2));
        assert!(!Player::valid_target(MoveTarget::Normal, 3, 0, 2));
        assert!(!Player::valid_target(MoveTarget::Normal, 0, 0, 2));
        // Ally, but not the user.
        assert!(Player::valid_target(MoveTarget::Normal, -2, 0, 2));
        assert!(!Player::valid_target(MoveTarget::Normal, -1, 0, 2));
        assert!(Player::valid_target(MoveTarget::AdjacentAllyOrUser, -1, 0, 2));
        assert!(!Player::valid_target(MoveTarget::AdjacentFoe, -2, 0, 2));
        assert!(!Player::valid_target(MoveTarget::AllAdjacentFoes, 1, 0, 2));
    }
}
