use std::sync::{
    Mutex,
    MutexGuard,
};

use anyhow::Result;
use apogee_choice::{
    Choice,
    choices_from_string,
};
use apogee_data::DataStore;
use apogee_prng::PseudoRandomNumberGenerator;

use crate::{
    battle::{
        CoreBattle,
        CoreBattleEngineOptions,
        CoreBattleOptions,
        Field,
        Mon,
        PlayerState,
        Request,
        RequestState,
    },
    error::{
        choice_error,
        general_error,
    },
};

/// Input that can be submitted as a player's choice.
pub trait IntoChoices {
    fn into_choices(self) -> Result<Vec<Choice>>;
}

impl IntoChoices for &str {
    fn into_choices(self) -> Result<Vec<Choice>> {
        choices_from_string(self).map_err(|error| choice_error(format!("{error:#}")))
    }
}

impl IntoChoices for &String {
    fn into_choices(self) -> Result<Vec<Choice>> {
        self.as_str().into_choices()
    }
}

impl IntoChoices for Choice {
    fn into_choices(self) -> Result<Vec<Choice>> {
        Ok(vec![self])
    }
}

impl IntoChoices for Vec<Choice> {
    fn into_choices(self) -> Result<Vec<Choice>> {
        Ok(self)
    }
}

/// A battle.
///
/// All operations lock the battle, so choices submitted from different threads are processed one
/// at a time.
pub struct Battle<'d> {
    core: Mutex<CoreBattle<'d>>,
}

impl<'d> Battle<'d> {
    /// Creates a new battle.
    ///
    /// Fails if the options are invalid or either team does not pass validation.
    pub fn new(
        options: CoreBattleOptions,
        data: &'d dyn DataStore,
        engine_options: CoreBattleEngineOptions,
    ) -> Result<Self> {
        Ok(Self {
            core: Mutex::new(CoreBattle::from_options(options, data, engine_options)?),
        })
    }

    fn lock(&self) -> Result<MutexGuard<'_, CoreBattle<'d>>> {
        self.core
            .lock()
            .map_err(|_| general_error("battle lock is poisoned"))
    }

    /// Starts the battle, running until the first request.
    pub fn start(&self) -> Result<()> {
        self.lock()?.start()
    }

    pub fn started(&self) -> Result<bool> {
        Ok(self.lock()?.started)
    }

    pub fn ended(&self) -> Result<bool> {
        Ok(self.lock()?.ended)
    }

    pub fn turn(&self) -> Result<u64> {
        Ok(self.lock()?.turn)
    }

    /// Submits a choice for a player.
    ///
    /// A rejected choice returns a [`ChoiceError`][`crate::error::ChoiceError`] and leaves the
    /// battle unchanged.
    pub fn submit_choice<C>(&self, player_id: &str, choice: C) -> Result<()>
    where
        C: IntoChoices,
    {
        let choices = choice.into_choices()?;
        let mut battle = self.lock()?;
        battle
            .set_player_choice(player_id, choices)
            .inspect_err(|error| log::debug!("choice for {player_id} failed: {error:#}"))
    }

    pub fn get_request_state(&self) -> Result<RequestState> {
        Ok(self.lock()?.request_state())
    }

    pub fn request_for_player(&self, player_id: &str) -> Result<Option<Request>> {
        self.lock()?.request_for_player(player_id)
    }

    /// Every choice the player could submit, for each active position.
    pub fn get_available_choices(&self, player_id: &str) -> Result<Vec<Vec<Choice>>> {
        self.lock()?.available_choices(player_id)
    }

    /// Log entries added since the last call.
    pub fn new_logs(&self) -> Result<Vec<String>> {
        Ok(self.lock()?.log.read_out().map(String::from).collect())
    }

    pub fn all_logs(&self) -> Result<Vec<String>> {
        Ok(self.lock()?.log.logs().map(String::from).collect())
    }

    pub fn has_new_logs(&self) -> Result<bool> {
        Ok(self.lock()?.log.has_new_messages())
    }

    /// A snapshot of a player's team.
    pub fn player_mons(&self, player_id: &str) -> Result<Vec<Mon>> {
        let battle = self.lock()?;
        let player = battle.player(battle.player_by_id(player_id)?)?;
        player
            .mons
            .iter()
            .map(|mon| battle.mon(*mon).cloned())
            .collect()
    }

    /// The phase a player is in.
    pub fn player_state(&self, player_id: &str) -> Result<PlayerState> {
        let battle = self.lock()?;
        Ok(battle.player(battle.player_by_id(player_id)?)?.state)
    }

    /// A snapshot of the field.
    pub fn field(&self) -> Result<Field> {
        Ok(self.lock()?.field.clone())
    }

    /// Independent copy of the battle, for looking ahead without touching the real battle.
    pub fn simulation_copy(&self) -> Result<Self> {
        Ok(Self {
            core: Mutex::new(self.lock()?.clone()),
        })
    }

    /// Runs a function against the battle's random number generator.
    ///
    /// Mainly for tests that control randomness.
    pub fn with_prng<F, R>(&self, f: F) -> Result<R>
    where
        F: FnOnce(&mut dyn PseudoRandomNumberGenerator) -> R,
    {
        Ok(f(self.lock()?.prng.as_mut()))
    }
}

#[cfg(test)]
mod battle_test {
    use apogee_choice::Choice;

    use crate::battle::{
        Battle,
        IntoChoices,
    };

    fn assert_send_sync<T: Send + Sync>() {}

    #[test]
    fn battle_is_send_and_sync() {
        assert_send_sync::<Battle<'static>>();
    }

    #[test]
    fn parses_string_choices() {
        assert_eq!("pass".into_choices().unwrap(), vec![Choice::Pass]);
        assert!("fly away".into_choices().is_err());
        assert_eq!(
            Choice::Struggle.into_choices().unwrap(),
            vec![Choice::Struggle]
        );
    }
}
