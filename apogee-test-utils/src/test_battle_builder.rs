use std::sync::Arc;

use anyhow::Result;
use apogee::{
    Battle,
    BattleType,
    CoreBattleEngineOptions,
    CoreBattleEngineRandomizeBaseDamage,
    CoreBattleEngineSpeedSortTieResolution,
    CoreBattleOptions,
    EffectLibrary,
    FormatData,
    PlayerData,
    SideData,
    TeamData,
};
use apogee_data::DataStore;

use crate::{
    ControlledRandomNumberGenerator,
    setup_test_environment,
};

/// Battle builder object for integration tests.
pub struct TestBattleBuilder {
    options: CoreBattleOptions,
    engine_options: CoreBattleEngineOptions,
    controlled_rng: bool,
}

impl TestBattleBuilder {
    /// Creates a new [`TestBattleBuilder`] for a singles battle with no players.
    pub fn new() -> Self {
        Self {
            options: CoreBattleOptions {
                seed: None,
                format: FormatData {
                    battle_type: BattleType::Singles,
                    team_preview: false,
                },
                side_1: SideData {
                    name: "Side 1".to_owned(),
                    players: Vec::new(),
                },
                side_2: SideData {
                    name: "Side 2".to_owned(),
                    players: Vec::new(),
                },
            },
            engine_options: CoreBattleEngineOptions::default(),
            controlled_rng: false,
        }
    }

    /// Builds a new [`Battle`] from the battle builder.
    pub fn build<'d>(mut self, data: &'d dyn DataStore) -> Result<Battle<'d>> {
        setup_test_environment();
        if self.controlled_rng {
            self.engine_options.rng_factory =
                |seed: Option<u64>| Box::new(ControlledRandomNumberGenerator::new(seed));
        }
        Battle::new(self.options, data, self.engine_options)
    }

    fn players_mut(&mut self) -> impl Iterator<Item = &mut PlayerData> {
        self.options
            .side_1
            .players
            .iter_mut()
            .chain(self.options.side_2.players.iter_mut())
    }

    pub fn with_battle_type(mut self, battle_type: BattleType) -> Self {
        self.options.format.battle_type = battle_type;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.options.seed = Some(seed);
        self
    }

    pub fn with_team_preview(mut self, team_preview: bool) -> Self {
        self.options.format.team_preview = team_preview;
        self
    }

    pub fn with_pass_allowed(mut self, pass_allowed: bool) -> Self {
        self.engine_options.allow_pass = pass_allowed;
        self
    }

    pub fn with_controlled_rng(mut self, controlled_rng: bool) -> Self {
        self.controlled_rng = controlled_rng;
        self
    }

    pub fn with_base_damage_randomization(
        mut self,
        randomize: CoreBattleEngineRandomizeBaseDamage,
    ) -> Self {
        self.engine_options.randomize_base_damage = randomize;
        self
    }

    pub fn with_speed_sort_tie_resolution(
        mut self,
        tie_resolution: CoreBattleEngineSpeedSortTieResolution,
    ) -> Self {
        self.engine_options.speed_sort_tie_resolution = tie_resolution;
        self
    }

    pub fn with_actual_health(mut self, actual_health: bool) -> Self {
        self.engine_options.reveal_actual_health = actual_health;
        self
    }

    pub fn with_turn_limit(mut self, turn_limit: u64) -> Self {
        self.engine_options.turn_limit = turn_limit;
        self
    }

    /// Replaces the behavior bound to static data.
    pub fn with_effect_library(mut self, effect_library: EffectLibrary) -> Self {
        self.engine_options.effect_library = Arc::new(effect_library);
        self
    }

    pub fn add_player_to_side_1(mut self, id: &str, name: &str) -> Self {
        self.options.side_1.players.push(PlayerData {
            id: id.to_owned(),
            name: name.to_owned(),
            team: TeamData::default(),
        });
        self
    }

    pub fn add_player_to_side_2(mut self, id: &str, name: &str) -> Self {
        self.options.side_2.players.push(PlayerData {
            id: id.to_owned(),
            name: name.to_owned(),
            team: TeamData::default(),
        });
        self
    }

    /// Sets the team of a player added earlier.
    pub fn with_team(mut self, player_id: &str, team: TeamData) -> Self {
        if let Some(player) = self.players_mut().find(|player| player.id == player_id) {
            player.team = team;
        }
        self
    }
}

impl Default for TestBattleBuilder {
    fn default() -> Self {
        Self::new()
    }
}
