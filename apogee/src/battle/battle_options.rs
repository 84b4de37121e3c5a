use std::sync::Arc;

use anyhow::Result;
use apogee_prng::{
    LinearCongruentialGenerator,
    PseudoRandomNumberGenerator,
};
use serde::{
    Deserialize,
    Serialize,
};

use crate::{
    battle::{
        BattleType,
        SideData,
    },
    effect::EffectLibrary,
    error::general_error,
};

/// Battle engine option for how base damage should be randomized in the damage calculation.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CoreBattleEngineRandomizeBaseDamage {
    /// Randomize the base damage.
    ///
    /// This is the default behavior.
    #[default]
    Randomize,
    /// Only use the maximum base damage value.
    Max,
    /// Only use the minimum base damage value.
    Min,
}

/// How the battle engine should resolve ties when sorting by speed.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CoreBattleEngineSpeedSortTieResolution {
    /// Resolves ties randomly by advancing RNG.
    #[default]
    Random,
    /// Do not resolve ties and keep the original order of tied elements.
    Keep,
    /// Reverse the original order of tied elements.
    Reverse,
}

fn default_rng_factory() -> fn(seed: Option<u64>) -> Box<dyn PseudoRandomNumberGenerator> {
    |seed: Option<u64>| Box::new(LinearCongruentialGenerator::new(seed))
}

fn default_turn_limit() -> u64 {
    1000
}

/// Options that change how the battle engine itself behaves, which is not necessarily specific to
/// any individual battle.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CoreBattleEngineOptions {
    /// Function for creating the battle's random number generator.
    ///
    /// Primarily useful for tests where we wish to have fine-grained control over battle RNG.
    #[serde(skip, default = "default_rng_factory")]
    pub rng_factory: fn(seed: Option<u64>) -> Box<dyn PseudoRandomNumberGenerator>,
    /// Describes how base damage should be randomized in the damage calculation.
    ///
    /// Fixing the roll is useful for tests against the damage calculator.
    #[serde(default)]
    pub randomize_base_damage: CoreBattleEngineRandomizeBaseDamage,
    /// Describes how ties should be resolved when sorting elements by speed.
    ///
    /// By default, speed ties are resolved randomly. Tests with many speed ties can avoid RNG in
    /// speed sorting completely.
    #[serde(default)]
    pub speed_sort_tie_resolution: CoreBattleEngineSpeedSortTieResolution,
    /// Should the current time be logged at the start of each turn?
    #[serde(default)]
    pub log_time: bool,
    /// Should the battle reveal the actual health of all Mons in the log?
    ///
    /// By default, health is shown as a percentage.
    #[serde(default)]
    pub reveal_actual_health: bool,
    /// Are players allowed to pass for unfainted Mons?
    ///
    /// Mostly useful for tests where one side sits passively.
    #[serde(default)]
    pub allow_pass: bool,
    /// The battle ends in a tie once this many turns have passed.
    #[serde(default = "default_turn_limit")]
    pub turn_limit: u64,
    /// Behavior bound to the static data.
    #[serde(skip, default = "EffectLibrary::shared")]
    pub effect_library: Arc<EffectLibrary>,
}

impl Default for CoreBattleEngineOptions {
    fn default() -> Self {
        Self {
            rng_factory: default_rng_factory(),
            randomize_base_damage: CoreBattleEngineRandomizeBaseDamage::default(),
            speed_sort_tie_resolution: CoreBattleEngineSpeedSortTieResolution::default(),
            log_time: false,
            reveal_actual_health: false,
            allow_pass: false,
            turn_limit: default_turn_limit(),
            effect_library: EffectLibrary::shared(),
        }
    }
}

/// The format of a battle.
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct FormatData {
    pub battle_type: BattleType,
    /// Do players choose their team order after seeing both teams?
    #[serde(default)]
    pub team_preview: bool,
}

/// Core options for a new battle.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CoreBattleOptions {
    /// The initial seed for random number generation.
    ///
    /// This can be used to effectively replay or control a battle.
    pub seed: Option<u64>,
    /// The format of the battle.
    #[serde(default)]
    pub format: FormatData,
    /// One side of the battle.
    pub side_1: SideData,
    /// The other side of the battle.
    pub side_2: SideData,
}

impl CoreBattleOptions {
    fn validate_side(&self, side: &SideData) -> Result<()> {
        match side.players.len() {
            0 => Err(general_error(format!("{} has no players", side.name))),
            1 => Ok(()),
            _ => Err(general_error(format!(
                "{} has too many players for a {} battle",
                side.name,
                match self.format.battle_type {
                    BattleType::Singles => "singles",
                    BattleType::Doubles => "doubles",
                }
            ))),
        }
    }

    /// Validates the battle options.
    pub fn validate(&self) -> Result<()> {
        self.validate_side(&self.side_1)?;
        self.validate_side(&self.side_2)?;
        for (a, b) in self
            .side_1
            .players
            .iter()
            .flat_map(|a| self.side_2.players.iter().map(move |b| (a, b)))
        {
            if a.id == b.id {
                return Err(general_error(format!("duplicate player id {}", a.id)));
            }
        }
        Ok(())
    }
}
