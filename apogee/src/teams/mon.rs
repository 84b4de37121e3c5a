use apogee_data::{
    Nature,
    StatTable,
    Type,
};
use serde::{
    Deserialize,
    Serialize,
};

fn default_level() -> u8 {
    50
}

/// Data about a specific Mon on a team.
///
/// Never modified by a battle. In-battle changes live on the battle's own Mon.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonData {
    /// Nickname.
    pub name: String,
    /// Species name.
    pub species: String,
    /// Held item.
    #[serde(default)]
    pub item: Option<String>,
    /// Ability.
    pub ability: String,
    /// Moves, at most four.
    pub moves: Vec<String>,
    #[serde(default)]
    pub nature: Nature,
    /// Effort values.
    #[serde(default)]
    pub evs: StatTable,
    /// Individual values.
    #[serde(default)]
    pub ivs: StatTable,
    #[serde(default = "default_level")]
    pub level: u8,
    /// Type taken on when Terastallized.
    ///
    /// Defaults to the species' primary type.
    #[serde(default)]
    pub tera_type: Option<Type>,
}
