use serde::{
    Deserialize,
    Serialize,
};
use serde_string_enum::{
    DeserializeLabeledStringEnum,
    SerializeLabeledStringEnum,
};

/// The kind of a condition, which decides where it can be attached.
#[derive(
    Debug,
    Default,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    SerializeLabeledStringEnum,
    DeserializeLabeledStringEnum,
)]
pub enum ConditionType {
    /// A non-volatile status, at most one per Mon.
    #[string = "Status"]
    Status,
    /// A volatile condition, cleared when the Mon switches out.
    #[string = "Volatile"]
    #[default]
    Volatile,
    /// A weather, at most one on the field.
    #[string = "Weather"]
    Weather,
    /// A terrain, at most one on the field.
    #[string = "Terrain"]
    Terrain,
    /// A condition on one side of the battle.
    #[string = "SideCondition"]
    SideCondition,
    /// A condition on the whole field that is neither weather nor terrain.
    #[string = "PseudoWeather"]
    PseudoWeather,
}

/// Data about a condition.
///
/// Handlers for the condition's events are bound to its ID by the battle engine's effect library.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConditionData {
    /// Name of the condition.
    pub name: String,
    /// Kind of condition.
    pub condition_type: ConditionType,
    /// Fixed duration in turns.
    ///
    /// Unset means the condition lasts until removed, unless the condition computes its own
    /// duration when applied.
    pub duration: Option<u8>,
    /// Can be applied to a fainted Mon?
    #[serde(default)]
    pub affects_fainted: bool,
    /// Suppresses logging when started and ended.
    #[serde(default)]
    pub silent: bool,
}
