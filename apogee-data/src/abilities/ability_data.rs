use serde::{
    Deserialize,
    Serialize,
};

/// Data about an ability.
///
/// Behavior is bound to the ability's ID by the battle engine's effect library.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AbilityData {
    /// Name of the ability.
    pub name: String,
    /// Short description.
    #[serde(default)]
    pub description: String,
    /// Prevents the ability from being suppressed.
    #[serde(default)]
    pub permanent: bool,
}
