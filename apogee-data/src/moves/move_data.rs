use ahash::HashSet;
use serde::{
    Deserialize,
    Serialize,
};
use serde_string_enum::{
    DeserializeLabeledStringEnum,
    SerializeLabeledStringEnum,
};

use crate::{
    Accuracy,
    BoostTable,
    Fraction,
    MoveFlag,
    MoveTarget,
    Type,
};

/// The category of a move.
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
pub enum MoveCategory {
    #[string = "Physical"]
    #[default]
    Physical,
    #[string = "Special"]
    Special,
    #[string = "Status"]
    Status,
}

/// A declarative effect applied to a Mon when a move hits.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HitEffect {
    /// Stat boosts.
    pub boosts: Option<BoostTable>,
    /// Fraction of max HP to heal.
    pub heal_percent: Option<Fraction>,
    /// Status applied.
    pub status: Option<String>,
    /// Volatile condition applied.
    pub volatile_status: Option<String>,
    /// Side condition applied to the affected Mon's side.
    pub side_condition: Option<String>,
    /// Weather set.
    pub weather: Option<String>,
    /// Terrain set.
    pub terrain: Option<String>,
    /// Pseudo-weather added.
    pub pseudo_weather: Option<String>,
}

/// An effect that may occur after a move hits.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SecondaryEffectData {
    /// Percent chance of the effect occurring.
    ///
    /// Always occurs if unset.
    pub chance: Option<Fraction>,
    /// Effect on the target.
    pub target: Option<HitEffect>,
    /// Effect on the user.
    pub user: Option<HitEffect>,
}

fn default_crit_ratio() -> u8 {
    1
}

/// Data about a particular move.
///
/// The template is never mutated during battle. Per-use state lives in each Mon's move slot.
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct MoveData {
    /// Name of the move.
    pub name: String,
    /// Move category.
    pub category: MoveCategory,
    /// Move type.
    pub primary_type: Type,
    /// Base power.
    #[serde(default)]
    pub base_power: u32,
    /// Base accuracy.
    #[serde(default)]
    pub accuracy: Accuracy,
    /// Power points.
    #[serde(default)]
    pub pp: u8,
    /// Priority bracket.
    #[serde(default)]
    pub priority: i8,
    /// Move target(s).
    #[serde(default)]
    pub target: MoveTarget,
    /// Move flags.
    #[serde(default)]
    pub flags: HashSet<MoveFlag>,

    /// Fixed damage dealt.
    pub damage: Option<u16>,
    /// Deals damage equal to the user's level?
    #[serde(default)]
    pub level_damage: bool,
    /// Critical hit stage. 0 never crits.
    #[serde(default = "default_crit_ratio")]
    pub crit_ratio: u8,
    /// Always a critical hit?
    #[serde(default)]
    pub will_crit: bool,
    /// Ignores type immunity?
    #[serde(default)]
    pub ignore_immunity: bool,
    /// Typeless, so no STAB or effectiveness applies?
    #[serde(default)]
    pub typeless: bool,

    /// Switches the user out after hitting?
    #[serde(default)]
    pub user_switch: bool,
    /// Fraction of damage dealt taken as recoil.
    pub recoil_percent: Option<Fraction>,
    /// Recoil of 1/4 of the user's max HP, regardless of damage dealt.
    #[serde(default)]
    pub struggle_recoil: bool,
    /// Fraction of damage dealt restored to the user.
    pub drain_percent: Option<Fraction>,

    /// Primary effect on the target.
    pub hit_effect: Option<HitEffect>,
    /// Primary effect on the user.
    pub user_effect: Option<HitEffect>,
    /// Secondary effects, rolled independently.
    #[serde(default)]
    pub secondary_effects: Vec<SecondaryEffectData>,
}

impl MoveData {
    /// Does the move have the given flag?
    pub fn has_flag(&self, flag: MoveFlag) -> bool {
        self.flags.contains(&flag)
    }
}

#[cfg(test)]
mod move_data_test {
    use pretty_assertions::assert_eq;

    use crate::{
        Accuracy,
        Boost,
        Fraction,
        MoveCategory,
        MoveData,
        MoveFlag,
        MoveTarget,
        Type,
    };

    #[test]
    fn deserializes_damaging_move() {
        let data = serde_json::from_str::<MoveData>(
            r#"{
                "name": "Flare Blitz",
                "category": "Physical",
                "primary_type": "Fire",
                "base_power": 120,
                "accuracy": 100,
                "pp": 15,
                "target": "Normal",
                "flags": ["Contact", "Protect"],
                "recoil_percent": "33/100",
                "secondary_effects": [
                    { "chance": "10%", "target": { "status": "brn" } }
                ]
            }"#,
        )
        .unwrap();
        assert_eq!(data.category, MoveCategory::Physical);
        assert_eq!(data.primary_type, Type::Fire);
        assert_eq!(data.crit_ratio, 1);
        assert!(data.has_flag(MoveFlag::Contact));
        assert_eq!(data.recoil_percent, Some(Fraction::new(33, 100)));
        assert_eq!(data.secondary_effects[0].chance, Some(Fraction::new(1, 10)));
        assert_eq!(
            data.secondary_effects[0]
                .target
                .as_ref()
                .and_then(|effect| effect.status.as_deref()),
            Some("brn")
        );
    }

    #[test]
    fn deserializes_status_move() {
        let data = serde_json::from_str::<MoveData>(
            r#"{
                "name": "Swords Dance",
                "category": "Status",
                "primary_type": "Normal",
                "accuracy": "exempt",
                "pp": 20,
                "target": "User",
                "user_effect": { "boosts": { "atk": 2 } }
            }"#,
        )
        .unwrap();
        assert_eq!(data.accuracy, Accuracy::Exempt);
        assert_eq!(data.target, MoveTarget::User);
        assert_eq!(
            data.user_effect
                .and_then(|effect| effect.boosts)
                .map(|boosts| boosts.get(Boost::Atk)),
            Some(2)
        );
    }
}
