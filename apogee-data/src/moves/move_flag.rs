use serde_string_enum::{
    DeserializeLabeledStringEnum,
    SerializeLabeledStringEnum,
};

/// Move flags, which categorize moves for miscellaneous behavior.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    SerializeLabeledStringEnum,
    DeserializeLabeledStringEnum,
)]
pub enum MoveFlag {
    /// A bite move.
    #[string = "Bite"]
    Bite,
    /// A bullet move.
    #[string = "Bullet"]
    Bullet,
    /// Makes contact.
    #[string = "Contact"]
    Contact,
    /// A healing move.
    #[string = "Heal"]
    Heal,
    /// Can be reflected by Mirror Move.
    #[string = "Mirror"]
    Mirror,
    /// A powder move, which Grass types are immune to.
    #[string = "Powder"]
    Powder,
    /// Blocked by protection.
    #[string = "Protect"]
    Protect,
    /// A punch move.
    #[string = "Punch"]
    Punch,
    /// A sound move.
    #[string = "Sound"]
    Sound,
    /// Consecutive use becomes less likely to succeed.
    #[string = "Stalling"]
    Stalling,
}
