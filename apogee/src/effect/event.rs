use std::{
    fmt,
    fmt::Display,
};

/// An event that effects can respond to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BattleEvent {
    /// Can the move skip the accuracy check entirely?
    ///
    /// Runs in priority mode. Returning `true` makes the move hit.
    AccuracyExempt,
    /// Runs once for every individual stat change, with the change that actually took effect.
    AfterEachBoost,
    /// Runs after a Mon finishes using a move.
    AfterMove,
    /// Modifies the base power of a move.
    BasePower,
    /// Runs before a Mon uses a move. Returning `false` stops the move.
    BeforeMove,
    /// Modifies damage about to be dealt to a Mon.
    Damage,
    /// Runs after a Mon takes damage from a move.
    DamagingHit,
    /// Disables move slots at the start of each turn.
    DisableMove,
    /// Computes the duration of a condition when it is applied.
    Duration,
    /// Runs when an effect ends.
    End,
    /// Can the Mon be affected by a given type?
    Immunity,
    ModifyAccuracy,
    ModifyAtk,
    ModifyCritRatio,
    ModifyDamage,
    ModifyDef,
    ModifyPriority,
    ModifySpA,
    ModifySpD,
    ModifySpe,
    /// Modifies the same-type attack bonus, out of 4096.
    ModifyStab,
    /// Runs before a move hits any targets. Returning `false` makes the move fail.
    PrepareHit,
    /// Runs at the end of every turn.
    Residual,
    /// Runs when an active effect is applied again.
    Restart,
    /// Can the status be applied?
    SetStatus,
    /// Runs when an effect starts. Returning `false` cancels the effect.
    Start,
    SwitchIn,
    SwitchOut,
    /// Is the Mon prevented from switching out?
    ///
    /// Runs in priority mode.
    TrapMon,
    /// Can the volatile condition be applied?
    TryAddVolatile,
    /// Modifies or blocks stat changes before they are applied.
    TryBoost,
    /// Runs before a move hits a single target. Returning `false` blocks the hit.
    TryHit,
    /// Runs whenever a Mon's state may need to be reacted to, such as after taking damage.
    Update,
    /// Modifies damage by the weather.
    WeatherModifyDamage,
}

impl BattleEvent {
    /// Does the event run for a single effect rather than everything touching the target?
    pub fn is_single(&self) -> bool {
        matches!(self, Self::Duration | Self::End | Self::Restart | Self::Start)
    }
}

impl Display for BattleEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{self:?}")
    }
}

/// The relationship between an effect's holder and the target of an event.
///
/// An effect registers a handler under a scope to say which events it wants to hear about. For
/// example, a handler registered for [`BattleEvent::ModifyDamage`] under [`EventScope::Source`]
/// runs when its holder is the *source* of the event, rather than its target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventScope {
    /// The holder is the target of the event.
    Target,
    /// The holder is on the same side as the target, including the target itself.
    Ally,
    /// The holder is on the opposing side of the target.
    Foe,
    /// The holder is any active Mon.
    Any,
    /// The holder is the source of the event.
    Source,
}
