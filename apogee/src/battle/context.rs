use anyhow::Result;
use apogee_prng::rand_util;

use crate::{
    battle::{
        ActiveMove,
        CoreBattle,
        Mon,
        MonHandle,
        Player,
        Side,
    },
    common::chain_modify,
    dex::Dex,
    effect::{
        AppliedEffectLocation,
        BattleEvent,
        EffectHandle,
        EffectState,
    },
    error::{
        WrapOptionError,
        invariant_violation_error,
    },
};

/// The context of a [`CoreBattle`].
///
/// Battle logic borrows the whole battle mutably, and looks up the objects it needs by handle as
/// it goes. References obtained from a context cannot outlive it.
pub struct Context<'b, 'd> {
    battle: &'b mut CoreBattle<'d>,
}

impl<'b, 'd> Context<'b, 'd> {
    pub fn new(battle: &'b mut CoreBattle<'d>) -> Self {
        Self { battle }
    }

    pub fn battle(&self) -> &CoreBattle<'d> {
        &*self.battle
    }

    pub fn battle_mut(&mut self) -> &mut CoreBattle<'d> {
        &mut *self.battle
    }

    pub fn dex(&self) -> &Dex<'d> {
        &self.battle.dex
    }

    pub fn mon(&self, mon: MonHandle) -> Result<&Mon> {
        self.battle.mon(mon)
    }

    pub fn mon_mut(&mut self, mon: MonHandle) -> Result<&mut Mon> {
        self.battle.mon_mut(mon)
    }

    pub fn player(&self, player: usize) -> Result<&Player> {
        self.battle.player(player)
    }

    pub fn player_mut(&mut self, player: usize) -> Result<&mut Player> {
        self.battle.player_mut(player)
    }

    pub fn side(&self, side: usize) -> Result<&Side> {
        self.battle.side(side)
    }

    pub fn side_mut(&mut self, side: usize) -> Result<&mut Side> {
        self.battle.side_mut(side)
    }

    /// The move currently being used.
    pub fn active_move(&self) -> Result<&ActiveMove> {
        self.battle
            .active_move
            .as_ref()
            .wrap_expectation("no move is active")
    }

    pub fn active_move_mut(&mut self) -> Result<&mut ActiveMove> {
        self.battle
            .active_move
            .as_mut()
            .wrap_expectation("no move is active")
    }

    /// Rolls a random chance of `numerator / denominator`.
    pub fn chance(&mut self, numerator: u64, denominator: u64) -> bool {
        rand_util::chance(self.battle.prng.as_mut(), numerator, denominator)
    }

    /// A random number in `[min, max)`.
    pub fn range(&mut self, min: u64, max: u64) -> u64 {
        rand_util::range(self.battle.prng.as_mut(), min, max)
    }
}

/// The object targeted by an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventTarget {
    Mon(MonHandle),
    Side(usize),
    Field,
}

impl EventTarget {
    pub fn mon_handle(&self) -> Option<MonHandle> {
        match self {
            Self::Mon(mon) => Some(*mon),
            _ => None,
        }
    }
}

/// The context of a single event handler.
///
/// Holds the effect whose handler is running, where that effect is applied, and what the event is
/// about.
pub struct EventContext<'e, 'd> {
    context: Context<'e, 'd>,
    pub event: BattleEvent,
    pub effect: EffectHandle,
    pub location: AppliedEffectLocation,
    pub target: EventTarget,
    pub source: Option<MonHandle>,
    pub source_effect: Option<EffectHandle>,
}

impl<'e, 'd> EventContext<'e, 'd> {
    pub fn new(
        context: Context<'e, 'd>,
        event: BattleEvent,
        effect: EffectHandle,
        location: AppliedEffectLocation,
        target: EventTarget,
        source: Option<MonHandle>,
        source_effect: Option<EffectHandle>,
    ) -> Self {
        Self {
            context,
            event,
            effect,
            location,
            target,
            source,
            source_effect,
        }
    }

    /// The battle context, for calling into battle logic.
    pub fn context(&mut self) -> &mut Context<'e, 'd> {
        &mut self.context
    }

    pub fn battle(&self) -> &CoreBattle<'d> {
        self.context.battle()
    }

    pub fn dex(&self) -> &Dex<'d> {
        self.context.dex()
    }

    pub fn mon(&self, mon: MonHandle) -> Result<&Mon> {
        self.context.mon(mon)
    }

    pub fn mon_mut(&mut self, mon: MonHandle) -> Result<&mut Mon> {
        self.context.mon_mut(mon)
    }

    /// The Mon holding the effect.
    ///
    /// For the move being used, this is the user.
    pub fn holder(&self) -> Result<MonHandle> {
        if self.location == AppliedEffectLocation::ActiveMove {
            return Ok(self.active_move()?.user);
        }
        self.location.mon_handle().wrap_expectation_with_format(format_args!(
            "{} is not attached to a mon",
            self.effect
        ))
    }

    /// The side the effect is attached to, for side conditions.
    pub fn holder_side(&self) -> Result<usize> {
        match self.location.side_index() {
            Some(side) => Ok(side),
            None => Ok(self.mon(self.holder()?)?.side),
        }
    }

    /// The Mon targeted by the event.
    pub fn target_mon(&self) -> Result<MonHandle> {
        self.target
            .mon_handle()
            .wrap_expectation_with_format(format_args!("{} does not target a mon", self.event))
    }

    /// The state of the effect whose handler is running.
    pub fn effect_state_mut(&mut self) -> Result<&mut EffectState> {
        let location = self.location.clone();
        self.context.battle_mut().effect_state_mut(&location)
    }

    pub fn effect_state(&self) -> Result<&EffectState> {
        self.battle().effect_state(&self.location)
    }

    /// Chains a modifier onto the value relayed through the current event.
    pub fn chain_modify(&mut self, numerator: u32, denominator: u32) -> Result<()> {
        let event = self.event;
        let modifier = self
            .context
            .battle_mut()
            .event_modifiers
            .last_mut()
            .ok_or_else(|| {
                invariant_violation_error(format!("{event} has no modifier to chain onto"))
            })?;
        *modifier = chain_modify(*modifier, numerator, denominator);
        Ok(())
    }

    pub fn active_move(&self) -> Result<&ActiveMove> {
        self.context.active_move()
    }

    pub fn chance(&mut self, numerator: u64, denominator: u64) -> bool {
        self.context.chance(numerator, denominator)
    }

    pub fn range(&mut self, min: u64, max: u64) -> u64 {
        self.context.range(min, max)
    }
}
