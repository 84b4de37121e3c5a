use std::{
    fmt,
    sync::Arc,
};

use ahash::HashMap;
use anyhow::Result;
use apogee_data::Id;
use once_cell::sync::Lazy;

use crate::{
    battle::EventContext,
    effect::{
        BattleEvent,
        EffectHandle,
        EventScope,
        Value,
        library,
    },
};

/// A function that handles an event for an effect.
///
/// Receives the value relayed through the event so far, and returns its opinion.
pub type EventCallbackFn = fn(&mut EventContext, Value) -> Result<Value>;

/// A single event handler, plus the data used to order it against other handlers.
#[derive(Clone, Copy)]
pub struct EventCallback {
    pub func: EventCallbackFn,
    /// Lowest order runs first. Unordered handlers run last.
    pub order: u32,
    /// Highest priority runs first.
    pub priority: i32,
    /// Lowest sub-order runs first. Defaults to an order based on the type of effect.
    pub sub_order: Option<u32>,
}

impl EventCallback {
    pub fn new(func: EventCallbackFn) -> Self {
        Self {
            func,
            order: u32::MAX,
            priority: 0,
            sub_order: None,
        }
    }

    pub fn with_order(mut self, order: u32) -> Self {
        self.order = order;
        self
    }

    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }

    pub fn with_sub_order(mut self, sub_order: u32) -> Self {
        self.sub_order = Some(sub_order);
        self
    }
}

impl fmt::Debug for EventCallback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventCallback")
            .field("order", &self.order)
            .field("priority", &self.priority)
            .field("sub_order", &self.sub_order)
            .finish_non_exhaustive()
    }
}

/// The sparse table of event handlers for a single effect.
#[derive(Debug, Default, Clone)]
pub struct EventHandlers {
    handlers: HashMap<(BattleEvent, EventScope), EventCallback>,
}

impl EventHandlers {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a handler for when the holder of the effect is the target of the event.
    pub fn on(self, event: BattleEvent, func: EventCallbackFn) -> Self {
        self.with(event, EventScope::Target, EventCallback::new(func))
    }

    /// Adds a handler for the given scope.
    pub fn on_scope(self, event: BattleEvent, scope: EventScope, func: EventCallbackFn) -> Self {
        self.with(event, scope, EventCallback::new(func))
    }

    /// Adds a handler with custom ordering.
    pub fn with(mut self, event: BattleEvent, scope: EventScope, callback: EventCallback) -> Self {
        self.handlers.insert((event, scope), callback);
        self
    }

    pub fn get(&self, event: BattleEvent, scope: EventScope) -> Option<&EventCallback> {
        self.handlers.get(&(event, scope))
    }

    /// Does the effect handle the event in any scope?
    pub fn handles(&self, event: BattleEvent) -> bool {
        self.handlers.keys().any(|(handled, _)| *handled == event)
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}

static DEFAULT_LIBRARY: Lazy<Arc<EffectLibrary>> = Lazy::new(|| Arc::new(EffectLibrary::new()));

/// Binds behavior to the static data of abilities, conditions, items, and moves.
///
/// Static data only describes an effect. The library holds the handlers that make it do
/// something during a battle. Effects without any entry simply do nothing.
#[derive(Default, Clone)]
pub struct EffectLibrary {
    abilities: HashMap<Id, EventHandlers>,
    conditions: HashMap<Id, EventHandlers>,
    items: HashMap<Id, EventHandlers>,
    moves: HashMap<Id, EventHandlers>,
}

impl EffectLibrary {
    /// Creates a library with every built-in effect.
    pub fn new() -> Self {
        let mut library = Self::empty();
        library::register_all(&mut library);
        library
    }

    /// Creates a library with no effects.
    pub fn empty() -> Self {
        Self::default()
    }

    /// The shared library of built-in effects.
    pub fn shared() -> Arc<Self> {
        DEFAULT_LIBRARY.clone()
    }

    fn table(&self, effect: &EffectHandle) -> &HashMap<Id, EventHandlers> {
        match effect {
            EffectHandle::Ability(_) => &self.abilities,
            EffectHandle::Condition(_) => &self.conditions,
            EffectHandle::Item(_) => &self.items,
            EffectHandle::Move(_) => &self.moves,
        }
    }

    /// Registers handlers for an effect, replacing any existing handlers.
    pub fn register(&mut self, effect: EffectHandle, handlers: EventHandlers) {
        let table = match effect {
            EffectHandle::Ability(_) => &mut self.abilities,
            EffectHandle::Condition(_) => &mut self.conditions,
            EffectHandle::Item(_) => &mut self.items,
            EffectHandle::Move(_) => &mut self.moves,
        };
        table.insert(effect.id().clone(), handlers);
    }

    /// The handlers for an effect.
    pub fn handlers(&self, effect: &EffectHandle) -> Option<&EventHandlers> {
        self.table(effect).get(effect.id())
    }

    /// The handler for a single event on an effect.
    pub fn callback(
        &self,
        effect: &EffectHandle,
        event: BattleEvent,
        scope: EventScope,
    ) -> Option<EventCallback> {
        self.handlers(effect)
            .and_then(|handlers| handlers.get(event, scope))
            .copied()
    }
}

impl fmt::Debug for EffectLibrary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EffectLibrary")
            .field("abilities", &self.abilities.len())
            .field("conditions", &self.conditions.len())
            .field("items", &self.items.len())
            .field("moves", &self.moves.len())
            .finish()
    }
}

#[cfg(test)]
mod callbacks_test {
    use anyhow::Result;
    use apogee_data::Id;

    use crate::{
        battle::EventContext,
        effect::{
            BattleEvent,
            EffectHandle,
            EffectLibrary,
            EventCallback,
            EventHandlers,
            EventScope,
            Value,
        },
    };

    fn no_opinion(_: &mut EventContext, _: Value) -> Result<Value> {
        Ok(Value::Undefined)
    }

    #[test]
    fn registers_handlers_by_scope() {
        let mut library = EffectLibrary::empty();
        let effect = EffectHandle::Ability(Id::from("Test Ability"));
        library.register(
            effect.clone(),
            EventHandlers::new()
                .on(BattleEvent::SwitchIn, no_opinion)
                .with(
                    BattleEvent::ModifyDamage,
                    EventScope::Source,
                    EventCallback::new(no_opinion).with_priority(3),
                ),
        );
        assert!(
            library
                .callback(&effect, BattleEvent::SwitchIn, EventScope::Target)
                .is_some()
        );
        assert!(
            library
                .callback(&effect, BattleEvent::ModifyDamage, EventScope::Target)
                .is_none()
        );
        assert_eq!(
            library
                .callback(&effect, BattleEvent::ModifyDamage, EventScope::Source)
                .map(|callback| callback.priority),
            Some(3)
        );
        assert!(
            library
                .handlers(&EffectHandle::Item(Id::from("testability")))
                .is_none()
        );
    }

    #[test]
    fn default_library_binds_built_in_effects() {
        let library = EffectLibrary::shared();
        assert!(
            library
                .handlers(&EffectHandle::Condition(Id::from("brn")))
                .is_some_and(|handlers| handlers.handles(BattleEvent::Residual))
        );
        assert!(
            library
                .handlers(&EffectHandle::Ability(Id::from("intimidate")))
                .is_some_and(|handlers| handlers.handles(BattleEvent::SwitchIn))
        );
    }
}
