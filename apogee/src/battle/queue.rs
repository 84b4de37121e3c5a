use std::collections::VecDeque;

use apogee_prng::PseudoRandomNumberGenerator;

use crate::battle::{
    Action,
    CoreBattleEngineSpeedSortTieResolution,
    speed_sort,
};

/// The queue of actions waiting to run in a turn.
#[derive(Debug, Default, Clone)]
pub struct BattleQueue {
    actions: VecDeque<Action>,
}

impl BattleQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, action: Action) {
        self.actions.push_back(action);
    }

    /// Adds an action that runs immediately, ahead of everything already queued.
    pub fn push_front(&mut self, action: Action) {
        self.actions.push_front(action);
    }

    pub fn pop_front(&mut self) -> Option<Action> {
        self.actions.pop_front()
    }

    /// Sorts the queue by speed order.
    pub fn sort(
        &mut self,
        prng: &mut dyn PseudoRandomNumberGenerator,
        tie_resolution: CoreBattleEngineSpeedSortTieResolution,
    ) {
        speed_sort(self.actions.make_contiguous(), prng, tie_resolution);
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    pub fn len(&self) -> usize {
        self.actions.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Action> {
        self.actions.iter()
    }

    /// Is there an action queued for the player?
    pub fn has_action_for_player(&self, player: usize) -> bool {
        self.actions
            .iter()
            .any(|action| action.player() == Some(player))
    }

    pub fn clear(&mut self) {
        self.actions.clear();
    }
}

#[cfg(test)]
mod queue_test {
    use apogee_prng::LinearCongruentialGenerator;

    use crate::battle::{
        Action,
        BattleQueue,
        CoreBattleEngineSpeedSortTieResolution,
        TeamAction,
    };

    #[test]
    fn sorts_and_pops_in_order() {
        let mut queue = BattleQueue::new();
        queue.push(Action::Residual);
        queue.push(Action::Start);
        queue.push(Action::Team(TeamAction {
            player: 1,
            order: vec![1, 0],
        }));
        queue.sort(
            &mut LinearCongruentialGenerator::new(Some(0)),
            CoreBattleEngineSpeedSortTieResolution::Keep,
        );
        assert!(queue.has_action_for_player(1));
        assert!(!queue.has_action_for_player(0));
        assert!(matches!(queue.pop_front(), Some(Action::Team(_))));
        assert_eq!(queue.pop_front(), Some(Action::Start));
        queue.push_front(Action::Start);
        assert_eq!(queue.len(), 2);
        assert_eq!(queue.pop_front(), Some(Action::Start));
        assert_eq!(queue.pop_front(), Some(Action::Residual));
        assert!(queue.is_empty());
    }
}
