use std::{
    any::Any,
    collections::hash_map::Entry,
};

use ahash::{
    HashMap,
    HashMapExt,
};
use anyhow::Result;
use apogee::Battle;
use apogee_prng::{
    LinearCongruentialGenerator,
    PseudoRandomNumberGenerator,
};

/// A controlled random number generator, for tests that need fine-grained control over battle RNG.
///
/// Values are keyed by their position in the sequence, starting at 1.
#[derive(Clone)]
pub struct ControlledRandomNumberGenerator {
    count: usize,
    fake_values: HashMap<usize, u64>,
    real: LinearCongruentialGenerator,
}

impl ControlledRandomNumberGenerator {
    pub fn new(seed: Option<u64>) -> Self {
        Self {
            count: 0,
            fake_values: HashMap::new(),
            real: LinearCongruentialGenerator::new(seed),
        }
    }

    pub fn sequence_count(&self) -> usize {
        self.count
    }

    pub fn insert_fake_value(&mut self, count: usize, value: u64) {
        self.fake_values.insert(count, value);
    }

    pub fn insert_fake_values<I>(&mut self, iterable: I)
    where
        I: IntoIterator<Item = (usize, u64)>,
    {
        self.fake_values.extend(iterable);
    }

    /// Inserts values relative to the current position, so `1` is the next value generated.
    pub fn insert_fake_values_relative_to_sequence_count<I>(&mut self, iterable: I)
    where
        I: IntoIterator<Item = (usize, u64)>,
    {
        let count = self.count;
        self.fake_values.extend(
            iterable
                .into_iter()
                .map(|(offset, value)| (offset + count, value)),
        );
    }
}

impl PseudoRandomNumberGenerator for ControlledRandomNumberGenerator {
    fn initial_seed(&self) -> u64 {
        self.real.initial_seed()
    }

    fn next(&mut self) -> u64 {
        // Roll the underlying generator so the real sequence stays aligned.
        let next = self.real.next();
        self.count += 1;
        match self.fake_values.entry(self.count) {
            Entry::Occupied(entry) => entry.remove(),
            Entry::Vacant(_) => next,
        }
    }

    fn box_clone(&self) -> Box<dyn PseudoRandomNumberGenerator> {
        Box::new(self.clone())
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// Runs a function against the battle's controlled generator.
///
/// Returns `None` if the battle was not built with a controlled generator.
pub fn with_controlled_rng<F, R>(battle: &Battle, f: F) -> Result<Option<R>>
where
    F: FnOnce(&mut ControlledRandomNumberGenerator) -> R,
{
    battle.with_prng(|prng| {
        prng.as_any_mut()
            .downcast_mut::<ControlledRandomNumberGenerator>()
            .map(f)
    })
}

#[cfg(test)]
mod rng_test {
    use apogee_prng::{
        LinearCongruentialGenerator,
        PseudoRandomNumberGenerator,
    };

    use crate::ControlledRandomNumberGenerator;

    #[test]
    fn replaces_values_at_sequence_positions() {
        let mut real = LinearCongruentialGenerator::new(Some(5));
        let mut controlled = ControlledRandomNumberGenerator::new(Some(5));
        controlled.insert_fake_value(2, 100);
        assert_eq!(controlled.next(), real.next());
        assert_eq!(controlled.next(), 100);
        real.next();
        assert_eq!(controlled.next(), real.next());
        assert_eq!(controlled.sequence_count(), 3);
    }

    #[test]
    fn inserts_relative_to_current_position() {
        let mut controlled = ControlledRandomNumberGenerator::new(Some(5));
        controlled.next();
        controlled.next();
        controlled.insert_fake_values_relative_to_sequence_count([(1, 7), (2, 8)]);
        assert_eq!(controlled.next(), 7);
        assert_eq!(controlled.next(), 8);
    }
}
