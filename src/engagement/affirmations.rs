//! Affirmation selection — pluggable source of uniform random choice.

use std::sync::atomic::{AtomicUsize, Ordering};

use rand::seq::SliceRandom;

use crate::engagement::messages::AFFIRMATIONS;

/// Source of affirmation messages. Injected into the state machine so tests
/// can supply a deterministic sequence.
pub trait AffirmationSource: Send + Sync {
    fn pick(&self) -> &'static str;
}

/// Production source: uniform random choice over the fixed pool.
#[derive(Debug, Default)]
pub struct RandomAffirmations;

impl AffirmationSource for RandomAffirmations {
    fn pick(&self) -> &'static str {
        AFFIRMATIONS
            .choose(&mut rand::thread_rng())
            .copied()
            .unwrap_or(AFFIRMATIONS[0])
    }
}

/// Deterministic source for tests: cycles through the pool in order.
#[derive(Debug, Default)]
pub struct FixedAffirmations {
    next: AtomicUsize,
}

impl AffirmationSource for FixedAffirmations {
    fn pick(&self) -> &'static str {
        let i = self.next.fetch_add(1, Ordering::Relaxed);
        AFFIRMATIONS[i % AFFIRMATIONS.len()]
    }
}
