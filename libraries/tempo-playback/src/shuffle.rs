//! Shuffle selection
//!
//! Shuffle never reorders the queue. Each advance picks uniformly among the
//! positions not yet surfaced in the current pass, so a pass visits every
//! position exactly once and then ends.

use rand::rngs::StdRng;
use rand::seq::IteratorRandom;
use rand::SeedableRng;
use std::collections::BTreeSet;

/// Create the shuffle generator, seeded when a seed is configured
pub fn shuffle_rng(seed: Option<u64>) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    }
}

/// Pick a random position in `0..len` that is neither `current` nor in `visited`
///
/// Returns `None` once the pass is exhausted.
pub fn pick_unvisited(
    len: usize,
    current: usize,
    visited: &BTreeSet<usize>,
    rng: &mut StdRng,
) -> Option<usize> {
    (0..len)
        .filter(|position| *position != current && !visited.contains(position))
        .choose(rng)
}
