//! Seeded randomness shared by the search components
//!
//! Every random decision in the engine (sampling, mutation, target selection,
//! archive sampling) flows through a single `Randomness` handle backed by
//! `ChaCha8Rng`, so a run with a fixed seed is fully reproducible.

use rand::distributions::Alphanumeric;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use std::collections::HashSet;
use std::hash::Hash;

/// Upper bound on the length of randomly generated strings when the domain
/// itself is unbounded or very large
pub const MAX_RANDOM_STRING_LENGTH: usize = 16;

/// Explicit random source passed into every component that needs one
#[derive(Debug, Clone)]
pub struct Randomness {
    rng: ChaCha8Rng,
    seed: u64,
}

impl Randomness {
    /// Create a deterministic random source from a seed
    pub fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
            seed,
        }
    }

    /// Create a random source with a seed drawn from the OS
    pub fn from_entropy() -> Self {
        Self::new(rand::random())
    }

    /// The seed this source was created with
    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn next_bool(&mut self) -> bool {
        self.rng.gen()
    }

    /// Returns true with probability `p`. Values outside [0,1] are clamped.
    pub fn next_bool_with_probability(&mut self, p: f64) -> bool {
        if p.is_nan() || p <= 0.0 {
            return false;
        }
        if p >= 1.0 {
            return true;
        }
        self.rng.gen_bool(p)
    }

    /// Uniform integer in the inclusive range `[min, max]`
    pub fn next_int(&mut self, min: i64, max: i64) -> i64 {
        if min >= max {
            return min;
        }
        self.rng.gen_range(min..=max)
    }

    /// Uniform index in the inclusive range `[min, max]`
    pub fn next_usize(&mut self, min: usize, max: usize) -> usize {
        if min >= max {
            return min;
        }
        self.rng.gen_range(min..=max)
    }

    /// Uniform double in `[0, 1)`
    pub fn next_double(&mut self) -> f64 {
        self.rng.gen()
    }

    pub fn next_char(&mut self) -> char {
        self.rng.sample(Alphanumeric) as char
    }

    /// Random alphanumeric string whose length lies in `[min_length, max_length]`.
    ///
    /// Lengths above `min_length + MAX_RANDOM_STRING_LENGTH` are never produced,
    /// which keeps unbounded domains practical.
    pub fn next_string(&mut self, min_length: usize, max_length: usize) -> String {
        let upper = max_length.min(min_length.saturating_add(MAX_RANDOM_STRING_LENGTH));
        let length = self.next_usize(min_length, upper);
        (0..length).map(|_| self.next_char()).collect()
    }

    /// Pick one element uniformly, `None` for an empty slice
    pub fn choose<'a, T>(&mut self, items: &'a [T]) -> Option<&'a T> {
        items.choose(&mut self.rng)
    }

    /// Pick one index uniformly from `0..len`, `None` if `len == 0`
    pub fn choose_index(&mut self, len: usize) -> Option<usize> {
        if len == 0 {
            None
        } else {
            Some(self.rng.gen_range(0..len))
        }
    }

    /// Choose up to `k` distinct elements of `set` uniformly.
    ///
    /// Elements are sorted before sampling so the outcome depends only on the
    /// seed, never on hash iteration order.
    pub fn choose_subset<T>(&mut self, set: &HashSet<T>, k: usize) -> HashSet<T>
    where
        T: Clone + Eq + Hash + Ord,
    {
        if set.len() <= k {
            return set.clone();
        }
        let mut sorted: Vec<&T> = set.iter().collect();
        sorted.sort();
        rand::seq::index::sample(&mut self.rng, sorted.len(), k)
            .into_iter()
            .map(|i| sorted[i].clone())
            .collect()
    }
}

impl Default for Randomness {
    fn default() -> Self {
        Self::new(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_same_seed_same_sequence() {
        let mut a = Randomness::new(42);
        let mut b = Randomness::new(42);
        for _ in 0..50 {
            assert_eq!(a.next_int(-1000, 1000), b.next_int(-1000, 1000));
        }
    }

    #[test]
    fn test_next_int_degenerate_range() {
        let mut r = Randomness::new(1);
        assert_eq!(r.next_int(5, 5), 5);
        assert_eq!(r.next_int(7, 3), 7);
    }

    #[test]
    fn test_probability_edges() {
        let mut r = Randomness::new(3);
        for _ in 0..20 {
            assert!(!r.next_bool_with_probability(0.0));
            assert!(r.next_bool_with_probability(1.0));
            assert!(!r.next_bool_with_probability(f64::NAN));
        }
    }

    #[test]
    fn test_next_string_respects_bounds() {
        let mut r = Randomness::new(9);
        for _ in 0..100 {
            let s = r.next_string(2, 5);
            let n = s.chars().count();
            assert!((2..=5).contains(&n));
        }
        let s = r.next_string(0, usize::MAX);
        assert!(s.chars().count() <= MAX_RANDOM_STRING_LENGTH);
    }

    #[test]
    fn test_choose_subset_caps_size() {
        let mut r = Randomness::new(11);
        let set: HashSet<i32> = (0..500).collect();
        let chosen = r.choose_subset(&set, 100);
        assert_eq!(chosen.len(), 100);
        assert!(chosen.iter().all(|id| set.contains(id)));

        let small: HashSet<i32> = (0..3).collect();
        assert_eq!(r.choose_subset(&small, 100), small);
    }

    #[test]
    fn test_choose_subset_deterministic() {
        let set: HashSet<i32> = (0..200).collect();
        let a = Randomness::new(5).choose_subset(&set, 10);
        let b = Randomness::new(5).choose_subset(&set, 10);
        assert_eq!(a, b);
    }
}
