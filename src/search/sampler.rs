use super::individual::Individual;
use crate::randomness::Randomness;

/// Source of fresh individuals for a problem
pub trait Sampler<I: Individual> {
    /// A new random individual
    fn sample(&mut self, randomness: &mut Randomness) -> I;

    /// Add or remove actions. Only called on individuals whose structure
    /// can be mutated. The default keeps the structure unchanged.
    fn mutate_structure(&mut self, _individual: &mut I, _randomness: &mut Randomness) {}
}
