//! Archive of the best individual found per coverage target
//!
//! The archive keeps, for every target discovered so far, at most one
//! evaluated individual: the one with the highest value for that target.
//! It also tracks which targets are not fully covered yet, so the evaluator
//! can ask the instrumentation about them, and it provides parents for
//! mutation.
//!
//! ## Update policy
//!
//! A stored entry is replaced only by a strictly better value, so the value
//! recorded for a target never decreases and equal values keep the entry
//! found first. Covered targets keep their entry, which still serves as a
//! parent for mutation.

use super::evaluated::EvaluatedIndividual;
use super::fitness_value::{FitnessValue, TargetId, MAX_VALUE};
use super::individual::Individual;
use crate::randomness::Randomness;
use log::debug;
use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;

/// Type alias for archive operation results
pub type ArchiveResult<T> = Result<T, ArchiveError>;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ArchiveError {
    #[error("Archive is empty: no individual has been stored yet")]
    Empty,
}

#[derive(Debug)]
struct ArchiveEntry<I> {
    value: f64,
    evaluated: Arc<EvaluatedIndividual<I>>,
}

/// Progress counters of an archive
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ArchiveStats {
    pub known_targets: usize,
    pub covered_targets: usize,
    pub not_covered_targets: usize,
    pub distinct_individuals: usize,
    /// Number of improvements accepted so far
    pub updates: u64,
}

/// Final outcome of a search: a small set of individuals covering every
/// covered target, plus the best value reached for each known target
#[derive(Debug, Clone)]
pub struct Solution<I> {
    pub overall: FitnessValue,
    pub individuals: Vec<EvaluatedIndividual<I>>,
}

impl<I> Solution<I> {
    pub fn covered_targets(&self) -> usize {
        self.overall.covered_targets()
    }
}

#[derive(Debug)]
pub struct Archive<I> {
    /// Ordered so that iteration, and therefore sampling, is deterministic
    populations: BTreeMap<TargetId, ArchiveEntry<I>>,
    not_covered: HashSet<TargetId>,
    updates: u64,
}

impl<I> Default for Archive<I> {
    fn default() -> Self {
        Self {
            populations: BTreeMap::new(),
            not_covered: HashSet::new(),
            updates: 0,
        }
    }
}

impl<I: Individual> Archive<I> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.populations.is_empty()
    }

    /// Targets discovered so far whose best value is still below 1.0
    pub fn not_covered_targets(&self) -> &HashSet<TargetId> {
        &self.not_covered
    }

    /// Covered targets, sorted
    pub fn covered_targets(&self) -> Vec<TargetId> {
        self.populations
            .iter()
            .filter(|(_, e)| e.value >= MAX_VALUE)
            .map(|(id, _)| *id)
            .collect()
    }

    pub fn is_covered(&self, target: TargetId) -> bool {
        self.value_of(target).map_or(false, |v| v >= MAX_VALUE)
    }

    /// Best value recorded for a target
    pub fn value_of(&self, target: TargetId) -> Option<f64> {
        self.populations.get(&target).map(|e| e.value)
    }

    /// Up to `k` not-covered targets, chosen uniformly
    pub fn choose_targets(&self, k: usize, randomness: &mut Randomness) -> HashSet<TargetId> {
        randomness.choose_subset(&self.not_covered, k)
    }

    /// Store `evaluated` for `target` if it is strictly better than the
    /// current entry, or if there is no entry yet. Returns whether the
    /// archive changed.
    pub fn add_if_improved(
        &mut self,
        target: TargetId,
        evaluated: &Arc<EvaluatedIndividual<I>>,
    ) -> bool {
        let value = evaluated.fitness().value_of(target).unwrap_or(0.0);

        let improved = match self.populations.get(&target) {
            Some(entry) => value > entry.value,
            None => true,
        };
        if !improved {
            return false;
        }

        self.populations.insert(
            target,
            ArchiveEntry {
                value,
                evaluated: Arc::clone(evaluated),
            },
        );
        if value >= MAX_VALUE {
            if self.not_covered.remove(&target) {
                debug!("Target {} covered", target);
            }
        } else {
            self.not_covered.insert(target);
        }
        self.updates += 1;
        true
    }

    /// Offer an evaluation for every target it reached. Returns whether any
    /// target improved.
    pub fn add_if_needed(&mut self, evaluated: EvaluatedIndividual<I>) -> bool {
        let evaluated = Arc::new(evaluated);
        let mut improved = false;
        for target in evaluated.fitness().targets() {
            improved |= self.add_if_improved(target, &evaluated);
        }
        improved
    }

    /// Distinct archived evaluations, in target order
    fn distinct_individuals(&self) -> Vec<&Arc<EvaluatedIndividual<I>>> {
        let mut seen: HashSet<*const EvaluatedIndividual<I>> = HashSet::new();
        self.populations
            .values()
            .map(|entry| &entry.evaluated)
            .filter(|evaluated| seen.insert(Arc::as_ptr(evaluated)))
            .collect()
    }

    /// Uniformly chosen archived individual, returned as an independent copy
    pub fn sample_individual(&self, randomness: &mut Randomness) -> ArchiveResult<I> {
        let distinct = self.distinct_individuals();
        randomness
            .choose(&distinct)
            .map(|e| e.copy_individual())
            .ok_or(ArchiveError::Empty)
    }

    pub fn stats(&self) -> ArchiveStats {
        let covered = self.populations.values().filter(|e| e.value >= MAX_VALUE).count();
        ArchiveStats {
            known_targets: self.populations.len(),
            covered_targets: covered,
            not_covered_targets: self.not_covered.len(),
            distinct_individuals: self.distinct_individuals().len(),
            updates: self.updates,
        }
    }

    /// Greedy minimal set of archived individuals covering every covered
    /// target. At each step the individual covering the most remaining
    /// targets is taken, the smaller one on ties.
    pub fn extract_solution(&self) -> Solution<I> {
        let candidates = self.distinct_individuals();
        let mut overall = FitnessValue::new(0.0);
        for candidate in &candidates {
            overall.merge_max(candidate.fitness());
        }

        let mut remaining: HashSet<TargetId> = self.covered_targets().into_iter().collect();
        let mut chosen: Vec<EvaluatedIndividual<I>> = Vec::new();
        let mut size = 0.0;

        while !remaining.is_empty() {
            let best = candidates
                .iter()
                .map(|c| {
                    let gain = remaining.iter().filter(|t| c.fitness().does_cover(**t)).count();
                    (gain, c)
                })
                .filter(|(gain, _)| *gain > 0)
                .fold(None, |best: Option<(usize, &&Arc<EvaluatedIndividual<I>>)>, (gain, c)| {
                    match best {
                        Some((best_gain, b))
                            if best_gain > gain
                                || (best_gain == gain
                                    && b.individual().size() <= c.individual().size()) =>
                        {
                            Some((best_gain, b))
                        }
                        _ => Some((gain, c)),
                    }
                });

            let Some((_, best)) = best else {
                break;
            };
            remaining.retain(|t| !best.fitness().does_cover(*t));
            size += best.individual().size() as f64;
            chosen.push(EvaluatedIndividual::clone(best));
        }

        overall.set_size(size);
        Solution {
            overall,
            individuals: chosen,
        }
    }
}
