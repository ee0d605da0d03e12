//! SearchRunner - the main search loop
//!
//! Each iteration produces one candidate, either sampled from scratch or
//! mutated from a copy of an archived individual, evaluates it and merges
//! the outcome into the archive. A failed evaluation never stops the loop:
//! it is counted, reported by error class and recorded as zero fitness.

use super::archive::{Archive, ArchiveStats, Solution};
use super::evaluated::EvaluatedIndividual;
use super::fitness::FitnessFunction;
use super::individual::Individual;
use super::mutator::StandardMutator;
use super::sampler::Sampler;
use crate::randomness::Randomness;
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::{Duration, Instant};

/// Configuration for the SearchRunner
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SearchConfig {
    /// Maximum number of iterations, counting discarded candidates
    pub max_evaluations: Option<u64>,

    /// Maximum wall time of the whole search, in seconds
    pub max_time_seconds: Option<u64>,

    /// Random seed for deterministic execution
    pub seed: u64,

    /// Probability of sampling a fresh individual instead of mutating an
    /// archived one
    pub probability_of_random_sampling: f64,

    /// Probability of a structure mutation for individuals that allow it
    pub structure_mutation_probability: f64,

    /// Log progress every this many iterations, 0 disables it
    pub progress_interval: u64,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            max_evaluations: Some(1000),
            max_time_seconds: None,
            seed: 0,
            probability_of_random_sampling: 0.5,
            structure_mutation_probability: 0.5,
            progress_interval: 100,
        }
    }
}

impl SearchConfig {
    pub fn max_time(&self) -> Option<Duration> {
        self.max_time_seconds.map(Duration::from_secs)
    }
}

/// Statistics about a search run
#[derive(Debug, Clone, Default)]
pub struct SearchStats {
    pub iterations: u64,

    /// Candidates that reached the fitness function
    pub evaluations: u64,

    pub sampled: u64,

    pub mutated: u64,

    /// Candidates dropped because their initialization could not be repaired
    pub discarded: u64,

    /// Evaluations that improved at least one target
    pub improvements: u64,

    /// Failed evaluations per error class
    pub evaluation_errors: HashMap<String, u64>,

    pub elapsed: Duration,
}

impl SearchStats {
    pub fn failed_evaluations(&self) -> u64 {
        self.evaluation_errors.values().sum()
    }
}

/// Main search engine
#[derive(Debug)]
pub struct SearchRunner<I, S, F> {
    config: SearchConfig,
    archive: Archive<I>,
    sampler: S,
    fitness: F,
    mutator: StandardMutator,
    randomness: Randomness,
    stats: SearchStats,
}

impl<I, S, F> SearchRunner<I, S, F>
where
    I: Individual,
    S: Sampler<I>,
    F: FitnessFunction<I>,
{
    pub fn new(config: SearchConfig, sampler: S, fitness: F) -> Self {
        let randomness = Randomness::new(config.seed);
        let mutator = StandardMutator::new(config.structure_mutation_probability);
        Self {
            config,
            archive: Archive::new(),
            sampler,
            fitness,
            mutator,
            randomness,
            stats: SearchStats::default(),
        }
    }

    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    pub fn archive(&self) -> &Archive<I> {
        &self.archive
    }

    pub fn stats(&self) -> &SearchStats {
        &self.stats
    }

    pub fn fitness(&self) -> &F {
        &self.fitness
    }

    /// Run until the budget is exhausted and return the solution
    pub fn search(&mut self) -> Solution<I> {
        let start = Instant::now();
        info!(
            "Starting search: max_evaluations={:?}, max_time={:?}, seed={}",
            self.config.max_evaluations,
            self.config.max_time(),
            self.config.seed
        );

        while !self.budget_exhausted(start) {
            self.iterate();
            self.stats.elapsed = start.elapsed();

            let interval = self.config.progress_interval;
            if interval > 0 && self.stats.iterations % interval == 0 {
                log_progress(&self.stats, &self.archive.stats());
            }
        }

        self.stats.elapsed = start.elapsed();
        let solution = self.archive.extract_solution();
        info!(
            "Search finished after {} iterations in {:?}: {} targets covered by {} tests, {} failed evaluations",
            self.stats.iterations,
            self.stats.elapsed,
            solution.covered_targets(),
            solution.individuals.len(),
            self.stats.failed_evaluations()
        );
        solution
    }

    fn budget_exhausted(&self, start: Instant) -> bool {
        if let Some(max) = self.config.max_evaluations {
            if self.stats.iterations >= max {
                return true;
            }
        }
        if let Some(max_time) = self.config.max_time() {
            if start.elapsed() >= max_time {
                return true;
            }
        }
        false
    }

    fn iterate(&mut self) {
        self.stats.iterations += 1;

        let candidate = match self.next_candidate() {
            Some(candidate) => candidate,
            None => {
                self.stats.discarded += 1;
                return;
            }
        };

        let evaluated = match self
            .fitness
            .evaluate(&candidate, &self.archive, &mut self.randomness)
        {
            Ok(evaluated) => evaluated,
            Err(e) => {
                warn!("Evaluation failed with {}: {}", e.class_name(), e);
                *self
                    .stats
                    .evaluation_errors
                    .entry(e.class_name().to_string())
                    .or_insert(0) += 1;
                EvaluatedIndividual::zero(candidate)
            }
        };
        self.stats.evaluations += 1;

        if self.archive.add_if_needed(evaluated) {
            self.stats.improvements += 1;
        }
    }

    /// Fresh sample or mutated archive copy; `None` if the candidate had to
    /// be discarded
    fn next_candidate(&mut self) -> Option<I> {
        let sample_fresh = self.archive.is_empty()
            || self
                .randomness
                .next_bool_with_probability(self.config.probability_of_random_sampling);

        if !sample_fresh {
            if let Ok(mut individual) = self.archive.sample_individual(&mut self.randomness) {
                return match self
                    .mutator
                    .mutate(&mut individual, &mut self.sampler, &mut self.randomness)
                {
                    Ok(()) => {
                        self.stats.mutated += 1;
                        Some(individual)
                    }
                    Err(e) => {
                        debug!("Discarding mutated candidate: {}", e);
                        None
                    }
                };
            }
        }

        self.stats.sampled += 1;
        let mut individual = self.sampler.sample(&mut self.randomness);
        if !individual.verify_initialization_actions() {
            if let Err(e) = individual.repair_initialization_actions(&mut self.randomness) {
                debug!("Discarding sampled candidate: {}", e);
                return None;
            }
        }
        Some(individual)
    }
}

fn log_progress(stats: &SearchStats, archive: &ArchiveStats) {
    info!(
        "Iteration {}: {} evaluations, {}/{} targets covered, {} tests archived, {} failed, {} discarded",
        stats.iterations,
        stats.evaluations,
        archive.covered_targets,
        archive.known_targets,
        archive.distinct_individuals,
        stats.failed_evaluations(),
        stats.discarded
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::search::fitness::EvaluationError;
    use crate::search::testing::BitsIndividual;
    use crate::search::FitnessValue;

    struct BitsSampler {
        len: usize,
    }

    impl Sampler<BitsIndividual> for BitsSampler {
        fn sample(&mut self, randomness: &mut Randomness) -> BitsIndividual {
            let mut individual = BitsIndividual::new(&vec![0; self.len]);
            for gene in &mut individual.genes {
                gene.randomize(randomness);
            }
            individual
        }
    }

    /// Target `i` is covered when bit `i` is set
    struct OneMax {
        fail_every: Option<u64>,
        calls: u64,
    }

    impl FitnessFunction<BitsIndividual> for OneMax {
        fn evaluate(
            &mut self,
            individual: &BitsIndividual,
            _archive: &Archive<BitsIndividual>,
            _randomness: &mut Randomness,
        ) -> Result<EvaluatedIndividual<BitsIndividual>, EvaluationError> {
            self.calls += 1;
            if let Some(n) = self.fail_every {
                if self.calls % n == 0 {
                    return Err(EvaluationError::SutUnreachable("reset failed".to_string()));
                }
            }
            let mut fv = FitnessValue::new(individual.size() as f64);
            for (i, bit) in individual.bits().iter().enumerate() {
                fv.update_target(i as i32, *bit as f64).unwrap();
            }
            Ok(EvaluatedIndividual::new(fv, individual.copy(), vec![]))
        }
    }

    fn config(max_evaluations: u64) -> SearchConfig {
        SearchConfig {
            max_evaluations: Some(max_evaluations),
            seed: 42,
            progress_interval: 0,
            ..Default::default()
        }
    }

    #[test]
    fn test_covers_all_targets() {
        let fitness = OneMax {
            fail_every: None,
            calls: 0,
        };
        let mut runner = SearchRunner::new(config(300), BitsSampler { len: 8 }, fitness);
        let solution = runner.search();

        assert_eq!(solution.covered_targets(), 8);
        assert!(runner.archive().not_covered_targets().is_empty());
        assert_eq!(runner.stats().iterations, 300);
        assert_eq!(runner.stats().evaluations, 300);
        assert!(runner.stats().mutated > 0);
    }

    #[test]
    fn test_failed_evaluations_do_not_stop_the_loop() {
        let fitness = OneMax {
            fail_every: Some(3),
            calls: 0,
        };
        let mut runner = SearchRunner::new(config(30), BitsSampler { len: 4 }, fitness);
        runner.search();

        assert_eq!(runner.stats().iterations, 30);
        assert_eq!(runner.stats().failed_evaluations(), 10);
        assert_eq!(
            runner.stats().evaluation_errors.get("SutUnreachableError"),
            Some(&10)
        );
    }

    #[test]
    fn test_same_seed_same_outcome() {
        let run = || {
            let fitness = OneMax {
                fail_every: None,
                calls: 0,
            };
            let mut runner = SearchRunner::new(config(20), BitsSampler { len: 16 }, fitness);
            let solution = runner.search();
            (solution.overall.targets(), runner.archive().covered_targets())
        };
        assert_eq!(run(), run());
    }
}
