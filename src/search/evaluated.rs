use super::action::ActionResult;
use super::fitness_value::FitnessValue;
use super::individual::Individual;

/// An individual frozen together with its fitness and per-action results.
///
/// Immutable once built. The archive shares it behind an `Arc` between all
/// the targets it is best for.
#[derive(Debug, Clone)]
pub struct EvaluatedIndividual<I> {
    fitness: FitnessValue,
    individual: I,
    results: Vec<ActionResult>,
}

impl<I: Individual> EvaluatedIndividual<I> {
    pub fn new(fitness: FitnessValue, individual: I, results: Vec<ActionResult>) -> Self {
        Self {
            fitness,
            individual,
            results,
        }
    }

    /// Outcome of an evaluation that failed: no targets, no results
    pub fn zero(individual: I) -> Self {
        let fitness = FitnessValue::new(individual.size() as f64);
        Self::new(fitness, individual, Vec::new())
    }

    pub fn fitness(&self) -> &FitnessValue {
        &self.fitness
    }

    pub fn individual(&self) -> &I {
        &self.individual
    }

    pub fn results(&self) -> &[ActionResult] {
        &self.results
    }

    /// Independent copy of the individual, safe to mutate
    pub fn copy_individual(&self) -> I {
        self.individual.copy()
    }
}
