use super::archive::Archive;
use super::evaluated::EvaluatedIndividual;
use super::individual::Individual;
use crate::randomness::Randomness;

/// Errors that make one evaluation fail. None of them aborts the search:
/// the runner records a zero-fitness outcome and moves on.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EvaluationError {
    #[error("SUT unreachable: {0}")]
    SutUnreachable(String),

    #[error("Coverage unavailable: {0}")]
    CoverageUnavailable(String),

    #[error("No chained location stored under '{0}'")]
    MissingChainedLocation(String),
}

impl EvaluationError {
    /// Name of the error class, used when reporting failures
    pub fn class_name(&self) -> &'static str {
        match self {
            EvaluationError::SutUnreachable(_) => "SutUnreachableError",
            EvaluationError::CoverageUnavailable(_) => "CoverageUnavailableError",
            EvaluationError::MissingChainedLocation(_) => "MissingChainedLocationError",
        }
    }
}

/// Executes an individual and measures the targets it reaches
pub trait FitnessFunction<I: Individual> {
    /// Evaluate `individual`. The archive tells which targets are still
    /// worth asking about.
    fn evaluate(
        &mut self,
        individual: &I,
        archive: &Archive<I>,
        randomness: &mut Randomness,
    ) -> Result<EvaluatedIndividual<I>, EvaluationError>;
}
