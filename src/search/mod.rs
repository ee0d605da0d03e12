//! Problem-independent search machinery
//!
//! - `Action` / `ActionResult`: the closed set of executable steps
//! - `Individual`: the genotype contract every problem implements
//! - `FitnessValue`, `EvaluatedIndividual`, `IdMapper`: evaluation bookkeeping
//! - `Archive`: best individual per coverage target
//! - `Sampler`, `StandardMutator`, `FitnessFunction`, `SearchRunner`: the loop

mod action;
mod archive;
mod evaluated;
mod fitness;
mod fitness_value;
mod id_mapper;
mod individual;
mod mutator;
mod runner;
mod sampler;

#[cfg(test)]
pub(crate) mod testing;

pub use self::action::{Action, ActionKind, ActionResult};
pub use self::archive::{Archive, ArchiveError, ArchiveResult, ArchiveStats, Solution};
pub use self::evaluated::EvaluatedIndividual;
pub use self::fitness::{EvaluationError, FitnessFunction};
pub use self::fitness_value::{FitnessError, FitnessResult, FitnessValue, TargetId, MAX_VALUE, MIN_VALUE};
pub use self::id_mapper::IdMapper;
pub use self::individual::{GeneFilter, Individual, IndividualError, IndividualResult};
pub use self::mutator::StandardMutator;
pub use self::runner::{SearchConfig, SearchRunner, SearchStats};
pub use self::sampler::Sampler;
