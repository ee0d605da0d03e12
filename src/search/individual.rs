use super::action::Action;
use crate::database::find_violation;
use crate::gene::Gene;
use crate::randomness::Randomness;
use std::fmt::Debug;

/// Type alias for individual operation results
pub type IndividualResult<T> = Result<T, IndividualError>;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IndividualError {
    #[error("Initialization actions still inconsistent after {attempts} repair attempts: {reason}")]
    Unrepairable { attempts: usize, reason: String },
}

/// Which part of an individual a gene view covers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GeneFilter {
    All,
    /// Genes of the initializing (seeding) actions
    OnlySeed,
    /// Genes of the main actions
    OnlyMain,
}

/// A candidate test case: initializing actions followed by main actions.
///
/// Individuals own their actions and genes exclusively, so `copy()` is a
/// plain deep clone. Archived individuals are never mutated in place: the
/// search loop mutates a copy.
pub trait Individual: Clone + Debug {
    /// Fully independent deep copy
    fn copy(&self) -> Self {
        self.clone()
    }

    fn see_actions(&self) -> &[Action];

    fn see_initializing_actions(&self) -> &[Action];

    fn see_genes(&self, filter: GeneFilter) -> Vec<&Gene>;

    fn see_genes_mut(&mut self, filter: GeneFilter) -> Vec<&mut Gene>;

    /// Parsimony signal, lower is better among equally fit individuals
    fn size(&self) -> usize;

    /// Whether actions may be added or removed, rather than only mutating genes
    fn can_mutate_structure(&self) -> bool;

    /// The SQL insertions among the initializing actions are consistent
    fn verify_initialization_actions(&self) -> bool {
        let insertions = self
            .see_initializing_actions()
            .iter()
            .filter_map(Action::as_sql_insert);
        self.see_initializing_actions().iter().all(Action::verify)
            && find_violation(insertions).is_none()
    }

    /// Restore consistency of the initializing actions, failing when a
    /// bounded number of attempts is not enough. Must leave a consistent
    /// individual untouched.
    fn repair_initialization_actions(&mut self, _randomness: &mut Randomness) -> IndividualResult<()> {
        if self.verify_initialization_actions() {
            Ok(())
        } else {
            Err(IndividualError::Unrepairable {
                attempts: 0,
                reason: "individual does not support repair".to_string(),
            })
        }
    }
}

