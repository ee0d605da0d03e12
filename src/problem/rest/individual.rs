use super::action::RestCallAction;
use crate::database::{repair_insertions, SqlInsertAction};
use crate::gene::Gene;
use crate::randomness::Randomness;
use crate::search::{Action, GeneFilter, Individual, IndividualError, IndividualResult};
use serde::{Deserialize, Serialize};

/// Bound on the fixes applied when repairing initialization actions
pub const MAX_REPAIR_ATTEMPTS: usize = 100;

/// How an individual was built by the sampler
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SampleType {
    /// Random sequence of calls; actions may be added or removed
    Random,
    /// Deliberate POST then dependent call chain; the structure is fixed
    Smart,
}

/// A REST test case: SQL insertions seeding the database, followed by
/// calls to the SUT
#[derive(Debug, Clone, PartialEq)]
pub struct RestIndividual {
    db_initialization: Vec<Action>,
    actions: Vec<Action>,
    sample_type: SampleType,
}

impl RestIndividual {
    pub fn new(actions: Vec<RestCallAction>, sample_type: SampleType) -> Self {
        Self {
            db_initialization: Vec::new(),
            actions: actions.into_iter().map(Action::RestCall).collect(),
            sample_type,
        }
    }

    pub fn with_db_initialization(mut self, insertions: Vec<SqlInsertAction>) -> Self {
        self.db_initialization = insertions.into_iter().map(Action::SqlInsert).collect();
        self
    }

    pub fn sample_type(&self) -> SampleType {
        self.sample_type
    }

    pub fn rest_calls(&self) -> impl Iterator<Item = &RestCallAction> {
        self.actions.iter().filter_map(Action::as_rest_call)
    }

    pub fn rest_call_count(&self) -> usize {
        self.rest_calls().count()
    }

    pub fn add_action(&mut self, action: RestCallAction) {
        self.actions.push(Action::RestCall(action));
    }

    pub fn insert_action(&mut self, index: usize, action: RestCallAction) {
        let index = index.min(self.actions.len());
        self.actions.insert(index, Action::RestCall(action));
    }

    pub fn remove_action(&mut self, index: usize) -> Option<Action> {
        if index < self.actions.len() {
            Some(self.actions.remove(index))
        } else {
            None
        }
    }

    fn insertions(&self) -> Vec<SqlInsertAction> {
        self.db_initialization
            .iter()
            .filter_map(Action::as_sql_insert)
            .cloned()
            .collect()
    }
}

impl Individual for RestIndividual {
    fn see_actions(&self) -> &[Action] {
        &self.actions
    }

    fn see_initializing_actions(&self) -> &[Action] {
        &self.db_initialization
    }

    fn see_genes(&self, filter: GeneFilter) -> Vec<&Gene> {
        let seed = self.db_initialization.iter().flat_map(Action::see_genes);
        let main = self.actions.iter().flat_map(Action::see_genes);
        match filter {
            GeneFilter::All => seed.chain(main).collect(),
            GeneFilter::OnlySeed => seed.collect(),
            GeneFilter::OnlyMain => main.collect(),
        }
    }

    fn see_genes_mut(&mut self, filter: GeneFilter) -> Vec<&mut Gene> {
        let seed = self.db_initialization.iter_mut().flat_map(Action::see_genes_mut);
        let main = self.actions.iter_mut().flat_map(Action::see_genes_mut);
        match filter {
            GeneFilter::All => seed.chain(main).collect(),
            GeneFilter::OnlySeed => seed.collect(),
            GeneFilter::OnlyMain => main.collect(),
        }
    }

    fn size(&self) -> usize {
        self.db_initialization.len() + self.actions.len()
    }

    fn can_mutate_structure(&self) -> bool {
        self.sample_type == SampleType::Random
    }

    fn repair_initialization_actions(&mut self, randomness: &mut Randomness) -> IndividualResult<()> {
        if self.verify_initialization_actions() {
            return Ok(());
        }
        let mut insertions = self.insertions();
        let result = repair_insertions(&mut insertions, randomness, MAX_REPAIR_ATTEMPTS);
        self.db_initialization = insertions.into_iter().map(Action::SqlInsert).collect();
        result.map_err(|violation| IndividualError::Unrepairable {
            attempts: MAX_REPAIR_ATTEMPTS,
            reason: violation.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::ColumnDto;
    use crate::gene::{IntegerGene, StringGene};
    use crate::problem::rest::{HttpVerb, Param, RestPath};

    fn call(verb: HttpVerb, template: &str, params: Vec<Param>) -> RestCallAction {
        RestCallAction::new(verb, RestPath::parse(template).unwrap(), params).unwrap()
    }

    fn foo_row(id: i64) -> SqlInsertAction {
        let mut gene = IntegerGene::new("id", 0, 1000);
        gene.set_value(id).unwrap();
        SqlInsertAction::new("Foo", vec![ColumnDto::new("id", "INT").primary_key()], vec![gene.into()])
    }

    fn individual() -> RestIndividual {
        RestIndividual::new(
            vec![
                call(HttpVerb::Get, "/items/{id}", vec![Param::path(IntegerGene::new("id", 0, 9).into())]),
                call(HttpVerb::Post, "/items", vec![Param::body(StringGene::new("body", 0, 5).into())]),
            ],
            SampleType::Random,
        )
        .with_db_initialization(vec![foo_row(1), foo_row(2)])
    }

    #[test]
    fn test_gene_filters() {
        let ind = individual();
        assert_eq!(ind.see_genes(GeneFilter::All).len(), 4);
        assert_eq!(ind.see_genes(GeneFilter::OnlySeed).len(), 2);
        assert_eq!(ind.see_genes(GeneFilter::OnlyMain).len(), 2);
        assert_eq!(ind.size(), 4);
        assert!(ind.can_mutate_structure());
    }

    #[test]
    fn test_copy_is_independent() {
        let original = individual();
        let mut copy = original.copy();
        for gene in copy.see_genes_mut(GeneFilter::OnlyMain) {
            gene.set_value_from_string("3").ok();
        }
        assert_eq!(original.see_genes(GeneFilter::OnlyMain)[0].raw_value(), "0");
        assert_eq!(copy.see_genes(GeneFilter::OnlyMain)[0].raw_value(), "3");
    }

    #[test]
    fn test_repair_is_noop_on_valid_individual() {
        let mut ind = individual();
        let before = ind.clone();
        assert!(ind.verify_initialization_actions());
        ind.repair_initialization_actions(&mut Randomness::new(0)).unwrap();
        assert_eq!(ind, before);
    }

    #[test]
    fn test_repair_fixes_duplicate_keys() {
        let mut ind = individual().with_db_initialization(vec![foo_row(4), foo_row(4)]);
        assert!(!ind.verify_initialization_actions());
        ind.repair_initialization_actions(&mut Randomness::new(3)).unwrap();
        assert!(ind.verify_initialization_actions());
        assert_eq!(ind.see_initializing_actions().len(), 2);
    }

    #[test]
    fn test_smart_individual_has_fixed_structure() {
        let ind = RestIndividual::new(vec![], SampleType::Smart);
        assert!(!ind.can_mutate_structure());
    }

    #[test]
    fn test_structure_edits() {
        let mut ind = individual();
        ind.insert_action(0, call(HttpVerb::Delete, "/items", vec![]));
        assert_eq!(ind.see_actions()[0].name(), "DELETE:/items");
        assert!(ind.remove_action(10).is_none());
        assert!(ind.remove_action(0).is_some());
        assert_eq!(ind.rest_call_count(), 2);
    }
}
