use crate::database::{SqlInsertAction, SqlInsertResult};
use crate::gene::Gene;
use crate::problem::rest::{RestCallAction, RestCallResult};
use crate::randomness::Randomness;
use std::fmt;

/// Kind tag of an action
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ActionKind {
    RestCall,
    SqlInsert,
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ActionKind::RestCall => write!(f, "rest-call"),
            ActionKind::SqlInsert => write!(f, "sql-insert"),
        }
    }
}

/// One executable step of a test case
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    RestCall(RestCallAction),
    SqlInsert(SqlInsertAction),
}

impl Action {
    pub fn kind(&self) -> ActionKind {
        match self {
            Action::RestCall(_) => ActionKind::RestCall,
            Action::SqlInsert(_) => ActionKind::SqlInsert,
        }
    }

    pub fn name(&self) -> String {
        match self {
            Action::RestCall(a) => a.name(),
            Action::SqlInsert(a) => a.name(),
        }
    }

    pub fn see_genes(&self) -> Vec<&Gene> {
        match self {
            Action::RestCall(a) => a.see_genes(),
            Action::SqlInsert(a) => a.see_genes().iter().collect(),
        }
    }

    pub fn see_genes_mut(&mut self) -> Vec<&mut Gene> {
        match self {
            Action::RestCall(a) => a.see_genes_mut(),
            Action::SqlInsert(a) => a.see_genes_mut().iter_mut().collect(),
        }
    }

    pub fn randomize(&mut self, randomness: &mut Randomness) {
        match self {
            Action::RestCall(a) => a.randomize(randomness),
            Action::SqlInsert(a) => a.randomize(randomness),
        }
    }

    /// The genes match the parameters required by the action kind
    pub fn verify(&self) -> bool {
        match self {
            Action::RestCall(a) => a.verify(),
            Action::SqlInsert(a) => a.verify(),
        }
    }

    pub fn as_rest_call(&self) -> Option<&RestCallAction> {
        match self {
            Action::RestCall(a) => Some(a),
            Action::SqlInsert(_) => None,
        }
    }

    pub fn as_rest_call_mut(&mut self) -> Option<&mut RestCallAction> {
        match self {
            Action::RestCall(a) => Some(a),
            Action::SqlInsert(_) => None,
        }
    }

    pub fn as_sql_insert(&self) -> Option<&SqlInsertAction> {
        match self {
            Action::SqlInsert(a) => Some(a),
            Action::RestCall(_) => None,
        }
    }
}

impl From<RestCallAction> for Action {
    fn from(action: RestCallAction) -> Self {
        Action::RestCall(action)
    }
}

impl From<SqlInsertAction> for Action {
    fn from(action: SqlInsertAction) -> Self {
        Action::SqlInsert(action)
    }
}

/// Observed outcome of one executed action
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionResult {
    RestCall(RestCallResult),
    SqlInsert(SqlInsertResult),
}

impl ActionResult {
    /// Whether the remaining actions of the test were skipped after this one
    pub fn stopping(&self) -> bool {
        match self {
            ActionResult::RestCall(r) => r.stopping,
            ActionResult::SqlInsert(r) => r.stopping(),
        }
    }

    pub fn as_rest_call(&self) -> Option<&RestCallResult> {
        match self {
            ActionResult::RestCall(r) => Some(r),
            ActionResult::SqlInsert(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::ColumnDto;
    use crate::gene::IntegerGene;
    use crate::problem::rest::{HttpVerb, Param, RestPath};

    #[test]
    fn test_kind_and_gene_dispatch() {
        let rest: Action = RestCallAction::new(
            HttpVerb::Get,
            RestPath::parse("/items/{id}").unwrap(),
            vec![Param::path(IntegerGene::new("id", 0, 9).into())],
        )
        .unwrap()
        .into();
        let sql: Action = SqlInsertAction::new(
            "Foo",
            vec![ColumnDto::new("x", "INT")],
            vec![IntegerGene::new("x", 0, 9).into()],
        )
        .into();

        assert_eq!(rest.kind(), ActionKind::RestCall);
        assert_eq!(sql.kind(), ActionKind::SqlInsert);
        assert_eq!(rest.see_genes().len(), 1);
        assert_eq!(sql.see_genes()[0].name(), "x");
        assert!(rest.verify() && sql.verify());
        assert!(sql.as_rest_call().is_none());
    }

    #[test]
    fn test_result_stopping() {
        assert!(ActionResult::RestCall(RestCallResult::failed("timeout")).stopping());
        assert!(!ActionResult::RestCall(RestCallResult::with_status(200)).stopping());
        assert!(ActionResult::SqlInsert(SqlInsertResult {
            table: "Foo".to_string(),
            success: false
        })
        .stopping());
    }
}
