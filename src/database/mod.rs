//! Database seeding support
//!
//! Builds data-seeding actions (`SqlInsertAction`) from schema metadata the
//! remote controller has already extracted, and maintains the consistency
//! predicate those actions must satisfy before a test can run.

mod action;
mod builder;
mod integrity;
mod schema;

pub use self::action::{InsertionDto, InsertionEntryDto, SqlInsertAction, SqlInsertResult};
pub use self::builder::{SqlColumnKind, SqlInsertBuilder, ALL_COLUMNS};
pub use self::integrity::{find_violation, is_consistent, repair_insertions, IntegrityViolation};
pub use self::schema::{ColumnDto, DbSchemaDto, TableDto};

/// Type alias for database operation results
pub type DatabaseResult<T> = Result<T, DatabaseError>;

/// Errors raised while building insertions from schema metadata
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DatabaseError {
    #[error("Unknown table: {0}")]
    UnknownTable(String),

    #[error("Unknown column '{column}' in table '{table}'")]
    UnknownColumn { table: String, column: String },

    #[error("Unsupported SQL type '{sql_type}' for column '{table}.{column}'")]
    UnsupportedType {
        table: String,
        column: String,
        sql_type: String,
    },

    #[error("Not-null column '{table}.{column}' closes a reference cycle through '{referenced}'")]
    CyclicReference {
        table: String,
        column: String,
        referenced: String,
    },
}
