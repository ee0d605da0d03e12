//! Schema metadata consumed by the insertion builder
//!
//! These DTOs mirror what the remote controller reports after extracting the
//! SUT database schema. Names are compared case-insensitively throughout, as
//! SQL identifiers usually are.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DbSchemaDto {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub tables: Vec<TableDto>,
}

impl DbSchemaDto {
    pub fn table(&self, name: &str) -> Option<&TableDto> {
        self.tables.iter().find(|t| t.name.eq_ignore_ascii_case(name))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TableDto {
    pub name: String,
    #[serde(default)]
    pub columns: Vec<ColumnDto>,
}

impl TableDto {
    pub fn new(name: impl Into<String>, columns: Vec<ColumnDto>) -> Self {
        Self {
            name: name.into(),
            columns,
        }
    }

    pub fn column(&self, name: &str) -> Option<&ColumnDto> {
        self.columns.iter().find(|c| c.name.eq_ignore_ascii_case(name))
    }
}

/// Descriptor of one column as extracted from the database
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnDto {
    pub name: String,
    /// SQL type name as reported by the database, e.g. `INTEGER` or `VARCHAR`
    pub sql_type: String,
    #[serde(default = "default_nullable")]
    pub nullable: bool,
    /// Declared length, `None` if the type is unbounded
    #[serde(default)]
    pub size: Option<usize>,
    #[serde(default)]
    pub auto_increment: bool,
    #[serde(default)]
    pub primary_key: bool,
    #[serde(default)]
    pub unique: bool,
    /// Tables referenced through foreign keys on this column
    #[serde(default)]
    pub foreign_key_refs: Vec<String>,
}

fn default_nullable() -> bool {
    true
}

impl ColumnDto {
    /// Nullable, unbounded column of the given type
    pub fn new(name: impl Into<String>, sql_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            sql_type: sql_type.into(),
            nullable: true,
            size: None,
            auto_increment: false,
            primary_key: false,
            unique: false,
            foreign_key_refs: Vec::new(),
        }
    }

    pub fn not_null(mut self) -> Self {
        self.nullable = false;
        self
    }

    pub fn with_size(mut self, size: usize) -> Self {
        self.size = Some(size);
        self
    }

    pub fn auto_increment(mut self) -> Self {
        self.auto_increment = true;
        self.nullable = false;
        self
    }

    pub fn primary_key(mut self) -> Self {
        self.primary_key = true;
        self.nullable = false;
        self
    }

    pub fn unique(mut self) -> Self {
        self.unique = true;
        self
    }

    pub fn references(mut self, table: impl Into<String>) -> Self {
        self.foreign_key_refs.push(table.into());
        self
    }

    /// Whether two rows of the same table may not share a value in this column
    pub fn requires_unique_values(&self) -> bool {
        (self.primary_key || self.unique) && !self.auto_increment
    }
}
