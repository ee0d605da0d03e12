//! Construction of data-seeding actions from schema metadata

use super::action::SqlInsertAction;
use super::schema::{ColumnDto, DbSchemaDto, TableDto};
use super::{DatabaseError, DatabaseResult};
use crate::gene::{BooleanGene, Gene, IntegerGene, StringGene, UNBOUNDED_LENGTH};
use log::debug;
use std::collections::HashSet;

/// Request token selecting every column of a table
pub const ALL_COLUMNS: &str = "*";

/// Gene family a SQL column type maps to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SqlColumnKind {
    Integer { min: i64, max: i64 },
    Character,
    Boolean,
}

impl SqlColumnKind {
    /// Classify a SQL type name, ignoring case and any `(length)` suffix
    pub fn from_sql_type(sql_type: &str) -> Option<Self> {
        let base = sql_type
            .split('(')
            .next()
            .unwrap_or_default()
            .trim()
            .to_ascii_uppercase();
        let kind = match base.as_str() {
            "TINYINT" => SqlColumnKind::Integer {
                min: i8::MIN as i64,
                max: i8::MAX as i64,
            },
            "SMALLINT" | "INT2" => SqlColumnKind::Integer {
                min: i16::MIN as i64,
                max: i16::MAX as i64,
            },
            "INT" | "INTEGER" | "INT4" | "MEDIUMINT" | "SERIAL" => SqlColumnKind::Integer {
                min: i32::MIN as i64,
                max: i32::MAX as i64,
            },
            "BIGINT" | "INT8" | "BIGSERIAL" => SqlColumnKind::Integer {
                min: i64::MIN,
                max: i64::MAX,
            },
            "CHAR" | "CHARACTER" | "VARCHAR" | "CHARACTER VARYING" | "VARCHAR_IGNORECASE"
            | "NVARCHAR" | "TEXT" | "CLOB" => SqlColumnKind::Character,
            "BOOLEAN" | "BOOL" | "BIT" => SqlColumnKind::Boolean,
            _ => return None,
        };
        Some(kind)
    }
}

/// Builds `SqlInsertAction`s for the tables of one schema
#[derive(Debug, Clone)]
pub struct SqlInsertBuilder {
    schema: DbSchemaDto,
}

impl SqlInsertBuilder {
    pub fn new(schema: DbSchemaDto) -> Self {
        Self { schema }
    }

    pub fn schema(&self) -> &DbSchemaDto {
        &self.schema
    }

    pub fn table_names(&self) -> Vec<&str> {
        self.schema.tables.iter().map(|t| t.name.as_str()).collect()
    }

    /// Create the insertions needed to add one row to `table_name`.
    ///
    /// Auto-increment columns are always skipped. Nullable columns are only
    /// included when named in `columns` (or when `columns` contains `"*"`).
    /// Rows for tables referenced by the selected foreign-key columns come
    /// first, so the returned sequence is consistent on its own. The row for
    /// `table_name` itself is always last.
    ///
    /// A nullable column referencing a table whose row is still being built
    /// (a self reference, or a cycle through other tables) is left out even
    /// when requested. The same situation on a not-null column cannot be
    /// satisfied and is reported as [`DatabaseError::CyclicReference`].
    pub fn create_sql_insertion_action(
        &self,
        table_name: &str,
        columns: &HashSet<String>,
    ) -> DatabaseResult<Vec<SqlInsertAction>> {
        let mut actions = Vec::new();
        let mut visiting = HashSet::new();
        self.build_insertions(table_name, columns, &mut visiting, &mut actions)?;
        Ok(actions)
    }

    fn build_insertions(
        &self,
        table_name: &str,
        columns: &HashSet<String>,
        visiting: &mut HashSet<String>,
        actions: &mut Vec<SqlInsertAction>,
    ) -> DatabaseResult<()> {
        let table = self
            .schema
            .table(table_name)
            .ok_or_else(|| DatabaseError::UnknownTable(table_name.to_string()))?;

        let select_all = columns.contains(ALL_COLUMNS);
        for requested in columns.iter().filter(|c| c.as_str() != ALL_COLUMNS) {
            if table.column(requested).is_none() {
                return Err(DatabaseError::UnknownColumn {
                    table: table.name.clone(),
                    column: requested.clone(),
                });
            }
        }

        visiting.insert(table.name.to_ascii_uppercase());

        let mut selected: Vec<&ColumnDto> = Vec::new();
        for column in table.columns.iter().filter(|c| !c.auto_increment) {
            let requested =
                select_all || columns.iter().any(|r| r.eq_ignore_ascii_case(&column.name));
            if column.nullable && !requested {
                continue;
            }
            match column
                .foreign_key_refs
                .iter()
                .find(|r| visiting.contains(&r.to_ascii_uppercase()))
            {
                Some(referenced) if column.nullable => {
                    debug!(
                        "Leaving out cyclic reference {}.{} -> {}",
                        table.name, column.name, referenced
                    );
                }
                Some(referenced) => {
                    return Err(DatabaseError::CyclicReference {
                        table: table.name.clone(),
                        column: column.name.clone(),
                        referenced: referenced.clone(),
                    });
                }
                None => selected.push(column),
            }
        }

        for column in &selected {
            for referenced in &column.foreign_key_refs {
                self.build_insertions(referenced, &HashSet::new(), visiting, actions)?;
            }
        }

        actions.push(self.insertion_for(table, &selected)?);
        visiting.remove(&table.name.to_ascii_uppercase());
        Ok(())
    }

    fn insertion_for(&self, table: &TableDto, selected: &[&ColumnDto]) -> DatabaseResult<SqlInsertAction> {
        let genes = selected
            .iter()
            .map(|c| gene_for_column(table, c))
            .collect::<DatabaseResult<Vec<Gene>>>()?;
        let columns = selected.iter().map(|c| (*c).clone()).collect();
        Ok(SqlInsertAction::new(table.name.clone(), columns, genes))
    }
}

fn gene_for_column(table: &TableDto, column: &ColumnDto) -> DatabaseResult<Gene> {
    let kind = SqlColumnKind::from_sql_type(&column.sql_type).ok_or_else(|| {
        DatabaseError::UnsupportedType {
            table: table.name.clone(),
            column: column.name.clone(),
            sql_type: column.sql_type.clone(),
        }
    })?;
    let gene = match kind {
        SqlColumnKind::Integer { min, max } => IntegerGene::new(column.name.clone(), min, max).into(),
        SqlColumnKind::Character => {
            StringGene::new(column.name.clone(), 0, column.size.unwrap_or(UNBOUNDED_LENGTH)).into()
        }
        SqlColumnKind::Boolean => BooleanGene::new(column.name.clone()).into(),
    };
    Ok(gene)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gene::GeneKind;

    #[test]
    fn test_sql_type_classification() {
        assert_eq!(
            SqlColumnKind::from_sql_type("int"),
            Some(SqlColumnKind::Integer {
                min: i32::MIN as i64,
                max: i32::MAX as i64
            })
        );
        assert_eq!(
            SqlColumnKind::from_sql_type("VARCHAR(255)"),
            Some(SqlColumnKind::Character)
        );
        assert_eq!(SqlColumnKind::from_sql_type("boolean"), Some(SqlColumnKind::Boolean));
        assert_eq!(SqlColumnKind::from_sql_type("GEOMETRY"), None);
    }

    #[test]
    fn test_unsupported_type_is_reported() {
        let schema = DbSchemaDto {
            name: "s".to_string(),
            tables: vec![TableDto::new(
                "Shape",
                vec![ColumnDto::new("area", "GEOMETRY").not_null()],
            )],
        };
        let builder = SqlInsertBuilder::new(schema);
        let err = builder
            .create_sql_insertion_action("Shape", &HashSet::new())
            .unwrap_err();
        assert!(matches!(err, DatabaseError::UnsupportedType { .. }));
    }

    fn cyclic_schema(nullable_back_reference: bool) -> DbSchemaDto {
        let back = ColumnDto::new("a_id", "INT").references("A");
        let back = if nullable_back_reference { back } else { back.not_null() };
        DbSchemaDto {
            name: "s".to_string(),
            tables: vec![
                TableDto::new(
                    "A",
                    vec![
                        ColumnDto::new("id", "INT").primary_key(),
                        ColumnDto::new("b_id", "INT").not_null().references("B"),
                    ],
                ),
                TableDto::new("B", vec![ColumnDto::new("id", "INT").primary_key(), back]),
            ],
        }
    }

    #[test]
    fn test_self_reference_is_left_out() {
        let schema = DbSchemaDto {
            name: "s".to_string(),
            tables: vec![TableDto::new(
                "Node",
                vec![
                    ColumnDto::new("id", "INT").primary_key(),
                    ColumnDto::new("parent_id", "INT").references("Node"),
                ],
            )],
        };
        let builder = SqlInsertBuilder::new(schema);
        let all: HashSet<String> = std::iter::once(ALL_COLUMNS.to_string()).collect();
        let actions = builder.create_sql_insertion_action("Node", &all).unwrap();

        assert_eq!(actions.len(), 1);
        assert!(actions[0].gene_for("parent_id").is_none());
        assert_eq!(actions[0].see_genes()[0].kind(), GeneKind::Integer);
        assert!(crate::database::is_consistent(&actions));

        let requested: HashSet<String> = std::iter::once("PARENT_ID".to_string()).collect();
        let actions = builder.create_sql_insertion_action("Node", &requested).unwrap();
        assert!(crate::database::is_consistent(&actions));
    }

    #[test]
    fn test_nullable_cycle_is_broken() {
        let builder = SqlInsertBuilder::new(cyclic_schema(true));
        let all: HashSet<String> = std::iter::once(ALL_COLUMNS.to_string()).collect();
        let actions = builder.create_sql_insertion_action("A", &all).unwrap();

        let tables: Vec<&str> = actions.iter().map(|a| a.table_name()).collect();
        assert_eq!(tables, vec!["B", "A"]);
        assert!(actions[0].gene_for("a_id").is_none());
        assert!(crate::database::is_consistent(&actions));
    }

    #[test]
    fn test_not_null_cycle_is_reported() {
        let builder = SqlInsertBuilder::new(cyclic_schema(false));
        let err = builder
            .create_sql_insertion_action("A", &HashSet::new())
            .unwrap_err();
        assert_eq!(
            err,
            DatabaseError::CyclicReference {
                table: "B".to_string(),
                column: "a_id".to_string(),
                referenced: "A".to_string(),
            }
        );

        let not_null_self = DbSchemaDto {
            name: "s".to_string(),
            tables: vec![TableDto::new(
                "Node",
                vec![ColumnDto::new("parent_id", "INT").not_null().references("Node")],
            )],
        };
        assert!(matches!(
            SqlInsertBuilder::new(not_null_self).create_sql_insertion_action("Node", &HashSet::new()),
            Err(DatabaseError::CyclicReference { .. })
        ));
    }
}
