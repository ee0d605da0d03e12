use super::schema::ColumnDto;
use crate::gene::Gene;
use crate::randomness::Randomness;
use serde::{Deserialize, Serialize};

/// Data-seeding action: one row inserted into one table.
///
/// Holds exactly one gene per selected column, in column order, each gene
/// named after its column.
#[derive(Debug, Clone, PartialEq)]
pub struct SqlInsertAction {
    table_name: String,
    columns: Vec<ColumnDto>,
    genes: Vec<Gene>,
}

impl SqlInsertAction {
    pub fn new(table_name: impl Into<String>, columns: Vec<ColumnDto>, genes: Vec<Gene>) -> Self {
        Self {
            table_name: table_name.into(),
            columns,
            genes,
        }
    }

    pub fn name(&self) -> String {
        format!("SQL_Insert_{}", self.table_name)
    }

    pub fn table_name(&self) -> &str {
        &self.table_name
    }

    pub fn columns(&self) -> &[ColumnDto] {
        &self.columns
    }

    pub fn see_genes(&self) -> &[Gene] {
        &self.genes
    }

    pub fn see_genes_mut(&mut self) -> &mut [Gene] {
        &mut self.genes
    }

    pub fn gene_for(&self, column: &str) -> Option<&Gene> {
        self.genes.iter().find(|g| g.name().eq_ignore_ascii_case(column))
    }

    pub(crate) fn gene_for_mut(&mut self, column: &str) -> Option<&mut Gene> {
        self.genes
            .iter_mut()
            .find(|g| g.name().eq_ignore_ascii_case(column))
    }

    /// Whether this insertion targets the given table
    pub fn is_into(&self, table: &str) -> bool {
        self.table_name.eq_ignore_ascii_case(table)
    }

    /// Checks that the genes match the selected columns one to one and hold
    /// valid values
    pub fn verify(&self) -> bool {
        self.genes.len() == self.columns.len()
            && self
                .genes
                .iter()
                .zip(&self.columns)
                .all(|(g, c)| g.name().eq_ignore_ascii_case(&c.name) && g.is_valid())
    }

    pub fn randomize(&mut self, randomness: &mut Randomness) {
        for gene in &mut self.genes {
            gene.randomize(randomness);
        }
    }

    pub fn to_insertion_dto(&self) -> InsertionDto {
        InsertionDto {
            target_table: self.table_name.clone(),
            data: self
                .genes
                .iter()
                .map(|g| InsertionEntryDto {
                    variable_name: g.name().to_string(),
                    printable_value: sql_literal(g),
                })
                .collect(),
        }
    }

    /// The equivalent SQL statement, used for logging
    pub fn to_sql(&self) -> String {
        let names: Vec<&str> = self.genes.iter().map(Gene::name).collect();
        let values: Vec<String> = self.genes.iter().map(sql_literal).collect();
        format!(
            "INSERT INTO {} ({}) VALUES ({})",
            self.table_name,
            names.join(", "),
            values.join(", ")
        )
    }
}

fn sql_literal(gene: &Gene) -> String {
    match gene {
        Gene::Integer(_) | Gene::Boolean(_) => gene.raw_value(),
        Gene::String(_) | Gene::Enum(_) | Gene::Object(_) => {
            format!("'{}'", gene.raw_value().replace('\'', "''"))
        }
    }
}

/// Wire form of one insertion sent to the remote controller
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InsertionDto {
    pub target_table: String,
    pub data: Vec<InsertionEntryDto>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InsertionEntryDto {
    pub variable_name: String,
    pub printable_value: String,
}

/// Outcome of executing one insertion
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SqlInsertResult {
    pub table: String,
    pub success: bool,
}

impl SqlInsertResult {
    /// A failed insertion stops the rest of the test
    pub fn stopping(&self) -> bool {
        !self.success
    }
}
