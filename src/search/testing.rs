//! Minimal individual used by the unit tests of the search machinery

use super::action::Action;
use super::individual::{GeneFilter, Individual};
use crate::gene::{Gene, IntegerGene};

/// Individual made of bit genes only, with no actions
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct BitsIndividual {
    pub genes: Vec<Gene>,
}

impl BitsIndividual {
    pub fn new(bits: &[i64]) -> Self {
        let genes = bits
            .iter()
            .enumerate()
            .map(|(i, bit)| {
                let mut gene = IntegerGene::new(format!("b{}", i), 0, 1);
                gene.set_value(*bit).unwrap();
                gene.into()
            })
            .collect();
        Self { genes }
    }

    pub fn bits(&self) -> Vec<i64> {
        self.genes
            .iter()
            .filter_map(|g| g.as_integer().map(IntegerGene::value))
            .collect()
    }
}

impl Individual for BitsIndividual {
    fn see_actions(&self) -> &[Action] {
        &[]
    }

    fn see_initializing_actions(&self) -> &[Action] {
        &[]
    }

    fn see_genes(&self, filter: GeneFilter) -> Vec<&Gene> {
        match filter {
            GeneFilter::OnlySeed => Vec::new(),
            GeneFilter::All | GeneFilter::OnlyMain => self.genes.iter().collect(),
        }
    }

    fn see_genes_mut(&mut self, filter: GeneFilter) -> Vec<&mut Gene> {
        match filter {
            GeneFilter::OnlySeed => Vec::new(),
            GeneFilter::All | GeneFilter::OnlyMain => self.genes.iter_mut().collect(),
        }
    }

    fn size(&self) -> usize {
        self.genes.len()
    }

    fn can_mutate_structure(&self) -> bool {
        false
    }
}
