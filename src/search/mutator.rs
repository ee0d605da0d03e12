use super::individual::{GeneFilter, Individual, IndividualResult};
use super::sampler::Sampler;
use crate::randomness::Randomness;
use log::debug;

/// Mutation operator of the search loop.
///
/// Either changes the structure of the individual through the sampler or
/// mutates each gene with probability `1/n`, with at least one gene always
/// mutated. Initialization actions are repaired afterwards if the mutation
/// broke their consistency.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StandardMutator {
    structure_mutation_probability: f64,
}

impl StandardMutator {
    pub fn new(structure_mutation_probability: f64) -> Self {
        Self {
            structure_mutation_probability,
        }
    }

    pub fn structure_mutation_probability(&self) -> f64 {
        self.structure_mutation_probability
    }

    /// Mutate `individual` in place. It must already be a copy: archived
    /// individuals are never handed out for mutation.
    pub fn mutate<I, S>(
        &self,
        individual: &mut I,
        sampler: &mut S,
        randomness: &mut Randomness,
    ) -> IndividualResult<()>
    where
        I: Individual,
        S: Sampler<I>,
    {
        if individual.can_mutate_structure()
            && randomness.next_bool_with_probability(self.structure_mutation_probability)
        {
            sampler.mutate_structure(individual, randomness);
        } else {
            self.mutate_genes(individual, randomness);
        }

        if !individual.verify_initialization_actions() {
            debug!("Mutation broke initialization actions, repairing");
            individual.repair_initialization_actions(randomness)?;
        }
        Ok(())
    }

    fn mutate_genes<I: Individual>(&self, individual: &mut I, randomness: &mut Randomness) {
        let mut genes = individual.see_genes_mut(GeneFilter::All);
        if genes.is_empty() {
            return;
        }
        let probability = 1.0 / genes.len() as f64;
        let mut mutated = false;
        for gene in genes.iter_mut() {
            if randomness.next_bool_with_probability(probability) {
                gene.mutate(randomness);
                mutated = true;
            }
        }
        if !mutated {
            if let Some(index) = randomness.choose_index(genes.len()) {
                genes[index].mutate(randomness);
            }
        }
    }
}

impl Default for StandardMutator {
    fn default() -> Self {
        Self::new(0.5)
    }
}
