use super::{GeneError, GeneResult, ValueGene};
use crate::randomness::Randomness;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BooleanGene {
    name: String,
    value: bool,
}

impl BooleanGene {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: true,
        }
    }

    pub fn value(&self) -> bool {
        self.value
    }

    pub fn set_value(&mut self, value: bool) {
        self.value = value;
    }
}

impl ValueGene for BooleanGene {
    fn name(&self) -> &str {
        &self.name
    }

    fn randomize(&mut self, randomness: &mut Randomness) {
        self.value = randomness.next_bool();
    }

    fn mutate(&mut self, _randomness: &mut Randomness) {
        self.value = !self.value;
    }

    fn render(&self) -> String {
        self.value.to_string()
    }

    fn raw_value(&self) -> String {
        self.value.to_string()
    }

    fn set_value_from_string(&mut self, value: &str) -> GeneResult<()> {
        self.value = match value.trim().to_ascii_lowercase().as_str() {
            "true" => true,
            "false" => false,
            _ => return Err(GeneError::invalid(&self.name, value, "not a boolean")),
        };
        Ok(())
    }

    fn is_valid(&self) -> bool {
        true
    }
}
