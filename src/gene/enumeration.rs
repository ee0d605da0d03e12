use super::{GeneError, GeneResult, ValueGene};
use crate::randomness::Randomness;
use serde::{Deserialize, Serialize};

/// Gene holding one value out of a fixed, non-empty list of strings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawEnumGene")]
pub struct EnumGene {
    name: String,
    values: Vec<String>,
    index: usize,
}

#[derive(Deserialize)]
struct RawEnumGene {
    name: String,
    values: Vec<String>,
    index: usize,
}

impl TryFrom<RawEnumGene> for EnumGene {
    type Error = GeneError;

    fn try_from(raw: RawEnumGene) -> GeneResult<Self> {
        let mut gene = Self::new(raw.name, raw.values)?;
        if raw.index >= gene.values.len() {
            return Err(GeneError::invalid(
                &gene.name,
                &raw.index.to_string(),
                format!("index outside {} values", gene.values.len()),
            ));
        }
        gene.index = raw.index;
        Ok(gene)
    }
}

impl EnumGene {
    pub fn new(name: impl Into<String>, values: Vec<String>) -> GeneResult<Self> {
        let name = name.into();
        if values.is_empty() {
            return Err(GeneError::invalid(&name, "", "enum without values"));
        }
        Ok(Self {
            name,
            values,
            index: 0,
        })
    }

    pub fn value(&self) -> &str {
        &self.values[self.index]
    }

    pub fn values(&self) -> &[String] {
        &self.values
    }
}

impl ValueGene for EnumGene {
    fn name(&self) -> &str {
        &self.name
    }

    fn randomize(&mut self, randomness: &mut Randomness) {
        self.index = randomness.next_usize(0, self.values.len() - 1);
    }

    fn mutate(&mut self, randomness: &mut Randomness) {
        let n = self.values.len();
        if n < 2 {
            return;
        }
        let offset = randomness.next_usize(1, n - 1);
        self.index = (self.index + offset) % n;
    }

    fn render(&self) -> String {
        serde_json::Value::String(self.value().to_string()).to_string()
    }

    fn raw_value(&self) -> String {
        self.value().to_string()
    }

    fn set_value_from_string(&mut self, value: &str) -> GeneResult<()> {
        match self.values.iter().position(|v| v == value) {
            Some(index) => {
                self.index = index;
                Ok(())
            }
            None => Err(GeneError::invalid(&self.name, value, "not one of the allowed values")),
        }
    }

    fn is_valid(&self) -> bool {
        self.index < self.values.len()
    }
}
