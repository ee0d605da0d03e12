use super::{Gene, GeneError, GeneResult, ValueGene};
use crate::randomness::Randomness;
use serde::{Deserialize, Serialize};

/// Ordered collection of named child genes, rendered as a JSON object.
///
/// Typically the payload of a request body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObjectGene {
    name: String,
    fields: Vec<Gene>,
}

impl ObjectGene {
    pub fn new(name: impl Into<String>, fields: Vec<Gene>) -> Self {
        Self {
            name: name.into(),
            fields,
        }
    }

    pub fn fields(&self) -> &[Gene] {
        &self.fields
    }

    pub fn field(&self, name: &str) -> Option<&Gene> {
        self.fields.iter().find(|f| f.name() == name)
    }

    fn to_json(&self) -> serde_json::Value {
        let entries = self
            .fields
            .iter()
            .map(|f| {
                let value = match f {
                    Gene::Object(object) => object.to_json(),
                    other => serde_json::from_str(&other.render())
                        .unwrap_or_else(|_| serde_json::Value::String(other.raw_value())),
                };
                (f.name().to_string(), value)
            })
            .collect::<serde_json::Map<_, _>>();
        serde_json::Value::Object(entries)
    }
}

impl ValueGene for ObjectGene {
    fn name(&self) -> &str {
        &self.name
    }

    fn randomize(&mut self, randomness: &mut Randomness) {
        for field in &mut self.fields {
            field.randomize(randomness);
        }
    }

    fn mutate(&mut self, randomness: &mut Randomness) {
        if let Some(index) = randomness.choose_index(self.fields.len()) {
            self.fields[index].mutate(randomness);
        }
    }

    fn render(&self) -> String {
        self.to_json().to_string()
    }

    fn raw_value(&self) -> String {
        self.render()
    }

    fn set_value_from_string(&mut self, value: &str) -> GeneResult<()> {
        let parsed: serde_json::Value = serde_json::from_str(value)
            .map_err(|e| GeneError::invalid(&self.name, value, format!("invalid JSON: {}", e)))?;
        let entries = parsed
            .as_object()
            .ok_or_else(|| GeneError::invalid(&self.name, value, "not a JSON object"))?;

        // apply to a copy so a failure leaves the gene untouched
        let mut fields = self.fields.clone();
        for (key, entry) in entries {
            let field = fields
                .iter_mut()
                .find(|f| f.name() == key)
                .ok_or_else(|| GeneError::invalid(&self.name, value, format!("unknown field '{}'", key)))?;
            let raw = match entry {
                serde_json::Value::String(s) => s.clone(),
                other => other.to_string(),
            };
            field.set_value_from_string(&raw)?;
        }
        self.fields = fields;
        Ok(())
    }

    fn is_valid(&self) -> bool {
        self.fields.iter().all(Gene::is_valid)
    }
}
