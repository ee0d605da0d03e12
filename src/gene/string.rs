use super::{GeneError, GeneResult, ValueGene};
use crate::randomness::Randomness;
use serde::{Deserialize, Serialize};

/// Maximum length used for columns and parameters declared without a bound
pub const UNBOUNDED_LENGTH: usize = i32::MAX as usize;

/// String gene whose length (in characters) lies in `[min_length, max_length]`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawStringGene")]
pub struct StringGene {
    name: String,
    value: String,
    min_length: usize,
    max_length: usize,
}

#[derive(Deserialize)]
struct RawStringGene {
    name: String,
    value: String,
    min_length: usize,
    max_length: usize,
}

impl TryFrom<RawStringGene> for StringGene {
    type Error = GeneError;

    fn try_from(raw: RawStringGene) -> GeneResult<Self> {
        if raw.min_length > raw.max_length {
            return Err(GeneError::invalid(
                &raw.name,
                &raw.value,
                format!("inverted length bounds [{}, {}]", raw.min_length, raw.max_length),
            ));
        }
        let length = raw.value.chars().count();
        if length < raw.min_length || length > raw.max_length {
            return Err(GeneError::invalid(
                &raw.name,
                &raw.value,
                format!("length {} outside [{}, {}]", length, raw.min_length, raw.max_length),
            ));
        }
        Ok(Self {
            name: raw.name,
            value: raw.value,
            min_length: raw.min_length,
            max_length: raw.max_length,
        })
    }
}

impl StringGene {
    /// Create a gene whose initial value is the shortest string of `'a'`s
    /// allowed by the bounds
    pub fn new(name: impl Into<String>, min_length: usize, max_length: usize) -> Self {
        let max_length = max_length.max(min_length);
        Self {
            name: name.into(),
            value: "a".repeat(min_length),
            min_length,
            max_length,
        }
    }

    pub fn unbounded(name: impl Into<String>) -> Self {
        Self::new(name, 0, UNBOUNDED_LENGTH)
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn min_length(&self) -> usize {
        self.min_length
    }

    pub fn max_length(&self) -> usize {
        self.max_length
    }

    fn length(&self) -> usize {
        self.value.chars().count()
    }

    fn replace_char_at(&mut self, index: usize, replacement: char) {
        self.value = self
            .value
            .chars()
            .enumerate()
            .map(|(i, c)| if i == index { replacement } else { c })
            .collect();
    }
}

impl ValueGene for StringGene {
    fn name(&self) -> &str {
        &self.name
    }

    fn randomize(&mut self, randomness: &mut Randomness) {
        self.value = randomness.next_string(self.min_length, self.max_length);
    }

    fn mutate(&mut self, randomness: &mut Randomness) {
        let length = self.length();
        let can_grow = length < self.max_length;
        let can_shrink = length > self.min_length;

        match randomness.next_int(0, 2) {
            0 if can_grow => self.value.push(randomness.next_char()),
            1 if can_shrink => {
                self.value.pop();
            }
            _ if length > 0 => {
                let index = randomness.next_usize(0, length - 1);
                let replacement = randomness.next_char();
                self.replace_char_at(index, replacement);
            }
            _ if can_grow => self.value.push(randomness.next_char()),
            _ => {}
        }
    }

    fn render(&self) -> String {
        serde_json::Value::String(self.value.clone()).to_string()
    }

    fn raw_value(&self) -> String {
        self.value.clone()
    }

    fn set_value_from_string(&mut self, value: &str) -> GeneResult<()> {
        let length = value.chars().count();
        if length < self.min_length || length > self.max_length {
            return Err(GeneError::invalid(
                &self.name,
                value,
                format!(
                    "length {} outside [{}, {}]",
                    length, self.min_length, self.max_length
                ),
            ));
        }
        self.value = value.to_string();
        Ok(())
    }

    fn is_valid(&self) -> bool {
        let length = self.length();
        length >= self.min_length && length <= self.max_length
    }
}
