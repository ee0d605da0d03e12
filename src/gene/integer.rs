use super::{GeneError, GeneResult, ValueGene};
use crate::randomness::Randomness;
use serde::{Deserialize, Serialize};

/// Ranges at most this wide are mutated by picking a fresh value
const SMALL_RANGE: i128 = 16;

/// Largest exponent used for the power-of-two mutation step
const MAX_DELTA_EXPONENT: i64 = 16;

/// Integer gene with inclusive bounds
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawIntegerGene")]
pub struct IntegerGene {
    name: String,
    value: i64,
    min: i64,
    max: i64,
}

#[derive(Deserialize)]
struct RawIntegerGene {
    name: String,
    value: i64,
    min: i64,
    max: i64,
}

impl TryFrom<RawIntegerGene> for IntegerGene {
    type Error = GeneError;

    fn try_from(raw: RawIntegerGene) -> GeneResult<Self> {
        if raw.min > raw.max {
            return Err(GeneError::invalid(
                &raw.name,
                &raw.value.to_string(),
                format!("inverted bounds [{}, {}]", raw.min, raw.max),
            ));
        }
        let mut gene = Self::new(raw.name, raw.min, raw.max);
        gene.set_value(raw.value)?;
        Ok(gene)
    }
}

impl IntegerGene {
    /// Create a gene over `[min, max]`. Inverted bounds are swapped.
    ///
    /// The initial value is the point of the range closest to zero.
    pub fn new(name: impl Into<String>, min: i64, max: i64) -> Self {
        let (min, max) = if min <= max { (min, max) } else { (max, min) };
        Self {
            name: name.into(),
            value: 0i64.clamp(min, max),
            min,
            max,
        }
    }

    /// Unbounded 64-bit integer gene
    pub fn unbounded(name: impl Into<String>) -> Self {
        Self::new(name, i64::MIN, i64::MAX)
    }

    pub fn value(&self) -> i64 {
        self.value
    }

    pub fn min(&self) -> i64 {
        self.min
    }

    pub fn max(&self) -> i64 {
        self.max
    }

    pub fn set_value(&mut self, value: i64) -> GeneResult<()> {
        if value < self.min || value > self.max {
            return Err(GeneError::invalid(
                &self.name,
                &value.to_string(),
                format!("outside [{}, {}]", self.min, self.max),
            ));
        }
        self.value = value;
        Ok(())
    }

    fn range_width(&self) -> i128 {
        self.max as i128 - self.min as i128
    }
}

impl ValueGene for IntegerGene {
    fn name(&self) -> &str {
        &self.name
    }

    fn randomize(&mut self, randomness: &mut Randomness) {
        self.value = randomness.next_int(self.min, self.max);
    }

    fn mutate(&mut self, randomness: &mut Randomness) {
        let width = self.range_width();
        if width == 0 {
            return;
        }
        if width <= SMALL_RANGE {
            // pick a different value from the small domain
            let offset = randomness.next_int(1, width as i64);
            let shifted = (self.value as i128 - self.min as i128 + offset as i128) % (width + 1);
            self.value = (self.min as i128 + shifted) as i64;
            return;
        }
        let exponent = randomness.next_int(0, MAX_DELTA_EXPONENT);
        let delta = 1i64 << exponent;
        let candidate = if randomness.next_bool() {
            self.value.saturating_add(delta)
        } else {
            self.value.saturating_sub(delta)
        };
        self.value = candidate.clamp(self.min, self.max);
    }

    fn render(&self) -> String {
        self.value.to_string()
    }

    fn raw_value(&self) -> String {
        self.value.to_string()
    }

    fn set_value_from_string(&mut self, value: &str) -> GeneResult<()> {
        let parsed: i64 = value
            .trim()
            .parse()
            .map_err(|_| GeneError::invalid(&self.name, value, "not an integer"))?;
        self.set_value(parsed)
    }

    fn is_valid(&self) -> bool {
        self.value >= self.min && self.value <= self.max
    }
}
