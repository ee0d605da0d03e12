//! Gene system for test case genotypes
//!
//! A gene is the leaf of the genotype: a named, constrained value bound to one
//! action parameter (a query parameter, a JSON body, a SQL column, ...). All
//! concrete genes implement the `ValueGene` capability interface, and the
//! closed `Gene` enum dispatches to them by kind so that mutation and
//! rendering stay exhaustive.
//!
//! Every gene upholds one invariant: its current value satisfies its declared
//! domain constraints after construction, `randomize`, `mutate` and any
//! successful `set_value_from_string`.

mod boolean;
mod enumeration;
mod integer;
mod object;
mod string;

pub use self::boolean::BooleanGene;
pub use self::enumeration::EnumGene;
pub use self::integer::IntegerGene;
pub use self::object::ObjectGene;
pub use self::string::{StringGene, UNBOUNDED_LENGTH};

use crate::randomness::Randomness;
use serde::{Deserialize, Serialize};

/// Type alias for gene operation results
pub type GeneResult<T> = Result<T, GeneError>;

/// Errors raised by gene operations
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum GeneError {
    #[error("Invalid value '{value}' for gene '{gene}': {reason}")]
    InvalidValue {
        gene: String,
        value: String,
        reason: String,
    },
}

impl GeneError {
    pub(crate) fn invalid(gene: &str, value: &str, reason: impl Into<String>) -> Self {
        GeneError::InvalidValue {
            gene: gene.to_string(),
            value: value.to_string(),
            reason: reason.into(),
        }
    }
}

/// Kind tag of a gene
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GeneKind {
    Integer,
    String,
    Boolean,
    Enum,
    Object,
}

impl std::fmt::Display for GeneKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GeneKind::Integer => write!(f, "integer"),
            GeneKind::String => write!(f, "string"),
            GeneKind::Boolean => write!(f, "boolean"),
            GeneKind::Enum => write!(f, "enum"),
            GeneKind::Object => write!(f, "object"),
        }
    }
}

/// Capability interface implemented by every concrete gene
pub trait ValueGene {
    /// Name of the parameter or column this gene is bound to
    fn name(&self) -> &str;

    /// Replace the current value with a fresh random one from the domain
    fn randomize(&mut self, randomness: &mut Randomness);

    /// Perturb the current value, staying inside the domain
    fn mutate(&mut self, randomness: &mut Randomness);

    /// Printable form: strings are JSON-quoted, objects are JSON documents
    fn render(&self) -> String;

    /// Unquoted form, used for paths, queries, headers and forms
    fn raw_value(&self) -> String;

    /// Set the value from its raw string form, rejecting out-of-domain input
    fn set_value_from_string(&mut self, value: &str) -> GeneResult<()>;

    /// Whether the current value satisfies the domain constraints
    fn is_valid(&self) -> bool;
}

/// A gene of any supported kind
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Gene {
    Integer(IntegerGene),
    String(StringGene),
    Boolean(BooleanGene),
    Enum(EnumGene),
    Object(ObjectGene),
}

impl Gene {
    pub fn kind(&self) -> GeneKind {
        match self {
            Gene::Integer(_) => GeneKind::Integer,
            Gene::String(_) => GeneKind::String,
            Gene::Boolean(_) => GeneKind::Boolean,
            Gene::Enum(_) => GeneKind::Enum,
            Gene::Object(_) => GeneKind::Object,
        }
    }

    fn inner(&self) -> &dyn ValueGene {
        match self {
            Gene::Integer(g) => g,
            Gene::String(g) => g,
            Gene::Boolean(g) => g,
            Gene::Enum(g) => g,
            Gene::Object(g) => g,
        }
    }

    fn inner_mut(&mut self) -> &mut dyn ValueGene {
        match self {
            Gene::Integer(g) => g,
            Gene::String(g) => g,
            Gene::Boolean(g) => g,
            Gene::Enum(g) => g,
            Gene::Object(g) => g,
        }
    }

    pub fn name(&self) -> &str {
        self.inner().name()
    }

    pub fn randomize(&mut self, randomness: &mut Randomness) {
        self.inner_mut().randomize(randomness)
    }

    pub fn mutate(&mut self, randomness: &mut Randomness) {
        self.inner_mut().mutate(randomness)
    }

    pub fn render(&self) -> String {
        self.inner().render()
    }

    pub fn raw_value(&self) -> String {
        self.inner().raw_value()
    }

    pub fn set_value_from_string(&mut self, value: &str) -> GeneResult<()> {
        self.inner_mut().set_value_from_string(value)
    }

    pub fn is_valid(&self) -> bool {
        self.inner().is_valid()
    }

    pub fn as_integer(&self) -> Option<&IntegerGene> {
        match self {
            Gene::Integer(g) => Some(g),
            _ => None,
        }
    }

    pub fn as_string(&self) -> Option<&StringGene> {
        match self {
            Gene::String(g) => Some(g),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&ObjectGene> {
        match self {
            Gene::Object(g) => Some(g),
            _ => None,
        }
    }
}

impl From<IntegerGene> for Gene {
    fn from(gene: IntegerGene) -> Self {
        Gene::Integer(gene)
    }
}

impl From<StringGene> for Gene {
    fn from(gene: StringGene) -> Self {
        Gene::String(gene)
    }
}

impl From<BooleanGene> for Gene {
    fn from(gene: BooleanGene) -> Self {
        Gene::Boolean(gene)
    }
}

impl From<EnumGene> for Gene {
    fn from(gene: EnumGene) -> Self {
        Gene::Enum(gene)
    }
}

impl From<ObjectGene> for Gene {
    fn from(gene: ObjectGene) -> Self {
        Gene::Object(gene)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_dispatch() {
        let genes: Vec<Gene> = vec![
            IntegerGene::new("a", 0, 10).into(),
            StringGene::new("b", 0, 5).into(),
            BooleanGene::new("c").into(),
            EnumGene::new("d", vec!["x".to_string()]).unwrap().into(),
            ObjectGene::new("e", vec![]).into(),
        ];
        let kinds: Vec<GeneKind> = genes.iter().map(Gene::kind).collect();
        assert_eq!(
            kinds,
            vec![
                GeneKind::Integer,
                GeneKind::String,
                GeneKind::Boolean,
                GeneKind::Enum,
                GeneKind::Object
            ]
        );
        let names: Vec<&str> = genes.iter().map(Gene::name).collect();
        assert_eq!(names, vec!["a", "b", "c", "d", "e"]);
    }

    #[test]
    fn test_invalid_value_error_message() {
        let mut gene: Gene = IntegerGene::new("age", 0, 120).into();
        let err = gene.set_value_from_string("500").unwrap_err();
        let GeneError::InvalidValue { gene: name, value, .. } = &err;
        assert_eq!(name, "age");
        assert_eq!(value, "500");
        assert!(err.to_string().contains("age"));
    }
}
