use crate::gene::Gene;

/// Content type used for body parameters when none is declared
pub const DEFAULT_BODY_CONTENT_TYPE: &str = "application/json";

/// Where in the HTTP request a parameter is sent
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParamKind {
    Path,
    Query,
    Header,
    Body,
    Form,
}

/// A request parameter: its placement plus the gene producing its value
#[derive(Debug, Clone, PartialEq)]
pub struct Param {
    kind: ParamKind,
    gene: Gene,
    content_type: Option<String>,
}

impl Param {
    fn with_kind(kind: ParamKind, gene: Gene) -> Self {
        Self {
            kind,
            gene,
            content_type: None,
        }
    }

    pub fn path(gene: Gene) -> Self {
        Self::with_kind(ParamKind::Path, gene)
    }

    pub fn query(gene: Gene) -> Self {
        Self::with_kind(ParamKind::Query, gene)
    }

    pub fn header(gene: Gene) -> Self {
        Self::with_kind(ParamKind::Header, gene)
    }

    pub fn form(gene: Gene) -> Self {
        Self::with_kind(ParamKind::Form, gene)
    }

    /// JSON body parameter
    pub fn body(gene: Gene) -> Self {
        Self::with_kind(ParamKind::Body, gene)
    }

    pub fn body_with_content_type(gene: Gene, content_type: impl Into<String>) -> Self {
        Self {
            kind: ParamKind::Body,
            gene,
            content_type: Some(content_type.into()),
        }
    }

    pub fn kind(&self) -> ParamKind {
        self.kind
    }

    pub fn name(&self) -> &str {
        self.gene.name()
    }

    pub fn gene(&self) -> &Gene {
        &self.gene
    }

    pub fn gene_mut(&mut self) -> &mut Gene {
        &mut self.gene
    }

    pub fn content_type(&self) -> &str {
        self.content_type
            .as_deref()
            .unwrap_or(DEFAULT_BODY_CONTENT_TYPE)
    }
}
