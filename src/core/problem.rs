//! Problem input: an ordered list of immutable problem genes.

use std::sync::Arc;

/// One immutable unit of problem input.
#[derive(Debug, Clone, PartialEq)]
pub struct ProblemGene<PT> {
    gene: PT,
}

impl<PT> ProblemGene<PT> {
    pub fn new(gene: PT) -> Self {
        Self { gene }
    }

    pub fn gene(&self) -> &PT {
        &self.gene
    }
}

/// An ordered, read-only sequence of problem genes.
///
/// Genes are reference counted so solution genes can point back at the
/// input they were derived from without owning it.
#[derive(Debug)]
pub struct Problem<PT> {
    genes: Vec<Arc<ProblemGene<PT>>>,
}

impl<PT> Clone for Problem<PT> {
    fn clone(&self) -> Self {
        Self {
            genes: self.genes.clone(),
        }
    }
}

impl<PT> Problem<PT> {
    pub fn new(genes: impl IntoIterator<Item = PT>) -> Self {
        Self {
            genes: genes
                .into_iter()
                .map(|g| Arc::new(ProblemGene::new(g)))
                .collect(),
        }
    }

    pub fn genes(&self) -> &[Arc<ProblemGene<PT>>] {
        &self.genes
    }

    /// Number of problem genes, logged for reproducibility.
    pub fn size(&self) -> usize {
        self.genes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.genes.is_empty()
    }
}

impl<PT> FromIterator<PT> for Problem<PT> {
    fn from_iter<I: IntoIterator<Item = PT>>(iter: I) -> Self {
        Self::new(iter)
    }
}
