//! Evolved output: solution genes, partial scores and the scored solution.

use super::problem::ProblemGene;
use std::fmt;
use std::sync::Arc;

/// One named partial fitness score.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Cachet {
    quality: f64,
    name: String,
}

impl Cachet {
    pub fn new(quality: f64, name: impl Into<String>) -> Self {
        Self {
            quality,
            name: name.into(),
        }
    }

    pub fn quality(&self) -> f64 {
        self.quality
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

/// One unit of evolved data plus the problem genes it was derived from.
pub struct SolutionGene<ST, PT> {
    gene: ST,
    problem_genes: Vec<Arc<ProblemGene<PT>>>,
}

impl<ST, PT> SolutionGene<ST, PT> {
    pub fn new(gene: ST, problem_genes: Vec<Arc<ProblemGene<PT>>>) -> Self {
        Self {
            gene,
            problem_genes,
        }
    }

    /// Gene derived from a single problem gene.
    pub fn derived(gene: ST, problem_gene: &Arc<ProblemGene<PT>>) -> Self {
        Self::new(gene, vec![Arc::clone(problem_gene)])
    }

    pub fn gene(&self) -> &ST {
        &self.gene
    }

    pub fn into_gene(self) -> ST {
        self.gene
    }

    pub fn problem_genes(&self) -> &[Arc<ProblemGene<PT>>] {
        &self.problem_genes
    }

    /// A new gene with a different payload and the same back-references.
    pub fn with_gene(&self, gene: ST) -> Self {
        Self::new(gene, self.problem_genes.clone())
    }
}

impl<ST: Clone, PT> Clone for SolutionGene<ST, PT> {
    fn clone(&self) -> Self {
        self.with_gene(self.gene.clone())
    }
}

impl<ST: fmt::Debug, PT> fmt::Debug for SolutionGene<ST, PT> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SolutionGene")
            .field("gene", &self.gene)
            .field("problem_genes", &self.problem_genes.len())
            .finish()
    }
}

/// A candidate solution.
///
/// Quality follows the cost convention: 0 is perfect, larger is worse.
/// Cloning copies the gene list but shares the gene payloads, so a clone
/// is a cheap structural snapshot.
pub struct Solution<ST, PT> {
    genes: Vec<Arc<SolutionGene<ST, PT>>>,
    quality: f64,
    cachets: Vec<Cachet>,
}

impl<ST, PT> Clone for Solution<ST, PT> {
    fn clone(&self) -> Self {
        Self {
            genes: self.genes.clone(),
            quality: self.quality,
            cachets: self.cachets.clone(),
        }
    }
}

impl<ST, PT> Default for Solution<ST, PT> {
    fn default() -> Self {
        Self::new()
    }
}

impl<ST, PT> Solution<ST, PT> {
    pub fn new() -> Self {
        Self {
            genes: Vec::new(),
            quality: 0.0,
            cachets: Vec::new(),
        }
    }

    pub fn from_genes(genes: impl IntoIterator<Item = SolutionGene<ST, PT>>) -> Self {
        Self::from_shared(genes.into_iter().map(Arc::new).collect())
    }

    /// Builds a solution that reuses existing gene payloads.
    pub fn from_shared(genes: Vec<Arc<SolutionGene<ST, PT>>>) -> Self {
        Self {
            genes,
            quality: 0.0,
            cachets: Vec::new(),
        }
    }

    pub fn genes(&self) -> &[Arc<SolutionGene<ST, PT>>] {
        &self.genes
    }

    pub fn genes_mut(&mut self) -> &mut Vec<Arc<SolutionGene<ST, PT>>> {
        &mut self.genes
    }

    pub fn push_gene(&mut self, gene: SolutionGene<ST, PT>) {
        self.genes.push(Arc::new(gene));
    }

    /// Swaps the gene at `index`, returning the previous one.
    pub fn replace_gene(
        &mut self,
        index: usize,
        gene: Arc<SolutionGene<ST, PT>>,
    ) -> Arc<SolutionGene<ST, PT>> {
        std::mem::replace(&mut self.genes[index], gene)
    }

    pub fn len(&self) -> usize {
        self.genes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.genes.is_empty()
    }

    pub fn quality(&self) -> f64 {
        self.quality
    }

    pub fn set_quality(&mut self, quality: f64) {
        self.quality = quality;
    }

    pub fn cachets(&self) -> &[Cachet] {
        &self.cachets
    }

    pub fn push_cachet(&mut self, cachet: Cachet) {
        self.cachets.push(cachet);
    }

    pub fn clear_cachets(&mut self) {
        self.cachets.clear();
    }

    /// Replaces the cachet list wholesale (used by rollback).
    pub fn set_cachets(&mut self, cachets: Vec<Cachet>) {
        self.cachets = cachets;
    }

    /// Whether both solutions hold the very same gene objects in order.
    pub fn shares_genes_with(&self, other: &Self) -> bool {
        self.genes.len() == other.genes.len()
            && self
                .genes
                .iter()
                .zip(&other.genes)
                .all(|(a, b)| Arc::ptr_eq(a, b))
    }
}

impl<ST: fmt::Debug, PT> fmt::Debug for Solution<ST, PT> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Solution")
            .field("quality", &self.quality)
            .field("genes", &self.genes)
            .field("cachets", &self.cachets)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Problem;

    #[test]
    fn test_clone_shares_payloads() {
        let problem = Problem::new(vec!['x', 'y']);
        let mut s: Solution<u8, char> = Solution::new();
        for (i, pg) in problem.genes().iter().enumerate() {
            s.push_gene(SolutionGene::derived(i as u8, pg));
        }
        s.set_quality(3.0);
        s.push_cachet(Cachet::new(3.0, "count"));

        let mut copy = s.clone();
        assert!(copy.shares_genes_with(&s));

        copy.replace_gene(0, Arc::new(SolutionGene::derived(9, &problem.genes()[0])));
        assert!(!copy.shares_genes_with(&s));
        assert_eq!(*s.genes()[0].gene(), 0);
        assert_eq!(s.cachets().len(), 1);
    }

    #[test]
    fn test_with_gene_keeps_back_references() {
        let problem = Problem::new(vec![10]);
        let gene: SolutionGene<i32, i32> = SolutionGene::derived(1, &problem.genes()[0]);
        let next = gene.with_gene(2);
        assert_eq!(*next.gene(), 2);
        assert!(Arc::ptr_eq(&next.problem_genes()[0], &problem.genes()[0]));
    }
}
