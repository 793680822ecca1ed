//! Weighted adjacency map.

use indexmap::IndexMap;
use std::hash::Hash;

/// Directed graph with `f64` edge weights.
///
/// Nodes and edges iterate in insertion order, which makes searches over
/// the graph reproducible.
#[derive(Debug, Clone, PartialEq)]
pub struct WeightedGraph<N: Eq + Hash> {
    edges: IndexMap<N, IndexMap<N, f64>>,
}

impl<N: Eq + Hash> Default for WeightedGraph<N> {
    fn default() -> Self {
        Self {
            edges: IndexMap::new(),
        }
    }
}

impl<N: Clone + Eq + Hash> WeightedGraph<N> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a node without edges.
    pub fn add_node(&mut self, node: N) {
        self.edges.entry(node).or_default();
    }

    /// Inserts or overwrites the edge `from -> to`; both ends become nodes.
    pub fn add_edge(&mut self, from: N, to: N, weight: f64) {
        self.add_node(to.clone());
        self.edges.entry(from).or_default().insert(to, weight);
    }

    /// Edges in both directions.
    pub fn add_undirected_edge(&mut self, a: N, b: N, weight: f64) {
        self.add_edge(a.clone(), b.clone(), weight);
        self.add_edge(b, a, weight);
    }

    pub fn with_edge(mut self, from: N, to: N, weight: f64) -> Self {
        self.add_edge(from, to, weight);
        self
    }

    pub fn with_undirected_edge(mut self, a: N, b: N, weight: f64) -> Self {
        self.add_undirected_edge(a, b, weight);
        self
    }

    pub fn contains(&self, node: &N) -> bool {
        self.edges.contains_key(node)
    }

    pub fn weight(&self, from: &N, to: &N) -> Option<f64> {
        self.edges.get(from)?.get(to).copied()
    }

    /// Outgoing edges of `node`; none for an unknown node.
    pub fn neighbors<'a>(&'a self, node: &N) -> impl Iterator<Item = (&'a N, f64)> + 'a {
        self.edges
            .get(node)
            .into_iter()
            .flat_map(|out| out.iter().map(|(n, w)| (n, *w)))
    }

    pub fn nodes(&self) -> impl Iterator<Item = &N> {
        self.edges.keys()
    }

    pub fn len(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }

    /// Summed edge weights along `path`; `None` if a hop has no edge.
    pub fn path_weight(&self, path: &[N]) -> Option<f64> {
        path.windows(2).map(|hop| self.weight(&hop[0], &hop[1])).sum()
    }
}
