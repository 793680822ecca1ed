//! A* shortest path search.
//!
//! [`find_path`] is the search itself over a [`WeightedGraph`], with a
//! pluggable comparator and [`WeightCalculator`]. [`AStarGeneCreator`]
//! reuses it as a creation strategy for path genes, and [`AStar`] wraps
//! that as an [`Algorithm`](crate::core::Algorithm) over
//! [`ShortestPathQuery`] problem genes.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use u_metaevo::astar::{AStar, ShortestPathQuery, WeightedGraph};
//! use u_metaevo::core::{Algorithm, Problem};
//!
//! let graph = Arc::new(
//!     WeightedGraph::new()
//!         .with_undirected_edge("a", "b", 1.0)
//!         .with_undirected_edge("b", "c", 1.0)
//!         .with_undirected_edge("a", "c", 3.0),
//! );
//! let problem = Problem::new([ShortestPathQuery::to_node(graph, "a", "c")]);
//! let solution = AStar::new().solve_seeded(&problem, Some(1)).unwrap();
//! assert_eq!(solution.genes()[0].gene(), &vec!["a", "b", "c"]);
//! assert_eq!(solution.quality(), 2.0);
//! ```

mod graph;
mod runner;
mod search;

pub use graph::WeightedGraph;
pub use runner::{AStar, AStarGeneCreator, PathWeightCachet, ShortestPathQuery};
pub use search::{ascending, find_path, SumWeights, WeightCalculator, WeightComparator};
