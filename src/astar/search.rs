//! Best-first path search.
//!
//! The open set is scanned linearly for the lowest accumulated weight, which
//! is fine for the small graphs this is used on. Ties go to the node that
//! entered the open set first.

use super::graph::WeightedGraph;
use indexmap::{IndexMap, IndexSet};
use std::cmp::Ordering;
use std::hash::Hash;
use std::sync::Arc;

/// Orders accumulated weights; `Less` means better.
pub type WeightComparator = Arc<dyn Fn(f64, f64) -> Ordering>;

/// Ascending numeric order.
pub fn ascending() -> WeightComparator {
    Arc::new(|a: f64, b: f64| a.total_cmp(&b))
}

/// How edge weights and estimates accumulate along a path.
pub trait WeightCalculator<N: Eq + Hash> {
    /// Weight of reaching the next node.
    fn combine(&self, accumulated: f64, edge: f64, estimate: f64) -> f64;

    /// Estimated remaining weight when stepping from `from` to `to`.
    fn estimate(&self, from: &N, to: &N, graph: &WeightedGraph<N>) -> f64;
}

/// Plain sum with a zero estimate, i.e. uniform-cost search.
#[derive(Debug, Clone, Copy, Default)]
pub struct SumWeights;

impl<N: Eq + Hash> WeightCalculator<N> for SumWeights {
    fn combine(&self, accumulated: f64, edge: f64, estimate: f64) -> f64 {
        accumulated + edge + estimate
    }

    fn estimate(&self, _from: &N, _to: &N, _graph: &WeightedGraph<N>) -> f64 {
        0.0
    }
}

/// Lowest-weight path from `from` to the first node satisfying `goal`,
/// including both ends.
///
/// A neighbor's predecessor and weight change only on strict improvement
/// under `comparator`. Returns an empty path when no goal node is reachable.
pub fn find_path<N: Clone + Eq + Hash>(
    graph: &WeightedGraph<N>,
    from: &N,
    goal: &dyn Fn(&N) -> bool,
    comparator: &dyn Fn(f64, f64) -> Ordering,
    calculator: &dyn WeightCalculator<N>,
) -> Vec<N> {
    let mut open: IndexSet<N> = IndexSet::new();
    let mut closed: IndexSet<N> = IndexSet::new();
    let mut came_from: IndexMap<N, N> = IndexMap::new();
    let mut accumulated: IndexMap<N, f64> = IndexMap::new();
    open.insert(from.clone());
    accumulated.insert(from.clone(), 0.0);

    while let Some(current) = poll_lowest(&mut open, &accumulated, comparator) {
        if goal(&current) {
            return reconstruct(&came_from, current);
        }
        let base = accumulated.get(&current).copied().unwrap_or(0.0);
        closed.insert(current.clone());
        for (neighbor, edge) in graph.neighbors(&current) {
            if closed.contains(neighbor) {
                continue;
            }
            let candidate = calculator.combine(
                base,
                edge,
                calculator.estimate(&current, neighbor, graph),
            );
            let improves = accumulated
                .get(neighbor)
                .is_none_or(|known| comparator(*known, candidate) == Ordering::Greater);
            if improves {
                came_from.insert(neighbor.clone(), current.clone());
                accumulated.insert(neighbor.clone(), candidate);
            }
            open.insert(neighbor.clone());
        }
    }
    Vec::new()
}

fn poll_lowest<N: Eq + Hash>(
    open: &mut IndexSet<N>,
    accumulated: &IndexMap<N, f64>,
    comparator: &dyn Fn(f64, f64) -> Ordering,
) -> Option<N> {
    let weight = |n: &N| accumulated.get(n).copied().unwrap_or(f64::INFINITY);
    let mut lowest = None;
    for (i, node) in open.iter().enumerate() {
        match lowest {
            None => lowest = Some(i),
            Some(best) => {
                let best_node = &open[best];
                if comparator(weight(best_node), weight(node)) == Ordering::Greater {
                    lowest = Some(i);
                }
            }
        }
    }
    open.shift_remove_index(lowest?)
}

fn reconstruct<N: Clone + Eq + Hash>(came_from: &IndexMap<N, N>, end: N) -> Vec<N> {
    let mut path = vec![end];
    while let Some(previous) = path.last().and_then(|n| came_from.get(n)) {
        path.push(previous.clone());
    }
    path.reverse();
    path
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    /// ```text
    /// A-B-C
    /// | | |
    /// D-E-F
    /// | | |
    /// G-H-I
    /// ```
    fn grid(weights: [f64; 12]) -> WeightedGraph<char> {
        let edges = [
            ('A', 'B'),
            ('B', 'C'),
            ('D', 'E'),
            ('E', 'F'),
            ('G', 'H'),
            ('H', 'I'),
            ('A', 'D'),
            ('D', 'G'),
            ('B', 'E'),
            ('E', 'H'),
            ('C', 'F'),
            ('F', 'I'),
        ];
        let mut g = WeightedGraph::new();
        for ((a, b), w) in edges.into_iter().zip(weights) {
            g.add_undirected_edge(a, b, w);
        }
        g
    }

    fn shortest(g: &WeightedGraph<char>, from: char, to: char) -> Vec<char> {
        find_path(g, &from, &|n: &char| *n == to, &*ascending(), &SumWeights)
    }

    #[test]
    fn test_detour_beats_direct_edge() {
        // A-D-G is expensive, the path has to go around through the right column
        let g = grid([1.0, 1.0, 5.0, 5.0, 1.0, 1.0, 9.0, 9.0, 5.0, 5.0, 1.0, 1.0]);
        assert_eq!(shortest(&g, 'A', 'G'), vec!['A', 'B', 'C', 'F', 'I', 'H', 'G']);
    }

    #[test]
    fn test_backtracks_from_cheap_dead_end() {
        // B looks cheap but leads nowhere useful
        let g = WeightedGraph::new()
            .with_edge('s', 'b', 1.0)
            .with_edge('b', 'x', 1.0)
            .with_edge('s', 'c', 2.0)
            .with_edge('c', 't', 2.0)
            .with_edge('x', 't', 10.0);
        assert_eq!(shortest(&g, 's', 't'), vec!['s', 'c', 't']);
    }

    #[test]
    fn test_unreachable_goal_is_empty() {
        let mut g = grid([1.0; 12]);
        g.add_node('Z');
        assert!(shortest(&g, 'A', 'Z').is_empty());
        assert!(shortest(&g, 'A', 'Q').is_empty());
    }

    #[test]
    fn test_start_satisfying_goal() {
        let g = grid([1.0; 12]);
        assert_eq!(shortest(&g, 'E', 'E'), vec!['E']);
    }

    #[test]
    fn test_goal_predicate_picks_nearest_match() {
        let g = grid([1.0; 12]);
        let path = find_path(
            &g,
            &'A',
            &|n: &char| matches!(n, 'F' | 'H'),
            &*ascending(),
            &SumWeights,
        );
        assert_eq!(path.len(), 4);
        assert!(matches!(path.last(), Some('F' | 'H')));
    }

    #[test]
    fn test_descending_comparator_prefers_heavy_edges() {
        let g = WeightedGraph::new()
            .with_edge(0, 1, 1.0)
            .with_edge(0, 2, 5.0)
            .with_edge(1, 3, 1.0)
            .with_edge(2, 3, 1.0);
        let descending = |a: f64, b: f64| b.total_cmp(&a);
        let path = find_path(&g, &0, &|n: &i32| *n == 3, &descending, &SumWeights);
        assert_eq!(path, vec![0, 2, 3]);
    }

    struct ColumnDistance;

    impl WeightCalculator<char> for ColumnDistance {
        fn combine(&self, accumulated: f64, edge: f64, estimate: f64) -> f64 {
            accumulated + edge + estimate
        }

        fn estimate(&self, _from: &char, to: &char, _graph: &WeightedGraph<char>) -> f64 {
            // distance of the column of `to` from the left column
            match to {
                'A' | 'D' | 'G' => 0.0,
                'B' | 'E' | 'H' => 1.0,
                _ => 2.0,
            }
        }
    }

    #[test]
    fn test_estimate_steers_search() {
        let g = grid([1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0]);
        let path = find_path(&g, &'A', &|n: &char| *n == 'G', &*ascending(), &ColumnDistance);
        assert_eq!(path, vec!['A', 'D', 'G']);
    }

    /// Minimum weight over all simple paths from `from` to `to`.
    fn brute_force(g: &WeightedGraph<usize>, from: usize, to: usize) -> Option<f64> {
        fn walk(
            g: &WeightedGraph<usize>,
            at: usize,
            to: usize,
            seen: &mut Vec<usize>,
            cost: f64,
            best: &mut Option<f64>,
        ) {
            if at == to {
                *best = Some(best.map_or(cost, |b| b.min(cost)));
                return;
            }
            let next: Vec<(usize, f64)> = g.neighbors(&at).map(|(n, w)| (*n, w)).collect();
            for (n, w) in next {
                if !seen.contains(&n) {
                    seen.push(n);
                    walk(g, n, to, seen, cost + w, best);
                    seen.pop();
                }
            }
        }
        let mut best = None;
        walk(g, from, to, &mut vec![from], 0.0, &mut best);
        best
    }

    proptest! {
        #[test]
        fn prop_matches_brute_force(
            edges in proptest::collection::vec((0usize..7, 0usize..7, 0u8..10), 0..20),
            to in 0usize..7,
        ) {
            let mut g = WeightedGraph::new();
            for n in 0..7 {
                g.add_node(n);
            }
            for (a, b, w) in edges {
                if a != b {
                    g.add_edge(a, b, w as f64);
                }
            }
            let path = find_path(&g, &0, &|n: &usize| *n == to, &*ascending(), &SumWeights);
            match brute_force(&g, 0, to) {
                None => prop_assert!(path.is_empty()),
                Some(best) => {
                    prop_assert_eq!(path.first(), Some(&0));
                    prop_assert_eq!(path.last(), Some(&to));
                    prop_assert_eq!(g.path_weight(&path), Some(best));
                }
            }
        }
    }
}
