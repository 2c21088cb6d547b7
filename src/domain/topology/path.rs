use std::cmp::Ordering;
use std::collections::HashSet;
use std::fmt::Debug;
use std::hash::Hash;

/// Anything usable as a graph vertex.
pub trait NodeId: Copy + Eq + Ord + Hash + Debug {}

impl<T: Copy + Eq + Ord + Hash + Debug> NodeId for T {}

/// A walk through the topology together with its weight at the time it was built.
///
/// Paths are ordered by weight first and node sequence second. The tie-break on the
/// sequence makes the shortest path of every pair unique, and every subpath of such a path
/// is again the unique shortest path of its own endpoints.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Path<N> {
    pub nodes: Vec<N>,
    pub weight: u64,
}

impl<N: NodeId> Path<N> {
    pub fn new(nodes: Vec<N>, weight: u64) -> Self {
        Self { nodes, weight }
    }

    pub fn singleton(node: N) -> Self {
        Self { nodes: vec![node], weight: 0 }
    }

    pub fn edge(source: N, target: N, weight: u64) -> Self {
        Self { nodes: vec![source, target], weight }
    }

    /// First and last node.
    pub fn terminals(&self) -> Option<(N, N)> {
        Some((*self.nodes.first()?, *self.nodes.last()?))
    }

    /// The path without its last node.
    pub fn left_subpath(&self) -> &[N] {
        &self.nodes[..self.nodes.len().saturating_sub(1)]
    }

    /// The path without its first node.
    pub fn right_subpath(&self) -> &[N] {
        if self.nodes.is_empty() { &self.nodes } else { &self.nodes[1..] }
    }

    pub fn contains(&self, node: &N) -> bool {
        self.nodes.contains(node)
    }

    pub fn is_simple(&self) -> bool {
        let mut seen = HashSet::with_capacity(self.nodes.len());
        self.nodes.iter().all(|node| seen.insert(*node))
    }

    pub fn prepend(&self, node: N, edge_weight: u64) -> Path<N> {
        let mut nodes = Vec::with_capacity(self.nodes.len() + 1);
        nodes.push(node);
        nodes.extend_from_slice(&self.nodes);
        Path { nodes, weight: self.weight + edge_weight }
    }

    pub fn append(&self, node: N, edge_weight: u64) -> Path<N> {
        let mut nodes = self.nodes.clone();
        nodes.push(node);
        Path { nodes, weight: self.weight + edge_weight }
    }
}

impl<N: NodeId> Ord for Path<N> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.weight.cmp(&other.weight).then_with(|| self.nodes.cmp(&other.nodes))
    }
}

impl<N: NodeId> PartialOrd for Path<N> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_subpaths() {
        let path: Path<u32> = Path::new(vec![1, 2, 3], 20);

        assert_eq!(path.terminals(), Some((1, 3)));
        assert_eq!(path.left_subpath(), &[1, 2]);
        assert_eq!(path.right_subpath(), &[2, 3]);
        assert_eq!(Path::edge(1u32, 2, 5).left_subpath(), &[1]);
        assert_eq!(Path::edge(1u32, 2, 5).right_subpath(), &[2]);
    }

    #[test]
    fn test_order_breaks_weight_ties_by_sequence() {
        let a: Path<u32> = Path::new(vec![1, 2, 4], 10);
        let b: Path<u32> = Path::new(vec![1, 3, 4], 10);
        let c: Path<u32> = Path::new(vec![1, 4], 11);

        assert!(a < b);
        assert!(b < c);
    }

    #[test]
    fn test_extension_accumulates_weight() {
        let path: Path<u32> = Path::edge(2, 3, 4);

        assert_eq!(path.prepend(1, 6), Path::new(vec![1, 2, 3], 10));
        assert_eq!(path.append(4, 1), Path::new(vec![2, 3, 4], 5));
        assert!(!Path::new(vec![1u32, 2, 1], 2).is_simple());
    }
}
