use std::collections::{HashMap, HashSet};

use crate::domain::topology::path::NodeId;
use crate::error::{Error, Result};

/// Directed, weighted switch graph with at most one edge per ordered pair.
///
/// Adding an edge for a pair that already has one replaces its weight. A node whose last
/// incident edge is removed is pruned.
#[derive(Debug, Clone)]
pub struct TopologyGraph<N: NodeId> {
    nodes: HashSet<N>,

    /// Maps a node to its outgoing edges (target -> weight).
    out_adjacency: HashMap<N, HashMap<N, u64>>,

    /// Maps a node to its incoming edges (source -> weight).
    in_adjacency: HashMap<N, HashMap<N, u64>>,
}

impl<N: NodeId> Default for TopologyGraph<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<N: NodeId> TopologyGraph<N> {
    pub fn new() -> Self {
        Self { nodes: HashSet::new(), out_adjacency: HashMap::new(), in_adjacency: HashMap::new() }
    }

    /// Registers a node. Returns `false` if it was already present.
    pub fn add_node(&mut self, node: N) -> bool {
        self.nodes.insert(node)
    }

    /// Node removal follows from the loss of the node's last edge, so this does nothing.
    pub fn remove_node(&mut self, node: N) {
        log::debug!("Ignoring explicit removal of node {:?}; nodes are pruned with their last edge.", node);
    }

    /// Adds or re-weights the edge `source -> target`.
    ///
    /// # Returns
    /// The previous weight if the edge already existed.
    pub fn add_edge(&mut self, source: N, target: N, weight: u64) -> Result<Option<u64>> {
        if weight == 0 {
            return Err(Error::InvalidWeight(weight));
        }
        if source == target {
            return Err(Error::SelfLoop(format!("{:?}", source)));
        }

        self.nodes.insert(source);
        self.nodes.insert(target);
        self.in_adjacency.entry(target).or_default().insert(source, weight);
        let previous = self.out_adjacency.entry(source).or_default().insert(target, weight);

        Ok(previous)
    }

    /// Removes the edge `source -> target` and prunes endpoints left without edges.
    ///
    /// # Returns
    /// The removed edge's weight, `None` if there was no such edge.
    pub fn remove_edge(&mut self, source: N, target: N) -> Option<u64> {
        let weight = self.out_adjacency.get_mut(&source)?.remove(&target)?;

        if let Some(incoming) = self.in_adjacency.get_mut(&target) {
            incoming.remove(&source);
        }

        for node in [source, target] {
            if self.degree(node) == 0 {
                self.out_adjacency.remove(&node);
                self.in_adjacency.remove(&node);
                self.nodes.remove(&node);
                log::debug!("Pruned node {:?}: no incident edges left.", node);
            }
        }

        Some(weight)
    }

    pub fn contains_node(&self, node: &N) -> bool {
        self.nodes.contains(node)
    }

    pub fn weight(&self, source: N, target: N) -> Option<u64> {
        self.out_adjacency.get(&source)?.get(&target).copied()
    }

    pub fn degree(&self, node: N) -> usize {
        let out_degree = self.out_adjacency.get(&node).map_or(0, HashMap::len);
        let in_degree = self.in_adjacency.get(&node).map_or(0, HashMap::len);
        out_degree + in_degree
    }

    /// All nodes, sorted.
    pub fn nodes(&self) -> Vec<N> {
        let mut nodes: Vec<N> = self.nodes.iter().copied().collect();
        nodes.sort();
        nodes
    }

    /// All edges as `(source, target, weight)`, sorted.
    pub fn edges(&self) -> Vec<(N, N, u64)> {
        let mut edges: Vec<(N, N, u64)> = self
            .out_adjacency
            .iter()
            .flat_map(|(source, targets)| targets.iter().map(move |(target, weight)| (*source, *target, *weight)))
            .collect();
        edges.sort();
        edges
    }

    pub fn out_edges(&self, node: N) -> Vec<(N, N, u64)> {
        self.out_adjacency.get(&node).map_or_else(Vec::new, |targets| targets.iter().map(|(target, weight)| (node, *target, *weight)).collect())
    }

    pub fn in_edges(&self, node: N) -> Vec<(N, N, u64)> {
        self.in_adjacency.get(&node).map_or_else(Vec::new, |sources| sources.iter().map(|(source, weight)| (*source, node, *weight)).collect())
    }

    /// Outgoing then incoming edges of `node`.
    pub fn incident_edges(&self, node: N) -> Vec<(N, N, u64)> {
        let mut edges = self.out_edges(node);
        edges.extend(self.in_edges(node));
        edges
    }

    pub fn edge_count(&self) -> usize {
        self.out_adjacency.values().map(HashMap::len).sum()
    }
}
