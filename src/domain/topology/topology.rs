use crate::domain::topology::dynamic_apsp::DynamicApsp;
use crate::domain::topology::graph::TopologyGraph;
use crate::domain::topology::path::{NodeId, Path};
use crate::error::Result;

/// Receives graph mutations after they have been applied.
pub trait TopologyObserver<N: NodeId> {
    fn on_node_added(&mut self, graph: &TopologyGraph<N>, node: N);

    /// Called after the edge `source -> target` was added, re-weighted or removed.
    fn on_edge_changed(&mut self, graph: &TopologyGraph<N>, source: N, target: N);
}

impl<N: NodeId> TopologyObserver<N> for DynamicApsp<N> {
    fn on_node_added(&mut self, graph: &TopologyGraph<N>, _node: N) {
        self.resize(graph);
    }

    fn on_edge_changed(&mut self, graph: &TopologyGraph<N>, source: N, _target: N) {
        self.resize(graph);
        let was_deleted = !graph.contains_node(&source);
        self.fully_update(source, was_deleted, graph);
    }
}

/// Switch graph together with the shortest-path engine that follows it.
#[derive(Debug, Clone)]
pub struct Topology<N: NodeId> {
    graph: TopologyGraph<N>,
    routing: DynamicApsp<N>,
}

impl<N: NodeId> Default for Topology<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<N: NodeId> Topology<N> {
    pub fn new() -> Self {
        Self { graph: TopologyGraph::new(), routing: DynamicApsp::new() }
    }

    pub fn add_node(&mut self, node: N) {
        if self.graph.add_node(node) {
            self.routing.on_node_added(&self.graph, node);
        }
    }

    /// Nodes disappear together with their last link.
    pub fn remove_node(&mut self, node: N) {
        self.graph.remove_node(node);
    }

    /// Adds the link `source -> target`, or re-weights it if it already exists.
    pub fn add_link(&mut self, source: N, target: N, weight: u64) -> Result<()> {
        let previous = self.graph.add_edge(source, target, weight)?;
        if previous == Some(weight) {
            return Ok(());
        }

        self.routing.on_edge_changed(&self.graph, source, target);
        Ok(())
    }

    /// Removes the link `source -> target`.
    ///
    /// # Returns
    /// `false` if there was no such link.
    pub fn remove_link(&mut self, source: N, target: N) -> bool {
        if self.graph.remove_edge(source, target).is_none() {
            return false;
        }

        self.routing.on_edge_changed(&self.graph, source, target);
        true
    }

    /// Shortest node sequence from `source` to `target`, `None` if unreachable.
    pub fn make_path(&self, source: N, target: N) -> Option<Vec<N>> {
        self.routing.get_path(source, target).map(|path| path.nodes)
    }

    pub fn shortest_path(&self, source: N, target: N) -> Option<Path<N>> {
        self.routing.get_path(source, target)
    }

    pub fn distance(&self, source: N, target: N) -> Option<u64> {
        self.routing.distance(source, target)
    }

    pub fn graph(&self) -> &TopologyGraph<N> {
        &self.graph
    }

    pub fn routing(&self) -> &DynamicApsp<N> {
        &self.routing
    }
}
