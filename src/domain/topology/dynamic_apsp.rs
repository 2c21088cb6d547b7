//! Fully dynamic all-pairs shortest paths after Demetrescu and Italiano,
//! "A New Approach to Dynamic All Pairs Shortest Paths".
//!
//! The engine keeps, for every ordered pair, the *locally shortest paths* (LSP): paths whose
//! prefix without the last node and suffix without the first node are both recorded
//! shortest paths (SP). A change to the edges around one node only invalidates the paths
//! that run through it; everything else is reused, and the fixup phase rebuilds the missing
//! paths Dijkstra-style from a heap of per-pair candidates.
//!
//! Four extension indices map a node sequence to the paths that extend it by one node:
//!
//! * `local_left[s]`: LSP paths `a·s`, keyed by their right subpath `s`.
//! * `local_right[s]`: LSP paths `s·b`, keyed by their left subpath `s`.
//! * `shortest_left` / `shortest_right`: the same for promoted SP paths.

use std::cmp::Reverse;
use std::collections::{BTreeSet, BinaryHeap, HashMap, HashSet};

use crate::domain::topology::graph::TopologyGraph;
use crate::domain::topology::path::{NodeId, Path};

type PathIndex<N> = HashMap<Vec<N>, HashSet<Path<N>>>;

#[derive(Debug, Clone)]
pub struct DynamicApsp<N: NodeId> {
    /// LSP buckets per ordered pair, ordered so the first entry is the current shortest.
    local_paths: HashMap<(N, N), BTreeSet<Path<N>>>,

    /// SP buckets per ordered pair. May keep formerly shortest paths until a node on them
    /// is updated again.
    shortest_paths: HashMap<(N, N), BTreeSet<Path<N>>>,

    local_left: PathIndex<N>,
    local_right: PathIndex<N>,
    shortest_left: PathIndex<N>,
    shortest_right: PathIndex<N>,

    /// Logical clock, advanced once per `fully_update`.
    clock: u64,

    /// Clock value of the last stamped update per node.
    node_time: HashMap<N, u64>,
}

impl<N: NodeId> Default for DynamicApsp<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<N: NodeId> DynamicApsp<N> {
    pub fn new() -> Self {
        Self {
            local_paths: HashMap::new(),
            shortest_paths: HashMap::new(),
            local_left: HashMap::new(),
            local_right: HashMap::new(),
            shortest_left: HashMap::new(),
            shortest_right: HashMap::new(),
            clock: 0,
            node_time: HashMap::new(),
        }
    }

    /// Builds the engine for an existing graph by updating every node once.
    pub fn from_graph(graph: &TopologyGraph<N>) -> Self {
        let mut engine = Self::new();
        engine.resize(graph);
        for node in graph.nodes() {
            engine.update(node, false, graph);
        }
        engine
    }

    /// Registers nodes not seen before and creates empty buckets for their pairs.
    ///
    /// Tables never shrink; entries of removed nodes stay until an update touches them.
    pub fn resize(&mut self, graph: &TopologyGraph<N>) {
        let new_nodes: Vec<N> = graph.nodes().into_iter().filter(|node| !self.node_time.contains_key(node)).collect();
        if new_nodes.is_empty() {
            return;
        }

        for node in &new_nodes {
            self.node_time.insert(*node, self.clock);
        }

        let known: Vec<N> = self.node_time.keys().copied().collect();
        for node in &new_nodes {
            for other in &known {
                for pair in [(*node, *other), (*other, *node)] {
                    self.local_paths.entry(pair).or_default();
                    self.shortest_paths.entry(pair).or_default();
                }
            }
        }

        log::debug!("DynamicApsp resized: {} new node(s), {} known.", new_nodes.len(), known.len());
    }

    /// Recomputes everything that depends on the edges around `node`.
    ///
    /// Removes every path through `node`, reseeds its incident edges unless the node was
    /// deleted, and re-derives the locally shortest and shortest paths.
    pub fn update(&mut self, node: N, was_deleted: bool, graph: &TopologyGraph<N>) {
        self.cleanup(node);
        self.fixup(node, was_deleted, graph);
    }

    /// Front end for graph changes: stamps `node`, updates it, then smooths.
    ///
    /// Smoothing re-runs `update` on every other stamped node whose age in clock ticks is
    /// a power of two, so stale historical paths are flushed in amortised steps.
    pub fn fully_update(&mut self, node: N, was_deleted: bool, graph: &TopologyGraph<N>) {
        self.clock += 1;
        self.node_time.insert(node, self.clock);
        self.update(node, was_deleted, graph);

        let clock = self.clock;
        let mut due: Vec<N> = self
            .node_time
            .iter()
            .filter(|(other, stamp)| **other != node && **stamp != 0 && (clock - **stamp).is_power_of_two())
            .map(|(other, _)| *other)
            .filter(|other| graph.contains_node(other))
            .collect();
        due.sort();

        for other in due {
            self.update(other, false, graph);
        }
    }

    /// Weight of the shortest path from `source` to `target`, `None` if unreachable.
    pub fn distance(&self, source: N, target: N) -> Option<u64> {
        if source == target {
            return Some(0);
        }
        self.local_paths.get(&(source, target))?.first().map(|path| path.weight)
    }

    /// Shortest path from `source` to `target`, `None` if unreachable.
    pub fn get_path(&self, source: N, target: N) -> Option<Path<N>> {
        if source == target {
            return Some(Path::singleton(source));
        }
        let path = self.local_paths.get(&(source, target))?.first()?.clone();
        debug_assert!(path.is_simple(), "shortest path repeats a node: {:?}", path);
        Some(path)
    }

    pub fn clock(&self) -> u64 {
        self.clock
    }

    pub fn node_time(&self, node: N) -> Option<u64> {
        self.node_time.get(&node).copied()
    }

    pub fn local_paths(&self, source: N, target: N) -> Vec<Path<N>> {
        self.local_paths.get(&(source, target)).map(|bucket| bucket.iter().cloned().collect()).unwrap_or_default()
    }

    pub fn local_path_count(&self) -> usize {
        self.local_paths.values().map(BTreeSet::len).sum()
    }

    pub fn shortest_path_count(&self) -> usize {
        self.shortest_paths.values().map(BTreeSet::len).sum()
    }

    fn cleanup(&mut self, node: N) {
        let mut pending: Vec<Vec<N>> = vec![vec![node]];
        let mut removed = 0usize;

        while let Some(sequence) = pending.pop() {
            let mut doomed: Vec<Path<N>> = Vec::new();
            if let Some(extensions) = self.local_left.remove(&sequence) {
                doomed.extend(extensions);
            }
            if let Some(extensions) = self.local_right.remove(&sequence) {
                doomed.extend(extensions);
            }

            for path in doomed {
                if self.forget_local_path(&path) {
                    removed += 1;
                    pending.push(path.nodes);
                }
            }
        }

        log::trace!("DynamicApsp cleanup of {:?} removed {} path(s).", node, removed);
    }

    fn fixup(&mut self, node: N, was_deleted: bool, graph: &TopologyGraph<N>) {
        if !was_deleted {
            for (source, target, weight) in graph.incident_edges(node) {
                self.add_local_path(Path::edge(source, target, weight));
            }
        }

        let mut candidates: BinaryHeap<Reverse<Path<N>>> =
            self.local_paths.values().filter_map(|bucket| bucket.first().cloned()).map(Reverse).collect();
        let mut processed: HashSet<(N, N)> = HashSet::new();
        let mut promoted = 0usize;

        while let Some(Reverse(path)) = candidates.pop() {
            let Some(pair) = path.terminals() else { continue };
            if !processed.insert(pair) {
                continue;
            }
            if self.shortest_paths.get(&pair).is_some_and(|bucket| bucket.contains(&path)) {
                continue;
            }

            self.promote(&path);
            promoted += 1;

            for extended in self.extensions(&path, graph) {
                if self.add_local_path(extended.clone()) {
                    candidates.push(Reverse(extended));
                }
            }
        }

        log::trace!("DynamicApsp fixup of {:?} promoted {} path(s).", node, promoted);
    }

    /// New local paths obtained by extending a freshly promoted `path` one node to the
    /// left or right along recorded shortest paths.
    fn extensions(&self, path: &Path<N>, graph: &TopologyGraph<N>) -> Vec<Path<N>> {
        let mut extended = Vec::new();

        // a·l(path) is shortest, so a·path is locally shortest.
        if let Some(lefts) = self.shortest_left.get(path.left_subpath()) {
            for left in lefts {
                let head = left.nodes[0];
                if path.contains(&head) {
                    continue;
                }
                if let Some(weight) = graph.weight(head, left.nodes[1]) {
                    extended.push(path.prepend(head, weight));
                }
            }
        }

        // r(path)·b is shortest, so path·b is locally shortest.
        if let Some(rights) = self.shortest_right.get(path.right_subpath()) {
            for right in rights {
                let len = right.nodes.len();
                let tail = right.nodes[len - 1];
                if path.contains(&tail) {
                    continue;
                }
                if let Some(weight) = graph.weight(right.nodes[len - 2], tail) {
                    extended.push(path.append(tail, weight));
                }
            }
        }

        extended
    }

    /// Inserts a local path and indexes it. Returns `false` if it was already recorded.
    fn add_local_path(&mut self, path: Path<N>) -> bool {
        let Some(pair) = path.terminals() else { return false };
        if !self.local_paths.entry(pair).or_default().insert(path.clone()) {
            return false;
        }

        self.local_left.entry(path.right_subpath().to_vec()).or_default().insert(path.clone());
        self.local_right.entry(path.left_subpath().to_vec()).or_default().insert(path);
        true
    }

    fn promote(&mut self, path: &Path<N>) {
        let Some(pair) = path.terminals() else { return };
        self.shortest_paths.entry(pair).or_default().insert(path.clone());
        self.shortest_left.entry(path.right_subpath().to_vec()).or_default().insert(path.clone());
        self.shortest_right.entry(path.left_subpath().to_vec()).or_default().insert(path.clone());
    }

    /// Drops a local path, and its shortest-path record if it had one.
    ///
    /// Returns `false` if the path was not recorded.
    fn forget_local_path(&mut self, path: &Path<N>) -> bool {
        let Some(pair) = path.terminals() else { return false };
        if !self.local_paths.get_mut(&pair).is_some_and(|bucket| bucket.remove(path)) {
            return false;
        }

        remove_from_index(&mut self.local_left, path.right_subpath(), path);
        remove_from_index(&mut self.local_right, path.left_subpath(), path);

        if self.shortest_paths.get_mut(&pair).is_some_and(|bucket| bucket.remove(path)) {
            remove_from_index(&mut self.shortest_left, path.right_subpath(), path);
            remove_from_index(&mut self.shortest_right, path.left_subpath(), path);
        }
        true
    }
}

fn remove_from_index<N: NodeId>(index: &mut PathIndex<N>, key: &[N], path: &Path<N>) {
    let Some(entries) = index.get_mut(key) else { return };
    entries.remove(path);
    if entries.is_empty() {
        index.remove(key);
    }
}
