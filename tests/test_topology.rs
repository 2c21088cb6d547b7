use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use sdn_dynroute::domain::topology::graph::TopologyGraph;
use sdn_dynroute::domain::topology::topology::Topology;
use sdn_dynroute::domain::utils::id::Dpid;
use std::cmp::Reverse;
use std::collections::{BinaryHeap, HashMap};

/// Plain Dijkstra over a graph snapshot.
fn reference_distances(graph: &TopologyGraph<u32>, source: u32) -> HashMap<u32, u64> {
    let mut distances: HashMap<u32, u64> = HashMap::new();
    let mut heap = BinaryHeap::new();
    distances.insert(source, 0);
    heap.push(Reverse((0u64, source)));

    while let Some(Reverse((distance, node))) = heap.pop() {
        if distances.get(&node).is_some_and(|best| *best < distance) {
            continue;
        }
        for (_, target, weight) in graph.out_edges(node) {
            let candidate = distance + weight;
            if distances.get(&target).is_none_or(|best| candidate < *best) {
                distances.insert(target, candidate);
                heap.push(Reverse((candidate, target)));
            }
        }
    }
    distances
}

fn assert_matches_reference(topology: &Topology<u32>, node_range: u32, step: usize) {
    let graph = topology.graph();

    for source in 0..node_range {
        let reference = if graph.contains_node(&source) { reference_distances(graph, source) } else { HashMap::from([(source, 0)]) };

        for target in 0..node_range {
            let expected = reference.get(&target).copied();
            assert_eq!(topology.distance(source, target), expected, "step {}: distance {} -> {}", step, source, target);

            let Some(path) = topology.shortest_path(source, target) else {
                assert!(expected.is_none(), "step {}: missing path {} -> {}", step, source, target);
                continue;
            };

            assert_eq!(path.nodes.first(), Some(&source));
            assert_eq!(path.nodes.last(), Some(&target));
            assert!(path.is_simple(), "step {}: path {:?} repeats a node", step, path.nodes);

            let summed: u64 = path.nodes.windows(2).map(|pair| graph.weight(pair[0], pair[1]).expect("path uses a missing edge")).sum();
            assert_eq!(Some(summed), expected, "step {}: path {:?} weight", step, path.nodes);
        }
    }
}

#[test]
fn test_two_hop_scenario() {
    let mut topology: Topology<&str> = Topology::new();
    topology.add_link("A", "B", 10).unwrap();
    topology.add_link("B", "C", 10).unwrap();

    assert_eq!(topology.make_path("A", "C"), Some(vec!["A", "B", "C"]));
    assert_eq!(topology.distance("A", "C"), Some(20));

    assert!(topology.remove_link("B", "C"));

    assert_eq!(topology.make_path("A", "C"), None);
    assert_eq!(topology.distance("A", "C"), None);
    assert_eq!(topology.graph().nodes(), vec!["A", "B"]);
}

#[test]
fn test_distance_to_self_is_zero() {
    let mut topology: Topology<Dpid> = Topology::new();
    topology.add_node(Dpid(1));

    assert_eq!(topology.distance(Dpid(1), Dpid(1)), Some(0));
    assert_eq!(topology.make_path(Dpid(1), Dpid(1)), Some(vec![Dpid(1)]));
    assert_eq!(topology.distance(Dpid(2), Dpid(2)), Some(0));
    assert_eq!(topology.distance(Dpid(1), Dpid(2)), None);
}

#[test]
fn test_nodes_without_edges_are_pruned() {
    let mut topology: Topology<u32> = Topology::new();
    topology.add_link(1, 2, 1).unwrap();
    topology.add_link(2, 3, 1).unwrap();
    topology.add_link(3, 1, 1).unwrap();

    topology.remove_link(1, 2);
    topology.remove_link(3, 1);

    assert_eq!(topology.graph().nodes(), vec![2, 3]);
    assert_eq!(topology.distance(1, 3), None);
    assert_eq!(topology.distance(2, 3), Some(1));
}

#[test]
fn test_shorter_detour_replaces_direct_link() {
    let mut topology: Topology<u32> = Topology::new();
    topology.add_link(1, 4, 100).unwrap();
    assert_eq!(topology.make_path(1, 4), Some(vec![1, 4]));

    topology.add_link(1, 2, 10).unwrap();
    topology.add_link(2, 3, 10).unwrap();
    topology.add_link(3, 4, 10).unwrap();
    assert_eq!(topology.make_path(1, 4), Some(vec![1, 2, 3, 4]));
    assert_eq!(topology.distance(1, 4), Some(30));

    topology.remove_link(2, 3);
    assert_eq!(topology.make_path(1, 4), Some(vec![1, 4]));

    topology.add_link(2, 3, 10).unwrap();
    assert_eq!(topology.distance(1, 4), Some(30));
}

#[test]
fn test_random_changes_match_dijkstra() {
    const NODES: u32 = 8;
    let mut rng = StdRng::seed_from_u64(0x5d_2024);

    for _round in 0..4 {
        let mut topology: Topology<u32> = Topology::new();

        for step in 0..250 {
            let edges = topology.graph().edges();
            if edges.is_empty() || rng.random_bool(0.65) {
                let source = rng.random_range(0..NODES);
                let target = rng.random_range(0..NODES);
                if source == target {
                    continue;
                }
                topology.add_link(source, target, rng.random_range(1..=20)).unwrap();
            } else {
                let (source, target, _) = edges[rng.random_range(0..edges.len())];
                assert!(topology.remove_link(source, target));
            }

            assert_matches_reference(&topology, NODES, step);
        }
    }
}

#[test]
fn test_equal_weights_yield_valid_paths() {
    let mut topology: Topology<u32> = Topology::new();
    for (source, target) in [(0, 1), (1, 3), (0, 2), (2, 3), (3, 4), (1, 4), (2, 4)] {
        topology.add_link(source, target, 1).unwrap();
    }
    assert_matches_reference(&topology, 5, 0);

    topology.remove_link(1, 3);
    topology.remove_link(1, 4);
    assert_matches_reference(&topology, 5, 1);
    assert_eq!(topology.make_path(0, 4), Some(vec![0, 2, 4]));
}
