use std::cmp::Ordering;
use std::collections::BinaryHeap;
use thiserror::Error;

use crate::domain::topology::network_topology::NetworkTopology;
use crate::domain::utils::id::{LinkId, NodeId};

/// A resolved route through the network.
///
/// `nodes` holds the ordered node sequence including both endpoints, `links` the
/// traversed link ids (always one less than the number of nodes).
#[derive(Debug, Clone, PartialEq)]
pub struct Path {
    pub nodes: Vec<NodeId>,
    pub links: Vec<LinkId>,

    /// Sum of the per-link propagation delays in ms.
    pub propagation_delay: f64,
}

impl Path {
    pub fn hop_count(&self) -> usize {
        self.links.len()
    }
}

/// Outcome of a failed path query. Expected during admission, never a crash.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RoutingError {
    #[error("node '{0}' is not part of the topology")]
    UnknownNode(NodeId),

    #[error("no path from '{from}' to '{to}'")]
    NoPath { from: NodeId, to: NodeId },
}

/// Entry of the Dijkstra frontier, ordered as a min-heap on cost with the node
/// index as tie-breaker so equal-cost routes resolve the same way on every run.
#[derive(Debug, Clone, Copy)]
struct Frontier {
    cost: f64,
    node: usize,
}

impl PartialEq for Frontier {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Frontier {}

impl PartialOrd for Frontier {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Frontier {
    fn cmp(&self, other: &Self) -> Ordering {
        other.cost.total_cmp(&self.cost).then_with(|| other.node.cmp(&self.node))
    }
}

impl NetworkTopology {
    /// Computes the delay-weighted shortest path from `source` to `target`.
    ///
    /// A query with `source == target` yields a zero-hop path.
    pub fn shortest_path(&self, source: &NodeId, target: &NodeId) -> Result<Path, RoutingError> {
        let source_index = *self.node_index.get(source).ok_or_else(|| RoutingError::UnknownNode(source.clone()))?;
        let target_index = *self.node_index.get(target).ok_or_else(|| RoutingError::UnknownNode(target.clone()))?;

        let mut distance = vec![f64::INFINITY; self.nodes.len()];
        let mut predecessor: Vec<Option<LinkId>> = vec![None; self.nodes.len()];
        let mut heap = BinaryHeap::new();

        distance[source_index] = 0.0;
        heap.push(Frontier { cost: 0.0, node: source_index });

        while let Some(Frontier { cost, node }) = heap.pop() {
            if node == target_index {
                break;
            }

            if cost > distance[node] {
                continue;
            }

            for &link_id in &self.adjacency[node] {
                let link = &self.links[link_id.index()];
                let Some(&(_, next)) = self.link_map.get_by_left(&link_id) else {
                    continue;
                };
                let next_cost = cost + link.delay;

                if next_cost < distance[next] {
                    distance[next] = next_cost;
                    predecessor[next] = Some(link_id);
                    heap.push(Frontier { cost: next_cost, node: next });
                }
            }
        }

        if distance[target_index].is_infinite() {
            log::debug!("NoPathFound: {} => {}", source, target);
            return Err(RoutingError::NoPath { from: source.clone(), to: target.clone() });
        }

        let mut links = Vec::new();
        let mut cursor = target_index;
        while let Some(link_id) = predecessor[cursor] {
            let Some(&(previous, _)) = self.link_map.get_by_left(&link_id) else {
                break;
            };
            links.push(link_id);
            cursor = previous;
        }
        links.reverse();

        let mut nodes = Vec::with_capacity(links.len() + 1);
        nodes.push(source.clone());
        for link_id in &links {
            nodes.push(self.links[link_id.index()].target.clone());
        }

        // Summed in path order so the delay matches the per-hop sum bit for bit.
        let propagation_delay = links.iter().map(|link_id| self.links[link_id.index()].delay).sum();

        Ok(Path { nodes, links, propagation_delay })
    }
}
