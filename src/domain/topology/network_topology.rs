use bimap::BiMap;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;

use crate::api::topology_dto::TopologyDto;
use crate::domain::utils::id::{LinkId, NodeId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    /// Forwarding node inside the WAN.
    Core,

    /// End station. Flows start and end at hosts.
    Host,
}

/// Represents a node of the network graph.
#[derive(Debug, Clone)]
pub struct Node {
    pub id: NodeId,
    pub kind: NodeKind,
}

/// Represents one directed edge of the network graph.
#[derive(Debug, Clone)]
pub struct Link {
    /// Stable id, equal to the insertion index of the link.
    pub id: LinkId,
    pub source: NodeId,
    pub target: NodeId,

    /// Propagation delay in ms. Used as the edge weight of the shortest path query.
    pub delay: f64,
    pub capacity: i64,
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum TopologyError {
    #[error("node '{0}' was declared twice")]
    DuplicateNode(NodeId),

    #[error("link {from} -> {to} references unknown node '{missing}'")]
    UnknownEndpoint { from: NodeId, to: NodeId, missing: NodeId },

    #[error("link {from} -> {to} was declared twice")]
    DuplicateLink { from: NodeId, to: NodeId },

    #[error("link {from} -> {to} has invalid delay {delay}")]
    InvalidDelay { from: NodeId, to: NodeId, delay: f64 },
}

/// Models the directed, delay-weighted network graph.
///
/// The `NetworkTopology` manages:
/// * **Nodes**: core routers and hosts, kept in insertion order.
/// * **Links**: directed edges with a stable `LinkId` assigned at insertion.
/// * **Link map**: a bidirectional map `LinkId <-> (source, target)` used for matrix indexing.
///   The map never changes once scheduling starts, so both schedulers and the batch evaluator
///   agree on every link id of a run.
#[derive(Debug, Clone, Default)]
pub struct NetworkTopology {
    pub(super) nodes: Vec<Node>,

    /// Maps a `NodeId` to its position in `nodes`.
    pub(super) node_index: HashMap<NodeId, usize>,

    /// All links, the position in the vector equals the `LinkId`.
    pub(super) links: Vec<Link>,

    /// Bidirectional lookup between link ids and (source index, target index) pairs.
    pub(super) link_map: BiMap<LinkId, (usize, usize)>,

    /// Outgoing links per node index.
    pub(super) adjacency: Vec<Vec<LinkId>>,
}

impl TryFrom<TopologyDto> for NetworkTopology {
    type Error = TopologyError;

    fn try_from(dto: TopologyDto) -> Result<Self, Self::Error> {
        let mut topology = NetworkTopology::new();

        for node in dto.nodes {
            topology.add_node(NodeId::new(node.id), node.kind)?;
        }

        for link in dto.links {
            topology.add_link(NodeId::new(link.source), NodeId::new(link.target), link.delay, link.capacity)?;
        }

        if topology.links.is_empty() {
            log::warn!("EmptyTopology: The topology contains {} nodes but no links. Every flow will be rejected.", topology.nodes.len());
        }

        Ok(topology)
    }
}

impl NetworkTopology {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_node(&mut self, id: NodeId, kind: NodeKind) -> Result<(), TopologyError> {
        if self.node_index.contains_key(&id) {
            return Err(TopologyError::DuplicateNode(id));
        }

        self.node_index.insert(id.clone(), self.nodes.len());
        self.nodes.push(Node { id, kind });
        self.adjacency.push(Vec::new());
        Ok(())
    }

    /// Adds a directed link and returns the id assigned to it.
    pub fn add_link(&mut self, source: NodeId, target: NodeId, delay: f64, capacity: i64) -> Result<LinkId, TopologyError> {
        if !delay.is_finite() || delay < 0.0 {
            return Err(TopologyError::InvalidDelay { from: source, to: target, delay });
        }

        let Some(&source_index) = self.node_index.get(&source) else {
            let missing = source.clone();
            return Err(TopologyError::UnknownEndpoint { from: source, to: target, missing });
        };

        let Some(&target_index) = self.node_index.get(&target) else {
            let missing = target.clone();
            return Err(TopologyError::UnknownEndpoint { from: source, to: target, missing });
        };

        if self.link_map.contains_right(&(source_index, target_index)) {
            return Err(TopologyError::DuplicateLink { from: source, to: target });
        }

        let id = LinkId(self.links.len());
        self.link_map.insert(id, (source_index, target_index));
        self.adjacency[source_index].push(id);
        self.links.push(Link { id, source, target, delay, capacity });

        Ok(id)
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn links(&self) -> &[Link] {
        &self.links
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn link_count(&self) -> usize {
        self.links.len()
    }

    pub fn contains_node(&self, id: &NodeId) -> bool {
        self.node_index.contains_key(id)
    }

    pub fn link(&self, id: LinkId) -> Option<&Link> {
        self.links.get(id.index())
    }

    /// Looks up the id of the directed link `source -> target`.
    pub fn link_id(&self, source: &NodeId, target: &NodeId) -> Option<LinkId> {
        let source_index = *self.node_index.get(source)?;
        let target_index = *self.node_index.get(target)?;
        self.link_map.get_by_right(&(source_index, target_index)).copied()
    }

    /// Returns the endpoints of a link, the inverse of [`NetworkTopology::link_id`].
    pub fn endpoints(&self, id: LinkId) -> Option<(&NodeId, &NodeId)> {
        let (source_index, target_index) = self.link_map.get_by_left(&id)?;
        Some((&self.nodes[*source_index].id, &self.nodes[*target_index].id))
    }

    /// All host nodes in insertion order. Traffic is only generated between hosts.
    pub fn host_nodes(&self) -> Vec<NodeId> {
        self.nodes.iter().filter(|node| node.kind == NodeKind::Host).map(|node| node.id.clone()).collect()
    }
}
