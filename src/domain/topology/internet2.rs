use crate::domain::topology::network_topology::{NetworkTopology, NodeKind, TopologyError};
use crate::domain::utils::id::NodeId;

/// Capacity assigned to every link of the reference WAN, in Mbps.
pub const INTERNET2_LINK_CAPACITY: i64 = 1000;

/// Delay of the host access links in ms.
const ACCESS_DELAY: f64 = 0.1;

/// Core links with their propagation delay in ms. Each entry is installed in both directions.
const CORE_LINKS: [(u32, u32, f64); 10] = [
    (0, 1, 1.5),
    (1, 2, 2.55),
    (2, 5, 1.75),
    (0, 7, 1.1),
    (1, 6, 0.27),
    (3, 4, 0.15),
    (3, 7, 1.0),
    (4, 5, 0.15),
    (6, 7, 0.14),
    (2, 3, 2.0),
];

/// Host `h{i}` is attached to the core node at position `i`.
const HOST_ATTACHMENT: [u32; 8] = [0, 4, 2, 3, 1, 5, 6, 7];

impl NetworkTopology {
    /// Builds the Internet2 WAN used as the reference deployment: 8 core nodes (`0`..`7`)
    /// and 8 hosts (`h0`..`h7`), every connection installed as two directed links.
    pub fn internet2() -> Result<NetworkTopology, TopologyError> {
        let mut topology = NetworkTopology::new();

        for core in 0..8 {
            topology.add_node(core_id(core), NodeKind::Core)?;
        }

        for host in 0..HOST_ATTACHMENT.len() {
            topology.add_node(host_id(host), NodeKind::Host)?;
        }

        for (a, b, delay) in CORE_LINKS {
            topology.add_link(core_id(a), core_id(b), delay, INTERNET2_LINK_CAPACITY)?;
            topology.add_link(core_id(b), core_id(a), delay, INTERNET2_LINK_CAPACITY)?;
        }

        for (host, core) in HOST_ATTACHMENT.iter().enumerate() {
            topology.add_link(host_id(host), core_id(*core), ACCESS_DELAY, INTERNET2_LINK_CAPACITY)?;
            topology.add_link(core_id(*core), host_id(host), ACCESS_DELAY, INTERNET2_LINK_CAPACITY)?;
        }

        log::debug!("Internet2 topology built: {} nodes, {} links.", topology.node_count(), topology.link_count());

        Ok(topology)
    }
}

fn core_id(index: u32) -> NodeId {
    NodeId::new(index.to_string())
}

fn host_id(index: usize) -> NodeId {
    NodeId::new(format!("h{}", index))
}
