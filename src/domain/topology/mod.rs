pub mod internet2;
pub mod network_topology;
pub mod routing;

pub use network_topology::{Link, NetworkTopology, Node, NodeKind, TopologyError};
pub use routing::{Path, RoutingError};
