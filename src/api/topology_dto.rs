use serde::{Deserialize, Serialize};

use crate::domain::topology::NodeKind;

#[derive(Debug, Deserialize, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TopologyDto {
    pub nodes: Vec<NodeDto>,
    pub links: Vec<LinkDto>,
}

#[derive(Debug, Deserialize, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeDto {
    pub id: String,
    pub kind: NodeKind,
}

/// One directed link. Bidirectional connections are listed twice.
#[derive(Debug, Deserialize, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LinkDto {
    pub source: String,
    pub target: String,

    /// Propagation delay in ms, used as the shortest-path weight.
    pub delay: f64,
    pub capacity: i64,
}
