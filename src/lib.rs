use std::path::Path;

use crate::api::config_dto::SchedulerConfigDto;
use crate::api::topology_dto::TopologyDto;
use crate::api::traffic_dto::TrafficDto;
use crate::domain::config::SchedulerConfig;
use crate::domain::flow::TrafficSet;
use crate::domain::topology::NetworkTopology;
use crate::error::Result;
use crate::loader::parser::parse_json_file;

pub mod api;
pub mod domain;
pub mod error;
pub mod loader;
pub mod logger;

/// Reads and validates a scheduler configuration file.
pub fn load_config(file_path: impl AsRef<Path>) -> Result<SchedulerConfig> {
    let dto: SchedulerConfigDto = parse_json_file(file_path.as_ref())?;
    log::info!("Configuration file '{}' parsed successfully.", file_path.as_ref().display());

    Ok(SchedulerConfig::try_from(dto)?)
}

pub fn load_topology(file_path: impl AsRef<Path>) -> Result<NetworkTopology> {
    let dto: TopologyDto = parse_json_file(file_path.as_ref())?;
    let topology = NetworkTopology::try_from(dto)?;
    log::info!("Topology file '{}' loaded: {} nodes, {} links.", file_path.as_ref().display(), topology.node_count(), topology.link_count());

    Ok(topology)
}

pub fn load_traffic(file_path: impl AsRef<Path>) -> Result<TrafficSet> {
    let dto: TrafficDto = parse_json_file(file_path.as_ref())?;
    let traffic = TrafficSet::try_from(dto)?;
    log::info!("Traffic file '{}' loaded: {} TT flows, {} AVB flows.", file_path.as_ref().display(), traffic.tt.len(), traffic.avb.len());

    Ok(traffic)
}
