pub mod config_dto;
pub mod topology_dto;
pub mod traffic_dto;
