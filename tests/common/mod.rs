#![allow(dead_code)]

use csqf_hybrid_scheduler::api::config_dto::SchedulerConfigDto;
use csqf_hybrid_scheduler::domain::config::SchedulerConfig;
use csqf_hybrid_scheduler::domain::flow::{AvbFlow, TtFlow};
use csqf_hybrid_scheduler::domain::topology::{NetworkTopology, NodeKind};
use csqf_hybrid_scheduler::domain::utils::id::{FlowId, NodeId};

/// Two hosts `a` and `b` joined by the single directed link `a -> b`.
pub fn single_link_topology(delay: f64) -> NetworkTopology {
    let mut topology = NetworkTopology::new();
    topology.add_node(NodeId::new("a"), NodeKind::Host).unwrap();
    topology.add_node(NodeId::new("b"), NodeKind::Host).unwrap();
    topology.add_link(NodeId::new("a"), NodeId::new("b"), delay, 1000).unwrap();
    topology
}

/// Chain `n0 -> n1 -> ... -> n{hops}` with the given per-link delay.
pub fn chain_topology(hops: usize, delay: f64) -> NetworkTopology {
    let mut topology = NetworkTopology::new();
    for i in 0..=hops {
        topology.add_node(NodeId::new(format!("n{}", i)), NodeKind::Host).unwrap();
    }
    for i in 0..hops {
        topology.add_link(NodeId::new(format!("n{}", i)), NodeId::new(format!("n{}", i + 1)), delay, 1000).unwrap();
    }
    topology
}

/// Config with unit base cycle, `cycles` cycles per hypercycle and the given queue split.
pub fn small_config(cycles: usize, fixed: usize, elastic: usize, window: usize) -> SchedulerConfig {
    let dto = SchedulerConfigDto {
        base_cycle: 1.0,
        hyper_cycle: cycles as f64,
        total_queues: fixed + elastic,
        fixed_queues: fixed,
        elastic_queues: elastic,
        sliding_window_size: window,
        use_accelerated_evaluator: false,
        ..SchedulerConfigDto::default()
    };
    SchedulerConfig::try_from(dto).unwrap()
}

pub fn tt_flow(id: u64, src: &str, dst: &str, deadline: f64) -> TtFlow {
    TtFlow::new(FlowId(id), NodeId::new(src), NodeId::new(dst), 4.0, deadline, 100)
}

pub fn avb_flow(id: u64, src: &str, dst: &str, bandwidth: f64) -> AvbFlow {
    AvbFlow::new(FlowId(id), NodeId::new(src), NodeId::new(dst), bandwidth, 50.0)
}
