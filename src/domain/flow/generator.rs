use rand::rngs::StdRng;
use rand::seq::IndexedRandom;
use rand::{Rng, SeedableRng};

use crate::domain::flow::flow::{AvbFlow, TrafficSet, TtFlow};
use crate::domain::topology::NetworkTopology;
use crate::domain::utils::id::{FlowId, NodeId};
use crate::error::{Error, Result};

/// Candidate TT periods in ms.
const TT_PERIODS: [f64; 4] = [4.0, 8.0, 16.0, 32.0];

/// TT deadlines are drawn uniformly from this range, in ms.
const TT_DEADLINE_RANGE: std::ops::Range<f64> = 5.0..15.0;

/// TT payload in bytes.
const TT_PAYLOAD_SIZE: u32 = 100;

/// Candidate AVB bandwidths in Mbps.
const AVB_BANDWIDTHS: [f64; 3] = [10.0, 20.0, 50.0];

/// Relaxed AVB deadline in ms.
const AVB_DEADLINE: f64 = 50.0;

/// Seeded generator of synthetic hybrid traffic between host nodes.
///
/// TT flows receive ids `0..n_tt`, AVB flows `n_tt..n_tt + n_avb`. The same seed
/// over the same topology always yields the same traffic set.
#[derive(Debug, Clone)]
pub struct TrafficGenerator {
    rng: StdRng,
}

impl TrafficGenerator {
    pub fn new(seed: u64) -> Self {
        Self { rng: StdRng::seed_from_u64(seed) }
    }

    pub fn generate(&mut self, topology: &NetworkTopology, n_tt: usize, n_avb: usize) -> Result<TrafficSet> {
        let hosts = topology.host_nodes();

        if hosts.len() < 2 {
            return Err(Error::TrafficConstructionError(format!("traffic needs at least two host nodes, topology has {}", hosts.len())));
        }

        let mut traffic = TrafficSet::default();

        for i in 0..n_tt {
            let (source, destination) = self.pick_endpoints(&hosts);
            let period = *TT_PERIODS.choose(&mut self.rng).unwrap_or(&TT_PERIODS[0]);
            let deadline = self.rng.random_range(TT_DEADLINE_RANGE);

            traffic.tt.push(TtFlow::new(FlowId(i as u64), source, destination, period, deadline, TT_PAYLOAD_SIZE));
        }

        for i in 0..n_avb {
            let (source, destination) = self.pick_endpoints(&hosts);
            let bandwidth = *AVB_BANDWIDTHS.choose(&mut self.rng).unwrap_or(&AVB_BANDWIDTHS[0]);

            traffic.avb.push(AvbFlow::new(FlowId((n_tt + i) as u64), source, destination, bandwidth, AVB_DEADLINE));
        }

        log::info!("Traffic generated: {} TT flows, {} AVB flows over {} hosts.", traffic.tt.len(), traffic.avb.len(), hosts.len());

        Ok(traffic)
    }

    /// Draws two distinct hosts.
    fn pick_endpoints(&mut self, hosts: &[NodeId]) -> (NodeId, NodeId) {
        let picked = rand::seq::index::sample(&mut self.rng, hosts.len(), 2);
        (hosts[picked.index(0)].clone(), hosts[picked.index(1)].clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generation_is_reproducible_for_a_seed() {
        let topology = NetworkTopology::internet2().unwrap();

        let first = TrafficGenerator::new(7).generate(&topology, 20, 30).unwrap();
        let second = TrafficGenerator::new(7).generate(&topology, 20, 30).unwrap();

        let deadlines = |traffic: &TrafficSet| traffic.tt.iter().map(|flow| flow.deadline).collect::<Vec<_>>();
        assert_eq!(deadlines(&first), deadlines(&second));
        assert_eq!(
            first.avb.iter().map(|flow| (flow.source.clone(), flow.destination.clone())).collect::<Vec<_>>(),
            second.avb.iter().map(|flow| (flow.source.clone(), flow.destination.clone())).collect::<Vec<_>>()
        );
    }

    #[test]
    fn test_generated_flows_respect_value_ranges() {
        let topology = NetworkTopology::internet2().unwrap();
        let traffic = TrafficGenerator::new(1).generate(&topology, 50, 50).unwrap();

        for (i, flow) in traffic.tt.iter().enumerate() {
            assert_eq!(flow.id, FlowId(i as u64));
            assert_ne!(flow.source, flow.destination);
            assert!(TT_PERIODS.contains(&flow.period));
            assert!(TT_DEADLINE_RANGE.contains(&flow.deadline));
        }

        for (i, flow) in traffic.avb.iter().enumerate() {
            assert_eq!(flow.id, FlowId(50 + i as u64));
            assert_ne!(flow.source, flow.destination);
            assert!(AVB_BANDWIDTHS.contains(&flow.bandwidth));
        }
    }

    #[test]
    fn test_generation_needs_two_hosts() {
        let topology = NetworkTopology::new();

        assert!(TrafficGenerator::new(0).generate(&topology, 1, 1).is_err());
    }
}
