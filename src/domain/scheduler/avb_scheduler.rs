use crate::domain::config::{CommitPolicy, SchedulerConfig};
use crate::domain::evaluator::{BatchEvaluator, EncodedBatch, EvaluatorError, SequentialEvaluator};
use crate::domain::flow::{AvbFlow, AvbFlowState};
use crate::domain::matrix::ResourceMatrix;
use crate::domain::scheduler::cycle_control::{CycleAdjustment, next_cycle_length};
use crate::domain::scheduler::reservation::reserve_elastic_blocks;
use crate::domain::topology::NetworkTopology;

static SEQUENTIAL: SequentialEvaluator = SequentialEvaluator;

/// Batch admission of AVB flows into the elastic block.
///
/// Every call to [`AvbScheduler::schedule_flows`] runs one **cycle control** step,
/// resolves all paths, checks the whole batch for conflicts against a single matrix
/// snapshot and then commits the accepted flows in their original order.
///
/// The batch check is only as fresh as the snapshot. Under [`CommitPolicy::Advisory`]
/// a flow accepted by the check is committed even when an earlier flow of the same
/// batch used up the capacity it was checked against; its hops may end up unplaced.
/// [`CommitPolicy::Revalidate`] re-checks every flow against the live matrix first.
#[derive(Debug)]
pub struct AvbScheduler<'a> {
    topology: &'a NetworkTopology,
    config: &'a SchedulerConfig,
    evaluator: &'a dyn BatchEvaluator,

    /// Cycle length in ms, persisted across calls.
    current_cycle: f64,
    last_adjustment: Option<CycleAdjustment>,
}

impl<'a> AvbScheduler<'a> {
    /// Creates a scheduler that checks batches with the sequential backend.
    pub fn new(topology: &'a NetworkTopology, config: &'a SchedulerConfig) -> Self {
        Self::with_evaluator(topology, config, &SEQUENTIAL)
    }

    pub fn with_evaluator(topology: &'a NetworkTopology, config: &'a SchedulerConfig, evaluator: &'a dyn BatchEvaluator) -> Self {
        Self { topology, config, evaluator, current_cycle: config.base_cycle(), last_adjustment: None }
    }

    /// Continues from a cycle length reached by an earlier scheduler of the same run.
    pub fn with_cycle_length(mut self, cycle_length: f64) -> Self {
        self.current_cycle = cycle_length;
        self
    }

    pub fn current_cycle_length(&self) -> f64 {
        self.current_cycle
    }

    pub fn last_adjustment(&self) -> Option<CycleAdjustment> {
        self.last_adjustment
    }

    pub fn evaluator_name(&self) -> &'static str {
        self.evaluator.name()
    }

    /// Runs one step of the cycle control loop on the current matrix load and returns
    /// the new cycle length. Never writes the matrix.
    pub fn adjust_cycle_length(&mut self, matrix: &ResourceMatrix) -> f64 {
        let adjustment = next_cycle_length(self.current_cycle, matrix.occupancy_load(), self.config);

        log::info!(
            "[Dynamic Scaling] Current Load: {:.2}, Cycle: {:.3}ms -> {:.3}ms ({}).",
            adjustment.load,
            adjustment.previous,
            adjustment.next,
            adjustment.action
        );

        self.current_cycle = adjustment.next;
        self.last_adjustment = Some(adjustment);
        self.current_cycle
    }

    /// Admits the batch and returns the number of reserved flows.
    ///
    /// Fails only if the evaluator rejects the encoded batch; in that case nothing has
    /// been reserved.
    pub fn schedule_flows(&mut self, flows: &mut [AvbFlow], matrix: &mut ResourceMatrix) -> Result<usize, EvaluatorError> {
        log::info!("Scheduling {} AVB flows with the {} evaluator.", flows.len(), self.evaluator.name());

        self.adjust_cycle_length(matrix);

        for flow in flows.iter_mut() {
            self.resolve_path(flow);
        }

        let batch = EncodedBatch::encode(flows.iter().map(|flow| flow.path.as_ref().map(|path| path.links.as_slice())), self.config.max_hops());
        let window = self.config.sliding_window_size();
        let conflicts = self.evaluator.batch_check(matrix, &batch, window)?;

        let mut reserved = 0;
        for (flow, conflict) in flows.iter_mut().zip(conflicts) {
            let Some(path) = &flow.path else {
                continue;
            };

            if conflict {
                log::debug!("AvbConflict: {} rejected by the batch check.", flow.id);
                flow.state = AvbFlowState::Conflicted;
                continue;
            }

            if self.config.commit_policy() == CommitPolicy::Revalidate && SequentialEvaluator::flow_conflicts(matrix, path.links.iter().copied(), window) {
                log::debug!("AvbRevalidationConflict: {} passed the batch check but conflicts with flows committed earlier in the batch.", flow.id);
                flow.state = AvbFlowState::Conflicted;
                continue;
            }

            flow.reservations = reserve_elastic_blocks(matrix, &path.links, window);
            flow.state = AvbFlowState::Reserved;
            reserved += 1;

            let unplaced = flow.unplaced_hops();
            if unplaced > 0 {
                log::warn!("AvbHopsUnplaced: {} was admitted with {} of {} hops without an elastic-block queue.", flow.id, unplaced, flow.reservations.len());
            }
        }

        log::info!("AVB admission finished: {}/{} flows reserved.", reserved, flows.len());

        Ok(reserved)
    }

    fn resolve_path(&self, flow: &mut AvbFlow) {
        flow.bandwidth_slots = AvbFlow::required_slots(flow.bandwidth);

        match self.topology.shortest_path(&flow.source, &flow.destination) {
            Ok(path) => {
                flow.path = Some(path);
                flow.state = AvbFlowState::PathFound;
            }
            Err(e) => {
                log::debug!("AvbPathUnreachable: {} skipped, {}.", flow.id, e);
                flow.path = None;
                flow.state = AvbFlowState::PathFailed;
            }
        }
    }
}
