use crate::domain::config::SchedulerConfig;
use crate::domain::flow::{TtFlow, TtFlowState};
use crate::domain::matrix::ResourceMatrix;
use crate::domain::scheduler::integer_program::{ClosedFormSolver, IntegerProgramSolver, SingleVariableProgram, SolveStatus};
use crate::domain::scheduler::reservation::reserve_fixed_blocks;
use crate::domain::topology::NetworkTopology;
use crate::domain::utils::id::FlowId;

/// Deterministic admission of time-triggered flows into the fixed block.
///
/// Flows are processed in ascending deadline order. For every flow the scheduler
/// 1. resolves the delay-weighted shortest path,
/// 2. solves for the smallest **transmission offset** `φ ∈ [0, max_cycles]` with
///    `φ × base_cycle + propagation_delay ≤ deadline`,
/// 3. reserves one fixed-block queue per hop starting at cycle `φ`.
///
/// A hop whose fixed block is already full stays unplaced; the flow is still
/// counted as reserved.
#[derive(Debug)]
pub struct TtScheduler<'a> {
    topology: &'a NetworkTopology,
    config: &'a SchedulerConfig,
    solver: Box<dyn IntegerProgramSolver + 'a>,

    /// Ids of reserved flows in admission order.
    scheduled_flows: Vec<FlowId>,
}

impl<'a> TtScheduler<'a> {
    pub fn new(topology: &'a NetworkTopology, config: &'a SchedulerConfig) -> Self {
        Self::with_solver(topology, config, Box::new(ClosedFormSolver))
    }

    pub fn with_solver(topology: &'a NetworkTopology, config: &'a SchedulerConfig, solver: Box<dyn IntegerProgramSolver + 'a>) -> Self {
        Self { topology, config, solver, scheduled_flows: Vec::new() }
    }

    pub fn scheduled_flows(&self) -> &[FlowId] {
        &self.scheduled_flows
    }

    /// Admits the batch and returns the number of reserved flows.
    ///
    /// `flows` is reordered by deadline in place; equal deadlines keep their relative order.
    pub fn schedule_flows(&mut self, flows: &mut [TtFlow], matrix: &mut ResourceMatrix) -> usize {
        log::info!("Scheduling {} TT flows.", flows.len());

        flows.sort_by(|a, b| a.deadline.total_cmp(&b.deadline));

        let mut reserved = 0;
        for flow in flows.iter_mut() {
            if self.schedule_flow(flow, matrix) {
                self.scheduled_flows.push(flow.id);
                reserved += 1;
            }
        }

        log::info!("TT admission finished: {}/{} flows reserved.", reserved, flows.len());

        reserved
    }

    fn schedule_flow(&self, flow: &mut TtFlow, matrix: &mut ResourceMatrix) -> bool {
        let path = match self.topology.shortest_path(&flow.source, &flow.destination) {
            Ok(path) => path,
            Err(e) => {
                log::debug!("TtPathUnreachable: {} skipped, {}.", flow.id, e);
                flow.state = TtFlowState::PathFailed;
                return false;
            }
        };

        flow.state = TtFlowState::PathFound;

        let program = SingleVariableProgram {
            name: format!("TT_Flow_{}", flow.id.0),
            lower: 0,
            upper: self.config.max_cycles() as i64,
            objective: 1.0,
            coefficient: self.config.base_cycle(),
            constant: path.propagation_delay,
            rhs: flow.deadline,
        };

        let offset = match self.solver.solve(&program) {
            SolveStatus::Optimal(offset) => offset.max(0) as u64,
            SolveStatus::Infeasible => {
                log::debug!(
                    "TtDeadlineInfeasible: {} needs {:.3}ms of propagation delay but has a deadline of {:.3}ms.",
                    flow.id,
                    path.propagation_delay,
                    flow.deadline
                );
                flow.state = TtFlowState::Infeasible;
                return false;
            }
        };

        flow.scheduled_offset = Some(offset);
        flow.state = TtFlowState::Admitted;

        flow.reservations = reserve_fixed_blocks(matrix, &path.links, offset);
        flow.path = Some(path);
        flow.state = TtFlowState::Reserved;

        let unplaced = flow.unplaced_hops();
        if unplaced > 0 {
            log::warn!("TtHopsUnplaced: {} was admitted with {} of {} hops without a fixed-block queue.", flow.id, unplaced, flow.reservations.len());
        } else {
            log::trace!("{} reserved at offset {} over {} hops.", flow.id, offset, flow.reservations.len());
        }

        true
    }
}
