use std::fmt;
use uuid::Uuid;

use crate::domain::config::SchedulerConfig;
use crate::domain::evaluator::{BatchEvaluator, select_evaluator};
use crate::domain::flow::{AvbFlow, AvbFlowState, TrafficSet, TtFlow, TtFlowState};
use crate::domain::matrix::{QueueBlock, ResourceMatrix};
use crate::domain::scheduler::{AvbScheduler, CycleAdjustment, TtScheduler};
use crate::domain::topology::NetworkTopology;
use crate::domain::utils::statistics::{StatParameter, StatisticEvent, StatsCollector};
use crate::error::Result;

/// Admission outcome of one traffic class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ClassReport {
    pub total: usize,
    pub admitted: usize,

    /// Flows rejected because no path exists.
    pub path_failed: usize,

    /// Flows with a path that were rejected by the deadline program (TT) or the
    /// conflict check (AVB).
    pub rejected: usize,

    /// Hops of admitted flows that did not get a queue.
    pub unplaced_hops: usize,
}

impl ClassReport {
    /// Admitted share in percent. An empty class reports 0.
    pub fn success_rate(&self) -> f64 {
        if self.total == 0 { 0.0 } else { self.admitted as f64 / self.total as f64 * 100.0 }
    }

    fn from_tt(flows: &[TtFlow]) -> Self {
        let mut report = ClassReport { total: flows.len(), ..ClassReport::default() };
        for flow in flows {
            match flow.state {
                TtFlowState::Reserved => {
                    report.admitted += 1;
                    report.unplaced_hops += flow.unplaced_hops();
                }
                TtFlowState::PathFailed => report.path_failed += 1,
                TtFlowState::Infeasible => report.rejected += 1,
                _ => {}
            }
        }
        report
    }

    fn from_avb(flows: &[AvbFlow]) -> Self {
        let mut report = ClassReport { total: flows.len(), ..ClassReport::default() };
        for flow in flows {
            match flow.state {
                AvbFlowState::Reserved => {
                    report.admitted += 1;
                    report.unplaced_hops += flow.unplaced_hops();
                }
                AvbFlowState::PathFailed => report.path_failed += 1,
                AvbFlowState::Conflicted => report.rejected += 1,
                _ => {}
            }
        }
        report
    }
}

/// Summary of one [`SchedulingRun::execute`] call.
#[derive(Debug, Clone, PartialEq)]
pub struct RunReport {
    pub run_id: Uuid,
    pub tt: ClassReport,
    pub avb: ClassReport,

    /// Name of the batch evaluator that served the AVB phase.
    pub evaluator: &'static str,

    /// AVB cycle length after the control step of this execution.
    pub cycle_length: f64,
    pub cycle_adjustment: Option<CycleAdjustment>,

    /// Matrix loads after both phases.
    pub occupancy_load: f64,
    pub fixed_block_load: f64,
    pub elastic_block_load: f64,
}

impl fmt::Display for RunReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Run {}", self.run_id)?;
        writeln!(f, "TT Flow Success Rate:  {}/{} ({:.1}%)", self.tt.admitted, self.tt.total, self.tt.success_rate())?;
        writeln!(f, "AVB Flow Success Rate: {}/{} ({:.1}%)", self.avb.admitted, self.avb.total, self.avb.success_rate())?;
        write!(f, "Cycle length {:.4}ms, load {:.3} (FB {:.3}, EB {:.3})", self.cycle_length, self.occupancy_load, self.fixed_block_load, self.elastic_block_load)
    }
}

/// One scheduling run over a fixed topology.
///
/// The run owns the **resource matrix** for its whole lifetime and lends it to the
/// TT scheduler and then to the AVB scheduler, so the two phases never overlap.
/// Repeated calls to [`SchedulingRun::execute`] keep the matrix and the AVB cycle
/// length of earlier calls.
#[derive(Debug)]
pub struct SchedulingRun {
    id: Uuid,
    config: SchedulerConfig,
    topology: NetworkTopology,
    matrix: ResourceMatrix,
    evaluator: Box<dyn BatchEvaluator>,
    cycle_length: f64,
    stats: Option<StatsCollector>,
}

impl SchedulingRun {
    /// Creates a run with the evaluator chosen by [`select_evaluator`].
    pub fn new(config: SchedulerConfig, topology: NetworkTopology) -> Self {
        let evaluator = select_evaluator(&config);
        Self::with_evaluator(config, topology, evaluator)
    }

    pub fn with_evaluator(config: SchedulerConfig, topology: NetworkTopology, evaluator: Box<dyn BatchEvaluator>) -> Self {
        let matrix = ResourceMatrix::from_config(topology.link_count(), &config);

        log::info!(
            "Topology loaded: {} nodes, {} links. Resource matrix initialized with shape {}.",
            topology.node_count(),
            topology.link_count(),
            matrix.shape()
        );

        Self { id: Uuid::new_v4(), cycle_length: config.base_cycle(), config, topology, matrix, evaluator, stats: None }
    }

    /// Records one statistics row per flow decision.
    pub fn with_statistics(mut self, stats: StatsCollector) -> Self {
        self.id = stats.run_id();
        self.stats = Some(stats);
        self
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn config(&self) -> &SchedulerConfig {
        &self.config
    }

    pub fn topology(&self) -> &NetworkTopology {
        &self.topology
    }

    pub fn matrix(&self) -> &ResourceMatrix {
        &self.matrix
    }

    pub fn cycle_length(&self) -> f64 {
        self.cycle_length
    }

    /// Schedules all TT flows, then all AVB flows, and reports the outcome.
    ///
    /// Flow states, paths, offsets and reservations are written back into `traffic`.
    pub fn execute(&mut self, traffic: &mut TrafficSet) -> Result<RunReport> {
        let mut tt_scheduler = TtScheduler::new(&self.topology, &self.config);
        tt_scheduler.schedule_flows(&mut traffic.tt, &mut self.matrix);

        let mut avb_scheduler = AvbScheduler::with_evaluator(&self.topology, &self.config, self.evaluator.as_ref()).with_cycle_length(self.cycle_length);
        avb_scheduler.schedule_flows(&mut traffic.avb, &mut self.matrix)?;

        self.cycle_length = avb_scheduler.current_cycle_length();
        let cycle_adjustment = avb_scheduler.last_adjustment();

        self.record_statistics(traffic);

        let report = RunReport {
            run_id: self.id,
            tt: ClassReport::from_tt(&traffic.tt),
            avb: ClassReport::from_avb(&traffic.avb),
            evaluator: self.evaluator.name(),
            cycle_length: self.cycle_length,
            cycle_adjustment,
            occupancy_load: self.matrix.occupancy_load(),
            fixed_block_load: self.matrix.block_load(QueueBlock::Fixed),
            elastic_block_load: self.matrix.block_load(QueueBlock::Elastic),
        };

        if report.tt.unplaced_hops + report.avb.unplaced_hops > 0 {
            log::warn!(
                "UnplacedHops: {} TT hops and {} AVB hops of admitted flows hold no queue.",
                report.tt.unplaced_hops,
                report.avb.unplaced_hops
            );
        }

        Ok(report)
    }

    fn record_statistics(&self, traffic: &TrafficSet) {
        let Some(stats) = &self.stats else {
            return;
        };

        for flow in &traffic.tt {
            let mut event = StatisticEvent::new();
            event
                .set(StatParameter::LogDescription, "TT admission decision")
                .set(StatParameter::TrafficClass, "TT")
                .set(StatParameter::FlowId, flow.id.0)
                .set(StatParameter::Source, flow.source.as_str())
                .set(StatParameter::Destination, flow.destination.as_str())
                .set(StatParameter::FlowState, format!("{:?}", flow.state))
                .set(StatParameter::Demand, flow.period)
                .set(StatParameter::Deadline, flow.deadline)
                .set(StatParameter::UnplacedHops, flow.unplaced_hops());

            if let Some(path) = &flow.path {
                event.set(StatParameter::HopCount, path.hop_count()).set(StatParameter::PropagationDelay, path.propagation_delay);
            }
            if let Some(offset) = flow.scheduled_offset {
                event.set(StatParameter::Offset, offset);
            }

            stats.add_event(event);
        }

        for flow in &traffic.avb {
            let mut event = StatisticEvent::new();
            event
                .set(StatParameter::LogDescription, "AVB admission decision")
                .set(StatParameter::TrafficClass, "AVB")
                .set(StatParameter::FlowId, flow.id.0)
                .set(StatParameter::Source, flow.source.as_str())
                .set(StatParameter::Destination, flow.destination.as_str())
                .set(StatParameter::FlowState, format!("{:?}", flow.state))
                .set(StatParameter::Demand, flow.bandwidth)
                .set(StatParameter::Deadline, flow.deadline)
                .set(StatParameter::UnplacedHops, flow.unplaced_hops())
                .set(StatParameter::CycleLength, self.cycle_length);

            if let Some(path) = &flow.path {
                event.set(StatParameter::HopCount, path.hop_count()).set(StatParameter::PropagationDelay, path.propagation_delay);
            }

            stats.add_event(event);
        }

        stats.flush();
    }
}
