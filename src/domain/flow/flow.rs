use std::collections::HashSet;

use crate::api::traffic_dto::{AvbFlowDto, FlowDto, TrafficDto, TtFlowDto};
use crate::domain::topology::Path;
use crate::domain::utils::id::{FlowId, LinkId, NodeId};
use crate::error::Error;

/// Bandwidth represented by one elastic slot, in Mbps.
const BANDWIDTH_PER_SLOT: f64 = 10.0;

/// Admission state of a TT flow.
///
/// `Unresolved -> PathFound | PathFailed`, `PathFound -> Admitted | Infeasible`,
/// `Admitted -> Reserved`. `PathFailed`, `Infeasible` and `Reserved` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum TtFlowState {
    #[default]
    Unresolved,
    PathFound,
    PathFailed,
    Admitted,
    Infeasible,
    Reserved,
}

impl TtFlowState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, TtFlowState::PathFailed | TtFlowState::Infeasible | TtFlowState::Reserved)
    }
}

/// Admission state of an AVB flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum AvbFlowState {
    #[default]
    Unresolved,
    PathFound,
    PathFailed,

    /// Rejected by the conflict check (batch check or commit-time re-check).
    Conflicted,
    Reserved,
}

/// The (cycle, queue) cell claimed on a link.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Placement {
    pub cycle: usize,
    pub queue: usize,
}

/// Reservation outcome for one hop of an admitted flow.
///
/// `placement` is `None` when no free queue was found for the hop. The flow still
/// counts as admitted in that case; the hop is "unplaced".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HopReservation {
    pub link: LinkId,
    pub placement: Option<Placement>,
}

impl HopReservation {
    pub fn is_placed(&self) -> bool {
        self.placement.is_some()
    }
}

/// A strictly periodic, deadline-bound flow.
#[derive(Debug, Clone)]
pub struct TtFlow {
    pub id: FlowId,
    pub source: NodeId,
    pub destination: NodeId,

    /// Period in ms.
    pub period: f64,

    /// End-to-end deadline in ms.
    pub deadline: f64,

    /// Payload size in bytes.
    pub payload_size: u32,

    /// Attached once the flow is admitted; stays `None` for infeasible flows.
    pub path: Option<Path>,

    /// Cycle index at which transmission starts. Attached on admission.
    pub scheduled_offset: Option<u64>,

    pub reservations: Vec<HopReservation>,
    pub state: TtFlowState,
}

impl TtFlow {
    pub fn new(id: FlowId, source: NodeId, destination: NodeId, period: f64, deadline: f64, payload_size: u32) -> Self {
        Self {
            id,
            source,
            destination,
            period,
            deadline,
            payload_size,
            path: None,
            scheduled_offset: None,
            reservations: Vec::new(),
            state: TtFlowState::Unresolved,
        }
    }

    pub fn is_reserved(&self) -> bool {
        self.state == TtFlowState::Reserved
    }

    pub fn unplaced_hops(&self) -> usize {
        self.reservations.iter().filter(|hop| !hop.is_placed()).count()
    }
}

/// A bursty flow characterized by its bandwidth demand.
#[derive(Debug, Clone)]
pub struct AvbFlow {
    pub id: FlowId,
    pub source: NodeId,
    pub destination: NodeId,

    /// Bandwidth demand in Mbps.
    pub bandwidth: f64,

    /// Deadline in ms. Carried for reporting; AVB admission does not consult it.
    pub deadline: f64,

    /// `None` until resolved, and after a failed path query.
    pub path: Option<Path>,

    /// Number of elastic slots the bandwidth corresponds to.
    pub bandwidth_slots: u32,

    pub reservations: Vec<HopReservation>,
    pub state: AvbFlowState,
}

impl AvbFlow {
    pub fn new(id: FlowId, source: NodeId, destination: NodeId, bandwidth: f64, deadline: f64) -> Self {
        Self {
            id,
            source,
            destination,
            bandwidth,
            deadline,
            path: None,
            bandwidth_slots: AvbFlow::required_slots(bandwidth),
            reservations: Vec::new(),
            state: AvbFlowState::Unresolved,
        }
    }

    /// `max(1, floor(bandwidth / 10))`.
    pub fn required_slots(bandwidth: f64) -> u32 {
        let slots = (bandwidth / BANDWIDTH_PER_SLOT).floor();
        if slots.is_nan() || slots < 1.0 { 1 } else { slots as u32 }
    }

    pub fn is_reserved(&self) -> bool {
        self.state == AvbFlowState::Reserved
    }

    pub fn has_path(&self) -> bool {
        self.path.is_some()
    }

    pub fn unplaced_hops(&self) -> usize {
        self.reservations.iter().filter(|hop| !hop.is_placed()).count()
    }
}

/// A flow of either traffic class.
#[derive(Debug, Clone)]
pub enum Flow {
    Tt(TtFlow),
    Avb(AvbFlow),
}

impl Flow {
    pub fn id(&self) -> FlowId {
        match self {
            Flow::Tt(flow) => flow.id,
            Flow::Avb(flow) => flow.id,
        }
    }

    pub fn source(&self) -> &NodeId {
        match self {
            Flow::Tt(flow) => &flow.source,
            Flow::Avb(flow) => &flow.source,
        }
    }

    pub fn destination(&self) -> &NodeId {
        match self {
            Flow::Tt(flow) => &flow.destination,
            Flow::Avb(flow) => &flow.destination,
        }
    }

    pub fn deadline(&self) -> f64 {
        match self {
            Flow::Tt(flow) => flow.deadline,
            Flow::Avb(flow) => flow.deadline,
        }
    }

    pub fn is_admitted(&self) -> bool {
        match self {
            Flow::Tt(flow) => flow.is_reserved(),
            Flow::Avb(flow) => flow.is_reserved(),
        }
    }
}

impl From<TtFlowDto> for TtFlow {
    fn from(dto: TtFlowDto) -> Self {
        TtFlow::new(FlowId(dto.id), NodeId::new(dto.src), NodeId::new(dto.dst), dto.period, dto.deadline, dto.size)
    }
}

impl From<AvbFlowDto> for AvbFlow {
    fn from(dto: AvbFlowDto) -> Self {
        AvbFlow::new(FlowId(dto.id), NodeId::new(dto.src), NodeId::new(dto.dst), dto.bandwidth, dto.deadline)
    }
}

impl From<FlowDto> for Flow {
    fn from(dto: FlowDto) -> Self {
        match dto {
            FlowDto::Tt(tt) => Flow::Tt(tt.into()),
            FlowDto::Avb(avb) => Flow::Avb(avb.into()),
        }
    }
}

/// The two flow collections of one run, each in generation order.
///
/// Generation order is the tie-break basis of the TT deadline sort and the
/// commit order of the AVB batch.
#[derive(Debug, Clone, Default)]
pub struct TrafficSet {
    pub tt: Vec<TtFlow>,
    pub avb: Vec<AvbFlow>,
}

impl TrafficSet {
    pub fn len(&self) -> usize {
        self.tt.len() + self.avb.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tt.is_empty() && self.avb.is_empty()
    }

    /// Splits a mixed flow list into the two classes, keeping relative order.
    pub fn from_flows(flows: impl IntoIterator<Item = Flow>) -> Result<Self, Error> {
        let mut seen: HashSet<FlowId> = HashSet::new();
        let mut traffic = TrafficSet::default();

        for flow in flows {
            if !seen.insert(flow.id()) {
                return Err(Error::TrafficConstructionError(format!("flow id {} is not unique", flow.id())));
            }

            match flow {
                Flow::Tt(tt) => traffic.tt.push(tt),
                Flow::Avb(avb) => traffic.avb.push(avb),
            }
        }

        Ok(traffic)
    }
}

impl TryFrom<TrafficDto> for TrafficSet {
    type Error = Error;

    fn try_from(dto: TrafficDto) -> Result<Self, Self::Error> {
        TrafficSet::from_flows(dto.flows.into_iter().map(Flow::from))
    }
}
