pub mod flow;
pub mod generator;

pub use flow::{AvbFlow, AvbFlowState, Flow, HopReservation, Placement, TrafficSet, TtFlow, TtFlowState};
pub use generator::TrafficGenerator;
