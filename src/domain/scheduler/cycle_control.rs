use std::fmt;

use crate::domain::config::SchedulerConfig;

/// Direction of a cycle length change, before clamping.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleAction {
    Expand,
    Compress,
    Hold,
}

impl fmt::Display for CycleAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CycleAction::Expand => write!(f, "expand"),
            CycleAction::Compress => write!(f, "compress"),
            CycleAction::Hold => write!(f, "hold"),
        }
    }
}

/// Record of one execution of the cycle control loop.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CycleAdjustment {
    /// Matrix occupancy the decision was based on.
    pub load: f64,
    pub previous: f64,
    pub next: f64,
    pub action: CycleAction,
}

/// Computes the cycle length that follows `current` under the observed `load`.
///
/// Heavy load expands the cycle by `1 + expansion_factor`, light load compresses it by
/// `1 - expansion_factor`. The result is always clamped to
/// `[min_cycle_length, max_cycle_length]`, even when the action is `Hold`.
pub fn next_cycle_length(current: f64, load: f64, config: &SchedulerConfig) -> CycleAdjustment {
    let (action, scaled) = if load >= config.load_threshold_heavy() {
        (CycleAction::Expand, current * (1.0 + config.expansion_factor()))
    } else if load <= config.load_threshold_light() {
        (CycleAction::Compress, current * (1.0 - config.expansion_factor()))
    } else {
        (CycleAction::Hold, current)
    };

    let next = scaled.clamp(config.min_cycle_length(), config.max_cycle_length());

    CycleAdjustment { load, previous: current, next, action }
}
