use thiserror::Error;

use crate::domain::evaluator::EvaluatorError;
use crate::domain::topology::TopologyError;

#[derive(Debug, Error)]
pub enum Error {
    #[error("File not found or could not be read: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Failed to parse JSON input: {0}")]
    DeserializationError(#[from] serde_json::Error),

    #[error("Invalid scheduler configuration: {0}")]
    ConfigError(#[from] ConfigError),

    #[error("Failed to build network topology: {0}")]
    TopologyError(#[from] TopologyError),

    #[error("Batch conflict evaluation failed: {0}")]
    EvaluatorError(#[from] EvaluatorError),

    #[error("Failed to build traffic set: {0}")]
    TrafficConstructionError(String),
}

/// Validation failures of the configuration surface.
///
/// All of them are fatal and are raised before any flow is scheduled.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("base cycle length must be positive, got {0}")]
    NonPositiveBaseCycle(f64),

    #[error("hypercycle length {hypercycle} must cover at least one base cycle of {base_cycle}")]
    HypercycleTooShort { hypercycle: f64, base_cycle: f64 },

    #[error("queue count '{name}' must be positive")]
    NonPositiveQueueCount { name: &'static str },

    #[error("fixed ({fixed}) + elastic ({elastic}) queues must equal total queues ({total})")]
    QueuePartitionMismatch { total: usize, fixed: usize, elastic: usize },

    #[error("load threshold '{name}' must lie in [0, 1], got {value}")]
    ThresholdOutOfRange { name: &'static str, value: f64 },

    #[error("light load threshold {light} must not exceed heavy load threshold {heavy}")]
    ThresholdsInverted { light: f64, heavy: f64 },

    #[error("expansion factor must lie in [0, 1), got {0}")]
    ExpansionFactorOutOfRange(f64),

    #[error("sliding window size must be positive")]
    EmptySlidingWindow,

    #[error("max hops must be positive")]
    ZeroMaxHops,

    #[error("accelerated batch size must be positive")]
    ZeroBatchSize,

    #[error("unknown commit policy '{0}', expected 'advisory' or 'revalidate'")]
    UnknownCommitPolicy(String),
}

pub type Result<T> = std::result::Result<T, Error>;
