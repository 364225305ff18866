use serde::{Deserialize, Serialize};

/// Raw configuration surface as read from a JSON file.
///
/// Missing fields fall back to the values of the reference WAN deployment
/// (125 µs base cycle, 32 ms hypercycle, 4 fixed + 4 elastic queues per port).
/// The DTO is not validated; see `SchedulerConfig::try_from`.
#[derive(Debug, Deserialize, Clone, Serialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SchedulerConfigDto {
    /// Base cycle length in ms.
    pub base_cycle: f64,

    /// Hypercycle in ms, the LCM of all flow periods.
    pub hyper_cycle: f64,

    pub total_queues: usize,
    pub fixed_queues: usize,
    pub elastic_queues: usize,

    /// Global load at or above which the scheduling cycle is expanded.
    pub load_threshold_heavy: f64,

    /// Global load at or below which the scheduling cycle is compressed.
    pub load_threshold_light: f64,

    pub expansion_factor: f64,
    pub sliding_window_size: usize,
    pub max_hops: usize,

    /// Number of flows handed to one unit of work of the accelerated evaluator.
    pub accelerated_batch_size: usize,
    pub use_accelerated_evaluator: bool,

    /// Either "advisory" or "revalidate".
    pub commit_policy: String,
}

impl Default for SchedulerConfigDto {
    fn default() -> Self {
        Self {
            base_cycle: 0.125,
            hyper_cycle: 32.0,
            total_queues: 8,
            fixed_queues: 4,
            elastic_queues: 4,
            load_threshold_heavy: 0.7,
            load_threshold_light: 0.3,
            expansion_factor: 0.5,
            sliding_window_size: 4,
            max_hops: 16,
            accelerated_batch_size: 16,
            use_accelerated_evaluator: true,
            commit_policy: "advisory".to_string(),
        }
    }
}
