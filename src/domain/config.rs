use std::ops::Range;

use crate::api::config_dto::SchedulerConfigDto;
use crate::error::ConfigError;

/// Lower clamp bound of the scheduling cycle, relative to the base cycle.
pub const MIN_CYCLE_SCALE: f64 = 0.7;

/// Upper clamp bound of the scheduling cycle, relative to the base cycle.
pub const MAX_CYCLE_SCALE: f64 = 1.3;

/// How the AVB scheduler treats a flow whose batch check passed but whose
/// capacity may have been consumed by an earlier flow of the same batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CommitPolicy {
    /// Commit every flow the batch check accepted. Hops without a free elastic
    /// queue are recorded as unplaced and the flow still counts as admitted.
    #[default]
    Advisory,

    /// Re-run the conflict predicate against the live matrix right before
    /// committing and reject flows that now conflict.
    Revalidate,
}

impl TryFrom<&str> for CommitPolicy {
    type Error = ConfigError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.to_ascii_lowercase().as_str() {
            "advisory" => Ok(CommitPolicy::Advisory),
            "revalidate" => Ok(CommitPolicy::Revalidate),
            other => Err(ConfigError::UnknownCommitPolicy(other.to_string())),
        }
    }
}

/// Validated configuration surface consumed by both schedulers.
///
/// Can only be built through [`SchedulerConfig::try_from`], so every instance
/// satisfies the invariants checked there.
#[derive(Debug, Clone, PartialEq)]
pub struct SchedulerConfig {
    base_cycle: f64,
    hyper_cycle: f64,
    total_queues: usize,
    fixed_queues: usize,
    elastic_queues: usize,
    load_threshold_heavy: f64,
    load_threshold_light: f64,
    expansion_factor: f64,
    sliding_window_size: usize,
    max_hops: usize,
    accelerated_batch_size: usize,
    use_accelerated_evaluator: bool,
    commit_policy: CommitPolicy,
}

impl TryFrom<SchedulerConfigDto> for SchedulerConfig {
    type Error = ConfigError;

    fn try_from(dto: SchedulerConfigDto) -> Result<Self, Self::Error> {
        if !(dto.base_cycle > 0.0) || !dto.base_cycle.is_finite() {
            return Err(ConfigError::NonPositiveBaseCycle(dto.base_cycle));
        }

        if !dto.hyper_cycle.is_finite() || dto.hyper_cycle < dto.base_cycle {
            return Err(ConfigError::HypercycleTooShort { hypercycle: dto.hyper_cycle, base_cycle: dto.base_cycle });
        }

        for (name, count) in [("totalQueues", dto.total_queues), ("fixedQueues", dto.fixed_queues), ("elasticQueues", dto.elastic_queues)] {
            if count == 0 {
                return Err(ConfigError::NonPositiveQueueCount { name });
            }
        }

        if dto.fixed_queues + dto.elastic_queues != dto.total_queues {
            return Err(ConfigError::QueuePartitionMismatch { total: dto.total_queues, fixed: dto.fixed_queues, elastic: dto.elastic_queues });
        }

        for (name, value) in [("loadThresholdHeavy", dto.load_threshold_heavy), ("loadThresholdLight", dto.load_threshold_light)] {
            if !(0.0..=1.0).contains(&value) {
                return Err(ConfigError::ThresholdOutOfRange { name, value });
            }
        }

        if dto.load_threshold_light > dto.load_threshold_heavy {
            return Err(ConfigError::ThresholdsInverted { light: dto.load_threshold_light, heavy: dto.load_threshold_heavy });
        }

        // A factor of 1.0 or more would drive the compressed cycle to zero or below.
        if !(0.0..1.0).contains(&dto.expansion_factor) {
            return Err(ConfigError::ExpansionFactorOutOfRange(dto.expansion_factor));
        }

        if dto.sliding_window_size == 0 {
            return Err(ConfigError::EmptySlidingWindow);
        }

        if dto.max_hops == 0 {
            return Err(ConfigError::ZeroMaxHops);
        }

        if dto.accelerated_batch_size == 0 {
            return Err(ConfigError::ZeroBatchSize);
        }

        let commit_policy = CommitPolicy::try_from(dto.commit_policy.as_str())?;

        Ok(SchedulerConfig {
            base_cycle: dto.base_cycle,
            hyper_cycle: dto.hyper_cycle,
            total_queues: dto.total_queues,
            fixed_queues: dto.fixed_queues,
            elastic_queues: dto.elastic_queues,
            load_threshold_heavy: dto.load_threshold_heavy,
            load_threshold_light: dto.load_threshold_light,
            expansion_factor: dto.expansion_factor,
            sliding_window_size: dto.sliding_window_size,
            max_hops: dto.max_hops,
            accelerated_batch_size: dto.accelerated_batch_size,
            use_accelerated_evaluator: dto.use_accelerated_evaluator,
            commit_policy,
        })
    }
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        SchedulerConfig {
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
            commit_policy: CommitPolicy::Advisory,
        }
    }
}

impl SchedulerConfig {
    pub fn base_cycle(&self) -> f64 {
        self.base_cycle
    }

    pub fn hyper_cycle(&self) -> f64 {
        self.hyper_cycle
    }

    /// Number of cycle slots in one hypercycle, i.e. the second matrix dimension.
    pub fn cycle_count(&self) -> usize {
        // Division is exact for the usual power-of-two cycle lengths; the epsilon keeps
        // 32.0 / 0.1 from flooring to 319.
        ((self.hyper_cycle / self.base_cycle) + 1e-9).floor() as usize
    }

    /// Upper bound of the TT offset variable.
    pub fn max_cycles(&self) -> u64 {
        self.cycle_count() as u64
    }

    pub fn total_queues(&self) -> usize {
        self.total_queues
    }

    pub fn fixed_queues(&self) -> usize {
        self.fixed_queues
    }

    pub fn elastic_queues(&self) -> usize {
        self.elastic_queues
    }

    pub fn fixed_block(&self) -> Range<usize> {
        0..self.fixed_queues
    }

    pub fn elastic_block(&self) -> Range<usize> {
        self.fixed_queues..self.total_queues
    }

    pub fn load_threshold_heavy(&self) -> f64 {
        self.load_threshold_heavy
    }

    pub fn load_threshold_light(&self) -> f64 {
        self.load_threshold_light
    }

    pub fn expansion_factor(&self) -> f64 {
        self.expansion_factor
    }

    pub fn sliding_window_size(&self) -> usize {
        self.sliding_window_size
    }

    pub fn max_hops(&self) -> usize {
        self.max_hops
    }

    pub fn accelerated_batch_size(&self) -> usize {
        self.accelerated_batch_size
    }

    pub fn use_accelerated_evaluator(&self) -> bool {
        self.use_accelerated_evaluator
    }

    pub fn commit_policy(&self) -> CommitPolicy {
        self.commit_policy
    }

    pub fn min_cycle_length(&self) -> f64 {
        self.base_cycle * MIN_CYCLE_SCALE
    }

    pub fn max_cycle_length(&self) -> f64 {
        self.base_cycle * MAX_CYCLE_SCALE
    }

    /// Returns a copy with the accelerated evaluator switched on or off.
    pub fn with_accelerated_evaluator(mut self, enabled: bool) -> Self {
        self.use_accelerated_evaluator = enabled;
        self
    }

    pub fn with_commit_policy(mut self, commit_policy: CommitPolicy) -> Self {
        self.commit_policy = commit_policy;
        self
    }
}
