//! Batch conflict detection over the elastic block.
//!
//! A batch check answers, for every flow of an AVB batch independently, whether some
//! (hop, cycle) pair inside the sliding window has no free elastic queue left. The check
//! only reads the matrix; it never reserves anything.
//!
//! Two backends implement [`BatchEvaluator`]:
//!
//! - [`ParallelEvaluator`] evaluates flows on a rayon thread pool
//! - [`SequentialEvaluator`] walks the nested window/hop/queue loop on the caller's thread
//!
//! Both must return identical conflict vectors for identical input. [`select_evaluator`]
//! picks the accelerated backend when the host supports it and wraps it in a
//! [`FallbackEvaluator`] so that a runtime failure degrades to the sequential backend.

use std::fmt::Debug;
use thiserror::Error;

use crate::domain::config::SchedulerConfig;
use crate::domain::matrix::ResourceMatrix;
use crate::domain::utils::id::LinkId;

pub mod encoded_batch;
pub mod fallback;
pub mod parallel;
pub mod sequential;

pub use encoded_batch::EncodedBatch;
pub use fallback::FallbackEvaluator;
pub use parallel::ParallelEvaluator;
pub use sequential::SequentialEvaluator;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum EvaluatorError {
    #[error("flow #{flow} references {link}, but the matrix has only {links} links")]
    LinkOutOfRange { flow: usize, link: LinkId, links: usize },

    #[error("accelerated backend unavailable: {0}")]
    Unavailable(String),

    #[error("evaluator worker failed: {0}")]
    WorkerPanicked(String),
}

/// Read-only, per-flow-independent conflict check of an encoded AVB batch.
pub trait BatchEvaluator: Debug + Send + Sync {
    /// Short backend name used in log messages.
    fn name(&self) -> &'static str;

    /// Returns one flag per flow of `batch`, `true` meaning conflict.
    ///
    /// A flow conflicts if there is a window offset `t < sliding_window` and a hop of
    /// its encoded path such that every elastic queue at `(hop, t mod cycle_count)` is
    /// occupied.
    fn batch_check(&self, matrix: &ResourceMatrix, batch: &EncodedBatch, sliding_window: usize) -> Result<Vec<bool>, EvaluatorError>;
}

/// Chooses the evaluator for a run.
///
/// The accelerated backend is used when it is enabled in the configuration and a
/// thread pool with at least two workers can be built; otherwise the sequential
/// backend runs alone.
pub fn select_evaluator(config: &SchedulerConfig) -> Box<dyn BatchEvaluator> {
    if !config.use_accelerated_evaluator() {
        log::info!("Accelerated evaluator disabled by configuration. Using sequential backend.");
        return Box::new(SequentialEvaluator::new());
    }

    match ParallelEvaluator::detect(config.accelerated_batch_size()) {
        Ok(parallel) => {
            log::info!("Accelerated evaluator available ({} threads, batch size {}).", parallel.thread_count(), parallel.batch_size());
            Box::new(FallbackEvaluator::new(Box::new(parallel)))
        }
        Err(e) => {
            log::warn!("AcceleratedEvaluatorUnavailable: {}. Using sequential backend.", e);
            Box::new(SequentialEvaluator::new())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_disabled_acceleration_selects_sequential_backend() {
        let config = SchedulerConfig::default().with_accelerated_evaluator(false);

        assert_eq!(select_evaluator(&config).name(), "sequential");
    }
}
