use std::sync::atomic::{AtomicBool, Ordering};

use crate::domain::evaluator::{BatchEvaluator, EncodedBatch, EvaluatorError, SequentialEvaluator};
use crate::domain::matrix::ResourceMatrix;

/// Runs a primary backend and substitutes the sequential backend when it fails.
///
/// Only backend failures trigger the substitution. A batch the primary rejects as
/// malformed is rejected by every backend, so that error is returned as is.
///
/// [`BatchEvaluator::name`] reports the backend that served the most recent batch.
#[derive(Debug)]
pub struct FallbackEvaluator {
    primary: Box<dyn BatchEvaluator>,
    fallback: SequentialEvaluator,
    served_by_fallback: AtomicBool,
}

impl FallbackEvaluator {
    pub fn new(primary: Box<dyn BatchEvaluator>) -> Self {
        Self { primary, fallback: SequentialEvaluator::new(), served_by_fallback: AtomicBool::new(false) }
    }
}

impl BatchEvaluator for FallbackEvaluator {
    fn name(&self) -> &'static str {
        if self.served_by_fallback.load(Ordering::Relaxed) { self.fallback.name() } else { self.primary.name() }
    }

    fn batch_check(&self, matrix: &ResourceMatrix, batch: &EncodedBatch, sliding_window: usize) -> Result<Vec<bool>, EvaluatorError> {
        match self.primary.batch_check(matrix, batch, sliding_window) {
            Ok(results) => {
                self.served_by_fallback.store(false, Ordering::Relaxed);
                Ok(results)
            }
            Err(e @ EvaluatorError::LinkOutOfRange { .. }) => {
                self.served_by_fallback.store(false, Ordering::Relaxed);
                Err(e)
            }
            Err(e) => {
                log::warn!("EvaluatorFallback: {} backend failed ({}). Falling back to {} backend.", self.primary.name(), e, self.fallback.name());
                self.served_by_fallback.store(true, Ordering::Relaxed);
                self.fallback.batch_check(matrix, batch, sliding_window)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::matrix::QueueBlock;
    use crate::domain::utils::id::LinkId;

    #[derive(Debug)]
    struct FixedOutcome(Result<Vec<bool>, EvaluatorError>);

    impl BatchEvaluator for FixedOutcome {
        fn name(&self) -> &'static str {
            "fixed"
        }

        fn batch_check(&self, _matrix: &ResourceMatrix, _batch: &EncodedBatch, _sliding_window: usize) -> Result<Vec<bool>, EvaluatorError> {
            self.0.clone()
        }
    }

    fn saturated_matrix() -> ResourceMatrix {
        let mut matrix = ResourceMatrix::new(1, 1, 0, 1);
        matrix.occupy_first_free(LinkId(0), 0, QueueBlock::Elastic);
        matrix
    }

    #[test]
    fn test_worker_failure_is_served_by_sequential_backend() {
        let matrix = saturated_matrix();
        let batch = EncodedBatch::from_link_paths(&[vec![LinkId(0)], vec![]], 4);
        let evaluator = FallbackEvaluator::new(Box::new(FixedOutcome(Err(EvaluatorError::WorkerPanicked("lost".to_string())))));

        assert_eq!(evaluator.name(), "fixed");
        assert_eq!(evaluator.batch_check(&matrix, &batch, 1), SequentialEvaluator::new().batch_check(&matrix, &batch, 1));
        assert_eq!(evaluator.name(), "sequential");
    }

    #[test]
    fn test_unknown_link_is_returned_without_fallback() {
        let matrix = saturated_matrix();
        let batch = EncodedBatch::from_link_paths(&[vec![LinkId(5)]], 4);
        let error = EvaluatorError::LinkOutOfRange { flow: 0, link: LinkId(5), links: 1 };
        let evaluator = FallbackEvaluator::new(Box::new(FixedOutcome(Err(error.clone()))));

        assert_eq!(evaluator.batch_check(&matrix, &batch, 1), Err(error));
        assert_eq!(evaluator.name(), "fixed");
    }

    #[test]
    fn test_successful_primary_keeps_its_name() {
        let matrix = saturated_matrix();
        let batch = EncodedBatch::from_link_paths(&[vec![LinkId(0)]], 4);
        let evaluator = FallbackEvaluator::new(Box::new(FixedOutcome(Ok(vec![true]))));

        assert_eq!(evaluator.batch_check(&matrix, &batch, 1), Ok(vec![true]));
        assert_eq!(evaluator.name(), "fixed");
    }
}
