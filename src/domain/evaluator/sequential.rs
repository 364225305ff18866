use crate::domain::evaluator::{BatchEvaluator, EncodedBatch, EvaluatorError};
use crate::domain::matrix::{CellState, QueueBlock, ResourceMatrix};
use crate::domain::utils::id::LinkId;

/// Evaluates the conflict predicate flow by flow on the calling thread.
///
/// Always available. Serves as the reference semantics for the accelerated backend.
#[derive(Debug, Clone, Copy, Default)]
pub struct SequentialEvaluator;

impl SequentialEvaluator {
    pub fn new() -> Self {
        SequentialEvaluator
    }

    /// Conflict predicate for a single flow path against the current matrix state.
    ///
    /// Also used by the AVB scheduler to re-check a flow right before committing it.
    pub fn flow_conflicts(matrix: &ResourceMatrix, path: impl Iterator<Item = LinkId> + Clone, sliding_window: usize) -> bool {
        let cycle_count = matrix.cycle_count();
        if cycle_count == 0 {
            return false;
        }

        let elastic = matrix.block_range(QueueBlock::Elastic);

        for t in 0..sliding_window {
            let cycle_index = t % cycle_count;

            for link in path.clone() {
                let Some(row) = matrix.queues(link, cycle_index) else {
                    continue;
                };

                let mut is_link_full = true;
                for queue in elastic.clone() {
                    if row[queue] == CellState::Free {
                        is_link_full = false;
                        break;
                    }
                }

                if is_link_full {
                    return true;
                }
            }
        }

        false
    }
}

impl BatchEvaluator for SequentialEvaluator {
    fn name(&self) -> &'static str {
        "sequential"
    }

    fn batch_check(&self, matrix: &ResourceMatrix, batch: &EncodedBatch, sliding_window: usize) -> Result<Vec<bool>, EvaluatorError> {
        batch.validate_against(matrix)?;

        let results = (0..batch.len()).map(|flow| SequentialEvaluator::flow_conflicts(matrix, batch.path(flow), sliding_window)).collect();

        Ok(results)
    }
}
