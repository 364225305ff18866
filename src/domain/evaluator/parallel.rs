use rayon::prelude::*;
use std::any::Any;
use std::panic::{self, AssertUnwindSafe};

use crate::domain::evaluator::encoded_batch::decode_row;
use crate::domain::evaluator::{BatchEvaluator, EncodedBatch, EvaluatorError};
use crate::domain::matrix::{CellState, QueueBlock, ResourceMatrix};

/// Minimum number of hardware threads for the accelerated backend to be worthwhile.
const MIN_ACCELERATED_THREADS: usize = 2;

/// Data-parallel conflict check on a dedicated rayon pool.
///
/// Evaluation runs in two passes over the shared, read-only matrix:
/// 1. an elastic saturation table with one entry per (link, cycle) pair, built in parallel
///    over matrix rows;
/// 2. the per-flow predicate, evaluated in parallel units of `batch_size` flows by table lookup.
///
/// No unit of work writes shared state, so the passes need no synchronization.
#[derive(Debug)]
pub struct ParallelEvaluator {
    pool: rayon::ThreadPool,
    batch_size: usize,
}

impl ParallelEvaluator {
    /// Builds an evaluator backed by a pool of `threads` workers.
    pub fn new(threads: usize, batch_size: usize) -> Result<Self, EvaluatorError> {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .thread_name(|i| format!("csqf-eval-{}", i))
            .build()
            .map_err(|e| EvaluatorError::Unavailable(e.to_string()))?;

        Ok(Self { pool, batch_size: batch_size.max(1) })
    }

    /// Builds an evaluator sized to the host, or reports why the host cannot run one.
    pub fn detect(batch_size: usize) -> Result<Self, EvaluatorError> {
        let threads = std::thread::available_parallelism().map(|n| n.get()).map_err(|e| EvaluatorError::Unavailable(e.to_string()))?;

        if threads < MIN_ACCELERATED_THREADS {
            return Err(EvaluatorError::Unavailable(format!("only {} hardware thread available", threads)));
        }

        Self::new(threads, batch_size)
    }

    pub fn thread_count(&self) -> usize {
        self.pool.current_num_threads()
    }

    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    fn evaluate(&self, matrix: &ResourceMatrix, batch: &EncodedBatch, sliding_window: usize) -> Vec<bool> {
        let cycle_count = matrix.cycle_count();
        if cycle_count == 0 {
            return vec![false; batch.len()];
        }

        // t mod cycle_count for t < window visits exactly the first min(window, cycle_count) cycles.
        let window_cycles = sliding_window.min(cycle_count);
        let elastic = matrix.block_range(QueueBlock::Elastic);

        self.pool.install(|| {
            // An empty elastic block has no free queue, so every row counts as saturated.
            let saturated: Vec<bool> = if elastic.is_empty() {
                vec![true; matrix.link_count() * cycle_count]
            } else {
                matrix
                    .cells()
                    .par_chunks(matrix.queue_count())
                    .map(|row| row[elastic.clone()].iter().all(|cell| *cell == CellState::Occupied))
                    .collect()
            };

            let units: Vec<Vec<bool>> = batch
                .rows()
                .par_chunks(batch.row_width() * self.batch_size)
                .map(|unit| {
                    unit.chunks(batch.row_width())
                        .map(|row| decode_row(row).any(|link| (0..window_cycles).any(|cycle| saturated[link.index() * cycle_count + cycle])))
                        .collect()
                })
                .collect();

            units.concat()
        })
    }
}

impl BatchEvaluator for ParallelEvaluator {
    fn name(&self) -> &'static str {
        "accelerated"
    }

    fn batch_check(&self, matrix: &ResourceMatrix, batch: &EncodedBatch, sliding_window: usize) -> Result<Vec<bool>, EvaluatorError> {
        batch.validate_against(matrix)?;

        if batch.is_empty() {
            return Ok(Vec::new());
        }

        panic::catch_unwind(AssertUnwindSafe(|| self.evaluate(matrix, batch, sliding_window)))
            .map_err(|payload| EvaluatorError::WorkerPanicked(panic_message(payload.as_ref())))
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic payload".to_string()
    }
}
