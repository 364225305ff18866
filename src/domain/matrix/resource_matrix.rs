use std::fmt;
use std::ops::Range;

use crate::domain::config::SchedulerConfig;
use crate::domain::utils::id::LinkId;

/// Occupancy of a single (link, cycle, queue) cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[repr(u8)]
pub enum CellState {
    #[default]
    Free = 0,
    Occupied = 1,
}

/// The two disjoint queue ranges of every (link, cycle) pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QueueBlock {
    /// Queues `[0, K)`, written only by TT reservation.
    Fixed,

    /// Queues `[K, Q)`, written only by AVB reservation.
    Elastic,
}

impl fmt::Display for QueueBlock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QueueBlock::Fixed => write!(f, "FB"),
            QueueBlock::Elastic => write!(f, "EB"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MatrixShape {
    pub links: usize,
    pub cycles: usize,
    pub queues: usize,
}

impl MatrixShape {
    pub fn cell_count(&self) -> usize {
        self.links * self.cycles * self.queues
    }
}

impl fmt::Display for MatrixShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {})", self.links, self.cycles, self.queues)
    }
}

/// The run-wide queue occupancy grid, indexed by (link, cycle, queue).
///
/// The grid is allocated once with every cell `Free` and is never resized.
/// [`ResourceMatrix::occupy_first_free`] is the only way to change a cell, which keeps
/// every write inside the block of the class that performs it and guarantees that a
/// cell is observed `Free` immediately before it becomes `Occupied`.
///
/// Read access (`&ResourceMatrix`) is what the batch evaluator works on; holding it
/// statically excludes concurrent reservation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceMatrix {
    shape: MatrixShape,

    /// Number of queues in the fixed block; the elastic block starts here.
    fixed_queues: usize,

    /// Cells in row-major (link, cycle, queue) order.
    cells: Vec<CellState>,
}

impl ResourceMatrix {
    /// Allocates an all-`Free` matrix of `links × cycles × (fixed_queues + elastic_queues)` cells.
    pub fn new(links: usize, cycles: usize, fixed_queues: usize, elastic_queues: usize) -> Self {
        let shape = MatrixShape { links, cycles, queues: fixed_queues + elastic_queues };
        let cells = vec![CellState::Free; shape.cell_count()];

        Self { shape, fixed_queues, cells }
    }

    /// Sizes the matrix for one hypercycle of the given configuration.
    pub fn from_config(links: usize, config: &SchedulerConfig) -> Self {
        Self::new(links, config.cycle_count(), config.fixed_queues(), config.elastic_queues())
    }

    pub fn shape(&self) -> MatrixShape {
        self.shape
    }

    pub fn link_count(&self) -> usize {
        self.shape.links
    }

    pub fn cycle_count(&self) -> usize {
        self.shape.cycles
    }

    pub fn queue_count(&self) -> usize {
        self.shape.queues
    }

    pub fn fixed_queues(&self) -> usize {
        self.fixed_queues
    }

    pub fn elastic_queues(&self) -> usize {
        self.shape.queues - self.fixed_queues
    }

    pub fn contains_link(&self, link: LinkId) -> bool {
        link.index() < self.shape.links
    }

    pub fn block_range(&self, block: QueueBlock) -> Range<usize> {
        match block {
            QueueBlock::Fixed => 0..self.fixed_queues,
            QueueBlock::Elastic => self.fixed_queues..self.shape.queues,
        }
    }

    fn offset(&self, link: LinkId, cycle: usize) -> Option<usize> {
        if link.index() >= self.shape.links || cycle >= self.shape.cycles {
            return None;
        }

        Some((link.index() * self.shape.cycles + cycle) * self.shape.queues)
    }

    /// Returns the queue cells of one (link, cycle) pair, or `None` if out of range.
    pub fn queues(&self, link: LinkId, cycle: usize) -> Option<&[CellState]> {
        let start = self.offset(link, cycle)?;
        Some(&self.cells[start..start + self.shape.queues])
    }

    pub fn cell(&self, link: LinkId, cycle: usize, queue: usize) -> Option<CellState> {
        if queue >= self.shape.queues {
            return None;
        }

        self.queues(link, cycle).map(|row| row[queue])
    }

    /// Raw cell storage in row-major (link, cycle, queue) order.
    pub fn cells(&self) -> &[CellState] {
        &self.cells
    }

    pub fn occupied_cells(&self) -> usize {
        self.cells.iter().filter(|cell| **cell == CellState::Occupied).count()
    }

    /// Fraction of occupied cells over the whole matrix, both blocks included.
    ///
    /// Returns `0.0` for an empty matrix.
    pub fn occupancy_load(&self) -> f64 {
        let total = self.cells.len();
        if total == 0 {
            return 0.0;
        }

        self.occupied_cells() as f64 / total as f64
    }

    /// Fraction of occupied cells inside one block only. Reporting helper.
    pub fn block_load(&self, block: QueueBlock) -> f64 {
        let range = self.block_range(block);
        let total = self.shape.links * self.shape.cycles * range.len();
        if total == 0 {
            return 0.0;
        }

        let occupied: usize = self.cells.chunks_exact(self.shape.queues).map(|row| row[range.clone()].iter().filter(|cell| **cell == CellState::Occupied).count()).sum();

        occupied as f64 / total as f64
    }

    /// Index of the first `Free` queue of `block` at (link, cycle), scanning upwards.
    pub fn first_free(&self, link: LinkId, cycle: usize, block: QueueBlock) -> Option<usize> {
        let row = self.queues(link, cycle)?;
        self.block_range(block).find(|queue| row[*queue] == CellState::Free)
    }

    /// `true` if every queue of `block` at (link, cycle) is occupied.
    ///
    /// Coordinates outside the matrix are reported as not saturated.
    pub fn is_block_saturated(&self, link: LinkId, cycle: usize, block: QueueBlock) -> bool {
        match self.queues(link, cycle) {
            Some(row) => row[self.block_range(block)].iter().all(|cell| *cell == CellState::Occupied),
            None => false,
        }
    }

    /// Occupies the first `Free` queue of `block` at (link, cycle) and returns its index.
    ///
    /// Returns `None` and writes nothing if the block has no free queue there or the
    /// coordinates are outside the matrix.
    pub fn occupy_first_free(&mut self, link: LinkId, cycle: usize, block: QueueBlock) -> Option<usize> {
        let Some(start) = self.offset(link, cycle) else {
            log::error!("MatrixIndexOutOfRange: ({}, cycle {}) is outside matrix shape {}.", link, cycle, self.shape);
            return None;
        };

        let queue = self.first_free(link, cycle, block)?;
        debug_assert_eq!(self.cells[start + queue], CellState::Free);
        self.cells[start + queue] = CellState::Occupied;

        Some(queue)
    }
}
