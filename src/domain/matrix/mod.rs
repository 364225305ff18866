pub mod resource_matrix;

pub use resource_matrix::{CellState, MatrixShape, QueueBlock, ResourceMatrix};
