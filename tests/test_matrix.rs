use csqf_hybrid_scheduler::domain::config::SchedulerConfig;
use csqf_hybrid_scheduler::domain::matrix::{CellState, MatrixShape, QueueBlock, ResourceMatrix};
use csqf_hybrid_scheduler::domain::utils::id::LinkId;
use proptest::collection::vec;
use proptest::prelude::*;

proptest! {
    #[test]
    fn occupancy_load_is_exact_and_reproducible(ops in vec((0usize..3, 0usize..5, any::<bool>()), 0..200)) {
        let mut matrix = ResourceMatrix::new(3, 5, 2, 2);
        for (link, cycle, elastic) in &ops {
            let block = if *elastic { QueueBlock::Elastic } else { QueueBlock::Fixed };
            matrix.occupy_first_free(LinkId(*link), *cycle, block);
        }

        let load = matrix.occupancy_load();

        prop_assert_eq!(load, matrix.occupied_cells() as f64 / 60.0);
        prop_assert_eq!(load, matrix.clone().occupancy_load());
        prop_assert_eq!(load, matrix.occupancy_load());
    }

    #[test]
    fn every_successful_reservation_claims_exactly_one_free_cell(ops in vec((0usize..2, 0usize..3, any::<bool>()), 0..100)) {
        let mut matrix = ResourceMatrix::new(2, 3, 2, 3);
        let mut claimed = 0;

        for (link, cycle, elastic) in ops {
            let block = if elastic { QueueBlock::Elastic } else { QueueBlock::Fixed };
            let was_free = matrix.first_free(LinkId(link), cycle, block);

            match matrix.occupy_first_free(LinkId(link), cycle, block) {
                Some(queue) => {
                    prop_assert_eq!(Some(queue), was_free);
                    prop_assert!(matrix.block_range(block).contains(&queue));
                    prop_assert_eq!(matrix.cell(LinkId(link), cycle, queue), Some(CellState::Occupied));
                    claimed += 1;
                }
                None => {
                    prop_assert_eq!(was_free, None);
                    prop_assert!(matrix.is_block_saturated(LinkId(link), cycle, block));
                }
            }
        }

        prop_assert_eq!(matrix.occupied_cells(), claimed);
    }
}

#[test]
fn test_matrix_shape_follows_config() {
    let matrix = ResourceMatrix::from_config(36, &SchedulerConfig::default());

    assert_eq!(matrix.shape(), MatrixShape { links: 36, cycles: 256, queues: 8 });
    assert_eq!(matrix.block_range(QueueBlock::Fixed), 0..4);
    assert_eq!(matrix.block_range(QueueBlock::Elastic), 4..8);
    assert_eq!(matrix.occupancy_load(), 0.0);
}

#[test]
fn test_block_loads_are_reported_separately() {
    let mut matrix = ResourceMatrix::new(1, 1, 2, 2);
    matrix.occupy_first_free(LinkId(0), 0, QueueBlock::Fixed);

    assert_eq!(matrix.block_load(QueueBlock::Fixed), 0.5);
    assert_eq!(matrix.block_load(QueueBlock::Elastic), 0.0);
    assert_eq!(matrix.occupancy_load(), 0.25);
}

#[test]
fn test_out_of_range_reservation_writes_nothing() {
    let mut matrix = ResourceMatrix::new(1, 1, 1, 1);

    assert_eq!(matrix.occupy_first_free(LinkId(3), 0, QueueBlock::Fixed), None);
    assert_eq!(matrix.occupy_first_free(LinkId(0), 9, QueueBlock::Elastic), None);
    assert_eq!(matrix.occupied_cells(), 0);
}
