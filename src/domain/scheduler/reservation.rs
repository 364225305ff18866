//! Hop-by-hop reservation of matrix cells.
//!
//! Both traffic classes write the matrix only through these two functions, and both
//! only through [`ResourceMatrix::occupy_first_free`].

use crate::domain::flow::{HopReservation, Placement};
use crate::domain::matrix::{QueueBlock, ResourceMatrix};
use crate::domain::utils::id::LinkId;

/// Reserves one fixed-block queue per hop of a TT flow.
///
/// Hop `i` uses cycle `(offset + i) mod cycle_count`. A hop whose fixed block is full
/// at that cycle is left unplaced and the remaining hops are still reserved.
pub fn reserve_fixed_blocks(matrix: &mut ResourceMatrix, links: &[LinkId], offset: u64) -> Vec<HopReservation> {
    let cycle_count = matrix.cycle_count() as u64;
    if cycle_count == 0 {
        return links.iter().map(|link| HopReservation { link: *link, placement: None }).collect();
    }

    links
        .iter()
        .enumerate()
        .map(|(i, link)| {
            let cycle = ((offset + i as u64) % cycle_count) as usize;
            let placement = matrix.occupy_first_free(*link, cycle, QueueBlock::Fixed).map(|queue| Placement { cycle, queue });

            if placement.is_none() {
                log::debug!("FixedBlockExhausted: no free {} queue on {} in cycle {}. Hop left unplaced.", QueueBlock::Fixed, link, cycle);
            }

            HopReservation { link: *link, placement }
        })
        .collect()
}

/// Reserves one elastic-block queue per hop of an AVB flow.
///
/// Every hop independently claims the first free elastic queue of the earliest cycle
/// `t mod cycle_count`, `t < sliding_window`, that still has one. Hops of the same flow
/// may therefore land in different cycles.
pub fn reserve_elastic_blocks(matrix: &mut ResourceMatrix, links: &[LinkId], sliding_window: usize) -> Vec<HopReservation> {
    let cycle_count = matrix.cycle_count();

    links
        .iter()
        .map(|link| {
            let mut placement = None;

            if cycle_count > 0 {
                for t in 0..sliding_window {
                    let cycle = t % cycle_count;
                    if let Some(queue) = matrix.occupy_first_free(*link, cycle, QueueBlock::Elastic) {
                        placement = Some(Placement { cycle, queue });
                        break;
                    }
                }
            }

            if placement.is_none() {
                log::debug!("ElasticBlockExhausted: no free {} queue on {} inside a window of {} cycles. Hop left unplaced.", QueueBlock::Elastic, link, sliding_window);
            }

            HopReservation { link: *link, placement }
        })
        .collect()
}
