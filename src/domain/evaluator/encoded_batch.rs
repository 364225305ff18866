use crate::domain::evaluator::EvaluatorError;
use crate::domain::matrix::ResourceMatrix;
use crate::domain::utils::id::LinkId;

/// Marks the end of a path inside a row.
pub const END_OF_PATH: u32 = u32::MAX;

/// A batch of flow paths flattened into fixed-width rows of link ids.
///
/// Every row holds up to `max_hops` link ids followed by at least one
/// [`END_OF_PATH`] marker, so a row is `max_hops + 1` entries wide. Paths longer than
/// `max_hops` are truncated, flows without a path encode as an empty row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedBatch {
    max_hops: usize,
    hops: Vec<u32>,
}

impl EncodedBatch {
    /// Encodes one row per entry of `paths`, in iteration order.
    pub fn encode<'a>(paths: impl IntoIterator<Item = Option<&'a [LinkId]>>, max_hops: usize) -> Self {
        let width = max_hops + 1;
        let mut hops = Vec::new();

        for path in paths {
            let mut row = vec![END_OF_PATH; width];
            if let Some(links) = path {
                if links.len() > max_hops {
                    log::debug!("PathTruncated: path of {} hops encoded with only {} hops.", links.len(), max_hops);
                }

                for (slot, link) in row.iter_mut().zip(links.iter().take(max_hops)) {
                    *slot = link.index() as u32;
                }
            }
            hops.extend_from_slice(&row);
        }

        Self { max_hops, hops }
    }

    /// Convenience constructor for plain link-id paths.
    pub fn from_link_paths(paths: &[Vec<LinkId>], max_hops: usize) -> Self {
        Self::encode(paths.iter().map(|path| Some(path.as_slice())), max_hops)
    }

    pub fn max_hops(&self) -> usize {
        self.max_hops
    }

    /// Width of one row including the terminating marker.
    pub fn row_width(&self) -> usize {
        self.max_hops + 1
    }

    pub fn len(&self) -> usize {
        self.hops.len() / self.row_width()
    }

    pub fn is_empty(&self) -> bool {
        self.hops.is_empty()
    }

    /// Flat row-major storage.
    pub fn rows(&self) -> &[u32] {
        &self.hops
    }

    pub fn row(&self, flow: usize) -> &[u32] {
        let width = self.row_width();
        &self.hops[flow * width..(flow + 1) * width]
    }

    /// Link ids of one flow, up to the first end marker.
    pub fn path(&self, flow: usize) -> impl Iterator<Item = LinkId> + Clone + '_ {
        decode_row(self.row(flow))
    }

    /// Checks that every encoded link exists in `matrix`.
    pub fn validate_against(&self, matrix: &ResourceMatrix) -> Result<(), EvaluatorError> {
        for flow in 0..self.len() {
            if let Some(link) = self.path(flow).find(|link| !matrix.contains_link(*link)) {
                return Err(EvaluatorError::LinkOutOfRange { flow, link, links: matrix.link_count() });
            }
        }

        Ok(())
    }
}

/// Iterates the link ids of an encoded row until the first end marker.
pub fn decode_row(row: &[u32]) -> impl Iterator<Item = LinkId> + Clone + '_ {
    row.iter().take_while(|hop| **hop != END_OF_PATH).map(|hop| LinkId(*hop as usize))
}
