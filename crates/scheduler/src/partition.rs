//! Static strided work partition.
//!
//! Worker `w` of `size` owns items `w, w + size, w + 2*size, ...` of the
//! sorted list. The assignment is a pure function of (list, w, size); no
//! queue, no stealing, no coordination after the broadcast.

use contracts::{WorkItem, WorkerId};

/// The items assigned to one worker, in list order.
pub fn assigned(items: &[WorkItem], worker: WorkerId, size: usize) -> Vec<WorkItem> {
    assigned_indices(items.len(), worker, size)
        .map(|i| items[i].clone())
        .collect()
}

/// Index view of the same partition.
pub fn assigned_indices(
    len: usize,
    worker: WorkerId,
    size: usize,
) -> impl Iterator<Item = usize> {
    (worker.0..len).step_by(size.max(1))
}
