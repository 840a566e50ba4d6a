use super::types::{ItemId, TaskItem, TaskStatus};
use crate::ingestion::types::RawRecord;

/// Splits normalized records across `worker_count` buckets round-robin.
///
/// The record at original index `i` lands in bucket `i % worker_count`, so
/// the split is deterministic, order-preserving, and balanced by count:
/// bucket sizes differ by at most one, with earlier buckets taking the
/// extra when the division is uneven. Every produced item starts out
/// `Assigned` with a fresh id.
///
/// Callers reject an empty agent selection before partitioning; an empty
/// selection here yields no buckets.
pub fn partition(records: Vec<RawRecord>, worker_count: usize) -> Vec<Vec<TaskItem>> {
    if worker_count == 0 {
        return Vec::new();
    }

    let mut buckets: Vec<Vec<TaskItem>> = (0..worker_count).map(|_| Vec::new()).collect();

    for (index, record) in records.into_iter().enumerate() {
        let bucket = &mut buckets[index % worker_count];
        bucket.push(TaskItem {
            id: ItemId::new(),
            seq: bucket.len() as u32,
            first_name: record.first_name,
            phone: record.phone,
            notes: record.notes,
            status: TaskStatus::Assigned,
            extra: record.extra,
        });
    }

    buckets
}
