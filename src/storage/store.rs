use super::types::{Batch, BatchId, ItemId, TaskItem, TaskStatus};
use crate::directory::types::PrincipalId;

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    /// Deliberately covers both "no such item" and "item exists but belongs
    /// to someone else" so callers cannot probe for existence.
    #[error("Task not found or not assigned to you")]
    NotFoundOrUnauthorized,

    /// An insert would have clobbered an existing batch document. Batches
    /// are immutable history; the write is refused and the caller must
    /// treat the whole set as failed.
    #[error("Batch {id} already exists")]
    DuplicateBatch {
        id: BatchId,
        written: Vec<PrincipalId>,
    },
}

/// The batch store.
///
/// One document per agent per upload event, keyed by batch id. Reads clone
/// documents out; the query layer reconstructs joined views from these
/// snapshots without holding store locks.
pub struct BatchStore {
    batches: DashMap<BatchId, Batch>,
}

impl BatchStore {
    pub fn new() -> Self {
        Self {
            batches: DashMap::new(),
        }
    }

    /// Persists one batch per non-empty bucket, all sharing `uploaded_at`.
    ///
    /// The whole set is staged before the first insert so everything that
    /// can fail has already failed by the time writing starts. Should an
    /// insert still be refused, the error carries which agents were written
    /// so the failure can be reconciled by hand; it is never retried here,
    /// since a retry would create duplicate batches under the same
    /// timestamp.
    ///
    /// Returns the number of batches written.
    pub fn create_batch_set(
        &self,
        owner: PrincipalId,
        assignments: Vec<(PrincipalId, Vec<TaskItem>)>,
        uploaded_at: DateTime<Utc>,
    ) -> Result<usize, StoreError> {
        let now = Utc::now();
        let staged: Vec<Batch> = assignments
            .into_iter()
            .filter(|(_, items)| !items.is_empty())
            .map(|(worker, items)| Batch {
                id: BatchId::new(),
                owner,
                worker,
                items: items.into_iter().map(|item| (item.id, item)).collect(),
                uploaded_at,
                created_at: now,
                updated_at: now,
            })
            .collect();

        let mut written: Vec<PrincipalId> = Vec::with_capacity(staged.len());
        for batch in staged {
            let id = batch.id;
            let worker = batch.worker;
            if self.batches.insert(id, batch).is_some() {
                return Err(StoreError::DuplicateBatch { id, written });
            }
            written.push(worker);
        }

        Ok(written.len())
    }

    /// Sets the status of the unique item with `item_id` inside the given
    /// agent's batches.
    ///
    /// The item map is keyed by id, so the lookup within each batch is a
    /// direct hit rather than a positional scan. A miss is reported as
    /// `NotFoundOrUnauthorized` whether the id is wrong or the item belongs
    /// to a different agent.
    pub fn update_item_status(
        &self,
        worker: &PrincipalId,
        item_id: &ItemId,
        status: TaskStatus,
    ) -> Result<(), StoreError> {
        for mut entry in self.batches.iter_mut() {
            let batch = entry.value_mut();
            if batch.worker != *worker {
                continue;
            }
            if let Some(item) = batch.items.get_mut(item_id) {
                item.status = status;
                batch.updated_at = Utc::now();
                return Ok(());
            }
        }
        Err(StoreError::NotFoundOrUnauthorized)
    }

    /// All batches owned by the given admin, as snapshots.
    pub fn batches_for_owner(&self, owner: &PrincipalId) -> Vec<Batch> {
        self.batches
            .iter()
            .filter(|entry| entry.value().owner == *owner)
            .map(|entry| entry.value().clone())
            .collect()
    }

    /// All batches assigned to the given agent, as snapshots.
    pub fn batches_for_worker(&self, worker: &PrincipalId) -> Vec<Batch> {
        self.batches
            .iter()
            .filter(|entry| entry.value().worker == *worker)
            .map(|entry| entry.value().clone())
            .collect()
    }

    pub fn batch_count(&self) -> usize {
        self.batches.len()
    }
}
