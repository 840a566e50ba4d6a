use super::normalizer::{normalize, NormalizeError};
use crate::directory::registry::PrincipalDirectory;
use crate::directory::types::PrincipalId;
use crate::storage::partitioner::partition;
use crate::storage::store::{BatchStore, StoreError};

use chrono::{DateTime, DurationRound, Utc};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DistributeError {
    #[error(transparent)]
    InvalidFormat(#[from] NormalizeError),

    #[error("Uploaded file is empty")]
    EmptyUpload,

    #[error("No valid agents selected")]
    NoWorkersSelected,

    /// The batch set failed after some batches were written. Fatal: the
    /// upload must not be reprocessed automatically, since a retry would
    /// create duplicate batches under the same timestamp.
    #[error("Batch set for {owner} at {uploaded_at} partially written")]
    PartialWrite {
        owner: PrincipalId,
        uploaded_at: DateTime<Utc>,
        written: Vec<PrincipalId>,
    },
}

/// Outcome of a successful distribution.
#[derive(Debug, Clone, Copy)]
pub struct DistributionReceipt {
    pub batch_count: usize,
    pub uploaded_at: DateTime<Utc>,
}

/// Runs the full distribute pipeline for one upload.
///
/// The selection is resolved against the directory first: ids that are not
/// active agents are dropped, and an empty remainder is rejected before any
/// parse work happens. Normalized records are then split round-robin across
/// the surviving agents and persisted as one batch set sharing a single
/// upload timestamp.
pub fn distribute(
    store: &BatchStore,
    directory: &PrincipalDirectory,
    owner: PrincipalId,
    bytes: &[u8],
    mime: &str,
    worker_ids: &[PrincipalId],
) -> Result<DistributionReceipt, DistributeError> {
    let mut workers: Vec<PrincipalId> = Vec::new();
    for id in worker_ids {
        if directory.is_active_agent(id) && !workers.contains(id) {
            workers.push(*id);
        }
    }
    if workers.is_empty() {
        return Err(DistributeError::NoWorkersSelected);
    }

    let records = normalize(bytes, mime)?;
    if records.is_empty() {
        return Err(DistributeError::EmptyUpload);
    }

    let record_count = records.len();
    let buckets = partition(records, workers.len());

    // Millisecond precision: the history view renders this timestamp as a
    // string, and the detail view must find the event again when addressed
    // through that rendering.
    let now = Utc::now();
    let uploaded_at = now
        .duration_trunc(chrono::Duration::milliseconds(1))
        .unwrap_or(now);

    let assignments = workers.iter().copied().zip(buckets).collect();
    match store.create_batch_set(owner, assignments, uploaded_at) {
        Ok(batch_count) => {
            tracing::info!(
                "Distributed {} records across {} agents for {} at {}",
                record_count,
                batch_count,
                owner,
                uploaded_at
            );
            Ok(DistributionReceipt {
                batch_count,
                uploaded_at,
            })
        }
        Err(StoreError::DuplicateBatch { id, written }) => {
            tracing::error!(
                "Partial batch set: owner={} uploaded_at={} refused_batch={} written_agents={:?}",
                owner,
                uploaded_at,
                id,
                written
            );
            Err(DistributeError::PartialWrite {
                owner,
                uploaded_at,
                written,
            })
        }
        Err(err) => {
            tracing::error!("Batch set write failed for {}: {}", owner, err);
            Err(DistributeError::PartialWrite {
                owner,
                uploaded_at,
                written: Vec::new(),
            })
        }
    }
}
