//! Storage Module Tests
//!
//! Validates the round-robin distribution logic and the batch store.
//!
//! ## Test Scopes
//! - **Partitioner**: Disjointness, order preservation, and count balance of
//!   the round-robin split.
//! - **BatchStore**: Batch-set creation, round-trip fidelity, and targeted
//!   status updates.

#[cfg(test)]
mod tests {
    use crate::directory::types::PrincipalId;
    use crate::ingestion::types::RawRecord;
    use crate::storage::partitioner::partition;
    use crate::storage::store::{BatchStore, StoreError};
    use crate::storage::types::{ItemId, TaskStatus};

    use chrono::Utc;
    use std::collections::HashSet;

    fn records(count: usize) -> Vec<RawRecord> {
        (0..count)
            .map(|i| RawRecord {
                first_name: format!("person-{}", i),
                phone: format!("555{:04}", i),
                notes: format!("note {}", i),
                extra: Default::default(),
            })
            .collect()
    }

    // ============================================================
    // PARTITIONER PROPERTIES
    // ============================================================

    #[test]
    fn test_buckets_are_disjoint_and_complete() {
        for (n, k) in [(0, 1), (1, 3), (10, 3), (17, 4), (5, 5), (4, 7)] {
            let buckets = partition(records(n), k);
            assert_eq!(buckets.len(), k);

            let mut seen: HashSet<ItemId> = HashSet::new();
            let mut total = 0;
            for bucket in &buckets {
                for item in bucket {
                    assert!(seen.insert(item.id), "item assigned to two buckets");
                    total += 1;
                }
            }
            assert_eq!(total, n, "N={} K={}", n, k);
        }
    }

    #[test]
    fn test_interleaving_buckets_reconstructs_original_order() {
        let n = 11;
        let k = 3;
        let buckets = partition(records(n), k);

        // Walk the buckets round-robin; this must reproduce index order.
        let mut reconstructed = Vec::new();
        let longest = buckets.iter().map(|b| b.len()).max().unwrap();
        for round in 0..longest {
            for bucket in &buckets {
                if let Some(item) = bucket.get(round) {
                    reconstructed.push(item.first_name.clone());
                }
            }
        }

        let expected: Vec<String> = (0..n).map(|i| format!("person-{}", i)).collect();
        assert_eq!(reconstructed, expected);
    }

    #[test]
    fn test_bucket_sizes_differ_by_at_most_one() {
        for (n, k) in [(17, 4), (10, 3), (3, 2), (100, 7), (6, 6)] {
            let buckets = partition(records(n), k);
            let sizes: Vec<usize> = buckets.iter().map(|b| b.len()).collect();
            let max = *sizes.iter().max().unwrap();
            let min = *sizes.iter().min().unwrap();
            assert!(max - min <= 1, "N={} K={} sizes={:?}", n, k, sizes);

            // Ties leave earlier buckets with the extra record.
            for pair in sizes.windows(2) {
                assert!(pair[0] >= pair[1]);
            }
        }
    }

    #[test]
    fn test_every_item_starts_assigned() {
        let buckets = partition(records(23), 4);
        for bucket in &buckets {
            for item in bucket {
                assert_eq!(item.status, TaskStatus::Assigned);
            }
        }
    }

    // ============================================================
    // BATCH STORE
    // ============================================================

    #[test]
    fn test_create_batch_set_one_batch_per_worker() {
        let store = BatchStore::new();
        let owner = PrincipalId::new();
        let workers = [PrincipalId::new(), PrincipalId::new()];

        let buckets = partition(records(3), 2);
        let assignments = workers.iter().copied().zip(buckets).collect();

        let count = store
            .create_batch_set(owner, assignments, Utc::now())
            .unwrap();
        assert_eq!(count, 2);
        assert_eq!(store.batch_count(), 2);
    }

    #[test]
    fn test_create_batch_set_skips_empty_buckets() {
        let store = BatchStore::new();
        let owner = PrincipalId::new();
        let workers = [PrincipalId::new(), PrincipalId::new(), PrincipalId::new()];

        // 2 records across 3 workers leaves the last bucket empty.
        let buckets = partition(records(2), 3);
        let assignments = workers.iter().copied().zip(buckets).collect();

        let count = store
            .create_batch_set(owner, assignments, Utc::now())
            .unwrap();
        assert_eq!(count, 2);
    }

    #[test]
    fn test_batch_round_trip_preserves_identity_order_and_status() {
        let store = BatchStore::new();
        let owner = PrincipalId::new();
        let worker = PrincipalId::new();
        let uploaded_at = Utc::now();

        let buckets = partition(records(5), 1);
        let written_ids: Vec<ItemId> = buckets[0].iter().map(|item| item.id).collect();

        store
            .create_batch_set(owner, vec![(worker, buckets.into_iter().next().unwrap())], uploaded_at)
            .unwrap();

        let batches = store.batches_for_worker(&worker);
        assert_eq!(batches.len(), 1);
        let batch = &batches[0];

        assert_eq!(batch.uploaded_at, uploaded_at);
        let read_back = batch.ordered_items();
        let read_ids: Vec<ItemId> = read_back.iter().map(|item| item.id).collect();
        assert_eq!(read_ids, written_ids);
        for (i, item) in read_back.iter().enumerate() {
            assert_eq!(item.first_name, format!("person-{}", i));
            assert_eq!(item.status, TaskStatus::Assigned);
        }
    }

    #[test]
    fn test_batches_share_upload_timestamp() {
        let store = BatchStore::new();
        let owner = PrincipalId::new();
        let workers = [PrincipalId::new(), PrincipalId::new(), PrincipalId::new()];
        let uploaded_at = Utc::now();

        let buckets = partition(records(9), 3);
        store
            .create_batch_set(owner, workers.iter().copied().zip(buckets).collect(), uploaded_at)
            .unwrap();

        for batch in store.batches_for_owner(&owner) {
            assert_eq!(batch.uploaded_at, uploaded_at);
        }
    }

    // ============================================================
    // STATUS MUTATOR
    // ============================================================

    #[test]
    fn test_status_toggle_returns_item_to_original_state() {
        let store = BatchStore::new();
        let owner = PrincipalId::new();
        let worker = PrincipalId::new();

        let buckets = partition(records(3), 1);
        store
            .create_batch_set(owner, vec![(worker, buckets.into_iter().next().unwrap())], Utc::now())
            .unwrap();

        let before = store.batches_for_worker(&worker)[0].ordered_items();
        let target = before[1].clone();

        store
            .update_item_status(&worker, &target.id, TaskStatus::Completed)
            .unwrap();
        let mid = store.batches_for_worker(&worker)[0].ordered_items();
        assert_eq!(mid[1].status, TaskStatus::Completed);

        store
            .update_item_status(&worker, &target.id, TaskStatus::Assigned)
            .unwrap();

        // No residual fields changed by the round trip.
        let after = store.batches_for_worker(&worker)[0].ordered_items();
        assert_eq!(after[1], target);
        assert_eq!(after[0], before[0]);
        assert_eq!(after[2], before[2]);
    }

    #[test]
    fn test_update_status_wrong_worker_is_not_found() {
        let store = BatchStore::new();
        let owner = PrincipalId::new();
        let worker = PrincipalId::new();
        let intruder = PrincipalId::new();

        let buckets = partition(records(2), 1);
        store
            .create_batch_set(owner, vec![(worker, buckets.into_iter().next().unwrap())], Utc::now())
            .unwrap();

        let item_id = store.batches_for_worker(&worker)[0].ordered_items()[0].id;

        // Another agent addressing a real item gets the same answer as a
        // bogus id: no existence leakage.
        let err = store
            .update_item_status(&intruder, &item_id, TaskStatus::Completed)
            .unwrap_err();
        assert!(matches!(err, StoreError::NotFoundOrUnauthorized));

        let err = store
            .update_item_status(&worker, &ItemId::new(), TaskStatus::Completed)
            .unwrap_err();
        assert!(matches!(err, StoreError::NotFoundOrUnauthorized));
    }

    #[test]
    fn test_update_status_only_touches_status_and_updated_at() {
        let store = BatchStore::new();
        let owner = PrincipalId::new();
        let worker = PrincipalId::new();
        let uploaded_at = Utc::now();

        let buckets = partition(records(1), 1);
        store
            .create_batch_set(owner, vec![(worker, buckets.into_iter().next().unwrap())], uploaded_at)
            .unwrap();

        let before = store.batches_for_worker(&worker).remove(0);
        let item_id = before.ordered_items()[0].id;

        store
            .update_item_status(&worker, &item_id, TaskStatus::InProgress)
            .unwrap();

        let after = store.batches_for_worker(&worker).remove(0);
        assert_eq!(after.id, before.id);
        assert_eq!(after.uploaded_at, before.uploaded_at);
        assert_eq!(after.created_at, before.created_at);
        assert!(after.updated_at >= before.updated_at);
        assert_eq!(after.ordered_items()[0].status, TaskStatus::InProgress);
    }
}
