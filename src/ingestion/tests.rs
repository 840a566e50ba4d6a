//! Ingestion Module Tests
//!
//! Validates the tabular normalizer and the distribute pipeline.
//!
//! ## Test Scopes
//! - **Normalizer**: Format family dispatch, column mapping, defaulting, and
//!   pass-through of unrecognized columns.
//! - **Distribute**: The end-to-end upload flow against an in-memory store
//!   and directory.

#[cfg(test)]
mod tests {
    use crate::directory::registry::PrincipalDirectory;
    use crate::directory::types::{Principal, PrincipalId, Role};
    use crate::ingestion::normalizer::{normalize, NormalizeError, MIME_CSV};
    use crate::ingestion::service::{distribute, DistributeError};
    use crate::storage::store::BatchStore;
    use crate::storage::types::TaskStatus;

    fn agent(name: &str, email: &str) -> Principal {
        Principal {
            id: PrincipalId::new(),
            name: name.to_string(),
            email: email.to_string(),
            country_code: "+1".to_string(),
            mobile: "5551234567".to_string(),
            role: Role::Agent,
            deleted: false,
        }
    }

    // ============================================================
    // NORMALIZER - CSV
    // ============================================================

    #[test]
    fn test_normalize_csv_basic() {
        let csv = "firstName,phone,notes\nAmy,5551234,call back\nBo,5555678,\n";
        let records = normalize(csv.as_bytes(), MIME_CSV).unwrap();

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].first_name, "Amy");
        assert_eq!(records[0].phone, "5551234");
        assert_eq!(records[0].notes, "call back");
        assert_eq!(records[1].first_name, "Bo");
        assert_eq!(records[1].notes, "");
    }

    #[test]
    fn test_normalize_csv_header_variants() {
        let csv = "First Name,PHONE,notes\nAmy,5551234,hi\n";
        let records = normalize(csv.as_bytes(), MIME_CSV).unwrap();

        assert_eq!(records[0].first_name, "Amy");
        assert_eq!(records[0].phone, "5551234");

        let csv = "first_name,phone,notes\nBo,5555678,\n";
        let records = normalize(csv.as_bytes(), MIME_CSV).unwrap();
        assert_eq!(records[0].first_name, "Bo");
    }

    #[test]
    fn test_normalize_csv_missing_columns_default_to_empty() {
        let csv = "firstName\nAmy\nBo\n";
        let records = normalize(csv.as_bytes(), MIME_CSV).unwrap();

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].first_name, "Amy");
        assert_eq!(records[0].phone, "");
        assert_eq!(records[0].notes, "");
    }

    #[test]
    fn test_normalize_csv_short_rows_do_not_fail() {
        // Flexible rows: the second row is missing two cells.
        let csv = "firstName,phone,notes\nAmy,5551234,ok\nBo\n";
        let records = normalize(csv.as_bytes(), MIME_CSV).unwrap();

        assert_eq!(records.len(), 2);
        assert_eq!(records[1].first_name, "Bo");
        assert_eq!(records[1].phone, "");
    }

    #[test]
    fn test_normalize_csv_retains_extra_columns() {
        let csv = "firstName,phone,notes,city\nAmy,5551234,,Lisbon\n";
        let records = normalize(csv.as_bytes(), MIME_CSV).unwrap();

        assert_eq!(
            records[0].extra.get("city"),
            Some(&serde_json::Value::String("Lisbon".to_string()))
        );
    }

    #[test]
    fn test_normalize_csv_content_type_parameters_ignored() {
        let csv = "firstName,phone,notes\nAmy,5551234,\n";
        let records = normalize(csv.as_bytes(), "text/csv; charset=utf-8").unwrap();
        assert_eq!(records.len(), 1);
    }

    #[test]
    fn test_normalize_empty_csv_yields_no_records() {
        let records = normalize(b"firstName,phone,notes\n", MIME_CSV).unwrap();
        assert!(records.is_empty());
    }

    #[test]
    fn test_normalize_rejects_unknown_mime() {
        let err = normalize(b"whatever", "application/pdf").unwrap_err();
        assert!(matches!(err, NormalizeError::UnsupportedFormat { .. }));
    }

    // ============================================================
    // DISTRIBUTE PIPELINE
    // ============================================================

    #[test]
    fn test_distribute_round_trip_two_workers() {
        let store = BatchStore::new();
        let directory = PrincipalDirectory::new();
        let owner = PrincipalId::new();

        let a = agent("Worker A", "a@example.com");
        let b = agent("Worker B", "b@example.com");
        let (a_id, b_id) = (a.id, b.id);
        directory.register(a).unwrap();
        directory.register(b).unwrap();

        let csv = "firstName,phone,notes\n\
                   Amy,5551234,call back\n\
                   Bo,5555678,\n\
                   Cy,5559999,vip\n";

        let receipt = distribute(
            &store,
            &directory,
            owner,
            csv.as_bytes(),
            MIME_CSV,
            &[a_id, b_id],
        )
        .unwrap();
        assert_eq!(receipt.batch_count, 2);

        // Index-0-first round robin: worker A gets rows 0 and 2, worker B row 1.
        let a_items = store.batches_for_worker(&a_id)[0].ordered_items();
        let a_names: Vec<&str> = a_items.iter().map(|t| t.first_name.as_str()).collect();
        assert_eq!(a_names, vec!["Amy", "Cy"]);

        let b_items = store.batches_for_worker(&b_id)[0].ordered_items();
        let b_names: Vec<&str> = b_items.iter().map(|t| t.first_name.as_str()).collect();
        assert_eq!(b_names, vec!["Bo"]);

        for item in a_items.iter().chain(b_items.iter()) {
            assert_eq!(item.status, TaskStatus::Assigned);
        }

        for batch in store.batches_for_owner(&owner) {
            assert_eq!(batch.uploaded_at, receipt.uploaded_at);
        }
    }

    #[test]
    fn test_distribute_rejects_empty_file() {
        let store = BatchStore::new();
        let directory = PrincipalDirectory::new();
        let worker = agent("Amy", "amy@example.com");
        let worker_id = worker.id;
        directory.register(worker).unwrap();

        let err = distribute(
            &store,
            &directory,
            PrincipalId::new(),
            b"firstName,phone,notes\n",
            MIME_CSV,
            &[worker_id],
        )
        .unwrap_err();

        assert!(matches!(err, DistributeError::EmptyUpload));
        assert_eq!(store.batch_count(), 0);
    }

    #[test]
    fn test_distribute_rejects_empty_selection_before_parsing() {
        let store = BatchStore::new();
        let directory = PrincipalDirectory::new();

        let err = distribute(
            &store,
            &directory,
            PrincipalId::new(),
            b"firstName,phone,notes\nAmy,1,\n",
            MIME_CSV,
            &[],
        )
        .unwrap_err();

        assert!(matches!(err, DistributeError::NoWorkersSelected));
    }

    #[test]
    fn test_distribute_drops_inactive_and_unknown_agents() {
        let store = BatchStore::new();
        let directory = PrincipalDirectory::new();
        let owner = PrincipalId::new();

        let active = agent("Amy", "amy@example.com");
        let deleted = agent("Bo", "bo@example.com");
        let (active_id, deleted_id) = (active.id, deleted.id);
        directory.register(active).unwrap();
        directory.register(deleted).unwrap();
        directory.soft_delete(&deleted_id);

        let csv = "firstName,phone,notes\nAmy,1,\nBo,2,\n";
        let receipt = distribute(
            &store,
            &directory,
            owner,
            csv.as_bytes(),
            MIME_CSV,
            &[active_id, deleted_id, PrincipalId::new()],
        )
        .unwrap();

        // Only the active agent survives the selection; it receives everything.
        assert_eq!(receipt.batch_count, 1);
        let items = store.batches_for_worker(&active_id)[0].ordered_items();
        assert_eq!(items.len(), 2);
    }

    #[test]
    fn test_distribute_only_deleted_agents_is_rejected() {
        let store = BatchStore::new();
        let directory = PrincipalDirectory::new();
        let gone = agent("Bo", "bo@example.com");
        let gone_id = gone.id;
        directory.register(gone).unwrap();
        directory.soft_delete(&gone_id);

        let err = distribute(
            &store,
            &directory,
            PrincipalId::new(),
            b"firstName,phone,notes\nAmy,1,\n",
            MIME_CSV,
            &[gone_id],
        )
        .unwrap_err();

        assert!(matches!(err, DistributeError::NoWorkersSelected));
    }

    #[test]
    fn test_distribute_propagates_unsupported_format() {
        let store = BatchStore::new();
        let directory = PrincipalDirectory::new();
        let worker = agent("Amy", "amy@example.com");
        let worker_id = worker.id;
        directory.register(worker).unwrap();

        let err = distribute(
            &store,
            &directory,
            PrincipalId::new(),
            b"not tabular",
            "text/plain",
            &[worker_id],
        )
        .unwrap_err();

        assert!(matches!(err, DistributeError::InvalidFormat(_)));
        assert_eq!(store.batch_count(), 0);
    }
}
