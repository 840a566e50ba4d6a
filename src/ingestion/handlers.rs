use super::service::{distribute, DistributeError};
use super::types::{UploadParams, UploadResponse};
use crate::directory::registry::PrincipalDirectory;
use crate::directory::types::{require_role, PrincipalId, Role};
use crate::storage::store::BatchStore;

use axum::body::Bytes;
use axum::extract::Query;
use axum::http::{header, HeaderMap, StatusCode};
use axum::{Extension, Json};
use std::sync::Arc;

/// Intake-side size cap; the normalizer itself only checks the MIME family.
pub const MAX_UPLOAD_BYTES: usize = 5 * 1024 * 1024;

/// Upload-and-distribute endpoint.
///
/// The request body carries the raw file bytes with the declared content
/// type; the `agents` query parameter selects the recipients. On success the
/// file has been split into one batch per agent, all stamped with the same
/// upload timestamp.
pub async fn handle_upload(
    headers: HeaderMap,
    Query(params): Query<UploadParams>,
    Extension(store): Extension<Arc<BatchStore>>,
    Extension(directory): Extension<Arc<PrincipalDirectory>>,
    body: Bytes,
) -> (StatusCode, Json<UploadResponse>) {
    let caller = match require_role(&headers, Role::Admin) {
        Ok(principal) => principal,
        Err((status, rejection)) => {
            return (
                status,
                Json(UploadResponse::rejected(&rejection.0.message)),
            )
        }
    };

    if body.is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Json(UploadResponse::rejected("File is required")),
        );
    }
    if body.len() > MAX_UPLOAD_BYTES {
        return (
            StatusCode::BAD_REQUEST,
            Json(UploadResponse::rejected("File exceeds the 5 MB limit")),
        );
    }

    let mime = headers
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .unwrap_or("")
        .to_string();

    let worker_ids = match parse_agent_ids(&params.agents) {
        Ok(ids) => ids,
        Err(message) => {
            return (
                StatusCode::BAD_REQUEST,
                Json(UploadResponse::rejected(&message)),
            )
        }
    };

    match distribute(&store, &directory, caller.id, &body, &mime, &worker_ids) {
        Ok(receipt) => (
            StatusCode::OK,
            Json(UploadResponse {
                message: "Data distributed successfully".to_string(),
                batch_count: receipt.batch_count,
                uploaded_at: Some(receipt.uploaded_at),
            }),
        ),
        Err(DistributeError::InvalidFormat(err)) => {
            tracing::warn!("Rejected upload from {}: {}", caller.id, err);
            (
                StatusCode::BAD_REQUEST,
                Json(UploadResponse::rejected(&err.to_string())),
            )
        }
        Err(DistributeError::EmptyUpload) => (
            StatusCode::BAD_REQUEST,
            Json(UploadResponse::rejected("Uploaded file is empty.")),
        ),
        Err(DistributeError::NoWorkersSelected) => (
            StatusCode::BAD_REQUEST,
            Json(UploadResponse::rejected("No valid agents selected")),
        ),
        Err(err @ DistributeError::PartialWrite { .. }) => {
            // Already logged with full context by the distribute flow.
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(UploadResponse::rejected(&err.to_string())),
            )
        }
    }
}

/// Parses the comma-separated agent id list from the query string.
fn parse_agent_ids(raw: &str) -> Result<Vec<PrincipalId>, String> {
    let mut ids = Vec::new();
    for part in raw.split(',') {
        let part = part.trim();
        if part.is_empty() {
            continue;
        }
        match part.parse::<PrincipalId>() {
            Ok(id) => ids.push(id),
            Err(_) => return Err(format!("Invalid agent id: {}", part)),
        }
    }
    if ids.is_empty() {
        return Err("Agent list required".to_string());
    }
    Ok(ids)
}
