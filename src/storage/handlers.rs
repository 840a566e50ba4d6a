use super::store::{BatchStore, StoreError};
use super::types::StatusUpdateRequest;
use crate::directory::types::{require_role, MessageResponse, Role};

use axum::http::{HeaderMap, StatusCode};
use axum::{Extension, Json};
use std::sync::Arc;

/// Agent-facing status update: toggles one of the caller's own items.
///
/// The store scopes the lookup to the caller's batches, so a wrong id and
/// an item owned by another agent produce the same 404.
pub async fn handle_update_task_status(
    headers: HeaderMap,
    Extension(store): Extension<Arc<BatchStore>>,
    Json(req): Json<StatusUpdateRequest>,
) -> (StatusCode, Json<MessageResponse>) {
    let caller = match require_role(&headers, Role::Agent) {
        Ok(principal) => principal,
        Err(rejection) => return rejection,
    };

    match store.update_item_status(&caller.id, &req.task_id, req.status) {
        Ok(()) => (
            StatusCode::OK,
            Json(MessageResponse::new("Task status updated")),
        ),
        Err(StoreError::NotFoundOrUnauthorized) => (
            StatusCode::NOT_FOUND,
            Json(MessageResponse::new("Task not found or not assigned to you")),
        ),
        Err(err) => {
            tracing::error!("Failed to update task status: {}", err);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(MessageResponse::new("Failed to update task")),
            )
        }
    }
}
