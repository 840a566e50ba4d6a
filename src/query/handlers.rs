use super::engine;
use super::types::{
    BatchDetailResponse, HistoryResponse, LatestListResponse, PageParams, TaskListResponse,
    WorkerTaskListResponse,
};
use crate::directory::registry::PrincipalDirectory;
use crate::directory::types::{require_role, MessageResponse, PrincipalId, Role};
use crate::storage::store::BatchStore;

use axum::extract::{Path, Query};
use axum::http::{HeaderMap, StatusCode};
use axum::{Extension, Json};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::sync::Arc;

#[derive(Debug, Deserialize)]
pub struct ListParams {
    pub page: Option<usize>,
    pub limit: Option<usize>,
    pub search: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryParams {
    pub page: Option<usize>,
    pub limit: Option<usize>,
    pub search: Option<String>,
    pub min_agents: Option<usize>,
    pub max_agents: Option<usize>,
}

#[derive(Debug, Deserialize)]
pub struct TaskPageParams {
    pub page: Option<usize>,
    pub limit: Option<usize>,
}

/// GET /api/uploads/latest - the most recent batch set.
pub async fn handle_latest_lists(
    headers: HeaderMap,
    Query(params): Query<ListParams>,
    Extension(store): Extension<Arc<BatchStore>>,
    Extension(directory): Extension<Arc<PrincipalDirectory>>,
) -> Result<Json<LatestListResponse>, (StatusCode, Json<MessageResponse>)> {
    let caller = require_role(&headers, Role::Admin)?;

    let page = PageParams::clamped(params.page, params.limit, 5);
    let search = params.search.unwrap_or_default();
    let (lists, total) = engine::latest_batches(&store, &directory, &caller.id, &search, &page);

    Ok(Json(LatestListResponse { lists, total }))
}

/// GET /api/uploads/history - upload events, newest first.
pub async fn handle_history(
    headers: HeaderMap,
    Query(params): Query<HistoryParams>,
    Extension(store): Extension<Arc<BatchStore>>,
) -> Result<Json<HistoryResponse>, (StatusCode, Json<MessageResponse>)> {
    let caller = require_role(&headers, Role::Admin)?;

    let page = PageParams::clamped(params.page, params.limit, 5);
    let search = params.search.unwrap_or_default();
    let min_agents = params.min_agents.unwrap_or(0);
    let max_agents = params.max_agents.unwrap_or(usize::MAX);

    let (history, total) = engine::history(
        &store,
        &caller.id,
        &search,
        min_agents,
        max_agents,
        &page,
    );

    Ok(Json(HistoryResponse { history, total }))
}

/// GET /api/uploads/history/:timestamp - one upload event in full.
pub async fn handle_batch_detail(
    headers: HeaderMap,
    Path(timestamp): Path<String>,
    Query(params): Query<ListParams>,
    Extension(store): Extension<Arc<BatchStore>>,
    Extension(directory): Extension<Arc<PrincipalDirectory>>,
) -> Result<Json<BatchDetailResponse>, (StatusCode, Json<MessageResponse>)> {
    let caller = require_role(&headers, Role::Admin)?;

    let uploaded_at: DateTime<Utc> = match DateTime::parse_from_rfc3339(&timestamp) {
        Ok(parsed) => parsed.with_timezone(&Utc),
        Err(err) => {
            tracing::warn!("Rejected bad history timestamp {:?}: {}", timestamp, err);
            return Err((
                StatusCode::BAD_REQUEST,
                Json(MessageResponse::new("Invalid timestamp")),
            ));
        }
    };

    let page = PageParams::clamped(params.page, params.limit, 10);
    let search = params.search.unwrap_or_default();
    let (list, total) =
        engine::batch_detail(&store, &directory, &caller.id, uploaded_at, &search, &page);

    Ok(Json(BatchDetailResponse { list, total }))
}

/// GET /api/tasks - all tasks across all agents, for the admin overview.
pub async fn handle_admin_tasks(
    headers: HeaderMap,
    Query(params): Query<TaskPageParams>,
    Extension(store): Extension<Arc<BatchStore>>,
    Extension(directory): Extension<Arc<PrincipalDirectory>>,
) -> Result<Json<TaskListResponse>, (StatusCode, Json<MessageResponse>)> {
    let caller = require_role(&headers, Role::Admin)?;

    let page = PageParams::clamped(params.page, params.limit, 8);
    let (tasks, total) = engine::owner_tasks(&store, &directory, &caller.id, &page);

    Ok(Json(TaskListResponse {
        tasks,
        total_tasks: total,
        total_pages: page.total_pages(total),
        current_page: page.page,
    }))
}

/// GET /api/agents/tasks - the calling agent's own task list.
pub async fn handle_agent_tasks(
    headers: HeaderMap,
    Query(params): Query<TaskPageParams>,
    Extension(store): Extension<Arc<BatchStore>>,
) -> Result<Json<TaskListResponse>, (StatusCode, Json<MessageResponse>)> {
    let caller = require_role(&headers, Role::Agent)?;

    let page = PageParams::clamped(params.page, params.limit, 8);
    let (tasks, total) = engine::worker_tasks(&store, &caller.id, &page);

    Ok(Json(TaskListResponse {
        tasks,
        total_tasks: total,
        total_pages: page.total_pages(total),
        current_page: page.page,
    }))
}

/// GET /api/agents/:id/tasks - one agent's tasks within the admin's batches.
pub async fn handle_agent_tasks_for_admin(
    headers: HeaderMap,
    Path(agent_id): Path<PrincipalId>,
    Query(params): Query<TaskPageParams>,
    Extension(store): Extension<Arc<BatchStore>>,
    Extension(directory): Extension<Arc<PrincipalDirectory>>,
) -> Result<Json<WorkerTaskListResponse>, (StatusCode, Json<MessageResponse>)> {
    let caller = require_role(&headers, Role::Admin)?;

    let page = PageParams::clamped(params.page, params.limit, 8);
    match engine::worker_tasks_for_owner(&store, &directory, &caller.id, &agent_id, &page) {
        Some((agent, tasks, total)) => Ok(Json(WorkerTaskListResponse {
            agent_name: agent.name,
            agent_deleted: agent.deleted,
            tasks,
            total_tasks: total,
            total_pages: page.total_pages(total),
            current_page: page.page,
        })),
        None => Err((
            StatusCode::NOT_FOUND,
            Json(MessageResponse::new("Agent not found")),
        )),
    }
}
