//! Query Data Types
//!
//! Page-parameter handling and the DTOs the read endpoints project batch
//! documents into.

use crate::directory::types::PrincipalId;
use crate::storage::types::{BatchId, ItemId, TaskItem, TaskStatus};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Caller-supplied pagination, clamped server-side.
///
/// Page is at least 1 and the limit is bounded so a pathological request
/// cannot ask for an unbounded response.
#[derive(Debug, Clone, Copy)]
pub struct PageParams {
    pub page: usize,
    pub limit: usize,
}

impl PageParams {
    pub fn clamped(page: Option<usize>, limit: Option<usize>, default_limit: usize) -> Self {
        Self {
            page: page.unwrap_or(1).max(1),
            limit: limit.unwrap_or(default_limit).clamp(1, 100),
        }
    }

    /// Slices one page out of a fully computed result list.
    ///
    /// Returns the page plus the pre-slice total, so callers can compute
    /// exact page counts.
    pub fn paginate<T>(&self, items: Vec<T>) -> (Vec<T>, usize) {
        let total = items.len();
        let page_items = items
            .into_iter()
            .skip((self.page - 1) * self.limit)
            .take(self.limit)
            .collect();
        (page_items, total)
    }

    pub fn total_pages(&self, total: usize) -> usize {
        total.div_ceil(self.limit)
    }
}

/// The slice of worker identity that joined views expose.
///
/// Deleted workers are rendered, not hidden; the flag lets the caller mark
/// them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkerRef {
    pub id: PrincipalId,
    pub name: String,
    pub email: String,
    pub deleted: bool,
}

/// One batch joined with its worker, as shown in the latest and detail
/// views. The owner reference is deliberately not projected.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchSummary {
    pub id: BatchId,
    pub agent: WorkerRef,
    pub list: Vec<TaskItem>,
    pub uploaded_at: DateTime<Utc>,
}

/// One upload event in the history view.
///
/// The timestamp is rendered as its ISO string because the history search
/// filters against that exact form.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntry {
    pub uploaded_at: String,
    pub agents_count: usize,
}

/// One flattened task row in the overview views.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskView {
    pub id: ItemId,
    pub first_name: String,
    pub phone: String,
    pub notes: String,
    pub status: TaskStatus,
    pub uploaded_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub agent_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub agent_email: Option<String>,
}

impl TaskView {
    pub fn from_item(
        item: TaskItem,
        uploaded_at: DateTime<Utc>,
        agent: Option<&WorkerRef>,
    ) -> Self {
        Self {
            id: item.id,
            first_name: item.first_name,
            phone: item.phone,
            notes: item.notes,
            status: item.status,
            uploaded_at,
            agent_name: agent.map(|a| a.name.clone()),
            agent_email: agent.map(|a| a.email.clone()),
        }
    }
}

// --- Response envelopes ---

#[derive(Debug, Serialize)]
pub struct LatestListResponse {
    pub lists: Vec<BatchSummary>,
    pub total: usize,
}

#[derive(Debug, Serialize)]
pub struct HistoryResponse {
    pub history: Vec<HistoryEntry>,
    pub total: usize,
}

#[derive(Debug, Serialize)]
pub struct BatchDetailResponse {
    pub list: Vec<BatchSummary>,
    pub total: usize,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskListResponse {
    pub tasks: Vec<TaskView>,
    pub total_tasks: usize,
    pub total_pages: usize,
    pub current_page: usize,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkerTaskListResponse {
    pub agent_name: String,
    pub agent_deleted: bool,
    pub tasks: Vec<TaskView>,
    pub total_tasks: usize,
    pub total_pages: usize,
    pub current_page: usize,
}
