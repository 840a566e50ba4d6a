//! Batch Storage Types
//!
//! Defines the persisted document shapes: the per-agent `Batch` created at
//! upload time and the status-bearing `TaskItem`s inside it.

use crate::directory::types::PrincipalId;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Unique identifier for a batch document.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BatchId(pub uuid::Uuid);

impl BatchId {
    /// Generates a new random UUID v4-based BatchId.
    pub fn new() -> Self {
        Self(uuid::Uuid::new_v4())
    }
}

impl std::fmt::Display for BatchId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// Unique identifier for a task item, distinct from its position in the
/// batch. Status updates address items by this id.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ItemId(pub uuid::Uuid);

impl ItemId {
    /// Generates a new random UUID v4-based ItemId.
    pub fn new() -> Self {
        Self(uuid::Uuid::new_v4())
    }
}

impl std::fmt::Display for ItemId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// Lifecycle state of a task item.
///
/// Any state is reachable from any other; in practice agents toggle between
/// `Assigned` and `Completed`, with `InProgress` reserved for finer-grained
/// tracking.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum TaskStatus {
    #[default]
    Assigned,
    InProgress,
    Completed,
}

/// One unit of work inside a batch.
///
/// `seq` records the item's position within its bucket at partition time;
/// ordered views sort on it. Columns beyond the three recognized fields are
/// retained untyped in `extra` and flattened back into the serialized form.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TaskItem {
    pub id: ItemId,
    pub seq: u32,
    pub first_name: String,
    pub phone: String,
    pub notes: String,
    pub status: TaskStatus,
    #[serde(flatten)]
    pub extra: HashMap<String, serde_json::Value>,
}

/// One agent's share of one upload event.
///
/// Every batch created from the same upload shares `uploaded_at` exactly.
/// Membership is immutable after creation: only item status and
/// `updated_at` ever change, and batches are never deleted.
///
/// Items are stored as a keyed map so a status update addresses its target
/// in O(1) instead of scanning a positional list; `TaskItem::seq` preserves
/// the original ordering for reads.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Batch {
    pub id: BatchId,
    pub owner: PrincipalId,
    pub worker: PrincipalId,
    pub items: HashMap<ItemId, TaskItem>,
    pub uploaded_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Batch {
    /// Items in their original partition order.
    pub fn ordered_items(&self) -> Vec<TaskItem> {
        let mut items: Vec<TaskItem> = self.items.values().cloned().collect();
        items.sort_by_key(|item| item.seq);
        items
    }
}

/// Request body for the agent-facing status update endpoint.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusUpdateRequest {
    pub task_id: ItemId,
    pub status: TaskStatus,
}
