//! Read-side reconstruction of denormalized views.
//!
//! The store holds one document per batch with id references only, so every
//! view here re-derives its joins, filters, and aggregates in memory from
//! batch snapshots before slicing out the requested page. Absence of data is
//! an expected state: every function degrades to an empty result rather
//! than an error.

use super::types::{BatchSummary, HistoryEntry, PageParams, TaskView, WorkerRef};
use crate::directory::registry::PrincipalDirectory;
use crate::directory::types::PrincipalId;
use crate::storage::store::BatchStore;
use crate::storage::types::Batch;

use chrono::{DateTime, SecondsFormat, Utc};
use std::collections::{HashMap, HashSet};

/// Renders an upload timestamp the way the history search filters it.
pub fn iso_millis(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// The owner's most recent batch set, joined with worker identity.
///
/// All batches at the single maximum `uploaded_at` are returned, filtered by
/// a case-insensitive substring over worker name or email, sorted by worker
/// name.
pub fn latest_batches(
    store: &BatchStore,
    directory: &PrincipalDirectory,
    owner: &PrincipalId,
    search: &str,
    page: &PageParams,
) -> (Vec<BatchSummary>, usize) {
    let batches = store.batches_for_owner(owner);
    let Some(latest) = batches.iter().map(|batch| batch.uploaded_at).max() else {
        return (Vec::new(), 0);
    };

    let set: Vec<Batch> = batches
        .into_iter()
        .filter(|batch| batch.uploaded_at == latest)
        .collect();

    page.paginate(joined_summaries(set, directory, search))
}

/// The owner's upload history, one entry per upload event.
///
/// Grouping runs first because the agent count is a derived aggregate; the
/// substring filter (against the ISO timestamp string) and the inclusive
/// agent-count range filter apply to the grouped entries in memory. An
/// inverted range simply matches nothing.
pub fn history(
    store: &BatchStore,
    owner: &PrincipalId,
    search: &str,
    min_agents: usize,
    max_agents: usize,
    page: &PageParams,
) -> (Vec<HistoryEntry>, usize) {
    let mut groups: HashMap<DateTime<Utc>, HashSet<PrincipalId>> = HashMap::new();
    for batch in store.batches_for_owner(owner) {
        groups.entry(batch.uploaded_at).or_default().insert(batch.worker);
    }

    let mut events: Vec<(DateTime<Utc>, usize)> = groups
        .into_iter()
        .map(|(uploaded_at, workers)| (uploaded_at, workers.len()))
        .collect();
    events.sort_by(|a, b| b.0.cmp(&a.0));

    let filtered: Vec<HistoryEntry> = events
        .into_iter()
        .map(|(uploaded_at, agents_count)| HistoryEntry {
            uploaded_at: iso_millis(&uploaded_at),
            agents_count,
        })
        .filter(|entry| {
            entry.uploaded_at.contains(search)
                && entry.agents_count >= min_agents
                && entry.agents_count <= max_agents
        })
        .collect();

    page.paginate(filtered)
}

/// One upload event in full: every batch at the exact timestamp, joined and
/// filtered like the latest view.
pub fn batch_detail(
    store: &BatchStore,
    directory: &PrincipalDirectory,
    owner: &PrincipalId,
    uploaded_at: DateTime<Utc>,
    search: &str,
    page: &PageParams,
) -> (Vec<BatchSummary>, usize) {
    let set: Vec<Batch> = store
        .batches_for_owner(owner)
        .into_iter()
        .filter(|batch| batch.uploaded_at == uploaded_at)
        .collect();

    page.paginate(joined_summaries(set, directory, search))
}

/// Every item across every batch the admin owns, flattened and joined with
/// worker identity.
pub fn owner_tasks(
    store: &BatchStore,
    directory: &PrincipalDirectory,
    owner: &PrincipalId,
    page: &PageParams,
) -> (Vec<TaskView>, usize) {
    let batches = store.batches_for_owner(owner);
    page.paginate(flattened_tasks(batches, Some(directory)))
}

/// The agent's own items across every batch assigned to it.
pub fn worker_tasks(
    store: &BatchStore,
    worker: &PrincipalId,
    page: &PageParams,
) -> (Vec<TaskView>, usize) {
    let batches = store.batches_for_worker(worker);
    page.paginate(flattened_tasks(batches, None))
}

/// One named agent's items within the owner's batches, plus the agent's
/// identity for the page heading.
///
/// Returns `None` when the agent is not in the directory at all; a deleted
/// agent still resolves, flagged, because its batches are history.
pub fn worker_tasks_for_owner(
    store: &BatchStore,
    directory: &PrincipalDirectory,
    owner: &PrincipalId,
    worker: &PrincipalId,
    page: &PageParams,
) -> Option<(WorkerRef, Vec<TaskView>, usize)> {
    let agent = worker_ref(directory, worker)?;

    let batches: Vec<Batch> = store
        .batches_for_owner(owner)
        .into_iter()
        .filter(|batch| batch.worker == *worker)
        .collect();

    let (tasks, total) = page.paginate(flattened_tasks(batches, Some(directory)));
    Some((agent, tasks, total))
}

fn worker_ref(directory: &PrincipalDirectory, id: &PrincipalId) -> Option<WorkerRef> {
    directory.get(id).map(|principal| WorkerRef {
        id: principal.id,
        name: principal.name,
        email: principal.email,
        deleted: principal.deleted,
    })
}

/// Joins batches with worker identity, applies the name/email substring
/// filter, and sorts by worker name (id as tiebreak, so pages are stable).
///
/// Batches whose worker id resolves to nothing are dropped, matching an
/// inner join; soft-deleted workers resolve normally and stay visible.
fn joined_summaries(
    batches: Vec<Batch>,
    directory: &PrincipalDirectory,
    search: &str,
) -> Vec<BatchSummary> {
    let needle = search.to_lowercase();
    let mut summaries: Vec<BatchSummary> = batches
        .into_iter()
        .filter_map(|batch| {
            let agent = worker_ref(directory, &batch.worker)?;
            Some(BatchSummary {
                id: batch.id,
                list: batch.ordered_items(),
                uploaded_at: batch.uploaded_at,
                agent,
            })
        })
        .filter(|summary| {
            needle.is_empty()
                || summary.agent.name.to_lowercase().contains(&needle)
                || summary.agent.email.to_lowercase().contains(&needle)
        })
        .collect();

    summaries.sort_by(|a, b| {
        (a.agent.name.to_lowercase(), a.agent.id).cmp(&(b.agent.name.to_lowercase(), b.agent.id))
    });
    summaries
}

/// Flattens batches into task rows, newest upload first, items in their
/// partition order.
///
/// The full flat list is computed before any slicing so page boundaries
/// never depend on how items happen to be grouped into batches. The sort
/// key (uploaded_at desc, batch id, item seq) is total, so identical reads
/// paginate identically.
fn flattened_tasks(
    mut batches: Vec<Batch>,
    directory: Option<&PrincipalDirectory>,
) -> Vec<TaskView> {
    batches.sort_by(|a, b| b.uploaded_at.cmp(&a.uploaded_at).then(a.id.cmp(&b.id)));

    let mut tasks = Vec::new();
    for batch in batches {
        let agent = directory.and_then(|dir| worker_ref(dir, &batch.worker));
        for item in batch.ordered_items() {
            tasks.push(TaskView::from_item(item, batch.uploaded_at, agent.as_ref()));
        }
    }
    tasks
}
