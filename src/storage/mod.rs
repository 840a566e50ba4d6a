//! Batch Storage Module
//!
//! The persistence layer for distributed work lists.
//!
//! ## Core Concepts
//! - **Partitioning**: Uploaded records are split round-robin across the
//!   selected agents, one ordered bucket per agent.
//! - **Batches**: Each bucket is persisted as one `Batch` document scoped to
//!   the uploading admin. Membership is immutable; only item status changes.
//! - **Status updates**: Items are keyed by id inside their batch, giving
//!   addressed O(1) status writes scoped to the owning agent.

pub mod handlers;
pub mod partitioner;
pub mod store;
pub mod types;

#[cfg(test)]
mod tests;
