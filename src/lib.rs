//! Task Distribution Service Library
//!
//! This library crate defines the core modules that make up the distribution
//! service. It serves as the foundation for the binary executable (`main.rs`).
//!
//! ## Architecture Modules
//! The system is composed of four loosely coupled subsystems:
//!
//! - **`ingestion`**: The data intake pipeline. Normalizes uploaded tabular
//!   files (CSV or spreadsheet) into uniform records and runs the
//!   distribute flow that splits them across the selected agents.
//! - **`directory`**: The principal directory. Tracks admins and agents,
//!   including soft-deleted agents whose historical batches must still be
//!   rendered, and resolves the authenticated principal supplied by the
//!   auth layer.
//! - **`storage`**: The persistence layer. Implements the in-memory batch
//!   store (`BatchStore`), the round-robin partitioner, and targeted
//!   per-item status updates.
//! - **`query`**: The read side. Reconstructs denormalized views (latest
//!   batch set, upload history, flattened task lists) with pagination,
//!   search, and count filtering over the batch documents.

pub mod directory;
pub mod ingestion;
pub mod query;
pub mod storage;
