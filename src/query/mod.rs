//! Query Engine Module
//!
//! The read side of the service. Batches are stored one document per agent
//! per upload with id references only, so every view here is reconstructed
//! in memory: owner scoping, worker identity joins, substring search,
//! aggregate counts, and pagination over the final result.
//!
//! ## Read Patterns
//! - **Latest**: all batches at the owner's most recent upload timestamp.
//! - **History**: uploads grouped by timestamp with distinct agent counts,
//!   filtered after grouping.
//! - **Detail**: one upload event addressed by its exact timestamp.
//! - **Task overview**: items flattened across batches (owner-wide,
//!   per-agent, or one named agent), paginated on the flat list.
//!
//! ## Submodules
//! - **`engine`**: The view reconstruction logic.
//! - **`handlers`**: HTTP request handlers for the Axum web server.
//! - **`types`**: Pagination handling and response DTOs.

pub mod engine;
pub mod handlers;
pub mod types;
