//! Principal Directory Module
//!
//! Tracks the principals the service knows about: the admins who upload
//! files and the agents who receive partitions of them.
//!
//! ## Core Concepts
//! - **Identity**: Batches reference principals by id only; joined views are
//!   reconstructed by the query layer against this directory.
//! - **Soft delete**: Agents are never removed. A deleted agent keeps its
//!   directory entry so its historical batches render with a name, marked
//!   as deleted.
//! - **Auth boundary**: Authentication lives with the auth collaborator;
//!   this module only resolves the `{id, role}` pair it supplies per
//!   request and enforces role scoping.

pub mod handlers;
pub mod registry;
pub mod types;
