//! Ingestion Data Types
//!
//! Defines the uniform record shape produced by the normalizer and the DTOs
//! for the upload endpoint.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// One normalized row from an uploaded file.
///
/// The three recognized columns default to empty string when missing; any
/// other columns are carried through untyped in `extra` so downstream
/// consumers can render them without the core having to know their shape.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RawRecord {
    pub first_name: String,
    pub phone: String,
    pub notes: String,
    #[serde(flatten)]
    pub extra: HashMap<String, serde_json::Value>,
}

/// Query parameters accompanying an upload.
///
/// `agents` is the comma-separated list of agent ids the file should be
/// distributed across.
#[derive(Debug, Deserialize)]
pub struct UploadParams {
    pub agents: String,
}

/// Response returned once an upload has been distributed (or rejected).
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadResponse {
    pub message: String,
    pub batch_count: usize,
    pub uploaded_at: Option<DateTime<Utc>>,
}

impl UploadResponse {
    pub fn rejected(message: &str) -> Self {
        Self {
            message: message.to_string(),
            batch_count: 0,
            uploaded_at: None,
        }
    }
}
