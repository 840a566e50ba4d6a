use super::registry::{DirectoryError, PrincipalDirectory};
use super::types::{require_role, MessageResponse, Principal, PrincipalId, Role};

use axum::extract::{Path, Query};
use axum::http::{HeaderMap, StatusCode};
use axum::{Extension, Json};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateAgentRequest {
    pub name: String,
    pub email: String,
    pub country_code: String,
    pub mobile: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentListParams {
    pub page: Option<usize>,
    pub limit: Option<usize>,
    pub search: Option<String>,
    pub include_deleted: Option<bool>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentListResponse {
    pub agents: Vec<Principal>,
    pub total: usize,
    pub page: usize,
    pub total_pages: usize,
}

pub async fn handle_create_agent(
    headers: HeaderMap,
    Extension(directory): Extension<Arc<PrincipalDirectory>>,
    Json(req): Json<CreateAgentRequest>,
) -> Result<Json<Principal>, (StatusCode, Json<MessageResponse>)> {
    require_role(&headers, Role::Admin)?;

    if let Err(reason) = validate_new_agent(&req) {
        return Err((StatusCode::BAD_REQUEST, Json(MessageResponse::new(&reason))));
    }

    let agent = Principal {
        id: PrincipalId::new(),
        name: req.name.trim().to_string(),
        email: req.email.trim().to_lowercase(),
        country_code: req.country_code.trim().to_string(),
        mobile: req.mobile.trim().to_string(),
        role: Role::Agent,
        deleted: false,
    };

    match directory.register(agent.clone()) {
        Ok(()) => Ok(Json(agent)),
        Err(DirectoryError::EmailTaken) => {
            tracing::warn!("Rejected duplicate agent email {}", agent.email);
            Err((
                StatusCode::BAD_REQUEST,
                Json(MessageResponse::new("Email already exists")),
            ))
        }
    }
}

pub async fn handle_list_agents(
    headers: HeaderMap,
    Query(params): Query<AgentListParams>,
    Extension(directory): Extension<Arc<PrincipalDirectory>>,
) -> Result<Json<AgentListResponse>, (StatusCode, Json<MessageResponse>)> {
    require_role(&headers, Role::Admin)?;

    let page = params.page.unwrap_or(1).max(1);
    let limit = params.limit.unwrap_or(5).clamp(1, 100);
    let search = params.search.unwrap_or_default();
    let include_deleted = params.include_deleted.unwrap_or(false);

    let agents = directory.list_agents(&search, include_deleted);
    let total = agents.len();
    let agents: Vec<Principal> = agents
        .into_iter()
        .skip((page - 1) * limit)
        .take(limit)
        .collect();

    Ok(Json(AgentListResponse {
        agents,
        total,
        page,
        total_pages: total.div_ceil(limit),
    }))
}

pub async fn handle_delete_agent(
    headers: HeaderMap,
    Path(id): Path<PrincipalId>,
    Extension(directory): Extension<Arc<PrincipalDirectory>>,
) -> (StatusCode, Json<MessageResponse>) {
    if let Err(rejection) = require_role(&headers, Role::Admin) {
        return rejection;
    }

    if directory.soft_delete(&id) {
        (
            StatusCode::OK,
            Json(MessageResponse::new("Agent soft deleted successfully.")),
        )
    } else {
        (
            StatusCode::NOT_FOUND,
            Json(MessageResponse::new("Agent not found or already deleted.")),
        )
    }
}

pub async fn handle_restore_agent(
    headers: HeaderMap,
    Path(id): Path<PrincipalId>,
    Extension(directory): Extension<Arc<PrincipalDirectory>>,
) -> (StatusCode, Json<MessageResponse>) {
    if let Err(rejection) = require_role(&headers, Role::Admin) {
        return rejection;
    }

    if directory.restore(&id) {
        (
            StatusCode::OK,
            Json(MessageResponse::new("Agent restored successfully.")),
        )
    } else {
        (
            StatusCode::NOT_FOUND,
            Json(MessageResponse::new("Agent not found or already active.")),
        )
    }
}

/// Field validation for agent creation.
///
/// Mobile numbers follow country-specific digit rules for the supported
/// calling codes, with a 7-15 digit fallback for everything else.
fn validate_new_agent(req: &CreateAgentRequest) -> Result<(), String> {
    if req.name.trim().is_empty() {
        return Err("Name is required".to_string());
    }

    let email_re = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    if !email_re.is_match(req.email.trim()) {
        return Err("Invalid email".to_string());
    }

    let code_re = Regex::new(r"^\+\d{1,4}$").unwrap();
    let code = req.country_code.trim();
    if !code_re.is_match(code) {
        return Err("Invalid country code format".to_string());
    }

    let number = req.mobile.trim();
    let digits_re = Regex::new(r"^\d{7,15}$").unwrap();
    if !digits_re.is_match(number) {
        return Err("Mobile must be 7 to 15 digits".to_string());
    }

    match code {
        "+91" => {
            if !Regex::new(r"^[6-9]\d{9}$").unwrap().is_match(number) {
                return Err(
                    "Indian mobile number must be 10 digits and start with 6-9".to_string()
                );
            }
        }
        "+1" => {
            if !Regex::new(r"^\d{10}$").unwrap().is_match(number) {
                return Err("US/Canada number must be exactly 10 digits".to_string());
            }
        }
        "+44" => {
            if !Regex::new(r"^\d{10,11}$").unwrap().is_match(number) {
                return Err("UK number must be 10 or 11 digits".to_string());
            }
        }
        "+61" => {
            if !Regex::new(r"^\d{9}$").unwrap().is_match(number) {
                return Err("Australian number must be 9 digits".to_string());
            }
        }
        _ => {}
    }

    Ok(())
}
