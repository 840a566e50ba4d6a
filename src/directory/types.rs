use axum::http::{HeaderMap, StatusCode};
use axum::Json;
use serde::{Deserialize, Serialize};

/// Unique identifier for a principal (admin or agent).
///
/// Wrapper around a UUID to keep owner and worker references strongly typed
/// across the store and the query layer.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PrincipalId(pub uuid::Uuid);

impl PrincipalId {
    /// Generates a new random UUID v4-based PrincipalId.
    pub fn new() -> Self {
        Self(uuid::Uuid::new_v4())
    }
}

impl std::fmt::Display for PrincipalId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

impl std::str::FromStr for PrincipalId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(s.parse()?))
    }
}

/// Role attached to a principal by the auth layer.
///
/// Admins upload files and browse aggregate views; agents receive a slice of
/// each upload and update item status.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Agent,
}

/// A principal known to the directory.
///
/// Credentials and sessions live with the auth collaborator; the directory
/// only carries the identity that batches reference and joined views render.
/// The `deleted` flag is a soft delete: batches assigned to a deleted agent
/// remain part of history and must be shown as belonging to a deleted agent
/// rather than hidden.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Principal {
    pub id: PrincipalId,
    pub name: String,
    pub email: String,
    pub country_code: String,
    pub mobile: String,
    pub role: Role,
    pub deleted: bool,
}

/// The authenticated caller, as supplied by the auth layer.
///
/// The core trusts this pair and applies owner/worker scoping based solely
/// on it.
#[derive(Debug, Clone, Copy)]
pub struct AuthPrincipal {
    pub id: PrincipalId,
    pub role: Role,
}

impl AuthPrincipal {
    /// Resolves the caller from the `x-principal-id` / `x-principal-role`
    /// headers the auth layer injects.
    pub fn from_headers(headers: &HeaderMap) -> Option<Self> {
        let id: PrincipalId = headers
            .get("x-principal-id")?
            .to_str()
            .ok()?
            .parse()
            .ok()?;
        let role = match headers.get("x-principal-role")?.to_str().ok()? {
            "admin" => Role::Admin,
            "agent" => Role::Agent,
            _ => return None,
        };
        Some(Self { id, role })
    }
}

/// Generic message payload returned by mutation endpoints and error branches.
#[derive(Debug, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: &str) -> Self {
        Self {
            message: message.to_string(),
        }
    }
}

/// Resolves the caller and enforces the required role.
///
/// Missing or unparseable headers yield 401; a valid principal with the
/// wrong role yields 403.
pub fn require_role(
    headers: &HeaderMap,
    role: Role,
) -> Result<AuthPrincipal, (StatusCode, Json<MessageResponse>)> {
    match AuthPrincipal::from_headers(headers) {
        Some(principal) if principal.role == role => Ok(principal),
        Some(_) => Err((
            StatusCode::FORBIDDEN,
            Json(MessageResponse::new("Forbidden")),
        )),
        None => Err((
            StatusCode::UNAUTHORIZED,
            Json(MessageResponse::new("Unauthorised")),
        )),
    }
}
