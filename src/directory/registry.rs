use super::types::{Principal, PrincipalId, Role};

use dashmap::DashMap;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DirectoryError {
    #[error("Email already exists")]
    EmailTaken,
}

/// The principal directory.
///
/// Holds every admin and agent the service knows about. Agents are soft
/// deleted: a deleted agent stays in the directory so historical batches can
/// still be joined against its name and email.
pub struct PrincipalDirectory {
    principals: DashMap<PrincipalId, Principal>,
}

impl PrincipalDirectory {
    pub fn new() -> Self {
        Self {
            principals: DashMap::new(),
        }
    }

    /// Registers a new principal.
    ///
    /// Emails are unique across the directory, deleted principals included,
    /// mirroring a unique index on the email column.
    pub fn register(&self, principal: Principal) -> Result<(), DirectoryError> {
        let email = principal.email.to_lowercase();
        let taken = self
            .principals
            .iter()
            .any(|entry| entry.value().email.to_lowercase() == email);
        if taken {
            return Err(DirectoryError::EmailTaken);
        }
        self.principals.insert(principal.id, principal);
        Ok(())
    }

    pub fn get(&self, id: &PrincipalId) -> Option<Principal> {
        self.principals.get(id).map(|entry| entry.value().clone())
    }

    /// True when the id refers to a non-deleted agent.
    pub fn is_active_agent(&self, id: &PrincipalId) -> bool {
        self.principals
            .get(id)
            .map(|entry| entry.value().role == Role::Agent && !entry.value().deleted)
            .unwrap_or(false)
    }

    /// Lists agents matching a case-insensitive substring of name, email, or
    /// mobile, sorted by name. Deleted agents are excluded unless requested.
    pub fn list_agents(&self, search: &str, include_deleted: bool) -> Vec<Principal> {
        let needle = search.to_lowercase();
        let mut agents: Vec<Principal> = self
            .principals
            .iter()
            .filter(|entry| entry.value().role == Role::Agent)
            .filter(|entry| include_deleted || !entry.value().deleted)
            .filter(|entry| {
                let agent = entry.value();
                needle.is_empty()
                    || agent.name.to_lowercase().contains(&needle)
                    || agent.email.to_lowercase().contains(&needle)
                    || agent.mobile.contains(&needle)
            })
            .map(|entry| entry.value().clone())
            .collect();
        agents.sort_by(|a, b| {
            (a.name.to_lowercase(), a.id).cmp(&(b.name.to_lowercase(), b.id))
        });
        agents
    }

    /// Soft deletes an active agent. Returns false when the id does not
    /// refer to an active agent.
    pub fn soft_delete(&self, id: &PrincipalId) -> bool {
        match self.principals.get_mut(id) {
            Some(mut entry) => {
                let agent = entry.value_mut();
                if agent.role != Role::Agent || agent.deleted {
                    return false;
                }
                agent.deleted = true;
                true
            }
            None => false,
        }
    }

    /// Restores a soft-deleted agent. Returns false when the id does not
    /// refer to a deleted agent.
    pub fn restore(&self, id: &PrincipalId) -> bool {
        match self.principals.get_mut(id) {
            Some(mut entry) => {
                let agent = entry.value_mut();
                if agent.role != Role::Agent || !agent.deleted {
                    return false;
                }
                agent.deleted = false;
                true
            }
            None => false,
        }
    }
}
