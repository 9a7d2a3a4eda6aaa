use std::collections::HashMap;

use async_trait::async_trait;
use db::models::permit_approval::ApproverRole;

#[derive(Debug, thiserror::Error)]
pub enum DirectoryError {
    #[error("directory lookup failed: {0}")]
    Lookup(String),
}

/// Resolves staff identity questions against the external directory
/// service. The workflows only ever need one query: who holds a role.
#[async_trait]
pub trait Directory: Send + Sync {
    async fn eligible_approvers(&self, role: ApproverRole) -> Result<Vec<i64>, DirectoryError>;
}

/// In-memory role membership, for tests and single-school deployments where
/// the role assignments are known at startup.
#[derive(Debug, Default)]
pub struct StaticDirectory {
    members: HashMap<ApproverRole, Vec<i64>>,
}

impl StaticDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_role(mut self, role: ApproverRole, user_ids: impl IntoIterator<Item = i64>) -> Self {
        self.members.entry(role).or_default().extend(user_ids);
        self
    }
}

#[async_trait]
impl Directory for StaticDirectory {
    async fn eligible_approvers(&self, role: ApproverRole) -> Result<Vec<i64>, DirectoryError> {
        Ok(self.members.get(&role).cloned().unwrap_or_default())
    }
}
