use db::models::permit_approval::ApproverRole;

/// Explicit per-call identity of whoever is driving a workflow operation.
///
/// The source application held this in an ambient "current user" provider;
/// passing it explicitly keeps the role gates testable without a framework.
#[derive(Debug, Clone, PartialEq)]
pub struct ActingUser {
    pub id: i64,
    pub roles: Vec<ApproverRole>,
}

impl ActingUser {
    pub fn new(id: i64, roles: impl IntoIterator<Item = ApproverRole>) -> Self {
        Self {
            id,
            roles: roles.into_iter().collect(),
        }
    }

    pub fn has_role(&self, role: ApproverRole) -> bool {
        self.roles.contains(&role)
    }
}
