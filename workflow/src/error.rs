use sea_orm::DbErr;

/// Result type shared by the workflow operations.
pub type WorkflowResult<T> = Result<T, WorkflowError>;

/// Failure taxonomy for the permit, attendance and referral workflows.
///
/// Every variant carries a human-readable message surfaced directly to the
/// caller; nothing here is retried automatically.
#[derive(Debug, thiserror::Error)]
pub enum WorkflowError {
    /// Bad or missing input, detected before any write.
    #[error("validation failed: {0}")]
    Validation(String),

    /// The acting user lacks the role required by the current approval step.
    #[error("not authorized: {0}")]
    Authorization(String),

    /// The target entity is not in the expected state (duplicate check-in,
    /// terminal permit, stale approval step, missing record).
    #[error("invalid state: {0}")]
    State(String),

    /// A geofence precondition was not met, or the position could not be
    /// obtained at all.
    #[error("location check failed: {0}")]
    Location(String),

    /// The action fell outside its allowed time window.
    #[error("outside allowed schedule: {0}")]
    Schedule(String),

    /// The underlying store call failed.
    #[error("database error: {0}")]
    Persistence(#[from] DbErr),
}
