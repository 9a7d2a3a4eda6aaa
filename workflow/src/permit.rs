//! Sequential, role-gated approval workflow for student permits.

use std::sync::Arc;

use chrono::{NaiveDate, NaiveTime, Utc};
use db::models::permit_approval::{self, ApprovalStatus};
use db::models::student_permit::{self, PermitStatus, PermitType, UrgencyLevel};
use sea_orm::ActiveValue::Set;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, TransactionTrait,
};
use tracing::{info, warn};

use crate::actor::ActingUser;
use crate::directory::Directory;
use crate::display::Badged;
use crate::error::{WorkflowError, WorkflowResult};
use crate::notify::{Notification, NotificationSink};
use crate::routing::approval_route;

/// Input for a new permit request.
#[derive(Debug, Clone)]
pub struct CreatePermit {
    pub student_id: i64,
    pub permit_type: PermitType,
    pub urgency_level: UrgencyLevel,
    pub category: Option<String>,
    pub reason: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub start_time: Option<NaiveTime>,
    pub end_time: Option<NaiveTime>,
    pub activity_location: Option<String>,
    pub emergency_contact: Option<String>,
    pub parent_approval: bool,
}

/// A freshly created permit with its full step set, in route order.
#[derive(Debug, Clone)]
pub struct PermitWithSteps {
    pub permit: student_permit::Model,
    pub steps: Vec<permit_approval::Model>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApprovalDecision {
    Approved,
    Rejected,
}

/// What a `process_approval` call did to the permit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApprovalOutcome {
    /// An intermediate step was approved; the permit moved to this stage.
    Advanced { next_stage: i32 },
    /// The final step was approved; the permit is now approved.
    Approved,
    /// The current step was rejected; the permit is now rejected.
    Rejected,
}

pub struct PermitWorkflow {
    db: DatabaseConnection,
    notifier: Arc<dyn NotificationSink>,
    directory: Arc<dyn Directory>,
}

impl PermitWorkflow {
    pub fn new(
        db: DatabaseConnection,
        notifier: Arc<dyn NotificationSink>,
        directory: Arc<dyn Directory>,
    ) -> Self {
        Self {
            db,
            notifier,
            directory,
        }
    }

    /// Creates a permit plus its full ordered approval route in one
    /// transaction. The route is resolved from the permit type and the step
    /// set never changes afterwards.
    pub async fn create_permit(&self, input: CreatePermit) -> WorkflowResult<PermitWithSteps> {
        validate(&input)?;

        let route = approval_route(&input.permit_type);
        let now = Utc::now();

        let txn = self.db.begin().await?;

        let permit = student_permit::ActiveModel {
            student_id: Set(input.student_id),
            permit_type: Set(input.permit_type.clone()),
            urgency_level: Set(input.urgency_level.clone()),
            category: Set(input.category.clone()),
            reason: Set(input.reason.clone()),
            start_date: Set(input.start_date),
            end_date: Set(input.end_date),
            start_time: Set(input.start_time),
            end_time: Set(input.end_time),
            activity_location: Set(input.activity_location.clone()),
            emergency_contact: Set(input.emergency_contact.clone()),
            parent_approval: Set(input.parent_approval),
            status: Set(PermitStatus::Pending),
            current_approval_stage: Set(1),
            submitted_at: Set(now),
            reviewed_by: Set(None),
            reviewed_at: Set(None),
            review_notes: Set(None),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(&txn)
        .await?;

        let mut steps = Vec::with_capacity(route.len());
        for (index, role) in route.iter().enumerate() {
            let step = permit_approval::ActiveModel {
                permit_id: Set(permit.id),
                approver_role: Set(*role),
                approval_order: Set(index as i32 + 1),
                status: Set(ApprovalStatus::Pending),
                approver_id: Set(None),
                approved_at: Set(None),
                notes: Set(None),
                created_at: Set(now),
                updated_at: Set(now),
                ..Default::default()
            }
            .insert(&txn)
            .await?;
            steps.push(step);
        }

        txn.commit().await?;

        info!(
            permit_id = permit.id,
            student_id = permit.student_id,
            permit_type = %permit.permit_type,
            route_len = steps.len(),
            "permit submitted"
        );

        Ok(PermitWithSteps { permit, steps })
    }

    /// Applies one approve/reject decision to the permit's current pending
    /// step.
    ///
    /// The step and permit transitions are conditional writes keyed on the
    /// previous status, inside one transaction, so two approvers racing on
    /// the same stage can never both succeed; the loser gets a
    /// [`WorkflowError::State`].
    pub async fn process_approval(
        &self,
        permit_id: i64,
        acting: &ActingUser,
        decision: ApprovalDecision,
        notes: Option<&str>,
    ) -> WorkflowResult<ApprovalOutcome> {
        let permit = student_permit::Model::find_by_id(&self.db, permit_id)
            .await?
            .ok_or_else(|| WorkflowError::State(format!("permit {permit_id} does not exist")))?;

        if permit.is_terminal() {
            return Err(WorkflowError::State(format!(
                "permit {permit_id} is already {}",
                permit.status
            )));
        }

        let stage = permit.current_approval_stage;
        let step = permit_approval::Model::find_stage(&self.db, permit_id, stage)
            .await?
            .ok_or_else(|| {
                WorkflowError::State(format!("permit {permit_id} has no step at stage {stage}"))
            })?;

        if step.status != ApprovalStatus::Pending {
            return Err(WorkflowError::State(format!(
                "step {} of permit {permit_id} has already been decided",
                step.approval_order
            )));
        }

        if !acting.has_role(step.approver_role) {
            return Err(WorkflowError::Authorization(format!(
                "stage {stage} of permit {permit_id} requires role {}",
                step.approver_role
            )));
        }

        let total_steps = permit.steps(&self.db).await?.len() as i32;
        let is_last = stage >= total_steps;
        let now = Utc::now();

        let step_status = match decision {
            ApprovalDecision::Approved => ApprovalStatus::Approved,
            ApprovalDecision::Rejected => ApprovalStatus::Rejected,
        };

        let txn = self.db.begin().await?;

        // Compare-and-swap on the step: only the first writer finds it
        // still pending.
        let step_update = permit_approval::Entity::update_many()
            .col_expr(permit_approval::Column::Status, Expr::value(step_status))
            .col_expr(permit_approval::Column::ApproverId, Expr::value(acting.id))
            .col_expr(permit_approval::Column::ApprovedAt, Expr::value(now))
            .col_expr(
                permit_approval::Column::Notes,
                Expr::value(notes.map(str::to_owned)),
            )
            .col_expr(permit_approval::Column::UpdatedAt, Expr::value(now))
            .filter(permit_approval::Column::Id.eq(step.id))
            .filter(permit_approval::Column::Status.eq(ApprovalStatus::Pending))
            .exec(&txn)
            .await?;

        if step_update.rows_affected != 1 {
            txn.rollback().await?;
            return Err(WorkflowError::State(format!(
                "step {} of permit {permit_id} was decided concurrently",
                step.approval_order
            )));
        }

        let outcome = match decision {
            ApprovalDecision::Rejected => {
                self.transition_permit(
                    &txn,
                    &permit,
                    PermitStatus::Rejected,
                    stage,
                    Some((acting.id, now, notes)),
                )
                .await?;
                ApprovalOutcome::Rejected
            }
            ApprovalDecision::Approved if is_last => {
                self.transition_permit(
                    &txn,
                    &permit,
                    PermitStatus::Approved,
                    stage,
                    Some((acting.id, now, notes)),
                )
                .await?;
                ApprovalOutcome::Approved
            }
            ApprovalDecision::Approved => {
                self.advance_stage(&txn, &permit, stage).await?;
                ApprovalOutcome::Advanced {
                    next_stage: stage + 1,
                }
            }
        };

        txn.commit().await?;

        info!(
            permit_id,
            stage,
            approver_id = acting.id,
            ?outcome,
            "approval step processed"
        );

        self.notify_after(&permit, stage, outcome).await;

        Ok(outcome)
    }

    /// Moves the permit to a terminal status, conditioned on it still being
    /// pending at the expected stage.
    async fn transition_permit(
        &self,
        txn: &sea_orm::DatabaseTransaction,
        permit: &student_permit::Model,
        status: PermitStatus,
        expected_stage: i32,
        review: Option<(i64, chrono::DateTime<Utc>, Option<&str>)>,
    ) -> WorkflowResult<()> {
        let mut update = student_permit::Entity::update_many()
            .col_expr(student_permit::Column::Status, Expr::value(status))
            .col_expr(
                student_permit::Column::UpdatedAt,
                Expr::value(Utc::now()),
            );

        if let Some((reviewer, at, notes)) = review {
            update = update
                .col_expr(student_permit::Column::ReviewedBy, Expr::value(reviewer))
                .col_expr(student_permit::Column::ReviewedAt, Expr::value(at))
                .col_expr(
                    student_permit::Column::ReviewNotes,
                    Expr::value(notes.map(str::to_owned)),
                );
        }

        let result = update
            .filter(student_permit::Column::Id.eq(permit.id))
            .filter(student_permit::Column::Status.eq(PermitStatus::Pending))
            .filter(student_permit::Column::CurrentApprovalStage.eq(expected_stage))
            .exec(txn)
            .await?;

        if result.rows_affected != 1 {
            return Err(WorkflowError::State(format!(
                "permit {} moved concurrently",
                permit.id
            )));
        }
        Ok(())
    }

    async fn advance_stage(
        &self,
        txn: &sea_orm::DatabaseTransaction,
        permit: &student_permit::Model,
        expected_stage: i32,
    ) -> WorkflowResult<()> {
        let result = student_permit::Entity::update_many()
            .col_expr(
                student_permit::Column::CurrentApprovalStage,
                Expr::value(expected_stage + 1),
            )
            .col_expr(
                student_permit::Column::UpdatedAt,
                Expr::value(Utc::now()),
            )
            .filter(student_permit::Column::Id.eq(permit.id))
            .filter(student_permit::Column::Status.eq(PermitStatus::Pending))
            .filter(student_permit::Column::CurrentApprovalStage.eq(expected_stage))
            .exec(txn)
            .await?;

        if result.rows_affected != 1 {
            return Err(WorkflowError::State(format!(
                "permit {} moved concurrently",
                permit.id
            )));
        }
        Ok(())
    }

    /// Post-commit notifications. Delivery failures are logged, never
    /// propagated.
    async fn notify_after(
        &self,
        permit: &student_permit::Model,
        decided_stage: i32,
        outcome: ApprovalOutcome,
    ) {
        // Titles reuse the shared badge labels so the notification and the
        // dashboard always say the same thing about a status.
        let requester_note = match outcome {
            ApprovalOutcome::Rejected => Notification {
                recipient_id: permit.student_id,
                title: format!("Izin {}", PermitStatus::Rejected.badge().label),
                body: format!("Pengajuan izin #{} ditolak pada tahap {decided_stage}.", permit.id),
            },
            ApprovalOutcome::Approved => Notification {
                recipient_id: permit.student_id,
                title: format!("Izin {}", PermitStatus::Approved.badge().label),
                body: format!("Pengajuan izin #{} telah disetujui.", permit.id),
            },
            ApprovalOutcome::Advanced { next_stage } => Notification {
                recipient_id: permit.student_id,
                title: format!("Izin {}", PermitStatus::Pending.badge().label),
                body: format!(
                    "Pengajuan izin #{} lolos tahap {decided_stage}, menunggu tahap {next_stage}.",
                    permit.id
                ),
            },
        };

        if let Err(err) = self.notifier.deliver(&requester_note).await {
            warn!(permit_id = permit.id, %err, "requester notification failed");
        }

        if let ApprovalOutcome::Advanced { next_stage } = outcome {
            self.notify_next_approvers(permit, next_stage).await;
        }
    }

    async fn notify_next_approvers(&self, permit: &student_permit::Model, next_stage: i32) {
        let role = match permit_approval::Model::find_stage(&self.db, permit.id, next_stage).await {
            Ok(Some(step)) => step.approver_role,
            Ok(None) => return,
            Err(err) => {
                warn!(permit_id = permit.id, %err, "next-stage step lookup failed");
                return;
            }
        };

        let approvers = match self.directory.eligible_approvers(role).await {
            Ok(ids) => ids,
            Err(err) => {
                warn!(permit_id = permit.id, %role, %err, "approver lookup failed");
                return;
            }
        };

        for approver_id in approvers {
            let note = Notification {
                recipient_id: approver_id,
                title: format!(
                    "Persetujuan Izin {}",
                    ApprovalStatus::Pending.badge().label
                ),
                body: format!(
                    "Pengajuan izin #{} menunggu persetujuan Anda (tahap {next_stage}).",
                    permit.id
                ),
            };
            if let Err(err) = self.notifier.deliver(&note).await {
                warn!(permit_id = permit.id, approver_id, %err, "approver notification failed");
            }
        }
    }
}

fn validate(input: &CreatePermit) -> WorkflowResult<()> {
    if input.reason.trim().is_empty() {
        return Err(WorkflowError::Validation("reason must not be empty".into()));
    }
    if input.end_date < input.start_date {
        return Err(WorkflowError::Validation(
            "end_date must not be before start_date".into(),
        ));
    }

    if input.permit_type == PermitType::KegiatanSetelahJamSekolah {
        if blank(&input.activity_location) {
            return Err(WorkflowError::Validation(
                "after-hours activity permits require activity_location".into(),
            ));
        }
        if blank(&input.emergency_contact) {
            return Err(WorkflowError::Validation(
                "after-hours activity permits require emergency_contact".into(),
            ));
        }
        if !input.parent_approval {
            return Err(WorkflowError::Validation(
                "after-hours activity permits require parent approval".into(),
            ));
        }
    }

    if input.urgency_level == UrgencyLevel::Urgent && blank(&input.emergency_contact) {
        return Err(WorkflowError::Validation(
            "urgent permits require a parent contact".into(),
        ));
    }

    Ok(())
}

fn blank(value: &Option<String>) -> bool {
    value.as_deref().map_or(true, |v| v.trim().is_empty())
}
