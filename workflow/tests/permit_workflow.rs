mod helpers;

use std::sync::Arc;

use db::models::permit_approval::{ApprovalStatus, ApproverRole};
use db::models::student_permit::{self, PermitStatus, PermitType};
use helpers::{after_hours_permit, guru_bk, sick_permit, waka, wali, RecordingNotifier};
use sea_orm::{DatabaseConnection, EntityTrait};
use workflow::directory::StaticDirectory;
use workflow::display::Badged;
use workflow::permit::{ApprovalDecision, ApprovalOutcome, PermitWorkflow};
use workflow::WorkflowError;

fn workflow(db: &DatabaseConnection) -> (PermitWorkflow, Arc<RecordingNotifier>) {
    let notifier = Arc::new(RecordingNotifier::default());
    let directory = Arc::new(
        StaticDirectory::new()
            .with_role(ApproverRole::WaliKelas, [101])
            .with_role(ApproverRole::GuruBk, [102])
            .with_role(ApproverRole::WakaKesiswaan, [103]),
    );
    (
        PermitWorkflow::new(db.clone(), notifier.clone(), directory),
        notifier,
    )
}

#[tokio::test]
async fn create_permit_writes_the_full_route_as_pending_steps() {
    let db = helpers::setup().await;
    let (permits, _) = workflow(&db);

    let created = permits
        .create_permit(after_hours_permit(1))
        .await
        .expect("create permit");

    assert_eq!(created.permit.status, PermitStatus::Pending);
    assert_eq!(created.permit.current_approval_stage, 1);
    assert_eq!(created.steps.len(), 3);

    let roles: Vec<ApproverRole> = created.steps.iter().map(|s| s.approver_role).collect();
    assert_eq!(
        roles,
        vec![
            ApproverRole::WaliKelas,
            ApproverRole::GuruBk,
            ApproverRole::WakaKesiswaan
        ]
    );
    let orders: Vec<i32> = created.steps.iter().map(|s| s.approval_order).collect();
    assert_eq!(orders, vec![1, 2, 3]);
    assert!(created
        .steps
        .iter()
        .all(|s| s.status == ApprovalStatus::Pending && s.approver_id.is_none()));
}

#[tokio::test]
async fn route_length_follows_permit_type() {
    let db = helpers::setup().await;
    let (permits, _) = workflow(&db);

    let sick = permits.create_permit(sick_permit(1)).await.expect("create");
    assert_eq!(sick.steps.len(), 1);

    let mut dispensation = sick_permit(2);
    dispensation.permit_type = PermitType::DispensasiAkademik;
    let dispensation = permits.create_permit(dispensation).await.expect("create");
    assert_eq!(dispensation.steps.len(), 2);
    assert_eq!(
        dispensation.steps[1].approver_role,
        ApproverRole::WakaKesiswaan
    );
}

#[tokio::test]
async fn validation_failure_writes_nothing() {
    let db = helpers::setup().await;
    let (permits, _) = workflow(&db);

    let mut input = after_hours_permit(1);
    input.activity_location = None;
    let err = permits.create_permit(input).await.unwrap_err();
    assert!(matches!(err, WorkflowError::Validation(_)));

    let permits_in_store = student_permit::Entity::find().all(&db).await.expect("query");
    assert!(permits_in_store.is_empty());
}

#[tokio::test]
async fn approval_advances_exactly_one_stage() {
    let db = helpers::setup().await;
    let (permits, _) = workflow(&db);

    let created = permits
        .create_permit(after_hours_permit(1))
        .await
        .expect("create permit");

    let outcome = permits
        .process_approval(created.permit.id, &wali(101), ApprovalDecision::Approved, None)
        .await
        .expect("approve stage 1");
    assert_eq!(outcome, ApprovalOutcome::Advanced { next_stage: 2 });

    let permit = student_permit::Model::find_by_id(&db, created.permit.id)
        .await
        .expect("query")
        .expect("permit exists");
    assert_eq!(permit.status, PermitStatus::Pending);
    assert_eq!(permit.current_approval_stage, 2);

    // Exactly one pending step is reachable and it matches the stage.
    let steps = permit.steps(&db).await.expect("steps");
    assert_eq!(steps[0].status, ApprovalStatus::Approved);
    assert_eq!(steps[0].approver_id, Some(101));
    assert!(steps[0].approved_at.is_some());
    assert_eq!(steps[1].status, ApprovalStatus::Pending);
    assert_eq!(steps[1].approval_order, permit.current_approval_stage);
    assert_eq!(steps[2].status, ApprovalStatus::Pending);
}

#[tokio::test]
async fn wrong_role_is_rejected_without_touching_state() {
    let db = helpers::setup().await;
    let (permits, _) = workflow(&db);

    let created = permits
        .create_permit(after_hours_permit(1))
        .await
        .expect("create permit");

    // Stage 1 belongs to the homeroom teacher, not the counselor.
    let err = permits
        .process_approval(created.permit.id, &guru_bk(102), ApprovalDecision::Approved, None)
        .await
        .unwrap_err();
    assert!(matches!(err, WorkflowError::Authorization(_)));

    let permit = student_permit::Model::find_by_id(&db, created.permit.id)
        .await
        .expect("query")
        .expect("permit exists");
    assert_eq!(permit.current_approval_stage, 1);
    assert!(permit
        .steps(&db)
        .await
        .expect("steps")
        .iter()
        .all(|s| s.status == ApprovalStatus::Pending));
}

#[tokio::test]
async fn second_decision_on_a_terminal_permit_is_a_state_error() {
    let db = helpers::setup().await;
    let (permits, _) = workflow(&db);

    let created = permits.create_permit(sick_permit(1)).await.expect("create");

    let outcome = permits
        .process_approval(created.permit.id, &wali(101), ApprovalDecision::Approved, None)
        .await
        .expect("approve only stage");
    assert_eq!(outcome, ApprovalOutcome::Approved);

    let err = permits
        .process_approval(created.permit.id, &wali(101), ApprovalDecision::Approved, None)
        .await
        .unwrap_err();
    assert!(matches!(err, WorkflowError::State(_)));

    // The stage was not double-counted.
    let permit = student_permit::Model::find_by_id(&db, created.permit.id)
        .await
        .expect("query")
        .expect("permit exists");
    assert_eq!(permit.status, PermitStatus::Approved);
    assert_eq!(permit.current_approval_stage, 1);
    assert_eq!(permit.reviewed_by, Some(101));
}

#[tokio::test]
async fn missing_permit_is_a_state_error() {
    let db = helpers::setup().await;
    let (permits, _) = workflow(&db);

    let err = permits
        .process_approval(9999, &wali(101), ApprovalDecision::Approved, None)
        .await
        .unwrap_err();
    assert!(matches!(err, WorkflowError::State(_)));
}

#[tokio::test]
async fn after_hours_permit_rejected_at_stage_two_end_to_end() {
    let db = helpers::setup().await;
    let (permits, notifier) = workflow(&db);

    let created = permits
        .create_permit(after_hours_permit(7))
        .await
        .expect("create permit");
    assert_eq!(created.steps.len(), 3);

    let outcome = permits
        .process_approval(created.permit.id, &wali(101), ApprovalDecision::Approved, None)
        .await
        .expect("wali approves");
    assert_eq!(outcome, ApprovalOutcome::Advanced { next_stage: 2 });

    let outcome = permits
        .process_approval(
            created.permit.id,
            &guru_bk(102),
            ApprovalDecision::Rejected,
            Some("insufficient justification"),
        )
        .await
        .expect("guru bk rejects");
    assert_eq!(outcome, ApprovalOutcome::Rejected);

    let permit = student_permit::Model::find_by_id(&db, created.permit.id)
        .await
        .expect("query")
        .expect("permit exists");
    assert_eq!(permit.status, PermitStatus::Rejected);
    assert_eq!(permit.reviewed_by, Some(102));
    assert_eq!(permit.review_notes.as_deref(), Some("insufficient justification"));

    // Rejection is terminal: the third step stays pending and untouched.
    let steps = permit.steps(&db).await.expect("steps");
    assert_eq!(steps[0].status, ApprovalStatus::Approved);
    assert_eq!(steps[1].status, ApprovalStatus::Rejected);
    assert_eq!(
        steps[1].notes.as_deref(),
        Some("insufficient justification")
    );
    assert_eq!(steps[2].status, ApprovalStatus::Pending);
    assert!(steps[2].approver_id.is_none());

    // A later decision on the rejected permit fails.
    let err = permits
        .process_approval(created.permit.id, &waka(103), ApprovalDecision::Approved, None)
        .await
        .unwrap_err();
    assert!(matches!(err, WorkflowError::State(_)));

    // Requester heard about both decisions; the counselor was told the
    // permit was waiting on them after stage 1.
    let sent = notifier.sent();
    let to_requester: Vec<_> = sent.iter().filter(|n| n.recipient_id == 7).collect();
    assert_eq!(to_requester.len(), 2);
    assert!(sent.iter().any(|n| n.recipient_id == 102));

    // Notification titles carry the same labels the status badges render.
    assert_eq!(
        to_requester[0].title,
        format!("Izin {}", PermitStatus::Pending.badge().label)
    );
    assert_eq!(
        to_requester[1].title,
        format!("Izin {}", PermitStatus::Rejected.badge().label)
    );
}
