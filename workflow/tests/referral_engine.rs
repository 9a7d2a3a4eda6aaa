mod helpers;

use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use db::models::counseling_referral::{self, ReferralStatus, ReferralType};
use db::models::student_permit::UrgencyLevel;
use db::models::student_violation;
use db::models::violation_type;
use helpers::day;
use sea_orm::ActiveValue::Set;
use sea_orm::{ActiveModelTrait, DatabaseConnection, EntityTrait};
use workflow::attendance::{AttendanceWorkflow, CheckInSchedule, CheckOutPolicy};
use workflow::geolocate::FixedLocator;
use workflow::{ActingUser, ReferralEngine, ReferralRule, ReferralRuleSet, StudentEvent};

fn rule(threshold: u64, days: i64) -> ReferralRule {
    ReferralRule {
        violation_threshold: threshold,
        time_period_days: days,
        violation_type_filter: vec![],
        urgency_level: UrgencyLevel::High,
        auto_assign: false,
    }
}

async fn seed_violations(
    db: &DatabaseConnection,
    student_id: i64,
    type_name: &str,
    dates: &[NaiveDate],
) -> i64 {
    let vt = violation_type::Model::find_or_create(db, type_name, 5)
        .await
        .expect("violation type");
    let mut last_id = 0;
    for date in dates {
        let v = student_violation::Model::create(db, student_id, vt.id, *date, "pelanggaran", 5)
            .await
            .expect("violation");
        last_id = v.id;
    }
    last_id
}

fn event(student_id: i64, violation_id: i64, violation_date: NaiveDate) -> StudentEvent {
    StudentEvent::ViolationRecorded {
        student_id,
        violation_id,
        violation_date,
        recorded_at: Utc::now(),
    }
}

#[tokio::test]
async fn referral_fires_at_the_threshold_not_below() {
    let db = helpers::setup().await;
    let engine = ReferralEngine::new(db.clone(), ReferralRuleSet { rules: vec![rule(3, 30)] });

    let id = seed_violations(&db, 1, "terlambat_masuk", &[day(2026, 3, 10), day(2026, 3, 15)]).await;
    let created = engine
        .handle_event(&event(1, id, day(2026, 3, 15)), None)
        .await
        .expect("evaluate");
    assert!(created.is_none());

    let id = seed_violations(&db, 1, "terlambat_masuk", &[day(2026, 3, 20)]).await;
    let created = engine
        .handle_event(&event(1, id, day(2026, 3, 20)), None)
        .await
        .expect("evaluate")
        .expect("referral created");

    assert_eq!(created.referral_type, ReferralType::Violation);
    assert_eq!(created.urgency_level, UrgencyLevel::High);
    assert_eq!(created.status, ReferralStatus::Pending);
    assert!(created.referral_reason.contains('3'));
    assert!(created.assigned_counselor.is_none());
}

#[tokio::test]
async fn violations_outside_the_window_do_not_count() {
    let db = helpers::setup().await;
    let engine = ReferralEngine::new(db.clone(), ReferralRuleSet { rules: vec![rule(3, 30)] });

    // Two recent, one months old: stays below threshold.
    seed_violations(&db, 1, "terlambat_masuk", &[day(2026, 1, 5), day(2026, 3, 10)]).await;
    let id = seed_violations(&db, 1, "terlambat_masuk", &[day(2026, 3, 20)]).await;

    let created = engine
        .handle_event(&event(1, id, day(2026, 3, 20)), None)
        .await
        .expect("evaluate");
    assert!(created.is_none());
}

#[tokio::test]
async fn type_filter_restricts_the_count() {
    let db = helpers::setup().await;
    let mut filtered = rule(2, 30);
    filtered.violation_type_filter = vec!["pulang".to_owned()];
    let engine = ReferralEngine::new(db.clone(), ReferralRuleSet { rules: vec![filtered] });

    seed_violations(&db, 1, "terlambat_masuk", &[day(2026, 3, 10), day(2026, 3, 12)]).await;
    let id = seed_violations(&db, 1, "pulang_lebih_awal", &[day(2026, 3, 14)]).await;
    let created = engine
        .handle_event(&event(1, id, day(2026, 3, 14)), None)
        .await
        .expect("evaluate");
    assert!(created.is_none());

    let id = seed_violations(&db, 1, "pulang_terlambat", &[day(2026, 3, 16)]).await;
    let created = engine
        .handle_event(&event(1, id, day(2026, 3, 16)), None)
        .await
        .expect("evaluate")
        .expect("referral created");
    assert!(created.referral_reason.contains("pulang"));
}

#[tokio::test]
async fn open_referral_suppresses_a_second_one_until_closed() {
    let db = helpers::setup().await;
    let engine = ReferralEngine::new(db.clone(), ReferralRuleSet { rules: vec![rule(1, 30)] });

    let id = seed_violations(&db, 1, "terlambat_masuk", &[day(2026, 3, 10)]).await;
    let first = engine
        .handle_event(&event(1, id, day(2026, 3, 10)), None)
        .await
        .expect("evaluate")
        .expect("first referral");

    let id = seed_violations(&db, 1, "terlambat_masuk", &[day(2026, 3, 12)]).await;
    let second = engine
        .handle_event(&event(1, id, day(2026, 3, 12)), None)
        .await
        .expect("evaluate");
    assert!(second.is_none());

    // Closing the referral re-arms the engine.
    let mut active: counseling_referral::ActiveModel = first.into();
    active.status = Set(ReferralStatus::Completed);
    active.update(&db).await.expect("complete referral");

    let id = seed_violations(&db, 1, "terlambat_masuk", &[day(2026, 3, 14)]).await;
    let third = engine
        .handle_event(&event(1, id, day(2026, 3, 14)), None)
        .await
        .expect("evaluate");
    assert!(third.is_some());
}

#[tokio::test]
async fn auto_assign_uses_the_acting_user_when_present() {
    let db = helpers::setup().await;
    let mut assigning = rule(1, 30);
    assigning.auto_assign = true;
    let engine = ReferralEngine::new(db.clone(), ReferralRuleSet { rules: vec![assigning] });

    let id = seed_violations(&db, 1, "terlambat_masuk", &[day(2026, 3, 10)]).await;
    let actor = ActingUser::new(55, []);
    let created = engine
        .handle_event(&event(1, id, day(2026, 3, 10)), Some(&actor))
        .await
        .expect("evaluate")
        .expect("referral created");
    assert_eq!(created.assigned_counselor, Some(55));

    // System-triggered evaluation has no actor to assign.
    let id = seed_violations(&db, 2, "terlambat_masuk", &[day(2026, 3, 10)]).await;
    let created = engine
        .handle_event(&event(2, id, day(2026, 3, 10)), None)
        .await
        .expect("evaluate")
        .expect("referral created");
    assert!(created.assigned_counselor.is_none());
}

#[tokio::test]
async fn first_matching_rule_wins() {
    let db = helpers::setup().await;
    let mut urgent = rule(3, 30);
    urgent.urgency_level = UrgencyLevel::Urgent;
    let engine = ReferralEngine::new(
        db.clone(),
        ReferralRuleSet { rules: vec![urgent, rule(2, 30)] },
    );

    let id = seed_violations(
        &db,
        1,
        "terlambat_masuk",
        &[day(2026, 3, 10), day(2026, 3, 12), day(2026, 3, 14)],
    )
    .await;
    let created = engine
        .handle_event(&event(1, id, day(2026, 3, 14)), None)
        .await
        .expect("evaluate")
        .expect("referral created");
    assert_eq!(created.urgency_level, UrgencyLevel::Urgent);
}

/// A check-out violation that crosses a threshold creates the referral in
/// the same call, without any sweep.
#[tokio::test]
async fn early_check_out_violation_triggers_a_referral_reactively() {
    let db = helpers::setup().await;
    db::models::attendance_location::Model::create_radius(
        &db,
        "Gerbang Utama",
        -6.989899,
        110.420042,
        100.0,
    )
    .await
    .expect("seed location");

    let engine = Arc::new(ReferralEngine::new(
        db.clone(),
        ReferralRuleSet { rules: vec![rule(1, 30)] },
    ));

    let schedule = CheckInSchedule {
        check_in_start: chrono::NaiveTime::from_hms_opt(6, 0, 0).unwrap(),
        check_in_end: chrono::NaiveTime::from_hms_opt(7, 30, 0).unwrap(),
    };
    let policy = CheckOutPolicy {
        early_threshold: chrono::NaiveTime::from_hms_opt(15, 15, 0).unwrap(),
        late_threshold: chrono::NaiveTime::from_hms_opt(17, 15, 0).unwrap(),
        early_departure_points: 15,
        late_departure_points: 10,
    };

    let inside = AttendanceWorkflow::new(
        db.clone(),
        Arc::new(FixedLocator::at(-6.989899, 110.420042)),
        policy,
    );
    let morning = day(2026, 4, 1).and_hms_opt(7, 0, 0).unwrap();
    inside.check_in(1, morning, &schedule).await.expect("check in");

    let outside = AttendanceWorkflow::new(
        db.clone(),
        Arc::new(FixedLocator::at(-6.9885, 110.4300)),
        policy,
    )
    .with_referrals(engine);

    let afternoon = day(2026, 4, 1).and_hms_opt(14, 0, 0).unwrap();
    let result = outside.check_out(1, afternoon).await.expect("check out");
    assert!(result.violation.is_some());

    let referrals = counseling_referral::Entity::find()
        .all(&db)
        .await
        .expect("query referrals");
    assert_eq!(referrals.len(), 1);
    assert_eq!(referrals[0].student_id, 1);
    assert_eq!(referrals[0].referral_type, ReferralType::Violation);
}
