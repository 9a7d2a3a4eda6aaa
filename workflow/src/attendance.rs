//! Geofenced self-attendance: check-in inside a zone during the morning
//! window, check-out outside all zones with automatic violation emission.

use std::sync::Arc;
use std::time::Duration;

use chrono::{NaiveDateTime, NaiveTime, Utc};
use db::models::attendance_location::Model as Location;
use db::models::self_attendance::{self, AttendanceStatus};
use db::models::student_violation;
use db::models::violation_type;
use sea_orm::ActiveValue::Set;
use sea_orm::{ActiveModelTrait, DatabaseConnection, TransactionTrait};
use tracing::{info, warn};
use util::config::AppConfig;

use crate::error::{WorkflowError, WorkflowResult};
use crate::events::StudentEvent;
use crate::geofence::is_within_location;
use crate::geolocate::{GeoReading, GeolocationProvider};
use crate::referral::ReferralEngine;

/// Morning window inside which check-in is accepted.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CheckInSchedule {
    pub check_in_start: NaiveTime,
    pub check_in_end: NaiveTime,
}

impl CheckInSchedule {
    pub fn from_config() -> Self {
        let cfg = AppConfig::global();
        Self {
            check_in_start: cfg.check_in_start,
            check_in_end: cfg.check_in_end,
        }
    }

    fn contains(&self, time: NaiveTime) -> bool {
        self.check_in_start <= time && time <= self.check_in_end
    }
}

/// Check-out thresholds and the points charged when they are crossed.
///
/// `early_threshold` is strictly before `late_threshold`, so at most one
/// violation can apply to a single check-out.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CheckOutPolicy {
    pub early_threshold: NaiveTime,
    pub late_threshold: NaiveTime,
    pub early_departure_points: i32,
    pub late_departure_points: i32,
}

impl CheckOutPolicy {
    pub fn from_config() -> Self {
        let cfg = AppConfig::global();
        Self {
            early_threshold: cfg.checkout_early_threshold,
            late_threshold: cfg.checkout_late_threshold,
            early_departure_points: cfg.early_departure_points,
            late_departure_points: cfg.late_departure_points,
        }
    }
}

/// What a check-out recorded.
#[derive(Debug, Clone)]
pub struct CheckOutResult {
    pub attendance: self_attendance::Model,
    pub violation: Option<student_violation::Model>,
}

pub struct AttendanceWorkflow {
    db: DatabaseConnection,
    locator: Arc<dyn GeolocationProvider>,
    policy: CheckOutPolicy,
    referrals: Option<Arc<ReferralEngine>>,
}

impl AttendanceWorkflow {
    pub fn new(
        db: DatabaseConnection,
        locator: Arc<dyn GeolocationProvider>,
        policy: CheckOutPolicy,
    ) -> Self {
        Self {
            db,
            locator,
            policy,
            referrals: None,
        }
    }

    /// Attaches the auto-referral engine, invoked after every committed
    /// violation.
    pub fn with_referrals(mut self, referrals: Arc<ReferralEngine>) -> Self {
        self.referrals = Some(referrals);
        self
    }

    /// Records a check-in for today.
    ///
    /// Guards, in order: not already checked in, inside the schedule
    /// window, position obtainable, position inside an active zone. Cheap
    /// state checks run before the device probe.
    pub async fn check_in(
        &self,
        student_id: i64,
        now: NaiveDateTime,
        schedule: &CheckInSchedule,
    ) -> WorkflowResult<self_attendance::Model> {
        let today = now.date();
        let time = now.time();

        let existing = self_attendance::Model::find_for_day(&self.db, student_id, today).await?;
        if existing.as_ref().is_some_and(|r| r.has_checked_in()) {
            return Err(WorkflowError::State(format!(
                "student {student_id} already checked in on {today}"
            )));
        }

        if !schedule.contains(time) {
            return Err(WorkflowError::Schedule(format!(
                "check-in is only open {}..={}, got {time}",
                schedule.check_in_start, schedule.check_in_end
            )));
        }

        let reading = self.probe_position().await?;
        let zones = Location::find_active(&self.db).await?;
        let zone = is_within_location(reading.latitude, reading.longitude, &zones).ok_or_else(
            || {
                WorkflowError::Location(format!(
                    "position ({}, {}) is outside every attendance zone",
                    reading.latitude, reading.longitude
                ))
            },
        )?;

        let stamp = Utc::now();
        let record = match existing {
            Some(record) => {
                let mut active: self_attendance::ActiveModel = record.into();
                active.check_in_time = Set(Some(time));
                active.check_in_location_id = Set(Some(zone.id));
                active.status = Set(AttendanceStatus::Present);
                active.updated_at = Set(stamp);
                active.update(&self.db).await?
            }
            None => {
                self_attendance::ActiveModel {
                    student_id: Set(student_id),
                    attendance_date: Set(today),
                    check_in_time: Set(Some(time)),
                    check_in_location_id: Set(Some(zone.id)),
                    check_out_time: Set(None),
                    status: Set(AttendanceStatus::Present),
                    violation_created: Set(false),
                    notes: Set(None),
                    created_at: Set(stamp),
                    updated_at: Set(stamp),
                }
                .insert(&self.db)
                .await?
            }
        };

        info!(student_id, %today, %time, zone_id = zone.id, "checked in");
        Ok(record)
    }

    /// Records a check-out for today and emits the early/late departure
    /// violation when the time falls outside the on-schedule band.
    ///
    /// The inverse geofence gate applies: the student must be outside every
    /// active zone. The attendance update and the violation row are written
    /// in one transaction; the referral engine runs after commit and its
    /// failures are logged, never rolled back.
    pub async fn check_out(
        &self,
        student_id: i64,
        now: NaiveDateTime,
    ) -> WorkflowResult<CheckOutResult> {
        let today = now.date();
        let time = now.time();

        let record = self_attendance::Model::find_for_day(&self.db, student_id, today)
            .await?
            .filter(|r| r.has_checked_in())
            .ok_or_else(|| {
                WorkflowError::State(format!(
                    "student {student_id} has no open check-in on {today}"
                ))
            })?;

        if record.has_checked_out() {
            return Err(WorkflowError::State(format!(
                "student {student_id} already checked out on {today}"
            )));
        }

        let reading = self.probe_position().await?;
        let zones = Location::find_active(&self.db).await?;
        if let Some(zone) = is_within_location(reading.latitude, reading.longitude, &zones) {
            return Err(WorkflowError::Location(format!(
                "still inside zone \"{}\"; move outside school grounds to check out",
                zone.name
            )));
        }

        let stamp = Utc::now();
        let txn = self.db.begin().await?;

        let violation = if time < self.policy.early_threshold {
            Some(
                self.record_departure_violation(
                    &txn,
                    student_id,
                    today,
                    "pulang_lebih_awal",
                    self.policy.early_departure_points,
                    &format!("Pulang lebih awal pukul {time} (batas {})", self.policy.early_threshold),
                )
                .await?,
            )
        } else if time > self.policy.late_threshold {
            Some(
                self.record_departure_violation(
                    &txn,
                    student_id,
                    today,
                    "pulang_terlambat",
                    self.policy.late_departure_points,
                    &format!("Pulang terlambat pukul {time} (batas {})", self.policy.late_threshold),
                )
                .await?,
            )
        } else {
            None
        };

        let mut active: self_attendance::ActiveModel = record.into();
        active.check_out_time = Set(Some(time));
        active.violation_created = Set(violation.is_some());
        if violation.is_none() {
            active.notes = Set(Some("on-schedule".to_owned()));
        }
        active.updated_at = Set(stamp);
        let attendance = active.update(&txn).await?;

        txn.commit().await?;

        info!(
            student_id,
            %today,
            %time,
            violation_created = violation.is_some(),
            "checked out"
        );

        if let (Some(violation), Some(engine)) = (&violation, &self.referrals) {
            let event = StudentEvent::ViolationRecorded {
                student_id,
                violation_id: violation.id,
                violation_date: violation.violation_date,
                recorded_at: stamp,
            };
            // Referral creation failing must not undo a recorded check-out.
            if let Err(err) = engine.handle_event(&event, None).await {
                warn!(student_id, %err, "auto-referral evaluation failed");
            }
        }

        Ok(CheckOutResult {
            attendance,
            violation,
        })
    }

    async fn record_departure_violation(
        &self,
        txn: &sea_orm::DatabaseTransaction,
        student_id: i64,
        date: chrono::NaiveDate,
        type_name: &str,
        points: i32,
        description: &str,
    ) -> WorkflowResult<student_violation::Model> {
        let violation_type = violation_type::Model::find_or_create_on(txn, type_name, points).await?;
        let stamp = Utc::now();
        let violation = student_violation::ActiveModel {
            student_id: Set(student_id),
            violation_type_id: Set(violation_type.id),
            violation_date: Set(date),
            description: Set(description.to_owned()),
            point_deduction: Set(points),
            status: Set(student_violation::ViolationStatus::Active),
            created_at: Set(stamp),
            updated_at: Set(stamp),
            ..Default::default()
        }
        .insert(txn)
        .await?;
        Ok(violation)
    }

    /// One position fix, bounded by the configured timeout. Timeout and
    /// provider failure both surface as location errors; there is no retry
    /// and no fallback source.
    async fn probe_position(&self) -> WorkflowResult<GeoReading> {
        let timeout = Duration::from_secs(AppConfig::global().geolocation_timeout_secs);
        match tokio::time::timeout(timeout, self.locator.current_position()).await {
            Ok(Ok(reading)) => Ok(reading),
            Ok(Err(err)) => Err(WorkflowError::Location(err.to_string())),
            Err(_) => Err(WorkflowError::Location(format!(
                "position request timed out after {}s",
                timeout.as_secs()
            ))),
        }
    }
}
