// Not every test binary uses every helper.
#![allow(dead_code)]

use std::sync::Mutex;

use async_trait::async_trait;
use chrono::NaiveDate;
use db::models::permit_approval::ApproverRole;
use db::models::student_permit::{PermitType, UrgencyLevel};
use sea_orm::DatabaseConnection;
use workflow::actor::ActingUser;
use workflow::notify::{Notification, NotificationSink, NotifyError};
use workflow::permit::CreatePermit;

/// Fills in the env the global config requires before any workflow call
/// touches it, then opens a fresh in-memory database.
pub async fn setup() -> DatabaseConnection {
    unsafe {
        std::env::set_var("DATABASE_PATH", "data/test.sqlite");
    }
    db::test_utils::setup_test_db().await
}

/// Notification sink that remembers everything it was asked to deliver.
#[derive(Default)]
pub struct RecordingNotifier {
    sent: Mutex<Vec<Notification>>,
}

impl RecordingNotifier {
    pub fn sent(&self) -> Vec<Notification> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl NotificationSink for RecordingNotifier {
    async fn deliver(&self, notification: &Notification) -> Result<(), NotifyError> {
        self.sent.lock().unwrap().push(notification.clone());
        Ok(())
    }
}

pub fn wali(id: i64) -> ActingUser {
    ActingUser::new(id, [ApproverRole::WaliKelas])
}

pub fn guru_bk(id: i64) -> ActingUser {
    ActingUser::new(id, [ApproverRole::GuruBk])
}

pub fn waka(id: i64) -> ActingUser {
    ActingUser::new(id, [ApproverRole::WakaKesiswaan])
}

pub fn day(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
}

pub fn sick_permit(student_id: i64) -> CreatePermit {
    CreatePermit {
        student_id,
        permit_type: PermitType::Sakit,
        urgency_level: UrgencyLevel::Normal,
        category: None,
        reason: "demam tinggi, disarankan istirahat".into(),
        start_date: day(2026, 4, 1),
        end_date: day(2026, 4, 2),
        start_time: None,
        end_time: None,
        activity_location: None,
        emergency_contact: None,
        parent_approval: false,
    }
}

pub fn after_hours_permit(student_id: i64) -> CreatePermit {
    CreatePermit {
        student_id,
        permit_type: PermitType::KegiatanSetelahJamSekolah,
        urgency_level: UrgencyLevel::Normal,
        category: Some("ekstrakurikuler".into()),
        reason: "latihan paskibra persiapan lomba".into(),
        start_date: day(2026, 4, 3),
        end_date: day(2026, 4, 3),
        start_time: None,
        end_time: None,
        activity_location: Some("Lapangan upacara".into()),
        emergency_contact: Some("0812-3456-7890".into()),
        parent_approval: true,
    }
}
