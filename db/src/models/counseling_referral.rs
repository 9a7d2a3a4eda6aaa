use chrono::{DateTime, Utc};
use sea_orm::ActiveValue::Set;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use super::student_permit::UrgencyLevel;

/// A counseling referral for one student.
///
/// Violation-type referrals are created by the auto-referral engine; the
/// other types come from staff screens outside this core.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "counseling_referrals")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub student_id: i64,
    pub referral_type: ReferralType,
    pub urgency_level: UrgencyLevel,
    pub referral_reason: String,
    pub assigned_counselor: Option<i64>,
    pub status: ReferralStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(
    Debug, Clone, PartialEq, EnumIter, DeriveActiveEnum, Display, EnumString, Deserialize, Serialize,
)]
#[serde(rename_all = "snake_case")]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "referral_type")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum ReferralType {
    #[sea_orm(string_value = "violation")]
    Violation,

    #[sea_orm(string_value = "attendance")]
    Attendance,

    #[sea_orm(string_value = "academic")]
    Academic,

    #[sea_orm(string_value = "personal")]
    Personal,
}

#[derive(
    Debug, Clone, PartialEq, EnumIter, DeriveActiveEnum, Display, EnumString, Deserialize, Serialize,
)]
#[serde(rename_all = "snake_case")]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "referral_status")]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum ReferralStatus {
    #[sea_orm(string_value = "pending")]
    Pending,

    #[sea_orm(string_value = "in_progress")]
    InProgress,

    #[sea_orm(string_value = "completed")]
    Completed,

    #[sea_orm(string_value = "cancelled")]
    Cancelled,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    pub async fn create(
        db: &DatabaseConnection,
        student_id: i64,
        referral_type: ReferralType,
        urgency_level: UrgencyLevel,
        referral_reason: &str,
        assigned_counselor: Option<i64>,
    ) -> Result<Self, DbErr> {
        let now = Utc::now();
        ActiveModel {
            student_id: Set(student_id),
            referral_type: Set(referral_type),
            urgency_level: Set(urgency_level),
            referral_reason: Set(referral_reason.to_owned()),
            assigned_counselor: Set(assigned_counselor),
            status: Set(ReferralStatus::Pending),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(db)
        .await
    }

    /// True when the student already has a violation referral that is still
    /// open (pending or in progress). Completed and cancelled referrals do
    /// not suppress a new one.
    pub async fn has_open_violation_referral(
        db: &DatabaseConnection,
        student_id: i64,
    ) -> Result<bool, DbErr> {
        let open = Entity::find()
            .filter(Column::StudentId.eq(student_id))
            .filter(Column::ReferralType.eq(ReferralType::Violation))
            .filter(Column::Status.is_in([ReferralStatus::Pending, ReferralStatus::InProgress]))
            .one(db)
            .await?;
        Ok(open.is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::setup_test_db;

    #[tokio::test]
    async fn open_violation_referral_check_ignores_closed_and_other_types() {
        let db = setup_test_db().await;

        let referral = Model::create(
            &db,
            3,
            ReferralType::Violation,
            UrgencyLevel::High,
            "3 pelanggaran dalam 30 hari",
            None,
        )
        .await
        .expect("insert referral");

        assert!(Model::has_open_violation_referral(&db, 3)
            .await
            .expect("check referral"));
        assert!(!Model::has_open_violation_referral(&db, 4)
            .await
            .expect("check referral"));

        let mut active: ActiveModel = referral.into();
        active.status = Set(ReferralStatus::Completed);
        active.update(&db).await.expect("complete referral");

        assert!(!Model::has_open_violation_referral(&db, 3)
            .await
            .expect("check referral"));

        // A non-violation referral never suppresses auto-referral.
        Model::create(
            &db,
            3,
            ReferralType::Academic,
            UrgencyLevel::Normal,
            "nilai turun",
            None,
        )
        .await
        .expect("insert referral");
        assert!(!Model::has_open_violation_referral(&db, 3)
            .await
            .expect("check referral"));
    }
}
