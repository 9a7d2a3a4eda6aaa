use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// A leave/absence/activity request from a student.
///
/// `status` and `current_approval_stage` are derived exclusively from the
/// permit's ordered `permit_approvals` rows; only the permit workflow is
/// allowed to move them. Once `status` leaves `Pending` the row is terminal.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "student_permits")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
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
    pub status: PermitStatus,
    pub current_approval_stage: i32,
    pub submitted_at: DateTime<Utc>,
    pub reviewed_by: Option<i64>,
    pub reviewed_at: Option<DateTime<Utc>>,
    pub review_notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(
    Debug, Clone, PartialEq, EnumIter, DeriveActiveEnum, Display, EnumString, Deserialize, Serialize,
)]
#[serde(rename_all = "snake_case")]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "permit_type")]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum PermitType {
    #[sea_orm(string_value = "sakit")]
    Sakit,

    #[sea_orm(string_value = "izin_keluarga")]
    IzinKeluarga,

    #[sea_orm(string_value = "dispensasi_akademik")]
    DispensasiAkademik,

    #[sea_orm(string_value = "kegiatan_setelah_jam_sekolah")]
    KegiatanSetelahJamSekolah,
}

#[derive(
    Debug, Clone, PartialEq, EnumIter, DeriveActiveEnum, Display, EnumString, Deserialize, Serialize,
)]
#[serde(rename_all = "snake_case")]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "urgency_level")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum UrgencyLevel {
    #[sea_orm(string_value = "low")]
    Low,

    #[sea_orm(string_value = "normal")]
    Normal,

    #[sea_orm(string_value = "high")]
    High,

    #[sea_orm(string_value = "urgent")]
    Urgent,
}

#[derive(
    Debug, Clone, PartialEq, EnumIter, DeriveActiveEnum, Display, EnumString, Deserialize, Serialize,
)]
#[serde(rename_all = "snake_case")]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "permit_status")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum PermitStatus {
    #[sea_orm(string_value = "pending")]
    Pending,

    #[sea_orm(string_value = "approved")]
    Approved,

    #[sea_orm(string_value = "rejected")]
    Rejected,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::permit_approval::Entity")]
    PermitApproval,
}

impl Related<super::permit_approval::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::PermitApproval.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    pub async fn find_by_id(db: &DatabaseConnection, id: i64) -> Result<Option<Self>, DbErr> {
        Entity::find_by_id(id).one(db).await
    }

    /// The permit's approval route rows, ordered by `approval_order`.
    pub async fn steps(
        &self,
        db: &DatabaseConnection,
    ) -> Result<Vec<super::permit_approval::Model>, DbErr> {
        super::permit_approval::Model::find_for_permit(db, self.id).await
    }

    pub fn is_terminal(&self) -> bool {
        self.status != PermitStatus::Pending
    }
}
