use chrono::{DateTime, Utc};
use sea_orm::QueryOrder;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// One stage of a permit's approval route.
///
/// All rows for a permit are inserted together at submission time, with
/// `approval_order` contiguous from 1. A row is mutated exactly once, from
/// `Pending` to `Approved` or `Rejected`; rows after a rejected stage stay
/// `Pending` but are unreachable.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "permit_approvals")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub permit_id: i64,
    pub approver_role: ApproverRole,
    pub approval_order: i32,
    pub status: ApprovalStatus,
    pub approver_id: Option<i64>,
    pub approved_at: Option<DateTime<Utc>>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Staff roles that may sit on an approval route.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    EnumIter,
    DeriveActiveEnum,
    Display,
    EnumString,
    Deserialize,
    Serialize,
)]
#[serde(rename_all = "snake_case")]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "approver_role")]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum ApproverRole {
    #[sea_orm(string_value = "wali_kelas")]
    WaliKelas,

    #[sea_orm(string_value = "guru_bk")]
    GuruBk,

    #[sea_orm(string_value = "waka_kesiswaan")]
    WakaKesiswaan,
}

#[derive(
    Debug, Clone, PartialEq, EnumIter, DeriveActiveEnum, Display, EnumString, Deserialize, Serialize,
)]
#[serde(rename_all = "snake_case")]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "approval_status")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum ApprovalStatus {
    #[sea_orm(string_value = "pending")]
    Pending,

    #[sea_orm(string_value = "approved")]
    Approved,

    #[sea_orm(string_value = "rejected")]
    Rejected,

    #[sea_orm(string_value = "skipped")]
    Skipped,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::student_permit::Entity",
        from = "Column::PermitId",
        to = "super::student_permit::Column::Id",
        on_delete = "Cascade"
    )]
    StudentPermit,
}

impl Related<super::student_permit::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::StudentPermit.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    pub async fn find_for_permit(
        db: &DatabaseConnection,
        permit_id: i64,
    ) -> Result<Vec<Self>, DbErr> {
        Entity::find()
            .filter(Column::PermitId.eq(permit_id))
            .order_by_asc(Column::ApprovalOrder)
            .all(db)
            .await
    }

    /// The step whose `approval_order` matches the permit's current stage.
    pub async fn find_stage(
        db: &DatabaseConnection,
        permit_id: i64,
        approval_order: i32,
    ) -> Result<Option<Self>, DbErr> {
        Entity::find()
            .filter(Column::PermitId.eq(permit_id))
            .filter(Column::ApprovalOrder.eq(approval_order))
            .one(db)
            .await
    }
}
