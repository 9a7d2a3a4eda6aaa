use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// One self-attendance row per student per calendar day.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "student_self_attendances")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub student_id: i64,
    #[sea_orm(primary_key, auto_increment = false)]
    pub attendance_date: NaiveDate,

    pub check_in_time: Option<NaiveTime>,
    pub check_in_location_id: Option<i64>,
    pub check_out_time: Option<NaiveTime>,
    pub status: AttendanceStatus,
    pub violation_created: bool,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(
    Debug, Clone, PartialEq, EnumIter, DeriveActiveEnum, Display, EnumString, Deserialize, Serialize,
)]
#[serde(rename_all = "snake_case")]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "attendance_status")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum AttendanceStatus {
    #[sea_orm(string_value = "present")]
    Present,

    #[sea_orm(string_value = "absent")]
    Absent,

    #[sea_orm(string_value = "late")]
    Late,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::attendance_location::Entity",
        from = "Column::CheckInLocationId",
        to = "super::attendance_location::Column::Id"
    )]
    CheckInLocation,
}

impl Related<super::attendance_location::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::CheckInLocation.def()
    }
    fn via() -> Option<RelationDef> {
        None
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    pub async fn find_for_day(
        db: &DatabaseConnection,
        student_id: i64,
        day: NaiveDate,
    ) -> Result<Option<Self>, DbErr> {
        Entity::find_by_id((student_id, day)).one(db).await
    }

    pub fn has_checked_in(&self) -> bool {
        self.check_in_time.is_some()
    }

    pub fn has_checked_out(&self) -> bool {
        self.check_out_time.is_some()
    }
}
