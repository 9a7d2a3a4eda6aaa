use chrono::{DateTime, Duration, NaiveDate, Utc};
use sea_orm::ActiveValue::Set;
use sea_orm::entity::prelude::*;
use sea_orm::{Condition, JoinType, PaginatorTrait, QuerySelect};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// A recorded disciplinary violation for one student.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "student_violations")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub student_id: i64,
    pub violation_type_id: i64,
    pub violation_date: NaiveDate,
    pub description: String,
    pub point_deduction: i32,
    pub status: ViolationStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(
    Debug, Clone, PartialEq, EnumIter, DeriveActiveEnum, Display, EnumString, Deserialize, Serialize,
)]
#[serde(rename_all = "snake_case")]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "violation_status")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum ViolationStatus {
    #[sea_orm(string_value = "active")]
    Active,

    #[sea_orm(string_value = "resolved")]
    Resolved,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::violation_type::Entity",
        from = "Column::ViolationTypeId",
        to = "super::violation_type::Column::Id"
    )]
    ViolationType,
}

impl Related<super::violation_type::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ViolationType.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    pub async fn create(
        db: &DatabaseConnection,
        student_id: i64,
        violation_type_id: i64,
        violation_date: NaiveDate,
        description: &str,
        point_deduction: i32,
    ) -> Result<Self, DbErr> {
        let now = Utc::now();
        ActiveModel {
            student_id: Set(student_id),
            violation_type_id: Set(violation_type_id),
            violation_date: Set(violation_date),
            description: Set(description.to_owned()),
            point_deduction: Set(point_deduction),
            status: Set(ViolationStatus::Active),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(db)
        .await
    }

    /// Counts this student's active violations dated inside the trailing
    /// window that ends at `window_end` (inclusive) and spans `window_days`
    /// calendar days.
    ///
    /// When `type_name_filters` is non-empty, only violations whose type name
    /// contains one of the given fragments are counted.
    pub async fn count_active_in_window(
        db: &DatabaseConnection,
        student_id: i64,
        window_end: NaiveDate,
        window_days: i64,
        type_name_filters: &[String],
    ) -> Result<u64, DbErr> {
        let window_start = window_end - Duration::days(window_days);

        let mut query = Entity::find()
            .filter(Column::StudentId.eq(student_id))
            .filter(Column::Status.eq(ViolationStatus::Active))
            .filter(Column::ViolationDate.gt(window_start))
            .filter(Column::ViolationDate.lte(window_end));

        if !type_name_filters.is_empty() {
            let mut name_cond = Condition::any();
            for fragment in type_name_filters {
                name_cond = name_cond.add(super::violation_type::Column::Name.contains(fragment));
            }
            query = query
                .join(JoinType::InnerJoin, Relation::ViolationType.def())
                .filter(name_cond);
        }

        query.count(db).await
    }

    pub async fn resolve(&self, db: &DatabaseConnection) -> Result<Self, DbErr> {
        let mut active_model: ActiveModel = self.clone().into();
        active_model.status = Set(ViolationStatus::Resolved);
        active_model.updated_at = Set(Utc::now());
        active_model.update(db).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::violation_type;
    use crate::test_utils::setup_test_db;

    async fn seed_type(db: &DatabaseConnection, name: &str) -> violation_type::Model {
        violation_type::Model::find_or_create(db, name, 10)
            .await
            .expect("seed violation type")
    }

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
    }

    #[tokio::test]
    async fn window_counts_are_bounded_by_date() {
        let db = setup_test_db().await;
        let vt = seed_type(&db, "terlambat_masuk").await;
        let end = day(2026, 3, 31);

        // One inside the 30-day window, one on the excluded lower bound,
        // one well outside.
        Model::create(&db, 7, vt.id, day(2026, 3, 20), "telat 10 menit", 5)
            .await
            .expect("insert violation");
        Model::create(&db, 7, vt.id, day(2026, 3, 1), "telat 5 menit", 5)
            .await
            .expect("insert violation");
        Model::create(&db, 7, vt.id, day(2026, 1, 10), "telat 20 menit", 5)
            .await
            .expect("insert violation");

        let count = Model::count_active_in_window(&db, 7, end, 30, &[])
            .await
            .expect("count violations");
        assert_eq!(count, 1);

        // Widening the window by one day picks up the boundary row.
        let count = Model::count_active_in_window(&db, 7, end, 31, &[])
            .await
            .expect("count violations");
        assert_eq!(count, 2);
    }

    #[tokio::test]
    async fn resolved_violations_are_not_counted() {
        let db = setup_test_db().await;
        let vt = seed_type(&db, "atribut_tidak_lengkap").await;
        let end = day(2026, 3, 31);

        let violation = Model::create(&db, 9, vt.id, day(2026, 3, 25), "tanpa dasi", 5)
            .await
            .expect("insert violation");
        violation.resolve(&db).await.expect("resolve violation");

        let count = Model::count_active_in_window(&db, 9, end, 30, &[])
            .await
            .expect("count violations");
        assert_eq!(count, 0);
    }

    #[tokio::test]
    async fn type_name_filter_matches_substrings() {
        let db = setup_test_db().await;
        let early = seed_type(&db, "pulang_lebih_awal").await;
        let late = seed_type(&db, "terlambat_masuk").await;
        let end = day(2026, 3, 31);

        Model::create(&db, 4, early.id, day(2026, 3, 28), "pulang 14:00", 15)
            .await
            .expect("insert violation");
        Model::create(&db, 4, late.id, day(2026, 3, 29), "telat masuk", 5)
            .await
            .expect("insert violation");

        let count =
            Model::count_active_in_window(&db, 4, end, 30, &["pulang".to_owned()])
                .await
                .expect("count violations");
        assert_eq!(count, 1);

        // Filters for other students' rows never leak across student ids.
        let count =
            Model::count_active_in_window(&db, 5, end, 30, &["pulang".to_owned()])
                .await
                .expect("count violations");
        assert_eq!(count, 0);
    }
}
