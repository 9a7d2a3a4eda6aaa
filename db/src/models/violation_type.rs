use chrono::{DateTime, Utc};
use sea_orm::ActiveValue::Set;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Catalogue of disciplinary violation kinds and their default point cost.
///
/// Rows are created by the seeder or lazily the first time a workflow
/// records a violation of a kind that does not exist yet.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "violation_types")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub name: String,
    pub default_point_deduction: i32,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::student_violation::Entity")]
    StudentViolation,
}

impl Related<super::student_violation::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::StudentViolation.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    pub async fn find_by_name(db: &DatabaseConnection, name: &str) -> Result<Option<Self>, DbErr> {
        Entity::find().filter(Column::Name.eq(name)).one(db).await
    }

    /// Returns the catalogue entry with this name, inserting it when absent.
    pub async fn find_or_create(
        db: &DatabaseConnection,
        name: &str,
        default_point_deduction: i32,
    ) -> Result<Self, DbErr> {
        Self::find_or_create_on(db, name, default_point_deduction).await
    }

    /// Transaction-aware variant of [`Model::find_or_create`], so a workflow
    /// can resolve the type inside the same transaction that writes the
    /// violation row.
    pub async fn find_or_create_on<C: ConnectionTrait>(
        db: &C,
        name: &str,
        default_point_deduction: i32,
    ) -> Result<Self, DbErr> {
        let existing = Entity::find().filter(Column::Name.eq(name)).one(db).await?;
        if let Some(existing) = existing {
            return Ok(existing);
        }

        let now = Utc::now();
        ActiveModel {
            name: Set(name.to_owned()),
            default_point_deduction: Set(default_point_deduction),
            is_active: Set(true),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(db)
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::setup_test_db;

    #[tokio::test]
    async fn find_or_create_is_idempotent() {
        let db = setup_test_db().await;

        let first = Model::find_or_create(&db, "terlambat_masuk", 5)
            .await
            .expect("insert violation type");
        let second = Model::find_or_create(&db, "terlambat_masuk", 99)
            .await
            .expect("lookup violation type");

        assert_eq!(first.id, second.id);
        // The original default is kept; a later caller never rewrites the catalogue.
        assert_eq!(second.default_point_deduction, 5);
    }
}
