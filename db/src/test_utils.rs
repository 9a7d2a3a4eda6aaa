use migration::Migrator;
use sea_orm::{Database, DatabaseConnection};
use sea_orm_migration::MigratorTrait;

/// Connects to a fresh in-memory SQLite database with the full schema applied.
pub async fn setup_test_db() -> DatabaseConnection {
    let db = Database::connect("sqlite::memory:")
        .await
        .expect("Failed to connect to in-memory db");

    Migrator::up(&db, None)
        .await
        .expect("Failed to run migrations");

    db
}

#[cfg(test)]
mod tests {
    use super::*;
    use sea_orm::{ConnectionTrait, Statement};

    #[tokio::test]
    async fn full_schema_applies_on_sqlite_with_secondary_indexes() {
        let db = setup_test_db().await;

        let rows = db
            .query_all(Statement::from_string(
                db.get_database_backend(),
                "SELECT name FROM sqlite_master WHERE type = 'index' AND name LIKE 'idx_%'",
            ))
            .await
            .expect("query sqlite_master");
        let names: Vec<String> = rows
            .iter()
            .map(|row| row.try_get("", "name").expect("index name"))
            .collect();

        for expected in [
            "idx_student_violations_student_date",
            "idx_student_permits_student_status",
            "idx_permit_approvals_permit_order",
            "idx_counseling_referrals_student_status",
        ] {
            assert!(names.iter().any(|n| n == expected), "missing {expected}");
        }
    }
}
