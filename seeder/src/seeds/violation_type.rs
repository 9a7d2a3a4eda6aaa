use crate::seed::Seeder;
use async_trait::async_trait;
use db::models::violation_type::Model;
use sea_orm::{DatabaseConnection, DbErr};

/// The violation catalogue the discipline screens and the check-out
/// workflow rely on. Point values mirror the school's discipline book.
pub struct ViolationTypeSeeder;

#[async_trait]
impl Seeder for ViolationTypeSeeder {
    async fn seed(&self, db: &DatabaseConnection) -> Result<(), DbErr> {
        for (name, points) in [
            ("terlambat_masuk", 5),
            ("atribut_tidak_lengkap", 5),
            ("pulang_terlambat", 10),
            ("pulang_lebih_awal", 15),
            ("membolos", 20),
        ] {
            Model::find_or_create(db, name, points).await?;
        }
        Ok(())
    }
}
