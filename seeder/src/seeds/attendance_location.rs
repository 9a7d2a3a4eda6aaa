use crate::seed::Seeder;
use async_trait::async_trait;
use db::models::attendance_location::Model;
use sea_orm::{DatabaseConnection, DbErr};

/// Two sample geofence zones around the main campus: a radius zone at the
/// gate and a polygon zone over the assembly hall.
pub struct AttendanceLocationSeeder;

#[async_trait]
impl Seeder for AttendanceLocationSeeder {
    async fn seed(&self, db: &DatabaseConnection) -> Result<(), DbErr> {
        if Model::find_active(db).await?.is_empty() {
            Model::create_radius(db, "Gerbang Utama", -6.989899, 110.420042, 100.0).await?;
            Model::create_polygon(
                db,
                "Aula Sekolah",
                -6.9899,
                110.4200,
                &[
                    (-6.9890, 110.4195),
                    (-6.9890, 110.4206),
                    (-6.9908, 110.4206),
                    (-6.9908, 110.4195),
                ],
            )
            .await?;
        }
        Ok(())
    }
}
