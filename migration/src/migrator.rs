use sea_orm_migration::prelude::*;

use crate::migrations;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(migrations::m202602090001_create_violation_types::Migration),
            Box::new(migrations::m202602090002_create_student_violations::Migration),
            Box::new(migrations::m202602090003_create_attendance::Migration),
            Box::new(migrations::m202602090004_create_permits::Migration),
            Box::new(migrations::m202602090005_create_referrals::Migration),
        ]
    }
}
