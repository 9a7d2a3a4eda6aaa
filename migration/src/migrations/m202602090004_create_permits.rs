use sea_orm_migration::prelude::*;

pub struct Migration;

impl MigrationName for Migration {
    fn name(&self) -> &str {
        "m202602090004_create_permits"
    }
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // student_permits
        manager
            .create_table(
                Table::create()
                    .table(Alias::new("student_permits"))
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Alias::new("id"))
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(Alias::new("student_id"))
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Alias::new("permit_type"))
                            .enumeration(
                                Alias::new("permit_type"),
                                vec![
                                    Alias::new("sakit"),
                                    Alias::new("izin_keluarga"),
                                    Alias::new("dispensasi_akademik"),
                                    Alias::new("kegiatan_setelah_jam_sekolah"),
                                ],
                            )
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Alias::new("urgency_level"))
                            .enumeration(
                                Alias::new("urgency_level"),
                                vec![
                                    Alias::new("low"),
                                    Alias::new("normal"),
                                    Alias::new("high"),
                                    Alias::new("urgent"),
                                ],
                            )
                            .not_null(),
                    )
                    .col(ColumnDef::new(Alias::new("category")).string().null())
                    .col(ColumnDef::new(Alias::new("reason")).text().not_null())
                    .col(ColumnDef::new(Alias::new("start_date")).date().not_null())
                    .col(ColumnDef::new(Alias::new("end_date")).date().not_null())
                    .col(ColumnDef::new(Alias::new("start_time")).time().null())
                    .col(ColumnDef::new(Alias::new("end_time")).time().null())
                    .col(
                        ColumnDef::new(Alias::new("activity_location"))
                            .string()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(Alias::new("emergency_contact"))
                            .string()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(Alias::new("parent_approval"))
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(Alias::new("status"))
                            .enumeration(
                                Alias::new("permit_status"),
                                vec![
                                    Alias::new("pending"),
                                    Alias::new("approved"),
                                    Alias::new("rejected"),
                                ],
                            )
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Alias::new("current_approval_stage"))
                            .integer()
                            .not_null()
                            .default(1),
                    )
                    .col(
                        ColumnDef::new(Alias::new("submitted_at"))
                            .timestamp()
                            .not_null()
                            .default(Expr::cust("CURRENT_TIMESTAMP")),
                    )
                    .col(ColumnDef::new(Alias::new("reviewed_by")).big_integer().null())
                    .col(ColumnDef::new(Alias::new("reviewed_at")).timestamp().null())
                    .col(ColumnDef::new(Alias::new("review_notes")).text().null())
                    .col(
                        ColumnDef::new(Alias::new("created_at"))
                            .timestamp()
                            .not_null()
                            .default(Expr::cust("CURRENT_TIMESTAMP")),
                    )
                    .col(
                        ColumnDef::new(Alias::new("updated_at"))
                            .timestamp()
                            .not_null()
                            .default(Expr::cust("CURRENT_TIMESTAMP")),
                    )
                    .to_owned(),
            )
            .await?;

        // Non-unique index goes through create_index; SQLite rejects the
        // inline form.
        manager
            .create_index(
                Index::create()
                    .name("idx_student_permits_student_status")
                    .table(Alias::new("student_permits"))
                    .col(Alias::new("student_id"))
                    .col(Alias::new("status"))
                    .to_owned(),
            )
            .await?;

        // permit_approvals, one row per stage of the approval route
        manager
            .create_table(
                Table::create()
                    .table(Alias::new("permit_approvals"))
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Alias::new("id"))
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(Alias::new("permit_id"))
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Alias::new("approver_role"))
                            .enumeration(
                                Alias::new("approver_role"),
                                vec![
                                    Alias::new("wali_kelas"),
                                    Alias::new("guru_bk"),
                                    Alias::new("waka_kesiswaan"),
                                ],
                            )
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Alias::new("approval_order"))
                            .integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Alias::new("status"))
                            .enumeration(
                                Alias::new("approval_status"),
                                vec![
                                    Alias::new("pending"),
                                    Alias::new("approved"),
                                    Alias::new("rejected"),
                                    Alias::new("skipped"),
                                ],
                            )
                            .not_null(),
                    )
                    .col(ColumnDef::new(Alias::new("approver_id")).big_integer().null())
                    .col(ColumnDef::new(Alias::new("approved_at")).timestamp().null())
                    .col(ColumnDef::new(Alias::new("notes")).text().null())
                    .col(
                        ColumnDef::new(Alias::new("created_at"))
                            .timestamp()
                            .not_null()
                            .default(Expr::cust("CURRENT_TIMESTAMP")),
                    )
                    .col(
                        ColumnDef::new(Alias::new("updated_at"))
                            .timestamp()
                            .not_null()
                            .default(Expr::cust("CURRENT_TIMESTAMP")),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_permit_approval_permit")
                            .from(Alias::new("permit_approvals"), Alias::new("permit_id"))
                            .to(Alias::new("student_permits"), Alias::new("id"))
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // The unique index must also use create_index: SQLite folds the
        // inline form into an unnamed UNIQUE constraint, losing the name.
        manager
            .create_index(
                Index::create()
                    .name("idx_permit_approvals_permit_order")
                    .table(Alias::new("permit_approvals"))
                    .col(Alias::new("permit_id"))
                    .col(Alias::new("approval_order"))
                    .unique()
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Alias::new("permit_approvals")).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Alias::new("student_permits")).to_owned())
            .await
    }
}
