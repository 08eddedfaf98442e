//! Create reports table migration.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Reports::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Reports::Id).string_len(32).not_null().primary_key())
                    .col(ColumnDef::new(Reports::ReferenceId).string_len(16).not_null())
                    .col(ColumnDef::new(Reports::CompanyId).string_len(32).not_null())
                    .col(ColumnDef::new(Reports::ReporterId).string_len(32))
                    .col(ColumnDef::new(Reports::ReporterName).string_len(256))
                    .col(ColumnDef::new(Reports::Title).string_len(512).not_null())
                    .col(ColumnDef::new(Reports::PersonAccused).string_len(512))
                    .col(
                        ColumnDef::new(Reports::Category)
                            .string_len(32)
                            .not_null()
                            .default("other"),
                    )
                    .col(ColumnDef::new(Reports::Department).string_len(16).not_null())
                    .col(ColumnDef::new(Reports::Description).text().not_null())
                    .col(ColumnDef::new(Reports::EvidenceText).text())
                    .col(ColumnDef::new(Reports::EvidenceKey).string_len(512))
                    .col(ColumnDef::new(Reports::EvidenceContentType).string_len(128))
                    .col(ColumnDef::new(Reports::EvidenceSize).big_integer())
                    .col(
                        ColumnDef::new(Reports::Status)
                            .string_len(16)
                            .not_null()
                            .default("pending"),
                    )
                    .col(ColumnDef::new(Reports::StatusPasswordHash).string_len(256).not_null())
                    .col(
                        ColumnDef::new(Reports::IsAnonymous)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(ColumnDef::new(Reports::AssignedTo).string_len(32))
                    .col(
                        ColumnDef::new(Reports::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(Reports::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_reports_company_id")
                            .from(Reports::Table, Reports::CompanyId)
                            .to(Companies::Table, Companies::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .to_owned(),
            )
            .await?;

        // Unique index: reference_id
        manager
            .create_index(
                Index::create()
                    .name("idx_reports_reference_id")
                    .table(Reports::Table)
                    .col(Reports::ReferenceId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // Index: (department, created_at) for moderator dashboards
        manager
            .create_index(
                Index::create()
                    .name("idx_reports_department_created_at")
                    .table(Reports::Table)
                    .col(Reports::Department)
                    .col(Reports::CreatedAt)
                    .to_owned(),
            )
            .await?;

        // Index: assigned_to for investigator dashboards
        manager
            .create_index(
                Index::create()
                    .name("idx_reports_assigned_to")
                    .table(Reports::Table)
                    .col(Reports::AssignedTo)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Reports::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Reports {
    Table,
    Id,
    ReferenceId,
    CompanyId,
    ReporterId,
    ReporterName,
    Title,
    PersonAccused,
    Category,
    Department,
    Description,
    EvidenceText,
    EvidenceKey,
    EvidenceContentType,
    EvidenceSize,
    Status,
    StatusPasswordHash,
    IsAnonymous,
    AssignedTo,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum Companies {
    Table,
    Id,
}
