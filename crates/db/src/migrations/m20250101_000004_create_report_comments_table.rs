//! Create report comments table migration.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(ReportComments::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ReportComments::Id)
                            .string_len(32)
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(ReportComments::ReportId).string_len(32).not_null())
                    .col(ColumnDef::new(ReportComments::UserId).string_len(32))
                    .col(ColumnDef::new(ReportComments::AuthorLabel).string_len(128).not_null())
                    .col(ColumnDef::new(ReportComments::Comment).text().not_null())
                    .col(
                        ColumnDef::new(ReportComments::IsInternal)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(ReportComments::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_report_comments_report_id")
                            .from(ReportComments::Table, ReportComments::ReportId)
                            .to(Reports::Table, Reports::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Index: (report_id, created_at) for chronological threads
        manager
            .create_index(
                Index::create()
                    .name("idx_report_comments_report_id_created_at")
                    .table(ReportComments::Table)
                    .col(ReportComments::ReportId)
                    .col(ReportComments::CreatedAt)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(ReportComments::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum ReportComments {
    Table,
    Id,
    ReportId,
    UserId,
    AuthorLabel,
    Comment,
    IsInternal,
    CreatedAt,
}

#[derive(Iden)]
enum Reports {
    Table,
    Id,
}
