use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(BatchFiles::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(BatchFiles::BatchId).uuid().not_null())
                    .col(ColumnDef::new(BatchFiles::Filename).string().not_null())
                    .col(ColumnDef::new(BatchFiles::Position).integer().not_null())
                    .col(ColumnDef::new(BatchFiles::LineCount).big_integer().not_null())
                    .col(
                        ColumnDef::new(BatchFiles::IsLastInRequest)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(ColumnDef::new(BatchFiles::SuccessCount).big_integer().null())
                    .col(ColumnDef::new(BatchFiles::ErrorCount).big_integer().null())
                    .col(ColumnDef::new(BatchFiles::ErrorUrl).text().null())
                    .primary_key(
                        Index::create()
                            .col(BatchFiles::BatchId)
                            .col(BatchFiles::Filename),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_batch_files_batch_id")
                            .from(BatchFiles::Table, BatchFiles::BatchId)
                            .to(Batches::Table, Batches::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(BatchFiles::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum BatchFiles {
    Table,
    BatchId,
    Filename,
    Position,
    LineCount,
    IsLastInRequest,
    SuccessCount,
    ErrorCount,
    ErrorUrl,
}

#[derive(DeriveIden)]
enum Batches {
    Table,
    Id,
}
