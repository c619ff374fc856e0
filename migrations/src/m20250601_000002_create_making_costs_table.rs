use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(MakingCosts::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(MakingCosts::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(MakingCosts::MetalType)
                            .string_len(50)
                            .not_null(),
                    )
                    .col(ColumnDef::new(MakingCosts::Percentage).double().not_null())
                    .col(
                        ColumnDef::new(MakingCosts::IsActive)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(
                        ColumnDef::new(MakingCosts::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(MakingCosts::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_making_costs_metal_type_active")
                    .table(MakingCosts::Table)
                    .col(MakingCosts::MetalType)
                    .col(MakingCosts::IsActive)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(MakingCosts::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum MakingCosts {
    Table,
    Id,
    MetalType,
    Percentage,
    IsActive,
    CreatedAt,
    UpdatedAt,
}
