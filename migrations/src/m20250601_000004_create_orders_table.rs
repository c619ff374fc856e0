use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Orders::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Orders::Id).uuid().primary_key().not_null())
                    .col(
                        ColumnDef::new(Orders::OrderNumber)
                            .string_len(50)
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(Orders::UserId).string_len(255).not_null())
                    .col(ColumnDef::new(Orders::Items).json().not_null())
                    .col(
                        ColumnDef::new(Orders::Subtotal)
                            .double()
                            .not_null()
                            .default(0.0),
                    )
                    .col(
                        ColumnDef::new(Orders::AdvancePaid)
                            .double()
                            .not_null()
                            .default(0.0),
                    )
                    .col(
                        ColumnDef::new(Orders::Remaining)
                            .double()
                            .not_null()
                            .default(0.0),
                    )
                    .col(
                        ColumnDef::new(Orders::Status)
                            .string_len(20)
                            .not_null()
                            .default("pending"),
                    )
                    .col(ColumnDef::new(Orders::PaymentMethod).string_len(50).null())
                    .col(ColumnDef::new(Orders::PaymentId).string_len(100).null())
                    .col(ColumnDef::new(Orders::GiftMessage).text().null())
                    .col(ColumnDef::new(Orders::DeliveryType).string_len(50).null())
                    .col(ColumnDef::new(Orders::DeliveryAddress).text().null())
                    .col(ColumnDef::new(Orders::SpecialInstructions).text().null())
                    .col(ColumnDef::new(Orders::ProductSizeDetails).json().null())
                    .col(ColumnDef::new(Orders::Aadhar).string_len(20).null())
                    .col(ColumnDef::new(Orders::Address).json().null())
                    .col(
                        ColumnDef::new(Orders::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Orders::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        // Order history per customer, newest first
        manager
            .create_index(
                Index::create()
                    .name("idx_orders_user_created")
                    .table(Orders::Table)
                    .col(Orders::UserId)
                    .col((Orders::CreatedAt, IndexOrder::Desc))
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_orders_status")
                    .table(Orders::Table)
                    .col(Orders::Status)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Orders::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum Orders {
    Table,
    Id,
    OrderNumber,
    UserId,
    Items,
    Subtotal,
    AdvancePaid,
    Remaining,
    Status,
    PaymentMethod,
    PaymentId,
    GiftMessage,
    DeliveryType,
    DeliveryAddress,
    SpecialInstructions,
    ProductSizeDetails,
    Aadhar,
    Address,
    CreatedAt,
    UpdatedAt,
}
