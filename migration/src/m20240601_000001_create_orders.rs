use sea_orm_migration::prelude::*;

/// 租赁订单表；`delivery_address` / `payment_method` 只存密文
#[derive(DeriveIden)]
pub(crate) enum Orders {
    Table,
    OrderId,
    UserId,
    VisitDate,
    RentalDate,
    VisitDateTxt,
    RentalDateTxt,
    TotalPrice,
    StatusOrder,
    ReturnDate,
    ReturnCondition,
    DeliveryAddress,
    PaymentMethod,
    CreatedAt,
}

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
                    .col(
                        ColumnDef::new(Orders::OrderId)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Orders::UserId).integer().not_null())
                    .col(ColumnDef::new(Orders::VisitDate).date())
                    .col(ColumnDef::new(Orders::RentalDate).date())
                    .col(ColumnDef::new(Orders::VisitDateTxt).string())
                    .col(ColumnDef::new(Orders::RentalDateTxt).string())
                    .col(
                        ColumnDef::new(Orders::TotalPrice)
                            .decimal_len(10, 2)
                            .not_null(),
                    )
                    .col(ColumnDef::new(Orders::StatusOrder).string())
                    .col(ColumnDef::new(Orders::ReturnDate).date())
                    .col(ColumnDef::new(Orders::ReturnCondition).string())
                    // 密文长度不固定，用 text
                    .col(ColumnDef::new(Orders::DeliveryAddress).text())
                    .col(ColumnDef::new(Orders::PaymentMethod).text())
                    .col(
                        ColumnDef::new(Orders::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_orders_user_id")
                    .table(Orders::Table)
                    .col(Orders::UserId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_orders_created_at")
                    .table(Orders::Table)
                    .col(Orders::CreatedAt)
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
