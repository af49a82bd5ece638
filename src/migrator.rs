use sea_orm_migration::prelude::*;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20240101_000001_create_requisitions_table::Migration),
            Box::new(m20240101_000002_create_vendors_table::Migration),
            Box::new(m20240101_000003_create_purchase_orders_table::Migration),
            Box::new(m20240101_000004_create_goods_receipts_table::Migration),
            Box::new(m20240101_000005_create_invoices_table::Migration),
        ]
    }
}

#[derive(DeriveIden)]
enum Requisitions {
    Table,
    Id,
    Item,
    Quantity,
    Status,
    RequestedBy,
    Date,
    Priority,
    EstimatedCost,
    Description,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Vendors {
    Table,
    Id,
    Name,
    Contact,
    Email,
    Phone,
    Address,
    IsActive,
    Rating,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum PurchaseOrders {
    Table,
    Id,
    RequisitionId,
    VendorId,
    OrderNumber,
    TotalAmount,
    Status,
    OrderDate,
    ExpectedDeliveryDate,
    Notes,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum GoodsReceipts {
    Table,
    Id,
    PurchaseOrderId,
    ReceiptNumber,
    ReceivedDate,
    QuantityReceived,
    Item,
    Condition,
    ReceivedBy,
    WarehouseLocation,
    Notes,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Invoices {
    Table,
    Id,
    PurchaseOrderId,
    InvoiceNumber,
    Amount,
    TaxAmount,
    DiscountAmount,
    Status,
    InvoiceDate,
    DueDate,
    PaidDate,
    PaymentMethod,
    ReferenceNumber,
    Notes,
    CreatedAt,
    UpdatedAt,
}

fn id_column<T: IntoIden>(col: T) -> ColumnDef {
    ColumnDef::new(col)
        .integer()
        .not_null()
        .auto_increment()
        .primary_key()
        .to_owned()
}

fn timestamps<T: IntoIden>(table: &mut TableCreateStatement, created: T, updated: T) {
    table
        .col(
            ColumnDef::new(created)
                .timestamp_with_time_zone()
                .not_null(),
        )
        .col(
            ColumnDef::new(updated)
                .timestamp_with_time_zone()
                .not_null(),
        );
}

async fn index<T, C>(
    manager: &SchemaManager<'_>,
    name: &str,
    table: T,
    col: C,
    unique: bool,
) -> Result<(), DbErr>
where
    T: IntoTableRef,
    C: IntoIndexColumn,
{
    let mut stmt = Index::create();
    stmt.if_not_exists().name(name).table(table).col(col);
    if unique {
        stmt.unique();
    }
    manager.create_index(stmt.to_owned()).await
}

mod m20240101_000001_create_requisitions_table {
    use super::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240101_000001_create_requisitions_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            let mut table = Table::create();
            table
                .table(Requisitions::Table)
                .if_not_exists()
                .col(&mut id_column(Requisitions::Id))
                .col(ColumnDef::new(Requisitions::Item).string_len(255).not_null())
                .col(ColumnDef::new(Requisitions::Quantity).integer().not_null())
                .col(
                    ColumnDef::new(Requisitions::Status)
                        .string_len(32)
                        .not_null()
                        .default("Pending"),
                )
                .col(
                    ColumnDef::new(Requisitions::RequestedBy)
                        .string_len(255)
                        .not_null(),
                )
                .col(ColumnDef::new(Requisitions::Date).date().not_null())
                .col(
                    ColumnDef::new(Requisitions::Priority)
                        .string_len(16)
                        .not_null()
                        .default("Medium"),
                )
                .col(
                    ColumnDef::new(Requisitions::EstimatedCost)
                        .decimal_len(12, 2)
                        .null(),
                )
                .col(ColumnDef::new(Requisitions::Description).text().null());
            timestamps(&mut table, Requisitions::CreatedAt, Requisitions::UpdatedAt);
            manager.create_table(table.to_owned()).await?;

            index(
                manager,
                "idx_requisitions_status",
                Requisitions::Table,
                Requisitions::Status,
                false,
            )
            .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Requisitions::Table).to_owned())
                .await
        }
    }
}

mod m20240101_000002_create_vendors_table {
    use super::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240101_000002_create_vendors_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            let mut table = Table::create();
            table
                .table(Vendors::Table)
                .if_not_exists()
                .col(&mut id_column(Vendors::Id))
                .col(ColumnDef::new(Vendors::Name).string_len(255).not_null())
                .col(ColumnDef::new(Vendors::Contact).string_len(255).not_null())
                .col(ColumnDef::new(Vendors::Email).string_len(255).not_null())
                .col(ColumnDef::new(Vendors::Phone).string_len(20).not_null())
                .col(ColumnDef::new(Vendors::Address).text().null())
                .col(
                    ColumnDef::new(Vendors::IsActive)
                        .boolean()
                        .not_null()
                        .default(true),
                )
                .col(
                    ColumnDef::new(Vendors::Rating)
                        .decimal_len(2, 1)
                        .not_null()
                        .default(0),
                );
            timestamps(&mut table, Vendors::CreatedAt, Vendors::UpdatedAt);
            manager.create_table(table.to_owned()).await?;

            index(
                manager,
                "idx_vendors_email",
                Vendors::Table,
                Vendors::Email,
                true,
            )
            .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Vendors::Table).to_owned())
                .await
        }
    }
}

mod m20240101_000003_create_purchase_orders_table {
    use super::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240101_000003_create_purchase_orders_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            let mut table = Table::create();
            table
                .table(PurchaseOrders::Table)
                .if_not_exists()
                .col(&mut id_column(PurchaseOrders::Id))
                .col(
                    ColumnDef::new(PurchaseOrders::RequisitionId)
                        .integer()
                        .not_null(),
                )
                .col(ColumnDef::new(PurchaseOrders::VendorId).integer().not_null())
                .col(
                    ColumnDef::new(PurchaseOrders::OrderNumber)
                        .string_len(32)
                        .not_null(),
                )
                .col(
                    ColumnDef::new(PurchaseOrders::TotalAmount)
                        .decimal_len(12, 2)
                        .not_null()
                        .default(0),
                )
                .col(
                    ColumnDef::new(PurchaseOrders::Status)
                        .string_len(32)
                        .not_null()
                        .default("Pending Approval"),
                )
                .col(ColumnDef::new(PurchaseOrders::OrderDate).date().not_null())
                .col(
                    ColumnDef::new(PurchaseOrders::ExpectedDeliveryDate)
                        .date()
                        .null(),
                )
                .col(ColumnDef::new(PurchaseOrders::Notes).text().null())
                .foreign_key(
                    ForeignKey::create()
                        .name("fk_purchase_orders_requisition_id")
                        .from(PurchaseOrders::Table, PurchaseOrders::RequisitionId)
                        .to(Requisitions::Table, Requisitions::Id)
                        .on_delete(ForeignKeyAction::Restrict)
                        .on_update(ForeignKeyAction::Cascade),
                )
                .foreign_key(
                    ForeignKey::create()
                        .name("fk_purchase_orders_vendor_id")
                        .from(PurchaseOrders::Table, PurchaseOrders::VendorId)
                        .to(Vendors::Table, Vendors::Id)
                        .on_delete(ForeignKeyAction::Restrict)
                        .on_update(ForeignKeyAction::Cascade),
                );
            timestamps(&mut table, PurchaseOrders::CreatedAt, PurchaseOrders::UpdatedAt);
            manager.create_table(table.to_owned()).await?;

            index(
                manager,
                "idx_purchase_orders_order_number",
                PurchaseOrders::Table,
                PurchaseOrders::OrderNumber,
                true,
            )
            .await?;
            index(
                manager,
                "idx_purchase_orders_status",
                PurchaseOrders::Table,
                PurchaseOrders::Status,
                false,
            )
            .await?;
            index(
                manager,
                "idx_purchase_orders_vendor_id",
                PurchaseOrders::Table,
                PurchaseOrders::VendorId,
                false,
            )
            .await?;
            index(
                manager,
                "idx_purchase_orders_requisition_id",
                PurchaseOrders::Table,
                PurchaseOrders::RequisitionId,
                false,
            )
            .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(PurchaseOrders::Table).to_owned())
                .await
        }
    }
}

mod m20240101_000004_create_goods_receipts_table {
    use super::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240101_000004_create_goods_receipts_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            let mut table = Table::create();
            table
                .table(GoodsReceipts::Table)
                .if_not_exists()
                .col(&mut id_column(GoodsReceipts::Id))
                .col(
                    ColumnDef::new(GoodsReceipts::PurchaseOrderId)
                        .integer()
                        .not_null(),
                )
                .col(
                    ColumnDef::new(GoodsReceipts::ReceiptNumber)
                        .string_len(32)
                        .not_null(),
                )
                .col(ColumnDef::new(GoodsReceipts::ReceivedDate).date().not_null())
                .col(
                    ColumnDef::new(GoodsReceipts::QuantityReceived)
                        .integer()
                        .not_null(),
                )
                .col(ColumnDef::new(GoodsReceipts::Item).string_len(255).not_null())
                .col(
                    ColumnDef::new(GoodsReceipts::Condition)
                        .string_len(16)
                        .not_null()
                        .default("Good"),
                )
                .col(ColumnDef::new(GoodsReceipts::ReceivedBy).string_len(255).null())
                .col(
                    ColumnDef::new(GoodsReceipts::WarehouseLocation)
                        .string_len(255)
                        .null(),
                )
                .col(ColumnDef::new(GoodsReceipts::Notes).text().null())
                .foreign_key(
                    ForeignKey::create()
                        .name("fk_goods_receipts_purchase_order_id")
                        .from(GoodsReceipts::Table, GoodsReceipts::PurchaseOrderId)
                        .to(PurchaseOrders::Table, PurchaseOrders::Id)
                        .on_delete(ForeignKeyAction::Restrict)
                        .on_update(ForeignKeyAction::Cascade),
                );
            timestamps(&mut table, GoodsReceipts::CreatedAt, GoodsReceipts::UpdatedAt);
            manager.create_table(table.to_owned()).await?;

            index(
                manager,
                "idx_goods_receipts_receipt_number",
                GoodsReceipts::Table,
                GoodsReceipts::ReceiptNumber,
                true,
            )
            .await?;
            index(
                manager,
                "idx_goods_receipts_purchase_order_id",
                GoodsReceipts::Table,
                GoodsReceipts::PurchaseOrderId,
                false,
            )
            .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(GoodsReceipts::Table).to_owned())
                .await
        }
    }
}

mod m20240101_000005_create_invoices_table {
    use super::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240101_000005_create_invoices_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            let mut table = Table::create();
            table
                .table(Invoices::Table)
                .if_not_exists()
                .col(&mut id_column(Invoices::Id))
                .col(ColumnDef::new(Invoices::PurchaseOrderId).integer().not_null())
                .col(ColumnDef::new(Invoices::InvoiceNumber).string_len(64).not_null())
                .col(
                    ColumnDef::new(Invoices::Amount)
                        .decimal_len(12, 2)
                        .not_null()
                        .default(0),
                )
                .col(
                    ColumnDef::new(Invoices::TaxAmount)
                        .decimal_len(12, 2)
                        .not_null()
                        .default(0),
                )
                .col(
                    ColumnDef::new(Invoices::DiscountAmount)
                        .decimal_len(12, 2)
                        .not_null()
                        .default(0),
                )
                .col(
                    ColumnDef::new(Invoices::Status)
                        .string_len(16)
                        .not_null()
                        .default("Pending"),
                )
                .col(ColumnDef::new(Invoices::InvoiceDate).date().not_null())
                .col(ColumnDef::new(Invoices::DueDate).date().null())
                .col(ColumnDef::new(Invoices::PaidDate).date().null())
                .col(ColumnDef::new(Invoices::PaymentMethod).string_len(32).null())
                .col(ColumnDef::new(Invoices::ReferenceNumber).string_len(255).null())
                .col(ColumnDef::new(Invoices::Notes).text().null())
                .foreign_key(
                    ForeignKey::create()
                        .name("fk_invoices_purchase_order_id")
                        .from(Invoices::Table, Invoices::PurchaseOrderId)
                        .to(PurchaseOrders::Table, PurchaseOrders::Id)
                        .on_delete(ForeignKeyAction::Restrict)
                        .on_update(ForeignKeyAction::Cascade),
                );
            timestamps(&mut table, Invoices::CreatedAt, Invoices::UpdatedAt);
            manager.create_table(table.to_owned()).await?;

            index(
                manager,
                "idx_invoices_invoice_number",
                Invoices::Table,
                Invoices::InvoiceNumber,
                true,
            )
            .await?;
            index(
                manager,
                "idx_invoices_status",
                Invoices::Table,
                Invoices::Status,
                false,
            )
            .await?;
            index(
                manager,
                "idx_invoices_purchase_order_id",
                Invoices::Table,
                Invoices::PurchaseOrderId,
                false,
            )
            .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Invoices::Table).to_owned())
                .await
        }
    }
}
