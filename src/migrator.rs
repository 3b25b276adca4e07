use sea_orm_migration::prelude::*;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20240101_000001_create_intake_tables::Migration),
            Box::new(m20240101_000002_create_purchase_tables::Migration),
            Box::new(m20240101_000003_create_store_tables::Migration),
            Box::new(m20240101_000004_create_production_tables::Migration),
        ]
    }
}

mod m20240101_000001_create_intake_tables {
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240101_000001_create_intake_tables"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Buyers::Table)
                        .if_not_exists()
                        .col(ColumnDef::new(Buyers::Id).uuid().primary_key().not_null())
                        .col(ColumnDef::new(Buyers::Name).string().not_null())
                        .col(ColumnDef::new(Buyers::ContactPerson).string().null())
                        .col(ColumnDef::new(Buyers::Phone).string().null())
                        .col(ColumnDef::new(Buyers::Email).string().null())
                        .col(ColumnDef::new(Buyers::Address).string().null())
                        .col(
                            ColumnDef::new(Buyers::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(Buyers::UpdatedAt)
                                .timestamp_with_time_zone()
                                .null(),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(Orders::Table)
                        .if_not_exists()
                        .col(ColumnDef::new(Orders::Id).uuid().primary_key().not_null())
                        .col(ColumnDef::new(Orders::OrderNumber).string().not_null())
                        .col(ColumnDef::new(Orders::BuyerId).uuid().not_null())
                        .col(ColumnDef::new(Orders::StyleNumber).string().not_null())
                        .col(ColumnDef::new(Orders::Quantity).integer().not_null())
                        .col(ColumnDef::new(Orders::DeliveryDate).date().null())
                        .col(ColumnDef::new(Orders::Status).string().not_null())
                        .col(ColumnDef::new(Orders::Notes).string().null())
                        .col(
                            ColumnDef::new(Orders::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(Orders::UpdatedAt)
                                .timestamp_with_time_zone()
                                .null(),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_orders_buyer_id")
                        .table(Orders::Table)
                        .col(Orders::BuyerId)
                        .to_owned(),
                )
                .await?;

            Ok(())
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Orders::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(Buyers::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    enum Buyers {
        Table,
        Id,
        Name,
        ContactPerson,
        Phone,
        Email,
        Address,
        CreatedAt,
        UpdatedAt,
    }

    #[derive(DeriveIden)]
    enum Orders {
        Table,
        Id,
        OrderNumber,
        BuyerId,
        StyleNumber,
        Quantity,
        DeliveryDate,
        Status,
        Notes,
        CreatedAt,
        UpdatedAt,
    }
}

mod m20240101_000002_create_purchase_tables {
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240101_000002_create_purchase_tables"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Purchases::Table)
                        .if_not_exists()
                        .col(ColumnDef::new(Purchases::Id).uuid().primary_key().not_null())
                        .col(ColumnDef::new(Purchases::PurchaseNumber).string().not_null())
                        .col(ColumnDef::new(Purchases::OrderId).uuid().null())
                        .col(ColumnDef::new(Purchases::PurchaseDate).date().not_null())
                        .col(ColumnDef::new(Purchases::Status).string().not_null())
                        .col(ColumnDef::new(Purchases::Notes).string().null())
                        .col(
                            ColumnDef::new(Purchases::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(Purchases::UpdatedAt)
                                .timestamp_with_time_zone()
                                .null(),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_purchases_status")
                        .table(Purchases::Table)
                        .col(Purchases::Status)
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(PurchaseItems::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(PurchaseItems::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(ColumnDef::new(PurchaseItems::PurchaseId).uuid().not_null())
                        .col(ColumnDef::new(PurchaseItems::SupplierId).uuid().null())
                        .col(ColumnDef::new(PurchaseItems::SupplierName).string().not_null())
                        .col(ColumnDef::new(PurchaseItems::ItemName).string().not_null())
                        .col(ColumnDef::new(PurchaseItems::Unit).string().not_null())
                        .col(
                            ColumnDef::new(PurchaseItems::Quantity)
                                .decimal_len(16, 4)
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(PurchaseItems::UnitCost)
                                .decimal_len(16, 4)
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(PurchaseItems::GstRate)
                                .decimal_len(16, 4)
                                .not_null(),
                        )
                        .col(ColumnDef::new(PurchaseItems::Details).json().not_null())
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_purchase_items_purchase_id")
                        .table(PurchaseItems::Table)
                        .col(PurchaseItems::PurchaseId)
                        .to_owned(),
                )
                .await?;

            Ok(())
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(PurchaseItems::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(Purchases::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    enum Purchases {
        Table,
        Id,
        PurchaseNumber,
        OrderId,
        PurchaseDate,
        Status,
        Notes,
        CreatedAt,
        UpdatedAt,
    }

    #[derive(DeriveIden)]
    enum PurchaseItems {
        Table,
        Id,
        PurchaseId,
        SupplierId,
        SupplierName,
        ItemName,
        Unit,
        Quantity,
        UnitCost,
        GstRate,
        Details,
    }
}

mod m20240101_000003_create_store_tables {
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240101_000003_create_store_tables"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(StoreEntries::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(StoreEntries::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        // One store entry per purchase; duplicate submissions
                        // must fail here even if two requests race past the
                        // pending-purchases check.
                        .col(
                            ColumnDef::new(StoreEntries::PurchaseId)
                                .uuid()
                                .not_null()
                                .unique_key(),
                        )
                        .col(ColumnDef::new(StoreEntries::EntryDate).date().not_null())
                        .col(
                            ColumnDef::new(StoreEntries::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(StoreEntries::UpdatedAt)
                                .timestamp_with_time_zone()
                                .null(),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(StoreEntryItems::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(StoreEntryItems::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(StoreEntryItems::StoreEntryId)
                                .uuid()
                                .not_null(),
                        )
                        .col(ColumnDef::new(StoreEntryItems::ItemName).string().not_null())
                        .col(ColumnDef::new(StoreEntryItems::SupplierId).uuid().null())
                        .col(
                            ColumnDef::new(StoreEntryItems::SupplierName)
                                .string()
                                .not_null(),
                        )
                        .col(ColumnDef::new(StoreEntryItems::Unit).string().not_null())
                        .col(
                            ColumnDef::new(StoreEntryItems::PurchaseQty)
                                .decimal_len(16, 4)
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(StoreEntryItems::InvoiceQty)
                                .decimal_len(16, 4)
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(StoreEntryItems::StoreInQty)
                                .decimal_len(16, 4)
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(StoreEntryItems::Shortage)
                                .decimal_len(16, 4)
                                .not_null()
                                .default(0),
                        )
                        .col(
                            ColumnDef::new(StoreEntryItems::Surplus)
                                .decimal_len(16, 4)
                                .not_null()
                                .default(0),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_store_entry_items_entry_id")
                        .table(StoreEntryItems::Table)
                        .col(StoreEntryItems::StoreEntryId)
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(StoreLogs::Table)
                        .if_not_exists()
                        .col(ColumnDef::new(StoreLogs::Id).uuid().primary_key().not_null())
                        .col(ColumnDef::new(StoreLogs::StoreEntryId).uuid().not_null())
                        .col(ColumnDef::new(StoreLogs::WorkerName).string().not_null())
                        .col(ColumnDef::new(StoreLogs::LogDate).date().not_null())
                        .col(ColumnDef::new(StoreLogs::Status).string().not_null())
                        .col(
                            ColumnDef::new(StoreLogs::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(StoreLogs::UpdatedAt)
                                .timestamp_with_time_zone()
                                .null(),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_store_logs_entry_id")
                        .table(StoreLogs::Table)
                        .col(StoreLogs::StoreEntryId)
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(StoreLogItems::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(StoreLogItems::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(ColumnDef::new(StoreLogItems::StoreLogId).uuid().not_null())
                        .col(ColumnDef::new(StoreLogItems::ItemName).string().not_null())
                        .col(ColumnDef::new(StoreLogItems::Unit).string().not_null())
                        .col(
                            ColumnDef::new(StoreLogItems::TakenQty)
                                .decimal_len(16, 4)
                                .not_null()
                                .default(0),
                        )
                        .col(
                            ColumnDef::new(StoreLogItems::ReturnedQty)
                                .decimal_len(16, 4)
                                .not_null()
                                .default(0),
                        )
                        .col(
                            ColumnDef::new(StoreLogItems::InHandQty)
                                .decimal_len(16, 4)
                                .not_null()
                                .default(0),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_store_log_items_log_id")
                        .table(StoreLogItems::Table)
                        .col(StoreLogItems::StoreLogId)
                        .to_owned(),
                )
                .await?;

            Ok(())
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(StoreLogItems::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(StoreLogs::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(StoreEntryItems::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(StoreEntries::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    enum StoreEntries {
        Table,
        Id,
        PurchaseId,
        EntryDate,
        CreatedAt,
        UpdatedAt,
    }

    #[derive(DeriveIden)]
    enum StoreEntryItems {
        Table,
        Id,
        StoreEntryId,
        ItemName,
        SupplierId,
        SupplierName,
        Unit,
        PurchaseQty,
        InvoiceQty,
        StoreInQty,
        Shortage,
        Surplus,
    }

    #[derive(DeriveIden)]
    enum StoreLogs {
        Table,
        Id,
        StoreEntryId,
        WorkerName,
        LogDate,
        Status,
        CreatedAt,
        UpdatedAt,
    }

    #[derive(DeriveIden)]
    enum StoreLogItems {
        Table,
        Id,
        StoreLogId,
        ItemName,
        Unit,
        TakenQty,
        ReturnedQty,
        InHandQty,
    }
}

mod m20240101_000004_create_production_tables {
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240101_000004_create_production_tables"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Machines::Table)
                        .if_not_exists()
                        .col(ColumnDef::new(Machines::Id).uuid().primary_key().not_null())
                        .col(ColumnDef::new(Machines::MachineNumber).string().not_null())
                        .col(ColumnDef::new(Machines::MachineType).string().not_null())
                        .col(ColumnDef::new(Machines::Brand).string().null())
                        .col(ColumnDef::new(Machines::Status).string().not_null())
                        .col(
                            ColumnDef::new(Machines::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(Machines::UpdatedAt)
                                .timestamp_with_time_zone()
                                .null(),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(Productions::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(Productions::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(ColumnDef::new(Productions::OrderId).uuid().not_null())
                        .col(ColumnDef::new(Productions::ProductionDate).date().not_null())
                        .col(ColumnDef::new(Productions::Stage).string().not_null())
                        .col(ColumnDef::new(Productions::Quantity).integer().not_null())
                        .col(ColumnDef::new(Productions::MachineId).uuid().null())
                        .col(ColumnDef::new(Productions::Operator).string().null())
                        .col(ColumnDef::new(Productions::Remarks).string().null())
                        .col(
                            ColumnDef::new(Productions::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_productions_order_id")
                        .table(Productions::Table)
                        .col(Productions::OrderId)
                        .to_owned(),
                )
                .await?;

            Ok(())
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Productions::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(Machines::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    enum Machines {
        Table,
        Id,
        MachineNumber,
        MachineType,
        Brand,
        Status,
        CreatedAt,
        UpdatedAt,
    }

    #[derive(DeriveIden)]
    enum Productions {
        Table,
        Id,
        OrderId,
        ProductionDate,
        Stage,
        Quantity,
        MachineId,
        Operator,
        Remarks,
        CreatedAt,
    }
}
