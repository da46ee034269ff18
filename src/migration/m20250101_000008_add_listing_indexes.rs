use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[derive(DeriveIden)]
enum Items {
    Table,
    Category,
    Kind,
    Status,
    CreatedAt,
}

#[derive(DeriveIden)]
enum Claims {
    Table,
    Status,
    CreatedAt,
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_index(
                Index::create()
                    .name("idx_items_listing")
                    .table(Items::Table)
                    .col(Items::Status)
                    .col(Items::CreatedAt)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_items_category_kind")
                    .table(Items::Table)
                    .col(Items::Category)
                    .col(Items::Kind)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_claims_status_created")
                    .table(Claims::Table)
                    .col(Claims::Status)
                    .col(Claims::CreatedAt)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(Index::drop().name("idx_items_listing").table(Items::Table).to_owned())
            .await?;
        manager
            .drop_index(
                Index::drop()
                    .name("idx_items_category_kind")
                    .table(Items::Table)
                    .to_owned(),
            )
            .await?;
        manager
            .drop_index(
                Index::drop()
                    .name("idx_claims_status_created")
                    .table(Claims::Table)
                    .to_owned(),
            )
            .await?;
        Ok(())
    }
}
