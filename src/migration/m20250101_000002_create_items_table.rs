use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[derive(DeriveIden)]
enum Items {
    Table,
    Id,
    UserId,
    Name,
    Description,
    Category,
    Kind,
    Location,
    DateIncident,
    ContactInfo,
    SecurityQuestion,
    ImageUrl,
    Status,
    RefNo,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Users {
    Table,
    Id,
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Items::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Items::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Items::UserId).integer().not_null())
                    .col(ColumnDef::new(Items::Name).string_len(200).not_null())
                    .col(ColumnDef::new(Items::Description).text().not_null())
                    .col(ColumnDef::new(Items::Category).string_len(50).not_null())
                    .col(ColumnDef::new(Items::Kind).string_len(10).not_null())
                    .col(ColumnDef::new(Items::Location).string_len(200).not_null())
                    .col(ColumnDef::new(Items::DateIncident).date().not_null())
                    .col(ColumnDef::new(Items::ContactInfo).string_len(255).not_null())
                    .col(ColumnDef::new(Items::SecurityQuestion).text().not_null())
                    .col(ColumnDef::new(Items::ImageUrl).string().null())
                    .col(
                        ColumnDef::new(Items::Status)
                            .string_len(20)
                            .not_null()
                            .default("pending"),
                    )
                    .col(ColumnDef::new(Items::RefNo).string_len(20).not_null())
                    .col(
                        ColumnDef::new(Items::CreatedAt)
                            .timestamp()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(Items::UpdatedAt)
                            .timestamp()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_items_user_id")
                            .from(Items::Table, Items::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_items_user_id")
                    .table(Items::Table)
                    .col(Items::UserId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Items::Table).to_owned())
            .await
    }
}
