use sea_orm_migration::prelude::*;

mod m20250101_000001_create_users_table;
mod m20250101_000002_create_items_table;
mod m20250101_000003_create_claims_table;
mod m20250101_000004_create_notifications_table;
mod m20250101_000005_create_conversations_table;
mod m20250101_000006_create_messages_table;
mod m20250101_000007_create_refresh_tokens;
mod m20250101_000008_add_listing_indexes;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20250101_000001_create_users_table::Migration),
            Box::new(m20250101_000002_create_items_table::Migration),
            Box::new(m20250101_000003_create_claims_table::Migration),
            Box::new(m20250101_000004_create_notifications_table::Migration),
            Box::new(m20250101_000005_create_conversations_table::Migration),
            Box::new(m20250101_000006_create_messages_table::Migration),
            Box::new(m20250101_000007_create_refresh_tokens::Migration),
            Box::new(m20250101_000008_add_listing_indexes::Migration),
        ]
    }
}
