pub use sea_orm_migration::prelude::*;

mod m20240101_000001_create_accounts_and_lobbies;
mod m20240101_000002_create_word_graph;
mod m20240101_000003_create_achievements;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20240101_000001_create_accounts_and_lobbies::Migration),
            Box::new(m20240101_000002_create_word_graph::Migration),
            Box::new(m20240101_000003_create_achievements::Migration),
        ]
    }
}
