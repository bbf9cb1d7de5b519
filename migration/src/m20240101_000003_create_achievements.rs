use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(AchievementImage::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(AchievementImage::Name)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Achievement::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Achievement::Title)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Achievement::Type).string().not_null())
                    .col(ColumnDef::new(Achievement::Value).string().not_null())
                    .col(
                        ColumnDef::new(Achievement::Description)
                            .string()
                            .not_null()
                            .default(""),
                    )
                    .col(ColumnDef::new(Achievement::ImageName).string().not_null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Unlocked::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Unlocked::Username).string().not_null())
                    .col(ColumnDef::new(Unlocked::AchievementTitle).string().not_null())
                    .primary_key(
                        Index::create()
                            .name("pk_unlocked")
                            .col(Unlocked::Username)
                            .col(Unlocked::AchievementTitle),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_unlocked_username")
                            .from(Unlocked::Table, Unlocked::Username)
                            .to(Account::Table, Account::Username)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_unlocked_achievement_title")
                            .from(Unlocked::Table, Unlocked::AchievementTitle)
                            .to(Achievement::Table, Achievement::Title)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Unlocked::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Achievement::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(AchievementImage::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum AchievementImage {
    Table,
    Name,
}

#[derive(DeriveIden)]
enum Achievement {
    Table,
    Title,
    Type,
    Value,
    Description,
    ImageName,
}

#[derive(DeriveIden)]
enum Unlocked {
    Table,
    Username,
    AchievementTitle,
}

#[derive(DeriveIden)]
enum Account {
    Table,
    Username,
}
