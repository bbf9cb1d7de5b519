use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Word::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Word::Word).string().not_null().primary_key())
                    .col(ColumnDef::new(Word::Depth).integer().not_null())
                    .col(ColumnDef::new(Word::Reachability).double().not_null())
                    .to_owned(),
            )
            .await?;

        // Target selection filters on both metrics
        manager
            .create_index(
                Index::create()
                    .name("idx_word_reachability_depth")
                    .table(Word::Table)
                    .col(Word::Reachability)
                    .col(Word::Depth)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Combination::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Combination::A).string().not_null())
                    .col(ColumnDef::new(Combination::B).string().not_null())
                    .col(ColumnDef::new(Combination::Result).string().not_null())
                    .col(ColumnDef::new(Combination::Depth).integer().not_null())
                    .primary_key(
                        Index::create()
                            .name("pk_combination")
                            .col(Combination::A)
                            .col(Combination::B),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(PlayerWord::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(PlayerWord::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(PlayerWord::PlayerName).string().not_null())
                    .col(ColumnDef::new(PlayerWord::Word).string().not_null())
                    .col(ColumnDef::new(PlayerWord::LobbyCode).string().not_null())
                    .col(
                        ColumnDef::new(PlayerWord::Timestamp)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        // Appending the same word twice is a no-op
        manager
            .create_index(
                Index::create()
                    .name("ux_player_word")
                    .table(PlayerWord::Table)
                    .col(PlayerWord::LobbyCode)
                    .col(PlayerWord::PlayerName)
                    .col(PlayerWord::Word)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(DailyWord::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(DailyWord::Date)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(DailyWord::Word).string().not_null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(DailyChallenge::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(DailyChallenge::Date).string().not_null())
                    .col(ColumnDef::new(DailyChallenge::Username).string().not_null())
                    .col(ColumnDef::new(DailyChallenge::WordCount).integer().not_null())
                    .primary_key(
                        Index::create()
                            .name("pk_daily_challenge")
                            .col(DailyChallenge::Date)
                            .col(DailyChallenge::Username),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_daily_challenge_username")
                            .from(DailyChallenge::Table, DailyChallenge::Username)
                            .to(Account::Table, Account::Username)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(DailyChallenge::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(DailyWord::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(PlayerWord::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Combination::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Word::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Word {
    Table,
    Word,
    Depth,
    Reachability,
}

#[derive(DeriveIden)]
enum Combination {
    Table,
    A,
    B,
    Result,
    Depth,
}

#[derive(DeriveIden)]
enum PlayerWord {
    Table,
    Id,
    PlayerName,
    Word,
    LobbyCode,
    Timestamp,
}

#[derive(DeriveIden)]
enum DailyWord {
    Table,
    Date,
    Word,
}

#[derive(DeriveIden)]
enum DailyChallenge {
    Table,
    Date,
    Username,
    WordCount,
}

#[derive(DeriveIden)]
enum Account {
    Table,
    Username,
}
