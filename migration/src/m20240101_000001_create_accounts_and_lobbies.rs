use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Image::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Image::Name).string().not_null().primary_key())
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Account::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Account::Username)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Account::PasswordHash).string().not_null())
                    .col(ColumnDef::new(Account::Salt).string().not_null())
                    .col(ColumnDef::new(Account::ImageName).string().not_null())
                    .col(ColumnDef::new(Account::Wins).integer().not_null().default(0))
                    .col(ColumnDef::new(Account::Losses).integer().not_null().default(0))
                    .col(
                        ColumnDef::new(Account::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(Account::Status)
                            .string()
                            .not_null()
                            .default("OFFLINE"),
                    )
                    .col(
                        ColumnDef::new(Account::IsOwner)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(Account::WordCount)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(Account::NewWordCount)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .to_owned(),
            )
            .await?;

        // Leaderboard ordering
        manager
            .create_index(
                Index::create()
                    .name("idx_account_wins")
                    .table(Account::Table)
                    .col(Account::Wins)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Lobby::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Lobby::LobbyCode)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Lobby::Name).string().not_null())
                    .col(ColumnDef::new(Lobby::ImageName).string().not_null())
                    .col(
                        ColumnDef::new(Lobby::GameMode)
                            .string()
                            .not_null()
                            .default("Vanilla"),
                    )
                    .col(
                        ColumnDef::new(Lobby::PlayerCount)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Player::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Player::LobbyCode).string().not_null())
                    .col(ColumnDef::new(Player::Name).string().not_null())
                    .col(ColumnDef::new(Player::ImageName).string().not_null())
                    .col(
                        ColumnDef::new(Player::IsOwner)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(Player::HasAccount)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(Player::TargetWord)
                            .string()
                            .not_null()
                            .default(""),
                    )
                    .col(ColumnDef::new(Player::Points).integer().not_null().default(0))
                    .col(
                        ColumnDef::new(Player::WordCount)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(Player::NewWordCount)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .primary_key(
                        Index::create()
                            .name("pk_player")
                            .col(Player::LobbyCode)
                            .col(Player::Name),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_player_lobby_code")
                            .from(Player::Table, Player::LobbyCode)
                            .to(Lobby::Table, Lobby::LobbyCode)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Player::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Lobby::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Account::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Image::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Image {
    Table,
    Name,
}

#[derive(DeriveIden)]
enum Account {
    Table,
    Username,
    PasswordHash,
    Salt,
    ImageName,
    Wins,
    Losses,
    CreatedAt,
    Status,
    IsOwner,
    WordCount,
    NewWordCount,
}

#[derive(DeriveIden)]
enum Lobby {
    Table,
    LobbyCode,
    Name,
    ImageName,
    GameMode,
    PlayerCount,
}

#[derive(DeriveIden)]
enum Player {
    Table,
    LobbyCode,
    Name,
    ImageName,
    IsOwner,
    HasAccount,
    TargetWord,
    Points,
    WordCount,
    NewWordCount,
}
