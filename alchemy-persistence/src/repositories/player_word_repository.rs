use alchemy_core::PRIMITIVE_WORDS;
use anyhow::Result;
use sea_orm::sea_query::OnConflict;
use sea_orm::{
    ActiveValue, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect,
};

use crate::entities::{player_word, prelude::*};

/// Append-only log of the words each player has made in a lobby.
#[derive(Clone)]
pub struct PlayerWordRepository {
    db: DatabaseConnection,
}

impl PlayerWordRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Returns false when the player already had the word.
    pub async fn add(&self, lobby_code: &str, player_name: &str, word: &str) -> Result<bool> {
        let model = player_word::ActiveModel {
            player_name: ActiveValue::Set(player_name.to_string()),
            word: ActiveValue::Set(word.to_string()),
            lobby_code: ActiveValue::Set(lobby_code.to_string()),
            timestamp: ActiveValue::Set(chrono::Utc::now()),
            ..Default::default()
        };

        let rows = PlayerWord::insert(model)
            .on_conflict(
                OnConflict::columns([
                    player_word::Column::LobbyCode,
                    player_word::Column::PlayerName,
                    player_word::Column::Word,
                ])
                .do_nothing()
                .to_owned(),
            )
            .exec_without_returning(&self.db)
            .await?;

        Ok(rows == 1)
    }

    /// Starts a player off with the primitive words.
    pub async fn seed_primitives(&self, lobby_code: &str, player_name: &str) -> Result<()> {
        for word in PRIMITIVE_WORDS {
            self.add(lobby_code, player_name, word).await?;
        }
        Ok(())
    }

    /// The player's words in the order they were made.
    pub async fn words(&self, lobby_code: &str, player_name: &str) -> Result<Vec<String>> {
        let words = PlayerWord::find()
            .select_only()
            .column(player_word::Column::Word)
            .filter(player_word::Column::LobbyCode.eq(lobby_code))
            .filter(player_word::Column::PlayerName.eq(player_name))
            .order_by_asc(player_word::Column::Timestamp)
            .order_by_asc(player_word::Column::Id)
            .into_tuple::<String>()
            .all(&self.db)
            .await?;
        Ok(words)
    }

    pub async fn contains(&self, lobby_code: &str, player_name: &str, word: &str) -> Result<bool> {
        let count = PlayerWord::find()
            .filter(player_word::Column::LobbyCode.eq(lobby_code))
            .filter(player_word::Column::PlayerName.eq(player_name))
            .filter(player_word::Column::Word.eq(word))
            .count(&self.db)
            .await?;
        Ok(count > 0)
    }

    pub async fn delete_for_lobby(&self, lobby_code: &str) -> Result<u64> {
        let result = PlayerWord::delete_many()
            .filter(player_word::Column::LobbyCode.eq(lobby_code))
            .exec(&self.db)
            .await?;
        Ok(result.rows_affected)
    }
}
