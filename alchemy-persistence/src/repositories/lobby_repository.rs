use alchemy_types::{GameMode, LobbiesView, LobbyView, PlayerView};
use anyhow::Result;
use sea_orm::sea_query::{Expr, OnConflict};
use sea_orm::{
    ActiveValue, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder,
    TransactionTrait,
};
use tracing::warn;

use crate::entities::{lobby, player, player_word, prelude::*};

/// A player about to join a lobby.
#[derive(Debug, Clone)]
pub struct NewPlayer {
    pub name: String,
    pub image_name: String,
    pub is_owner: bool,
    pub has_account: bool,
}

#[derive(Clone)]
pub struct LobbyRepository {
    db: DatabaseConnection,
}

impl LobbyRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    fn parse_mode(model: &lobby::Model) -> GameMode {
        model.game_mode.parse().unwrap_or_else(|_| {
            warn!(lobby_code = %model.lobby_code, game_mode = %model.game_mode, "Unknown stored game mode");
            GameMode::default()
        })
    }

    pub fn model_to_player_view(model: player::Model) -> PlayerView {
        PlayerView {
            name: model.name,
            image_name: model.image_name,
            is_owner: model.is_owner,
            has_account: model.has_account,
            points: model.points,
            word_count: model.word_count,
            new_word_count: model.new_word_count,
        }
    }

    fn model_to_lobbies_view(model: lobby::Model) -> LobbiesView {
        LobbiesView {
            game_mode: Self::parse_mode(&model),
            lobby_code: model.lobby_code,
            name: model.name,
            image_name: model.image_name,
            player_count: model.player_count,
        }
    }

    fn new_player_model(lobby_code: &str, new_player: NewPlayer) -> player::ActiveModel {
        player::ActiveModel {
            lobby_code: ActiveValue::Set(lobby_code.to_string()),
            name: ActiveValue::Set(new_player.name),
            image_name: ActiveValue::Set(new_player.image_name),
            is_owner: ActiveValue::Set(new_player.is_owner),
            has_account: ActiveValue::Set(new_player.has_account),
            target_word: ActiveValue::Set(String::new()),
            points: ActiveValue::Set(0),
            word_count: ActiveValue::Set(0),
            new_word_count: ActiveValue::Set(0),
        }
    }

    /// Creates the lobby together with its owner, who counts as its first player.
    pub async fn create_lobby(
        &self,
        lobby_code: &str,
        name: &str,
        owner: NewPlayer,
    ) -> Result<()> {
        let txn = self.db.begin().await?;

        let lobby_model = lobby::ActiveModel {
            lobby_code: ActiveValue::Set(lobby_code.to_string()),
            name: ActiveValue::Set(name.to_string()),
            image_name: ActiveValue::Set(owner.image_name.clone()),
            game_mode: ActiveValue::Set(GameMode::Vanilla.as_str().to_string()),
            player_count: ActiveValue::Set(1),
        };
        Lobby::insert(lobby_model).exec_without_returning(&txn).await?;
        Player::insert(Self::new_player_model(lobby_code, owner))
            .exec_without_returning(&txn)
            .await?;

        txn.commit().await?;
        Ok(())
    }

    pub async fn code_exists(&self, lobby_code: &str) -> Result<bool> {
        Ok(self.find_lobby(lobby_code).await?.is_some())
    }

    pub async fn find_lobby(&self, lobby_code: &str) -> Result<Option<lobby::Model>> {
        Ok(Lobby::find_by_id(lobby_code.to_string()).one(&self.db).await?)
    }

    pub async fn list_lobbies(&self) -> Result<Vec<LobbiesView>> {
        let lobbies = Lobby::find()
            .order_by_asc(lobby::Column::Name)
            .all(&self.db)
            .await?;
        Ok(lobbies.into_iter().map(Self::model_to_lobbies_view).collect())
    }

    pub async fn lobby_view(&self, lobby_code: &str) -> Result<Option<LobbyView>> {
        let Some(model) = self.find_lobby(lobby_code).await? else {
            return Ok(None);
        };
        let players = self.players(lobby_code).await?;

        Ok(Some(LobbyView {
            game_mode: Self::parse_mode(&model),
            lobby_code: model.lobby_code,
            name: model.name,
            image_name: model.image_name,
            player_count: model.player_count,
            players: players
                .into_iter()
                .map(Self::model_to_player_view)
                .collect(),
        }))
    }

    pub async fn set_game_mode(&self, lobby_code: &str, game_mode: GameMode) -> Result<()> {
        Lobby::update_many()
            .col_expr(lobby::Column::GameMode, Expr::value(game_mode.as_str()))
            .filter(lobby::Column::LobbyCode.eq(lobby_code))
            .exec(&self.db)
            .await?;
        Ok(())
    }

    /// Adds a player and bumps the count. Returns false if the name is taken.
    pub async fn add_player(&self, lobby_code: &str, new_player: NewPlayer) -> Result<bool> {
        let txn = self.db.begin().await?;

        let rows = Player::insert(Self::new_player_model(lobby_code, new_player))
            .on_conflict(
                OnConflict::columns([player::Column::LobbyCode, player::Column::Name])
                    .do_nothing()
                    .to_owned(),
            )
            .exec_without_returning(&txn)
            .await?;

        if rows == 1 {
            Lobby::update_many()
                .col_expr(
                    lobby::Column::PlayerCount,
                    Expr::col(lobby::Column::PlayerCount).add(1),
                )
                .filter(lobby::Column::LobbyCode.eq(lobby_code))
                .exec(&txn)
                .await?;
        }

        txn.commit().await?;
        Ok(rows == 1)
    }

    /// Removes a non-owner player with their words. Returns false if they were not there.
    pub async fn remove_player(&self, lobby_code: &str, name: &str) -> Result<bool> {
        let txn = self.db.begin().await?;

        PlayerWord::delete_many()
            .filter(player_word::Column::LobbyCode.eq(lobby_code))
            .filter(player_word::Column::PlayerName.eq(name))
            .exec(&txn)
            .await?;

        let deleted = Player::delete_by_id((lobby_code.to_string(), name.to_string()))
            .exec(&txn)
            .await?
            .rows_affected;

        if deleted > 0 {
            Lobby::update_many()
                .col_expr(
                    lobby::Column::PlayerCount,
                    Expr::col(lobby::Column::PlayerCount).sub(1),
                )
                .filter(lobby::Column::LobbyCode.eq(lobby_code))
                .exec(&txn)
                .await?;
        }

        txn.commit().await?;
        Ok(deleted > 0)
    }

    /// Deletes the lobby, all its players and all their words.
    pub async fn delete_lobby(&self, lobby_code: &str) -> Result<bool> {
        let txn = self.db.begin().await?;

        PlayerWord::delete_many()
            .filter(player_word::Column::LobbyCode.eq(lobby_code))
            .exec(&txn)
            .await?;
        Player::delete_many()
            .filter(player::Column::LobbyCode.eq(lobby_code))
            .exec(&txn)
            .await?;
        let deleted = Lobby::delete_by_id(lobby_code.to_string())
            .exec(&txn)
            .await?
            .rows_affected;

        txn.commit().await?;
        Ok(deleted > 0)
    }

    pub async fn find_player(&self, lobby_code: &str, name: &str) -> Result<Option<player::Model>> {
        Ok(Player::find_by_id((lobby_code.to_string(), name.to_string()))
            .one(&self.db)
            .await?)
    }

    /// Owner first, then by name.
    pub async fn players(&self, lobby_code: &str) -> Result<Vec<player::Model>> {
        Ok(Player::find()
            .filter(player::Column::LobbyCode.eq(lobby_code))
            .order_by_desc(player::Column::IsOwner)
            .order_by_asc(player::Column::Name)
            .all(&self.db)
            .await?)
    }

    /// Code of the lobby this account owns, if any.
    pub async fn owned_lobby(&self, username: &str) -> Result<Option<String>> {
        let owner = Player::find()
            .filter(player::Column::Name.eq(username))
            .filter(player::Column::IsOwner.eq(true))
            .filter(player::Column::HasAccount.eq(true))
            .one(&self.db)
            .await?;
        Ok(owner.map(|player| player.lobby_code))
    }

    /// Zeroes every player's game counters ahead of a new game.
    pub async fn reset_players(&self, lobby_code: &str) -> Result<()> {
        Player::update_many()
            .col_expr(player::Column::Points, Expr::value(0))
            .col_expr(player::Column::WordCount, Expr::value(0))
            .col_expr(player::Column::NewWordCount, Expr::value(0))
            .col_expr(player::Column::TargetWord, Expr::value(""))
            .filter(player::Column::LobbyCode.eq(lobby_code))
            .exec(&self.db)
            .await?;
        Ok(())
    }

    pub async fn set_target(&self, lobby_code: &str, name: &str, target_word: &str) -> Result<()> {
        Player::update_many()
            .col_expr(player::Column::TargetWord, Expr::value(target_word))
            .filter(player::Column::LobbyCode.eq(lobby_code))
            .filter(player::Column::Name.eq(name))
            .exec(&self.db)
            .await?;
        Ok(())
    }

    pub async fn add_points(&self, lobby_code: &str, name: &str, points: i32) -> Result<()> {
        Player::update_many()
            .col_expr(
                player::Column::Points,
                Expr::col(player::Column::Points).add(points),
            )
            .filter(player::Column::LobbyCode.eq(lobby_code))
            .filter(player::Column::Name.eq(name))
            .exec(&self.db)
            .await?;
        Ok(())
    }

    /// Counts one move for the player and returns the updated row.
    pub async fn record_move(
        &self,
        lobby_code: &str,
        name: &str,
        is_new: bool,
    ) -> Result<Option<player::Model>> {
        Player::update_many()
            .col_expr(
                player::Column::WordCount,
                Expr::col(player::Column::WordCount).add(1),
            )
            .col_expr(
                player::Column::NewWordCount,
                Expr::col(player::Column::NewWordCount).add(i32::from(is_new)),
            )
            .filter(player::Column::LobbyCode.eq(lobby_code))
            .filter(player::Column::Name.eq(name))
            .exec(&self.db)
            .await?;

        self.find_player(lobby_code, name).await
    }
}
