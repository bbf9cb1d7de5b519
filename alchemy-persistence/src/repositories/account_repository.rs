use alchemy_types::{Account as AccountView, AccountStatus, LeaderboardEntry};
use anyhow::Result;
use sea_orm::sea_query::{Expr, OnConflict};
use sea_orm::{
    ActiveValue, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder,
    QuerySelect,
};

use crate::entities::{account, prelude::*};

/// Fields needed to create an account row.
pub struct NewAccount {
    pub username: String,
    pub password_hash: String,
    pub salt: String,
    pub image_name: String,
}

/// How a finished game counts towards an account's record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameResult {
    Won,
    Lost,
    Unranked,
}

#[derive(Clone)]
pub struct AccountRepository {
    db: DatabaseConnection,
}

impl AccountRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    pub fn model_to_account(model: account::Model) -> AccountView {
        AccountView {
            username: model.username,
            image_name: model.image_name,
            wins: model.wins,
            losses: model.losses,
            created_at: model.created_at.to_rfc3339(),
            status: AccountStatus::parse(&model.status),
            is_owner: model.is_owner,
            word_count: model.word_count,
            new_word_count: model.new_word_count,
        }
    }

    /// Returns false when the username is already taken.
    pub async fn create(&self, new_account: NewAccount) -> Result<bool> {
        let model = account::ActiveModel {
            username: ActiveValue::Set(new_account.username),
            password_hash: ActiveValue::Set(new_account.password_hash),
            salt: ActiveValue::Set(new_account.salt),
            image_name: ActiveValue::Set(new_account.image_name),
            wins: ActiveValue::Set(0),
            losses: ActiveValue::Set(0),
            created_at: ActiveValue::Set(chrono::Utc::now()),
            status: ActiveValue::Set(AccountStatus::Offline.as_str().to_string()),
            is_owner: ActiveValue::Set(false),
            word_count: ActiveValue::Set(0),
            new_word_count: ActiveValue::Set(0),
        };

        let rows = Account::insert(model)
            .on_conflict(
                OnConflict::column(account::Column::Username)
                    .do_nothing()
                    .to_owned(),
            )
            .exec_without_returning(&self.db)
            .await?;

        Ok(rows == 1)
    }

    pub async fn find(&self, username: &str) -> Result<Option<AccountView>> {
        Ok(self.find_model(username).await?.map(Self::model_to_account))
    }

    /// Raw row, including the password hash and salt.
    pub async fn find_model(&self, username: &str) -> Result<Option<account::Model>> {
        Ok(Account::find_by_id(username.to_string()).one(&self.db).await?)
    }

    pub async fn set_status(&self, username: &str, status: AccountStatus) -> Result<()> {
        self.update_column(
            username,
            account::Column::Status,
            Expr::value(status.as_str()),
        )
        .await
    }

    pub async fn set_owner(&self, username: &str, is_owner: bool) -> Result<()> {
        self.update_column(username, account::Column::IsOwner, Expr::value(is_owner))
            .await
    }

    /// Marks the account as a lobby owner unless it already is one.
    /// Returns false when another request got there first.
    pub async fn claim_ownership(&self, username: &str) -> Result<bool> {
        let result = Account::update_many()
            .col_expr(account::Column::IsOwner, Expr::value(true))
            .filter(account::Column::Username.eq(username))
            .filter(account::Column::IsOwner.eq(false))
            .exec(&self.db)
            .await?;
        Ok(result.rows_affected == 1)
    }

    pub async fn set_image(&self, username: &str, image_name: &str) -> Result<()> {
        self.update_column(username, account::Column::ImageName, Expr::value(image_name))
            .await
    }

    pub async fn set_password(&self, username: &str, password_hash: &str, salt: &str) -> Result<()> {
        Account::update_many()
            .col_expr(account::Column::PasswordHash, Expr::value(password_hash))
            .col_expr(account::Column::Salt, Expr::value(salt))
            .filter(account::Column::Username.eq(username))
            .exec(&self.db)
            .await?;
        Ok(())
    }

    /// Adds a finished game's word counts to the running totals and bumps wins or losses.
    pub async fn record_game(
        &self,
        username: &str,
        result: GameResult,
        word_count: i32,
        new_word_count: i32,
    ) -> Result<()> {
        let mut update = Account::update_many()
            .col_expr(
                account::Column::WordCount,
                Expr::col(account::Column::WordCount).add(word_count),
            )
            .col_expr(
                account::Column::NewWordCount,
                Expr::col(account::Column::NewWordCount).add(new_word_count),
            );

        update = match result {
            GameResult::Won => {
                update.col_expr(account::Column::Wins, Expr::col(account::Column::Wins).add(1))
            }
            GameResult::Lost => update.col_expr(
                account::Column::Losses,
                Expr::col(account::Column::Losses).add(1),
            ),
            GameResult::Unranked => update,
        };

        update
            .filter(account::Column::Username.eq(username))
            .exec(&self.db)
            .await?;
        Ok(())
    }

    /// Returns false when no such account existed.
    pub async fn delete(&self, username: &str) -> Result<bool> {
        let result = Account::delete_by_id(username.to_string())
            .exec(&self.db)
            .await?;
        Ok(result.rows_affected > 0)
    }

    pub async fn get_leaderboard(&self, limit: u64) -> Result<Vec<LeaderboardEntry>> {
        let accounts = Account::find()
            .order_by_desc(account::Column::Wins)
            .order_by_asc(account::Column::Losses)
            .order_by_asc(account::Column::Username)
            .limit(limit)
            .all(&self.db)
            .await?;

        let leaderboard = accounts
            .into_iter()
            .enumerate()
            .map(|(index, model)| LeaderboardEntry {
                account: Self::model_to_account(model),
                rank: (index + 1) as u32,
            })
            .collect();

        Ok(leaderboard)
    }

    async fn update_column(
        &self,
        username: &str,
        column: account::Column,
        value: sea_orm::sea_query::SimpleExpr,
    ) -> Result<()> {
        Account::update_many()
            .col_expr(column, value)
            .filter(account::Column::Username.eq(username))
            .exec(&self.db)
            .await?;
        Ok(())
    }
}
