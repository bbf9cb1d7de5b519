use anyhow::Result;
use sea_orm::sea_query::{Expr, OnConflict};
use sea_orm::{ActiveValue, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter};

use crate::entities::{daily_challenge, prelude::*};

/// Best (lowest) word count per account and day.
#[derive(Clone)]
pub struct DailyChallengeRepository {
    db: DatabaseConnection,
}

impl DailyChallengeRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Records a finished run; the stored count only ever goes down.
    /// Returns the count kept after this submission.
    pub async fn record(&self, date: &str, username: &str, word_count: i32) -> Result<i32> {
        let model = daily_challenge::ActiveModel {
            date: ActiveValue::Set(date.to_string()),
            username: ActiveValue::Set(username.to_string()),
            word_count: ActiveValue::Set(word_count),
        };
        let inserted = DailyChallenge::insert(model)
            .on_conflict(
                OnConflict::columns([
                    daily_challenge::Column::Date,
                    daily_challenge::Column::Username,
                ])
                .do_nothing()
                .to_owned(),
            )
            .exec_without_returning(&self.db)
            .await?;

        if inserted == 0 {
            DailyChallenge::update_many()
                .col_expr(daily_challenge::Column::WordCount, Expr::value(word_count))
                .filter(daily_challenge::Column::Date.eq(date))
                .filter(daily_challenge::Column::Username.eq(username))
                .filter(daily_challenge::Column::WordCount.gt(word_count))
                .exec(&self.db)
                .await?;
        }

        Ok(self.best(date, username).await?.unwrap_or(word_count))
    }

    pub async fn best(&self, date: &str, username: &str) -> Result<Option<i32>> {
        let entry = DailyChallenge::find_by_id((date.to_string(), username.to_string()))
            .one(&self.db)
            .await?;
        Ok(entry.map(|entry| entry.word_count))
    }

    pub async fn delete_for_account(&self, username: &str) -> Result<u64> {
        let result = DailyChallenge::delete_many()
            .filter(daily_challenge::Column::Username.eq(username))
            .exec(&self.db)
            .await?;
        Ok(result.rows_affected)
    }
}
