use alchemy_core::{AchievementBook, AchievementKind};
use anyhow::Result;
use sea_orm::sea_query::OnConflict;
use sea_orm::{
    ActiveValue, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder,
};
use tracing::warn;

use crate::entities::{achievement, prelude::*, unlocked};

pub struct NewAchievement {
    pub title: String,
    pub kind: AchievementKind,
    pub value: String,
    pub description: String,
    pub image_name: String,
}

#[derive(Clone)]
pub struct AchievementRepository {
    db: DatabaseConnection,
}

impl AchievementRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Inserts or replaces an achievement definition.
    pub async fn upsert(&self, new_achievement: NewAchievement) -> Result<()> {
        let model = achievement::ActiveModel {
            title: ActiveValue::Set(new_achievement.title),
            kind: ActiveValue::Set(new_achievement.kind.as_str().to_string()),
            value: ActiveValue::Set(new_achievement.value),
            description: ActiveValue::Set(new_achievement.description),
            image_name: ActiveValue::Set(new_achievement.image_name),
        };
        Achievement::insert(model)
            .on_conflict(
                OnConflict::column(achievement::Column::Title)
                    .update_columns([
                        achievement::Column::Kind,
                        achievement::Column::Value,
                        achievement::Column::Description,
                        achievement::Column::ImageName,
                    ])
                    .to_owned(),
            )
            .exec_without_returning(&self.db)
            .await?;
        Ok(())
    }

    pub async fn all(&self) -> Result<Vec<achievement::Model>> {
        Ok(Achievement::find()
            .order_by_asc(achievement::Column::Title)
            .all(&self.db)
            .await?)
    }

    /// Builds the lookup tables from the stored definitions. Malformed rows
    /// are skipped.
    pub async fn load_book(&self) -> Result<AchievementBook> {
        let mut book = AchievementBook::new();
        for model in self.all().await? {
            let inserted = model
                .kind
                .parse::<AchievementKind>()
                .and_then(|kind| book.insert(kind, &model.value, model.title.clone()));
            if let Err(error) = inserted {
                warn!(title = %model.title, %error, "Skipping achievement");
            }
        }
        Ok(book)
    }

    /// Returns true only the first time the pair is unlocked.
    pub async fn unlock(&self, username: &str, title: &str) -> Result<bool> {
        let model = unlocked::ActiveModel {
            username: ActiveValue::Set(username.to_string()),
            achievement_title: ActiveValue::Set(title.to_string()),
        };
        let rows = Unlocked::insert(model)
            .on_conflict(
                OnConflict::columns([unlocked::Column::Username, unlocked::Column::AchievementTitle])
                    .do_nothing()
                    .to_owned(),
            )
            .exec_without_returning(&self.db)
            .await?;
        Ok(rows == 1)
    }

    pub async fn unlocked_titles(&self, username: &str) -> Result<Vec<String>> {
        let rows = Unlocked::find()
            .filter(unlocked::Column::Username.eq(username))
            .order_by_asc(unlocked::Column::AchievementTitle)
            .all(&self.db)
            .await?;
        Ok(rows.into_iter().map(|row| row.achievement_title).collect())
    }

    pub async fn delete_for_account(&self, username: &str) -> Result<u64> {
        let result = Unlocked::delete_many()
            .filter(unlocked::Column::Username.eq(username))
            .exec(&self.db)
            .await?;
        Ok(result.rows_affected)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::connection::connect_to_memory_database;
    use crate::repositories::{AccountRepository, NewAccount};
    use migration::{Migrator, MigratorTrait};

    async fn setup_test_db() -> AchievementRepository {
        let db = connect_to_memory_database().await.unwrap();
        Migrator::up(&db, None).await.unwrap();
        AccountRepository::new(db.clone())
            .create(NewAccount {
                username: "alice".to_string(),
                password_hash: "hash".to_string(),
                salt: "salt".to_string(),
                image_name: "flask.png".to_string(),
            })
            .await
            .unwrap();
        AchievementRepository::new(db)
    }

    fn new_achievement(title: &str, kind: AchievementKind, value: &str) -> NewAchievement {
        NewAchievement {
            title: title.to_string(),
            kind,
            value: value.to_string(),
            description: String::new(),
            image_name: "trophy.png".to_string(),
        }
    }

    #[tokio::test]
    async fn test_unlock_once() {
        let repo = setup_test_db().await;
        repo.upsert(new_achievement("Inventor", AchievementKind::NewWordCount, "1"))
            .await
            .unwrap();

        assert!(repo.unlock("alice", "Inventor").await.unwrap());
        for _ in 0..3 {
            assert!(!repo.unlock("alice", "Inventor").await.unwrap());
        }
        assert_eq!(repo.unlocked_titles("alice").await.unwrap(), vec!["Inventor"]);

        assert_eq!(repo.delete_for_account("alice").await.unwrap(), 1);
        assert!(repo.unlocked_titles("alice").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_load_book() {
        let repo = setup_test_db().await;
        repo.upsert(new_achievement("Inventor", AchievementKind::NewWordCount, "1"))
            .await
            .unwrap();
        repo.upsert(new_achievement("Tinkerer", AchievementKind::WordCount, "10"))
            .await
            .unwrap();
        repo.upsert(new_achievement("Steam Engine", AchievementKind::TargetWord, "steam"))
            .await
            .unwrap();
        // Replacing keeps one row per title.
        repo.upsert(new_achievement("Tinkerer", AchievementKind::WordCount, "20"))
            .await
            .unwrap();

        let book = repo.load_book().await.unwrap();
        assert_eq!(book.len(), 3);
        assert_eq!(book.earned(1, 20, "steam"), vec!["Inventor", "Tinkerer", "Steam Engine"]);
        assert!(book.earned(0, 10, "mud").is_empty());
    }
}
