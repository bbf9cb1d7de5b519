use anyhow::Result;
use sea_orm::sea_query::OnConflict;
use sea_orm::{ActiveValue, DatabaseConnection, EntityTrait, PaginatorTrait, QueryOrder};

use crate::entities::{achievement_image, image, prelude::*};

#[derive(Clone)]
pub struct ImageRepository {
    db: DatabaseConnection,
}

impl ImageRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Registers a player image; returns false if it was already known.
    pub async fn add(&self, name: &str) -> Result<bool> {
        let model = image::ActiveModel {
            name: ActiveValue::Set(name.to_string()),
        };
        let rows = Image::insert(model)
            .on_conflict(OnConflict::column(image::Column::Name).do_nothing().to_owned())
            .exec_without_returning(&self.db)
            .await?;
        Ok(rows == 1)
    }

    pub async fn add_achievement_image(&self, name: &str) -> Result<bool> {
        let model = achievement_image::ActiveModel {
            name: ActiveValue::Set(name.to_string()),
        };
        let rows = AchievementImage::insert(model)
            .on_conflict(
                OnConflict::column(achievement_image::Column::Name)
                    .do_nothing()
                    .to_owned(),
            )
            .exec_without_returning(&self.db)
            .await?;
        Ok(rows == 1)
    }

    /// All player image names in stable (sorted) order.
    pub async fn list(&self) -> Result<Vec<String>> {
        let images = Image::find()
            .order_by_asc(image::Column::Name)
            .all(&self.db)
            .await?;
        Ok(images.into_iter().map(|image| image.name).collect())
    }

    pub async fn exists(&self, name: &str) -> Result<bool> {
        Ok(Image::find_by_id(name.to_string())
            .one(&self.db)
            .await?
            .is_some())
    }

    pub async fn count(&self) -> Result<u64> {
        Ok(Image::find().count(&self.db).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::connection::connect_to_memory_database;
    use migration::{Migrator, MigratorTrait};

    async fn setup_test_db() -> ImageRepository {
        let db = connect_to_memory_database().await.unwrap();
        Migrator::up(&db, None).await.unwrap();
        ImageRepository::new(db)
    }

    #[tokio::test]
    async fn test_images_are_sorted_and_deduplicated() {
        let repo = setup_test_db().await;

        assert!(repo.add("potion.png").await.unwrap());
        assert!(repo.add("alembic.png").await.unwrap());
        assert!(!repo.add("potion.png").await.unwrap());

        assert_eq!(repo.list().await.unwrap(), vec!["alembic.png", "potion.png"]);
        assert_eq!(repo.count().await.unwrap(), 2);
        assert!(repo.exists("alembic.png").await.unwrap());
        assert!(!repo.exists("flask.png").await.unwrap());
    }

    #[tokio::test]
    async fn test_achievement_images_are_separate() {
        let repo = setup_test_db().await;

        assert!(repo.add_achievement_image("trophy.png").await.unwrap());
        assert!(!repo.add_achievement_image("trophy.png").await.unwrap());
        assert!(repo.list().await.unwrap().is_empty());
    }
}
