use std::sync::Arc;

use alchemy_core::{AchievementBook, Broadcast};
use alchemy_persistence::AchievementRepository;
use anyhow::Result;
use tracing::info;

use crate::events::EventBus;

/// Unlocks achievements after moves made by account-backed players.
pub struct AchievementChecker {
    book: AchievementBook,
    achievements: AchievementRepository,
    bus: Arc<EventBus>,
}

impl AchievementChecker {
    pub fn new(book: AchievementBook, achievements: AchievementRepository, bus: Arc<EventBus>) -> Self {
        Self {
            book,
            achievements,
            bus,
        }
    }

    /// Returns the titles unlocked for the first time by this move.
    pub async fn check(
        &self,
        lobby_code: &str,
        player_name: &str,
        has_account: bool,
        new_word_count: i32,
        word_count: i32,
        result: &str,
    ) -> Result<Vec<String>> {
        if !has_account {
            return Ok(Vec::new());
        }

        let mut unlocked = Vec::new();
        for title in self.book.earned(new_word_count, word_count, result) {
            if self.achievements.unlock(player_name, &title).await? {
                info!(player = player_name, title = %title, "Achievement unlocked");
                self.bus
                    .publish(Broadcast::achievement(lobby_code, player_name, &title));
                unlocked.push(title);
            }
        }
        Ok(unlocked)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::SubscriptionKind;
    use crate::registry::{PlayerKey, SessionRegistry};
    use alchemy_core::AchievementKind;
    use alchemy_persistence::{
        AccountRepository, ImageRepository, NewAccount, NewAchievement, connect_to_memory_database,
    };
    use alchemy_types::EventPayload;
    use migration::{Migrator, MigratorTrait};

    async fn setup() -> (AchievementChecker, Arc<EventBus>) {
        let db = connect_to_memory_database().await.unwrap();
        Migrator::up(&db, None).await.unwrap();

        let images = ImageRepository::new(db.clone());
        images.add("alembic.png").await.unwrap();
        images.add_achievement_image("trophy.png").await.unwrap();
        AccountRepository::new(db.clone())
            .create(NewAccount {
                username: "alice".to_string(),
                password_hash: "hash".to_string(),
                salt: "salt".to_string(),
                image_name: "alembic.png".to_string(),
            })
            .await
            .unwrap();

        let achievements = AchievementRepository::new(db);
        for (title, kind, value) in [
            ("Inventor", AchievementKind::NewWordCount, "1"),
            ("Tinkerer", AchievementKind::WordCount, "2"),
            ("Steam Punk", AchievementKind::TargetWord, "steam"),
        ] {
            achievements
                .upsert(NewAchievement {
                    title: title.to_string(),
                    kind,
                    value: value.to_string(),
                    description: String::new(),
                    image_name: "trophy.png".to_string(),
                })
                .await
                .unwrap();
        }

        let book = achievements.load_book().await.unwrap();
        let bus = Arc::new(EventBus::new(Arc::new(SessionRegistry::new())));
        (AchievementChecker::new(book, achievements, bus.clone()), bus)
    }

    #[tokio::test]
    async fn test_first_unlock_notifies_the_player() {
        let (checker, bus) = setup().await;
        let (_, mut receiver) =
            bus.subscribe(SubscriptionKind::Player(PlayerKey::new("AbC123", "alice")));

        let unlocked = checker
            .check("AbC123", "alice", true, 1, 1, "steam")
            .await
            .unwrap();
        assert_eq!(unlocked, vec!["Inventor".to_string(), "Steam Punk".to_string()]);
        assert_eq!(
            receiver.recv().await,
            Some(EventPayload::Achievement {
                achievement_title: "Inventor".to_string()
            })
        );
        assert_eq!(
            receiver.recv().await,
            Some(EventPayload::Achievement {
                achievement_title: "Steam Punk".to_string()
            })
        );

        // Second time around nothing is new.
        let again = checker
            .check("AbC123", "alice", true, 1, 1, "steam")
            .await
            .unwrap();
        assert!(again.is_empty());
        assert!(receiver.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_anonymous_players_earn_nothing() {
        let (checker, _) = setup().await;
        let unlocked = checker
            .check("AbC123", "bob", false, 1, 2, "steam")
            .await
            .unwrap();
        assert!(unlocked.is_empty());
    }
}
