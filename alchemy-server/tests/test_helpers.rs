#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use alchemy_core::{AchievementKind, canonical_pair};
use alchemy_persistence::seed::seed_combinations;
use alchemy_persistence::{
    AchievementRepository, ImageRepository, LobbyRepository, NewAchievement, WordRepository,
    connect_to_memory_database,
};
use alchemy_server::account_service::AccountService;
use alchemy_server::auth::AuthService;
use alchemy_server::events::{EventBus, SubscriptionKind};
use alchemy_server::game_manager::GameManager;
use alchemy_server::lobby_manager::LobbyManager;
use alchemy_server::registry::{PlayerKey, SessionRegistry};
use alchemy_server::word_generator::{GeneratorError, WordGenerator};
use alchemy_types::{EventPayload, JoinLobbyRequest, RegisterRequest};
use async_trait::async_trait;
use migration::{Migrator, MigratorTrait};
use sea_orm::DatabaseConnection;
use tokio::sync::mpsc::Receiver;

pub const PASSWORD: &str = "abcdefgh";

/// steam (depth 1), geyser (2), cloud (3) and lightning (4).
pub const GRAPH: &str = "a,b,result
fire,water,steam
steam,earth,geyser
geyser,wind,cloud
cloud,fire,lightning
";

/// Answers from a fixed table; anything else fails like an unreachable API.
pub struct ScriptedGenerator {
    answers: HashMap<(String, String), String>,
    pub calls: AtomicUsize,
}

impl ScriptedGenerator {
    pub fn new(answers: &[(&str, &str, &str)]) -> Self {
        Self {
            answers: answers
                .iter()
                .map(|(a, b, result)| (canonical_pair(a, b), result.to_string()))
                .collect(),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl WordGenerator for ScriptedGenerator {
    async fn combine(&self, a: &str, b: &str) -> Result<String, GeneratorError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.answers
            .get(&canonical_pair(a, b))
            .cloned()
            .ok_or(GeneratorError::EmptyResponse)
    }
}

/// Test setup that provides all necessary components
pub struct TestServerSetup {
    pub db: DatabaseConnection,
    pub auth_service: Arc<AuthService>,
    pub event_bus: Arc<EventBus>,
    pub game_manager: Arc<GameManager>,
    pub lobby_manager: Arc<LobbyManager>,
    pub account_service: Arc<AccountService>,
    pub generator: Arc<ScriptedGenerator>,
}

impl TestServerSetup {
    pub async fn new() -> Self {
        Self::with_generator(ScriptedGenerator::new(&[("fire", "earth", "Lava")])).await
    }

    pub async fn with_generator(generator: ScriptedGenerator) -> Self {
        let db = connect_to_memory_database().await.unwrap();
        Migrator::up(&db, None).await.unwrap();

        let images = ImageRepository::new(db.clone());
        images.add("alembic.png").await.unwrap();
        images.add("beaker.png").await.unwrap();
        images.add_achievement_image("trophy.png").await.unwrap();

        let words = WordRepository::new(db.clone());
        words.ensure_primitives().await.unwrap();
        seed_combinations(&words, GRAPH.as_bytes()).await.unwrap();

        let achievements = AchievementRepository::new(db.clone());
        for (title, kind, value) in [
            ("Inventor", AchievementKind::NewWordCount, "1"),
            ("Weather Maker", AchievementKind::TargetWord, "cloud"),
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

        let generator = Arc::new(generator);
        let event_bus = Arc::new(EventBus::new(Arc::new(SessionRegistry::new())));
        let auth_service = Arc::new(AuthService::new("test-secret", 4));
        let game_manager = GameManager::new(db.clone(), generator.clone(), book, event_bus.clone());
        let lobby_manager = Arc::new(LobbyManager::new(
            db.clone(),
            auth_service.clone(),
            event_bus.clone(),
        ));
        let account_service = Arc::new(AccountService::new(
            db.clone(),
            lobby_manager.clone(),
            auth_service.clone(),
        ));

        Self {
            db,
            auth_service,
            event_bus,
            game_manager,
            lobby_manager,
            account_service,
            generator,
        }
    }

    pub async fn create_account(&self, username: &str) {
        self.account_service
            .register(RegisterRequest {
                username: username.to_string(),
                password: PASSWORD.to_string(),
            })
            .await
            .unwrap();
    }

    /// Registers `owner` and opens a lobby for them; returns the lobby code.
    pub async fn open_lobby(&self, owner: &str) -> String {
        self.create_account(owner).await;
        self.lobby_manager
            .create_lobby(owner, "Test Lab")
            .await
            .unwrap()
            .lobby
            .lobby_code
    }

    /// Joins anonymously.
    pub async fn join(&self, lobby_code: &str, player_name: &str) {
        self.lobby_manager
            .join_lobby(
                JoinLobbyRequest {
                    player_name: player_name.to_string(),
                    lobby_code: lobby_code.to_string(),
                },
                None,
            )
            .await
            .unwrap();
    }

    pub fn listen(&self, lobby_code: &str, player_name: &str) -> Receiver<EventPayload> {
        let (_, receiver) = self
            .event_bus
            .subscribe(SubscriptionKind::Player(PlayerKey::new(lobby_code, player_name)));
        receiver
    }

    pub async fn set_target(&self, lobby_code: &str, player_name: &str, target: &str) {
        LobbyRepository::new(self.db.clone())
            .set_target(lobby_code, player_name, target)
            .await
            .unwrap();
    }
}

pub fn drain(receiver: &mut Receiver<EventPayload>) -> Vec<EventPayload> {
    let mut events = Vec::new();
    while let Ok(event) = receiver.try_recv() {
        events.push(event);
    }
    events
}
