use super::*;
use crate::config::Config;
use crate::events::{SubscriptionKind, subscription_kind};
use crate::registry::SessionRegistry;
use crate::word_generator::OpenAiWordGenerator;
use alchemy_persistence::seed::seed_combinations;
use alchemy_persistence::{
    AchievementRepository, ImageRepository, WordRepository, connect_to_memory_database,
};
use alchemy_types::{
    CombinationResponse, CreateLobbyResponse, EventPayload, EventTag, GameEndResponse,
    JoinLobbyResponse, LobbiesView, TokenResponse, WordsResponse,
};
use migration::{Migrator, MigratorTrait};
use serde::de::DeserializeOwned;
use serde_json::json;
use tokio::sync::mpsc::Receiver;

const TEST_ORIGIN: &str = "http://localhost:5173";
const GRAPH: &str = "a,b,result\nfire,water,steam\nsteam,earth,geyser\ngeyser,wind,cloud\n";

struct TestApp<F> {
    routes: F,
    auth_service: Arc<AuthService>,
    event_bus: Arc<EventBus>,
}

async fn create_test_app()
-> TestApp<impl Filter<Extract = impl warp::Reply, Error = warp::Rejection> + Clone> {
    create_test_app_for(TEST_ORIGIN.to_string()).await
}

async fn create_test_app_for(
    client_origin: String,
) -> TestApp<impl Filter<Extract = impl warp::Reply, Error = warp::Rejection> + Clone> {
    let db = connect_to_memory_database().await.unwrap();
    Migrator::up(&db, None).await.unwrap();

    let images = ImageRepository::new(db.clone());
    images.add("alembic.png").await.unwrap();
    images.add("beaker.png").await.unwrap();
    let words = WordRepository::new(db.clone());
    words.ensure_primitives().await.unwrap();
    seed_combinations(&words, GRAPH.as_bytes()).await.unwrap();

    // No API key: every combination has to come from the seeded graph.
    let generator = Arc::new(
        OpenAiWordGenerator::new(
            "http://127.0.0.1:9/unused".to_string(),
            "test".to_string(),
            String::new(),
        )
        .unwrap(),
    );
    let book = AchievementRepository::new(db.clone())
        .load_book()
        .await
        .unwrap();

    let registry = Arc::new(SessionRegistry::new());
    let event_bus = Arc::new(EventBus::new(registry));
    let auth_service = Arc::new(AuthService::new("integration-secret", 4));
    let game_manager = GameManager::new(db.clone(), generator, book, event_bus.clone());
    let lobby_manager = Arc::new(LobbyManager::new(
        db.clone(),
        auth_service.clone(),
        event_bus.clone(),
    ));
    let account_service = Arc::new(AccountService::new(
        db,
        lobby_manager.clone(),
        auth_service.clone(),
    ));

    let routes = create_routes(
        auth_service.clone(),
        account_service,
        lobby_manager,
        game_manager,
        event_bus.clone(),
        client_origin,
    );
    TestApp {
        routes,
        auth_service,
        event_bus,
    }
}

fn body<T: DeserializeOwned>(response: &warp::http::Response<warp::hyper::body::Bytes>) -> T {
    serde_json::from_slice(response.body()).unwrap()
}

fn bearer(token: &str) -> String {
    format!("Bearer {token}")
}

fn drain(receiver: &mut Receiver<EventPayload>) -> Vec<EventPayload> {
    let mut events = Vec::new();
    while let Ok(event) = receiver.try_recv() {
        events.push(event);
    }
    events
}

async fn register_and_login<F>(app: &TestApp<F>, username: &str) -> String
where
    F: Filter + 'static,
    F::Extract: warp::Reply + Send,
{
    let credentials = json!({ "username": username, "password": "abcdefgh" });
    let response = warp::test::request()
        .method("POST")
        .path("/accounts")
        .json(&credentials)
        .reply(&app.routes)
        .await;
    assert_eq!(response.status(), 201);

    let response = warp::test::request()
        .method("POST")
        .path("/login")
        .json(&credentials)
        .reply(&app.routes)
        .await;
    assert_eq!(response.status(), 200);
    body::<TokenResponse>(&response).token
}

async fn create_lobby<F>(app: &TestApp<F>, account_token: &str) -> CreateLobbyResponse
where
    F: Filter + 'static,
    F::Extract: warp::Reply + Send,
{
    let response = warp::test::request()
        .method("POST")
        .path("/lobbies")
        .header("authorization", bearer(account_token))
        .json(&json!({ "name": "Lab One" }))
        .reply(&app.routes)
        .await;
    assert_eq!(response.status(), 200);
    body(&response)
}

async fn join<F>(app: &TestApp<F>, lobby_code: &str, player_name: &str) -> JoinLobbyResponse
where
    F: Filter + 'static,
    F::Extract: warp::Reply + Send,
{
    let response = warp::test::request()
        .method("PUT")
        .path("/lobbies")
        .json(&json!({ "playerName": player_name, "lobbyCode": lobby_code }))
        .reply(&app.routes)
        .await;
    assert_eq!(response.status(), 200);
    body(&response)
}

async fn combine<F>(
    app: &TestApp<F>,
    lobby_code: &str,
    player_name: &str,
    token: &str,
    a: &str,
    b: &str,
) -> warp::http::Response<warp::hyper::body::Bytes>
where
    F: Filter + 'static,
    F::Extract: warp::Reply + Send,
{
    warp::test::request()
        .method("POST")
        .path(&format!("/games/{lobby_code}/{player_name}/combinations"))
        .header("authorization", bearer(token))
        .json(&json!({ "a": a, "b": b }))
        .reply(&app.routes)
        .await
}

#[tokio::test]
async fn test_health_endpoint() {
    let app = create_test_app().await;

    let response = warp::test::request()
        .method("GET")
        .path("/health")
        .reply(&app.routes)
        .await;

    assert_eq!(response.status(), 200);
    assert_eq!(response.body(), "OK");
}

#[tokio::test]
async fn test_cors_preflight_for_the_client_origin() {
    let app = create_test_app().await;

    let response = warp::test::request()
        .method("OPTIONS")
        .path("/lobbies")
        .header("origin", TEST_ORIGIN)
        .header("access-control-request-method", "PUT")
        .header("access-control-request-headers", "authorization")
        .reply(&app.routes)
        .await;

    assert_eq!(response.status(), 200);
    assert_eq!(
        response.headers()["access-control-allow-origin"],
        TEST_ORIGIN
    );
}

#[tokio::test]
async fn test_routes_outlive_the_configured_origin() {
    let app = {
        let config = Config::from_lookup(|name| match name {
            "JWT_SECRET" => Some("integration-secret".to_string()),
            "CLIENT" => Some("https://play.example.com".to_string()),
            _ => None,
        })
        .unwrap();
        create_test_app_for(config.client_origin.clone()).await
    };

    let response = warp::test::request()
        .method("OPTIONS")
        .path("/health")
        .header("origin", "https://play.example.com")
        .header("access-control-request-method", "GET")
        .reply(&app.routes)
        .await;

    assert_eq!(response.status(), 200);
    assert_eq!(
        response.headers()["access-control-allow-origin"],
        "https://play.example.com"
    );
}

#[tokio::test]
async fn test_register_login_and_single_lobby_per_owner() {
    let app = create_test_app().await;
    let token = register_and_login(&app, "alice").await;

    let created = create_lobby(&app, &token).await;
    assert_eq!(created.lobby.lobby_code.len(), 6);
    assert_eq!(created.lobby.player_count, 1);
    assert!(created.lobby.players[0].is_owner);

    let response = warp::test::request()
        .method("POST")
        .path("/lobbies")
        .header("authorization", bearer(&token))
        .json(&json!({ "name": "Lab Two" }))
        .reply(&app.routes)
        .await;
    assert_eq!(response.status(), 401);

    let response = warp::test::request()
        .method("GET")
        .path("/account/alice")
        .header("authorization", bearer(&token))
        .reply(&app.routes)
        .await;
    assert_eq!(response.status(), 200);
    let account: serde_json::Value = body(&response);
    assert_eq!(account["isOwner"], true);
    assert_eq!(account["status"], "ONLINE");
}

#[tokio::test]
async fn test_bad_credentials_and_duplicate_usernames() {
    let app = create_test_app().await;
    register_and_login(&app, "alice").await;

    let response = warp::test::request()
        .method("POST")
        .path("/accounts")
        .json(&json!({ "username": "alice", "password": "abcdefgh" }))
        .reply(&app.routes)
        .await;
    assert_eq!(response.status(), 409);

    let response = warp::test::request()
        .method("POST")
        .path("/login")
        .json(&json!({ "username": "alice", "password": "wrong-password" }))
        .reply(&app.routes)
        .await;
    assert_eq!(response.status(), 401);

    let response = warp::test::request()
        .method("POST")
        .path("/accounts")
        .json(&json!({ "username": "bob", "password": "short" }))
        .reply(&app.routes)
        .await;
    assert_eq!(response.status(), 400);
}

#[tokio::test]
async fn test_joining_notifies_lobby_members() {
    let app = create_test_app().await;
    let token = register_and_login(&app, "alice").await;
    let lobby_code = create_lobby(&app, &token).await.lobby.lobby_code;

    let bob = join(&app, &lobby_code, "bob").await;
    assert_eq!(bob.lobby.player_count, 2);
    assert!(!bob.lobby.players.iter().any(|p| p.name == "bob" && p.has_account));

    let response = warp::test::request()
        .method("GET")
        .path("/lobbies")
        .reply(&app.routes)
        .await;
    let lobbies: Vec<LobbiesView> = body(&response);
    assert_eq!(lobbies.len(), 1);
    assert_eq!(lobbies[0].player_count, 2);

    let kind = subscription_kind(&app.auth_service, Some(&bearer(&bob.token)));
    assert!(matches!(kind, SubscriptionKind::Player(_)));
    let (_, mut bob_events) = app.event_bus.subscribe(kind);

    join(&app, &lobby_code, "carol").await;
    assert_eq!(
        drain(&mut bob_events),
        vec![EventPayload::Tag(EventTag::PlayerJoined)]
    );

    // Same name twice in one lobby.
    let response = warp::test::request()
        .method("PUT")
        .path("/lobbies")
        .json(&json!({ "playerName": "carol", "lobbyCode": lobby_code }))
        .reply(&app.routes)
        .await;
    assert_eq!(response.status(), 409);
}

#[tokio::test]
async fn test_player_tokens_are_scoped_to_their_lobby() {
    let app = create_test_app().await;
    let token = register_and_login(&app, "alice").await;
    let lobby_code = create_lobby(&app, &token).await.lobby.lobby_code;
    let bob = join(&app, &lobby_code, "bob").await;

    // Bob's token does not open Carol's door.
    let response = warp::test::request()
        .method("GET")
        .path(&format!("/lobbies/{lobby_code}/carol"))
        .header("authorization", bearer(&bob.token))
        .reply(&app.routes)
        .await;
    assert_eq!(response.status(), 401);

    // Only the owner starts games.
    let response = warp::test::request()
        .method("POST")
        .path(&format!("/games/{lobby_code}/bob/game"))
        .header("authorization", bearer(&bob.token))
        .json(&json!({ "gameMode": "Vanilla" }))
        .reply(&app.routes)
        .await;
    assert_eq!(response.status(), 401);

    let response = warp::test::request()
        .method("GET")
        .path(&format!("/lobbies/{lobby_code}/bob"))
        .header("authorization", bearer(&bob.token))
        .reply(&app.routes)
        .await;
    assert_eq!(response.status(), 200);
}

#[tokio::test]
async fn test_fusion_frenzy_race_to_the_target() {
    let app = create_test_app().await;
    let account_token = register_and_login(&app, "alice").await;
    let created = create_lobby(&app, &account_token).await;
    let lobby_code = created.lobby.lobby_code;
    let alice = created.token;
    let bob = join(&app, &lobby_code, "bob").await.token;

    let kind = subscription_kind(&app.auth_service, Some(&bob));
    let (_, mut bob_events) = app.event_bus.subscribe(kind);

    let response = warp::test::request()
        .method("POST")
        .path(&format!("/games/{lobby_code}/alice/game"))
        .header("authorization", bearer(&alice))
        .json(&json!({ "gameMode": "Fusion Frenzy" }))
        .reply(&app.routes)
        .await;
    assert_eq!(response.status(), 200);
    assert_eq!(
        drain(&mut bob_events),
        vec![EventPayload::Tag(EventTag::GameStarted)]
    );

    let response = warp::test::request()
        .method("GET")
        .path(&format!("/games/{lobby_code}/alice/words"))
        .header("authorization", bearer(&alice))
        .reply(&app.routes)
        .await;
    let words: WordsResponse = body(&response);
    assert_eq!(words.target_word, "cloud");
    assert_eq!(words.words.len(), 4);

    // Bob cannot use a word he has not made yet.
    let response = combine(&app, &lobby_code, "bob", &bob, "steam", "earth").await;
    assert_eq!(response.status(), 400);

    for (a, b, expected) in [
        ("fire", "water", "steam"),
        ("Steam", "earth", "geyser"),
        ("wind", "geyser", "cloud"),
    ] {
        let response = combine(&app, &lobby_code, "alice", &alice, a, b).await;
        assert_eq!(response.status(), 200);
        assert_eq!(
            body::<CombinationResponse>(&response),
            CombinationResponse {
                result: expected.to_string(),
                is_new: false,
            }
        );
    }

    let events = drain(&mut bob_events);
    assert!(events.contains(&EventPayload::Tag(EventTag::GameOver)));
    assert!(events.contains(&EventPayload::Tag(EventTag::AccountUpdate)));

    let response = warp::test::request()
        .method("GET")
        .path(&format!("/games/{lobby_code}/bob/game"))
        .header("authorization", bearer(&bob))
        .reply(&app.routes)
        .await;
    let stats: GameEndResponse = body(&response);
    assert_eq!(stats.winner.as_deref(), Some("alice"));
    assert_eq!(stats.players[0].name, "alice");
    assert_eq!(stats.players[0].word_count, 3);

    // No moves after the game is over.
    let response = combine(&app, &lobby_code, "bob", &bob, "fire", "water").await;
    assert_eq!(response.status(), 400);

    let response = warp::test::request()
        .method("GET")
        .path("/leaderboard")
        .reply(&app.routes)
        .await;
    let leaderboard: serde_json::Value = body(&response);
    assert_eq!(leaderboard[0]["rank"], 1);
    assert_eq!(leaderboard[0]["account"]["username"], "alice");
    assert_eq!(leaderboard[0]["account"]["wins"], 1);
}

#[tokio::test]
async fn test_owner_ends_game_and_closes_lobby() {
    let app = create_test_app().await;
    let account_token = register_and_login(&app, "alice").await;
    let created = create_lobby(&app, &account_token).await;
    let lobby_code = created.lobby.lobby_code;
    let alice = created.token;
    let bob = join(&app, &lobby_code, "bob").await.token;

    let response = warp::test::request()
        .method("POST")
        .path(&format!("/games/{lobby_code}/alice/game"))
        .header("authorization", bearer(&alice))
        .json(&json!({ "gameMode": "Vanilla", "withTimer": true, "duration": 2 }))
        .reply(&app.routes)
        .await;
    assert_eq!(response.status(), 200);

    let response = combine(&app, &lobby_code, "bob", &bob, "fire", "water").await;
    assert_eq!(response.status(), 200);

    let (_, mut bob_events) = app
        .event_bus
        .subscribe(subscription_kind(&app.auth_service, Some(&bob)));
    let response = warp::test::request()
        .method("POST")
        .path(&format!("/games/{lobby_code}/alice/end"))
        .header("authorization", bearer(&alice))
        .reply(&app.routes)
        .await;
    assert_eq!(response.status(), 200);

    let events = drain(&mut bob_events);
    assert!(events.contains(&EventPayload::Tag(EventTag::AccountUpdate)));
    assert!(events.contains(&EventPayload::Tag(EventTag::GameOver)));

    let response = warp::test::request()
        .method("GET")
        .path(&format!("/games/{lobby_code}/alice/game"))
        .header("authorization", bearer(&alice))
        .reply(&app.routes)
        .await;
    let stats: GameEndResponse = body(&response);
    assert_eq!(stats.winner.as_deref(), Some("bob"));

    let response = warp::test::request()
        .method("POST")
        .path(&format!("/lobbies/{lobby_code}/alice/leave"))
        .header("authorization", bearer(&alice))
        .reply(&app.routes)
        .await;
    assert_eq!(response.status(), 200);

    let response = warp::test::request()
        .method("GET")
        .path("/lobbies")
        .reply(&app.routes)
        .await;
    let lobbies: Vec<LobbiesView> = body(&response);
    assert!(lobbies.is_empty());
}

#[tokio::test]
async fn test_broadcast_reaches_anonymous_listeners() {
    let app = create_test_app().await;
    let (_, mut listener) = app.event_bus.subscribe(SubscriptionKind::Anonymous);

    let response = warp::test::request()
        .method("POST")
        .path("/broadcast")
        .json(&json!({ "message": "maintenance at noon" }))
        .reply(&app.routes)
        .await;
    assert_eq!(response.status(), 200);
    assert_eq!(
        drain(&mut listener),
        vec![EventPayload::Message("maintenance at noon".to_string())]
    );
}
