use serde::Deserialize;
use std::sync::Arc;
use warp::Filter;
use warp::http::StatusCode;

use alchemy_types::{
    BroadcastRequest, CombinationRequest, CreateLobbyRequest, EditAccountRequest,
    EditLobbyRequest, JoinLobbyRequest, LoginRequest, RegisterRequest, StartGameRequest,
};

use crate::account_service::AccountService;
use crate::auth::{AuthError, AuthService};
use crate::errors::{ApiError, reply};
use crate::events::EventBus;
use crate::game_manager::GameManager;
use crate::lobby_manager::LobbyManager;

pub mod account_service;
pub mod achievements;
pub mod auth;
pub mod combinations;
pub mod config;
pub mod errors;
pub mod events;
pub mod game_manager;
pub mod lobby_manager;
pub mod registry;
pub mod timer;
pub mod word_generator;

#[derive(Deserialize)]
struct LeaderboardQuery {
    limit: Option<u64>,
}

fn ok() -> serde_json::Value {
    serde_json::json!({})
}

pub fn create_routes(
    auth_service: Arc<AuthService>,
    account_service: Arc<AccountService>,
    lobby_manager: Arc<LobbyManager>,
    game_manager: Arc<GameManager>,
    event_bus: Arc<EventBus>,
    client_origin: String,
) -> impl Filter<Extract = impl warp::Reply, Error = warp::Rejection> + Clone {
    let auth_filter = warp::any().map({
        let auth_service = auth_service.clone();
        move || auth_service.clone()
    });

    let accounts_filter = warp::any().map({
        let account_service = account_service.clone();
        move || account_service.clone()
    });

    let lobbies_filter = warp::any().map({
        let lobby_manager = lobby_manager.clone();
        move || lobby_manager.clone()
    });

    let games_filter = warp::any().map({
        let game_manager = game_manager.clone();
        move || game_manager.clone()
    });

    let bus_filter = warp::any().map({
        let event_bus = event_bus.clone();
        move || event_bus.clone()
    });

    let auth_header = || warp::header::optional::<String>("authorization");

    // Accounts
    let register = warp::path!("accounts")
        .and(warp::post())
        .and(warp::body::json())
        .and(accounts_filter.clone())
        .and_then(handle_register);

    let login = warp::path!("login")
        .and(warp::post())
        .and(warp::body::json())
        .and(accounts_filter.clone())
        .and_then(handle_login);

    let logout = warp::path!("logout")
        .and(warp::post())
        .and(auth_header())
        .and(auth_filter.clone())
        .and(accounts_filter.clone())
        .and_then(handle_logout);

    let get_account = warp::path!("account" / String)
        .and(warp::get())
        .and(auth_header())
        .and(auth_filter.clone())
        .and(accounts_filter.clone())
        .and_then(handle_get_account);

    let edit_account = warp::path!("account" / String)
        .and(warp::put())
        .and(auth_header())
        .and(warp::body::json())
        .and(auth_filter.clone())
        .and(accounts_filter.clone())
        .and_then(handle_edit_account);

    let delete_account = warp::path!("account" / String)
        .and(warp::delete())
        .and(auth_header())
        .and(auth_filter.clone())
        .and(accounts_filter.clone())
        .and_then(handle_delete_account);

    let account_images = warp::path!("account" / String / "images")
        .and(warp::get())
        .and(auth_header())
        .and(auth_filter.clone())
        .and(accounts_filter.clone())
        .and_then(handle_account_images);

    let account_lobby = warp::path!("account" / String / "lobby")
        .and(warp::post())
        .and(auth_header())
        .and(warp::body::json())
        .and(auth_filter.clone())
        .and(lobbies_filter.clone())
        .and_then(handle_account_lobby);

    let account_routes = register
        .or(login)
        .or(logout)
        .or(get_account)
        .or(edit_account)
        .or(delete_account)
        .or(account_images)
        .or(account_lobby)
        .boxed();

    // Lobbies
    let list_lobbies = warp::path!("lobbies")
        .and(warp::get())
        .and(lobbies_filter.clone())
        .and_then(handle_list_lobbies);

    let create_lobby = warp::path!("lobbies")
        .and(warp::post())
        .and(auth_header())
        .and(warp::body::json())
        .and(auth_filter.clone())
        .and(lobbies_filter.clone())
        .and_then(handle_create_lobby);

    let join_lobby = warp::path!("lobbies")
        .and(warp::put())
        .and(auth_header())
        .and(warp::body::json())
        .and(lobbies_filter.clone())
        .and_then(handle_join_lobby);

    let get_lobby = warp::path!("lobbies" / String / String)
        .and(warp::get())
        .and(auth_header())
        .and(auth_filter.clone())
        .and(lobbies_filter.clone())
        .and_then(handle_get_lobby);

    let leave_lobby = warp::path!("lobbies" / String / String / "leave")
        .and(warp::post())
        .and(auth_header())
        .and(auth_filter.clone())
        .and(lobbies_filter.clone())
        .and_then(handle_leave_lobby);

    let edit_lobby = warp::path!("lobbies" / String / String / "edit")
        .and(warp::put())
        .and(auth_header())
        .and(warp::body::json())
        .and(auth_filter.clone())
        .and(lobbies_filter.clone())
        .and_then(handle_edit_lobby);

    let lobby_routes = list_lobbies
        .or(create_lobby)
        .or(join_lobby)
        .or(get_lobby)
        .or(leave_lobby)
        .or(edit_lobby)
        .boxed();

    // Games
    let start_game = warp::path!("games" / String / String / "game")
        .and(warp::post())
        .and(auth_header())
        .and(warp::body::json())
        .and(auth_filter.clone())
        .and(games_filter.clone())
        .and_then(handle_start_game);

    let delete_game = warp::path!("games" / String / String / "game")
        .and(warp::delete())
        .and(auth_header())
        .and(auth_filter.clone())
        .and(games_filter.clone())
        .and_then(handle_delete_game);

    let game_stats = warp::path!("games" / String / String / "game")
        .and(warp::get())
        .and(auth_header())
        .and(auth_filter.clone())
        .and(games_filter.clone())
        .and_then(handle_game_stats);

    let end_game = warp::path!("games" / String / String / "end")
        .and(warp::post())
        .and(auth_header())
        .and(auth_filter.clone())
        .and(games_filter.clone())
        .and_then(handle_end_game);

    let combine = warp::path!("games" / String / String / "combinations")
        .and(warp::post())
        .and(auth_header())
        .and(warp::body::json())
        .and(auth_filter.clone())
        .and(games_filter.clone())
        .and_then(handle_combination);

    let words = warp::path!("games" / String / String / "words")
        .and(warp::get())
        .and(auth_header())
        .and(auth_filter.clone())
        .and(games_filter.clone())
        .and_then(handle_words);

    let game_routes = start_game
        .or(delete_game)
        .or(game_stats)
        .or(end_game)
        .or(combine)
        .or(words)
        .boxed();

    // Events and misc
    let events = warp::path!("events")
        .and(warp::get())
        .and(warp::query::<events::EventsQuery>())
        .and(auth_header())
        .and(bus_filter.clone())
        .and(auth_filter.clone())
        .and_then(events::handle_event_stream);

    let broadcast = warp::path!("broadcast")
        .and(warp::post())
        .and(warp::body::json())
        .and(bus_filter.clone())
        .and_then(handle_broadcast);

    let health = warp::path("health")
        .and(warp::get())
        .map(|| warp::reply::with_status("OK", StatusCode::OK));

    let leaderboard = warp::path("leaderboard")
        .and(warp::get())
        .and(warp::query::<LeaderboardQuery>())
        .and(accounts_filter.clone())
        .and_then(handle_leaderboard_request);

    let cors = warp::cors()
        .allow_origin(client_origin.as_str())
        .allow_headers(vec!["content-type", "authorization"])
        .allow_methods(vec!["GET", "POST", "PUT", "DELETE", "OPTIONS"]);

    account_routes
        .or(lobby_routes)
        .or(game_routes)
        .or(events)
        .or(broadcast)
        .or(health)
        .or(leaderboard)
        .with(cors)
        .with(warp::log("alchemy"))
}

async fn handle_register(
    request: RegisterRequest,
    account_service: Arc<AccountService>,
) -> Result<impl warp::Reply, warp::Rejection> {
    Ok(reply(
        account_service.register(request).await,
        StatusCode::CREATED,
    ))
}

async fn handle_login(
    request: LoginRequest,
    account_service: Arc<AccountService>,
) -> Result<impl warp::Reply, warp::Rejection> {
    Ok(reply(account_service.login(request).await, StatusCode::OK))
}

async fn handle_logout(
    auth_header: Option<String>,
    auth_service: Arc<AuthService>,
    account_service: Arc<AccountService>,
) -> Result<impl warp::Reply, warp::Rejection> {
    let claims = auth_header
        .as_deref()
        .ok_or(AuthError::MissingToken)
        .and_then(|token| auth_service.validate_account_token(token));
    let result = match claims {
        Ok(claims) => account_service.logout(&claims.username).await.map(|_| ok()),
        Err(e) => Err(e.into()),
    };
    Ok(reply(result, StatusCode::OK))
}

async fn handle_get_account(
    username: String,
    auth_header: Option<String>,
    auth_service: Arc<AuthService>,
    account_service: Arc<AccountService>,
) -> Result<impl warp::Reply, warp::Rejection> {
    let result = match auth_service.authorize_account(auth_header.as_deref(), &username) {
        Ok(_) => account_service.get(&username).await,
        Err(e) => Err(e.into()),
    };
    Ok(reply(result, StatusCode::OK))
}

async fn handle_edit_account(
    username: String,
    auth_header: Option<String>,
    request: EditAccountRequest,
    auth_service: Arc<AuthService>,
    account_service: Arc<AccountService>,
) -> Result<impl warp::Reply, warp::Rejection> {
    let result = match auth_service.authorize_account(auth_header.as_deref(), &username) {
        Ok(_) => account_service.edit(&username, request).await,
        Err(e) => Err(e.into()),
    };
    Ok(reply(result, StatusCode::OK))
}

async fn handle_delete_account(
    username: String,
    auth_header: Option<String>,
    auth_service: Arc<AuthService>,
    account_service: Arc<AccountService>,
) -> Result<impl warp::Reply, warp::Rejection> {
    let result = match auth_service.authorize_account(auth_header.as_deref(), &username) {
        Ok(_) => account_service.delete(&username).await.map(|_| ok()),
        Err(e) => Err(e.into()),
    };
    Ok(reply(result, StatusCode::OK))
}

async fn handle_account_images(
    username: String,
    auth_header: Option<String>,
    auth_service: Arc<AuthService>,
    account_service: Arc<AccountService>,
) -> Result<impl warp::Reply, warp::Rejection> {
    let result = match auth_service.authorize_account(auth_header.as_deref(), &username) {
        Ok(_) => account_service.images().await,
        Err(e) => Err(e.into()),
    };
    Ok(reply(result, StatusCode::OK))
}

async fn handle_account_lobby(
    username: String,
    auth_header: Option<String>,
    request: CreateLobbyRequest,
    auth_service: Arc<AuthService>,
    lobby_manager: Arc<LobbyManager>,
) -> Result<impl warp::Reply, warp::Rejection> {
    let result = match auth_service.authorize_account(auth_header.as_deref(), &username) {
        Ok(_) => lobby_manager.create_lobby(&username, &request.name).await,
        Err(e) => Err(e.into()),
    };
    Ok(reply(result, StatusCode::OK))
}

async fn handle_list_lobbies(
    lobby_manager: Arc<LobbyManager>,
) -> Result<impl warp::Reply, warp::Rejection> {
    Ok(reply(lobby_manager.list_lobbies().await, StatusCode::OK))
}

async fn handle_create_lobby(
    auth_header: Option<String>,
    request: CreateLobbyRequest,
    auth_service: Arc<AuthService>,
    lobby_manager: Arc<LobbyManager>,
) -> Result<impl warp::Reply, warp::Rejection> {
    let claims = auth_header
        .as_deref()
        .ok_or(AuthError::MissingToken)
        .and_then(|token| auth_service.validate_account_token(token));
    let result = match claims {
        Ok(claims) => lobby_manager.create_lobby(&claims.username, &request.name).await,
        Err(e) => Err(e.into()),
    };
    Ok(reply(result, StatusCode::OK))
}

async fn handle_join_lobby(
    auth_header: Option<String>,
    request: JoinLobbyRequest,
    lobby_manager: Arc<LobbyManager>,
) -> Result<impl warp::Reply, warp::Rejection> {
    Ok(reply(
        lobby_manager
            .join_lobby(request, auth_header.as_deref())
            .await,
        StatusCode::OK,
    ))
}

async fn handle_get_lobby(
    lobby_code: String,
    player_name: String,
    auth_header: Option<String>,
    auth_service: Arc<AuthService>,
    lobby_manager: Arc<LobbyManager>,
) -> Result<impl warp::Reply, warp::Rejection> {
    let result =
        match auth_service.authorize_player(auth_header.as_deref(), &lobby_code, &player_name) {
            Ok(_) => lobby_manager.get_lobby(&lobby_code).await,
            Err(e) => Err(e.into()),
        };
    Ok(reply(result, StatusCode::OK))
}

async fn handle_leave_lobby(
    lobby_code: String,
    player_name: String,
    auth_header: Option<String>,
    auth_service: Arc<AuthService>,
    lobby_manager: Arc<LobbyManager>,
) -> Result<impl warp::Reply, warp::Rejection> {
    let result =
        match auth_service.authorize_player(auth_header.as_deref(), &lobby_code, &player_name) {
            Ok(_) => lobby_manager
                .leave_lobby(&lobby_code, &player_name)
                .await
                .map(|_| ok()),
            Err(e) => Err(e.into()),
        };
    Ok(reply(result, StatusCode::OK))
}

async fn handle_edit_lobby(
    lobby_code: String,
    player_name: String,
    auth_header: Option<String>,
    request: EditLobbyRequest,
    auth_service: Arc<AuthService>,
    lobby_manager: Arc<LobbyManager>,
) -> Result<impl warp::Reply, warp::Rejection> {
    let result =
        match auth_service.authorize_owner(auth_header.as_deref(), &lobby_code, &player_name) {
            Ok(_) => lobby_manager
                .edit_game_mode(&lobby_code, request)
                .await
                .map(|_| ok()),
            Err(e) => Err(e.into()),
        };
    Ok(reply(result, StatusCode::OK))
}

async fn handle_start_game(
    lobby_code: String,
    player_name: String,
    auth_header: Option<String>,
    request: StartGameRequest,
    auth_service: Arc<AuthService>,
    game_manager: Arc<GameManager>,
) -> Result<impl warp::Reply, warp::Rejection> {
    let result =
        match auth_service.authorize_owner(auth_header.as_deref(), &lobby_code, &player_name) {
            Ok(_) => game_manager
                .start_game(&lobby_code, request)
                .await
                .map(|_| ok()),
            Err(e) => Err(e.into()),
        };
    Ok(reply(result, StatusCode::OK))
}

async fn handle_delete_game(
    lobby_code: String,
    player_name: String,
    auth_header: Option<String>,
    auth_service: Arc<AuthService>,
    game_manager: Arc<GameManager>,
) -> Result<impl warp::Reply, warp::Rejection> {
    let result =
        match auth_service.authorize_owner(auth_header.as_deref(), &lobby_code, &player_name) {
            Ok(_) => game_manager.delete_game(&lobby_code).await.map(|_| ok()),
            Err(e) => Err(e.into()),
        };
    Ok(reply(result, StatusCode::OK))
}

async fn handle_game_stats(
    lobby_code: String,
    player_name: String,
    auth_header: Option<String>,
    auth_service: Arc<AuthService>,
    game_manager: Arc<GameManager>,
) -> Result<impl warp::Reply, warp::Rejection> {
    let result =
        match auth_service.authorize_player(auth_header.as_deref(), &lobby_code, &player_name) {
            Ok(_) => game_manager.game_stats(&lobby_code).await,
            Err(e) => Err(e.into()),
        };
    Ok(reply(result, StatusCode::OK))
}

async fn handle_end_game(
    lobby_code: String,
    player_name: String,
    auth_header: Option<String>,
    auth_service: Arc<AuthService>,
    game_manager: Arc<GameManager>,
) -> Result<impl warp::Reply, warp::Rejection> {
    let result =
        match auth_service.authorize_owner(auth_header.as_deref(), &lobby_code, &player_name) {
            Ok(_) => game_manager.end_game(&lobby_code).await.map(|_| ok()),
            Err(e) => Err(e.into()),
        };
    Ok(reply(result, StatusCode::OK))
}

async fn handle_combination(
    lobby_code: String,
    player_name: String,
    auth_header: Option<String>,
    request: CombinationRequest,
    auth_service: Arc<AuthService>,
    game_manager: Arc<GameManager>,
) -> Result<impl warp::Reply, warp::Rejection> {
    let result =
        match auth_service.authorize_player(auth_header.as_deref(), &lobby_code, &player_name) {
            Ok(_) => {
                game_manager
                    .process_move(&lobby_code, &player_name, request)
                    .await
            }
            Err(e) => Err(e.into()),
        };
    Ok(reply(result, StatusCode::OK))
}

async fn handle_words(
    lobby_code: String,
    player_name: String,
    auth_header: Option<String>,
    auth_service: Arc<AuthService>,
    game_manager: Arc<GameManager>,
) -> Result<impl warp::Reply, warp::Rejection> {
    let result =
        match auth_service.authorize_player(auth_header.as_deref(), &lobby_code, &player_name) {
            Ok(_) => game_manager.player_words(&lobby_code, &player_name).await,
            Err(e) => Err(e.into()),
        };
    Ok(reply(result, StatusCode::OK))
}

async fn handle_broadcast(
    request: BroadcastRequest,
    event_bus: Arc<EventBus>,
) -> Result<impl warp::Reply, warp::Rejection> {
    let delivered = event_bus.publish(alchemy_core::Broadcast::message(request.message));
    tracing::info!(delivered, "Broadcast sent");
    Ok(reply(Ok::<_, ApiError>(ok()), StatusCode::OK))
}

async fn handle_leaderboard_request(
    query: LeaderboardQuery,
    account_service: Arc<AccountService>,
) -> Result<impl warp::Reply, warp::Rejection> {
    Ok(reply(
        account_service.leaderboard(query.limit).await,
        StatusCode::OK,
    ))
}

#[cfg(test)]
mod integration_tests;
