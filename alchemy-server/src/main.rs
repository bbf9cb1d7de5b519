use std::sync::Arc;
use tokio::signal;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use alchemy_persistence::{AchievementRepository, WordRepository, connect_and_migrate, seed};
use alchemy_server::{
    account_service::AccountService, auth::AuthService, config::Config, create_routes,
    events::EventBus, game_manager::GameManager, lobby_manager::LobbyManager,
    registry::SessionRegistry, word_generator::OpenAiWordGenerator,
};

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!("Invalid configuration: {}", e);
            std::process::exit(1);
        }
    };

    let db = match connect_and_migrate(&config.database_url).await {
        Ok(db) => db,
        Err(e) => {
            error!("Failed to connect to database and run migrations: {}", e);
            std::process::exit(1);
        }
    };

    // `--seed` loads icons, combinations and achievements, then exits.
    if std::env::args().any(|arg| arg == "--seed") {
        match seed::seed_all(&db, &config.icons_dir, &config.seed_dir).await {
            Ok(summary) => info!(?summary, "Seed complete"),
            Err(e) => {
                error!("Seeding failed: {:#}", e);
                std::process::exit(1);
            }
        }
        return;
    }

    info!("Starting alchemy server...");

    if let Err(e) = WordRepository::new(db.clone()).ensure_primitives().await {
        error!("Failed to store primitive words: {:#}", e);
        std::process::exit(1);
    }
    let achievement_book = match AchievementRepository::new(db.clone()).load_book().await {
        Ok(book) => {
            info!(achievements = book.len(), "Achievements loaded");
            book
        }
        Err(e) => {
            error!("Failed to load achievements: {:#}", e);
            std::process::exit(1);
        }
    };

    if config.openai_api_key.is_empty() {
        tracing::warn!("OPENAI_API_KEY is not set; unknown combinations will yield the fallback word");
    }
    let generator = match OpenAiWordGenerator::new(
        config.word_generator_url.clone(),
        config.word_generator_model.clone(),
        config.openai_api_key.clone(),
    ) {
        Ok(generator) => Arc::new(generator),
        Err(e) => {
            error!("Failed to build word generator client: {}", e);
            std::process::exit(1);
        }
    };

    let registry = Arc::new(SessionRegistry::new());
    let event_bus = Arc::new(EventBus::new(registry));
    let auth_service = Arc::new(AuthService::new(&config.jwt_secret, config.token_ttl_hours));
    let game_manager = GameManager::new(db.clone(), generator, achievement_book, event_bus.clone());
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
        auth_service,
        account_service,
        lobby_manager,
        game_manager,
        event_bus,
        config.client_origin.clone(),
    );

    info!(
        "Server starting on {}:{} (client origin {})",
        config.host, config.port, config.client_origin
    );

    let (addr, server) =
        warp::serve(routes).bind_with_graceful_shutdown((config.host, config.port), shutdown_signal());

    info!("Server started successfully on {}. Press Ctrl+C to stop.", addr);
    server.await;
    info!("Server shutdown complete.");
}

// Waits for SIGINT (Ctrl+C) or SIGTERM.
async fn shutdown_signal() {
    #[cfg(unix)]
    {
        let (mut sigint, mut sigterm) = match (
            signal::unix::signal(signal::unix::SignalKind::interrupt()),
            signal::unix::signal(signal::unix::SignalKind::terminate()),
        ) {
            (Ok(sigint), Ok(sigterm)) => (sigint, sigterm),
            _ => {
                error!("Failed to install signal handlers");
                std::future::pending::<()>().await;
                return;
            }
        };

        tokio::select! {
            _ = sigint.recv() => {
                info!("Received SIGINT, shutting down gracefully...");
            }
            _ = sigterm.recv() => {
                info!("Received SIGTERM, shutting down gracefully...");
            }
        }
    }

    #[cfg(not(unix))]
    {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to listen for ctrl+c: {}", e);
            std::future::pending::<()>().await;
        }
        info!("Received Ctrl+C, shutting down gracefully...");
    }
}
