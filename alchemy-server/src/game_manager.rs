use std::sync::{Arc, Weak};

use alchemy_core::{
    AchievementBook, Broadcast, COMBO_POINTS, Countdown, Game, GameSettings, MoveOutcome,
    ScoringEngine, TARGET_POOL_SIZE, TargetFilter, ValidationError, normalize_word, sample_pool,
};
use alchemy_persistence::entities::player;
use alchemy_persistence::{
    AccountRepository, AchievementRepository, DailyChallengeRepository, GameResult,
    LobbyRepository, PlayerWordRepository, WordRepository,
};
use alchemy_types::{
    CombinationRequest, CombinationResponse, EventTag, GameEndResponse, GameMode, PlayerStats,
    StartGameRequest, WordsResponse,
};
use anyhow::Result;
use async_trait::async_trait;
use sea_orm::DatabaseConnection;
use tracing::{error, info, warn};

use crate::achievements::AchievementChecker;
use crate::combinations::CombinationResolver;
use crate::errors::ApiError;
use crate::events::EventBus;
use crate::registry::{ActiveGame, SessionRegistry};
use crate::timer::{GameTimer, TimerListener};
use crate::word_generator::WordGenerator;

/// The calendar day a daily challenge belongs to.
pub fn today() -> String {
    chrono::Utc::now().format("%Y-%m-%d").to_string()
}

fn to_stats(model: player::Model) -> PlayerStats {
    PlayerStats {
        name: model.name,
        image_name: model.image_name,
        has_account: model.has_account,
        points: model.points,
        word_count: model.word_count,
        new_word_count: model.new_word_count,
        target_word: model.target_word,
    }
}

/// Runs the games: start, moves, endings and the stats behind them.
pub struct GameManager {
    lobbies: LobbyRepository,
    player_words: PlayerWordRepository,
    accounts: AccountRepository,
    words: WordRepository,
    daily: DailyChallengeRepository,
    resolver: CombinationResolver,
    achievements: AchievementChecker,
    bus: Arc<EventBus>,
    me: Weak<GameManager>,
}

impl GameManager {
    pub fn new(
        db: DatabaseConnection,
        generator: Arc<dyn WordGenerator>,
        achievement_book: AchievementBook,
        bus: Arc<EventBus>,
    ) -> Arc<Self> {
        Arc::new_cyclic(|me| Self {
            lobbies: LobbyRepository::new(db.clone()),
            player_words: PlayerWordRepository::new(db.clone()),
            accounts: AccountRepository::new(db.clone()),
            words: WordRepository::new(db.clone()),
            daily: DailyChallengeRepository::new(db.clone()),
            resolver: CombinationResolver::new(WordRepository::new(db.clone()), generator),
            achievements: AchievementChecker::new(
                achievement_book,
                AchievementRepository::new(db),
                bus.clone(),
            ),
            bus,
            me: me.clone(),
        })
    }

    fn registry(&self) -> &Arc<SessionRegistry> {
        self.bus.registry()
    }

    async fn build_game(&self, lobby_code: &str, settings: GameSettings) -> Result<Game, ApiError> {
        let (target_word, target_words) = match settings.mode {
            GameMode::Vanilla => (String::new(), Vec::new()),
            GameMode::FusionFrenzy => {
                let target = self
                    .words
                    .target_word(TargetFilter::FUSION_FRENZY)
                    .await?
                    .ok_or(ValidationError::NoTargetWords)?;
                (target, Vec::new())
            }
            GameMode::WomboCombo => {
                let candidates = self.words.target_words(TargetFilter::FUSION_FRENZY).await?;
                let pool = sample_pool(&candidates, TARGET_POOL_SIZE);
                if pool.is_empty() {
                    return Err(ValidationError::NoTargetWords.into());
                }
                (String::new(), pool)
            }
            GameMode::DailyChallenge => {
                let target = self
                    .words
                    .create_or_get_daily_word(&today(), TargetFilter::DAILY_CHALLENGE)
                    .await?
                    .ok_or(ValidationError::NoTargetWords)?;
                (target, Vec::new())
            }
        };
        Ok(Game::new(lobby_code, settings, target_word, target_words))
    }

    /// Starts a game in the lobby, replacing any game already running there.
    pub async fn start_game(&self, lobby_code: &str, request: StartGameRequest) -> Result<(), ApiError> {
        if !self.lobbies.code_exists(lobby_code).await? {
            return Err(ApiError::not_found("lobby"));
        }
        let players = self.lobbies.players(lobby_code).await?;
        let settings = GameSettings::validate(
            request.game_mode,
            request.with_timer,
            request.duration,
            players.len(),
        )?;
        let countdown = settings.duration_minutes.map(Countdown::new).transpose()?;

        self.lobbies.set_game_mode(lobby_code, settings.mode).await?;
        let game = self.build_game(lobby_code, settings).await?;

        if let Some(previous) = self.registry().remove_game(lobby_code) {
            let mut previous = previous.lock().await;
            previous.stop_timer();
            previous.game.finish(None);
        }
        self.player_words.delete_for_lobby(lobby_code).await?;
        self.lobbies.reset_players(lobby_code).await?;
        for player in &players {
            let target = game.initial_target_for_player();
            self.lobbies
                .set_target(lobby_code, &player.name, &target)
                .await?;
            self.player_words
                .seed_primitives(lobby_code, &player.name)
                .await?;
        }

        info!(
            lobby_code,
            game_mode = %settings.mode,
            target = %game.target_word,
            pool = game.target_words.len(),
            "Game started"
        );
        let (shared, _) = self.registry().insert_game(lobby_code, ActiveGame::new(game));
        self.bus
            .publish(Broadcast::lobby(lobby_code, EventTag::GameStarted));

        if let Some(countdown) = countdown {
            let listener: Arc<dyn TimerListener> = self
                .me
                .upgrade()
                .ok_or_else(|| ApiError::Internal(anyhow::anyhow!("game manager shut down")))?;
            let timer = GameTimer::start(lobby_code, countdown, self.bus.clone(), listener);
            shared.lock().await.set_timer(timer);
        }
        Ok(())
    }

    /// Combines two of the player's words.
    ///
    /// The word log and counters are updated on every move, winning moves
    /// included; the outcome is applied afterwards under the game lock.
    pub async fn process_move(
        &self,
        lobby_code: &str,
        player_name: &str,
        request: CombinationRequest,
    ) -> Result<CombinationResponse, ApiError> {
        let shared = self
            .registry()
            .game(lobby_code)
            .ok_or_else(|| ApiError::not_found("game"))?;
        shared.lock().await.game.ensure_running()?;

        let a = normalize_word(&request.a)?;
        let b = normalize_word(&request.b)?;
        if self.lobbies.find_player(lobby_code, player_name).await?.is_none() {
            return Err(ApiError::not_found("player"));
        }
        for word in [&a, &b] {
            if !self.player_words.contains(lobby_code, player_name, word).await? {
                return Err(ValidationError::WordNotOwned(word.clone()).into());
            }
        }

        let (result, is_new) = self.resolver.resolve(&a, &b).await?;
        self.player_words.add(lobby_code, player_name, &result).await?;
        let player = self
            .lobbies
            .record_move(lobby_code, player_name, is_new)
            .await?
            .ok_or_else(|| ApiError::not_found("player"))?;

        let mut active = shared.lock().await;
        if active.game.is_over() {
            // Someone else finished the game while this move was resolving.
            return Ok(CombinationResponse { result, is_new });
        }

        match active.game.evaluate_move(&player.target_word, &result) {
            MoveOutcome::Continue => {}
            MoveOutcome::TargetWon => {
                active.stop_timer();
                active.game.finish(Some(player_name.to_string()));
                info!(lobby_code, winner = player_name, target = %result, "Target reached");
                self.settle_accounts(&active.game).await?;
                self.bus.publish(Broadcast::lobby(lobby_code, EventTag::GameOver));
                self.bus
                    .publish(Broadcast::lobby(lobby_code, EventTag::AccountUpdate));
            }
            MoveOutcome::ComboHit { next_target } => {
                self.lobbies
                    .set_target(lobby_code, player_name, &next_target)
                    .await?;
                self.lobbies
                    .add_points(lobby_code, player_name, COMBO_POINTS)
                    .await?;
                info!(lobby_code, player = player_name, hit = %result, next = %next_target, "Wombo combo");
                self.bus
                    .publish(Broadcast::lobby(lobby_code, EventTag::WomboCombo));
            }
            MoveOutcome::DailySolved => {
                active.stop_timer();
                active.game.finish(Some(player_name.to_string()));
                if player.has_account {
                    let best = self
                        .daily
                        .record(&today(), player_name, player.word_count)
                        .await?;
                    info!(player = player_name, word_count = player.word_count, best, "Daily challenge solved");
                }
                self.settle_accounts(&active.game).await?;
                self.bus.publish(Broadcast::lobby(lobby_code, EventTag::GameOver));
            }
        }
        drop(active);

        self.achievements
            .check(
                lobby_code,
                player_name,
                player.has_account,
                player.new_word_count,
                player.word_count,
                &result,
            )
            .await?;

        Ok(CombinationResponse { result, is_new })
    }

    /// Adds the finished game to every account-backed player's record.
    async fn settle_accounts(&self, game: &Game) -> Result<()> {
        let players = self.lobbies.players(&game.lobby_code).await?;
        for player in players.iter().filter(|player| player.has_account) {
            let result = match (&game.winner, game.mode) {
                (_, GameMode::DailyChallenge) | (None, _) => GameResult::Unranked,
                (Some(winner), _) if *winner == player.name => GameResult::Won,
                _ => GameResult::Lost,
            };
            self.accounts
                .record_game(&player.name, result, player.word_count, player.new_word_count)
                .await?;
        }
        Ok(())
    }

    /// Finishes the game with the best score as winner.
    async fn finish_by_score(&self, active: &mut ActiveGame, manual: bool) -> Result<Option<String>> {
        active.stop_timer();
        let stats: Vec<PlayerStats> = self
            .lobbies
            .players(&active.game.lobby_code)
            .await?
            .into_iter()
            .map(to_stats)
            .collect();
        let winner = ScoringEngine::select_winner(active.game.mode, &stats).map(|p| p.name.clone());

        if manual {
            active.game.end_manually(winner.clone());
        } else {
            active.game.finish(winner.clone());
        }
        self.settle_accounts(&active.game).await?;
        Ok(winner)
    }

    /// Owner ends the game early.
    pub async fn end_game(&self, lobby_code: &str) -> Result<(), ApiError> {
        let shared = self
            .registry()
            .game(lobby_code)
            .ok_or_else(|| ApiError::not_found("game"))?;
        let mut active = shared.lock().await;
        active.game.ensure_running()?;

        let winner = self.finish_by_score(&mut active, true).await?;
        info!(lobby_code, winner = ?winner, "Game ended by owner");
        self.bus
            .publish(Broadcast::lobby(lobby_code, EventTag::AccountUpdate));
        self.bus.publish(Broadcast::lobby(lobby_code, EventTag::GameOver));
        Ok(())
    }

    /// Timer ran out. Failures are logged, never raised.
    pub async fn handle_timer_expired(&self, lobby_code: &str) {
        let Some(shared) = self.registry().game(lobby_code) else {
            warn!(lobby_code, "Timer expired for a game that is gone");
            return;
        };
        let mut active = shared.lock().await;
        if active.game.is_over() {
            return;
        }

        match self.finish_by_score(&mut active, false).await {
            Ok(winner) => info!(lobby_code, winner = ?winner, "Game over on time"),
            Err(e) => error!(lobby_code, "Failed to settle timed game: {:#}", e),
        }
        self.bus.publish(Broadcast::lobby(lobby_code, EventTag::GameOver));
    }

    pub async fn delete_game(&self, lobby_code: &str) -> Result<(), ApiError> {
        let shared = self
            .registry()
            .remove_game(lobby_code)
            .ok_or_else(|| ApiError::not_found("game"))?;
        {
            let mut active = shared.lock().await;
            active.stop_timer();
            if !active.game.is_over() {
                active.game.finish(None);
            }
        }

        self.player_words.delete_for_lobby(lobby_code).await?;
        info!(lobby_code, "Game deleted");
        self.bus
            .publish(Broadcast::lobby(lobby_code, EventTag::GameDeleted));
        Ok(())
    }

    pub async fn game_stats(&self, lobby_code: &str) -> Result<GameEndResponse, ApiError> {
        let shared = self
            .registry()
            .game(lobby_code)
            .ok_or_else(|| ApiError::not_found("game"))?;
        let active = shared.lock().await;

        let mut players: Vec<PlayerStats> = self
            .lobbies
            .players(lobby_code)
            .await?
            .into_iter()
            .map(to_stats)
            .collect();
        ScoringEngine::order_stats(&mut players, active.game.winner.as_deref());

        Ok(GameEndResponse {
            game_mode: active.game.mode,
            winner: active.game.winner.clone(),
            target_word: active.game.target_word.clone(),
            players,
        })
    }

    pub async fn player_words(&self, lobby_code: &str, player_name: &str) -> Result<WordsResponse, ApiError> {
        let player = self
            .lobbies
            .find_player(lobby_code, player_name)
            .await?
            .ok_or_else(|| ApiError::not_found("player"))?;
        Ok(WordsResponse {
            words: self.player_words.words(lobby_code, player_name).await?,
            target_word: player.target_word,
        })
    }
}

#[async_trait]
impl TimerListener for GameManager {
    async fn on_expired(&self, lobby_code: &str) {
        self.handle_timer_expired(lobby_code).await;
    }
}
