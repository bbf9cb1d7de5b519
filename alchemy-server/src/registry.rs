use std::collections::HashSet;
use std::sync::Arc;

use alchemy_core::Game;
use dashmap::DashMap;
use tokio::sync::Mutex;

use crate::events::ChannelId;
use crate::timer::GameTimer;

pub type SharedGame = Arc<Mutex<ActiveGame>>;

/// A running game plus the countdown driving it, if any.
pub struct ActiveGame {
    pub game: Game,
    timer: Option<GameTimer>,
}

impl ActiveGame {
    pub fn new(game: Game) -> Self {
        Self { game, timer: None }
    }

    pub fn set_timer(&mut self, timer: GameTimer) {
        self.stop_timer();
        self.timer = Some(timer);
    }

    /// Cancels the countdown. Calling it again does nothing.
    pub fn stop_timer(&mut self) {
        if let Some(timer) = self.timer.take() {
            timer.stop();
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PlayerKey {
    pub lobby_code: String,
    pub player_name: String,
}

impl PlayerKey {
    pub fn new(lobby_code: &str, player_name: &str) -> Self {
        Self {
            lobby_code: lobby_code.to_string(),
            player_name: player_name.to_string(),
        }
    }
}

/// Process-wide session state: lobby channel groups, player channels and live games.
#[derive(Default)]
pub struct SessionRegistry {
    lobby_clients: DashMap<String, HashSet<ChannelId>>,
    player_clients: DashMap<PlayerKey, ChannelId>,
    games: DashMap<String, SharedGame>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Routes lobby and personal events for `key` to `channel`.
    pub fn bind_player(&self, key: PlayerKey, channel: ChannelId) {
        let previous = self.player_clients.insert(key.clone(), channel);

        let mut group = self.lobby_clients.entry(key.lobby_code).or_default();
        if let Some(previous) = previous {
            group.remove(&previous);
        }
        group.insert(channel);
    }

    /// Forgets `channel` after its subscriber went away.
    pub fn release_channel(&self, key: &PlayerKey, channel: ChannelId) {
        self.player_clients
            .remove_if(key, |_, bound| *bound == channel);
        self.remove_from_group(&key.lobby_code, channel);
    }

    /// Unbinds a player who left the lobby.
    pub fn remove_player(&self, lobby_code: &str, player_name: &str) {
        if let Some((_, channel)) = self
            .player_clients
            .remove(&PlayerKey::new(lobby_code, player_name))
        {
            self.remove_from_group(lobby_code, channel);
        }
    }

    pub fn drop_lobby(&self, lobby_code: &str) {
        self.lobby_clients.remove(lobby_code);
        self.player_clients
            .retain(|key, _| key.lobby_code != lobby_code);
    }

    fn remove_from_group(&self, lobby_code: &str, channel: ChannelId) {
        if let Some(mut group) = self.lobby_clients.get_mut(lobby_code) {
            group.remove(&channel);
        }
        self.lobby_clients
            .remove_if(lobby_code, |_, group| group.is_empty());
    }

    pub fn lobby_channels(&self, lobby_code: &str) -> Vec<ChannelId> {
        self.lobby_clients
            .get(lobby_code)
            .map(|group| group.iter().copied().collect())
            .unwrap_or_default()
    }

    pub fn player_channel(&self, lobby_code: &str, player_name: &str) -> Option<ChannelId> {
        self.player_clients
            .get(&PlayerKey::new(lobby_code, player_name))
            .map(|channel| *channel)
    }

    /// Installs a game, handing back the one it replaced.
    pub fn insert_game(&self, lobby_code: &str, game: ActiveGame) -> (SharedGame, Option<SharedGame>) {
        let shared = Arc::new(Mutex::new(game));
        let previous = self.games.insert(lobby_code.to_string(), shared.clone());
        (shared, previous)
    }

    pub fn game(&self, lobby_code: &str) -> Option<SharedGame> {
        self.games.get(lobby_code).map(|game| game.clone())
    }

    pub fn remove_game(&self, lobby_code: &str) -> Option<SharedGame> {
        self.games.remove(lobby_code).map(|(_, game)| game)
    }

    pub fn game_count(&self) -> usize {
        self.games.len()
    }
}
