use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::GameMode;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct PlayerView {
    pub name: String,
    pub image_name: String,
    pub is_owner: bool,
    pub has_account: bool,
    pub points: i32,
    pub word_count: i32,
    pub new_word_count: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct LobbyView {
    pub lobby_code: String,
    pub name: String,
    pub image_name: String,
    pub game_mode: GameMode,
    pub player_count: i32,
    pub players: Vec<PlayerView>,
}

/// Row of the public lobby list; no player details.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct LobbiesView {
    pub lobby_code: String,
    pub name: String,
    pub image_name: String,
    pub game_mode: GameMode,
    pub player_count: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CreateLobbyRequest {
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CreateLobbyResponse {
    pub token: String,
    pub lobby: LobbyView,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct JoinLobbyRequest {
    pub player_name: String,
    pub lobby_code: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct JoinLobbyResponse {
    pub token: String,
    pub lobby: LobbyView,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct EditLobbyRequest {
    pub game_mode: GameMode,
    #[serde(default)]
    pub duration: Option<u32>,
}
