use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use ts_rs::TS;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, TS)]
#[ts(export)]
pub enum GameMode {
    #[default]
    #[serde(rename = "Vanilla")]
    Vanilla, // No target, ends on timer or owner
    #[serde(rename = "Fusion Frenzy")]
    FusionFrenzy, // First to the shared target wins
    #[serde(rename = "Wombo Combo")]
    WomboCombo, // Rotating per-player targets, 10 points each
    #[serde(rename = "Daily Challenge")]
    DailyChallenge, // Solo run at today's word, fewest moves wins
}

impl GameMode {
    pub const ALL: [GameMode; 4] = [
        GameMode::Vanilla,
        GameMode::FusionFrenzy,
        GameMode::WomboCombo,
        GameMode::DailyChallenge,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            GameMode::Vanilla => "Vanilla",
            GameMode::FusionFrenzy => "Fusion Frenzy",
            GameMode::WomboCombo => "Wombo Combo",
            GameMode::DailyChallenge => "Daily Challenge",
        }
    }

    /// Whether the mode awards points on top of the word count.
    pub fn awards_points(&self) -> bool {
        matches!(self, GameMode::WomboCombo)
    }
}

impl fmt::Display for GameMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownGameMode(pub String);

impl fmt::Display for UnknownGameMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid game mode: {}", self.0)
    }
}

impl std::error::Error for UnknownGameMode {}

impl FromStr for GameMode {
    type Err = UnknownGameMode;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        GameMode::ALL
            .into_iter()
            .find(|mode| mode.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| UnknownGameMode(s.to_string()))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct StartGameRequest {
    pub game_mode: GameMode,
    #[serde(default)]
    pub with_timer: bool,
    #[serde(default)]
    pub duration: Option<u32>, // Whole minutes, only read when with_timer is set
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CombinationRequest {
    pub a: String,
    pub b: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct CombinationResponse {
    pub result: String,
    pub is_new: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct WordsResponse {
    pub words: Vec<String>,
    pub target_word: String,
}

/// One row of the end-of-game table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct PlayerStats {
    pub name: String,
    pub image_name: String,
    pub has_account: bool,
    pub points: i32,
    pub word_count: i32,
    pub new_word_count: i32,
    pub target_word: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct GameEndResponse {
    pub game_mode: GameMode,
    pub winner: Option<String>,
    pub target_word: String,
    pub players: Vec<PlayerStats>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_game_mode_wire_names() {
        assert_eq!(
            serde_json::to_string(&GameMode::FusionFrenzy).unwrap(),
            "\"Fusion Frenzy\""
        );
        let parsed: GameMode = serde_json::from_str("\"Daily Challenge\"").unwrap();
        assert_eq!(parsed, GameMode::DailyChallenge);
    }

    #[test]
    fn test_game_mode_from_str_is_case_insensitive() {
        assert_eq!("wombo combo".parse::<GameMode>(), Ok(GameMode::WomboCombo));
        assert_eq!(" Vanilla ".parse::<GameMode>(), Ok(GameMode::Vanilla));
        assert!("Battle Royale".parse::<GameMode>().is_err());
    }

    #[test]
    fn test_start_game_request_defaults() {
        let request: StartGameRequest =
            serde_json::from_str(r#"{"gameMode":"Wombo Combo"}"#).unwrap();
        assert!(!request.with_timer);
        assert_eq!(request.duration, None);
    }
}
