use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::GameMode;

/// Well-known string events pushed over SSE.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EventTag {
    LobbyCreated,
    LobbyDeleted,
    PlayerJoined,
    PlayerLeft,
    GameStarted,
    GameDeleted,
    GameOver,
    TimerStopped,
    AccountUpdate,
    WomboCombo,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(untagged)]
pub enum EventPayload {
    Tag(EventTag),
    Countdown {
        #[serde(rename = "secondsLeft")]
        seconds_left: i32,
    },
    ModeChange {
        #[serde(rename = "gameMode")]
        game_mode: GameMode,
        duration: Option<u32>,
    },
    Achievement {
        #[serde(rename = "achievementTitle")]
        achievement_title: String,
    },
    Message(String),
}

impl From<EventTag> for EventPayload {
    fn from(tag: EventTag) -> Self {
        EventPayload::Tag(tag)
    }
}

/// JSON body of an SSE `msg` frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct EventEnvelope {
    pub data: EventPayload,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct BroadcastRequest {
    pub message: String,
}
