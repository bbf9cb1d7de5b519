use alchemy_types::{EventPayload, EventTag, GameMode};

/// Who receives a published event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Audience {
    Everyone,
    Lobby(String),
    Player {
        lobby_code: String,
        player_name: String,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Broadcast {
    pub audience: Audience,
    pub payload: EventPayload,
}

impl Broadcast {
    pub fn everyone(payload: impl Into<EventPayload>) -> Self {
        Self {
            audience: Audience::Everyone,
            payload: payload.into(),
        }
    }

    pub fn lobby(lobby_code: &str, payload: impl Into<EventPayload>) -> Self {
        Self {
            audience: Audience::Lobby(lobby_code.to_string()),
            payload: payload.into(),
        }
    }

    pub fn player(lobby_code: &str, player_name: &str, payload: impl Into<EventPayload>) -> Self {
        Self {
            audience: Audience::Player {
                lobby_code: lobby_code.to_string(),
                player_name: player_name.to_string(),
            },
            payload: payload.into(),
        }
    }

    pub fn countdown(lobby_code: &str, seconds_left: i32) -> Self {
        Self::lobby(lobby_code, EventPayload::Countdown { seconds_left })
    }

    pub fn mode_change(lobby_code: &str, game_mode: GameMode, duration: Option<u32>) -> Self {
        Self::lobby(
            lobby_code,
            EventPayload::ModeChange {
                game_mode,
                duration,
            },
        )
    }

    pub fn achievement(lobby_code: &str, player_name: &str, title: &str) -> Self {
        Self::player(
            lobby_code,
            player_name,
            EventPayload::Achievement {
                achievement_title: title.to_string(),
            },
        )
    }

    pub fn message(text: impl Into<String>) -> Self {
        Self::everyone(EventPayload::Message(text.into()))
    }

    pub fn is_tag(&self, tag: EventTag) -> bool {
        self.payload == EventPayload::Tag(tag)
    }
}
