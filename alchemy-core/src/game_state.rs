use alchemy_types::GameMode;
use tracing::warn;

use crate::{pick_random, validate_duration, ValidationError};

/// How a game was asked to start, after validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GameSettings {
    pub mode: GameMode,
    pub with_timer: bool,
    pub duration_minutes: Option<u32>,
}

impl GameSettings {
    /// Checks the start preconditions for a lobby holding `player_count` players.
    pub fn validate(
        mode: GameMode,
        with_timer: bool,
        duration: Option<u32>,
        player_count: usize,
    ) -> Result<Self, ValidationError> {
        if mode == GameMode::DailyChallenge {
            if player_count != 1 {
                return Err(ValidationError::DailyChallengeNotSolo);
            }
            if with_timer {
                return Err(ValidationError::DailyChallengeTimed);
            }
        }

        let duration_minutes = if with_timer {
            let minutes = duration.ok_or(ValidationError::MissingDuration)?;
            validate_duration(minutes)?;
            Some(minutes)
        } else {
            None
        };

        Ok(Self {
            mode,
            with_timer,
            duration_minutes,
        })
    }
}

/// What a single move means for the mover.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MoveOutcome {
    Continue,
    TargetWon,
    ComboHit { next_target: String },
    DailySolved,
}

/// Live state of the game running in one lobby.
///
/// Players are not held here; per-player rows live in storage and are looked
/// up by `lobby_code`.
#[derive(Debug, Clone)]
pub struct Game {
    pub lobby_code: String,
    pub mode: GameMode,
    pub target_word: String,
    pub target_words: Vec<String>,
    pub winner: Option<String>,
    pub with_timer: bool,
    pub duration_minutes: Option<u32>,
    pub manual_end: bool,
    over: bool,
}

impl Game {
    /// `target_word` is the shared target (Fusion Frenzy, Daily Challenge);
    /// `target_words` is the Wombo Combo pool.
    pub fn new(
        lobby_code: impl Into<String>,
        settings: GameSettings,
        target_word: String,
        target_words: Vec<String>,
    ) -> Self {
        Self {
            lobby_code: lobby_code.into(),
            mode: settings.mode,
            target_word,
            target_words,
            winner: None,
            with_timer: settings.with_timer,
            duration_minutes: settings.duration_minutes,
            manual_end: false,
            over: false,
        }
    }

    pub fn initial_target_for_player(&self) -> String {
        match self.mode {
            GameMode::Vanilla => String::new(),
            GameMode::FusionFrenzy | GameMode::DailyChallenge => self.target_word.clone(),
            GameMode::WomboCombo => pick_random(&self.target_words).unwrap_or_default(),
        }
    }

    /// A pool target other than `just_hit`. A pool of one keeps its only word.
    pub fn next_pool_target(&self, just_hit: &str) -> String {
        let others: Vec<String> = self
            .target_words
            .iter()
            .filter(|word| word.as_str() != just_hit)
            .cloned()
            .collect();
        match pick_random(&others) {
            Some(next) => next,
            None => {
                warn!(lobby_code = %self.lobby_code, target = just_hit, "Target pool has no alternative");
                just_hit.to_string()
            }
        }
    }

    pub fn is_over(&self) -> bool {
        self.over
    }

    pub fn ensure_running(&self) -> Result<(), ValidationError> {
        if self.over {
            Err(ValidationError::GameOver)
        } else {
            Ok(())
        }
    }

    pub fn finish(&mut self, winner: Option<String>) {
        self.winner = winner;
        self.over = true;
    }

    pub fn end_manually(&mut self, winner: Option<String>) {
        self.manual_end = true;
        self.finish(winner);
    }

    pub fn evaluate_move(&self, player_target: &str, result: &str) -> MoveOutcome {
        if player_target.is_empty() || player_target != result {
            return MoveOutcome::Continue;
        }
        match self.mode {
            GameMode::Vanilla => MoveOutcome::Continue,
            GameMode::FusionFrenzy => MoveOutcome::TargetWon,
            GameMode::WomboCombo => MoveOutcome::ComboHit {
                next_target: self.next_pool_target(result),
            },
            GameMode::DailyChallenge => MoveOutcome::DailySolved,
        }
    }
}
