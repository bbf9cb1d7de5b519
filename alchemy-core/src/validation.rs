use thiserror::Error;

pub const MIN_PASSWORD_LENGTH: usize = 8;
pub const MAX_PASSWORD_LENGTH: usize = 64;
pub const MAX_NAME_LENGTH: usize = 32;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("password must be between {min} and {max} characters")]
    PasswordLength { min: usize, max: usize },
    #[error("password must contain at least one letter")]
    PasswordNeedsLetter,
    #[error("{field} must be between 1 and {max} characters")]
    NameLength { field: &'static str, max: usize },
    #[error("{field} may only contain letters, digits, '_' and '-'")]
    NameCharacters { field: &'static str },
    #[error("timer duration must be at least 1 and less than 5 minutes, got {0}")]
    DurationOutOfRange(u32),
    #[error("a timed game needs a duration")]
    MissingDuration,
    #[error("daily challenge must be played alone")]
    DailyChallengeNotSolo,
    #[error("daily challenge cannot be timed")]
    DailyChallengeTimed,
    #[error("invalid word: {0:?}")]
    InvalidWord(String),
    #[error("{0:?} is not in your words")]
    WordNotOwned(String),
    #[error("game is over")]
    GameOver,
    #[error("no target words available")]
    NoTargetWords,
    #[error("unknown achievement type {0:?}")]
    UnknownAchievementKind(String),
    #[error("achievement value {0:?} must be an integer")]
    InvalidAchievementValue(String),
}

pub fn validate_password(password: &str) -> Result<(), ValidationError> {
    let length = password.chars().count();
    if !(MIN_PASSWORD_LENGTH..=MAX_PASSWORD_LENGTH).contains(&length) {
        return Err(ValidationError::PasswordLength {
            min: MIN_PASSWORD_LENGTH,
            max: MAX_PASSWORD_LENGTH,
        });
    }
    if !password.chars().any(|c| c.is_alphabetic()) {
        return Err(ValidationError::PasswordNeedsLetter);
    }
    Ok(())
}

/// Usernames and player names share the same shape.
pub fn validate_name(field: &'static str, name: &str) -> Result<(), ValidationError> {
    let length = name.chars().count();
    if length == 0 || length > MAX_NAME_LENGTH {
        return Err(ValidationError::NameLength {
            field,
            max: MAX_NAME_LENGTH,
        });
    }
    if !name
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
    {
        return Err(ValidationError::NameCharacters { field });
    }
    Ok(())
}

pub fn validate_lobby_name(name: &str) -> Result<(), ValidationError> {
    let length = name.trim().chars().count();
    if length == 0 || length > MAX_NAME_LENGTH {
        return Err(ValidationError::NameLength {
            field: "lobby name",
            max: MAX_NAME_LENGTH,
        });
    }
    Ok(())
}

/// Case-folds a player-supplied word; only letters are accepted.
pub fn normalize_word(word: &str) -> Result<String, ValidationError> {
    let word = word.trim().to_lowercase();
    if word.is_empty() || !word.chars().all(|c| c.is_ascii_alphabetic()) {
        return Err(ValidationError::InvalidWord(word));
    }
    Ok(word)
}
