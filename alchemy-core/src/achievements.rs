use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use crate::ValidationError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AchievementKind {
    NewWordCount,
    WordCount,
    TargetWord,
}

impl AchievementKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            AchievementKind::NewWordCount => "NEW_WORD_COUNT",
            AchievementKind::WordCount => "WORD_COUNT",
            AchievementKind::TargetWord => "TARGET_WORD",
        }
    }
}

impl fmt::Display for AchievementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AchievementKind {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().replace('-', "_").as_str() {
            "NEW_WORD_COUNT" => Ok(AchievementKind::NewWordCount),
            "WORD_COUNT" => Ok(AchievementKind::WordCount),
            "TARGET_WORD" => Ok(AchievementKind::TargetWord),
            _ => Err(ValidationError::UnknownAchievementKind(s.to_string())),
        }
    }
}

/// Lookup tables from a milestone (count or word) to the achievement title.
#[derive(Debug, Clone, Default)]
pub struct AchievementBook {
    new_word_count: HashMap<i32, String>,
    word_count: HashMap<i32, String>,
    target_word: HashMap<String, String>,
}

impl AchievementBook {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(
        &mut self,
        kind: AchievementKind,
        value: &str,
        title: impl Into<String>,
    ) -> Result<(), ValidationError> {
        let title = title.into();
        match kind {
            AchievementKind::NewWordCount => {
                self.new_word_count.insert(parse_count(value)?, title);
            }
            AchievementKind::WordCount => {
                self.word_count.insert(parse_count(value)?, title);
            }
            AchievementKind::TargetWord => {
                self.target_word.insert(value.trim().to_lowercase(), title);
            }
        }
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.new_word_count.len() + self.word_count.len() + self.target_word.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Titles earned by a move, in new-word / word / target order.
    pub fn earned(&self, new_word_count: i32, word_count: i32, result: &str) -> Vec<String> {
        [
            self.new_word_count.get(&new_word_count),
            self.word_count.get(&word_count),
            self.target_word.get(result),
        ]
        .into_iter()
        .flatten()
        .cloned()
        .collect()
    }
}

fn parse_count(value: &str) -> Result<i32, ValidationError> {
    value
        .trim()
        .parse()
        .map_err(|_| ValidationError::InvalidAchievementValue(value.to_string()))
}
