use std::collections::HashMap;

use alchemy_core::{
    Game, GameSettings, PRIMITIVE_WORDS, WordMetrics, canonical_pair, derivation_depth, learn,
};
use alchemy_types::{GameMode, PlayerStats};

/// In-memory stand-in for the word tables, driven through the same learning math.
#[derive(Default)]
pub struct TestGraph {
    pub words: HashMap<String, WordMetrics>,
    pub combinations: HashMap<(String, String), String>,
}

impl TestGraph {
    pub fn with_primitives() -> Self {
        let mut graph = Self::default();
        for word in PRIMITIVE_WORDS {
            graph.words.insert(word.to_string(), WordMetrics::PRIMITIVE);
        }
        graph
    }

    /// Records `a + b = result` the way a newly invented combination is learned.
    pub fn add(&mut self, a: &str, b: &str, result: &str) {
        let key = canonical_pair(a, b);
        if self.combinations.contains_key(&key) {
            return;
        }
        let depth = derivation_depth(self.metrics(&key.0), self.metrics(&key.1));
        let learned = learn(self.words.get(result).copied(), depth);
        self.words.insert(result.to_string(), learned);
        self.combinations.insert(key, result.to_string());
    }

    pub fn resolve(&self, a: &str, b: &str) -> Option<&String> {
        self.combinations.get(&canonical_pair(a, b))
    }

    pub fn metrics(&self, word: &str) -> WordMetrics {
        self.words
            .get(word)
            .copied()
            .unwrap_or(WordMetrics::first_seen(0))
    }
}

pub fn create_game(mode: GameMode, target: &str, pool: &[&str]) -> Game {
    let settings = GameSettings::validate(mode, false, None, 1).unwrap();
    Game::new(
        "AbC123",
        settings,
        target.to_string(),
        pool.iter().map(|w| w.to_string()).collect(),
    )
}

pub fn create_test_stats(name: &str, points: i32, word_count: i32) -> PlayerStats {
    PlayerStats {
        name: name.to_string(),
        image_name: "flask.png".to_string(),
        has_account: true,
        points,
        word_count,
        new_word_count: 0,
        target_word: String::new(),
    }
}
