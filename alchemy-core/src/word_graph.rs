use rand::seq::IndexedRandom;

/// Seed words every player starts with.
pub const PRIMITIVE_WORDS: [&str; 4] = ["fire", "water", "earth", "wind"];

/// Returned when the generator cannot invent a word; never persisted.
pub const SENTINEL_WORD: &str = "star";

/// Upper bound on the Wombo Combo target pool.
pub const TARGET_POOL_SIZE: usize = 25;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WordMetrics {
    pub depth: i32,
    pub reachability: f64,
}

impl WordMetrics {
    pub const PRIMITIVE: WordMetrics = WordMetrics {
        depth: 0,
        reachability: 1.0,
    };

    /// Metrics of a word first seen at `depth`.
    pub fn first_seen(depth: i32) -> Self {
        Self {
            depth,
            reachability: path_weight(depth),
        }
    }
}

pub fn is_primitive(word: &str) -> bool {
    PRIMITIVE_WORDS.contains(&word)
}

/// `1 / 2^depth`.
pub fn path_weight(depth: i32) -> f64 {
    0.5_f64.powi(depth.max(0))
}

/// Case-folds both inputs and orders them so (a, b) and (b, a) share a key.
pub fn canonical_pair(a: &str, b: &str) -> (String, String) {
    let a = a.trim().to_lowercase();
    let b = b.trim().to_lowercase();
    if a <= b { (a, b) } else { (b, a) }
}

/// Lowercases generator output and strips everything that is not a letter.
pub fn format_generated_word(raw: &str) -> Option<String> {
    let word: String = raw
        .chars()
        .filter(|c| c.is_ascii_alphabetic())
        .map(|c| c.to_ascii_lowercase())
        .collect();
    if word.is_empty() { None } else { Some(word) }
}

pub fn derivation_depth(a: WordMetrics, b: WordMetrics) -> i32 {
    a.depth.max(b.depth) + 1
}

/// Folds a newly learned derivation at `depth` into the word's metrics.
///
/// A shorter path replaces the depth and dominates the blend (0.75 new / 0.25
/// old); otherwise the old reachability dominates (0.25 new / 0.75 old).
pub fn learn(prior: Option<WordMetrics>, path_depth: i32) -> WordMetrics {
    let Some(prior) = prior else {
        return WordMetrics::first_seen(path_depth);
    };

    let (depth, new_weight, old_weight) = if path_depth < prior.depth {
        (path_depth, 0.75, 0.25)
    } else {
        (prior.depth, 0.25, 0.75)
    };
    let reachability = new_weight * path_weight(path_depth) + old_weight * prior.reachability;

    WordMetrics {
        depth,
        reachability: reachability.clamp(0.0, 1.0),
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TargetFilter {
    pub min_reachability: f64,
    pub max_reachability: f64,
    pub max_depth: i32,
}

impl TargetFilter {
    pub const FUSION_FRENZY: TargetFilter = TargetFilter {
        min_reachability: 0.0375,
        max_reachability: 0.2,
        max_depth: 10,
    };

    pub const DAILY_CHALLENGE: TargetFilter = TargetFilter {
        min_reachability: 0.0375,
        max_reachability: 0.2,
        max_depth: 8,
    };

    pub fn accepts(&self, metrics: WordMetrics) -> bool {
        metrics.reachability >= self.min_reachability
            && metrics.reachability <= self.max_reachability
            && metrics.depth <= self.max_depth
    }
}

pub fn pick_random(candidates: &[String]) -> Option<String> {
    candidates.choose(&mut rand::rng()).cloned()
}

/// Random subset of at most `size` candidates, in random order.
pub fn sample_pool(candidates: &[String], size: usize) -> Vec<String> {
    candidates
        .choose_multiple(&mut rand::rng(), size)
        .cloned()
        .collect()
}
