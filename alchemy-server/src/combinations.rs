use std::sync::Arc;

use alchemy_core::{SENTINEL_WORD, canonical_pair, format_generated_word};
use alchemy_persistence::WordRepository;
use anyhow::Result;
use tracing::{info, warn};

use crate::word_generator::WordGenerator;

/// Looks combinations up in the word graph and invents the missing ones.
pub struct CombinationResolver {
    words: WordRepository,
    generator: Arc<dyn WordGenerator>,
}

impl CombinationResolver {
    pub fn new(words: WordRepository, generator: Arc<dyn WordGenerator>) -> Self {
        Self { words, generator }
    }

    /// Returns the result word and whether this call created the combination.
    ///
    /// A generator failure yields the sentinel word and stores nothing.
    pub async fn resolve(&self, a: &str, b: &str) -> Result<(String, bool)> {
        let (a, b) = canonical_pair(a, b);
        if let Some(result) = self.words.find_combination(&a, &b).await? {
            return Ok((result, false));
        }

        let generated = match self.generator.combine(&a, &b).await {
            Ok(raw) => format_generated_word(&raw),
            Err(e) => {
                warn!(a = %a, b = %b, "Word generator failed: {}", e);
                None
            }
        };
        let Some(result) = generated else {
            return Ok((SENTINEL_WORD.to_string(), false));
        };

        if self.words.add_combination(&a, &b, &result).await? {
            info!(a = %a, b = %b, result = %result, "New combination");
            return Ok((result, true));
        }

        // Someone else stored this pair first; theirs stands.
        let existing = self.words.find_combination(&a, &b).await?;
        Ok((existing.unwrap_or(result), false))
    }
}
