use alchemy_core::{
    PRIMITIVE_WORDS, TargetFilter, WordMetrics, canonical_pair, derivation_depth, is_primitive,
    learn, pick_random,
};
use anyhow::Result;
use sea_orm::sea_query::OnConflict;
use sea_orm::{
    ActiveValue, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, TransactionTrait,
};
use tracing::{debug, warn};

use crate::entities::{combination, daily_word, prelude::*, word};

/// Persistent word-derivation graph: words with their metrics and the
/// combinations that produce them.
#[derive(Clone)]
pub struct WordRepository {
    db: DatabaseConnection,
}

impl WordRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    fn model_to_metrics(model: &word::Model) -> WordMetrics {
        WordMetrics {
            depth: model.depth,
            reachability: model.reachability,
        }
    }

    /// Makes sure the four primitive words exist at depth 0.
    pub async fn ensure_primitives(&self) -> Result<()> {
        for primitive in PRIMITIVE_WORDS {
            let model = word::ActiveModel {
                word: ActiveValue::Set(primitive.to_string()),
                depth: ActiveValue::Set(WordMetrics::PRIMITIVE.depth),
                reachability: ActiveValue::Set(WordMetrics::PRIMITIVE.reachability),
            };
            Word::insert(model)
                .on_conflict(OnConflict::column(word::Column::Word).do_nothing().to_owned())
                .exec_without_returning(&self.db)
                .await?;
        }
        Ok(())
    }

    pub async fn metrics(&self, word: &str) -> Result<Option<WordMetrics>> {
        Self::metrics_with(&self.db, word).await
    }

    async fn metrics_with<C: ConnectionTrait>(conn: &C, word: &str) -> Result<Option<WordMetrics>> {
        let model = Word::find_by_id(word.to_string()).one(conn).await?;
        Ok(model.as_ref().map(Self::model_to_metrics))
    }

    pub async fn word_count(&self) -> Result<u64> {
        Ok(Word::find().count(&self.db).await?)
    }

    /// Result of combining `a` and `b`, in either order.
    pub async fn find_combination(&self, a: &str, b: &str) -> Result<Option<String>> {
        let (a, b) = canonical_pair(a, b);
        let model = Combination::find_by_id((a, b)).one(&self.db).await?;
        Ok(model.map(|combination| combination.result))
    }

    /// Stores `a + b = result` and folds the new path into the result's metrics.
    ///
    /// Returns false, leaving everything untouched, when the pair already had
    /// a result.
    pub async fn add_combination(&self, a: &str, b: &str, result: &str) -> Result<bool> {
        let (a, b) = canonical_pair(a, b);
        let result = result.trim().to_lowercase();
        let txn = self.db.begin().await?;

        let parent_a = Self::parent_metrics(&txn, &a).await?;
        let parent_b = Self::parent_metrics(&txn, &b).await?;
        let depth = derivation_depth(parent_a, parent_b);

        let model = combination::ActiveModel {
            a: ActiveValue::Set(a.clone()),
            b: ActiveValue::Set(b.clone()),
            result: ActiveValue::Set(result.clone()),
            depth: ActiveValue::Set(depth),
        };
        let rows = Combination::insert(model)
            .on_conflict(
                OnConflict::columns([combination::Column::A, combination::Column::B])
                    .do_nothing()
                    .to_owned(),
            )
            .exec_without_returning(&txn)
            .await?;

        if rows == 0 {
            txn.rollback().await?;
            return Ok(false);
        }

        if !is_primitive(&result) {
            let prior = Self::metrics_with(&txn, &result).await?;
            let learned = learn(prior, depth);
            let model = word::ActiveModel {
                word: ActiveValue::Set(result.clone()),
                depth: ActiveValue::Set(learned.depth),
                reachability: ActiveValue::Set(learned.reachability),
            };
            Word::insert(model)
                .on_conflict(
                    OnConflict::column(word::Column::Word)
                        .update_columns([word::Column::Depth, word::Column::Reachability])
                        .to_owned(),
                )
                .exec_without_returning(&txn)
                .await?;
            debug!(a = %a, b = %b, result = %result, depth = learned.depth, reachability = learned.reachability, "Learned combination");
        }

        txn.commit().await?;
        Ok(true)
    }

    async fn parent_metrics<C: ConnectionTrait>(conn: &C, word: &str) -> Result<WordMetrics> {
        match Self::metrics_with(conn, word).await? {
            Some(metrics) => Ok(metrics),
            None => {
                warn!(word, "Combining an unknown word, treating it as primitive");
                Ok(WordMetrics::PRIMITIVE)
            }
        }
    }

    /// Every word inside the filter's reachability and depth bounds.
    pub async fn target_words(&self, filter: TargetFilter) -> Result<Vec<String>> {
        let words = Word::find()
            .select_only()
            .column(word::Column::Word)
            .filter(word::Column::Reachability.gte(filter.min_reachability))
            .filter(word::Column::Reachability.lte(filter.max_reachability))
            .filter(word::Column::Depth.lte(filter.max_depth))
            .order_by_asc(word::Column::Word)
            .into_tuple::<String>()
            .all(&self.db)
            .await?;
        Ok(words)
    }

    /// One target word picked uniformly at random; `None` if nothing qualifies.
    pub async fn target_word(&self, filter: TargetFilter) -> Result<Option<String>> {
        let candidates = self.target_words(filter).await?;
        Ok(pick_random(&candidates))
    }

    pub async fn daily_word(&self, date: &str) -> Result<Option<String>> {
        let model = DailyWord::find_by_id(date.to_string()).one(&self.db).await?;
        Ok(model.map(|daily| daily.word))
    }

    /// Today's word, picking and storing one if this is the first request of the day.
    ///
    /// When two callers race, the first insert wins and both get its word.
    pub async fn create_or_get_daily_word(
        &self,
        date: &str,
        filter: TargetFilter,
    ) -> Result<Option<String>> {
        if let Some(existing) = self.daily_word(date).await? {
            return Ok(Some(existing));
        }

        let Some(candidate) = self.target_word(filter).await? else {
            return Ok(None);
        };

        let model = daily_word::ActiveModel {
            date: ActiveValue::Set(date.to_string()),
            word: ActiveValue::Set(candidate),
        };
        DailyWord::insert(model)
            .on_conflict(
                OnConflict::column(daily_word::Column::Date)
                    .do_nothing()
                    .to_owned(),
            )
            .exec_without_returning(&self.db)
            .await?;

        self.daily_word(date).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::connection::connect_to_memory_database;
    use migration::{Migrator, MigratorTrait};

    async fn setup_test_db() -> WordRepository {
        let db = connect_to_memory_database().await.unwrap();
        Migrator::up(&db, None).await.unwrap();
        let repo = WordRepository::new(db);
        repo.ensure_primitives().await.unwrap();
        repo
    }

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[tokio::test]
    async fn test_primitives_are_seeded_once() {
        let repo = setup_test_db().await;
        repo.ensure_primitives().await.unwrap();

        assert_eq!(repo.word_count().await.unwrap(), 4);
        assert_eq!(repo.metrics("fire").await.unwrap(), Some(WordMetrics::PRIMITIVE));
    }

    #[tokio::test]
    async fn test_combination_resolves_in_either_order() {
        let repo = setup_test_db().await;

        assert!(repo.add_combination("fire", "water", "Steam").await.unwrap());
        assert!(!repo.add_combination("Water", "fire", "mist").await.unwrap());

        assert_eq!(
            repo.find_combination("water", "fire").await.unwrap(),
            Some("steam".to_string())
        );
        assert_eq!(repo.find_combination("fire", "earth").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_learning_updates_metrics() {
        let repo = setup_test_db().await;

        repo.add_combination("fire", "water", "steam").await.unwrap();
        repo.add_combination("steam", "earth", "geyser").await.unwrap();
        repo.add_combination("geyser", "wind", "cloud").await.unwrap();

        let cloud = repo.metrics("cloud").await.unwrap().unwrap();
        assert_eq!(cloud.depth, 3);
        assert!(close(cloud.reachability, 0.125));

        // A shorter path to cloud.
        repo.add_combination("water", "wind", "cloud").await.unwrap();
        let cloud = repo.metrics("cloud").await.unwrap().unwrap();
        assert_eq!(cloud.depth, 1);
        assert!(close(cloud.reachability, 0.75 * 0.5 + 0.25 * 0.125));
    }

    #[tokio::test]
    async fn test_primitive_results_keep_their_metrics() {
        let repo = setup_test_db().await;

        repo.add_combination("earth", "earth", "fire").await.unwrap();
        assert_eq!(repo.metrics("fire").await.unwrap(), Some(WordMetrics::PRIMITIVE));
    }

    #[tokio::test]
    async fn test_target_words_respect_filter() {
        let repo = setup_test_db().await;
        repo.add_combination("fire", "water", "steam").await.unwrap();
        repo.add_combination("steam", "earth", "geyser").await.unwrap();
        repo.add_combination("geyser", "wind", "cloud").await.unwrap();
        repo.add_combination("cloud", "fire", "lightning").await.unwrap();

        let targets = repo.target_words(TargetFilter::FUSION_FRENZY).await.unwrap();
        assert_eq!(targets, vec!["cloud", "lightning"]);

        let picked = repo.target_word(TargetFilter::FUSION_FRENZY).await.unwrap().unwrap();
        assert!(targets.contains(&picked));
    }

    #[tokio::test]
    async fn test_no_target_available() {
        let repo = setup_test_db().await;
        assert!(repo.target_word(TargetFilter::DAILY_CHALLENGE).await.unwrap().is_none());
        assert!(repo
            .create_or_get_daily_word("2026-01-01", TargetFilter::DAILY_CHALLENGE)
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn test_daily_word_is_stable_for_the_day() {
        let repo = setup_test_db().await;
        repo.add_combination("fire", "water", "steam").await.unwrap();
        repo.add_combination("steam", "earth", "geyser").await.unwrap();
        repo.add_combination("geyser", "wind", "cloud").await.unwrap();
        repo.add_combination("cloud", "fire", "lightning").await.unwrap();

        let first = repo
            .create_or_get_daily_word("2026-01-01", TargetFilter::DAILY_CHALLENGE)
            .await
            .unwrap()
            .unwrap();
        for _ in 0..5 {
            let again = repo
                .create_or_get_daily_word("2026-01-01", TargetFilter::DAILY_CHALLENGE)
                .await
                .unwrap();
            assert_eq!(again.as_deref(), Some(first.as_str()));
        }
        assert_eq!(repo.daily_word("2026-01-02").await.unwrap(), None);
    }
}
