use chrono::NaiveDate;
use tracing::{debug, error, info, warn};

use crate::error::StoreError;
use crate::generator::{PuzzleProvider, fetch_or_fallback};
use crate::session::puzzle::DailyPuzzle;
use crate::store::KvStore;
use crate::store::schema::{
    CORRUPT_STATS_KEY, STATS_KEY, UserStats, puzzle_cache_date, puzzle_cache_key,
};

/// Typed access to the stats record and the per-date puzzle cache.
pub struct Persistence<S> {
    store: S,
}

impl<S: KvStore> Persistence<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Missing stats are fresh stats. A blob that is not UTF-8 or not valid
    /// stats JSON is parked under `CORRUPT_STATS_KEY` and replaced by fresh
    /// stats. Any other read error is returned.
    pub async fn load_stats(&self) -> Result<UserStats, StoreError> {
        let raw = match self.store.get(STATS_KEY).await {
            Ok(Some(raw)) => raw,
            Ok(None) => {
                debug!("no stored stats, starting fresh");
                return Ok(UserStats::default());
            }
            Err(StoreError::NotText { source, .. }) => {
                warn!(error = %source, "stored stats are not text, resetting");
                let lossy = String::from_utf8_lossy(source.as_bytes()).into_owned();
                return self.park_corrupt_stats(&lossy).await;
            }
            Err(e) => return Err(e),
        };
        match serde_json::from_str(&raw) {
            Ok(stats) => Ok(stats),
            Err(e) => {
                warn!(error = %e, "stored stats are malformed, resetting");
                self.park_corrupt_stats(&raw).await
            }
        }
    }

    async fn park_corrupt_stats(&self, raw: &str) -> Result<UserStats, StoreError> {
        self.store.put(CORRUPT_STATS_KEY, raw).await?;
        Ok(UserStats::default())
    }

    pub async fn save_stats(&self, stats: &UserStats) -> Result<(), StoreError> {
        let json = serde_json::to_string(stats).map_err(|source| StoreError::Serialize {
            key: STATS_KEY.to_string(),
            source,
        })?;
        self.store.put(STATS_KEY, &json).await
    }

    pub async fn reset_stats(&self) -> Result<(), StoreError> {
        self.store.remove(STATS_KEY).await
    }

    /// A cached entry that no longer parses or validates counts as a miss.
    pub async fn load_cached_puzzle(
        &self,
        date: NaiveDate,
    ) -> Result<Option<DailyPuzzle>, StoreError> {
        let key = puzzle_cache_key(date);
        let Some(raw) = self.store.get(&key).await? else {
            return Ok(None);
        };
        let puzzle: DailyPuzzle = match serde_json::from_str(&raw) {
            Ok(p) => p,
            Err(e) => {
                warn!(%key, error = %e, "cached puzzle is malformed, ignoring");
                return Ok(None);
            }
        };
        if puzzle.id != date {
            warn!(%key, id = %puzzle.id, "cached puzzle belongs to another date, ignoring");
            return Ok(None);
        }
        if let Err(e) = puzzle.validate() {
            warn!(%key, error = %e, "cached puzzle is invalid, ignoring");
            return Ok(None);
        }
        Ok(Some(puzzle))
    }

    pub async fn cache_puzzle(&self, puzzle: &DailyPuzzle) -> Result<(), StoreError> {
        let key = puzzle_cache_key(puzzle.id);
        let json = serde_json::to_string(puzzle).map_err(|source| StoreError::Serialize {
            key: key.clone(),
            source,
        })?;
        self.store.put(&key, &json).await
    }

    /// Returns today's puzzle from the cache, or asks the provider once and
    /// caches whatever comes back, fallback included. Never fails.
    pub async fn load_or_generate_puzzle<P: PuzzleProvider>(
        &self,
        provider: &P,
        date: NaiveDate,
    ) -> DailyPuzzle {
        match self.load_cached_puzzle(date).await {
            Ok(Some(puzzle)) => {
                info!(%date, "puzzle cache hit");
                return puzzle;
            }
            Ok(None) => info!(%date, "puzzle cache miss"),
            Err(e) => warn!(%date, error = %e, "puzzle cache unreadable, generating"),
        }

        let puzzle = fetch_or_fallback(provider, date).await;
        if let Err(e) = self.cache_puzzle(&puzzle).await {
            error!(%date, error = %e, "failed to cache puzzle");
        }
        puzzle
    }

    /// Drops cached puzzles dated more than `retention_days` before `today`.
    /// Zero keeps everything.
    pub async fn prune_puzzle_cache(
        &self,
        today: NaiveDate,
        retention_days: u32,
    ) -> Result<usize, StoreError> {
        if retention_days == 0 {
            return Ok(0);
        }
        let Some(cutoff) = today.checked_sub_days(chrono::Days::new(u64::from(retention_days)))
        else {
            return Ok(0);
        };

        let mut removed = 0;
        for key in self.store.keys().await? {
            if puzzle_cache_date(&key).is_some_and(|d| d < cutoff) {
                self.store.remove(&key).await?;
                removed += 1;
            }
        }
        if removed > 0 {
            info!(removed, %cutoff, "pruned cached puzzles");
        }
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generator::fallback::fallback_puzzle;
    use crate::store::file_store::FileStore;
    use crate::store::memory::MemoryStore;
    use crate::store::schema::Outcome;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[tokio::test]
    async fn missing_stats_are_default() {
        let persistence = Persistence::new(MemoryStore::new());
        assert_eq!(persistence.load_stats().await.unwrap(), UserStats::default());
    }

    #[tokio::test]
    async fn malformed_stats_reset_and_backed_up() {
        let store = MemoryStore::with_entries([(STATS_KEY, "{not json")]);
        let persistence = Persistence::new(store);
        let stats = persistence.load_stats().await.unwrap();
        assert_eq!(stats, UserStats::default());
        let snapshot = persistence.store().snapshot();
        assert_eq!(snapshot.get(CORRUPT_STATS_KEY).map(String::as_str), Some("{not json"));
    }

    #[tokio::test]
    async fn non_utf8_stats_reset_and_backed_up() {
        let dir = tempfile::TempDir::new().unwrap();
        std::fs::write(
            dir.path().join("user_stats_v1.json"),
            b"{\"totalPoints\": 900, \xff\xfe}",
        )
        .unwrap();
        let store = FileStore::with_base_dir(dir.path().to_path_buf()).unwrap();
        let persistence = Persistence::new(store);

        assert_eq!(persistence.load_stats().await.unwrap(), UserStats::default());
        let backup = persistence.store().get(CORRUPT_STATS_KEY).await.unwrap().unwrap();
        assert!(backup.contains("\"totalPoints\": 900"));
    }

    #[tokio::test]
    async fn stats_round_trip_through_store() {
        let persistence = Persistence::new(MemoryStore::new());
        let mut stats = UserStats::default();
        stats.record(day(2024, 3, 1), Outcome::Won, 100);
        persistence.save_stats(&stats).await.unwrap();
        assert_eq!(persistence.load_stats().await.unwrap(), stats);
    }

    #[tokio::test]
    async fn cached_puzzle_for_other_date_is_a_miss() {
        let persistence = Persistence::new(MemoryStore::new());
        let mut puzzle = fallback_puzzle(day(2024, 3, 1));
        persistence.cache_puzzle(&puzzle).await.unwrap();
        assert!(persistence.load_cached_puzzle(day(2024, 3, 1)).await.unwrap().is_some());

        puzzle.id = day(2024, 3, 2);
        let json = serde_json::to_string(&puzzle).unwrap();
        persistence
            .store()
            .put(&puzzle_cache_key(day(2024, 3, 3)), &json)
            .await
            .unwrap();
        assert!(persistence.load_cached_puzzle(day(2024, 3, 3)).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn invalid_cached_puzzle_is_a_miss() {
        let persistence = Persistence::new(MemoryStore::new());
        let mut puzzle = fallback_puzzle(day(2024, 3, 1));
        puzzle.questions[0].correct_option_id = "Z".to_string();
        persistence.cache_puzzle(&puzzle).await.unwrap();
        assert!(persistence.load_cached_puzzle(day(2024, 3, 1)).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn prune_zero_retention_keeps_everything() {
        let persistence = Persistence::new(MemoryStore::new());
        for d in 1..=5 {
            persistence.cache_puzzle(&fallback_puzzle(day(2024, 1, d))).await.unwrap();
        }
        let removed = persistence.prune_puzzle_cache(day(2024, 6, 1), 0).await.unwrap();
        assert_eq!(removed, 0);
        assert_eq!(persistence.store().snapshot().len(), 5);
    }

    #[tokio::test]
    async fn prune_removes_only_old_puzzles() {
        let persistence = Persistence::new(MemoryStore::new());
        for d in [1, 5, 8, 10] {
            persistence.cache_puzzle(&fallback_puzzle(day(2024, 3, d))).await.unwrap();
        }
        persistence.save_stats(&UserStats::default()).await.unwrap();

        let removed = persistence.prune_puzzle_cache(day(2024, 3, 10), 3).await.unwrap();
        assert_eq!(removed, 2);

        let keys: Vec<String> = persistence.store().snapshot().into_keys().collect();
        assert_eq!(
            keys,
            vec![
                "puzzle_cache_2024-03-08".to_string(),
                "puzzle_cache_2024-03-10".to_string(),
                STATS_KEY.to_string(),
            ]
        );
    }
}
