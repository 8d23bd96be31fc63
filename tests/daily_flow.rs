use std::future::{Future, ready};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use chrono::NaiveDate;
use eastern_mysteries::engine::{Game, GameStatus, Transition};
use eastern_mysteries::error::ProviderError;
use eastern_mysteries::generator::fallback::fallback_puzzle;
use eastern_mysteries::generator::{PuzzleProvider, PuzzleRequest};
use eastern_mysteries::session::puzzle::GeneratedPuzzle;
use eastern_mysteries::store::KvStore;
use eastern_mysteries::store::file_store::FileStore;
use eastern_mysteries::store::memory::MemoryStore;
use eastern_mysteries::store::persistence::Persistence;
use eastern_mysteries::store::schema::{Outcome, STATS_KEY, puzzle_cache_key};

/// Serves a fixed puzzle titled after the requested topic and counts calls.
#[derive(Default)]
struct StubProvider {
    calls: AtomicUsize,
}

impl StubProvider {
    fn calls(&self) -> usize {
        self.calls.load(Ordering::Relaxed)
    }
}

impl PuzzleProvider for StubProvider {
    fn generate(
        &self,
        request: &PuzzleRequest,
    ) -> impl Future<Output = Result<GeneratedPuzzle, ProviderError>> + Send {
        self.calls.fetch_add(1, Ordering::Relaxed);
        let base = fallback_puzzle(request.date);
        ready(Ok(GeneratedPuzzle {
            title: format!("Riddle of {}", request.topic),
            lunar_date: base.lunar_date,
            story: base.story,
            questions: base.questions,
        }))
    }
}

fn march_first() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 3, 1).unwrap()
}

fn wrong_id<S: KvStore>(game: &Game<S>) -> String {
    let q = game.current_question().unwrap();
    q.options
        .iter()
        .find(|o| o.id != q.correct_option_id)
        .unwrap()
        .id
        .clone()
}

fn correct_id<S: KvStore>(game: &Game<S>) -> String {
    game.current_question().unwrap().correct_option_id.clone()
}

#[tokio::test]
async fn first_visit_lost_on_third_question() {
    let store = Arc::new(MemoryStore::new());
    let provider = StubProvider::default();
    let mut game = Game::new(Persistence::new(store.clone()), march_first());

    assert_eq!(game.load(&provider).await.unwrap(), GameStatus::Reading);
    assert_eq!(provider.calls(), 1);
    assert!(
        store
            .snapshot()
            .contains_key(&puzzle_cache_key(march_first()))
    );

    game.start().unwrap();
    for expected in [1, 2] {
        let id = correct_id(&game);
        assert_eq!(
            game.answer(&id).await.unwrap(),
            Transition::Advanced { index: expected }
        );
    }
    let id = wrong_id(&game);
    assert_eq!(game.answer(&id).await.unwrap(), Transition::Lost);

    assert_eq!(game.status(), GameStatus::Lost);
    let stats = game.stats();
    assert_eq!(stats.total_points, 0);
    assert_eq!(stats.current_streak, 0);
    assert_eq!(stats.last_played_date, Some(march_first()));
    assert_eq!(stats.play_history.len(), 1);
    assert_eq!(stats.play_history[0].date, march_first());
    assert_eq!(stats.play_history[0].outcome, Outcome::Lost);

    let saved = store.snapshot();
    let raw = saved.get(STATS_KEY).expect("stats persisted");
    assert!(raw.contains("\"LOST\""));
    assert!(raw.contains("\"2024-03-01\""));
}

#[tokio::test]
async fn revisit_same_day_is_already_played() {
    let store = Arc::new(MemoryStore::new());
    let provider = StubProvider::default();

    let mut game = Game::new(Persistence::new(store.clone()), march_first());
    game.load(&provider).await.unwrap();
    game.start().unwrap();
    for _ in 0..3 {
        let id = correct_id(&game);
        game.answer(&id).await.unwrap();
    }
    assert_eq!(game.status(), GameStatus::Won);
    assert_eq!(game.stats().total_points, 100);
    assert_eq!(game.stats().current_streak, 1);

    let mut again = Game::new(Persistence::new(store), march_first());
    assert_eq!(
        again.load(&provider).await.unwrap(),
        GameStatus::AlreadyPlayed
    );
    assert_eq!(provider.calls(), 1);
    assert!(again.start().is_err());
    let shown = again.displayed_result().unwrap();
    assert_eq!(shown.outcome, Outcome::Won);
    assert_eq!(shown.points, 100);
}

#[tokio::test]
async fn file_store_cache_survives_restart() {
    let dir = tempfile::tempdir().unwrap();
    let provider = StubProvider::default();

    let first = {
        let store = FileStore::with_base_dir(dir.path().to_path_buf()).unwrap();
        let mut game = Game::new(Persistence::new(store), march_first());
        game.load(&provider).await.unwrap();
        game.puzzle().unwrap().clone()
    };

    let store = FileStore::with_base_dir(dir.path().to_path_buf()).unwrap();
    let mut game = Game::new(Persistence::new(store), march_first());
    assert_eq!(game.load(&provider).await.unwrap(), GameStatus::Reading);

    assert_eq!(provider.calls(), 1);
    assert_eq!(game.puzzle(), Some(&first));
    assert!(first.title.starts_with("Riddle of "));
}

#[tokio::test]
async fn next_day_brings_new_puzzle_and_keeps_streak() {
    let store = Arc::new(MemoryStore::new());
    let provider = StubProvider::default();

    for day in [march_first(), march_first().succ_opt().unwrap()] {
        let mut game = Game::new(Persistence::new(store.clone()), day);
        assert_eq!(game.load(&provider).await.unwrap(), GameStatus::Reading);
        game.start().unwrap();
        for _ in 0..3 {
            let id = correct_id(&game);
            game.answer(&id).await.unwrap();
        }
    }

    assert_eq!(provider.calls(), 2);
    let game = {
        let mut game = Game::new(
            Persistence::new(store),
            march_first().succ_opt().unwrap(),
        );
        game.load(&provider).await.unwrap();
        game
    };
    assert_eq!(game.stats().total_points, 200);
    assert_eq!(game.stats().current_streak, 2);
    assert_eq!(game.stats().play_history.len(), 2);
}

#[tokio::test]
async fn undecodable_stats_file_is_backed_up_before_reset() {
    let dir = tempfile::tempdir().unwrap();
    let mut blob = br#"{"totalPoints": 900, "currentStreak": 4, "#.to_vec();
    blob.extend_from_slice(&[0xff, 0xfe]);
    blob.extend_from_slice(b"}");
    std::fs::write(dir.path().join("user_stats_v1.json"), &blob).unwrap();

    let store = FileStore::with_base_dir(dir.path().to_path_buf()).unwrap();
    let mut game = Game::new(Persistence::new(store), march_first());
    assert_eq!(
        game.load(&StubProvider::default()).await.unwrap(),
        GameStatus::Reading
    );
    game.start().unwrap();
    let id = wrong_id(&game);
    game.answer(&id).await.unwrap();

    let backup = std::fs::read_to_string(dir.path().join("user_stats_v1.corrupt.json")).unwrap();
    assert!(backup.contains(r#""totalPoints": 900"#));
    assert!(backup.contains(r#""currentStreak": 4"#));

    let saved = std::fs::read_to_string(dir.path().join("user_stats_v1.json")).unwrap();
    assert!(saved.contains("\"LOST\""));
    assert!(!game.save_failed());
}
