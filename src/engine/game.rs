use chrono::NaiveDate;
use tracing::{debug, error, info, warn};

use crate::error::GameError;
use crate::generator::PuzzleProvider;
use crate::session::puzzle::{DailyPuzzle, Question};
use crate::store::KvStore;
use crate::store::persistence::Persistence;
use crate::store::schema::{Outcome, UserStats};

/// Points awarded for answering all of the day's questions correctly.
pub const WIN_POINTS: u32 = 100;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GameStatus {
    Loading,
    Reading,
    Quiz,
    Won,
    Lost,
    AlreadyPlayed,
}

impl GameStatus {
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            GameStatus::Won | GameStatus::Lost | GameStatus::AlreadyPlayed
        )
    }
}

/// Result of submitting an answer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Transition {
    Advanced { index: usize },
    Won { points: u32 },
    Lost,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DisplayedResult {
    pub outcome: Outcome,
    pub points: u32,
}

#[derive(Clone, Debug)]
pub struct GameState {
    pub status: GameStatus,
    pub puzzle: Option<DailyPuzzle>,
    pub stats: UserStats,
    pub current_question_index: usize,
}

impl Default for GameState {
    fn default() -> Self {
        Self {
            status: GameStatus::Loading,
            puzzle: None,
            stats: UserStats::default(),
            current_question_index: 0,
        }
    }
}

/// The day's session: loads stats and puzzle, then walks READING -> QUIZ ->
/// WON/LOST, persisting stats when the quiz resolves.
pub struct Game<S> {
    state: GameState,
    persistence: Persistence<S>,
    today: NaiveDate,
    cache_retention_days: u32,
    save_failed: bool,
    /// Set when stored stats exist but could not be read; saving would
    /// overwrite them.
    stats_unreadable: bool,
}

impl<S: KvStore> Game<S> {
    pub fn new(persistence: Persistence<S>, today: NaiveDate) -> Self {
        Self {
            state: GameState::default(),
            persistence,
            today,
            cache_retention_days: 0,
            save_failed: false,
            stats_unreadable: false,
        }
    }

    pub fn with_cache_retention(mut self, days: u32) -> Self {
        self.cache_retention_days = days;
        self
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn status(&self) -> GameStatus {
        self.state.status
    }

    pub fn puzzle(&self) -> Option<&DailyPuzzle> {
        self.state.puzzle.as_ref()
    }

    pub fn stats(&self) -> &UserStats {
        &self.state.stats
    }

    pub fn today(&self) -> NaiveDate {
        self.today
    }

    pub fn persistence(&self) -> &Persistence<S> {
        &self.persistence
    }

    /// True when the last attempt to persist stats failed or was refused.
    pub fn save_failed(&self) -> bool {
        self.save_failed
    }

    /// The question being asked, only while in QUIZ.
    pub fn current_question(&self) -> Option<&Question> {
        if self.state.status != GameStatus::Quiz {
            return None;
        }
        self.puzzle()?.question(self.state.current_question_index)
    }

    pub async fn load<P: PuzzleProvider>(&mut self, provider: &P) -> Result<GameStatus, GameError> {
        self.expect_status(GameStatus::Loading, "load")?;
        info!(today = %self.today, "loading daily state");

        let stats = match self.persistence.load_stats().await {
            Ok(stats) => stats,
            Err(e) => {
                error!(error = %e, "could not read stats, playing without saving");
                self.stats_unreadable = true;
                UserStats::default()
            }
        };

        let puzzle = self
            .persistence
            .load_or_generate_puzzle(provider, self.today)
            .await;

        if let Err(e) = self
            .persistence
            .prune_puzzle_cache(self.today, self.cache_retention_days)
            .await
        {
            error!(error = %e, "could not prune puzzle cache");
        }

        let status = if stats.has_played_on(self.today) {
            GameStatus::AlreadyPlayed
        } else {
            GameStatus::Reading
        };
        self.state = GameState {
            status,
            puzzle: Some(puzzle),
            stats,
            current_question_index: 0,
        };
        info!(?status, "daily state loaded");
        Ok(status)
    }

    pub fn start(&mut self) -> Result<(), GameError> {
        self.expect_status(GameStatus::Reading, "start the quiz")?;
        self.state.status = GameStatus::Quiz;
        self.state.current_question_index = 0;
        debug!("quiz started");
        Ok(())
    }

    /// Checks `option_id` against the current question. A wrong answer ends
    /// the quiz at once; the last correct answer wins it.
    pub async fn answer(&mut self, option_id: &str) -> Result<Transition, GameError> {
        self.expect_status(GameStatus::Quiz, "answer")?;
        let index = self.state.current_question_index;
        let (correct, question_count) = {
            let puzzle = self.state.puzzle.as_ref().ok_or(GameError::InvalidTransition {
                from: GameStatus::Quiz,
                action: "answer without a puzzle",
            })?;
            let question = &puzzle.questions[index];
            if !question.has_option(option_id) {
                return Err(GameError::UnknownOption(option_id.to_string()));
            }
            (question.is_correct(option_id), puzzle.question_count())
        };

        let transition = if !correct {
            self.finish(Outcome::Lost, 0).await;
            Transition::Lost
        } else if index + 1 >= question_count {
            self.finish(Outcome::Won, WIN_POINTS).await;
            Transition::Won { points: WIN_POINTS }
        } else {
            self.state.current_question_index = index + 1;
            Transition::Advanced { index: index + 1 }
        };
        info!(question = index + 1, ?transition, "answer resolved");
        Ok(transition)
    }

    /// Outcome shown on the result screen. After a revisit this comes from
    /// the most recent history entry.
    pub fn displayed_result(&self) -> Option<DisplayedResult> {
        match self.state.status {
            GameStatus::Won => Some(DisplayedResult {
                outcome: Outcome::Won,
                points: WIN_POINTS,
            }),
            GameStatus::Lost => Some(DisplayedResult {
                outcome: Outcome::Lost,
                points: 0,
            }),
            GameStatus::AlreadyPlayed => self.state.stats.last_entry().map(|e| DisplayedResult {
                outcome: e.outcome,
                points: e.points,
            }),
            _ => None,
        }
    }

    async fn finish(&mut self, outcome: Outcome, points: u32) {
        self.state.stats.record(self.today, outcome, points);
        self.state.status = match outcome {
            Outcome::Won => GameStatus::Won,
            Outcome::Lost => GameStatus::Lost,
        };
        if self.stats_unreadable {
            warn!("stored stats were unreadable, not overwriting them");
            self.save_failed = true;
            return;
        }
        match self.persistence.save_stats(&self.state.stats).await {
            Ok(()) => self.save_failed = false,
            Err(e) => {
                error!(error = %e, "failed to save stats");
                self.save_failed = true;
            }
        }
    }

    fn expect_status(&self, expected: GameStatus, action: &'static str) -> Result<(), GameError> {
        if self.state.status == expected {
            Ok(())
        } else {
            Err(GameError::InvalidTransition {
                from: self.state.status,
                action,
            })
        }
    }
}
