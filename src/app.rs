use chrono::{Duration, NaiveDateTime};
use tracing::debug;

use crate::engine::countdown::Countdown;
use crate::engine::game::{Game, GameStatus, Transition};
use crate::session::puzzle::Question;
use crate::session::selection::AnswerSelection;
use crate::store::KvStore;
use crate::ui::theme::Theme;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AppView {
    Game,
    Profile,
}

const CORRECT_FEEDBACK_MS: i64 = 800;
const WRONG_FEEDBACK_MS: i64 = 1000;

/// The question just answered, held on screen briefly with the chosen option
/// marked right or wrong.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AnswerFeedback {
    pub question: Question,
    /// 1-based position of `question` in the quiz.
    pub number: usize,
    pub option_index: usize,
    pub correct: bool,
    shown_at: NaiveDateTime,
}

impl AnswerFeedback {
    fn expired(&self, now: NaiveDateTime) -> bool {
        let ms = if self.correct {
            CORRECT_FEEDBACK_MS
        } else {
            WRONG_FEEDBACK_MS
        };
        now - self.shown_at >= Duration::milliseconds(ms)
    }
}

/// UI-side state wrapped around the day's game.
pub struct App<S> {
    pub view: AppView,
    pub game: Game<S>,
    pub theme: &'static Theme,
    pub selection: AnswerSelection,
    pub story_scroll: u16,
    story_max_scroll: u16,
    pub feedback: Option<AnswerFeedback>,
    pub countdown: Countdown,
    pub should_quit: bool,
}

impl<S: KvStore> App<S> {
    pub fn new(game: Game<S>, theme: &'static Theme) -> Self {
        Self {
            view: AppView::Game,
            game,
            theme,
            selection: AnswerSelection::new(),
            story_scroll: 0,
            story_max_scroll: 0,
            feedback: None,
            countdown: Countdown::new(),
            should_quit: false,
        }
    }

    /// The result screen waits for any answer feedback to clear.
    pub fn result_visible(&self) -> bool {
        self.view == AppView::Game && self.game.status().is_terminal() && self.feedback.is_none()
    }

    /// Arms the countdown while a result screen is showing and clears it
    /// otherwise.
    pub fn sync_countdown(&mut self, now: NaiveDateTime) {
        if self.result_visible() {
            if !self.countdown.is_armed() {
                self.countdown.arm(now);
            }
        } else if self.countdown.is_armed() {
            self.countdown.clear();
        }
    }

    pub fn on_tick(&mut self, now: NaiveDateTime) {
        if self.feedback.as_ref().is_some_and(|f| f.expired(now)) {
            self.feedback = None;
        }
        self.sync_countdown(now);
        self.countdown.tick(now);
    }

    /// Clears answer feedback early. Returns true if there was any, in which
    /// case the key that triggered this is consumed.
    pub fn dismiss_feedback(&mut self, now: NaiveDateTime) -> bool {
        if self.feedback.take().is_some() {
            self.sync_countdown(now);
            true
        } else {
            false
        }
    }

    pub fn show_view(&mut self, view: AppView, now: NaiveDateTime) {
        self.view = view;
        self.sync_countdown(now);
    }

    pub fn start_quiz(&mut self) {
        match self.game.start() {
            Ok(()) => self.selection.clear(),
            Err(e) => debug!(error = %e, "start ignored"),
        }
    }

    pub fn scroll_story(&mut self, delta: i16) {
        self.story_scroll = self
            .story_scroll
            .saturating_add_signed(delta)
            .min(self.story_max_scroll);
    }

    /// Updates the scroll limit for the current story area, pulling the
    /// offset back if the area grew.
    pub fn set_story_max_scroll(&mut self, max: u16) {
        self.story_max_scroll = max;
        self.story_scroll = self.story_scroll.min(max);
    }

    pub fn select_next(&mut self) {
        if self.feedback.is_some() {
            return;
        }
        if let Some(count) = self.game.current_question().map(|q| q.options.len()) {
            self.selection.next(count);
        }
    }

    pub fn select_prev(&mut self) {
        if self.feedback.is_some() {
            return;
        }
        if let Some(count) = self.game.current_question().map(|q| q.options.len()) {
            self.selection.prev(count);
        }
    }

    pub fn select_by_key(&mut self, key: char) {
        if self.feedback.is_some() {
            return;
        }
        if let Some(question) = self.game.current_question() {
            self.selection.pick_by_key(question, key);
        }
    }

    /// Submits the highlighted option and shows whether it was right. Does
    /// nothing without a selection or while feedback is still showing.
    pub async fn submit_answer(&mut self, now: NaiveDateTime) -> Option<Transition> {
        if self.feedback.is_some() {
            return None;
        }
        let (question, option_index, option_id) = {
            let question = self.game.current_question()?;
            let index = self.selection.selected_index()?;
            let id = self.selection.take_submission(question)?;
            (question.clone(), index, id)
        };
        let number = self.game.state().current_question_index + 1;
        match self.game.answer(&option_id).await {
            Ok(transition) => {
                self.feedback = Some(AnswerFeedback {
                    question,
                    number,
                    option_index,
                    correct: !matches!(transition, Transition::Lost),
                    shown_at: now,
                });
                Some(transition)
            }
            Err(e) => {
                debug!(error = %e, "answer ignored");
                None
            }
        }
    }

    pub fn save_notice(&self) -> Option<&'static str> {
        self.game
            .save_failed()
            .then_some("Your record could not be saved; see the log file.")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generator::OfflineProvider;
    use crate::store::memory::MemoryStore;
    use crate::store::persistence::Persistence;
    use chrono::NaiveDate;

    fn now() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 3, 1)
            .unwrap()
            .and_hms_opt(20, 0, 0)
            .unwrap()
    }

    async fn loaded_app() -> App<MemoryStore> {
        let theme: &'static Theme = Box::leak(Box::new(Theme::default()));
        let mut game = Game::new(Persistence::new(MemoryStore::new()), now().date());
        game.load(&OfflineProvider).await.unwrap();
        App::new(game, theme)
    }

    #[tokio::test]
    async fn submit_without_selection_keeps_question() {
        let mut app = loaded_app().await;
        app.start_quiz();
        assert_eq!(app.submit_answer(now()).await, None);
        assert_eq!(app.game.status(), GameStatus::Quiz);
        assert_eq!(app.game.state().current_question_index, 0);
    }

    #[tokio::test]
    async fn losing_arms_countdown_and_profile_clears_it() {
        let mut app = loaded_app().await;
        app.start_quiz();
        // Fallback puzzle: "A" is wrong for the first question.
        app.select_by_key('a');
        assert_eq!(app.submit_answer(now()).await, Some(Transition::Lost));
        assert!(!app.result_visible());
        assert!(!app.countdown.is_armed());

        app.on_tick(now() + Duration::seconds(1));
        assert!(app.feedback.is_none());
        assert!(app.countdown.is_armed());
        assert_eq!(app.countdown.text(), Some("03:59:59"));

        app.show_view(AppView::Profile, now());
        assert!(!app.countdown.is_armed());
        app.show_view(AppView::Game, now());
        assert!(app.countdown.is_armed());
    }

    #[tokio::test]
    async fn keyboard_path_to_victory() {
        let mut app = loaded_app().await;
        app.start_quiz();
        for key in ['b', 'b'] {
            app.select_by_key(key);
            assert!(matches!(
                app.submit_answer(now()).await,
                Some(Transition::Advanced { .. })
            ));
            assert!(app.dismiss_feedback(now()));
        }
        app.select_next();
        app.select_next();
        app.select_next();
        assert_eq!(
            app.submit_answer(now()).await,
            Some(Transition::Won { points: 100 })
        );
        assert!(!app.result_visible());
        assert!(app.dismiss_feedback(now()));
        assert!(app.result_visible());
        assert!(app.countdown.is_armed());
        assert_eq!(app.save_notice(), None);
    }

    #[tokio::test]
    async fn story_scroll_saturates_at_top() {
        let mut app = loaded_app().await;
        app.set_story_max_scroll(5);
        app.scroll_story(2);
        app.scroll_story(-5);
        assert_eq!(app.story_scroll, 0);
    }

    #[tokio::test]
    async fn story_scroll_stops_at_bottom() {
        let mut app = loaded_app().await;
        app.set_story_max_scroll(5);
        app.scroll_story(10);
        assert_eq!(app.story_scroll, 5);
        app.scroll_story(-1);
        assert_eq!(app.story_scroll, 4);

        app.set_story_max_scroll(2);
        assert_eq!(app.story_scroll, 2);
    }

    #[tokio::test]
    async fn correct_answer_shows_feedback_then_next_question() {
        let mut app = loaded_app().await;
        app.start_quiz();
        app.select_by_key('b');
        assert!(matches!(
            app.submit_answer(now()).await,
            Some(Transition::Advanced { .. })
        ));

        let feedback = app.feedback.clone().unwrap();
        assert!(feedback.correct);
        assert_eq!((feedback.number, feedback.option_index), (1, 1));
        assert_eq!(app.game.state().current_question_index, 1);

        // Input is held back while the mark is on screen.
        app.select_by_key('c');
        assert_eq!(app.selection.selected_index(), None);
        assert_eq!(app.submit_answer(now()).await, None);

        app.on_tick(now() + Duration::milliseconds(500));
        assert!(app.feedback.is_some());
        app.on_tick(now() + Duration::milliseconds(800));
        assert!(app.feedback.is_none());
        app.select_by_key('c');
        assert_eq!(app.selection.selected_index(), Some(2));
    }

    #[tokio::test]
    async fn wrong_answer_feedback_lasts_longer() {
        let mut app = loaded_app().await;
        app.start_quiz();
        app.select_by_key('a');
        app.submit_answer(now()).await;

        let feedback = app.feedback.clone().unwrap();
        assert!(!feedback.correct);
        assert_eq!(feedback.option_index, 0);

        app.on_tick(now() + Duration::milliseconds(900));
        assert!(app.feedback.is_some());
        assert!(!app.result_visible());
        app.on_tick(now() + Duration::milliseconds(1000));
        assert!(app.result_visible());
    }

    #[tokio::test]
    async fn dismiss_without_feedback_is_ignored() {
        let mut app = loaded_app().await;
        assert!(!app.dismiss_feedback(now()));
    }
}
