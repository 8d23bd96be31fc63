use crate::session::puzzle::Question;

/// Highlighted option for the current question. Nothing is submitted until an
/// option has been picked.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AnswerSelection {
    selected: Option<usize>,
}

impl AnswerSelection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn selected_index(&self) -> Option<usize> {
        self.selected
    }

    pub fn selected_id<'q>(&self, question: &'q Question) -> Option<&'q str> {
        self.selected
            .and_then(|i| question.options.get(i))
            .map(|o| o.id.as_str())
    }

    pub fn next(&mut self, option_count: usize) {
        if option_count == 0 {
            return;
        }
        self.selected = Some(match self.selected {
            Some(i) => (i + 1) % option_count,
            None => 0,
        });
    }

    pub fn prev(&mut self, option_count: usize) {
        if option_count == 0 {
            return;
        }
        self.selected = Some(match self.selected {
            Some(0) | None => option_count - 1,
            Some(i) => i - 1,
        });
    }

    /// Selects the option whose id matches `key` case-insensitively.
    pub fn pick_by_key(&mut self, question: &Question, key: char) -> bool {
        let found = question.options.iter().position(|o| {
            let mut chars = o.id.chars();
            matches!((chars.next(), chars.next()), (Some(c), None) if c.eq_ignore_ascii_case(&key))
        });
        if found.is_some() {
            self.selected = found;
        }
        found.is_some()
    }

    /// Takes the current pick for submission, leaving nothing selected.
    /// Returns `None` when nothing was picked, making submit a no-op.
    pub fn take_submission(&mut self, question: &Question) -> Option<String> {
        let id = self.selected_id(question)?.to_string();
        self.selected = None;
        Some(id)
    }

    pub fn clear(&mut self) {
        self.selected = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::puzzle::{Difficulty, PuzzleOption};

    fn question() -> Question {
        Question {
            id: "q1".to_string(),
            difficulty: Difficulty::Easy,
            text: "Which?".to_string(),
            options: ["A", "B", "C", "D"]
                .iter()
                .map(|id| PuzzleOption {
                    id: id.to_string(),
                    text: format!("option {id}"),
                })
                .collect(),
            correct_option_id: "B".to_string(),
        }
    }

    #[test]
    fn submit_without_selection_is_noop() {
        let mut selection = AnswerSelection::new();
        assert_eq!(selection.take_submission(&question()), None);
    }

    #[test]
    fn navigation_wraps() {
        let mut selection = AnswerSelection::new();
        selection.prev(4);
        assert_eq!(selection.selected_index(), Some(3));
        selection.next(4);
        assert_eq!(selection.selected_index(), Some(0));
        selection.next(4);
        assert_eq!(selection.selected_index(), Some(1));
    }

    #[test]
    fn pick_by_key_ignores_case() {
        let q = question();
        let mut selection = AnswerSelection::new();
        assert!(selection.pick_by_key(&q, 'c'));
        assert_eq!(selection.selected_id(&q), Some("C"));
        assert!(!selection.pick_by_key(&q, 'x'));
        assert_eq!(selection.selected_id(&q), Some("C"));
    }

    #[test]
    fn take_submission_clears_pick() {
        let q = question();
        let mut selection = AnswerSelection::new();
        selection.next(q.options.len());
        assert_eq!(selection.take_submission(&q).as_deref(), Some("A"));
        assert_eq!(selection.selected_index(), None);
    }
}
