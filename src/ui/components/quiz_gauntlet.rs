use ratatui::buffer::Buffer;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Padding, Paragraph, Widget, Wrap};

use crate::session::puzzle::Question;
use crate::ui::theme::Theme;

const SEGMENT: &str = "\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}";

pub struct QuizGauntlet<'a> {
    pub question: &'a Question,
    /// 1-based position of `question` in the quiz.
    pub number: usize,
    pub total: usize,
    pub selected: Option<usize>,
    /// Option just answered and whether it was right. Replaces the selection
    /// highlight while set.
    pub feedback: Option<(usize, bool)>,
    pub theme: &'a Theme,
}

impl<'a> QuizGauntlet<'a> {
    pub fn new(
        question: &'a Question,
        number: usize,
        total: usize,
        selected: Option<usize>,
        theme: &'a Theme,
    ) -> Self {
        Self {
            question,
            number,
            total,
            selected,
            feedback: None,
            theme,
        }
    }

    pub fn feedback(mut self, option_index: usize, correct: bool) -> Self {
        self.feedback = Some((option_index, correct));
        self.selected = None;
        self
    }

    fn progress_line(&self) -> Line<'static> {
        let colors = &self.theme.colors;
        let mut spans = Vec::with_capacity(self.total * 2);
        for i in 1..=self.total {
            let color = if i < self.number {
                colors.success()
            } else if i == self.number {
                colors.accent()
            } else {
                colors.border()
            };
            spans.push(Span::styled(SEGMENT, Style::default().fg(color)));
            spans.push(Span::raw(" "));
        }
        spans.push(Span::styled(
            format!(" {}/{}", self.number, self.total),
            Style::default().fg(colors.text_muted()),
        ));
        Line::from(spans)
    }
}

impl Widget for QuizGauntlet<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let colors = &self.theme.colors;

        let block = Block::bordered()
            .title(" The Gauntlet ")
            .border_style(Style::default().fg(colors.border_focused()))
            .padding(Padding::horizontal(2))
            .style(Style::default().bg(colors.bg()));
        let inner = block.inner(area);
        block.render(area, buf);

        let option_rows = self.question.options.len() as u16 * 2;
        let layout = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(1),
                Constraint::Length(1),
                Constraint::Length(1),
                Constraint::Min(2),
                Constraint::Length(option_rows),
            ])
            .split(inner);

        Paragraph::new(self.progress_line()).render(layout[0], buf);

        let difficulty = self.question.difficulty;
        Paragraph::new(Line::from(Span::styled(
            difficulty.label(),
            Style::default()
                .fg(colors.difficulty(difficulty))
                .add_modifier(Modifier::BOLD),
        )))
        .render(layout[1], buf);

        Paragraph::new(self.question.text.as_str())
            .style(Style::default().fg(colors.fg()).add_modifier(Modifier::BOLD))
            .wrap(Wrap { trim: true })
            .render(layout[3], buf);

        let option_layout = Layout::default()
            .direction(Direction::Vertical)
            .constraints(
                self.question
                    .options
                    .iter()
                    .map(|_| Constraint::Length(2))
                    .collect::<Vec<_>>(),
            )
            .split(layout[4]);

        for (i, option) in self.question.options.iter().enumerate() {
            let (indicator, style) = match self.feedback {
                Some((answered, correct)) if answered == i => {
                    let (icon, color) = if correct {
                        ("\u{2714}", colors.success())
                    } else {
                        ("\u{2718}", colors.error())
                    };
                    (
                        icon,
                        Style::default()
                            .fg(color)
                            .bg(colors.option_selected_bg())
                            .add_modifier(Modifier::BOLD),
                    )
                }
                _ if self.selected == Some(i) => (
                    ">",
                    Style::default()
                        .fg(colors.accent())
                        .bg(colors.option_selected_bg())
                        .add_modifier(Modifier::BOLD),
                ),
                _ => (" ", Style::default().fg(colors.fg())),
            };
            let line = Line::from(vec![
                Span::styled(format!(" {indicator} [{}] ", option.id), style),
                Span::styled(option.text.as_str(), style),
            ]);
            if i < option_layout.len() {
                Paragraph::new(line).render(option_layout[i], buf);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generator::fallback::fallback_puzzle;
    use chrono::NaiveDate;

    fn buffer(gauntlet: QuizGauntlet) -> Buffer {
        let area = Rect::new(0, 0, 60, 20);
        let mut buf = Buffer::empty(area);
        gauntlet.render(area, &mut buf);
        buf
    }

    fn row_containing(buf: &Buffer, needle: &str) -> Option<(u16, String)> {
        let area = buf.area;
        (area.top()..area.bottom()).find_map(|y| {
            let row: String = (area.left()..area.right())
                .map(|x| buf[(x, y)].symbol())
                .collect();
            row.contains(needle).then_some((y, row))
        })
    }

    #[test]
    fn selected_option_has_cursor() {
        let puzzle = fallback_puzzle(NaiveDate::from_ymd_opt(2024, 3, 1).unwrap());
        let theme = Theme::default();
        let q = &puzzle.questions[0];
        let buf = buffer(QuizGauntlet::new(q, 1, 3, Some(1), &theme));
        let (_, row) = row_containing(&buf, "[B]").unwrap();
        assert!(row.contains("> [B]"));
        assert!(row_containing(&buf, "1/3").is_some());
    }

    #[test]
    fn wrong_answer_marked_in_error_color() {
        let puzzle = fallback_puzzle(NaiveDate::from_ymd_opt(2024, 3, 1).unwrap());
        let theme = Theme::default();
        let q = &puzzle.questions[0];
        let buf = buffer(QuizGauntlet::new(q, 1, 3, Some(0), &theme).feedback(0, false));
        let (y, row) = row_containing(&buf, "[A]").unwrap();
        assert!(row.contains("\u{2718} [A]"));
        assert!(!row.contains('>'));
        let x = row.chars().position(|c| c == '[').unwrap() as u16;
        assert_eq!(buf[(x, y)].fg, theme.colors.error());
    }

    #[test]
    fn right_answer_marked_in_success_color() {
        let puzzle = fallback_puzzle(NaiveDate::from_ymd_opt(2024, 3, 1).unwrap());
        let theme = Theme::default();
        let q = &puzzle.questions[0];
        let buf = buffer(QuizGauntlet::new(q, 1, 3, None, &theme).feedback(1, true));
        let (y, row) = row_containing(&buf, "[B]").unwrap();
        assert!(row.contains("\u{2714} [B]"));
        let x = row.chars().position(|c| c == '[').unwrap() as u16;
        assert_eq!(buf[(x, y)].fg, theme.colors.success());
    }
}
