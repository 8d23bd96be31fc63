use ratatui::buffer::Buffer;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Paragraph, Widget, Wrap};

use crate::engine::game::DisplayedResult;
use crate::store::schema::Outcome;
use crate::ui::theme::Theme;

pub struct ResultView<'a> {
    /// `None` when today was played but no history entry survived.
    pub result: Option<DisplayedResult>,
    pub countdown: Option<&'a str>,
    pub theme: &'a Theme,
}

impl<'a> ResultView<'a> {
    pub fn new(result: Option<DisplayedResult>, countdown: Option<&'a str>, theme: &'a Theme) -> Self {
        Self {
            result,
            countdown,
            theme,
        }
    }
}

impl Widget for ResultView<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let colors = &self.theme.colors;
        let won = self.result.is_some_and(|r| r.outcome == Outcome::Won);
        let accent = match self.result.map(|r| r.outcome) {
            Some(Outcome::Won) => colors.accent(),
            Some(Outcome::Lost) => colors.error(),
            None => colors.text_muted(),
        };

        let block = Block::bordered()
            .title(" Today's Fate ")
            .border_style(Style::default().fg(accent))
            .style(Style::default().bg(colors.bg()));
        let inner = block.inner(area);
        block.render(area, buf);

        let layout = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(1),
                Constraint::Length(2),
                Constraint::Length(3),
                Constraint::Length(2),
                Constraint::Length(2),
                Constraint::Min(0),
                Constraint::Length(1),
            ])
            .split(inner);

        let (headline, message) = match self.result.map(|r| r.outcome) {
            Some(Outcome::Won) => (
                "DESTINY FULFILLED",
                "The dragon nods in approval. Your wisdom pierces the veil of mystery.",
            ),
            Some(Outcome::Lost) => (
                "LOST IN THE MIST",
                "The path remains shrouded. The spirits are silent. Meditate and return tomorrow.",
            ),
            None => (
                "THE SCROLL IS CLOSED",
                "Today's mystery has already been attempted. Return tomorrow.",
            ),
        };

        Paragraph::new(Line::from(Span::styled(
            headline,
            Style::default().fg(accent).add_modifier(Modifier::BOLD),
        )))
        .alignment(Alignment::Center)
        .render(layout[1], buf);

        Paragraph::new(message)
            .style(Style::default().fg(colors.fg()))
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true })
            .render(layout[2], buf);

        if let Some(result) = self.result {
            let points = if won {
                format!("+{}", result.points)
            } else {
                "0".to_string()
            };
            let verdict = if won { "VICTORY" } else { "DEFEAT" };
            let line = Line::from(vec![
                Span::styled("Points ", Style::default().fg(colors.text_muted())),
                Span::styled(
                    points,
                    Style::default().fg(accent).add_modifier(Modifier::BOLD),
                ),
                Span::styled("    Result ", Style::default().fg(colors.text_muted())),
                Span::styled(
                    verdict,
                    Style::default().fg(accent).add_modifier(Modifier::BOLD),
                ),
            ]);
            Paragraph::new(line)
                .alignment(Alignment::Center)
                .render(layout[3], buf);
        }

        if let Some(remaining) = self.countdown {
            let line = Line::from(vec![
                Span::styled("Next mystery in ", Style::default().fg(colors.text_muted())),
                Span::styled(
                    remaining,
                    Style::default()
                        .fg(colors.warning())
                        .add_modifier(Modifier::BOLD),
                ),
            ]);
            Paragraph::new(line)
                .alignment(Alignment::Center)
                .render(layout[4], buf);
        }
    }
}
