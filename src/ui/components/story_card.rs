use std::rc::Rc;

use ratatui::buffer::Buffer;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Padding, Paragraph, Widget, Wrap};

use crate::session::puzzle::DailyPuzzle;
use crate::ui::theme::Theme;

/// The day's story, scrolled by `scroll` rows.
pub struct StoryCard<'a> {
    pub puzzle: &'a DailyPuzzle,
    pub scroll: u16,
    pub theme: &'a Theme,
}

impl<'a> StoryCard<'a> {
    pub fn new(puzzle: &'a DailyPuzzle, scroll: u16, theme: &'a Theme) -> Self {
        Self {
            puzzle,
            scroll,
            theme,
        }
    }

    /// Largest useful scroll offset for `puzzle` drawn into `area`: the last
    /// wrapped row of the story sits on the bottom row of the card.
    pub fn max_scroll(puzzle: &DailyPuzzle, area: Rect) -> u16 {
        let body = sections(area)[3];
        let rows = story_paragraph(puzzle).line_count(body.width);
        u16::try_from(rows)
            .unwrap_or(u16::MAX)
            .saturating_sub(body.height)
    }
}

fn frame_block() -> Block<'static> {
    Block::bordered().padding(Padding::horizontal(2))
}

/// Title, lunar date, spacer and story body inside the card border.
fn sections(area: Rect) -> Rc<[Rect]> {
    Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Min(1),
        ])
        .split(frame_block().inner(area))
}

fn story_paragraph(puzzle: &DailyPuzzle) -> Paragraph<'_> {
    Paragraph::new(puzzle.story.as_str()).wrap(Wrap { trim: true })
}

impl Widget for StoryCard<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let colors = &self.theme.colors;

        frame_block()
            .title(" Mystery of the Day ")
            .border_style(Style::default().fg(colors.border_focused()))
            .style(Style::default().bg(colors.bg()))
            .render(area, buf);
        let layout = sections(area);

        Paragraph::new(Line::from(Span::styled(
            self.puzzle.title.as_str(),
            Style::default()
                .fg(colors.accent())
                .add_modifier(Modifier::BOLD),
        )))
        .alignment(Alignment::Center)
        .render(layout[0], buf);

        Paragraph::new(Line::from(Span::styled(
            self.puzzle.lunar_date.as_str(),
            Style::default()
                .fg(colors.text_muted())
                .add_modifier(Modifier::ITALIC),
        )))
        .alignment(Alignment::Center)
        .render(layout[1], buf);

        let scroll = self.scroll.min(Self::max_scroll(self.puzzle, area));
        story_paragraph(self.puzzle)
            .style(Style::default().fg(colors.fg()))
            .scroll((scroll, 0))
            .render(layout[3], buf);
    }
}
