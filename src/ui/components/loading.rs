use ratatui::buffer::Buffer;
use ratatui::layout::{Alignment, Constraint, Flex, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Paragraph, Widget};

use crate::ui::theme::Theme;

pub struct LoadingScreen<'a> {
    pub theme: &'a Theme,
}

impl<'a> LoadingScreen<'a> {
    pub fn new(theme: &'a Theme) -> Self {
        Self { theme }
    }
}

impl Widget for LoadingScreen<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let colors = &self.theme.colors;
        let [center] = Layout::vertical([Constraint::Length(4)])
            .flex(Flex::Center)
            .areas(area);

        let lines = vec![
            Line::from(Span::styled(
                "\u{25cc}",
                Style::default().fg(colors.accent_dim()),
            )),
            Line::from(Span::styled(
                "D I V I N I N G   T H E   F U T U R E",
                Style::default()
                    .fg(colors.accent())
                    .add_modifier(Modifier::BOLD),
            )),
            Line::from(""),
            Line::from(Span::styled(
                "Consulting the Oracle...",
                Style::default().fg(colors.text_muted()),
            )),
        ];
        Paragraph::new(lines)
            .alignment(Alignment::Center)
            .render(center, buf);
    }
}
