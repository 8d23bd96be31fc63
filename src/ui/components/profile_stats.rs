use ratatui::buffer::Buffer;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Bar, BarChart, BarGroup, Block, Paragraph, Widget};

use crate::store::schema::{HistoryEntry, Outcome, UserStats};
use crate::ui::theme::Theme;

/// How many history entries the chart covers.
pub const CHART_DAYS: usize = 7;

pub struct ProfileStats<'a> {
    pub stats: &'a UserStats,
    pub theme: &'a Theme,
}

impl<'a> ProfileStats<'a> {
    pub fn new(stats: &'a UserStats, theme: &'a Theme) -> Self {
        Self { stats, theme }
    }

    fn stat_line(&self, label: &str, value: String) -> Line<'static> {
        let colors = &self.theme.colors;
        Line::from(vec![
            Span::styled(format!("  {label:<16}"), Style::default().fg(colors.text_muted())),
            Span::styled(
                value,
                Style::default()
                    .fg(colors.accent())
                    .add_modifier(Modifier::BOLD),
            ),
        ])
    }

    fn bar(&self, entry: &HistoryEntry) -> Bar<'static> {
        let colors = &self.theme.colors;
        let color = match entry.outcome {
            Outcome::Won => colors.bar_won(),
            Outcome::Lost => colors.bar_lost(),
        };
        Bar::default()
            .value(u64::from(entry.points))
            .label(Line::from(chart_label(entry)))
            .text_value(entry.points.to_string())
            .style(Style::default().fg(color))
    }
}

/// `MM/DD` label for a history entry.
pub fn chart_label(entry: &HistoryEntry) -> String {
    entry.date.format("%m/%d").to_string()
}

impl Widget for ProfileStats<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let colors = &self.theme.colors;

        let block = Block::bordered()
            .title(" Scholar's Record ")
            .border_style(Style::default().fg(colors.border_focused()))
            .style(Style::default().bg(colors.bg()));
        let inner = block.inner(area);
        block.render(area, buf);

        let layout = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(1),
                Constraint::Length(4),
                Constraint::Length(1),
                Constraint::Min(5),
            ])
            .split(inner);

        let stats = self.stats;
        let lines = vec![
            self.stat_line("Total points", stats.total_points.to_string()),
            self.stat_line("Current streak", format!("{} days", stats.current_streak)),
            self.stat_line("Games played", stats.games_played().to_string()),
            self.stat_line("Win rate", format!("{:.0}%", stats.win_rate() * 100.0)),
        ];
        Paragraph::new(lines).render(layout[1], buf);

        let recent = stats.recent(CHART_DAYS);
        if recent.is_empty() {
            Paragraph::new(Line::from(Span::styled(
                "  No mysteries attempted yet.",
                Style::default().fg(colors.text_muted()),
            )))
            .render(layout[3], buf);
            return;
        }

        let bars: Vec<Bar> = recent.iter().map(|e| self.bar(e)).collect();
        BarChart::default()
            .block(
                Block::bordered()
                    .title(" Last 7 Mysteries ")
                    .border_style(Style::default().fg(colors.border())),
            )
            .data(BarGroup::default().bars(&bars))
            .bar_width(5)
            .bar_gap(2)
            .max(100)
            .value_style(Style::default().fg(colors.fg()).add_modifier(Modifier::BOLD))
            .label_style(Style::default().fg(colors.text_muted()))
            .render(layout[3], buf);
    }
}
