use std::io;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use chrono::{Local, NaiveDate, NaiveDateTime};
use clap::Parser;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Paragraph};
use tracing::{error, info, warn};

use eastern_mysteries::app::{App, AppView};
use eastern_mysteries::config::Config;
use eastern_mysteries::engine::GameStatus;
use eastern_mysteries::engine::game::Game;
use eastern_mysteries::event::{AppEvent, EventHandler};
use eastern_mysteries::generator::ConfiguredProvider;
use eastern_mysteries::logging;
use eastern_mysteries::store::KvStore;
use eastern_mysteries::store::file_store::FileStore;
use eastern_mysteries::store::persistence::Persistence;
use eastern_mysteries::ui::components::loading::LoadingScreen;
use eastern_mysteries::ui::components::profile_stats::ProfileStats;
use eastern_mysteries::ui::components::quiz_gauntlet::QuizGauntlet;
use eastern_mysteries::ui::components::result_view::ResultView;
use eastern_mysteries::ui::components::story_card::StoryCard;
use eastern_mysteries::ui::layout::{AppLayout, centered_rect, pack_hint_lines};
use eastern_mysteries::ui::theme::Theme;

type Term = Terminal<CrosstermBackend<io::Stdout>>;

#[derive(Parser)]
#[command(
    name = "eastern-mysteries",
    version,
    about = "A daily riddle of Eastern myth, three questions deep"
)]
struct Cli {
    #[arg(short, long, help = "Theme name")]
    theme: Option<String>,

    #[arg(short, long, help = "Play as if today were this date (YYYY-MM-DD)")]
    date: Option<NaiveDate>,

    #[arg(long, help = "Never call the puzzle provider; use the fallback puzzle")]
    offline: bool,

    #[arg(long, help = "Directory holding stats, cached puzzles and the log")]
    data_dir: Option<PathBuf>,

    #[arg(long, help = "Erase saved stats before starting")]
    reset_stats: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let first_run = !Config::config_path().exists();
    let mut config = Config::load()?;
    config.normalize();

    let data_dir = cli
        .data_dir
        .unwrap_or_else(|| config.resolved_data_dir());
    let log_path = logging::init(&data_dir, &config.log_level)?;
    info!(log = %log_path.display(), data_dir = %data_dir.display(), "starting");
    if first_run {
        match config.save() {
            Ok(()) => info!(path = %Config::config_path().display(), "wrote default config"),
            Err(e) => warn!(error = %e, "could not write default config"),
        }
    }
    if let Some(theme) = cli.theme {
        config.theme = theme;
    }

    let store = FileStore::with_base_dir(data_dir)?;
    let persistence = Persistence::new(store);

    let rt = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("building async runtime")?;

    if cli.reset_stats {
        rt.block_on(persistence.reset_stats())?;
        info!("stats reset");
    }

    let today = cli.date.unwrap_or_else(|| Local::now().date_naive());
    let provider = ConfiguredProvider::from_config(&config, cli.offline);
    let game = Game::new(persistence, today).with_cache_retention(config.cache_retention_days);

    let loaded_theme = Theme::load(&config.theme).unwrap_or_default();
    let theme: &'static Theme = Box::leak(Box::new(loaded_theme));
    let mut app = App::new(game, theme);

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = run_app(&mut terminal, &mut app, &rt, &provider);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(err) = result {
        error!(error = ?err, "exited with error");
        eprintln!("Error: {err:?}");
    }

    Ok(())
}

fn run_app<S: KvStore>(
    terminal: &mut Term,
    app: &mut App<S>,
    rt: &tokio::runtime::Runtime,
    provider: &ConfiguredProvider,
) -> Result<()> {
    // Input is not read until the day's state is known.
    terminal.draw(|frame| render(frame, app))?;
    rt.block_on(app.game.load(provider))?;
    app.sync_countdown(now());

    let events = EventHandler::new(Duration::from_millis(250));
    loop {
        terminal.draw(|frame| render(frame, app))?;

        match events.next()? {
            AppEvent::Key(key) => handle_key(app, rt, key),
            AppEvent::Tick | AppEvent::Resize => {}
        }
        app.on_tick(now());

        if app.should_quit {
            info!("quitting");
            return Ok(());
        }
    }
}

fn now() -> NaiveDateTime {
    Local::now().naive_local()
}

fn handle_key<S: KvStore>(app: &mut App<S>, rt: &tokio::runtime::Runtime, key: KeyEvent) {
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        app.should_quit = true;
        return;
    }

    match key.code {
        KeyCode::Char('q') | KeyCode::Esc => {
            app.should_quit = true;
            return;
        }
        KeyCode::Char('g') => {
            app.show_view(AppView::Game, now());
            return;
        }
        KeyCode::Char('p') => {
            app.show_view(AppView::Profile, now());
            return;
        }
        _ => {}
    }

    if app.view != AppView::Game || app.dismiss_feedback(now()) {
        return;
    }
    match app.game.status() {
        GameStatus::Reading => handle_story_key(app, key),
        GameStatus::Quiz => handle_quiz_key(app, rt, key),
        GameStatus::Loading
        | GameStatus::Won
        | GameStatus::Lost
        | GameStatus::AlreadyPlayed => {}
    }
}

fn handle_story_key<S: KvStore>(app: &mut App<S>, key: KeyEvent) {
    match key.code {
        KeyCode::Enter | KeyCode::Char('s') => app.start_quiz(),
        KeyCode::Down | KeyCode::Char('j') => app.scroll_story(1),
        KeyCode::Up | KeyCode::Char('k') => app.scroll_story(-1),
        KeyCode::PageDown => app.scroll_story(10),
        KeyCode::PageUp => app.scroll_story(-10),
        _ => {}
    }
}

fn handle_quiz_key<S: KvStore>(app: &mut App<S>, rt: &tokio::runtime::Runtime, key: KeyEvent) {
    match key.code {
        KeyCode::Down | KeyCode::Char('j') => app.select_next(),
        KeyCode::Up | KeyCode::Char('k') => app.select_prev(),
        KeyCode::Enter => {
            rt.block_on(app.submit_answer(now()));
        }
        KeyCode::Char(ch) => app.select_by_key(ch),
        _ => {}
    }
}

fn render<S: KvStore>(frame: &mut ratatui::Frame, app: &mut App<S>) {
    let area = frame.area();
    let theme = app.theme;
    let colors = &theme.colors;
    frame.render_widget(Block::default().style(Style::default().bg(colors.bg())), area);

    let hints = footer_hints(app);
    let mut footer_lines = pack_hint_lines(&hints, area.width as usize);
    if let Some(notice) = app.save_notice() {
        footer_lines.push(format!("  {notice}"));
    }
    let layout = AppLayout::new(area, footer_lines.len() as u16);

    render_header(frame, app, layout.header);

    let main = centered_rect(70, 90, layout.main);
    match app.view {
        AppView::Profile => {
            frame.render_widget(ProfileStats::new(app.game.stats(), app.theme), main);
        }
        AppView::Game => render_game(frame, app, main),
    }

    let notice_style = Style::default().fg(colors.error());
    let hint_style = Style::default().fg(colors.text_muted());
    let has_notice = app.save_notice().is_some();
    let last = footer_lines.len().saturating_sub(1);
    let lines: Vec<Line> = footer_lines
        .into_iter()
        .enumerate()
        .map(|(i, text)| {
            let style = if has_notice && i == last {
                notice_style
            } else {
                hint_style
            };
            Line::from(Span::styled(text, style))
        })
        .collect();
    frame.render_widget(Paragraph::new(lines), layout.footer);
}

fn render_game<S: KvStore>(
    frame: &mut ratatui::Frame,
    app: &mut App<S>,
    area: ratatui::layout::Rect,
) {
    if let Some(feedback) = &app.feedback {
        let total = app.game.puzzle().map_or(0, |p| p.question_count());
        let gauntlet = QuizGauntlet::new(
            &feedback.question,
            feedback.number,
            total,
            None,
            app.theme,
        )
        .feedback(feedback.option_index, feedback.correct);
        frame.render_widget(gauntlet, area);
        return;
    }

    let max_scroll = match app.game.puzzle() {
        Some(puzzle) if app.game.status() == GameStatus::Reading => {
            StoryCard::max_scroll(puzzle, area)
        }
        _ => 0,
    };
    app.set_story_max_scroll(max_scroll);

    let game = &app.game;
    match game.status() {
        GameStatus::Loading => frame.render_widget(LoadingScreen::new(app.theme), area),
        GameStatus::Reading => {
            if let Some(puzzle) = game.puzzle() {
                frame.render_widget(StoryCard::new(puzzle, app.story_scroll, app.theme), area);
            }
        }
        GameStatus::Quiz => {
            if let (Some(puzzle), Some(question)) = (game.puzzle(), game.current_question()) {
                let gauntlet = QuizGauntlet::new(
                    question,
                    game.state().current_question_index + 1,
                    puzzle.question_count(),
                    app.selection.selected_index(),
                    app.theme,
                );
                frame.render_widget(gauntlet, area);
            }
        }
        GameStatus::Won | GameStatus::Lost | GameStatus::AlreadyPlayed => {
            let view = ResultView::new(game.displayed_result(), app.countdown.text(), app.theme);
            frame.render_widget(view, area);
        }
    }
}

fn render_header<S: KvStore>(
    frame: &mut ratatui::Frame,
    app: &App<S>,
    area: ratatui::layout::Rect,
) {
    let colors = &app.theme.colors;
    let tab = |label: &'static str, view: AppView| {
        let style = if app.view == view {
            Style::default()
                .fg(colors.accent())
                .bg(colors.header_bg())
                .add_modifier(Modifier::BOLD | Modifier::UNDERLINED)
        } else {
            Style::default().fg(colors.header_fg()).bg(colors.header_bg())
        };
        Span::styled(label, style)
    };

    let stats = app.game.stats();
    let info = format!(
        "  {} | {} pts | {} day streak",
        app.game.today().format("%Y-%m-%d"),
        stats.total_points,
        stats.current_streak,
    );
    let header = Paragraph::new(Line::from(vec![
        Span::styled(
            " Eastern Mysteries ",
            Style::default()
                .fg(colors.header_fg())
                .bg(colors.header_bg())
                .add_modifier(Modifier::BOLD),
        ),
        tab(" [g] Game ", AppView::Game),
        tab(" [p] Profile ", AppView::Profile),
        Span::styled(
            info,
            Style::default().fg(colors.text_muted()).bg(colors.header_bg()),
        ),
    ]))
    .style(Style::default().bg(colors.header_bg()));
    frame.render_widget(header, area);
}

fn footer_hints<S: KvStore>(app: &App<S>) -> Vec<&'static str> {
    let mut hints = Vec::new();
    if app.view == AppView::Game && app.feedback.is_some() {
        hints.push("[any key] Continue");
    } else if app.view == AppView::Game {
        match app.game.status() {
            GameStatus::Reading => {
                hints.push("[Enter/s] Begin the trial");
                hints.push("[j/k] Scroll");
            }
            GameStatus::Quiz => {
                hints.push("[j/k] Choose");
                hints.push("[A-D] Pick option");
                hints.push("[Enter] Answer");
            }
            _ => {}
        }
    }
    hints.push("[g] Game");
    hints.push("[p] Profile");
    hints.push("[q] Quit");
    hints
}
