use anyhow::{Context as _, Result};
use clap::Parser;
use crossterm::{
    ExecutableCommand,
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind},
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use epochwatch::{
    app::App,
    config::{Cli, Command, DashboardArgs, FileConfig, ProbeSettings, Settings},
    contexts::Context,
    notify::Silent,
    probe::{ProbeMode, Prober, StatusLogWriter},
    snapshot,
    widgets::{help::Help, status_bar::StatusBar},
};
use ratatui::{
    Frame, Terminal,
    backend::{Backend, CrosstermBackend},
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    widgets::{Block, Borders, Paragraph, Tabs},
};
use std::io::{Stdout, stdout};
use std::path::Path;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let file = cli.load_file()?;

    match cli.command {
        None => run_dashboard(&DashboardArgs::default(), &file).await,
        Some(Command::Dashboard(ref args)) => run_dashboard(args, &file).await,
        Some(Command::Snapshot {
            ref dashboard,
            ref output,
        }) => run_snapshot(dashboard, &file, output.as_deref()).await,
        Some(Command::Probe(ref args)) => {
            init_stderr_tracing();
            let settings = ProbeSettings::resolve(args, &file)?;
            run_probe(settings).await
        }
    }
}

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
}

fn init_stderr_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(env_filter())
        .with_writer(std::io::stderr)
        .init();
}

/// The dashboard owns the terminal, so diagnostics go to a file
fn init_file_tracing(path: &Path) -> Result<()> {
    let file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("cannot open log file {}", path.display()))?;

    tracing_subscriber::fmt()
        .with_env_filter(env_filter())
        .with_ansi(false)
        .with_writer(std::sync::Mutex::new(file))
        .init();
    Ok(())
}

async fn run_dashboard(args: &DashboardArgs, file: &FileConfig) -> Result<()> {
    let settings = Settings::resolve(args, file)?;
    init_file_tracing(&settings.log_file)?;

    // Setup terminal
    let mut terminal = setup_terminal()?;

    let mut app = match App::new(&settings) {
        Ok(app) => app,
        Err(e) => {
            restore_terminal(terminal)?;
            eprintln!("Failed to initialize: {}", e);
            return Err(e.into());
        }
    };

    // Run app
    let result = run_app(&mut terminal, &mut app).await;
    app.shutdown();

    // Restore terminal
    restore_terminal(terminal)?;

    result
}

async fn run_snapshot(
    args: &DashboardArgs,
    file: &FileConfig,
    output: Option<&Path>,
) -> Result<()> {
    init_stderr_tracing();
    let settings = Settings::resolve(args, file)?;
    let page = snapshot::take(&settings).await?;

    match output {
        Some(path) => {
            tokio::fs::write(path, page)
                .await
                .with_context(|| format!("cannot write {}", path.display()))?;
            tracing::info!(path = %path.display(), "snapshot written");
        }
        None => print!("{}", page),
    }
    Ok(())
}

async fn run_probe(settings: ProbeSettings) -> Result<()> {
    let writer = StatusLogWriter::new(&settings.output);
    let mut prober = Prober::new(settings.targets, settings.timeout, writer);
    if !settings.notify {
        prober = prober.with_notifier(Silent);
    }

    if settings.once {
        let rows = prober.run_pass(ProbeMode::Once).await?;
        tracing::info!(rows = rows.len(), log = %settings.output.display(), "probe pass written");
        return Ok(());
    }

    let cancel = CancellationToken::new();
    tokio::spawn({
        let cancel = cancel.clone();
        async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                cancel.cancel();
            }
        }
    });

    prober.watch(settings.interval, cancel).await?;
    tracing::info!("probe stopped");
    Ok(())
}

fn setup_terminal() -> Result<Terminal<CrosstermBackend<Stdout>>> {
    let mut stdout = stdout();
    enable_raw_mode()?;
    stdout.execute(EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let terminal = Terminal::new(backend)?;
    Ok(terminal)
}

fn restore_terminal(mut terminal: Terminal<CrosstermBackend<Stdout>>) -> Result<()> {
    disable_raw_mode()?;
    terminal.backend_mut().execute(LeaveAlternateScreen)?;
    Ok(())
}

async fn run_app<B: Backend>(terminal: &mut Terminal<B>, app: &mut App) -> Result<()> {
    let mut last_tick = std::time::Instant::now();
    let tick_rate = std::time::Duration::from_millis(250);

    loop {
        terminal.draw(|f| draw(f, app))?;

        let timeout = tick_rate
            .checked_sub(last_tick.elapsed())
            .unwrap_or_else(|| std::time::Duration::from_secs(0));

        if crossterm::event::poll(timeout)? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    match handle_key(key, app) {
                        Action::Continue => {}
                        Action::Quit => break,
                    }
                }
            }
        }

        if last_tick.elapsed() >= tick_rate {
            app.tick().await;
            last_tick = std::time::Instant::now();
        }
    }

    Ok(())
}

enum Action {
    Continue,
    Quit,
}

fn handle_key(key: KeyEvent, app: &mut App) -> Action {
    if app.show_help() {
        app.handle_key(key);
        return Action::Continue;
    }

    match key.code {
        KeyCode::Char('q') | KeyCode::Char('Q') => return Action::Quit,
        KeyCode::Char('?') => app.toggle_help(),
        KeyCode::Tab => app.next_context(),
        KeyCode::BackTab => app.prev_context(),
        KeyCode::Char('1') => app.set_context(0),
        KeyCode::Char('2') => app.set_context(1),
        KeyCode::Char('t') => app.toggle_theme(),
        KeyCode::Char('r') => app.refresh_now(),
        _ => app.handle_key(key),
    }
    Action::Continue
}

fn draw(f: &mut Frame, app: &App) {
    let palette = app.palette();

    // Paint the whole screen so the light theme does not inherit the terminal background
    f.render_widget(
        Block::default().style(Style::default().fg(palette.foreground).bg(palette.background)),
        f.area(),
    );

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(0)
        .constraints([
            Constraint::Length(3), // Header with tabs
            Constraint::Min(10),   // Main content
            Constraint::Length(1), // Status line
        ])
        .split(f.area());

    draw_header(f, app, chunks[0]);

    // Main content area - delegate to current context
    draw_content(f, app, chunks[1]);

    f.render_widget(
        StatusBar::new(app.source(), app.theme().as_str(), &palette),
        chunks[2],
    );

    if app.show_help() {
        let area = centered_rect(70, 80, f.area());
        f.render_widget(Help::new(app.context_name(), &palette), area);
    }
}

fn draw_header(f: &mut Frame, app: &App, area: Rect) {
    let palette = app.palette();
    let header_layout = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Length(18),
            Constraint::Min(20),
            Constraint::Length(32),
        ])
        .split(area);

    let title = Paragraph::new("📡 EPOCH DASHBOARD")
        .style(
            Style::default()
                .fg(palette.accent)
                .add_modifier(Modifier::BOLD),
        )
        .block(Block::default().borders(Borders::ALL));
    f.render_widget(title, header_layout[0]);

    let tabs = Tabs::new(vec!["[1] Services", "[2] Commits"])
        .select(app.current_context())
        .style(Style::default().fg(palette.foreground))
        .highlight_style(
            Style::default()
                .fg(palette.online)
                .add_modifier(Modifier::BOLD),
        )
        .divider(" | ")
        .block(Block::default().borders(Borders::ALL));
    f.render_widget(tabs, header_layout[1]);

    let updated = Paragraph::new(format!("Updated: {}", app.last_updated().unwrap_or("-")))
        .style(Style::default().fg(palette.muted))
        .block(Block::default().borders(Borders::ALL));
    f.render_widget(updated, header_layout[2]);
}

fn draw_content(f: &mut Frame, app: &App, area: Rect) {
    let palette = app.palette();
    match app.current_context() {
        0 => app.services().draw(f, area, &palette),
        1 => app.commits().draw(f, area, &palette),
        _ => {
            let block = Block::default()
                .borders(Borders::ALL)
                .title(" Unknown Context ");
            let content = Paragraph::new("Unknown context").block(block);
            f.render_widget(content, area);
        }
    }
}

fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}
