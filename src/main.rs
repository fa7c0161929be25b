use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use crossterm::event::{
    self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEventKind, MouseButton,
    MouseEvent, MouseEventKind,
};
use crossterm::execute;
use homicide_map::app::App;
use homicide_map::config::{AppConfig, LoggingConfig};
use homicide_map::dashboard::{render_report, DashboardView};
use homicide_map::data::{self, Dataset, GeoFeature};
use homicide_map::map::ChoroplethRenderer;
use homicide_map::stats::{RankingAxis, Selection};
use homicide_map::ui;
use ratatui::layout::Rect;
use ratatui::DefaultTerminal;
use std::fs::OpenOptions;
use std::num::NonZeroUsize;
use std::path::PathBuf;
use std::sync::Mutex;
use std::time::Duration;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "homicide-map", version, about = "Colombian municipal homicide statistics, 2024")]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,

    /// Path to the TOML configuration (defaults to ./config.toml if present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Department selected at start
    #[arg(long, global = true)]
    department: Option<String>,

    /// Municipality selected at start, within the department
    #[arg(long, global = true)]
    municipality: Option<String>,

    /// Number of municipalities in each ranking
    #[arg(long, global = true)]
    top: Option<NonZeroUsize>,
}

#[derive(Subcommand, Debug, Clone, Copy)]
enum Command {
    /// Interactive terminal dashboard (default)
    Dashboard,
    /// Print the dashboard views for one selection as text
    Report,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = AppConfig::resolve(cli.config.as_deref())?;
    let command = cli.command.unwrap_or(Command::Dashboard);

    init_logging(&config.logging, matches!(command, Command::Report))?;

    // Load everything before the terminal is taken over so errors stay readable
    let dataset = data::load_dataset(&config.input.records_csv).with_context(|| {
        format!("Failed to load records from {}", config.input.records_csv.display())
    })?;
    let selection = initial_selection(&dataset, cli.department.as_deref(), cli.municipality.as_deref())?;
    let top_n = cli.top.unwrap_or(config.display.top_n);

    match command {
        Command::Report => {
            let view = DashboardView::build(&dataset, &selection, RankingAxis::default(), top_n);
            print!("{}", render_report(&view));
            Ok(())
        }
        Command::Dashboard => {
            let features = load_boundaries(&config)?;
            let renderer = ChoroplethRenderer::new(features, config.display.gamma);
            let app = App::new(dataset, renderer, selection, top_n);
            run_terminal(app)
        }
    }
}

/// The terminal UI owns stdout, so the dashboard logs to a file
fn init_logging(config: &LoggingConfig, to_stderr: bool) -> Result<()> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(&config.level)
            .with_context(|| format!("Invalid log level: {}", config.level))?,
    };
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_ansi(false)
        .with_target(false);

    if to_stderr {
        builder.with_writer(std::io::stderr).init();
    } else {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&config.file)
            .with_context(|| format!("Failed to open log file {}", config.file.display()))?;
        builder.with_writer(Mutex::new(file)).init();
    }
    Ok(())
}

fn initial_selection(
    dataset: &Dataset,
    department: Option<&str>,
    municipality: Option<&str>,
) -> Result<Selection> {
    let mut selection = match department {
        Some(department) => Selection::for_department(dataset, department)
            .with_context(|| format!("Unknown department: {}", department))?,
        None => Selection::first(dataset)?,
    };
    if let Some(municipality) = municipality {
        selection
            .set_municipality(municipality)
            .with_context(|| format!("Invalid selection: {}", municipality))?;
    }
    Ok(selection)
}

fn load_boundaries(config: &AppConfig) -> Result<Vec<GeoFeature>> {
    let Some(path) = &config.input.boundaries else {
        info!("no boundary file configured, map disabled");
        return Ok(Vec::new());
    };
    if !path.exists() {
        warn!(path = %path.display(), "boundary file not found, map disabled");
        return Ok(Vec::new());
    }
    data::load_features(path, &config.input.properties)
        .with_context(|| format!("Failed to load boundaries from {}", path.display()))
}

fn run_terminal(mut app: App) -> Result<()> {
    // Initialize terminal
    let mut terminal = ratatui::init();
    terminal.clear()?;

    // Enable mouse capture
    execute!(std::io::stdout(), EnableMouseCapture)?;

    // Run the app
    let result = run(&mut terminal, &mut app);

    // Disable mouse capture and restore terminal
    let _ = execute!(std::io::stdout(), DisableMouseCapture);
    ratatui::restore();

    result
}

/// Map terminal cell to map canvas pixel, if the cell is on the map
fn map_pixel(map: Rect, column: u16, row: u16) -> Option<(i32, i32)> {
    if column < map.x || row < map.y || column >= map.right() || row >= map.bottom() {
        return None;
    }
    Some(((column - map.x) as i32 * 2, (row - map.y) as i32 * 4))
}

/// Handle mouse events for panning, zooming and picking
fn handle_mouse(app: &mut App, mouse: MouseEvent, map: Rect) {
    let pixel = map_pixel(map, mouse.column, mouse.row);

    match (mouse.kind, pixel) {
        // Scroll wheel for zooming towards mouse position
        (MouseEventKind::ScrollUp, Some((px, py))) => app.zoom_in_at(px, py),
        (MouseEventKind::ScrollDown, Some((px, py))) => app.zoom_out_at(px, py),
        // Horizontal scroll for panning (trackpad two-finger swipe)
        (MouseEventKind::ScrollLeft, Some(_)) => app.pan(-15, 0),
        (MouseEventKind::ScrollRight, Some(_)) => app.pan(15, 0),
        // Click and drag to pan
        (MouseEventKind::Down(MouseButton::Left), Some(pixel)) => {
            app.last_mouse = Some(pixel);
        }
        (MouseEventKind::Drag(MouseButton::Left), _) if app.last_mouse.is_some() => {
            let px = (mouse.column as i32 - map.x as i32) * 2;
            let py = (mouse.row as i32 - map.y as i32) * 4;
            app.handle_drag(px, py);
        }
        (MouseEventKind::Up(MouseButton::Left), _) => {
            app.end_drag();
        }
        // Right click selects the municipality under the cursor
        (MouseEventKind::Down(MouseButton::Right), Some((px, py))) => {
            app.select_at(px, py);
        }
        _ => {}
    }
}

fn run(terminal: &mut DefaultTerminal, app: &mut App) -> Result<()> {
    let size = terminal.size()?;
    let mut map_area = ui::map_inner_area(Rect::new(0, 0, size.width, size.height));
    app.resize(map_area.width as usize * 2, map_area.height as usize * 4);
    app.reset_view();

    info!(
        records = app.dataset.records().len(),
        features = app.map.features().len(),
        "dashboard started"
    );

    // Main loop
    loop {
        // Draw
        terminal.draw(|frame| ui::render(frame, app))?;

        // Handle events with ~60fps target
        if event::poll(Duration::from_millis(16))? {
            match event::read()? {
                Event::Key(key) => {
                    // Only handle key press events (not release)
                    if key.kind == KeyEventKind::Press {
                        match key.code {
                            KeyCode::Char('q') | KeyCode::Esc => app.quit(),

                            // Focus between lists and map
                            KeyCode::Tab => app.focus_next(),
                            KeyCode::BackTab => app.focus_prev(),

                            // Move the focused list, or pan the map
                            KeyCode::Up | KeyCode::Char('k') => app.move_vertical(-1),
                            KeyCode::Down | KeyCode::Char('j') => app.move_vertical(1),
                            KeyCode::Left | KeyCode::Char('h') => app.pan(-10, 0),
                            KeyCode::Right | KeyCode::Char('l') => app.pan(10, 0),

                            // Zoom
                            KeyCode::Char('+') | KeyCode::Char('=') => app.zoom_in(),
                            KeyCode::Char('-') | KeyCode::Char('_') => app.zoom_out(),

                            // Rankings
                            KeyCode::Char('m') => app.toggle_axis(),
                            KeyCode::Char('[') => app.shrink_n(),
                            KeyCode::Char(']') => app.grow_n(),

                            // Reset view
                            KeyCode::Char('r') | KeyCode::Char('0') => app.reset_view(),

                            _ => {}
                        }
                    }
                }
                Event::Mouse(mouse) => {
                    handle_mouse(app, mouse, map_area);
                }
                Event::Resize(width, height) => {
                    map_area = ui::map_inner_area(Rect::new(0, 0, width, height));
                    app.resize(map_area.width as usize * 2, map_area.height as usize * 4);
                }
                _ => {}
            }
        }

        if app.should_quit {
            break;
        }
    }

    info!("dashboard closed");
    Ok(())
}
