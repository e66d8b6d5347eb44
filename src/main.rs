//! BLOCKFALL - a falling-block puzzle for the terminal
//!
//! Stack the shapes, fill the rows, keep the well from overflowing.

mod board;
mod collision;
mod game;
mod history;
mod input;
mod menu;
mod piece;
mod randomizer;
mod score;
mod settings;
mod tetromino;
mod ui;

use crossterm::{
    event::{
        self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyEventKind,
        KeyModifiers, MouseButton, MouseEvent, MouseEventKind,
    },
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use game::{Action, Game, GameState};
use history::History;
use input::{GameInput, KeyBindings};
use menu::{HistoryView, Menu, MenuAction};
use ratatui::{backend::CrosstermBackend, layout::Rect, Terminal};
use settings::Settings;
use std::{
    io::{self, stdout},
    time::{Duration, Instant},
};
use tracing_subscriber::EnvFilter;

/// Target frame rate
const TARGET_FPS: u64 = 60;
const FRAME_DURATION: Duration = Duration::from_micros(1_000_000 / TARGET_FPS);

/// Input delay after game over to prevent accidental menu return
const GAME_OVER_INPUT_DELAY: Duration = Duration::from_secs(2);

/// Application state
enum AppState {
    Menu(Menu),
    Playing(Game, KeyBindings),
    History(HistoryView),
    Help,
}

/// Get the blockfall temp directory, creating it if needed
fn blockfall_temp_dir() -> std::path::PathBuf {
    let dir = std::env::temp_dir().join("blockfall");
    let _ = std::fs::create_dir_all(&dir);
    dir
}

fn main() -> io::Result<()> {
    // Generate session ID for this instance
    let session_id: u32 = rand::random();

    // Setup tracing to log file
    let log_dir = blockfall_temp_dir();
    let log_file = format!("{:08x}.log", session_id);
    let file_appender = tracing_appender::rolling::never(&log_dir, &log_file);
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);
    tracing_subscriber::fmt()
        .with_writer(non_blocking)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("blockfall=debug")),
        )
        .with_ansi(false)
        .init();

    tracing::info!(
        "BLOCKFALL starting up, session={:08x}, log={}",
        session_id,
        log_dir.join(&log_file).display()
    );

    let (settings, settings_source) = Settings::load();

    // Setup terminal
    enable_raw_mode()?;
    execute!(stdout(), EnterAlternateScreen, EnableMouseCapture)?;

    let backend = CrosstermBackend::new(stdout());
    let mut terminal = Terminal::new(backend)?;
    terminal.clear()?;

    let result = run_app(&mut terminal, &settings);

    // Restore terminal
    disable_raw_mode()?;
    execute!(stdout(), LeaveAlternateScreen, DisableMouseCapture)?;

    // Write defaults on first run so the file can be edited
    if settings_source.should_save() {
        if let Err(e) = settings.save() {
            tracing::error!("Could not save settings: {:#}", e);
            eprintln!("Warning: Could not save settings: {:#}", e);
        }
    }

    match &result {
        Ok(Some(game)) => {
            println!("\nThanks for playing BLOCKFALL!");
            println!("Final Score: {}", game.score.points);
            println!("Level: {} | Lines: {}", game.score.level, game.score.lines);
        }
        Ok(None) => println!("\nThanks for playing BLOCKFALL!"),
        Err(e) => tracing::error!("Exiting with error: {}", e),
    }

    result.map(|_| ())
}

/// Create and start a game configured from settings
fn new_game(settings: &Settings) -> Game {
    let config = settings.game_config();
    let mut game = match settings.gameplay.seed {
        Some(seed) => Game::with_seed(config, seed),
        None => Game::new(config),
    };
    game.start();
    game
}

/// Append a finished game to the history file
fn save_record(game: &mut Game) {
    let Some(record) = game.acknowledge_game_over() else {
        return;
    };
    match History::default_path() {
        Some(path) => {
            history::record_game(&path, record);
        }
        None => tracing::warn!("No data directory, game record not saved"),
    }
}

fn load_history() -> History {
    History::default_path()
        .map(|path| History::load(&path))
        .unwrap_or_default()
}

fn clear_history() {
    let Some(path) = History::default_path() else {
        return;
    };
    let mut history = History::load(&path);
    match history.clear(&path) {
        Ok(()) => tracing::info!("Cleared game history"),
        Err(e) => tracing::error!("Could not clear history: {:#}", e),
    }
}

fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    settings: &Settings,
) -> io::Result<Option<Game>> {
    let mut state = AppState::Menu(Menu::new());
    let mut last_game: Option<Game> = None;
    let mut game_over_time: Option<Instant> = None;
    let mut last_frame = Instant::now();

    loop {
        // Render
        terminal.draw(|frame| match &state {
            AppState::Menu(menu) => ui::render_menu(frame, menu),
            AppState::Playing(game, _) => ui::render_game(frame, game, settings),
            AppState::History(view) => ui::render_history(frame, view),
            AppState::Help => ui::render_help(frame, settings),
        })?;

        // Handle input
        if event::poll(FRAME_DURATION)? {
            match event::read()? {
                Event::Key(key) if key.kind == KeyEventKind::Press => {
                    let mut next = None;
                    match &mut state {
                        AppState::Menu(menu) => {
                            if is_ctrl_c(key) {
                                return Ok(last_game);
                            }
                            match key.code {
                                KeyCode::Up => menu.move_up(),
                                KeyCode::Down => menu.move_down(),
                                KeyCode::Enter => {
                                    match menu.select().map(|action| menu_transition(action, settings)) {
                                        Some(Transition::To(to)) => next = Some(to),
                                        Some(Transition::Quit) => return Ok(last_game),
                                        None => {}
                                    }
                                }
                                KeyCode::Char('q') | KeyCode::Esc => return Ok(last_game),
                                _ => {}
                            }
                        }
                        AppState::Playing(game, keys) => {
                            let input = keys.resolve(key);
                            if game.state == GameState::GameOver {
                                save_record(game);
                                let elapsed = game_over_time.get_or_insert_with(Instant::now).elapsed();
                                if input == Some(GameInput::Action(Action::Reset)) {
                                    game.reset();
                                    game_over_time = None;
                                } else if input == Some(GameInput::Quit)
                                    || elapsed >= GAME_OVER_INPUT_DELAY
                                {
                                    next = Some(AppState::Menu(Menu::new()));
                                }
                            } else {
                                match input {
                                    Some(GameInput::Action(action)) => game.process_action(action),
                                    Some(GameInput::Quit) => {
                                        tracing::info!("Left game at score {}", game.score.points);
                                        next = Some(AppState::Menu(Menu::new()));
                                    }
                                    None => {}
                                }
                            }
                        }
                        AppState::History(_) if is_ctrl_c(key) => return Ok(last_game),
                        AppState::History(view) => match key.code {
                            KeyCode::Up => view.scroll_up(),
                            KeyCode::Down => view.scroll_down(),
                            KeyCode::Char('c') | KeyCode::Char('C') => {
                                clear_history();
                                next = Some(AppState::History(HistoryView::new(&History::default())));
                            }
                            KeyCode::Esc | KeyCode::Char('q') => next = Some(AppState::Menu(Menu::new())),
                            _ => {}
                        },
                        AppState::Help => {
                            if is_ctrl_c(key) {
                                return Ok(last_game);
                            }
                            if matches!(key.code, KeyCode::Esc | KeyCode::Char('q') | KeyCode::Enter) {
                                next = Some(AppState::Menu(Menu::new()));
                            }
                        }
                    }

                    if let Some(next) = next {
                        state = leave(state, next, &mut last_game);
                        game_over_time = None;
                        last_frame = Instant::now();
                    }
                }
                Event::Mouse(mouse) => {
                    if let AppState::Menu(menu) = &mut state {
                        let size = terminal.size()?;
                        let area = Rect::new(0, 0, size.width, size.height);
                        if let Some(action) = handle_menu_mouse(menu, mouse, area) {
                            match menu_transition(action, settings) {
                                Transition::To(to) => {
                                    state = to;
                                    last_frame = Instant::now();
                                }
                                Transition::Quit => return Ok(last_game),
                            }
                        }
                    }
                }
                _ => {}
            }
        }

        // Update game state
        let now = Instant::now();
        let delta = now - last_frame;
        last_frame = now;
        if let AppState::Playing(game, _) = &mut state {
            game.tick(delta);
            if game.state == GameState::GameOver && game_over_time.is_none() {
                game_over_time = Some(now);
                save_record(game);
            }
        }
    }
}

enum Transition {
    To(AppState),
    Quit,
}

fn menu_transition(action: MenuAction, settings: &Settings) -> Transition {
    match action {
        MenuAction::StartGame => Transition::To(AppState::Playing(
            new_game(settings),
            KeyBindings::from_settings(settings),
        )),
        MenuAction::ShowHistory => Transition::To(AppState::History(HistoryView::new(&load_history()))),
        MenuAction::ShowHelp => Transition::To(AppState::Help),
        MenuAction::Quit => Transition::Quit,
    }
}

/// Switch screens, keeping the last game for the exit summary
fn leave(state: AppState, next: AppState, last_game: &mut Option<Game>) -> AppState {
    if let AppState::Playing(game, _) = state {
        *last_game = Some(game);
    }
    next
}

fn is_ctrl_c(key: KeyEvent) -> bool {
    key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c')
}

/// Handle mouse events in the menu
fn handle_menu_mouse(menu: &mut Menu, mouse: MouseEvent, area: Rect) -> Option<MenuAction> {
    match mouse.kind {
        MouseEventKind::Down(MouseButton::Left) => {
            let index = ui::menu_item_at(area, menu, mouse.column, mouse.row)?;
            menu.hover(index);
            menu.select()
        }
        MouseEventKind::Moved => {
            // Highlight on hover
            if let Some(index) = ui::menu_item_at(area, menu, mouse.column, mouse.row) {
                menu.hover(index);
            }
            None
        }
        MouseEventKind::ScrollUp => {
            menu.move_up();
            None
        }
        MouseEventKind::ScrollDown => {
            menu.move_down();
            None
        }
        _ => None,
    }
}
