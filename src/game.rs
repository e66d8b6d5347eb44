//! Core game state and logic

use crate::board::{Board, DEFAULT_HEIGHT, DEFAULT_WIDTH};
use crate::history::GameRecord;
use crate::piece::Piece;
use crate::randomizer::{PieceSource, UniformSource};
use crate::score::Score;
use crate::tetromino::{ColorIndex, Shape, TetrominoType};
use chrono::{DateTime, Local};
use std::time::Duration;

/// How long rows removed by the last lock stay highlighted
const CLEAR_EFFECT_DURATION: Duration = Duration::from_millis(300);

/// Game state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameState {
    /// Created but no piece spawned yet
    Ready,
    Playing,
    Paused,
    GameOver,
}

/// Input actions the game can process
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    MoveLeft,
    MoveRight,
    SoftDrop,
    HardDrop,
    Rotate,
    Pause,
    Reset,
}

/// Options fixed for the lifetime of a game
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GameConfig {
    pub width: usize,
    pub height: usize,
    /// Use each shape's catalog color instead of a random one
    pub color_by_shape: bool,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            width: DEFAULT_WIDTH,
            height: DEFAULT_HEIGHT,
            color_by_shape: false,
        }
    }
}

#[derive(Debug, Clone)]
struct ClearEffect {
    rows: Vec<usize>,
    remaining: Duration,
}

/// The main game struct
pub struct Game {
    /// The game board
    pub board: Board,
    /// Current falling piece
    pub current_piece: Option<Piece>,
    /// Shape that spawns after the current piece locks
    next_type: TetrominoType,
    source: Box<dyn PieceSource>,
    /// Score tracking
    pub score: Score,
    /// Current game state
    pub state: GameState,
    color_by_shape: bool,
    /// Time accumulated toward the next gravity step
    fall_timer: Duration,
    /// Unpaused play time
    elapsed: Duration,
    started_at: DateTime<Local>,
    clear_effect: Option<ClearEffect>,
    record_taken: bool,
}

impl Game {
    /// Create a new game drawing pieces from thread-local randomness
    pub fn new(config: GameConfig) -> Self {
        Self::with_source(config, Box::new(UniformSource::from_entropy()))
    }

    /// Create a new game whose piece sequence is fixed by `seed`
    pub fn with_seed(config: GameConfig, seed: u64) -> Self {
        Self::with_source(config, Box::new(UniformSource::with_seed(seed)))
    }

    pub fn with_source(config: GameConfig, mut source: Box<dyn PieceSource>) -> Self {
        let next_type = source.next_type();
        Self {
            board: Board::new(config.width, config.height),
            current_piece: None,
            next_type,
            source,
            score: Score::new(),
            state: GameState::Ready,
            color_by_shape: config.color_by_shape,
            fall_timer: Duration::ZERO,
            elapsed: Duration::ZERO,
            started_at: Local::now(),
            clear_effect: None,
            record_taken: false,
        }
    }

    /// Spawn the first piece and begin play
    pub fn start(&mut self) {
        if self.state != GameState::Ready {
            return;
        }
        self.state = GameState::Playing;
        self.started_at = Local::now();
        tracing::info!(
            width = self.board.width(),
            height = self.board.height(),
            "game started"
        );
        self.spawn_next();
    }

    /// Start over with an empty board and fresh counters
    pub fn reset(&mut self) {
        self.board.clear();
        self.current_piece = None;
        self.score = Score::new();
        self.fall_timer = Duration::ZERO;
        self.elapsed = Duration::ZERO;
        self.clear_effect = None;
        self.record_taken = false;
        self.next_type = self.source.next_type();
        self.state = GameState::Ready;
        self.start();
    }

    /// Process an action
    pub fn process_action(&mut self, action: Action) {
        match self.state {
            GameState::Ready => {
                // Waiting for start()
            }
            GameState::Paused => match action {
                Action::Pause => self.toggle_pause(),
                Action::Reset => self.reset(),
                _ => {}
            },
            GameState::Playing => match action {
                Action::MoveLeft => {
                    self.try_move(-1, 0);
                }
                Action::MoveRight => {
                    self.try_move(1, 0);
                }
                Action::SoftDrop => {
                    self.soft_drop();
                }
                Action::HardDrop => {
                    self.hard_drop();
                }
                Action::Rotate => {
                    self.rotate();
                }
                Action::Pause => self.toggle_pause(),
                Action::Reset => self.reset(),
            },
            GameState::GameOver => {
                if action == Action::Reset {
                    self.reset();
                }
            }
        }
    }

    /// Switch between playing and paused; other states are left alone
    pub fn toggle_pause(&mut self) {
        self.state = match self.state {
            GameState::Playing => GameState::Paused,
            GameState::Paused => GameState::Playing,
            other => other,
        };
    }

    /// Advance the gravity clock by `elapsed`
    pub fn tick(&mut self, elapsed: Duration) {
        if matches!(self.state, GameState::Ready | GameState::Paused) {
            return;
        }

        if let Some(effect) = &mut self.clear_effect {
            effect.remaining = effect.remaining.saturating_sub(elapsed);
            if effect.remaining.is_zero() {
                self.clear_effect = None;
            }
        }

        if self.state != GameState::Playing {
            return;
        }

        self.elapsed += elapsed;
        self.fall_timer += elapsed;
        if self.fall_timer >= self.score.fall_interval() {
            self.fall_timer = Duration::ZERO;
            if !self.try_move(0, 1) {
                self.lock();
            }
        }
    }

    /// Move the current piece by (dx, dy) if nothing is in the way
    pub fn try_move(&mut self, dx: i32, dy: i32) -> bool {
        if self.state != GameState::Playing {
            return false;
        }
        match &mut self.current_piece {
            Some(piece) => piece.try_move(&self.board, dx, dy),
            None => false,
        }
    }

    /// Rotate the current piece clockwise if the result fits
    pub fn rotate(&mut self) -> bool {
        if self.state != GameState::Playing {
            return false;
        }
        match &mut self.current_piece {
            Some(piece) => piece.rotate(&self.board),
            None => false,
        }
    }

    /// Move down one row, scoring a point on success. Never locks.
    pub fn soft_drop(&mut self) -> bool {
        let moved = self.try_move(0, 1);
        if moved {
            self.score.add_drop(1);
        }
        moved
    }

    /// Drop to the lowest free row and lock immediately.
    /// Returns the number of rows dropped.
    pub fn hard_drop(&mut self) -> u32 {
        if self.state != GameState::Playing || self.current_piece.is_none() {
            return 0;
        }
        let mut distance = 0;
        while self.try_move(0, 1) {
            distance += 1;
        }
        self.score.add_drop(distance);
        self.lock();
        distance
    }

    /// Merge the current piece into the board, clear rows and spawn the next
    pub fn lock(&mut self) {
        if self.state != GameState::Playing {
            return;
        }
        let Some(piece) = self.current_piece.take() else {
            return;
        };

        if !self
            .board
            .place_cells(&piece.shape, piece.x, piece.y, piece.color)
        {
            tracing::error!(x = piece.x, y = piece.y, "locked piece extends past the board");
        }

        let clear = self.board.clear_full_rows();
        let lines = clear.count() as u32;
        if lines > 0 {
            let awarded = self.score.add_clear(lines);
            tracing::debug!(
                lines,
                awarded,
                score = self.score.points,
                level = self.score.level,
                "rows cleared"
            );
            self.clear_effect = Some(ClearEffect {
                rows: clear.inserted_rows.collect(),
                remaining: CLEAR_EFFECT_DURATION,
            });
        } else {
            tracing::debug!(piece = piece.piece_type.name(), x = piece.x, y = piece.y, "piece locked");
        }

        self.spawn_next();
    }

    /// Promote the next shape to the current piece and draw a new next
    fn spawn_next(&mut self) {
        let piece_type = self.next_type;
        let color = if self.color_by_shape {
            piece_type.catalog_color()
        } else {
            self.source.next_color()
        };
        let piece = Piece::spawn(piece_type, color, self.board.width());
        self.next_type = self.source.next_type();
        self.fall_timer = Duration::ZERO;

        // Check for top out
        if piece.collides_at(&self.board, 0, 0) {
            self.state = GameState::GameOver;
            tracing::info!(
                score = self.score.points,
                level = self.score.level,
                lines = self.score.lines,
                "game over"
            );
        }
        self.current_piece = Some(piece);
    }

    /// Hand out the record of a finished game, once
    pub fn acknowledge_game_over(&mut self) -> Option<GameRecord> {
        self.acknowledge_game_over_at(Local::now())
    }

    pub fn acknowledge_game_over_at(&mut self, ended_at: DateTime<Local>) -> Option<GameRecord> {
        if self.state != GameState::GameOver || self.record_taken {
            return None;
        }
        self.record_taken = true;
        Some(GameRecord::new(self.started_at, ended_at, &self.score))
    }

    pub fn is_game_over(&self) -> bool {
        self.state == GameState::GameOver
    }

    pub fn is_paused(&self) -> bool {
        self.state == GameState::Paused
    }

    pub fn next_type(&self) -> TetrominoType {
        self.next_type
    }

    /// Shape shown in the preview box
    pub fn next_shape(&self) -> Shape {
        self.next_type.shape()
    }

    /// Preview color: only known in advance when colors follow the shape
    pub fn next_color(&self) -> Option<ColorIndex> {
        self.color_by_shape.then(|| self.next_type.catalog_color())
    }

    /// Unpaused play time since the game started
    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }

    pub fn started_at(&self) -> DateTime<Local> {
        self.started_at
    }

    /// Empty rows added at the top by the most recent clear, while their
    /// highlight lasts
    pub fn cleared_rows(&self) -> &[usize] {
        self.clear_effect
            .as_ref()
            .map(|effect| effect.rows.as_slice())
            .unwrap_or(&[])
    }

    /// Row the current piece would land on
    pub fn ghost_y(&self) -> Option<i32> {
        self.current_piece
            .as_ref()
            .map(|piece| piece.ghost_y(&self.board))
    }
}

impl Default for Game {
    fn default() -> Self {
        Self::new(GameConfig::default())
    }
}
