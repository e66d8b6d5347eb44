//! Terminal UI rendering with ratatui

use crate::board::Cell;
use crate::game::{Game, GameState};
use crate::menu::{HistoryView, Menu};
use crate::settings::Settings;
use crate::tetromino::{ColorIndex, Shape};
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Style, Stylize},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Row, Table},
    Frame,
};
use std::time::Duration;

const EMPTY: &str = "  ";

/// Menu heading
const GAME_TITLE: &str = "B L O C K F A L L";

/// Width of the next-piece and stats column
const SIDE_PANEL_WIDTH: u16 = 16;
const NEXT_PANEL_HEIGHT: u16 = 6;

/// Menu box size and title height
const MENU_WIDTH: u16 = 44;
const MENU_HEIGHT: u16 = 18;
const MENU_TITLE_HEIGHT: u16 = 6;

/// Block colors for color indices 1..=7
const PALETTE: [Color; 7] = [
    Color::Rgb(255, 85, 85),
    Color::Rgb(100, 255, 100),
    Color::Rgb(100, 100, 255),
    Color::Rgb(255, 165, 50),
    Color::Rgb(255, 255, 100),
    Color::Rgb(200, 100, 255),
    Color::Rgb(50, 255, 255),
];

/// Terminal color for a block color index
pub fn block_color(color: ColorIndex) -> Color {
    PALETTE[usize::from(color.get() - 1) % PALETTE.len()]
}

/// Render the main menu
pub fn render_menu(frame: &mut Frame, menu: &Menu) {
    let area = frame.area();
    let menu_area = center_rect(area, MENU_WIDTH, MENU_HEIGHT);

    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(MENU_TITLE_HEIGHT), Constraint::Min(8)])
        .split(menu_area);

    let title_lines = vec![
        Line::raw(""),
        Line::styled("▄▄▄▄▄▄▄▄▄▄▄▄▄▄▄▄▄▄▄▄▄", Style::default().fg(Color::Cyan)),
        Line::styled(GAME_TITLE, Style::default().fg(Color::Cyan).bold()),
        Line::styled("▀▀▀▀▀▀▀▀▀▀▀▀▀▀▀▀▀▀▀▀▀", Style::default().fg(Color::Cyan)),
        Line::styled("a falling-block puzzle", Style::default().fg(Color::DarkGray)),
    ];
    let title = Paragraph::new(title_lines).alignment(Alignment::Center);
    frame.render_widget(title, layout[0]);

    // Menu items
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Gray));
    let inner = block.inner(layout[1]);
    frame.render_widget(block, layout[1]);

    let mut lines = Vec::new();
    lines.push(Line::raw("")); // Spacing

    for (i, item) in menu.items.iter().enumerate() {
        let is_selected = i == menu.selected;
        let prefix = if is_selected { "▶ " } else { "  " };
        let style = if is_selected {
            Style::default().fg(Color::Yellow).bold()
        } else {
            Style::default().fg(Color::White)
        };
        lines.push(Line::styled(format!("{}{}", prefix, item.label), style));
        lines.push(Line::raw("")); // Spacing between items
    }

    lines.push(Line::styled(
        "↑↓ Select  Enter Confirm  Esc Quit",
        Style::default().fg(Color::DarkGray),
    ));

    let menu_text = Paragraph::new(lines).alignment(Alignment::Center);
    frame.render_widget(menu_text, inner);
}

/// Menu item under a mouse position, if any.
///
/// Mirrors the layout of `render_menu`: one spacer row, then each item
/// followed by a spacer.
pub fn menu_item_at(area: Rect, menu: &Menu, column: u16, row: u16) -> Option<usize> {
    let menu_area = center_rect(area, MENU_WIDTH, MENU_HEIGHT);
    let inner_x = menu_area.x + 1;
    let inner_y = menu_area.y + MENU_TITLE_HEIGHT + 1;
    let inner_width = MENU_WIDTH.saturating_sub(2);

    if column < inner_x || column >= inner_x + inner_width || row <= inner_y {
        return None;
    }
    let relative = row - inner_y - 1;
    if relative % 2 != 0 {
        return None;
    }
    let index = usize::from(relative / 2);
    (index < menu.items.len()).then_some(index)
}

/// Render the entire game UI
pub fn render_game(frame: &mut Frame, game: &Game, settings: &Settings) {
    let area = frame.area();
    let board_width = game.board.width() as u16 * 2 + 2;
    let board_height = game.board.height() as u16 + 2;

    // Center the game area
    let game_area = center_rect(area, board_width + SIDE_PANEL_WIDTH, board_height);

    // Create main layout: board | next + stats
    let main_layout = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Length(board_width),
            Constraint::Length(SIDE_PANEL_WIDTH),
        ])
        .split(game_area);

    render_board(frame, main_layout[0], game, settings);

    let right_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(NEXT_PANEL_HEIGHT), Constraint::Min(6)])
        .split(main_layout[1]);

    render_next(frame, right_layout[0], game, settings);
    render_stats(frame, right_layout[1], game);

    // Overlays
    match game.state {
        GameState::Paused => render_overlay(frame, area, "PAUSED", "Press P to resume"),
        GameState::GameOver => render_overlay(
            frame,
            area,
            "GAME OVER",
            &format!("Final Score: {}", game.score.points),
        ),
        GameState::Ready | GameState::Playing => {}
    }
}

/// Center a rect within another rect
fn center_rect(area: Rect, width: u16, height: u16) -> Rect {
    let x = area.x + area.width.saturating_sub(width) / 2;
    let y = area.y + area.height.saturating_sub(height) / 2;
    Rect {
        x,
        y,
        width: width.min(area.width),
        height: height.min(area.height),
    }
}

/// Render the next piece preview
fn render_next(frame: &mut Frame, area: Rect, game: &Game, settings: &Settings) {
    let (block_char, _) = settings.visual.block_chars();
    let block = Block::default()
        .title(" NEXT ")
        .title_alignment(Alignment::Center)
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Gray));

    let inner = block.inner(area);
    frame.render_widget(block, area);

    // Random colors are not known before spawn
    let color = game.next_color().map_or(Color::White, block_color);
    let lines = shape_lines(&game.next_shape(), block_char, color);
    let height = lines.len() as u16;
    let paragraph = Paragraph::new(lines).alignment(Alignment::Center);
    frame.render_widget(paragraph, center_rect(inner, inner.width, height));
}

/// Lines drawing a shape in its bounding box
fn shape_lines(shape: &Shape, block_char: &'static str, color: Color) -> Vec<Line<'static>> {
    (0..shape.height())
        .map(|row| {
            let spans: Vec<Span> = (0..shape.width())
                .map(|col| {
                    if shape.is_set(row, col) {
                        Span::styled(block_char, Style::default().fg(color))
                    } else {
                        Span::raw(EMPTY)
                    }
                })
                .collect();
            Line::from(spans)
        })
        .collect()
}

/// Render the game board
fn render_board(frame: &mut Frame, area: Rect, game: &Game, settings: &Settings) {
    let (block_char, ghost_char) = settings.visual.block_chars();
    let show_ghost = settings.visual.show_ghost && game.state == GameState::Playing;

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::White));

    let inner = block.inner(area);
    frame.render_widget(block, area);

    let piece = game.current_piece.as_ref();
    let piece_cells: Vec<(i32, i32)> = piece
        .map(|p| p.block_positions().collect())
        .unwrap_or_default();
    let ghost_cells: Vec<(i32, i32)> = match (piece, game.ghost_y()) {
        (Some(p), Some(ghost_y)) if show_ghost => p
            .shape
            .cells()
            .map(|(dr, dc)| (p.x + dc, ghost_y + dr))
            .collect(),
        _ => Vec::new(),
    };
    let cleared = game.cleared_rows();

    let mut lines: Vec<Line> = Vec::with_capacity(game.board.height());
    for (y, row) in game.board.rows().enumerate() {
        // Rows opened up by the last clear flash briefly
        let flashing = cleared.contains(&y);
        let spans: Vec<Span> = row
            .iter()
            .enumerate()
            .map(|(x, cell)| {
                let pos = (x as i32, y as i32);
                if let Some(p) = piece.filter(|_| piece_cells.contains(&pos)) {
                    Span::styled(block_char, Style::default().fg(block_color(p.color)))
                } else if let Cell::Filled(color) = cell {
                    Span::styled(block_char, Style::default().fg(block_color(*color)))
                } else if flashing {
                    Span::styled(ghost_char, Style::default().fg(Color::White))
                } else if let Some(p) = piece.filter(|_| ghost_cells.contains(&pos)) {
                    Span::styled(ghost_char, Style::default().fg(block_color(p.color)).dim())
                } else {
                    Span::raw(EMPTY)
                }
            })
            .collect();
        lines.push(Line::from(spans));
    }

    let paragraph = Paragraph::new(lines);
    frame.render_widget(paragraph, inner);
}

/// Format a duration as MM:SS
fn format_clock(elapsed: Duration) -> String {
    let secs = elapsed.as_secs();
    format!("{:02}:{:02}", secs / 60, secs % 60)
}

/// Render stats panel
fn render_stats(frame: &mut Frame, area: Rect, game: &Game) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Gray));

    let inner = block.inner(area);
    frame.render_widget(block, area);

    let stat = |label: &'static str, value: String, color: Color| {
        [
            Line::from(Span::styled(label, Style::default().fg(Color::Gray))),
            Line::from(Span::styled(value, Style::default().fg(color).bold())),
            Line::raw(""),
        ]
    };

    let mut lines = Vec::new();
    lines.extend(stat("SCORE", game.score.points.to_string(), Color::Yellow));
    lines.extend(stat("LEVEL", game.score.level.to_string(), Color::Cyan));
    lines.extend(stat("LINES", game.score.lines.to_string(), Color::Green));
    lines.extend(stat("TIME", format_clock(game.elapsed()), Color::White));

    let paragraph = Paragraph::new(lines);
    frame.render_widget(paragraph, inner);
}

/// Render an overlay (for pause/game over)
fn render_overlay(frame: &mut Frame, area: Rect, title: &str, subtitle: &str) {
    let popup_area = center_rect(area, 28, 5);

    // Clear the background
    frame.render_widget(Clear, popup_area);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Yellow))
        .style(Style::default().bg(Color::Black));

    let inner = block.inner(popup_area);
    frame.render_widget(block, popup_area);

    let text = vec![
        Line::styled(title, Style::default().fg(Color::Yellow).bold()),
        Line::raw(""),
        Line::styled(subtitle, Style::default().fg(Color::Gray)),
    ];

    let paragraph = Paragraph::new(text).alignment(Alignment::Center);
    frame.render_widget(paragraph, inner);
}

/// Render the game history table
pub fn render_history(frame: &mut Frame, view: &HistoryView) {
    let area = center_rect(frame.area(), 72, 18);
    let block = Block::default()
        .title(format!(" GAME HISTORY ({}) ", view.total()))
        .title_alignment(Alignment::Center)
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Gray));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(3), Constraint::Length(1)])
        .split(inner);

    if view.is_empty() {
        let empty = Paragraph::new("No game history found").alignment(Alignment::Center);
        frame.render_widget(empty, center_rect(layout[0], layout[0].width, 1));
    } else {
        let header = Row::new(["Start", "Duration", "Level", "Score", "Lines"])
            .style(Style::default().fg(Color::Yellow).bold());
        let rows = view.visible().iter().map(|record| {
            Row::new([
                record.start_time.clone(),
                record.duration.clone(),
                record.level.to_string(),
                record.score.to_string(),
                record.lines.to_string(),
            ])
        });
        let table = Table::new(
            rows,
            [
                Constraint::Length(21),
                Constraint::Length(10),
                Constraint::Length(7),
                Constraint::Length(10),
                Constraint::Length(7),
            ],
        )
        .header(header);
        frame.render_widget(table, layout[0]);
    }

    let hint = Paragraph::new(Line::styled(
        "↑↓ Scroll  C Clear history  Esc Back",
        Style::default().fg(Color::DarkGray),
    ))
    .alignment(Alignment::Center);
    frame.render_widget(hint, layout[1]);
}

/// Render the controls help screen
pub fn render_help(frame: &mut Frame, settings: &Settings) {
    let area = center_rect(frame.area(), 48, 16);
    let block = Block::default()
        .title(" HELP ")
        .title_alignment(Alignment::Center)
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Gray));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let keys = &settings.keys;
    let entries = [
        ("Move left", &keys.move_left),
        ("Move right", &keys.move_right),
        ("Soft drop", &keys.soft_drop),
        ("Hard drop", &keys.hard_drop),
        ("Rotate", &keys.rotate),
        ("Pause", &keys.pause),
        ("Restart", &keys.restart),
        ("Quit to menu", &keys.quit),
    ];

    let mut lines = vec![Line::raw("")];
    for (label, bound) in entries {
        lines.push(Line::from(vec![
            Span::styled(format!("{:<14}", label), Style::default().fg(Color::Gray)),
            Span::styled(bound.join(", "), Style::default().fg(Color::Magenta)),
        ]));
    }
    lines.push(Line::raw(""));
    lines.push(Line::styled(
        "Clear 5 lines to level up.",
        Style::default().fg(Color::Cyan),
    ));
    lines.push(Line::raw(""));
    lines.push(Line::styled("Esc Back", Style::default().fg(Color::DarkGray)));

    let paragraph = Paragraph::new(lines).alignment(Alignment::Center);
    frame.render_widget(paragraph, inner);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::GameConfig;
    use crate::piece::Piece;
    use crate::tetromino::TetrominoType;
    use ratatui::{backend::TestBackend, Terminal};

    fn buffer_text(terminal: &Terminal<TestBackend>) -> String {
        terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|cell| cell.symbol())
            .collect()
    }

    #[test]
    fn test_palette_covers_all_colors() {
        for value in 1..=7 {
            let color = ColorIndex::new(value).unwrap();
            assert_eq!(block_color(color), PALETTE[usize::from(value) - 1]);
        }
    }

    #[test]
    fn test_menu_hit_testing() {
        let area = Rect::new(0, 0, 80, 30);
        let menu = Menu::new();
        let menu_area = center_rect(area, MENU_WIDTH, MENU_HEIGHT);
        let first_row = menu_area.y + MENU_TITLE_HEIGHT + 2;
        let column = menu_area.x + 10;
        assert_eq!(menu_item_at(area, &menu, column, first_row), Some(0));
        assert_eq!(menu_item_at(area, &menu, column, first_row + 1), None);
        assert_eq!(menu_item_at(area, &menu, column, first_row + 2), Some(1));
        assert_eq!(menu_item_at(area, &menu, 0, first_row), None);
    }

    #[test]
    fn test_render_game_shows_stats() {
        let mut terminal = Terminal::new(TestBackend::new(60, 26)).unwrap();
        let mut game = Game::with_seed(GameConfig::default(), 1);
        game.start();
        let settings = Settings::default();
        terminal
            .draw(|frame| render_game(frame, &game, &settings))
            .unwrap();
        let text = buffer_text(&terminal);
        assert!(text.contains("SCORE"));
        assert!(text.contains("NEXT"));
    }

    #[test]
    fn test_render_history_empty() {
        let mut terminal = Terminal::new(TestBackend::new(80, 24)).unwrap();
        let view = HistoryView::new(&crate::history::History::default());
        terminal.draw(|frame| render_history(frame, &view)).unwrap();
        assert!(buffer_text(&terminal).contains("No game history found"));
    }

    #[test]
    fn test_menu_shows_game_title() {
        let mut terminal = Terminal::new(TestBackend::new(80, 30)).unwrap();
        terminal.draw(|frame| render_menu(frame, &Menu::new())).unwrap();
        let text = buffer_text(&terminal);
        assert!(text.contains(GAME_TITLE));
        assert!(text.contains("History"));
    }

    #[test]
    fn test_clear_flash_keeps_surviving_blocks() {
        let mut game = Game::with_seed(GameConfig::default(), 7);
        game.start();
        let color = ColorIndex::new(2).unwrap();
        for x in 0..12 {
            if !(4..8).contains(&x) {
                game.board.set(x, 19, Cell::Filled(color));
            }
            if x != 11 {
                game.board.set(x, 18, Cell::Filled(color));
            }
        }
        let mut bar = Piece::spawn(TetrominoType::I, color, 12);
        bar.y = 19;
        game.current_piece = Some(bar);
        game.lock();
        assert_eq!(game.cleared_rows(), &[0]);

        let mut terminal = Terminal::new(TestBackend::new(60, 26)).unwrap();
        let settings = Settings::default();
        terminal
            .draw(|frame| render_game(frame, &game, &settings))
            .unwrap();

        // 42x22 game area centered in 60x26 puts board cell (0, 0) at (10, 3)
        let buffer = terminal.backend().buffer();
        let at = |col: u16, row: u16| buffer[(10 + col * 2, 3 + row)].symbol().to_string();
        // The shifted row keeps its blocks and its gap
        assert_eq!(at(0, 19), "█");
        assert_eq!(at(10, 19), "█");
        assert_eq!(at(11, 19), " ");
        // The row opened at the top is the one that flashes
        assert_eq!(at(0, 0), "░");
    }
}
