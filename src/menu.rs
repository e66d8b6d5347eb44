//! Main menu and the history browser

use crate::history::{GameRecord, History};

/// Rows of records visible at once on the history screen
pub const HISTORY_PAGE: usize = 10;

/// Menu state
#[derive(Debug, Clone)]
pub struct Menu {
    pub selected: usize,
    pub items: Vec<MenuItem>,
}

#[derive(Debug, Clone)]
pub struct MenuItem {
    pub label: String,
    pub action: MenuAction,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuAction {
    StartGame,
    ShowHistory,
    ShowHelp,
    Quit,
}

impl Menu {
    pub fn new() -> Self {
        let item = |label: &str, action| MenuItem {
            label: label.to_string(),
            action,
        };
        Self {
            selected: 0,
            items: vec![
                item("Play", MenuAction::StartGame),
                item("History", MenuAction::ShowHistory),
                item("Help", MenuAction::ShowHelp),
                item("Quit", MenuAction::Quit),
            ],
        }
    }

    pub fn move_up(&mut self) {
        self.selected = match self.selected {
            0 => self.items.len().saturating_sub(1),
            n => n - 1,
        };
    }

    pub fn move_down(&mut self) {
        self.selected = (self.selected + 1) % self.items.len().max(1);
    }

    /// Highlight an item by index, ignoring indices past the end
    pub fn hover(&mut self, index: usize) {
        if index < self.items.len() {
            self.selected = index;
        }
    }

    pub fn select(&self) -> Option<MenuAction> {
        self.items.get(self.selected).map(|item| item.action)
    }
}

impl Default for Menu {
    fn default() -> Self {
        Self::new()
    }
}

/// Scrollable view of past games, newest first
#[derive(Debug, Clone)]
pub struct HistoryView {
    records: Vec<GameRecord>,
    pub scroll: usize,
}

impl HistoryView {
    pub fn new(history: &History) -> Self {
        Self {
            records: history.sorted_newest_first().into_iter().cloned().collect(),
            scroll: 0,
        }
    }

    fn max_scroll(&self) -> usize {
        self.records.len().saturating_sub(HISTORY_PAGE)
    }

    pub fn scroll_up(&mut self) {
        self.scroll = self.scroll.saturating_sub(1);
    }

    pub fn scroll_down(&mut self) {
        self.scroll = (self.scroll + 1).min(self.max_scroll());
    }

    /// Records currently on screen
    pub fn visible(&self) -> &[GameRecord] {
        let end = (self.scroll + HISTORY_PAGE).min(self.records.len());
        &self.records[self.scroll..end]
    }

    pub fn total(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
