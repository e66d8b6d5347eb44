//! Keyboard mapping from terminal key events to game actions

use crate::game::Action;
use crate::settings::Settings;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, ModifierKeyCode};

/// What a key press asks for while a game is on screen
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameInput {
    Action(Action),
    /// Leave the game and return to the menu
    Quit,
}

/// Key bindings configuration - supports multiple keys per action
#[derive(Debug, Clone)]
pub struct KeyBindings {
    pub move_left: Vec<KeyCode>,
    pub move_right: Vec<KeyCode>,
    pub soft_drop: Vec<KeyCode>,
    pub hard_drop: Vec<KeyCode>,
    pub rotate: Vec<KeyCode>,
    pub pause: Vec<KeyCode>,
    pub restart: Vec<KeyCode>,
    pub quit: Vec<KeyCode>,
}

impl KeyBindings {
    /// Parse a key string into KeyCode
    fn parse_key(s: &str) -> Option<KeyCode> {
        let code = match s.to_lowercase().as_str() {
            "left" => KeyCode::Left,
            "right" => KeyCode::Right,
            "up" => KeyCode::Up,
            "down" => KeyCode::Down,
            "space" => KeyCode::Char(' '),
            "enter" => KeyCode::Enter,
            "tab" => KeyCode::Tab,
            "esc" | "escape" => KeyCode::Esc,
            "shift" => KeyCode::Modifier(ModifierKeyCode::LeftShift),
            "ctrl" | "control" => KeyCode::Modifier(ModifierKeyCode::LeftControl),
            "alt" => KeyCode::Modifier(ModifierKeyCode::LeftAlt),
            other => {
                let mut chars = other.chars();
                match (chars.next(), chars.next()) {
                    (Some(c), None) => KeyCode::Char(c),
                    _ => {
                        tracing::warn!("Unknown key name in settings: {:?}", s);
                        return None;
                    }
                }
            }
        };
        Some(code)
    }

    /// Parse a list of key strings into KeyCodes
    fn parse_keys(keys: &[String]) -> Vec<KeyCode> {
        keys.iter().filter_map(|s| Self::parse_key(s)).collect()
    }

    /// Create keybindings from settings
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            move_left: Self::parse_keys(&settings.keys.move_left),
            move_right: Self::parse_keys(&settings.keys.move_right),
            soft_drop: Self::parse_keys(&settings.keys.soft_drop),
            hard_drop: Self::parse_keys(&settings.keys.hard_drop),
            rotate: Self::parse_keys(&settings.keys.rotate),
            pause: Self::parse_keys(&settings.keys.pause),
            restart: Self::parse_keys(&settings.keys.restart),
            quit: Self::parse_keys(&settings.keys.quit),
        }
    }

    /// Map a key press to a game input
    pub fn resolve(&self, key: KeyEvent) -> Option<GameInput> {
        // Ctrl+C always quits
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            return Some(GameInput::Quit);
        }

        let code = normalize_key(key.code);
        let action = if self.move_left.contains(&code) {
            Action::MoveLeft
        } else if self.move_right.contains(&code) {
            Action::MoveRight
        } else if self.soft_drop.contains(&code) {
            Action::SoftDrop
        } else if self.hard_drop.contains(&code) {
            Action::HardDrop
        } else if self.rotate.contains(&code) {
            Action::Rotate
        } else if self.pause.contains(&code) {
            Action::Pause
        } else if self.restart.contains(&code) {
            Action::Reset
        } else if self.quit.contains(&code) || code == KeyCode::Esc {
            return Some(GameInput::Quit);
        } else {
            return None;
        };
        Some(GameInput::Action(action))
    }
}

impl Default for KeyBindings {
    fn default() -> Self {
        Self::from_settings(&Settings::default())
    }
}

/// Normalize key codes for consistent handling
fn normalize_key(code: KeyCode) -> KeyCode {
    match code {
        KeyCode::Char(c) => KeyCode::Char(c.to_ascii_lowercase()),
        other => other,
    }
}
