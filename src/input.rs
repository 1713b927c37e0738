use std::io;
use std::time::Duration;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::snake::Direction;

/// A key press the game cares about.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Turn(Direction),
    Pause,
    /// Acknowledge a prompt. Doubles as a pause request during play.
    Confirm,
    Restart,
    Quit,
}

/// How long a collection call may wait for keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Wait {
    /// Gather every key pressed until the duration has passed.
    For(Duration),
    /// Block until one key is pressed.
    Forever,
}

/// What the player asked for during the last collection.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct InputState {
    direction: Option<Direction>,
    prev_direction: Option<Direction>,
    pause: bool,
    confirm: bool,
    restart: bool,
    quit: bool,
}

impl InputState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a new collection: one-shot flags are dropped, directions persist.
    pub fn begin(&mut self) {
        self.pause = false;
        self.confirm = false;
        self.restart = false;
        self.quit = false;
        self.prev_direction = self.direction;
    }

    pub fn apply(&mut self, key: Key) {
        match key {
            Key::Turn(dir) => {
                if self.direction != Some(dir) {
                    self.prev_direction = self.direction;
                    self.direction = Some(dir);
                }
            }
            Key::Pause => self.pause = true,
            Key::Confirm => {
                self.confirm = true;
                self.pause = true;
            }
            Key::Restart => self.restart = true,
            Key::Quit => self.quit = true,
        }
    }

    /// Most recent direction key.
    pub fn direction(&self) -> Option<Direction> {
        self.direction
    }

    /// Direction key that was current before the most recent change.
    pub fn prev_direction(&self) -> Option<Direction> {
        self.prev_direction
    }

    pub fn pause(&self) -> bool {
        self.pause
    }

    pub fn confirm(&self) -> bool {
        self.confirm
    }

    pub fn restart(&self) -> bool {
        self.restart
    }

    pub fn quit(&self) -> bool {
        self.quit
    }
}

/// Source of player input. The state stays valid until the next `collect`.
pub trait InputSource {
    fn collect(&mut self, wait: Wait) -> io::Result<()>;

    fn state(&self) -> &InputState;
}

pub fn key_from_event(key: KeyEvent) -> Option<Key> {
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        return Some(Key::Quit);
    }

    match key.code {
        KeyCode::Up | KeyCode::Char('w') | KeyCode::Char('W') => Some(Key::Turn(Direction::Up)),
        KeyCode::Down | KeyCode::Char('s') | KeyCode::Char('S') => Some(Key::Turn(Direction::Down)),
        KeyCode::Left | KeyCode::Char('a') | KeyCode::Char('A') => Some(Key::Turn(Direction::Left)),
        KeyCode::Right | KeyCode::Char('d') | KeyCode::Char('D') => Some(Key::Turn(Direction::Right)),

        KeyCode::Enter => Some(Key::Confirm),
        KeyCode::Esc | KeyCode::Char('p') | KeyCode::Char('P') => Some(Key::Pause),
        KeyCode::Char('r') | KeyCode::Char('R') => Some(Key::Restart),
        KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::End => Some(Key::Quit),

        _ => None,
    }
}
