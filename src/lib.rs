//! Slicer Snake: a terminal snake game with a classic single-snake mode and a
//! two-snake mode where a head landing on a body cuts that body off.
//!
//! The simulation (`snake`, `ai`, `game`) only talks to the outside world
//! through the `Display` and `InputSource` traits; `term` provides the
//! crossterm-backed implementations used by the binary.

pub mod ai;
pub mod config;
pub mod display;
pub mod game;
pub mod input;
pub mod snake;
pub mod term;

use snake::Direction;

pub type FieldInt = i32;

/// A cell on the playing field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Coords {
    pub x: FieldInt,
    pub y: FieldInt,
}

impl Coords {
    pub const fn new(x: FieldInt, y: FieldInt) -> Self {
        Coords { x, y }
    }

    /// The neighbouring cell one step towards `direction`.
    pub fn moved(self, direction: Direction) -> Self {
        let (dx, dy) = direction.delta();
        Coords::new(self.x + dx, self.y + dy)
    }
}

impl From<(FieldInt, FieldInt)> for Coords {
    fn from((x, y): (FieldInt, FieldInt)) -> Self {
        Coords::new(x, y)
    }
}

/// Size of the playing field in cells, border included.
///
/// The outermost ring of cells is the wall; touching it is lethal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Field {
    pub width: FieldInt,
    pub height: FieldInt,
}

impl Field {
    pub const fn new(width: FieldInt, height: FieldInt) -> Self {
        Field { width, height }
    }

    pub fn is_wall(&self, pos: Coords) -> bool {
        pos.x <= 0 || pos.y <= 0 || pos.x >= self.width - 1 || pos.y >= self.height - 1
    }

    pub fn contains(&self, pos: Coords) -> bool {
        pos.x >= 0 && pos.y >= 0 && pos.x < self.width && pos.y < self.height
    }
}
