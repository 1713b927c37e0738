use std::io;

use crate::{Coords, Field};

/// Everything that can occupy a field cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Texture {
    Snake,
    SnakeHead,
    RivalSnake,
    RivalSnakeHead,
    Food,
    Collision,
    Background,
}

/// Textures a snake is drawn with, by body role.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SnakeTextures {
    pub head: Texture,
    pub body: Texture,
    pub tail: Texture,
}

impl SnakeTextures {
    pub const PLAYER: SnakeTextures = SnakeTextures {
        head: Texture::SnakeHead,
        body: Texture::Snake,
        tail: Texture::Snake,
    };

    pub const RIVAL: SnakeTextures = SnakeTextures {
        head: Texture::RivalSnakeHead,
        body: Texture::RivalSnake,
        tail: Texture::RivalSnake,
    };
}

/// Drawing surface the simulation renders into.
///
/// Draw calls are fire-and-forget; nothing has to reach the screen before
/// `flush` is called.
pub trait Display {
    /// Current playable area.
    fn field(&self) -> Field;

    /// Wipe the field back to an empty bordered area.
    fn clear(&mut self);

    fn draw(&mut self, texture: Texture, pos: Coords);

    /// The old head turns into body, the new head is drawn.
    fn move_head(&mut self, old: Coords, new: Coords, textures: &SnakeTextures) {
        self.draw(textures.body, old);
        self.draw(textures.head, new);
    }

    /// A body segment shifts one place towards the head. Cell-based surfaces
    /// have nothing to redraw here.
    fn move_body(&mut self, _old: Coords, _new: Coords, _textures: &SnakeTextures) {}

    /// The tail leaves `old` and is now at `new`.
    fn move_tail(&mut self, old: Coords, new: Coords, textures: &SnakeTextures) {
        self.draw(textures.tail, new);
        self.draw(Texture::Background, old);
    }

    fn set_length(&mut self, length: usize);

    fn set_max_length(&mut self, max_length: usize);

    /// Short message on the status line, e.g. "Paused".
    fn show_status(&mut self, message: &str);

    fn clear_status(&mut self);

    fn flush(&mut self) -> io::Result<()>;
}
