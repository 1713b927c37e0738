use std::io::{self, stdout, Stdout, Write};
use std::time::Instant;

use anyhow::{ensure, Context, Result};
use crossterm::event::{poll, read, Event, KeyEvent, KeyEventKind};
use crossterm::style::{Color, Print, ResetColor, SetForegroundColor};
use crossterm::terminal::{ClearType, EnterAlternateScreen, LeaveAlternateScreen};
use crossterm::{cursor, execute, queue, terminal};
use log::debug;

use crate::display::{Display, SnakeTextures, Texture};
use crate::input::{key_from_event, InputSource, InputState, Wait};
use crate::{Coords, Field};

type TermInt = u16;
type TermCoords = (TermInt, TermInt);

/// Terminal columns per field cell; keeps cells roughly square.
const CELL_WIDTH: TermInt = 2;

const LENGTH_LABEL: &str = "Length: ";
const MAX_LENGTH_LABEL: &str = "Max Length: ";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Glyph {
    ch: char,
    color: Option<Color>,
}

impl Glyph {
    const BLANK: Glyph = Glyph { ch: ' ', color: None };

    fn new(ch: char, color: Color) -> Self {
        Glyph { ch, color: Some(color) }
    }
}

fn texture_glyphs(texture: Texture) -> [Glyph; 2] {
    let (chars, color) = match texture {
        Texture::Snake => (['(', ')'], Color::DarkGreen),
        Texture::SnakeHead => (['<', '>'], Color::Green),
        Texture::RivalSnake => (['(', ')'], Color::DarkMagenta),
        Texture::RivalSnakeHead => (['<', '>'], Color::Magenta),
        Texture::Food => (['{', '}'], Color::Yellow),
        Texture::Collision => (['*', '*'], Color::Red),
        Texture::Background => return [Glyph::BLANK; 2],
    };
    [Glyph::new(chars[0], color), Glyph::new(chars[1], color)]
}

/// Crossterm-backed display. Draws land in a screen buffer and only reach
/// the terminal on `flush`.
pub struct TermManager {
    field: Field,
    width: TermInt,
    height: TermInt,
    stdout: Stdout,
    screen: Vec<Glyph>,
    dirty: Vec<usize>,
    needs_clear: bool,
    current_msg: Option<Message>,
}

struct Message {
    top_left: TermCoords,
    width: TermInt,
    height: TermInt,
}

impl TermManager {
    pub fn new(field: Field) -> Result<Self> {
        let width = TermInt::try_from(field.width)
            .ok()
            .and_then(|w| w.checked_mul(CELL_WIDTH))
            .with_context(|| format!("field width {} does not fit the terminal", field.width))?;
        // One extra row for the status line.
        let height = TermInt::try_from(field.height)
            .ok()
            .and_then(|h| h.checked_add(1))
            .with_context(|| format!("field height {} does not fit the terminal", field.height))?;
        let screen = vec![Glyph::BLANK; width as usize * height as usize];

        Ok(TermManager {
            field,
            width,
            height,
            stdout: stdout(),
            screen,
            dirty: Vec::new(),
            needs_clear: true,
            current_msg: None,
        })
    }

    pub fn setup(&mut self) -> Result<()> {
        let (cols, rows) = terminal::size().context("Failed to read terminal size")?;
        ensure!(
            cols >= self.width && rows >= self.height,
            "terminal is {}x{}, the game needs at least {}x{}",
            cols,
            rows,
            self.width,
            self.height
        );

        execute!(self.stdout, EnterAlternateScreen).context("Failed to enter alternate screen")?;
        terminal::enable_raw_mode().context("Failed to enable raw mode")?;
        execute!(self.stdout, cursor::Hide, cursor::DisableBlinking).context("Failed to hide cursor")?;
        debug!("terminal ready: {}x{} of {}x{}", self.width, self.height, cols, rows);
        Ok(())
    }

    pub fn restore(&mut self) -> Result<()> {
        terminal::disable_raw_mode().context("Failed to disable raw mode")?;
        execute!(self.stdout, cursor::Show, cursor::EnableBlinking, LeaveAlternateScreen)
            .context("Failed to leave alternate screen")?;
        debug!("terminal restored");
        Ok(())
    }

    /// Show a boxed, centred message over the field until `hide_message`.
    pub fn show_message(&mut self, lines: &[&str]) -> io::Result<()> {
        if self.has_message() {
            self.hide_message()?;
        }
        self.flush()?;

        let msg_height = (lines.len() + 2) as TermInt;
        let msg_width = (lines.iter().map(|x| x.chars().count()).max().unwrap_or(0) + 4) as TermInt;
        let center = (self.width / 2, (self.height - 1) / 2);
        let top_left = (
            center.0.saturating_sub(msg_width / 2),
            center.1.saturating_sub(msg_height / 2),
        );

        // Print the top and bottom empty lines
        for y in [top_left.1, top_left.1 + msg_height - 1].iter() {
            for x_diff in 0..msg_width {
                self.print_at_no_save((top_left.0 + x_diff, *y), ' ')?;
            }
        }

        // Print the message lines
        for (i, line) in lines.iter().enumerate() {
            let padded_line = format!("{line: ^width$}", line = line, width = msg_width as usize);
            let y = top_left.1 + i as TermInt + 1;
            for (x_diff, ch) in padded_line.chars().enumerate() {
                self.print_at_no_save((top_left.0 + x_diff as TermInt, y), ch)?;
            }
        }

        self.current_msg = Some(Message::new(msg_width, msg_height, top_left));
        self.stdout.flush()
    }

    pub fn hide_message(&mut self) -> io::Result<()> {
        let msg = match self.current_msg.take() {
            Some(msg) => msg,
            None => return Ok(()),
        };

        // Restore the content from the screen buffer
        for y_diff in 0..msg.height {
            for x_diff in 0..msg.width {
                let (x, y) = (msg.top_left.0 + x_diff, msg.top_left.1 + y_diff);
                if x < self.width && y < self.height {
                    self.dirty.push(self.index((x, y)));
                }
            }
        }

        self.flush()
    }

    pub fn has_message(&self) -> bool {
        self.current_msg.is_some()
    }

    ///////////////////////////////////////////////////////////////////////////

    fn index(&self, pos: TermCoords) -> usize {
        self.width as usize * pos.1 as usize + pos.0 as usize
    }

    fn put(&mut self, pos: TermCoords, glyph: Glyph) {
        if pos.0 >= self.width || pos.1 >= self.height {
            return;
        }
        let i = self.index(pos);
        if self.screen[i] != glyph {
            self.screen[i] = glyph;
            self.dirty.push(i);
        }
    }

    fn put_cell(&mut self, pos: Coords, glyphs: [Glyph; 2]) {
        if !self.field.contains(pos) {
            return;
        }
        let x = pos.x as TermInt * CELL_WIDTH;
        let y = pos.y as TermInt;
        self.put((x, y), glyphs[0]);
        self.put((x + 1, y), glyphs[1]);
    }

    fn glyphs_at(&self, pos: Coords) -> Option<[Glyph; 2]> {
        if !self.field.contains(pos) {
            return None;
        }
        let i = self.index((pos.x as TermInt * CELL_WIDTH, pos.y as TermInt));
        Some([self.screen[i], self.screen[i + 1]])
    }

    fn put_text(&mut self, x: TermInt, text: &str, color: Color) {
        let y = self.height - 1;
        for (i, ch) in text.chars().enumerate() {
            self.put((x + i as TermInt, y), Glyph::new(ch, color));
        }
    }

    /// Status line region between the two counters.
    fn status_span(&self) -> (TermInt, TermInt) {
        let start = (LENGTH_LABEL.len() + 6) as TermInt;
        let end = self.width.saturating_sub((MAX_LENGTH_LABEL.len() + 5) as TermInt);
        (start, end.max(start))
    }

    fn draw_borders(&mut self) {
        let border = Color::Cyan;
        let (w, h) = (self.field.width, self.field.height);

        for x in 0..w {
            let (left, right) = if x == 0 {
                (' ', '+')
            } else if x == w - 1 {
                ('+', ' ')
            } else {
                ('-', '-')
            };
            for y in [0, h - 1] {
                self.put_cell(Coords::new(x, y), [Glyph::new(left, border), Glyph::new(right, border)]);
            }
        }

        for y in 1..h - 1 {
            self.put_cell(Coords::new(0, y), [Glyph::BLANK, Glyph::new('|', border)]);
            self.put_cell(Coords::new(w - 1, y), [Glyph::new('|', border), Glyph::BLANK]);
        }
    }

    fn print_at_no_save(&mut self, pos: TermCoords, ch: char) -> io::Result<()> {
        // To be used for printing messages, where we don't wanna overwrite our
        // local buffer to restore it when the message is hidden
        queue!(self.stdout, cursor::MoveTo(pos.0, pos.1), ResetColor, Print(ch))
    }
}

impl Display for TermManager {
    fn field(&self) -> Field {
        self.field
    }

    fn clear(&mut self) {
        self.screen = vec![Glyph::BLANK; self.width as usize * self.height as usize];
        self.dirty.clear();
        self.needs_clear = true;
        self.current_msg = None;
        self.draw_borders();
    }

    fn draw(&mut self, texture: Texture, pos: Coords) {
        self.put_cell(pos, texture_glyphs(texture));
    }

    fn move_tail(&mut self, old: Coords, new: Coords, textures: &SnakeTextures) {
        self.draw(textures.tail, new);

        // Only erase the old tail if nothing else has been drawn over it
        let tail = texture_glyphs(textures.tail);
        if self.glyphs_at(old) == Some(tail) {
            self.draw(Texture::Background, old);
        }
    }

    fn set_length(&mut self, length: usize) {
        self.put_text(2, &format!("{}{:<3}", LENGTH_LABEL, length), Color::Red);
    }

    fn set_max_length(&mut self, max_length: usize) {
        let text = format!("{}{:<3}", MAX_LENGTH_LABEL, max_length);
        let x = self.width.saturating_sub(text.len() as TermInt + 1);
        self.put_text(x, &text, Color::Red);
    }

    fn show_status(&mut self, message: &str) {
        self.clear_status();
        let (start, end) = self.status_span();
        let room = (end - start) as usize;
        let text: String = message.chars().take(room).collect();
        let x = start + (room - text.chars().count()) as TermInt / 2;
        self.put_text(x, &text, Color::Red);
    }

    fn clear_status(&mut self) {
        let (start, end) = self.status_span();
        let y = self.height - 1;
        for x in start..end {
            self.put((x, y), Glyph::BLANK);
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        if self.needs_clear {
            queue!(self.stdout, terminal::Clear(ClearType::All))?;
            self.needs_clear = false;
            self.dirty = (0..self.screen.len()).collect();
        }

        let mut color = None;
        for i in std::mem::take(&mut self.dirty) {
            let glyph = self.screen[i];
            let x = (i % self.width as usize) as TermInt;
            let y = (i / self.width as usize) as TermInt;

            if glyph.color != color {
                match glyph.color {
                    Some(c) => queue!(self.stdout, SetForegroundColor(c))?,
                    None => queue!(self.stdout, ResetColor)?,
                }
                color = glyph.color;
            }
            queue!(self.stdout, cursor::MoveTo(x, y), Print(glyph.ch))?;
        }

        queue!(self.stdout, ResetColor)?;
        self.stdout.flush()
    }
}

impl Message {
    pub fn new(width: TermInt, height: TermInt, top_left: TermCoords) -> Self {
        Message { width, height, top_left }
    }
}

/// Keyboard input read through crossterm's event queue.
#[derive(Debug, Default)]
pub struct KeyboardInput {
    state: InputState,
}

impl KeyboardInput {
    pub fn new() -> Self {
        Self::default()
    }

    fn read_key(&mut self) -> io::Result<Option<KeyEvent>> {
        match read()? {
            Event::Key(ev) if ev.kind != KeyEventKind::Release => Ok(Some(ev)),
            _ => Ok(None),
        }
    }
}

impl InputSource for KeyboardInput {
    fn collect(&mut self, wait: Wait) -> io::Result<()> {
        self.state.begin();

        match wait {
            Wait::For(duration) => {
                let deadline = Instant::now() + duration;
                // Keys pressed before the deadline are applied in order.
                while poll(deadline.saturating_duration_since(Instant::now()))? {
                    if let Some(key) = self.read_key()?.and_then(key_from_event) {
                        self.state.apply(key);
                    }
                }
            }
            Wait::Forever => loop {
                if let Some(ev) = self.read_key()? {
                    if let Some(key) = key_from_event(ev) {
                        self.state.apply(key);
                    }
                    break;
                }
            },
        }

        Ok(())
    }

    fn state(&self) -> &InputState {
        &self.state
    }
}
