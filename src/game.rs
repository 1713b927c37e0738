use std::fmt;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use log::{debug, info, trace};
use rand::rngs::ThreadRng;
use rand::Rng;

use crate::ai;
use crate::config::GameConfig;
use crate::display::{Display, SnakeTextures, Texture};
use crate::input::{InputSource, Wait};
use crate::snake::{check_slice, Collision, Snake, SnakeId};
use crate::{Coords, Field};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameMode {
    Slicer,
    Classic,
}

impl fmt::Display for GameMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GameMode::Slicer => write!(f, "slicer"),
            GameMode::Classic => write!(f, "classic"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    Running,
    Ended,
}

/// Tick delay, shortened by growth and lengthened by slicing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Speed {
    delay: Duration,
    step: Duration,
}

impl Speed {
    pub fn new(delay: Duration, step: Duration) -> Self {
        Speed { delay, step }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    pub fn accelerate(&mut self, times: u32) {
        self.delay = self.delay.saturating_sub(self.step * times);
    }

    pub fn decelerate(&mut self, times: u32) {
        self.delay += self.step * times;
    }
}

/// Summary of a finished session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GameOutcome {
    pub length: usize,
    pub max_length: usize,
    pub ticks: u64,
    pub quit: bool,
}

/// One game, from the first tick to the player's death.
///
/// Snakes and food are owned here; the display and input are borrowed for
/// the length of the session.
pub struct Session<'a, D, I, R = ThreadRng> {
    display: &'a mut D,
    input: &'a mut I,
    rng: R,
    config: GameConfig,
    mode: GameMode,
    field: Field,
    state: SessionState,
    /// In tick order. The player's snake is never removed.
    snakes: Vec<Snake>,
    player: SnakeId,
    next_id: SnakeId,
    food: Vec<Coords>,
    speed: Speed,
    max_length: usize,
    ticks: u64,
    quit: bool,
    last_tick: Instant,
}

impl<'a, D: Display, I: InputSource> Session<'a, D, I, ThreadRng> {
    pub fn new(display: &'a mut D, input: &'a mut I, config: GameConfig) -> Self {
        Self::with_rng(display, input, config, rand::thread_rng())
    }
}

impl<'a, D: Display, I: InputSource, R: Rng> Session<'a, D, I, R> {
    pub fn with_rng(display: &'a mut D, input: &'a mut I, config: GameConfig, rng: R) -> Self {
        let field = display.field();
        let speed = Speed::new(config.start_delay, config.speed_step);

        Session {
            display,
            input,
            rng,
            config,
            mode: GameMode::Classic,
            field,
            state: SessionState::Idle,
            snakes: Vec::new(),
            player: 0,
            next_id: 0,
            food: Vec::new(),
            speed,
            max_length: 0,
            ticks: 0,
            quit: false,
            last_tick: Instant::now(),
        }
    }

    /// Play a whole game of `mode` and report how it went.
    pub fn start_game(&mut self, mode: GameMode) -> Result<GameOutcome> {
        self.reset(mode)?;

        while self.is_alive() {
            self.tick()?;
        }

        let outcome = self.outcome();
        info!(
            "{} game over after {} ticks: length {}, max length {}",
            self.mode, outcome.ticks, outcome.length, outcome.max_length
        );
        Ok(outcome)
    }

    pub fn reset(&mut self, mode: GameMode) -> Result<()> {
        self.mode = mode;
        self.snakes.clear();
        self.food.clear();
        self.ticks = 0;
        self.quit = false;
        self.speed = Speed::new(self.config.start_delay, self.config.speed_step);

        self.display.clear();
        self.field = self.display.field();
        info!("starting {} game on a {}x{} field", mode, self.field.width, self.field.height);

        self.player = self.add_snake(self.config.player_start, SnakeTextures::PLAYER);
        if mode == GameMode::Slicer {
            self.add_snake(self.config.rival_start(self.field), SnakeTextures::RIVAL);
            // The rival goes first in every tick.
            self.snakes.rotate_right(1);
        }

        self.spawn_food();

        let length = self.player_snake().length();
        self.max_length = length;
        self.display.set_length(length);
        if mode == GameMode::Slicer {
            self.display.set_max_length(length);
        }

        self.display.flush().context("Failed to draw the new game")?;

        self.state = SessionState::Running;
        self.last_tick = Instant::now();
        Ok(())
    }

    /// Run one tick: wait out the remaining delay while collecting input, then
    /// advance every snake and settle food, slices and deaths.
    pub fn tick(&mut self) -> Result<()> {
        let remaining = self.speed.delay().saturating_sub(self.last_tick.elapsed());
        trace!("tick {}: waiting {:?}", self.ticks, remaining);
        self.input.collect(Wait::For(remaining)).context("Failed to read input")?;
        self.last_tick = Instant::now();

        self.process_input()?;
        if self.quit {
            self.state = SessionState::Ended;
            return Ok(());
        }

        self.step_snakes();

        let player = self.player_snake();
        if let Some(collision) = player.check_collision(self.field) {
            debug!("player died: {:?}", collision);
            if let Collision::Wall(pos) = collision {
                self.display.draw(Texture::Collision, pos);
            }
            self.state = SessionState::Ended;
        }

        self.ticks += 1;
        self.display.flush().context("Failed to draw tick")?;
        Ok(())
    }

    fn process_input(&mut self) -> Result<()> {
        if self.input.state().quit() {
            info!("quit requested");
            self.quit = true;
            return Ok(());
        }

        let latest = self.input.state().direction();
        let previous = self.input.state().prev_direction();
        let player = self.player_index();
        let snake = &mut self.snakes[player];
        let old_dir = snake.direction();

        if let Some(dir) = latest {
            snake.set_direction(dir);
        }
        // The newest key may have been a reversal; try the one before it.
        if snake.direction() == old_dir {
            if let Some(dir) = previous {
                snake.set_direction(dir);
            }
        }

        if self.input.state().pause() {
            self.pause()?;
        }
        Ok(())
    }

    fn pause(&mut self) -> Result<()> {
        debug!("paused at tick {}", self.ticks);
        self.display.show_status("Paused");
        self.display.flush().context("Failed to show pause")?;

        loop {
            self.input.collect(Wait::Forever).context("Failed to read input")?;
            let state = self.input.state();
            if state.quit() {
                self.quit = true;
                break;
            }
            if state.confirm() {
                break;
            }
        }

        self.display.clear_status();
        // Time spent paused does not count against the next tick.
        self.last_tick = Instant::now();
        debug!("resumed");
        Ok(())
    }

    fn step_snakes(&mut self) {
        let mut i = 0;
        while i < self.snakes.len() {
            let is_player = self.snakes[i].id() == self.player;

            if !is_player {
                let snake = &mut self.snakes[i];
                if let Some(head) = snake.head() {
                    let dir = ai::steer(head, snake.direction(), self.field, &self.food, &mut self.rng);
                    snake.set_direction(dir);
                }
            }

            self.snakes[i].move_step(&mut *self.display);

            if self.mode == GameMode::Slicer {
                let hits = check_slice(&mut self.snakes, i, &mut *self.display);
                let removed: usize = hits.iter().map(|hit| hit.removed).sum();
                if removed > 0 {
                    debug!("snake {} sliced: {:?}", self.snakes[i].id(), hits);
                    self.speed.decelerate(removed as u32);
                    let length = self.player_snake().length();
                    self.display.set_length(length);
                }
            }

            if !is_player {
                if let Some(collision) = self.snakes[i].check_collision(self.field) {
                    let dead = self.snakes.remove(i);
                    self.bury(&dead, collision);
                    continue;
                }
            }

            self.feed(i, is_player);
            i += 1;
        }
    }

    fn feed(&mut self, index: usize, is_player: bool) {
        let snake = &mut self.snakes[index];
        let eaten = match self.food.iter().position(|food| snake.check_food(*food)) {
            Some(eaten) => eaten,
            None => return,
        };

        debug!("snake {} ate at {:?}, length {}", snake.id(), self.food[eaten], snake.length());
        self.speed.accelerate(1);

        if is_player {
            let length = snake.length();
            self.display.set_length(length);
            if self.mode == GameMode::Slicer && length > self.max_length {
                self.max_length = length;
                self.display.set_max_length(length);
            }
        }

        self.food.remove(eaten);
        self.spawn_food();
    }

    fn bury(&mut self, dead: &Snake, collision: Collision) {
        debug!("snake {} died: {:?}", dead.id(), collision);
        for seg in dead.body() {
            if !self.field.is_wall(*seg) {
                self.display.draw(Texture::Background, *seg);
            }
        }
        if let Collision::Wall(pos) = collision {
            self.display.draw(Texture::Collision, pos);
        }
    }

    /// Drop a food item on a random free interior cell.
    ///
    /// Rejection sampling: fine while the field is mostly empty, never
    /// returns on a completely full field.
    pub fn spawn_food(&mut self) {
        let food = loop {
            let candidate = Coords::new(
                self.rng.gen_range(1..self.field.width - 1),
                self.rng.gen_range(1..self.field.height - 1),
            );

            let on_snake = self.snakes.iter().any(|s| s.touches(candidate));
            if !on_snake && !self.food.contains(&candidate) {
                break candidate;
            }
        };

        self.food.push(food);
        self.display.draw(Texture::Food, food);
    }

    fn add_snake(&mut self, pos: Coords, textures: SnakeTextures) -> SnakeId {
        let id = self.next_id;
        self.next_id += 1;

        let snake = Snake::new(id, self.field, pos, self.config.starting_length, textures);
        let mut segments = snake.body().iter().rev();
        if let Some(head) = segments.next() {
            self.display.draw(textures.head, *head);
        }
        for seg in segments {
            self.display.draw(textures.body, *seg);
        }

        self.snakes.push(snake);
        id
    }

    fn player_index(&self) -> usize {
        self.snakes
            .iter()
            .position(|s| s.id() == self.player)
            .expect("the player's snake is never removed")
    }

    pub fn player_snake(&self) -> &Snake {
        &self.snakes[self.player_index()]
    }

    pub fn snakes(&self) -> &[Snake] {
        &self.snakes
    }

    pub fn food(&self) -> &[Coords] {
        &self.food
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn is_alive(&self) -> bool {
        self.state == SessionState::Running
    }

    pub fn delay(&self) -> Duration {
        self.speed.delay()
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    pub fn outcome(&self) -> GameOutcome {
        let length = self.snakes.iter().find(|s| s.id() == self.player).map_or(0, Snake::length);
        GameOutcome {
            length,
            max_length: self.max_length.max(length),
            ticks: self.ticks,
            quit: self.quit,
        }
    }
}
