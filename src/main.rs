use std::fs::File;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use log::info;

use slicer_snake::config::GameConfig;
use slicer_snake::game::{GameMode, Session};
use slicer_snake::input::{InputSource, Wait};
use slicer_snake::snake::Direction;
use slicer_snake::term::{KeyboardInput, TermManager};

/// Terminal snake, alone or against a rival that can slice you apart
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Field width in cells, border included
    #[arg(long, default_value_t = 26)]
    width: i32,

    /// Field height in cells, border included
    #[arg(long, default_value_t = 27)]
    height: i32,

    /// Starting length of every snake
    #[arg(long, default_value_t = 3)]
    length: usize,

    /// Initial delay between ticks, in milliseconds
    #[arg(long, default_value_t = 90)]
    delay_ms: u64,

    /// Skip the menu and start in this mode
    #[arg(long, value_enum)]
    mode: Option<Mode>,

    /// Write logs to this file
    #[arg(long)]
    log_file: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Mode {
    Slicer,
    Classic,
}

impl From<Mode> for GameMode {
    fn from(mode: Mode) -> Self {
        match mode {
            Mode::Slicer => GameMode::Slicer,
            Mode::Classic => GameMode::Classic,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum AfterGame {
    Restart,
    Exit,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logger(cli.log_file.as_deref())?;

    let config = GameConfig {
        starting_length: cli.length,
        start_delay: Duration::from_millis(cli.delay_ms),
        ..GameConfig::new(cli.width, cli.height)
    };
    config.validate().context("Invalid game configuration")?;

    let mut term = TermManager::new(config.field())?;
    term.setup()?;

    let result = run(&mut term, &config, cli.mode.map(GameMode::from));

    // The terminal must come back even when the game failed.
    term.restore()?;
    result
}

fn init_logger(log_file: Option<&Path>) -> Result<()> {
    // Logging to the terminal would tear up the game screen.
    let default_level = if log_file.is_some() { "info" } else { "off" };
    let mut builder = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level));

    if let Some(path) = log_file {
        let file = File::create(path).with_context(|| format!("Failed to create log file {}", path.display()))?;
        builder.target(env_logger::Target::Pipe(Box::new(file)));
    }

    builder.try_init().context("Failed to initialize logger")
}

fn run(term: &mut TermManager, config: &GameConfig, mode: Option<GameMode>) -> Result<()> {
    play_rounds(term, mode, choose_mode, |term, mode| play_game(term, config, mode))
}

/// Play games until the player leaves. Without a fixed mode the menu comes
/// up before every game.
fn play_rounds<T, C, P>(ctx: &mut T, fixed: Option<GameMode>, mut choose: C, mut play: P) -> Result<()>
where
    C: FnMut(&mut T) -> Result<Option<GameMode>>,
    P: FnMut(&mut T, GameMode) -> Result<AfterGame>,
{
    loop {
        let mode = match fixed {
            Some(mode) => mode,
            None => match choose(ctx)? {
                Some(mode) => mode,
                None => return Ok(()),
            },
        };

        match play(ctx, mode)? {
            AfterGame::Restart => {}
            AfterGame::Exit => return Ok(()),
        }
    }
}

fn play_game(term: &mut TermManager, config: &GameConfig, mode: GameMode) -> Result<AfterGame> {
    term.hide_message()?;
    info!("starting {} game", mode);

    // Each game gets a fresh keyboard state so old turns don't leak in.
    let mut input = KeyboardInput::new();
    let outcome = Session::new(&mut *term, &mut input, config.clone()).start_game(mode)?;
    info!("{} game over: {:?}", mode, outcome);

    if outcome.quit {
        return Ok(AfterGame::Exit);
    }
    game_over(term, outcome.length, outcome.max_length)
}

fn choose_mode(term: &mut TermManager) -> Result<Option<GameMode>> {
    let mut input = KeyboardInput::new();
    let mut mode = GameMode::Slicer;

    loop {
        let selector = match mode {
            GameMode::Slicer => "[ Slicer Snake ]     Classic  ",
            GameMode::Classic => "  Slicer Snake     [ Classic ]",
        };
        term.show_message(&[
            "Get as long as you can",
            "But don't let the other snake eat you!",
            "",
            selector,
            "",
            "Left/Right to choose, Enter to play",
        ])?;

        input.collect(Wait::Forever).context("Failed to read the keyboard")?;
        let state = input.state();

        if state.quit() {
            return Ok(None);
        }
        if state.confirm() {
            return Ok(Some(mode));
        }
        match state.direction() {
            Some(Direction::Left) => mode = GameMode::Slicer,
            Some(Direction::Right) => mode = GameMode::Classic,
            _ => {}
        }
    }
}

fn game_over(term: &mut TermManager, length: usize, max_length: usize) -> Result<AfterGame> {
    let score = format!("Length: {}   Max Length: {}", length, max_length);
    term.show_message(&["GAME OVER", "", &score, "", "R: Restart | Enter: Quit"])?;

    let mut input = KeyboardInput::new();
    loop {
        input.collect(Wait::Forever).context("Failed to read the keyboard")?;
        let state = input.state();

        if state.restart() {
            return Ok(AfterGame::Restart);
        }
        if state.confirm() || state.quit() {
            return Ok(AfterGame::Exit);
        }
    }
}
