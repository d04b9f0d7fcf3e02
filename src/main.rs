mod config;
mod entity;
mod game;
mod input;
mod render;
mod term;
#[cfg(test)]
mod testing;

use std::{fs::File, sync::Mutex};

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{info, Level};

use crate::config::{Args, Config};
use crate::game::{Game, Outcome};
use crate::input::{spawn_listener, KeySource, TermKeys};
use crate::term::{Surface, TermManager};

pub type TermInt = u16;
pub type Coords = (u16, u16);

fn main() -> Result<()> {
    let args = Args::parse();

    let mut term = TermManager::new()?;
    let config = Config::from_args(args, term.viewport()?)?;
    init_logging(&config)?;

    term.setup()?;
    let result = play(&mut term, config);

    // Always try to restore terminal state.
    let restored = term.restore();
    result.and(restored)
}

fn play(term: &mut TermManager, config: Config) -> Result<()> {
    let mut game = Game::new(config, term, rand::thread_rng())?;

    loop {
        // Detached: it exits on its own after the key that ends the round, and the
        // previous round's listener has already returned by the time this one starts.
        drop(spawn_listener(TermKeys, game.controls()));

        match game.run()? {
            Outcome::Stopped => break,
            Outcome::Reset => game.reset()?,
        }
    }

    info!(frames = game.frame(), "finished");
    game.finish()?;
    TermKeys.read_key()?;
    Ok(())
}

/// Logs go to a file; the terminal belongs to the grid.
fn init_logging(config: &Config) -> Result<()> {
    let path = match &config.log_file {
        Some(path) => path,
        None => return Ok(()),
    };

    let file = File::create(path).with_context(|| format!("Error creating log file {}", path.display()))?;
    let level = if config.debug { Level::DEBUG } else { Level::INFO };

    tracing_subscriber::fmt()
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_max_level(level)
        .init();

    Ok(())
}
