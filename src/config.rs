use std::{path::PathBuf, time::Duration};

use anyhow::{bail, Result};
use clap::{Parser, ValueEnum};

use crate::entity::{Grid, MIN_GRID};
use crate::{Coords, TermInt};

const DEFAULT_LOG_FILE: &str = "rpg-console.log";

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum WallPolicy {
    /// Leave one side, come back in on the opposite side
    Wrap,
    /// Stop at the wall
    Clamp,
}

#[derive(Parser, Debug)]
#[command(name = "rpg-console")]
#[command(about = "Move a glyph around a bordered terminal grid and eat the food")]
pub struct Args {
    /// Grid width in cells (defaults to the terminal width minus one)
    #[arg(long)]
    pub width: Option<TermInt>,

    /// Grid height in cells (defaults to the terminal height)
    #[arg(long)]
    pub height: Option<TermInt>,

    #[arg(long, default_value_t = '#')]
    pub player_glyph: char,

    #[arg(long, default_value_t = '*')]
    pub food_glyph: char,

    #[arg(long, default_value_t = ' ')]
    pub blank_glyph: char,

    #[arg(long, default_value_t = '+')]
    pub corner_glyph: char,

    #[arg(long, default_value_t = '|')]
    pub vertical_glyph: char,

    #[arg(long, default_value_t = '-')]
    pub horizontal_glyph: char,

    /// What happens when the player walks into a wall
    #[arg(long, value_enum, default_value_t = WallPolicy::Wrap)]
    pub wall: WallPolicy,

    /// Sleep between ticks, in milliseconds. Uncapped when absent or 0.
    #[arg(long)]
    pub tick_ms: Option<u64>,

    /// Keep the grid size from startup instead of following terminal resizes
    #[arg(long)]
    pub fixed_size: bool,

    /// Log per-frame telemetry
    #[arg(long)]
    pub debug: bool,

    /// Where log output goes
    #[arg(long)]
    pub log_file: Option<PathBuf>,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Glyphs {
    pub player: char,
    pub food: char,
    pub blank: char,
    pub corner: char,
    pub vertical: char,
    pub horizontal: char,
}

impl Default for Glyphs {
    fn default() -> Self {
        Glyphs { player: '#', food: '*', blank: ' ', corner: '+', vertical: '|', horizontal: '-' }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Config {
    pub width: Option<TermInt>,
    pub height: Option<TermInt>,
    pub glyphs: Glyphs,
    pub wall: WallPolicy,
    pub tick: Option<Duration>,
    pub resample: bool,
    pub debug: bool,
    pub log_file: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            width: None,
            height: None,
            glyphs: Glyphs::default(),
            wall: WallPolicy::Wrap,
            tick: None,
            resample: true,
            debug: false,
            log_file: None,
        }
    }
}

impl Config {
    /// Validate the command line against the viewport sampled at startup.
    pub fn from_args(args: Args, viewport: Coords) -> Result<Self> {
        let dims = [("width", args.width, viewport.0), ("height", args.height, viewport.1)];
        for (name, dim, room) in dims.iter() {
            if let Some(v) = dim {
                if *v < MIN_GRID {
                    bail!("grid {} must be at least {}, got {}", name, MIN_GRID, v);
                }
                if v > room {
                    bail!("grid {} {} does not fit the terminal ({} cells)", name, v, room);
                }
            }
        }

        let log_file = match (args.log_file, args.debug) {
            (Some(path), _) => Some(path),
            (None, true) => Some(PathBuf::from(DEFAULT_LOG_FILE)),
            (None, false) => None,
        };

        let config = Config {
            width: args.width,
            height: args.height,
            glyphs: Glyphs {
                player: args.player_glyph,
                food: args.food_glyph,
                blank: args.blank_glyph,
                corner: args.corner_glyph,
                vertical: args.vertical_glyph,
                horizontal: args.horizontal_glyph,
            },
            wall: args.wall,
            tick: args.tick_ms.filter(|ms| *ms > 0).map(Duration::from_millis),
            resample: !args.fixed_size,
            debug: args.debug,
            log_file,
        };

        let grid = config.grid_for(viewport);
        if grid.cols < MIN_GRID || grid.rows < MIN_GRID {
            bail!(
                "terminal too small: {}x{} grid from a {}x{} viewport, need at least {}x{}",
                grid.cols, grid.rows, viewport.0, viewport.1, MIN_GRID, MIN_GRID
            );
        }

        Ok(config)
    }

    /// Grid dimensions for a viewport. Explicit sizes win, the rest follows the terminal.
    pub fn grid_for(&self, viewport: Coords) -> Grid {
        let cols = self.width.unwrap_or_else(|| viewport.0.saturating_sub(1));
        let rows = self.height.unwrap_or(viewport.1);
        Grid::new(cols, rows)
    }
}
