use std::{sync::Arc, thread::sleep, time::Instant};

use anyhow::Result;
use rand::Rng;
use tracing::{debug, info};

use crate::config::{Config, WallPolicy};
use crate::entity::{respawn, Grid, Player, MIN_GRID};
use crate::input::Controls;
use crate::render::{self, Frame};
use crate::term::Surface;
use crate::Coords;

const FINISH_MESSAGE: &str = "Finished. Press any key to exit.";

/// Everything the loop mutates between frames.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameState {
    pub grid: Grid,
    pub player: Player,
    pub food: Coords,
}

impl GameState {
    pub fn new<R: Rng + ?Sized>(grid: Grid, rng: &mut R) -> Self {
        let player = Player::new(grid.center());
        let food = respawn(rng, &grid, player.pos);
        GameState { grid, player, food }
    }

    /// Move the player and eat. Returns whether the food was eaten.
    pub fn update<R: Rng + ?Sized>(&mut self, policy: WallPolicy, rng: &mut R) -> bool {
        self.player.advance(&self.grid, policy);
        debug_assert!(self.grid.is_interior(self.player.pos));

        if self.player.collides_with(self.food) {
            self.food = respawn(rng, &self.grid, self.player.pos);
            true
        } else {
            false
        }
    }

    /// Adopt new grid dimensions, pulling both entities back inside.
    pub fn resize<R: Rng + ?Sized>(&mut self, grid: Grid, rng: &mut R) {
        if grid == self.grid {
            return;
        }

        self.grid = grid;
        self.player.pos = grid.clamp(self.player.pos);
        self.food = grid.clamp(self.food);
        if self.player.collides_with(self.food) {
            self.food = respawn(rng, &self.grid, self.player.pos);
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Running,
    Stopped,
}

/// Why [`Game::run`] returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Stopped,
    Reset,
}

pub struct Game<S, R> {
    config: Config,
    surface: S,
    rng: R,
    controls: Arc<Controls>,
    state: GameState,
    phase: Phase,
    frame: u64,
}

impl<S: Surface, R: Rng> Game<S, R> {
    pub fn new(config: Config, mut surface: S, mut rng: R) -> Result<Self> {
        let grid = config.grid_for(surface.viewport()?);
        let state = GameState::new(grid, &mut rng);
        info!(cols = grid.cols, rows = grid.rows, wall = ?config.wall, "game ready");

        Ok(Game {
            config,
            surface,
            rng,
            controls: Controls::new(),
            state,
            phase: Phase::Running,
            frame: 0,
        })
    }

    /// Handle for the input listener.
    pub fn controls(&self) -> Arc<Controls> {
        self.controls.clone()
    }

    pub fn frame(&self) -> u64 {
        self.frame
    }

    /// Tick until the listener asks to stop or reset.
    pub fn run(&mut self) -> Result<Outcome> {
        loop {
            if let Some(outcome) = self.step()? {
                return Ok(outcome);
            }

            if let Some(interval) = self.config.tick {
                sleep(interval);
            }
        }
    }

    /// Requests are only looked at here, between ticks, so a frame is never cut short.
    /// Once stopped, nothing ticks again until [`Game::reset`].
    pub fn step(&mut self) -> Result<Option<Outcome>> {
        if self.phase == Phase::Stopped {
            return Ok(Some(Outcome::Stopped));
        }

        if self.controls.stop_requested() {
            self.phase = Phase::Stopped;
            info!(frames = self.frame, "stopping");
            return Ok(Some(Outcome::Stopped));
        }

        if self.controls.reset_requested() {
            return Ok(Some(Outcome::Reset));
        }

        self.tick()?;
        Ok(None)
    }

    pub fn tick(&mut self) -> Result<Frame> {
        let started = Instant::now();

        // sampled even at a fixed size so the renderer checks against the real terminal
        let viewport = self.surface.viewport()?;
        if self.config.resample {
            let grid = self.config.grid_for(viewport);
            if grid.cols < MIN_GRID || grid.rows < MIN_GRID {
                let msg = format!("terminal too small: {}x{}", viewport.0, viewport.1);
                render::report(&mut self.surface, &msg)?;
                return Ok(Frame::Abandoned);
            }
            self.state.resize(grid, &mut self.rng);
        }

        self.state.player.direction = self.controls.direction();
        if self.state.update(self.config.wall, &mut self.rng) {
            debug!(food = ?self.state.food, "food eaten");
        }

        let frame = render::draw_grid(&mut self.surface, &self.state, &self.config.glyphs)?;
        if frame == Frame::Drawn {
            self.frame += 1;
        }

        if self.config.debug {
            debug!(
                cols = self.state.grid.cols,
                rows = self.state.grid.rows,
                time_ms = started.elapsed().as_millis() as u64,
                frame = self.frame,
                player = ?self.state.player.pos,
                food = ?self.state.food,
                "tick"
            );
        }

        Ok(frame)
    }

    /// Start over: fresh state, cleared requests, new screen. The caller starts a new listener.
    pub fn reset(&mut self) -> Result<()> {
        self.controls.clear();

        let mut grid = self.state.grid;
        if self.config.resample {
            let sampled = self.config.grid_for(self.surface.viewport()?);
            if sampled.cols >= MIN_GRID && sampled.rows >= MIN_GRID {
                grid = sampled;
            }
        }

        self.state = GameState::new(grid, &mut self.rng);
        self.phase = Phase::Running;
        self.frame = 0;
        self.surface.clear()?;
        info!("game reset");
        Ok(())
    }

    /// Final screen once stopped.
    pub fn finish(&mut self) -> Result<()> {
        self.phase = Phase::Stopped;
        self.surface.clear()?;
        if self.surface.set_cursor((0, 0)).is_ok() {
            self.surface.write_str(FINISH_MESSAGE)?;
        }
        self.surface.flush()
    }
}
