use crate::config::WallPolicy;
use crate::{Coords, TermInt};
use Direction::*;

use rand::{seq::SliceRandom, Rng};

/// Smallest width or height that still leaves a playable interior.
pub const MIN_GRID: TermInt = 5;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Direction {
    None,
    North,
    NorthEast,
    East,
    SouthEast,
    South,
    SouthWest,
    West,
    NorthWest,
}

impl Direction {
    pub const ALL: [Direction; 9] = [None, North, NorthEast, East, SouthEast, South, SouthWest, West, NorthWest];

    pub fn delta(self) -> (i32, i32) {
        match self {
            None => (0, 0),
            North => (0, -1),
            NorthEast => (1, -1),
            East => (1, 0),
            SouthEast => (1, 1),
            South => (0, 1),
            SouthWest => (-1, 1),
            West => (-1, 0),
            NorthWest => (-1, -1),
        }
    }

    pub fn to_u8(self) -> u8 {
        self as u8
    }

    pub fn from_u8(raw: u8) -> Direction {
        Self::ALL.get(raw as usize).copied().unwrap_or(Direction::None)
    }
}

/// Move one cell along `dir`. Coordinates saturate at 0, which is always border.
pub fn step(pos: Coords, dir: Direction) -> Coords {
    let (dx, dy) = dir.delta();
    (shift(pos.0, dx), shift(pos.1, dy))
}

fn shift(v: TermInt, d: i32) -> TermInt {
    (v as i32 + d).clamp(0, TermInt::MAX as i32) as TermInt
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Grid {
    pub cols: TermInt,
    pub rows: TermInt,
}

impl Grid {
    pub fn new(cols: TermInt, rows: TermInt) -> Self {
        Grid { cols, rows }
    }

    pub fn max_x(&self) -> TermInt {
        self.cols - 2
    }

    pub fn max_y(&self) -> TermInt {
        self.rows - 2
    }

    pub fn center(&self) -> Coords {
        (self.cols / 2, self.rows / 2)
    }

    pub fn is_interior(&self, pos: Coords) -> bool {
        (1..=self.max_x()).contains(&pos.0) && (1..=self.max_y()).contains(&pos.1)
    }

    pub fn interior(&self) -> impl Iterator<Item = Coords> + '_ {
        (1..=self.max_y()).flat_map(move |y| (1..=self.max_x()).map(move |x| (x, y)))
    }

    /// Bring a position that left the interior back in. Each axis is handled on its own.
    pub fn apply_walls(&self, pos: Coords, policy: WallPolicy) -> Coords {
        (
            wall_axis(pos.0, self.max_x(), policy),
            wall_axis(pos.1, self.max_y(), policy),
        )
    }

    pub fn clamp(&self, pos: Coords) -> Coords {
        self.apply_walls(pos, WallPolicy::Clamp)
    }
}

fn wall_axis(v: TermInt, max: TermInt, policy: WallPolicy) -> TermInt {
    match policy {
        WallPolicy::Wrap if v < 1 => max,
        WallPolicy::Wrap if v > max => 1,
        WallPolicy::Clamp if v < 1 => 1,
        WallPolicy::Clamp if v > max => max,
        _ => v,
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Player {
    pub pos: Coords,
    pub direction: Direction,
}

impl Player {
    pub fn new(pos: Coords) -> Self {
        Player { pos, direction: Direction::None }
    }

    /// Advance one tick and resolve walls.
    pub fn advance(&mut self, grid: &Grid, policy: WallPolicy) {
        self.pos = grid.apply_walls(step(self.pos, self.direction), policy);
    }

    pub fn collides_with(&self, pos: Coords) -> bool {
        self.pos == pos
    }
}

/// Pick a random interior cell that is not `player`.
pub fn respawn<R: Rng + ?Sized>(rng: &mut R, grid: &Grid, player: Coords) -> Coords {
    let choices: Vec<Coords> = grid.interior().filter(|pos| *pos != player).collect();
    // MIN_GRID guarantees at least nine interior cells
    choices.choose(rng).copied().unwrap_or_else(|| grid.center())
}
