use anyhow::Result;
use crossterm::style::Color;
use tracing::warn;

use crate::config::Glyphs;
use crate::game::GameState;
use crate::term::{OutOfBounds, Surface};
use crate::TermInt;

const PLAYER_COLOR: Color = Color::Cyan;
const FOOD_COLOR: Color = Color::Green;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cell {
    pub glyph: char,
    pub color: Option<Color>,
}

impl Cell {
    fn plain(glyph: char) -> Self {
        Cell { glyph, color: None }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Frame {
    Drawn,
    /// The terminal could not take the whole grid; the screen holds a report instead.
    Abandoned,
}

/// What goes at `(x, y)`. Border beats player beats food.
pub fn cell_at(state: &GameState, glyphs: &Glyphs, x: TermInt, y: TermInt) -> Cell {
    let (last_x, last_y) = (state.grid.cols - 1, state.grid.rows - 1);
    let side = x == 0 || x == last_x;
    let cap = y == 0 || y == last_y;

    if side && cap {
        Cell::plain(glyphs.corner)
    } else if side {
        Cell::plain(glyphs.vertical)
    } else if cap {
        Cell::plain(glyphs.horizontal)
    } else if state.player.pos == (x, y) {
        Cell { glyph: glyphs.player, color: Some(PLAYER_COLOR) }
    } else if state.food == (x, y) {
        Cell { glyph: glyphs.food, color: Some(FOOD_COLOR) }
    } else {
        Cell::plain(glyphs.blank)
    }
}

/// Redraw every cell of the grid.
///
/// A cursor move the terminal can't take (it shrank since the last sample) clears
/// the screen, puts a report up and gives up on the frame. Other errors propagate.
pub fn draw_grid<S: Surface>(surface: &mut S, state: &GameState, glyphs: &Glyphs) -> Result<Frame> {
    for x in 0..state.grid.cols {
        for y in 0..state.grid.rows {
            let cell = cell_at(state, glyphs, x, y);
            let placed = surface
                .set_cursor((x, y))
                .and_then(|_| surface.write(cell.glyph, cell.color));

            if let Err(e) = placed {
                return match e.downcast_ref::<OutOfBounds>() {
                    Some(oob) => {
                        report(surface, &oob.to_string())?;
                        Ok(Frame::Abandoned)
                    }
                    None => Err(e),
                };
            }
        }
    }

    surface.flush()?;
    Ok(Frame::Drawn)
}

/// Replace the screen with a single line of text.
pub fn report<S: Surface>(surface: &mut S, message: &str) -> Result<()> {
    warn!("frame abandoned: {}", message);
    surface.clear()?;
    // nothing to anchor the text to on a zero-sized terminal
    if surface.set_cursor((0, 0)).is_ok() {
        surface.write_str(message)?;
    }
    surface.flush()
}
