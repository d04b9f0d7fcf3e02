//! In-memory stand-ins for the terminal.

use std::sync::mpsc::{channel, Receiver, Sender};
use std::sync::Arc;

use anyhow::{anyhow, Result};
use crossterm::event::KeyEvent;
use crossterm::style::Color;

use crate::input::{Controls, KeySource};
use crate::term::{OutOfBounds, Surface};
use crate::Coords;

/// Keys fed through a channel. Reading fails once the sender is gone.
pub struct ScriptedKeys {
    rx: Receiver<KeyEvent>,
}

impl ScriptedKeys {
    pub fn new() -> (Self, Sender<KeyEvent>) {
        let (tx, rx) = channel();
        (ScriptedKeys { rx }, tx)
    }
}

impl KeySource for ScriptedKeys {
    fn read_key(&mut self) -> Result<KeyEvent> {
        self.rx.recv().map_err(|_| anyhow!("key script exhausted"))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Written {
    pub pos: Coords,
    pub glyph: char,
    pub color: Option<Color>,
}

pub struct RecordingSurface {
    pub size: Coords,
    sampled: Coords,
    cursor: Coords,
    pub writes: Vec<Written>,
    pub clears: usize,
    pub flushes: usize,
    /// Raise stop on `controls` once this many writes have happened.
    stop_after: Option<(usize, Arc<Controls>)>,
}

impl RecordingSurface {
    pub fn new(size: Coords) -> Self {
        RecordingSurface {
            size,
            sampled: size,
            cursor: (0, 0),
            writes: vec![],
            clears: 0,
            flushes: 0,
            stop_after: None,
        }
    }

    pub fn stop_after(&mut self, writes: usize, controls: Arc<Controls>) {
        self.stop_after = Some((writes, controls));
    }

    pub fn glyph_at(&self, pos: Coords) -> Option<char> {
        self.writes.iter().rev().find(|w| w.pos == pos).map(|w| w.glyph)
    }

    pub fn text(&self) -> String {
        self.writes.iter().map(|w| w.glyph).collect()
    }
}

impl Surface for RecordingSurface {
    fn viewport(&mut self) -> Result<Coords> {
        self.sampled = self.size;
        Ok(self.size)
    }

    fn set_cursor(&mut self, pos: Coords) -> Result<()> {
        // a shrink since the last sample is only noticed here, like a real terminal
        if pos.0 >= self.size.0 || pos.1 >= self.size.1 {
            return Err(OutOfBounds { pos, viewport: self.sampled }.into());
        }
        self.cursor = pos;
        Ok(())
    }

    fn write(&mut self, glyph: char, color: Option<Color>) -> Result<()> {
        self.writes.push(Written { pos: self.cursor, glyph, color });
        self.cursor.0 += 1;
        if let Some((limit, controls)) = &self.stop_after {
            if self.writes.len() == *limit {
                controls.request_stop();
            }
        }
        Ok(())
    }

    fn clear(&mut self) -> Result<()> {
        self.clears += 1;
        self.writes.clear();
        self.cursor = (0, 0);
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        self.flushes += 1;
        Ok(())
    }
}
