//! Keyboard listener running beside the game loop.
//!
//! The listener thread and the loop share nothing but [`Controls`]: the heading
//! the player last asked for and the stop/reset requests. All of it is atomic,
//! and the loop takes one snapshot per tick.

use std::sync::atomic::{AtomicBool, AtomicU8, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use anyhow::{Context, Result};
use crossterm::event::{read, Event, KeyCode, KeyEvent};
use tracing::{debug, warn};

use crate::entity::Direction;

/// Blocking source of key presses.
pub trait KeySource {
    fn read_key(&mut self) -> Result<KeyEvent>;
}

/// Keys straight from the terminal.
#[derive(Debug, Default, Clone, Copy)]
pub struct TermKeys;

impl KeySource for TermKeys {
    fn read_key(&mut self) -> Result<KeyEvent> {
        loop {
            if let Event::Key(ev) = read().context("Error reading key event.")? {
                return Ok(ev);
            }
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Command {
    Steer(Direction),
    Stop,
    Reset,
}

pub fn map_key(key: &KeyEvent) -> Option<Command> {
    match key.code {
        KeyCode::Up => Some(Command::Steer(Direction::North)),
        KeyCode::Down => Some(Command::Steer(Direction::South)),
        KeyCode::Left => Some(Command::Steer(Direction::West)),
        KeyCode::Right => Some(Command::Steer(Direction::East)),
        KeyCode::Esc => Some(Command::Stop),
        KeyCode::Char('r') | KeyCode::Char('R') => Some(Command::Reset),
        _ => None,
    }
}

#[derive(Debug, Default)]
pub struct Controls {
    direction: AtomicU8,
    stop: AtomicBool,
    reset: AtomicBool,
}

impl Controls {
    pub fn new() -> Arc<Self> {
        Arc::new(Controls::default())
    }

    pub fn direction(&self) -> Direction {
        Direction::from_u8(self.direction.load(Ordering::Acquire))
    }

    pub fn set_direction(&self, dir: Direction) {
        self.direction.store(dir.to_u8(), Ordering::Release);
    }

    pub fn stop_requested(&self) -> bool {
        self.stop.load(Ordering::Acquire)
    }

    pub fn request_stop(&self) {
        self.stop.store(true, Ordering::Release);
    }

    pub fn reset_requested(&self) -> bool {
        self.reset.load(Ordering::Acquire)
    }

    pub fn request_reset(&self) {
        self.reset.store(true, Ordering::Release);
    }

    /// Back to a standing player with no pending requests.
    pub fn clear(&self) {
        self.set_direction(Direction::None);
        self.stop.store(false, Ordering::Release);
        self.reset.store(false, Ordering::Release);
    }

    /// Returns false once the listener has nothing left to do.
    pub fn apply(&self, cmd: Command) -> bool {
        match cmd {
            Command::Steer(dir) => {
                self.set_direction(dir);
                true
            }
            Command::Stop => {
                self.request_stop();
                false
            }
            Command::Reset => {
                self.request_reset();
                false
            }
        }
    }
}

/// Run `keys` on its own thread until Escape, reset or a read failure.
///
/// The handle may be dropped; the thread only ever blocks on the next key.
pub fn spawn_listener<K>(mut keys: K, controls: Arc<Controls>) -> JoinHandle<()>
where
    K: KeySource + Send + 'static,
{
    thread::spawn(move || loop {
        let key = match keys.read_key() {
            Ok(key) => key,
            Err(e) => {
                warn!("key source failed, stopping: {:#}", e);
                controls.request_stop();
                return;
            }
        };

        if let Some(cmd) = map_key(&key) {
            debug!(?cmd, "key");
            if !controls.apply(cmd) {
                return;
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::ScriptedKeys;
    use crossterm::event::KeyModifiers;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn test_arrow_keys() {
        assert_eq!(map_key(&key(KeyCode::Up)), Some(Command::Steer(Direction::North)));
        assert_eq!(map_key(&key(KeyCode::Down)), Some(Command::Steer(Direction::South)));
        assert_eq!(map_key(&key(KeyCode::Left)), Some(Command::Steer(Direction::West)));
        assert_eq!(map_key(&key(KeyCode::Right)), Some(Command::Steer(Direction::East)));
    }

    #[test]
    fn test_other_keys_ignored() {
        assert_eq!(map_key(&key(KeyCode::Char('x'))), None);
        assert_eq!(map_key(&key(KeyCode::Enter)), None);
        assert_eq!(map_key(&key(KeyCode::Home)), None);
        assert_eq!(map_key(&key(KeyCode::Esc)), Some(Command::Stop));
        assert_eq!(map_key(&key(KeyCode::Char('R'))), Some(Command::Reset));
    }

    #[test]
    fn test_last_key_wins() {
        let controls = Controls::new();
        let (keys, tx) = ScriptedKeys::new();
        let handle = spawn_listener(keys, controls.clone());

        for code in [KeyCode::Up, KeyCode::Char('q'), KeyCode::Left, KeyCode::Tab].iter() {
            tx.send(key(*code)).unwrap();
        }
        tx.send(key(KeyCode::Esc)).unwrap();
        handle.join().unwrap();

        assert_eq!(controls.direction(), Direction::West);
        assert!(controls.stop_requested());
        assert!(!controls.reset_requested());
    }

    #[test]
    fn test_listener_ends_on_reset() {
        let controls = Controls::new();
        let (keys, tx) = ScriptedKeys::new();
        let handle = spawn_listener(keys, controls.clone());

        tx.send(key(KeyCode::Down)).unwrap();
        tx.send(key(KeyCode::Char('r'))).unwrap();
        handle.join().unwrap();

        // nothing is read after the reset
        assert!(tx.send(key(KeyCode::Esc)).is_err());
        assert!(controls.reset_requested());
        assert!(!controls.stop_requested());
        assert_eq!(controls.direction(), Direction::South);
    }

    #[test]
    fn test_source_failure_stops_game() {
        let controls = Controls::new();
        let (keys, tx) = ScriptedKeys::new();
        drop(tx);
        spawn_listener(keys, controls.clone()).join().unwrap();
        assert!(controls.stop_requested());
    }

    #[test]
    fn test_clear() {
        let controls = Controls::new();
        controls.set_direction(Direction::NorthWest);
        controls.request_stop();
        controls.request_reset();
        controls.clear();
        assert_eq!(controls.direction(), Direction::None);
        assert!(!controls.stop_requested());
        assert!(!controls.reset_requested());
    }
}
