
use std::io;

use crossterm::terminal;
use log::{debug, error};

// What the guard switches on and off. Split out so the guard's bookkeeping can
// be tested without a terminal.
pub trait RawMode {
    fn enable(&mut self) -> io::Result<()>;
    fn disable(&mut self) -> io::Result<()>;
}

#[derive(Default, Clone, Copy)]
pub struct Crossterm();

impl RawMode for Crossterm {
    fn enable(&mut self) -> io::Result<()> {
        terminal::enable_raw_mode()
    }

    fn disable(&mut self) -> io::Result<()> {
        terminal::disable_raw_mode()
    }
}

// Holds the terminal in raw mode (no line buffering, no echo) until dropped.
// Restoring is idempotent, so an explicit restore() followed by the drop only
// touches the terminal once.
pub struct RawModeGuard<M: RawMode = Crossterm> {
    mode: M,
    active: bool,
}

impl RawModeGuard<Crossterm> {
    pub fn acquire() -> io::Result<Self> {
        Self::acquire_with(Crossterm())
    }
}

impl<M: RawMode> RawModeGuard<M> {
    pub fn acquire_with(mut mode: M) -> io::Result<Self> {
        mode.enable()?;
        debug!("Terminal: raw mode on");
        Ok(RawModeGuard{mode, active: true})
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn restore(&mut self) -> io::Result<()> {
        if !self.active {
            return Ok(());
        }
        self.active = false;
        debug!("Terminal: restoring mode");
        self.mode.disable()
    }
}

impl<M: RawMode> Drop for RawModeGuard<M> {
    fn drop(&mut self) {
        if let Err(err) = self.restore() {
            error!("Terminal: failed to restore mode: {err}");
        }
    }
}
