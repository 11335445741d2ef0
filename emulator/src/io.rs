pub mod keyboard;
pub mod terminal;
pub mod tty;

use crate::EmulatorState;

use std::io;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

pub trait MMIOHandler: Send {
    fn default_addrs(&self) -> &[u16] {
        &[]
    }

    // Runs before every CPU read, whatever the address. Must not block. An
    // error halts the emulator once the current instruction finishes.
    fn poll(&mut self, emu: &mut EmulatorState) -> io::Result<()>;
}

// Shared flag asking the emulator to stop before its next instruction. Clones
// share the flag, so it can be handed to a terminal or another thread.
#[derive(Debug, Clone, Default)]
pub struct Cancel(Arc<AtomicBool>);

impl Cancel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }

    pub fn clear(&self) {
        self.0.store(false, Ordering::SeqCst);
    }
}
