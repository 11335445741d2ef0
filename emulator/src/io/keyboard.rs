
use std::io;
use std::sync::Arc;

use crate::EmulatorState;
use crate::io::MMIOHandler;
use crate::io::tty::Tty;

use log::debug;

// Memory mapped keyboard. Every CPU read polls the terminal: a waiting
// character is moved into KBDR and KBSR's ready bit set, otherwise KBSR is
// cleared. Writes to either register go straight to memory.
pub struct Keyboard {
    device: Arc<dyn Tty>,
}

impl Keyboard {
    // Keyboard Status
    pub const KBSR: u16 = 0xfe00;

    // Keyboard Data
    pub const KBDR: u16 = 0xfe02;

    pub const READY_SHIFT: u16 = 15;
    pub const READY_MASK: u16 = 0x1 << Self::READY_SHIFT;

    pub fn new(device: Arc<dyn Tty>) -> Self {
        Keyboard{device}
    }
}

impl MMIOHandler for Keyboard {
    fn default_addrs(&self) -> &[u16] {
        &[Self::KBSR, Self::KBDR]
    }

    // Each poll that finds a key takes it off the terminal, so only the read
    // that polled it sees KBSR ready.
    fn poll(&mut self, emu: &mut EmulatorState) -> io::Result<()> {
        match self.device.poll_input() {
            Ok(Some(ch)) => {
                emu.mem_write_word(Self::KBSR, Self::READY_MASK);
                emu.mem_write_word(Self::KBDR, ch as u16);
            },
            Ok(None) => emu.mem_write_word(Self::KBSR, 0),
            Err(err) => {
                debug!("Keyboard: poll failed: {err}");
                emu.mem_write_word(Self::KBSR, 0);
                return Err(err);
            },
        }
        Ok(())
    }
}
