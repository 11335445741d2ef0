
use super::{Emulator, ExecRet, HaltReason};
use crate::EmulatorState;

use common::asm::{Reg, TrapCode};

use std::io;

use log::trace;
use num_traits::FromPrimitive;

const IN_PROMPT: &[u8] = b"Enter a character: ";

// Words from `start` up to (not including) the first zero word. Trap routines
// are firmware, so they read the store directly and never poll devices.
fn string_at(state: &EmulatorState, start: u16) -> impl Iterator<Item = u16> + '_ {
    (0..=u16::MAX)
        .map(move |i| state.mem_read_word(start.wrapping_add(i)))
        .take_while(|word| *word != 0)
}

impl Emulator {
    pub(super) fn exec_trap_ins(&mut self, vector: u8, addr: u16) -> ExecRet {
        let Some(code) = TrapCode::from_u8(vector) else {
            return self.halt(HaltReason::UnknownTrap{code: vector, addr});
        };
        trace!("Trap: {code}");

        let res = match code {
            TrapCode::Getc => self.trap_getc(),
            TrapCode::Out => self.trap_out(),
            TrapCode::Puts => self.trap_puts(),
            TrapCode::In => self.trap_in(),
            TrapCode::Putsp => self.trap_putsp(),
            TrapCode::Halt => return self.halt(HaltReason::Halted),
        };

        match res {
            Ok(()) => ExecRet::Ok,
            Err(err) => self.halt_io(err),
        }
    }

    fn trap_getc(&mut self) -> io::Result<()> {
        let ch = self.tty.read_input()?;
        self.state.reg_write_word_cc(Reg::R0, ch as u16);
        Ok(())
    }

    fn trap_out(&mut self) -> io::Result<()> {
        self.tty.handle_output(self.state.reg_read_word(Reg::R0) as u8)
    }

    fn trap_puts(&mut self) -> io::Result<()> {
        let start = self.state.reg_read_word(Reg::R0);
        for word in string_at(&self.state, start) {
            self.tty.handle_output(word as u8)?;
        }
        Ok(())
    }

    fn trap_in(&mut self) -> io::Result<()> {
        for ch in IN_PROMPT {
            self.tty.handle_output(*ch)?;
        }
        let ch = self.tty.read_input()?;
        self.tty.handle_output(ch)?;
        self.state.reg_write_word_cc(Reg::R0, ch as u16);
        Ok(())
    }

    // Two characters per word, low byte first. A zero high byte ends the word
    // but not the string.
    fn trap_putsp(&mut self) -> io::Result<()> {
        let start = self.state.reg_read_word(Reg::R0);
        for word in string_at(&self.state, start) {
            self.tty.handle_output(word as u8)?;
            let high = (word >> u8::BITS) as u8;
            if high != 0 {
                self.tty.handle_output(high)?;
            }
        }
        Ok(())
    }
}
