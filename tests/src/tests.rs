#![cfg(test)]

mod addressing_modes;
mod branch;
mod condition_code;
mod io;
mod jmp;
mod loader;
mod misc;
mod operate;
mod progs;
mod trap;

use emu_lib::{Cond, Emulator};
use emu_lib::io::tty::{PipeTty, Tty};
use common::constants::USER_START;
use common::mem::image_bytes;

use std::ops::Deref;
use std::sync::Arc;

pub const P: u16 = Cond::P;
pub const Z: u16 = Cond::Z;
pub const N: u16 = Cond::N;

// Program loaded at USER_START, not yet run.
pub fn load(bin: &[u16]) -> (Emulator, Arc<PipeTty>) {
    let tty = Arc::new(PipeTty::default());
    let mut emu = Emulator::new(tty.clone());
    emu.load_image(&image_bytes(USER_START, bin)).unwrap();
    (emu, tty)
}

// Input that only shows up once the program blocks on it, like keys typed at
// a prompt. The keyboard device polls on every read, so anything it can see
// is gone before a GETC gets to it.
#[derive(Default)]
pub struct Typed(PipeTty);

impl Deref for Typed {
    type Target = PipeTty;

    fn deref(&self) -> &PipeTty {
        &self.0
    }
}

impl Tty for Typed {
    fn handle_output(&self, val: u8) -> std::io::Result<()> {
        self.0.handle_output(val)
    }

    fn input_available(&self) -> std::io::Result<bool> {
        Ok(false)
    }

    fn read_input(&self) -> std::io::Result<u8> {
        self.0.read_input()
    }
}

pub fn load_typed(bin: &[u16], input: &[u8]) -> (Emulator, Arc<Typed>) {
    let tty = Arc::new(Typed::default());
    tty.write_input(input);
    let mut emu = Emulator::new(tty.clone());
    emu.load_image(&image_bytes(USER_START, bin)).unwrap();
    (emu, tty)
}

// Assumes the program ends with a HALT trap.
pub fn run(bin: &[u16]) -> (Emulator, Arc<PipeTty>) {
    let (mut emu, tty) = load(bin);
    let reason = emu.run();
    assert!(reason.is_halted(), "halted with: {reason}");
    (emu, tty)
}

pub fn check_flags(emu: &Emulator, exp: u16) {
    let cond = emu.get_cond();
    assert_eq!(cond.get_pos(), exp & P != 0, "pos flag");
    assert_eq!(cond.get_zero(), exp & Z != 0, "zero flag");
    assert_eq!(cond.get_negative(), exp & N != 0, "negative flag");
}

pub fn mem_snapshot(emu: &Emulator) -> Vec<u16> {
    (0..=u16::MAX).map(|addr| emu.get_state().mem_read_word(addr)).collect()
}
