use emu_lib::{Emulator, HaltReason};
use emu_lib::io::tty::Tty;
use common::asm::Reg;
use common::constants::USER_START;
use common::mem::image_bytes;
use crate::{load, load_typed, run, check_flags, P};

use std::io;
use std::sync::Arc;

#[test]
fn halt() {
    let bin = &[
        0xf025, // HALT
        0x1021, // ADD R0, R0, #1
    ];
    let (emu, tty) = run(bin);
    assert!(tty.is_out_empty());
    assert_eq!(emu.reg_read_word(Reg::R0), 0);
    assert_eq!(emu.pc(), USER_START + 1);
}

#[test]
fn getc() {
    let bin = &[
        0xf020, // GETC
        0xf025, // HALT
    ];
    let (mut emu, tty) = load_typed(bin, b"q");
    emu.reg_write_word(Reg::R0, 0xffff);
    assert!(emu.run().is_halted());
    assert_eq!(emu.reg_read_word(Reg::R0), b'q' as u16);
    check_flags(&emu, P);
    // No echo.
    assert!(tty.is_out_empty());
}

#[test]
fn getc_no_input() {
    let bin = &[
        0xf020, // GETC
        0xf025, // HALT
    ];
    let (mut emu, _) = load(bin);
    let reason = emu.run();
    assert!(matches!(reason, HaltReason::Io(err) if err.kind() == io::ErrorKind::UnexpectedEof));
    assert!(reason.is_fault());
}

#[test]
fn getc_after_keyboard_poll() {
    // The fetch of GETC polls the keyboard, which takes the queued key.
    let bin = &[
        0xf020, // GETC
        0xf025, // HALT
    ];
    let (mut emu, tty) = load(bin);
    tty.write_input(b"q");
    assert!(emu.run().is_io());
    assert_eq!(emu.get_state().mem_read_word(0xfe02), b'q' as u16);
}

#[test]
fn out() {
    let bin = &[
        0xf021, // OUT
        0xf025, // HALT
    ];
    let (mut emu, tty) = load(bin);
    // Only the low byte is written.
    emu.reg_write_word(Reg::R0, 0x0141);
    emu.run();
    assert_eq!(tty.output_string(), "A");
    assert_eq!(emu.reg_read_word(Reg::R0), 0x0141);
}

#[test]
fn puts() {
    let bin = &[
        0xe002, // LEA R0, STR
        0xf022, // PUTS
        0xf025, // HALT
        72,     // STR: 'H'
        105,    // 'i'
        0,
        33,     // '!'
    ];
    let (emu, tty) = run(bin);
    assert_eq!(tty.output_string(), "Hi");
    assert_eq!(emu.reg_read_word(Reg::R0), 0x3003);
}

#[test]
fn puts_empty() {
    let bin = &[
        0xe002, // LEA R0, STR
        0xf022, // PUTS
        0xf025, // HALT
        0,      // STR
    ];
    let (_, tty) = run(bin);
    assert!(tty.is_out_empty());
}

#[test]
fn putsp() {
    let bin = &[
        0xe002, // LEA R0, STR
        0xf024, // PUTSP
        0xf025, // HALT
        0x6548, // STR: "He"
        0x6c6c, // "ll"
        0x006f, // "o"
        0,
    ];
    let (_, tty) = run(bin);
    assert_eq!(tty.output_string(), "Hello");
}

#[test]
fn putsp_short_word() {
    // A zero high byte only ends its own word.
    let bin = &[
        0xe002, // LEA R0, STR
        0xf024, // PUTSP
        0xf025, // HALT
        0x0041, // STR: "A"
        0x4342, // "BC"
        0,
    ];
    let (_, tty) = run(bin);
    assert_eq!(tty.output_string(), "ABC");
}

#[test]
fn r#in() {
    let bin = &[
        0xf023, // IN
        0xf025, // HALT
    ];
    let (mut emu, tty) = load_typed(bin, b"k");
    emu.run();
    assert_eq!(tty.output_string(), "Enter a character: k");
    assert_eq!(emu.reg_read_word(Reg::R0), b'k' as u16);
    check_flags(&emu, P);
}

#[test]
fn unknown() {
    let bin = &[
        0xf026, // TRAP x26
        0xf025, // HALT
    ];
    let (mut emu, tty) = load(bin);
    emu.reg_write_word(Reg::R0, 0x1234);
    let reason = emu.run();
    assert!(matches!(reason, HaltReason::UnknownTrap{code: 0x26, addr: USER_START}));
    assert_eq!(reason.to_string(), "unrecognized trap code 0x26 at 0x3000");
    assert_eq!(emu.reg_read_word(Reg::R0), 0x1234);
    assert_eq!(emu.reg_read_word(Reg::R7), 0);
    assert!(tty.is_out_empty());
}

#[test]
fn r7_untouched() {
    let bin = &[
        0xf021, // OUT
        0xf025, // HALT
    ];
    let (mut emu, _) = load(bin);
    emu.reg_write_word(Reg::R7, 0x4444);
    emu.run();
    assert_eq!(emu.reg_read_word(Reg::R7), 0x4444);
}

// Stands in for a terminal where the user hits ^C while a program waits.
struct InterruptTty();

impl Tty for InterruptTty {
    fn handle_output(&self, _val: u8) -> io::Result<()> {
        Ok(())
    }

    fn input_available(&self) -> io::Result<bool> {
        Ok(false)
    }

    fn read_input(&self) -> io::Result<u8> {
        Err(io::Error::new(io::ErrorKind::Interrupted, "^C"))
    }
}

#[test]
fn getc_interrupted() {
    let mut emu = Emulator::new(Arc::new(InterruptTty()));
    emu.load_image(&image_bytes(USER_START, &[
        0xf020, // GETC
        0xf025, // HALT
    ])).unwrap();
    assert!(emu.run().is_interrupted());
    assert_eq!(emu.pc(), USER_START + 1);
}

#[test]
fn output_failure() {
    struct Closed();
    impl Tty for Closed {
        fn handle_output(&self, _val: u8) -> io::Result<()> {
            Err(io::Error::new(io::ErrorKind::BrokenPipe, "closed"))
        }
        fn input_available(&self) -> io::Result<bool> {
            Ok(false)
        }
        fn read_input(&self) -> io::Result<u8> {
            Ok(0)
        }
    }

    let mut emu = Emulator::new(Arc::new(Closed()));
    emu.load_image(&image_bytes(USER_START, &[
        0xf021, // OUT
        0xf025, // HALT
    ])).unwrap();
    let reason = emu.run();
    assert!(matches!(reason, HaltReason::Io(err) if err.kind() == io::ErrorKind::BrokenPipe));
}

#[test]
fn separate_terminals() {
    let bin = &[
        0xf020, // GETC
        0xf021, // OUT
        0xf025, // HALT
    ];
    let (mut a, tty_a) = load_typed(bin, b"a");
    let (mut b, tty_b) = load_typed(bin, b"b");
    a.run();
    b.run();
    assert_eq!(tty_a.output_string(), "a");
    assert_eq!(tty_b.output_string(), "b");
}
