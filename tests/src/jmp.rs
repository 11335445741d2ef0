use common::asm::Reg;
use common::constants::USER_START;
use crate::{load, run};

#[test]
fn jmp() {
    let bin = &[
        0xc080, // JMP R2
        0x1021, // ADD R0, R0, #1
        0xf025, // HALT
        0x1022, // ADD R0, R0, #2
        0xf025, // HALT
    ];
    let (mut emu, _) = load(bin);
    emu.reg_write_word(Reg::R2, 0x3003);
    emu.run();
    assert_eq!(emu.reg_read_word(Reg::R0), 2);
    assert_eq!(emu.reg_read_word(Reg::R7), 0);
}

#[test]
fn jsr_backward() {
    let bin = &[
        0x0e02, // BRnzp MAIN
        0x1021, // FUN: ADD R0, R0, #1
        0xc1c0, // RET
        0x4ffd, // MAIN: JSR FUN
        0xf025, // HALT
    ];
    let (emu, _) = run(bin);
    assert_eq!(emu.reg_read_word(Reg::R0), 1);
    assert_eq!(emu.reg_read_word(Reg::R7), 0x3004);
    assert_eq!(emu.pc(), 0x3005);
}

#[test]
fn jsrr() {
    let bin = &[
        0x4080, // JSRR R2
        0x1021, // ADD R0, R0, #1
        0xf025, // HALT
        0x1022, // FUN: ADD R0, R0, #2
        0xc1c0, // RET
    ];
    let (mut emu, _) = load(bin);
    emu.reg_write_word(Reg::R2, 0x3003);
    emu.run();
    assert_eq!(emu.reg_read_word(Reg::R0), 3);
    assert_eq!(emu.reg_read_word(Reg::R7), USER_START + 1);
}

#[test]
fn jsrr_r7() {
    // R7 gets the return address first, so the jump goes to the next word.
    let bin = &[
        0x41c0, // JSRR R7
        0x1021, // ADD R0, R0, #1
        0xf025, // HALT
        0x1022, // ADD R0, R0, #2
        0xf025, // HALT
    ];
    let (mut emu, _) = load(bin);
    emu.reg_write_word(Reg::R7, 0x3003);
    emu.run();
    assert_eq!(emu.reg_read_word(Reg::R0), 1);
    assert_eq!(emu.reg_read_word(Reg::R7), USER_START + 1);
    assert_eq!(emu.pc(), 0x3003);
}

#[test]
fn nested() {
    let bin = &[
        0x4802, // JSR OUTER
        0xf025, // HALT
        0x0000, // SAVE
        0x3ffe, // OUTER: ST R7, SAVE
        0x4802, // JSR INNER
        0x2ffc, // LD R7, SAVE
        0xc1c0, // RET
        0x1021, // INNER: ADD R0, R0, #1
        0xc1c0, // RET
    ];
    let (emu, _) = run(bin);
    assert_eq!(emu.reg_read_word(Reg::R0), 1);
    assert_eq!(emu.reg_read_word(Reg::R7), USER_START + 1);
    assert_eq!(emu.get_state().mem_read_word(0x3002), USER_START + 1);
}

#[test]
fn jsr_far() {
    let bin = &[
        0x4bff, // JSR #1023
        0xf025, // HALT
    ];
    let (mut emu, _) = load(bin);
    emu.get_state_mut().mem_write_word(0x3400, 0xc1c0); // RET
    emu.run();
    assert_eq!(emu.reg_read_word(Reg::R7), USER_START + 1);
    assert_eq!(emu.num_ins(), 3);
}
