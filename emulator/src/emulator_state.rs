
use common::asm::{NUM_REGS, Reg};
use common::constants::{MEM_WORDS, USER_START};

use log::trace;

// Condition codes. Exactly one bit is set once anything has written them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cond(u16);

impl Cond {
    pub const POS_SHIFT: u16 = 0;
    pub const ZERO_SHIFT: u16 = 1;
    pub const NEG_SHIFT: u16 = 2;

    // Same layout as the nzp field of BR.
    pub const P: u16 = 0x1 << Self::POS_SHIFT;
    pub const Z: u16 = 0x1 << Self::ZERO_SHIFT;
    pub const N: u16 = 0x1 << Self::NEG_SHIFT;

    const FLAGS_MASK: u16 = 0x7;

    pub fn from_raw(raw: u16) -> Self {
        assert_eq!(raw & !Self::FLAGS_MASK, 0);
        Cond(raw)
    }

    pub fn to_raw(&self) -> u16 {
        self.0
    }

    // Flags describing `val` taken as a signed word.
    pub fn for_value(val: u16) -> Self {
        if val >> 15 != 0 {
            Cond(Self::N)
        } else if val == 0 {
            Cond(Self::Z)
        } else {
            Cond(Self::P)
        }
    }

    pub fn get_pos(&self) -> bool {
        (self.0 & Self::P) != 0
    }

    pub fn get_zero(&self) -> bool {
        (self.0 & Self::Z) != 0
    }

    pub fn get_negative(&self) -> bool {
        (self.0 & Self::N) != 0
    }

    pub fn matches(&self, nzp: u16) -> bool {
        (self.0 & nzp) != 0
    }
}

impl Default for Cond {
    fn default() -> Self {
        Cond(Self::Z)
    }
}

// This is separate so a mutable borrow can be passed to the MMIO handlers.
pub struct EmulatorState {
    num_ins: usize,
    mem: Vec<u16>,
    regs: [u16; NUM_REGS],
    pc: u16,
    cond: Cond,
}

impl EmulatorState {
    pub fn new() -> Self {
        EmulatorState {
            num_ins: 0usize,
            mem: vec![0; MEM_WORDS],
            regs: [0; NUM_REGS],
            pc: USER_START,
            cond: Cond::default(),
        }
    }

    pub fn inc_ins(&mut self) {
        self.num_ins += 1;
    }

    pub fn num_ins(&self) -> usize {
        self.num_ins
    }

    // Raw store access. The CPU read path lives in Emulator, since it has to
    // give the devices a look first.
    pub fn mem_read_word(&self, addr: u16) -> u16 {
        self.mem[addr as usize]
    }

    pub fn mem_write_word(&mut self, addr: u16, val: u16) {
        self.mem[addr as usize] = val;
    }

    // Caller checks that the words fit.
    pub fn mem_write_words(&mut self, start: u16, vals: &[u16]) {
        let start = start as usize;
        assert!(start + vals.len() <= MEM_WORDS, "{} words don't fit at {start:#06x}", vals.len());
        self.mem[start..start + vals.len()].copy_from_slice(vals);
    }

    pub fn reg_read_word(&self, reg: Reg) -> u16 {
        self.regs[reg.index()]
    }

    pub fn reg_write_word(&mut self, reg: Reg, val: u16) {
        trace!("Reg: writing {val:#06x} to {reg}");
        self.regs[reg.index()] = val;
    }

    // Register write that also sets the condition codes.
    pub fn reg_write_word_cc(&mut self, reg: Reg, val: u16) {
        self.reg_write_word(reg, val);
        self.cond = Cond::for_value(val);
    }

    pub fn pc(&self) -> u16 {
        self.pc
    }

    pub fn set_pc(&mut self, pc: u16) {
        self.pc = pc;
    }

    // Returns the old PC.
    pub fn inc_pc(&mut self) -> u16 {
        let pc = self.pc;
        self.pc = pc.wrapping_add(1);
        pc
    }

    pub fn get_cond(&self) -> Cond {
        self.cond
    }

    pub fn set_cond(&mut self, cond: Cond) {
        self.cond = cond;
    }
}

impl Default for EmulatorState {
    fn default() -> Self {
        Self::new()
    }
}
