
mod trap;

use common::asm::*;
use common::constants::MMIO_START;
use common::decoder::decode;
use crate::EmulatorState;
use crate::emulator_state::Cond;
use crate::io::{Cancel, MMIOHandler};
use crate::io::keyboard::Keyboard;
use crate::io::tty::Tty;
use crate::loader::{Image, LoadError};

use std::io;
use std::path::Path;
use std::sync::Arc;

use delegate::delegate;
use derive_more::IsVariant;
use log::{debug, trace};
use thiserror::Error;

#[derive(Debug, Error, IsVariant)]
pub enum HaltReason {
    #[error("halt")]
    Halted,

    #[error("bad opcode {op} ({raw:#06x}) at {addr:#06x}")]
    IllegalOpcode { op: Opcode, raw: u16, addr: u16 },

    #[error("unrecognized trap code {code:#04x} at {addr:#06x}")]
    UnknownTrap { code: u8, addr: u16 },

    #[error("interrupted")]
    Interrupted,

    #[error("terminal I/O failed: {0}")]
    Io(#[source] io::Error),
}

impl HaltReason {
    // Anything but a HALT trap.
    pub fn is_fault(&self) -> bool {
        !self.is_halted()
    }
}

#[derive(Debug, IsVariant)]
pub enum RunState {
    Running,
    Halted(HaltReason),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecRet {
    Ok,
    Halt,
}


pub struct Emulator {
    state: EmulatorState,
    mmio_handlers: Vec<Box<dyn MMIOHandler>>,
    mmio_addrs: Vec<u16>,
    tty: Arc<dyn Tty>,
    cancel: Cancel,
    run_state: RunState,
    // First device error since the last step, reported once it finishes.
    device_fault: Option<io::Error>,
}

impl Emulator {
    pub fn new(tty: Arc<dyn Tty>) -> Emulator {
        Self::with_cancel(tty, Cancel::new())
    }

    pub fn with_cancel(tty: Arc<dyn Tty>, cancel: Cancel) -> Emulator {
        let mut emu = Emulator {
            state: EmulatorState::new(),
            mmio_handlers: Vec::new(),
            mmio_addrs: Vec::new(),
            tty: tty.clone(),
            cancel,
            run_state: RunState::Running,
            device_fault: None,
        };
        emu.set_mmio_handler(Keyboard::new(tty));
        emu
    }

    delegate! {
        to self.state {
            pub fn reg_read_word(&self, reg: Reg) -> u16;
            pub fn reg_write_word(&mut self, reg: Reg, val: u16);
            pub fn pc(&self) -> u16;
            pub fn set_pc(&mut self, pc: u16);
            pub fn get_cond(&self) -> Cond;
            pub fn set_cond(&mut self, cond: Cond);
            pub fn num_ins(&self) -> usize;
        }
    }

    // Run until halted.
    pub fn run(&mut self) -> &HaltReason {
        while self.run_ins() == ExecRet::Ok {}
        match &self.run_state {
            RunState::Halted(reason) => reason,
            RunState::Running => unreachable!("run_ins() returned Halt while running"),
        }
    }

    pub fn run_at(&mut self, pc: u16) -> &HaltReason {
        self.state.set_pc(pc);
        self.run()
    }

    // Continue after halt.
    pub fn cont(&mut self) -> &HaltReason {
        self.resume();
        self.run()
    }

    // Fetch, decode and execute a single instruction. Does nothing once halted.
    pub fn run_ins(&mut self) -> ExecRet {
        if self.run_state.is_halted() {
            return ExecRet::Halt;
        }
        if self.cancel.is_cancelled() {
            return self.halt(HaltReason::Interrupted);
        }

        self.state.inc_ins();
        let addr = self.state.pc();
        let word = self.mem_read_word(addr);
        self.state.inc_pc();

        let ins = decode(word);
        trace!("PC: {addr:#06x}: {}", ins.display_with_pc(addr));
        let ret = self.exec(&ins, addr);

        match self.device_fault.take() {
            Some(err) if ret == ExecRet::Ok => self.halt_io(err),
            Some(err) => {
                debug!("Dropping device error after halt: {err}");
                ret
            },
            None => ret,
        }
    }

    // Leave the halted state, keeping registers and memory.
    pub fn resume(&mut self) {
        if self.run_state.is_halted() {
            self.cancel.clear();
            self.run_state = RunState::Running;
        }
    }

    fn halt(&mut self, reason: HaltReason) -> ExecRet {
        debug!("Halting after {} instructions: {reason}", self.state.num_ins());
        self.run_state = RunState::Halted(reason);
        ExecRet::Halt
    }

    // ^C surfaces as Interrupted; the cancel flag is already set by then.
    fn halt_io(&mut self, err: io::Error) -> ExecRet {
        if err.kind() == io::ErrorKind::Interrupted {
            self.halt(HaltReason::Interrupted)
        } else {
            self.halt(HaltReason::Io(err))
        }
    }

    pub fn run_state(&self) -> &RunState {
        &self.run_state
    }

    pub fn is_halted(&self) -> bool {
        self.run_state.is_halted()
    }

    pub fn halt_reason(&self) -> Option<&HaltReason> {
        match &self.run_state {
            RunState::Halted(reason) => Some(reason),
            RunState::Running => None,
        }
    }

    pub fn cancel_handle(&self) -> Cancel {
        self.cancel.clone()
    }

    // Returns the origin. Registers are untouched, so images can be layered.
    pub fn load_image(&mut self, data: &[u8]) -> Result<u16, LoadError> {
        let image = Image::parse(data)?;
        debug!("Loading {} words at {:#06x}", image.words.len(), image.origin);
        self.state.mem_write_words(image.origin, &image.words);
        Ok(image.origin)
    }

    pub fn load_image_file(&mut self, path: impl AsRef<Path>) -> Result<u16, LoadError> {
        let data = std::fs::read(path)?;
        self.load_image(&data)
    }

    pub fn set_mmio_handler(&mut self, handler: impl MMIOHandler + 'static) {
        for addr in handler.default_addrs() {
            assert!(*addr >= MMIO_START, "MMIOHandler addr {addr:#06x} outside device space");
            assert!(!self.mmio_addrs.contains(addr), "Duplicate MMIOHandler for {addr:#06x}");
            self.mmio_addrs.push(*addr);
        }
        self.mmio_handlers.push(Box::new(handler));
    }


    ///////////////////////////////////////////////////////////////////////////


    // CPU read. Devices get a look at every read, whatever the address, so
    // LDI polls twice. A failed poll still returns the stored word.
    pub fn mem_read_word(&mut self, addr: u16) -> u16 {
        for handler in self.mmio_handlers.iter_mut() {
            if let Err(err) = handler.poll(&mut self.state) {
                if self.device_fault.is_none() {
                    self.device_fault = Some(err);
                }
            }
        }
        self.state.mem_read_word(addr)
    }

    // Writes bypass the devices, device registers included.
    pub fn mem_write_word(&mut self, addr: u16, val: u16) {
        trace!("Mem: writing {val:#06x} to {addr:#06x}");
        self.state.mem_write_word(addr, val)
    }

    pub fn get_state(&self) -> &EmulatorState {
        &self.state
    }

    pub fn get_state_mut(&mut self) -> &mut EmulatorState {
        &mut self.state
    }

    fn read_src2(&self, src2: Src2) -> u16 {
        match src2 {
            Src2::Reg(r) => self.state.reg_read_word(r),
            Src2::Imm(val) => val,
        }
    }

    // PC has already moved past the current instruction.
    fn pc_rel(&self, offset: u16) -> u16 {
        self.state.pc().wrapping_add(offset)
    }

    fn base_rel(&self, base: Reg, offset: u16) -> u16 {
        self.state.reg_read_word(base).wrapping_add(offset)
    }

    ///////////////////////////////////////////////////////////////////////////
    // Execute
    ///////////////////////////////////////////////////////////////////////////

    // R7 is written before the base is read, so JSRR R7 lands on the
    // following instruction.
    fn exec_jsr_ins(&mut self, target: JsrTarget) {
        let ret = self.state.pc();
        self.state.reg_write_word(Reg::R7, ret);
        let new_pc = match target {
            JsrTarget::Offset(offset) => ret.wrapping_add(offset),
            JsrTarget::Reg(base) => self.state.reg_read_word(base),
        };
        self.state.set_pc(new_pc);
    }

    fn exec(&mut self, ins: &Ins, addr: u16) -> ExecRet {
        match *ins {
            Ins::Br{nzp, offset} => {
                if self.state.get_cond().matches(nzp) {
                    let new_pc = self.pc_rel(offset);
                    self.state.set_pc(new_pc);
                }
            },
            Ins::Add{dr, sr1, src2} => {
                let val = self.state.reg_read_word(sr1).wrapping_add(self.read_src2(src2));
                self.state.reg_write_word_cc(dr, val);
            },
            Ins::And{dr, sr1, src2} => {
                let val = self.state.reg_read_word(sr1) & self.read_src2(src2);
                self.state.reg_write_word_cc(dr, val);
            },
            Ins::Not{dr, sr} => {
                let val = !self.state.reg_read_word(sr);
                self.state.reg_write_word_cc(dr, val);
            },
            Ins::Ld{dr, offset} => {
                let val = self.mem_read_word(self.pc_rel(offset));
                self.state.reg_write_word_cc(dr, val);
            },
            Ins::Ldi{dr, offset} => {
                let ptr = self.mem_read_word(self.pc_rel(offset));
                let val = self.mem_read_word(ptr);
                self.state.reg_write_word_cc(dr, val);
            },
            Ins::Ldr{dr, base, offset} => {
                let val = self.mem_read_word(self.base_rel(base, offset));
                self.state.reg_write_word_cc(dr, val);
            },
            Ins::Lea{dr, offset} => {
                let val = self.pc_rel(offset);
                self.state.reg_write_word_cc(dr, val);
            },
            Ins::St{sr, offset} => {
                let val = self.state.reg_read_word(sr);
                self.mem_write_word(self.pc_rel(offset), val);
            },
            Ins::Sti{sr, offset} => {
                let ptr = self.mem_read_word(self.pc_rel(offset));
                let val = self.state.reg_read_word(sr);
                self.mem_write_word(ptr, val);
            },
            Ins::Str{sr, base, offset} => {
                let val = self.state.reg_read_word(sr);
                self.mem_write_word(self.base_rel(base, offset), val);
            },
            Ins::Jmp{base} => {
                let new_pc = self.state.reg_read_word(base);
                self.state.set_pc(new_pc);
            },
            Ins::Jsr{target} => self.exec_jsr_ins(target),
            Ins::Trap{vector} => { return self.exec_trap_ins(vector, addr); },
            Ins::Reserved{op, raw} => {
                return self.halt(HaltReason::IllegalOpcode{op, raw, addr});
            },
        }

        ExecRet::Ok
    }
}
