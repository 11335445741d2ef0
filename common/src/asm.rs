
use crate::misc::field_mask;

use std::fmt;

use derive_more::IsVariant;
use num_derive::{FromPrimitive, ToPrimitive};
use num_traits::{FromPrimitive, ToPrimitive};


#[derive(Debug, Clone, Copy, FromPrimitive, ToPrimitive, PartialEq, Eq, Hash)]
pub enum Reg {
    R0 = 0,
    R1,
    R2,
    R3,
    R4,
    R5,
    R6,
    R7,
}

impl fmt::Display for Reg {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

pub const NUM_REGS: usize = 8;

impl Reg {
    pub const NUM_BITS: u32 = 3;
    pub const MASK: u16 = field_mask(Self::NUM_BITS);

    pub const ALL: [Reg; NUM_REGS] = [
        Reg::R0, Reg::R1, Reg::R2, Reg::R3, Reg::R4, Reg::R5, Reg::R6, Reg::R7,
    ];

    // The register whose index sits in the 3 bits starting at `shift`.
    pub fn from_field(ins: u16, shift: u32) -> Reg {
        Reg::from_u16((ins >> shift) & Self::MASK).unwrap()
    }

    pub fn to_field(self, shift: u32) -> u16 {
        self.to_u16().unwrap() << shift
    }

    pub fn index(self) -> usize {
        self.to_usize().unwrap()
    }
}

////////////////////////////////////////////////////////////////////////////////

#[derive(Debug, Clone, Copy, FromPrimitive, ToPrimitive, PartialEq, Eq, Hash)]
pub enum Opcode {
    Br = 0,
    Add,
    Ld,
    St,
    Jsr,
    And,
    Ldr,
    Str,
    Rti, // Unused, treated as reserved.
    Not,
    Ldi,
    Sti,
    Jmp,
    Res,
    Lea,
    Trap,
}

impl Opcode {
    pub const NUM_BITS: u32 = 4;
    pub const SHIFT: u32 = u16::BITS - Self::NUM_BITS;

    // Every 4 bit value names an opcode, so this can't fail.
    pub fn decode(ins: u16) -> Opcode {
        Opcode::from_u16(ins >> Self::SHIFT).unwrap()
    }

    pub fn encode(self) -> u16 {
        self.to_u16().unwrap() << Self::SHIFT
    }

    pub fn is_reserved(self) -> bool {
        matches!(self, Opcode::Rti | Opcode::Res)
    }
}

impl fmt::Display for Opcode {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", format!("{:?}", self).to_uppercase())
    }
}

////////////////////////////////////////////////////////////////////////////////

#[derive(Debug, Clone, Copy, FromPrimitive, ToPrimitive, PartialEq, Eq, Hash)]
pub enum TrapCode {
    Getc = 0x20,
    Out,
    Puts,
    In,
    Putsp,
    Halt,
}

impl TrapCode {
    pub fn vector(self) -> u8 {
        self.to_u8().unwrap()
    }
}

impl fmt::Display for TrapCode {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", format!("{:?}", self).to_uppercase())
    }
}

////////////////////////////////////////////////////////////////////////////////

// Second operand of ADD and AND.
#[derive(Debug, Clone, Copy, PartialEq, Eq, IsVariant)]
pub enum Src2 {
    Reg(Reg),
    Imm(u16), // Already sign extended
}

impl Src2 {
    pub const IMM_FLAG: u16 = 1 << 5;
    pub const IMM_BITS: u32 = 5;

    fn encode(self) -> u16 {
        match self {
            Src2::Reg(r) => r.to_field(Ins::SR2_SHIFT),
            Src2::Imm(val) => Self::IMM_FLAG | (val & field_mask(Self::IMM_BITS)),
        }
    }
}

impl fmt::Display for Src2 {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Src2::Reg(r) => write!(f, "{r}"),
            Src2::Imm(val) => write!(f, "#{}", *val as i16),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, IsVariant)]
pub enum JsrTarget {
    Offset(u16), // JSR, already sign extended
    Reg(Reg),    // JSRR
}

////////////////////////////////////////////////////////////////////////////////

// A decoded instruction. Offsets and immediates are stored sign extended to a
// full word, so the engine only ever does wrapping word arithmetic on them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, IsVariant)]
pub enum Ins {
    Br { nzp: u16, offset: u16 },
    Add { dr: Reg, sr1: Reg, src2: Src2 },
    Ld { dr: Reg, offset: u16 },
    St { sr: Reg, offset: u16 },
    Jsr { target: JsrTarget },
    And { dr: Reg, sr1: Reg, src2: Src2 },
    Ldr { dr: Reg, base: Reg, offset: u16 },
    Str { sr: Reg, base: Reg, offset: u16 },
    Not { dr: Reg, sr: Reg },
    Ldi { dr: Reg, offset: u16 },
    Sti { sr: Reg, offset: u16 },
    Jmp { base: Reg },
    Lea { dr: Reg, offset: u16 },
    Trap { vector: u8 },
    Reserved { op: Opcode, raw: u16 },
}

impl Ins {
    pub const DR_SHIFT: u32 = 9;
    pub const SR1_SHIFT: u32 = 6;
    pub const SR2_SHIFT: u32 = 0;
    pub const BASE_SHIFT: u32 = 6;

    pub const NZP_SHIFT: u32 = 9;
    pub const NZP_MASK: u16 = 0x7;

    // Same layout as the condition register.
    pub const BR_N: u16 = 0x4;
    pub const BR_Z: u16 = 0x2;
    pub const BR_P: u16 = 0x1;

    pub const JSR_FLAG: u16 = 1 << 11;

    pub const OFFSET6_BITS: u32 = 6;
    pub const OFFSET9_BITS: u32 = 9;
    pub const OFFSET11_BITS: u32 = 11;

    pub const TRAP_MASK: u16 = 0xff;

    pub fn opcode(&self) -> Opcode {
        use Ins::*;
        match self {
            Br{..} => Opcode::Br,
            Add{..} => Opcode::Add,
            Ld{..} => Opcode::Ld,
            St{..} => Opcode::St,
            Jsr{..} => Opcode::Jsr,
            And{..} => Opcode::And,
            Ldr{..} => Opcode::Ldr,
            Str{..} => Opcode::Str,
            Not{..} => Opcode::Not,
            Ldi{..} => Opcode::Ldi,
            Sti{..} => Opcode::Sti,
            Jmp{..} => Opcode::Jmp,
            Lea{..} => Opcode::Lea,
            Trap{..} => Opcode::Trap,
            Reserved{op, ..} => *op,
        }
    }

    pub fn encode(&self) -> u16 {
        use Ins::*;
        let off9 = |offset: u16| offset & field_mask(Self::OFFSET9_BITS);
        let fields = match *self {
            Br{nzp, offset} => ((nzp & Self::NZP_MASK) << Self::NZP_SHIFT) | off9(offset),
            Add{dr, sr1, src2} | And{dr, sr1, src2} => {
                dr.to_field(Self::DR_SHIFT) | sr1.to_field(Self::SR1_SHIFT) | src2.encode()
            },
            Ld{dr, offset} | Ldi{dr, offset} | Lea{dr, offset} => {
                dr.to_field(Self::DR_SHIFT) | off9(offset)
            },
            St{sr, offset} | Sti{sr, offset} => sr.to_field(Self::DR_SHIFT) | off9(offset),
            Jsr{target: JsrTarget::Offset(offset)} => {
                Self::JSR_FLAG | (offset & field_mask(Self::OFFSET11_BITS))
            },
            Jsr{target: JsrTarget::Reg(base)} | Jmp{base} => base.to_field(Self::BASE_SHIFT),
            Ldr{dr: r, base, offset} | Str{sr: r, base, offset} => {
                r.to_field(Self::DR_SHIFT)
                    | base.to_field(Self::BASE_SHIFT)
                    | (offset & field_mask(Self::OFFSET6_BITS))
            },
            // The unused low bits are all set in the canonical encoding.
            Not{dr, sr} => dr.to_field(Self::DR_SHIFT) | sr.to_field(Self::SR1_SHIFT) | 0x3f,
            Trap{vector} => vector as u16,
            Reserved{raw, ..} => return raw,
        };
        self.opcode().encode() | fields
    }

    pub fn display_with_pc(&self, pc: u16) -> InsWithPc<'_> {
        InsWithPc(self, pc)
    }

    // `pc` is the address of the instruction itself, if known.
    fn fmt_with_pc(&self, f: &mut fmt::Formatter, pc: Option<u16>) -> fmt::Result {
        use Ins::*;
        match *self {
            Br{nzp, offset} => {
                if nzp == 0 {
                    return write!(f, "NOP");
                }
                write!(f, "BR")?;
                for (bit, c) in [(Self::BR_N, 'n'), (Self::BR_Z, 'z'), (Self::BR_P, 'p')] {
                    if nzp & bit != 0 {
                        write!(f, "{c}")?;
                    }
                }
                write!(f, "\t")?;
                fmt_target(f, offset, pc)
            },
            Add{dr, sr1, src2} => write!(f, "ADD\t{dr}, {sr1}, {src2}"),
            And{dr, sr1, src2} => write!(f, "AND\t{dr}, {sr1}, {src2}"),
            Ld{dr, offset} => {
                write!(f, "LD\t{dr}, ")?;
                fmt_target(f, offset, pc)
            },
            Ldi{dr, offset} => {
                write!(f, "LDI\t{dr}, ")?;
                fmt_target(f, offset, pc)
            },
            Lea{dr, offset} => {
                write!(f, "LEA\t{dr}, ")?;
                fmt_target(f, offset, pc)
            },
            St{sr, offset} => {
                write!(f, "ST\t{sr}, ")?;
                fmt_target(f, offset, pc)
            },
            Sti{sr, offset} => {
                write!(f, "STI\t{sr}, ")?;
                fmt_target(f, offset, pc)
            },
            Ldr{dr, base, offset} => write!(f, "LDR\t{dr}, {base}, #{}", offset as i16),
            Str{sr, base, offset} => write!(f, "STR\t{sr}, {base}, #{}", offset as i16),
            Not{dr, sr} => write!(f, "NOT\t{dr}, {sr}"),
            Jmp{base: Reg::R7} => write!(f, "RET"),
            Jmp{base} => write!(f, "JMP\t{base}"),
            Jsr{target: JsrTarget::Reg(base)} => write!(f, "JSRR\t{base}"),
            Jsr{target: JsrTarget::Offset(offset)} => {
                write!(f, "JSR\t")?;
                fmt_target(f, offset, pc)
            },
            Trap{vector} => match TrapCode::from_u8(vector) {
                Some(code) => write!(f, "{code}"),
                None => write!(f, "TRAP\tx{vector:02X}"),
            },
            Reserved{op, raw} => write!(f, "{op}\tx{raw:04X}"),
        }
    }
}

fn fmt_target(f: &mut fmt::Formatter, offset: u16, pc: Option<u16>) -> fmt::Result {
    match pc {
        // PC has already been incremented when the offset is applied.
        Some(pc) => write!(f, "x{:04X}", pc.wrapping_add(1).wrapping_add(offset)),
        None => write!(f, "#{}", offset as i16),
    }
}

impl fmt::Display for Ins {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        self.fmt_with_pc(f, None)
    }
}

// Just for formatting, like Path::Display()
pub struct InsWithPc<'a>(&'a Ins, u16);

impl fmt::Display for InsWithPc<'_> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        self.0.fmt_with_pc(f, Some(self.1))
    }
}
