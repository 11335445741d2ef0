
use crate::asm::*;
use crate::misc::sign_extend;

fn dr(ins: u16) -> Reg {
    Reg::from_field(ins, Ins::DR_SHIFT)
}

fn sr1(ins: u16) -> Reg {
    Reg::from_field(ins, Ins::SR1_SHIFT)
}

fn base(ins: u16) -> Reg {
    Reg::from_field(ins, Ins::BASE_SHIFT)
}

fn src2(ins: u16) -> Src2 {
    if ins & Src2::IMM_FLAG != 0 {
        Src2::Imm(sign_extend(ins, Src2::IMM_BITS))
    } else {
        Src2::Reg(Reg::from_field(ins, Ins::SR2_SHIFT))
    }
}

fn offset6(ins: u16) -> u16 {
    sign_extend(ins, Ins::OFFSET6_BITS)
}

fn offset9(ins: u16) -> u16 {
    sign_extend(ins, Ins::OFFSET9_BITS)
}

fn offset11(ins: u16) -> u16 {
    sign_extend(ins, Ins::OFFSET11_BITS)
}

fn decode_jsr(ins: u16) -> Ins {
    let target = if ins & Ins::JSR_FLAG != 0 {
        JsrTarget::Offset(offset11(ins))
    } else {
        JsrTarget::Reg(base(ins))
    };
    Ins::Jsr{target}
}

// Total: every word decodes to something, RTI and the reserved opcode included.
pub fn decode(ins: u16) -> Ins {
    match Opcode::decode(ins) {
        Opcode::Br => Ins::Br{nzp: (ins >> Ins::NZP_SHIFT) & Ins::NZP_MASK, offset: offset9(ins)},
        Opcode::Add => Ins::Add{dr: dr(ins), sr1: sr1(ins), src2: src2(ins)},
        Opcode::Ld => Ins::Ld{dr: dr(ins), offset: offset9(ins)},
        Opcode::St => Ins::St{sr: dr(ins), offset: offset9(ins)},
        Opcode::Jsr => decode_jsr(ins),
        Opcode::And => Ins::And{dr: dr(ins), sr1: sr1(ins), src2: src2(ins)},
        Opcode::Ldr => Ins::Ldr{dr: dr(ins), base: base(ins), offset: offset6(ins)},
        Opcode::Str => Ins::Str{sr: dr(ins), base: base(ins), offset: offset6(ins)},
        Opcode::Not => Ins::Not{dr: dr(ins), sr: sr1(ins)},
        Opcode::Ldi => Ins::Ldi{dr: dr(ins), offset: offset9(ins)},
        Opcode::Sti => Ins::Sti{sr: dr(ins), offset: offset9(ins)},
        Opcode::Jmp => Ins::Jmp{base: base(ins)},
        Opcode::Lea => Ins::Lea{dr: dr(ins), offset: offset9(ins)},
        Opcode::Trap => Ins::Trap{vector: (ins & Ins::TRAP_MASK) as u8},
        op @ (Opcode::Rti | Opcode::Res) => Ins::Reserved{op, raw: ins},
    }
}
