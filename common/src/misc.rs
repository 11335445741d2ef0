
// Widens the low `bits` bits of `val` to a word, copying the field's top bit
// into every vacated position.
pub fn sign_extend(val: u16, bits: u32) -> u16 {
    debug_assert!(bits > 0 && bits < u16::BITS);
    let val = val & field_mask(bits);
    if (val >> (bits - 1)) & 0x1 != 0 {
        val | (u16::MAX << bits)
    } else {
        val
    }
}

pub const fn field_mask(bits: u32) -> u16 {
    (1u16 << bits) - 1
}

////////////////////////////////////////////////////////////////////////////////

pub trait IsEven: Copy {
    #[allow(clippy::wrong_self_convention)]
    fn is_even(self) -> bool;
}

impl IsEven for usize {
    fn is_even(self) -> bool {
        self & 0x1 != 1
    }
}

////////////////////////////////////////////////////////////////////////////////
