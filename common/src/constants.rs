
pub const WORD_SIZE: u16 = 2; // Bytes

pub const MEM_WORDS: usize = (u16::MAX as usize) + 1;

// 0x0000 - 0x00ff trap vector table, 0x0100 - 0x01ff interrupt vector table,
// 0x0200 - 0x2fff OS and supervisor stack.
pub const USER_START: u16 = 0x3000;
pub const MMIO_START: u16 = 0xfe00;

// Largest image accepted by the loader, header included.
pub const MAX_IMAGE_BYTES: usize = u16::MAX as usize;
