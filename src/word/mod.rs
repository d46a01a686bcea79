//! 16-bit word primitives.
//!
//! Every register, memory cell and instruction in the machine is a
//! [`Word`]. Values are stored unsigned; the signed instructions (MLI, DVI,
//! MDI) reinterpret them as two's complement through [`as_signed`].

pub mod arith;

/// The fundamental 16-bit unit of memory, registers and instruction encoding.
pub type Word = u16;

/// Number of addressable words (the full 16-bit address space).
pub const ADDRESS_SPACE: usize = 1 << 16;

/// Reinterpret a word as a two's complement signed value.
#[inline]
pub fn as_signed(w: Word) -> i16 {
    w as i16
}

/// Small literal operand codes (0x20-0x3F) encode -1..=30.
#[inline]
pub fn small_literal(code: u8) -> Word {
    (i16::from(code) - 0x21) as Word
}
