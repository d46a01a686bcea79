//! Arithmetic on 16-bit words.
//!
//! Each operation returns `(result, ex)`: the result masked to 16 bits and
//! the value the instruction leaves in the EX register.

use crate::word::{as_signed, Word};

/// Unsigned add. EX holds the carry out of bit 15.
pub fn add(d: Word, s: Word) -> (Word, Word) {
    let x = u32::from(d) + u32::from(s);
    (x as Word, (x >> 16) as Word)
}

/// Subtract `s` (and an optional extra borrow) from `d`.
///
/// EX is the high half of the signed difference, so a borrow leaves 0xFFFF.
pub fn subtract(d: Word, s: Word, extra_borrow: bool) -> (Word, Word) {
    let x = i32::from(d) - i32::from(s) - i32::from(extra_borrow);
    (x as Word, (x >> 16) as Word)
}

/// Unsigned multiply. EX holds the high 16 bits of the 32-bit product.
pub fn multiply(d: Word, s: Word) -> (Word, Word) {
    let x = u32::from(d) * u32::from(s);
    (x as Word, (x >> 16) as Word)
}

/// Signed multiply. EX holds the high 16 bits of the signed product.
pub fn multiply_signed(d: Word, s: Word) -> (Word, Word) {
    let x = i32::from(as_signed(d)) * i32::from(as_signed(s));
    (x as Word, (x >> 16) as Word)
}

/// Unsigned divide. Division by zero yields `(0, 0)`.
///
/// EX is always 0: the quotient shifted left by 16 has nothing left in the
/// low half once truncated to a word.
pub fn divide(d: Word, s: Word) -> (Word, Word) {
    if s == 0 {
        return (0, 0);
    }
    (d / s, 0)
}

/// Signed divide, rounding toward zero. Division by zero yields `(0, 0)`.
///
/// EX is always 0, as for [`divide`].
pub fn divide_signed(d: Word, s: Word) -> (Word, Word) {
    if s == 0 {
        return (0, 0);
    }
    let q = i32::from(as_signed(d)) / i32::from(as_signed(s));
    (q as Word, 0)
}

/// Unsigned remainder. `x mod 0` is 0.
pub fn modulo(d: Word, s: Word) -> Word {
    if s == 0 {
        return 0;
    }
    d % s
}

/// Signed remainder, taking the sign of the dividend. `x mod 0` is 0.
pub fn modulo_signed(d: Word, s: Word) -> Word {
    if s == 0 {
        return 0;
    }
    (i32::from(as_signed(d)) % i32::from(as_signed(s))) as Word
}
