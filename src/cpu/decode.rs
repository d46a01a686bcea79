//! Instruction decoder for the DCPU-16.
//!
//! An instruction word is laid out as `aaaaaabbbbbooooo`:
//! - bits 0-4: opcode
//! - bits 5-9: "b" (destination) operand code
//! - bits 10-15: "a" (source) operand code
//!
//! Opcode 0x00 selects the special family, whose sub-opcode lives in the
//! "b" field.

use crate::cpu::operand;
use crate::word::{small_literal, Word};
use serde::{Serialize, Deserialize};
use std::fmt;
use thiserror::Error;

/// The raw fields of one instruction word.
///
/// Field validity is checked lazily: a skipped instruction is consumed
/// without its opcode ever being interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Instruction {
    /// Opcode field (5 bits).
    pub opcode: u8,
    /// Destination operand code, or special sub-opcode (5 bits).
    pub b: u8,
    /// Source operand code (6 bits).
    pub a: u8,
}

impl Instruction {
    /// Whether this instruction belongs to the special family.
    #[inline]
    pub fn is_special(&self) -> bool {
        self.opcode == Opcode::Special as u8
    }

    /// Interpret the opcode field.
    pub fn operation(&self) -> Result<Operation, DecodeError> {
        match Opcode::try_from(self.opcode)? {
            Opcode::Special => Ok(Operation::Special(SpecialOpcode::try_from(self.b)?)),
            op => Ok(Operation::Basic(op)),
        }
    }

    /// Mnemonic for tracing, `???` if the encoding is undefined.
    pub fn mnemonic(&self) -> &'static str {
        match self.operation() {
            Ok(Operation::Basic(op)) => op.mnemonic(),
            Ok(Operation::Special(op)) => op.mnemonic(),
            Err(_) => "???",
        }
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_special() {
            write!(f, "{} {}", self.mnemonic(), operand_name(self.a, false))
        } else {
            write!(
                f,
                "{} {}, {}",
                self.mnemonic(),
                operand_name(self.b, true),
                operand_name(self.a, false)
            )
        }
    }
}

/// A fully interpreted opcode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    /// Two-operand instruction.
    Basic(Opcode),
    /// Special-family instruction taking only a source operand.
    Special(SpecialOpcode),
}

/// Basic opcodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum Opcode {
    /// Special family, dispatched on the "b" field.
    Special = 0x00,
    /// D := S
    Set = 0x01,
    /// D := D + S, EX := carry
    Add = 0x02,
    /// D := D - S, EX := borrow
    Sub = 0x03,
    /// D := D * S (unsigned), EX := high word
    Mul = 0x04,
    /// D := D * S (signed), EX := high word
    Mli = 0x05,
    /// D := D / S (unsigned), EX := 0
    Div = 0x06,
    /// D := D / S (signed), EX := 0
    Dvi = 0x07,
    /// D := D % S (unsigned)
    Mod = 0x08,
    /// D := D % S (signed)
    Mdi = 0x09,
    /// D := D & S
    And = 0x0a,
    /// D := D | S
    Bor = 0x0b,
    /// D := D ^ S
    Xor = 0x0c,
    /// Skip the next instruction unless D == S
    Ife = 0x12,
    /// Skip the next instruction unless D != S
    Ifn = 0x13,
}

impl Opcode {
    /// Assembly mnemonic.
    pub fn mnemonic(self) -> &'static str {
        match self {
            Opcode::Special => "SPECIAL",
            Opcode::Set => "SET",
            Opcode::Add => "ADD",
            Opcode::Sub => "SUB",
            Opcode::Mul => "MUL",
            Opcode::Mli => "MLI",
            Opcode::Div => "DIV",
            Opcode::Dvi => "DVI",
            Opcode::Mod => "MOD",
            Opcode::Mdi => "MDI",
            Opcode::And => "AND",
            Opcode::Bor => "BOR",
            Opcode::Xor => "XOR",
            Opcode::Ife => "IFE",
            Opcode::Ifn => "IFN",
        }
    }
}

impl TryFrom<u8> for Opcode {
    type Error = DecodeError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        let op = match value {
            0x00 => Opcode::Special,
            0x01 => Opcode::Set,
            0x02 => Opcode::Add,
            0x03 => Opcode::Sub,
            0x04 => Opcode::Mul,
            0x05 => Opcode::Mli,
            0x06 => Opcode::Div,
            0x07 => Opcode::Dvi,
            0x08 => Opcode::Mod,
            0x09 => Opcode::Mdi,
            0x0a => Opcode::And,
            0x0b => Opcode::Bor,
            0x0c => Opcode::Xor,
            0x12 => Opcode::Ife,
            0x13 => Opcode::Ifn,
            other => return Err(DecodeError::InvalidOpcode(other)),
        };
        Ok(op)
    }
}

/// Special-family opcodes, carried in the "b" field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum SpecialOpcode {
    /// PC := S. No return address is pushed.
    Jsr = 0x01,
}

impl SpecialOpcode {
    /// Assembly mnemonic.
    pub fn mnemonic(self) -> &'static str {
        match self {
            SpecialOpcode::Jsr => "JSR",
        }
    }
}

impl TryFrom<u8> for SpecialOpcode {
    type Error = DecodeError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0x01 => Ok(SpecialOpcode::Jsr),
            other => Err(DecodeError::InvalidSpecialOpcode(other)),
        }
    }
}

/// Split an instruction word into its fields.
pub fn decode(word: Word) -> Instruction {
    Instruction {
        opcode: (word & 0x1f) as u8,
        b: ((word >> 5) & 0x1f) as u8,
        a: ((word >> 10) & 0x3f) as u8,
    }
}

/// Build an instruction word from its fields. Out-of-range bits are masked.
pub fn encode(opcode: u8, b: u8, a: u8) -> Word {
    (Word::from(a & 0x3f) << 10) | (Word::from(b & 0x1f) << 5) | Word::from(opcode & 0x1f)
}

/// Human-readable form of an operand code, for traces.
///
/// Extra words are not shown; `next` marks where one is consumed.
pub fn operand_name(code: u8, destination: bool) -> String {
    use crate::cpu::registers::Register;

    match code {
        0x00..=0x07 => Register::general(code).to_string(),
        0x08..=0x0f => format!("[{}]", Register::general(code)),
        0x10..=0x17 => format!("[{}+next]", Register::general(code)),
        operand::PUSH_POP if destination => "PUSH".to_string(),
        operand::PUSH_POP => "POP".to_string(),
        operand::PEEK => "PEEK".to_string(),
        operand::PICK => "PICK next".to_string(),
        operand::SP => "SP".to_string(),
        operand::PC => "PC".to_string(),
        operand::EX => "EX".to_string(),
        operand::INDIRECT_NEXT => "[next]".to_string(),
        operand::NEXT_LITERAL => "next".to_string(),
        _ => format!("{}", small_literal(code) as i16),
    }
}

/// Errors that can occur during instruction decoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum DecodeError {
    #[error("invalid opcode: {0:#04x}")]
    InvalidOpcode(u8),

    #[error("invalid special opcode: {0:#04x}")]
    InvalidSpecialOpcode(u8),

    #[error("operand code {0:#04x} is a literal and cannot be written")]
    LiteralDestination(u8),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_fields() {
        // SET B, 0x1f
        let instr = decode(0x7c21);
        assert_eq!(instr, Instruction { opcode: 0x01, b: 0x01, a: 0x1f });
    }

    #[test]
    fn test_encode_layout() {
        assert_eq!(encode(0x01, 0x01, 0x1f), 0x7c21);
        assert_eq!(encode(0x00, 0x01, 0x21), 0x8420);
        // Excess bits are masked off rather than bleeding into other fields.
        assert_eq!(encode(0xff, 0, 0), 0x001f);
    }

    #[test]
    fn test_encode_decode_fields() {
        for (o, b, a) in [(0x02, 0x00, 0x3f), (0x13, 0x1e, 0x18), (0x00, 0x01, 0x20)] {
            let instr = decode(encode(o, b, a));
            assert_eq!((instr.opcode, instr.b, instr.a), (o, b, a));
        }
    }

    #[test]
    fn test_operation_lookup() {
        let add = decode(encode(0x02, 0, 0));
        assert_eq!(add.operation(), Ok(Operation::Basic(Opcode::Add)));

        let jsr = decode(encode(0x00, 0x01, 0x21));
        assert_eq!(jsr.operation(), Ok(Operation::Special(SpecialOpcode::Jsr)));
    }

    #[test]
    fn test_undefined_encodings() {
        assert_eq!(decode(encode(0x0d, 0, 0)).operation(), Err(DecodeError::InvalidOpcode(0x0d)));
        assert_eq!(decode(encode(0x1f, 0, 0)).operation(), Err(DecodeError::InvalidOpcode(0x1f)));
        assert_eq!(
            decode(encode(0x00, 0x08, 0)).operation(),
            Err(DecodeError::InvalidSpecialOpcode(0x08))
        );
    }

    #[test]
    fn test_display() {
        assert_eq!(decode(encode(0x01, 0x18, 0x1f)).to_string(), "SET PUSH, next");
        assert_eq!(decode(encode(0x03, 0x09, 0x18)).to_string(), "SUB [B], POP");
        assert_eq!(decode(encode(0x00, 0x01, 0x20)).to_string(), "JSR -1");
        assert_eq!(decode(encode(0x0e, 0x00, 0x00)).to_string(), "??? A, A");
    }
}
