//! Operand resolution.
//!
//! Turns a 5-bit destination ("b") or 6-bit source ("a") operand code into
//! an [`Operand`]: a register, a memory address, or a read-only literal.
//! Codes that need an extra instruction word consume it from PC as they
//! are resolved, so the destination must always be resolved first.

use crate::cpu::decode::DecodeError;
use crate::cpu::execute::Cpu;
use crate::cpu::registers::Register;
use crate::word::{small_literal, Word};
use serde::{Serialize, Deserialize};

/// Destination: push (pre-decrement SP). Source: pop (post-increment SP).
pub const PUSH_POP: u8 = 0x18;
/// `[SP]`
pub const PEEK: u8 = 0x19;
/// `[SP + next word]`
pub const PICK: u8 = 0x1a;
/// The stack pointer itself.
pub const SP: u8 = 0x1b;
/// The program counter itself.
pub const PC: u8 = 0x1c;
/// The extra register itself.
pub const EX: u8 = 0x1d;
/// `[next word]`
pub const INDIRECT_NEXT: u8 = 0x1e;
/// The next word as a literal value.
pub const NEXT_LITERAL: u8 = 0x1f;

/// A resolved operand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Operand {
    /// A register, read and written in place.
    Register(Register),
    /// A memory cell.
    Memory(Word),
    /// An immediate value. Only valid as a source.
    Literal(Word),
}

impl Cpu {
    /// Read the word at PC and advance PC.
    pub(crate) fn next_word(&mut self) -> Word {
        let pc = self.regs.advance_pc();
        self.mem.read(pc)
    }

    /// Resolve a "b" operand code to a writable location.
    pub(crate) fn resolve_destination(&mut self, code: u8) -> Result<Operand, DecodeError> {
        let operand = match code {
            PUSH_POP => Operand::Memory(self.regs.push_sp()),
            NEXT_LITERAL => return Err(DecodeError::LiteralDestination(code)),
            _ => self.resolve_common(code),
        };
        Ok(operand)
    }

    /// Resolve an "a" operand code.
    pub(crate) fn resolve_source(&mut self, code: u8) -> Operand {
        match code {
            PUSH_POP => Operand::Memory(self.regs.pop_sp()),
            NEXT_LITERAL => Operand::Literal(self.next_word()),
            0x20..=0x3f => Operand::Literal(small_literal(code)),
            _ => self.resolve_common(code),
        }
    }

    /// Codes that resolve identically in both positions.
    fn resolve_common(&mut self, code: u8) -> Operand {
        match code {
            0x00..=0x07 => Operand::Register(Register::general(code)),
            0x08..=0x0f => {
                let base = self.regs.get(Register::general(code));
                Operand::Memory(base)
            }
            0x10..=0x17 => {
                let base = self.regs.get(Register::general(code));
                let offset = self.next_word();
                Operand::Memory(base.wrapping_add(offset))
            }
            PEEK => Operand::Memory(self.regs.sp),
            PICK => {
                let offset = self.next_word();
                Operand::Memory(self.regs.sp.wrapping_add(offset))
            }
            SP => Operand::Register(Register::Sp),
            PC => Operand::Register(Register::Pc),
            EX => Operand::Register(Register::Ex),
            INDIRECT_NEXT => Operand::Memory(self.next_word()),
            // Only 0x18 and the literal codes remain, and both callers
            // handle those before reaching here.
            _ => unreachable!("operand code {code:#04x} resolved by caller"),
        }
    }

    /// Read the current value of an operand.
    pub(crate) fn read_operand(&self, operand: Operand) -> Word {
        match operand {
            Operand::Register(reg) => self.regs.get(reg),
            Operand::Memory(addr) => self.mem.read(addr),
            Operand::Literal(value) => value,
        }
    }

    /// Store a value into an operand.
    pub(crate) fn write_operand(&mut self, operand: Operand, value: Word) -> Result<(), DecodeError> {
        match operand {
            Operand::Register(reg) => self.regs.set(reg, value),
            Operand::Memory(addr) => self.mem.write(addr, value),
            Operand::Literal(_) => return Err(DecodeError::LiteralDestination(NEXT_LITERAL)),
        }
        Ok(())
    }
}
