//! DCPU-16 register file.
//!
//! Eight general-purpose registers (A, B, C, X, Y, Z, I, J) plus:
//! - SP: stack pointer, starts at 0xFFFF and grows downward
//! - PC: program counter
//! - EX: extra/overflow register, receives carry and borrow bits

use crate::word::Word;
use serde::{Serialize, Deserialize};
use std::fmt;

/// Initial stack pointer value.
pub const SP_INIT: Word = 0xFFFF;

/// A register that an operand can name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Register {
    A,
    B,
    C,
    X,
    Y,
    Z,
    I,
    J,
    Sp,
    Pc,
    Ex,
}

impl Register {
    /// The general-purpose registers in operand-code order.
    pub const GENERAL: [Register; 8] = [
        Register::A,
        Register::B,
        Register::C,
        Register::X,
        Register::Y,
        Register::Z,
        Register::I,
        Register::J,
    ];

    /// General-purpose register by id (0-7). Only the low three bits are used.
    pub fn general(id: u8) -> Self {
        Self::GENERAL[usize::from(id & 0x07)]
    }

    /// Register mnemonic.
    pub fn name(self) -> &'static str {
        match self {
            Register::A => "A",
            Register::B => "B",
            Register::C => "C",
            Register::X => "X",
            Register::Y => "Y",
            Register::Z => "Z",
            Register::I => "I",
            Register::J => "J",
            Register::Sp => "SP",
            Register::Pc => "PC",
            Register::Ex => "EX",
        }
    }
}

impl fmt::Display for Register {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.name())
    }
}

/// The DCPU-16 register file.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Registers {
    /// General-purpose registers A, B, C, X, Y, Z, I, J.
    pub general: [Word; 8],

    /// Stack pointer.
    pub sp: Word,

    /// Program counter.
    pub pc: Word,

    /// Extra/overflow register.
    pub ex: Word,
}

impl Registers {
    /// Create a register file in its power-on state.
    pub fn new() -> Self {
        Self {
            general: [0; 8],
            sp: SP_INIT,
            pc: 0,
            ex: 0,
        }
    }

    /// Restore the power-on state.
    pub fn reset(&mut self) {
        *self = Self::new();
    }

    /// Read a register.
    #[inline]
    pub fn get(&self, reg: Register) -> Word {
        match reg {
            Register::Sp => self.sp,
            Register::Pc => self.pc,
            Register::Ex => self.ex,
            general => self.general[general as usize],
        }
    }

    /// Write a register.
    #[inline]
    pub fn set(&mut self, reg: Register, value: Word) {
        match reg {
            Register::Sp => self.sp = value,
            Register::Pc => self.pc = value,
            Register::Ex => self.ex = value,
            general => self.general[general as usize] = value,
        }
    }

    /// Increment the program counter by 1, wrapping.
    /// Returns the old value.
    pub fn advance_pc(&mut self) -> Word {
        let old = self.pc;
        self.pc = self.pc.wrapping_add(1);
        old
    }

    /// Decrement SP and return the new top-of-stack address.
    pub fn push_sp(&mut self) -> Word {
        self.sp = self.sp.wrapping_sub(1);
        self.sp
    }

    /// Return the current top-of-stack address and increment SP.
    pub fn pop_sp(&mut self) -> Word {
        let old = self.sp;
        self.sp = self.sp.wrapping_add(1);
        old
    }
}

impl Default for Registers {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for Registers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for reg in Register::GENERAL {
            write!(f, "{}: {:04x} ", reg, self.get(reg))?;
        }
        write!(f, "SP: {:04x} PC: {:04x} EX: {:04x}", self.sp, self.pc, self.ex)
    }
}

impl fmt::Debug for Registers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Registers {{ {} }}", self)
    }
}
