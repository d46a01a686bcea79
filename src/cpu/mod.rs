//! CPU emulation for the DCPU-16.
//!
//! This module implements the complete machine:
//! - 65536 sixteen-bit memory words
//! - 8 general registers plus SP, PC and EX
//! - operand resolution for the "a" and "b" addressing classes
//! - the basic and special instruction sets

pub mod memory;
pub mod registers;
pub mod decode;
pub mod operand;
pub mod execute;

pub use memory::{Memory, MemoryError};
pub use registers::{Register, Registers};
pub use decode::{Instruction, Opcode, SpecialOpcode, DecodeError};
pub use operand::Operand;
pub use execute::{Cpu, CpuError, CpuState};
