//! # DCPU-16 Emulator
//!
//! An interpreter for the DCPU-16, a fictional 16-bit word-addressed CPU
//! with eight general registers, SP, PC, an extra/overflow register and
//! a flat 64K-word address space.
//!
//! Programs are binary images of little-endian words loaded at address 0.
//! Execution stops once PC leaves the loaded image or a decode fault occurs.

pub mod word;
pub mod cpu;
pub mod image;

#[cfg(feature = "tui")]
pub mod tui;

// Re-export commonly used types
pub use word::Word;
pub use cpu::{Cpu, CpuState, CpuError, DecodeError, Memory, Registers, Register, Instruction, Opcode};
pub use image::{load_image, parse_image, save_image, memory_map, ImageError};

#[cfg(feature = "tui")]
pub use tui::run_debugger;
